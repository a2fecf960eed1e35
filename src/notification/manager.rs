use chrono::Utc;

use crate::auth::UserId;
use crate::database::Database;
use crate::error::Error;

use super::{Notification, NotificationId, NotificationKind, NotificationMetadata};

/// Fire-and-forget delivery into the notification sink. A store failure is
/// logged and swallowed; it must never affect the outcome of the operation
/// that produced the event.
#[tracing::instrument(skip(db, content, metadata))]
pub async fn notify(
    db: &dyn Database,
    user_id: UserId,
    title: String,
    content: String,
    kind: NotificationKind,
    metadata: NotificationMetadata,
) {
    let notification = Notification {
        id: NotificationId::new(),
        user_id,
        title,
        content,
        kind,
        is_read: false,
        metadata,
        created_at: Utc::now(),
    };

    if let Err(err) = db
        .notifications()
        .insert_notification(&notification)
        .await
    {
        tracing::error!(
            notification_id = %notification.id,
            user_id = %user_id,
            error = %err,
            "failed to enqueue notification",
        );
    }
}

#[tracing::instrument(skip(db))]
pub async fn get_notifications(
    db: &dyn Database,
    user_id: UserId,
) -> Result<Vec<Notification>, Error> {
    let notifications = db
        .notifications()
        .fetch_notifications_by_user(user_id)
        .await?;

    Ok(notifications)
}

#[tracing::instrument(skip(db))]
pub async fn mark_notification_read(
    db: &dyn Database,
    user_id: UserId,
    notification_id: NotificationId,
) -> Result<(), Error> {
    let updated = db
        .notifications()
        .update_notification_read(user_id, notification_id)
        .await?;

    if !updated {
        return Err(Error::NotificationDoesNotExist { notification_id });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test::MockDatabase;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn notify_swallows_store_failures() {
        let mut db = MockDatabase::new();
        db.notifications.on_insert_notification =
            Box::new(|_| Err(Error::ExistentialState("sink unavailable".to_string())));

        // Must not panic and has no failure to report.
        notify(
            &db,
            UserId::new(),
            "Cupom resgatado".to_string(),
            "Seu cupom foi resgatado.".to_string(),
            NotificationKind::CouponRedeemed,
            NotificationMetadata::default(),
        )
        .await;
    }

    #[tokio::test]
    async fn notify_records_an_unread_notification() {
        let mut db = MockDatabase::new();
        let called = Arc::new(Mutex::new(false));
        let called_clone = Arc::clone(&called);
        db.notifications.on_insert_notification = Box::new(move |notification| {
            *called_clone.lock().unwrap() = true;
            assert!(!notification.is_read);
            assert_eq!(notification.kind, NotificationKind::CouponIssued);
            Ok(())
        });

        notify(
            &db,
            UserId::new(),
            "Cupom emitido".to_string(),
            "Você recebeu um cupom.".to_string(),
            NotificationKind::CouponIssued,
            NotificationMetadata::default(),
        )
        .await;

        assert!(
            *called.lock().unwrap(),
            "db.insert_notification was not called"
        );
    }

    #[tokio::test]
    async fn mark_read_of_foreign_notification_is_not_found() {
        let mut db = MockDatabase::new();
        db.notifications.on_update_notification_read = Box::new(|_, _| Ok(false));
        let notification_id = NotificationId::new();

        let result = mark_notification_read(&db, UserId::new(), notification_id).await;

        assert_eq!(
            result.unwrap_err(),
            Error::NotificationDoesNotExist { notification_id }
        );
    }
}
