use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Database};

use crate::auth::UserId;
use crate::database::MongoNotificationStore;
use crate::error::Error;

use super::{Notification, NotificationId};

const NOTIFICATIONS: &str = "notifications";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": NOTIFICATIONS,
            "indexes": [
                { "key": { "user_id": 1, "created_at": 1 }, "name": "by_user_id" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn fetch_notifications_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, Error>;

    /// Marks a notification read, scoped to its owner so one user cannot
    /// touch another's notifications.
    async fn update_notification_read(
        &self,
        user_id: UserId,
        notification_id: NotificationId,
    ) -> Result<bool, Error>;
}

#[async_trait]
impl NotificationStore for MongoNotificationStore {
    #[tracing::instrument(skip(self))]
    async fn insert_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.insert_one(notification, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_notifications_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let notifications: Vec<Notification> = self
            .find(bson::doc! { "user_id": user_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(notifications)
    }

    #[tracing::instrument(skip(self))]
    async fn update_notification_read(
        &self,
        user_id: UserId,
        notification_id: NotificationId,
    ) -> Result<bool, Error> {
        let result = self
            .update_one(
                bson::doc! { "_id": notification_id, "user_id": user_id },
                bson::doc! { "$set": { "is_read": true } },
                None,
            )
            .await?;

        Ok(result.matched_count > 0)
    }
}
