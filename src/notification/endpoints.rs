use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Identity, UserId};
use crate::database::Database;
use crate::error::Error;

use super::{manager, Notification, NotificationId, NotificationKind, NotificationMetadata};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NotificationBody {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub metadata: NotificationMetadata,
    pub created_at: DateTime<Utc>,
}

impl NotificationBody {
    pub fn render(notification: Notification) -> NotificationBody {
        NotificationBody {
            id: notification.id,
            user_id: notification.user_id,
            title: notification.title,
            content: notification.content,
            kind: notification.kind,
            is_read: notification.is_read,
            metadata: notification.metadata,
            created_at: notification.created_at,
        }
    }
}

#[get("/notifications")]
#[tracing::instrument(skip(db))]
async fn get_notifications(
    db: Data<Box<dyn Database>>,
    identity: Identity,
) -> Result<Json<Vec<NotificationBody>>, Error> {
    let notifications = manager::get_notifications(&***db, identity.user_id).await?;

    let body = notifications
        .into_iter()
        .map(NotificationBody::render)
        .collect();

    Ok(Json(body))
}

#[post("/notifications/{notification_id}/read")]
#[tracing::instrument(skip(db))]
async fn mark_notification_read(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<NotificationId>,
) -> Result<HttpResponse, Error> {
    let notification_id = params.into_inner();

    manager::mark_notification_read(&***db, identity.user_id, notification_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
