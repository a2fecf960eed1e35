use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::campaign::CampaignId;
use crate::coupon::CouponId;
use crate::participation::ParticipationId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;

pub type NotificationId = TypedId<Notification>;

/// An in-app notification. Delivery is best-effort: the sink never fails the
/// operation that produced the event.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub metadata: NotificationMetadata,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Notification {
    fn tag() -> &'static str {
        "NTF"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CampaignCreated,
    CampaignPublished,
    ParticipationRequested,
    ParticipationApproved,
    CouponIssued,
    CouponRedeemed,
}

/// Event context, as named optional fields rather than a free-form blob.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NotificationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<CampaignId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participation_id: Option<ParticipationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<CouponId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}
