use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::campaign::CampaignId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;

pub type ParticipationId = TypedId<Participation>;

/// The join record between a creator and a campaign. Earnings accumulate
/// here, in centavos, and are only ever credited by coupon redemption.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Participation {
    #[serde(rename = "_id")]
    pub id: ParticipationId,
    pub campaign_id: CampaignId,
    pub creator_id: UserId,
    pub status: ParticipationStatus,
    pub coupon_code: Option<String>,
    pub earnings: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub joined_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Participation {
    fn tag() -> &'static str {
        "PTC"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationStatus {
    Pending,
    Active,
    Rejected,
}
