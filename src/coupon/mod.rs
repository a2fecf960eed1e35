use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::participation::ParticipationId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;

pub type CouponId = TypedId<Coupon>;

/// A single-use discount coupon. The human-readable `code` is the natural
/// key used for lookup and is globally unique; the owning brand is derived
/// through participation -> campaign and never changes after creation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: CouponId,
    pub code: String,
    pub participation_id: ParticipationId,
    /// Face value in centavos.
    pub value: i64,
    pub status: CouponStatus,
    #[serde(with = "crate::utils::option_chrono_datetime_as_bson_datetime")]
    pub used_at: Option<DateTime<Utc>>,
    pub used_by: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Coupon {
    fn tag() -> &'static str {
        "CUP"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Active,
    Used,
}
