use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::coupon::CouponId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;

pub type RedemptionId = TypedId<Redemption>;

/// Immutable audit record of a single coupon use. The coupon status gate is
/// what enforces at-most-one of these per coupon; the record itself is the
/// reconciliation trail.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Redemption {
    #[serde(rename = "_id")]
    pub id: RedemptionId,
    pub coupon_id: CouponId,
    pub location: String,
    /// Redeemed value in centavos.
    pub value: i64,
    pub metadata: RedemptionMetadata,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub redeemed_at: DateTime<Utc>,
}

impl TypedIdMarker for Redemption {
    fn tag() -> &'static str {
        "RDM"
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RedemptionMetadata {
    pub redeemed_by: UserId,
    pub redeemed_by_name: String,
}
