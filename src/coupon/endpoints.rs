use actix_web::post;
use actix_web::web::{Data, Json, Path};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Identity, UserId};
use crate::campaign::CampaignId;
use crate::database::Database;
use crate::error::Error;
use crate::participation::ParticipationId;
use crate::redemption::RedemptionId;

use super::{manager, Coupon, CouponId, CouponStatus};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CouponBody {
    pub id: CouponId,
    pub code: String,
    pub participation_id: ParticipationId,
    pub value: i64,
    pub status: CouponStatus,
    pub used_at: Option<DateTime<Utc>>,
    pub used_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CouponBody {
    pub fn render(coupon: Coupon) -> CouponBody {
        CouponBody {
            id: coupon.id,
            code: coupon.code,
            participation_id: coupon.participation_id,
            value: coupon.value,
            status: coupon.status,
            used_at: coupon.used_at,
            used_by: coupon.used_by,
            created_at: coupon.created_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RedeemCouponBody {
    pub code: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub value: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RedeemCouponResponse {
    pub success: bool,
    pub redemption: RedemptionBody,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RedemptionBody {
    pub id: RedemptionId,
    pub coupon_code: String,
    pub redeemed_at: DateTime<Utc>,
    pub value: i64,
}

#[post("/coupons/redeem")]
#[tracing::instrument(skip(db))]
async fn redeem_coupon(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    body: Json<RedeemCouponBody>,
) -> Result<Json<RedeemCouponResponse>, Error> {
    let body = body.into_inner();

    let confirmation =
        manager::redeem_coupon(&***db, identity.user_id, body.code, body.location, body.value)
            .await?;

    Ok(Json(RedeemCouponResponse {
        success: true,
        redemption: RedemptionBody {
            id: confirmation.id,
            coupon_code: confirmation.coupon_code,
            redeemed_at: confirmation.redeemed_at,
            value: confirmation.value,
        },
    }))
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ValidateCouponBody {
    pub code: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ValidateCouponResponse {
    pub success: bool,
    pub coupon: ValidatedCouponBody,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ValidatedCouponBody {
    pub id: CouponId,
    pub code: String,
    pub value: i64,
    pub campaign: CampaignSummaryBody,
    pub brand: PartySummaryBody,
    pub creator: PartySummaryBody,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CampaignSummaryBody {
    pub id: CampaignId,
    pub title: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PartySummaryBody {
    pub id: UserId,
    pub name: String,
}

/// In-store pre-check of a code without redeeming it. Deliberately
/// unauthenticated, mirroring the public validation endpoint.
#[post("/coupons/validate")]
#[tracing::instrument(skip(db))]
async fn validate_coupon(
    db: Data<Box<dyn Database>>,
    body: Json<ValidateCouponBody>,
) -> Result<Json<ValidateCouponResponse>, Error> {
    let body = body.into_inner();

    let validated = manager::validate_coupon(&***db, body.code).await?;

    Ok(Json(ValidateCouponResponse {
        success: true,
        coupon: ValidatedCouponBody {
            id: validated.coupon.id,
            code: validated.coupon.code,
            value: validated.coupon.value,
            campaign: CampaignSummaryBody {
                id: validated.campaign.id,
                title: validated.campaign.title,
            },
            brand: PartySummaryBody {
                id: validated.brand.id,
                name: validated.brand.name,
            },
            creator: PartySummaryBody {
                id: validated.creator.id,
                name: validated.creator.name,
            },
        },
    }))
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IssueCouponBody {
    pub value: i64,
}

#[post("/participations/{participation_id}/coupon")]
#[tracing::instrument(skip(db))]
async fn issue_coupon(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<ParticipationId>,
    body: Json<IssueCouponBody>,
) -> Result<Json<CouponBody>, Error> {
    let participation_id = params.into_inner();
    let body = body.into_inner();

    let coupon =
        manager::issue_coupon(&***db, identity.user_id, participation_id, body.value).await?;

    Ok(Json(CouponBody::render(coupon)))
}
