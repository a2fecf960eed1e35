use async_trait::async_trait;
use chrono::Utc;
use mongodb::{bson, Database};

use crate::database::MongoCouponStore;
use crate::error::Error;

use super::{Coupon, CouponStatus};

const COUPONS: &str = "coupons";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": COUPONS,
            "indexes": [
                { "key": { "code": 1 }, "name": "by_code", "unique": true },
                { "key": { "participation_id": 1 }, "name": "by_participation_id" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait CouponStore: Send + Sync {
    async fn insert_coupon(&self, coupon: &Coupon) -> Result<(), Error>;

    /// Looks up a coupon by code, filtered on status at query time: a used
    /// coupon is indistinguishable from a nonexistent one to the caller.
    async fn fetch_active_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, Error>;

    /// The active -> used transition. The update targets the coupon id (not
    /// the code, to avoid racing a re-issue of the same code) and is
    /// conditioned on the status still being active; when two redemptions
    /// race, exactly one matches and the other gets `CouponAlreadyRedeemed`.
    async fn update_coupon_used(&self, coupon: Coupon, used_by: String) -> Result<Coupon, Error>;
}

#[async_trait]
impl CouponStore for MongoCouponStore {
    #[tracing::instrument(skip(self))]
    async fn insert_coupon(&self, coupon: &Coupon) -> Result<(), Error> {
        self.insert_one(coupon, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_active_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, Error> {
        let coupon = self
            .find_one(bson::doc! { "code": code, "status": "active" }, None)
            .await?;

        Ok(coupon)
    }

    #[tracing::instrument(skip(self))]
    async fn update_coupon_used(
        &self,
        mut coupon: Coupon,
        used_by: String,
    ) -> Result<Coupon, Error> {
        let now = Utc::now();
        let new_used_at = bson::DateTime::from_chrono(now);

        let result = self
            .update_one(
                bson::doc! { "_id": coupon.id, "status": "active" },
                bson::doc! { "$set": {
                    "status": "used",
                    "used_at": new_used_at,
                    "used_by": used_by.as_str(),
                } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::CouponAlreadyRedeemed {
                coupon_id: coupon.id,
            });
        }

        coupon.status = CouponStatus::Used;
        coupon.used_at = Some(now);
        coupon.used_by = Some(used_by);

        Ok(coupon)
    }
}
