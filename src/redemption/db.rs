use async_trait::async_trait;
use mongodb::{bson, Database};

use crate::database::MongoRedemptionStore;
use crate::error::Error;

use super::Redemption;

const REDEMPTIONS: &str = "coupon_redemptions";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": REDEMPTIONS,
            "indexes": [
                { "key": { "coupon_id": 1, "redeemed_at": 1 }, "name": "by_coupon_id" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait RedemptionStore: Send + Sync {
    async fn insert_redemption(&self, redemption: &Redemption) -> Result<(), Error>;
}

#[async_trait]
impl RedemptionStore for MongoRedemptionStore {
    #[tracing::instrument(skip(self))]
    async fn insert_redemption(&self, redemption: &Redemption) -> Result<(), Error> {
        self.insert_one(redemption, None).await?;

        Ok(())
    }
}
