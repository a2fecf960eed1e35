use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Database};

use crate::auth::UserId;
use crate::database::MongoCampaignStore;
use crate::error::Error;

use super::{Campaign, CampaignId, CampaignStatus};

const CAMPAIGNS: &str = "campaigns";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": CAMPAIGNS,
            "indexes": [
                { "key": { "brand_id": 1, "created_at": 1 }, "name": "by_brand_id" },
                { "key": { "status": 1, "created_at": 1 }, "name": "by_status" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error>;

    async fn fetch_campaigns_by_brand(
        &self,
        brand_id: UserId,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Campaign>, Error>;

    async fn fetch_active_campaigns(&self, skip: u64, limit: i64) -> Result<Vec<Campaign>, Error>;

    /// Transitions a draft campaign to active. The update is conditioned on
    /// the status still being draft; a zero-match means the campaign was
    /// published, completed, or cancelled in the meantime.
    async fn update_campaign_published(&self, campaign: Campaign) -> Result<Campaign, Error>;
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign = self.find_one(bson::doc! { "_id": campaign_id }, None).await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns_by_brand(
        &self,
        brand_id: UserId,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let campaigns: Vec<Campaign> = self
            .find(bson::doc! { "brand_id": brand_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_active_campaigns(&self, skip: u64, limit: i64) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let campaigns: Vec<Campaign> = self
            .find(bson::doc! { "status": "active" }, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_published(&self, mut campaign: Campaign) -> Result<Campaign, Error> {
        let now = Utc::now();
        let new_modified_at = bson::DateTime::from_chrono(now);

        let result = self
            .update_one(
                bson::doc! { "_id": campaign.id, "status": "draft" },
                bson::doc! { "$set": { "status": "active", "modified_at": new_modified_at } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::CampaignNotPublishable {
                campaign_id: campaign.id,
            });
        }

        campaign.status = CampaignStatus::Active;
        campaign.modified_at = now;

        Ok(campaign)
    }
}
