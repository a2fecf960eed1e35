use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson, Database};

use crate::auth::UserId;
use crate::campaign::CampaignId;
use crate::database::MongoParticipationStore;
use crate::error::Error;

use super::{Participation, ParticipationId, ParticipationStatus};

const PARTICIPATIONS: &str = "participations";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": PARTICIPATIONS,
            "indexes": [
                { "key": { "campaign_id": 1, "joined_at": 1 }, "name": "by_campaign_id" },
                // Backstop for the manager's duplicate check: two concurrent
                // joins cannot both insert a non-rejected participation.
                {
                    "key": { "campaign_id": 1, "creator_id": 1 },
                    "name": "by_campaign_and_creator",
                    "unique": true,
                    "partialFilterExpression": { "status": { "$in": ["pending", "active"] } },
                },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait ParticipationStore: Send + Sync {
    async fn insert_participation(&self, participation: &Participation) -> Result<(), Error>;

    async fn fetch_participation_by_id(
        &self,
        participation_id: ParticipationId,
    ) -> Result<Option<Participation>, Error>;

    async fn fetch_participations_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Participation>, Error>;

    /// The at-most-one non-rejected participation of a creator in a campaign.
    async fn fetch_current_participation(
        &self,
        campaign_id: CampaignId,
        creator_id: UserId,
    ) -> Result<Option<Participation>, Error>;

    /// Transitions a pending participation to active, conditioned on the
    /// status still being pending.
    async fn update_participation_approved(
        &self,
        participation: Participation,
    ) -> Result<Participation, Error>;

    /// Assigns a coupon code, conditioned on no code being assigned yet.
    async fn update_participation_coupon_code(
        &self,
        participation: Participation,
        code: String,
    ) -> Result<Participation, Error>;

    /// Atomic increment; never read-modify-write, so concurrent redemptions
    /// of different coupons of the same participation cannot lose updates.
    async fn credit_earnings(
        &self,
        participation_id: ParticipationId,
        amount: i64,
    ) -> Result<(), Error>;
}

#[async_trait]
impl ParticipationStore for MongoParticipationStore {
    #[tracing::instrument(skip(self))]
    async fn insert_participation(&self, participation: &Participation) -> Result<(), Error> {
        self.insert_one(participation, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_participation_by_id(
        &self,
        participation_id: ParticipationId,
    ) -> Result<Option<Participation>, Error> {
        let participation = self
            .find_one(bson::doc! { "_id": participation_id }, None)
            .await?;

        Ok(participation)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_participations_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Participation>, Error> {
        let participations: Vec<Participation> = self
            .find(bson::doc! { "campaign_id": campaign_id }, None)
            .await?
            .try_collect()
            .await?;

        Ok(participations)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_current_participation(
        &self,
        campaign_id: CampaignId,
        creator_id: UserId,
    ) -> Result<Option<Participation>, Error> {
        let participation = self
            .find_one(
                bson::doc! {
                    "campaign_id": campaign_id,
                    "creator_id": creator_id,
                    "status": { "$ne": "rejected" },
                },
                None,
            )
            .await?;

        Ok(participation)
    }

    #[tracing::instrument(skip(self))]
    async fn update_participation_approved(
        &self,
        mut participation: Participation,
    ) -> Result<Participation, Error> {
        let now = Utc::now();
        let new_modified_at = bson::DateTime::from_chrono(now);

        let result = self
            .update_one(
                bson::doc! { "_id": participation.id, "status": "pending" },
                bson::doc! { "$set": { "status": "active", "modified_at": new_modified_at } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ParticipationNotApprovable {
                participation_id: participation.id,
                status: participation.status,
            });
        }

        participation.status = ParticipationStatus::Active;
        participation.modified_at = now;

        Ok(participation)
    }

    #[tracing::instrument(skip(self))]
    async fn update_participation_coupon_code(
        &self,
        mut participation: Participation,
        code: String,
    ) -> Result<Participation, Error> {
        let now = Utc::now();
        let new_modified_at = bson::DateTime::from_chrono(now);

        let result = self
            .update_one(
                bson::doc! { "_id": participation.id, "coupon_code": null },
                bson::doc! { "$set": { "coupon_code": code.as_str(), "modified_at": new_modified_at } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ParticipationAlreadyHasCoupon {
                participation_id: participation.id,
            });
        }

        participation.coupon_code = Some(code);
        participation.modified_at = now;

        Ok(participation)
    }

    #[tracing::instrument(skip(self))]
    async fn credit_earnings(
        &self,
        participation_id: ParticipationId,
        amount: i64,
    ) -> Result<(), Error> {
        let result = self
            .update_one(
                bson::doc! { "_id": participation_id },
                bson::doc! { "$inc": { "earnings": amount } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ParticipationDoesNotExist { participation_id });
        }

        Ok(())
    }
}
