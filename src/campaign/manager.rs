use chrono::{DateTime, Utc};

use crate::auth::UserId;
use crate::database::Database;
use crate::error::Error;
use crate::notification::manager::notify;
use crate::notification::{NotificationKind, NotificationMetadata};

use super::{Campaign, CampaignId, CampaignRequirements, CampaignRules, CampaignStatus};

#[derive(Clone, Debug)]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub budget: Option<i64>,
    pub objectives: Vec<String>,
    pub rules: CampaignRules,
    pub requirements: CampaignRequirements,
}

#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: &dyn Database,
    user_id: UserId,
    new_campaign: NewCampaign,
) -> Result<Campaign, Error> {
    let brand = db
        .brands()
        .fetch_brand_by_id(user_id)
        .await?
        .ok_or(Error::OnlyBrandsMayCreateCampaigns { user_id })?;

    if new_campaign.start_date >= new_campaign.end_date {
        return Err(Error::InvalidDateRange);
    }

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        brand_id: brand.id,
        title: new_campaign.title,
        description: new_campaign.description,
        start_date: new_campaign.start_date,
        end_date: new_campaign.end_date,
        status: CampaignStatus::Draft,
        budget: new_campaign.budget,
        objectives: new_campaign.objectives,
        rules: new_campaign.rules,
        requirements: new_campaign.requirements,
        created_at: now,
        modified_at: now,
    };

    db.campaigns().insert_campaign(&campaign).await?;

    notify(
        db,
        brand.id,
        "Campanha criada com sucesso".to_string(),
        format!("Sua campanha \"{}\" foi criada com sucesso.", campaign.title),
        NotificationKind::CampaignCreated,
        NotificationMetadata {
            campaign_id: Some(campaign.id),
            ..NotificationMetadata::default()
        },
    )
    .await;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn publish_campaign(
    db: &dyn Database,
    user_id: UserId,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    if campaign.brand_id != user_id {
        return Err(Error::CampaignNotOwnedByBrand {
            campaign_id,
            brand_id: user_id,
        });
    }

    let campaign = db.campaigns().update_campaign_published(campaign).await?;

    notify(
        db,
        campaign.brand_id,
        "Campanha publicada".to_string(),
        format!("Sua campanha \"{}\" está ativa.", campaign.title),
        NotificationKind::CampaignPublished,
        NotificationMetadata {
            campaign_id: Some(campaign.id),
            ..NotificationMetadata::default()
        },
    )
    .await;

    Ok(campaign)
}

/// Brands see their own campaigns regardless of status; everyone else sees
/// only active campaigns.
#[tracing::instrument(skip(db))]
pub async fn get_campaigns(
    db: &dyn Database,
    user_id: UserId,
    page: u64,
    limit: i64,
) -> Result<Vec<Campaign>, Error> {
    let skip = page.saturating_sub(1).saturating_mul(limit.max(0) as u64);

    let campaigns = match db.brands().fetch_brand_by_id(user_id).await? {
        Some(brand) => {
            db.campaigns()
                .fetch_campaigns_by_brand(brand.id, skip, limit)
                .await?
        }
        None => db.campaigns().fetch_active_campaigns(skip, limit).await?,
    };

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    Ok(campaign)
}
