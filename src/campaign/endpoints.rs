use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Identity, UserId};
use crate::database::Database;
use crate::error::Error;
use crate::participation::endpoints::ParticipationBody;
use crate::participation::manager as participation_manager;

use super::{manager, Campaign, CampaignId, CampaignRequirements, CampaignRules, CampaignStatus};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateCampaignBody {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub objectives: Vec<String>,
    pub rules: CampaignRules,
    pub requirements: CampaignRequirements,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub brand_id: UserId,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: CampaignStatus,
    pub budget: Option<i64>,
    pub objectives: Vec<String>,
    pub rules: CampaignRules,
    pub requirements: CampaignRequirements,
    pub participations: Vec<ParticipationBody>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub async fn render(db: &dyn Database, campaign: Campaign) -> Result<CampaignBody, Error> {
        let participations = db
            .participations()
            .fetch_participations_by_campaign(campaign.id)
            .await?;

        Ok(CampaignBody {
            id: campaign.id,
            brand_id: campaign.brand_id,
            title: campaign.title,
            description: campaign.description,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            status: campaign.status,
            budget: campaign.budget,
            objectives: campaign.objectives,
            rules: campaign.rules,
            requirements: campaign.requirements,
            participations: participations
                .into_iter()
                .map(ParticipationBody::render)
                .collect(),
            created_at: campaign.created_at,
            modified_at: campaign.modified_at,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CampaignPageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[post("/campaigns")]
#[tracing::instrument(skip(db))]
async fn create_campaign(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    body: Json<CreateCampaignBody>,
) -> Result<Json<CampaignBody>, Error> {
    let body = body.into_inner();

    let campaign = manager::create_campaign(
        &***db,
        identity.user_id,
        manager::NewCampaign {
            title: body.title,
            description: body.description,
            start_date: body.start_date,
            end_date: body.end_date,
            budget: body.budget,
            objectives: body.objectives,
            rules: body.rules,
            requirements: body.requirements,
        },
    )
    .await?;

    Ok(Json(CampaignBody::render(&***db, campaign).await?))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
async fn get_campaigns(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    query: Query<CampaignPageQuery>,
) -> Result<Json<Vec<CampaignBody>>, Error> {
    let query = query.into_inner();

    let campaigns = manager::get_campaigns(&***db, identity.user_id, query.page, query.limit).await?;

    let mut body = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        body.push(CampaignBody::render(&***db, campaign).await?);
    }

    Ok(Json(body))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    _identity: Identity,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::get_campaign_by_id(&***db, campaign_id).await?;

    Ok(Json(CampaignBody::render(&***db, campaign).await?))
}

#[post("/campaigns/{campaign_id}/publish")]
#[tracing::instrument(skip(db))]
async fn publish_campaign(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::publish_campaign(&***db, identity.user_id, campaign_id).await?;

    Ok(Json(CampaignBody::render(&***db, campaign).await?))
}

#[post("/campaigns/{campaign_id}/participations")]
#[tracing::instrument(skip(db))]
async fn join_campaign(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<CampaignId>,
) -> Result<Json<ParticipationBody>, Error> {
    let campaign_id = params.into_inner();

    let participation =
        participation_manager::join_campaign(&***db, identity.user_id, campaign_id).await?;

    Ok(Json(ParticipationBody::render(participation)))
}

#[get("/campaigns/{campaign_id}/participations")]
#[tracing::instrument(skip(db))]
async fn get_participations_in_campaign(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<CampaignId>,
) -> Result<Json<Vec<ParticipationBody>>, Error> {
    let campaign_id = params.into_inner();

    let participations =
        participation_manager::get_participations(&***db, identity.user_id, campaign_id).await?;

    let body = participations
        .into_iter()
        .map(ParticipationBody::render)
        .collect();

    Ok(Json(body))
}
