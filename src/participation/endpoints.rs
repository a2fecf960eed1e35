use actix_web::post;
use actix_web::web::{Data, Json, Path};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Identity, UserId};
use crate::campaign::CampaignId;
use crate::database::Database;
use crate::error::Error;

use super::{manager, Participation, ParticipationId, ParticipationStatus};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ParticipationBody {
    pub id: ParticipationId,
    pub campaign_id: CampaignId,
    pub creator_id: UserId,
    pub status: ParticipationStatus,
    pub coupon_code: Option<String>,
    pub earnings: i64,
    pub joined_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ParticipationBody {
    pub fn render(participation: Participation) -> ParticipationBody {
        ParticipationBody {
            id: participation.id,
            campaign_id: participation.campaign_id,
            creator_id: participation.creator_id,
            status: participation.status,
            coupon_code: participation.coupon_code,
            earnings: participation.earnings,
            joined_at: participation.joined_at,
            modified_at: participation.modified_at,
        }
    }
}

#[post("/participations/{participation_id}/approve")]
#[tracing::instrument(skip(db))]
async fn approve_participation(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<ParticipationId>,
) -> Result<Json<ParticipationBody>, Error> {
    let participation_id = params.into_inner();

    let participation =
        manager::approve_participation(&***db, identity.user_id, participation_id).await?;

    Ok(Json(ParticipationBody::render(participation)))
}
