use chrono::Utc;

use crate::auth::UserId;
use crate::campaign::{CampaignId, CampaignStatus};
use crate::database::Database;
use crate::error::Error;
use crate::notification::manager::notify;
use crate::notification::{NotificationKind, NotificationMetadata};

use super::{Participation, ParticipationId, ParticipationStatus};

#[tracing::instrument(skip(db))]
pub async fn join_campaign(
    db: &dyn Database,
    user_id: UserId,
    campaign_id: CampaignId,
) -> Result<Participation, Error> {
    let creator = db
        .creators()
        .fetch_creator_by_id(user_id)
        .await?
        .ok_or(Error::OnlyCreatorsMayJoinCampaigns { user_id })?;

    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    if campaign.status != CampaignStatus::Active {
        return Err(Error::CampaignNotAcceptingParticipants {
            campaign_id,
            status: campaign.status,
        });
    }

    let current = db
        .participations()
        .fetch_current_participation(campaign_id, creator.id)
        .await?;
    if current.is_some() {
        return Err(Error::AlreadyParticipating {
            campaign_id,
            creator_id: creator.id,
        });
    }

    let now = Utc::now();
    let participation = Participation {
        id: ParticipationId::new(),
        campaign_id,
        creator_id: creator.id,
        status: ParticipationStatus::Pending,
        coupon_code: None,
        earnings: 0,
        joined_at: now,
        modified_at: now,
    };

    db.participations()
        .insert_participation(&participation)
        .await?;

    notify(
        db,
        campaign.brand_id,
        "Nova solicitação de participação".to_string(),
        format!(
            "{} quer participar da campanha \"{}\".",
            creator.name, campaign.title
        ),
        NotificationKind::ParticipationRequested,
        NotificationMetadata {
            campaign_id: Some(campaign.id),
            participation_id: Some(participation.id),
            ..NotificationMetadata::default()
        },
    )
    .await;

    Ok(participation)
}

#[tracing::instrument(skip(db))]
pub async fn approve_participation(
    db: &dyn Database,
    user_id: UserId,
    participation_id: ParticipationId,
) -> Result<Participation, Error> {
    let participation = db
        .participations()
        .fetch_participation_by_id(participation_id)
        .await?
        .ok_or(Error::ParticipationDoesNotExist { participation_id })?;

    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(participation.campaign_id)
        .await?
        .ok_or_else(|| {
            Error::ExistentialState(format!(
                "participation {} references missing campaign {}",
                participation.id, participation.campaign_id
            ))
        })?;

    if campaign.brand_id != user_id {
        return Err(Error::CampaignNotOwnedByBrand {
            campaign_id: campaign.id,
            brand_id: user_id,
        });
    }

    if participation.status != ParticipationStatus::Pending {
        return Err(Error::ParticipationNotApprovable {
            participation_id,
            status: participation.status,
        });
    }

    let participation = db
        .participations()
        .update_participation_approved(participation)
        .await?;

    notify(
        db,
        participation.creator_id,
        "Participação aprovada".to_string(),
        format!(
            "Sua participação na campanha \"{}\" foi aprovada.",
            campaign.title
        ),
        NotificationKind::ParticipationApproved,
        NotificationMetadata {
            campaign_id: Some(campaign.id),
            participation_id: Some(participation.id),
            ..NotificationMetadata::default()
        },
    )
    .await;

    Ok(participation)
}

#[tracing::instrument(skip(db))]
pub async fn get_participations(
    db: &dyn Database,
    user_id: UserId,
    campaign_id: CampaignId,
) -> Result<Vec<Participation>, Error> {
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

    let participations = db
        .participations()
        .fetch_participations_by_campaign(campaign_id)
        .await?;

    Ok(participations)
}
