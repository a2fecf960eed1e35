use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub brand_id: UserId,
    pub title: String,
    pub description: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub end_date: DateTime<Utc>,
    pub status: CampaignStatus,
    /// Budget in centavos.
    pub budget: Option<i64>,
    pub objectives: Vec<String>,
    pub rules: CampaignRules,
    pub requirements: CampaignRequirements,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CMP"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
}

/// Eligibility rules a creator must satisfy, validated at the boundary
/// instead of being stored as an opaque payload.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CampaignRules {
    pub min_followers: u32,
    pub required_platforms: Vec<Platform>,
    pub content_requirements: String,
    pub hashtags: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
    Twitter,
}

/// What a participating creator is expected to deliver.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CampaignRequirements {
    pub content_type: ContentType,
    pub min_posts: u32,
    pub use_coupon: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Post,
    Story,
    Reel,
    Video,
}
