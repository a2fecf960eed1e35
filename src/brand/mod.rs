use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

pub mod db;

/// A brand tenant. Keyed by the identity-provider user id so that an
/// authenticated caller's role is a single lookup.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub logo_url: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}
