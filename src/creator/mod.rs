use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

pub mod db;

/// A content creator tenant, keyed by the identity-provider user id.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Creator {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}
