use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest};
use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;

/// Marker for identity-provider user ids. Brands and creators are both keyed
/// by the user id their session asserts.
#[derive(Clone, Debug)]
pub struct User;

pub type UserId = TypedId<User>;

impl TypedIdMarker for User {
    fn tag() -> &'static str {
        "USR"
    }
}

/// A bearer session issued by the identity provider, stored keyed by its
/// opaque token.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Session {
    #[serde(rename = "_id")]
    pub token: String,
    pub user_id: UserId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller, resolved from the `Authorization` header.
///
/// Role (brand vs creator) is deliberately not resolved here; managers look
/// the user up in the brand or creator table when an operation requires a
/// particular role.
#[derive(Copy, Clone, Debug)]
pub struct Identity {
    pub user_id: UserId,
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Identity, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let db = req
                .app_data::<Data<Box<dyn Database>>>()
                .cloned()
                .ok_or_else(|| {
                    Error::ExistentialState("database handle missing from app data".to_string())
                })?;

            let token = bearer_token(&req).ok_or(Error::NotAuthenticated)?;

            let session = db
                .sessions()
                .fetch_session_by_token(&token)
                .await?
                .ok_or(Error::NotAuthenticated)?;

            Ok(Identity {
                user_id: session.user_id,
            })
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
