use async_trait::async_trait;
use mongodb::{bson, Database};

use crate::database::MongoSessionStore;
use crate::error::Error;

use super::Session;

pub async fn initialize(_db: &Database) -> Result<(), Error> {
    Ok(())
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: &Session) -> Result<(), Error>;

    async fn fetch_session_by_token(&self, token: &str) -> Result<Option<Session>, Error>;
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    #[tracing::instrument(skip(self))]
    async fn insert_session(&self, session: &Session) -> Result<(), Error> {
        self.insert_one(session, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_session_by_token(&self, token: &str) -> Result<Option<Session>, Error> {
        let session = self.find_one(bson::doc! { "_id": token }, None).await?;

        Ok(session)
    }
}
