use async_trait::async_trait;
use mongodb::{bson, Database};

use crate::auth::UserId;
use crate::database::MongoCreatorStore;
use crate::error::Error;

use super::Creator;

pub async fn initialize(_db: &Database) -> Result<(), Error> {
    Ok(())
}

#[async_trait]
pub trait CreatorStore: Send + Sync {
    async fn insert_creator(&self, creator: &Creator) -> Result<(), Error>;

    async fn fetch_creator_by_id(&self, creator_id: UserId) -> Result<Option<Creator>, Error>;
}

#[async_trait]
impl CreatorStore for MongoCreatorStore {
    #[tracing::instrument(skip(self))]
    async fn insert_creator(&self, creator: &Creator) -> Result<(), Error> {
        self.insert_one(creator, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_creator_by_id(&self, creator_id: UserId) -> Result<Option<Creator>, Error> {
        let creator = self
            .find_one(bson::doc! { "_id": creator_id }, None)
            .await?;

        Ok(creator)
    }
}
