use async_trait::async_trait;
use mongodb::{bson, Database};

use crate::auth::UserId;
use crate::database::MongoBrandStore;
use crate::error::Error;

use super::Brand;

pub async fn initialize(_db: &Database) -> Result<(), Error> {
    Ok(())
}

#[async_trait]
pub trait BrandStore: Send + Sync {
    async fn insert_brand(&self, brand: &Brand) -> Result<(), Error>;

    async fn fetch_brand_by_id(&self, brand_id: UserId) -> Result<Option<Brand>, Error>;
}

#[async_trait]
impl BrandStore for MongoBrandStore {
    #[tracing::instrument(skip(self))]
    async fn insert_brand(&self, brand: &Brand) -> Result<(), Error> {
        self.insert_one(brand, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_brand_by_id(&self, brand_id: UserId) -> Result<Option<Brand>, Error> {
        let brand = self.find_one(bson::doc! { "_id": brand_id }, None).await?;

        Ok(brand)
    }
}
