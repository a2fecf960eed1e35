use async_trait::async_trait;
use mongodb::Collection;

use crate::auth::db::SessionStore;
use crate::auth::{self, Session};
use crate::brand::db::BrandStore;
use crate::brand::{self, Brand};
use crate::campaign::db::CampaignStore;
use crate::campaign::{self, Campaign};
use crate::coupon::db::CouponStore;
use crate::coupon::{self, Coupon};
use crate::creator::db::CreatorStore;
use crate::creator::{self, Creator};
use crate::error::Error;
use crate::notification::db::NotificationStore;
use crate::notification::{self, Notification};
use crate::participation::db::ParticipationStore;
use crate::participation::{self, Participation};
use crate::redemption::db::RedemptionStore;
use crate::redemption::{self, Redemption};

pub type MongoSessionStore = Collection<Session>;
pub type MongoBrandStore = Collection<Brand>;
pub type MongoCreatorStore = Collection<Creator>;
pub type MongoCampaignStore = Collection<Campaign>;
pub type MongoParticipationStore = Collection<Participation>;
pub type MongoCouponStore = Collection<Coupon>;
pub type MongoRedemptionStore = Collection<Redemption>;
pub type MongoNotificationStore = Collection<Notification>;

/// The injected store handle. Managers only ever see this trait; the
/// concrete database is wired up once at startup (and swapped for mocks in
/// unit tests).
#[async_trait]
pub trait Database: Send + Sync {
    fn sessions(&self) -> &dyn SessionStore;
    fn brands(&self) -> &dyn BrandStore;
    fn creators(&self) -> &dyn CreatorStore;
    fn campaigns(&self) -> &dyn CampaignStore;
    fn participations(&self) -> &dyn ParticipationStore;
    fn coupons(&self) -> &dyn CouponStore;
    fn redemptions(&self) -> &dyn RedemptionStore;
    fn notifications(&self) -> &dyn NotificationStore;

    async fn drop(&self) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    sessions: Collection<Session>,
    brands: Collection<Brand>,
    creators: Collection<Creator>,
    campaigns: Collection<Campaign>,
    participations: Collection<Participation>,
    coupons: Collection<Coupon>,
    redemptions: Collection<Redemption>,
    notifications: Collection<Notification>,
    db: mongodb::Database,
}

impl MongoDatabase {
    pub async fn initialize(db: mongodb::Database) -> Result<MongoDatabase, Error> {
        auth::db::initialize(&db).await?;
        brand::db::initialize(&db).await?;
        creator::db::initialize(&db).await?;
        campaign::db::initialize(&db).await?;
        participation::db::initialize(&db).await?;
        coupon::db::initialize(&db).await?;
        redemption::db::initialize(&db).await?;
        notification::db::initialize(&db).await?;

        Ok(MongoDatabase {
            sessions: db.collection("sessions"),
            brands: db.collection("brands"),
            creators: db.collection("creators"),
            campaigns: db.collection("campaigns"),
            participations: db.collection("participations"),
            coupons: db.collection("coupons"),
            redemptions: db.collection("coupon_redemptions"),
            notifications: db.collection("notifications"),
            db,
        })
    }
}

#[async_trait]
impl Database for MongoDatabase {
    fn sessions(&self) -> &dyn SessionStore {
        &self.sessions
    }

    fn brands(&self) -> &dyn BrandStore {
        &self.brands
    }

    fn creators(&self) -> &dyn CreatorStore {
        &self.creators
    }

    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn participations(&self) -> &dyn ParticipationStore {
        &self.participations
    }

    fn coupons(&self) -> &dyn CouponStore {
        &self.coupons
    }

    fn redemptions(&self) -> &dyn RedemptionStore {
        &self.redemptions
    }

    fn notifications(&self) -> &dyn NotificationStore {
        &self.notifications
    }

    async fn drop(&self) -> Result<(), Error> {
        self.db.drop(None).await?;
        Ok(())
    }
}
