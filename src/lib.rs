use actix_web::web::{self, Data, FormConfig, JsonConfig, PathConfig, QueryConfig};
use actix_web::{App, HttpServer, ResponseError};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

mod auth;
mod brand;
mod campaign;
mod coupon;
mod creator;
mod database;
mod error;
mod notification;
mod participation;
mod redemption;
mod seed;
mod typedid;
mod utils;

pub use crate::campaign::endpoints::{CampaignBody, CreateCampaignBody};
pub use crate::coupon::endpoints::{
    CouponBody, IssueCouponBody, RedeemCouponBody, RedeemCouponResponse, RedemptionBody,
    ValidateCouponBody, ValidateCouponResponse,
};
pub use crate::error::Error;
pub use crate::notification::endpoints::NotificationBody;
pub use crate::participation::endpoints::ParticipationBody;

use crate::database::{Database, MongoDatabase};

pub fn run(seed_database: bool) -> Result<(), Error> {
    actix_web::rt::System::new().block_on(serve(seed_database))
}

async fn serve(seed_database: bool) -> Result<(), Error> {
    let uri = std::env::var("CRIACORE_MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let bind_addr =
        std::env::var("CRIACORE_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    info!("connecting to db: {}", uri);
    let db = Client::with_uri_str(&uri).await?.database("criacore");
    let db = MongoDatabase::initialize(db).await?;

    if seed_database {
        seed::seed(&db).await?;
    }

    info!("listening on: {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(JsonConfig::default().error_handler(|err, _req| {
                // format json errors with custom format
                Error::InvalidJson(err).into()
            }))
            .app_data(PathConfig::default().error_handler(|err, _req| {
                // format path errors with custom format
                Error::InvalidPath(err).into()
            }))
            .app_data(FormConfig::default().error_handler(|err, _req| {
                // format form errors with custom format
                Error::InvalidForm(err).into()
            }))
            .app_data(QueryConfig::default().error_handler(|err, _req| {
                // format query errors with custom format
                Error::InvalidQuery(err).into()
            }))
            .app_data(Data::new(Box::new(db.clone()) as Box<dyn Database>))
            .wrap(TracingLogger::default())
            .service(campaign::endpoints::create_campaign)
            .service(campaign::endpoints::get_campaigns)
            .service(campaign::endpoints::get_campaign_by_id)
            .service(campaign::endpoints::publish_campaign)
            .service(campaign::endpoints::join_campaign)
            .service(campaign::endpoints::get_participations_in_campaign)
            .service(participation::endpoints::approve_participation)
            .service(coupon::endpoints::issue_coupon)
            .service(coupon::endpoints::redeem_coupon)
            .service(coupon::endpoints::validate_coupon)
            .service(notification::endpoints::get_notifications)
            .service(notification::endpoints::mark_notification_read)
            .default_service(web::to(|| async { Error::PathDoesNotExist.error_response() }))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
