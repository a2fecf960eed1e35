use chrono::{Duration, Utc};

use crate::auth::Session;
use crate::brand::Brand;
use crate::campaign::{
    Campaign, CampaignRequirements, CampaignRules, CampaignStatus, ContentType, Platform,
};
use crate::coupon::{Coupon, CouponStatus};
use crate::creator::Creator;
use crate::database::Database;
use crate::error::Error;
use crate::participation::{Participation, ParticipationStatus};

pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    db.drop().await?;

    let brand_id = "USR-3E90B2C1-13A0-4F9B-9D4B-3A06B21C4F7D".parse().unwrap();
    let creator_id = "USR-A1B0D2F4-7C3E-49B8-8F2A-5D1C0E9B6A43".parse().unwrap();
    let campaign_id = "CMP-16E77539-8873-4C8A-BCA3-2036010474AD".parse().unwrap();
    let participation_id = "PTC-9C52F1B7-64D0-4A3E-B1E8-7F20C3A95D16".parse().unwrap();
    let coupon_id = "CUP-D24A8E60-31FB-4C57-A9D3-84B6E1F0C2A9".parse().unwrap();

    let now = Utc::now();

    let brand = Brand {
        id: brand_id,
        name: "Loja Azul".to_string(),
        logo_url: None,
        created_at: now,
    };

    let creator = Creator {
        id: creator_id,
        name: "Ana Criadora".to_string(),
        created_at: now,
    };

    // Fixed tokens so a local client can authenticate without a login flow.
    let brand_session = Session {
        token: "brand-demo-token".to_string(),
        user_id: brand_id,
        created_at: now,
    };
    let creator_session = Session {
        token: "creator-demo-token".to_string(),
        user_id: creator_id,
        created_at: now,
    };

    let campaign = Campaign {
        id: campaign_id,
        brand_id,
        title: "Verão com a Loja Azul".to_string(),
        description: "Divulgue a coleção de verão com seu código de desconto".to_string(),
        start_date: now,
        end_date: now + Duration::days(30),
        status: CampaignStatus::Active,
        budget: Some(500_000),
        objectives: vec!["awareness".to_string(), "sales".to_string()],
        rules: CampaignRules {
            min_followers: 1000,
            required_platforms: vec![Platform::Instagram, Platform::Tiktok],
            content_requirements: "Mostre o produto em uso".to_string(),
            hashtags: vec!["#lojaazul".to_string(), "#verao".to_string()],
        },
        requirements: CampaignRequirements {
            content_type: ContentType::Reel,
            min_posts: 2,
            use_coupon: true,
        },
        created_at: now,
        modified_at: now,
    };

    let participation = Participation {
        id: participation_id,
        campaign_id,
        creator_id,
        status: ParticipationStatus::Active,
        coupon_code: Some("VERADEMU".to_string()),
        earnings: 0,
        joined_at: now,
        modified_at: now,
    };

    let coupon = Coupon {
        id: coupon_id,
        code: "VERADEMU".to_string(),
        participation_id,
        value: 5000,
        status: CouponStatus::Active,
        used_at: None,
        used_by: None,
        created_at: now,
    };

    db.brands().insert_brand(&brand).await?;
    db.creators().insert_creator(&creator).await?;
    db.sessions().insert_session(&brand_session).await?;
    db.sessions().insert_session(&creator_session).await?;
    db.campaigns().insert_campaign(&campaign).await?;
    db.participations().insert_participation(&participation).await?;
    db.coupons().insert_coupon(&coupon).await?;

    Ok(())
}
