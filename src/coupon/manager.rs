use chrono::{DateTime, Utc};
use rand::Rng;

use crate::auth::UserId;
use crate::brand::Brand;
use crate::campaign::Campaign;
use crate::creator::Creator;
use crate::database::Database;
use crate::error::Error;
use crate::notification::manager::notify;
use crate::notification::{NotificationKind, NotificationMetadata};
use crate::participation::{Participation, ParticipationId, ParticipationStatus};
use crate::redemption::{Redemption, RedemptionId, RedemptionMetadata};

use super::{Coupon, CouponId, CouponStatus};

/// 32 unambiguous characters; no 0/O or 1/I since codes are read out loud
/// and typed in-store.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 8;

pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// What the caller gets back from a successful redemption.
#[derive(Clone, Debug)]
pub struct RedemptionConfirmation {
    pub id: RedemptionId,
    pub coupon_code: String,
    pub redeemed_at: DateTime<Utc>,
    pub value: i64,
}

/// Redeems a coupon on behalf of the authenticated brand `user_id`.
///
/// Steps 1-5 are pure validation and mutate nothing. The status-conditioned
/// update is the authoritative outcome: once it succeeds the operation
/// reports success even if the audit record or earnings credit fails
/// afterwards, because no compensating transaction exists and re-running the
/// redemption is rejected by the status gate anyway. Those late failures are
/// logged for reconciliation instead.
#[tracing::instrument(skip(db))]
pub async fn redeem_coupon(
    db: &dyn Database,
    user_id: UserId,
    code: Option<String>,
    location: Option<String>,
    value: Option<i64>,
) -> Result<RedemptionConfirmation, Error> {
    // Role check comes first so a non-brand caller never learns whether a
    // code exists.
    let brand = db
        .brands()
        .fetch_brand_by_id(user_id)
        .await?
        .ok_or(Error::OnlyBrandsMayRedeemCoupons { user_id })?;

    let code = code
        .filter(|code| !code.is_empty())
        .ok_or(Error::MissingCouponCode)?;

    // Earnings only ever move upward; a non-positive value must never reach
    // the credit or the audit row.
    if value.map_or(false, |value| value <= 0) {
        return Err(Error::NonPositiveCouponValue);
    }

    let coupon = db
        .coupons()
        .fetch_active_coupon_by_code(&code)
        .await?
        .ok_or(Error::CouponNotFoundOrExpired { code: code.clone() })?;

    let participation = fetch_owning_participation(db, &coupon).await?;
    let campaign = fetch_owning_campaign(db, &participation).await?;

    if campaign.brand_id != brand.id {
        return Err(Error::CouponNotOwnedByBrand {
            coupon_id: coupon.id,
            brand_id: brand.id,
        });
    }

    let effective_value = value.unwrap_or(coupon.value);

    let coupon = db
        .coupons()
        .update_coupon_used(coupon, brand.name.clone())
        .await?;

    let redemption = Redemption {
        id: RedemptionId::new(),
        coupon_id: coupon.id,
        location: location.unwrap_or_else(|| brand.name.clone()),
        value: effective_value,
        metadata: RedemptionMetadata {
            redeemed_by: brand.id,
            redeemed_by_name: brand.name.clone(),
        },
        redeemed_at: Utc::now(),
    };

    if let Err(err) = db.redemptions().insert_redemption(&redemption).await {
        tracing::error!(
            redemption_id = %redemption.id,
            coupon_id = %coupon.id,
            error = %err,
            "coupon marked used but the audit record failed; reconcile manually",
        );
    }

    // Earnings are credited only when the caller supplied an explicit value;
    // redeeming at the coupon's face value leaves earnings untouched.
    if let Some(value) = value {
        if let Err(err) = db
            .participations()
            .credit_earnings(participation.id, value)
            .await
        {
            tracing::error!(
                participation_id = %participation.id,
                coupon_id = %coupon.id,
                value,
                error = %err,
                "coupon marked used but the earnings credit failed; reconcile manually",
            );
        }
    }

    notify(
        db,
        participation.creator_id,
        "Cupom resgatado".to_string(),
        format!("Seu cupom \"{}\" foi resgatado por {}.", code, brand.name),
        NotificationKind::CouponRedeemed,
        NotificationMetadata {
            coupon_id: Some(coupon.id),
            brand_id: Some(brand.id),
            brand_name: Some(brand.name.clone()),
            value: Some(effective_value),
            ..NotificationMetadata::default()
        },
    )
    .await;

    Ok(RedemptionConfirmation {
        id: redemption.id,
        coupon_code: coupon.code,
        redeemed_at: redemption.redeemed_at,
        value: effective_value,
    })
}

/// An active coupon resolved with its full ownership chain, for in-store
/// validation without redeeming.
#[derive(Clone, Debug)]
pub struct ValidatedCoupon {
    pub coupon: Coupon,
    pub campaign: Campaign,
    pub brand: Brand,
    pub creator: Creator,
}

#[tracing::instrument(skip(db))]
pub async fn validate_coupon(
    db: &dyn Database,
    code: Option<String>,
) -> Result<ValidatedCoupon, Error> {
    let code = code
        .filter(|code| !code.is_empty())
        .ok_or(Error::MissingCouponCode)?;

    let coupon = db
        .coupons()
        .fetch_active_coupon_by_code(&code)
        .await?
        .ok_or(Error::CouponNotFoundOrExpired { code })?;

    let participation = fetch_owning_participation(db, &coupon).await?;
    let campaign = fetch_owning_campaign(db, &participation).await?;

    let brand = db
        .brands()
        .fetch_brand_by_id(campaign.brand_id)
        .await?
        .ok_or_else(|| {
            Error::ExistentialState(format!(
                "campaign {} references missing brand {}",
                campaign.id, campaign.brand_id
            ))
        })?;

    let creator = db
        .creators()
        .fetch_creator_by_id(participation.creator_id)
        .await?
        .ok_or_else(|| {
            Error::ExistentialState(format!(
                "participation {} references missing creator {}",
                participation.id, participation.creator_id
            ))
        })?;

    Ok(ValidatedCoupon {
        coupon,
        campaign,
        brand,
        creator,
    })
}

/// Issues a coupon for an approved participation of one of the caller's
/// campaigns. The code is reserved on the participation first (conditioned
/// on no code being assigned) so two concurrent issues cannot both stick.
#[tracing::instrument(skip(db))]
pub async fn issue_coupon(
    db: &dyn Database,
    user_id: UserId,
    participation_id: ParticipationId,
    value: i64,
) -> Result<Coupon, Error> {
    if value <= 0 {
        return Err(Error::NonPositiveCouponValue);
    }

    let participation = db
        .participations()
        .fetch_participation_by_id(participation_id)
        .await?
        .ok_or(Error::ParticipationDoesNotExist { participation_id })?;

    let campaign = fetch_owning_campaign(db, &participation).await?;

    if campaign.brand_id != user_id {
        return Err(Error::CampaignNotOwnedByBrand {
            campaign_id: campaign.id,
            brand_id: user_id,
        });
    }

    if participation.status != ParticipationStatus::Active {
        return Err(Error::CouponRequiresActiveParticipation {
            participation_id,
            status: participation.status,
        });
    }

    let code = generate_code();

    let participation = db
        .participations()
        .update_participation_coupon_code(participation, code.clone())
        .await?;

    let coupon = Coupon {
        id: CouponId::new(),
        code,
        participation_id: participation.id,
        value,
        status: CouponStatus::Active,
        used_at: None,
        used_by: None,
        created_at: Utc::now(),
    };

    db.coupons().insert_coupon(&coupon).await?;

    notify(
        db,
        participation.creator_id,
        "Cupom emitido".to_string(),
        format!(
            "Você recebeu o cupom \"{}\" da campanha \"{}\".",
            coupon.code, campaign.title
        ),
        NotificationKind::CouponIssued,
        NotificationMetadata {
            campaign_id: Some(campaign.id),
            participation_id: Some(participation.id),
            coupon_id: Some(coupon.id),
            ..NotificationMetadata::default()
        },
    )
    .await;

    Ok(coupon)
}

async fn fetch_owning_participation(
    db: &dyn Database,
    coupon: &Coupon,
) -> Result<Participation, Error> {
    db.participations()
        .fetch_participation_by_id(coupon.participation_id)
        .await?
        .ok_or_else(|| {
            Error::ExistentialState(format!(
                "coupon {} references missing participation {}",
                coupon.id, coupon.participation_id
            ))
        })
}

async fn fetch_owning_campaign(
    db: &dyn Database,
    participation: &Participation,
) -> Result<Campaign, Error> {
    db.campaigns()
        .fetch_campaign_by_id(participation.campaign_id)
        .await?
        .ok_or_else(|| {
            Error::ExistentialState(format!(
                "participation {} references missing campaign {}",
                participation.id, participation.campaign_id
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test::{mocks, MockDatabase};
    use std::sync::{Arc, Mutex};

    struct Fixture {
        brand_id: UserId,
        coupon: Coupon,
    }

    /// A brand, its active campaign, an approved participation, and an
    /// active coupon wired together.
    fn redeemable_coupon(db: &mut MockDatabase) -> Fixture {
        let brand = mocks::brand();
        let brand_id = brand.id;
        let campaign = mocks::active_campaign_for(brand_id);
        let participation = mocks::participation(campaign.id, UserId::new());
        let coupon = mocks::coupon(participation.id);

        db.brands.on_fetch_brand_by_id = Box::new(move |_| Ok(Some(brand.clone())));
        db.campaigns.on_fetch_campaign_by_id = Box::new(move |_| Ok(Some(campaign.clone())));
        db.participations.on_fetch_participation_by_id =
            Box::new(move |_| Ok(Some(participation.clone())));
        let lookup = coupon.clone();
        db.coupons.on_fetch_active_coupon_by_code = Box::new(move |code| {
            if code == lookup.code {
                Ok(Some(lookup.clone()))
            } else {
                Ok(None)
            }
        });

        Fixture { brand_id, coupon }
    }

    fn mark_used(mut coupon: Coupon, used_by: String) -> Result<Coupon, Error> {
        coupon.status = CouponStatus::Used;
        coupon.used_at = Some(Utc::now());
        coupon.used_by = Some(used_by);
        Ok(coupon)
    }

    #[tokio::test]
    async fn redeeming_active_coupon_succeeds_once() {
        let mut db = MockDatabase::new();
        let fixture = redeemable_coupon(&mut db);
        let transitions = Arc::new(Mutex::new(0));
        let transitions_clone = Arc::clone(&transitions);
        db.coupons.on_update_coupon_used = Box::new(move |coupon, used_by| {
            *transitions_clone.lock().unwrap() += 1;
            mark_used(coupon, used_by)
        });
        let audit_rows = Arc::new(Mutex::new(0));
        let audit_rows_clone = Arc::clone(&audit_rows);
        db.redemptions.on_insert_redemption = Box::new(move |redemption| {
            *audit_rows_clone.lock().unwrap() += 1;
            assert_eq!(redemption.location, "Loja Azul".to_string());
            Ok(())
        });
        db.notifications.on_insert_notification = Box::new(|_| Ok(()));

        let confirmation = redeem_coupon(
            &db,
            fixture.brand_id,
            Some(fixture.coupon.code.clone()),
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(confirmation.coupon_code, fixture.coupon.code);
        assert_eq!(*transitions.lock().unwrap(), 1);
        assert_eq!(*audit_rows.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_code_is_rejected_before_any_lookup() {
        let mut db = MockDatabase::new();
        let brand = mocks::brand();
        let brand_id = brand.id;
        db.brands.on_fetch_brand_by_id = Box::new(move |_| Ok(Some(brand.clone())));

        let missing = redeem_coupon(&db, brand_id, None, None, None).await;
        let empty = redeem_coupon(&db, brand_id, Some(String::new()), None, None).await;

        assert_eq!(missing.unwrap_err(), Error::MissingCouponCode);
        assert_eq!(empty.unwrap_err(), Error::MissingCouponCode);
    }

    #[tokio::test]
    async fn non_brand_caller_cannot_probe_codes() {
        let mut db = MockDatabase::new();
        db.brands.on_fetch_brand_by_id = Box::new(|_| Ok(None));
        let user_id = UserId::new();

        // The coupon store hooks are left unset; any lookup would panic.
        let result = redeem_coupon(&db, user_id, Some("VALIDCDE".to_string()), None, None).await;

        assert_eq!(
            result.unwrap_err(),
            Error::OnlyBrandsMayRedeemCoupons { user_id }
        );
    }

    #[tokio::test]
    async fn unknown_and_used_codes_are_indistinguishable() {
        let mut db = MockDatabase::new();
        let brand = mocks::brand();
        let brand_id = brand.id;
        db.brands.on_fetch_brand_by_id = Box::new(move |_| Ok(Some(brand.clone())));
        // The status filter makes a used coupon look exactly like a missing
        // one at lookup time.
        db.coupons.on_fetch_active_coupon_by_code = Box::new(|_| Ok(None));

        let unknown =
            redeem_coupon(&db, brand_id, Some("NEVBORNX".to_string()), None, None).await;
        let used = redeem_coupon(&db, brand_id, Some("NEVBORNX".to_string()), None, None).await;

        assert_eq!(
            unknown.unwrap_err(),
            Error::CouponNotFoundOrExpired {
                code: "NEVBORNX".to_string()
            }
        );
        assert_eq!(
            used.unwrap_err(),
            Error::CouponNotFoundOrExpired {
                code: "NEVBORNX".to_string()
            }
        );
    }

    #[tokio::test]
    async fn non_positive_values_never_reach_the_credit() {
        let mut db = MockDatabase::new();
        let fixture = redeemable_coupon(&mut db);
        // Transition, audit, and credit hooks stay unset; any mutation would
        // panic. Earnings can therefore only shrink if this returns Ok.
        let negative = redeem_coupon(
            &db,
            fixture.brand_id,
            Some(fixture.coupon.code.clone()),
            None,
            Some(-30),
        )
        .await;
        let zero = redeem_coupon(
            &db,
            fixture.brand_id,
            Some(fixture.coupon.code.clone()),
            None,
            Some(0),
        )
        .await;

        assert_eq!(negative.unwrap_err(), Error::NonPositiveCouponValue);
        assert_eq!(zero.unwrap_err(), Error::NonPositiveCouponValue);
    }

    #[tokio::test]
    async fn issue_coupon_rejects_non_positive_value() {
        // The value gate fires before any lookup; all hooks stay unset.
        let db = MockDatabase::new();

        let negative = issue_coupon(&db, UserId::new(), ParticipationId::new(), -5000).await;
        let zero = issue_coupon(&db, UserId::new(), ParticipationId::new(), 0).await;

        assert_eq!(negative.unwrap_err(), Error::NonPositiveCouponValue);
        assert_eq!(zero.unwrap_err(), Error::NonPositiveCouponValue);
    }

    #[tokio::test]
    async fn cross_brand_redemption_is_rejected_without_mutation() {
        let mut db = MockDatabase::new();
        let fixture = redeemable_coupon(&mut db);
        let intruder = mocks::brand();
        let intruder_id = intruder.id;
        assert_ne!(intruder_id, fixture.brand_id);
        db.brands.on_fetch_brand_by_id = Box::new(move |_| Ok(Some(intruder.clone())));
        // Mutation hooks stay unset: touching the coupon would panic.

        let result = redeem_coupon(
            &db,
            intruder_id,
            Some(fixture.coupon.code.clone()),
            None,
            None,
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::CouponNotOwnedByBrand {
                coupon_id: fixture.coupon.id,
                brand_id: intruder_id,
            }
        );
    }

    #[tokio::test]
    async fn losing_the_transition_race_surfaces_conflict() {
        let mut db = MockDatabase::new();
        let fixture = redeemable_coupon(&mut db);
        db.coupons.on_update_coupon_used = Box::new(|coupon, _| {
            Err(Error::CouponAlreadyRedeemed {
                coupon_id: coupon.id,
            })
        });
        // No audit row and no credit: those hooks stay unset and would panic.

        let result = redeem_coupon(
            &db,
            fixture.brand_id,
            Some(fixture.coupon.code.clone()),
            None,
            Some(2000),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::CouponAlreadyRedeemed {
                coupon_id: fixture.coupon.id,
            }
        );
    }

    #[tokio::test]
    async fn explicit_values_accumulate_earnings() {
        let mut db = MockDatabase::new();
        let fixture = redeemable_coupon(&mut db);
        db.coupons.on_update_coupon_used = Box::new(mark_used);
        db.redemptions.on_insert_redemption = Box::new(|_| Ok(()));
        db.notifications.on_insert_notification = Box::new(|_| Ok(()));
        let earnings = Arc::new(Mutex::new(100));
        let earnings_clone = Arc::clone(&earnings);
        db.participations.on_credit_earnings = Box::new(move |_, amount| {
            *earnings_clone.lock().unwrap() += amount;
            Ok(())
        });

        redeem_coupon(
            &db,
            fixture.brand_id,
            Some(fixture.coupon.code.clone()),
            None,
            Some(20),
        )
        .await
        .unwrap();
        redeem_coupon(
            &db,
            fixture.brand_id,
            Some(fixture.coupon.code.clone()),
            None,
            Some(30),
        )
        .await
        .unwrap();

        assert_eq!(*earnings.lock().unwrap(), 150);
    }

    #[tokio::test]
    async fn default_value_fills_audit_row_but_skips_earnings() {
        let mut db = MockDatabase::new();
        let fixture = redeemable_coupon(&mut db);
        let coupon_value = fixture.coupon.value;
        db.coupons.on_update_coupon_used = Box::new(mark_used);
        db.redemptions.on_insert_redemption = Box::new(move |redemption| {
            assert_eq!(redemption.value, coupon_value);
            Ok(())
        });
        db.notifications.on_insert_notification = Box::new(|_| Ok(()));
        // on_credit_earnings stays unset: a credit would panic.

        let confirmation = redeem_coupon(
            &db,
            fixture.brand_id,
            Some(fixture.coupon.code.clone()),
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(confirmation.value, coupon_value);
    }

    #[tokio::test]
    async fn audit_failure_after_transition_still_reports_success() {
        let mut db = MockDatabase::new();
        let fixture = redeemable_coupon(&mut db);
        db.coupons.on_update_coupon_used = Box::new(mark_used);
        db.redemptions.on_insert_redemption =
            Box::new(|_| Err(Error::ExistentialState("audit store down".to_string())));
        db.notifications.on_insert_notification = Box::new(|_| Ok(()));

        let confirmation = redeem_coupon(
            &db,
            fixture.brand_id,
            Some(fixture.coupon.code.clone()),
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(confirmation.coupon_code, fixture.coupon.code);
    }

    #[tokio::test]
    async fn issued_codes_use_the_unambiguous_alphabet() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)), "{}", code);
        }
    }

    #[tokio::test]
    async fn issue_coupon_reserves_code_before_insert() {
        let mut db = MockDatabase::new();
        let campaign = mocks::active_campaign();
        let brand_id = campaign.brand_id;
        let participation = mocks::participation(campaign.id, UserId::new());
        let participation_id = participation.id;
        db.campaigns.on_fetch_campaign_by_id = Box::new(move |_| Ok(Some(campaign.clone())));
        db.participations.on_fetch_participation_by_id =
            Box::new(move |_| Ok(Some(participation.clone())));
        let reserved = Arc::new(Mutex::new(None));
        let reserved_clone = Arc::clone(&reserved);
        db.participations.on_update_participation_coupon_code =
            Box::new(move |mut participation, code| {
                *reserved_clone.lock().unwrap() = Some(code.clone());
                participation.coupon_code = Some(code);
                Ok(participation)
            });
        db.coupons.on_insert_coupon = Box::new(|coupon| {
            assert_eq!(coupon.status, CouponStatus::Active);
            assert_eq!(coupon.used_at, None);
            Ok(())
        });
        db.notifications.on_insert_notification = Box::new(|_| Ok(()));

        let coupon = issue_coupon(&db, brand_id, participation_id, 5000)
            .await
            .unwrap();

        assert_eq!(reserved.lock().unwrap().as_deref(), Some(coupon.code.as_str()));
        assert_eq!(coupon.value, 5000);
    }

    #[tokio::test]
    async fn issue_coupon_rejects_pending_participation() {
        let mut db = MockDatabase::new();
        let campaign = mocks::active_campaign();
        let brand_id = campaign.brand_id;
        let mut participation = mocks::participation(campaign.id, UserId::new());
        participation.status = ParticipationStatus::Pending;
        let participation_id = participation.id;
        db.campaigns.on_fetch_campaign_by_id = Box::new(move |_| Ok(Some(campaign.clone())));
        db.participations.on_fetch_participation_by_id =
            Box::new(move |_| Ok(Some(participation.clone())));

        let result = issue_coupon(&db, brand_id, participation_id, 5000).await;

        assert_eq!(
            result.unwrap_err(),
            Error::CouponRequiresActiveParticipation {
                participation_id,
                status: ParticipationStatus::Pending,
            }
        );
    }

    #[tokio::test]
    async fn validate_resolves_the_full_ownership_chain() {
        let mut db = MockDatabase::new();
        let brand = mocks::brand();
        let creator = mocks::creator();
        let campaign = mocks::active_campaign_for(brand.id);
        let participation = mocks::participation(campaign.id, creator.id);
        let coupon = mocks::coupon(participation.id);
        let code = coupon.code.clone();
        let campaign_title = campaign.title.clone();
        db.brands.on_fetch_brand_by_id = Box::new(move |_| Ok(Some(brand.clone())));
        db.creators.on_fetch_creator_by_id = Box::new(move |_| Ok(Some(creator.clone())));
        db.campaigns.on_fetch_campaign_by_id = Box::new(move |_| Ok(Some(campaign.clone())));
        db.participations.on_fetch_participation_by_id =
            Box::new(move |_| Ok(Some(participation.clone())));
        db.coupons.on_fetch_active_coupon_by_code = Box::new(move |_| Ok(Some(coupon.clone())));

        let validated = validate_coupon(&db, Some(code.clone())).await.unwrap();

        assert_eq!(validated.coupon.code, code);
        assert_eq!(validated.campaign.title, campaign_title);
        assert_eq!(validated.coupon.status, CouponStatus::Active);
    }
}
