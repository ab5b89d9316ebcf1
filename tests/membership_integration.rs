//! Integration tests for the membership lifecycle and payments.
//!
//! Drives `ClubServices` over the in-memory store: registration, renewal,
//! the two-step exclusion, and payments settling periods and rentals.

use chrono::NaiveDate;

use sailing_club::adapters::InMemoryClubStore;
use sailing_club::application::{ClubServices, InitialMembership};
use sailing_club::domain::club::Season;
use sailing_club::domain::facility_rental::{FacilityName, FacilityType, RentalRequest};
use sailing_club::domain::foundation::{
    FacilityTypeId, MemberId, MembershipId, Money, PaymentId, RentedFacilityId, SeasonId,
};
use sailing_club::domain::membership::{
    EmailAddress, MembershipError, MembershipStatusKind, MembershipValidity, NewUser, PhoneNumber,
};
use sailing_club::domain::payment::{PaymentDetails, PaymentError, PaymentMethod};

const SEASON: SeasonId = SeasonId::new(2024);
const NEXT_SEASON: SeasonId = SeasonId::new(2025);
const LOCKER: FacilityTypeId = FacilityTypeId::new(1);

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn services() -> (InMemoryClubStore, ClubServices) {
    let store = InMemoryClubStore::new();
    store
        .insert_season(Season::new(SEASON, "2024", "Season 2024", date(2024, 1, 1), date(2024, 12, 31)).unwrap())
        .await;
    store
        .insert_season(
            Season::new(NEXT_SEASON, "2025", "Season 2025", date(2025, 1, 1), date(2025, 12, 31)).unwrap(),
        )
        .await;
    store
        .insert_facility_type(FacilityType {
            id: LOCKER,
            name: FacilityName::StandardLocker,
            description: "Changing room locker".to_string(),
            suggested_price: Money::from_units(40),
            has_boat: false,
        })
        .await;

    let services = ClubServices::new(store.repositories(), Money::from_units(130))
        .await
        .unwrap();
    (store, services)
}

fn new_user(email: &str, tax_code: &str) -> NewUser {
    NewUser {
        first_name: "Lucia".to_string(),
        last_name: "Marchetti".to_string(),
        birth_date: date(1979, 11, 3),
        email: EmailAddress::new(email).unwrap(),
        tax_code: tax_code.to_string(),
        addresses: vec![],
        phone_numbers: vec![PhoneNumber::new("+39", "3331234567").unwrap()],
    }
}

async fn member(services: &ClubServices) -> MemberId {
    let created = services
        .members
        .create_member(
            new_user("  Lucia.Marchetti@Club.IT ", "MRCLCU79S43H501X"),
            Some(InitialMembership {
                season_id: SEASON,
                price: Money::from_units(130),
            }),
        )
        .await
        .unwrap();
    MemberId::from(created.user.id)
}

fn cash(units: i64) -> PaymentDetails {
    PaymentDetails::new(Money::from_units(units), "eur", PaymentMethod::Cash, None).unwrap()
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn new_member_starts_active_with_the_fee_outstanding() {
    let (_store, services) = services().await;
    let id = member(&services).await;

    let details = services.members.get_member_by_id(id, Some(SEASON)).await.unwrap();
    assert_eq!(details.user.email.as_str(), "lucia.marchetti@club.it");

    let membership = details.current_membership().unwrap();
    assert_eq!(membership.kind(), MembershipStatusKind::Active);
    assert_eq!(membership.status.valid_from(), Some(date(2024, 1, 1)));
    assert_eq!(membership.payment.amount(), Money::from_units(130));
    assert!(!membership.payment.is_paid());

    let unpaid = services
        .members
        .get_members_who_did_not_pay_for_membership()
        .await
        .unwrap();
    assert_eq!(unpaid.iter().map(|m| m.id()).collect::<Vec<_>>(), vec![id]);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (_store, services) = services().await;
    member(&services).await;

    let err = services
        .members
        .create_member(new_user("lucia.marchetti@club.it", "OTHERTAXCODE0001"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MembershipError::AlreadyExists(_)));
}

#[tokio::test]
async fn unknown_member_and_season_are_not_found() {
    let (_store, services) = services().await;
    let id = member(&services).await;

    let err = services
        .members
        .get_member_by_id(MemberId::new(9_999), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MembershipError::MemberNotFound(_)));

    let err = services
        .members
        .add_membership(id, SeasonId::new(1990), Money::from_units(130))
        .await
        .unwrap_err();
    assert!(matches!(err, MembershipError::SeasonNotFound(s) if s == SeasonId::new(1990)));
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn renewal_extends_by_one_calendar_year() {
    let (_store, services) = services().await;
    let id = member(&services).await;

    let renewed = services
        .members
        .renew_membership(id, SEASON, NEXT_SEASON)
        .await
        .unwrap();
    assert_eq!(
        renewed.status.validity(),
        Some(MembershipValidity::new(date(2024, 12, 31), date(2025, 12, 31)))
    );
    assert_eq!(renewed.payment.amount(), Money::from_units(130));

    let stored = services.members.get_member_by_id(id, Some(NEXT_SEASON)).await.unwrap();
    assert_eq!(stored.current_membership(), Some(&renewed));
}

#[tokio::test]
async fn renewal_keeps_the_paid_previous_period() {
    let (_store, services) = services().await;
    let id = member(&services).await;
    let previous = services
        .members
        .get_member_by_id(id, Some(SEASON))
        .await
        .unwrap()
        .current_membership()
        .cloned()
        .unwrap();
    services
        .payments
        .create_payment_for_membership_period(previous.id, &cash(130))
        .await
        .unwrap();

    let renewed = services
        .members
        .renew_membership(id, SEASON, NEXT_SEASON)
        .await
        .unwrap();
    assert_ne!(renewed.id, previous.id);
    assert_eq!(renewed.number, previous.number);
    assert!(!renewed.payment.is_paid());

    let history = services.members.get_member_by_id(id, None).await.unwrap();
    assert_eq!(history.memberships.len(), 2);

    let kept = services.members.get_member_by_id(id, Some(SEASON)).await.unwrap();
    let kept = kept.current_membership().unwrap();
    assert_eq!(kept.id, previous.id);
    assert_eq!(kept.status.valid_until(), Some(date(2024, 12, 31)));
    assert!(kept.payment.is_paid());
    assert_eq!(kept.payment.amount(), Money::from_units(130));

    // The same period cannot be renewed a second time.
    let err = services
        .members
        .renew_membership(id, SEASON, NEXT_SEASON)
        .await
        .unwrap_err();
    assert_eq!(err, MembershipError::period_already_exists(id, NEXT_SEASON));
    let history = services.members.get_member_by_id(id, None).await.unwrap();
    assert_eq!(history.memberships.len(), 2);
}

#[tokio::test]
async fn lapsing_keeps_the_recorded_payment() {
    let (_store, services) = services().await;
    let id = member(&services).await;
    let membership_id = services
        .members
        .get_member_by_id(id, Some(SEASON))
        .await
        .unwrap()
        .current_membership()
        .map(|m| m.id)
        .unwrap();
    services
        .payments
        .create_payment_for_membership_period(membership_id, &cash(50))
        .await
        .unwrap();

    let unpaid = services.members.mark_membership_unpaid(id, SEASON).await.unwrap();
    assert_eq!(unpaid.kind(), MembershipStatusKind::Unpaid);

    let stored = services.members.get_member_by_id(id, Some(SEASON)).await.unwrap();
    let stored = stored.current_membership().unwrap();
    assert_eq!(stored.id, membership_id);
    assert!(stored.payment.is_paid());
    assert_eq!(stored.payment.amount(), Money::from_units(50));
}

#[tokio::test]
async fn exclusion_takes_two_steps_and_is_final() {
    let (_store, services) = services().await;
    let id = member(&services).await;

    let err = services
        .members
        .exclude_member(id, SEASON, date(2024, 6, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MembershipError::InvalidState { current: MembershipStatusKind::Active, .. }
    ));

    services.members.mark_membership_unpaid(id, SEASON).await.unwrap();
    services
        .members
        .deliberate_exclusion(id, SEASON, date(2024, 5, 20))
        .await
        .unwrap();
    let excluded = services
        .members
        .exclude_member(id, SEASON, date(2024, 6, 1))
        .await
        .unwrap();
    assert_eq!(excluded.kind(), MembershipStatusKind::Excluded);
    assert_eq!(excluded.status.decision_date(), Some(date(2024, 6, 1)));
    assert_eq!(excluded.status.valid_until(), Some(date(2024, 12, 31)));

    let err = services
        .members
        .renew_membership(id, SEASON, NEXT_SEASON)
        .await
        .unwrap_err();
    assert!(matches!(err, MembershipError::InvalidState { .. }));

    // The rejected renewal wrote nothing.
    let stored = services.members.get_member_by_id(id, Some(SEASON)).await.unwrap();
    assert_eq!(stored.current_membership(), Some(&excluded));
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn paying_the_fee_settles_the_period() {
    let (_store, services) = services().await;
    let id = member(&services).await;
    let membership_id = services
        .members
        .get_member_by_id(id, Some(SEASON))
        .await
        .unwrap()
        .current_membership()
        .map(|m| m.id)
        .unwrap();

    let payment_id = services
        .payments
        .create_payment_for_membership_period(membership_id, &cash(130))
        .await
        .unwrap();

    let unpaid = services
        .members
        .get_members_who_did_not_pay_for_membership()
        .await
        .unwrap();
    assert!(unpaid.is_empty());

    services.payments.delete_payment(payment_id).await.unwrap();
    let unpaid = services
        .members
        .get_members_who_did_not_pay_for_membership()
        .await
        .unwrap();
    assert_eq!(unpaid.len(), 1);
}

#[tokio::test]
async fn paying_a_rental_clears_the_services_debt() {
    let (store, services) = services().await;
    let id = member(&services).await;
    let locker = store.insert_facility("L-12", LOCKER).await.unwrap();

    let rental = services
        .rentals
        .rent_facility(RentalRequest {
            member_id: id,
            facility_id: locker.id,
            season_id: SEASON,
            price: Money::from_units(40),
            boat: None,
        })
        .await
        .unwrap();

    let debtors = services
        .members
        .get_members_who_did_not_pay_for_services()
        .await
        .unwrap();
    assert_eq!(debtors.len(), 1);
    assert!(debtors[0].has_unpaid_facilities);

    services
        .payments
        .create_payment_for_rented_facility(rental.id(), &cash(40))
        .await
        .unwrap();

    let debtors = services
        .members
        .get_members_who_did_not_pay_for_services()
        .await
        .unwrap();
    assert!(debtors.is_empty());

    let rented = services
        .rentals
        .get_facilities_rented_by_member(id, SEASON)
        .await
        .unwrap();
    assert!(rented[0].payment().is_paid());
}

#[tokio::test]
async fn payments_for_missing_targets_are_not_found() {
    let (_store, services) = services().await;

    let err = services
        .payments
        .create_payment_for_membership_period(MembershipId::new(404), &cash(130))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));

    let err = services
        .payments
        .create_payment_for_rented_facility(RentedFacilityId::new(404), &cash(40))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));

    let err = services
        .payments
        .update_payment(PaymentId::new(404), &cash(10))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));
}
