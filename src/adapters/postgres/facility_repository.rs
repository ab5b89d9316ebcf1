//! PostgreSQL implementation of FacilityRepository.
//!
//! Renting inserts the rental, its boat and the boat's insurance in one
//! transaction. The partial unique index `rented_facilities_active_facility_key`
//! enforces a single active rental per facility and season, so two concurrent
//! requests for the same facility cannot both commit.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::{database_error, violates, PaymentColumns, PAYMENT_SELECT};
use crate::domain::facility_rental::{
    BoatInfo, BoatInsurance, Facility, FacilityName, FacilityTenant, FacilityType,
    FacilityWithStatus, InsuranceInfo, PricingRule, RentalDetails, RentalRequest, RentalValidity,
    RentedFacility,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, FacilityId, FacilityTypeId, MemberId, Money, PricingRuleId,
    RentedFacilityId, SeasonId,
};
use crate::ports::FacilityRepository;

const FACILITY_SELECT: &str = "f.id AS facility_id, f.identifier, \
     t.id AS facility_type_id, t.name AS facility_type_name, \
     t.description AS facility_type_description, t.suggested_price_cents, t.has_boat";

/// PostgreSQL implementation of the FacilityRepository port.
pub struct PostgresFacilityRepository {
    pool: PgPool,
}

impl PostgresFacilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Rows
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
struct FacilityTypeRow {
    id: i64,
    name: String,
    description: String,
    suggested_price_cents: i64,
    has_boat: bool,
}

impl From<FacilityTypeRow> for FacilityType {
    fn from(row: FacilityTypeRow) -> Self {
        FacilityType {
            id: FacilityTypeId::new(row.id),
            name: FacilityName::parse(&row.name),
            description: row.description,
            suggested_price: Money::from_cents(row.suggested_price_cents),
            has_boat: row.has_boat,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FacilityRow {
    facility_id: i64,
    identifier: String,
    facility_type_id: i64,
    facility_type_name: String,
    facility_type_description: String,
    suggested_price_cents: i64,
    has_boat: bool,
}

impl From<FacilityRow> for Facility {
    fn from(row: FacilityRow) -> Self {
        Facility {
            id: FacilityId::new(row.facility_id),
            identifier: row.identifier,
            facility_type: FacilityType::from(FacilityTypeRow {
                id: row.facility_type_id,
                name: row.facility_type_name,
                description: row.facility_type_description,
                suggested_price_cents: row.suggested_price_cents,
                has_boat: row.has_boat,
            }),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FacilityWithStatusRow {
    #[sqlx(flatten)]
    facility: FacilityRow,
    tenant_member_id: Option<i64>,
    tenant_first_name: Option<String>,
    tenant_last_name: Option<String>,
    tenant_expires_at: Option<NaiveDate>,
}

impl From<FacilityWithStatusRow> for FacilityWithStatus {
    fn from(row: FacilityWithStatusRow) -> Self {
        let rented_by = match (row.tenant_member_id, row.tenant_expires_at) {
            (Some(member_id), Some(expires_at)) => Some(FacilityTenant {
                member_id: MemberId::new(member_id),
                first_name: row.tenant_first_name.unwrap_or_default(),
                last_name: row.tenant_last_name.unwrap_or_default(),
                expires_at,
            }),
            _ => None,
        };
        FacilityWithStatus {
            facility: Facility::from(row.facility),
            rented_by,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RentedFacilityRow {
    rented_facility_id: i64,
    member_id: i64,
    valid_from: NaiveDate,
    valid_until: NaiveDate,
    price_cents: i64,
    #[sqlx(flatten)]
    facility: FacilityRow,
    boat_name: Option<String>,
    boat_length_meters: Option<f64>,
    boat_width_meters: Option<f64>,
    insurance_provider_name: Option<String>,
    insurance_policy_number: Option<String>,
    insurance_expires_on: Option<NaiveDate>,
    #[sqlx(flatten)]
    payment: PaymentColumns,
}

impl TryFrom<RentedFacilityRow> for RentedFacility {
    type Error = DomainError;

    fn try_from(row: RentedFacilityRow) -> Result<Self, Self::Error> {
        let insurance = match (row.insurance_provider_name, row.insurance_policy_number) {
            (Some(provider_name), Some(policy_number)) => InsuranceInfo::Insured(BoatInsurance {
                provider_name,
                policy_number,
                expires_on: row.insurance_expires_on,
            }),
            _ => InsuranceInfo::Uninsured,
        };
        let boat = match (row.boat_name, row.boat_length_meters, row.boat_width_meters) {
            (Some(name), Some(length), Some(width)) => Some(
                BoatInfo::new(&name, length, width, insurance).map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Invalid stored boat: {}", e),
                    )
                })?,
            ),
            _ => None,
        };

        let price = Money::from_cents(row.price_cents);
        let details = RentalDetails {
            id: RentedFacilityId::new(row.rented_facility_id),
            member_id: MemberId::new(row.member_id),
            facility: Facility::from(row.facility),
            validity: RentalValidity {
                from: row.valid_from,
                to: row.valid_until,
            },
            price,
            payment: row.payment.into_payment(price, None),
        };
        Ok(RentedFacility::new(details, boat))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PricingRuleRow {
    id: i64,
    facility_type_id: i64,
    required_facility_type_id: i64,
    special_price_cents: i64,
    description: String,
    active: bool,
}

impl From<PricingRuleRow> for PricingRule {
    fn from(row: PricingRuleRow) -> Self {
        PricingRule {
            id: PricingRuleId::new(row.id),
            facility_type_id: FacilityTypeId::new(row.facility_type_id),
            required_facility_type_id: FacilityTypeId::new(row.required_facility_type_id),
            special_price: Money::from_cents(row.special_price_cents),
            description: row.description,
            active: row.active,
        }
    }
}

/// Select for rentals with their facility, boat, insurance and payment.
fn rented_facility_query(filter: &str) -> String {
    format!(
        "SELECT rf.id AS rented_facility_id, rf.member_id, rf.valid_from, rf.valid_until, \
                rf.price_cents, {}, \
                b.name AS boat_name, b.length_meters AS boat_length_meters, \
                b.width_meters AS boat_width_meters, \
                i.provider_name AS insurance_provider_name, \
                i.policy_number AS insurance_policy_number, \
                i.expires_on AS insurance_expires_on, \
                {} \
         FROM rented_facilities rf \
         JOIN facilities f ON f.id = rf.facility_id \
         JOIN facility_types t ON t.id = f.facility_type_id \
         LEFT JOIN boats b ON b.rented_facility_id = rf.id \
         LEFT JOIN boat_insurances i ON i.boat_id = b.id \
         LEFT JOIN payments p ON p.rented_facility_id = rf.id \
         {}",
        FACILITY_SELECT, PAYMENT_SELECT, filter
    )
}

fn rent_error(request: &RentalRequest) -> impl FnOnce(sqlx::Error) -> DomainError {
    let facility_id = request.facility_id;
    let member_id = request.member_id;
    move |e| {
        if violates(&e, "rented_facilities_active_facility_key") {
            DomainError::new(
                ErrorCode::FacilityAlreadyRented,
                format!("Facility {} is already rented", facility_id),
            )
            .with_detail("facility_id", facility_id.to_string())
        } else if violates(&e, "rented_facilities_facility_id_fkey") {
            DomainError::new(
                ErrorCode::FacilityNotFound,
                format!("Facility not found: {}", facility_id),
            )
            .with_detail("facility_id", facility_id.to_string())
        } else if violates(&e, "rented_facilities_member_id_fkey") {
            DomainError::new(
                ErrorCode::MemberNotFound,
                format!("Member not found: {}", member_id),
            )
            .with_detail("member_id", member_id.to_string())
        } else {
            database_error("insert rental")(e)
        }
    }
}

#[async_trait]
impl FacilityRepository for PostgresFacilityRepository {
    async fn get_facilities_catalog(&self) -> Result<Vec<FacilityType>, DomainError> {
        let rows: Vec<FacilityTypeRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, suggested_price_cents, has_boat
            FROM facility_types
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("load facility catalog"))?;

        Ok(rows.into_iter().map(FacilityType::from).collect())
    }

    async fn get_facilities_by_type(
        &self,
        facility_type_id: FacilityTypeId,
        season_id: SeasonId,
    ) -> Result<Vec<FacilityWithStatus>, DomainError> {
        let sql = format!(
            "SELECT {}, \
                    rf.member_id AS tenant_member_id, \
                    u.first_name AS tenant_first_name, \
                    u.last_name AS tenant_last_name, \
                    rf.valid_until AS tenant_expires_at \
             FROM facilities f \
             JOIN facility_types t ON t.id = f.facility_type_id \
             LEFT JOIN rented_facilities rf \
                    ON rf.facility_id = f.id AND rf.season_id = $2 AND rf.freed_at IS NULL \
             LEFT JOIN users u ON u.id = rf.member_id \
             WHERE f.facility_type_id = $1 \
             ORDER BY f.identifier",
            FACILITY_SELECT
        );
        let rows: Vec<FacilityWithStatusRow> = sqlx::query_as(&sql)
            .bind(facility_type_id.value())
            .bind(season_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(database_error("load facilities"))?;

        Ok(rows.into_iter().map(FacilityWithStatus::from).collect())
    }

    async fn get_facilities_rented_by_member(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Vec<RentedFacility>, DomainError> {
        let sql = rented_facility_query(
            "WHERE rf.member_id = $1 AND rf.season_id = $2 AND rf.freed_at IS NULL ORDER BY rf.id",
        );
        let rows: Vec<RentedFacilityRow> = sqlx::query_as(&sql)
            .bind(member_id.value())
            .bind(season_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(database_error("load rented facilities"))?;

        rows.into_iter().map(RentedFacility::try_from).collect()
    }

    async fn get_pricing_rules(&self) -> Result<Vec<PricingRule>, DomainError> {
        let rows: Vec<PricingRuleRow> = sqlx::query_as(
            r#"
            SELECT id, facility_type_id, required_facility_type_id, special_price_cents,
                   description, active
            FROM pricing_rules
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("load pricing rules"))?;

        Ok(rows.into_iter().map(PricingRule::from).collect())
    }

    async fn rent_facility(&self, request: &RentalRequest) -> Result<RentedFacility, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("start transaction"))?;

        let season: Option<(NaiveDate, NaiveDate)> =
            sqlx::query_as("SELECT starts_at, ends_at FROM seasons WHERE id = $1")
                .bind(request.season_id.value())
                .fetch_optional(&mut *tx)
                .await
                .map_err(database_error("find season"))?;
        let (valid_from, valid_until) = season.ok_or_else(|| {
            DomainError::new(
                ErrorCode::SeasonNotFound,
                format!("Season not found: {}", request.season_id),
            )
            .with_detail("season_id", request.season_id.to_string())
        })?;

        let rented_facility_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO rented_facilities (
                facility_id, member_id, season_id, valid_from, valid_until, price_cents
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(request.facility_id.value())
        .bind(request.member_id.value())
        .bind(request.season_id.value())
        .bind(valid_from)
        .bind(valid_until)
        .bind(request.price.cents())
        .fetch_one(&mut *tx)
        .await
        .map_err(rent_error(request))?;

        if let Some(boat) = &request.boat {
            let boat_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO boats (rented_facility_id, name, length_meters, width_meters)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(rented_facility_id)
            .bind(boat.name())
            .bind(boat.length_meters())
            .bind(boat.width_meters())
            .fetch_one(&mut *tx)
            .await
            .map_err(database_error("insert boat"))?;

            if let Some(policy) = boat.insurance().policy() {
                sqlx::query(
                    r#"
                    INSERT INTO boat_insurances (boat_id, provider_name, policy_number, expires_on)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(boat_id)
                .bind(&policy.provider_name)
                .bind(&policy.policy_number)
                .bind(policy.expires_on)
                .execute(&mut *tx)
                .await
                .map_err(database_error("insert boat insurance"))?;
            }
        }

        let sql = rented_facility_query("WHERE rf.id = $1");
        let row: RentedFacilityRow = sqlx::query_as(&sql)
            .bind(rented_facility_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(database_error("load rental"))?;

        tx.commit()
            .await
            .map_err(database_error("commit transaction"))?;

        RentedFacility::try_from(row)
    }

    async fn free_facility(&self, id: RentedFacilityId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE rented_facilities
            SET freed_at = now()
            WHERE id = $1 AND freed_at IS NULL
            "#,
        )
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(database_error("free facility"))?;

        Ok(result.rows_affected() > 0)
    }
}
