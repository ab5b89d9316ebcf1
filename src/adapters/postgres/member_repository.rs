//! PostgreSQL implementation of MemberRepository.
//!
//! A member is a `users` row seen through one of its `memberships` rows.
//! Contacts are loaded in bulk per query with `user_id = ANY($1)`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;

use super::{database_error, violates, PaymentColumns, PAYMENT_SELECT};
use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, MembershipId, MembershipNumber, Money, SeasonId, UserId,
};
use crate::domain::membership::{
    Address, EmailAddress, Member, MemberDetails, Membership, MembershipStatus,
    MembershipStatusKind, MembershipValidity, NewUser, PhoneNumber, User,
};
use crate::ports::{MemberRepository, NewMembershipPeriod};

const USER_SELECT: &str =
    "u.id AS user_id, u.first_name, u.last_name, u.birth_date, u.email, u.tax_code";

const MEMBERSHIP_SELECT: &str = "m.id AS membership_id, m.membership_number, m.status, \
     m.valid_from, m.valid_until, m.decision_date, m.fee_cents";

/// Active rentals without a recorded payment.
const HAS_UNPAID_FACILITIES: &str = "EXISTS ( \
         SELECT 1 FROM rented_facilities rf \
         LEFT JOIN payments rp ON rp.rented_facility_id = rf.id \
         WHERE rf.member_id = u.id AND rf.freed_at IS NULL AND rp.id IS NULL \
     ) AS has_unpaid_facilities";

/// PostgreSQL implementation of the MemberRepository port.
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Rows
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
    email: String,
    tax_code: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    membership_id: i64,
    membership_number: i64,
    status: String,
    valid_from: Option<NaiveDate>,
    valid_until: Option<NaiveDate>,
    decision_date: Option<NaiveDate>,
    fee_cents: i64,
    #[sqlx(flatten)]
    payment: PaymentColumns,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    #[sqlx(flatten)]
    user: UserRow,
    #[sqlx(flatten)]
    membership: MembershipRow,
    has_unpaid_facilities: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    user_id: i64,
    street: String,
    city: String,
    postal_code: String,
    country: String,
}

#[derive(Debug, sqlx::FromRow)]
struct PhoneRow {
    user_id: i64,
    prefix: Option<String>,
    number: String,
}

/// Addresses and phone numbers keyed by user id.
#[derive(Debug, Default)]
struct Contacts {
    addresses: HashMap<i64, Vec<Address>>,
    phone_numbers: HashMap<i64, Vec<PhoneNumber>>,
}

impl UserRow {
    fn into_user(self, contacts: &mut Contacts) -> Result<User, DomainError> {
        let email = EmailAddress::new(&self.email).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored email: {}", e))
        })?;
        Ok(User {
            id: UserId::new(self.user_id),
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            email,
            tax_code: self.tax_code,
            addresses: contacts.addresses.remove(&self.user_id).unwrap_or_default(),
            phone_numbers: contacts.phone_numbers.remove(&self.user_id).unwrap_or_default(),
        })
    }
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        let kind = MembershipStatusKind::from_str(&row.status).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid status value: {}", e))
        })?;
        let validity = match (row.valid_from, row.valid_until) {
            (Some(from), Some(until)) => Some(MembershipValidity::new(from, until)),
            _ => None,
        };
        let status = status_from_columns(kind, validity, row.decision_date)?;

        Ok(Membership {
            id: MembershipId::new(row.membership_id),
            number: MembershipNumber::new(row.membership_number),
            status,
            payment: row
                .payment
                .into_payment(Money::from_cents(row.fee_cents), row.valid_from),
        })
    }
}

/// Rebuilds a status from its flattened columns.
fn status_from_columns(
    kind: MembershipStatusKind,
    validity: Option<MembershipValidity>,
    decision_date: Option<NaiveDate>,
) -> Result<MembershipStatus, DomainError> {
    let missing = |what: &str| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("{} membership row without {}", kind, what),
        )
    };

    let status = match kind {
        MembershipStatusKind::None => MembershipStatus::None,
        MembershipStatusKind::Active => MembershipStatus::Active {
            validity: validity.ok_or_else(|| missing("validity"))?,
        },
        MembershipStatusKind::Unpaid => MembershipStatus::Unpaid {
            validity: validity.ok_or_else(|| missing("validity"))?,
        },
        MembershipStatusKind::Expired => MembershipStatus::Expired {
            validity: validity.ok_or_else(|| missing("validity"))?,
        },
        MembershipStatusKind::ExclusionDeliberated => MembershipStatus::ExclusionDeliberated {
            validity: validity.ok_or_else(|| missing("validity"))?,
            decision_date: decision_date.ok_or_else(|| missing("decision date"))?,
        },
        MembershipStatusKind::Excluded => MembershipStatus::Excluded {
            validity: validity.ok_or_else(|| missing("validity"))?,
            decision_date: decision_date.ok_or_else(|| missing("decision date"))?,
        },
    };
    Ok(status)
}

/// Member select; `latest_only` keeps one row per user, their latest period.
fn member_query(latest_only: bool, filter: &str) -> String {
    format!(
        "SELECT {}{}, {}, {}, {} \
         FROM users u \
         JOIN memberships m ON m.user_id = u.id \
         LEFT JOIN payments p ON p.membership_id = m.id \
         {}",
        if latest_only { "DISTINCT ON (u.id) " } else { "" },
        USER_SELECT,
        MEMBERSHIP_SELECT,
        PAYMENT_SELECT,
        HAS_UNPAID_FACILITIES,
        filter,
    )
}

fn membership_insert_error(
    member_id: MemberId,
    season_id: SeasonId,
) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| {
        if violates(&e, "memberships_user_season_key") {
            DomainError::new(
                ErrorCode::MembershipAlreadyExists,
                format!(
                    "Member {} already has a membership in season {}",
                    member_id, season_id
                ),
            )
            .with_detail("member_id", member_id.to_string())
            .with_detail("season_id", season_id.to_string())
        } else if violates(&e, "memberships_season_id_fkey") {
            DomainError::new(
                ErrorCode::SeasonNotFound,
                format!("Season not found: {}", season_id),
            )
            .with_detail("season_id", season_id.to_string())
        } else {
            database_error("insert membership")(e)
        }
    }
}

impl PostgresMemberRepository {
    async fn load_contacts(&self, user_ids: Vec<i64>) -> Result<Contacts, DomainError> {
        let mut contacts = Contacts::default();
        if user_ids.is_empty() {
            return Ok(contacts);
        }

        let addresses: Vec<AddressRow> = sqlx::query_as(
            r#"
            SELECT user_id, street, city, postal_code, country
            FROM addresses
            WHERE user_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("load addresses"))?;

        let phones: Vec<PhoneRow> = sqlx::query_as(
            r#"
            SELECT user_id, prefix, number
            FROM phone_numbers
            WHERE user_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("load phone numbers"))?;

        for row in addresses {
            contacts.addresses.entry(row.user_id).or_default().push(Address {
                street: row.street,
                city: row.city,
                postal_code: row.postal_code,
                country: row.country,
            });
        }
        for row in phones {
            let phone = PhoneNumber::new(row.prefix.as_deref().unwrap_or(""), &row.number)
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Invalid stored phone number: {}", e),
                    )
                })?;
            contacts.phone_numbers.entry(row.user_id).or_default().push(phone);
        }
        Ok(contacts)
    }

    async fn fetch_members(
        &self,
        sql: &str,
        season_id: Option<SeasonId>,
    ) -> Result<Vec<Member>, DomainError> {
        let mut query = sqlx::query_as::<_, MemberRow>(sql);
        if let Some(season_id) = season_id {
            query = query.bind(season_id.value());
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(database_error("load members"))?;

        let mut contacts = self
            .load_contacts(rows.iter().map(|r| r.user.user_id).collect())
            .await?;

        rows.into_iter()
            .map(|row| -> Result<Member, DomainError> {
                Ok(Member {
                    user: row.user.into_user(&mut contacts)?,
                    membership: Membership::try_from(row.membership)?,
                    has_unpaid_facilities: row.has_unpaid_facilities,
                })
            })
            .collect()
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn get_all_members(&self) -> Result<Vec<Member>, DomainError> {
        let sql = member_query(true, "ORDER BY u.id, m.valid_until DESC NULLS LAST");
        self.fetch_members(&sql, None).await
    }

    async fn get_members_by_season(&self, season_id: SeasonId) -> Result<Vec<Member>, DomainError> {
        let sql = member_query(
            false,
            "WHERE m.season_id = $1 ORDER BY u.last_name, u.first_name, u.id",
        );
        self.fetch_members(&sql, Some(season_id)).await
    }

    async fn get_member_by_id(
        &self,
        id: MemberId,
        season_id: Option<SeasonId>,
    ) -> Result<Option<MemberDetails>, DomainError> {
        let user_sql = format!("SELECT {} FROM users u WHERE u.id = $1", USER_SELECT);
        let Some(user_row) = sqlx::query_as::<_, UserRow>(&user_sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("find member"))?
        else {
            return Ok(None);
        };

        let membership_sql = format!(
            "SELECT {}, {} \
             FROM memberships m \
             LEFT JOIN payments p ON p.membership_id = m.id \
             WHERE m.user_id = $1 AND ($2::BIGINT IS NULL OR m.season_id = $2) \
             ORDER BY m.valid_from",
            MEMBERSHIP_SELECT, PAYMENT_SELECT
        );
        let membership_rows: Vec<MembershipRow> = sqlx::query_as(&membership_sql)
            .bind(id.value())
            .bind(season_id.map(|s| s.value()))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error("load memberships"))?;

        let mut contacts = self.load_contacts(vec![user_row.user_id]).await?;
        let memberships = membership_rows
            .into_iter()
            .map(Membership::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(MemberDetails {
            user: user_row.into_user(&mut contacts)?,
            memberships,
        }))
    }

    async fn create_member(
        &self,
        user: NewUser,
        membership: Option<NewMembershipPeriod>,
    ) -> Result<MemberDetails, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("start transaction"))?;

        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (first_name, last_name, birth_date, email, tax_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birth_date)
        .bind(user.email.as_str())
        .bind(&user.tax_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if violates(&e, "users_email_key") || violates(&e, "users_tax_code_key") {
                DomainError::new(
                    ErrorCode::MemberAlreadyExists,
                    format!("{} {} <{}>", user.first_name, user.last_name, user.email),
                )
            } else {
                database_error("insert user")(e)
            }
        })?;

        for address in &user.addresses {
            sqlx::query(
                r#"
                INSERT INTO addresses (user_id, street, city, postal_code, country)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(user_id)
            .bind(&address.street)
            .bind(&address.city)
            .bind(&address.postal_code)
            .bind(&address.country)
            .execute(&mut *tx)
            .await
            .map_err(database_error("insert address"))?;
        }

        for phone in &user.phone_numbers {
            sqlx::query("INSERT INTO phone_numbers (user_id, prefix, number) VALUES ($1, $2, $3)")
                .bind(user_id)
                .bind(phone.prefix())
                .bind(phone.number())
                .execute(&mut *tx)
                .await
                .map_err(database_error("insert phone number"))?;
        }

        let member_id = MemberId::new(user_id);
        let mut memberships = Vec::new();
        if let Some(period) = membership {
            let (membership_id, number): (i64, i64) = sqlx::query_as(
                r#"
                INSERT INTO memberships (
                    user_id, season_id, membership_number, status, valid_from, valid_until, fee_cents
                ) VALUES ($1, $2, nextval('membership_numbers'), $3, $4, $5, $6)
                RETURNING id, membership_number
                "#,
            )
            .bind(user_id)
            .bind(period.season_id.value())
            .bind(MembershipStatusKind::Active.as_str())
            .bind(period.valid_from)
            .bind(period.valid_until)
            .bind(period.fee.cents())
            .fetch_one(&mut *tx)
            .await
            .map_err(membership_insert_error(member_id, period.season_id))?;

            memberships.push(Membership::open(
                MembershipId::new(membership_id),
                MembershipNumber::new(number),
                period.valid_from,
                period.valid_until,
                period.fee,
            ));
        }

        tx.commit()
            .await
            .map_err(database_error("commit transaction"))?;

        Ok(MemberDetails {
            user: user.with_id(UserId::new(user_id)),
            memberships,
        })
    }

    async fn add_membership(
        &self,
        member_id: MemberId,
        period: &NewMembershipPeriod,
    ) -> Result<MemberDetails, DomainError> {
        let not_found = || {
            DomainError::new(
                ErrorCode::MemberNotFound,
                format!("Member not found: {}", member_id),
            )
            .with_detail("member_id", member_id.to_string())
        };

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(member_id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error("find member"))?;
        if !exists {
            return Err(not_found());
        }

        // The member keeps the number of their latest period, if any.
        sqlx::query(
            r#"
            INSERT INTO memberships (
                user_id, season_id, membership_number, status, valid_from, valid_until, fee_cents
            ) VALUES (
                $1, $2,
                COALESCE(
                    (SELECT membership_number FROM memberships
                     WHERE user_id = $1
                     ORDER BY valid_until DESC NULLS LAST
                     LIMIT 1),
                    nextval('membership_numbers')
                ),
                $3, $4, $5, $6
            )
            "#,
        )
        .bind(member_id.value())
        .bind(period.season_id.value())
        .bind(MembershipStatusKind::Active.as_str())
        .bind(period.valid_from)
        .bind(period.valid_until)
        .bind(period.fee.cents())
        .execute(&self.pool)
        .await
        .map_err(membership_insert_error(member_id, period.season_id))?;

        self.get_member_by_id(member_id, None)
            .await?
            .ok_or_else(not_found)
    }

    async fn insert_renewed_period(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
        membership: &Membership,
    ) -> Result<Membership, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO memberships (
                user_id, season_id, membership_number, status, valid_from, valid_until,
                decision_date, fee_cents
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(member_id.value())
        .bind(season_id.value())
        .bind(membership.number.value())
        .bind(membership.kind().as_str())
        .bind(membership.status.valid_from())
        .bind(membership.status.valid_until())
        .bind(membership.status.decision_date())
        .bind(membership.payment.amount().cents())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "memberships_user_id_fkey") {
                DomainError::new(
                    ErrorCode::MemberNotFound,
                    format!("Member not found: {}", member_id),
                )
                .with_detail("member_id", member_id.to_string())
            } else {
                membership_insert_error(member_id, season_id)(e)
            }
        })?;

        Ok(Membership {
            id: MembershipId::new(id),
            ..membership.clone()
        })
    }

    async fn update_membership(
        &self,
        member_id: MemberId,
        membership: &Membership,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE memberships SET
                status = $3,
                valid_from = $4,
                valid_until = $5,
                decision_date = $6
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(membership.id.value())
        .bind(member_id.value())
        .bind(membership.kind().as_str())
        .bind(membership.status.valid_from())
        .bind(membership.status.valid_until())
        .bind(membership.status.decision_date())
        .execute(&self.pool)
        .await
        .map_err(database_error("update membership"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::MembershipNotFound,
                format!("Membership {} not found", membership.id),
            )
            .with_detail("member_id", member_id.to_string()));
        }
        Ok(())
    }

    async fn get_members_who_did_not_pay_for_services(&self) -> Result<Vec<Member>, DomainError> {
        Ok(self
            .get_all_members()
            .await?
            .into_iter()
            .filter(|m| m.has_unpaid_facilities)
            .collect())
    }

    async fn get_members_who_did_not_pay_for_membership(&self) -> Result<Vec<Member>, DomainError> {
        Ok(self
            .get_all_members()
            .await?
            .into_iter()
            .filter(|m| !m.membership.payment.is_paid())
            .collect())
    }
}
