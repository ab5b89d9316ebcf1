//! PostgreSQL implementation of PaymentRepository.
//!
//! Each membership period and each rental holds at most one payment
//! (partial unique indexes on `payments`), so recording again upserts.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{database_error, violates};
use crate::domain::foundation::{
    DomainError, ErrorCode, MembershipId, PaymentId, RentedFacilityId,
};
use crate::domain::payment::PaymentDetails;
use crate::ports::PaymentRepository;

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn create_payment_for_membership_period(
        &self,
        membership_id: MembershipId,
        details: &PaymentDetails,
    ) -> Result<PaymentId, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO payments (membership_id, amount_cents, currency, method, transaction_ref)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (membership_id) WHERE membership_id IS NOT NULL
            DO UPDATE SET
                amount_cents = EXCLUDED.amount_cents,
                currency = EXCLUDED.currency,
                method = EXCLUDED.method,
                transaction_ref = EXCLUDED.transaction_ref,
                paid_at = now()
            RETURNING id
            "#,
        )
        .bind(membership_id.value())
        .bind(details.amount().cents())
        .bind(details.currency())
        .bind(details.method().as_str())
        .bind(details.transaction_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "payments_membership_id_fkey") {
                DomainError::new(
                    ErrorCode::MembershipNotFound,
                    format!("Membership {} not found", membership_id),
                )
            } else {
                database_error("record membership payment")(e)
            }
        })?;

        Ok(PaymentId::new(id))
    }

    async fn create_payment_for_rented_facility(
        &self,
        rented_facility_id: RentedFacilityId,
        details: &PaymentDetails,
    ) -> Result<PaymentId, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO payments (rented_facility_id, amount_cents, currency, method, transaction_ref)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (rented_facility_id) WHERE rented_facility_id IS NOT NULL
            DO UPDATE SET
                amount_cents = EXCLUDED.amount_cents,
                currency = EXCLUDED.currency,
                method = EXCLUDED.method,
                transaction_ref = EXCLUDED.transaction_ref,
                paid_at = now()
            RETURNING id
            "#,
        )
        .bind(rented_facility_id.value())
        .bind(details.amount().cents())
        .bind(details.currency())
        .bind(details.method().as_str())
        .bind(details.transaction_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "payments_rented_facility_id_fkey") {
                DomainError::new(
                    ErrorCode::RentedFacilityNotFound,
                    format!("Rented facility {} not found", rented_facility_id),
                )
                .with_detail("rented_facility_id", rented_facility_id.to_string())
            } else {
                database_error("record rental payment")(e)
            }
        })?;

        Ok(PaymentId::new(id))
    }

    async fn update_payment(
        &self,
        id: PaymentId,
        details: &PaymentDetails,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET amount_cents = $2, currency = $3, method = $4, transaction_ref = $5
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .bind(details.amount().cents())
        .bind(details.currency())
        .bind(details.method().as_str())
        .bind(details.transaction_ref())
        .execute(&self.pool)
        .await
        .map_err(database_error("update payment"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_payment(&self, id: PaymentId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(database_error("delete payment"))?;

        Ok(result.rows_affected() > 0)
    }
}
