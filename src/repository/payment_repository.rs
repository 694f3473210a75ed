use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Payment, PaymentProvider, PaymentStatus},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    order_id: String,
    provider: String,
    status: String,
    amount_cents: i64,
    currency: String,
    provider_order_id: Option<String>,
    provider_payment_id: Option<String>,
    provider_signature: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const PAYMENT_COLUMNS: &str = "id, order_id, provider, status, amount_cents, currency, \
                               provider_order_id, provider_payment_id, provider_signature, \
                               created_at, updated_at";

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<Payment> {
        Ok(Payment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            order_id: Uuid::parse_str(&row.order_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            provider: PaymentProvider::from_str(&row.provider).ok_or_else(|| {
                AppError::Database(format!("Invalid payment provider: {}", row.provider))
            })?,
            status: PaymentStatus::from_str(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid payment status: {}", row.status)))?,
            amount_cents: row.amount_cents,
            currency: row.currency,
            provider_order_id: row.provider_order_id,
            provider_payment_id: row.provider_payment_id,
            provider_signature: row.provider_signature,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    pub async fn insert_in(conn: &mut SqliteConnection, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, provider, status, amount_cents, currency,
                provider_order_id, provider_payment_id, provider_signature,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.order_id.to_string())
        .bind(payment.provider.as_str())
        .bind(payment.status.as_str())
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(&payment.provider_order_id)
        .bind(&payment.provider_payment_id)
        .bind(&payment.provider_signature)
        .bind(payment.created_at.naive_utc())
        .bind(payment.updated_at.naive_utc())
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Settles a pending payment. False when it was already settled by another callback.
    pub async fn settle_in(
        conn: &mut SqliteConnection,
        id: Uuid,
        status: PaymentStatus,
        provider_payment_id: &str,
        provider_signature: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = ?,
                provider_payment_id = ?,
                provider_signature = ?,
                updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(status.as_str())
        .bind(provider_payment_id)
        .bind(provider_signature)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: &Payment) -> Result<Payment> {
        {
            let mut conn = self.pool.acquire().await?;
            Self::insert_in(&mut conn, payment).await?;
        }

        self.find_by_id(payment.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created payment".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_payment).transpose()
    }

    async fn find_by_provider_order_id(&self, provider_order_id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE provider_order_id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(provider_order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_payment).transpose()
    }

    async fn find_by_order(&self, order_id: Uuid) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE order_id = ? ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }
}
