use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        AgentStatus, CreateAgentRequest, DeliveryAgent, DeliveryStats, PageParams,
        UpdateAgentRequest,
    },
    error::{AppError, Result},
    repository::DeliveryAgentRepository,
};

#[derive(FromRow)]
struct AgentRow {
    id: String,
    name: String,
    phone: String,
    email: Option<String>,
    current_location: Option<String>,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const AGENT_COLUMNS: &str =
    "id, name, phone, email, current_location, status, created_at, updated_at";

pub struct SqliteDeliveryAgentRepository {
    pool: SqlitePool,
}

fn map_phone_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict("Phone number already registered".to_string())
        }
        other => AppError::Database(other.to_string()),
    }
}

impl SqliteDeliveryAgentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_agent(row: AgentRow) -> Result<DeliveryAgent> {
        Ok(DeliveryAgent {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            phone: row.phone,
            email: row.email,
            current_location: row.current_location,
            status: AgentStatus::from_str(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid agent status: {}", row.status)))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    /// `active` -> `busy`. False if the agent is missing or not active.
    pub async fn claim(conn: &mut SqliteConnection, agent_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE delivery_agents SET status = 'busy', updated_at = ? WHERE id = ? AND status = 'active'",
        )
        .bind(Utc::now().naive_utc())
        .bind(agent_id.to_string())
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// `busy` -> `active`. An agent an admin has since deactivated stays inactive.
    pub async fn release(conn: &mut SqliteConnection, agent_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE delivery_agents SET status = 'active', updated_at = ? WHERE id = ? AND status = 'busy'",
        )
        .bind(Utc::now().naive_utc())
        .bind(agent_id.to_string())
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DeliveryAgentRepository for SqliteDeliveryAgentRepository {
    async fn create(&self, request: &CreateAgentRequest) -> Result<DeliveryAgent> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO delivery_agents (
                id, name, phone, email, current_location, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 'active', ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.current_location)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_phone_conflict)?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created agent".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryAgent>> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            "SELECT {} FROM delivery_agents WHERE id = ?",
            AGENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_agent).transpose()
    }

    async fn list(
        &self,
        status: Option<AgentStatus>,
        page: PageParams,
    ) -> Result<(Vec<DeliveryAgent>, i64)> {
        let status = status.map(|s| s.as_str());

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM delivery_agents WHERE (? IS NULL OR status = ?)")
                .bind(status)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, AgentRow>(&format!(
            r#"
            SELECT {} FROM delivery_agents
            WHERE (? IS NULL OR status = ?)
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
            AGENT_COLUMNS
        ))
        .bind(status)
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let agents = rows
            .into_iter()
            .map(Self::row_to_agent)
            .collect::<Result<Vec<_>>>()?;
        Ok((agents, total))
    }

    async fn update(&self, id: Uuid, update: &UpdateAgentRequest) -> Result<DeliveryAgent> {
        let result = sqlx::query(
            r#"
            UPDATE delivery_agents
            SET name = COALESCE(?, name),
                phone = COALESCE(?, phone),
                email = COALESCE(?, email),
                current_location = COALESCE(?, current_location),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.email)
        .bind(&update.current_location)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_phone_conflict)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Delivery agent not found".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated agent".to_string()))
    }

    async fn set_status(&self, id: Uuid, status: AgentStatus) -> Result<DeliveryAgent> {
        let result = sqlx::query("UPDATE delivery_agents SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Delivery agent not found".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated agent".to_string()))
    }

    async fn stats(&self) -> Result<DeliveryStats> {
        let (total_agents, active_agents, busy_agents, inactive_agents): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'busy' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'inactive' THEN 1 ELSE 0 END), 0)
                FROM delivery_agents
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        let (orders_in_transit, delivered_today): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status IN ('confirmed', 'shipped') THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'delivered' AND date(updated_at) = date('now') THEN 1 ELSE 0 END), 0)
            FROM orders
            WHERE delivery_agent_id IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DeliveryStats {
            total_agents,
            active_agents,
            busy_agents,
            inactive_agents,
            orders_in_transit,
            delivered_today,
        })
    }
}
