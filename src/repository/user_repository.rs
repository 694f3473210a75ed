use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        AdminUpdateUserRequest, ApprovalStatus, CreateUserRequest, PageParams, User, UserFilter,
        UserRole,
    },
    error::{AppError, Result},
    repository::UserRepository,
};

#[derive(FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    vendor_status: String,
    phone: Option<String>,
    address: Option<String>,
    is_active: i32,
    is_verified: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const USER_COLUMNS: &str = "id, name, email, role, vendor_status, phone, address, \
                            is_active, is_verified, created_at, updated_at";

const LIST_FILTER: &str = r#"
    WHERE (? IS NULL OR name LIKE '%' || ? || '%' OR email LIKE '%' || ? || '%')
      AND (? IS NULL OR role = ?)
      AND (? IS NULL OR is_active = ?)
      AND (? IS NULL OR is_verified = ?)
"#;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            email: row.email,
            role: UserRole::from_str(&row.role)
                .ok_or_else(|| AppError::Database(format!("Invalid user role: {}", row.role)))?,
            vendor_status: ApprovalStatus::from_str(&row.vendor_status).ok_or_else(|| {
                AppError::Database(format!("Invalid vendor status: {}", row.vendor_status))
            })?,
            phone: row.phone,
            address: row.address,
            is_active: row.is_active != 0,
            is_verified: row.is_verified != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(
        &self,
        request: &CreateUserRequest,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        // Staff accounts never go through vendor review.
        let vendor_status = if role.is_admin_tier() {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Pending
        };

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role, vendor_status,
                phone, address, is_active, is_verified, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, 0, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(request.email.to_lowercase())
        .bind(password_hash)
        .bind(role.as_str())
        .bind(vendor_status.as_str())
        .bind(&request.phone)
        .bind(&request.address)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Email already registered".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created user".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn password_hash(&self, email: &str) -> Result<Option<(Uuid, String)>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ?")
                .bind(email.to_lowercase())
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((id, hash)) => {
                let id = Uuid::parse_str(&id).map_err(|e| AppError::Database(e.to_string()))?;
                Ok(Some((id, hash)))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &UserFilter, page: PageParams) -> Result<(Vec<User>, i64)> {
        let search = filter.search.as_deref().filter(|s| !s.is_empty());
        let role = filter.role.map(|r| r.as_str());
        let is_active = filter.is_active.map(|b| b as i32);
        let is_verified = filter.is_verified.map(|b| b as i32);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {}", LIST_FILTER))
            .bind(search)
            .bind(search)
            .bind(search)
            .bind(role)
            .bind(role)
            .bind(is_active)
            .bind(is_active)
            .bind(is_verified)
            .bind(is_verified)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            USER_COLUMNS, LIST_FILTER
        ))
        .bind(search)
        .bind(search)
        .bind(search)
        .bind(role)
        .bind(role)
        .bind(is_active)
        .bind(is_active)
        .bind(is_verified)
        .bind(is_verified)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(Self::row_to_user)
            .collect::<Result<Vec<_>>>()?;
        Ok((users, total))
    }

    async fn admin_update(&self, id: Uuid, update: &AdminUpdateUserRequest) -> Result<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                phone = COALESCE(?, phone),
                address = COALESCE(?, address),
                role = COALESCE(?, role),
                is_active = COALESCE(?, is_active),
                is_verified = COALESCE(?, is_verified),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.is_active.map(|b| b as i32))
        .bind(update.is_verified.map(|b| b as i32))
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated user".to_string()))
    }

    async fn update_vendor_status(&self, id: Uuid, status: ApprovalStatus) -> Result<User> {
        let now = Utc::now().naive_utc();

        // Approving a plain user promotes them to seller; other roles keep theirs.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET vendor_status = ?,
                role = CASE WHEN ? = 'approved' AND role = 'user' THEN 'seller' ELSE role END,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(status.as_str())
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated user".to_string()))
    }
}
