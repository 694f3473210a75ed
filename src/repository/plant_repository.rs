use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ApprovalStatus, CreatePlantRequest, PageParams, Plant, PlantSearch, UpdatePlantRequest},
    error::{AppError, Result},
    repository::PlantRepository,
};

#[derive(FromRow)]
struct PlantRow {
    id: String,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    price_cents: i64,
    category: Option<String>,
    species: Option<String>,
    care_instructions: Option<String>,
    stock_quantity: i64,
    seller_id: String,
    verified_by_ai: i32,
    is_active: i32,
    approval_status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const PLANT_COLUMNS: &str = "id, name, description, image_url, price_cents, category, species, \
                             care_instructions, stock_quantity, seller_id, verified_by_ai, \
                             is_active, approval_status, created_at, updated_at";

// Shared by search and its count; every filter is skipped when its parameter is NULL.
const SEARCH_FILTER: &str = r#"
    WHERE is_active = 1
      AND approval_status = 'approved'
      AND (? IS NULL OR name LIKE '%' || ? || '%')
      AND (? IS NULL OR category = ?)
      AND (? IS NULL OR price_cents >= ?)
      AND (? IS NULL OR price_cents <= ?)
      AND (? = 0 OR verified_by_ai = 1)
"#;

pub struct SqlitePlantRepository {
    pool: SqlitePool,
}

impl SqlitePlantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_plant(row: PlantRow) -> Result<Plant> {
        Ok(Plant {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            price_cents: row.price_cents,
            category: row.category,
            species: row.species,
            care_instructions: row.care_instructions,
            stock_quantity: row.stock_quantity,
            seller_id: Uuid::parse_str(&row.seller_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            verified_by_ai: row.verified_by_ai != 0,
            is_active: row.is_active != 0,
            approval_status: ApprovalStatus::from_str(&row.approval_status).ok_or_else(|| {
                AppError::Database(format!("Invalid approval status: {}", row.approval_status))
            })?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    /// Reads a plant on an open transaction's connection.
    pub async fn find_in(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Plant>> {
        let row = sqlx::query_as::<_, PlantRow>(&format!(
            "SELECT {} FROM plants WHERE id = ?",
            PLANT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(conn)
        .await?;

        row.map(Self::row_to_plant).transpose()
    }

    /// Takes `quantity` units if the plant is purchasable and has enough stock.
    /// Returns false when nothing was taken.
    pub async fn decrement_stock(
        conn: &mut SqliteConnection,
        plant_id: Uuid,
        quantity: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE plants
            SET stock_quantity = stock_quantity - ?, updated_at = ?
            WHERE id = ?
              AND stock_quantity >= ?
              AND is_active = 1
              AND approval_status = 'approved'
            "#,
        )
        .bind(quantity)
        .bind(Utc::now().naive_utc())
        .bind(plant_id.to_string())
        .bind(quantity)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn restore_stock(
        conn: &mut SqliteConnection,
        plant_id: Uuid,
        quantity: i64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE plants SET stock_quantity = stock_quantity + ?, updated_at = ? WHERE id = ?",
        )
        .bind(quantity)
        .bind(Utc::now().naive_utc())
        .bind(plant_id.to_string())
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PlantRepository for SqlitePlantRepository {
    async fn create(
        &self,
        seller_id: Uuid,
        request: &CreatePlantRequest,
        approval_status: ApprovalStatus,
    ) -> Result<Plant> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO plants (
                id, name, description, image_url, price_cents, category, species,
                care_instructions, stock_quantity, seller_id, verified_by_ai,
                is_active, approval_status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.image_url)
        .bind(request.price_cents)
        .bind(&request.category)
        .bind(&request.species)
        .bind(&request.care_instructions)
        .bind(request.stock_quantity)
        .bind(seller_id.to_string())
        .bind(request.verified_by_ai as i32)
        .bind(approval_status.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created plant".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Plant>> {
        let row = sqlx::query_as::<_, PlantRow>(&format!(
            "SELECT {} FROM plants WHERE id = ?",
            PLANT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_plant).transpose()
    }

    async fn search(&self, filter: &PlantSearch, page: PageParams) -> Result<(Vec<Plant>, i64)> {
        let name = filter.name.as_deref().filter(|s| !s.is_empty());
        let category = filter.category.as_deref().filter(|s| !s.is_empty());
        let verified_only = filter.verified_only as i32;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM plants {}", SEARCH_FILTER))
            .bind(name)
            .bind(name)
            .bind(category)
            .bind(category)
            .bind(filter.min_price_cents)
            .bind(filter.min_price_cents)
            .bind(filter.max_price_cents)
            .bind(filter.max_price_cents)
            .bind(verified_only)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, PlantRow>(&format!(
            "SELECT {} FROM plants {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            PLANT_COLUMNS, SEARCH_FILTER
        ))
        .bind(name)
        .bind(name)
        .bind(category)
        .bind(category)
        .bind(filter.min_price_cents)
        .bind(filter.min_price_cents)
        .bind(filter.max_price_cents)
        .bind(filter.max_price_cents)
        .bind(verified_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let plants = rows
            .into_iter()
            .map(Self::row_to_plant)
            .collect::<Result<Vec<_>>>()?;

        Ok((plants, total))
    }

    async fn list_by_seller(&self, seller_id: Uuid) -> Result<Vec<Plant>> {
        let rows = sqlx::query_as::<_, PlantRow>(&format!(
            "SELECT {} FROM plants WHERE seller_id = ? ORDER BY created_at DESC",
            PLANT_COLUMNS
        ))
        .bind(seller_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_plant).collect()
    }

    async fn update(&self, id: Uuid, update: &UpdatePlantRequest) -> Result<Plant> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE plants
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                price_cents = COALESCE(?, price_cents),
                category = COALESCE(?, category),
                species = COALESCE(?, species),
                care_instructions = COALESCE(?, care_instructions),
                stock_quantity = COALESCE(?, stock_quantity),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.price_cents)
        .bind(&update.category)
        .bind(&update.species)
        .bind(&update.care_instructions)
        .bind(update.stock_quantity)
        .bind(update.is_active.map(|b| b as i32))
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Plant not found".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated plant".to_string()))
    }

    async fn deactivate(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE plants SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Plant not found".to_string()));
        }
        Ok(())
    }

    async fn set_image_url(&self, id: Uuid, url: &str) -> Result<Plant> {
        sqlx::query("UPDATE plants SET image_url = ?, updated_at = ? WHERE id = ?")
            .bind(url)
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))
    }

    async fn set_approval_status(&self, id: Uuid, status: ApprovalStatus) -> Result<Plant> {
        let result = sqlx::query("UPDATE plants SET approval_status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Plant not found".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated plant".to_string()))
    }
}
