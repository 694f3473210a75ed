use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateStoreRequest, PageParams, Store},
    error::{AppError, Result},
    repository::StoreRepository,
};

#[derive(FromRow)]
struct StoreRow {
    id: String,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
    phone: Option<String>,
    rating: Option<f64>,
    total_reviews: Option<i64>,
    is_partner: i32,
    created_at: NaiveDateTime,
}

const STORE_COLUMNS: &str = "id, name, address, latitude, longitude, phone, rating, \
                             total_reviews, is_partner, created_at";

pub struct SqliteStoreRepository {
    pool: SqlitePool,
}

impl SqliteStoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_store(row: StoreRow) -> Result<Store> {
        Ok(Store {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            phone: row.phone,
            rating: row.rating,
            total_reviews: row.total_reviews,
            is_partner: row.is_partner != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl StoreRepository for SqliteStoreRepository {
    async fn create(&self, request: &CreateStoreRequest) -> Result<Store> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO stores (
                id, name, address, latitude, longitude, phone,
                rating, total_reviews, is_partner, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.address)
        .bind(request.latitude.unwrap_or(0.0))
        .bind(request.longitude.unwrap_or(0.0))
        .bind(&request.phone)
        .bind(request.rating)
        .bind(request.total_reviews)
        .bind(request.is_partner as i32)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created store".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {} FROM stores WHERE id = ?",
            STORE_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_store).transpose()
    }

    async fn list(&self, page: PageParams) -> Result<(Vec<Store>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {} FROM stores ORDER BY name LIMIT ? OFFSET ?",
            STORE_COLUMNS
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let stores = rows
            .into_iter()
            .map(Self::row_to_store)
            .collect::<Result<Vec<_>>>()?;
        Ok((stores, total))
    }

    async fn in_latitude_band(&self, min_lat: f64, max_lat: f64) -> Result<Vec<Store>> {
        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {} FROM stores WHERE latitude BETWEEN ? AND ?",
            STORE_COLUMNS
        ))
        .bind(min_lat)
        .bind(max_lat)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_store).collect()
    }
}
