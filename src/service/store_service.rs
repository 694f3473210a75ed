use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::StoreRepository,
};

pub struct StoreService {
    repo: Arc<dyn StoreRepository>,
}

impl StoreService {
    pub fn new(repo: Arc<dyn StoreRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: CreateStoreRequest) -> Result<Store> {
        request.validate()?;
        let store = self.repo.create(&request).await?;
        info!(store_id = %store.id, "Store created");
        Ok(store)
    }

    pub async fn get(&self, id: Uuid) -> Result<Store> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Store not found".to_string()))
    }

    pub async fn list(&self, page: PageParams) -> Result<Page<Store>> {
        let (stores, total) = self.repo.list(page).await?;
        Ok(Page::new(stores, total, page))
    }

    /// Stores within `radius_km` of the point, nearest first.
    ///
    /// Candidates come from a latitude band around the point; the exact
    /// great-circle distance then filters and orders them.
    pub async fn nearby(&self, query: &NearbyQuery, page: PageParams) -> Result<Page<NearbyStore>> {
        query.validate()?;

        let band = query.radius_km / KM_PER_DEGREE_LATITUDE;
        let candidates = self
            .repo
            .in_latitude_band(query.lat - band, query.lat + band)
            .await?;

        let mut within: Vec<NearbyStore> = candidates
            .into_iter()
            .filter_map(|store| {
                let distance_km = haversine_km(query.lat, query.lng, store.latitude, store.longitude);
                (distance_km <= query.radius_km).then_some(NearbyStore { store, distance_km })
            })
            .collect();
        within.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        let total = within.len() as i64;
        let items = within
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(0))
            .collect();
        Ok(Page::new(items, total, page))
    }
}
