pub mod analytics;
pub mod announcement;
pub mod audit;
pub mod cart;
pub mod category;
pub mod delivery;
pub mod notification;
pub mod order;
pub mod payment;
pub mod plant;
pub mod prediction;
pub mod review;
pub mod store;
pub mod user;

pub use analytics::*;
pub use announcement::*;
pub use audit::*;
pub use cart::*;
pub use category::*;
pub use delivery::*;
pub use notification::*;
pub use order::*;
pub use payment::*;
pub use plant::*;
pub use prediction::*;
pub use review::*;
pub use store::*;
pub use user::*;

use serde::{Deserialize, Serialize};

/// `page` is 1-based.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    20
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: default_page(), size: default_size() }
    }
}

impl PageParams {
    pub const MAX_SIZE: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.size.clamp(1, Self::MAX_SIZE)
    }

    /// Pages past the last representable offset are clamped.
    pub fn page(&self) -> i64 {
        self.page.clamp(1, i64::MAX / Self::MAX_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, params: PageParams) -> Self {
        let size = params.limit();
        Self {
            items,
            total,
            page: params.page(),
            size,
            pages: (total + size - 1) / size,
        }
    }
}
