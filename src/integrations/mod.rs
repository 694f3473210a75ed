use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Classification, Order, OrderItem};
use crate::error::Result;

pub mod invoice;
pub mod storage;
pub mod vision;

pub use invoice::TextInvoiceRenderer;
pub use storage::LocalBlobStorage;
pub use vision::{DisabledClassifier, HttpPlantClassifier};

/// Stores uploaded bytes and hands back a URL clients can fetch them from.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    fn name(&self) -> &str;
    async fn health_check(&self) -> Result<()>;
    async fn store(&self, filename: &str, data: &[u8]) -> Result<String>;
}

#[async_trait]
pub trait PlantClassifier: Send + Sync {
    fn name(&self) -> &str;
    fn is_enabled(&self) -> bool;
    async fn health_check(&self) -> Result<()>;
    async fn classify(&self, image: &[u8]) -> Result<Classification>;
}

/// Everything an invoice shows, resolved ahead of rendering.
#[derive(Debug, Clone)]
pub struct InvoiceData {
    pub order: Order,
    pub buyer_name: String,
    pub seller_name: String,
    /// Each item with its plant's display name.
    pub lines: Vec<(OrderItem, String)>,
    pub currency: String,
}

pub trait InvoiceRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;
    /// Extension for download filenames, without the dot.
    fn file_extension(&self) -> &'static str;
    fn render(&self, invoice: &InvoiceData) -> Result<Vec<u8>>;
}

/// Outside collaborators, built once at startup and shared by the services.
#[derive(Clone)]
pub struct Collaborators {
    pub storage: Arc<dyn BlobStorage>,
    pub classifier: Arc<dyn PlantClassifier>,
    pub invoices: Arc<dyn InvoiceRenderer>,
}

impl Collaborators {
    pub fn new(
        storage: Arc<dyn BlobStorage>,
        classifier: Arc<dyn PlantClassifier>,
        invoices: Arc<dyn InvoiceRenderer>,
    ) -> Self {
        Self {
            storage,
            classifier,
            invoices,
        }
    }

    /// Reports each collaborator as `healthy`, `not_configured`, or `unhealthy`.
    pub async fn health_check_all(&self) -> Vec<(String, &'static str)> {
        let mut results = Vec::new();

        let storage = match self.storage.health_check().await {
            Ok(()) => "healthy",
            Err(e) => {
                tracing::warn!("Storage {} failed health check: {:?}", self.storage.name(), e);
                "unhealthy"
            }
        };
        results.push((self.storage.name().to_string(), storage));

        let vision = if !self.classifier.is_enabled() {
            "not_configured"
        } else {
            match self.classifier.health_check().await {
                Ok(()) => "healthy",
                Err(e) => {
                    tracing::warn!("Classifier {} failed health check: {:?}", self.classifier.name(), e);
                    "unhealthy"
                }
            }
        };
        results.push((self.classifier.name().to_string(), vision));

        results
    }
}
