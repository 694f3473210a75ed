use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::VisionConfig,
    domain::Classification,
    error::{AppError, Result},
    integrations::PlantClassifier,
};

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    image_base64: String,
}

#[derive(Deserialize, Debug)]
struct ClassifyResponse {
    is_plant: bool,
    plant_type: Option<String>,
    confidence: Option<f64>,
}

/// Posts base64 images to a JSON classification endpoint.
pub struct HttpPlantClassifier {
    endpoint: String,
    api_key: Option<String>,
    model: Option<String>,
    client: Client,
}

impl HttpPlantClassifier {
    pub fn new(config: &VisionConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let endpoint = config.endpoint.clone()?;
        Some(Self {
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client: Client::new(),
        })
    }
}

fn normalize(response: ClassifyResponse) -> Classification {
    let confidence = response
        .confidence
        .unwrap_or(if response.is_plant { 0.5 } else { 0.0 })
        .clamp(0.0, 1.0);
    Classification {
        is_plant: response.is_plant,
        plant_type: if response.is_plant { response.plant_type } else { None },
        confidence,
    }
}

#[async_trait]
impl PlantClassifier for HttpPlantClassifier {
    fn name(&self) -> &str {
        "vision"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<()> {
        self.client
            .head(&self.endpoint)
            .send()
            .await
            .map_err(|e| AppError::Integration(format!("Vision endpoint unreachable: {}", e)))?;
        Ok(())
    }

    async fn classify(&self, image: &[u8]) -> Result<Classification> {
        let body = ClassifyRequest {
            model: self.model.as_deref(),
            image_base64: general_purpose::STANDARD.encode(image),
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::External(format!("Vision request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::External(format!("Vision request rejected: {}", e)))?
            .json::<ClassifyResponse>()
            .await
            .map_err(|e| AppError::External(format!("Vision response unreadable: {}", e)))?;

        Ok(normalize(response))
    }
}

/// Used when no vision endpoint is configured.
pub struct DisabledClassifier;

#[async_trait]
impl PlantClassifier for DisabledClassifier {
    fn name(&self) -> &str {
        "vision"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn classify(&self, _image: &[u8]) -> Result<Classification> {
        Err(AppError::ServiceUnavailable(
            "Plant identification is not configured".to_string(),
        ))
    }
}
