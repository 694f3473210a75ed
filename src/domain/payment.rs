use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    pub amount_cents: i64,
    pub currency: String,
    pub provider_order_id: Option<String>,
    pub provider_payment_id: Option<String>,
    pub provider_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    Razorpay,
    Cod,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Razorpay => "razorpay",
            PaymentProvider::Cod => "cod",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "razorpay" => Some(PaymentProvider::Razorpay),
            "cod" => Some(PaymentProvider::Cod),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "success" => Some(PaymentStatus::Success),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGatewayOrderRequest {
    pub order_id: Uuid,
}

/// What the client needs to open the gateway checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub payment_id: Uuid,
    pub provider_order_id: String,
    pub amount_cents: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhook {
    pub provider_order_id: String,
    pub provider_payment_id: String,
    pub provider_signature: Option<String>,
    pub status: String,
}

impl PaymentWebhook {
    pub fn is_paid(&self) -> bool {
        self.status.eq_ignore_ascii_case("paid")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodConfirmRequest {
    pub order_id: Uuid,
}
