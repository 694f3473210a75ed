use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::PaymentsConfig,
    domain::*,
    error::{AppError, Result},
    payments::razorpay,
    repository::{OrderRepository, PaymentRepository, SqliteOrderRepository, SqlitePaymentRepository},
};

pub struct PaymentService {
    pool: SqlitePool,
    repo: Arc<dyn PaymentRepository>,
    order_repo: Arc<dyn OrderRepository>,
    config: PaymentsConfig,
}

impl PaymentService {
    pub fn new(
        pool: SqlitePool,
        repo: Arc<dyn PaymentRepository>,
        order_repo: Arc<dyn OrderRepository>,
        config: PaymentsConfig,
    ) -> Self {
        Self {
            pool,
            repo,
            order_repo,
            config,
        }
    }

    async fn order_for(&self, actor: &User, order_id: Uuid) -> Result<Order> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        if actor.id != order.buyer_id && !actor.can_manage_platform() {
            return Err(AppError::Forbidden(
                "Only the buyer can pay for this order".to_string(),
            ));
        }
        Ok(order)
    }

    /// Opens a pending gateway payment for the order's current total.
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn create_gateway_order(&self, actor: &User, order_id: Uuid) -> Result<GatewayOrder> {
        if !self.config.razorpay.enabled {
            return Err(AppError::ServiceUnavailable(
                "Online payments are not enabled".to_string(),
            ));
        }
        let order = self.order_for(actor, order_id).await?;
        if order.status != OrderStatus::Pending {
            return Err(AppError::BadRequest(format!(
                "Order is {} and cannot be paid online",
                order.status
            )));
        }

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            order_id,
            provider: PaymentProvider::Razorpay,
            status: PaymentStatus::Pending,
            amount_cents: order.total_price_cents,
            currency: self.config.currency.clone(),
            provider_order_id: Some(razorpay::provider_order_id(order_id, now)),
            provider_payment_id: None,
            provider_signature: None,
            created_at: now,
            updated_at: now,
        };
        let payment = self.repo.create(&payment).await?;

        info!(payment_id = %payment.id, "Gateway order created");
        Ok(GatewayOrder {
            payment_id: payment.id,
            provider_order_id: payment.provider_order_id.clone().unwrap_or_default(),
            amount_cents: payment.amount_cents,
            currency: payment.currency,
            key_id: self.config.razorpay.key_id.clone(),
        })
    }

    /// Settles a gateway payment from its callback. Replayed callbacks for an
    /// already-settled payment return it unchanged.
    #[instrument(skip(self, webhook), fields(provider_order_id = %webhook.provider_order_id))]
    pub async fn handle_webhook(&self, webhook: PaymentWebhook) -> Result<Payment> {
        let payment = self
            .repo
            .find_by_provider_order_id(&webhook.provider_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if let Some(secret) = self.config.razorpay.webhook_secret.as_deref() {
            let signature = webhook.provider_signature.as_deref().unwrap_or_default();
            if !razorpay::verify_signature(
                secret,
                &webhook.provider_order_id,
                &webhook.provider_payment_id,
                signature,
            )? {
                warn!("Rejected webhook with invalid signature");
                return Err(AppError::BadRequest("Invalid webhook signature".to_string()));
            }
        }

        let status = if webhook.is_paid() {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        };

        let mut tx = self.pool.begin().await?;
        let settled = SqlitePaymentRepository::settle_in(
            &mut tx,
            payment.id,
            status,
            &webhook.provider_payment_id,
            webhook.provider_signature.as_deref(),
        )
        .await?;
        if !settled {
            info!(payment_id = %payment.id, "Payment already settled");
            return Ok(payment);
        }

        if status == PaymentStatus::Success {
            let confirmed = SqliteOrderRepository::transition(
                &mut tx,
                payment.order_id,
                &[OrderStatus::Pending],
                OrderStatus::Confirmed,
            )
            .await?;
            if confirmed {
                SqliteOrderRepository::append_timeline(
                    &mut tx,
                    payment.order_id,
                    OrderStatus::Confirmed,
                    Some("Payment received"),
                )
                .await?;
            }
        }
        tx.commit().await?;

        info!(payment_id = %payment.id, status = status.as_str(), "Payment settled");
        self.repo
            .find_by_id(payment.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    /// Records a successful cash-on-delivery payment and confirms the order.
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn confirm_cod(&self, actor: &User, order_id: Uuid) -> Result<Payment> {
        let order = self.order_for(actor, order_id).await?;
        if matches!(
            order.status,
            OrderStatus::Cancelled | OrderStatus::Shipped | OrderStatus::Delivered
        ) {
            return Err(AppError::BadRequest(format!(
                "Cannot confirm cash on delivery for a {} order",
                order.status
            )));
        }

        let mut tx = self.pool.begin().await?;
        let confirmed = SqliteOrderRepository::transition(
            &mut tx,
            order_id,
            &[OrderStatus::Pending],
            OrderStatus::Confirmed,
        )
        .await?;
        if confirmed {
            SqliteOrderRepository::append_timeline(
                &mut tx,
                order_id,
                OrderStatus::Confirmed,
                Some("Cash on delivery confirmed"),
            )
            .await?;
        } else {
            let status = SqliteOrderRepository::find_in(&mut tx, order_id)
                .await?
                .map(|o| o.status);
            if status != Some(OrderStatus::Confirmed) {
                return Err(AppError::BadRequest(
                    "Order can no longer be confirmed".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            order_id,
            provider: PaymentProvider::Cod,
            status: PaymentStatus::Success,
            amount_cents: order.total_price_cents,
            currency: self.config.currency.clone(),
            provider_order_id: None,
            provider_payment_id: None,
            provider_signature: None,
            created_at: now,
            updated_at: now,
        };
        SqlitePaymentRepository::insert_in(&mut tx, &payment).await?;
        tx.commit().await?;

        info!(payment_id = %payment.id, "Cash on delivery confirmed");
        Ok(payment)
    }
}
