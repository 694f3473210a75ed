use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    integrations::{InvoiceData, InvoiceRenderer},
    repository::{
        CartRepository, DeliveryAgentRepository, OrderParty, OrderRepository, PlantRepository,
        SqliteCartRepository, SqliteDeliveryAgentRepository, SqliteOrderRepository,
        SqlitePlantRepository, UserRepository,
    },
};

/// A rendered invoice ready to send.
pub struct RenderedInvoice {
    pub content_type: &'static str,
    pub filename: String,
    pub body: Vec<u8>,
}

/// Order creation and the order/delivery lifecycle.
///
/// Every mutation runs in one transaction whose first statement is the
/// conditional UPDATE guarding it, so competing writers serialize on the
/// database lock and the loser sees the already-changed row.
pub struct OrderService {
    pool: SqlitePool,
    repo: Arc<dyn OrderRepository>,
    cart_repo: Arc<dyn CartRepository>,
    plant_repo: Arc<dyn PlantRepository>,
    user_repo: Arc<dyn UserRepository>,
    agent_repo: Arc<dyn DeliveryAgentRepository>,
    invoices: Arc<dyn InvoiceRenderer>,
    currency: String,
}

impl OrderService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: SqlitePool,
        repo: Arc<dyn OrderRepository>,
        cart_repo: Arc<dyn CartRepository>,
        plant_repo: Arc<dyn PlantRepository>,
        user_repo: Arc<dyn UserRepository>,
        agent_repo: Arc<dyn DeliveryAgentRepository>,
        invoices: Arc<dyn InvoiceRenderer>,
        currency: String,
    ) -> Self {
        Self {
            pool,
            repo,
            cart_repo,
            plant_repo,
            user_repo,
            agent_repo,
            invoices,
            currency,
        }
    }

    /// Takes stock for one line and returns the plant as it now stands.
    async fn take_stock(conn: &mut SqliteConnection, plant_id: Uuid, quantity: i64) -> Result<Plant> {
        if !SqlitePlantRepository::decrement_stock(&mut *conn, plant_id, quantity).await? {
            return Err(match SqlitePlantRepository::find_in(&mut *conn, plant_id).await? {
                Some(plant) if plant.is_purchasable() => {
                    AppError::BadRequest("Insufficient stock".to_string())
                }
                _ => AppError::BadRequest("Product not available".to_string()),
            });
        }

        SqlitePlantRepository::find_in(conn, plant_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Product not available".to_string()))
    }

    /// Decrements stock for every line and writes one pending order per seller,
    /// priced at the plants' current prices.
    async fn place_orders(
        conn: &mut SqliteConnection,
        buyer_id: Uuid,
        lines: &[(Uuid, i64)],
        required_seller: Option<Uuid>,
        shipping_address: &str,
        notes: Option<&str>,
    ) -> Result<Vec<OrderWithItems>> {
        let mut groups: BTreeMap<Uuid, Vec<(Plant, i64)>> = BTreeMap::new();
        for &(plant_id, quantity) in lines {
            let plant = Self::take_stock(&mut *conn, plant_id, quantity).await?;
            if let Some(seller_id) = required_seller {
                if plant.seller_id != seller_id {
                    return Err(AppError::BadRequest(format!(
                        "Plant {} is not sold by this seller",
                        plant.id
                    )));
                }
            }
            groups.entry(plant.seller_id).or_default().push((plant, quantity));
        }

        let mut placed = Vec::with_capacity(groups.len());
        for (seller_id, group) in groups {
            let now = Utc::now();
            let order_id = Uuid::new_v4();
            let items: Vec<OrderItem> = group
                .iter()
                .map(|(plant, quantity)| OrderItem {
                    id: Uuid::new_v4(),
                    order_id,
                    plant_id: plant.id,
                    quantity: *quantity,
                    unit_price_cents: plant.price_cents,
                })
                .collect();
            let total_price_cents = items
                .iter()
                .try_fold(0i64, |acc, item| {
                    item.unit_price_cents
                        .checked_mul(item.quantity)
                        .and_then(|subtotal| acc.checked_add(subtotal))
                })
                .ok_or_else(|| AppError::BadRequest("Order total is too large".to_string()))?;

            let order = Order {
                id: order_id,
                buyer_id,
                seller_id,
                delivery_agent_id: None,
                status: OrderStatus::Pending,
                total_price_cents,
                shipping_address: shipping_address.to_string(),
                notes: notes.map(str::to_string),
                created_at: now,
                updated_at: now,
            };

            SqliteOrderRepository::insert_order(&mut *conn, &order).await?;
            for item in &items {
                SqliteOrderRepository::insert_item(&mut *conn, item).await?;
            }
            SqliteOrderRepository::append_timeline(
                &mut *conn,
                order.id,
                OrderStatus::Pending,
                Some("Order placed"),
            )
            .await?;

            placed.push(OrderWithItems { order, items });
        }

        Ok(placed)
    }

    /// Turns the buyer's cart into one order per seller and removes the consumed lines.
    #[instrument(skip(self, request))]
    pub async fn checkout(&self, buyer_id: Uuid, request: CheckoutRequest) -> Result<CheckoutResponse> {
        request.validate()?;

        // The cart is read before the transaction opens. Stock is re-checked by the
        // guarded decrements below and only the lines read here are deleted, so an
        // item added concurrently stays in the cart for the next checkout.
        let cart = self.cart_repo.find_or_create(buyer_id).await?;
        if cart.items.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".to_string()));
        }
        let lines: Vec<(Uuid, i64)> = cart
            .items
            .iter()
            .map(|item| (item.plant_id, item.quantity))
            .collect();
        let consumed: Vec<Uuid> = cart.items.iter().map(|item| item.id).collect();

        let mut tx = self.pool.begin().await?;
        let placed = Self::place_orders(
            &mut tx,
            buyer_id,
            &lines,
            None,
            &request.shipping_address,
            request.notes.as_deref(),
        )
        .await?;
        SqliteCartRepository::delete_items_in(&mut tx, &consumed).await?;
        tx.commit().await?;

        info!(orders = placed.len(), "Checkout completed");

        let orders: Vec<CheckoutOrderSummary> =
            placed.iter().map(|p| CheckoutOrderSummary::from(&p.order)).collect();

        Ok(match request.payment_method {
            PaymentMethod::Cod => CheckoutResponse {
                orders,
                payment_required: false,
                payment_provider: None,
                payment_payload: None,
            },
            PaymentMethod::Razorpay => {
                let amount = orders
                    .iter()
                    .fold(0i64, |acc, o| acc.saturating_add(o.total_price_cents));
                let order_ids: Vec<Uuid> = orders.iter().map(|o| o.order_id).collect();
                CheckoutResponse {
                    payment_payload: Some(json!({
                        "order_ids": order_ids,
                        "amount_cents": amount,
                        "currency": self.currency,
                        "create_order_url": "/api/payments/razorpay/order",
                    })),
                    orders,
                    payment_required: true,
                    payment_provider: Some("razorpay".to_string()),
                }
            }
        })
    }

    /// Places a single-seller order without going through the cart.
    #[instrument(skip(self, request), fields(seller_id = %request.seller_id))]
    pub async fn create(&self, buyer_id: Uuid, request: CreateOrderRequest) -> Result<OrderWithItems> {
        request.validate()?;

        let lines: Vec<(Uuid, i64)> = request
            .items
            .iter()
            .map(|item| (item.plant_id, item.quantity))
            .collect();

        let mut tx = self.pool.begin().await?;
        let mut placed = Self::place_orders(
            &mut tx,
            buyer_id,
            &lines,
            Some(request.seller_id),
            &request.shipping_address,
            request.notes.as_deref(),
        )
        .await?;
        let order = placed
            .pop()
            .ok_or_else(|| AppError::Internal("No order was placed".to_string()))?;
        tx.commit().await?;

        info!(order_id = %order.order.id, "Order created");
        Ok(order)
    }

    async fn load_for(&self, actor: &User, order_id: Uuid) -> Result<Order> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if !actor.can_manage_order(order.buyer_id, order.seller_id) {
            return Err(AppError::Forbidden(
                "Not authorized to access this order".to_string(),
            ));
        }
        Ok(order)
    }

    pub async fn get(&self, actor: &User, order_id: Uuid) -> Result<OrderWithItems> {
        let order = self.load_for(actor, order_id).await?;
        let items = self.repo.find_items(order_id).await?;
        Ok(OrderWithItems { order, items })
    }

    pub async fn timeline(&self, actor: &User, order_id: Uuid) -> Result<Vec<TimelineEntry>> {
        self.load_for(actor, order_id).await?;
        self.repo.timeline(order_id).await
    }

    pub async fn list_as_buyer(&self, actor: &User, page: PageParams) -> Result<Page<Order>> {
        let (orders, total) = self.repo.list_for(OrderParty::Buyer, actor.id, page).await?;
        Ok(Page::new(orders, total, page))
    }

    pub async fn list_as_seller(&self, actor: &User, page: PageParams) -> Result<Page<Order>> {
        let (orders, total) = self.repo.list_for(OrderParty::Seller, actor.id, page).await?;
        Ok(Page::new(orders, total, page))
    }

    /// Sellers see stats over what they sold; everyone else over what they bought.
    pub async fn stats(&self, actor: &User) -> Result<OrderStats> {
        let party = if actor.role == UserRole::Seller {
            OrderParty::Seller
        } else {
            OrderParty::Buyer
        };
        self.repo.stats_for(party, actor.id).await
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn update_status(
        &self,
        actor: &User,
        order_id: Uuid,
        target: OrderStatus,
    ) -> Result<Order> {
        if target == OrderStatus::Cancelled {
            return self.cancel(actor, order_id).await;
        }
        let current = self.load_for(actor, order_id).await?;

        let mut tx = self.pool.begin().await?;
        let moved = SqliteOrderRepository::transition(
            &mut tx,
            order_id,
            OrderStatus::sources_of(target),
            target,
        )
        .await?;
        if !moved {
            let status = SqliteOrderRepository::find_in(&mut tx, order_id)
                .await?
                .map(|o| o.status)
                .unwrap_or(current.status);
            return Err(AppError::BadRequest(format!(
                "Cannot change order status from {} to {}",
                status, target
            )));
        }

        let updated = SqliteOrderRepository::find_in(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        if target == OrderStatus::Delivered {
            if let Some(agent_id) = updated.delivery_agent_id {
                SqliteDeliveryAgentRepository::release(&mut tx, agent_id).await?;
            }
        }
        SqliteOrderRepository::append_timeline(
            &mut tx,
            order_id,
            target,
            Some(&format!("Status changed to {}", target)),
        )
        .await?;
        tx.commit().await?;

        info!(status = %target, "Order status updated");
        Ok(updated)
    }

    /// Cancels a pending or confirmed order, returning its stock and freeing its agent.
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn cancel(&self, actor: &User, order_id: Uuid) -> Result<Order> {
        let current = self.load_for(actor, order_id).await?;

        let mut tx = self.pool.begin().await?;
        let moved = SqliteOrderRepository::transition(
            &mut tx,
            order_id,
            OrderStatus::sources_of(OrderStatus::Cancelled),
            OrderStatus::Cancelled,
        )
        .await?;
        if !moved {
            let status = SqliteOrderRepository::find_in(&mut tx, order_id)
                .await?
                .map(|o| o.status)
                .unwrap_or(current.status);
            return Err(AppError::BadRequest(format!(
                "Order cannot be cancelled in status {}",
                status
            )));
        }

        for item in SqliteOrderRepository::items_in(&mut tx, order_id).await? {
            SqlitePlantRepository::restore_stock(&mut tx, item.plant_id, item.quantity).await?;
        }

        let cancelled = SqliteOrderRepository::find_in(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        if let Some(agent_id) = cancelled.delivery_agent_id {
            SqliteDeliveryAgentRepository::release(&mut tx, agent_id).await?;
        }
        SqliteOrderRepository::append_timeline(
            &mut tx,
            order_id,
            OrderStatus::Cancelled,
            Some("Order cancelled"),
        )
        .await?;
        tx.commit().await?;

        info!("Order cancelled");
        Ok(cancelled)
    }

    /// Hands an order to an active agent. The agent becomes busy and the order confirmed.
    #[instrument(skip(self))]
    pub async fn assign_delivery(&self, order_id: Uuid, agent_id: Uuid) -> Result<Order> {
        self.repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        self.agent_repo
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery agent not found".to_string()))?;

        let mut tx = self.pool.begin().await?;
        if !SqliteDeliveryAgentRepository::claim(&mut tx, agent_id).await? {
            return Err(AppError::BadRequest(
                "Agent is not available for delivery".to_string(),
            ));
        }
        if !SqliteOrderRepository::attach_agent(&mut tx, order_id, agent_id, OrderStatus::ASSIGNABLE)
            .await?
        {
            return Err(AppError::BadRequest(
                "Order cannot be assigned for delivery in its current state".to_string(),
            ));
        }
        SqliteOrderRepository::append_timeline(
            &mut tx,
            order_id,
            OrderStatus::Confirmed,
            Some("Assigned to agent"),
        )
        .await?;
        let order = SqliteOrderRepository::find_in(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        tx.commit().await?;

        info!("Order assigned for delivery");
        Ok(order)
    }

    /// Marks an order delivered by the agent holding it and frees that agent.
    #[instrument(skip(self))]
    pub async fn complete_delivery(&self, order_id: Uuid, agent_id: Uuid) -> Result<Order> {
        let mut tx = self.pool.begin().await?;
        let completed = SqliteOrderRepository::complete_with_agent(
            &mut tx,
            order_id,
            agent_id,
            OrderStatus::COMPLETABLE,
        )
        .await?;
        if !completed {
            return Err(match SqliteOrderRepository::find_in(&mut tx, order_id).await? {
                None => AppError::NotFound("Order not found".to_string()),
                Some(order) if order.delivery_agent_id != Some(agent_id) => {
                    AppError::BadRequest("Order is not assigned to this agent".to_string())
                }
                Some(order) => AppError::BadRequest(format!(
                    "Order cannot be delivered from status {}",
                    order.status
                )),
            });
        }

        SqliteDeliveryAgentRepository::release(&mut tx, agent_id).await?;
        SqliteOrderRepository::append_timeline(
            &mut tx,
            order_id,
            OrderStatus::Delivered,
            Some("Delivered"),
        )
        .await?;
        let order = SqliteOrderRepository::find_in(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        tx.commit().await?;

        info!("Delivery completed");
        Ok(order)
    }

    pub async fn invoice(&self, actor: &User, order_id: Uuid) -> Result<RenderedInvoice> {
        let order = self.load_for(actor, order_id).await?;
        let items = self.repo.find_items(order_id).await?;

        let buyer_name = self.display_name(order.buyer_id).await?;
        let seller_name = self.display_name(order.seller_id).await?;

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let name = self
                .plant_repo
                .find_by_id(item.plant_id)
                .await?
                .map(|p| p.name)
                .unwrap_or_else(|| "Unlisted plant".to_string());
            lines.push((item, name));
        }

        let data = InvoiceData {
            order,
            buyer_name,
            seller_name,
            lines,
            currency: self.currency.clone(),
        };

        Ok(RenderedInvoice {
            content_type: self.invoices.content_type(),
            filename: format!("invoice-{}.{}", order_id, self.invoices.file_extension()),
            body: self.invoices.render(&data)?,
        })
    }

    async fn display_name(&self, user_id: Uuid) -> Result<String> {
        Ok(self
            .user_repo
            .find_by_id(user_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| "Unknown".to_string()))
    }
}
