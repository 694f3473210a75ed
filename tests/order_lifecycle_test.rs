mod common;

use std::sync::Arc;

use common::*;
use uuid::Uuid;
use verdant::{
    domain::{AgentStatus, OrderStatus, PaymentMethod, User, UserRole},
    error::Result as AppResult,
    integrations::{
        Collaborators, DisabledClassifier, InvoiceData, InvoiceRenderer, LocalBlobStorage,
    },
    service::ServiceContext,
};

/// One comma-separated row per order line.
struct CsvInvoiceRenderer;

impl InvoiceRenderer for CsvInvoiceRenderer {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, invoice: &InvoiceData) -> AppResult<Vec<u8>> {
        let rows: Vec<String> = invoice
            .lines
            .iter()
            .map(|(item, name)| format!("{},{},{}", name, item.quantity, item.unit_price_cents))
            .collect();
        Ok(rows.join("\n").into_bytes())
    }
}

/// Order id, plant id, buyer and seller of a fresh single-line COD order.
async fn placed_order(
    ctx: &ServiceContext,
    stock: i64,
    quantity: i64,
) -> anyhow::Result<(Uuid, Uuid, User, User)> {
    let vendor = seller(ctx, "Alder").await?;
    let buyer = user(ctx, "Asha", UserRole::User).await?;
    let fern = plant(ctx, &vendor, "Fern", 700, stock).await?;
    add_to_cart(ctx, &buyer, fern.id, quantity).await?;
    let response = ctx
        .order_service
        .checkout(buyer.id, checkout_request(PaymentMethod::Cod))
        .await?;
    Ok((response.orders[0].order_id, fern.id, buyer, vendor))
}

#[tokio::test]
async fn test_status_follows_legal_transitions() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let (order_id, _, buyer, vendor) = placed_order(&ctx, 5, 1).await?;

    let err = ctx
        .order_service
        .update_status(&vendor, order_id, OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Cannot change order status from pending to shipped"));

    for status in [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered] {
        let order = ctx.order_service.update_status(&vendor, order_id, status).await?;
        assert_eq!(order.status, status);
    }

    let err = ctx
        .order_service
        .update_status(&vendor, order_id, OrderStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("from delivered"));

    let timeline = ctx.order_service.timeline(&buyer, order_id).await?;
    let statuses: Vec<OrderStatus> = timeline.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_strangers_cannot_touch_orders() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let (order_id, _, _, _) = placed_order(&ctx, 5, 1).await?;
    let stranger = user(&ctx, "Mallory", UserRole::User).await?;
    let admin = user(&ctx, "Root", UserRole::Admin).await?;

    let err = ctx.order_service.get(&stranger, order_id).await.unwrap_err();
    assert!(err.to_string().contains("Not authorized"));
    let err = ctx
        .order_service
        .update_status(&stranger, order_id, OrderStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Not authorized"));

    assert!(ctx.order_service.get(&admin, order_id).await.is_ok());

    let err = ctx.order_service.get(&admin, Uuid::new_v4()).await.unwrap_err();
    assert!(err.to_string().contains("Order not found"));

    Ok(())
}

#[tokio::test]
async fn test_cancel_restores_stock() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let (order_id, plant_id, buyer, _) = placed_order(&ctx, 5, 3).await?;
    assert_eq!(stock_of(&ctx, plant_id).await?, 2);

    let order = ctx.order_service.cancel(&buyer, order_id).await?;
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&ctx, plant_id).await?, 5);

    // A second cancel must not restore stock twice.
    let err = ctx.order_service.cancel(&buyer, order_id).await.unwrap_err();
    assert!(err.to_string().contains("cannot be cancelled"));
    assert_eq!(stock_of(&ctx, plant_id).await?, 5);

    Ok(())
}

#[tokio::test]
async fn test_cancel_after_shipping_is_rejected() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let (order_id, plant_id, buyer, vendor) = placed_order(&ctx, 5, 2).await?;

    ctx.order_service
        .update_status(&vendor, order_id, OrderStatus::Confirmed)
        .await?;
    ctx.order_service
        .update_status(&vendor, order_id, OrderStatus::Shipped)
        .await?;

    let err = ctx
        .order_service
        .update_status(&buyer, order_id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cannot be cancelled in status shipped"));
    assert_eq!(stock_of(&ctx, plant_id).await?, 3);

    Ok(())
}

#[tokio::test]
async fn test_delivery_assignment_and_completion() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let (order_id, _, buyer, _) = placed_order(&ctx, 5, 1).await?;
    let driver = agent(&ctx, "Dev").await?;
    assert_eq!(driver.status, AgentStatus::Active);

    let order = ctx.order_service.assign_delivery(order_id, driver.id).await?;
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.delivery_agent_id, Some(driver.id));
    assert_eq!(ctx.delivery_service.get(driver.id).await?.status, AgentStatus::Busy);
    assert_eq!(ctx.delivery_service.orders_for(driver.id).await?.len(), 1);

    // A busy agent cannot take a second order.
    let (second_order, _, _, _) = placed_order(&ctx, 5, 1).await?;
    let err = ctx
        .order_service
        .assign_delivery(second_order, driver.id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Agent is not available for delivery"));

    let stranger = agent(&ctx, "Eve").await?;
    let err = ctx
        .order_service
        .complete_delivery(order_id, stranger.id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not assigned to this agent"));

    let order = ctx.order_service.complete_delivery(order_id, driver.id).await?;
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(ctx.delivery_service.get(driver.id).await?.status, AgentStatus::Active);

    let timeline = ctx.order_service.timeline(&buyer, order_id).await?;
    assert_eq!(timeline.last().map(|e| e.status), Some(OrderStatus::Delivered));

    Ok(())
}

#[tokio::test]
async fn test_inactive_agent_cannot_be_assigned() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let (order_id, _, buyer, _) = placed_order(&ctx, 5, 1).await?;
    let driver = agent(&ctx, "Dev").await?;
    ctx.delivery_service
        .set_status(driver.id, AgentStatus::Inactive)
        .await?;

    let err = ctx
        .order_service
        .assign_delivery(order_id, driver.id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Agent is not available for delivery"));

    let order = ctx.order_service.get(&buyer, order_id).await?;
    assert_eq!(order.order.status, OrderStatus::Pending);
    assert_eq!(order.order.delivery_agent_id, None);

    let available = ctx.delivery_service.available().await?;
    assert!(available.iter().all(|a| a.id != driver.id));

    Ok(())
}

#[tokio::test]
async fn test_cancel_releases_assigned_agent() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let (order_id, _, buyer, _) = placed_order(&ctx, 5, 1).await?;
    let driver = agent(&ctx, "Dev").await?;

    ctx.order_service.assign_delivery(order_id, driver.id).await?;
    ctx.order_service.cancel(&buyer, order_id).await?;

    assert_eq!(ctx.delivery_service.get(driver.id).await?.status, AgentStatus::Active);

    Ok(())
}

#[tokio::test]
async fn test_invoice_lists_order_lines() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let (order_id, _, buyer, _) = placed_order(&ctx, 5, 2).await?;

    let invoice = ctx.order_service.invoice(&buyer, order_id).await?;
    let text = String::from_utf8(invoice.body)?;
    assert!(invoice.content_type.starts_with("text/plain"));
    assert_eq!(invoice.filename, format!("invoice-{}.txt", order_id));
    assert!(text.contains("2 x Fern @ 7.00 = 14.00"));
    assert!(text.contains("Total: 14.00 INR"));

    Ok(())
}

#[tokio::test]
async fn test_invoice_filename_follows_renderer() -> anyhow::Result<()> {
    let settings = test_settings();
    let collaborators = Collaborators::new(
        Arc::new(LocalBlobStorage::new(&settings.storage)),
        Arc::new(DisabledClassifier),
        Arc::new(CsvInvoiceRenderer),
    );
    let ctx = ServiceContext::new(memory_pool().await?, collaborators, &settings);
    let (order_id, _, buyer, _) = placed_order(&ctx, 5, 2).await?;

    let invoice = ctx.order_service.invoice(&buyer, order_id).await?;
    assert_eq!(invoice.content_type, "text/csv");
    assert_eq!(invoice.filename, format!("invoice-{}.csv", order_id));
    assert_eq!(String::from_utf8(invoice.body)?, "Fern,2,700");

    Ok(())
}

#[tokio::test]
async fn test_concurrent_assignments_claim_agent_once() -> anyhow::Result<()> {
    let ctx = Arc::new(context(file_pool(4).await?, &test_settings()));
    let (first_order, _, _, _) = placed_order(&ctx, 5, 1).await?;
    let (second_order, _, _, _) = placed_order(&ctx, 5, 1).await?;
    let driver = agent(&ctx, "Dev").await?;

    let handles: Vec<_> = [first_order, second_order]
        .into_iter()
        .map(|order_id| {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.order_service.assign_delivery(order_id, driver.id).await })
        })
        .collect();

    let mut assigned = Vec::new();
    let mut failures = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(order) => assigned.push(order.id),
            Err(e) => failures.push(e.to_string()),
        }
    }

    assert_eq!(assigned.len(), 1);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("Agent is not available for delivery"));
    assert_eq!(ctx.delivery_service.get(driver.id).await?.status, AgentStatus::Busy);

    let held = ctx.delivery_service.orders_for(driver.id).await?;
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].id, assigned[0]);

    Ok(())
}
