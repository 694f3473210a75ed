mod common;

use std::sync::Arc;

use common::*;
use verdant::domain::{
    CreateOrderRequest, OrderItemInput, OrderStatus, PaymentMethod, UserRole,
};

#[tokio::test]
async fn test_checkout_splits_cart_by_seller() -> anyhow::Result<()> {
    let mut settings = test_settings();
    settings.payments.razorpay.enabled = true;
    let ctx = context(memory_pool().await?, &settings);

    let seller_a = seller(&ctx, "Alder").await?;
    let seller_b = seller(&ctx, "Birch").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let fern = plant(&ctx, &seller_a, "Fern", 1000, 5).await?;
    let ivy = plant(&ctx, &seller_a, "Ivy", 1000, 5).await?;
    let sage = plant(&ctx, &seller_b, "Sage", 500, 5).await?;

    add_to_cart(&ctx, &buyer, fern.id, 1).await?;
    add_to_cart(&ctx, &buyer, ivy.id, 1).await?;
    let cart = add_to_cart(&ctx, &buyer, sage.id, 1).await?;

    let response = ctx
        .order_service
        .checkout(buyer.id, checkout_request(PaymentMethod::Cod))
        .await?;

    assert!(!response.payment_required);
    assert!(response.payment_provider.is_none());
    assert_eq!(response.orders.len(), 2);

    let a_order = response
        .orders
        .iter()
        .find(|o| o.seller_id == seller_a.id)
        .expect("order for seller A");
    let b_order = response
        .orders
        .iter()
        .find(|o| o.seller_id == seller_b.id)
        .expect("order for seller B");
    assert_eq!(a_order.total_price_cents, 2000);
    assert_eq!(b_order.total_price_cents, 500);
    assert!(response.orders.iter().all(|o| o.status == OrderStatus::Pending));

    // Order totals add up to the cart, and each total matches its items.
    let sum: i64 = response.orders.iter().map(|o| o.total_price_cents).sum();
    assert_eq!(sum, cart.total_price_cents);
    for summary in &response.orders {
        let order = ctx.order_service.get(&buyer, summary.order_id).await?;
        let items: i64 = order.items.iter().map(|i| i.subtotal_cents()).sum();
        assert_eq!(order.order.total_price_cents, items);
        assert!(order
            .items
            .iter()
            .all(|i| i.quantity > 0 && i.unit_price_cents > 0));
    }

    assert_eq!(stock_of(&ctx, fern.id).await?, 4);
    assert_eq!(stock_of(&ctx, sage.id).await?, 4);
    assert!(ctx.cart_service.get(buyer.id).await?.cart.items.is_empty());

    let timeline = ctx.order_service.timeline(&buyer, a_order.order_id).await?;
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].status, OrderStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn test_checkout_with_gateway_requires_payment() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Alder").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let fern = plant(&ctx, &vendor, "Fern", 1500, 5).await?;
    add_to_cart(&ctx, &buyer, fern.id, 2).await?;

    let response = ctx
        .order_service
        .checkout(buyer.id, checkout_request(PaymentMethod::Razorpay))
        .await?;

    assert!(response.payment_required);
    assert_eq!(response.payment_provider.as_deref(), Some("razorpay"));
    let payload = response.payment_payload.expect("payment payload");
    assert_eq!(payload["amount_cents"], 3000);
    assert_eq!(payload["currency"], "INR");

    Ok(())
}

#[tokio::test]
async fn test_checkout_empty_cart_fails() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;

    let err = ctx
        .order_service
        .checkout(buyer.id, checkout_request(PaymentMethod::Cod))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Cart is empty"));

    Ok(())
}

#[tokio::test]
async fn test_checkout_is_all_or_nothing() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Alder").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let rival = user(&ctx, "Ravi", UserRole::User).await?;
    let fern = plant(&ctx, &vendor, "Fern", 1000, 5).await?;
    let rare = plant(&ctx, &vendor, "Rare Orchid", 9000, 1).await?;

    add_to_cart(&ctx, &buyer, fern.id, 2).await?;
    add_to_cart(&ctx, &buyer, rare.id, 1).await?;

    // Someone else buys the last orchid between add-to-cart and checkout.
    add_to_cart(&ctx, &rival, rare.id, 1).await?;
    ctx.order_service
        .checkout(rival.id, checkout_request(PaymentMethod::Cod))
        .await?;

    let err = ctx
        .order_service
        .checkout(buyer.id, checkout_request(PaymentMethod::Cod))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Insufficient stock"));

    // Nothing from the failed checkout stuck.
    assert_eq!(stock_of(&ctx, fern.id).await?, 5);
    assert_eq!(ctx.cart_service.get(buyer.id).await?.cart.items.len(), 2);
    let orders = ctx
        .order_service
        .list_as_buyer(&buyer, Default::default())
        .await?;
    assert_eq!(orders.total, 0);

    Ok(())
}

#[tokio::test]
async fn test_direct_order_for_single_seller() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Alder").await?;
    let other = seller(&ctx, "Birch").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let fern = plant(&ctx, &vendor, "Fern", 800, 5).await?;
    let sage = plant(&ctx, &other, "Sage", 500, 5).await?;

    let order = ctx
        .order_service
        .create(
            buyer.id,
            CreateOrderRequest {
                seller_id: vendor.id,
                items: vec![OrderItemInput { plant_id: fern.id, quantity: 3 }],
                shipping_address: "42 Greenhouse Road".to_string(),
                notes: Some("Leave at the gate".to_string()),
            },
        )
        .await?;
    assert_eq!(order.order.total_price_cents, 2400);
    assert_eq!(order.order.seller_id, vendor.id);
    assert_eq!(stock_of(&ctx, fern.id).await?, 2);

    let err = ctx
        .order_service
        .create(
            buyer.id,
            CreateOrderRequest {
                seller_id: vendor.id,
                items: vec![OrderItemInput { plant_id: sage.id, quantity: 1 }],
                shipping_address: "42 Greenhouse Road".to_string(),
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not sold by this seller"));
    assert_eq!(stock_of(&ctx, sage.id).await?, 5);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_checkouts_never_oversell() -> anyhow::Result<()> {
    let pool = file_pool(4).await?;
    let ctx = Arc::new(context(pool, &test_settings()));
    let vendor = seller(&ctx, "Alder").await?;
    let last_one = plant(&ctx, &vendor, "Last Bonsai", 5000, 1).await?;

    let first = user(&ctx, "Asha", UserRole::User).await?;
    let second = user(&ctx, "Ravi", UserRole::User).await?;
    add_to_cart(&ctx, &first, last_one.id, 1).await?;
    add_to_cart(&ctx, &second, last_one.id, 1).await?;

    let handles: Vec<_> = [first.id, second.id]
        .into_iter()
        .map(|buyer_id| {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                ctx.order_service
                    .checkout(buyer_id, checkout_request(PaymentMethod::Cod))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    let mut failures = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(_) => successes += 1,
            Err(e) => failures.push(e.to_string()),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("Insufficient stock"));
    assert_eq!(stock_of(&ctx, last_one.id).await?, 0);

    Ok(())
}
