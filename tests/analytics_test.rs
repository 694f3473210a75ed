mod common;

use common::*;
use verdant::domain::{OrderStatus, PaymentMethod, UserRole};

#[tokio::test]
async fn test_empty_marketplace_reports_zeroes() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Alder").await?;

    let stats = ctx.analytics_service.dashboard_stats().await?;
    assert_eq!(stats.total_orders, 0);
    assert_eq!(stats.total_revenue_cents, 0);
    assert_eq!(stats.total_plants, 0);

    let revenue = ctx.analytics_service.revenue_stats().await?;
    assert_eq!(revenue.total_revenue_cents, 0);
    assert_eq!(revenue.revenue_by_month.len(), 12);
    assert!(revenue.revenue_by_month.iter().all(|m| m.amount_cents == 0));

    let seller_stats = ctx.analytics_service.seller_stats(vendor.id).await?;
    assert_eq!(seller_stats.average_order_value_cents, 0);
    assert_eq!(seller_stats.conversion_rate, 0.0);

    let dashboard = ctx.analytics_service.seller_dashboard(vendor.id).await?;
    assert!(dashboard.top_selling_plants.is_empty());
    assert!(dashboard.recent_orders.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_seller_revenue_counts_delivered_orders() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Alder").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let fern = plant(&ctx, &vendor, "Fern", 1000, 10).await?;

    let mut order_ids = Vec::new();
    for quantity in [2, 1] {
        add_to_cart(&ctx, &buyer, fern.id, quantity).await?;
        let response = ctx
            .order_service
            .checkout(buyer.id, checkout_request(PaymentMethod::Cod))
            .await?;
        order_ids.push(response.orders[0].order_id);
    }

    for status in [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered] {
        ctx.order_service
            .update_status(&vendor, order_ids[0], status)
            .await?;
    }

    let stats = ctx.analytics_service.seller_stats(vendor.id).await?;
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.total_revenue_cents, 2000);
    assert_eq!(stats.average_order_value_cents, 2000);
    assert_eq!(stats.conversion_rate, 50.0);

    let performance = ctx
        .analytics_service
        .seller_performance(vendor.id, None)
        .await?;
    assert_eq!(performance.period_days, 30);
    assert_eq!(performance.revenue_cents, 2000);
    assert_eq!(performance.plants_sold, 2);

    let err = ctx
        .analytics_service
        .seller_performance(vendor.id, Some(0))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("days"));

    let order_stats = ctx.order_service.stats(&vendor).await?;
    assert_eq!(order_stats.total_orders, 2);
    assert_eq!(order_stats.completed_orders, 1);
    assert_eq!(order_stats.pending_orders, 1);

    let buyer_stats = ctx.order_service.stats(&buyer).await?;
    assert_eq!(buyer_stats.total_orders, 2);

    Ok(())
}
