mod common;

use common::*;
use verdant::{
    domain::{
        AddCartItemRequest, ApprovalStatus, PageParams, UpdateCartItemRequest, UpdatePlantRequest,
        UserRole,
    },
    error::AppError,
};

#[tokio::test]
async fn test_cart_merges_lines_and_keeps_captured_price() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Fern").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let monstera = plant(&ctx, &vendor, "Monstera", 1200, 10).await?;

    let cart = ctx.cart_service.get(buyer.id).await?;
    assert!(cart.cart.items.is_empty());
    assert_eq!(cart.total_price_cents, 0);

    add_to_cart(&ctx, &buyer, monstera.id, 2).await?;

    // A price change after the first add does not reprice the existing line.
    ctx.catalog_service
        .update(
            &vendor,
            monstera.id,
            UpdatePlantRequest {
                price_cents: Some(1500),
                ..Default::default()
            },
        )
        .await?;

    let cart = add_to_cart(&ctx, &buyer, monstera.id, 3).await?;
    assert_eq!(cart.cart.items.len(), 1);
    assert_eq!(cart.cart.items[0].quantity, 5);
    assert_eq!(cart.cart.items[0].unit_price_cents, 1200);
    assert_eq!(cart.total_quantity, 5);
    assert_eq!(cart.total_price_cents, 6000);

    Ok(())
}

#[tokio::test]
async fn test_cart_rejects_more_than_stock() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Fern").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let cactus = plant(&ctx, &vendor, "Cactus", 500, 3).await?;

    let err = add_to_cart(&ctx, &buyer, cactus.id, 4).await.unwrap_err();
    assert!(err.to_string().contains("Insufficient stock"));

    add_to_cart(&ctx, &buyer, cactus.id, 2).await?;
    // The combined quantity is what gets checked.
    let err = add_to_cart(&ctx, &buyer, cactus.id, 2).await.unwrap_err();
    assert!(err.to_string().contains("Insufficient stock"));

    let cart = ctx.cart_service.get(buyer.id).await?;
    assert_eq!(cart.total_quantity, 2);

    Ok(())
}

#[tokio::test]
async fn test_cart_rejects_unavailable_plants() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Fern").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let pending = plant(&ctx, &vendor, "Orchid", 900, 5).await?;
    ctx.catalog_service
        .set_approval_status(pending.id, ApprovalStatus::Pending)
        .await?;

    let err = add_to_cart(&ctx, &buyer, pending.id, 1).await.unwrap_err();
    assert!(err.to_string().contains("Product not available"));

    let removed = plant(&ctx, &vendor, "Aloe", 300, 5).await?;
    ctx.catalog_service.delete(&vendor, removed.id).await?;
    let err = add_to_cart(&ctx, &buyer, removed.id, 1).await.unwrap_err();
    assert!(err.to_string().contains("Product not available"));

    Ok(())
}

#[tokio::test]
async fn test_cart_update_remove_and_clear() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Fern").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let basil = plant(&ctx, &vendor, "Basil", 250, 10).await?;
    let mint = plant(&ctx, &vendor, "Mint", 150, 10).await?;

    add_to_cart(&ctx, &buyer, basil.id, 1).await?;
    let cart = add_to_cart(&ctx, &buyer, mint.id, 1).await?;
    let basil_line = cart
        .cart
        .find_plant(basil.id)
        .map(|item| item.id)
        .expect("basil line");

    let cart = ctx
        .cart_service
        .update_item(buyer.id, basil_line, UpdateCartItemRequest { quantity: 4 })
        .await?;
    assert_eq!(cart.total_price_cents, 4 * 250 + 150);

    let err = ctx
        .cart_service
        .update_item(buyer.id, basil_line, UpdateCartItemRequest { quantity: 11 })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Insufficient stock"));

    let err = ctx
        .cart_service
        .update_item(buyer.id, uuid::Uuid::new_v4(), UpdateCartItemRequest { quantity: 1 })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Item not found"));

    let cart = ctx.cart_service.remove_item(buyer.id, basil_line).await?;
    assert_eq!(cart.cart.items.len(), 1);

    let cart = ctx.cart_service.clear(buyer.id).await?;
    assert!(cart.cart.items.is_empty());
    assert_eq!(cart.total_quantity, 0);

    Ok(())
}

#[tokio::test]
async fn test_oversized_quantities_are_rejected() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Fern").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let monstera = plant(&ctx, &vendor, "Monstera", 1200, 1_000_000).await?;

    let cart = add_to_cart(&ctx, &buyer, monstera.id, 2).await?;
    let line = cart.cart.items[0].id;

    let err = ctx
        .cart_service
        .add_item(
            buyer.id,
            AddCartItemRequest {
                plant_id: monstera.id,
                quantity: i64::MAX,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = ctx
        .cart_service
        .update_item(
            buyer.id,
            line,
            UpdateCartItemRequest { quantity: i64::MAX },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Merged lines grow past the per-request cap only within stock.
    let cart = add_to_cart(&ctx, &buyer, monstera.id, 1000).await?;
    assert_eq!(cart.total_quantity, 1002);
    assert_eq!(cart.total_price_cents, 1002 * 1200);

    Ok(())
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;

    let page = ctx
        .order_service
        .list_as_buyer(
            &buyer,
            PageParams {
                page: i64::MAX,
                size: i64::MAX,
            },
        )
        .await?;
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);

    Ok(())
}
