mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::*;
use verdant::{
    domain::{
        ApprovalStatus, Classification, CreateAnnouncementRequest, CreatePlantRequest,
        CreateReviewRequest, PlantSearch, UserRole,
    },
    error::Result,
    integrations::{Collaborators, LocalBlobStorage, PlantClassifier, TextInvoiceRenderer},
    service::ServiceContext,
};

struct AlwaysMonstera;

#[async_trait]
impl PlantClassifier for AlwaysMonstera {
    fn name(&self) -> &str {
        "vision"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn classify(&self, _image: &[u8]) -> Result<Classification> {
        Ok(Classification {
            is_plant: true,
            plant_type: Some("Monstera deliciosa".to_string()),
            confidence: 0.92,
        })
    }
}

fn listing(name: &str) -> CreatePlantRequest {
    CreatePlantRequest {
        name: name.to_string(),
        description: Some("Easy going".to_string()),
        price_cents: 1500,
        category: Some("Indoor".to_string()),
        species: None,
        care_instructions: None,
        stock_quantity: 3,
        image_url: None,
        verified_by_ai: false,
    }
}

#[tokio::test]
async fn test_vendor_listings_wait_for_moderation() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Alder").await?;
    let admin = user(&ctx, "Root", UserRole::Admin).await?;

    let pending = ctx.catalog_service.create(&vendor, listing("Pothos")).await?;
    assert_eq!(pending.approval_status, ApprovalStatus::Pending);
    let live = ctx.catalog_service.create(&admin, listing("Calathea")).await?;
    assert_eq!(live.approval_status, ApprovalStatus::Approved);

    let page = ctx
        .catalog_service
        .search(&PlantSearch::default(), Default::default())
        .await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, live.id);

    ctx.catalog_service
        .set_approval_status(pending.id, ApprovalStatus::Approved)
        .await?;
    let page = ctx
        .catalog_service
        .search(&PlantSearch::default(), Default::default())
        .await?;
    assert_eq!(page.total, 2);

    assert_eq!(ctx.catalog_service.list_mine(&vendor).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unapproved_users_cannot_list_or_edit() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Alder").await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;

    let err = ctx
        .catalog_service
        .create(&buyer, listing("Pothos"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Only approved vendors"));

    let fern = plant(&ctx, &vendor, "Fern", 900, 2).await?;
    let err = ctx.catalog_service.delete(&buyer, fern.id).await.unwrap_err();
    assert!(err.to_string().contains("Not authorized"));

    ctx.catalog_service.delete(&vendor, fern.id).await?;
    let hidden = ctx
        .catalog_service
        .search(&PlantSearch::default(), Default::default())
        .await?;
    assert_eq!(hidden.total, 0);
    // Soft-deleted plants stay resolvable for order history.
    assert!(!ctx.catalog_service.get(fern.id).await?.is_active);

    Ok(())
}

#[tokio::test]
async fn test_reviews_average_ratings() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let vendor = seller(&ctx, "Alder").await?;
    let fern = plant(&ctx, &vendor, "Fern", 900, 2).await?;

    let empty = ctx.review_service.for_plant(fern.id).await?;
    assert_eq!(empty.review_count, 0);
    assert_eq!(empty.average_rating, 0.0);

    for (name, rating) in [("Asha", 5), ("Ravi", 4)] {
        let reviewer = user(&ctx, name, UserRole::User).await?;
        ctx.review_service
            .create(
                &reviewer,
                CreateReviewRequest {
                    plant_id: fern.id,
                    rating,
                    comment: None,
                },
            )
            .await?;
    }

    let reviews = ctx.review_service.for_plant(fern.id).await?;
    assert_eq!(reviews.review_count, 2);
    assert_eq!(reviews.average_rating, 4.5);

    let critic = user(&ctx, "Critic", UserRole::User).await?;
    let err = ctx
        .review_service
        .create(
            &critic,
            CreateReviewRequest {
                plant_id: fern.id,
                rating: 6,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("rating"));

    Ok(())
}

#[tokio::test]
async fn test_identify_requires_a_classifier() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;

    let err = ctx
        .vision_service
        .identify(&buyer, "leaf.png", b"\x89PNG")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not configured"));

    Ok(())
}

#[tokio::test]
async fn test_identify_stores_prediction() -> anyhow::Result<()> {
    let settings = test_settings();
    let collaborators = Collaborators::new(
        Arc::new(LocalBlobStorage::new(&settings.storage)),
        Arc::new(AlwaysMonstera),
        Arc::new(TextInvoiceRenderer),
    );
    let ctx = ServiceContext::new(memory_pool().await?, collaborators, &settings);
    let buyer = user(&ctx, "Asha", UserRole::User).await?;

    let err = ctx
        .vision_service
        .identify(&buyer, "notes.txt", b"hello")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid file type"));

    let prediction = ctx
        .vision_service
        .identify(&buyer, "leaf.jpg", b"\xff\xd8\xff\xe0")
        .await?;
    assert!(prediction.is_plant);
    assert_eq!(prediction.plant_type.as_deref(), Some("Monstera deliciosa"));
    assert!(prediction.image_url.ends_with(".jpg"));

    let history = ctx.vision_service.history(&buyer).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, prediction.id);

    Ok(())
}

#[tokio::test]
async fn test_announcements_can_be_retired() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = user(&ctx, "Root", UserRole::Admin).await?;

    let notice = ctx
        .announcement_service
        .create(
            &admin,
            CreateAnnouncementRequest {
                title: "Monsoon sale".to_string(),
                message: "Ferns are 20% off this week".to_string(),
                audience: None,
            },
        )
        .await?;
    assert_eq!(ctx.announcement_service.list(false).await?.len(), 1);

    ctx.announcement_service.deactivate(notice.id).await?;
    assert!(ctx.announcement_service.list(false).await?.is_empty());
    assert_eq!(ctx.announcement_service.list(true).await?.len(), 1);

    Ok(())
}
