mod common;

use common::*;
use verdant::{
    domain::{
        CreateStoreRequest, NearbyQuery, PageParams, RegisterDeviceTokenRequest,
        UpdateNotificationPreferences, UserRole,
    },
    error::AppError,
    service::ServiceContext,
};

const CENTRE: (f64, f64) = (12.9716, 77.5946);

async fn store(ctx: &ServiceContext, name: &str, lat: f64, lng: f64) -> anyhow::Result<()> {
    ctx.store_service
        .create(CreateStoreRequest {
            name: name.to_string(),
            address: format!("{} Main Road", name),
            latitude: Some(lat),
            longitude: Some(lng),
            phone: None,
            rating: Some(4.5),
            total_reviews: Some(12),
            is_partner: false,
        })
        .await?;
    Ok(())
}

fn near(radius_km: f64) -> NearbyQuery {
    NearbyQuery {
        lat: CENTRE.0,
        lng: CENTRE.1,
        radius_km,
    }
}

#[tokio::test]
async fn test_nearby_orders_by_distance_within_radius() -> anyhow::Result<()> {
    let ctx = setup().await?;
    store(&ctx, "Whitefield Greens", 13.0, 77.65).await?;
    store(&ctx, "MG Road Nursery", 12.98, 77.60).await?;
    store(&ctx, "Mysore Garden", 12.2958, 76.6394).await?;

    let page = ctx
        .store_service
        .nearby(&near(10.0), PageParams::default())
        .await?;
    assert_eq!(page.total, 2);
    let names: Vec<_> = page.items.iter().map(|s| s.store.name.as_str()).collect();
    assert_eq!(names, ["MG Road Nursery", "Whitefield Greens"]);
    assert!(page.items[0].distance_km < 2.0);
    assert!(page.items[1].distance_km < 10.0);

    let wide = ctx
        .store_service
        .nearby(&near(200.0), PageParams::default())
        .await?;
    assert_eq!(wide.total, 3);
    assert_eq!(wide.items[2].store.name, "Mysore Garden");

    let second = ctx
        .store_service
        .nearby(&near(200.0), PageParams { page: 2, size: 2 })
        .await?;
    assert_eq!(second.total, 3);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].store.name, "Mysore Garden");

    Ok(())
}

#[tokio::test]
async fn test_nearby_rejects_bad_coordinates() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let err = ctx
        .store_service
        .nearby(
            &NearbyQuery {
                lat: 95.0,
                lng: 0.0,
                radius_km: 5.0,
            },
            PageParams::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = ctx
        .store_service
        .nearby(&near(0.0), PageParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = ctx
        .store_service
        .create(CreateStoreRequest {
            name: "Nowhere".to_string(),
            address: "Off the map".to_string(),
            latitude: Some(12.0),
            longitude: Some(181.0),
            phone: None,
            rating: None,
            total_reviews: None,
            is_partner: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_store_list_is_sorted_by_name() -> anyhow::Result<()> {
    let ctx = setup().await?;
    store(&ctx, "Zinnia Corner", 12.9, 77.5).await?;
    store(&ctx, "Aloe House", 12.9, 77.5).await?;

    let page = ctx.store_service.list(PageParams::default()).await?;
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].name, "Aloe House");

    let fetched = ctx.store_service.get(page.items[1].id).await?;
    assert_eq!(fetched.name, "Zinnia Corner");
    assert_eq!(fetched.rating, Some(4.5));

    Ok(())
}

#[tokio::test]
async fn test_device_token_moves_to_latest_user() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let asha = user(&ctx, "Asha", UserRole::User).await?;
    let mira = user(&ctx, "Mira", UserRole::User).await?;
    let request = RegisterDeviceTokenRequest {
        token: "fcm-token-1".to_string(),
        platform: Some("android".to_string()),
    };

    ctx.notification_service
        .register_token(asha.id, request.clone())
        .await?;
    assert_eq!(ctx.notification_service.device_tokens(asha.id).await?.len(), 1);

    let moved = ctx
        .notification_service
        .register_token(mira.id, request)
        .await?;
    assert_eq!(moved.user_id, mira.id);
    assert!(ctx.notification_service.device_tokens(asha.id).await?.is_empty());
    assert_eq!(ctx.notification_service.device_tokens(mira.id).await?.len(), 1);

    let err = ctx
        .notification_service
        .register_token(
            asha.id,
            RegisterDeviceTokenRequest {
                token: String::new(),
                platform: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_preferences_default_then_merge() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let asha = user(&ctx, "Asha", UserRole::User).await?;

    let prefs = ctx.notification_service.preferences(asha.id).await?;
    assert!(prefs.push_enabled);
    assert!(!prefs.email_enabled);
    assert!(!prefs.sms_enabled);

    let prefs = ctx
        .notification_service
        .update_preferences(
            asha.id,
            UpdateNotificationPreferences {
                email_enabled: Some(true),
                ..Default::default()
            },
        )
        .await?;
    assert!(prefs.push_enabled);
    assert!(prefs.email_enabled);

    let prefs = ctx
        .notification_service
        .update_preferences(
            asha.id,
            UpdateNotificationPreferences {
                push_enabled: Some(false),
                ..Default::default()
            },
        )
        .await?;
    assert!(!prefs.push_enabled);
    assert!(prefs.email_enabled);
    assert_eq!(ctx.notification_service.preferences(asha.id).await?, prefs);

    Ok(())
}
