mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;
use verdant::{api::create_app, domain::UserRole, service::ServiceContext};

async fn app() -> anyhow::Result<(Router, Arc<ServiceContext>)> {
    let settings = test_settings();
    let ctx = Arc::new(context(memory_pool().await?, &settings));
    Ok((create_app(ctx.clone(), Arc::new(settings)), ctx))
}

async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn post_json(uri: &str, body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn test_health_is_public() -> anyhow::Result<()> {
    let (app, _) = app().await?;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["status"], "healthy");

    Ok(())
}

#[tokio::test]
async fn test_protected_routes_need_a_session() -> anyhow::Result<()> {
    let (app, _) = app().await?;

    for uri in ["/auth/me", "/api/cart", "/api/orders"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_register_login_and_me() -> anyhow::Result<()> {
    let (app, _) = app().await?;

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            json!({
                "name": "Asha Rao",
                "email": "asha@example.com",
                "password": PASSWORD,
            }),
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered = body_json(response).await?;
    assert_eq!(registered["role"], "user");
    assert!(registered.get("password_hash").is_none());

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": "asha@example.com", "password": "wrong-password" }),
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": "asha@example.com", "password": PASSWORD }),
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("session cookie");
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));
    let token = body_json(response).await?["token"]
        .as_str()
        .map(str::to_string)
        .expect("token");

    let cookie = set_cookie.split(';').next().unwrap_or_default().to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::COOKIE, cookie)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["email"], "asha@example.com");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Plain users are kept out of the admin surface.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/dashboard")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_catalog_is_public() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let vendor = seller(&ctx, "Alder").await?;
    let fern = plant(&ctx, &vendor, "Boston Fern", 1800, 4).await?;
    let _buyer = user(&ctx, "Asha", UserRole::User).await?;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/plants").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await?;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Boston Fern");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/plants/{}", fern.id))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["price_cents"], 1800);

    Ok(())
}

#[tokio::test]
async fn test_category_tree_and_store_locator_are_public() -> anyhow::Result<()> {
    let (app, _) = app().await?;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/categories/tree").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let tree = body_json(response).await?;
    assert_eq!(tree["name"], "Plants");
    assert!(tree["children"].as_array().is_some_and(|c| !c.is_empty()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/stores/nearby?lat=12.97&lng=77.59&radius_km=5")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["total"], 0);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stores/nearby?lat=120&lng=77.59")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}

#[tokio::test]
async fn test_admin_user_management_over_http() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let admin = user(&ctx, "Root", UserRole::Admin).await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let (_, admin_token) = ctx.user_service.login(&admin.email, PASSWORD).await?;
    let (_, buyer_token) = ctx.user_service.login(&buyer.email, PASSWORD).await?;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/users")
                .header(header::AUTHORIZATION, format!("Bearer {}", buyer_token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mut request = post_json(
        "/admin/users",
        json!({
            "name": "Mira",
            "email": "mira@example.com",
            "password": PASSWORD,
            "role": "manager",
        }),
    )?;
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", admin_token).parse()?,
    );
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await?;
    assert_eq!(created["role"], "manager");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/users?role=manager&page=1&size=10")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await?;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["email"], "mira@example.com");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/admin/audit-logs?entity_id={}&action=create",
                    created["id"].as_str().unwrap_or_default()
                ))
                .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["total"], 1);

    Ok(())
}

#[tokio::test]
async fn test_notification_routes_need_a_session() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let buyer = user(&ctx, "Asha", UserRole::User).await?;
    let (_, token) = ctx.user_service.login(&buyer.email, PASSWORD).await?;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/notifications/register-token",
            json!({ "token": "fcm-1", "platform": "ios" }),
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = post_json(
        "/api/notifications/register-token",
        json!({ "token": "fcm-1", "platform": "ios" }),
    )?;
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, format!("Bearer {}", token).parse()?);
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/notifications/preferences")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["push_enabled"], true);

    Ok(())
}
