//! Admin console flows against a mock API.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use marketstall_admin::services::{AdminOrderFilter, ImageUpload, ProductUpload};
use marketstall_admin::{AdminConsole, AdminError};
use marketstall_core::{Money, OrderId, OrderStatus, ProductId, UserRole, ValidProductForm};
use marketstall_integration_tests::{
    Hits, envelope, order_json, product_json, sign_in, start_server, storefront, user_json,
};
use marketstall_storefront::guard::AccessDenied;
use marketstall_storefront::listing::{ListQuery, Refresh};
use marketstall_storefront::session::SessionStore;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct MockState {
    hits: Hits,
    /// Text fields and file names of the last multipart request.
    upload: Arc<Mutex<Vec<(String, String)>>>,
}

async fn update_status(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let status = body["status"].as_str().unwrap_or_default().to_string();
    state.hits.record(format!("status:{id}:{status}"));
    if status == "pending" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "Invalid status transition", "details": ["Cannot move a delivered order back to pending"]}})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "order": order_json(&id, &status, 40.0)})),
    )
}

async fn create_product(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name() {
            Some(file_name) => file_name.to_string(),
            None => field.text().await.unwrap(),
        };
        parts.push((name, value));
    }
    *state.upload.lock().unwrap() = parts;
    state.hits.record("create");
    (
        StatusCode::CREATED,
        Json(envelope(json!({"product": product_json("p9", "Desk Lamp", 49.99, 12)}))),
    )
}

async fn product_detail(State(state): State<MockState>, Path(id): Path<String>) -> Json<Value> {
    state.hits.record(format!("product:{id}"));
    Json(envelope(json!({"product": product_json(&id, "Headphones", 25.0, 3)})))
}

async fn update_product(
    State(state): State<MockState>,
    Path(id): Path<String>,
    _multipart: Multipart,
) -> Json<Value> {
    state.hits.record(format!("update:{id}"));
    let mut product = product_json(&id, "Headphones", 25.0, 3);
    product["published"] = json!(false);
    Json(envelope(json!({"product": product})))
}

fn admin_api(state: MockState) -> Router {
    Router::new()
        .route("/api/products/{id}", get(product_detail))
        .route(
            "/api/admin/products/{id}",
            put(update_product).delete(|State(state): State<MockState>, Path(id): Path<String>| async move {
                state.hits.record(format!("delete:{id}"));
                Json(json!({"success": true, "message": "Product deleted"}))
            }),
        )
        .route(
            "/api/admin/orders",
            get(|State(state): State<MockState>| async move {
                state.hits.record("orders");
                Json(json!({
                    "orders": [
                        order_json("o1", "pending", 10.0),
                        order_json("o2", "delivered", 30.0),
                    ],
                    "page": 1,
                    "limit": 20,
                    "total": 2,
                    "totalPages": 1,
                }))
            }),
        )
        .route("/api/admin/orders/{id}/status", patch(update_status))
        .route("/api/admin/products", post(create_product))
        .route(
            "/api/admin/dashboard",
            get(|| async {
                Json(envelope(json!({
                    "totalRevenue": 1234.5,
                    "totalOrders": 40,
                    "totalProducts": 12,
                    "publishedProducts": 9,
                    "pendingOrders": 3,
                })))
            }),
        )
        .route(
            "/api/admin/users/search",
            get(|| async {
                Json(envelope(json!({
                    "users": [user_json(UserRole::Customer)],
                    "pagination": {"currentPage": 1, "totalPages": 1, "totalUsers": 1, "usersPerPage": 5},
                })))
            }),
        )
        .with_state(state)
}

#[tokio::test]
async fn test_customer_cannot_open_console() {
    let base = start_server(admin_api(MockState::default())).await;
    let (app, _) = storefront(&base);
    sign_in(&app, UserRole::Customer);

    let err = AdminConsole::open(app.client(), app.notifier().clone()).err().unwrap();
    assert!(matches!(err, AdminError::Denied(AccessDenied::NotAdmin)));
    assert!(!app.client().session().is_authenticated());
}

#[tokio::test]
async fn test_status_update_replaces_row_only_on_success() {
    let state = MockState::default();
    let base = start_server(admin_api(state.clone())).await;
    let (app, notifier) = storefront(&base);
    sign_in(&app, UserRole::Admin);
    let console = AdminConsole::for_storefront(&app).unwrap();
    let orders = console.orders();

    let refresh = orders
        .list()
        .load_query(ListQuery {
            page: 1,
            limit: 20,
            search: None,
            filter: AdminOrderFilter::default(),
        })
        .await;
    assert_eq!(refresh, Refresh::Applied);
    let summary = orders.summary().await;
    assert_eq!(summary.total_revenue, Money::from_cents(4000));
    assert_eq!((summary.pending, summary.delivered), (1, 1));

    // Rejected: the row keeps its old status.
    let err = orders
        .update_order_status(&OrderId::new("o2"), OrderStatus::Pending)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Cannot move a delivered order back to pending");
    let rows = orders.list().items().await;
    assert_eq!(rows[1].status, OrderStatus::Delivered);

    // Accepted: the row is replaced with the server's copy.
    let order = orders
        .update_order_status(&OrderId::new("o1"), OrderStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    let rows = orders.list().items().await;
    assert_eq!(rows[0].status, OrderStatus::Confirmed);
    assert_eq!(orders.summary().await.pending, 0);

    assert_eq!(
        notifier.titles(),
        ["Failed to update order status", "Order status updated successfully!"]
    );
    assert_eq!(state.hits.count("status:"), 2);
}

#[tokio::test]
async fn test_create_product_sends_multipart() {
    let state = MockState::default();
    let base = start_server(admin_api(state.clone())).await;
    let (app, notifier) = storefront(&base);
    sign_in(&app, UserRole::Admin);
    let console = AdminConsole::for_storefront(&app).unwrap();

    let form = ValidProductForm {
        name: "Desk Lamp".to_string(),
        description: "Warm light for late nights".to_string(),
        category: "electronics".to_string(),
        price: Money::from_cents(4999),
        quantity: 12,
    };
    let images = (0..6)
        .map(|i| ImageUpload {
            file_name: format!("lamp{i}.jpg"),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xff, 0xd8],
        })
        .collect();
    let upload = ProductUpload::from_form(form, true, false).with_images(images);

    let product = console.products().create_product(upload).await.unwrap();
    assert_eq!(product.name, "Desk Lamp");

    let parts = state.upload.lock().unwrap().clone();
    let files: Vec<_> = parts.iter().filter(|(name, _)| name == "files").collect();
    assert_eq!(files.len(), 5);
    assert!(parts.contains(&("price".to_string(), "49.99".to_string())));
    assert!(parts.contains(&("published".to_string(), "true".to_string())));

    let flags = console.products().flags().await;
    assert!(flags.success && !flags.loading && flags.error.is_none());
    assert_eq!(notifier.titles(), ["Product Desk Lamp created successfully!"]);
}

#[tokio::test]
async fn test_dashboard_and_user_search() {
    let base = start_server(admin_api(MockState::default())).await;
    let (app, _) = storefront(&base);
    sign_in(&app, UserRole::Admin);
    let console = AdminConsole::for_storefront(&app).unwrap();

    console.dashboard().fetch_stats().await;
    let stats = console.dashboard().state().await.stats.unwrap();
    assert_eq!(stats.total_revenue, Money::from_cents(123_450));
    assert_eq!(stats.pending_orders, 3);

    assert_eq!(console.users().list().refresh().await, Refresh::Applied);
    let state = console.users().list().state().await;
    assert_eq!(state.items[0].email, "ada@example.com");
    assert_eq!(state.total, 1);
}

#[tokio::test]
async fn test_product_mutations_evict_cached_detail() {
    let state = MockState::default();
    let base = start_server(admin_api(state.clone())).await;
    let (app, _) = storefront(&base);
    sign_in(&app, UserRole::Admin);
    let console = AdminConsole::for_storefront(&app).unwrap();
    let catalog = app.catalog().source();
    let id = ProductId::new("p1");

    assert!(catalog.get_product(&id).await.unwrap().published);
    catalog.get_product(&id).await.unwrap();
    assert_eq!(state.hits.count("product:p1"), 1);

    console.products().set_published(&id, false).await.unwrap();
    assert_eq!(state.hits.count("update:p1"), 1);
    catalog.get_product(&id).await.unwrap();
    assert_eq!(state.hits.count("product:p1"), 2);

    catalog.get_product(&id).await.unwrap();
    console.products().delete_product(&id).await.unwrap();
    catalog.get_product(&id).await.unwrap();
    assert_eq!(state.hits.count("product:p1"), 3);
}
