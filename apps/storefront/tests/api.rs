//! End-to-end API tests driving the Router without a socket.

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use dentica_core::{CatalogEntity, EntityKind, Money};
use dentica_db::{Database, DbConfig};
use dentica_storefront::{app, AppConfig, AppState};

const SESSION: &str = "test-session-1";

struct TestApp {
    router: Router,
    db: Database,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let router = app(AppState::new(db.clone(), AppConfig::default()));
        TestApp { router, db }
    }

    async fn seed(&self, kind: EntityKind, slug: &str, rupees: i64, published: bool) -> CatalogEntity {
        let now = Utc::now();
        let entity = CatalogEntity {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            slug: slug.to_string(),
            title: format!("{} title", slug),
            description: None,
            price: Money::from_rupees(rupees),
            thumbnail: None,
            thumbnails: Vec::new(),
            category: Some("endodontics".to_string()),
            details: json!({}),
            is_published: published,
            created_at: now,
            updated_at: now,
        };
        self.db.catalog().insert(&entity).await.unwrap();
        entity
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        session: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header("x-session-id", session);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, headers, json)
    }

    async fn add(&self, kind: &str, slug: &str) -> Value {
        let (status, _, body) = self
            .send(
                Method::POST,
                "/api/cart/items",
                Some(SESSION),
                Some(json!({ "kind": kind, "slug": slug })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }
}

fn contact(name: &str) -> Value {
    json!({
        "name": name,
        "email": "student@dentica.in",
        "phone": "+91 98765 43210",
        "paymentMethod": "razorpay"
    })
}

// =============================================================================
// Health & Catalog
// =============================================================================

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new().await;
    let (status, _, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn listing_hides_unpublished_and_filters() {
    let app = TestApp::new().await;
    app.seed(EntityKind::Course, "rotary-endo", 2999, true).await;
    app.seed(EntityKind::Course, "implants", 3999, true).await;
    app.seed(EntityKind::Course, "hidden-course", 10, false).await;

    let (status, _, body) = app.send(Method::GET, "/api/courses", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, _, body) = app.send(Method::GET, "/api/courses?q=ROTARY", None, None).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "rotary-endo");
    assert_eq!(items[0]["price"], 299_900);
    assert_eq!(items[0]["isPublished"], true);

    let (_, _, body) = app.send(Method::GET, "/api/courses?limit=1", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn get_by_slug_and_id() {
    let app = TestApp::new().await;
    let series = app.seed(EntityKind::TestSeries, "grand-mock", 999, true).await;

    let (status, _, body) = app
        .send(Method::GET, "/api/test-series?slug=grand-mock", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], series.id.as_str());
    assert_eq!(body["kind"], "test_series");

    let uri = format!("/api/test-series/{}", series.id);
    let (status, _, body) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "grand-mock");
}

#[tokio::test]
async fn missing_entity_is_404_with_listing_link() {
    let app = TestApp::new().await;
    app.seed(EntityKind::Note, "draft-notes", 100, false).await;

    for uri in ["/api/notes?slug=nope", "/api/notes?slug=draft-notes", "/api/notes/missing-id"] {
        let (status, _, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["link"], "/notes");
    }

    let (status, _, body) = app.send(Method::GET, "/api/dentists", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["link"], "/");
}

#[tokio::test]
async fn admin_create_and_update() {
    let app = TestApp::new().await;
    let draft = json!({
        "slug": "suturing-basics",
        "title": "Suturing Basics",
        "price": 49_900,
        "details": { "durationMinutes": 45 }
    });

    let (status, _, created) = app
        .send(Method::POST, "/api/videos", None, Some(draft.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["kind"], "video");

    let (status, _, body) = app.send(Method::POST, "/api/videos", None, Some(draft)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/videos",
            None,
            Some(json!({ "slug": "Bad Slug", "title": "x", "price": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _, updated) = app
        .send(
            Method::PUT,
            "/api/videos?originalSlug=suturing-basics",
            None,
            Some(json!({ "slug": "suturing-advanced", "title": "Suturing Advanced", "price": 59_900 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(updated["price"], 59_900);

    let (status, _, _) = app
        .send(
            Method::PUT,
            "/api/videos?originalSlug=suturing-basics",
            None,
            Some(json!({ "slug": "x", "title": "x", "price": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn cart_requires_session_header() {
    let app = TestApp::new().await;

    let (status, _, body) = app.send(Method::GET, "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "session id is required");

    let (status, _, _) = app.send(Method::GET, "/api/cart", Some("bad id!"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cart_add_update_remove() {
    let app = TestApp::new().await;
    let course = app.seed(EntityKind::Course, "endo", 100, true).await;
    app.seed(EntityKind::Note, "notes", 50, true).await;

    app.add("course", "endo").await;
    let body = app.add("course", "endo").await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 2);

    let body = app.add("note", "notes").await;
    assert_eq!(body["totals"]["totalPrice"], 25_000);
    assert_eq!(body["totals"]["itemCount"], 2);
    assert_eq!(body["totals"]["totalQuantity"], 3);

    let uri = format!("/api/cart/items/{}", course.id);
    let (_, _, body) = app
        .send(Method::PATCH, &uri, Some(SESSION), Some(json!({ "quantity": 5000 })))
        .await;
    assert_eq!(body["items"][0]["quantity"], 999);

    let (_, _, body) = app
        .send(Method::PATCH, &uri, Some(SESSION), Some(json!({ "quantity": 0 })))
        .await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["slug"], "notes");

    let (status, _, unchanged) = app
        .send(
            Method::PATCH,
            "/api/cart/items/unknown",
            Some(SESSION),
            Some(json!({ "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, body);

    let (_, _, body) = app.send(Method::DELETE, "/api/cart", Some(SESSION), None).await;
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["totals"]["totalPrice"], 0);

    // Other sessions never saw any of it.
    let (_, _, other) = app.send(Method::GET, "/api/cart", Some("other-tab"), None).await;
    assert!(other["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn adding_hidden_or_missing_entity_fails() {
    let app = TestApp::new().await;
    app.seed(EntityKind::Exam, "hidden-exam", 100, false).await;

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/cart/items",
            Some(SESSION),
            Some(json!({ "kind": "exam", "slug": "hidden-exam" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["link"], "/exams");

    let (status, _, _) = app
        .send(
            Method::POST,
            "/api/cart/items",
            Some(SESSION),
            Some(json!({ "kind": "exam" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Checkout & Orders
// =============================================================================

#[tokio::test]
async fn checkout_with_empty_cart_redirects_to_cart_page() {
    let app = TestApp::new().await;

    let (status, headers, _) = app.send(Method::GET, "/api/checkout", Some(SESSION), None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/cart");

    let (status, _, body) = app
        .send(Method::POST, "/api/checkout", Some(SESSION), Some(contact("Asha")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_CART");
}

#[tokio::test]
async fn checkout_rejects_empty_name_and_keeps_cart() {
    let app = TestApp::new().await;
    app.seed(EntityKind::Course, "endo", 100, true).await;
    app.add("course", "endo").await;

    let (status, _, body) = app
        .send(Method::POST, "/api/checkout", Some(SESSION), Some(contact("   ")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "name is required");

    let (_, _, cart) = app.send(Method::GET, "/api/cart", Some(SESSION), None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);

    let (_, _, orders) = app.send(Method::GET, "/api/orders", None, None).await;
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn checkout_places_order_and_clears_cart() {
    let app = TestApp::new().await;
    app.seed(EntityKind::Course, "endo", 100, true).await;
    app.seed(EntityKind::Video, "demo", 50, true).await;
    app.add("course", "endo").await;
    app.add("course", "endo").await;
    app.add("video", "demo").await;

    let (status, _, summary) = app.send(Method::GET, "/api/checkout", Some(SESSION), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totals"]["totalPrice"], 25_000);
    assert_eq!(summary["paymentMethods"], json!(["qr", "paypal", "razorpay"]));

    let (status, headers, body) = app
        .send(Method::POST, "/api/checkout", Some(SESSION), Some(contact("Dr. Asha")))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    assert!(order_id.starts_with("ORD-"));
    assert_eq!(body["order"]["total"], 25_000);
    assert_eq!(body["order"]["paymentMethod"], "razorpay");
    assert_eq!(body["order"]["items"][0]["quantity"], 2);

    let expected = format!("/order-confirmation?orderId={}", order_id);
    assert_eq!(body["redirectTo"], expected.as_str());
    assert_eq!(headers[header::LOCATION], expected.as_str());

    let (_, _, cart) = app.send(Method::GET, "/api/cart", Some(SESSION), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    let (status, _, order) = app
        .send(Method::GET, &format!("/api/orders/{}", order_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["customer"]["name"], "Dr. Asha");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    let (_, _, orders) = app.send(Method::GET, "/api/orders", None, None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_rejects_unknown_payment_method() {
    let app = TestApp::new().await;
    app.seed(EntityKind::Course, "endo", 100, true).await;
    app.add("course", "endo").await;

    let mut body = contact("Asha");
    body["paymentMethod"] = json!("cash");

    let (status, _, error) = app
        .send(Method::POST, "/api/checkout", Some(SESSION), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_order_links_home() {
    let app = TestApp::new().await;
    let (status, _, body) = app
        .send(Method::GET, "/api/orders/ORD-20260101-000000-0000", None, None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["link"], "/");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn double_submit_places_one_order() {
    let app = TestApp::new().await;
    app.seed(EntityKind::Course, "endo", 100, true).await;

    for round in 0..10 {
        let session = format!("double-click-{}", round);
        let (status, _, _) = app
            .send(
                Method::POST,
                "/api/cart/items",
                Some(&session),
                Some(json!({ "kind": "course", "slug": "endo" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let ((first, _, _), (second, _, _)) = tokio::join!(
            app.send(Method::POST, "/api/checkout", Some(&session), Some(contact("Asha"))),
            app.send(Method::POST, "/api/checkout", Some(&session), Some(contact("Asha"))),
        );

        let statuses = [first, second];
        let placed = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
        let refused = statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count();
        assert_eq!((placed, refused), (1, 1), "round {round}: {statuses:?}");
    }

    let (_, _, orders) = app.send(Method::GET, "/api/orders?limit=50", None, None).await;
    assert_eq!(orders.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn price_above_cap_is_rejected() {
    let app = TestApp::new().await;
    let draft = |price: i64| json!({ "slug": "luxury-course", "title": "Luxury", "price": price });

    let (status, _, body) = app
        .send(Method::POST, "/api/courses", None, Some(draft(i64::MAX / 2 + 1)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _, _) = app
        .send(Method::POST, "/api/courses", None, Some(draft(dentica_core::MAX_PRICE)))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    for _ in 0..2 {
        app.add("course", "luxury-course").await;
    }
    let (status, _, cart) = app.send(Method::GET, "/api/cart", Some(SESSION), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totals"]["totalPrice"], dentica_core::MAX_PRICE * 2);
}
