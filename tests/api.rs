//! End-to-end tests over HTTP against the in-memory store.

#![allow(clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use offerify::api::build_router;
use offerify::app_state::AppState;
use offerify::config::AppConfig;
use offerify::persistence::{MemoryStore, Store};
use offerify::service::PasswordHasher;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use uuid::Uuid;

const PASSWORD: &str = "password123";
const ADMIN_EMAIL: &str = "admin@offerify.test";

struct TestApp {
    addr: SocketAddr,
    client: reqwest::Client,
    admin_token: String,
    upload_dir: PathBuf,
}

impl TestApp {
    async fn spawn() -> Self {
        let upload_dir = std::env::temp_dir().join(format!("offerify-it-{}", Uuid::new_v4()));
        let upload = upload_dir.to_string_lossy().to_string();
        let config = AppConfig::from_lookup(|key| match key {
            "PERSISTENCE_ENABLED" => Some("false".to_string()),
            "UPLOAD_DIR" => Some(upload.clone()),
            "MAX_UPLOAD_BYTES" => Some("2048".to_string()),
            "TOKEN_SECRET" => Some("integration-secret".to_string()),
            _ => None,
        })
        .expect("config");

        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let state = AppState::with_hasher(store, &config, PasswordHasher::with_rounds(2));
        state
            .auth
            .ensure_admin(ADMIN_EMAIL, PASSWORD)
            .await
            .expect("seed admin");

        let app = build_router(&state).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let mut test_app = Self {
            addr,
            client: reqwest::Client::new(),
            admin_token: String::new(),
            upload_dir,
        };
        test_app.admin_token = test_app.login(ADMIN_EMAIL, PASSWORD).await;
        test_app
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.expect("request");
        let status = resp.status();
        let text = resp.text().await.expect("body");
        (status, serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, path, token, None).await
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, token, Some(body)).await
    }

    async fn patch(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, Some(token), Some(body)).await
    }

    async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, Some(token), None).await
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().expect("token").to_string()
    }

    /// Registers a shopper and returns its token.
    async fn register(&self, name: &str) -> String {
        let email = format!("{name}-{}@example.com", Uuid::new_v4().simple());
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({ "name": name, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["data"]["token"].as_str().expect("token").to_string()
    }

    async fn create_city(&self, name: &str, latitude: f64, longitude: f64) -> String {
        let (status, body) = self
            .post(
                "/admin/cities",
                Some(&self.admin_token),
                json!({ "name": name, "latitude": latitude, "longitude": longitude }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "city failed: {body}");
        body["data"]["id"].as_str().expect("city id").to_string()
    }

    /// Registers a vendor for a fresh user, approves it, and returns the
    /// owner's token and the vendor id.
    async fn approved_vendor(&self, name: &str, city_id: &str, at: (f64, f64)) -> (String, String) {
        let token = self.register(name).await;
        let (status, body) = self
            .post(
                "/vendors",
                Some(&token),
                json!({
                    "business_name": name,
                    "city_id": city_id,
                    "latitude": at.0,
                    "longitude": at.1,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "vendor failed: {body}");
        let vendor_id = body["data"]["id"].as_str().expect("vendor id").to_string();

        let (status, body) = self
            .patch(
                &format!("/admin/vendors/{vendor_id}/status"),
                &self.admin_token,
                json!({ "status": "approved" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "approve failed: {body}");
        (token, vendor_id)
    }

    async fn create_offer(&self, token: &str, body: Value) -> String {
        let (status, body) = self.post("/offers", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "offer failed: {body}");
        body["data"]["id"].as_str().expect("offer id").to_string()
    }
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|o| o["title"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = TestApp::spawn().await;
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({ "name": "Ana", "email": "  Ana@Example.COM ", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["email"], "ana@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("password_hash").is_none());

    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({ "name": "Ana 2", "email": "ana@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2002);

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "ana@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 1101);

    let token = app.login("ana@example.com", PASSWORD).await;
    let (status, body) = app.get("/auth/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ana");

    let (status, body) = app
        .patch("/auth/profile", &token, json!({ "name": "Ana Maria" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ana Maria");

    let (status, _) = app.get("/auth/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/auth/profile", Some("v1.garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_reports_every_problem() {
    let app = TestApp::spawn().await;
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({ "name": " ", "email": "not-an-email", "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
    assert_eq!(body["error"]["message"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn malformed_json_is_a_structured_400() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body["error"]["code"], 1002);
}

#[tokio::test]
async fn malformed_path_id_is_a_structured_400() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .get(app.url("/offers/not-a-uuid"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"), "{content_type}");
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body["error"]["code"], 1002);
    assert!(body["error"]["message"].is_string());

    let (status, body) = app
        .patch(
            "/admin/vendors/12345/status",
            &app.admin_token,
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1002);
}

#[tokio::test]
async fn offers_require_an_approved_vendor() {
    let app = TestApp::spawn().await;
    let city = app.create_city("Lisbon", 38.72, -9.14).await;
    let token = app.register("bakery").await;

    let (status, _) = app
        .post(
            "/offers",
            Some(&token),
            json!({ "title": "Bread", "offer_type": "discount", "discount_percentage": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            "/vendors",
            Some(&token),
            json!({ "business_name": "Bakery", "city_id": city }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    let vendor_id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, _) = app
        .post(
            "/vendors",
            Some(&token),
            json!({ "business_name": "Bakery again", "city_id": city }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(
            "/offers",
            Some(&token),
            json!({ "title": "Bread", "offer_type": "discount", "discount_percentage": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&format!("/vendors/{vendor_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .get("/admin/vendors?status=pending", Some(&app.admin_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);

    let (status, _) = app
        .patch(
            &format!("/admin/vendors/{vendor_id}/status"),
            &app.admin_token,
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let offer_id = app
        .create_offer(
            &token,
            json!({ "title": "Bread", "offer_type": "discount", "discount_percentage": 10 }),
        )
        .await;
    let (status, body) = app.get(&format!("/offers/{offer_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vendor_name"], "Bakery");
    assert_eq!(body["data"]["city_id"], city.as_str());
    assert_eq!(body["data"]["views"], 1);

    let (status, body) = app
        .patch(
            &format!("/admin/vendors/{vendor_id}/status"),
            &app.admin_token,
            json!({ "status": "pending" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = app
        .patch(
            &format!("/admin/vendors/{vendor_id}/status"),
            &app.admin_token,
            json!({ "status": "rejected" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/offers", None).await;
    assert!(titles(&body).is_empty());
}

#[tokio::test]
async fn discovery_filters_sorts_and_validates() {
    let app = TestApp::spawn().await;
    let city = app.create_city("Porto", 41.15, -8.61).await;
    let (token, vendor_id) = app.approved_vendor("grocer", &city, (41.15, -8.61)).await;

    app.create_offer(
        &token,
        json!({ "title": "Ten off", "offer_type": "discount", "discount_percentage": 10 }),
    )
    .await;
    app.create_offer(
        &token,
        json!({ "title": "Half price", "offer_type": "discount", "discount_percentage": 50 }),
    )
    .await;
    app.create_offer(
        &token,
        json!({ "title": "Coupon code", "offer_type": "coupon", "coupon_code": "SAVE" }),
    )
    .await;
    let paused = app
        .create_offer(
            &token,
            json!({ "title": "Paused", "offer_type": "voucher", "voucher_value": 5 }),
        )
        .await;
    let (status, _) = app
        .patch(&format!("/offers/{paused}"), &token, json!({ "is_active": false }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/offers?sort=price_asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), ["Ten off", "Half price", "Coupon code"]);
    assert_eq!(body["pagination"]["total"], 3);

    let (_, body) = app.get("/offers?sort=price_desc", None).await;
    assert_eq!(titles(&body), ["Half price", "Ten off", "Coupon code"]);

    let (_, body) = app.get("/offers?search=HALF", None).await;
    assert_eq!(titles(&body), ["Half price"]);

    let (_, body) = app
        .get(&format!("/offers?vendor_id={vendor_id}&limit=2"), None)
        .await;
    assert_eq!(titles(&body).len(), 2);
    assert_eq!(body["pagination"]["total_pages"], 2);

    let (_, body) = app.get("/admin/offers", Some(&app.admin_token)).await;
    assert_eq!(body["pagination"]["total"], 4);

    let (status, body) = app.get("/offers?sort=cheapest", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].is_array());

    let (status, _) = app.get("/offers?lat=41.1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/offers?radius_km=5", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/offers?city_id=not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn distance_filter_uses_shop_or_vendor_location() {
    let app = TestApp::spawn().await;
    let city = app.create_city("Madrid", 40.4168, -3.7038).await;
    let (near_token, _) = app.approved_vendor("near", &city, (40.4168, -3.7038)).await;
    let (far_token, _) = app.approved_vendor("far", &city, (41.3874, 2.1686)).await;

    app.create_offer(
        &near_token,
        json!({ "title": "Near deal", "offer_type": "discount", "discount_percentage": 5 }),
    )
    .await;
    app.create_offer(
        &far_token,
        json!({ "title": "Far deal", "offer_type": "discount", "discount_percentage": 5 }),
    )
    .await;

    let (status, body) = app
        .get("/offers?lat=40.42&long=-3.70&radius_km=10", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), ["Near deal"]);
    assert!(body["data"][0]["distance_km"].as_f64().is_some_and(|d| d < 1.0));

    let (_, body) = app.get("/offers?lat=40.42&lng=-3.70&sort=nearest", None).await;
    assert_eq!(titles(&body), ["Near deal", "Far deal"]);
    assert!(
        body["data"][1]["distance_km"]
            .as_f64()
            .is_some_and(|d| (450.0..550.0).contains(&d))
    );

    // A shop next to the caller pulls the far vendor's offer into range.
    let (status, body) = app
        .post(
            "/vendors/me/shops",
            Some(&far_token),
            json!({ "name": "Madrid branch", "city_id": city, "latitude": 40.42, "longitude": -3.70 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let shop_id = body["data"]["id"].as_str().expect("shop id").to_string();
    app.create_offer(
        &far_token,
        json!({
            "title": "Branch deal",
            "offer_type": "voucher",
            "voucher_value": 20,
            "shop_id": shop_id,
        }),
    )
    .await;
    let (_, body) = app
        .get("/offers?lat=40.42&lng=-3.70&radius_km=10&sort=newest", None)
        .await;
    assert_eq!(titles(&body), ["Branch deal", "Near deal"]);
}

#[tokio::test]
async fn offer_city_survives_vendor_relocation() {
    let app = TestApp::spawn().await;
    let braga = app.create_city("Braga", 41.55, -8.42).await;
    let faro = app.create_city("Faro", 37.02, -7.93).await;
    let (token, _) = app.approved_vendor("mover", &braga, (41.55, -8.42)).await;
    let offer_id = app
        .create_offer(
            &token,
            json!({ "title": "Stay put", "offer_type": "coupon", "coupon_code": "BRAGA" }),
        )
        .await;

    let (status, body) = app
        .patch("/vendors/me", &token, json!({ "city_id": faro }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city_id"], faro.as_str());
    assert_eq!(body["data"]["status"], "approved");

    let (_, body) = app.get(&format!("/offers/{offer_id}"), None).await;
    assert_eq!(body["data"]["city_id"], braga.as_str());
    let (_, body) = app.get(&format!("/offers?city_id={braga}"), None).await;
    assert_eq!(titles(&body), ["Stay put"]);
    let (_, body) = app.get(&format!("/offers?city_id={faro}"), None).await;
    assert!(titles(&body).is_empty());
}

#[tokio::test]
async fn follows_and_reviews_keep_vendor_counters() {
    let app = TestApp::spawn().await;
    let city = app.create_city("Coimbra", 40.2, -8.41).await;
    let (owner, vendor_id) = app.approved_vendor("cafe", &city, (40.2, -8.41)).await;
    let fan = app.register("fan").await;
    let critic = app.register("critic").await;

    let follow = format!("/vendors/{vendor_id}/follow");
    let (status, body) = app.post(&follow, Some(&fan), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["follower_count"], 1);
    let (_, body) = app.post(&follow, Some(&fan), json!({})).await;
    assert_eq!(body["data"]["follower_count"], 1);
    let (_, body) = app.delete(&follow, &fan).await;
    assert_eq!(body["data"]["follower_count"], 0);

    let reviews = format!("/vendors/{vendor_id}/reviews");
    let (status, _) = app
        .post(&reviews, Some(&fan), json!({ "rating": 6 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post(&reviews, Some(&owner), json!({ "rating": 5 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&reviews, Some(&fan), json!({ "rating": 5, "comment": "Great" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let fan_review = body["data"]["id"].as_str().expect("review id").to_string();
    let (status, _) = app
        .post(&reviews, Some(&fan), json!({ "rating": 4 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    app.post(&reviews, Some(&critic), json!({ "rating": 2 }))
        .await;

    let (_, body) = app.get(&format!("/vendors/{vendor_id}"), None).await;
    assert_eq!(body["data"]["review_count"], 2);
    assert_eq!(body["data"]["rating"], 3.5);

    let (_, body) = app.get(&reviews, None).await;
    assert_eq!(body["pagination"]["total"], 2);

    let (status, _) = app
        .delete(&format!("/reviews/{fan_review}"), &critic)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("/reviews/{fan_review}"), &fan).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get(&format!("/vendors/{vendor_id}"), None).await;
    assert_eq!(body["data"]["review_count"], 1);
    assert_eq!(body["data"]["rating"], 2.0);
}

#[tokio::test]
async fn favorites_round_trip() {
    let app = TestApp::spawn().await;
    let city = app.create_city("Evora", 38.57, -7.9).await;
    let (token, _) = app.approved_vendor("shop", &city, (38.57, -7.9)).await;
    let offer_id = app
        .create_offer(
            &token,
            json!({ "title": "Saved", "offer_type": "voucher", "voucher_value": 15 }),
        )
        .await;
    let shopper = app.register("saver").await;

    let favorite = format!("/offers/{offer_id}/favorite");
    let (status, _) = app.post(&favorite, Some(&shopper), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post(&favorite, Some(&shopper), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/favorites", Some(&shopper)).await;
    assert_eq!(titles(&body), ["Saved"]);

    app.delete(&favorite, &shopper).await;
    let (_, body) = app.get("/favorites", Some(&shopper)).await;
    assert!(titles(&body).is_empty());

    let (status, _) = app
        .post(
            &format!("/offers/{}/favorite", Uuid::new_v4()),
            Some(&shopper),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_require_the_admin_role() {
    let app = TestApp::spawn().await;
    let user = app.register("curious").await;

    let (status, _) = app.get("/admin/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = app.get("/admin/users", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], 1102);
    let (status, _) = app
        .post(
            "/admin/cities",
            Some(&user),
            json!({ "name": "Nowhere", "latitude": 0, "longitude": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .get("/admin/users?search=curious", Some(&app.admin_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    let user_id = body["data"][0]["id"].as_str().expect("user id").to_string();

    let (status, body) = app
        .patch(
            &format!("/admin/users/{user_id}"),
            &app.admin_token,
            json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    let (status, _) = app.get("/admin/settings", Some(&user)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn pages_settings_and_catalog() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token.clone();

    let (status, _) = app
        .send(
            Method::PUT,
            "/admin/pages/about-us",
            Some(&admin),
            Some(json!({ "title": "About", "content": "Hello" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get("/pages/about-us", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "About");
    let (status, _) = app
        .send(
            Method::PUT,
            "/admin/pages/About Us",
            Some(&admin),
            Some(json!({ "title": "About" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.delete("/admin/pages/about-us", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/pages/about-us", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::PUT,
            "/admin/settings/support_email",
            Some(&admin),
            Some(json!({ "value": "help@offerify.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/settings", None).await;
    assert_eq!(body["data"][0]["value"], "help@offerify.test");

    let (status, body) = app
        .post(
            "/admin/categories",
            Some(&admin),
            json!({ "name": "Food & Drink" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "food-drink");
    let (status, _) = app
        .post(
            "/admin/categories",
            Some(&admin),
            json!({ "name": "Food and drink", "slug": "food-drink" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, body) = app.get("/categories", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn uploads_are_stored_and_served() {
    let app = TestApp::spawn().await;
    let token = app.register("uploader").await;
    let png = vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4];

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(png.clone()).file_name("logo.PNG"),
    );
    let resp = app
        .client
        .post(app.url("/media/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("upload");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("json");
    let url = body["data"]["url"].as_str().expect("url").to_string();
    assert!(url.starts_with("/public/"));
    assert!(url.ends_with(".png"));

    let served = app
        .client
        .get(app.url(&url))
        .send()
        .await
        .expect("download");
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.expect("bytes").as_ref(), png.as_slice());

    let form = reqwest::multipart::Form::new().text("other", "value");
    let resp = app
        .client
        .post(app.url("/media/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("upload");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(vec![0_u8; 4096]).file_name("big.jpg"),
    );
    let resp = app
        .client
        .post(app.url("/media/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("upload");
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let resp = app
        .client
        .post(app.url("/media/upload"))
        .send()
        .await
        .expect("upload");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let _ = std::fs::remove_dir_all(&app.upload_dir);
}
