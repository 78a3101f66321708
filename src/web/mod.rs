//! HTTP surface over [`Ledger`].

use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::storage::LedgerStorage;
use crate::Ledger;

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub admin_password: String,
    pub cookie_secure: bool,
}

impl From<&Config> for AuthSettings {
    fn from(config: &Config) -> Self {
        Self {
            admin_password: config.admin_password().clone(),
            cookie_secure: *config.cookie_secure(),
        }
    }
}

/// The shared state every handler receives.
pub struct AppState<S: LedgerStorage> {
    pub ledger: Arc<Ledger<S>>,
    pub auth: AuthSettings,
}

impl<S: LedgerStorage> AppState<S> {
    pub fn new(ledger: Ledger<S>, auth: AuthSettings) -> Self {
        Self {
            ledger: Arc::new(ledger),
            auth,
        }
    }
}

// Derived Clone would require `S: Clone`.
impl<S: LedgerStorage> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            auth: self.auth.clone(),
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router<S: LedgerStorage + 'static>(state: AppState<S>) -> Router {
    let gated = Router::new()
        .route(
            "/stores",
            get(handlers::list_stores::<S>).post(handlers::create_store::<S>),
        )
        .route("/stores/:id", delete(handlers::delete_store::<S>))
        .route(
            "/products",
            get(handlers::list_products::<S>).post(handlers::create_product::<S>),
        )
        .route(
            "/products/:id",
            get(handlers::get_product::<S>)
                .put(handlers::update_product::<S>)
                .delete(handlers::delete_product::<S>),
        )
        .route("/analytics/stats", get(handlers::overall_stats::<S>))
        .route("/analytics/range", get(handlers::range_stats::<S>))
        .route("/analytics/profitable", get(handlers::most_profitable::<S>))
        .route("/analytics/stores", get(handlers::store_stats::<S>))
        .route("/analytics/dashboard", get(handlers::dashboard::<S>))
        .route_layer(middleware::from_fn(auth::require_auth));

    let api = gated
        .route("/auth/login", post(auth::login::<S>))
        .route("/auth/check", get(auth::check))
        .route("/auth/logout", post(auth::logout));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::unconfigured::UnconfiguredStorage;
    use crate::SETUP_HINT;
    use anyhow::Result;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    const SESSION: &str = "authenticated=true";

    fn app<S: LedgerStorage + 'static>(storage: S) -> Router {
        let auth = AuthSettings {
            admin_password: "letmein".to_string(),
            cookie_secure: false,
        };
        router(AppState::new(Ledger::new(storage), auth))
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, SESSION);
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = app.clone().oneshot(req).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    #[tokio::test]
    async fn test_health_is_open() -> Result<()> {
        let app = app(MemoryStorage::new());
        let req = Request::get("/health").body(Body::empty())?;
        let (status, body) = send(&app, req).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_gated_routes_require_cookie() -> Result<()> {
        let app = app(MemoryStorage::new());
        let req = Request::get("/api/products").body(Body::empty())?;
        let (status, body) = send(&app, req).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let req = Request::get("/api/auth/check").body(Body::empty())?;
        let (status, body) = send(&app, req).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], false);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_flow() -> Result<()> {
        let app = app(MemoryStorage::new());
        let login = |body: Value| {
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
        };

        let (status, body) = send(&app, login(json!({}))?).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Password required");

        let (status, body) = send(&app, login(json!({ "password": "nope" }))?).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid password");

        let response = app
            .clone()
            .oneshot(login(json!({ "password": "letmein" }))?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(cookie.starts_with("authenticated=true"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));
        Ok(())
    }

    #[tokio::test]
    async fn test_store_and_product_crud() -> Result<()> {
        let app = app(MemoryStorage::new());

        let blank = request(Method::POST, "/api/stores", Some(json!({ "name": "  " })));
        let (status, body) = send(&app, blank).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Store name required");

        let (status, store) = send(
            &app,
            request(Method::POST, "/api/stores", Some(json!({ "name": "The Real Real" }))),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        let store_id = store["id"].as_str().unwrap_or_default().to_string();

        let (status, product) = send(
            &app,
            request(
                Method::POST,
                "/api/products",
                Some(json!({
                    "name": "Suede Jacket",
                    "store_id": store_id,
                    "purchase_price": 100,
                    "purchase_date": "2025-01-10"
                })),
            ),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        let product_uri = format!("/api/products/{}", product["id"].as_str().unwrap_or_default());

        let (status, updated) = send(
            &app,
            request(
                Method::PUT,
                &product_uri,
                Some(json!({ "sale_price": 150, "sale_date": "2025-06-10" })),
            ),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["sale_price"].as_f64(), Some(150.0));

        let (status, row) = send(&app, request(Method::GET, &product_uri, None)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(row["store"]["name"], "The Real Real");
        assert_eq!(
            row["link"],
            "https://www.therealreal.com/products/men/clothing/jackets/suede-jacket"
        );

        let (_, stats) = send(&app, request(Method::GET, "/api/analytics/stats", None)).await?;
        assert_eq!(stats["totalProfit"].as_f64(), Some(50.0));
        assert_eq!(stats["soldItems"], 1);

        let (_, ranking) = send(
            &app,
            request(Method::GET, "/api/analytics/profitable?limit=1", None),
        )
        .await?;
        assert_eq!(ranking[0]["product_name"], "Suede Jacket");
        let margin = ranking[0]["profitMargin"].as_f64().unwrap_or_default();
        assert!((margin - 100.0 / 3.0).abs() < 1e-6);

        let (status, body) = send(
            &app,
            request(Method::DELETE, &format!("/api/stores/{store_id}"), None),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = send(&app, request(Method::GET, &product_uri, None)).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_product_list_filters() -> Result<()> {
        let app = app(MemoryStorage::new());
        let (_, store) = send(
            &app,
            request(Method::POST, "/api/stores", Some(json!({ "name": "Goodwill" }))),
        )
        .await?;
        for (name, sale_price, sold_at) in [
            ("Wool Coat", Some(45), Some("Depop")),
            ("Desk Lamp", None, None),
            ("Wool Scarf", None, None),
        ] {
            let body = json!({
                "name": name,
                "store_id": store["id"],
                "purchase_price": 10,
                "purchase_date": "2025-01-10",
                "sale_price": sale_price,
                "sale_date": sale_price.map(|_| "2025-02-01"),
                "sold_at": sold_at
            });
            let (status, _) = send(&app, request(Method::POST, "/api/products", Some(body))).await?;
            assert_eq!(status, StatusCode::CREATED);
        }

        let names = |rows: &Value| -> Vec<String> {
            let mut names: Vec<String> = rows
                .as_array()
                .map(|rows| {
                    rows.iter()
                        .filter_map(|row| row["name"].as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            names.sort();
            names
        };

        let (_, rows) = send(&app, request(Method::GET, "/api/products", None)).await?;
        assert_eq!(names(&rows).len(), 3);

        let (_, rows) = send(&app, request(Method::GET, "/api/products?status=sold", None)).await?;
        assert_eq!(names(&rows), vec!["Wool Coat"]);

        let uri = "/api/products?status=unsold&q=WOOL";
        let (_, rows) = send(&app, request(Method::GET, uri, None)).await?;
        assert_eq!(names(&rows), vec!["Wool Scarf"]);

        let (_, rows) = send(&app, request(Method::GET, "/api/products?q=depop", None)).await?;
        assert_eq!(names(&rows), vec!["Wool Coat"]);

        let uri = "/api/products?status=gone";
        let (status, body) = send(&app, request(Method::GET, uri, None)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_requests_get_json_errors() -> Result<()> {
        let app = app(MemoryStorage::new());

        let req = Request::post("/api/auth/login").body(Body::from(r#"{"password":"letmein"}"#))?;
        let (status, body) = send(&app, req).await?;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].is_string());

        let missing_name = json!({
            "store_id": "00000000-0000-0000-0000-000000000000",
            "purchase_price": 10,
            "purchase_date": "2025-01-10"
        });
        let req = request(Method::POST, "/api/products", Some(missing_name));
        let (status, body) = send(&app, req).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap_or_default().contains("name"));

        let (status, body) = send(&app, request(Method::GET, "/api/products/not-a-uuid", None)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let uri = "/api/analytics/profitable?limit=many";
        let (status, body) = send(&app, request(Method::GET, uri, None)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_range_requires_both_dates() -> Result<()> {
        let app = app(MemoryStorage::new());
        for uri in [
            "/api/analytics/range",
            "/api/analytics/range?start=2025-01-01",
            "/api/analytics/range?start=2025-01-01&end=tomorrow",
        ] {
            let (status, body) = send(&app, request(Method::GET, uri, None)).await?;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"], "Start and end dates required");
        }

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/analytics/range?start=2025-01-01&end=2025-12-31", None),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["itemsSold"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unconfigured_storage_reports_config_error() -> Result<()> {
        let app = app(UnconfiguredStorage::because("connection refused"));
        for uri in ["/api/products", "/api/analytics/dashboard"] {
            let (status, body) = send(&app, request(Method::GET, uri, None)).await?;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["configError"], true);
            assert_eq!(body["error"], SETUP_HINT);
        }
        Ok(())
    }
}
