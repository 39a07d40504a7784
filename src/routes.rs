use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{self, AppConfig, Environment};
use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

pub fn app() -> Router {
    let config = config::config();

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes().route_layer(middleware::from_fn(jwt_auth_middleware)))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.api.request_timeout_secs)))
        .layer(cors_layer(config));

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Development answers any origin; elsewhere only the configured ones
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

fn auth_public_routes() -> Router {
    use public::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/register", post(auth::register_post))
}

fn protected_routes() -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(student_routes())
        .merge(vendor_routes())
        .merge(verification_routes())
        .merge(admin_routes())
}

fn auth_routes() -> Router {
    use protected::auth;

    Router::new()
        .route("/api/auth/me", get(auth::me_get))
        .route("/api/auth/create-user", post(auth::create_user_post))
}

fn student_routes() -> Router {
    use protected::students;

    Router::new()
        .route("/api/students", get(students::students_get))
        .route("/api/students/my-qr-code", get(students::my_qr_code_get))
        .route("/api/students/search/:identifier", get(students::student_search_get))
        .route(
            "/api/students/:id",
            get(students::student_get)
                .put(students::student_put)
                .delete(students::student_delete),
        )
        .route("/api/students/:id/meals", get(students::student_meals_get))
}

fn vendor_routes() -> Router {
    use protected::vendors;

    Router::new()
        .route("/api/vendors", get(vendors::vendors_get).post(vendors::vendor_post))
        .route("/api/vendors/:id", get(vendors::vendor_get).put(vendors::vendor_put))
        .route("/api/vendors/:id/dashboard", get(vendors::vendor_dashboard_get))
        .route("/api/vendors/:id/students/search", get(vendors::vendor_student_search_get))
}

fn verification_routes() -> Router {
    use protected::verification;

    Router::new()
        .route("/api/verification/verify", post(verification::verify_post))
        .route("/api/verification/history/:vendor_id", get(verification::history_get))
        .route("/api/verification/stats/:vendor_id", get(verification::stats_get))
}

fn admin_routes() -> Router {
    use protected::admin;

    Router::new()
        .route("/api/admin/upload-csv", post(admin::upload_csv_post))
        .route("/api/admin/export-students", get(admin::export_students_get))
        .route("/api/admin/stats", get(admin::admin_stats_get))
        .route("/api/admin/bulk-deactivate", post(admin::bulk_deactivate_post))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "MealPass API",
            "version": version,
            "description": "Meal-voucher verification: roster import, QR identities, one meal per day",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/api/auth/login, /api/auth/register (public - token acquisition)",
                "auth": "/api/auth/me, /api/auth/create-user (protected)",
                "students": "/api/students[/:id[/meals]], /api/students/search/:identifier, /api/students/my-qr-code (protected)",
                "vendors": "/api/vendors[/:id[/dashboard|/students/search]] (protected)",
                "verification": "/api/verification/verify, /api/verification/{history,stats}/:vendorId (protected)",
                "admin": "/api/admin/{upload-csv,export-students,stats,bulk-deactivate} (admin)",
            }
        }
    }))
}

async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
