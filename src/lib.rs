pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router with the full middleware stack.
pub fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(
                    config::config().api.max_request_size_bytes,
                ))
                .layer(axum::middleware::from_fn(middleware::authenticate)),
        )
}

fn auth_routes() -> Router {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        .route("/auth/token", post(auth::token_post))
        .route("/auth/register", post(auth::register_post))
}

fn company_routes() -> Router {
    use handlers::companies;

    Router::new()
        .route(
            "/companies",
            get(companies::company_list).post(companies::company_post),
        )
        .route(
            "/companies/:handle",
            get(companies::company_get)
                .patch(companies::company_patch)
                .delete(companies::company_delete),
        )
}

fn job_routes() -> Router {
    use handlers::jobs;

    Router::new()
        .route("/jobs", get(jobs::job_list).post(jobs::job_post))
        .route(
            "/jobs/:id",
            get(jobs::job_get).patch(jobs::job_patch).delete(jobs::job_delete),
        )
}

fn user_routes() -> Router {
    use handlers::users;

    Router::new()
        .route("/users", get(users::user_list).post(users::user_post))
        .route(
            "/users/:username",
            get(users::user_get)
                .patch(users::user_patch)
                .delete(users::user_delete),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Job Board API",
            "version": version,
            "endpoints": {
                "auth": "/auth/token, /auth/register (public - token acquisition)",
                "companies": "/companies[/:handle] (list/detail public, mutation admin)",
                "jobs": "/jobs[/:id] (list/detail public, mutation admin)",
                "users": "/users[/:username] (admin, or self for own record)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
