use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// All application routes
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // DASHBOARDS
        // ========================================
        // D402 Sales Dashboard
        .route(
            "/api/d402/sales_dashboard",
            get(handlers::d402_sales_dashboard::get_default)
                .post(handlers::d402_sales_dashboard::evaluate),
        )
        .route(
            "/api/d402/sales_dashboard/options",
            get(handlers::d402_sales_dashboard::get_options),
        )
        .route(
            "/api/d402/sales_dashboard/reload",
            post(handlers::d402_sales_dashboard::reload),
        )
}
