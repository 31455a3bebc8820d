use axum::{http::StatusCode, Json};
use contracts::dashboards::d402_sales_dashboard::{
    DashboardControls, DashboardResponse, FilterState,
};
use std::sync::Arc;

use crate::dashboards::d402_sales_dashboard::repository::LoadOutcome;
use crate::dashboards::d402_sales_dashboard::service;
use crate::shared::data::source;

/// GET /api/d402/sales_dashboard
pub async fn get_default() -> Result<Json<DashboardResponse>, StatusCode> {
    run_cycle(FilterState::default()).await
}

/// POST /api/d402/sales_dashboard
pub async fn evaluate(Json(state): Json<FilterState>) -> Result<Json<DashboardResponse>, StatusCode> {
    run_cycle(state).await
}

/// GET /api/d402/sales_dashboard/options
pub async fn get_options() -> Result<Json<Option<DashboardControls>>, StatusCode> {
    let outcome = current_dataset().await?;
    Ok(Json(service::default_controls(
        &outcome,
        &source::dashboard_settings(),
    )))
}

/// POST /api/d402/sales_dashboard/reload
pub async fn reload() -> Result<Json<serde_json::Value>, StatusCode> {
    let result = tokio::task::spawn_blocking(source::reload_dataset)
        .await
        .map_err(|e| {
            tracing::error!("Reload task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match result {
        Ok(outcome) => {
            let total = outcome.dataset().map_or(0, |d| d.len());
            Ok(Json(serde_json::json!({"success": true, "total_records": total})))
        }
        Err(e) => {
            tracing::error!("Failed to reload sales dataset: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn run_cycle(state: FilterState) -> Result<Json<DashboardResponse>, StatusCode> {
    let settings = source::dashboard_settings();
    let response = tokio::task::spawn_blocking(move || {
        source::current_dataset().map(|outcome| service::evaluate(&outcome, &state, &settings))
    })
    .await
    .map_err(|e| {
        tracing::error!("Dashboard cycle task failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|e| {
        tracing::error!("Failed to load sales dataset: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(response))
}

/// Memoized dataset, read off the async workers (the first read may parse the CSV)
async fn current_dataset() -> Result<Arc<LoadOutcome>, StatusCode> {
    tokio::task::spawn_blocking(source::current_dataset)
        .await
        .map_err(|e| {
            tracing::error!("Dataset task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            tracing::error!("Failed to load sales dataset: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d402_sales_dashboard::service::DashboardSettings;
    use crate::dashboards::d402_sales_dashboard::test_data::{write_csv, HEADER};
    use contracts::dashboards::d402_sales_dashboard::{DashboardStatus, Dimension};

    const ROW: &str = "1,CA-2016-152156,2016-11-08,2016-11-11,Second Class,CG-12520,Claire Gute,Consumer,United States,Henderson,Kentucky,42420,South,FUR-BO-10001798,Furniture,Bookcases,Bush Somerset Collection Bookcase,261.96,2,0,41.9136";

    #[tokio::test]
    async fn test_handlers_serve_cycles_and_survive_failed_reload() {
        let path = write_csv("handlers", &format!("{}\n{}\n", HEADER, ROW));
        source::initialize_source(&path, DashboardSettings::default()).unwrap();

        let Json(response) = get_default().await.unwrap();
        assert_eq!(response.status, DashboardStatus::Ready);
        assert_eq!(response.matched_records, 1);

        let state = FilterState::new().with_selection(Dimension::Region, ["West"]);
        let Json(response) = evaluate(Json(state)).await.unwrap();
        assert_eq!(response.status, DashboardStatus::NoMatchingRecords);

        let Json(controls) = get_options().await.unwrap();
        assert_eq!(controls.unwrap().measures.len(), 4);

        std::fs::write(&path, "Row ID\n1\n").unwrap();
        assert_eq!(reload().await.unwrap_err(), StatusCode::INTERNAL_SERVER_ERROR);

        let Json(response) = get_default().await.unwrap();
        assert_eq!(response.status, DashboardStatus::Ready);
        assert_eq!(response.total_records, 1);

        std::fs::remove_file(path).ok();
    }
}
