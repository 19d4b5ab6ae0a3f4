use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use dgc_core::{
    core_version, Manual, ManualPatch, ManualService, Month, NewManual, SqliteManualRepository,
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    error::ApiError,
    state::{with_db, AppState},
};

/// Routes mounted under `/api/manuals`.
pub fn manual_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommended", get(recommended_handler))
        .route("/month/{month}", get(month_handler))
        .route("/all", get(all_handler))
        .route("/create", post(create_handler))
        .route("/update/{id}", put(update_handler))
        .route("/delete/{id}", delete(delete_handler))
        .route("/clear/all", delete(clear_handler))
        .route("/edit/{key}", get(edit_handler))
}

fn manual_service(conn: &Connection) -> Result<ManualService<SqliteManualRepository<'_>>, ApiError> {
    Ok(ManualService::new(SqliteManualRepository::try_new(conn)?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedResponse {
    success: bool,
    data: Vec<Manual>,
    current_week: u32,
    primary_month: Month,
    secondary_month: Month,
}

#[derive(Serialize)]
pub struct MonthResponse {
    success: bool,
    month: Month,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    data: Vec<Manual>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllResponse {
    success: bool,
    data: BTreeMap<Month, Vec<Manual>>,
    total_manuals: usize,
}

#[derive(Serialize)]
pub struct ManualResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    data: Manual,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    success: bool,
    message: String,
    deleted_count: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    success: bool,
    status: &'static str,
    version: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok",
        version: core_version(),
    })
}

pub async fn recommended_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecommendedResponse>, ApiError> {
    let today = state.today();
    let recommendation =
        with_db(&state, move |conn| Ok(manual_service(conn)?.recommended(today)?)).await?;

    Ok(Json(RecommendedResponse {
        success: true,
        data: recommendation.manuals,
        current_week: recommendation.week_number,
        primary_month: recommendation.primary_month,
        secondary_month: recommendation.secondary_month,
    }))
}

pub async fn month_handler(
    State(state): State<Arc<AppState>>,
    Path(month): Path<String>,
) -> Result<Json<MonthResponse>, ApiError> {
    let listing =
        with_db(&state, move |conn| Ok(manual_service(conn)?.manuals_for_month(&month)?)).await?;

    Ok(Json(MonthResponse {
        success: true,
        month: listing.month,
        count: Some(listing.manuals.len()),
        data: listing.manuals,
    }))
}

pub async fn all_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AllResponse>, ApiError> {
    let grouped =
        with_db(&state, |conn| Ok(manual_service(conn)?.manuals_grouped_by_month()?)).await?;

    Ok(Json(AllResponse {
        success: true,
        data: grouped.by_month,
        total_manuals: grouped.total,
    }))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewManual>, JsonRejection>,
) -> Result<(StatusCode, Json<ManualResponse>), ApiError> {
    let Json(input) = payload?;
    let created = with_db(&state, move |conn| Ok(manual_service(conn)?.create_manual(input)?)).await?;

    Ok((
        StatusCode::CREATED,
        Json(ManualResponse {
            success: true,
            message: Some("Manual created successfully"),
            data: created,
        }),
    ))
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ManualPatch>, JsonRejection>,
) -> Result<Json<ManualResponse>, ApiError> {
    let Json(patch) = payload?;
    let updated =
        with_db(&state, move |conn| Ok(manual_service(conn)?.update_manual(&id, patch)?)).await?;

    Ok(Json(ManualResponse {
        success: true,
        message: Some("Manual updated successfully"),
        data: updated,
    }))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ManualResponse>, ApiError> {
    let deleted = with_db(&state, move |conn| Ok(manual_service(conn)?.delete_manual(&id)?)).await?;

    Ok(Json(ManualResponse {
        success: true,
        message: Some("Manual deleted successfully"),
        data: deleted,
    }))
}

pub async fn clear_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, ApiError> {
    let deleted_count = with_db(&state, |conn| Ok(manual_service(conn)?.clear_all()?)).await?;

    Ok(Json(ClearResponse {
        success: true,
        message: format!("Deleted {deleted_count} manuals"),
        deleted_count,
    }))
}

/// Editing reads: a key that normalizes to a month lists that month,
/// anything else is looked up as a manual id.
pub async fn edit_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    if Month::normalize(&key).is_some() {
        let listing =
            with_db(&state, move |conn| Ok(manual_service(conn)?.manuals_for_month(&key)?)).await?;
        return Ok(Json(MonthResponse {
            success: true,
            month: listing.month,
            count: None,
            data: listing.manuals,
        })
        .into_response());
    }

    let manual = with_db(&state, move |conn| Ok(manual_service(conn)?.get_manual(&key)?)).await?;
    Ok(Json(ManualResponse {
        success: true,
        message: None,
        data: manual,
    })
    .into_response())
}
