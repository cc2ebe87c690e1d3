// src/handlers/buildings.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    models::building::Building,
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBuildingPayload {
    #[validate(length(min = 1, max = 255, message = "O endereço é obrigatório (até 255 caracteres)."))]
    pub address: String,

    #[validate(range(min = -90.0, max = 90.0, message = "A latitude deve estar entre -90 e 90."))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "A longitude deve estar entre -180 e 180."))]
    pub longitude: f64,
}

// Campos ausentes mantêm o valor atual
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBuildingPayload {
    #[validate(length(min = 1, max = 255, message = "O endereço não pode ser vazio (até 255 caracteres)."))]
    pub address: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "A latitude deve estar entre -90 e 90."))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "A longitude deve estar entre -180 e 180."))]
    pub longitude: Option<f64>,
}

// GET /buildings
#[utoipa::path(
    get,
    path = "/buildings",
    tag = "Buildings",
    responses(
        (status = 200, description = "Todos os prédios", body = Vec<Building>)
    )
)]
pub async fn list_buildings(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let buildings = app_state.building_repo.list(&mut *conn).await?;
    Ok((StatusCode::OK, Json(buildings)))
}

// GET /buildings/{building_id}
#[utoipa::path(
    get,
    path = "/buildings/{building_id}",
    tag = "Buildings",
    params(("building_id" = i32, Path, description = "ID do prédio")),
    responses(
        (status = 200, body = Building),
        (status = 404, description = "Prédio não encontrado")
    )
)]
pub async fn get_building(
    State(app_state): State<AppState>,
    Path(building_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let building = app_state
        .building_repo
        .find_by_id(&mut *conn, building_id)
        .await?
        .ok_or(AppError::NotFound("Prédio"))?;
    Ok((StatusCode::OK, Json(building)))
}

// POST /buildings
#[utoipa::path(
    post,
    path = "/buildings",
    tag = "Buildings",
    request_body = CreateBuildingPayload,
    responses(
        (status = 201, body = Building),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_building(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateBuildingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let building = app_state
        .building_repo
        .create(&mut *conn, &payload.address, payload.latitude, payload.longitude)
        .await?;

    tracing::info!(building_id = building.id, "Prédio criado");
    Ok((StatusCode::CREATED, Json(building)))
}

// PUT /buildings/{building_id}
#[utoipa::path(
    put,
    path = "/buildings/{building_id}",
    tag = "Buildings",
    params(("building_id" = i32, Path, description = "ID do prédio")),
    request_body = UpdateBuildingPayload,
    responses(
        (status = 200, body = Building),
        (status = 404, description = "Prédio não encontrado")
    )
)]
pub async fn update_building(
    State(app_state): State<AppState>,
    Path(building_id): Path<i32>,
    Json(payload): Json<UpdateBuildingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let building = app_state
        .building_repo
        .update(
            &mut *conn,
            building_id,
            payload.address.as_deref(),
            payload.latitude,
            payload.longitude,
        )
        .await?
        .ok_or(AppError::NotFound("Prédio"))?;
    Ok((StatusCode::OK, Json(building)))
}

// DELETE /buildings/{building_id}
#[utoipa::path(
    delete,
    path = "/buildings/{building_id}",
    tag = "Buildings",
    params(("building_id" = i32, Path, description = "ID do prédio")),
    responses(
        (status = 200, description = "Prédio removido", body = Building),
        (status = 404, description = "Prédio não encontrado"),
        (status = 409, description = "Prédio ainda possui organizações")
    )
)]
pub async fn delete_building(
    State(app_state): State<AppState>,
    Path(building_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let building = app_state
        .building_repo
        .delete(&mut *conn, building_id)
        .await?
        .ok_or(AppError::NotFound("Prédio"))?;

    tracing::info!(building_id, "Prédio removido");
    Ok((StatusCode::OK, Json(building)))
}
