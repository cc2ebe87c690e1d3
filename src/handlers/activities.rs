// src/handlers/activities.rs

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
    models::activity::Activity,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateActivityPayload {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório (até 200 caracteres)."))]
    pub name: String,
    // Sem pai => a atividade é raiz
    pub parent_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateActivityPayload {
    #[validate(length(min = 1, max = 200, message = "O nome não pode ser vazio (até 200 caracteres)."))]
    pub name: Option<String>,
    // Sempre sobrescrito: ausente => a atividade vira raiz
    pub parent_id: Option<i32>,
}

// GET /activities
#[utoipa::path(
    get,
    path = "/activities",
    tag = "Activities",
    responses((status = 200, body = Vec<Activity>))
)]
pub async fn list_activities(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let activities = app_state.activity_repo.list(&mut *conn).await?;
    Ok((StatusCode::OK, Json(activities)))
}

// GET /activities/{activity_id}
#[utoipa::path(
    get,
    path = "/activities/{activity_id}",
    tag = "Activities",
    params(("activity_id" = i32, Path, description = "ID da atividade")),
    responses(
        (status = 200, body = Activity),
        (status = 404, description = "Atividade não encontrada")
    )
)]
pub async fn get_activity(
    State(app_state): State<AppState>,
    Path(activity_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let activity = app_state
        .activity_repo
        .find_by_id(&mut *conn, activity_id)
        .await?
        .ok_or(AppError::NotFound("Atividade"))?;
    Ok((StatusCode::OK, Json(activity)))
}

// POST /activities
#[utoipa::path(
    post,
    path = "/activities",
    tag = "Activities",
    request_body = CreateActivityPayload,
    responses(
        (status = 201, body = Activity),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Nome duplicado ou pai inexistente")
    )
)]
pub async fn create_activity(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateActivityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let activity = app_state
        .activity_repo
        .create(&mut *conn, &payload.name, payload.parent_id)
        .await?;

    tracing::info!(activity_id = activity.id, parent_id = ?activity.parent_id, "Atividade criada");
    Ok((StatusCode::CREATED, Json(activity)))
}

// PUT /activities/{activity_id}
#[utoipa::path(
    put,
    path = "/activities/{activity_id}",
    tag = "Activities",
    params(("activity_id" = i32, Path, description = "ID da atividade")),
    request_body = UpdateActivityPayload,
    responses(
        (status = 200, body = Activity),
        (status = 404, description = "Atividade não encontrada"),
        (status = 409, description = "Nome duplicado ou pai inexistente")
    )
)]
pub async fn update_activity(
    State(app_state): State<AppState>,
    Path(activity_id): Path<i32>,
    Json(payload): Json<UpdateActivityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let activity = app_state
        .activity_repo
        .update(&mut *conn, activity_id, payload.name.as_deref(), payload.parent_id)
        .await?
        .ok_or(AppError::NotFound("Atividade"))?;
    Ok((StatusCode::OK, Json(activity)))
}

// DELETE /activities/{activity_id}
#[utoipa::path(
    delete,
    path = "/activities/{activity_id}",
    tag = "Activities",
    params(("activity_id" = i32, Path, description = "ID da atividade")),
    responses(
        (status = 200, description = "Atividade removida; os filhos viram raiz", body = Activity),
        (status = 404, description = "Atividade não encontrada")
    )
)]
pub async fn delete_activity(
    State(app_state): State<AppState>,
    Path(activity_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let activity = app_state
        .activity_repo
        .delete(&mut *conn, activity_id)
        .await?
        .ok_or(AppError::NotFound("Atividade"))?;

    tracing::info!(activity_id, "Atividade removida");
    Ok((StatusCode::OK, Json(activity)))
}
