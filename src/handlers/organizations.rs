// src/handlers/organizations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    models::organization::{OrganizationPhone, OrganizationView},
    services::geo::{GeoPoint, SearchArea},
};

// ---
// Validação Customizada
// ---
fn validate_phones(phones: &Vec<String>) -> Result<(), ValidationError> {
    if phones.iter().any(|p| p.trim().is_empty() || p.chars().count() > 50) {
        let mut err = ValidationError::new("phone");
        err.message = Some("Cada telefone deve ter entre 1 e 50 caracteres.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Query: busca geográfica
// ---
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NearbyQuery {
    /// Latitude do centro
    #[validate(range(min = -90.0, max = 90.0, message = "A latitude deve estar entre -90 e 90."))]
    pub lat: f64,
    /// Longitude do centro
    #[validate(range(min = -180.0, max = 180.0, message = "A longitude deve estar entre -180 e 180."))]
    pub lon: f64,
    /// Raio em km (ignorado se o retângulo vier completo)
    #[validate(range(exclusive_min = 0.0, message = "O raio deve ser maior que zero."))]
    pub radius: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0, message = "A latitude deve estar entre -90 e 90."))]
    pub min_lat: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0, message = "A latitude deve estar entre -90 e 90."))]
    pub max_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "A longitude deve estar entre -180 e 180."))]
    pub min_lon: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "A longitude deve estar entre -180 e 180."))]
    pub max_lon: Option<f64>,
}

impl NearbyQuery {
    pub fn area(&self) -> SearchArea {
        SearchArea::select(
            GeoPoint::new(self.lat, self.lon),
            self.radius,
            self.min_lat,
            self.max_lat,
            self.min_lon,
            self.max_lon,
        )
    }
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Trecho do nome (sem diferenciar maiúsculas)
    #[validate(length(min = 1, message = "O termo de busca é obrigatório."))]
    pub name: String,
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationPayload {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (até 255 caracteres)."))]
    pub name: String,

    pub building_id: i32,

    #[validate(custom(function = "validate_phones"))]
    #[serde(default)]
    pub phones: Vec<String>,

    #[serde(default)]
    pub activity_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganizationPayload {
    #[validate(length(min = 1, max = 255, message = "O nome não pode ser vazio (até 255 caracteres)."))]
    pub name: Option<String>,
    pub building_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePhonePayload {
    #[validate(length(min = 1, max = 50, message = "O telefone deve ter entre 1 e 50 caracteres."))]
    pub phone: String,
}

// ---
// Leitura
// ---

// GET /organizations
#[utoipa::path(
    get,
    path = "/organizations",
    tag = "Organizations",
    responses((status = 200, body = Vec<OrganizationView>))
)]
pub async fn list_organizations(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let organizations = app_state.organization_repo.find_all(&mut *conn).await?;
    Ok((StatusCode::OK, Json(organizations)))
}

// GET /organizations/search?name=
#[utoipa::path(
    get,
    path = "/organizations/search",
    tag = "Organizations",
    params(SearchQuery),
    responses((status = 200, body = Vec<OrganizationView>))
)]
pub async fn search_organizations(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let organizations = app_state
        .organization_repo
        .search_by_name(&mut *conn, &query.name)
        .await?;
    Ok((StatusCode::OK, Json(organizations)))
}

// GET /organizations/nearby
#[utoipa::path(
    get,
    path = "/organizations/nearby",
    tag = "Organizations",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Organizações no retângulo, no raio ou todas", body = Vec<OrganizationView>),
        (status = 400, description = "Coordenadas inválidas")
    )
)]
pub async fn get_organizations_nearby(
    State(app_state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let area = query.area();
    let mut conn = get_connection(&app_state).await?;
    let organizations = app_state.organization_service.nearby(&mut *conn, area).await?;
    Ok((StatusCode::OK, Json(organizations)))
}

// GET /organizations/{organization_id}
#[utoipa::path(
    get,
    path = "/organizations/{organization_id}",
    tag = "Organizations",
    params(("organization_id" = i32, Path, description = "ID da organização")),
    responses(
        (status = 200, body = OrganizationView),
        (status = 404, description = "Organização não encontrada")
    )
)]
pub async fn get_organization(
    State(app_state): State<AppState>,
    Path(organization_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let organization = app_state
        .organization_repo
        .find_by_id(&mut *conn, organization_id)
        .await?
        .ok_or(AppError::NotFound("Organização"))?;
    Ok((StatusCode::OK, Json(organization)))
}

// GET /organizations/by-building/{building_id}
#[utoipa::path(
    get,
    path = "/organizations/by-building/{building_id}",
    tag = "Organizations",
    params(("building_id" = i32, Path, description = "ID do prédio")),
    responses((status = 200, body = Vec<OrganizationView>))
)]
pub async fn get_organizations_by_building(
    State(app_state): State<AppState>,
    Path(building_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let organizations = app_state
        .organization_repo
        .find_by_building(&mut *conn, building_id)
        .await?;
    Ok((StatusCode::OK, Json(organizations)))
}

// GET /organizations/by-activity/{activity_id}
#[utoipa::path(
    get,
    path = "/organizations/by-activity/{activity_id}",
    tag = "Organizations",
    params(("activity_id" = i32, Path, description = "ID de uma atividade raiz")),
    responses(
        (status = 200, description = "Organizações da árvore inteira; vazio se o id não for raiz", body = Vec<OrganizationView>)
    )
)]
pub async fn get_organizations_by_activity(
    State(app_state): State<AppState>,
    Path(activity_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let organizations = app_state
        .organization_service
        .by_activity_id(&mut *conn, activity_id)
        .await?;
    Ok((StatusCode::OK, Json(organizations)))
}

// GET /organizations/by_activity_tree/{activity_name}
#[utoipa::path(
    get,
    path = "/organizations/by_activity_tree/{activity_name}",
    tag = "Organizations",
    params(("activity_name" = String, Path, description = "Nome exato de uma atividade raiz")),
    responses(
        (status = 200, description = "Organizações da árvore inteira; vazio se o nome não for raiz", body = Vec<OrganizationView>)
    )
)]
pub async fn get_organizations_by_activity_tree(
    State(app_state): State<AppState>,
    Path(activity_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let organizations = app_state
        .organization_service
        .by_activity_tree(&mut *conn, &activity_name)
        .await?;
    Ok((StatusCode::OK, Json(organizations)))
}

// ---
// Escrita
// ---

// POST /organizations
#[utoipa::path(
    post,
    path = "/organizations",
    tag = "Organizations",
    request_body = CreateOrganizationPayload,
    responses(
        (status = 201, body = OrganizationView),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Nome duplicado no prédio, prédio ou atividade inexistente")
    )
)]
pub async fn create_organization(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOrganizationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let organization = app_state
        .organization_repo
        .create(
            &mut *conn,
            &payload.name,
            payload.building_id,
            &payload.phones,
            &payload.activity_ids,
        )
        .await?;

    tracing::info!(organization_id = organization.id, "Organização criada");
    Ok((StatusCode::CREATED, Json(organization)))
}

// PUT /organizations/{organization_id}
#[utoipa::path(
    put,
    path = "/organizations/{organization_id}",
    tag = "Organizations",
    params(("organization_id" = i32, Path, description = "ID da organização")),
    request_body = UpdateOrganizationPayload,
    responses(
        (status = 200, body = OrganizationView),
        (status = 404, description = "Organização não encontrada"),
        (status = 409, description = "Nome duplicado no prédio ou prédio inexistente")
    )
)]
pub async fn update_organization(
    State(app_state): State<AppState>,
    Path(organization_id): Path<i32>,
    Json(payload): Json<UpdateOrganizationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let organization = app_state
        .organization_repo
        .update(
            &mut *conn,
            organization_id,
            payload.name.as_deref(),
            payload.building_id,
        )
        .await?
        .ok_or(AppError::NotFound("Organização"))?;
    Ok((StatusCode::OK, Json(organization)))
}

// DELETE /organizations/{organization_id}
#[utoipa::path(
    delete,
    path = "/organizations/{organization_id}",
    tag = "Organizations",
    params(("organization_id" = i32, Path, description = "ID da organização")),
    responses(
        (status = 200, description = "Organização removida com telefones e vínculos", body = OrganizationView),
        (status = 404, description = "Organização não encontrada")
    )
)]
pub async fn delete_organization(
    State(app_state): State<AppState>,
    Path(organization_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let organization = app_state
        .organization_repo
        .delete(&mut *conn, organization_id)
        .await?
        .ok_or(AppError::NotFound("Organização"))?;

    tracing::info!(organization_id, "Organização removida");
    Ok((StatusCode::OK, Json(organization)))
}

// ---
// Telefones
// ---

// GET /organizations/{organization_id}/phones
#[utoipa::path(
    get,
    path = "/organizations/{organization_id}/phones",
    tag = "Organizations",
    params(("organization_id" = i32, Path, description = "ID da organização")),
    responses((status = 200, body = Vec<String>))
)]
pub async fn list_phones(
    State(app_state): State<AppState>,
    Path(organization_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let phones = app_state
        .organization_repo
        .list_phones(&mut *conn, organization_id)
        .await?;
    Ok((StatusCode::OK, Json(phones)))
}

// POST /organizations/{organization_id}/phones
#[utoipa::path(
    post,
    path = "/organizations/{organization_id}/phones",
    tag = "Organizations",
    params(("organization_id" = i32, Path, description = "ID da organização")),
    request_body = CreatePhonePayload,
    responses(
        (status = 201, body = OrganizationPhone),
        (status = 404, description = "Organização não encontrada")
    )
)]
pub async fn create_phone(
    State(app_state): State<AppState>,
    Path(organization_id): Path<i32>,
    Json(payload): Json<CreatePhonePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let phone = app_state
        .organization_repo
        .add_phone(&mut *conn, organization_id, &payload.phone)
        .await?;
    Ok((StatusCode::CREATED, Json(phone)))
}

// DELETE /organizations/{organization_id}/phones/{phone_id}
#[utoipa::path(
    delete,
    path = "/organizations/{organization_id}/phones/{phone_id}",
    tag = "Organizations",
    params(
        ("organization_id" = i32, Path, description = "ID da organização"),
        ("phone_id" = i32, Path, description = "ID do telefone")
    ),
    responses(
        (status = 200, body = OrganizationPhone),
        (status = 404, description = "Telefone não encontrado nesta organização")
    )
)]
pub async fn delete_phone(
    State(app_state): State<AppState>,
    Path((organization_id, phone_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let phone = app_state
        .organization_repo
        .delete_phone(&mut *conn, organization_id, phone_id)
        .await?
        .ok_or(AppError::NotFound("Telefone"))?;
    Ok((StatusCode::OK, Json(phone)))
}

// ---
// Vínculos com atividades
// ---

// POST /organizations/{organization_id}/activities/{activity_id}
#[utoipa::path(
    post,
    path = "/organizations/{organization_id}/activities/{activity_id}",
    tag = "Organizations",
    params(
        ("organization_id" = i32, Path, description = "ID da organização"),
        ("activity_id" = i32, Path, description = "ID da atividade")
    ),
    responses(
        (status = 200, body = OrganizationView),
        (status = 404, description = "Organização ou atividade não encontrada")
    )
)]
pub async fn link_activity(
    State(app_state): State<AppState>,
    Path((organization_id, activity_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    app_state
        .organization_repo
        .link_activity(&mut *conn, organization_id, activity_id)
        .await?;

    let organization = app_state
        .organization_repo
        .find_by_id(&mut *conn, organization_id)
        .await?
        .ok_or(AppError::NotFound("Organização"))?;
    Ok((StatusCode::OK, Json(organization)))
}

// DELETE /organizations/{organization_id}/activities/{activity_id}
#[utoipa::path(
    delete,
    path = "/organizations/{organization_id}/activities/{activity_id}",
    tag = "Organizations",
    params(
        ("organization_id" = i32, Path, description = "ID da organização"),
        ("activity_id" = i32, Path, description = "ID da atividade")
    ),
    responses(
        (status = 200, body = OrganizationView),
        (status = 404, description = "Vínculo não encontrado")
    )
)]
pub async fn unlink_activity(
    State(app_state): State<AppState>,
    Path((organization_id, activity_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let removed = app_state
        .organization_repo
        .unlink_activity(&mut *conn, organization_id, activity_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound("Vínculo"));
    }

    let organization = app_state
        .organization_repo
        .find_by_id(&mut *conn, organization_id)
        .await?
        .ok_or(AppError::NotFound("Organização"))?;
    Ok((StatusCode::OK, Json(organization)))
}
