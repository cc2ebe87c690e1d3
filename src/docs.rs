// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Organizations ---
        handlers::organizations::list_organizations,
        handlers::organizations::search_organizations,
        handlers::organizations::get_organizations_nearby,
        handlers::organizations::get_organization,
        handlers::organizations::get_organizations_by_building,
        handlers::organizations::get_organizations_by_activity,
        handlers::organizations::get_organizations_by_activity_tree,
        handlers::organizations::create_organization,
        handlers::organizations::update_organization,
        handlers::organizations::delete_organization,
        handlers::organizations::list_phones,
        handlers::organizations::create_phone,
        handlers::organizations::delete_phone,
        handlers::organizations::link_activity,
        handlers::organizations::unlink_activity,

        // --- Buildings ---
        handlers::buildings::list_buildings,
        handlers::buildings::get_building,
        handlers::buildings::create_building,
        handlers::buildings::update_building,
        handlers::buildings::delete_building,

        // --- Activities ---
        handlers::activities::list_activities,
        handlers::activities::get_activity,
        handlers::activities::create_activity,
        handlers::activities::update_activity,
        handlers::activities::delete_activity,
    ),
    components(
        schemas(
            models::building::Building,
            models::activity::Activity,
            models::organization::OrganizationView,
            models::organization::OrganizationPhone,

            // --- Payloads ---
            handlers::buildings::CreateBuildingPayload,
            handlers::buildings::UpdateBuildingPayload,
            handlers::activities::CreateActivityPayload,
            handlers::activities::UpdateActivityPayload,
            handlers::organizations::CreateOrganizationPayload,
            handlers::organizations::UpdateOrganizationPayload,
            handlers::organizations::CreatePhonePayload,
        )
    ),
    tags(
        (name = "Organizations", description = "Organizações, telefones, busca por árvore de atividades e geográfica"),
        (name = "Buildings", description = "Prédios e coordenadas"),
        (name = "Activities", description = "Árvore de atividades")
    )
)]
pub struct ApiDoc;
