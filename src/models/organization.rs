// src/models/organization.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::building::Building;

// --- Telefone (1-N com Organização) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrganizationPhone {
    pub id: i32,
    pub organization_id: i32,
    #[schema(example = "8-923-666-13-13")]
    pub phone: String,
}

// --- Linha "crua" da organização com o prédio já unido (LEFT JOIN) ---
// As colunas do prédio são Option porque o JOIN pode não achar o prédio.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationRow {
    pub id: i32,
    pub name: String,
    pub building_id: Option<i32>,
    pub building_address: Option<String>,
    pub building_latitude: Option<f64>,
    pub building_longitude: Option<f64>,
}

impl OrganizationRow {
    pub fn building(&self) -> Option<Building> {
        match (
            self.building_id,
            self.building_address.as_ref(),
            self.building_latitude,
            self.building_longitude,
        ) {
            (Some(id), Some(address), Some(latitude), Some(longitude)) => Some(Building {
                id,
                address: address.clone(),
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

// --- A "visão" serializada que todas as buscas de organização devolvem ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrganizationView {
    pub id: i32,
    #[schema(example = "ООО Рога и Копыта")]
    pub name: String,
    pub building: Option<Building>,
    pub phones: Vec<String>,
    pub activities: Vec<String>,
}

impl OrganizationView {
    pub fn from_row(row: OrganizationRow, phones: Vec<String>, activities: Vec<String>) -> Self {
        let building = row.building();
        Self {
            id: row.id,
            name: row.name,
            building,
            phones,
            activities,
        }
    }
}
