// src/models/building.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// Prédio com coordenadas (usado na busca geográfica)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Building {
    pub id: i32,
    #[schema(example = "г. Москва, ул. Ленина 1")]
    pub address: String,
    #[schema(example = 55.7558)]
    pub latitude: f64,
    #[schema(example = 37.6173)]
    pub longitude: f64,
}
