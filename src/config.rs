// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{ActivityRepository, BuildingRepository, OrganizationRepository},
    services::organization_service::OrganizationService,
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;

// Configurações lidas do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub server_addr: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {}", raw))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let acquire_timeout_secs = match env::var("DB_ACQUIRE_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_ACQUIRE_TIMEOUT_SECS inválido: {}", raw))?,
            Err(_) => DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            server_addr,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub building_repo: BuildingRepository,
    pub activity_repo: ActivityRepository,
    pub organization_repo: OrganizationRepository,
    pub organization_service: OrganizationService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool) -> Self {
        let building_repo = BuildingRepository::new();
        let activity_repo = ActivityRepository::new();
        let organization_repo = OrganizationRepository::new();
        let organization_service =
            OrganizationService::new(activity_repo.clone(), organization_repo.clone());

        Self {
            db_pool,
            building_repo,
            activity_repo,
            organization_repo,
            organization_service,
        }
    }
}
