//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: nível controlado por RUST_LOG (padrão: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // `--seed`: recria os dados de demonstração e sai
    if std::env::args().any(|arg| arg == "--seed") {
        db::seed::seed_demo_data(&app_state.db_pool).await?;
        return Ok(());
    }

    let app = routes::build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", settings.server_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
