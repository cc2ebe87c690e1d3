use sqlx::{pool::PoolConnection, Postgres};

use crate::common::error::AppError;
use crate::config::AppState;

// ---
// Helper: a "sessão" de banco de uma requisição
// ---
/// Adquire uma conexão da pool para a duração da requisição.
/// Ela volta para a pool no `Drop`, com sucesso ou erro.
pub(crate) async fn get_connection(
    app_state: &AppState,
) -> Result<PoolConnection<Postgres>, AppError> {
    // O operador '?' converte sqlx::Error -> AppError::DatabaseError
    let conn = app_state.db_pool.acquire().await?;
    Ok(conn)
}
