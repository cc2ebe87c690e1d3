// src/middleware/request_log.rs

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

// Registra método, caminho, status e duração de cada requisição.
// 5xx => error, 4xx => warn, o resto => info.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    tracing::debug!(%method, %path, "📥 Requisição recebida");

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), elapsed_ms, "💥 Falha");
    } else if status.is_client_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), elapsed_ms, "⚠️ Requisição rejeitada");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), elapsed_ms, "📤 Sucesso");
    }

    response
}
