mod db;
mod env;
mod error;
mod finance;
mod llm;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::llm::LlmChat;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = env::env_parse("PORT", 3000);

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "assistant enabled");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "assistant disabled");
            None
        }
    };
    let state = state::AppState::new(pool, llm);
    if state.email.is_none() {
        tracing::warn!("RESEND_API_KEY or RESEND_FROM not set; access codes will not be emailed");
    }

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "finpro listening");
    axum::serve(listener, app).await.expect("server failed");
}
