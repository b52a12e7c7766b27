mod config;
mod routes;
mod services;
mod state;
mod supabase;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let client = Arc::new(supabase::SupabaseClient::new(&config.supabase).expect("supabase client init failed"));
    tracing::info!(project = config.supabase.project_ref(), "supabase client initialized");

    let state = state::AppState::new(
        client.clone(),
        client,
        config.supabase.storage_key(),
        config.cookie_secure,
    );

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "drawings-server listening");
    axum::serve(listener, app).await.expect("server failed");
}
