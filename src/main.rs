//src/main.rs

use chrono::Local;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use clinica_backend::{app::build_router, config::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG controla o nível (padrão: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().await?;

    if app_state.config.seed_on_start {
        app_state.seed_service.seed(Local::now().date_naive()).await?;
    }

    let addr = app_state.config.server_address.clone();
    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
