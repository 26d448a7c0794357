use slotledger_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the process environment is used as-is.
    let _ = dotenvy::dotenv();
    slotledger_observability::init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr;
    tracing::info!(?config, "configuration loaded");

    let app = slotledger_api::app::build_app(config);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
