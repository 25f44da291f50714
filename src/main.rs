use std::sync::Arc;

use kinoteka::{AppState, build_app, catalog::Catalog, config::Config, review_limit::ReviewLimiter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,kinoteka=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = kinoteka::db::connect_and_migrate(&config.database_url).await?;
    let catalog = Catalog::new(db);

    let review_limiter = Arc::new(ReviewLimiter::new(config.review_rate_per_min));

    let state = Arc::new(AppState { config: config.clone(), catalog, review_limiter });

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
