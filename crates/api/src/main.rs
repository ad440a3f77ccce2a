use blog_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    blog_observability::init();

    let config = AppConfig::from_env()?;
    let server = blog_api::server::start(&config.database_url, config.port).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    server.stop().await?;

    Ok(())
}
