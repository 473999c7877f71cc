use castline_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = castline_api::setup::initialize_app(config.clone()).await?;

    castline_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
