use clap::Parser;
use colorapp::services::color::{self, ColorServerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ColorServerConfig::parse();
    color::run(config).await?;

    Ok(())
}
