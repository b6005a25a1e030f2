use sora_proxy::Config;
use tracing::error;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    sora_proxy::run(config).await;
}
