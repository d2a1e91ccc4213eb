use anyhow::Result;
use clap::Parser;
use edgewatch::notify::NotifyArgs;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    NotifyArgs::parse().run().await
}
