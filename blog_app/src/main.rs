use blog_app::app::App;
use blog_app::cli::{self, Cli, Command};

use anyhow::Context;
use clap::Parser;
use entrait::Impl;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        config,
        actor,
        command,
    } = Cli::parse();

    if let Command::ReadTime(args) = &command {
        println!("{}", serde_json::to_string_pretty(&cli::read_time_report(args))?);
        return Ok(());
    }

    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;
    let db = blog_db::Db::init(&database_url, config.database_max_connections).await?;

    let app = Impl::new(App {
        config: Arc::new(config),
        db,
    });

    match cli::run(&app, actor.as_deref(), command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(error) => {
            // to_body logs internal causes before hiding them
            eprintln!("{}", serde_json::to_string_pretty(&error.to_body())?);
            std::process::exit(1);
        }
    }
}
