mod app;
mod bot;
mod config;
mod db;
mod links;
mod models;
mod service;
mod telemetry;

use anyhow::Result;
use teloxide::prelude::Bot;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
  telemetry::init()?;
  let config = config::Config::from_env()?;
  info!("starting alliance bot");

  let bot = Bot::new(config.bot_token.clone());
  let db = db::Db::connect(&config.database_url).await?;
  let links = links::LinkStore::connect(&config.redis_url).await?;
  let app = app::App::new(bot, db, links);
  app.run().await
}
