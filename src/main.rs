//! UPI key shop bot.
//!
//! Buyers pick a package, pay over UPI and prove the payment with a
//! transaction id (checked against the settlement API) or a screenshot
//! (checked by an admin). A verified payment becomes a single-use token that
//! is exchanged for a license key.

mod chat;
mod entity;
mod error;
mod flow;
mod plugins;
mod prelude;
mod session;
mod state;
mod sv;
#[cfg(test)]
mod testing;
mod utils;
mod verify;

use std::sync::Arc;

use teloxide::Bot;
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  plugins::{App, cron, telegram},
  prelude::*,
  state::{AppState, Config},
  verify::HttpVerifier,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "keyshop=debug,sea_orm=warn,teloxide=info".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;
  info!("Starting keyshop v{}", env!("CARGO_PKG_VERSION"));

  let bot = Bot::new(&config.bot_token);
  let verifier =
    HttpVerifier::new(config.verify_url.clone(), config.verify_timeout)?;
  let app = Arc::new(
    AppState::connect(config, Arc::new(bot.clone()), Arc::new(verifier))
      .await?,
  );

  App::new()
    .register(telegram::Plugin::new(bot))
    .register(cron::Plugin)
    .run(app)
    .await;

  tokio::signal::ctrl_c().await?;
  info!("Shutting down");
  Ok(())
}
