use std::{env, sync::Arc};

use migration::{Migrator, MigratorTrait};

use crate::{chat::Chat, prelude::*, session::Sessions, sv, verify::Verifier};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:keyshop.db?mode=rwc";
pub const DEFAULT_VERIFY_URL: &str =
  "https://api.intechost.com/bharatpe/api.php";

#[derive(Debug, Clone)]
pub struct Config {
  pub bot_token: String,
  pub database_url: String,
  /// Seeded as active super admins on every start
  pub super_admins: Vec<i64>,
  pub verify_url: String,
  pub verify_timeout: Duration,
  pub session_ttl: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      bot_token: String::new(),
      database_url: DEFAULT_DATABASE_URL.into(),
      super_admins: Vec::new(),
      verify_url: DEFAULT_VERIFY_URL.into(),
      verify_timeout: Duration::from_secs(10),
      session_ttl: Duration::from_secs(30 * 60),
    }
  }
}

fn duration_var(name: &str, default: Duration) -> anyhow::Result<Duration> {
  match env::var(name) {
    Ok(value) => humantime::parse_duration(&value)
      .with_context(|| format!("{name} is not a duration: `{value}`")),
    Err(_) => Ok(default),
  }
}

fn id_list(value: &str) -> anyhow::Result<Vec<i64>> {
  value
    .split(',')
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .map(|id| id.parse().with_context(|| format!("Invalid admin id `{id}`")))
    .collect()
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let default = Self::default();

    let super_admins = match env::var("SUPER_ADMINS") {
      Ok(ids) => id_list(&ids)?,
      Err(_) => Vec::new(),
    };

    Ok(Self {
      bot_token: env::var("TELOXIDE_TOKEN").context("TELOXIDE_TOKEN not set")?,
      database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),
      super_admins,
      verify_url: env::var("VERIFY_URL").unwrap_or(default.verify_url),
      verify_timeout: duration_var("VERIFY_TIMEOUT", default.verify_timeout)?,
      session_ttl: duration_var("SESSION_TTL", default.session_ttl)?,
    })
  }
}

pub struct Services<'a> {
  pub user: sv::User<'a>,
  pub package: sv::Package<'a>,
  pub upi: sv::Upi<'a>,
  pub ledger: sv::Ledger<'a>,
  pub review: sv::Review<'a>,
  pub admin: sv::Admin<'a>,
  pub settings: sv::Settings<'a>,
  pub stats: sv::Stats<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub chat: Arc<dyn Chat>,
  pub verifier: Arc<dyn Verifier>,
  pub sessions: Sessions,
  pub config: Config,
}

impl AppState {
  pub fn new(
    db: DatabaseConnection,
    chat: Arc<dyn Chat>,
    verifier: Arc<dyn Verifier>,
    config: Config,
  ) -> Self {
    Self { db, chat, verifier, sessions: Sessions::new(), config }
  }

  /// Opens the database, applies migrations and seeds the owners
  pub async fn connect(
    config: Config,
    chat: Arc<dyn Chat>,
    verifier: Arc<dyn Verifier>,
  ) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    let app = Self::new(db, chat, verifier, config);
    app.sv().admin.bootstrap(&app.config.super_admins).await?;
    if app.config.super_admins.is_empty() {
      warn!("SUPER_ADMINS is empty, admin panel reachable only by stored admins");
    }

    Ok(app)
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      user: sv::User::new(&self.db),
      package: sv::Package::new(&self.db),
      upi: sv::Upi::new(&self.db),
      ledger: sv::Ledger::new(&self.db),
      review: sv::Review::new(&self.db),
      admin: sv::Admin::new(&self.db),
      settings: sv::Settings::new(&self.db),
      stats: sv::Stats::new(&self.db),
    }
  }

  pub fn gc_sessions(&self) {
    let dropped = self.sessions.gc(self.config.session_ttl);
    if dropped > 0 {
      debug!(
        "Dropped {dropped} idle sessions, {} still open",
        self.sessions.len()
      );
    }
  }
}
