pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_packages;
mod m20260301_000003_create_upi_routes;
mod m20260301_000004_create_tokens;
mod m20260301_000005_create_keys;
mod m20260301_000006_create_pending_reviews;
mod m20260301_000007_create_admins;
mod m20260301_000008_create_bot_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260301_000001_create_users::Migration),
      Box::new(m20260301_000002_create_packages::Migration),
      Box::new(m20260301_000003_create_upi_routes::Migration),
      Box::new(m20260301_000004_create_tokens::Migration),
      Box::new(m20260301_000005_create_keys::Migration),
      Box::new(m20260301_000006_create_pending_reviews::Migration),
      Box::new(m20260301_000007_create_admins::Migration),
      Box::new(m20260301_000008_create_bot_settings::Migration),
    ]
  }
}
