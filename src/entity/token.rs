//! Single-use proof of purchase. Redeeming a token yields exactly one key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Owner id of a token that is not bound to anyone yet
pub const UNCLAIMED: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TokenStatus {
  #[sea_orm(string_value = "active")]
  Active,
  #[sea_orm(string_value = "used")]
  Used,
}

/// How the payment behind a token was confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TokenSource {
  /// Issued by an admin after verifying a transaction id
  #[sea_orm(string_value = "manual")]
  Manual,
  /// Buyer's transaction id verified through the settlement API
  #[sea_orm(string_value = "auto")]
  Auto,
  /// Admin approved a payment screenshot
  #[sea_orm(string_value = "screenshot")]
  Screenshot,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tokens")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub token_id: String,
  pub owner_id: i64,
  pub username: Option<String>,
  pub package_id: i32,
  pub payment_ref: String,
  pub amount: f64,
  pub status: TokenStatus,
  pub source: TokenSource,
  pub created_at: DateTime,
}

impl Model {
  pub fn is_claimed(&self) -> bool {
    self.owner_id != UNCLAIMED
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::package::Entity",
    from = "Column::PackageId",
    to = "super::package::Column::Id"
  )]
  Package,
  #[sea_orm(has_one = "super::key::Entity")]
  Key,
}

impl Related<super::package::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Package.def()
  }
}

impl Related<super::key::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Key.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
