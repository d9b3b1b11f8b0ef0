use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum KeyStatus {
  #[sea_orm(string_value = "active")]
  #[default]
  Active,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "keys")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub key: String,
  pub owner_id: i64,
  pub package_id: i32,
  pub token_id: String,
  /// Copied from the package when the token was redeemed
  pub validity_days: i32,
  pub status: KeyStatus,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::token::Entity",
    from = "Column::TokenId",
    to = "super::token::Column::TokenId"
  )]
  Token,
}

impl Related<super::token::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Token.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
