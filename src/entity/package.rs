use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "packages")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub plan_name: String,
  pub description: String,
  /// Price in rupees
  pub amount: f64,
  pub validity_days: i32,
  pub is_active: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::token::Entity")]
  Tokens,
}

impl Related<super::token::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Tokens.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
