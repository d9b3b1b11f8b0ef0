//! Payment screenshots waiting for an admin decision

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ReviewStatus {
  #[sea_orm(string_value = "pending")]
  Pending,
  #[sea_orm(string_value = "approved")]
  Approved,
  #[sea_orm(string_value = "rejected")]
  Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_reviews")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub user_id: i64,
  pub username: Option<String>,
  pub package_id: i32,
  /// Telegram file id of the uploaded photo
  pub screenshot: String,
  pub status: ReviewStatus,
  pub created_at: DateTime,
  pub reviewed_by: Option<i64>,
  pub reviewed_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::package::Entity",
    from = "Column::PackageId",
    to = "super::package::Column::Id"
  )]
  Package,
}

impl Related<super::package::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Package.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
