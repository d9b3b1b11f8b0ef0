use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Role {
  /// Full access: catalog, payment routing, roster and settings
  #[sea_orm(string_value = "super")]
  Super,
  /// Manual token issuance, reviews and statistics only
  #[sea_orm(string_value = "limited")]
  Limited,
}

impl Role {
  /// Whether this role may perform an action that requires `required`
  pub fn allows(self, required: Role) -> bool {
    match required {
      Role::Limited => true,
      Role::Super => self == Role::Super,
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Role::Super => "Super Admin",
      Role::Limited => "Limited Admin",
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admins")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub tg_user_id: i64,
  pub role: Role,
  pub is_active: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
