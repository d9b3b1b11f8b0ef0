//! Singleton row with runtime settings editable from the admin panel

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, Default, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bot_settings")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: i32,
  pub force_channel: Option<String>,
  pub api_token: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
