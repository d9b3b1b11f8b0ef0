pub use std::time::Duration;

pub use anyhow::Context;
pub use async_trait::async_trait;
pub use chrono::{NaiveDateTime as DateTime, TimeDelta, Utc};
pub use dashmap::DashMap;
pub use sea_orm::{
  ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait,
  Database, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
  QueryOrder, Set, TransactionTrait,
};
pub use tracing::{debug, error, info, warn};

pub use crate::error::{Error, Result};
pub(crate) use crate::utils;
