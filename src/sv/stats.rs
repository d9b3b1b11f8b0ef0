use crate::{prelude::*, sv};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overview {
  pub users: u64,
  pub tokens: u64,
  pub active_tokens: u64,
  pub keys: u64,
  pub pending_reviews: u64,
}

pub struct Stats<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Stats<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn overview(&self) -> Result<Overview> {
    let ledger = sv::Ledger::new(self.db);

    Ok(Overview {
      users: sv::User::new(self.db).count().await?,
      tokens: ledger.count_tokens().await?,
      active_tokens: ledger.count_active_tokens().await?,
      keys: ledger.count_keys().await?,
      pending_reviews: sv::Review::new(self.db).count_pending().await?,
    })
  }
}
