//! Tokens and the keys they are exchanged for.
//!
//! A token is redeemed at most once. The flip from `active` to `used` is a
//! conditional update and only the caller that sees exactly one affected row
//! mints the key, inside the same transaction as the flip.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sea_orm::{Condition, DbErr, SqlErr, sea_query::Expr};
use uuid::Uuid;

use crate::{
  entity::{
    TokenSource, TokenStatus, key, key::KeyStatus, package, token,
    token::UNCLAIMED,
  },
  prelude::*,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
  NotFound,
  AlreadyUsed,
  OwnerMismatch,
  PackageMissing,
}

impl Rejected {
  pub fn message(self) -> &'static str {
    match self {
      Rejected::NotFound => "❌ Invalid token!",
      Rejected::AlreadyUsed => "❌ This token has already been used!",
      Rejected::OwnerMismatch => "❌ This token does not belong to you!",
      Rejected::PackageMissing => "❌ Package not found!",
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Redemption {
  Redeemed(key::Model),
  Rejected(Rejected),
}

/// 32 random bytes, URL-safe base64 without padding
fn generate_key() -> String {
  let mut bytes = [0u8; 32];
  bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
  bytes[16..].copy_from_slice(Uuid::new_v4().as_bytes());
  URL_SAFE_NO_PAD.encode(bytes)
}

fn generate_token_id() -> String {
  Uuid::new_v4().simple().to_string()
}

fn duplicate_payment(err: DbErr) -> Error {
  match err.sql_err() {
    Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicatePayment,
    _ => err.into(),
  }
}

/// Works on a plain connection or inside a caller's transaction.
pub struct Ledger<'a, C = DatabaseConnection> {
  db: &'a C,
}

impl<'a, C> Ledger<'a, C>
where
  C: ConnectionTrait + TransactionTrait,
{
  pub fn new(db: &'a C) -> Self {
    Self { db }
  }

  /// `owner` may be [`UNCLAIMED`], then whoever presents the id gets the key.
  pub async fn issue(
    &self,
    owner: i64,
    username: Option<String>,
    package: &package::Model,
    payment_ref: &str,
    source: TokenSource,
  ) -> Result<token::Model> {
    let token = token::ActiveModel {
      token_id: Set(generate_token_id()),
      owner_id: Set(owner),
      username: Set(username),
      package_id: Set(package.id),
      payment_ref: Set(payment_ref.to_string()),
      amount: Set(package.amount),
      status: Set(TokenStatus::Active),
      source: Set(source),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await
    .map_err(duplicate_payment)?;

    info!(
      "Token {} issued for package #{} (owner {owner}, ref `{payment_ref}`, {:?})",
      token.token_id, package.id, source
    );
    Ok(token)
  }

  pub async fn redeem(
    &self,
    token_id: &str,
    claimant: i64,
  ) -> Result<Redemption> {
    let token_id = token_id.trim();
    let txn = self.db.begin().await?;

    let Some(token) = token::Entity::find_by_id(token_id).one(&txn).await?
    else {
      return Ok(Redemption::Rejected(Rejected::NotFound));
    };

    if token.status == TokenStatus::Used {
      return Ok(Redemption::Rejected(Rejected::AlreadyUsed));
    }
    if token.is_claimed() && token.owner_id != claimant {
      warn!("User {claimant} tried to redeem token {token_id} of another user");
      return Ok(Redemption::Rejected(Rejected::OwnerMismatch));
    }

    let Some(package) =
      package::Entity::find_by_id(token.package_id).one(&txn).await?
    else {
      return Ok(Redemption::Rejected(Rejected::PackageMissing));
    };

    let flipped = token::Entity::update_many()
      .col_expr(token::Column::Status, Expr::value(TokenStatus::Used))
      .col_expr(token::Column::OwnerId, Expr::value(claimant))
      .filter(token::Column::TokenId.eq(token_id))
      .filter(token::Column::Status.eq(TokenStatus::Active))
      .filter(
        Condition::any()
          .add(token::Column::OwnerId.eq(UNCLAIMED))
          .add(token::Column::OwnerId.eq(claimant)),
      )
      .exec(&txn)
      .await?;

    if flipped.rows_affected != 1 {
      debug!("Lost redeem race for token {token_id}");
      return Ok(Redemption::Rejected(Rejected::AlreadyUsed));
    }

    let key = key::ActiveModel {
      key: Set(generate_key()),
      owner_id: Set(claimant),
      package_id: Set(package.id),
      token_id: Set(token.token_id),
      validity_days: Set(package.validity_days),
      status: Set(KeyStatus::Active),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!("Token {token_id} redeemed by {claimant}");
    Ok(Redemption::Redeemed(key))
  }

  /// Issues a token bound to `owner` and redeems it right away.
  pub async fn issue_and_redeem(
    &self,
    owner: i64,
    username: Option<String>,
    package: &package::Model,
    payment_ref: &str,
    source: TokenSource,
  ) -> Result<Redemption> {
    let txn = self.db.begin().await?;
    let ledger = Ledger::new(&txn);

    let token =
      ledger.issue(owner, username, package, payment_ref, source).await?;
    let redemption = ledger.redeem(&token.token_id, owner).await?;

    if let Redemption::Redeemed(_) = redemption {
      txn.commit().await?;
    }
    Ok(redemption)
  }

  pub async fn payment_ref_taken(&self, payment_ref: &str) -> Result<bool> {
    let count = token::Entity::find()
      .filter(token::Column::PaymentRef.eq(payment_ref))
      .count(self.db)
      .await?;
    Ok(count > 0)
  }

  pub async fn count_tokens(&self) -> Result<u64> {
    Ok(token::Entity::find().count(self.db).await?)
  }

  pub async fn count_active_tokens(&self) -> Result<u64> {
    let count = token::Entity::find()
      .filter(token::Column::Status.eq(TokenStatus::Active))
      .count(self.db)
      .await?;
    Ok(count)
  }

  pub async fn count_keys(&self) -> Result<u64> {
    Ok(key::Entity::find().count(self.db).await?)
  }
}
