use sea_orm::sea_query::Expr;

use crate::{
  entity::{ReviewStatus, TokenSource, package, review},
  prelude::*,
  sv::ledger::{Ledger, Redemption},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Approve,
  Reject,
}

impl Decision {
  fn status(self) -> ReviewStatus {
    match self {
      Decision::Approve => ReviewStatus::Approved,
      Decision::Reject => ReviewStatus::Rejected,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
  Approved { review: review::Model, key: crate::entity::key::Model },
  Rejected(review::Model),
  /// Someone else got there first; carries the row as it is now
  AlreadyResolved(review::Model),
  NotFound,
}

/// Payment reference recorded for keys minted from an approved screenshot
pub fn payment_ref(review_id: i32) -> String {
  format!("SS_{review_id}")
}

pub struct Review<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Review<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn submit(
    &self,
    user_id: i64,
    username: Option<String>,
    package_id: i32,
    screenshot: String,
  ) -> Result<review::Model> {
    let review = review::ActiveModel {
      id: NotSet,
      user_id: Set(user_id),
      username: Set(username),
      package_id: Set(package_id),
      screenshot: Set(screenshot),
      status: Set(ReviewStatus::Pending),
      created_at: Set(Utc::now().naive_utc()),
      reviewed_by: Set(None),
      reviewed_at: Set(None),
    }
    .insert(self.db)
    .await?;

    info!("Review #{} queued for user {user_id}", review.id);
    Ok(review)
  }

  /// Moves a pending review to its terminal state exactly once. Approval
  /// mints the buyer's key in the same transaction.
  pub async fn resolve(
    &self,
    id: i32,
    reviewer: i64,
    decision: Decision,
  ) -> Result<Resolved> {
    let txn = self.db.begin().await?;

    let updated = review::Entity::update_many()
      .col_expr(review::Column::Status, Expr::value(decision.status()))
      .col_expr(review::Column::ReviewedBy, Expr::value(reviewer))
      .col_expr(
        review::Column::ReviewedAt,
        Expr::value(Utc::now().naive_utc()),
      )
      .filter(review::Column::Id.eq(id))
      .filter(review::Column::Status.eq(ReviewStatus::Pending))
      .exec(&txn)
      .await?;

    let Some(review) = review::Entity::find_by_id(id).one(&txn).await? else {
      return Ok(Resolved::NotFound);
    };

    if updated.rows_affected != 1 {
      debug!("Review #{id} already {:?}", review.status);
      return Ok(Resolved::AlreadyResolved(review));
    }

    let resolved = match decision {
      Decision::Reject => Resolved::Rejected(review),
      Decision::Approve => {
        let package = package::Entity::find_by_id(review.package_id)
          .one(&txn)
          .await?
          .ok_or(Error::PackageNotFound)?;

        let redemption = Ledger::new(&txn)
          .issue_and_redeem(
            review.user_id,
            review.username.clone(),
            &package,
            &payment_ref(id),
            TokenSource::Screenshot,
          )
          .await?;

        match redemption {
          Redemption::Redeemed(key) => Resolved::Approved { review, key },
          Redemption::Rejected(reason) => {
            return Err(Error::Internal(format!(
              "fresh token for review #{id} rejected: {reason:?}"
            )));
          }
        }
      }
    };

    txn.commit().await?;

    info!("Review #{id} {:?} by {reviewer}", decision);
    Ok(resolved)
  }

  /// Unresolved reviews, oldest first
  pub async fn pending(&self) -> Result<Vec<review::Model>> {
    let reviews = review::Entity::find()
      .filter(review::Column::Status.eq(ReviewStatus::Pending))
      .order_by_asc(review::Column::Id)
      .all(self.db)
      .await?;
    Ok(reviews)
  }

  pub async fn count_pending(&self) -> Result<u64> {
    let count = review::Entity::find()
      .filter(review::Column::Status.eq(ReviewStatus::Pending))
      .count(self.db)
      .await?;
    Ok(count)
  }
}
