use sea_orm::sea_query::Expr;

use crate::{entity::upi, prelude::*};

pub struct Upi<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Upi<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Stores a new route and makes it the only active one
  pub async fn add(&self, upi_id: String, name: String) -> Result<upi::Model> {
    let txn = self.db.begin().await?;

    upi::Entity::update_many()
      .col_expr(upi::Column::IsActive, Expr::value(false))
      .exec(&txn)
      .await?;

    let route = upi::ActiveModel {
      id: NotSet,
      upi_id: Set(upi_id),
      name: Set(name),
      is_active: Set(true),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!("UPI route #{} `{}` added and activated", route.id, route.upi_id);
    Ok(route)
  }

  /// Switches payments to an existing route, deactivating every other one
  pub async fn activate(&self, id: i32) -> Result<upi::Model> {
    let txn = self.db.begin().await?;

    let route = upi::Entity::find_by_id(id)
      .one(&txn)
      .await?
      .ok_or(Error::UpiNotFound)?;

    upi::Entity::update_many()
      .col_expr(upi::Column::IsActive, Expr::value(false))
      .filter(upi::Column::Id.ne(id))
      .exec(&txn)
      .await?;

    let route = upi::ActiveModel { is_active: Set(true), ..route.into() }
      .update(&txn)
      .await?;

    txn.commit().await?;

    info!("UPI route #{id} activated");
    Ok(route)
  }

  pub async fn active(&self) -> Result<Option<upi::Model>> {
    let route = upi::Entity::find()
      .filter(upi::Column::IsActive.eq(true))
      .order_by_desc(upi::Column::Id)
      .one(self.db)
      .await?;
    Ok(route)
  }

  pub async fn all(&self) -> Result<Vec<upi::Model>> {
    let routes =
      upi::Entity::find().order_by_asc(upi::Column::Id).all(self.db).await?;
    Ok(routes)
  }
}
