use crate::{entity::package, prelude::*};

pub struct Package<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Package<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(
    &self,
    plan_name: String,
    description: String,
    amount: f64,
    validity_days: i32,
  ) -> Result<package::Model> {
    let package = package::ActiveModel {
      id: NotSet,
      plan_name: Set(plan_name),
      description: Set(description),
      amount: Set(amount),
      validity_days: Set(validity_days),
      is_active: Set(true),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    info!("Package #{} `{}` created", package.id, package.plan_name);
    Ok(package)
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<package::Model>> {
    Ok(package::Entity::find_by_id(id).one(self.db).await?)
  }

  /// Package a buyer may purchase right now
  pub async fn purchasable(&self, id: i32) -> Result<package::Model> {
    self
      .by_id(id)
      .await?
      .filter(|package| package.is_active)
      .ok_or(Error::PackageNotFound)
  }

  /// Active packages, cheapest first
  pub async fn active(&self) -> Result<Vec<package::Model>> {
    let packages = package::Entity::find()
      .filter(package::Column::IsActive.eq(true))
      .order_by_asc(package::Column::Amount)
      .all(self.db)
      .await?;
    Ok(packages)
  }

  pub async fn all(&self) -> Result<Vec<package::Model>> {
    let packages = package::Entity::find()
      .order_by_asc(package::Column::Id)
      .all(self.db)
      .await?;
    Ok(packages)
  }

  pub async fn set_active(
    &self,
    id: i32,
    active: bool,
  ) -> Result<package::Model> {
    let package = self.by_id(id).await?.ok_or(Error::PackageNotFound)?;

    let package = package::ActiveModel { is_active: Set(active), ..package.into() }
      .update(self.db)
      .await?;

    info!("Package #{id} active={active}");
    Ok(package)
  }
}
