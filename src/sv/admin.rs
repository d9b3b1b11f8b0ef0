use crate::{
  entity::{Role, admin},
  prelude::*,
};

pub struct Admin<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Admin<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Role of an active admin, `None` for everyone else
  pub async fn role_of(&self, tg_user_id: i64) -> Result<Option<Role>> {
    let admin = admin::Entity::find_by_id(tg_user_id)
      .filter(admin::Column::IsActive.eq(true))
      .one(self.db)
      .await?;
    Ok(admin.map(|admin| admin.role))
  }

  /// Fresh role lookup guarding every privileged action
  pub async fn require(&self, tg_user_id: i64, required: Role) -> Result<Role> {
    match self.role_of(tg_user_id).await? {
      Some(role) if role.allows(required) => Ok(role),
      _ => {
        warn!("User {tg_user_id} denied {required:?} action");
        Err(Error::Unauthorized)
      }
    }
  }

  pub async fn active_ids(&self) -> Result<Vec<i64>> {
    let ids = admin::Entity::find()
      .filter(admin::Column::IsActive.eq(true))
      .order_by_asc(admin::Column::TgUserId)
      .all(self.db)
      .await?
      .into_iter()
      .map(|admin| admin.tg_user_id)
      .collect();
    Ok(ids)
  }

  /// Adds an admin or re-activates an existing one with a new role
  pub async fn upsert(&self, tg_user_id: i64, role: Role) -> Result<admin::Model> {
    let admin = match admin::Entity::find_by_id(tg_user_id).one(self.db).await? {
      Some(admin) => {
        admin::ActiveModel {
          role: Set(role),
          is_active: Set(true),
          ..admin.into()
        }
        .update(self.db)
        .await?
      }
      None => {
        admin::ActiveModel {
          tg_user_id: Set(tg_user_id),
          role: Set(role),
          is_active: Set(true),
          created_at: Set(Utc::now().naive_utc()),
        }
        .insert(self.db)
        .await?
      }
    };

    info!("Admin {tg_user_id} set to {role:?}");
    Ok(admin)
  }

  pub async fn deactivate(&self, tg_user_id: i64) -> Result<admin::Model> {
    let admin = admin::Entity::find_by_id(tg_user_id)
      .one(self.db)
      .await?
      .ok_or(Error::AdminNotFound)?;

    let admin = admin::ActiveModel { is_active: Set(false), ..admin.into() }
      .update(self.db)
      .await?;

    info!("Admin {tg_user_id} deactivated");
    Ok(admin)
  }

  pub async fn all(&self) -> Result<Vec<admin::Model>> {
    let admins = admin::Entity::find()
      .order_by_asc(admin::Column::CreatedAt)
      .all(self.db)
      .await?;
    Ok(admins)
  }

  /// Makes sure the configured owners can always reach the panel
  pub async fn bootstrap(&self, supers: &[i64]) -> Result<()> {
    for &id in supers {
      self.upsert(id, Role::Super).await?;
    }
    Ok(())
  }
}
