use crate::{entity::user, prelude::*};

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Records an interaction. Returns the stored user and whether it is new.
  pub async fn touch(
    &self,
    tg_user_id: i64,
    username: Option<String>,
    first_name: String,
    last_name: Option<String>,
  ) -> Result<(user::Model, bool)> {
    let now = Utc::now().naive_utc();

    if let Some(user) =
      user::Entity::find_by_id(tg_user_id).one(self.db).await?
    {
      let user = user::ActiveModel {
        username: Set(username),
        first_name: Set(first_name),
        last_name: Set(last_name),
        last_interaction: Set(now),
        ..user.into()
      }
      .update(self.db)
      .await?;
      return Ok((user, false));
    }

    let user = user::ActiveModel {
      tg_user_id: Set(tg_user_id),
      username: Set(username),
      first_name: Set(first_name),
      last_name: Set(last_name),
      reg_date: Set(now),
      last_interaction: Set(now),
    }
    .insert(self.db)
    .await?;

    info!("New user registered: {tg_user_id}");
    Ok((user, true))
  }

  pub async fn count(&self) -> Result<u64> {
    Ok(user::Entity::find().count(self.db).await?)
  }
}
