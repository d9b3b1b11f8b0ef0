use crate::{
  entity::{settings, settings::SINGLETON_ID},
  prelude::*,
};

pub struct Settings<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Settings<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn get(&self) -> Result<settings::Model> {
    let settings = settings::Entity::find_by_id(SINGLETON_ID)
      .one(self.db)
      .await?
      .unwrap_or(settings::Model { id: SINGLETON_ID, ..Default::default() });
    Ok(settings)
  }

  async fn save(&self, settings: settings::Model) -> Result<settings::Model> {
    let exists =
      settings::Entity::find_by_id(SINGLETON_ID).one(self.db).await?.is_some();

    let model = settings::ActiveModel {
      id: Set(SINGLETON_ID),
      force_channel: Set(settings.force_channel),
      api_token: Set(settings.api_token),
    };

    let settings = if exists {
      model.update(self.db).await?
    } else {
      model.insert(self.db).await?
    };
    Ok(settings)
  }

  /// `None` turns the join requirement off
  pub async fn set_force_channel(
    &self,
    channel: Option<String>,
  ) -> Result<settings::Model> {
    let current = self.get().await?;
    let settings =
      self.save(settings::Model { force_channel: channel, ..current }).await?;

    info!("Force channel set to {:?}", settings.force_channel);
    Ok(settings)
  }

  pub async fn set_api_token(&self, token: String) -> Result<settings::Model> {
    let current = self.get().await?;
    let settings =
      self.save(settings::Model { api_token: Some(token), ..current }).await?;

    info!("Verification API token updated");
    Ok(settings)
  }
}
