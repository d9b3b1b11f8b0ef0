use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(BotSettings::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(BotSettings::Id)
              .integer()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(BotSettings::ForceChannel).string().null())
          .col(ColumnDef::new(BotSettings::ApiToken).string().null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(BotSettings::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum BotSettings {
  Table,
  Id,
  ForceChannel,
  ApiToken,
}
