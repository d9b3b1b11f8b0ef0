use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Admins::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Admins::TgUserId)
              .big_integer()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Admins::Role)
              .string()
              .not_null()
              .default("limited"),
          )
          .col(ColumnDef::new(Admins::IsActive).boolean().not_null().default(true))
          .col(ColumnDef::new(Admins::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Admins::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Admins {
  Table,
  TgUserId,
  Role,
  IsActive,
  CreatedAt,
}
