use sea_orm_migration::prelude::*;

use super::{
  m20260301_000002_create_packages::Packages,
  m20260301_000004_create_tokens::Tokens,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Keys::Table)
          .if_not_exists()
          .col(ColumnDef::new(Keys::Key).string().not_null().primary_key())
          .col(ColumnDef::new(Keys::OwnerId).big_integer().not_null())
          .col(ColumnDef::new(Keys::PackageId).integer().not_null())
          .col(ColumnDef::new(Keys::TokenId).string().not_null().unique_key())
          .col(ColumnDef::new(Keys::ValidityDays).integer().not_null())
          .col(
            ColumnDef::new(Keys::Status)
              .string()
              .not_null()
              .default("active"),
          )
          .col(ColumnDef::new(Keys::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_keys_token")
              .from(Keys::Table, Keys::TokenId)
              .to(Tokens::Table, Tokens::TokenId)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_keys_package")
              .from(Keys::Table, Keys::PackageId)
              .to(Packages::Table, Packages::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_keys_owner")
          .table(Keys::Table)
          .col(Keys::OwnerId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Keys::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Keys {
  Table,
  Key,
  OwnerId,
  PackageId,
  TokenId,
  ValidityDays,
  Status,
  CreatedAt,
}
