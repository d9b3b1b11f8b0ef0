use sea_orm_migration::prelude::*;

use super::m20260301_000002_create_packages::Packages;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Tokens::Table)
          .if_not_exists()
          .col(ColumnDef::new(Tokens::TokenId).string().not_null().primary_key())
          .col(
            ColumnDef::new(Tokens::OwnerId).big_integer().not_null().default(0),
          )
          .col(ColumnDef::new(Tokens::Username).string().null())
          .col(ColumnDef::new(Tokens::PackageId).integer().not_null())
          .col(ColumnDef::new(Tokens::PaymentRef).string().not_null())
          .col(ColumnDef::new(Tokens::Amount).double().not_null())
          .col(
            ColumnDef::new(Tokens::Status)
              .string()
              .not_null()
              .default("active"),
          )
          .col(ColumnDef::new(Tokens::Source).string().not_null())
          .col(ColumnDef::new(Tokens::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_tokens_package")
              .from(Tokens::Table, Tokens::PackageId)
              .to(Packages::Table, Packages::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_tokens_payment_ref")
          .table(Tokens::Table)
          .col(Tokens::PaymentRef)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_tokens_owner")
          .table(Tokens::Table)
          .col(Tokens::OwnerId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Tokens::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Tokens {
  Table,
  TokenId,
  OwnerId,
  Username,
  PackageId,
  PaymentRef,
  Amount,
  Status,
  Source,
  CreatedAt,
}
