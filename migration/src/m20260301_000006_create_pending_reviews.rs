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
          .table(PendingReviews::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PendingReviews::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(PendingReviews::UserId).big_integer().not_null())
          .col(ColumnDef::new(PendingReviews::Username).string().null())
          .col(ColumnDef::new(PendingReviews::PackageId).integer().not_null())
          .col(ColumnDef::new(PendingReviews::Screenshot).string().not_null())
          .col(
            ColumnDef::new(PendingReviews::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(PendingReviews::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(PendingReviews::ReviewedBy).big_integer().null())
          .col(ColumnDef::new(PendingReviews::ReviewedAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_pending_reviews_package")
              .from(PendingReviews::Table, PendingReviews::PackageId)
              .to(Packages::Table, Packages::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_pending_reviews_status")
          .table(PendingReviews::Table)
          .col(PendingReviews::Status)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PendingReviews::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PendingReviews {
  Table,
  Id,
  UserId,
  Username,
  PackageId,
  Screenshot,
  Status,
  CreatedAt,
  ReviewedBy,
  ReviewedAt,
}
