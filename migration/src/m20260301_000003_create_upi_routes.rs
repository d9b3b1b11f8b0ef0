use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(UpiRoutes::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(UpiRoutes::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(UpiRoutes::UpiId).string().not_null())
          .col(ColumnDef::new(UpiRoutes::Name).string().not_null())
          .col(
            ColumnDef::new(UpiRoutes::IsActive)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(UpiRoutes::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(UpiRoutes::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum UpiRoutes {
  Table,
  Id,
  UpiId,
  Name,
  IsActive,
  CreatedAt,
}
