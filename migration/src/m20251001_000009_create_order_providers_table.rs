use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `order_providers` join table.
#[derive(DeriveIden)]
enum OrderProviders {
    Table,
    OrderId,
    ProviderId,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderProviders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrderProviders::OrderId).uuid().not_null())
                    .col(ColumnDef::new(OrderProviders::ProviderId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(OrderProviders::OrderId)
                            .col(OrderProviders::ProviderId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_providers_order_id")
                            .from(OrderProviders::Table, OrderProviders::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_providers_provider_id")
                            .from(OrderProviders::Table, OrderProviders::ProviderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderProviders::Table).to_owned())
            .await
    }
}
