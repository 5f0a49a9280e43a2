use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `orders` table and its columns.
#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    ServiceId,
    CartId,
    TaskId,
    OfferId,
    LineItems,
    PaymentMethodId,
    CheckoutType,
    CheckoutInfo,
    DriverInstruction,
    Location,
    Subtotal,
    DiscountAmount,
    TotalPrice,
    VoucherCode,
    PromoCode,
    Allergies,
    Status,
    ScheduleDate,
    ScheduleTimeSlot,
    Confirmation,
    QrData,
    Rating,
    Feedback,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Service, cart, task and offer references are kept as plain ids:
        // an order is a snapshot and must outlive what it was built from.
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Orders::UserId).uuid().not_null())
                    .col(ColumnDef::new(Orders::ServiceId).uuid().null())
                    .col(ColumnDef::new(Orders::CartId).uuid().null())
                    .col(ColumnDef::new(Orders::TaskId).uuid().null())
                    .col(ColumnDef::new(Orders::OfferId).uuid().null())
                    .col(ColumnDef::new(Orders::LineItems).json_binary().not_null())
                    .col(ColumnDef::new(Orders::PaymentMethodId).uuid().not_null())
                    .col(ColumnDef::new(Orders::CheckoutType).string().not_null())
                    .col(ColumnDef::new(Orders::CheckoutInfo).json_binary().not_null())
                    .col(ColumnDef::new(Orders::DriverInstruction).json_binary().null())
                    .col(ColumnDef::new(Orders::Location).string().null())
                    .col(ColumnDef::new(Orders::Subtotal).double().not_null())
                    .col(
                        ColumnDef::new(Orders::DiscountAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Orders::TotalPrice).double().not_null())
                    .col(ColumnDef::new(Orders::VoucherCode).string().null())
                    .col(ColumnDef::new(Orders::PromoCode).string().null())
                    .col(ColumnDef::new(Orders::Allergies).string().null())
                    .col(ColumnDef::new(Orders::Status).string().not_null())
                    .col(
                        ColumnDef::new(Orders::ScheduleDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Orders::ScheduleTimeSlot).string().null())
                    .col(
                        ColumnDef::new(Orders::Confirmation)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Orders::QrData).string().null())
                    .col(ColumnDef::new(Orders::Rating).integer().null())
                    .col(ColumnDef::new(Orders::Feedback).text().null())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user_id")
                            .from(Orders::Table, Orders::UserId)
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
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}
