use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BedMenus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BedMenus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BedMenus::BedId).integer().not_null())
                    .col(ColumnDef::new(BedMenus::MenuId).integer().not_null())
                    .col(
                        ColumnDef::new(BedMenus::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(BedMenus::AssignedAt).date_time().not_null())
                    .col(
                        ColumnDef::new(BedMenus::Consumed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BedMenus::ConsumedAt).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bed_menus_bed")
                            .from(BedMenus::Table, BedMenus::BedId)
                            .to(Beds::Table, Beds::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bed_menus_menu")
                            .from(BedMenus::Table, BedMenus::MenuId)
                            .to(Menus::Table, Menus::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bed_menus_bed_assigned")
                    .table(BedMenus::Table)
                    .col(BedMenus::BedId)
                    .col(BedMenus::AssignedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockMovements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StockMovements::ProductId).integer().not_null())
                    .col(ColumnDef::new(StockMovements::UserId).integer().not_null())
                    .col(ColumnDef::new(StockMovements::Quantity).double().not_null())
                    .col(ColumnDef::new(StockMovements::Kind).string().not_null())
                    .col(ColumnDef::new(StockMovements::BedMenuId).integer())
                    .col(
                        ColumnDef::new(StockMovements::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movements_product")
                            .from(StockMovements::Table, StockMovements::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movements_user")
                            .from(StockMovements::Table, StockMovements::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movements_bed_menu")
                            .from(StockMovements::Table, StockMovements::BedMenuId)
                            .to(BedMenus::Table, BedMenus::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StockMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BedMenus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BedMenus {
    Table,
    Id,
    BedId,
    MenuId,
    Quantity,
    AssignedAt,
    Consumed,
    ConsumedAt,
}

#[derive(DeriveIden)]
enum StockMovements {
    Table,
    Id,
    ProductId,
    UserId,
    Quantity,
    Kind,
    BedMenuId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Beds {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Menus {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
