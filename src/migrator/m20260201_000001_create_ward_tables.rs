use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Staff users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Rooms::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Rooms::Floor).integer())
                    .col(
                        ColumnDef::new(Rooms::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Beds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Beds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Beds::Name).string().not_null())
                    .col(
                        ColumnDef::new(Beds::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(Beds::RoomId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_beds_room")
                            .from(Beds::Table, Beds::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A bed name only has to be unique inside its own room
        manager
            .create_index(
                Index::create()
                    .name("idx_beds_room_id_name")
                    .table(Beds::Table)
                    .col(Beds::RoomId)
                    .col(Beds::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Patients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Patients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Patients::Name).string().not_null())
                    .col(ColumnDef::new(Patients::DocumentNumber).string())
                    .col(ColumnDef::new(Patients::Age).integer())
                    .col(ColumnDef::new(Patients::Diagnosis).text())
                    .col(
                        ColumnDef::new(Patients::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Patients::NeedsReview)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Patients::BedId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_patients_bed")
                            .from(Patients::Table, Patients::BedId)
                            .to(Beds::Table, Beds::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PatientStatuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PatientStatuses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PatientStatuses::PatientId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PatientStatuses::StatusType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PatientStatuses::DietType).string())
                    .col(ColumnDef::new(PatientStatuses::Notes).text())
                    .col(
                        ColumnDef::new(PatientStatuses::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PatientStatuses::UpdatedBy).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_patient_statuses_patient")
                            .from(PatientStatuses::Table, PatientStatuses::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_patient_statuses_updated_by")
                            .from(PatientStatuses::Table, PatientStatuses::UpdatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_patient_statuses_patient_created")
                    .table(PatientStatuses::Table)
                    .col(PatientStatuses::PatientId)
                    .col(PatientStatuses::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PatientStatuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Patients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Beds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    Name,
    Floor,
    Status,
}

#[derive(DeriveIden)]
enum Beds {
    Table,
    Id,
    Name,
    Status,
    RoomId,
}

#[derive(DeriveIden)]
enum Patients {
    Table,
    Id,
    Name,
    DocumentNumber,
    Age,
    Diagnosis,
    Active,
    NeedsReview,
    BedId,
}

#[derive(DeriveIden)]
enum PatientStatuses {
    Table,
    Id,
    PatientId,
    StatusType,
    DietType,
    Notes,
    CreatedAt,
    UpdatedBy,
}
