use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trips::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Trips::Name).string().not_null())
                    .col(ColumnDef::new(Trips::Description).text().not_null())
                    .col(ColumnDef::new(Trips::BannerType).string().not_null())
                    .col(ColumnDef::new(Trips::BannerValue).text().not_null())
                    .col(ColumnDef::new(Trips::BannerPosition).small_integer().null())
                    .col(ColumnDef::new(Trips::CaptainUserId).string().not_null())
                    .col(
                        ColumnDef::new(Trips::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Trips::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CrewMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CrewMembers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CrewMembers::BoatId).uuid().not_null())
                    .col(ColumnDef::new(CrewMembers::UserId).string().null())
                    .col(ColumnDef::new(CrewMembers::Email).string().not_null())
                    .col(ColumnDef::new(CrewMembers::Role).string().not_null())
                    .col(
                        ColumnDef::new(CrewMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_crew_members_boat_id")
                            .from(CrewMembers::Table, CrewMembers::BoatId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_crew_members_boat_email")
                    .table(CrewMembers::Table)
                    .col(CrewMembers::BoatId)
                    .col(CrewMembers::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_crew_members_user_id")
                    .table(CrewMembers::Table)
                    .col(CrewMembers::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Modules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Modules::BoatId).uuid().not_null())
                    .col(ColumnDef::new(Modules::Kind).string().not_null())
                    .col(ColumnDef::new(Modules::Name).string().not_null())
                    .col(ColumnDef::new(Modules::Description).text().not_null())
                    .col(ColumnDef::new(Modules::SortOrder).integer().not_null())
                    .col(ColumnDef::new(Modules::Settings).text().not_null())
                    .col(ColumnDef::new(Modules::Data).text().not_null())
                    .col(ColumnDef::new(Modules::Mode).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_modules_boat_id")
                            .from(Modules::Table, Modules::BoatId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_modules_boat_sort_order")
                    .table(Modules::Table)
                    .col(Modules::BoatId)
                    .col(Modules::SortOrder)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Modules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CrewMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trips::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Trips {
    Table,
    Id,
    Name,
    Description,
    BannerType,
    BannerValue,
    BannerPosition,
    CaptainUserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CrewMembers {
    Table,
    Id,
    BoatId,
    UserId,
    Email,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Modules {
    Table,
    Id,
    BoatId,
    Kind,
    Name,
    Description,
    SortOrder,
    Settings,
    Data,
    Mode,
}
