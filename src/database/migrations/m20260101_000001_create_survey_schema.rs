use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Surveys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Surveys::Sid)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Surveys::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Surveys::Language).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Surveys::AdditionalLanguages)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Surveys::Active)
                            .string_len(1)
                            .not_null()
                            .default("N"),
                    )
                    .to_owned(),
            )
            .await?;

        // groups: one row per group per language
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Gid).integer().not_null())
                    .col(ColumnDef::new(Groups::Language).string_len(20).not_null())
                    .col(ColumnDef::new(Groups::Sid).integer().not_null())
                    .col(ColumnDef::new(Groups::GroupName).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Groups::GroupOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Groups::Description).text())
                    .col(
                        ColumnDef::new(Groups::RandomizationGroup)
                            .string_len(20)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Groups::Grelevance).text())
                    .primary_key(
                        Index::create()
                            .name("pk_groups")
                            .col(Groups::Gid)
                            .col(Groups::Language),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_groups_sid")
                            .from(Groups::Table, Groups::Sid)
                            .to(Surveys::Table, Surveys::Sid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_groups_sid_language")
                    .table(Groups::Table)
                    .col(Groups::Sid)
                    .col(Groups::Language)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Questions::Qid).integer().not_null())
                    .col(ColumnDef::new(Questions::Language).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Questions::ParentQid)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Questions::Sid).integer().not_null())
                    .col(ColumnDef::new(Questions::Gid).integer().not_null())
                    .col(ColumnDef::new(Questions::Title).string_len(20).not_null())
                    .col(ColumnDef::new(Questions::Question).text().not_null())
                    .col(
                        ColumnDef::new(Questions::QuestionOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_questions")
                            .col(Questions::Qid)
                            .col(Questions::Language),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_questions_gid")
                    .table(Questions::Table)
                    .col(Questions::Gid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assessments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assessments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assessments::Sid).integer().not_null())
                    .col(
                        ColumnDef::new(Assessments::Scope)
                            .string_len(5)
                            .not_null()
                            .default("T"),
                    )
                    .col(
                        ColumnDef::new(Assessments::Gid)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Assessments::Language).string_len(20).not_null())
                    .col(ColumnDef::new(Assessments::Name).text().not_null())
                    .col(ColumnDef::new(Assessments::Minimum).string_len(50).not_null())
                    .col(ColumnDef::new(Assessments::Maximum).string_len(50).not_null())
                    .col(ColumnDef::new(Assessments::Message).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Conditions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conditions::Cid)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Conditions::Qid).integer().not_null())
                    .col(ColumnDef::new(Conditions::Cqid).integer().not_null())
                    .col(ColumnDef::new(Conditions::Cfieldname).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Conditions::Method)
                            .string_len(5)
                            .not_null()
                            .default("=="),
                    )
                    .col(ColumnDef::new(Conditions::Value).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Conditions::Scenario)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Permissions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Permissions::Entity).string_len(50).not_null())
                    .col(ColumnDef::new(Permissions::EntityId).integer().not_null())
                    .col(ColumnDef::new(Permissions::Uid).integer().not_null())
                    .col(ColumnDef::new(Permissions::Permission).string_len(100).not_null())
                    .col(ColumnDef::new(Permissions::CreateP).boolean().not_null().default(false))
                    .col(ColumnDef::new(Permissions::ReadP).boolean().not_null().default(false))
                    .col(ColumnDef::new(Permissions::UpdateP).boolean().not_null().default(false))
                    .col(ColumnDef::new(Permissions::DeleteP).boolean().not_null().default(false))
                    .col(ColumnDef::new(Permissions::ImportP).boolean().not_null().default(false))
                    .col(ColumnDef::new(Permissions::ExportP).boolean().not_null().default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_permissions_lookup")
                    .table(Permissions::Table)
                    .col(Permissions::Entity)
                    .col(Permissions::EntityId)
                    .col(Permissions::Uid)
                    .col(Permissions::Permission)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Conditions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assessments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Questions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Surveys::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Surveys {
    Table,
    Sid,
    OwnerId,
    Language,
    AdditionalLanguages,
    Active,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Gid,
    Language,
    Sid,
    GroupName,
    GroupOrder,
    Description,
    RandomizationGroup,
    Grelevance,
}

#[derive(DeriveIden)]
enum Questions {
    Table,
    Qid,
    Language,
    ParentQid,
    Sid,
    Gid,
    Title,
    Question,
    QuestionOrder,
}

#[derive(DeriveIden)]
enum Assessments {
    Table,
    Id,
    Sid,
    Scope,
    Gid,
    Language,
    Name,
    Minimum,
    Maximum,
    Message,
}

#[derive(DeriveIden)]
enum Conditions {
    Table,
    Cid,
    Qid,
    Cqid,
    Cfieldname,
    Method,
    Value,
    Scenario,
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Id,
    Entity,
    EntityId,
    Uid,
    Permission,
    CreateP,
    ReadP,
    UpdateP,
    DeleteP,
    ImportP,
    ExportP,
}
