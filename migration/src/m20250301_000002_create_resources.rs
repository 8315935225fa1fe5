use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create resources table
        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resources::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Resources::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Resources::Url).string().not_null())
                    .col(
                        ColumnDef::new(Resources::Depth)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Resources::ContentType).string())
                    .col(ColumnDef::new(Resources::Parent).uuid())
                    .col(ColumnDef::new(Resources::Data).binary())
                    .col(ColumnDef::new(Resources::Content).json())
                    .col(ColumnDef::new(Resources::Status).small_integer())
                    .col(
                        ColumnDef::new(Resources::ScrapeInProgress)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Resources::ScrapedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Resources::Actions).json())
                    .col(
                        ColumnDef::new(Resources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 资源选取按 (project_id, scraped_at, scrape_in_progress) 过滤
        manager
            .create_index(
                Index::create()
                    .name("idx_resources_selection")
                    .table(Resources::Table)
                    .col(Resources::ProjectId)
                    .col(Resources::ScrapedAt)
                    .col(Resources::ScrapeInProgress)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_resources_project_url")
                    .table(Resources::Table)
                    .col(Resources::ProjectId)
                    .col(Resources::Url)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Resources {
    Table,
    Id,
    ProjectId,
    Url,
    Depth,
    ContentType,
    Parent,
    Data,
    Content,
    Status,
    ScrapeInProgress,
    ScrapedAt,
    Actions,
    CreatedAt,
}
