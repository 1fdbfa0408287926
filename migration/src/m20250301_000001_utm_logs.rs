//! utm_logs 表迁移
//!
//! 每条 UTM 访问记录对应一行：
//! - 五个可空的 UTM 字段
//! - 落地页 URL 与 User-Agent
//! - 服务端写入时间 (created_at)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UtmLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UtmLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UtmLogs::UtmSource).string_len(255).null())
                    .col(ColumnDef::new(UtmLogs::UtmMedium).string_len(255).null())
                    .col(ColumnDef::new(UtmLogs::UtmCampaign).string_len(255).null())
                    .col(ColumnDef::new(UtmLogs::UtmContent).string_len(255).null())
                    .col(ColumnDef::new(UtmLogs::UtmTerm).string_len(255).null())
                    .col(ColumnDef::new(UtmLogs::Url).text().not_null())
                    .col(ColumnDef::new(UtmLogs::UserAgent).text().null())
                    .col(
                        ColumnDef::new(UtmLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 列表查询按 created_at 倒序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_utm_logs_created_at")
                    .table(UtmLogs::Table)
                    .col(UtmLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_utm_logs_created_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UtmLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UtmLogs {
    #[sea_orm(iden = "utm_logs")]
    Table,
    Id,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    UtmContent,
    UtmTerm,
    Url,
    UserAgent,
    CreatedAt,
}
