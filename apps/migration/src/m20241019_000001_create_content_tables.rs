use sea_orm_migration::prelude::*;

/// Creates `users`, `locations`, `categories` and `posts`.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(users_table()).await?;
        manager.create_table(locations_table()).await?;
        manager.create_table(categories_table()).await?;
        manager.create_table(posts_table()).await?;

        for index in posts_indexes() {
            manager.create_index(index).await?;
        }

        tracing::info!("Content tables created");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

fn id_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name).uuid().not_null().primary_key().to_owned()
}

fn created_at_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn is_published_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .boolean()
        .not_null()
        .default(true)
        .to_owned()
}

fn users_table() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(id_column(Users::Id))
        .col(
            ColumnDef::new(Users::Username)
                .string_len(150)
                .not_null()
                .unique_key(),
        )
        .col(created_at_column(Users::CreatedAt))
        .to_owned()
}

fn locations_table() -> TableCreateStatement {
    Table::create()
        .table(Locations::Table)
        .if_not_exists()
        .col(id_column(Locations::Id))
        .col(ColumnDef::new(Locations::Name).string_len(256).not_null())
        .col(is_published_column(Locations::IsPublished))
        .col(created_at_column(Locations::CreatedAt))
        .to_owned()
}

fn categories_table() -> TableCreateStatement {
    Table::create()
        .table(Categories::Table)
        .if_not_exists()
        .col(id_column(Categories::Id))
        .col(ColumnDef::new(Categories::Title).string_len(256).not_null())
        .col(ColumnDef::new(Categories::Description).text().not_null())
        .col(
            ColumnDef::new(Categories::Slug)
                .string_len(50)
                .not_null()
                .unique_key(),
        )
        .col(is_published_column(Categories::IsPublished))
        .col(created_at_column(Categories::CreatedAt))
        .to_owned()
}

fn posts_table() -> TableCreateStatement {
    Table::create()
        .table(Posts::Table)
        .if_not_exists()
        .col(id_column(Posts::Id))
        .col(ColumnDef::new(Posts::Title).string_len(256).not_null())
        .col(ColumnDef::new(Posts::Text).text().not_null())
        .col(
            ColumnDef::new(Posts::PubDate)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(ColumnDef::new(Posts::AuthorId).uuid().not_null())
        .col(ColumnDef::new(Posts::LocationId).uuid().null())
        .col(ColumnDef::new(Posts::CategoryId).uuid().null())
        .col(is_published_column(Posts::IsPublished))
        .col(created_at_column(Posts::CreatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_posts_author")
                .from(Posts::Table, Posts::AuthorId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_posts_location")
                .from(Posts::Table, Posts::LocationId)
                .to(Locations::Table, Locations::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .on_update(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_posts_category")
                .from(Posts::Table, Posts::CategoryId)
                .to(Categories::Table, Categories::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .on_update(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn posts_indexes() -> Vec<IndexCreateStatement> {
    [
        ("idx_posts_author_id", Posts::AuthorId),
        ("idx_posts_category_id", Posts::CategoryId),
        ("idx_posts_pub_date", Posts::PubDate),
    ]
    .into_iter()
    .map(|(name, column)| {
        Index::create()
            .name(name)
            .table(Posts::Table)
            .col(column)
            .if_not_exists()
            .to_owned()
    })
    .collect()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    Name,
    IsPublished,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Title,
    Description,
    Slug,
    IsPublished,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Text,
    PubDate,
    AuthorId,
    LocationId,
    CategoryId,
    IsPublished,
    CreatedAt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_is_unique_and_bounded() {
        let sql = categories_table().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#""slug" varchar(50) NOT NULL UNIQUE"#), "{sql}");
        assert!(sql.contains(r#""description" text NOT NULL"#), "{sql}");
    }

    #[test]
    fn test_publication_defaults() {
        let sql = locations_table().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#""is_published" bool NOT NULL DEFAULT TRUE"#), "{sql}");
        assert!(
            sql.contains(r#""created_at" timestamp with time zone NOT NULL DEFAULT CURRENT_TIMESTAMP"#),
            "{sql}"
        );
        assert!(sql.contains(r#""name" varchar(256) NOT NULL"#), "{sql}");
    }

    #[test]
    fn test_post_delete_policies() {
        let sql = posts_table().to_string(PostgresQueryBuilder);

        assert!(
            sql.contains(
                r#"FOREIGN KEY ("author_id") REFERENCES "users" ("id") ON DELETE CASCADE"#
            ),
            "{sql}"
        );
        assert!(
            sql.contains(
                r#"FOREIGN KEY ("location_id") REFERENCES "locations" ("id") ON DELETE SET NULL"#
            ),
            "{sql}"
        );
        assert!(
            sql.contains(
                r#"FOREIGN KEY ("category_id") REFERENCES "categories" ("id") ON DELETE SET NULL"#
            ),
            "{sql}"
        );
        assert!(sql.contains(r#""pub_date" timestamp with time zone NOT NULL"#), "{sql}");
    }

    #[test]
    fn test_indexes_cover_post_lookups() {
        let statements: Vec<String> = posts_indexes()
            .iter()
            .map(|index| index.to_string(PostgresQueryBuilder))
            .collect();
        assert_eq!(statements.len(), 3);
        assert!(statements.iter().any(|sql| sql.contains(r#"("pub_date")"#)));
    }
}
