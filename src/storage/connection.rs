use crate::storage::entity::{department, department_gallery_image, program, trade};
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use std::time::Duration;

pub async fn establish_connection(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());
    opt.max_connections(10)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info);

    let db = Database::connect(opt).await?;

    // 启用 WAL 模式
    let _ = sea_orm::ConnectionTrait::execute(
        &db,
        sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Sqlite,
            "PRAGMA journal_mode=WAL;".to_string(),
        ),
    )
    .await?;

    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // 建表顺序：programs -> trades -> departments -> gallery
    let stmt = builder.build(
        schema
            .create_table_from_entity(program::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    let stmt = builder.build(schema.create_table_from_entity(trade::Entity).if_not_exists());
    db.execute(stmt).await?;

    let stmt = builder.build(
        schema
            .create_table_from_entity(department::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    let stmt = builder.build(
        schema
            .create_table_from_entity(department_gallery_image::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    for sql in [
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_programs_name ON programs(name);",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_programs_code ON programs(code);",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_trades_program_code ON trades(program_id, code);",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_departments_slug ON departments(slug);",
        "CREATE INDEX IF NOT EXISTS idx_gallery_department ON department_gallery_images(department_id, display_order);",
    ] {
        db.execute(sea_orm::Statement::from_string(
            builder,
            sql.to_string(),
        ))
        .await?;
    }

    info!("Database connection established with WAL mode and tables initialized.");

    Ok(db)
}
