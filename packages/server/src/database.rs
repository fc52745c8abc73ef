use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use tracing::info;

use crate::entity::{
    cast_member, category, category_genre, category_video, genre, genre_video, video,
};

pub async fn init_db(db_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    create_tables(&db).await?;

    Ok(db)
}

/// Create every catalog table that does not exist yet.
///
/// Owners come first so the join tables' foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, category::Entity).await?;
    create_table(db, genre::Entity).await?;
    create_table(db, cast_member::Entity).await?;
    create_table(db, video::Entity).await?;
    create_table(db, category_genre::Entity).await?;
    create_table(db, category_video::Entity).await?;
    create_table(db, genre_video::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut table = Schema::new(backend).create_table_from_entity(entity);
    table.if_not_exists();

    let stmt = backend.build(&table);
    db.execute_unprepared(&stmt.sql).await?;
    info!("Ensured table {} exists", entity.table_name());
    Ok(())
}
