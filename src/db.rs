use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Statement};

use crate::{entities::genero, error::AppResult};

const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");
const SEED_DATA: &str = include_str!("../migrations/002_seed_data.sql");

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migrate(&db).await?;
    Ok(db)
}

pub async fn migrate(db: &DatabaseConnection) -> AppResult<()> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA journal_mode=WAL".to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA synchronous=NORMAL".to_string(),
    ))
    .await?;

    run_sql(db, MIGRATION_001).await?;
    Ok(())
}

/// Inserts the sample catalog (genres, movies, rooms, showtimes) on first
/// startup. A non-empty genres table means the database was already seeded.
pub async fn seed_if_empty(db: &DatabaseConnection) -> AppResult<()> {
    let existing = genero::Entity::find().count(db).await?;
    if existing > 0 {
        return Ok(());
    }

    run_sql(db, SEED_DATA).await?;
    tracing::info!("seeded database with sample data");
    Ok(())
}

async fn run_sql(db: &DatabaseConnection, sql: &str) -> AppResult<()> {
    for stmt in sql.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        db.execute(Statement::from_string(db.get_database_backend(), stmt.to_string())).await?;
    }
    Ok(())
}
