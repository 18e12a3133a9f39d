use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

/// Creates `countries`, `cities` and `buildings`.
///
/// `country_id` / `city_id` carry no foreign key constraints; parent existence
/// is checked by the import routine only.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        let statements: &[&str] = match backend {
            sea_orm::DatabaseBackend::Postgres => &[
                r#"
CREATE TABLE IF NOT EXISTS countries (
    guid UUID PRIMARY KEY NOT NULL,
    title VARCHAR(255),
    code VARCHAR(32),
    continent VARCHAR(64),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#,
                r#"
CREATE TABLE IF NOT EXISTS cities (
    guid UUID PRIMARY KEY NOT NULL,
    title VARCHAR(255),
    country_id UUID,
    city_code VARCHAR(32),
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION,
    "offset" VARCHAR(16),
    timezone_id VARCHAR(64),
    country_name VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#,
                r#"
CREATE TABLE IF NOT EXISTS buildings (
    guid UUID PRIMARY KEY NOT NULL,
    title VARCHAR(255),
    country_id UUID,
    city_id UUID,
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION,
    radius DOUBLE PRECISION,
    image TEXT,
    address TEXT,
    timezone_id VARCHAR(64),
    country VARCHAR(255),
    city VARCHAR(255),
    search_text TEXT,
    code VARCHAR(32),
    product_count INTEGER,
    gmt VARCHAR(16),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#,
                "CREATE INDEX IF NOT EXISTS idx_cities_country_id ON cities(country_id)",
                "CREATE INDEX IF NOT EXISTS idx_buildings_country_id ON buildings(country_id)",
                "CREATE INDEX IF NOT EXISTS idx_buildings_city_id ON buildings(city_id)",
            ],
            sea_orm::DatabaseBackend::MySql => &[
                r"
CREATE TABLE IF NOT EXISTS countries (
    guid BINARY(16) PRIMARY KEY NOT NULL,
    title VARCHAR(255),
    code VARCHAR(32),
    continent VARCHAR(64),
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)",
                r"
CREATE TABLE IF NOT EXISTS cities (
    guid BINARY(16) PRIMARY KEY NOT NULL,
    title VARCHAR(255),
    country_id BINARY(16),
    city_code VARCHAR(32),
    latitude DOUBLE,
    longitude DOUBLE,
    `offset` VARCHAR(16),
    timezone_id VARCHAR(64),
    country_name VARCHAR(255),
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    KEY idx_cities_country_id (country_id)
)",
                r"
CREATE TABLE IF NOT EXISTS buildings (
    guid BINARY(16) PRIMARY KEY NOT NULL,
    title VARCHAR(255),
    country_id BINARY(16),
    city_id BINARY(16),
    latitude DOUBLE,
    longitude DOUBLE,
    radius DOUBLE,
    image TEXT,
    address TEXT,
    timezone_id VARCHAR(64),
    country VARCHAR(255),
    city VARCHAR(255),
    search_text TEXT,
    code VARCHAR(32),
    product_count INT,
    gmt VARCHAR(16),
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    KEY idx_buildings_country_id (country_id),
    KEY idx_buildings_city_id (city_id)
)",
            ],
            sea_orm::DatabaseBackend::Sqlite => &[
                r#"
CREATE TABLE IF NOT EXISTS countries (
    guid BLOB PRIMARY KEY NOT NULL,
    title TEXT,
    code TEXT,
    continent TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
                r#"
CREATE TABLE IF NOT EXISTS cities (
    guid BLOB PRIMARY KEY NOT NULL,
    title TEXT,
    country_id BLOB,
    city_code TEXT,
    latitude REAL,
    longitude REAL,
    "offset" TEXT,
    timezone_id TEXT,
    country_name TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
                r"
CREATE TABLE IF NOT EXISTS buildings (
    guid BLOB PRIMARY KEY NOT NULL,
    title TEXT,
    country_id BLOB,
    city_id BLOB,
    latitude REAL,
    longitude REAL,
    radius REAL,
    image TEXT,
    address TEXT,
    timezone_id TEXT,
    country TEXT,
    city TEXT,
    search_text TEXT,
    code TEXT,
    product_count INTEGER,
    gmt TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)",
                "CREATE INDEX IF NOT EXISTS idx_cities_country_id ON cities(country_id)",
                "CREATE INDEX IF NOT EXISTS idx_buildings_country_id ON buildings(country_id)",
                "CREATE INDEX IF NOT EXISTS idx_buildings_city_id ON buildings(city_id)",
            ],
        };

        for sql in statements {
            conn.execute_unprepared(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for table in ["buildings", "cities", "countries"] {
            conn.execute_unprepared(&format!("DROP TABLE IF EXISTS {table}"))
                .await?;
        }
        Ok(())
    }
}
