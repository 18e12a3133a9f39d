//! Infrastructure layer - database connection and `SeaORM` persistence.

pub mod db;
pub mod storage;
