//! Bulk import support: file records, file loading and parent lookups.
//!
//! Files are JSON arrays of full records. Unknown keys (`_id`, `__v`,
//! `createdAt`, ...) are ignored so raw exports can be loaded as is.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use sea_orm::{ConnectionTrait, DatabaseTransaction, EntityTrait, PaginatorTrait};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::{NewAirport, NewCity, NewCountry};
use crate::infra::storage::db_err;
use crate::infra::storage::entity::{city, country};
use crate::serde_ext::{lenient_number, nullable_string, optional_uuid};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CountryRecord {
    #[serde(alias = "id", deserialize_with = "optional_uuid")]
    pub guid: Option<Uuid>,
    #[serde(deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(deserialize_with = "nullable_string")]
    pub code: String,
    #[serde(deserialize_with = "nullable_string")]
    pub continent: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CityRecord {
    #[serde(alias = "id", deserialize_with = "optional_uuid")]
    pub guid: Option<Uuid>,
    #[serde(deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(deserialize_with = "optional_uuid")]
    pub country_id: Option<Uuid>,
    #[serde(deserialize_with = "nullable_string")]
    pub city_code: String,
    #[serde(deserialize_with = "lenient_number")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub longitude: f64,
    #[serde(deserialize_with = "nullable_string")]
    pub offset: String,
    #[serde(deserialize_with = "nullable_string")]
    pub timezone_id: String,
    #[serde(deserialize_with = "nullable_string")]
    pub country_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AirportRecord {
    #[serde(alias = "id", deserialize_with = "optional_uuid")]
    pub guid: Option<Uuid>,
    #[serde(deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(deserialize_with = "optional_uuid")]
    pub country_id: Option<Uuid>,
    #[serde(deserialize_with = "optional_uuid")]
    pub city_id: Option<Uuid>,
    #[serde(deserialize_with = "lenient_number")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub longitude: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub radius: f64,
    #[serde(deserialize_with = "nullable_string")]
    pub image: String,
    #[serde(alias = "adress", deserialize_with = "nullable_string")]
    pub address: String,
    #[serde(deserialize_with = "nullable_string")]
    pub timezone_id: String,
    #[serde(deserialize_with = "nullable_string")]
    pub country: String,
    #[serde(deserialize_with = "nullable_string")]
    pub city: String,
    #[serde(deserialize_with = "nullable_string")]
    pub search_text: String,
    #[serde(deserialize_with = "nullable_string")]
    pub code: String,
    #[serde(deserialize_with = "lenient_number")]
    pub product_count: i32,
    #[serde(deserialize_with = "nullable_string")]
    pub gmt: String,
}

impl CountryRecord {
    pub(crate) fn into_parts(self) -> (Uuid, NewCountry) {
        (
            self.guid.unwrap_or_else(Uuid::new_v4),
            NewCountry {
                title: self.title,
                code: self.code,
                continent: self.continent,
            },
        )
    }
}

impl CityRecord {
    pub(crate) fn into_parts(self) -> (Uuid, NewCity) {
        (
            self.guid.unwrap_or_else(Uuid::new_v4),
            NewCity {
                title: self.title,
                country_id: self.country_id,
                city_code: self.city_code,
                latitude: self.latitude,
                longitude: self.longitude,
                offset: self.offset,
                timezone_id: self.timezone_id,
                country_name: self.country_name,
            },
        )
    }
}

impl AirportRecord {
    pub(crate) fn into_parts(self) -> (Uuid, NewAirport) {
        (
            self.guid.unwrap_or_else(Uuid::new_v4),
            NewAirport {
                title: self.title,
                country_id: self.country_id,
                city_id: self.city_id,
                latitude: self.latitude,
                longitude: self.longitude,
                radius: self.radius,
                image: self.image,
                address: self.address,
                timezone_id: self.timezone_id,
                country: self.country,
                city: self.city,
                search_text: self.search_text,
                code: self.code,
                product_count: self.product_count,
                gmt: self.gmt,
            },
        )
    }
}

/// Read and parse an import file. No database work happens here.
///
/// # Errors
/// [`DomainError::ImportIo`] when the file cannot be read,
/// [`DomainError::InvalidImportFile`] when it is not a JSON array of records.
pub(crate) async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DomainError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::import_io(path.display().to_string(), e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| DomainError::invalid_import_file(e.to_string()))
}

/// Deadline for an import starting now. Absurdly large timeouts saturate.
pub(crate) fn import_deadline(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(60 * 60 * 24 * 365))
}

/// Drive `stage` (file read plus inserts into an open transaction) until
/// `deadline`, then commit.
///
/// Only staging races the deadline. An expired stage drops its transaction;
/// a stage that finishes late is rolled back explicitly. The commit itself
/// runs unbounded, so `Timeout` always means nothing was stored.
pub(crate) async fn commit_within<T>(
    deadline: Instant,
    stage: impl Future<Output = Result<(DatabaseTransaction, T), DomainError>>,
) -> Result<T, DomainError> {
    let (txn, staged) = tokio::time::timeout_at(deadline, stage)
        .await
        .map_err(|_| DomainError::timeout("import"))??;

    if Instant::now() >= deadline {
        txn.rollback().await.map_err(db_err)?;
        return Err(DomainError::timeout("import"));
    }
    txn.commit().await.map_err(db_err)?;
    Ok(staged)
}

/// Resolve an optional reference against `countries`. A dangling reference
/// comes back as `None`.
pub(crate) async fn existing_country<C: ConnectionTrait>(
    conn: &C,
    id: Option<Uuid>,
) -> Result<Option<Uuid>, DomainError> {
    let Some(id) = id else {
        return Ok(None);
    };
    let found = country::Entity::find_by_id(id)
        .count(conn)
        .await
        .map_err(db_err)?;
    Ok((found > 0).then_some(id))
}

/// Same as [`existing_country`] for `cities`.
pub(crate) async fn existing_city<C: ConnectionTrait>(
    conn: &C,
    id: Option<Uuid>,
) -> Result<Option<Uuid>, DomainError> {
    let Some(id) = id else {
        return Ok(None);
    };
    let found = city::Entity::find_by_id(id)
        .count(conn)
        .await
        .map_err(db_err)?;
    Ok((found > 0).then_some(id))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn airport_accepts_legacy_address_key() {
        let rec: AirportRecord = serde_json::from_value(serde_json::json!({
            "guid": "",
            "title": "Tashkent International",
            "adress": "Kushbegi St",
            "radius": "2.5",
            "product_count": 3,
            "_id": { "$oid": "5f1d" },
            "__v": 0
        }))
        .unwrap();
        assert_eq!(rec.address, "Kushbegi St");
        assert!((rec.radius - 2.5).abs() < f64::EPSILON);
        assert!(rec.guid.is_none());
    }

    #[test]
    fn city_accepts_string_coordinates() {
        let rec: CityRecord = serde_json::from_value(serde_json::json!({
            "title": "Tashkent",
            "latitude": "41.2995",
            "longitude": 69.2401,
            "country_id": ""
        }))
        .unwrap();
        assert!((rec.latitude - 41.2995).abs() < 1e-9);
        assert!((rec.longitude - 69.2401).abs() < 1e-9);
        assert!(rec.country_id.is_none());
    }

    #[test]
    fn record_guid_is_kept_or_generated() {
        let id = Uuid::new_v4();
        let rec = CountryRecord {
            guid: Some(id),
            ..CountryRecord::default()
        };
        assert_eq!(rec.into_parts().0, id);

        let (generated, _) = CountryRecord::default().into_parts();
        assert_eq!(generated.get_version_num(), 4);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = read_records::<CountryRecord>(Path::new("/definitely/not/here.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ImportIo { .. }));
    }

    #[tokio::test]
    async fn non_array_is_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, br#"{"title":"x"}"#).await.unwrap();
        let err = read_records::<CountryRecord>(&path).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidImportFile { .. }));
    }

    async fn migrated() -> sea_orm::DatabaseConnection {
        let conn = crate::infra::db::connect(&crate::infra::db::DatabaseConfig::in_memory())
            .await
            .unwrap();
        crate::infra::db::run_migrations(&conn).await.unwrap();
        conn
    }

    async fn stage_one_country(
        conn: &sea_orm::DatabaseConnection,
        linger: Duration,
    ) -> Result<(DatabaseTransaction, Uuid), DomainError> {
        use sea_orm::TransactionTrait;

        let txn = conn.begin().await.map_err(db_err)?;
        let (id, fields) = CountryRecord::default().into_parts();
        country::Entity::insert(crate::infra::storage::mapper::country_insert(
            id,
            fields,
            chrono::Utc::now(),
        ))
        .exec_without_returning(&txn)
        .await
        .map_err(db_err)?;
        tokio::time::sleep(linger).await;
        Ok((txn, id))
    }

    async fn stored(conn: &sea_orm::DatabaseConnection) -> u64 {
        country::Entity::find().count(conn).await.unwrap()
    }

    #[tokio::test]
    async fn staging_past_the_deadline_stores_nothing() {
        let conn = migrated().await;
        let deadline = import_deadline(Duration::from_millis(50));

        let err = commit_within(deadline, stage_one_country(&conn, Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Timeout { .. }), "{err:?}");
        assert_eq!(stored(&conn).await, 0);
    }

    #[tokio::test]
    async fn expired_deadline_never_commits() {
        let conn = migrated().await;
        for _ in 0..20 {
            let deadline = import_deadline(Duration::ZERO);
            let err = commit_within(deadline, stage_one_country(&conn, Duration::ZERO))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Timeout { .. }), "{err:?}");
        }
        assert_eq!(stored(&conn).await, 0);
    }

    #[tokio::test]
    async fn staging_within_the_deadline_commits() {
        let conn = migrated().await;
        let deadline = import_deadline(Duration::from_secs(30));

        let id = commit_within(deadline, stage_one_country(&conn, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(stored(&conn).await, 1);
        assert!(country::Entity::find_by_id(id).one(&conn).await.unwrap().is_some());
    }

    #[test]
    fn huge_timeout_saturates() {
        let deadline = import_deadline(Duration::MAX);
        assert!(deadline > Instant::now());
    }
}
