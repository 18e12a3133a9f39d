use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter,
    TransactionTrait,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::{Country, ImportReport, ListRequest, NewCountry, Page};
use crate::domain::repos::EntityRepository;
use crate::infra::storage::entity::country::{Column as CountryColumn, Entity as CountryEntity};
use crate::infra::storage::import::{
    CountryRecord, commit_within, import_deadline, read_records,
};
use crate::infra::storage::mapper::{country_insert, country_update};
use crate::infra::storage::pagination::fetch_counted_page;
use crate::infra::storage::{RepoCfg, db_err};

const ENTITY: &str = "Country";

/// ORM-based implementation of the countries repository.
#[derive(Clone)]
pub struct OrmCountriesRepository {
    conn: DatabaseConnection,
    cfg: RepoCfg,
}

impl OrmCountriesRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection, cfg: RepoCfg) -> Self {
        Self { conn, cfg }
    }

    /// Read `path` and insert every record into a new transaction, returning
    /// it uncommitted.
    async fn stage_records(
        &self,
        path: &Path,
    ) -> Result<(DatabaseTransaction, ImportReport), DomainError> {
        let records: Vec<CountryRecord> = read_records(path).await?;
        let inserted = records.len();

        let txn = self.conn.begin().await.map_err(db_err)?;
        let now = Utc::now();
        for (index, record) in records.into_iter().enumerate() {
            let (id, fields) = record.into_parts();
            CountryEntity::insert(country_insert(id, fields, now))
                .exec_without_returning(&txn)
                .await
                .map_err(|e| DomainError::partial_failure(index, e.to_string()))?;
        }
        Ok((
            txn,
            ImportReport {
                inserted,
                detached: Vec::new(),
            },
        ))
    }
}

#[async_trait]
impl EntityRepository for OrmCountriesRepository {
    type Entity = Country;
    type Fields = NewCountry;

    #[instrument(skip(self, fields), fields(title = %fields.title))]
    async fn create(&self, fields: NewCountry) -> Result<Country, DomainError> {
        let id = Uuid::new_v4();
        CountryEntity::insert(country_insert(id, fields, Utc::now()))
            .exec_without_returning(&self.conn)
            .await
            .map_err(db_err)?;
        info!(country_id = %id, "Country created");
        self.get_by_id(id).await
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Country, DomainError> {
        let found = CountryEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(db_err)?;
        debug!(found = found.is_some(), "Country lookup");
        found
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    #[instrument(skip(self))]
    async fn get_list(&self, req: ListRequest) -> Result<Page<Country>, DomainError> {
        let window = req.normalize(self.cfg.limit);
        let (count, rows) = fetch_counted_page(
            &self.conn,
            CountryEntity::find(),
            &[CountryColumn::CreatedAt, CountryColumn::Guid],
            window,
        )
        .await
        .map_err(db_err)?;
        debug!(count, returned = rows.len(), "Countries listed");
        Ok(Page {
            count,
            items: rows.into_iter().map(Into::into).collect(),
        })
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, id: Uuid, fields: NewCountry) -> Result<Country, DomainError> {
        let res = CountryEntity::update_many()
            .set(country_update(fields, Utc::now()))
            .filter(CountryColumn::Guid.eq(id))
            .exec(&self.conn)
            .await
            .map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found(ENTITY, id));
        }
        info!(country_id = %id, "Country updated");
        self.get_by_id(id).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let res = CountryEntity::delete_many()
            .filter(CountryColumn::Guid.eq(id))
            .exec(&self.conn)
            .await
            .map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found(ENTITY, id));
        }
        info!(country_id = %id, "Country deleted");
        Ok(())
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn import_from_file(&self, path: &Path) -> Result<ImportReport, DomainError> {
        let deadline = import_deadline(self.cfg.import_timeout);
        let report = commit_within(deadline, self.stage_records(path)).await?;
        info!(inserted = report.inserted, "Countries imported");
        Ok(report)
    }
}
