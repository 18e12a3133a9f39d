use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter,
    TransactionTrait,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::{City, ImportReport, ListRequest, NewCity, Page};
use crate::domain::repos::EntityRepository;
use crate::infra::storage::entity::city::{Column as CityColumn, Entity as CityEntity};
use crate::infra::storage::import::{
    CityRecord, commit_within, existing_country, import_deadline, read_records,
};
use crate::infra::storage::mapper::{city_insert, city_update};
use crate::infra::storage::pagination::fetch_counted_page;
use crate::infra::storage::{RepoCfg, db_err};

const ENTITY: &str = "City";

/// ORM-based implementation of the cities repository.
#[derive(Clone)]
pub struct OrmCitiesRepository {
    conn: DatabaseConnection,
    cfg: RepoCfg,
}

impl OrmCitiesRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection, cfg: RepoCfg) -> Self {
        Self { conn, cfg }
    }

    async fn stage_records(
        &self,
        path: &Path,
    ) -> Result<(DatabaseTransaction, ImportReport), DomainError> {
        let records: Vec<CityRecord> = read_records(path).await?;
        let mut report = ImportReport {
            inserted: records.len(),
            detached: Vec::new(),
        };

        let txn = self.conn.begin().await.map_err(db_err)?;
        let now = Utc::now();
        for (index, record) in records.into_iter().enumerate() {
            let (id, mut fields) = record.into_parts();

            let requested = fields.country_id;
            fields.country_id = existing_country(&txn, requested).await?;
            if fields.country_id != requested {
                warn!(
                    index,
                    city_id = %id,
                    country_id = ?requested,
                    "Referenced country does not exist, storing city without it"
                );
                report.detached.push(index);
            }

            CityEntity::insert(city_insert(id, fields, now))
                .exec_without_returning(&txn)
                .await
                .map_err(|e| DomainError::partial_failure(index, e.to_string()))?;
        }
        Ok((txn, report))
    }
}

#[async_trait]
impl EntityRepository for OrmCitiesRepository {
    type Entity = City;
    type Fields = NewCity;

    #[instrument(skip(self, fields), fields(title = %fields.title))]
    async fn create(&self, fields: NewCity) -> Result<City, DomainError> {
        let id = Uuid::new_v4();
        CityEntity::insert(city_insert(id, fields, Utc::now()))
            .exec_without_returning(&self.conn)
            .await
            .map_err(db_err)?;
        info!(city_id = %id, "City created");
        self.get_by_id(id).await
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<City, DomainError> {
        let found = CityEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(db_err)?;
        debug!(found = found.is_some(), "City lookup");
        found
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    #[instrument(skip(self))]
    async fn get_list(&self, req: ListRequest) -> Result<Page<City>, DomainError> {
        let window = req.normalize(self.cfg.limit);
        let (count, rows) = fetch_counted_page(
            &self.conn,
            CityEntity::find(),
            &[CityColumn::CreatedAt, CityColumn::Guid],
            window,
        )
        .await
        .map_err(db_err)?;
        debug!(count, returned = rows.len(), "Cities listed");
        Ok(Page {
            count,
            items: rows.into_iter().map(Into::into).collect(),
        })
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, id: Uuid, fields: NewCity) -> Result<City, DomainError> {
        let res = CityEntity::update_many()
            .set(city_update(fields, Utc::now()))
            .filter(CityColumn::Guid.eq(id))
            .exec(&self.conn)
            .await
            .map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found(ENTITY, id));
        }
        info!(city_id = %id, "City updated");
        self.get_by_id(id).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let res = CityEntity::delete_many()
            .filter(CityColumn::Guid.eq(id))
            .exec(&self.conn)
            .await
            .map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found(ENTITY, id));
        }
        info!(city_id = %id, "City deleted");
        Ok(())
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn import_from_file(&self, path: &Path) -> Result<ImportReport, DomainError> {
        let deadline = import_deadline(self.cfg.import_timeout);
        let report = commit_within(deadline, self.stage_records(path)).await?;
        info!(
            inserted = report.inserted,
            detached = report.detached.len(),
            "Cities imported"
        );
        Ok(report)
    }
}
