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
use crate::domain::model::{Airport, ImportReport, ListRequest, NewAirport, Page};
use crate::domain::repos::EntityRepository;
use crate::infra::storage::entity::airport::{Column as AirportColumn, Entity as AirportEntity};
use crate::infra::storage::import::{
    AirportRecord, commit_within, existing_city, existing_country, import_deadline, read_records,
};
use crate::infra::storage::mapper::{airport_insert, airport_update};
use crate::infra::storage::pagination::fetch_counted_page;
use crate::infra::storage::{RepoCfg, db_err};

const ENTITY: &str = "Airport";

/// ORM-based implementation of the airports repository (`buildings` table).
#[derive(Clone)]
pub struct OrmAirportsRepository {
    conn: DatabaseConnection,
    cfg: RepoCfg,
}

impl OrmAirportsRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection, cfg: RepoCfg) -> Self {
        Self { conn, cfg }
    }

    async fn stage_records(
        &self,
        path: &Path,
    ) -> Result<(DatabaseTransaction, ImportReport), DomainError> {
        let records: Vec<AirportRecord> = read_records(path).await?;
        let mut report = ImportReport {
            inserted: records.len(),
            detached: Vec::new(),
        };

        let txn = self.conn.begin().await.map_err(db_err)?;
        let now = Utc::now();
        for (index, record) in records.into_iter().enumerate() {
            let (id, mut fields) = record.into_parts();

            let (country_ref, city_ref) = (fields.country_id, fields.city_id);
            fields.country_id = existing_country(&txn, country_ref).await?;
            fields.city_id = existing_city(&txn, city_ref).await?;
            if fields.country_id != country_ref || fields.city_id != city_ref {
                warn!(
                    index,
                    airport_id = %id,
                    country_id = ?country_ref,
                    city_id = ?city_ref,
                    "Referenced parent does not exist, storing airport without it"
                );
                report.detached.push(index);
            }

            AirportEntity::insert(airport_insert(id, fields, now))
                .exec_without_returning(&txn)
                .await
                .map_err(|e| DomainError::partial_failure(index, e.to_string()))?;
        }
        Ok((txn, report))
    }
}

#[async_trait]
impl EntityRepository for OrmAirportsRepository {
    type Entity = Airport;
    type Fields = NewAirport;

    #[instrument(skip(self, fields), fields(title = %fields.title))]
    async fn create(&self, fields: NewAirport) -> Result<Airport, DomainError> {
        let id = Uuid::new_v4();
        AirportEntity::insert(airport_insert(id, fields, Utc::now()))
            .exec_without_returning(&self.conn)
            .await
            .map_err(db_err)?;
        info!(airport_id = %id, "Airport created");
        self.get_by_id(id).await
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Airport, DomainError> {
        let found = AirportEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(db_err)?;
        debug!(found = found.is_some(), "Airport lookup");
        found
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    #[instrument(skip(self))]
    async fn get_list(&self, req: ListRequest) -> Result<Page<Airport>, DomainError> {
        let window = req.normalize(self.cfg.limit);
        let (count, rows) = fetch_counted_page(
            &self.conn,
            AirportEntity::find(),
            &[AirportColumn::CreatedAt, AirportColumn::Guid],
            window,
        )
        .await
        .map_err(db_err)?;
        debug!(count, returned = rows.len(), "Airports listed");
        Ok(Page {
            count,
            items: rows.into_iter().map(Into::into).collect(),
        })
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, id: Uuid, fields: NewAirport) -> Result<Airport, DomainError> {
        let res = AirportEntity::update_many()
            .set(airport_update(fields, Utc::now()))
            .filter(AirportColumn::Guid.eq(id))
            .exec(&self.conn)
            .await
            .map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found(ENTITY, id));
        }
        info!(airport_id = %id, "Airport updated");
        self.get_by_id(id).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let res = AirportEntity::delete_many()
            .filter(AirportColumn::Guid.eq(id))
            .exec(&self.conn)
            .await
            .map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found(ENTITY, id));
        }
        info!(airport_id = %id, "Airport deleted");
        Ok(())
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn import_from_file(&self, path: &Path) -> Result<ImportReport, DomainError> {
        let deadline = import_deadline(self.cfg.import_timeout);
        let report = commit_within(deadline, self.stage_records(path)).await?;
        info!(
            inserted = report.inserted,
            detached = report.detached.len(),
            "Airports imported"
        );
        Ok(report)
    }
}
