use std::path::Path;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::{
    Airport, City, Country, ImportReport, ListRequest, NewAirport, NewCity, NewCountry, Page,
};

/// Port for the domain layer: persistence operations for one entity type.
///
/// Every entity exposes the same operation set and differs only in its field
/// set, so a single trait is parameterized by the stored record (`Entity`) and
/// its mutable fields (`Fields`).
///
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    type Entity: Send;
    type Fields: Send;

    /// Insert a new row under a freshly generated id and return it as stored.
    async fn create(&self, fields: Self::Fields) -> Result<Self::Entity, DomainError>;

    /// Load one row. Absence is reported as [`DomainError::NotFound`].
    async fn get_by_id(&self, id: Uuid) -> Result<Self::Entity, DomainError>;

    /// One page of rows plus the total row count of the table.
    async fn get_list(&self, req: ListRequest) -> Result<Page<Self::Entity>, DomainError>;

    /// Overwrite every mutable field of an existing row.
    async fn update(&self, id: Uuid, fields: Self::Fields) -> Result<Self::Entity, DomainError>;

    /// Hard delete. Deleting a missing row is [`DomainError::NotFound`].
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Load a JSON array of records from `path` and insert all of them in
    /// one transaction. Either every record is committed or none is.
    async fn import_from_file(&self, path: &Path) -> Result<ImportReport, DomainError>;
}

pub type CountriesRepository = dyn EntityRepository<Entity = Country, Fields = NewCountry>;
pub type CitiesRepository = dyn EntityRepository<Entity = City, Fields = NewCity>;
pub type AirportsRepository = dyn EntityRepository<Entity = Airport, Fields = NewAirport>;
