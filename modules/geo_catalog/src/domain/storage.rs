use std::path::Path;
use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::model::{ImportReport, ImportTable};
use crate::domain::repos::{AirportsRepository, CitiesRepository, CountriesRepository};

/// Capability interface consumed by the request layer: one accessor per
/// entity repository.
pub trait Storage: Send + Sync {
    fn country(&self) -> &CountriesRepository;
    fn city(&self) -> &CitiesRepository;
    fn airport(&self) -> &AirportsRepository;
}

/// Default [`Storage`] implementation holding one repository per entity.
///
/// Repositories share the connection pool they were built with; the facade
/// itself keeps no other state.
#[derive(Clone)]
pub struct GeoStorage {
    countries: Arc<CountriesRepository>,
    cities: Arc<CitiesRepository>,
    airports: Arc<AirportsRepository>,
}

impl GeoStorage {
    #[must_use]
    pub fn new(
        countries: Arc<CountriesRepository>,
        cities: Arc<CitiesRepository>,
        airports: Arc<AirportsRepository>,
    ) -> Self {
        Self {
            countries,
            cities,
            airports,
        }
    }
}

impl Storage for GeoStorage {
    fn country(&self) -> &CountriesRepository {
        self.countries.as_ref()
    }

    fn city(&self) -> &CitiesRepository {
        self.cities.as_ref()
    }

    fn airport(&self) -> &AirportsRepository {
        self.airports.as_ref()
    }
}

/// Route a bulk import to the repository owning `table`.
///
/// # Errors
/// Whatever the target repository's import returns.
pub async fn import_file(
    storage: &dyn Storage,
    table: ImportTable,
    path: &Path,
) -> Result<ImportReport, DomainError> {
    match table {
        ImportTable::Countries => storage.country().import_from_file(path).await,
        ImportTable::Cities => storage.city().import_from_file(path).await,
        ImportTable::Airports => storage.airport().import_from_file(path).await,
    }
}
