//! Transport-agnostic domain models.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::LimitCfg;

/// A country entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub id: Uuid,
    pub title: String,
    pub code: String,
    pub continent: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a country. Used for both create and full-row update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCountry {
    pub title: String,
    pub code: String,
    pub continent: String,
}

/// A city entity.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub id: Uuid,
    pub title: String,
    pub country_id: Option<Uuid>,
    pub city_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// UTC offset as free text, e.g. `+05:00`.
    pub offset: String,
    pub timezone_id: String,
    /// Caller-supplied, not kept in sync with the referenced country.
    pub country_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCity {
    pub title: String,
    pub country_id: Option<Uuid>,
    pub city_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub offset: String,
    pub timezone_id: String,
    pub country_name: String,
}

/// An airport entity, persisted in the `buildings` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub id: Uuid,
    pub title: String,
    pub country_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub image: String,
    pub address: String,
    pub timezone_id: String,
    /// Denormalized country name.
    pub country: String,
    /// Denormalized city name.
    pub city: String,
    pub search_text: String,
    pub code: String,
    pub product_count: i32,
    pub gmt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewAirport {
    pub title: String,
    pub country_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub image: String,
    pub address: String,
    pub timezone_id: String,
    pub country: String,
    pub city: String,
    pub search_text: String,
    pub code: String,
    pub product_count: i32,
    pub gmt: String,
}

/// Raw pagination input as received from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListRequest {
    pub offset: i64,
    pub limit: i64,
}

impl ListRequest {
    #[must_use]
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Negative offsets become 0, non-positive limits become the default page
    /// size and oversized limits are capped.
    #[must_use]
    pub fn normalize(self, cfg: LimitCfg) -> PageWindow {
        let offset = u64::try_from(self.offset).unwrap_or(0);
        let limit = match u64::try_from(self.limit) {
            Ok(0) | Err(_) => cfg.default,
            Ok(n) => n.min(cfg.max),
        };
        PageWindow { offset, limit }
    }
}

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// One page of records plus the unfiltered total row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub count: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// Outcome of a committed bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportReport {
    /// Number of rows inserted.
    pub inserted: usize,
    /// Zero-based positions of records whose parent reference did not exist
    /// and was stored as NULL.
    pub detached: Vec<usize>,
}

/// Target table of a bulk import, addressed by URL slug or CLI flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTable {
    Countries,
    Cities,
    Airports,
}

impl ImportTable {
    /// Singular and plural entity names are accepted; airports also answer
    /// to their table name `buildings`.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.to_ascii_lowercase().as_str() {
            "country" | "countries" => Some(Self::Countries),
            "city" | "cities" => Some(Self::Cities),
            "airport" | "airports" | "buildings" => Some(Self::Airports),
            _ => None,
        }
    }
}
