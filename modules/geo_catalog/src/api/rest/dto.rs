use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::model::{
    Airport, City, Country, ImportReport, ListRequest, NewAirport, NewCity, NewCountry, Page,
};
use crate::serde_ext::{lenient_number, nullable_string, optional_uuid};

/// REST DTO for country representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountryDto {
    pub guid: Uuid,
    pub title: String,
    pub code: String,
    pub continent: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /country` and `PUT /country/{id}`. Every field is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CountryReq {
    #[serde(deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(deserialize_with = "nullable_string")]
    pub code: String,
    #[serde(deserialize_with = "nullable_string")]
    pub continent: String,
}

/// REST DTO for city representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CityDto {
    pub guid: Uuid,
    pub title: String,
    pub country_id: Option<Uuid>,
    pub city_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub offset: String,
    pub timezone_id: String,
    pub country_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /city` and `PUT /city/{id}`.
///
/// Coordinates may be sent as numbers or numeric strings; `country_id` may be
/// `""` or `null` for "no country".
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CityReq {
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

/// REST DTO for airport representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AirportDto {
    pub guid: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /airport` and `PUT /airport/{id}`. Accepts `adress` as a
/// legacy spelling of `address`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AirportReq {
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

/// `offset` / `limit` query parameters of the list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Rows to skip; negative values count as 0.
    pub offset: Option<i64>,
    /// Page size; 0 or negative selects the default page size.
    pub limit: Option<i64>,
}

impl From<ListQuery> for ListRequest {
    fn from(q: ListQuery) -> Self {
        ListRequest::new(q.offset.unwrap_or(0), q.limit.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountryListDto {
    pub count: u64,
    pub countries: Vec<CountryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CityListDto {
    pub count: u64,
    pub cities: Vec<CityDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AirportListDto {
    pub count: u64,
    pub airports: Vec<AirportDto>,
}

/// Outcome of a committed import.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportReportDto {
    pub inserted: usize,
    /// Zero-based positions of records stored without their missing parent.
    pub detached: Vec<usize>,
}

/// `multipart/form-data` body of the upload endpoints.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// JSON array of records, sent with content type `application/json`.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthDto {
    pub status: String,
}

impl From<Country> for CountryDto {
    fn from(c: Country) -> Self {
        Self {
            guid: c.id,
            title: c.title,
            code: c.code,
            continent: c.continent,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<CountryReq> for NewCountry {
    fn from(r: CountryReq) -> Self {
        Self {
            title: r.title,
            code: r.code,
            continent: r.continent,
        }
    }
}

impl From<City> for CityDto {
    fn from(c: City) -> Self {
        Self {
            guid: c.id,
            title: c.title,
            country_id: c.country_id,
            city_code: c.city_code,
            latitude: c.latitude,
            longitude: c.longitude,
            offset: c.offset,
            timezone_id: c.timezone_id,
            country_name: c.country_name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<CityReq> for NewCity {
    fn from(r: CityReq) -> Self {
        Self {
            title: r.title,
            country_id: r.country_id,
            city_code: r.city_code,
            latitude: r.latitude,
            longitude: r.longitude,
            offset: r.offset,
            timezone_id: r.timezone_id,
            country_name: r.country_name,
        }
    }
}

impl From<Airport> for AirportDto {
    fn from(a: Airport) -> Self {
        Self {
            guid: a.id,
            title: a.title,
            country_id: a.country_id,
            city_id: a.city_id,
            latitude: a.latitude,
            longitude: a.longitude,
            radius: a.radius,
            image: a.image,
            address: a.address,
            timezone_id: a.timezone_id,
            country: a.country,
            city: a.city,
            search_text: a.search_text,
            code: a.code,
            product_count: a.product_count,
            gmt: a.gmt,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

impl From<AirportReq> for NewAirport {
    fn from(r: AirportReq) -> Self {
        Self {
            title: r.title,
            country_id: r.country_id,
            city_id: r.city_id,
            latitude: r.latitude,
            longitude: r.longitude,
            radius: r.radius,
            image: r.image,
            address: r.address,
            timezone_id: r.timezone_id,
            country: r.country,
            city: r.city,
            search_text: r.search_text,
            code: r.code,
            product_count: r.product_count,
            gmt: r.gmt,
        }
    }
}

impl From<Page<Country>> for CountryListDto {
    fn from(p: Page<Country>) -> Self {
        let p = p.map_items(CountryDto::from);
        Self {
            count: p.count,
            countries: p.items,
        }
    }
}

impl From<Page<City>> for CityListDto {
    fn from(p: Page<City>) -> Self {
        let p = p.map_items(CityDto::from);
        Self {
            count: p.count,
            cities: p.items,
        }
    }
}

impl From<Page<Airport>> for AirportListDto {
    fn from(p: Page<Airport>) -> Self {
        let p = p.map_items(AirportDto::from);
        Self {
            count: p.count,
            airports: p.items,
        }
    }
}

impl From<ImportReport> for ImportReportDto {
    fn from(r: ImportReport) -> Self {
        Self {
            inserted: r.inserted,
            detached: r.detached,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn city_req_accepts_legacy_strings() {
        let req: CityReq = serde_json::from_value(serde_json::json!({
            "title": "Samarkand",
            "country_id": "",
            "latitude": "39.6542",
            "longitude": "66.9597",
            "timezone_id": "Asia/Samarkand"
        }))
        .unwrap();
        let city = NewCity::from(req);
        assert!(city.country_id.is_none());
        assert!((city.latitude - 39.6542).abs() < 1e-9);
        assert_eq!(city.offset, "");
    }

    #[test]
    fn airport_req_accepts_misspelled_address() {
        let req: AirportReq =
            serde_json::from_value(serde_json::json!({ "adress": "Airport Rd 1" })).unwrap();
        assert_eq!(req.address, "Airport Rd 1");
    }

    #[test]
    fn list_query_defaults_to_zero() {
        let req = ListRequest::from(ListQuery::default());
        assert_eq!(req, ListRequest::new(0, 0));
    }

    #[test]
    fn list_dto_uses_entity_key() {
        let page: Page<Country> = Page {
            count: 0,
            items: Vec::new(),
        };
        let json = serde_json::to_value(CountryListDto::from(page)).unwrap();
        assert_eq!(json["count"], 0);
        assert!(json["countries"].as_array().unwrap().is_empty());
    }
}
