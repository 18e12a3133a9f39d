use utoipa::OpenApi;

use super::dto::{
    AirportDto, AirportListDto, AirportReq, CityDto, CityListDto, CityReq, CountryDto,
    CountryListDto, CountryReq, HealthDto, ImportReportDto, UploadForm,
};
use super::error::Problem;
use super::handlers::{airports, cities, countries, upload};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Geo Catalog API",
        description = "Countries, cities and airports with bulk JSON import"
    ),
    paths(
        super::handlers::health,
        countries::create_country,
        countries::get_country,
        countries::list_countries,
        countries::update_country,
        countries::delete_country,
        cities::create_city,
        cities::get_city,
        cities::list_cities,
        cities::update_city,
        cities::delete_city,
        airports::create_airport,
        airports::get_airport,
        airports::list_airports,
        airports::update_airport,
        airports::delete_airport,
        upload::upload_cities,
        upload::upload_airports,
        upload::upload_table,
    ),
    components(schemas(
        CountryDto,
        CountryReq,
        CountryListDto,
        CityDto,
        CityReq,
        CityListDto,
        AirportDto,
        AirportReq,
        AirportListDto,
        ImportReportDto,
        UploadForm,
        HealthDto,
        Problem,
    )),
    tags(
        (name = "Country"),
        (name = "City"),
        (name = "Airport"),
        (name = "System")
    )
)]
struct ApiDoc;

/// The generated OpenAPI document for every route served by
/// [`build_router`](super::build_router).
#[must_use]
pub fn document() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.version = env!("CARGO_PKG_VERSION").to_owned();
    doc
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = document();
        for path in [
            "/health",
            "/country",
            "/country/{id}",
            "/city",
            "/city/{id}",
            "/airport",
            "/airport/{id}",
            "/upload",
            "/upload/airport",
            "/upload/{table_slug}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemas = doc.components.unwrap().schemas;
        assert!(schemas.contains_key("Problem"));
        assert!(schemas.contains_key("CityListDto"));
    }
}
