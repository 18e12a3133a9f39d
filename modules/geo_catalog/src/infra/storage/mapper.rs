//! Conversions between `SeaORM` models and domain types.
//!
//! Reads coerce NULL text to `""` and NULL numbers to `0`. Writes store every
//! field as given, except `timezone_id` which is stored as NULL when empty.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use uuid::Uuid;

use crate::domain::model::{Airport, City, Country, NewAirport, NewCity, NewCountry};
use crate::infra::storage::entity::{airport, city, country};

pub(crate) fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

impl From<country::Model> for Country {
    fn from(m: country::Model) -> Self {
        Self {
            id: m.guid,
            title: m.title.unwrap_or_default(),
            code: m.code.unwrap_or_default(),
            continent: m.continent.unwrap_or_default(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<city::Model> for City {
    fn from(m: city::Model) -> Self {
        Self {
            id: m.guid,
            title: m.title.unwrap_or_default(),
            country_id: m.country_id,
            city_code: m.city_code.unwrap_or_default(),
            latitude: m.latitude.unwrap_or_default(),
            longitude: m.longitude.unwrap_or_default(),
            offset: m.offset.unwrap_or_default(),
            timezone_id: m.timezone_id.unwrap_or_default(),
            country_name: m.country_name.unwrap_or_default(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<airport::Model> for Airport {
    fn from(m: airport::Model) -> Self {
        Self {
            id: m.guid,
            title: m.title.unwrap_or_default(),
            country_id: m.country_id,
            city_id: m.city_id,
            latitude: m.latitude.unwrap_or_default(),
            longitude: m.longitude.unwrap_or_default(),
            radius: m.radius.unwrap_or_default(),
            image: m.image.unwrap_or_default(),
            address: m.address.unwrap_or_default(),
            timezone_id: m.timezone_id.unwrap_or_default(),
            country: m.country.unwrap_or_default(),
            city: m.city.unwrap_or_default(),
            search_text: m.search_text.unwrap_or_default(),
            code: m.code.unwrap_or_default(),
            product_count: m.product_count.unwrap_or_default(),
            gmt: m.gmt.unwrap_or_default(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Active model for an insert: every column is set.
pub(crate) fn country_insert(id: Uuid, f: NewCountry, now: DateTime<Utc>) -> country::ActiveModel {
    country::ActiveModel {
        guid: Set(id),
        created_at: Set(now),
        ..country_update(f, now)
    }
}

/// Active model for a full-row update: identity and `created_at` are left untouched.
pub(crate) fn country_update(f: NewCountry, now: DateTime<Utc>) -> country::ActiveModel {
    country::ActiveModel {
        guid: NotSet,
        title: Set(Some(f.title)),
        code: Set(Some(f.code)),
        continent: Set(Some(f.continent)),
        created_at: NotSet,
        updated_at: Set(now),
    }
}

pub(crate) fn city_insert(id: Uuid, f: NewCity, now: DateTime<Utc>) -> city::ActiveModel {
    city::ActiveModel {
        guid: Set(id),
        created_at: Set(now),
        ..city_update(f, now)
    }
}

pub(crate) fn city_update(f: NewCity, now: DateTime<Utc>) -> city::ActiveModel {
    city::ActiveModel {
        guid: NotSet,
        title: Set(Some(f.title)),
        country_id: Set(f.country_id),
        city_code: Set(Some(f.city_code)),
        latitude: Set(Some(f.latitude)),
        longitude: Set(Some(f.longitude)),
        offset: Set(Some(f.offset)),
        timezone_id: Set(non_empty(f.timezone_id)),
        country_name: Set(Some(f.country_name)),
        created_at: NotSet,
        updated_at: Set(now),
    }
}

pub(crate) fn airport_insert(id: Uuid, f: NewAirport, now: DateTime<Utc>) -> airport::ActiveModel {
    airport::ActiveModel {
        guid: Set(id),
        created_at: Set(now),
        ..airport_update(f, now)
    }
}

pub(crate) fn airport_update(f: NewAirport, now: DateTime<Utc>) -> airport::ActiveModel {
    airport::ActiveModel {
        guid: NotSet,
        title: Set(Some(f.title)),
        country_id: Set(f.country_id),
        city_id: Set(f.city_id),
        latitude: Set(Some(f.latitude)),
        longitude: Set(Some(f.longitude)),
        radius: Set(Some(f.radius)),
        image: Set(Some(f.image)),
        address: Set(Some(f.address)),
        timezone_id: Set(non_empty(f.timezone_id)),
        country: Set(Some(f.country)),
        city: Set(Some(f.city)),
        search_text: Set(Some(f.search_text)),
        code: Set(Some(f.code)),
        product_count: Set(Some(f.product_count)),
        gmt: Set(Some(f.gmt)),
        created_at: NotSet,
        updated_at: Set(now),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn null_columns_read_back_as_defaults() {
        let now = Utc::now();
        let m = airport::Model {
            guid: Uuid::new_v4(),
            title: None,
            country_id: None,
            city_id: None,
            latitude: None,
            longitude: None,
            radius: None,
            image: None,
            address: None,
            timezone_id: None,
            country: None,
            city: None,
            search_text: None,
            code: None,
            product_count: None,
            gmt: None,
            created_at: now,
            updated_at: now,
        };
        let a = Airport::from(m);
        assert_eq!(a.title, "");
        assert_eq!(a.product_count, 0);
        assert!(a.latitude.abs() < f64::EPSILON);
        assert!(a.country_id.is_none());
    }

    #[test]
    fn empty_timezone_is_stored_as_null() {
        let am = city_update(NewCity::default(), Utc::now());
        assert_eq!(am.timezone_id, Set(None));
        assert_eq!(am.guid, NotSet);
        assert_eq!(am.created_at, NotSet);
    }

    #[test]
    fn insert_sets_identity_and_created_at() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let am = country_insert(
            id,
            NewCountry {
                title: "Uzbekistan".to_owned(),
                code: "UZ".to_owned(),
                continent: "Asia".to_owned(),
            },
            now,
        );
        assert_eq!(am.guid, Set(id));
        assert_eq!(am.created_at, Set(now));
        assert_eq!(am.title, Set(Some("Uzbekistan".to_owned())));
    }
}
