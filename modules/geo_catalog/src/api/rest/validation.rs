use uuid::{Uuid, Variant};

use crate::domain::error::DomainError;

/// Length of the hyphenated text form, `8-4-4-4-12`.
const HYPHENATED_LEN: usize = 36;

/// Parse a path identifier. Only the hyphenated RFC 4122 version 4 form is
/// accepted (hex digits in either case); simple, braced and URN forms are
/// rejected.
///
/// # Errors
/// [`DomainError::Validation`] on any other input.
pub fn parse_v4_id(raw: &str) -> Result<Uuid, DomainError> {
    let invalid = || DomainError::validation("id", format!("'{raw}' is not a UUID v4"));

    if raw.len() != HYPHENATED_LEN {
        return Err(invalid());
    }
    let id = Uuid::try_parse(raw).map_err(|_| invalid())?;
    if id.get_version_num() != 4 || id.get_variant() != Variant::RFC4122 {
        return Err(invalid());
    }
    Ok(id)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn accepts_generated_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_v4_id(&id.to_string()).unwrap(), id);
        assert_eq!(
            parse_v4_id(&id.to_string().to_uppercase()).unwrap(),
            id
        );
    }

    #[test]
    fn rejects_other_forms() {
        let id = Uuid::new_v4();
        for raw in [
            "abc".to_owned(),
            String::new(),
            id.simple().to_string(),
            id.braced().to_string(),
            id.urn().to_string(),
        ] {
            assert!(parse_v4_id(&raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn rejects_other_versions() {
        // nil and a version 1 id
        assert!(parse_v4_id("00000000-0000-0000-0000-000000000000").is_err());
        assert!(parse_v4_id("c232ab00-9414-11ec-b3c8-9e6bdeced846").is_err());
    }

    #[test]
    fn rejects_wrong_variant() {
        assert!(parse_v4_id("f47ac10b-58cc-4372-c567-0e02b2c3d479").is_err());
    }
}
