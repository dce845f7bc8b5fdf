//! Identifier validation and de-duplication shared by the batch fetchers.
//!
//! Identifiers end up both in request paths and in artifact file names, so
//! they are restricted to ASCII letters, digits, `-` and `_`.

use std::collections::HashSet;

use crate::types::{FetchError, FetchResult};

/// Reject blank identifiers and anything that could alter a URL path or a
/// file name (`/`, `\`, `..`, `?`, whitespace, ...).
pub fn validate_identifier(uei: &str) -> FetchResult<()> {
    if uei.trim().is_empty() {
        return Err(FetchError::InvalidArgument("identifier is blank".into()));
    }
    if let Some(c) = uei
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(FetchError::InvalidArgument(format!(
            "identifier {uei:?} contains disallowed character {c:?}"
        )));
    }
    Ok(())
}

/// Non-empty, and every entry passes `validate_identifier`.
pub fn validate_identifiers<S: AsRef<str>>(identifiers: &[S]) -> FetchResult<()> {
    if identifiers.is_empty() {
        return Err(FetchError::InvalidArgument(
            "identifiers must be a non-empty list".into(),
        ));
    }
    validate_each(identifiers)
}

/// Every entry passes `validate_identifier`; an empty list is accepted.
pub fn validate_each<S: AsRef<str>>(identifiers: &[S]) -> FetchResult<()> {
    for (pos, uei) in identifiers.iter().enumerate() {
        validate_identifier(uei.as_ref()).map_err(|e| match e {
            FetchError::InvalidArgument(msg) => {
                FetchError::InvalidArgument(format!("position {pos}: {msg}"))
            }
            other => other,
        })?;
    }
    Ok(())
}

/// Input order, first occurrence wins.
pub fn unique_identifiers<S: AsRef<str>>(identifiers: &[S]) -> Vec<&str> {
    let mut seen = HashSet::new();
    identifiers
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| seen.insert(*s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_accepts_uei_shapes() {
        assert!(validate_identifier("ZQGGHJH74DW7").is_ok());
        assert!(validate_identifier("abc-123_X").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_path_and_url_characters() {
        for bad in ["", "   ", "x/A1", "..", "../escaped", "a\\b", "A1?year=1", "A 1", "A1#"] {
            assert!(
                matches!(validate_identifier(bad), Err(FetchError::InvalidArgument(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_identifiers() {
        let empty: Vec<String> = Vec::new();
        assert!(matches!(
            validate_identifiers(&empty),
            Err(FetchError::InvalidArgument(_))
        ));
        assert!(validate_identifiers(&["A1", " "]).is_err());
        assert!(validate_identifiers(&["A1"]).is_ok());
        assert!(validate_each(&empty).is_ok());
    }

    #[test]
    fn test_error_names_position() {
        let err = validate_each(&["A1", "B/2"]).unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn test_unique_identifiers_keeps_first_occurrence() {
        let ids = ["B", "A", "B", "C", "A"];
        assert_eq!(unique_identifiers(&ids), vec!["B", "A", "C"]);
    }
}
