pub mod event_service;
pub mod geo;
pub mod location_service;
pub mod policy;
pub mod review_service;
pub mod user_service;

/// Decodes a TEXT column holding a JSON array of strings. Malformed input
/// reads as empty.
pub(crate) fn parse_string_array_json(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::parse_string_array_json;

    #[test]
    fn parses_string_arrays_leniently() {
        assert_eq!(parse_string_array_json(Some(r#"["a","b"]"#)), vec!["a", "b"]);
        assert!(parse_string_array_json(Some("")).is_empty());
        assert!(parse_string_array_json(Some("{oops")).is_empty());
        assert!(parse_string_array_json(None).is_empty());
    }
}
