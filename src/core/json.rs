// File: core/json.rs
// Shared JSON parsing helper.

use super::error::CoreError;

/// Parses a JSON body, logging the failure with a caller-supplied context.
///
/// Some of the site's PHP endpoints prefix their output with a UTF-8 BOM;
/// it is skipped.
pub fn parse_json_from_text<T: for<'de> serde::Deserialize<'de>>(
    response_text: &str,
    context: &str,
) -> Result<T, CoreError> {
    let body = response_text.trim_start_matches('\u{feff}');
    serde_json::from_str(body).map_err(|e| {
        log::warn!("Failed to parse JSON for {}: {}", context, e);
        CoreError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Part {
        vid: String,
    }

    #[test]
    fn test_parse_json_success() {
        let parsed: Part = parse_json_from_text(r#"{"vid": "11"}"#, "test_success").unwrap();
        assert_eq!(parsed, Part { vid: "11".to_string() });
    }

    #[test]
    fn test_parse_json_skips_bom() {
        let parsed: Part = parse_json_from_text("\u{feff}{\"vid\": \"7\"}", "bom").unwrap();
        assert_eq!(parsed.vid, "7");
    }

    #[test]
    fn test_parse_json_error() {
        let result = parse_json_from_text::<Part>(r#"{vid: 11}"#, "test_error");
        assert!(matches!(result, Err(CoreError::Parse(_))));
    }
}
