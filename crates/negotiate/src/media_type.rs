//! Reduces `Accept` and `Content-Type` header values to the bare media type used
//! as a registry key.
//!
//! Only the first comma separated entry of a header is looked at, and every
//! parameter (`q`, `charset`, ...) is dropped. Wildcards get no special treatment:
//! `*/*` is simply a key nothing is registered under.

use http::{HeaderMap, HeaderName};
use mime::Mime;

/// Returns the lowercase `type/subtype` of the header `name`, or an empty string
/// when the header is absent, not visible ASCII, or not a media type.
pub fn media_type(headers: &HeaderMap, name: HeaderName) -> String {
    let Some(value) = headers.get(name) else {
        return String::new();
    };

    match value.to_str() {
        Ok(s) => essence(s),
        Err(_) => String::new(),
    }
}

/// Returns the lowercase `type/subtype` of the first media type in `value`.
///
/// Parameters are cut off before parsing, so a malformed parameter or
/// whitespace ahead of `;` still yields the media type.
pub fn essence(value: &str) -> String {
    let first = value.split(',').next().unwrap_or_default();
    let bare = first.split(';').next().unwrap_or_default().trim();
    match bare.parse::<Mime>() {
        Ok(mime) => mime.essence_str().to_ascii_lowercase(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{essence, media_type};
    use http::header::{ACCEPT, CONTENT_TYPE};
    use http::{HeaderMap, HeaderValue};

    #[test]
    fn strips_parameters() {
        assert_eq!(essence("application/json; charset=utf-8"), "application/json");
        assert_eq!(essence("application/yaml;q=0.9"), "application/yaml");
    }

    #[test]
    fn whitespace_before_parameters() {
        assert_eq!(essence("application/yaml ;q=0.9"), "application/yaml");
        assert_eq!(essence(" application/yaml ; charset=utf-8"), "application/yaml");
    }

    #[test]
    fn malformed_parameter_keeps_media_type() {
        assert_eq!(essence("application/yaml; charset"), "application/yaml");
        assert_eq!(essence("application/json;;"), "application/json");
    }

    #[test]
    fn lowercases() {
        assert_eq!(essence("Application/JSON"), "application/json");
    }

    #[test]
    fn only_first_entry_counts() {
        assert_eq!(essence("text/html, application/json;q=0.9"), "text/html");
        assert_eq!(essence("*/*, application/json"), "*/*");
    }

    #[test]
    fn malformed_is_empty() {
        assert_eq!(essence(""), "");
        assert_eq!(essence("json"), "");
        assert_eq!(essence(";charset=utf-8"), "");
    }

    #[test]
    fn header_lookup() {
        let mut headers = HeaderMap::new();
        assert_eq!(media_type(&headers, ACCEPT), "");

        headers.insert(ACCEPT, HeaderValue::from_static("application/yaml"));
        assert_eq!(media_type(&headers, ACCEPT), "application/yaml");
        assert_eq!(media_type(&headers, CONTENT_TYPE), "");
    }

    #[test]
    fn opaque_header_value_is_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_bytes(b"application/\xffjson").unwrap());
        assert_eq!(media_type(&headers, CONTENT_TYPE), "");
    }
}
