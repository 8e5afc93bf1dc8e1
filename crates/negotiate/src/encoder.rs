//! Response body encoders.
//!
//! A [`ResponseEncoder`] turns the body value of a [`Reply`](crate::Reply) into
//! bytes of one media type. The easiest way to get one is [`marshaler`], which
//! pairs a media type with any marshal function:
//!
//! ```
//! use micro_negotiate::encoder::{marshaler, ResponseEncoder};
//! use serde_json::{json, Value};
//!
//! let encoder = marshaler(mime::APPLICATION_JSON, serde_json::to_vec::<Value>);
//! let bytes = encoder.marshal(&json!({ "Message": "Hello World!" })).unwrap();
//! assert_eq!(&bytes[..], br#"{"Message":"Hello World!"}"#);
//! ```

use crate::error::BoxError;
use crate::registry::{MediaTypeRegistry, MediaTyped};
use bytes::Bytes;
use mime::Mime;
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;

#[cfg_attr(test, mockall::automock)]
pub trait ResponseEncoder: Send + Sync {
    /// The media type written as the response `Content-Type`.
    fn content_type(&self) -> &Mime;

    fn marshal(&self, value: &Value) -> Result<Bytes, BoxError>;
}

impl MediaTyped for dyn ResponseEncoder {
    fn content_type(&self) -> &Mime {
        ResponseEncoder::content_type(self)
    }
}

pub(crate) type Encoders = MediaTypeRegistry<dyn ResponseEncoder>;

/// A [`ResponseEncoder`] backed by a plain marshal function.
pub struct Marshaler<F> {
    content_type: Mime,
    f: F,
}

/// Pairs `content_type` with the marshal function `f`.
pub fn marshaler<F, O, E>(content_type: Mime, f: F) -> Marshaler<F>
where
    F: Fn(&Value) -> Result<O, E> + Send + Sync,
    O: Into<Bytes>,
    E: Into<BoxError>,
{
    Marshaler { content_type, f }
}

impl<F, O, E> ResponseEncoder for Marshaler<F>
where
    F: Fn(&Value) -> Result<O, E> + Send + Sync,
    O: Into<Bytes>,
    E: Into<BoxError>,
{
    fn content_type(&self) -> &Mime {
        &self.content_type
    }

    fn marshal(&self, value: &Value) -> Result<Bytes, BoxError> {
        (self.f)(value).map(Into::into).map_err(Into::into)
    }
}

impl<F> fmt::Debug for Marshaler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marshaler").field("content_type", &self.content_type).finish_non_exhaustive()
    }
}

/// Renders a value as plain text: strings as they are, `null` as nothing, and
/// everything else as compact JSON.
pub fn marshal_text(value: &Value) -> Result<Bytes, Infallible> {
    Ok(text_form(value))
}

pub(crate) fn text_form(value: &Value) -> Bytes {
    match value {
        Value::Null => Bytes::new(),
        Value::String(s) => Bytes::copy_from_slice(s.as_bytes()),
        other => Bytes::from(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{marshal_text, marshaler, ResponseEncoder};
    use serde_json::{json, Value};
    use std::fmt;

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("marshal failed")
        }
    }

    impl std::error::Error for Refused {}

    #[test]
    fn marshaler_delegates() {
        let encoder = marshaler(mime::APPLICATION_JSON, serde_json::to_vec::<Value>);
        assert_eq!(encoder.content_type(), &mime::APPLICATION_JSON);

        let bytes = encoder.marshal(&json!({ "Message": "Hello World!" })).unwrap();
        assert_eq!(&bytes[..], br#"{"Message":"Hello World!"}"#);
    }

    #[test]
    fn marshaler_keeps_error_message() {
        let encoder = marshaler("test/failed".parse().unwrap(), |_: &Value| Err::<Vec<u8>, _>(Refused));
        let err = encoder.marshal(&json!("anything")).unwrap_err();
        assert_eq!(err.to_string(), "marshal failed");
    }

    #[test]
    fn marshaler_accepts_string_output() {
        let encoder = marshaler("application/yaml".parse().unwrap(), serde_yaml::to_string::<Value>);
        let bytes = encoder.marshal(&json!({ "Message": "Hello World!" })).unwrap();
        assert_eq!(&bytes[..], b"Message: Hello World!\n");
    }

    #[test]
    fn text_forms() {
        assert_eq!(&marshal_text(&json!("Hello World!")).unwrap()[..], b"Hello World!");
        assert_eq!(&marshal_text(&json!(12.5)).unwrap()[..], b"12.5");
        assert_eq!(&marshal_text(&json!(true)).unwrap()[..], b"true");
        assert_eq!(&marshal_text(&json!({ "Message": "Hello World!" })).unwrap()[..], br#"{"Message":"Hello World!"}"#);
        assert!(marshal_text(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn debug_shows_content_type() {
        let encoder = marshaler(mime::APPLICATION_JSON, serde_json::to_vec::<Value>);
        let debug = format!("{encoder:?}");
        assert!(debug.starts_with("Marshaler"));
        assert!(debug.contains("application/json"));
    }
}
