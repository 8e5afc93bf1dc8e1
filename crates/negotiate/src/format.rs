//! Ready made encoders and decoders for common media types.
//!
//! ```
//! use micro_negotiate::format::{json_decoder, json_encoder, text_encoder};
//! use micro_negotiate::RequestDecoder;
//!
//! let decoder = RequestDecoder::builder().decoder(json_decoder()).build();
//! assert!(!decoder.is_empty());
//! # let _ = (json_encoder(), text_encoder());
//! ```

use crate::decoder::{unmarshaler, BodyDecoder};
use crate::encoder::{marshal_text, marshaler, ResponseEncoder};
use serde_json::Value;

/// `application/json` via `serde_json`.
pub fn json_encoder() -> impl ResponseEncoder {
    marshaler(mime::APPLICATION_JSON, serde_json::to_vec::<Value>)
}

/// `application/json` via `serde_json`.
pub fn json_decoder() -> impl BodyDecoder {
    unmarshaler(mime::APPLICATION_JSON, |data: &[u8]| serde_json::from_slice::<Value>(data))
}

/// `text/plain; charset=utf-8`, see [`marshal_text`].
pub fn text_encoder() -> impl ResponseEncoder {
    marshaler(mime::TEXT_PLAIN_UTF_8, marshal_text)
}

/// `application/x-www-form-urlencoded` via `serde_urlencoded`.
///
/// Only flat objects can be encoded; every decoded value is a string.
#[cfg(feature = "form")]
pub fn form_encoder() -> impl ResponseEncoder {
    marshaler(mime::APPLICATION_WWW_FORM_URLENCODED, |value: &Value| serde_urlencoded::to_string(form_pairs(value)?))
}

#[cfg(feature = "form")]
pub fn form_decoder() -> impl BodyDecoder {
    unmarshaler(mime::APPLICATION_WWW_FORM_URLENCODED, |data: &[u8]| {
        serde_urlencoded::from_bytes::<serde_json::Map<String, Value>>(data).map(Value::Object)
    })
}

#[cfg(feature = "form")]
fn form_pairs(value: &Value) -> Result<Vec<(&str, String)>, serde_urlencoded::ser::Error> {
    use serde::ser::Error;

    let Value::Object(map) = value else {
        return Err(serde_urlencoded::ser::Error::custom("form body must be an object"));
    };

    map.iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key.as_str(), s.clone())),
            Value::Number(_) | Value::Bool(_) => Ok((key.as_str(), value.to_string())),
            Value::Null => Ok((key.as_str(), String::new())),
            Value::Array(_) | Value::Object(_) => {
                Err(serde_urlencoded::ser::Error::custom(format!("form field '{key}' must be a scalar")))
            }
        })
        .collect()
}

/// `application/yaml` via `serde_yaml`.
#[cfg(feature = "yaml")]
pub fn yaml_encoder() -> Result<impl ResponseEncoder, mime::FromStrError> {
    Ok(marshaler(yaml_mime()?, serde_yaml::to_string::<Value>))
}

#[cfg(feature = "yaml")]
pub fn yaml_decoder() -> Result<impl BodyDecoder, mime::FromStrError> {
    Ok(unmarshaler(yaml_mime()?, |data: &[u8]| serde_yaml::from_slice::<Value>(data)))
}

#[cfg(feature = "yaml")]
fn yaml_mime() -> Result<mime::Mime, mime::FromStrError> {
    "application/yaml".parse()
}

#[cfg(test)]
mod tests {
    use super::{json_decoder, json_encoder, text_encoder};
    use crate::decoder::BodyDecoder;
    use crate::encoder::ResponseEncoder;
    use serde_json::json;

    #[test]
    fn json_both_ways() {
        let value = json!({ "Message": "Hello World!", "count": 3 });
        let bytes = json_encoder().marshal(&value).unwrap();
        assert_eq!(json_decoder().unmarshal(&bytes).unwrap(), value);
    }

    #[test]
    fn text_content_type() {
        let encoder = text_encoder();
        assert_eq!(encoder.content_type().as_ref(), crate::PLAIN_TEXT);
        assert_eq!(&encoder.marshal(&json!("hi")).unwrap()[..], b"hi");
    }

    #[cfg(feature = "form")]
    #[test]
    fn form_encoding() {
        use super::{form_decoder, form_encoder};

        let bytes = form_encoder().marshal(&json!({ "name": "hello", "zip": 12345, "ok": true })).unwrap();
        let decoded = form_decoder().unmarshal(&bytes).unwrap();
        assert_eq!(decoded, json!({ "name": "hello", "zip": "12345", "ok": "true" }));

        let decoded = form_decoder().unmarshal(b"name=hello&zip=world").unwrap();
        assert_eq!(decoded, json!({ "name": "hello", "zip": "world" }));
    }

    #[cfg(feature = "form")]
    #[test]
    fn form_rejects_nested_values() {
        use super::form_encoder;

        let err = form_encoder().marshal(&json!({ "tags": ["a", "b"] })).unwrap_err();
        assert!(err.to_string().contains("tags"));
        assert!(form_encoder().marshal(&json!("just a string")).is_err());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_both_ways() {
        use super::{yaml_decoder, yaml_encoder};

        let encoder = yaml_encoder().unwrap();
        assert_eq!(encoder.content_type().as_ref(), "application/yaml");

        let bytes = encoder.marshal(&json!({ "Message": "Hello World!" })).unwrap();
        assert_eq!(&bytes[..], b"Message: Hello World!\n");
        assert_eq!(yaml_decoder().unwrap().unmarshal(&bytes).unwrap(), json!({ "Message": "Hello World!" }));
    }
}
