//! Request body decoding based on the request's `Content-Type`.
//!
//! A [`RequestDecoder`] holds any number of [`BodyDecoder`]s. The first one
//! registered is the default, used when the request has no `Content-Type` or
//! one nothing is registered for. With no decoders at all,
//! [`RequestDecoder::decode_body`] just hands back the raw body.
//!
//! # Example
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use http::Request;
//! use http_body_util::Full;
//! use micro_negotiate::{unmarshaler, RequestDecoder};
//! use serde_json::Value;
//! use std::collections::HashMap;
//!
//! let decoder = RequestDecoder::builder()
//!     .decoder(unmarshaler(mime::APPLICATION_JSON, |b: &[u8]| serde_json::from_slice::<Value>(b)))
//!     .build();
//!
//! let req = Request::new(Full::<bytes::Bytes>::from(r#"{"Message": "Hello World!"}"#));
//! let mut data = HashMap::<String, String>::new();
//! decoder.decode_body(Some(req), &mut data).await.unwrap();
//!
//! assert_eq!(data["Message"], "Hello World!");
//! # }
//! ```

use crate::error::{BoxError, DecodeError};
use crate::media_type::media_type;
use crate::registry::{MediaTypeRegistry, MediaTyped};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Request};
use http_body::Body;
use http_body_util::BodyExt;
use mime::Mime;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

#[cfg_attr(test, mockall::automock)]
pub trait BodyDecoder: Send + Sync {
    /// The request `Content-Type` this decoder understands.
    fn content_type(&self) -> &Mime;

    fn unmarshal(&self, data: &[u8]) -> Result<Value, BoxError>;
}

impl MediaTyped for dyn BodyDecoder {
    fn content_type(&self) -> &Mime {
        BodyDecoder::content_type(self)
    }
}

/// A [`BodyDecoder`] backed by a plain unmarshal function.
pub struct Unmarshaler<F> {
    content_type: Mime,
    f: F,
}

/// Pairs `content_type` with the unmarshal function `f`.
///
/// Generic deserializers such as `serde_json::from_slice` have to be wrapped
/// in a closure taking `&[u8]`, since their input lifetime is tied to the
/// output type.
pub fn unmarshaler<F, E>(content_type: Mime, f: F) -> Unmarshaler<F>
where
    F: Fn(&[u8]) -> Result<Value, E> + Send + Sync,
    E: Into<BoxError>,
{
    Unmarshaler { content_type, f }
}

impl<F, E> BodyDecoder for Unmarshaler<F>
where
    F: Fn(&[u8]) -> Result<Value, E> + Send + Sync,
    E: Into<BoxError>,
{
    fn content_type(&self) -> &Mime {
        &self.content_type
    }

    fn unmarshal(&self, data: &[u8]) -> Result<Value, BoxError> {
        (self.f)(data).map_err(Into::into)
    }
}

impl<F> fmt::Debug for Unmarshaler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unmarshaler").field("content_type", &self.content_type).finish_non_exhaustive()
    }
}

/// Decodes request bodies with the decoder matching their `Content-Type`.
///
/// Built once and shared; cloning is cheap.
#[derive(Clone, Debug)]
pub struct RequestDecoder {
    decoders: Arc<MediaTypeRegistry<dyn BodyDecoder>>,
}

impl RequestDecoder {
    pub fn builder() -> RequestDecoderBuilder {
        RequestDecoderBuilder::new()
    }

    /// Reads the whole body of `req` and decodes it into `target`.
    ///
    /// Returns the raw body bytes, or `None` when there is no request or the
    /// body is empty. The request is consumed, so its body stream is released on
    /// every path. `target` is only written when decoding succeeds, and is left
    /// alone when no decoders are registered.
    pub async fn decode_body<B, T>(&self, req: Option<Request<B>>, target: &mut T) -> Result<Option<Bytes>, DecodeError>
    where
        B: Body,
        B::Error: Into<BoxError>,
        T: DeserializeOwned,
    {
        let Some(req) = req else {
            return Ok(None);
        };

        let (parts, body) = req.into_parts();
        self.decode_parts(&parts.headers, body, target).await
    }

    /// Same as [`RequestDecoder::decode_body`] for a request already split with
    /// [`Request::into_parts`].
    pub async fn decode_parts<B, T>(&self, headers: &HeaderMap, body: B, target: &mut T) -> Result<Option<Bytes>, DecodeError>
    where
        B: Body,
        B::Error: Into<BoxError>,
        T: DeserializeOwned,
    {
        let raw = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => return Err(DecodeError::read_body(e)),
        };

        if raw.is_empty() {
            return Ok(None);
        }

        let content_type = media_type(headers, CONTENT_TYPE);
        let Some(decoder) = self.decoders.resolve(&content_type) else {
            debug!(content_type, "no body decoder registered, returning raw body");
            return Ok(Some(raw));
        };
        trace!(content_type, decoder = %BodyDecoder::content_type(decoder.as_ref()), "decoding request body");

        let value = match decoder.unmarshal(&raw) {
            Ok(value) => value,
            Err(e) => return Err(DecodeError::unmarshal(raw, e)),
        };

        match serde_json::from_value::<T>(value) {
            Ok(decoded) => {
                *target = decoded;
                Ok(Some(raw))
            }
            Err(e) => Err(DecodeError::deserialize(raw, e)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl<D: BodyDecoder + 'static> FromIterator<D> for RequestDecoder {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        Self::builder().decoders(iter).build()
    }
}

#[derive(Debug, Default)]
pub struct RequestDecoderBuilder {
    decoders: MediaTypeRegistry<dyn BodyDecoder>,
}

impl RequestDecoderBuilder {
    fn new() -> Self {
        Self { decoders: MediaTypeRegistry::new() }
    }

    /// Registers a decoder; the first one registered becomes the default.
    pub fn decoder(mut self, decoder: impl BodyDecoder + 'static) -> Self {
        self.decoders.register(Arc::new(decoder));
        self
    }

    pub fn decoders<D, I>(self, decoders: I) -> Self
    where
        D: BodyDecoder + 'static,
        I: IntoIterator<Item = D>,
    {
        decoders.into_iter().fold(self, |builder, decoder| builder.decoder(decoder))
    }

    pub fn build(self) -> RequestDecoder {
        RequestDecoder { decoders: Arc::new(self.decoders) }
    }
}
