//! Content negotiation for HTTP handlers that return typed data.
//!
//! Handlers written for this crate don't produce bytes. They return a [`Reply`]
//! holding a status code, headers and a body value, and a [`ResponseHandler`]
//! picks the wire format from the request's `Accept` header. Request bodies go
//! the other way through a [`RequestDecoder`], which picks a decoder from the
//! request's `Content-Type`.
//!
//! Encoders and decoders are plain functions paired with a media type, see
//! [`marshaler`] and [`unmarshaler`]. The [`format`] module has ready made ones
//! for JSON, forms, YAML and plain text.
//!
//! # Negotiation rules
//!
//! - Only the first media type of a header counts, and its parameters are
//!   ignored. There is no wildcard or quality value handling.
//! - The first encoder or decoder registered is the default, used when the
//!   header is missing or matches nothing.
//! - A response with no encoders configured is sent as [`PLAIN_TEXT`].
//! - A request with no decoders configured is returned as raw bytes.
//! - An encoder error turns the response into a plain text `500` carrying the
//!   error message.
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use bytes::Bytes;
//! use http::header::ACCEPT;
//! use http::{Request, StatusCode};
//! use http_body_util::{BodyExt, Full};
//! use micro_negotiate::format::{json_decoder, json_encoder, text_encoder};
//! use micro_negotiate::{Handler, Reply, RequestDecoder, ResponseHandler};
//! use std::collections::HashMap;
//!
//! let decoder = RequestDecoder::builder().decoder(json_decoder()).build();
//!
//! let handler = ResponseHandler::builder(move |req: Request<Full<Bytes>>| {
//!     let decoder = decoder.clone();
//!     async move {
//!         let mut data = HashMap::<String, String>::new();
//!         if let Err(e) = decoder.decode_body(Some(req), &mut data).await {
//!             return Reply::new(StatusCode::BAD_REQUEST).with_body(e.to_string());
//!         }
//!         Reply::new(StatusCode::OK).with_body(format!("hello {}", data["name"]))
//!     }
//! })
//! .encoder(json_encoder())
//! .encoder(text_encoder())
//! .build();
//!
//! let req = Request::builder()
//!     .header(ACCEPT, "text/plain")
//!     .body(Full::from(r#"{"name":"world"}"#))
//!     .unwrap();
//!
//! let resp = handler.call(req).await.unwrap();
//! let body = resp.into_body().collect().await.unwrap().to_bytes();
//! assert_eq!(&body[..], b"hello world");
//! # }
//! ```

mod body;
mod error;
mod handler;
mod media_type;
mod registry;
mod reply;

pub mod decoder;
pub mod encoder;
pub mod format;

pub use body::ResponseBody;
pub use decoder::{unmarshaler, BodyDecoder, RequestDecoder, RequestDecoderBuilder, Unmarshaler};
pub use encoder::{marshal_text, marshaler, Marshaler, ResponseEncoder};
pub use error::{BoxError, DecodeError};
pub use handler::{Handler, ResponseHandler, ResponseHandlerBuilder};
pub use media_type::{essence, media_type};
pub use reply::Reply;

/// The `Content-Type` of every plain text response.
pub const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

#[cfg(test)]
mod tests {
    #[test]
    fn plain_text_matches_mime() {
        assert_eq!(super::PLAIN_TEXT, mime::TEXT_PLAIN_UTF_8.as_ref());
    }
}
