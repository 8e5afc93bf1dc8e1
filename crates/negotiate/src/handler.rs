//! The request adapter: runs a handler returning a [`Reply`] and encodes the
//! reply in the format the client asked for.
//!
//! Negotiation looks at the first media type of the `Accept` header only:
//!
//! 1. an encoder registered for exactly that media type is used;
//! 2. otherwise the first registered encoder is used;
//! 3. with no encoders at all the body is sent as plain text.
//!
//! When the chosen encoder fails, the client gets a plain text `500` carrying
//! the error message instead, without any of the reply's headers.
//!
//! # Example
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use http::{Request, StatusCode};
//! use http_body_util::{BodyExt, Empty};
//! use bytes::Bytes;
//! use micro_negotiate::{marshaler, Handler, Reply, ResponseHandler};
//! use serde_json::{json, Value};
//!
//! async fn hello(_req: Request<Empty<Bytes>>) -> Reply {
//!     Reply::new(StatusCode::OK).with_body(json!({ "Message": "Hello World!" }))
//! }
//!
//! let handler = ResponseHandler::builder(hello)
//!     .encoder(marshaler(mime::APPLICATION_JSON, serde_json::to_vec::<Value>))
//!     .build();
//!
//! let resp = handler.call(Request::new(Empty::new())).await.unwrap();
//! assert_eq!(resp.headers()["content-type"], "application/json");
//!
//! let body = resp.into_body().collect().await.unwrap().to_bytes();
//! assert_eq!(&body[..], br#"{"Message":"Hello World!"}"#);
//! # }
//! ```

use crate::body::ResponseBody;
use crate::encoder::{text_form, Encoders, ResponseEncoder};
use crate::media_type::media_type;
use crate::reply::Reply;
use crate::PLAIN_TEXT;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode};
use http_body::Body;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// What a transport drives once per inbound request.
#[async_trait]
pub trait Handler<ReqBody> {
    type RespBody: Body;
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call(&self, req: Request<ReqBody>) -> Result<Response<Self::RespBody>, Self::Error>;
}

/// Wraps a handler function so that its [`Reply`] gets content negotiated.
///
/// The encoder set is fixed at [`build`](ResponseHandlerBuilder::build) time
/// and shared between clones.
pub struct ResponseHandler<F> {
    f: F,
    encoders: Arc<Encoders>,
}

impl<F> ResponseHandler<F> {
    pub fn builder(f: F) -> ResponseHandlerBuilder<F> {
        ResponseHandlerBuilder { f, encoders: Encoders::new() }
    }

    /// A handler whose replies are always sent as plain text.
    pub fn plain(f: F) -> Self {
        Self::builder(f).build()
    }
}

impl<F: Clone> Clone for ResponseHandler<F> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone(), encoders: Arc::clone(&self.encoders) }
    }
}

impl<F> fmt::Debug for ResponseHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseHandler").field("encoders", &self.encoders).finish_non_exhaustive()
    }
}

pub struct ResponseHandlerBuilder<F> {
    f: F,
    encoders: Encoders,
}

impl<F> ResponseHandlerBuilder<F> {
    /// Registers an encoder; the first one registered becomes the default.
    pub fn encoder(mut self, encoder: impl ResponseEncoder + 'static) -> Self {
        self.encoders.register(Arc::new(encoder));
        self
    }

    pub fn encoders<E, I>(self, encoders: I) -> Self
    where
        E: ResponseEncoder + 'static,
        I: IntoIterator<Item = E>,
    {
        encoders.into_iter().fold(self, |builder, encoder| builder.encoder(encoder))
    }

    /// Registers an already shared encoder.
    pub fn shared_encoder(mut self, encoder: Arc<dyn ResponseEncoder>) -> Self {
        self.encoders.register(encoder);
        self
    }

    pub fn build(self) -> ResponseHandler<F> {
        ResponseHandler { f: self.f, encoders: Arc::new(self.encoders) }
    }
}

impl<F> fmt::Debug for ResponseHandlerBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseHandlerBuilder").field("encoders", &self.encoders).finish_non_exhaustive()
    }
}

#[async_trait]
impl<ReqBody, F, Fut> Handler<ReqBody> for ResponseHandler<F>
where
    ReqBody: Send + 'static,
    F: Fn(Request<ReqBody>) -> Fut + Send + Sync,
    Fut: Future<Output = Reply> + Send,
{
    type RespBody = ResponseBody;
    type Error = Infallible;

    async fn call(&self, req: Request<ReqBody>) -> Result<Response<Self::RespBody>, Self::Error> {
        let accept = media_type(req.headers(), ACCEPT);
        let reply = (self.f)(req).await;
        Ok(negotiate(&self.encoders, &accept, reply))
    }
}

/// Encodes `reply` with the encoder resolved for `accept`.
fn negotiate(encoders: &Encoders, accept: &str, reply: Reply) -> Response<ResponseBody> {
    match encoders.resolve(accept) {
        Some(encoder) => {
            trace!(accept, encoder = %encoder.content_type(), "negotiated response encoder");
            write_encoded(reply, encoder.as_ref())
        }
        None => {
            debug!(accept, "no response encoder configured, sending plain text");
            write_text(reply)
        }
    }
}

fn write_encoded(reply: Reply, encoder: &dyn ResponseEncoder) -> Response<ResponseBody> {
    let (status, headers, body, redirect_uri) = reply.into_parts();
    let bytes = match encoder.marshal(body.as_ref().unwrap_or(&Value::Null)) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(cause = %e, content_type = %encoder.content_type(), "marshal response body error");
            return write_text(Reply::new(StatusCode::INTERNAL_SERVER_ERROR).with_body(e.to_string()));
        }
    };

    let content_type = match HeaderValue::from_str(encoder.content_type().as_ref()) {
        Ok(value) => value,
        Err(e) => {
            warn!(cause = %e, "encoder content type is not a valid header value, sending plain text");
            HeaderValue::from_static(PLAIN_TEXT)
        }
    };

    build_response(status, &headers, redirect_uri.as_deref(), content_type, bytes)
}

fn write_text(reply: Reply) -> Response<ResponseBody> {
    let (status, headers, body, redirect_uri) = reply.into_parts();
    let bytes = body.as_ref().map(text_form).unwrap_or_default();
    build_response(status, &headers, redirect_uri.as_deref(), HeaderValue::from_static(PLAIN_TEXT), bytes)
}

fn build_response(
    status: StatusCode,
    headers: &HashMap<String, String>,
    redirect_uri: Option<&str>,
    content_type: HeaderValue,
    bytes: Bytes,
) -> Response<ResponseBody> {
    let mut response = Response::new(ResponseBody::once(bytes));
    *response.status_mut() = status;

    let header_map = response.headers_mut();
    header_map.reserve(headers.len() + 2);
    copy_headers(headers, header_map);

    if let Some(uri) = redirect_uri {
        if !status.is_redirection() {
            debug!(%status, uri, "redirect target set on a non redirect status");
        }
        match HeaderValue::from_str(uri) {
            Ok(value) => {
                header_map.insert(LOCATION, value);
            }
            Err(e) => warn!(cause = %e, uri, "skip invalid redirect target"),
        }
    }

    header_map.insert(CONTENT_TYPE, content_type);
    response
}

fn copy_headers(headers: &HashMap<String, String>, header_map: &mut HeaderMap) {
    for (key, value) in headers {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                warn!(cause = %e, key, "skip invalid response header name");
                continue;
            }
        };
        let value = match HeaderValue::from_str(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(cause = %e, key, "skip invalid response header value");
                continue;
            }
        };
        header_map.insert(name, value);
    }
}
