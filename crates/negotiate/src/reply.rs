//! The logical result of a handler call.
//!
//! A [`Reply`] carries a status code, a set of headers and a body value. It does
//! not know how it will be encoded: the [`ResponseHandler`](crate::ResponseHandler)
//! picks the format from the request's `Accept` header once the handler returns.
//!
//! # Example
//! ```
//! use http::StatusCode;
//! use micro_negotiate::Reply;
//! use serde_json::json;
//!
//! let reply = Reply::new(StatusCode::OK)
//!     .with_body(json!({ "Message": "Hello World!" }))
//!     .with_header("Cookie", "key=value;");
//!
//! assert_eq!(reply.headers().get("Cookie").map(String::as_str), Some("key=value;"));
//! ```

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Option<Value>,
    redirect_uri: Option<String>,
}

impl Reply {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HashMap::new(), body: None, redirect_uri: None }
    }

    /// A reply pointing the client at `uri`.
    ///
    /// `status` should be one of the 3xx codes; the target is sent as the
    /// `Location` header.
    pub fn redirect(status: StatusCode, uri: impl Into<String>) -> Self {
        Self::new(status).with_redirect(uri)
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.set_body(body);
        self
    }

    /// Same as [`Reply::with_body`] for any serializable value.
    pub fn try_with_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Sets a header, replacing any value already stored under `key`.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    /// Replaces every header at once.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.set_headers(headers);
        self
    }

    pub fn with_redirect(mut self, uri: impl Into<String>) -> Self {
        self.set_redirect(uri);
        self
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_body(&mut self, body: impl Into<Value>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn set_headers(&mut self, headers: HashMap<String, String>) -> &mut Self {
        self.headers = headers;
        self
    }

    pub fn set_redirect(&mut self, uri: impl Into<String>) -> &mut Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    pub(crate) fn into_parts(self) -> (StatusCode, HashMap<String, String>, Option<Value>, Option<String>) {
        (self.status, self.headers, self.body, self.redirect_uri)
    }
}
