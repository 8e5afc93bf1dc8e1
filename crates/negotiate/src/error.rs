use bytes::Bytes;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while turning a request body into a typed value.
///
/// Once the body has been read, the raw bytes travel with the error so the
/// caller can still log or inspect the original payload.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("read request body error: {source}")]
    ReadBody { source: BoxError },

    #[error("unmarshal request body error: {source}")]
    Unmarshal { raw: Bytes, source: BoxError },

    #[error("request body does not fit the target type: {source}")]
    Deserialize {
        raw: Bytes,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    pub fn read_body<E: Into<BoxError>>(e: E) -> Self {
        Self::ReadBody { source: e.into() }
    }

    pub fn unmarshal<E: Into<BoxError>>(raw: Bytes, e: E) -> Self {
        Self::Unmarshal { raw, source: e.into() }
    }

    pub fn deserialize(raw: Bytes, source: serde_json::Error) -> Self {
        Self::Deserialize { raw, source }
    }

    /// The body bytes that were read before decoding failed, if any.
    pub fn raw_body(&self) -> Option<&Bytes> {
        match self {
            Self::ReadBody { .. } => None,
            Self::Unmarshal { raw, .. } | Self::Deserialize { raw, .. } => Some(raw),
        }
    }
}
