//! Nested reply model handed over by the transport.
//!
//! The transport owns framing; by the time a reply reaches this crate it is a
//! tree of integers, byte strings and arrays. Helpers here narrow a [`Reply`]
//! to the shape a decoder expects and report a [`ProtocolError`] otherwise.

use bytes::Bytes;
use serde::Serialize;

use crate::error::ProtocolError;

/// One node of a transport reply.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "t", content = "v")]
pub enum Reply {
    /// Null bulk string or null array.
    Nil,
    /// Integer reply.
    Integer(i64),
    /// Native double reply.
    Double(f64),
    /// Bulk string.
    Bulk(Bytes),
    /// Simple status string such as `OK`.
    Status(String),
    /// Error reply. Servers embed these as the last element of a query reply
    /// when evaluation fails after the header was produced.
    Error(String),
    /// Nested array.
    Array(Vec<Reply>),
}

impl Reply {
    /// Builds a bulk reply from UTF-8 text.
    pub fn text(value: impl AsRef<str>) -> Self {
        Reply::Bulk(Bytes::copy_from_slice(value.as_ref().as_bytes()))
    }

    /// Builds an array reply.
    pub fn array(items: impl IntoIterator<Item = Reply>) -> Self {
        Reply::Array(items.into_iter().collect())
    }

    /// Returns the error text when this reply is an error.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Reply::Error(message) => Some(message),
            _ => None,
        }
    }

    pub(crate) fn into_array(self, context: &'static str) -> Result<Vec<Reply>, ProtocolError> {
        match self {
            Reply::Array(items) => Ok(items),
            Reply::Nil => Ok(Vec::new()),
            _ => Err(ProtocolError::UnexpectedShape {
                expected: "array",
                context,
            }),
        }
    }

    /// Splits an array reply into exactly `N` elements.
    pub(crate) fn into_tuple<const N: usize>(
        self,
        context: &'static str,
    ) -> Result<[Reply; N], ProtocolError> {
        let items = self.into_array(context)?;
        let found = items.len();
        items.try_into().map_err(|_| ProtocolError::Arity {
            expected: N,
            found,
            context,
        })
    }

    pub(crate) fn as_integer(&self, context: &'static str) -> Result<i64, ProtocolError> {
        match self {
            Reply::Integer(value) => Ok(*value),
            _ => Err(ProtocolError::UnexpectedShape {
                expected: "integer",
                context,
            }),
        }
    }

    /// Non-negative integer used to index a schema list.
    pub(crate) fn as_index(&self, context: &'static str) -> Result<usize, ProtocolError> {
        let raw = self.as_integer(context)?;
        usize::try_from(raw).map_err(|_| ProtocolError::InvalidNumber {
            text: raw.to_string(),
            context,
        })
    }

    pub(crate) fn as_text(&self, context: &'static str) -> Result<&str, ProtocolError> {
        match self {
            Reply::Bulk(bytes) => {
                std::str::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8(context))
            }
            Reply::Status(text) => Ok(text),
            _ => Err(ProtocolError::UnexpectedShape {
                expected: "string",
                context,
            }),
        }
    }

    pub(crate) fn into_text(self, context: &'static str) -> Result<String, ProtocolError> {
        match self {
            Reply::Bulk(bytes) => {
                String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8(context))
            }
            Reply::Status(text) => Ok(text),
            _ => Err(ProtocolError::UnexpectedShape {
                expected: "string",
                context,
            }),
        }
    }

    /// Reads a double sent either as text or natively.
    pub(crate) fn as_f64(&self, context: &'static str) -> Result<f64, ProtocolError> {
        match self {
            Reply::Double(value) => Ok(*value),
            Reply::Integer(value) => Ok(*value as f64),
            _ => {
                let text = self.as_text(context)?;
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| ProtocolError::InvalidNumber {
                        text: text.to_owned(),
                        context,
                    })
            }
        }
    }
}

impl From<i64> for Reply {
    fn from(value: i64) -> Self {
        Reply::Integer(value)
    }
}

impl From<&str> for Reply {
    fn from(value: &str) -> Self {
        Reply::text(value)
    }
}

impl From<Vec<Reply>> for Reply {
    fn from(items: Vec<Reply>) -> Self {
        Reply::Array(items)
    }
}
