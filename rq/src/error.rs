//! Error types for the request pipeline.
//!
//! # Design
//! Every failure class that can occur along a chain gets its own variant, so
//! a caller inspecting the pipeline after the fact can tell a malformed URL
//! apart from a refused connection or a body that would not decode. Errors
//! are *stored* in the pipeline rather than returned from chaining methods;
//! the propagation policy is "last write wins" unless the writing operation
//! was itself short-circuited.

use std::fmt;

/// Errors recorded by a [`Pipeline`](crate::Pipeline) during a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The endpoint is not a usable URL. Surfaces during dispatch, before
    /// any network I/O is attempted.
    Endpoint(String),

    /// The request payload could not be serialized to JSON.
    Encoding(String),

    /// The response body could not be deserialized into the target type.
    Decoding(String),

    /// The transport failed to complete the round trip — DNS resolution,
    /// connection, TLS, or timeout.
    Transport(String),

    /// The response head arrived but draining the body stream failed.
    Read(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Endpoint(msg) => write!(f, "invalid endpoint: {msg}"),
            Error::Encoding(msg) => write!(f, "encoding failed: {msg}"),
            Error::Decoding(msg) => write!(f, "decoding failed: {msg}"),
            Error::Transport(msg) => write!(f, "transport failed: {msg}"),
            Error::Read(msg) => write!(f, "reading response body failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
