//! Fluent, error-forwarding HTTP request pipeline.
//!
//! # Overview
//! A [`Pipeline`] accumulates request configuration through chained calls,
//! performs exactly one blocking round trip per verb call, and exposes the
//! captured response for decoding:
//!
//! ```no_run
//! use rq::Pipeline;
//!
//! #[derive(serde::Serialize, serde::Deserialize, Default)]
//! struct Product { name: String, price: u32 }
//!
//! // Fetch and decode.
//! let mut product = Product::default();
//! let p = Pipeline::new("my-api.test/product/1").get().to_json(&mut product);
//!
//! // Send JSON.
//! let p = Pipeline::new("my-api.test/product").json(&product).post();
//! if let Some(err) = p.error() {
//!     eprintln!("request failed: {err}");
//! }
//! ```
//!
//! # Design
//! - Failures are stored in the pipeline, not returned from chaining calls;
//!   the verb methods are the short-circuit point — after a failure they
//!   make no network call at all. See [`Pipeline`] for the exact gating
//!   rules, which are deliberately asymmetric.
//! - The transport is an injected collaborator behind the [`Transport`]
//!   trait; [`UreqTransport`] is the blocking default, created per pipeline
//!   at construction so no state is shared between instances.
//! - Everything is synchronous and single-owner: one pipeline, one caller,
//!   one round trip per dispatch.

pub mod error;
pub mod pipeline;
pub mod transport;

pub use error::Error;
pub use pipeline::Pipeline;
pub use transport::{Cookie, Method, Request, Response, Transport, UreqTransport};
