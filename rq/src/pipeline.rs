//! The request pipeline: one mutable value that accumulates configuration,
//! performs a single dispatch, and exposes the captured response.
//!
//! # Design
//! Every chaining method takes the pipeline by value and returns it, so calls
//! compose left-to-right without hidden copies that could drop the stored
//! error. Failures are recorded in an error slot instead of being returned;
//! the gating rules are deliberately asymmetric and part of the observable
//! contract:
//!
//! - configuration setters always run, even after a failure (a later setter
//!   may overwrite the stored error with a new one),
//! - dispatch is the one step that checks the slot first — with an error
//!   present it returns unchanged and the transport is never invoked,
//! - [`Pipeline::to_json`] checks first and no-ops after a failure, while
//!   [`Pipeline::to_text`] copies whatever bytes exist unconditionally.
//!
//! [`Pipeline::endpoint`] and [`Pipeline::transport`] remain effective after
//! a failure on purpose: retargeting a degraded pipeline is allowed, clearing
//! its error is not. Only constructing a fresh pipeline resets the error.

use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::transport::{Cookie, Method, Request, Response, Transport, UreqTransport};

/// Prepend the insecure scheme unless one is already present.
fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

/// Reject URLs that cannot name a host, before any I/O is attempted.
fn validate_endpoint(url: &str) -> Result<(), Error> {
    if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::Endpoint(format!(
            "whitespace or control character in {url:?}"
        )));
    }
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);
    let host = rest.split('/').next().unwrap_or("");
    if host.is_empty() {
        return Err(Error::Endpoint("empty host".to_string()));
    }
    Ok(())
}

/// A fluent HTTP request pipeline.
///
/// Configure with the setters, dispatch with exactly one verb method, then
/// read the result:
///
/// ```no_run
/// use rq::Pipeline;
///
/// let mut body = String::new();
/// let p = Pipeline::new("example.com/health").get().to_text(&mut body);
/// if let Some(err) = p.error() {
///     eprintln!("request failed: {err}");
/// }
/// ```
///
/// Each instance owns its entire state and is intended as a per-request,
/// single-owner value; nothing is shared between pipelines.
pub struct Pipeline {
    endpoint: String,
    body: Option<Vec<u8>>,
    err: Option<Error>,
    headers: Vec<(String, Vec<String>)>,
    cookies: Vec<Cookie>,
    transport: Box<dyn Transport>,
    response: Option<Response>,
    response_body: Option<Vec<u8>>,
}

impl Pipeline {
    /// Create a pipeline targeting `endpoint`. A missing `http://` or
    /// `https://` prefix is filled in with `http://`. Never fails; a
    /// malformed endpoint surfaces as [`Error::Endpoint`] at dispatch.
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: normalize_endpoint(endpoint),
            body: None,
            err: None,
            headers: Vec::new(),
            cookies: Vec::new(),
            transport: Box::new(UreqTransport::new()),
            response: None,
            response_body: None,
        }
    }

    /// Retarget the pipeline, with the same normalization as [`Pipeline::new`].
    /// Effective even when an error is already stored.
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = normalize_endpoint(endpoint);
        self
    }

    /// Replace the transport. Effective even when an error is already stored.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Box::new(transport);
        self
    }

    /// Serialize `value` to JSON as the request payload and set
    /// `Content-Type: application/json`. A serialization failure stores
    /// [`Error::Encoding`] — overwriting any earlier error, since setters do
    /// not gate on the error slot — and leaves the pending payload unchanged.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Some(bytes);
                self.set_header("Content-Type", "application/json");
            }
            Err(e) => self.err = Some(Error::Encoding(e.to_string())),
        }
        self
    }

    /// Use `text` as the request payload and set `Content-Type: text/plain`.
    pub fn text(mut self, text: &str) -> Self {
        self.body = Some(text.as_bytes().to_vec());
        self.set_header("Content-Type", "text/plain");
        self
    }

    /// Set `name` to `value`, replacing every value previously recorded
    /// under that name (compared case-insensitively).
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    /// Add `value` under `name` without replacing earlier ones. Multiple
    /// values for one name are comma-joined at dispatch.
    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        match self.header_entry(name) {
            Some(values) => values.push(value.to_string()),
            None => self
                .headers
                .push((name.to_string(), vec![value.to_string()])),
        }
        self
    }

    /// Append one cookie to the outgoing set.
    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Replace the whole outgoing cookie set.
    pub fn cookies(mut self, cookies: Vec<Cookie>) -> Self {
        self.cookies = cookies;
        self
    }

    fn header_entry(&mut self, name: &str) -> Option<&mut Vec<String>> {
        self.headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, values)| values)
    }

    fn set_header(&mut self, name: &str, value: &str) {
        match self.header_entry(name) {
            Some(values) => {
                values.clear();
                values.push(value.to_string());
            }
            None => self
                .headers
                .push((name.to_string(), vec![value.to_string()])),
        }
    }

    /// Dispatch with GET.
    pub fn get(self) -> Self {
        self.fetch(Method::Get)
    }

    /// Dispatch with POST.
    pub fn post(self) -> Self {
        self.fetch(Method::Post)
    }

    /// Dispatch with PUT.
    pub fn put(self) -> Self {
        self.fetch(Method::Put)
    }

    /// Dispatch with DELETE.
    pub fn delete(self) -> Self {
        self.fetch(Method::Delete)
    }

    /// Dispatch with HEAD.
    pub fn head(self) -> Self {
        self.fetch(Method::Head)
    }

    /// Dispatch with PATCH.
    pub fn patch(self) -> Self {
        self.fetch(Method::Patch)
    }

    /// Perform the single round trip for this chain.
    ///
    /// With an error already stored this returns immediately — no request is
    /// built and the transport is never invoked. A transport failure leaves
    /// any previously captured response untouched; a body-read failure keeps
    /// the freshly captured head so status and headers stay inspectable. The
    /// body stream is released when it falls out of scope, whatever the read
    /// outcome.
    fn fetch(mut self, method: Method) -> Self {
        if self.err.is_some() {
            return self;
        }
        if let Err(e) = validate_endpoint(&self.endpoint) {
            self.err = Some(e);
            return self;
        }
        let req = Request {
            method,
            url: self.endpoint.clone(),
            headers: self
                .headers
                .iter()
                .map(|(name, values)| (name.clone(), values.join(",")))
                .collect(),
            cookies: self.cookies.clone(),
            body: self.body.clone(),
        };
        match self.transport.send(&req) {
            Ok((response, mut stream)) => {
                self.response = Some(response);
                let mut buf = Vec::new();
                let read = stream.read_to_end(&mut buf);
                self.response_body = Some(buf);
                if let Err(e) = read {
                    self.err = Some(Error::Read(e.to_string()));
                }
            }
            Err(e) => self.err = Some(e),
        }
        self
    }

    /// Deserialize the captured response body into `target`. No-op when an
    /// error is already stored; a deserialization failure stores
    /// [`Error::Decoding`].
    pub fn to_json<T: DeserializeOwned>(mut self, target: &mut T) -> Self {
        if self.err.is_some() {
            return self;
        }
        let bytes = self.response_body.as_deref().unwrap_or_default();
        match serde_json::from_slice(bytes) {
            Ok(value) => *target = value,
            Err(e) => self.err = Some(Error::Decoding(e.to_string())),
        }
        self
    }

    /// Overwrite `target` with the captured response body as text, lossily
    /// decoded. Runs even when an error is stored; with nothing captured the
    /// target becomes empty. Never fails.
    pub fn to_text(self, target: &mut String) -> Self {
        let bytes = self.response_body.as_deref().unwrap_or_default();
        *target = String::from_utf8_lossy(bytes).into_owned();
        self
    }

    /// Status code of the last captured response, `None` before any
    /// successful dispatch.
    pub fn status_code(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    /// The last captured response head, if any.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Bytes of the last captured response body; empty when none was
    /// captured.
    pub fn response_body(&self) -> &[u8] {
        self.response_body.as_deref().unwrap_or_default()
    }

    /// The stored error, if any operation in the chain failed.
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Consume the pipeline into a `Result`, for call sites that prefer `?`
    /// over inspecting the error slot.
    pub fn into_result(self) -> Result<Self, Error> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(self),
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("endpoint", &self.endpoint)
            .field("body", &self.body)
            .field("err", &self.err)
            .field("headers", &self.headers)
            .field("cookies", &self.cookies)
            .field("response", &self.response)
            .field("response_body", &self.response_body)
            .finish_non_exhaustive()
    }
}
