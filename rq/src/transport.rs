//! Transport boundary: plain-data request/response types and the trait the
//! pipeline dispatches through.
//!
//! # Design
//! A [`Request`] is fully constructed data — method, absolute URL, already
//! comma-joined headers, cookies, payload. A [`Transport`] sends it
//! synchronously and hands back the response *head* plus the still-open body
//! stream, so the pipeline can tell a failed round trip apart from a failed
//! body read and can release the stream by letting it go out of scope.
//!
//! [`UreqTransport`] is the default implementation. Non-2xx statuses are
//! returned as data, never as errors; status interpretation belongs to the
//! caller.

use std::io::Read;

use crate::error::Error;

/// HTTP method for a dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
        }
    }
}

/// A request cookie, or one parsed back out of a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Parse a `name=value` pair, ignoring any `; `-separated attributes
    /// after it (`Path`, `HttpOnly`, ...). Returns `None` when there is no
    /// `=` or the name is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let pair = s.split(';').next().unwrap_or("").trim();
        let (name, value) = pair.split_once('=')?;
        if name.is_empty() {
            return None;
        }
        Some(Cookie::new(name.trim(), value.trim()))
    }
}

/// An outgoing HTTP request described as plain data.
///
/// Built by the pipeline's dispatch step. Header values are already joined,
/// one entry per name; cookies travel separately and are attached by the
/// transport as a `Cookie` header.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<Cookie>,
    pub body: Option<Vec<u8>>,
}

/// The head of an HTTP response: status and headers, body read separately.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// First header value recorded under `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Cookies the server set, one per `Set-Cookie` header, in arrival order.
    pub fn cookies(&self) -> Vec<Cookie> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("set-cookie"))
            .filter_map(|(_, v)| Cookie::parse(v))
            .collect()
    }
}

/// Synchronous HTTP transport collaborator.
///
/// Sends a fully-constructed [`Request`] and returns the response head plus
/// the open body stream, or [`Error::Transport`] when the round trip itself
/// fails (DNS, connection, TLS, timeout).
pub trait Transport {
    fn send(&self, req: &Request) -> Result<(Response, Box<dyn Read>), Error>;
}

/// Default transport backed by a [`ureq::Agent`].
///
/// The agent is configured with `http_status_as_error(false)` so 4xx/5xx
/// responses come back as data rather than `Err`, leaving status
/// interpretation to the pipeline's caller.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap a caller-configured agent. Timeouts and other deadlines live on
    /// the agent; the pipeline itself exposes no cancellation. The agent
    /// should keep `http_status_as_error` disabled, or non-2xx responses
    /// will surface as transport errors.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Join cookies into a single `Cookie` header value.
fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Copy the request's headers and cookies onto a ureq builder, in either
/// typestate.
fn attach<Any>(
    mut builder: ureq::RequestBuilder<Any>,
    req: &Request,
) -> ureq::RequestBuilder<Any> {
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if !req.cookies.is_empty() {
        builder = builder.header("Cookie", cookie_header(&req.cookies));
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, req: &Request) -> Result<(Response, Box<dyn Read>), Error> {
        let url = &req.url;
        let result = match (req.method, &req.body) {
            // Bodyless round trips for the verbs that normally carry none.
            (Method::Get, None) => attach(self.agent.get(url), req).call(),
            (Method::Delete, None) => attach(self.agent.delete(url), req).call(),
            (Method::Head, None) => attach(self.agent.head(url), req).call(),
            // The pipeline does not forbid a payload on these verbs, so
            // honor one when present.
            (Method::Get, Some(body)) => {
                attach(self.agent.get(url), req).force_send_body().send(&body[..])
            }
            (Method::Delete, Some(body)) => {
                attach(self.agent.delete(url), req).force_send_body().send(&body[..])
            }
            (Method::Head, Some(body)) => {
                attach(self.agent.head(url), req).force_send_body().send(&body[..])
            }
            (Method::Post, Some(body)) => attach(self.agent.post(url), req).send(&body[..]),
            (Method::Post, None) => attach(self.agent.post(url), req).send_empty(),
            (Method::Put, Some(body)) => attach(self.agent.put(url), req).send(&body[..]),
            (Method::Put, None) => attach(self.agent.put(url), req).send_empty(),
            (Method::Patch, Some(body)) => attach(self.agent.patch(url), req).send(&body[..]),
            (Method::Patch, None) => attach(self.agent.patch(url), req).send_empty(),
        };

        let response = result.map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.into_body().into_reader();

        Ok((Response { status, headers }, Box::new(body)))
    }
}
