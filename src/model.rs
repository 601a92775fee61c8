use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::io::Read;
use std::str::FromStr;

/// Timeout used by [`Request::new`] when the caller does not set one.
pub const DEFAULT_TIMEOUT_MS: u64 = 2500;

/// Body content type used by [`Request::new`] when the caller does not set one.
pub const DEFAULT_BODY_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
    Options,
    Trace,
    /// Picks GET or POST depending on whether a body is present. Never sent.
    DeprecatedGetOrPost,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let method = match *self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::DeprecatedGetOrPost => "DEPRECATED_GET_OR_POST",
        };
        f.write_str(method)
    }
}

/// Numeric method codes as used by request queues that store the method as an integer.
impl TryFrom<i32> for Method {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            -1 => Ok(Method::DeprecatedGetOrPost),
            0 => Ok(Method::Get),
            1 => Ok(Method::Post),
            2 => Ok(Method::Put),
            3 => Ok(Method::Delete),
            4 => Ok(Method::Head),
            5 => Ok(Method::Options),
            6 => Ok(Method::Trace),
            7 => Ok(Method::Patch),
            _ => Err(Error::UnknownMethod(code)),
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "PATCH" => Ok(Method::Patch),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            _ => Err(format!("Unrecognized method '{}'", s)),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Version {
    Http09,
    Http10,
    Http11,
    Http2,
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let version = match *self {
            Version::Http09 => "HTTP/0.9",
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
            Version::Http2 => "HTTP/2.0",
        };
        f.write_str(version)
    }
}

/// The caller's view of a request, as handed over by a dispatch queue.
///
/// `headers` and `body` may need credentials to be produced; when that fails
/// they return [`Error::AuthFailure`], which is passed back to the caller as is.
pub trait LogicalRequest {
    fn method(&self) -> Method;
    fn url(&self) -> &str;
    fn headers(&self) -> Result<HashMap<String, String>>;
    fn body(&self) -> Result<Option<Vec<u8>>>;
    fn body_content_type(&self) -> String;
    fn timeout_ms(&self) -> u64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub body_content_type: String,
    pub timeout_ms: u64,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Request {
        Request {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            body_content_type: String::from(DEFAULT_BODY_CONTENT_TYPE),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Request {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Request {
        self.body_content_type = content_type.into();
        self.body = Some(body.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Request {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl LogicalRequest for Request {
    fn method(&self) -> Method {
        self.method
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn headers(&self) -> Result<HashMap<String, String>> {
        Ok(self.headers.clone())
    }

    fn body(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.body.clone())
    }

    fn body_content_type(&self) -> String {
        self.body_content_type.clone()
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

/// Response body handed back to the caller.
pub struct Entity {
    pub content: Box<dyn Read + Send>,
    /// `None` when the transport did not know the length up front.
    pub content_length: Option<u64>,
    /// Top-level media type only, e.g. `text` for `text/html; charset=utf-8`.
    pub content_type: String,
}

impl Entity {
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.content.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl Debug for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct CanonicalResponse {
    pub version: Version,
    pub status_code: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub entity: Option<Entity>,
}

impl CanonicalResponse {
    /// First value for `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Status line as it would appear on the wire, e.g. `HTTP/1.1 200 OK`.
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            format!("{} {}", self.version, self.status_code)
        } else {
            format!("{} {} {}", self.version, self.status_code, self.reason)
        }
    }
}
