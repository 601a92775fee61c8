use crate::tls::TlsConfigurator;
use crate::Result;
use ::reqwest::Method;
use std::fmt::{self, Debug, Display, Formatter};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;


pub mod reqwest;

static FOLLOW_REDIRECTS: AtomicBool = AtomicBool::new(true);

/// Process-wide redirect policy. Every client built after this call picks it up.
pub fn set_follow_redirects(follow: bool) {
    FOLLOW_REDIRECTS.store(follow, Ordering::SeqCst);
}

pub fn follow_redirects() -> bool {
    FOLLOW_REDIRECTS.load(Ordering::SeqCst)
}

pub trait HttpClient {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Builds one transport client per request.
pub trait ClientFactory: Send + Sync {
    type Client: HttpClient;

    fn create(&self, config: ClientConfig) -> Result<Self::Client>;
}

#[derive(Clone)]
pub struct ClientConfig {
    pub follow_redirects: bool,
    /// Whether redirects that switch between `http` and `https` are followed.
    pub follow_ssl_redirects: bool,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub tls: Option<Arc<dyn TlsConfigurator>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            follow_ssl_redirects: true,
            connect_timeout: None,
            read_timeout: None,
            tls: None,
        }
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("follow_redirects", &self.follow_redirects)
            .field("follow_ssl_redirects", &self.follow_ssl_redirects)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheControl {
    pub max_age: Duration,
}

impl CacheControl {
    pub fn max_age(max_age: Duration) -> Self {
        Self { max_age }
    }
}

impl Display for CacheControl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "max-age={}", self.max_age.as_secs())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub cache_control: CacheControl,
}

impl TransportRequest {
    pub fn is_https(&self) -> bool {
        ::reqwest::Url::parse(&self.url)
            .map(|url| url.scheme() == "https")
            .unwrap_or(false)
    }
}

pub struct ResponseBody {
    pub stream: Box<dyn Read + Send>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

impl Debug for ResponseBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct TransportResponse {
    /// `None` when the transport could not determine a status code.
    pub code: Option<u16>,
    pub message: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<ResponseBody>,
}
