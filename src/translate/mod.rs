//! Conversion between the caller's request/response model and the transport's.
//!
//! Both directions are plain functions so the method table and the response
//! body rules can be exercised without a network.

use crate::http_client::{
    follow_redirects, CacheControl, ClientConfig, RequestBody, TransportRequest,
    TransportResponse,
};
use crate::tls::TlsConfigurator;
use crate::{CanonicalResponse, Entity, Error, LogicalRequest, Method, Result, Version};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;


/// What the transport should do for a given [`Method`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum MethodPlan {
    /// Sent without a body; the request's own body is ignored.
    Bodiless(reqwest::Method),
    /// Sent with the request's body when it has one.
    Bodied(reqwest::Method),
    Unsupported,
}

impl From<Method> for MethodPlan {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => MethodPlan::Bodiless(reqwest::Method::GET),
            Method::Delete => MethodPlan::Bodiless(reqwest::Method::DELETE),
            Method::Head => MethodPlan::Bodiless(reqwest::Method::HEAD),
            Method::Post => MethodPlan::Bodied(reqwest::Method::POST),
            Method::Put => MethodPlan::Bodied(reqwest::Method::PUT),
            Method::Patch => MethodPlan::Bodied(reqwest::Method::PATCH),
            Method::Options | Method::Trace | Method::DeprecatedGetOrPost => {
                MethodPlan::Unsupported
            }
        }
    }
}

/// Request headers overlaid with `additional_headers`; the latter win on collisions.
pub fn merge_headers(
    headers: HashMap<String, String>,
    additional_headers: &HashMap<String, String>,
) -> Vec<(String, String)> {
    let mut merged: BTreeMap<String, String> = headers.into_iter().collect();
    for (name, value) in additional_headers {
        merged.insert(name.clone(), value.clone());
    }
    merged.into_iter().collect()
}

/// Wraps the request body with its declared content type, if there is a body.
pub fn request_body(request: &dyn LogicalRequest) -> Result<Option<RequestBody>> {
    Ok(request.body()?.map(|bytes| RequestBody {
        content_type: parse_content_type(&request.body_content_type()),
        bytes,
    }))
}

fn parse_content_type(content_type: &str) -> Option<String> {
    if media_type(content_type).is_empty() {
        None
    } else {
        Some(content_type.trim().to_string())
    }
}

/// Builds the transport request for `request`, sent to `url`.
///
/// Fails with [`Error::UnsupportedMethod`] before touching the body for
/// methods the transport is never asked to perform.
pub fn to_transport_request(
    request: &dyn LogicalRequest,
    url: String,
    additional_headers: &HashMap<String, String>,
) -> Result<TransportRequest> {
    let headers = merge_headers(request.headers()?, additional_headers);

    let (method, body) = match MethodPlan::from(request.method()) {
        MethodPlan::Bodiless(method) => (method, None),
        MethodPlan::Bodied(method) => (method, request_body(request)?),
        MethodPlan::Unsupported => return Err(Error::UnsupportedMethod(request.method())),
    };

    Ok(TransportRequest {
        url,
        method,
        headers,
        body,
        cache_control: CacheControl::max_age(Duration::from_secs(0)),
    })
}

/// Client settings for one call. A zero timeout means no timeout.
pub fn client_config(
    timeout_ms: u64,
    is_https: bool,
    tls: Option<&Arc<dyn TlsConfigurator>>,
) -> ClientConfig {
    let follow = follow_redirects();
    let timeout = match timeout_ms {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };
    ClientConfig {
        follow_redirects: follow,
        follow_ssl_redirects: follow,
        connect_timeout: timeout,
        read_timeout: timeout,
        tls: if is_https { tls.cloned() } else { None },
    }
}

/// Whether a response to `method` with `status_code` may carry a body
/// (RFC 7230, section 3.3).
pub fn has_response_body(method: Method, status_code: u16) -> bool {
    method != Method::Head
        && !(100..200).contains(&status_code)
        && status_code != 204
        && status_code != 304
}

/// Primary type of a `Content-Type` value: `text` for `text/html; charset=utf-8`.
///
/// Returns an empty string when the value is not of the form `type/subtype`.
pub fn media_type(content_type: &str) -> String {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    match essence.split_once('/') {
        Some((primary, sub))
            if is_token(primary.trim_end()) && is_token(sub.trim_start()) =>
        {
            primary.trim_end().to_ascii_lowercase()
        }
        _ => String::new(),
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

pub fn to_canonical_response(
    method: Method,
    response: TransportResponse,
) -> Result<CanonicalResponse> {
    let TransportResponse {
        code,
        message,
        headers,
        body,
    } = response;
    let status_code = code.ok_or(Error::MissingStatusCode)?;

    let entity = match body {
        Some(body) if has_response_body(method, status_code) => Some(Entity {
            content: body.stream,
            content_length: body.content_length,
            content_type: body
                .content_type
                .as_deref()
                .map(media_type)
                .unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(CanonicalResponse {
        version: Version::Http11,
        status_code,
        reason: message,
        headers,
        entity,
    })
}
