use crate::http_client::{
    ClientConfig, ClientFactory, HttpClient, ResponseBody, TransportRequest, TransportResponse,
};
use crate::{Error, Result};
use hyper::ext::ReasonPhrase;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::redirect::Policy;
use tracing::debug;

/// Upper bound on redirect hops for a single request.
pub const MAX_REDIRECTS: usize = 20;

pub struct ReqwestHttpClient {
    client: Client,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestClientFactory;

impl ClientFactory for ReqwestClientFactory {
    type Client = ReqwestHttpClient;

    fn create(&self, config: ClientConfig) -> Result<ReqwestHttpClient> {
        ReqwestHttpClient::create(config)
    }
}

impl ReqwestHttpClient {
    pub fn create(config: ClientConfig) -> Result<ReqwestHttpClient> {
        let ClientConfig {
            follow_redirects,
            follow_ssl_redirects,
            connect_timeout,
            read_timeout,
            tls,
        } = config;

        let mut builder = Client::builder()
            .redirect(redirect_policy(follow_redirects, follow_ssl_redirects))
            .timeout(read_timeout);
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(tls) = tls {
            builder = tls.configure(builder);
        }

        Ok(ReqwestHttpClient {
            client: builder.build()?,
        })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let TransportRequest {
            url,
            method,
            headers,
            body,
            cache_control,
        } = request;

        let mut header_map = header_map(&headers)?;
        header_map.append(CACHE_CONTROL, header_value(&cache_control.to_string())?);

        let mut request_builder = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            if let Some(content_type) = &body.content_type {
                header_map.insert(CONTENT_TYPE, header_value(content_type)?);
            }
            request_builder = request_builder.body(body.bytes);
        }
        request_builder = set_headers(header_map, request_builder);

        debug!(%method, %url, "sending request");
        let response = request_builder.send()?;
        debug!(status = %response.status(), %url, "received response");

        Ok(response.into())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(value.to_string()))
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut header_map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|_| Error::InvalidHeader(name.clone()))?;
        header_map.append(name, header_value(value)?);
    }
    Ok(header_map)
}

fn set_headers(headers: HeaderMap, request_builder: RequestBuilder) -> RequestBuilder {
    if headers.is_empty() {
        request_builder
    } else {
        request_builder.headers(headers)
    }
}

fn redirect_policy(follow_redirects: bool, follow_ssl_redirects: bool) -> Policy {
    if !follow_redirects {
        return Policy::none();
    }
    Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let changes_scheme = attempt
            .previous()
            .last()
            .map(|previous| previous.scheme() != attempt.url().scheme())
            .unwrap_or(false);
        if changes_scheme && !follow_ssl_redirects {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

impl From<reqwest::blocking::Response> for TransportResponse {
    fn from(response: reqwest::blocking::Response) -> Self {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let content_length = response.content_length();
        // hyper only records the phrase when it differs from the canonical one
        let message = match response.extensions().get::<ReasonPhrase>() {
            Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
            None => status.canonical_reason().unwrap_or("").to_string(),
        };

        TransportResponse {
            code: Some(status.as_u16()),
            message,
            headers,
            body: Some(ResponseBody {
                stream: Box::new(response),
                content_length,
                content_type,
            }),
        }
    }
}
