use crate::http_client::reqwest::ReqwestClientFactory;
use crate::http_client::{ClientFactory, HttpClient};
use crate::rewriter::{Passthrough, UrlRewriter};
use crate::tls::TlsConfigurator;
use crate::translate::{client_config, to_canonical_response, to_transport_request};
use crate::{CanonicalResponse, Error, LogicalRequest, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// Runs logical requests through a transport client, one at a time.
///
/// The rewriter and TLS configurator are fixed at construction. Every call
/// builds a fresh client from the factory.
pub struct RequestTranslator<F = ReqwestClientFactory> {
    factory: F,
    url_rewriter: Box<dyn UrlRewriter>,
    tls: Option<Arc<dyn TlsConfigurator>>,
    lock: Mutex<()>,
}

impl RequestTranslator {
    pub fn new() -> Self {
        Self::with_factory(ReqwestClientFactory)
    }
}

impl Default for RequestTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ClientFactory> RequestTranslator<F> {
    pub fn with_factory(factory: F) -> Self {
        RequestTranslator {
            factory,
            url_rewriter: Box::new(Passthrough),
            tls: None,
            lock: Mutex::new(()),
        }
    }

    pub fn url_rewriter(mut self, url_rewriter: impl UrlRewriter + 'static) -> Self {
        self.url_rewriter = Box::new(url_rewriter);
        self
    }

    /// TLS settings for `https` URLs; plain `http` requests never see them.
    pub fn tls(mut self, tls: impl TlsConfigurator + 'static) -> Self {
        self.tls = Some(Arc::new(tls));
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn perform_request(
        &self,
        request: &dyn LogicalRequest,
        additional_headers: &HashMap<String, String>,
    ) -> Result<CanonicalResponse> {
        let _guard = self.lock.lock();

        let original_url = request.url();
        let url = match self.url_rewriter.rewrite_url(original_url) {
            Some(url) => url,
            None => {
                warn!(url = %original_url, "request blocked by URL rewriter");
                return Err(Error::UrlBlocked(original_url.to_string()));
            }
        };

        let transport_request = to_transport_request(request, url, additional_headers)?;
        let config = client_config(
            request.timeout_ms(),
            transport_request.is_https(),
            self.tls.as_ref(),
        );
        debug!(
            method = %request.method(),
            url = %transport_request.url,
            ?config,
            "performing request"
        );

        let client = self.factory.create(config)?;
        let response = client.execute(transport_request)?;

        to_canonical_response(request.method(), response)
    }
}
