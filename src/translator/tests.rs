use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::http_client::{
    ClientConfig, ClientFactory, HttpClient, ResponseBody, TransportRequest, TransportResponse,
};
use crate::rewriter::RewriteRules;
use crate::tls::AcceptInvalidCerts;
use crate::translator::RequestTranslator;
use crate::{CanonicalResponse, Error, ErrorKind, Method, Request, Result};

#[derive(Clone)]
struct Canned {
    code: Option<u16>,
    message: &'static str,
    headers: Vec<(&'static str, &'static str)>,
    body: Option<(&'static str, &'static str)>,
}

#[derive(Default)]
struct Recorded {
    configs: Vec<ClientConfig>,
    requests: Vec<TransportRequest>,
}

#[derive(Clone)]
struct MockTransport {
    canned: Canned,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockTransport {
    fn new(canned: Canned) -> Self {
        MockTransport {
            canned,
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    fn calls(&self) -> usize {
        self.recorded.lock().requests.len()
    }

    fn clients(&self) -> usize {
        self.recorded.lock().configs.len()
    }

    fn last_request(&self) -> TransportRequest {
        self.recorded.lock().requests.last().cloned().unwrap()
    }

    fn last_config(&self) -> ClientConfig {
        self.recorded.lock().configs.last().cloned().unwrap()
    }
}

impl ClientFactory for MockTransport {
    type Client = MockTransport;

    fn create(&self, config: ClientConfig) -> Result<MockTransport> {
        self.recorded.lock().configs.push(config);
        Ok(self.clone())
    }
}

impl HttpClient for MockTransport {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.recorded.lock().requests.push(request);
        let Canned {
            code,
            message,
            headers,
            body,
        } = self.canned.clone();
        Ok(TransportResponse {
            code,
            message: message.to_string(),
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: body.map(|(bytes, content_type)| ResponseBody {
                stream: Box::new(Cursor::new(bytes.as_bytes().to_vec())),
                content_length: Some(bytes.len() as u64),
                content_type: Some(content_type.to_string()),
            }),
        })
    }
}

/// Counts how many executions overlap.
#[derive(Clone, Default)]
struct SlowTransport {
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ClientFactory for SlowTransport {
    type Client = SlowTransport;

    fn create(&self, _config: ClientConfig) -> Result<SlowTransport> {
        Ok(self.clone())
    }
}

impl HttpClient for SlowTransport {
    fn execute(&self, _request: TransportRequest) -> Result<TransportResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(TransportResponse {
            code: Some(200),
            message: "OK".to_string(),
            headers: vec![],
            body: None,
        })
    }
}

fn ok() -> Canned {
    Canned {
        code: Some(200),
        message: "OK",
        headers: vec![
            ("content-type", "application/json"),
            ("x-trace", "1"),
            ("x-trace", "2"),
        ],
        body: Some((r#"{"ok":true}"#, "application/json")),
    }
}

fn translator(canned: Canned) -> (RequestTranslator<MockTransport>, MockTransport) {
    let transport = MockTransport::new(canned);
    (RequestTranslator::with_factory(transport.clone()), transport)
}

fn snapshot(response: CanonicalResponse) -> (String, Vec<(String, String)>, Option<(Vec<u8>, String, Option<u64>)>) {
    let status = response.status_line();
    let headers = response.headers;
    let entity = response.entity.map(|entity| {
        let content_type = entity.content_type.clone();
        let content_length = entity.content_length;
        (entity.into_bytes().unwrap(), content_type, content_length)
    });
    (status, headers, entity)
}

#[test]
fn performs_request() {
    let (translator, transport) = translator(ok());
    let request = Request::new(Method::Post, "http://localhost/items")
        .with_header("A", "1")
        .with_header("B", "2")
        .with_body("application/json", r#"{"id":1}"#)
        .with_timeout_ms(750);
    let additional: HashMap<String, String> = [("B", "3"), ("C", "4")]
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    let response = translator.perform_request(&request, &additional).unwrap();

    assert_eq!(transport.calls(), 1);
    let sent = transport.last_request();
    assert_eq!(sent.method, reqwest::Method::POST);
    assert_eq!(sent.url, "http://localhost/items");
    assert_eq!(
        sent.headers,
        vec![
            ("A".to_string(), "1".to_string()),
            ("B".to_string(), "3".to_string()),
            ("C".to_string(), "4".to_string()),
        ]
    );
    assert_eq!(sent.body.unwrap().bytes, br#"{"id":1}"#.to_vec());
    assert_eq!(sent.cache_control.to_string(), "max-age=0");

    let config = transport.last_config();
    assert_eq!(
        config.connect_timeout,
        Some(std::time::Duration::from_millis(750))
    );
    assert_eq!(config.read_timeout, config.connect_timeout);
    assert!(config.tls.is_none());

    assert_eq!(response.status_code, 200);
    assert_eq!(response.reason, "OK");
    assert_eq!(response.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(response.headers.len(), 3);
    let entity = response.entity.unwrap();
    assert_eq!(entity.content_type, "application");
    assert_eq!(entity.into_bytes().unwrap(), br#"{"ok":true}"#.to_vec());
}

#[test]
fn new_client_per_call() {
    let (translator, transport) = translator(ok());
    let request = Request::new(Method::Get, "http://localhost/");

    translator.perform_request(&request, &HashMap::new()).unwrap();
    translator.perform_request(&request, &HashMap::new()).unwrap();

    assert_eq!(transport.clients(), 2);
    assert_eq!(transport.calls(), 2);
    assert_eq!(translator.factory().calls(), 2);
}

#[test]
fn calls_from_many_threads_run_one_at_a_time() {
    let transport = SlowTransport::default();
    let translator = Arc::new(RequestTranslator::with_factory(transport.clone()));

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let translator = Arc::clone(&translator);
            thread::spawn(move || {
                let request = Request::new(Method::Get, format!("http://localhost/{}", i));
                translator.perform_request(&request, &HashMap::new())
            })
        })
        .collect();
    for worker in workers {
        let response = worker.join().unwrap().unwrap();
        assert_eq!(response.status_code, 200);
    }

    assert_eq!(translator.factory().in_flight.load(Ordering::SeqCst), 0);
    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);
}

#[test]
fn translation_is_repeatable() {
    let (translator, _) = translator(ok());
    let request = Request::new(Method::Get, "http://localhost/")
        .with_header("Accept", "*/*")
        .with_header("X-Id", "7");
    let additional: HashMap<String, String> =
        [("X-Id".to_string(), "8".to_string())].into_iter().collect();

    let first = translator.perform_request(&request, &additional).unwrap();
    let second = translator.perform_request(&request, &additional).unwrap();

    assert_eq!(snapshot(first), snapshot(second));
}

#[test]
fn rejected_url_never_reaches_transport() {
    let (translator, transport) = translator(ok());
    let translator = translator.url_rewriter(RewriteRules::new().block_prefix("http://blocked"));
    let request = Request::new(Method::Get, "http://blocked.example.com/");

    let err = translator
        .perform_request(&request, &HashMap::new())
        .unwrap_err();

    assert!(matches!(err, Error::UrlBlocked(ref url) if url == "http://blocked.example.com/"));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(
        err.to_string(),
        "URL blocked by rewriter: http://blocked.example.com/"
    );
    assert_eq!(transport.clients(), 0);
    assert_eq!(transport.calls(), 0);
}

#[test]
fn rewritten_url_reaches_transport() {
    let (translator, transport) = translator(ok());
    let translator =
        translator.url_rewriter(|url: &str| Some(url.replace("http://", "https://")));

    translator
        .perform_request(
            &Request::new(Method::Get, "http://localhost/a"),
            &HashMap::new(),
        )
        .unwrap();

    assert_eq!(transport.last_request().url, "https://localhost/a");
}

#[test]
fn tls_is_installed_for_https_only() {
    let (translator, transport) = translator(ok());
    let translator = translator.tls(AcceptInvalidCerts);

    translator
        .perform_request(
            &Request::new(Method::Get, "https://localhost/"),
            &HashMap::new(),
        )
        .unwrap();
    assert!(transport.last_config().tls.is_some());

    translator
        .perform_request(
            &Request::new(Method::Get, "http://localhost/"),
            &HashMap::new(),
        )
        .unwrap();
    assert!(transport.last_config().tls.is_none());
}

#[test]
fn unsupported_methods_never_reach_transport() {
    let (translator, transport) = translator(ok());
    for method in [Method::Options, Method::Trace, Method::DeprecatedGetOrPost] {
        let err = translator
            .perform_request(&Request::new(method, "http://localhost/"), &HashMap::new())
            .unwrap_err();
        assert!(err.is_fatal());
    }
    assert_eq!(transport.clients(), 0);
    assert_eq!(transport.calls(), 0);
}

#[test]
fn head_response_has_no_entity() {
    let (translator, _) = translator(ok());
    let response = translator
        .perform_request(&Request::new(Method::Head, "http://localhost/"), &HashMap::new())
        .unwrap();
    assert!(response.entity.is_none());
    assert_eq!(response.header("x-trace"), Some("1"));
}

#[test]
fn no_content_has_no_entity() {
    for code in [100, 204, 304] {
        let (translator, _) = translator(Canned {
            code: Some(code),
            ..ok()
        });
        let response = translator
            .perform_request(&Request::new(Method::Get, "http://localhost/"), &HashMap::new())
            .unwrap();
        assert!(response.entity.is_none(), "{} has an entity", code);
    }
}

#[test]
fn unknown_status_code() {
    let (translator, transport) = translator(Canned { code: None, ..ok() });
    let err = translator
        .perform_request(&Request::new(Method::Get, "http://localhost/"), &HashMap::new())
        .unwrap_err();

    assert!(matches!(err, Error::MissingStatusCode));
    assert_eq!(transport.calls(), 1);
}
