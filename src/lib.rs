//! # http-stack
//!
//! http-stack sits between a request dispatch queue and an HTTP transport. The
//! queue describes what it wants (method, URL, headers, body and timeout) as a
//! [`LogicalRequest`]; the [`RequestTranslator`] turns that into a transport
//! call, runs it, and hands back a [`CanonicalResponse`].
//!
//! ## Usage
//!
//! ```no_run
//! use http_stack::{Method, Request, RequestTranslator};
//! use std::collections::HashMap;
//!
//! let translator = RequestTranslator::new();
//! let request = Request::new(Method::Post, "http://httpbin.org/post")
//!     .with_header("Accept", "application/json")
//!     .with_body("application/json", r#"{"id": 42}"#)
//!     .with_timeout_ms(5000);
//!
//! let response = translator.perform_request(&request, &HashMap::new())?;
//! println!("{}", response.status_line());
//! # Ok::<(), http_stack::Error>(())
//! ```
//!
//! ### What gets sent
//!
//! - The request's headers, overlaid with the additional headers passed to
//!   [`RequestTranslator::perform_request`]. The additional ones win.
//! - `Cache-Control: max-age=0`, always.
//! - A body only for POST, PUT and PATCH, and only when the request has one.
//!
//! OPTIONS, TRACE and the legacy GET-or-POST method are refused before any
//! client is built.
//!
//! ### What comes back
//!
//! Status code, reason phrase and every response header in the order the
//! transport reported them. The body is attached as an [`Entity`] unless the
//! request was HEAD or the status is 1xx, 204 or 304.
//!
//! ### Hooks
//!
//! - [`rewriter::UrlRewriter`] can replace or block URLs before anything is sent.
//! - [`tls::TlsConfigurator`] adjusts the client used for `https` URLs.
//! - [`http_client::set_follow_redirects`] controls redirects for every client.
//!
//! ## License
//! [Apache License 2.0](https://github.com/bayne/http-stack/blob/master/LICENSE)

pub mod error;
pub mod http_client;
pub mod model;
pub mod output;
pub mod rewriter;
pub mod tls;
pub mod translate;
pub mod translator;

pub use error::{Error, ErrorKind, Result};
pub use model::{CanonicalResponse, Entity, LogicalRequest, Method, Request, Version};
pub use translator::RequestTranslator;
