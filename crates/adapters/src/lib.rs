//! Carrier adapters
//!
//! Each carrier module exposes a registration entrypoint returning its
//! [`Metadata`](shipx_types::Metadata). Shared HTTP plumbing lives in
//! [`proxy`], [`http`], [`retry`] and [`client_cache`].

pub mod client_cache;
pub mod dicom;
pub mod fedex;
pub mod http;
pub mod mapping;
pub mod proxy;
pub mod registry;
pub mod retry;

pub use client_cache::{ClientCache, ClientKey, PoolOptions};
pub use http::{HttpAuth, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use proxy::{AdapterOptions, HttpProxy, Route};
pub use registry::{AdapterRegistry, Registration, BUILTIN_ADAPTERS};
pub use retry::{retry_with_backoff, RetryPolicy};
