//! Search backends
//!
//! A backend is the network step of a lookup. The coordinator only knows the
//! [`SearchBackend`] trait, so hosts and tests can swap the transport
//! without touching the caching logic.

use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::error::FetchError;

/// Query parameter carrying the search string
pub const QUERY_PARAM: &str = "q";

/// Performs the remote lookup for a query
pub trait SearchBackend: Send + Sync {
    /// Start a lookup of `query` against `endpoint`.
    ///
    /// The returned future runs on the worker's runtime.
    fn request(&self, endpoint: &str, query: &str) -> BoxFuture<'static, Result<Value, FetchError>>;
}

/// Default backend: `GET <endpoint>?q=<query>` expecting a JSON body
#[derive(Debug, Clone, Default)]
pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl SearchBackend for HttpBackend {
    fn request(&self, endpoint: &str, query: &str) -> BoxFuture<'static, Result<Value, FetchError>> {
        let request = self
            .client
            .get(endpoint)
            .query(&[(QUERY_PARAM, query)])
            .header(ACCEPT, "application/json");

        async move {
            let response = request
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            if !response.status().is_success() {
                let code = response.status().as_u16();
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(FetchError::Status { code, message });
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| FetchError::Parse(e.to_string()))
        }
        .boxed()
    }
}

/// Backend built from a closure taking `(endpoint, query)`
pub struct FnBackend<F>(pub F);

impl<F, Fut> SearchBackend for FnBackend<F>
where
    F: Fn(String, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, FetchError>> + Send + 'static,
{
    fn request(&self, endpoint: &str, query: &str) -> BoxFuture<'static, Result<Value, FetchError>> {
        (self.0)(endpoint.to_string(), query.to_string()).boxed()
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod backend_tests;
