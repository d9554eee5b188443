//! Fetch Worker Thread
//!
//! Runs backend lookups off the widget's thread. Requests arrive over an
//! unbounded tokio channel and each one becomes its own task, so slow and
//! fast lookups overlap and complete in whatever order they settle.
//! Responses go back over a std channel that the coordinator polls.
//!
//! Uses a current-thread tokio runtime. Cancelling the token stops the loop
//! and resolves every in-flight lookup as [`FetchResponse::Cancelled`]. A
//! lookup that panics resolves as [`FetchError::Panicked`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::backend::SearchBackend;
use super::types::{FetchRequest, FetchResponse, WORKER_REQUEST_ID};
use crate::error::FetchError;

/// Spawn the fetch worker thread
///
/// # Arguments
/// * `backend` - Capability that performs each lookup
/// * `endpoint` - Endpoint passed through to the backend
/// * `request_rx` - Channel to receive requests
/// * `response_tx` - Channel to send responses
/// * `cancel_token` - Shuts the worker down when cancelled
pub fn spawn_worker(
    backend: Arc<dyn SearchBackend>,
    endpoint: String,
    request_rx: UnboundedReceiver<FetchRequest>,
    response_tx: Sender<FetchResponse>,
    cancel_token: CancellationToken,
) {
    std::thread::spawn(move || {
        let panic_tx = response_tx.clone();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create fetch worker runtime: {}", e);
                    let _ = response_tx.send(FetchResponse::Error {
                        error: FetchError::Network(format!("worker runtime failed: {}", e)),
                        query: String::new(),
                        request_id: WORKER_REQUEST_ID,
                    });
                    return;
                }
            };

            rt.block_on(worker_loop(
                backend,
                endpoint,
                request_rx,
                response_tx,
                cancel_token,
            ));
        }));

        if let Err(e) = result {
            let panic_msg = panic_message(e.as_ref());
            log::error!("Fetch worker thread panicked: {}", panic_msg);

            // Use request_id = 0 to indicate worker-level error
            let _ = panic_tx.send(FetchResponse::Error {
                error: FetchError::Network(format!("worker crashed: {}", panic_msg)),
                query: String::new(),
                request_id: WORKER_REQUEST_ID,
            });
        }
    });
}

/// Main worker loop - dispatches requests until the channel closes or the
/// token is cancelled
async fn worker_loop(
    backend: Arc<dyn SearchBackend>,
    endpoint: String,
    mut request_rx: UnboundedReceiver<FetchRequest>,
    response_tx: Sender<FetchResponse>,
    cancel_token: CancellationToken,
) {
    #[cfg(debug_assertions)]
    log::debug!("Fetch worker started for endpoint {:?}", endpoint);
    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => break,

            // Reap finished lookups
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}

            request = request_rx.recv() => {
                let Some(request) = request else {
                    break;
                };

                #[cfg(debug_assertions)]
                log::debug!(
                    "Worker received request {}: {}",
                    request.request_id,
                    request.query
                );

                let lookup = start_lookup(backend.as_ref(), &endpoint, &request);
                tasks.spawn(handle_request(
                    lookup,
                    request,
                    cancel_token.clone(),
                    response_tx.clone(),
                ));
            }
        }
    }

    // In-flight lookups still report; cancelled ones finish immediately
    while tasks.join_next().await.is_some() {}

    #[cfg(debug_assertions)]
    log::debug!("Fetch worker shutting down");
}

/// Ask the backend for a lookup future, turning a panic into a failed lookup
fn start_lookup(
    backend: &dyn SearchBackend,
    endpoint: &str,
    request: &FetchRequest,
) -> BoxFuture<'static, Result<Value, FetchError>> {
    match panic::catch_unwind(AssertUnwindSafe(|| backend.request(endpoint, &request.query))) {
        Ok(lookup) => lookup,
        Err(e) => {
            let panic_msg = panic_message(e.as_ref());
            log::error!(
                "Backend panicked starting request {}: {}",
                request.request_id,
                panic_msg
            );
            futures::future::ready(Err(FetchError::Panicked(panic_msg))).boxed()
        }
    }
}

/// Await one lookup, racing it against cancellation
async fn handle_request(
    lookup: BoxFuture<'static, Result<Value, FetchError>>,
    request: FetchRequest,
    cancel_token: CancellationToken,
    response_tx: Sender<FetchResponse>,
) {
    let FetchRequest { query, request_id } = request;

    let result = tokio::select! {
        biased;

        _ = cancel_token.cancelled() => Err(FetchError::Cancelled),

        result = AssertUnwindSafe(lookup).catch_unwind() => match result {
            Ok(result) => result,
            Err(e) => {
                let panic_msg = panic_message(e.as_ref());
                log::error!("Lookup for request {} panicked: {}", request_id, panic_msg);
                Err(FetchError::Panicked(panic_msg))
            }
        },
    };

    let response = match result {
        Ok(payload) => {
            #[cfg(debug_assertions)]
            log::debug!("Request {} succeeded", request_id);
            FetchResponse::Success {
                payload,
                query,
                request_id,
            }
        }
        Err(FetchError::Cancelled) => {
            #[cfg(debug_assertions)]
            log::debug!("Request {} was cancelled", request_id);
            FetchResponse::Cancelled { request_id }
        }
        Err(error) => {
            #[cfg(debug_assertions)]
            log::debug!("Request {} failed: {}", request_id, error);
            FetchResponse::Error {
                error,
                query,
                request_id,
            }
        }
    };

    // The coordinator may already be gone
    let _ = response_tx.send(response);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod worker_tests;
