// crates/tessera-rpc/src/middleware.rs
//
// Middleware for the RPC server: transport-level logging interceptor and
// per-call outcome logging.

use std::time::Duration;

use tonic::{Request, Status};

use crate::server::JsonRpcResponse;

/// Logging interceptor for tonic requests.
///
/// Logs the metadata of each incoming request at debug level.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    tracing::debug!("Incoming RPC request: {:?}", req.metadata());
    Ok(req)
}

/// Log the outcome of one dispatched call.
///
/// Successful calls log at `info`, failed ones at `warn` with the error
/// string the client receives.
pub fn log_outcome(method: &str, elapsed: Duration, response: &JsonRpcResponse) {
    let elapsed_us = elapsed.as_micros() as u64;
    match &response.error {
        None => tracing::info!(method, elapsed_us, "RPC call succeeded"),
        Some(error) => tracing::warn!(method, elapsed_us, error = %error, "RPC call failed"),
    }
}
