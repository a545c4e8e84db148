// crates/tessera-rpc/src/lib.rs
//
// tessera-rpc: JSON-RPC server and handlers for the Tessera ledger.
//
// A single tonic service accepts JSON envelopes whose `method` is an
// operation name (or its 4-byte selector in hex) and dispatches to the
// handler for that operation. Mutating operations must be signed by the
// key behind their `caller`.

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod server;

// Re-export the main server type for ergonomic access.
pub use auth::{sign_request, RequestAuth};
pub use handlers::SharedEngine;
pub use server::{JsonRpcRequest, JsonRpcResponse, LedgerRpcService, RpcConfig, TesseraRpcServer};
