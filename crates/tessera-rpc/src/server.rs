// crates/tessera-rpc/src/server.rs
//
// RPC server setup: TesseraRpcServer and RpcConfig.
//
// A single tonic service accepts JSON-encoded requests with a method field,
// resolves the method to an `Operation`, checks the signature on mutating
// requests, dispatches to the matching handler, and returns a JSON-encoded
// response. No proto codegen is
// involved; tonic only provides the transport.

use std::time::Instant;

use http::header::{HeaderValue, CONTENT_TYPE};
use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;

use tessera_core::error::LedgerError;
use tessera_core::operation::Operation;

use crate::auth::{verify_request, RequestAuth};
use crate::handlers::{self, SharedEngine};
use crate::handlers::staking::{PoolField, PositionField};
use crate::middleware;

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50061,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Operation name (e.g., "staking/stake") or 4-byte selector as
    /// "0x" + 8 hex digits.
    pub method: String,
    /// JSON-encoded parameters for the method.
    #[serde(default)]
    pub params: serde_json::Value,
    /// Signature block, required for mutating operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<RequestAuth>,
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
}

impl JsonRpcResponse {
    pub fn ok(value: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(value),
            error: None,
        }
    }

    pub fn err(message: String) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message),
        }
    }
}

/// Resolve a method string to an operation, by name or by selector.
///
/// # Errors
/// Returns `LedgerError::ImplementationNotFound` for unknown methods and
/// `LedgerError::InvalidInput` for malformed selectors.
pub fn resolve_method(method: &str) -> Result<Operation, LedgerError> {
    match method.strip_prefix("0x") {
        Some(hex_selector) => {
            let bytes = hex::decode(hex_selector).map_err(|e| {
                LedgerError::InvalidInput(format!("Invalid selector '{}': {}", method, e))
            })?;
            let selector: [u8; 4] = bytes.try_into().map_err(|_| {
                LedgerError::InvalidInput(format!("Selector '{}' must be 4 bytes", method))
            })?;
            Operation::from_selector(selector)
        }
        None => Operation::from_name(method),
    }
}

// ---------------------------------------------------------------------------
// TesseraRpcServer
// ---------------------------------------------------------------------------

/// The RPC server for a Tessera ledger node.
#[derive(Clone)]
pub struct TesseraRpcServer {
    config: RpcConfig,
    engine: SharedEngine,
}

impl std::fmt::Debug for TesseraRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TesseraRpcServer")
            .field("config", &self.config)
            .finish()
    }
}

impl TesseraRpcServer {
    pub fn new(config: RpcConfig, engine: SharedEngine) -> Self {
        Self { config, engine }
    }

    /// The dispatcher, without any transport.
    pub fn service(&self) -> LedgerRpcService {
        LedgerRpcService {
            engine: self.engine.clone(),
        }
    }

    /// Start the RPC server and serve requests until the process exits.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("Tessera RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                TesseraJsonRpcServer::new(self.service()),
                middleware::logging_interceptor,
            ))
            .serve(addr)
            .await?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Holds the shared engine and routes JSON-RPC calls to handlers.
#[derive(Clone)]
pub struct LedgerRpcService {
    engine: SharedEngine,
}

impl LedgerRpcService {
    pub fn new(engine: SharedEngine) -> Self {
        Self { engine }
    }

    /// Dispatch a JSON-RPC request to the handler for its operation.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let started = Instant::now();
        let method = request.method.clone();
        let response = match resolve_method(&request.method) {
            Ok(op) => match self.authorize(op, &request).await {
                Ok(()) => match self.route(op, request.params).await {
                    Ok(value) => JsonRpcResponse::ok(value),
                    Err(err) => JsonRpcResponse::err(err),
                },
                Err(e) => JsonRpcResponse::err(e.to_string()),
            },
            Err(e) => JsonRpcResponse::err(e.to_string()),
        };
        middleware::log_outcome(&method, started.elapsed(), &response);
        response
    }

    /// Verify the signature on a mutating request and consume its nonce.
    ///
    /// The nonce is spent even if the operation itself then fails.
    async fn authorize(&self, op: Operation, request: &JsonRpcRequest) -> Result<(), LedgerError> {
        if let Some(verified) = verify_request(op, &request.params, request.auth.as_ref())? {
            let mut engine = self.engine.lock().await;
            engine.use_nonce(verified.caller, verified.nonce)?;
        }
        Ok(())
    }

    async fn route(
        &self,
        op: Operation,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let engine = &self.engine;
        match op {
            // Staking
            Operation::Stake => {
                dispatch_handler(params, |r| handlers::staking::handle_stake(engine, r)).await
            }
            Operation::Unstake => {
                dispatch_handler(params, |r| handlers::staking::handle_unstake(engine, r)).await
            }
            Operation::ClaimRewards => {
                dispatch_handler(params, |r| handlers::staking::handle_claim(engine, r)).await
            }
            Operation::TotalStaked => pool_read(engine, PoolField::TotalStaked, params).await,
            Operation::LastMineAmount => {
                pool_read(engine, PoolField::LastMineAmount, params).await
            }
            Operation::TotalK => pool_read(engine, PoolField::TotalK, params).await,
            Operation::TotalClaimed => pool_read(engine, PoolField::TotalClaimed, params).await,
            Operation::UserStaked => {
                position_read(engine, PositionField::UserStaked, params).await
            }
            Operation::UserK => position_read(engine, PositionField::UserK, params).await,
            Operation::UserClaimed => {
                position_read(engine, PositionField::UserClaimed, params).await
            }
            Operation::UserShare => position_read(engine, PositionField::UserShare, params).await,
            Operation::PendingRewards => {
                position_read(engine, PositionField::PendingRewards, params).await
            }
            Operation::VerifyConsistency => {
                dispatch_handler(params, |r| {
                    handlers::staking::handle_verify_consistency(engine, r)
                })
                .await
            }

            // Swaps
            Operation::Swap => {
                dispatch_handler(params, |r| handlers::swap::handle_swap(engine, r)).await
            }
            Operation::CrossChainSwap => {
                dispatch_handler(params, |r| handlers::swap::handle_cross_chain_swap(engine, r))
                    .await
            }
            Operation::AccumulatedFees => {
                dispatch_handler(params, |r| handlers::swap::handle_accumulated_fees(engine, r))
                    .await
            }
            Operation::Reserve => {
                dispatch_handler(params, |r| handlers::swap::handle_reserve(engine, r)).await
            }
            Operation::FeePolicy => {
                dispatch_handler(params, |r| handlers::swap::handle_fee_policy(engine, r)).await
            }

            // Admin
            Operation::SetFeePolicy => {
                dispatch_handler(params, |r| handlers::admin::handle_set_fee_policy(engine, r))
                    .await
            }
            Operation::FundReserve => {
                dispatch_handler(params, |r| handlers::admin::handle_fund_reserve(engine, r)).await
            }
            Operation::WithdrawReserve => {
                dispatch_handler(params, |r| {
                    handlers::admin::handle_withdraw_reserve(engine, r)
                })
                .await
            }

            // Events
            Operation::ListEvents => {
                dispatch_handler(params, |r| handlers::events::handle_list_events(engine, r))
                    .await
            }
        }
    }
}

async fn pool_read(
    engine: &SharedEngine,
    field: PoolField,
    params: serde_json::Value,
) -> Result<serde_json::Value, String> {
    dispatch_handler(params, |r| {
        handlers::staking::handle_pool_read(engine, field, r)
    })
    .await
}

async fn position_read(
    engine: &SharedEngine,
    field: PositionField,
    params: serde_json::Value,
) -> Result<serde_json::Value, String> {
    dispatch_handler(params, |r| {
        handlers::staking::handle_position_read(engine, field, r)
    })
    .await
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, String>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, String>>,
{
    let request: Req = serde_json::from_value(params)
        .map_err(|e| format!("Failed to deserialize request: {}", e))?;
    let response = handler(request).await?;
    serde_json::to_value(response).map_err(|e| format!("Failed to serialize response: {}", e))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// A single service with raw JSON bodies: the request body is a
// JsonRpcRequest and the response body is a JsonRpcResponse.

/// The tonic service wrapper around `LedgerRpcService`.
#[derive(Clone)]
pub struct TesseraJsonRpcServer {
    inner: LedgerRpcService,
}

impl std::fmt::Debug for TesseraJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TesseraJsonRpcServer").finish()
    }
}

impl TesseraJsonRpcServer {
    fn new(inner: LedgerRpcService) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for TesseraJsonRpcServer {
    const NAME: &'static str = "tessera.rpc.LedgerService";
}

impl<B> tower_service::Service<http::Request<B>> for TesseraJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp = JsonRpcResponse::err(format!("Failed to read request body: {}", e));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp = JsonRpcResponse::err(format!("Invalid JSON-RPC request: {}", e));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            Ok(build_response(&rpc_response))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build an HTTP 200 response carrying a JSON-RPC envelope.
fn build_response(response: &JsonRpcResponse) -> http::Response<tonic::body::BoxBody> {
    let json = serde_json::to_vec(response).unwrap_or_default();
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut resp = http::Response::new(body);
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::sign_request;
    use crate::handlers::test_support::{engine, engine_with, signer, USDC, USDT};
    use serde_json::json;

    const ADMIN_KEY: [u8; 32] = [0xad; 32];
    const ALICE_KEY: [u8; 32] = [0xa1; 32];
    const BOB_KEY: [u8; 32] = [0xb0; 32];

    fn call(method: &str, params: serde_json::Value) -> JsonRpcRequest {
        JsonRpcRequest {
            method: method.to_string(),
            params,
            auth: None,
        }
    }

    fn signed(key: &[u8; 32], op: Operation, params: serde_json::Value, nonce: u64) -> JsonRpcRequest {
        sign_request(key, op, params, nonce).unwrap()
    }

    fn signed_service() -> LedgerRpcService {
        LedgerRpcService::new(engine_with(
            signer(&ADMIN_KEY),
            &[signer(&ADMIN_KEY), signer(&ALICE_KEY), signer(&BOB_KEY)],
        ))
    }

    #[test]
    fn test_resolve_by_name_and_selector() {
        assert_eq!(resolve_method("staking/stake").unwrap(), Operation::Stake);
        let selector = format!("0x{}", hex::encode(Operation::Swap.selector()));
        assert_eq!(resolve_method(&selector).unwrap(), Operation::Swap);
        assert!(matches!(
            resolve_method("0x1234"),
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let service = LedgerRpcService::new(engine());
        let resp = service.dispatch(call("staking/teleport", json!({}))).await;
        assert!(!resp.success);
        assert_eq!(
            resp.error.as_deref(),
            Some("Implementation not found for selector: staking/teleport")
        );
    }

    #[tokio::test]
    async fn test_bad_params() {
        let service = signed_service();
        let resp = service
            .dispatch(signed(
                &ALICE_KEY,
                Operation::Stake,
                json!({ "caller": signer(&ALICE_KEY), "asset": USDC }),
                1,
            ))
            .await;
        assert!(!resp.success);
        assert!(resp
            .error
            .unwrap_or_default()
            .starts_with("Failed to deserialize request"));
    }

    #[tokio::test]
    async fn test_unsigned_mutation_is_rejected() {
        let service = signed_service();
        let resp = service
            .dispatch(call(
                "staking/stake",
                json!({ "caller": signer(&ALICE_KEY), "asset": USDC, "amount": "10" }),
            ))
            .await;
        assert!(!resp.success);
        assert!(resp.error.unwrap_or_default().starts_with("Invalid signature"));

        let resp = service
            .dispatch(call("staking/total_staked", json!({ "asset": USDC })))
            .await;
        assert_eq!(resp.result, Some(json!({ "amount": "0" })));
    }

    #[tokio::test]
    async fn test_forged_admin_caller_is_rejected() {
        let service = signed_service();
        let admin = signer(&ADMIN_KEY);
        let alice = signer(&ALICE_KEY);

        let resp = service
            .dispatch(signed(
                &ADMIN_KEY,
                Operation::FundReserve,
                json!({ "caller": admin, "asset": USDT, "amount": "500" }),
                1,
            ))
            .await;
        assert!(resp.success, "{:?}", resp.error);

        // Alice signs with her own key but names the admin as caller.
        let resp = service
            .dispatch(signed(
                &ALICE_KEY,
                Operation::WithdrawReserve,
                json!({ "caller": admin, "asset": USDT, "amount": "500", "to": alice }),
                1,
            ))
            .await;
        assert!(!resp.success);
        assert_eq!(
            resp.error,
            Some(LedgerError::Unauthorized { caller: admin }.to_string())
        );

        let resp = service
            .dispatch(call("swap/reserve", json!({ "asset": USDT })))
            .await;
        assert_eq!(resp.result, Some(json!({ "amount": "500" })));
    }

    #[tokio::test]
    async fn test_cannot_spend_another_users_approval() {
        let service = signed_service();
        let alice = signer(&ALICE_KEY);
        let bob = signer(&BOB_KEY);

        // Bob tries to swap Alice's USDC to himself.
        let resp = service
            .dispatch(signed(
                &BOB_KEY,
                Operation::Swap,
                json!({
                    "caller": alice, "asset_in": USDC, "asset_out": USDT,
                    "amount_in": "1000", "recipient": bob
                }),
                1,
            ))
            .await;
        assert!(!resp.success);
        assert_eq!(
            resp.error,
            Some(LedgerError::Unauthorized { caller: alice }.to_string())
        );
    }

    #[tokio::test]
    async fn test_tampered_request_is_rejected() {
        let service = signed_service();
        let alice = signer(&ALICE_KEY);
        let mut request = signed(
            &ALICE_KEY,
            Operation::Stake,
            json!({ "caller": alice, "asset": USDC, "amount": "10" }),
            1,
        );
        request.params["amount"] = json!("999999");
        let resp = service.dispatch(request).await;
        assert!(!resp.success);
        assert!(resp.error.unwrap_or_default().starts_with("Invalid signature"));
    }

    #[tokio::test]
    async fn test_replayed_request_is_rejected() {
        let service = signed_service();
        let alice = signer(&ALICE_KEY);
        let request = signed(
            &ALICE_KEY,
            Operation::Stake,
            json!({ "caller": alice, "asset": USDC, "amount": "10" }),
            1,
        );

        assert!(service.dispatch(request.clone()).await.success);
        let resp = service.dispatch(request).await;
        assert!(!resp.success);
        assert!(resp.error.unwrap_or_default().starts_with("Stale nonce"));

        let resp = service
            .dispatch(call("staking/user_staked", json!({ "asset": USDC, "user": alice })))
            .await;
        assert_eq!(resp.result, Some(json!({ "amount": "10" })));
    }

    #[tokio::test]
    async fn test_selector_requests_sign_the_operation_name() {
        let service = signed_service();
        let alice = signer(&ALICE_KEY);
        let mut request = signed(
            &ALICE_KEY,
            Operation::Stake,
            json!({ "caller": alice, "asset": USDC, "amount": "10" }),
            1,
        );
        request.method = format!("0x{}", hex::encode(Operation::Stake.selector()));
        let resp = service.dispatch(request).await;
        assert!(resp.success, "{:?}", resp.error);
    }

    #[tokio::test]
    async fn test_reward_flow_over_dispatch() {
        let service = signed_service();
        let admin = signer(&ADMIN_KEY);

        let resp = service
            .dispatch(signed(
                &ADMIN_KEY,
                Operation::SetFeePolicy,
                json!({
                    "caller": admin, "asset_a": USDC, "asset_b": USDT,
                    "in_fee": "100000000000000000", "out_fee": "0"
                }),
                1,
            ))
            .await;
        assert!(resp.success, "{:?}", resp.error);

        let resp = service
            .dispatch(signed(
                &ADMIN_KEY,
                Operation::FundReserve,
                json!({ "caller": admin, "asset": USDT, "amount": "10000" }),
                2,
            ))
            .await;
        assert!(resp.success, "{:?}", resp.error);

        for (key, amount) in [(ALICE_KEY, "200"), (BOB_KEY, "800")] {
            let resp = service
                .dispatch(signed(
                    &key,
                    Operation::Stake,
                    json!({ "caller": signer(&key), "asset": USDC, "amount": amount }),
                    1,
                ))
                .await;
            assert!(resp.success, "{:?}", resp.error);
        }

        let resp = service
            .dispatch(signed(
                &ADMIN_KEY,
                Operation::Swap,
                json!({
                    "caller": admin, "asset_in": USDC, "asset_out": USDT,
                    "amount_in": "1000"
                }),
                3,
            ))
            .await;
        assert!(resp.success, "{:?}", resp.error);

        let alice = signer(&ALICE_KEY);
        let resp = service
            .dispatch(call(
                "staking/pending_rewards",
                json!({ "asset": USDC, "user": alice }),
            ))
            .await;
        assert_eq!(resp.result, Some(json!({ "amount": "20" })));

        let resp = service
            .dispatch(signed(
                &ALICE_KEY,
                Operation::ClaimRewards,
                json!({ "caller": alice, "asset": USDC }),
                2,
            ))
            .await;
        assert_eq!(resp.result, Some(json!({ "amount": "20" })));

        let resp = service
            .dispatch(call("staking/total_k", json!({ "asset": USDC })))
            .await;
        assert_eq!(resp.result, Some(json!({ "amount": "100000000000000000" })));

        let resp = service
            .dispatch(call("events/list", json!({ "user": alice })))
            .await;
        let result = resp.result.unwrap_or_default();
        assert_eq!(result["total"], json!(2));
    }
}
