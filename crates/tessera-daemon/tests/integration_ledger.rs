// crates/tessera-daemon/tests/integration_ledger.rs
//
// Integration tests for the Tessera ledger daemon.
//
// Exercises the wired-up stack the daemon runs: LedgerEngine over a real
// RocksDB slot store with the bank in the same database, the reference
// bridge, and signed JSON-RPC dispatch.
// These tests use the public APIs of the library crates directly since the
// daemon is a binary crate with no lib.rs.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use tessera_core::address::{Address, Asset};
use tessera_core::amount::U256;
use tessera_core::crypto::public_key_bytes;
use tessera_core::error::LedgerError;
use tessera_core::operation::Operation;
use tessera_core::traits::AssetTransfer;
use tessera_economics::{ExitQueue, LedgerConfig, LedgerEngine};
use tessera_rpc::{sign_request, JsonRpcRequest, LedgerRpcService};
use tessera_store::{GenesisGrant, InMemoryBank, MemoryStore, RocksStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ADMIN: Address = Address::from_low_byte(0xad);
const ALICE: Address = Address::from_low_byte(0xa1);
const BOB: Address = Address::from_low_byte(0xb0);
const USDC: Asset = Asset::from_low_byte(0x01);
const USDT: Asset = Asset::from_low_byte(0x02);

/// 10% as a WAD fraction.
const TEN_PERCENT: U256 = U256::new(100_000_000_000_000_000);

/// Create a temporary directory path using UUID to avoid conflicts.
fn temp_db_path(label: &str) -> String {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("tessera_test_{}_{}", label, Uuid::now_v7()));
    path.to_string_lossy().to_string()
}

fn config_for(admin: Address) -> LedgerConfig {
    LedgerConfig {
        admin,
        ..LedgerConfig::default()
    }
}

fn config() -> LedgerConfig {
    config_for(ADMIN)
}

/// Every holder funded and custody-approved in both assets.
fn grants(holders: &[Address], custody: Address) -> Vec<GenesisGrant> {
    let mut grants = Vec::new();
    for holder in holders {
        for asset in [USDC, USDT] {
            grants.push(GenesisGrant {
                asset,
                holder: *holder,
                amount: U256::new(1_000_000),
                approve: Some(custody),
            });
        }
    }
    grants
}

/// Engine over RocksDB at `path`, with the bank in the same database.
/// Genesis is only written the first time a path is opened.
fn rocks_engine(path: &str) -> LedgerEngine {
    let store = RocksStore::open(path).unwrap();
    let mut bank = store.bank();
    bank.apply_genesis(&grants(&[ADMIN, ALICE, BOB], config().custody))
        .unwrap();
    LedgerEngine::new(config(), Box::new(store), Box::new(bank))
}

/// 10% entry fee on USDC -> USDT, and 10_000 USDT of liquidity.
fn seed_market(engine: &mut LedgerEngine, admin: Address) {
    engine
        .set_fee_policy(admin, USDC, USDT, TEN_PERCENT, U256::ZERO)
        .unwrap();
    engine.fund_reserve(admin, USDT, U256::new(10_000)).unwrap();
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn test_ledger_state_survives_reopen() {
    let path = temp_db_path("reopen");
    let custody = config().custody;

    {
        let mut engine = rocks_engine(&path);
        seed_market(&mut engine, ADMIN);
        engine.stake(ALICE, USDC, U256::new(200)).unwrap();
        engine.stake(BOB, USDC, U256::new(800)).unwrap();
        let outcome = engine
            .swap(ADMIN, USDC, USDT, U256::new(1_000), ADMIN)
            .unwrap();
        assert_eq!(outcome.in_fee, U256::new(100));
        assert_eq!(outcome.amount_out, U256::new(1_000));
    }

    let engine = rocks_engine(&path);
    assert_eq!(engine.total_staked(USDC).unwrap(), U256::new(1_000));
    assert_eq!(engine.user_staked(USDC, ALICE).unwrap(), U256::new(200));
    assert_eq!(engine.accumulated_fee(USDC).unwrap(), U256::new(100));
    assert_eq!(engine.reserve_of(USDT).unwrap(), U256::new(9_000));
    assert_eq!(engine.reserve_of(USDC).unwrap(), U256::new(1_000));
    assert_eq!(engine.pending_rewards(USDC, ALICE).unwrap(), U256::new(20));
    assert_eq!(engine.pending_rewards(USDC, BOB).unwrap(), U256::new(80));
    assert_eq!(
        engine.fee_policy(USDT, USDC).unwrap().out_fee,
        TEN_PERCENT
    );
    assert!(engine.verify_consistency(USDC).unwrap());

    // Bank balances came back with the slots, genesis was not re-minted.
    assert_eq!(
        engine.bank().balance_of(&USDC, &ALICE).unwrap(),
        U256::new(999_800)
    );
    assert_eq!(
        engine.bank().balance_of(&USDC, &custody).unwrap(),
        U256::new(2_000)
    );
    assert_eq!(
        engine.bank().balance_of(&USDT, &custody).unwrap(),
        U256::new(9_000)
    );

    // So did the event log: policy, funding, two stakes, one swap.
    let names: Vec<_> = engine.events().iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec!["TokenPairFeesSet", "ReserveFunded", "Staked", "Staked", "SwapExecuted"]
    );
}

#[test]
fn test_reopen_then_unstake_pays_out() {
    let path = temp_db_path("reopen_unstake");
    let custody = config().custody;

    {
        let mut engine = rocks_engine(&path);
        seed_market(&mut engine, ADMIN);
        engine.stake(ALICE, USDC, U256::new(200)).unwrap();
        engine.stake(BOB, USDC, U256::new(800)).unwrap();
        engine
            .swap(ADMIN, USDC, USDT, U256::new(1_000), ADMIN)
            .unwrap();
    }

    let mut engine = rocks_engine(&path);
    assert_eq!(engine.unstake(ALICE, USDC, U256::new(200)).unwrap(), U256::new(20));
    assert_eq!(
        engine.bank().balance_of(&USDC, &ALICE).unwrap(),
        U256::new(1_000_020)
    );
    assert_eq!(engine.claim_rewards(BOB, USDC).unwrap(), U256::new(80));
    assert_eq!(engine.unstake(BOB, USDC, U256::new(800)).unwrap(), U256::ZERO);
    assert_eq!(
        engine.bank().balance_of(&USDC, &BOB).unwrap(),
        U256::new(1_000_080)
    );

    // Only the reserve is left in custody, net of the 100 paid in rewards.
    assert_eq!(engine.total_staked(USDC).unwrap(), U256::ZERO);
    assert_eq!(engine.reserve_of(USDC).unwrap(), U256::new(900));
    assert_eq!(
        engine.bank().balance_of(&USDC, &custody).unwrap(),
        U256::new(900)
    );
}

#[test]
fn test_failed_operations_leave_rocks_untouched() {
    let path = temp_db_path("atomic");

    {
        let mut engine = rocks_engine(&path);
        seed_market(&mut engine, ADMIN);
        engine.stake(ALICE, USDC, U256::new(200)).unwrap();

        // Output beyond the USDT reserve.
        let err = engine
            .swap(BOB, USDC, USDT, U256::new(20_000), BOB)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientReserve { .. }));

        // Passes the ledger, fails the bank check.
        let err = engine
            .stake(ALICE, USDC, U256::new(2_000_000))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    }

    let engine = rocks_engine(&path);
    assert_eq!(engine.total_staked(USDC).unwrap(), U256::new(200));
    assert_eq!(engine.user_staked(USDC, ALICE).unwrap(), U256::new(200));
    assert_eq!(engine.reserve_of(USDC).unwrap(), U256::ZERO);
    assert_eq!(engine.accumulated_fee(USDC).unwrap(), U256::ZERO);
    assert_eq!(
        engine.bank().balance_of(&USDC, &ALICE).unwrap(),
        U256::new(999_800)
    );
    assert_eq!(
        engine.bank().balance_of(&USDC, &BOB).unwrap(),
        U256::new(1_000_000)
    );
    assert_eq!(engine.events().len(), 3);
}

#[test]
fn test_index_and_balances_after_full_cycle() {
    let path = temp_db_path("cycle");
    let custody = config().custody;
    let mut engine = rocks_engine(&path);
    seed_market(&mut engine, ADMIN);

    engine.stake(ALICE, USDC, U256::new(200)).unwrap();
    engine.stake(BOB, USDC, U256::new(800)).unwrap();
    engine
        .swap(ADMIN, USDC, USDT, U256::new(1_000), ADMIN)
        .unwrap();

    let paid = engine.unstake(ALICE, USDC, U256::new(200)).unwrap();
    assert_eq!(paid, U256::new(20));
    assert_eq!(engine.total_k(USDC).unwrap(), TEN_PERCENT);
    assert_eq!(engine.user_staked(USDC, ALICE).unwrap(), U256::ZERO);
    assert_eq!(
        engine.bank().balance_of(&USDC, &ALICE).unwrap(),
        U256::new(1_000_020)
    );

    let paid = engine.claim_rewards(BOB, USDC).unwrap();
    assert_eq!(paid, U256::new(80));
    assert_eq!(engine.total_claimed(USDC).unwrap(), U256::new(100));
    assert_eq!(engine.last_mine_amount(USDC).unwrap(), U256::new(100));

    // Bob's stake plus the USDC reserve, which paid the 100 of rewards.
    assert_eq!(engine.reserve_of(USDC).unwrap(), U256::new(900));
    assert_eq!(
        engine.bank().balance_of(&USDC, &custody).unwrap(),
        U256::new(1_700)
    );
    assert!(engine.verify_consistency(USDC).unwrap());
}

// ---------------------------------------------------------------------------
// RPC + bridge
// ---------------------------------------------------------------------------

const ADMIN_KEY: [u8; 32] = [0xad; 32];
const ALICE_KEY: [u8; 32] = [0xa1; 32];

fn signer(secret: &[u8; 32]) -> Address {
    Address::from_public_key(&public_key_bytes(secret))
}

fn call(method: &str, params: serde_json::Value) -> JsonRpcRequest {
    JsonRpcRequest {
        method: method.to_string(),
        params,
        auth: None,
    }
}

fn bridged_service() -> (LedgerRpcService, tessera_economics::ExitOutbox) {
    let admin = signer(&ADMIN_KEY);
    let config = config_for(admin);
    let bank = InMemoryBank::from_genesis(&grants(
        &[admin, signer(&ALICE_KEY)],
        config.custody,
    ))
    .unwrap();
    let bridge = ExitQueue::new(1, [56]);
    let outbox = bridge.outbox();
    let mut engine = LedgerEngine::new(config, Box::new(MemoryStore::new()), Box::new(bank))
        .with_bridge(Box::new(bridge));
    seed_market(&mut engine, admin);
    (
        LedgerRpcService::new(Arc::new(Mutex::new(engine))),
        outbox,
    )
}

fn cross_chain(dest_chain: u64, nonce: u64) -> JsonRpcRequest {
    sign_request(
        &ALICE_KEY,
        Operation::CrossChainSwap,
        json!({
            "caller": signer(&ALICE_KEY).to_string(),
            "asset_in": USDC.to_string(),
            "asset_out": USDT.to_string(),
            "amount_in": "1000",
            "recipient": BOB.to_string(),
            "dest_chain": dest_chain
        }),
        nonce,
    )
    .unwrap()
}

#[tokio::test]
async fn test_cross_chain_swap_over_rpc_reaches_outbox() {
    let (service, outbox) = bridged_service();

    let resp = service.dispatch(cross_chain(56, 1)).await;
    assert!(resp.success, "{:?}", resp.error);
    let result = resp.result.unwrap_or_default();
    assert_eq!(result["amount_out"], json!("900"));
    assert_eq!(result["out_fee"], json!("0"));

    let exits = outbox.drain();
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].to, BOB);
    assert_eq!(exits[0].dest_chain, 56);
    assert_eq!(exits[0].amount, U256::new(900));

    let resp = service
        .dispatch(call(
            "swap/accumulated_fees",
            json!({ "asset_a": USDC.to_string(), "asset_b": USDT.to_string() }),
        ))
        .await;
    let result = resp.result.unwrap_or_default();
    assert_eq!(result["fee_a"], json!("100"));
    assert_eq!(result["fee_b"], json!("0"));
}

#[tokio::test]
async fn test_unsupported_destination_is_rolled_back() {
    let (service, outbox) = bridged_service();

    let resp = service.dispatch(cross_chain(999, 1)).await;
    assert!(!resp.success);
    assert!(outbox.is_empty());

    let resp = service
        .dispatch(call("swap/reserve", json!({ "asset": USDC.to_string() })))
        .await;
    assert_eq!(resp.result, Some(json!({ "amount": "0" })));

    let resp = service
        .dispatch(call(
            "events/list",
            json!({ "user": signer(&ALICE_KEY).to_string() }),
        ))
        .await;
    assert_eq!(resp.result.unwrap_or_default()["total"], json!(0));
}

#[tokio::test]
async fn test_cross_chain_swap_for_someone_else_is_rejected() {
    let (service, outbox) = bridged_service();

    // Signed by Alice's key, but spending the admin's approval.
    let request = sign_request(
        &ALICE_KEY,
        Operation::CrossChainSwap,
        json!({
            "caller": signer(&ADMIN_KEY).to_string(),
            "asset_in": USDC.to_string(),
            "asset_out": USDT.to_string(),
            "amount_in": "1000",
            "recipient": signer(&ALICE_KEY).to_string(),
            "dest_chain": 56
        }),
        1,
    )
    .unwrap();
    let resp = service.dispatch(request).await;
    assert!(!resp.success);
    assert!(resp.error.unwrap_or_default().starts_with("Unauthorized caller"));
    assert!(outbox.is_empty());
}
