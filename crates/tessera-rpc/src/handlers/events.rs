// crates/tessera-rpc/src/handlers/events.rs
//
// Event query handler: ListEvents, filtered by asset and/or user.

use serde::{Deserialize, Serialize};

use tessera_core::events::LedgerEvent;

use super::{parse_address, parse_asset, SharedEngine};

/// Default cap on returned events.
const DEFAULT_LIMIT: usize = 100;

/// Request to list committed events, newest last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEventsRequest {
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    /// Maximum number of events, taken from the most recent end.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Matching events plus the number that matched before truncation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEventsResponse {
    pub events: Vec<LedgerEvent>,
    pub total: usize,
}

/// Handle an events/list request.
pub async fn handle_list_events(
    engine: &SharedEngine,
    request: ListEventsRequest,
) -> Result<ListEventsResponse, String> {
    let asset = request
        .asset
        .as_deref()
        .map(|a| parse_asset("asset", a))
        .transpose()?;
    let user = request
        .user
        .as_deref()
        .map(|u| parse_address("user", u))
        .transpose()?;
    let limit = request.limit.unwrap_or(DEFAULT_LIMIT);

    let engine = engine.lock().await;
    let matching = engine.events_for(asset.as_ref(), user.as_ref());
    let total = matching.len();
    let events = matching
        .into_iter()
        .skip(total.saturating_sub(limit))
        .cloned()
        .collect();
    Ok(ListEventsResponse { events, total })
}
