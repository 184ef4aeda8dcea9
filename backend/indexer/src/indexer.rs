//! Background task that polls the Soroban RPC and writes decoded
//! PensionFund events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db::{self, Cursor};
use crate::rpc::{self, EventPage};

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Poll until `shutdown` is cancelled. Poll errors are logged and retried on
/// the next tick.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexer starting, contract: {}", state.config.contract_id);

    let mut cursor = match db::load_cursor(&state.pool).await {
        Ok(saved) if saved.last_ledger > 0 => saved,
        Ok(_) => start_cursor(&state.config),
        Err(e) => {
            error!("Could not read saved cursor, starting from config: {e}");
            start_cursor(&state.config)
        }
    };
    info!("Resuming from ledger {}", cursor.last_ledger);

    loop {
        match poll_once(&state, &cursor).await {
            Ok(next) => cursor = next,
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Indexer stopped at ledger {}", cursor.last_ledger);
                return;
            }
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }
}

fn start_cursor(config: &Config) -> Cursor {
    Cursor {
        last_ledger: config.start_ledger as i64,
        last_cursor: None,
    }
}

/// Fetch, store and checkpoint one page of events.
async fn poll_once(state: &IndexerState, cursor: &Cursor) -> crate::errors::Result<Cursor> {
    let start_ledger = u32::try_from(cursor.last_ledger).unwrap_or(u32::MAX);
    let page = rpc::fetch_events(
        &state.client,
        &state.config.rpc_url,
        &state.config.contract_id,
        start_ledger,
        cursor.last_cursor.as_deref(),
        state.config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &state.config.contract_id);
        let inserted = db::insert_events(&state.pool, &decoded).await?;
        info!(
            "Polled {} raw events → {} new records stored",
            page.events.len(),
            inserted
        );
    }

    let next = advance(cursor, &page);
    db::save_cursor(&state.pool, &next).await?;
    Ok(next)
}

/// Next resume point: the returned pagination cursor (if any) and the newest
/// ledger seen, never moving backwards.
fn advance(cursor: &Cursor, page: &EventPage) -> Cursor {
    let latest = page
        .latest_ledger
        .and_then(|l| i64::try_from(l).ok())
        .unwrap_or(cursor.last_ledger);
    Cursor {
        last_ledger: latest.max(cursor.last_ledger),
        last_cursor: page.cursor.clone().or_else(|| cursor.last_cursor.clone()),
    }
}
