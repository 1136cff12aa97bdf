//! Provider health state — push-based snapshot behind the health endpoint.
//!
//! A background task probes the live provider on a timer and writes the
//! result here; `GET /health` only ever reads cached state, so it stays fast
//! regardless of vendor latency. In demo mode no checker runs and the state
//! permanently reports "demo mode".

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::llm::LlmClient;

/// Interval between background provider reachability checks.
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Last observed provider state.
#[derive(Debug, Clone)]
pub struct ProviderHealth {
    pub reachable: bool,
    pub message: String,
}

/// Shared snapshot cell. Clone freely — it is backed by an `Arc`.
#[derive(Clone)]
pub struct HealthState {
    inner: Arc<RwLock<ProviderHealth>>,
}

impl HealthState {
    pub fn new(reachable: bool, message: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ProviderHealth {
                reachable,
                message: message.into(),
            })),
        }
    }

    pub async fn set(&self, reachable: bool, message: impl Into<String>) {
        let mut guard = self.inner.write().await;
        *guard = ProviderHealth { reachable, message: message.into() };
    }

    pub async fn snapshot(&self) -> ProviderHealth {
        self.inner.read().await.clone()
    }
}

/// Spawn a background task that probes the provider endpoint periodically.
///
/// Runs an immediate check on startup, then every [`HEALTH_CHECK_INTERVAL`].
/// The task stops when `shutdown` is cancelled.
pub fn spawn_health_checker(
    client: LlmClient,
    state: HealthState,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        run_check(&client, &state).await;
        let mut interval = tokio::time::interval(HEALTH_CHECK_INTERVAL);
        interval.tick().await; // consume the first (immediate) tick
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    run_check(&client, &state).await;
                }
            }
        }
    });
}

async fn run_check(client: &LlmClient, state: &HealthState) {
    match client.ping().await {
        Ok(()) => {
            debug!(provider = client.provider_name(), "llm provider reachable");
            state.set(true, "ok").await;
        }
        Err(e) => {
            warn!(provider = client.provider_name(), error = %e, "llm provider unreachable");
            state.set(false, format!("provider unreachable: {e}")).await;
        }
    }
}
