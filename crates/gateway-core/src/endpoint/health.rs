//! Endpoint health monitoring.
//!
//! [`HealthMonitor`] owns the per-endpoint [`HealthMetric`] table. A probe round issues one
//! probe to each endpoint concurrently, waits for both, then applies the cross-endpoint
//! freshness penalty and publishes the result. Rounds run on demand when the last one is older
//! than the refresh interval, on forced refresh, or from the background task.

use super::{
    probe::{classify, probe_request, ProbeOutcome},
    GraphQLTransport, TransportError,
};
use crate::{
    config::HealthCheckConfig,
    types::{
        DegradedReason, EndpointId, EndpointSet, GraphQLRequest, HealthMetric, HealthState,
        PerformanceStatus,
    },
};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::{
    sync::broadcast,
    time::{interval, Instant, MissedTickBehavior},
};
use tracing::{info, warn};

/// One probe as recorded in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRecord {
    pub checked_at: DateTime<Utc>,
    pub outcome: ProbeOutcome,
    /// Effective latency published for this probe.
    pub response_time_ms: u64,
}

#[derive(Default)]
struct ProbeHistory {
    delayed: VecDeque<ProbeRecord>,
    live: VecDeque<ProbeRecord>,
}

impl ProbeHistory {
    fn get_mut(&mut self, id: EndpointId) -> &mut VecDeque<ProbeRecord> {
        match id {
            EndpointId::Delayed => &mut self.delayed,
            EndpointId::Live => &mut self.live,
        }
    }

    fn get(&self, id: EndpointId) -> &VecDeque<ProbeRecord> {
        match id {
            EndpointId::Delayed => &self.delayed,
            EndpointId::Live => &self.live,
        }
    }
}

/// Probes both endpoints and publishes their [`HealthMetric`]s.
pub struct HealthMonitor {
    endpoints: Arc<EndpointSet>,
    transport: Arc<dyn GraphQLTransport>,
    config: HealthCheckConfig,
    probe: GraphQLRequest,
    status: RwLock<PerformanceStatus>,
    history: Mutex<ProbeHistory>,
    /// Serializes probe rounds. Holds the completion time of the last round.
    last_refresh: tokio::sync::Mutex<Option<Instant>>,
    rounds: AtomicU64,
}

impl HealthMonitor {
    #[must_use]
    pub fn new(
        endpoints: Arc<EndpointSet>,
        transport: Arc<dyn GraphQLTransport>,
        config: HealthCheckConfig,
    ) -> Self {
        let probe = probe_request(&config.sample_selection);
        Self {
            endpoints,
            transport,
            config,
            probe,
            status: RwLock::new(PerformanceStatus {
                delayed: HealthMetric::default(),
                live: HealthMetric::default(),
                last_updated: 0,
            }),
            history: Mutex::new(ProbeHistory::default()),
            last_refresh: tokio::sync::Mutex::new(None),
            rounds: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> &HealthCheckConfig {
        &self.config
    }

    /// Current snapshot without probing.
    #[must_use]
    pub fn performance_status(&self) -> PerformanceStatus {
        self.status.read().clone()
    }

    #[must_use]
    pub fn metric(&self, id: EndpointId) -> HealthMetric {
        self.status.read().get(id).clone()
    }

    /// Number of completed probe rounds.
    #[must_use]
    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::Acquire)
    }

    /// Most recent probes for `id`, oldest first.
    #[must_use]
    pub fn history(&self, id: EndpointId) -> Vec<ProbeRecord> {
        self.history.lock().get(id).iter().cloned().collect()
    }

    /// Runs a probe round if none has completed within the refresh interval.
    ///
    /// Callers arriving while a round is in flight wait for it and reuse its result.
    pub async fn refresh_if_stale(&self) -> PerformanceStatus {
        let mut last = self.last_refresh.lock().await;
        let fresh = last.is_some_and(|at| at.elapsed() < self.config.refresh_interval());
        if !fresh {
            self.run_round().await;
            *last = Some(Instant::now());
        }
        drop(last);
        self.performance_status()
    }

    /// Runs a probe round regardless of staleness.
    ///
    /// If another round completes while this call waits for the lock, that round is reused.
    pub async fn refresh(&self) -> PerformanceStatus {
        let seen = self.rounds();
        let mut last = self.last_refresh.lock().await;
        if self.rounds() == seen {
            self.run_round().await;
            *last = Some(Instant::now());
        }
        drop(last);
        self.performance_status()
    }

    /// Spawns a task that refreshes every `refresh_interval` until `shutdown_rx` fires.
    #[must_use]
    pub fn start_with_shutdown(
        self: &Arc<Self>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        let monitor = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = interval(monitor.config.refresh_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        monitor.refresh().await;
                    }
                    _ = shutdown_rx.recv() => {
                        info!("health monitor shutting down");
                        break;
                    }
                }
            }
        })
    }

    async fn probe(&self, id: EndpointId) -> ProbeOutcome {
        let url = &self.endpoints.get(id).url;
        let timeout = self.config.probe_timeout();
        let started = Instant::now();

        let result = tokio::time::timeout(timeout, self.transport.post(url, &self.probe, Some(timeout)))
            .await
            .unwrap_or(Err(TransportError::Timeout));

        let round_trip_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        classify(result, round_trip_ms)
    }

    async fn run_round(&self) {
        let (delayed, live) =
            futures::join!(self.probe(EndpointId::Delayed), self.probe(EndpointId::Live));

        let now = Utc::now();
        let previous = self.performance_status();
        let delayed_metric =
            self.build_metric(EndpointId::Delayed, &delayed, live.block(), &previous.delayed, now);
        let live_metric =
            self.build_metric(EndpointId::Live, &live, delayed.block(), &previous.live, now);

        {
            let mut history = self.history.lock();
            for (id, outcome, metric) in
                [(EndpointId::Delayed, delayed, &delayed_metric), (EndpointId::Live, live, &live_metric)]
            {
                let entries = history.get_mut(id);
                if entries.len() >= self.config.history_size.max(1) {
                    entries.pop_front();
                }
                entries.push_back(ProbeRecord {
                    checked_at: now,
                    outcome,
                    response_time_ms: metric.response_time_ms,
                });
            }
        }

        *self.status.write() = PerformanceStatus {
            delayed: delayed_metric,
            live: live_metric,
            last_updated: now.timestamp_millis(),
        };
        self.rounds.fetch_add(1, Ordering::AcqRel);
    }

    fn build_metric(
        &self,
        id: EndpointId,
        outcome: &ProbeOutcome,
        sibling_block: Option<u64>,
        previous: &HealthMetric,
        now: DateTime<Utc>,
    ) -> HealthMetric {
        let penalty = self.config.penalty_ms;
        let sentinel = self.config.sentinel_ms;

        let (response_time_ms, degraded) = match outcome {
            ProbeOutcome::Healthy { block, round_trip_ms } => {
                match sibling_block.map(|sibling| sibling.saturating_sub(*block)) {
                    Some(lag) if lag > self.config.block_lag_threshold => {
                        warn!(endpoint = %id, block, lag, "endpoint is behind its sibling, applying penalty");
                        (round_trip_ms.saturating_add(penalty), Some(DegradedReason::BehindSibling { lag }))
                    }
                    _ => {
                        info!(endpoint = %id, block, response_time_ms = round_trip_ms, "probe healthy");
                        (*round_trip_ms, None)
                    }
                }
            }
            ProbeOutcome::IndexingErrors { block, round_trip_ms } => {
                warn!(endpoint = %id, block, "endpoint reports indexing errors, applying penalty");
                (round_trip_ms.saturating_add(penalty), Some(DegradedReason::IndexingErrors))
            }
            ProbeOutcome::NoData { round_trip_ms } => {
                warn!(endpoint = %id, round_trip_ms, "endpoint returned no data");
                (sentinel, None)
            }
            ProbeOutcome::GraphQLErrors { message, .. } => {
                warn!(endpoint = %id, error = %message, "probe returned GraphQL errors");
                (sentinel, None)
            }
            ProbeOutcome::TransportFailure { error } => {
                warn!(endpoint = %id, error = %error, "probe transport failure");
                (sentinel, None)
            }
        };

        let is_healthy = outcome.is_usable();
        HealthMetric {
            response_time_ms,
            last_checked_at: Some(now),
            is_healthy,
            last_known_block: outcome.block().unwrap_or(previous.last_known_block),
            state: if is_healthy { HealthState::Healthy } else { HealthState::Unhealthy },
            round_trip_ms: outcome.round_trip_ms(),
            degraded,
        }
    }
}
