use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tokio::{
    runtime::Handle,
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::models::RunningTotalSnapshot;
use crate::sampling::SampleStore;
use crate::utils::lock_or_recover;
use crate::visibility::PageVisibility;

use super::{AggregatorState, AggregatorStatus};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;
type Listener = Arc<dyn Fn(&Arc<RunningTotalSnapshot>) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

struct Inner {
    state: Mutex<AggregatorState>,
    store: Arc<Mutex<SampleStore>>,
    page: Arc<Mutex<PageVisibility>>,
    active_bands: Vec<String>,
    tick_interval: Duration,
    clock: Clock,
    snapshot_tx: watch::Sender<Arc<RunningTotalSnapshot>>,
    listeners: Arc<Mutex<Listeners>>,
    // Generation of the latest publication, bumped under the state lock.
    published: AtomicU64,
    // Generation last handed to listeners; held while listeners run.
    delivered: Mutex<u64>,
    ticker: Mutex<Option<Ticker>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let ticker = self
            .ticker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(ticker) = ticker {
            ticker.cancel_token.cancel();
            ticker.handle.abort();
        }
    }
}

/// Periodically folds the sample store into running totals and publishes each
/// result as a whole snapshot.
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<Inner>,
}

impl Aggregator {
    pub fn new(
        store: Arc<Mutex<SampleStore>>,
        page: Arc<Mutex<PageVisibility>>,
        active_bands: Vec<String>,
        tick_interval: Duration,
    ) -> Self {
        Self::with_clock(
            store,
            page,
            active_bands,
            tick_interval,
            Arc::new(|| Utc::now().timestamp_millis()),
        )
    }

    pub fn with_clock(
        store: Arc<Mutex<SampleStore>>,
        page: Arc<Mutex<PageVisibility>>,
        active_bands: Vec<String>,
        tick_interval: Duration,
        clock: Clock,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(RunningTotalSnapshot::new()));
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(AggregatorState::new()),
                store,
                page,
                active_bands,
                tick_interval,
                clock,
                snapshot_tx,
                listeners: Arc::default(),
                published: AtomicU64::new(0),
                delivered: Mutex::new(0),
                ticker: Mutex::new(None),
            }),
        }
    }

    pub fn status(&self) -> AggregatorStatus {
        lock_or_recover(&self.inner.state).status
    }

    pub fn get_snapshot(&self) -> Arc<RunningTotalSnapshot> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    pub fn watch(&self) -> watch::Receiver<Arc<RunningTotalSnapshot>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Calls `on_update` with every snapshot published after this point.
    /// Listeners run on the publishing thread and must not call `tick` or
    /// `stop` themselves.
    pub fn subscribe<F>(&self, on_update: F) -> Subscription
    where
        F: Fn(&Arc<RunningTotalSnapshot>) + Send + Sync + 'static,
    {
        let mut listeners = lock_or_recover(&self.inner.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        let listener: Listener = Arc::new(on_update);
        listeners.entries.push((id, listener));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.inner.listeners),
        }
    }

    /// Arms the periodic ticker. Calling it while already active does nothing.
    pub fn start(&self) -> Result<()> {
        let mut ticker = lock_or_recover(&self.inner.ticker);
        if ticker.is_some() {
            return Ok(());
        }
        if self.inner.tick_interval.is_zero() {
            bail!("aggregator tick interval must be greater than zero");
        }
        let runtime = Handle::try_current().context("aggregator ticker needs a tokio runtime")?;

        lock_or_recover(&self.inner.state).begin((self.inner.clock)());

        let cancel_token = CancellationToken::new();
        let handle = runtime.spawn(tick_loop(
            Arc::downgrade(&self.inner),
            self.inner.tick_interval,
            cancel_token.clone(),
        ));
        *ticker = Some(Ticker {
            handle,
            cancel_token,
        });

        log_info!(
            "reading totals aggregator started (every {}ms)",
            self.inner.tick_interval.as_millis()
        );
        Ok(())
    }

    /// Cancels the ticker and clears every total. Safe to call repeatedly.
    pub fn stop(&self) {
        if let Some(ticker) = lock_or_recover(&self.inner.ticker).take() {
            ticker.cancel_token.cancel();
            ticker.handle.abort();
        }

        let stopped = {
            let mut state = lock_or_recover(&self.inner.state);
            let was_active = state.status == AggregatorStatus::Active;
            state.reset();
            let empty = Arc::new(RunningTotalSnapshot::new());
            self.inner.snapshot_tx.send_replace(empty.clone());
            was_active.then(|| (self.next_generation(), empty))
        };

        if let Some((generation, empty)) = stopped {
            log_info!("reading totals aggregator stopped");
            self.notify(generation, &empty);
        }
    }

    /// Runs one tick ending at `now_milli`. Returns `None` while stopped.
    pub fn tick_at(&self, now_milli: i64) -> Option<Arc<RunningTotalSnapshot>> {
        let (generation, snapshot) = {
            let mut state = lock_or_recover(&self.inner.state);
            if state.status != AggregatorStatus::Active {
                return None;
            }
            let store = lock_or_recover(&self.inner.store);
            let page = *lock_or_recover(&self.inner.page);
            let snapshot = Arc::new(state.advance(
                &store,
                &page,
                &self.inner.active_bands,
                now_milli,
            ));
            self.inner.snapshot_tx.send_replace(snapshot.clone());
            (self.next_generation(), snapshot)
        };

        log_debug!("published totals for {} targets", snapshot.len());
        self.notify(generation, &snapshot);
        Some(snapshot)
    }

    pub fn tick(&self) -> Option<Arc<RunningTotalSnapshot>> {
        self.tick_at((self.inner.clock)())
    }

    /// Must be called with the state lock held.
    fn next_generation(&self) -> u64 {
        self.inner.published.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Hands `snapshot` to every listener unless a newer publication has
    /// already been delivered.
    fn notify(&self, generation: u64, snapshot: &Arc<RunningTotalSnapshot>) {
        let mut delivered = lock_or_recover(&self.inner.delivered);
        if *delivered > generation {
            return;
        }
        *delivered = generation;

        let listeners: Vec<Listener> = lock_or_recover(&self.inner.listeners)
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

async fn tick_loop(inner: Weak<Inner>, period: Duration, cancel_token: CancellationToken) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the window starts at `start()`.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                if (Aggregator { inner }).tick().is_none() {
                    break;
                }
            }
            _ = cancel_token.cancelled() => {
                break;
            }
        }
    }
}

/// Handle returned by [`Aggregator::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock_or_recover(&listeners)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}
