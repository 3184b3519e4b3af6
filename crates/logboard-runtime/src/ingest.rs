//! Mock ingestion adapter.
//!
//! Stands in for the agent transport: on every tick it appends one app
//! record and one web record to the stream store.

use std::sync::Arc;
use std::time::Duration;

use logboard_core::{AppLogRecord, Clock, LogStreamStore, WebLogRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LOGGERS: &[&str] = &[
    "com.board.agent.Collector",
    "com.board.api.AuthController",
    "com.board.batch.Scheduler",
    "com.board.db.ConnectionPool",
];

const INFO_MESSAGES: &[&str] = &[
    "Request handled successfully",
    "Scheduled job completed",
    "Cache refreshed",
    "User session created",
];

const WARN_MESSAGES: &[&str] = &[
    "Slow query detected",
    "Connection pool nearly exhausted",
    "Retrying upstream call",
];

const ERROR_MESSAGES: &[&str] = &[
    "Failed to write batch to storage",
    "Upstream service timed out",
    "Unhandled exception in request pipeline",
];

const METHODS: &[&str] = &["GET", "GET", "GET", "POST", "PUT", "DELETE"];
const PROTOCOLS: &[&str] = &["HTTP/1.1", "HTTP/2.0"];
const PATHS: &[&str] = &[
    "/",
    "/login",
    "/api/boards",
    "/api/logs",
    "/admin/config",
    "/static/app.js",
];
const STATUSES: &[u16] = &[200, 200, 200, 201, 304, 400, 401, 403, 404, 500, 503];
const REFERRERS: &[&str] = &["-", "https://example.com/", "https://search.example.org/?q=logs"];
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0)",
    "curl/8.4.0",
    "python-requests/2.31",
];

/// Builds plausible random records stamped with the clock's current time.
pub struct MockRecordFactory {
    rng: StdRng,
    clock: Arc<dyn Clock>,
}

impl MockRecordFactory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            clock,
        }
    }

    /// Deterministic factory for tests and replays.
    pub fn seeded(seed: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            clock,
        }
    }

    fn timestamp(&self) -> String {
        self.clock.now().format(TIMESTAMP_FORMAT).to_string()
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values.choose(&mut self.rng).copied().unwrap_or_default()
    }

    pub fn app_record(&mut self) -> AppLogRecord {
        // Roughly 70% INFO, 20% WARN, 10% ERROR
        let roll = self.rng.gen_range(0..10);
        let (level, messages) = match roll {
            0 => ("ERROR", ERROR_MESSAGES),
            1 | 2 => ("WARN", WARN_MESSAGES),
            _ => ("INFO", INFO_MESSAGES),
        };

        AppLogRecord {
            timestamp: self.timestamp(),
            level: level.to_string(),
            logger: self.pick(LOGGERS).to_string(),
            message: self.pick(messages).to_string(),
        }
    }

    pub fn web_record(&mut self) -> WebLogRecord {
        let ip = format!(
            "{}.{}.{}.{}",
            self.rng.gen_range(1..=223),
            self.rng.gen_range(0..=255),
            self.rng.gen_range(0..=255),
            self.rng.gen_range(1..=254)
        );

        WebLogRecord {
            timestamp: self.timestamp(),
            method: self.pick(METHODS).to_string(),
            protocol: self.pick(PROTOCOLS).to_string(),
            size: Some(self.rng.gen_range(200..=50_000)),
            path: self.pick(PATHS).to_string(),
            status: STATUSES.choose(&mut self.rng).copied(),
            referrer: self.pick(REFERRERS).to_string(),
            user_agent: self.pick(USER_AGENTS).to_string(),
            ip,
            ai_score: Some(self.rng.gen_range(0..=100)),
        }
    }
}

/// Periodic generator feeding a stream store until cancelled.
pub struct MockLogGenerator {
    store: LogStreamStore,
    factory: MockRecordFactory,
    interval: Duration,
    cancel_token: CancellationToken,
}

impl MockLogGenerator {
    pub fn new(
        store: LogStreamStore,
        factory: MockRecordFactory,
        tick_interval: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            store,
            factory,
            interval: tick_interval,
            cancel_token,
        }
    }

    /// Append one app and one web record.
    pub fn tick(&mut self) {
        self.store.append(self.factory.app_record());
        self.store.append(self.factory.web_record());
    }

    /// Run on the current runtime. The handle resolves to the tick count
    /// once the token is cancelled.
    pub fn spawn(mut self) -> JoinHandle<u64> {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; records start one interval in
            ticker.tick().await;

            info!(interval = ?self.interval, "Mock ingestion started");
            let mut ticks = 0_u64;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.tick();
                        ticks += 1;
                        debug!(ticks, "Generated mock records");
                    }
                    () = self.cancel_token.cancelled() => break,
                }
            }

            info!(ticks, "Mock ingestion stopped");
            ticks
        })
    }
}
