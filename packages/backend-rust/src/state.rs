use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::clock::Clock;
use crate::config::Config;
use crate::db::Repository;
use crate::services::admin_auth::AdminAuth;
use crate::services::{ProgressUpdater, StatsAggregator, WordSelector};

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    repo: Arc<dyn Repository>,
    clock: Clock,
    admin_auth: Arc<AdminAuth>,
    max_write_attempts: u32,
}

impl AppState {
    pub fn new(config: &Config, repo: Arc<dyn Repository>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            repo,
            clock: config.clock,
            admin_auth: Arc::new(AdminAuth::new(&config.admin)),
            max_write_attempts: config.study.max_write_attempts,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn repo(&self) -> Arc<dyn Repository> {
        Arc::clone(&self.repo)
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn admin_auth(&self) -> Arc<AdminAuth> {
        Arc::clone(&self.admin_auth)
    }

    pub fn word_selector(&self) -> WordSelector {
        WordSelector::new(self.repo(), self.clock)
    }

    pub fn progress_updater(&self) -> ProgressUpdater {
        ProgressUpdater::new(self.repo(), self.clock, self.max_write_attempts)
    }

    pub fn stats_aggregator(&self) -> StatsAggregator {
        StatsAggregator::new(self.repo(), self.clock)
    }
}
