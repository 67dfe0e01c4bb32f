use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    clock::{Clock, SystemClock},
    config::TrackerConfig,
    post::Post,
    statistic::Trend,
    tracker::TrendTracker,
};

/// A cloneable handle to one tracker shared between threads.
///
/// Ingest takes the write lock; queries share the read lock for their whole
/// run, so each one sees every ingest that completed before it started.
#[derive(Debug)]
pub struct SharedTracker<C = SystemClock> {
    inner: Arc<RwLock<TrendTracker<C>>>,
}

impl<C> Clone for SharedTracker<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedTracker<SystemClock> {
    pub fn new(config: TrackerConfig) -> Self {
        Self::from_tracker(TrendTracker::new(config))
    }
}

impl<C: Clock> SharedTracker<C> {
    pub fn with_clock(config: TrackerConfig, clock: C) -> Self {
        Self::from_tracker(TrendTracker::with_clock(config, clock))
    }

    pub fn from_tracker(tracker: TrendTracker<C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tracker)),
        }
    }

    pub fn ingest(&self, post: Post) -> bool {
        self.write().ingest(post)
    }

    pub fn top_trends(&self, limit: usize) -> Vec<Trend> {
        self.read().top_trends(limit)
    }

    pub fn trends_in_window(&self, hours: i64, limit: usize) -> Vec<Trend> {
        self.read().trends_in_window(hours, limit)
    }

    pub fn growth_rates(&self) -> BTreeMap<String, f64> {
        self.read().growth_rates()
    }

    pub fn count_of(&self, tag: &str) -> usize {
        self.read().count_of(tag)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn with_snapshot<R>(&self, f: impl FnOnce(&TrendTracker<C>) -> R) -> R {
        f(&self.read())
    }

    // A panic mid-ingest leaves at most one post partially counted; keep serving.
    fn read(&self) -> RwLockReadGuard<'_, TrendTracker<C>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrendTracker<C>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
