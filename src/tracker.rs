use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::{
    clock::{Clock, SystemClock},
    config::TrackerConfig,
    post::Post,
    statistic::{HashtagCounts, Trend},
};

/// Accumulates posts from one region and answers trend queries over them.
///
/// The post log and the cumulative counts only grow. Window queries re-tally
/// the log on every call, reading the clock once per call.
#[derive(Debug)]
pub struct TrendTracker<C = SystemClock> {
    region: String,
    posts: Vec<Post>,
    counts: HashtagCounts,
    last_updated: DateTime<Utc>,
    clock: C,
}

impl TrendTracker<SystemClock> {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for TrendTracker<SystemClock> {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl<C: Clock> TrendTracker<C> {
    pub fn with_clock(config: TrackerConfig, clock: C) -> Self {
        let last_updated = clock.now();
        Self {
            region: config.region().to_string(),
            posts: Vec::new(),
            counts: HashtagCounts::default(),
            last_updated,
            clock,
        }
    }

    /// Keeps the post if it comes from the tracked region, otherwise drops it.
    /// Returns whether the post was kept.
    pub fn ingest(&mut self, post: Post) -> bool {
        if post.location() != self.region {
            debug!(location = post.location(), "discarding post from other region");
            return false;
        }
        debug!(hashtags = post.hashtags().len(), "accepted post");
        self.counts.add_post(&post);
        self.posts.push(post);
        self.last_updated = self.clock.now();
        true
    }

    pub fn top_trends(&self, limit: usize) -> Vec<Trend> {
        self.counts.ranked(limit)
    }

    /// Trends among posts created strictly after `now - hours`.
    pub fn trends_in_window(&self, hours: i64, limit: usize) -> Vec<Trend> {
        if hours <= 0 || limit == 0 {
            return Vec::new();
        }
        let now = self.clock.now();
        // An unrepresentable cutoff lies before every post.
        let cutoff = Duration::try_hours(hours).and_then(|span| now.checked_sub_signed(span));
        self.posts
            .iter()
            .filter(|post| cutoff.is_none_or(|cutoff| post.created_at() > cutoff))
            .collect::<HashtagCounts>()
            .ranked(limit)
    }

    /// Percent change per hashtag from the hour `(now-2h, now-1h]` to the
    /// hour `(now-1h, now]`.
    ///
    /// A tag absent from the previous hour reports its raw current count
    /// instead of a percentage. Tags seen only in the previous hour are left
    /// out entirely.
    pub fn growth_rates(&self) -> BTreeMap<String, f64> {
        let now = self.clock.now();
        let one_hour_ago = now - Duration::hours(1);
        let two_hours_ago = now - Duration::hours(2);

        let current = self.tally_between(one_hour_ago, now);
        let previous = self.tally_between(two_hours_ago, one_hour_ago);

        current
            .iter()
            .map(|(tag, current_count)| {
                let previous_count = previous.get(tag);
                let rate = if previous_count == 0 {
                    current_count as f64
                } else {
                    (current_count as f64 - previous_count as f64) / previous_count as f64 * 100.0
                };
                (tag.to_string(), rate)
            })
            .collect()
    }

    /// Cumulative count for `tag`, matched case-insensitively. Unknown tags count 0.
    pub fn count_of(&self, tag: &str) -> usize {
        self.counts.get(&tag.to_lowercase())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn accepted_posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn counts(&self) -> &HashtagCounts {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Construction time, or the time of the last accepted post.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    // (from, to]
    fn tally_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> HashtagCounts {
        self.posts
            .iter()
            .filter(|post| post.created_at() > from && post.created_at() <= to)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn tracker() -> (TrendTracker<ManualClock>, ManualClock) {
        let clock = ManualClock::new(start());
        (
            TrendTracker::with_clock(TrackerConfig::default(), clock.clone()),
            clock,
        )
    }

    fn trend(tag: &str, count: usize) -> Trend {
        (tag.to_string(), count)
    }

    #[test]
    fn other_regions_are_dropped() {
        let (mut tracker, clock) = tracker();
        clock.advance(Duration::minutes(5));
        assert!(!tracker.ingest(Post::with_clock("#Tech", "US", &clock)));
        assert!(tracker.is_empty());
        assert!(tracker.counts().is_empty());
        assert_eq!(tracker.last_updated(), start());
    }

    #[test]
    fn ingest_folds_tags_into_counts() {
        let (mut tracker, clock) = tracker();
        clock.advance(Duration::minutes(5));
        assert!(tracker.ingest(Post::with_clock("#Tech #tech #AI", "SA", &clock)));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.count_of("#TECH"), 2);
        assert_eq!(tracker.count_of("#ai"), 1);
        assert_eq!(tracker.count_of("#nothing"), 0);
        assert_eq!(tracker.last_updated(), start() + Duration::minutes(5));
    }

    #[test]
    fn top_trends_limits() {
        let (mut tracker, clock) = tracker();
        tracker.ingest(Post::with_clock("#Riyadh #Tech", "SA", &clock));
        tracker.ingest(Post::with_clock("#Jeddah #Tech", "SA", &clock));
        assert!(tracker.top_trends(0).is_empty());
        assert_eq!(
            tracker.top_trends(5),
            vec![trend("#tech", 2), trend("#jeddah", 1), trend("#riyadh", 1)]
        );
        assert_eq!(tracker.top_trends(1), vec![trend("#tech", 2)]);
    }

    #[test]
    fn window_counts_only_recent_posts() {
        let (mut tracker, clock) = tracker();
        tracker.ingest(Post::with_clock("#old #both", "SA", &clock));
        clock.advance(Duration::hours(3));
        tracker.ingest(Post::with_clock("#new #both", "SA", &clock));
        clock.advance(Duration::minutes(10));

        assert_eq!(
            tracker.trends_in_window(1, 10),
            vec![trend("#both", 1), trend("#new", 1)]
        );
        assert_eq!(
            tracker.trends_in_window(4, 10),
            vec![trend("#both", 2), trend("#new", 1), trend("#old", 1)]
        );
        // cumulative counts are untouched by window queries
        assert_eq!(tracker.count_of("#old"), 1);
    }

    #[test]
    fn window_cutoff_is_exclusive() {
        let (mut tracker, clock) = tracker();
        tracker.ingest(Post::with_clock("#edge", "SA", &clock));
        clock.advance(Duration::hours(2));
        assert!(tracker.trends_in_window(2, 5).is_empty());
        assert_eq!(tracker.trends_in_window(3, 5), vec![trend("#edge", 1)]);
    }

    #[test]
    fn non_positive_window_is_empty() {
        let (mut tracker, clock) = tracker();
        tracker.ingest(Post::with_clock("#tag", "SA", &clock));
        assert!(tracker.trends_in_window(0, 5).is_empty());
        assert!(tracker.trends_in_window(-3, 5).is_empty());
        assert!(tracker.trends_in_window(1, 0).is_empty());
    }

    #[test]
    fn huge_window_covers_everything() {
        let (mut tracker, clock) = tracker();
        tracker.ingest(Post::with_clock("#tag", "SA", &clock));
        assert_eq!(tracker.trends_in_window(i64::MAX, 5), vec![trend("#tag", 1)]);
    }

    #[test]
    fn window_query_is_repeatable() {
        let (mut tracker, clock) = tracker();
        tracker.ingest(Post::with_clock("#a #b #a", "SA", &clock));
        clock.advance(Duration::minutes(30));
        tracker.ingest(Post::with_clock("#b #c", "SA", &clock));
        assert_eq!(tracker.trends_in_window(1, 3), tracker.trends_in_window(1, 3));
    }

    #[test]
    fn growth_rates_compare_adjacent_hours() {
        let (mut tracker, clock) = tracker();
        // previous hour: #up x2, #flat x1, #gone x5
        clock.advance(Duration::minutes(30));
        tracker.ingest(Post::with_clock("#up #up #flat #gone #gone", "SA", &clock));
        tracker.ingest(Post::with_clock("#gone #gone #gone", "SA", &clock));
        // current hour: #up x3, #flat x1, #fresh x3
        clock.advance(Duration::hours(1));
        tracker.ingest(Post::with_clock("#up #up #up #flat", "SA", &clock));
        tracker.ingest(Post::with_clock("#fresh #fresh #fresh", "SA", &clock));
        clock.advance(Duration::minutes(1));

        let rates = tracker.growth_rates();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates["#up"], 50.0);
        assert_eq!(rates["#flat"], 0.0);
        assert_eq!(rates["#fresh"], 3.0);
        // only seen in the previous hour: omitted rather than reported as -100%
        assert!(!rates.contains_key("#gone"));
    }

    #[test]
    fn growth_rates_boundary_belongs_to_previous_hour() {
        let (mut tracker, clock) = tracker();
        tracker.ingest(Post::with_clock("#edge", "SA", &clock));
        clock.advance(Duration::hours(1));
        tracker.ingest(Post::with_clock("#edge #edge", "SA", &clock));
        clock.advance(Duration::hours(1));
        // first post sits exactly on now-2h and falls out; second on now-1h
        // lands in the previous hour, leaving the current hour empty.
        assert!(tracker.growth_rates().is_empty());
    }

    #[test]
    fn growth_rates_ignore_older_posts() {
        let (mut tracker, clock) = tracker();
        tracker.ingest(Post::with_clock("#t #t #t #t", "SA", &clock));
        clock.advance(Duration::hours(5));
        tracker.ingest(Post::with_clock("#t", "SA", &clock));
        assert_eq!(tracker.growth_rates()["#t"], 1.0);
    }
}
