//! # Thread Ranking
//!
//! Display order of a forum's threads: pinned first, then most recently
//! active, with a stable id tie-break. Pagination is forgiving; a page past
//! the end serves the last valid page instead of failing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use domains::Thread;

/// Fixed page size for thread listings.
pub const PAGE_SIZE: usize = 10;

/// A thread with its derived activity data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedThread {
    pub thread: Thread,
    /// `max(created_at)` over the thread's responses; a thread with only its
    /// root response has the root's timestamp.
    pub last_activity: DateTime<Utc>,
    pub response_count: u32,
}

/// One page of a forum listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadPage {
    /// The page actually served; out-of-range requests clamp to this.
    pub page: u32,
    pub page_count: u32,
    pub threads: Vec<RankedThread>,
}

/// Sorts by `(pinned DESC, last_activity DESC, id ASC)`.
pub fn rank(mut entries: Vec<RankedThread>) -> Vec<RankedThread> {
    entries.sort_by(|a, b| {
        b.thread
            .pinned
            .cmp(&a.thread.pinned)
            .then_with(|| b.last_activity.cmp(&a.last_activity))
            .then_with(|| a.thread.id.cmp(&b.thread.id))
    });
    entries
}

/// Cuts one 1-based page out of a ranked listing.
pub fn paginate(ranked: Vec<RankedThread>, requested: u32) -> ThreadPage {
    let page_count = ranked.len().div_ceil(PAGE_SIZE).max(1) as u32;
    let page = requested.clamp(1, page_count);
    let start = (page as usize - 1) * PAGE_SIZE;
    let threads = ranked.into_iter().skip(start).take(PAGE_SIZE).collect();
    ThreadPage {
        page,
        page_count,
        threads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn entry(pinned: bool, last_activity: DateTime<Utc>) -> RankedThread {
        RankedThread {
            thread: Thread {
                id: Uuid::now_v7(),
                forum_id: Uuid::nil(),
                title: "t".to_string(),
                pinned,
                created_at: last_activity,
            },
            last_activity,
            response_count: 1,
        }
    }

    #[test]
    fn pinned_threads_precede_unpinned_regardless_of_recency() {
        let now = Utc::now();
        let stale_pinned = entry(true, now - Duration::days(30));
        let fresh_unpinned = entry(false, now);
        let ranked = rank(vec![fresh_unpinned.clone(), stale_pinned.clone()]);
        assert_eq!(ranked[0].thread.id, stale_pinned.thread.id);
        assert_eq!(ranked[1].thread.id, fresh_unpinned.thread.id);
    }

    #[test]
    fn within_a_group_most_recent_first() {
        let now = Utc::now();
        let older = entry(false, now - Duration::hours(2));
        let newer = entry(false, now);
        let ranked = rank(vec![older.clone(), newer.clone()]);
        assert_eq!(ranked[0].thread.id, newer.thread.id);
    }

    #[test]
    fn equal_activity_ties_break_on_thread_id() {
        let now = Utc::now();
        let a = entry(false, now);
        let b = entry(false, now);
        let expected_first = a.thread.id.min(b.thread.id);
        let ranked = rank(vec![b, a]);
        assert_eq!(ranked[0].thread.id, expected_first);
    }

    #[test]
    fn eleven_threads_split_ten_and_one() {
        let now = Utc::now();
        let entries: Vec<_> = (0..11)
            .map(|i| entry(false, now - Duration::minutes(i)))
            .collect();
        let ranked = rank(entries);
        let page1 = paginate(ranked.clone(), 1);
        assert_eq!(page1.threads.len(), 10);
        assert_eq!(page1.page_count, 2);
        let page2 = paginate(ranked, 2);
        assert_eq!(page2.threads.len(), 1);
    }

    #[test]
    fn page_past_the_end_serves_the_last_page() {
        let now = Utc::now();
        let entries: Vec<_> = (0..11)
            .map(|i| entry(false, now - Duration::minutes(i)))
            .collect();
        let ranked = rank(entries);
        let last = paginate(ranked.clone(), 2);
        let clamped = paginate(ranked, 99);
        assert_eq!(clamped, last);
        assert_eq!(clamped.page, 2);
    }

    #[test]
    fn empty_forum_serves_one_empty_page() {
        let page = paginate(Vec::new(), 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_count, 1);
        assert!(page.threads.is_empty());
    }

    #[test]
    fn page_zero_clamps_to_the_first_page() {
        let now = Utc::now();
        let ranked = rank(vec![entry(false, now)]);
        assert_eq!(paginate(ranked, 0).page, 1);
    }
}
