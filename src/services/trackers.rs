// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracker state transitions and derived metrics.
//!
//! Every transition takes the current collection and returns a new one.
//! Unknown keys are no-ops, so none of these functions can fail.

use chrono::{DateTime, Utc};

use crate::models::{DurationParts, HeaderSummary, Tracker, TrackerMetrics, TrackerSummary};
use crate::time_utils::now_millis;

const MILLIS_PER_SECOND: i64 = 1000;
const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Page title used when no tracker has made progress.
pub const DEFAULT_TITLE: &str = "Timers";
/// Key prefix used when a label has no usable characters.
pub const TRACKER_KEY_PREFIX: &str = "tracker";

/// Lowercase, collapse non-alphanumeric runs into `-`, trim the hyphens.
fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_hyphen = false;

    for c in label.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// `base`, or `base-1`, `base-2`, ... whichever is first not `taken`.
pub(crate) fn unique_key(base: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&base) {
        return base;
    }
    let mut attempt = 1u64;
    loop {
        let candidate = format!("{base}-{attempt}");
        if !taken(&candidate) {
            return candidate;
        }
        attempt += 1;
    }
}

fn map_tracker(
    trackers: &[Tracker],
    key: &str,
    update: impl Fn(&Tracker) -> Tracker,
) -> Vec<Tracker> {
    trackers
        .iter()
        .map(|t| if t.key == key { update(t) } else { t.clone() })
        .collect()
}

fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - start).num_milliseconds().max(0);
    (millis / MILLIS_PER_SECOND) as u64
}

/// Append a new idle tracker whose key is derived from `label`.
pub fn add_tracker(trackers: &[Tracker], label: &str) -> Vec<Tracker> {
    let mut base = slugify(label);
    if base.is_empty() {
        base = format!("{TRACKER_KEY_PREFIX}-{}", now_millis());
    }
    let key = unique_key(base, |candidate| trackers.iter().any(|t| t.key == candidate));

    let mut next = trackers.to_vec();
    next.push(Tracker::new(key, label.trim()));
    next
}

/// Start (or restart) the clock on the matching tracker.
pub fn start_tracker(trackers: &[Tracker], key: &str, now: DateTime<Utc>) -> Vec<Tracker> {
    map_tracker(trackers, key, |t| Tracker {
        start_time: Some(now),
        ..t.clone()
    })
}

/// End a running streak, folding its duration into the relapse history.
pub fn relapse_tracker(trackers: &[Tracker], key: &str, now: DateTime<Utc>) -> Vec<Tracker> {
    map_tracker(trackers, key, |t| match t.start_time {
        None => t.clone(),
        Some(start) => Tracker {
            start_time: None,
            total_relapses: t.total_relapses.saturating_add(1),
            total_elapsed_seconds: t
                .total_elapsed_seconds
                .saturating_add(elapsed_seconds(start, now)),
            ..t.clone()
        },
    })
}

/// Stop the matching tracker and clear its history.
pub fn reset_tracker(trackers: &[Tracker], key: &str) -> Vec<Tracker> {
    map_tracker(trackers, key, |t| Tracker {
        start_time: None,
        total_relapses: 0,
        total_elapsed_seconds: 0,
        ..t.clone()
    })
}

pub fn delete_tracker(trackers: &[Tracker], key: &str) -> Vec<Tracker> {
    trackers.iter().filter(|t| t.key != key).cloned().collect()
}

/// Time since `start_time`, or zero while idle.
pub fn compute_elapsed_parts(start_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DurationParts {
    match start_time {
        None => DurationParts::default(),
        Some(start) => DurationParts::from_seconds(elapsed_seconds(start, now)),
    }
}

/// Percent of the goal reached, rounded to 4 decimals and clamped to `[0, 100]`.
pub fn compute_progress(
    start_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    goal_duration_days: u32,
) -> f64 {
    let Some(start) = start_time else {
        return 0.0;
    };
    let goal_ms = f64::from(goal_duration_days.max(1)) * MILLIS_PER_DAY;
    let pct = (now - start).num_milliseconds() as f64 / goal_ms * 100.0;
    let rounded = (pct * 10_000.0).round() / 10_000.0;
    rounded.clamp(0.0, 100.0)
}

/// Mean run length before a relapse.
pub fn compute_average_relapse_duration(tracker: &Tracker) -> DurationParts {
    if tracker.total_relapses == 0 {
        return DurationParts::default();
    }
    DurationParts::from_seconds(tracker.total_elapsed_seconds / tracker.total_relapses)
}

pub fn build_tracker_summary(
    tracker: &Tracker,
    now: DateTime<Utc>,
    goal_duration_days: u32,
) -> TrackerSummary {
    let progress = compute_progress(tracker.start_time, now, goal_duration_days);
    TrackerSummary {
        tracker: tracker.clone(),
        metrics: TrackerMetrics {
            elapsed: compute_elapsed_parts(tracker.start_time, now),
            average_before_relapse: compute_average_relapse_duration(tracker),
            progress,
            remaining_percent: (100.0 - progress).max(0.0),
        },
    }
}

/// Pick the headline tracker.
///
/// A pinned tracker wins only while it is running. Otherwise the first
/// tracker with the highest progress is used.
pub fn derive_header_summary(
    summaries: &[TrackerSummary],
    selected_key: &str,
) -> Option<HeaderSummary> {
    let selected = summaries
        .iter()
        .find(|s| s.tracker.key == selected_key && s.tracker.is_running());

    let best = summaries.iter().reduce(|best, s| {
        if s.metrics.progress > best.metrics.progress {
            s
        } else {
            best
        }
    });

    let target = selected.or(best)?;
    Some(HeaderSummary {
        label: target.tracker.label.clone(),
        progress: target.metrics.progress,
        uses_selected_tracker: selected.is_some(),
    })
}

/// Window title for the dashboard.
pub fn document_title(header: Option<&HeaderSummary>) -> String {
    match header {
        Some(h) if h.progress > 0.0 => format!("{:.2}% ({})", h.progress, h.label),
        _ => DEFAULT_TITLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn keys(trackers: &[Tracker]) -> Vec<&str> {
        trackers.iter().map(|t| t.key.as_str()).collect()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Social Media!! "), "social-media");
        assert_eq!(slugify("--Sugar & Sweets--"), "sugar-sweets");
        assert_eq!(slugify("Café"), "caf");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_add_tracker_disambiguates_keys() {
        let mut trackers = Vec::new();
        for _ in 0..3 {
            trackers = add_tracker(&trackers, "Sugar");
        }
        assert_eq!(keys(&trackers), ["sugar", "sugar-1", "sugar-2"]);
        assert!(trackers.iter().all(|t| t.label == "Sugar" && !t.is_running()));
    }

    #[test]
    fn test_add_tracker_skips_taken_suffix() {
        let trackers = vec![Tracker::new("sugar", "Sugar"), Tracker::new("sugar-1", "x")];
        let next = add_tracker(&trackers, "sugar");
        assert_eq!(keys(&next), ["sugar", "sugar-1", "sugar-2"]);
    }

    #[test]
    fn test_add_tracker_empty_slug_falls_back() {
        let trackers = add_tracker(&[], "  ***  ");
        assert!(trackers[0].key.starts_with("tracker-"));
        assert_eq!(trackers[0].label, "***");
    }

    #[test]
    fn test_add_tracker_appends_in_order() {
        let trackers = add_tracker(&add_tracker(&[], "Zebra"), "Apple");
        assert_eq!(keys(&trackers), ["zebra", "apple"]);
    }

    #[test]
    fn test_start_and_restart() {
        let trackers = vec![Tracker::new("a", "A"), Tracker::new("b", "B")];
        let started = start_tracker(&trackers, "a", t0());
        assert_eq!(started[0].start_time, Some(t0()));
        assert_eq!(started[1], trackers[1]);

        let later = t0() + Duration::hours(1);
        let restarted = start_tracker(&started, "a", later);
        assert_eq!(restarted[0].start_time, Some(later));
    }

    #[test]
    fn test_relapse_after_125_seconds() {
        let trackers = start_tracker(&[Tracker::new("a", "A")], "a", t0());
        let relapsed = relapse_tracker(&trackers, "a", t0() + Duration::milliseconds(125_900));

        assert_eq!(relapsed[0].total_relapses, 1);
        assert_eq!(relapsed[0].total_elapsed_seconds, 125);
        assert_eq!(relapsed[0].start_time, None);
    }

    #[test]
    fn test_relapse_saturates_counters() {
        let trackers = vec![Tracker {
            start_time: Some(t0()),
            total_relapses: u64::MAX,
            total_elapsed_seconds: u64::MAX,
            ..Tracker::new("a", "A")
        }];
        let relapsed = relapse_tracker(&trackers, "a", t0() + Duration::seconds(5));

        assert_eq!(relapsed[0].total_relapses, u64::MAX);
        assert_eq!(relapsed[0].total_elapsed_seconds, u64::MAX);
        assert_eq!(relapsed[0].start_time, None);
    }

    #[test]
    fn test_relapse_idle_is_noop() {
        let trackers = vec![Tracker::new("a", "A")];
        assert_eq!(relapse_tracker(&trackers, "a", t0()), trackers);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut trackers = start_tracker(&[Tracker::new("a", "A")], "a", t0());
        trackers = relapse_tracker(&trackers, "a", t0() + Duration::seconds(50));
        trackers = start_tracker(&trackers, "a", t0() + Duration::seconds(60));

        let reset = reset_tracker(&trackers, "a");
        assert_eq!(reset[0], Tracker::new("a", "A"));
        assert_eq!(
            compute_progress(reset[0].start_time, t0() + Duration::days(5), 60),
            0.0
        );
    }

    #[test]
    fn test_delete_tracker() {
        let trackers = vec![Tracker::new("a", "A"), Tracker::new("b", "B")];
        assert_eq!(keys(&delete_tracker(&trackers, "a")), ["b"]);
        assert_eq!(delete_tracker(&trackers, "missing"), trackers);
    }

    #[test]
    fn test_elapsed_parts() {
        assert_eq!(compute_elapsed_parts(None, t0()), DurationParts::default());

        let now = t0() + Duration::seconds(2 * 86_400 + 3 * 3600 + 4 * 60 + 5);
        assert_eq!(
            compute_elapsed_parts(Some(t0()), now),
            DurationParts {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );

        // Clock behind the start time never goes negative.
        assert_eq!(
            compute_elapsed_parts(Some(t0()), t0() - Duration::seconds(10)),
            DurationParts::default()
        );
    }

    #[test]
    fn test_progress() {
        assert_eq!(compute_progress(None, t0(), 60), 0.0);
        assert_eq!(compute_progress(Some(t0()), t0() + Duration::days(6), 60), 10.0);
        assert_eq!(compute_progress(Some(t0()), t0() + Duration::days(60), 60), 100.0);
        assert_eq!(compute_progress(Some(t0()), t0() + Duration::days(90), 60), 100.0);
        assert_eq!(compute_progress(Some(t0()), t0() - Duration::days(1), 60), 0.0);

        // 1 second of a 1-day goal is 0.001157...% -> 0.0012
        assert_eq!(compute_progress(Some(t0()), t0() + Duration::seconds(1), 1), 0.0012);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut previous = 0.0;
        for hours in 0..(61 * 24) {
            let p = compute_progress(Some(t0()), t0() + Duration::hours(hours), 60);
            assert!(p >= previous, "progress decreased at {hours}h");
            previous = p;
        }
        assert_eq!(previous, 100.0);
    }

    #[test]
    fn test_average_relapse_duration() {
        assert_eq!(
            compute_average_relapse_duration(&Tracker::new("a", "A")),
            DurationParts::default()
        );

        let mut trackers = start_tracker(&[Tracker::new("a", "A")], "a", t0());
        trackers = relapse_tracker(&trackers, "a", t0() + Duration::seconds(100));
        let restart = t0() + Duration::seconds(1000);
        trackers = start_tracker(&trackers, "a", restart);
        trackers = relapse_tracker(&trackers, "a", restart + Duration::seconds(300));

        assert_eq!(trackers[0].total_elapsed_seconds, 400);
        assert_eq!(
            compute_average_relapse_duration(&trackers[0]),
            DurationParts {
                days: 0,
                hours: 0,
                minutes: 3,
                seconds: 20
            }
        );
    }

    fn header_fixture(now: DateTime<Utc>) -> Vec<TrackerSummary> {
        let trackers = vec![
            Tracker {
                start_time: Some(now - Duration::days(6)),
                ..Tracker::new("A", "Alpha")
            },
            Tracker::new("B", "Beta"),
        ];
        trackers
            .iter()
            .map(|t| build_tracker_summary(t, now, 60))
            .collect()
    }

    #[test]
    fn test_header_falls_back_when_selected_is_idle() {
        let summaries = header_fixture(t0());
        let header = derive_header_summary(&summaries, "B").unwrap();
        assert_eq!(header.label, "Alpha");
        assert_eq!(header.progress, 10.0);
        assert!(!header.uses_selected_tracker);
    }

    #[test]
    fn test_header_uses_running_selection() {
        let summaries = header_fixture(t0());
        let header = derive_header_summary(&summaries, "A").unwrap();
        assert_eq!(header.label, "Alpha");
        assert!(header.uses_selected_tracker);
    }

    #[test]
    fn test_running_selection_beats_higher_progress() {
        let now = t0();
        let trackers = [
            Tracker {
                start_time: Some(now - Duration::days(6)),
                ..Tracker::new("A", "Alpha")
            },
            Tracker {
                start_time: Some(now - Duration::hours(30)),
                ..Tracker::new("B", "Beta")
            },
        ];
        let summaries: Vec<_> = trackers
            .iter()
            .map(|t| build_tracker_summary(t, now, 60))
            .collect();

        let header = derive_header_summary(&summaries, "B").unwrap();
        assert_eq!(header.label, "Beta");
        assert!(header.uses_selected_tracker);
        assert!(header.progress < summaries[0].metrics.progress);

        let unpinned = derive_header_summary(&summaries, "").unwrap();
        assert_eq!(unpinned.label, "Alpha");
        assert!(!unpinned.uses_selected_tracker);
    }

    #[test]
    fn test_header_ties_pick_first() {
        let summaries: Vec<_> = [Tracker::new("x", "X"), Tracker::new("y", "Y")]
            .iter()
            .map(|t| build_tracker_summary(t, t0(), 60))
            .collect();
        let header = derive_header_summary(&summaries, "").unwrap();
        assert_eq!(header.label, "X");
        assert_eq!(derive_header_summary(&[], "x"), None);
    }

    #[test]
    fn test_summary_metrics() {
        let summary = build_tracker_summary(&header_fixture(t0())[0].tracker, t0(), 60);
        assert_eq!(summary.metrics.progress, 10.0);
        assert_eq!(summary.metrics.remaining_percent, 90.0);
        assert_eq!(summary.metrics.elapsed.days, 6);
    }

    #[test]
    fn test_document_title() {
        assert_eq!(document_title(None), "Timers");
        let header = HeaderSummary {
            label: "Sugar".to_string(),
            progress: 12.3456,
            uses_selected_tracker: false,
        };
        assert_eq!(document_title(Some(&header)), "12.35% (Sugar)");
        let idle = HeaderSummary {
            progress: 0.0,
            ..header
        };
        assert_eq!(document_title(Some(&idle)), "Timers");
    }
}
