//! The filter/sort engine.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::{FilterSpec, SortKey};
use crate::anime::AnimeRecord;

/// Filtered and ordered records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOutcome {
    pub records: Vec<AnimeRecord>,
    /// Number of records that passed the filter, before any pagination.
    pub match_count: usize,
}

/// Filter `records` with `spec` and order the survivors by `sort`.
///
/// The output is fully determined by the inputs: equal sort values, and
/// records missing the sort field, fall back to ascending id. Records missing
/// the sort field come after all records that have it, whichever the
/// direction.
pub fn apply(records: &[AnimeRecord], spec: &FilterSpec, sort: SortKey) -> FilterOutcome {
    let mut matched: Vec<AnimeRecord> = records
        .iter()
        .filter(|record| spec.matches(record))
        .cloned()
        .collect();

    matched.sort_by(|a, b| compare(a, b, sort));

    FilterOutcome {
        match_count: matched.len(),
        records: matched,
    }
}

fn compare(a: &AnimeRecord, b: &AnimeRecord, sort: SortKey) -> Ordering {
    let primary = match sort {
        SortKey::ScoreDesc => present_first(a.mean_score, b.mean_score, |x, y| y.total_cmp(&x)),
        SortKey::ScoreAsc => present_first(a.mean_score, b.mean_score, |x, y| x.total_cmp(&y)),
        SortKey::TitleAsc => title_key(a).cmp(&title_key(b)),
        SortKey::TitleDesc => title_key(b).cmp(&title_key(a)),
        // Rank 1 is the most popular, so "descending popularity" is ascending rank.
        SortKey::PopularityDesc => {
            present_first(a.popularity_rank, b.popularity_rank, |x, y| x.cmp(&y))
        }
        SortKey::PopularityAsc => {
            present_first(a.popularity_rank, b.popularity_rank, |x, y| y.cmp(&x))
        }
        SortKey::DateDesc => present_first(a.release_year, b.release_year, |x, y| y.cmp(&x)),
        SortKey::DateAsc => present_first(a.release_year, b.release_year, |x, y| x.cmp(&y)),
    };

    primary.then_with(|| a.id.cmp(&b.id))
}

fn present_first<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn title_key(record: &AnimeRecord) -> String {
    record.title.to_lowercase()
}

/// Keep at most `limit` records starting at `offset`. The match count is
/// left untouched.
pub fn paginate(outcome: FilterOutcome, offset: usize, limit: Option<usize>) -> FilterOutcome {
    let records = outcome
        .records
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    FilterOutcome {
        records,
        match_count: outcome.match_count,
    }
}

/// Count how many records carry each genre, most common first and then by
/// name.
pub fn genre_counts(records: &[AnimeRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for genre in records.iter().flat_map(|r| r.genres.iter()) {
        *counts.entry(genre.as_str()).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(genre, count)| (genre.to_string(), count))
        .collect();
    counts.sort_by(|(a_name, a_count), (b_name, b_count)| {
        b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
    });
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anime(id: u64, title: &str, score: Option<f64>, year: Option<i32>, genres: &[&str]) -> AnimeRecord {
        let mut record = AnimeRecord::new(id, title);
        record.mean_score = score;
        record.release_year = year;
        record.genres = genres.iter().map(|g| g.to_string()).collect();
        record
    }

    fn ids(outcome: &FilterOutcome) -> Vec<u64> {
        outcome.records.iter().map(|r| r.id).collect()
    }

    fn two_records() -> Vec<AnimeRecord> {
        vec![
            anime(1, "A", Some(8.0), Some(2020), &["Action"]),
            anime(2, "B", Some(9.0), Some(2019), &["Comedy"]),
        ]
    }

    #[test]
    fn test_min_score_with_score_desc() {
        let spec = FilterSpec::new().min_score(8.5);
        let outcome = apply(&two_records(), &spec, SortKey::ScoreDesc);

        assert_eq!(ids(&outcome), vec![2]);
        assert_eq!(outcome.match_count, 1);
    }

    #[test]
    fn test_no_constraints_with_title_asc() {
        let outcome = apply(&two_records(), &FilterSpec::new(), SortKey::TitleAsc);

        assert_eq!(ids(&outcome), vec![1, 2]);
        assert_eq!(outcome.match_count, 2);
    }

    #[test]
    fn test_ties_break_on_id_not_input_order() {
        let records = vec![
            anime(30, "C", Some(7.0), None, &[]),
            anime(10, "A", Some(7.0), None, &[]),
            anime(20, "B", Some(7.0), None, &[]),
        ];

        let desc = apply(&records, &FilterSpec::new(), SortKey::ScoreDesc);
        let asc = apply(&records, &FilterSpec::new(), SortKey::ScoreAsc);
        assert_eq!(ids(&desc), vec![10, 20, 30]);
        assert_eq!(ids(&asc), vec![10, 20, 30]);

        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(ids(&apply(&reversed, &FilterSpec::new(), SortKey::ScoreDesc)), vec![10, 20, 30]);
    }

    #[test]
    fn test_apply_is_deterministic() {
        let records = vec![
            anime(5, "Monster", Some(8.9), Some(2004), &["Drama", "Mystery"]),
            anime(3, "Mushishi", Some(8.7), Some(2005), &["Adventure", "Mystery"]),
            anime(9, "Ping Pong", Some(8.6), Some(2014), &["Sports"]),
            anime(1, "Kaiba", Some(8.6), Some(2008), &["Mystery"]),
            anime(4, "Texhnolyze", None, Some(2003), &["Drama"]),
        ];
        let spec = FilterSpec::new().exclude_genre("sports");

        for sort in SortKey::ALL {
            let first = apply(&records, &spec, sort);
            let second = apply(&records, &spec, sort);
            assert_eq!(first, second, "sort {} is not deterministic", sort);
        }
    }

    #[test]
    fn test_missing_sort_field_goes_last_both_ways() {
        let records = vec![
            anime(1, "Unscored", None, None, &[]),
            anime(2, "Low", Some(5.0), None, &[]),
            anime(3, "High", Some(9.0), None, &[]),
        ];

        let desc = apply(&records, &FilterSpec::new(), SortKey::ScoreDesc);
        let asc = apply(&records, &FilterSpec::new(), SortKey::ScoreAsc);
        assert_eq!(ids(&desc), vec![3, 2, 1]);
        assert_eq!(ids(&asc), vec![2, 3, 1]);
    }

    #[test]
    fn test_title_sort_ignores_case() {
        let records = vec![
            anime(1, "zeta", None, None, &[]),
            anime(2, "Alpha", None, None, &[]),
            anime(3, "beta", None, None, &[]),
        ];

        let asc = apply(&records, &FilterSpec::new(), SortKey::TitleAsc);
        let desc = apply(&records, &FilterSpec::new(), SortKey::TitleDesc);
        assert_eq!(ids(&asc), vec![2, 3, 1]);
        assert_eq!(ids(&desc), vec![1, 3, 2]);
    }

    #[test]
    fn test_popularity_desc_puts_rank_one_first() {
        let mut records = vec![
            AnimeRecord::new(1, "Niche"),
            AnimeRecord::new(2, "Hit"),
            AnimeRecord::new(3, "Unranked"),
        ];
        records[0].popularity_rank = Some(4000);
        records[1].popularity_rank = Some(1);

        let desc = apply(&records, &FilterSpec::new(), SortKey::PopularityDesc);
        let asc = apply(&records, &FilterSpec::new(), SortKey::PopularityAsc);
        assert_eq!(ids(&desc), vec![2, 1, 3]);
        assert_eq!(ids(&asc), vec![1, 2, 3]);
    }

    #[test]
    fn test_date_sort_uses_release_year() {
        let records = two_records();
        assert_eq!(ids(&apply(&records, &FilterSpec::new(), SortKey::DateDesc)), vec![1, 2]);
        assert_eq!(ids(&apply(&records, &FilterSpec::new(), SortKey::DateAsc)), vec![2, 1]);
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let records = two_records();
        let before = records.clone();
        let _ = apply(&records, &FilterSpec::new().min_score(8.5), SortKey::TitleDesc);
        assert_eq!(records, before);
    }

    #[test]
    fn test_zero_matches_is_empty_outcome() {
        let outcome = apply(&two_records(), &FilterSpec::new().min_score(9.5), SortKey::ScoreDesc);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.match_count, 0);
    }

    #[test]
    fn test_paginate_keeps_match_count() {
        let records: Vec<AnimeRecord> = (1..=5)
            .map(|id| anime(id, "x", Some(id as f64), None, &[]))
            .collect();
        let outcome = apply(&records, &FilterSpec::new(), SortKey::ScoreDesc);

        let page = paginate(outcome.clone(), 1, Some(2));
        assert_eq!(ids(&page), vec![4, 3]);
        assert_eq!(page.match_count, 5);

        let tail = paginate(outcome.clone(), 4, None);
        assert_eq!(ids(&tail), vec![1]);

        let past_end = paginate(outcome, 10, Some(3));
        assert!(past_end.records.is_empty());
        assert_eq!(past_end.match_count, 5);
    }

    #[test]
    fn test_genre_counts_order() {
        let records = vec![
            anime(1, "a", None, None, &["Drama", "Action"]),
            anime(2, "b", None, None, &["Comedy", "Action"]),
            anime(3, "c", None, None, &["Comedy", "Drama", "Action"]),
            anime(4, "d", None, None, &["Romance"]),
        ];

        let counts = genre_counts(&records);
        assert_eq!(
            counts,
            vec![
                ("Action".to_string(), 3),
                ("Comedy".to_string(), 2),
                ("Drama".to_string(), 2),
                ("Romance".to_string(), 1),
            ]
        );
    }
}
