//! Gallery ordering.

use records::MediaRecord;
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Random,
    Date,
}

impl SortMode {
    pub fn toggled(self) -> Self {
        match self {
            SortMode::Random => SortMode::Date,
            SortMode::Date => SortMode::Random,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Random => "random",
            SortMode::Date => "date",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(SortMode::Random),
            "date" => Ok(SortMode::Date),
            other => Err(format!("unknown sort mode '{}', expected random or date", other)),
        }
    }
}

/// Fisher-Yates: walk from the last index down to 1, swapping with a partner
/// drawn uniformly from `[0, i]`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Ascending by upload time. A missing timestamp on either side compares equal.
pub fn compare_uploaded(a: &MediaRecord, b: &MediaRecord) -> Ordering {
    match (a.uploaded_at, b.uploaded_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    }
}

/// Stable insertion sort driven by [`compare_uploaded`].
///
/// The comparator is not a total order once timestamps are missing, so
/// `slice::sort_by` is not an option here.
pub fn sort_by_date(records: &mut [MediaRecord]) {
    for i in 1..records.len() {
        let mut j = i;
        while j > 0 && compare_uploaded(&records[j - 1], &records[j]) == Ordering::Greater {
            records.swap(j - 1, j);
            j -= 1;
        }
    }
}

pub fn apply<R: Rng + ?Sized>(records: &mut [MediaRecord], mode: SortMode, rng: &mut R) {
    match mode {
        SortMode::Random => shuffle(records, rng),
        SortMode::Date => sort_by_date(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use records::MediaType;
    use std::collections::HashMap;

    fn record(id: &str, day: Option<u32>) -> MediaRecord {
        MediaRecord {
            id: id.into(),
            media_url: format!("mem://images/{}", id),
            thumbnail_url: None,
            file_name: id.into(),
            media_type: MediaType::Image,
            uploaded_at: day.and_then(|d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).single()),
        }
    }

    fn ids(records: &[MediaRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_date_sort_is_input_order_independent() {
        let mut rng = StdRng::seed_from_u64(7);
        let base: Vec<MediaRecord> = (1..=5).map(|d| record(&format!("r{}", d), Some(d))).collect();
        for _ in 0..20 {
            let mut list = base.clone();
            shuffle(&mut list, &mut rng);
            sort_by_date(&mut list);
            assert_eq!(ids(&list), vec!["r1", "r2", "r3", "r4", "r5"]);
        }
    }

    #[test]
    fn test_missing_timestamps_do_not_panic() {
        let mut list = vec![
            record("c", Some(3)),
            record("old", None),
            record("a", Some(1)),
            record("b", Some(2)),
        ];
        sort_by_date(&mut list);
        assert_eq!(list.len(), 4);
        // "old" compares equal to everything, so nothing crosses it.
        assert_eq!(ids(&list), vec!["c", "old", "a", "b"]);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<Vec<u8>, usize> = HashMap::new();
        let trials = 60_000;
        for _ in 0..trials {
            let mut items = vec![1u8, 2, 3];
            shuffle(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        for count in counts.values() {
            // Expected 10_000 each.
            assert!((9_000..11_000).contains(count), "skewed count {}", count);
        }
    }

    #[test]
    fn test_shuffle_keeps_every_item() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut items: Vec<u32> = (0..100).collect();
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Date".parse::<SortMode>().unwrap(), SortMode::Date);
        assert!("newest".parse::<SortMode>().is_err());
        assert_eq!(SortMode::Random.toggled(), SortMode::Date);
    }
}
