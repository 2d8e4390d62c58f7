//! Inclusive ranges used for list filters and statistics windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coil::{Coil, CoilId};

/// Closed interval `[min, max]`, both ends inclusive.
///
/// No ordering is enforced here: a range with `min > max` simply matches
/// nothing. Callers that need an ordered range check [`ClosedRange::is_ordered`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosedRange<T> {
    pub min: T,
    pub max: T,
}

/// Inclusive statistics window.
pub type TimeWindow = ClosedRange<DateTime<Utc>>;

impl<T: PartialOrd> ClosedRange<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Build a range only when both bounds were supplied.
    pub fn from_bounds(min: Option<T>, max: Option<T>) -> Option<Self> {
        match (min, max) {
            (Some(min), Some(max)) => Some(Self { min, max }),
            _ => None,
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.min <= *value && *value <= self.max
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Filter for listing coils. Every populated range must match (logical AND).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoilFilter {
    pub id_range: Option<ClosedRange<CoilId>>,
    pub weight_range: Option<ClosedRange<f64>>,
    pub length_range: Option<ClosedRange<f64>>,
    pub date_added_range: Option<ClosedRange<DateTime<Utc>>>,
    /// Never matches active coils.
    pub date_removed_range: Option<ClosedRange<DateTime<Utc>>>,
}

impl CoilFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_range(mut self, min: CoilId, max: CoilId) -> Self {
        self.id_range = Some(ClosedRange::new(min, max));
        self
    }

    pub fn with_weight_range(mut self, min: f64, max: f64) -> Self {
        self.weight_range = Some(ClosedRange::new(min, max));
        self
    }

    pub fn with_length_range(mut self, min: f64, max: f64) -> Self {
        self.length_range = Some(ClosedRange::new(min, max));
        self
    }

    pub fn with_date_added_range(mut self, min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        self.date_added_range = Some(ClosedRange::new(min, max));
        self
    }

    pub fn with_date_removed_range(mut self, min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        self.date_removed_range = Some(ClosedRange::new(min, max));
        self
    }

    /// True when no range is set and every coil matches.
    pub fn is_unfiltered(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, coil: &Coil) -> bool {
        fn within<T: PartialOrd>(range: &Option<ClosedRange<T>>, value: &T) -> bool {
            range.as_ref().is_none_or(|r| r.contains(value))
        }

        within(&self.id_range, &coil.id)
            && within(&self.weight_range, &coil.weight)
            && within(&self.length_range, &coil.length)
            && within(&self.date_added_range, &coil.date_added)
            && match (&self.date_removed_range, &coil.date_removed) {
                (None, _) => true,
                (Some(range), Some(removed)) => range.contains(removed),
                (Some(_), None) => false,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_coil(id: i64, removed: bool) -> Coil {
        let added = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Coil {
            id: CoilId::new(id),
            length: 10.0,
            weight: 20.0,
            date_added: added,
            date_removed: removed.then(|| added + Duration::hours(6)),
        }
    }

    #[test]
    fn test_from_bounds_requires_both() {
        assert_eq!(ClosedRange::from_bounds(Some(1), Some(3)), Some(ClosedRange::new(1, 3)));
        assert_eq!(ClosedRange::from_bounds(Some(1), None::<i32>), None);
        assert_eq!(ClosedRange::from_bounds(None, Some(3)), None);
        assert_eq!(ClosedRange::<i32>::from_bounds(None, None), None);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = ClosedRange::new(1.0, 2.0);
        assert!(range.contains(&1.0));
        assert!(range.contains(&2.0));
        assert!(!range.contains(&2.000_001));
        assert!(range.is_ordered());
        assert!(!ClosedRange::new(3, 1).is_ordered());
        assert!(!ClosedRange::new(3, 1).contains(&2));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = CoilFilter::new();
        assert!(filter.is_unfiltered());
        assert!(filter.matches(&sample_coil(1, false)));
        assert!(filter.matches(&sample_coil(2, true)));
    }

    #[test]
    fn test_date_removed_range_skips_active_coils() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let filter = CoilFilter::new().with_date_removed_range(start, start + Duration::days(1));
        assert!(!filter.is_unfiltered());
        assert!(!filter.matches(&sample_coil(1, false)));
        assert!(filter.matches(&sample_coil(2, true)));
    }

    #[test]
    fn test_filters_combine_with_and() {
        let coil = sample_coil(5, false);
        let matching = CoilFilter::new()
            .with_id_range(CoilId::new(5), CoilId::new(5))
            .with_weight_range(19.0, 21.0)
            .with_length_range(9.0, 11.0);
        assert!(matching.matches(&coil));

        let wrong_length = matching.clone().with_length_range(11.0, 12.0);
        assert!(!wrong_length.matches(&coil));
    }
}
