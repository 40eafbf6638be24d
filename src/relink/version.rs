//! # Version Labels
//!
//! Snapshot labels come from one of three strategies, each with its own
//! determinism profile:
//!
//! - [`VersionKind::Timestamp`]: pure function of the clock, `%Y%m%d%H%M%S`.
//! - [`VersionKind::UserInput`]: caller-supplied, validated only.
//! - [`VersionKind::AutoIncrement`]: reads the store's last version and bumps
//!   its trailing number.
//!
//! Generated labels never collide with an existing one: a timestamp taken in
//! the same second gets a zero-padded `-NNN` suffix and auto-increment keeps
//! counting until it reaches an unused label. The trailing number is bumped as
//! a digit string, so it has no upper bound. A user label that is already
//! taken is an error.

use crate::error::{RelinkError, Result};
use crate::store::DataStore;
use chrono::{DateTime, Local, TimeZone};
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

// Collision suffixes are zero-padded so labels from the same second sort in
// order up to 999 collisions.
const SUFFIX_WIDTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionKind {
    Timestamp,
    UserInput(String),
    AutoIncrement,
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionKind::Timestamp => write!(f, "timestamp"),
            VersionKind::UserInput(label) => write!(f, "user input ({})", label),
            VersionKind::AutoIncrement => write!(f, "auto increment"),
        }
    }
}

/// Produce a version label for `kind` that is not yet used in `store`.
pub fn generate<S: DataStore>(store: &S, kind: &VersionKind) -> Result<String> {
    match kind {
        VersionKind::Timestamp => unique_timestamp(store, Local::now()),
        VersionKind::UserInput(label) => validate_user_label(store, label),
        VersionKind::AutoIncrement => {
            let last = store.last_version()?;
            let mut candidate = next_in_sequence(last.as_deref());
            while store.state_exists(&candidate)? {
                candidate = next_in_sequence(Some(&candidate));
            }
            Ok(candidate)
        }
    }
}

pub fn timestamp_label<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    now.format(TIMESTAMP_FORMAT).to_string()
}

fn unique_timestamp<S: DataStore, Tz: TimeZone>(store: &S, now: DateTime<Tz>) -> Result<String>
where
    Tz::Offset: fmt::Display,
{
    let base = timestamp_label(&now);
    if !store.state_exists(&base)? {
        return Ok(base);
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}-{:0width$}", base, n, width = SUFFIX_WIDTH);
        if !store.state_exists(&candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

fn validate_user_label<S: DataStore>(store: &S, label: &str) -> Result<String> {
    let label = label.trim();
    if label.is_empty() {
        return Err(RelinkError::InvalidVersion(
            "version label cannot be empty".to_string(),
        ));
    }
    if store.state_exists(label)? {
        return Err(RelinkError::DuplicateVersion(label.to_string()));
    }
    Ok(label.to_string())
}

/// Bump the trailing integer of `last`, keeping any prefix and zero padding.
///
/// `None` or a label without a trailing number starts the sequence at `"1"`.
pub fn next_in_sequence(last: Option<&str>) -> String {
    let Some(last) = last else {
        return "1".to_string();
    };

    let digits_start = last
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx);

    let Some(start) = digits_start else {
        return "1".to_string();
    };

    let (prefix, digits) = last.split_at(start);
    format!("{}{}", prefix, increment_digits(digits))
}

/// Add one to a run of ASCII digits, carrying as far as needed (`"099"` →
/// `"100"`, `"999"` → `"1000"`). Works for any length.
fn increment_digits(digits: &str) -> String {
    let mut bumped: Vec<u8> = digits.bytes().collect();
    let mut carry = true;
    for digit in bumped.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        bumped.insert(0, b'1');
    }
    bumped.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StateMap;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;
    use chrono::Utc;

    #[test]
    fn sequence_starts_at_one() {
        assert_eq!(next_in_sequence(None), "1");
        assert_eq!(next_in_sequence(Some("release")), "1");
        assert_eq!(next_in_sequence(Some("")), "1");
    }

    #[test]
    fn sequence_bumps_trailing_number() {
        assert_eq!(next_in_sequence(Some("1")), "2");
        assert_eq!(next_in_sequence(Some("9")), "10");
        assert_eq!(next_in_sequence(Some("v7")), "v8");
        assert_eq!(next_in_sequence(Some("shot_v007")), "shot_v008");
        assert_eq!(next_in_sequence(Some("v099")), "v100");
        assert_eq!(next_in_sequence(Some("v999")), "v1000");
    }

    #[test]
    fn sequence_handles_numbers_past_u64() {
        assert_eq!(
            next_in_sequence(Some("18446744073709551615")),
            "18446744073709551616"
        );
        assert_eq!(
            next_in_sequence(Some("take99999999999999999999999")),
            "take100000000000000000000000"
        );
    }

    #[test]
    fn auto_increment_terminates_on_huge_label() {
        let store = StoreFixture::new()
            .with_versions(&["18446744073709551615"])
            .store;
        assert_eq!(
            generate(&store, &VersionKind::AutoIncrement).unwrap(),
            "18446744073709551616"
        );
    }

    #[test]
    fn timestamp_is_sortable() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let a = timestamp_label(&earlier);
        let b = timestamp_label(&later);
        assert_eq!(a, "20240109235959");
        assert!(a < b);
    }

    #[test]
    fn timestamp_collision_gets_suffix() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let store = StoreFixture::new()
            .with_versions(&["20240501120000", "20240501120000-001"])
            .store;
        assert_eq!(unique_timestamp(&store, now).unwrap(), "20240501120000-002");
    }

    #[test]
    fn timestamp_collisions_sort_past_nine() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut fixture = StoreFixture::new().with_versions(&["20240501120000"]);
        for n in 1..=9 {
            let label = format!("20240501120000-{:03}", n);
            fixture = fixture.with_versions(&[label.as_str()]);
        }

        let tenth = unique_timestamp(&fixture.store, now).unwrap();
        assert_eq!(tenth, "20240501120000-010");
        assert!(tenth.as_str() > "20240501120000-009");
    }

    #[test]
    fn auto_increment_first_value() {
        let store = InMemoryStore::new();
        assert_eq!(generate(&store, &VersionKind::AutoIncrement).unwrap(), "1");
    }

    #[test]
    fn auto_increment_strictly_increases() {
        let mut store = InMemoryStore::new();
        let first = generate(&store, &VersionKind::AutoIncrement).unwrap();
        store.save_state(&first, &StateMap::new()).unwrap();
        let second = generate(&store, &VersionKind::AutoIncrement).unwrap();

        assert_eq!(first, "1");
        assert_eq!(second, "2");
        assert!(second.parse::<u64>().unwrap() > first.parse::<u64>().unwrap());
    }

    #[test]
    fn auto_increment_skips_used_labels() {
        // "beta" has no number, so the sequence restarts at 1, which is taken.
        let store = StoreFixture::new().with_versions(&["1", "2", "beta"]).store;
        assert_eq!(generate(&store, &VersionKind::AutoIncrement).unwrap(), "3");
    }

    #[test]
    fn user_input_validated() {
        let store = StoreFixture::new().with_versions(&["v1"]).store;

        assert_eq!(
            generate(&store, &VersionKind::UserInput("  v2 ".into())).unwrap(),
            "v2"
        );
        assert!(matches!(
            generate(&store, &VersionKind::UserInput("   ".into())),
            Err(RelinkError::InvalidVersion(_))
        ));
        assert!(matches!(
            generate(&store, &VersionKind::UserInput("v1".into())),
            Err(RelinkError::DuplicateVersion(_))
        ));
    }

    #[test]
    fn timestamp_generation_is_unused() {
        let store = InMemoryStore::new();
        let label = generate(&store, &VersionKind::Timestamp).unwrap();
        assert_eq!(label.len(), 14);
        assert!(label.chars().all(|c| c.is_ascii_digit()));
    }
}
