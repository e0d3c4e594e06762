//! Identifier generation.
//!
//! Ids look like `1771459200000-42-k3j9x0q2a`: wall-clock milliseconds, a
//! process-lifetime counter and a base-36 random suffix. The counter makes ids
//! unique within one process; across processes or devices uniqueness is only
//! probabilistic, which is enough for a single-writer local store.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn generate_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;

    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();

    format!("{}-{}-{}", millis, counter, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_shape() {
        let id = generate_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].parse::<i64>().is_ok());
        assert!(parts[1].parse::<u64>().unwrap() >= 1);
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_ids_are_pairwise_distinct() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_counter_is_monotonic() {
        let counter_of = |id: &str| -> u64 { id.split('-').nth(1).unwrap().parse().unwrap() };
        let first = generate_id();
        let second = generate_id();
        assert!(counter_of(&second) > counter_of(&first));
    }
}
