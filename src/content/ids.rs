//! Identifier generation for new chapters, steps and exercises

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 9;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Produces process-unique string identifiers.
///
/// Format: `<prefix>_<9 random base36 chars>_<unix millis>_<sequence>`. The
/// sequence is shared by every generator in the process, so two ids minted
/// in the same millisecond still differ.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::with_prefix("id")
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn next_id(&self) -> String {
        let mut rng = rand::thread_rng();
        let random: String = (0..RANDOM_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        let millis = chrono::Utc::now().timestamp_millis();
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);

        format!("{}_{}_{}_{}", self.prefix, random, millis, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_in_a_burst() {
        let ids = IdGenerator::new();
        let minted: HashSet<String> = (0..5_000).map(|_| ids.next_id()).collect();
        assert_eq!(minted.len(), 5_000);
    }

    #[test]
    fn test_id_shape() {
        let id = IdGenerator::with_prefix("t").next_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "t");
        assert_eq!(parts[1].len(), RANDOM_LEN);
        assert!(parts[1].bytes().all(|b| BASE36.contains(&b)));
        assert!(parts[2].parse::<i64>().is_ok());
    }
}
