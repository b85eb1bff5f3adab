use std::collections::HashMap;
use std::time::{Duration, Instant};

use warren_proto::ShortDesc;

const TTL: Duration = Duration::from_secs(1);

struct Entry {
    desc: ShortDesc,
    fetched_at: Instant,
}

/// Per-guest cache of short descriptions fetched from neighbors. Staleness
/// is tolerated: entries are only ever checked against a time-to-live, never
/// actively invalidated.
#[derive(Default)]
pub struct ShortDescCache {
    entries: HashMap<String, Entry>,
}

impl ShortDescCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource: &str) -> Option<&ShortDesc> {
        self.entries.get(resource).and_then(|entry| {
            if entry.fetched_at.elapsed() < TTL {
                Some(&entry.desc)
            } else {
                None
            }
        })
    }

    pub fn insert(&mut self, resource: impl Into<String>, desc: ShortDesc) {
        self.entries.insert(
            resource.into(),
            Entry {
                desc,
                fetched_at: Instant::now(),
            },
        );
    }
}
