//! Counters for definition lookups that missed.
//!
//! Rendering and feature export never fail on a missing definition; the
//! offending tile or feature is skipped and the miss is counted here. The
//! counters are atomic so one instance can be shared by parallel workers.

use crate::error::MapError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The definition table a lookup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Underlay,
    Overlay,
    Object,
    Area,
    Sprite,
    MapScene,
    Texture,
}

impl LookupKind {
    pub const ALL: [LookupKind; 7] = [
        LookupKind::Underlay,
        LookupKind::Overlay,
        LookupKind::Object,
        LookupKind::Area,
        LookupKind::Sprite,
        LookupKind::MapScene,
        LookupKind::Texture,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LookupKind::Underlay => "underlay",
            LookupKind::Overlay => "overlay",
            LookupKind::Object => "object",
            LookupKind::Area => "area",
            LookupKind::Sprite => "sprite",
            LookupKind::MapScene => "map scene",
            LookupKind::Texture => "texture",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Per-kind miss counters.
#[derive(Debug, Default)]
pub struct LookupStats {
    misses: [AtomicUsize; 7],
}

impl LookupStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one miss and log it at debug level.
    pub fn record(&self, kind: LookupKind, id: i32) {
        self.misses[kind.slot()].fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "{}",
            MapError::DefinitionNotFound {
                kind: kind.name(),
                id
            }
        );
    }

    /// Pass a lookup result through, counting it if it missed.
    pub fn track<T>(&self, kind: LookupKind, id: i32, found: Option<T>) -> Option<T> {
        if found.is_none() {
            self.record(kind, id);
        }
        found
    }

    pub fn count(&self, kind: LookupKind) -> usize {
        self.misses[kind.slot()].load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        LookupKind::ALL.iter().map(|&k| self.count(k)).sum()
    }

    /// Snapshot of the non-zero counters.
    pub fn summary(&self) -> LookupSummary {
        LookupSummary {
            counts: LookupKind::ALL
                .iter()
                .map(|&k| (k, self.count(k)))
                .filter(|&(_, n)| n > 0)
                .collect(),
        }
    }

    pub fn reset(&self) {
        for counter in &self.misses {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time view of [`LookupStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupSummary {
    pub counts: Vec<(LookupKind, usize)>,
}

impl LookupSummary {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl fmt::Display for LookupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.counts.is_empty() {
            return write!(f, "no lookup misses");
        }
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(kind, n)| format!("{} {}", n, kind.name()))
            .collect();
        write!(f, "lookup misses: {}", parts.join(", "))
    }
}
