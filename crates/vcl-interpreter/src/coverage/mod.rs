//! Coverage registry
//!
//! Maps marker identifiers to the node they were created for and a hit
//! counter. Entries are created while instrumenting (hits = 0) and counted
//! while interpreting. An entry is never removed, so every identifier created
//! by the instrumentation pass shows up in the report exactly once.
//!
//! Each bucket is a `BTreeMap` behind an `RwLock`. Registration takes the
//! write lock; recording a hit only takes the read lock and bumps an atomic
//! counter, so evaluations running on several threads against the same
//! instrumented program can share one registry through an `Arc`.

mod report;

pub use report::*;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use vcl_ast::Position;

/// Granularity of a coverage marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageKind {
    Subroutine,
    Statement,
    Branch,
}

impl CoverageKind {
    pub const ALL: [CoverageKind; 3] = [
        CoverageKind::Subroutine,
        CoverageKind::Statement,
        CoverageKind::Branch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CoverageKind::Subroutine => "subroutine",
            CoverageKind::Statement => "statement",
            CoverageKind::Branch => "branch",
        }
    }

    /// Prefix of marker identifiers of this kind
    pub fn prefix(self) -> &'static str {
        match self {
            CoverageKind::Subroutine => "sub",
            CoverageKind::Statement => "stmt",
            CoverageKind::Branch => "branch",
        }
    }

    /// Name of the built-in function that records a hit of this kind
    pub fn function_name(self) -> &'static str {
        match self {
            CoverageKind::Subroutine => "coverage.subroutine",
            CoverageKind::Statement => "coverage.statement",
            CoverageKind::Branch => "coverage.branch",
        }
    }

    fn index(self) -> usize {
        match self {
            CoverageKind::Subroutine => 0,
            CoverageKind::Statement => 1,
            CoverageKind::Branch => 2,
        }
    }
}

impl fmt::Display for CoverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a marker points at in the source program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageNode {
    /// Human readable node description, e.g. `if statement`
    pub label: String,
    pub position: Position,
}

impl CoverageNode {
    pub fn new(label: impl Into<String>, position: Position) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }
}

#[derive(Debug)]
struct Entry {
    node: CoverageNode,
    hits: AtomicU64,
}

type Bucket = RwLock<BTreeMap<String, Entry>>;

#[derive(Debug, Default)]
pub struct CoverageRegistry {
    buckets: [Bucket; 3],
}

impl CoverageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket(&self, kind: CoverageKind) -> &Bucket {
        &self.buckets[kind.index()]
    }

    /// Register an identifier. Returns false when it already existed, in
    /// which case the existing entry and its hit count are kept.
    pub fn setup(&self, kind: CoverageKind, id: impl Into<String>, node: CoverageNode) -> bool {
        let id = id.into();
        let mut bucket = self
            .bucket(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if bucket.contains_key(&id) {
            tracing::warn!(%kind, %id, "coverage marker already registered");
            return false;
        }
        bucket.insert(
            id,
            Entry {
                node,
                hits: AtomicU64::new(0),
            },
        );
        true
    }

    pub fn setup_subroutine(&self, id: impl Into<String>, node: CoverageNode) -> bool {
        self.setup(CoverageKind::Subroutine, id, node)
    }

    pub fn setup_statement(&self, id: impl Into<String>, node: CoverageNode) -> bool {
        self.setup(CoverageKind::Statement, id, node)
    }

    pub fn setup_branch(&self, id: impl Into<String>, node: CoverageNode) -> bool {
        self.setup(CoverageKind::Branch, id, node)
    }

    /// Record one execution of a marker. Returns the new hit count, or `None`
    /// when the identifier was never registered.
    pub fn hit(&self, kind: CoverageKind, id: &str) -> Option<u64> {
        let bucket = self
            .bucket(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        bucket
            .get(id)
            .map(|entry| entry.hits.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn hits(&self, kind: CoverageKind, id: &str) -> Option<u64> {
        let bucket = self
            .bucket(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        bucket.get(id).map(|entry| entry.hits.load(Ordering::Relaxed))
    }

    pub fn is_covered(&self, kind: CoverageKind, id: &str) -> bool {
        self.hits(kind, id).is_some_and(|hits| hits > 0)
    }

    pub fn contains(&self, kind: CoverageKind, id: &str) -> bool {
        self.hits(kind, id).is_some()
    }

    /// Registered identifiers of one kind, sorted
    pub fn ids(&self, kind: CoverageKind) -> Vec<String> {
        let bucket = self
            .bucket(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        bucket.keys().cloned().collect()
    }

    pub fn count(&self, kind: CoverageKind) -> usize {
        let bucket = self
            .bucket(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        bucket.len()
    }

    pub fn len(&self) -> usize {
        CoverageKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every entry, ordered by kind then identifier
    pub fn snapshot(&self) -> Vec<CoverageRecord> {
        let mut records = Vec::new();
        for kind in CoverageKind::ALL {
            let bucket = self
                .bucket(kind)
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            records.extend(bucket.iter().map(|(id, entry)| CoverageRecord {
                kind,
                id: id.clone(),
                label: entry.node.label.clone(),
                position: entry.node.position.clone(),
                hits: entry.hits.load(Ordering::Relaxed),
            }));
        }
        records
    }

    /// Fold records of another run into this registry. Hit counts of equal
    /// identifiers are added; unknown identifiers are registered.
    pub fn merge(&self, records: &[CoverageRecord]) {
        for record in records {
            let mut bucket = self
                .bucket(record.kind)
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let entry = bucket.entry(record.id.clone()).or_insert_with(|| Entry {
                node: CoverageNode::new(record.label.clone(), record.position.clone()),
                hits: AtomicU64::new(0),
            });
            *entry.hits.get_mut() += record.hits;
        }
    }

    pub fn report(&self) -> CoverageReport {
        CoverageReport::from_records(self.snapshot())
    }
}
