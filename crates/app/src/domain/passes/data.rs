//! Pass record request data

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::domain::passes::{
    PassesError,
    records::{DepHash, MAX_NODE_IDS_PER_DEP_HASH, NodeId},
};

/// Test counters a client reports alongside a publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub skipped_by_cache: u64,
}

/// Unvalidated publish payload as received from a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPublish {
    pub passed_node_ids: BTreeMap<String, Vec<String>>,
    pub summary: RunSummary,
}

/// Publish payload whose every dependency hash and node id has been parsed.
#[derive(Debug, Clone, Default)]
pub struct PassedNodeIds {
    entries: Vec<(DepHash, FxHashSet<NodeId>)>,
}

impl PassedNodeIds {
    /// Parse every entry, failing on the first bad value.
    ///
    /// A single entry with more distinct ids than a record may hold can
    /// never be stored, so it is rejected here too.
    pub fn parse(raw: BTreeMap<String, Vec<String>>) -> Result<Self, PassesError> {
        let mut entries = Vec::with_capacity(raw.len());

        for (dep_hash, node_ids) in raw {
            let dep_hash = DepHash::parse(dep_hash)?;

            let node_ids = node_ids
                .into_iter()
                .map(NodeId::parse)
                .collect::<Result<FxHashSet<_>, _>>()?;

            if node_ids.len() > MAX_NODE_IDS_PER_DEP_HASH {
                return Err(PassesError::QuotaExceeded {
                    count: node_ids.len(),
                });
            }

            entries.push((dep_hash, node_ids));
        }

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DepHash, &FxHashSet<NodeId>)> {
        self.entries
            .iter()
            .map(|(dep_hash, node_ids)| (dep_hash, node_ids))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
