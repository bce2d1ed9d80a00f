//! Pass Records

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::domain::passes::PassesError;

/// Characters in a dependency hash.
pub const DEP_HASH_LEN: usize = 64;

/// Characters in a node id, which is also its width inside a stored blob.
pub const NODE_ID_LEN: usize = 32;

/// Most node ids one record may hold.
pub const MAX_NODE_IDS_PER_DEP_HASH: usize = 32_768;

fn is_hex_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|byte| byte.is_ascii_hexdigit())
}

/// Fingerprint of a test file and everything it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepHash(String);

impl DepHash {
    pub fn parse(value: impl Into<String>) -> Result<Self, PassesError> {
        let value = value.into();

        if !is_hex_of_len(&value, DEP_HASH_LEN) {
            return Err(PassesError::InvalidDepHash);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DepHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Hashed identifier of a single test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn parse(value: impl Into<String>) -> Result<Self, PassesError> {
        let value = value.into();

        if !is_hex_of_len(&value, NODE_ID_LEN) {
            return Err(PassesError::InvalidNodeId);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
