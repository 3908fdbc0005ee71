//! Configuration types for the memfs core

use serde::{Deserialize, Serialize};

/// Case sensitivity modes for entry name resolution
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum CaseSensitivity {
    Sensitive,
    InsensitivePreserving,
}

impl CaseSensitivity {
    /// Compare two entry names under this mode. Insensitive matching is
    /// ASCII-only, and stored names keep their spelling either way.
    pub(crate) fn names_equal(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::InsensitivePreserving => a.eq_ignore_ascii_case(b),
        }
    }
}

/// Main filesystem configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FsConfig {
    pub case_sensitivity: CaseSensitivity,
    /// Upper bound on the byte length of a single entry name.
    pub max_name_bytes: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            case_sensitivity: CaseSensitivity::Sensitive,
            max_name_bytes: 63,
        }
    }
}
