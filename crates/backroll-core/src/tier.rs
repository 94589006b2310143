//! Retention tiers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// One retention tier. Variants are declared in processing order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Monthly,
    Weekly,
    Daily,
}

impl Tier {
    /// Default store directory for this tier inside a workspace.
    pub fn default_dir(self, workspace: &Path) -> PathBuf {
        workspace.join(self.as_ref())
    }
}
