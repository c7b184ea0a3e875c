/// Shard routing table for deregistration events
///
/// Redis Cluster hashes only the part of a key inside `{...}` when one is
/// present. Prefixing the channel with `{master1}` or `{master2}` therefore
/// pins every publish for that target to the same hash slot, and thus to one
/// shard, whatever the rest of the channel name is.
///
/// ```text
/// ShardTarget::Master1 ──► "{master1}users:unregister" ──► slot(hash("master1"))
/// ShardTarget::Master2 ──► "{master2}users:unregister" ──► slot(hash("master2"))
/// ```
///
/// Channel names are a contract with downstream subscribers; change them only
/// with a coordinated migration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Un-tagged channel the listener subscribes to
pub const UNREGISTER_CHANNEL: &str = "users:unregister";

/// Logical publish target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShardTarget {
    Master1,
    Master2,
}

/// The only place target-to-channel mapping lives
const SHARD_CHANNELS: [(ShardTarget, &str); 2] = [
    (ShardTarget::Master1, "{master1}users:unregister"),
    (ShardTarget::Master2, "{master2}users:unregister"),
];

impl ShardTarget {
    /// Every routable target
    pub const ALL: [ShardTarget; 2] = [ShardTarget::Master1, ShardTarget::Master2];

    /// Hashtag-qualified channel for this target
    pub fn channel(self) -> &'static str {
        // Table rows are in discriminant order
        SHARD_CHANNELS[self as usize].1
    }

    /// Name used in responses and logs, e.g. `Master1`
    pub fn display_name(self) -> &'static str {
        match self {
            ShardTarget::Master1 => "Master1",
            ShardTarget::Master2 => "Master2",
        }
    }
}

impl fmt::Display for ShardTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
