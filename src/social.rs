//! Warband roster state for the social widget: which warband the character is
//! in, whether the lookup is still in flight, and a rank-ordered member list.

use log;
use serde::{Deserialize, Serialize};

use crate::models::CharacterId;

/// Rank precedence inside a warband, highest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarbandRank {
    Leader,
    Officer,
    #[default]
    Member,
}

impl WarbandRank {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "leader" => WarbandRank::Leader,
            "officer" => WarbandRank::Officer,
            "member" | "" => WarbandRank::Member,
            other => {
                log::debug!("[Social] Unknown warband rank {:?}", other);
                WarbandRank::Member
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WarbandMember {
    pub character_id: CharacterId,
    pub name: Option<String>,
    pub rank: WarbandRank,
}

impl WarbandMember {
    /// Name for the roster line; falls back when the lookup has not resolved.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

// --- Lookup payload ---

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct WarbandMemberEntry {
    pub id: CharacterId,
    pub name: Option<String>,
    pub rank: String,
}

/// Warband lookup response, as the social service shapes it.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct WarbandSnapshot {
    pub id: String,
    pub name: String,
    pub members: Vec<WarbandMemberEntry>,
}

// --- View state ---

/// The widget's warband card. Setting an id starts a lookup (loading state);
/// applying the snapshot resolves the name and roster.
#[derive(Clone, Debug, Default)]
pub struct WarbandRoster {
    warband_id: Option<String>,
    shard: u32,
    name: Option<String>,
    members: Vec<WarbandMember>,
}

impl WarbandRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points the card at a warband; the previous roster is dropped.
    pub fn set_warband(&mut self, warband_id: &str, shard: u32) {
        self.warband_id = Some(warband_id.to_string());
        self.shard = shard;
        self.name = None;
        self.members.clear();
    }

    /// Lookup response arrived. A response for a different warband than the
    /// one currently shown is stale and ignored.
    pub fn apply(&mut self, snapshot: &WarbandSnapshot) {
        if self.warband_id.as_deref() != Some(snapshot.id.as_str()) {
            log::debug!("[Social] Ignoring stale warband snapshot for {}", snapshot.id);
            return;
        }
        self.name = Some(snapshot.name.clone());
        self.members = snapshot
            .members
            .iter()
            .map(|entry| WarbandMember {
                character_id: entry.id.clone(),
                name: entry.name.clone(),
                rank: WarbandRank::parse(&entry.rank),
            })
            .collect();
        log::info!("[Social] Warband {} resolved with {} member(s)", snapshot.name, self.members.len());
    }

    pub fn clear(&mut self) {
        *self = WarbandRoster::default();
    }

    pub fn warband_id(&self) -> Option<&str> {
        self.warband_id.as_deref()
    }

    pub fn shard(&self) -> u32 {
        self.shard
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Card shows a spinner while the lookup is in flight.
    pub fn is_loading(&self) -> bool {
        self.warband_id.is_some() && self.name.is_none()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Members ordered for display: leaders, then officers, then the rest,
    /// alphabetical within a rank.
    pub fn roster(&self) -> Vec<&WarbandMember> {
        let mut ordered: Vec<&WarbandMember> = self.members.iter().collect();
        ordered.sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then_with(|| a.display_name().to_lowercase().cmp(&b.display_name().to_lowercase()))
        });
        ordered
    }
}
