use serde::{Deserialize, Serialize};

use crate::{JobHandle, JobId};

/// Point-in-time quota reading. Stale as soon as it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateLimit {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    #[serde(alias = "resetInSeconds")]
    pub reset_in_seconds: u64,
}

/// Session-local cache of previously created jobs and the last quota read.
///
/// Both regions are refreshed wholesale from the backend and never patched locally.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionCache {
    history: Vec<JobHandle>,
    quota: Option<RateLimit>,
}

impl SessionCache {
    pub fn replace_history(&mut self, entries: Vec<JobHandle>) {
        self.history = entries;
    }

    pub fn replace_quota(&mut self, quota: RateLimit) {
        self.quota = Some(quota);
    }

    pub fn history(&self) -> &[JobHandle] {
        &self.history
    }

    pub fn quota(&self) -> Option<RateLimit> {
        self.quota
    }

    pub fn find(&self, id: &JobId) -> Option<&JobHandle> {
        self.history.iter().find(|entry| &entry.id == id)
    }
}
