use std::sync::Arc;

use crate::{Endpoint, EndpointPatch};

/// Working copy of a job's endpoints, kept apart from the immutable server snapshot.
///
/// Invariant: every id in the working copy exists in the original. Entries can be
/// removed or edited but never invented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditBuffer {
    original: Arc<[Endpoint]>,
    working: Vec<Endpoint>,
    revision: u64,
}

impl EditBuffer {
    pub fn new(snapshot: Vec<Endpoint>) -> Self {
        let mut buffer = Self::default();
        buffer.initialize(snapshot);
        buffer
    }

    /// Replaces both snapshot and working copy wholesale.
    pub fn initialize(&mut self, snapshot: Vec<Endpoint>) {
        self.working = snapshot.clone();
        self.original = snapshot.into();
        self.revision += 1;
    }

    /// Merges `patch` into the entry with `id`. Absent ids are ignored.
    pub fn update(&mut self, id: &str, patch: &EndpointPatch) -> bool {
        let Some(slot) = self.working.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        let merged = patch.apply_to(slot);
        if merged == *slot {
            return false;
        }
        *slot = merged;
        self.revision += 1;
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.working.len();
        self.working.retain(|e| e.id != id);
        let removed = self.working.len() != before;
        if removed {
            self.revision += 1;
        }
        removed
    }

    pub fn reset(&mut self) {
        self.working = self.original.to_vec();
        self.revision += 1;
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.working
    }

    pub fn original(&self) -> &[Endpoint] {
        &self.original
    }

    pub fn get(&self, id: &str) -> Option<&Endpoint> {
        self.working.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn original_len(&self) -> usize {
        self.original.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_pristine(&self) -> bool {
        self.working.as_slice() == &*self.original
    }

    /// Endpoint set to send with a follow-up request.
    ///
    /// `None` lets the backend use its own snapshot.
    pub fn payload(&self) -> Option<Vec<Endpoint>> {
        if self.is_pristine() {
            None
        } else {
            Some(self.working.clone())
        }
    }
}
