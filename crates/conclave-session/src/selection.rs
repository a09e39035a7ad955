//! Agent roster selection rules
//!
//! A debate needs at least two participants, and the synthesizer can
//! never be deselected, since without it no verdict round exists. Attempts to
//! break either rule are no-ops.

use conclave_core::roster::{self, SYNTHESIZER};
use conclave_core::AgentId;
use std::collections::BTreeSet;

pub const MIN_SELECTED: usize = 2;

#[derive(Clone, Debug)]
pub struct AgentSelection {
    selected: BTreeSet<AgentId>,
}

impl Default for AgentSelection {
    fn default() -> Self {
        Self {
            selected: roster::all_ids().map(AgentId::new).collect(),
        }
    }
}

impl AgentSelection {
    /// Selection with every roster agent enabled.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &AgentId) -> bool {
        self.selected.contains(id)
    }

    /// Add a roster agent back. Unknown ids are ignored.
    pub fn select(&mut self, id: &AgentId) -> bool {
        if roster::profile(id.as_str()).is_none() {
            return false;
        }
        self.selected.insert(id.clone())
    }

    /// Remove an agent. No-op (returns `false`) for the synthesizer, or
    /// when the selection would drop below the minimum.
    pub fn deselect(&mut self, id: &AgentId) -> bool {
        if id.as_str() == SYNTHESIZER {
            return false;
        }
        if self.selected.len() <= MIN_SELECTED && self.selected.contains(id) {
            return false;
        }
        self.selected.remove(id)
    }

    pub fn toggle(&mut self, id: &AgentId) -> bool {
        if self.is_selected(id) {
            self.deselect(id)
        } else {
            self.select(id)
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in stable (sorted) order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.selected.iter().cloned().collect()
    }
}
