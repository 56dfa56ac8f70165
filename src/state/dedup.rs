use std::collections::HashSet;

/// Identifiers already persisted during this run
///
/// Scoped to the whole run, not to a filter: an entity listed under two
/// provinces is fetched and written once. Grows monotonically and is never
/// persisted, so every run starts empty.
#[derive(Debug, Default)]
pub struct DedupStore {
    ids: HashSet<String>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the identifier has already been persisted
    pub fn seen(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Records an identifier whose row has been written
    ///
    /// Returns false if it was already present.
    pub fn mark(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }
}
