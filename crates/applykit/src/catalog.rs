//! The mutation catalog: named groups of mutations selected together.

use crate::types::Mutation;

/// A named bundle of mutations selected as one menu entry.
#[derive(Debug, Clone)]
pub struct Group {
    /// Stable group id (menu/CLI handle).
    pub id: String,
    /// Short human-readable title.
    pub title: String,
    /// One-line description shown in the menu.
    pub summary: String,
    /// Whether the group touches system-wide locations (shown with a
    /// `[SYSTEM]` tag, may require elevated privileges).
    pub system: bool,
    /// Mutations in strict execution order; later entries may depend on
    /// earlier ones.
    pub mutations: Vec<Mutation>,
}

impl Group {
    /// Create a group.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        summary: impl Into<String>,
        mutations: Vec<Mutation>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: summary.into(),
            system: false,
            mutations,
        }
    }

    /// Mark the group as touching system-wide locations.
    #[must_use]
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }
}

/// The fixed, statically-declared registry of groups.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Groups in menu/execution order.
    pub groups: Vec<Group>,
}

impl Catalog {
    /// Create a catalog from groups.
    #[must_use]
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    /// Look up a group by id.
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// All group ids in declared order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.id.as_str()).collect()
    }

    /// Verify that group ids and mutation ids are unique.
    ///
    /// The catalog is declared statically, so a duplicate is a
    /// programming error surfaced at startup rather than mid-run.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen_groups = std::collections::HashSet::new();
        let mut seen_mutations = std::collections::HashSet::new();

        for group in &self.groups {
            if !seen_groups.insert(group.id.as_str()) {
                return Err(format!("duplicate group id: {}", group.id));
            }
            for mutation in &group.mutations {
                if !seen_mutations.insert(mutation.id.as_str()) {
                    return Err(format!("duplicate mutation id: {}", mutation.id));
                }
            }
        }
        Ok(())
    }
}
