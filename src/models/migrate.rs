//! Legacy document migration.
//!
//! Older documents modelled the idea graph as a tree: each idea carried a
//! single `upIdeaId`. Loading folds that value into `parentIds` and drops the
//! legacy field. Running the migration on an already-migrated document is a
//! no-op.

use serde::Serialize;
use tracing::debug;

use super::{Idea, VaultDocument};

/// Summary of a load-time migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Ids of ideas that carried a legacy parent field
    pub migrated: Vec<String>,
}

impl MigrationReport {
    /// True when nothing needed migrating.
    pub fn is_empty(&self) -> bool {
        self.migrated.is_empty()
    }
}

/// Fold an idea's legacy single parent into its parent set.
///
/// Returns `true` when a legacy field was present (and is now gone). The
/// value is appended only if absent, and a legacy self-reference is dropped.
pub fn migrate_legacy_parent(idea: &mut Idea) -> bool {
    let Some(legacy) = idea.legacy_parent.take() else {
        return false;
    };

    if !legacy.trim().is_empty() && legacy != idea.id && !idea.has_parent(&legacy) {
        idea.parent_ids.push(legacy);
    }
    true
}

/// Migrate every idea in `document`.
pub fn migrate_document(document: &mut VaultDocument) -> MigrationReport {
    let mut report = MigrationReport::default();
    for idea in &mut document.ideas {
        if migrate_legacy_parent(idea) {
            report.migrated.push(idea.id.clone());
        }
    }

    if !report.is_empty() {
        debug!(count = report.migrated.len(), "migrated legacy parent fields");
    }
    report
}
