//! A vault session: one graph bound to one stored document.
//!
//! Mutations validate first, apply to the in-memory graph, then save the
//! whole document. A failed save does not roll the graph back; the failure
//! travels with the result so the caller can report it and retry with
//! [`Vault::save`].

use crate::integrity::{self, IntegrityReport};
use crate::models::{
    Collection, DeletedCollection, DeletedIdea, Graph, Idea, IdeaDraft, IdeaPatch,
    MigrationReport,
};
use crate::storage::{DocumentClient, validate_key};
use crate::{Error, Result};
use tracing::warn;

/// Outcome of a mutation that was applied in memory.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    /// Why the document could not be saved, if it could not
    pub save_error: Option<Error>,
}

impl<T> Applied<T> {
    pub fn is_saved(&self) -> bool {
        self.save_error.is_none()
    }

    /// Treat a failed save as an error, discarding the value.
    pub fn into_result(self) -> Result<T> {
        match self.save_error {
            Some(e) => Err(e),
            None => Ok(self.value),
        }
    }
}

pub struct Vault {
    graph: Graph,
    client: DocumentClient,
    key: String,
    load_warning: Option<Error>,
    migration: MigrationReport,
    dirty: bool,
}

impl Vault {
    /// Load the document stored under `key` and build a session around it.
    ///
    /// An unreachable store yields an empty vault with [`Vault::load_warning`] set.
    pub fn open(client: DocumentClient, key: &str) -> Result<Self> {
        validate_key(key)?;
        let loaded = client.load(key)?;
        let (graph, migration) = Graph::from_document(loaded.document);

        Ok(Self {
            graph,
            client,
            key: key.to_string(),
            load_warning: loaded.degraded,
            // Migrated documents differ from what is stored until the next save
            dirty: !migration.is_empty(),
            migration,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn client(&self) -> &DocumentClient {
        &self.client
    }

    /// The failure that forced an empty start, if any.
    pub fn load_warning(&self) -> Option<&Error> {
        self.load_warning.as_ref()
    }

    /// Ideas whose legacy parent field was migrated at load time.
    pub fn migration(&self) -> &MigrationReport {
        &self.migration
    }

    /// True when the in-memory graph has changes the store has not accepted.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Save the whole graph, e.g. to retry after a failed mutation save.
    pub fn save(&mut self) -> Result<()> {
        self.client.save(&self.key, &self.graph.to_document())?;
        self.dirty = false;
        Ok(())
    }

    pub fn create_idea(&mut self, draft: IdeaDraft) -> Result<Applied<Idea>> {
        let idea = self.graph.create_idea(draft)?.clone();
        Ok(self.commit(idea))
    }

    pub fn update_idea(&mut self, id: &str, patch: IdeaPatch) -> Result<Applied<Idea>> {
        let idea = self.graph.update_idea(id, patch)?.clone();
        Ok(self.commit(idea))
    }

    pub fn delete_idea(&mut self, id: &str) -> Result<Applied<DeletedIdea>> {
        let deleted = self.graph.delete_idea(id)?;
        Ok(self.commit(deleted))
    }

    pub fn create_collection(&mut self, name: &str) -> Result<Applied<Collection>> {
        let collection = self.graph.create_collection(name)?.clone();
        Ok(self.commit(collection))
    }

    pub fn rename_collection(&mut self, id: &str, name: &str) -> Result<Applied<Collection>> {
        let collection = self.graph.rename_collection(id, name)?.clone();
        Ok(self.commit(collection))
    }

    pub fn delete_collection(&mut self, id: &str) -> Result<Applied<DeletedCollection>> {
        let deleted = self.graph.delete_collection(id)?;
        Ok(self.commit(deleted))
    }

    /// Repair integrity issues, saving only when something changed.
    pub fn repair(&mut self) -> Applied<IntegrityReport> {
        let report = integrity::repair(&mut self.graph);
        if report.repaired.is_empty() {
            return Applied {
                value: report,
                save_error: None,
            };
        }
        self.commit(report)
    }

    fn commit<T>(&mut self, value: T) -> Applied<T> {
        self.dirty = true;
        let save_error = match self.save() {
            Ok(()) => None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "save failed, keeping local changes");
                Some(e)
            }
        };
        Applied { value, save_error }
    }
}
