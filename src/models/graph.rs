//! The graph engine.
//!
//! `Graph` owns the in-memory `ideas` and `collections` containers and is the
//! only place they are mutated. It keeps referential integrity on the write
//! path:
//! - deleting an idea detaches it from every child's `parent_ids` (children are kept)
//! - deleting a collection unassigns its ideas (ideas are kept)
//! - parent lists written through the engine are deduplicated and never self-referencing
//!
//! Cycles are not rejected when parents are edited; read-side code in
//! [`crate::query`] guards every traversal with a visited set.

use tracing::debug;
use uuid::Uuid;

use super::migrate::{self, MigrationReport};
use super::{
    Collection, Idea, IdeaDraft, IdeaPatch, VaultDocument, normalize_parents,
};
use crate::{Error, Result};

/// Result of deleting an idea.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedIdea {
    /// The removed idea
    pub idea: Idea,
    /// Ids of ideas that listed the removed idea as a parent
    pub detached: Vec<String>,
}

/// Result of deleting a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedCollection {
    /// The removed collection
    pub collection: Collection,
    /// Ids of ideas whose `collection_id` was cleared
    pub unassigned: Vec<String>,
}

/// In-memory idea graph.
///
/// Ideas and collections are kept in insertion order, which is also the
/// tie-break order for projections sorted by creation time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    ideas: Vec<Idea>,
    collections: Vec<Collection>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a loaded document, migrating legacy parent fields.
    pub fn from_document(mut document: VaultDocument) -> (Self, MigrationReport) {
        let report = migrate::migrate_document(&mut document);
        let graph = Self {
            ideas: document.ideas,
            collections: document.collections,
        };
        (graph, report)
    }

    /// Snapshot the graph as a document ready to persist.
    pub fn to_document(&self) -> VaultDocument {
        VaultDocument {
            ideas: self.ideas.clone(),
            collections: self.collections.clone(),
        }
    }

    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Look up an idea by id.
    pub fn idea(&self, id: &str) -> Option<&Idea> {
        self.ideas.iter().find(|i| i.id == id)
    }

    /// Look up an idea by id, failing with `NotFound`.
    pub fn get_idea(&self, id: &str) -> Result<&Idea> {
        self.idea(id)
            .ok_or_else(|| Error::NotFound(format!("Idea not found: {}", id)))
    }

    /// Look up a collection by id.
    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Look up a collection by id, failing with `NotFound`.
    pub fn get_collection(&self, id: &str) -> Result<&Collection> {
        self.collection(id)
            .ok_or_else(|| Error::NotFound(format!("Collection not found: {}", id)))
    }

    /// Create a new idea from `draft`.
    ///
    /// The title must be non-empty after trimming. The collection and every
    /// parent must exist. Parents are deduplicated.
    pub fn create_idea(&mut self, draft: IdeaDraft) -> Result<&Idea> {
        let title = validate_label("Idea title", &draft.title)?;

        if let Some(ref collection_id) = draft.collection_id {
            self.get_collection(collection_id)?;
        }

        let id = self.fresh_id();
        let parent_ids = normalize_parents(draft.parent_ids, &id);
        self.ensure_ideas_exist(&parent_ids)?;

        let mut idea = Idea::new(id, title);
        idea.stage = draft.stage;
        idea.priority = draft.priority;
        idea.collection_id = draft.collection_id;
        idea.description = draft.description;
        idea.parent_ids = parent_ids;

        debug!(id = %idea.id, parents = idea.parent_ids.len(), "created idea");
        self.ideas.push(idea);
        Ok(&self.ideas[self.ideas.len() - 1])
    }

    /// Apply `patch` to the idea `id`.
    ///
    /// Everything is validated before anything is written, so a failed update
    /// leaves the idea unchanged. A supplied parent list replaces the old one.
    pub fn update_idea(&mut self, id: &str, patch: IdeaPatch) -> Result<&Idea> {
        let index = self.idea_index(id)?;

        let title = match patch.title {
            Some(ref t) => Some(validate_label("Idea title", t)?),
            None => None,
        };
        if let Some(Some(ref collection_id)) = patch.collection_id {
            self.get_collection(collection_id)?;
        }
        let parent_ids = match patch.parent_ids {
            Some(parents) => {
                let parents = normalize_parents(parents, id);
                self.ensure_ideas_exist(&parents)?;
                Some(parents)
            }
            None => None,
        };

        let idea = &mut self.ideas[index];
        if let Some(title) = title {
            idea.title = title;
        }
        if let Some(stage) = patch.stage {
            idea.stage = stage;
        }
        if let Some(priority) = patch.priority {
            idea.set_priority(priority);
        }
        if let Some(collection_id) = patch.collection_id {
            idea.set_collection(collection_id);
        }
        if let Some(description) = patch.description {
            idea.description = Some(description);
        }
        if let Some(parent_ids) = parent_ids {
            idea.parent_ids = parent_ids;
        }

        debug!(id, "updated idea");
        Ok(&self.ideas[index])
    }

    /// Delete the idea `id` and remove it from every other idea's parents.
    ///
    /// Children are detached, not deleted: an idea whose only parent was
    /// removed becomes a root.
    pub fn delete_idea(&mut self, id: &str) -> Result<DeletedIdea> {
        let index = self.idea_index(id)?;
        let idea = self.ideas.remove(index);

        let mut detached = Vec::new();
        for other in &mut self.ideas {
            let before = other.parent_ids.len();
            other.parent_ids.retain(|p| p != id);
            if other.parent_ids.len() != before {
                detached.push(other.id.clone());
            }
        }

        debug!(id, detached = detached.len(), "deleted idea");
        Ok(DeletedIdea { idea, detached })
    }

    /// Create a new collection.
    pub fn create_collection(&mut self, name: &str) -> Result<&Collection> {
        let name = validate_label("Collection name", name)?;
        let id = self.fresh_id();

        debug!(id = %id, "created collection");
        self.collections.push(Collection::new(id, name));
        Ok(&self.collections[self.collections.len() - 1])
    }

    /// Rename the collection `id`.
    pub fn rename_collection(&mut self, id: &str, name: &str) -> Result<&Collection> {
        let name = validate_label("Collection name", name)?;
        let index = self.collection_index(id)?;

        self.collections[index].name = name;
        debug!(id, "renamed collection");
        Ok(&self.collections[index])
    }

    /// Delete the collection `id`, unassigning every idea that pointed at it.
    pub fn delete_collection(&mut self, id: &str) -> Result<DeletedCollection> {
        let index = self.collection_index(id)?;
        let collection = self.collections.remove(index);

        let mut unassigned = Vec::new();
        for idea in &mut self.ideas {
            if idea.collection_id.as_deref() == Some(id) {
                idea.collection_id = None;
                unassigned.push(idea.id.clone());
            }
        }

        debug!(id, unassigned = unassigned.len(), "deleted collection");
        Ok(DeletedCollection {
            collection,
            unassigned,
        })
    }

    pub(crate) fn ideas_mut(&mut self) -> &mut [Idea] {
        &mut self.ideas
    }

    fn idea_index(&self, id: &str) -> Result<usize> {
        self.ideas
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("Idea not found: {}", id)))
    }

    fn collection_index(&self, id: &str) -> Result<usize> {
        self.collections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::NotFound(format!("Collection not found: {}", id)))
    }

    fn ensure_ideas_exist(&self, ids: &[String]) -> Result<()> {
        match ids.iter().find(|id| self.idea(id).is_none()) {
            Some(missing) => Err(Error::NotFound(format!(
                "Parent idea not found: {}",
                missing
            ))),
            None => Ok(()),
        }
    }

    /// Generate an id not used by any idea or collection.
    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.idea(&id).is_none() && self.collection(&id).is_none() {
                return id;
            }
        }
    }
}

/// Trim a required display string, rejecting empty values.
fn validate_label(what: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} cannot be empty", what)));
    }
    Ok(trimmed.to_string())
}
