//! Collection commands.

use serde::Serialize;

use super::{Output, json_string, open_vault, open_vault_for_write};
use crate::Result;
use crate::config::ResolvedConfig;
use crate::query;

#[derive(Serialize)]
pub struct CollectionResult {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    action: &'static str,
}

impl Output for CollectionResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        format!("{} collection {} \"{}\"", self.action, self.id, self.name)
    }
}

/// Create a collection.
pub fn collection_create(config: &ResolvedConfig, name: &str) -> Result<CollectionResult> {
    let mut vault = open_vault_for_write(config)?;
    let collection = vault.create_collection(name)?.into_result()?;
    Ok(CollectionResult {
        id: collection.id,
        name: collection.name,
        action: "Created",
    })
}

/// Rename a collection.
pub fn collection_rename(
    config: &ResolvedConfig,
    id: &str,
    name: &str,
) -> Result<CollectionResult> {
    let mut vault = open_vault_for_write(config)?;
    let collection = vault.rename_collection(id, name)?.into_result()?;
    Ok(CollectionResult {
        id: collection.id,
        name: collection.name,
        action: "Renamed",
    })
}

#[derive(Serialize)]
pub struct CollectionDeleted {
    pub id: String,
    pub name: String,
    /// Ideas that were moved out of the collection
    pub unassigned: Vec<String>,
}

impl Output for CollectionDeleted {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Deleted collection {} \"{}\" ({} idea(s) unassigned)",
            self.id,
            self.name,
            self.unassigned.len()
        )
    }
}

/// Delete a collection, unassigning its ideas.
pub fn collection_delete(config: &ResolvedConfig, id: &str) -> Result<CollectionDeleted> {
    let mut vault = open_vault_for_write(config)?;
    let deleted = vault.delete_collection(id)?.into_result()?;
    Ok(CollectionDeleted {
        id: deleted.collection.id,
        name: deleted.collection.name,
        unassigned: deleted.unassigned,
    })
}

#[derive(Serialize)]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    pub idea_count: usize,
}

#[derive(Serialize)]
pub struct CollectionList {
    pub count: usize,
    pub collections: Vec<CollectionSummary>,
    /// Ideas that belong to no collection
    pub unassigned: usize,
}

impl Output for CollectionList {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self
            .collections
            .iter()
            .map(|c| format!("{} {} ({})", c.id, c.name, c.idea_count))
            .collect();
        if lines.is_empty() {
            lines.push("No collections.".to_string());
        }
        lines.push(format!("Unassigned: {}", self.unassigned));
        lines.join("\n")
    }
}

/// List collections with their idea counts.
pub fn collection_list(config: &ResolvedConfig) -> Result<CollectionList> {
    let vault = open_vault(config)?;
    let graph = vault.graph();
    let collections: Vec<CollectionSummary> = query::group_by_collection(graph)
        .into_iter()
        .map(|group| CollectionSummary {
            id: group.collection.id.clone(),
            name: group.collection.name.clone(),
            idea_count: group.count(),
        })
        .collect();

    Ok(CollectionList {
        count: collections.len(),
        collections,
        unassigned: graph
            .ideas()
            .iter()
            .filter(|i| i.collection_id.is_none())
            .count(),
    })
}
