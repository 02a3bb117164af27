//! Idea commands.

use serde::Serialize;

use super::{IdeaRef, Output, json_string, open_vault, open_vault_for_write};
use crate::Result;
use crate::config::ResolvedConfig;
use crate::models::{Idea, IdeaDraft, IdeaPatch, Priority, Stage};
use crate::query::{self, CollectionFilter, ListQuery};

/// Fields accepted by `iv idea update`, before parsing.
#[derive(Debug, Clone, Default)]
pub struct IdeaUpdateArgs {
    pub title: Option<String>,
    pub stage: Option<String>,
    pub priority: Option<String>,
    pub collection: Option<String>,
    pub unassign: bool,
    pub description: Option<String>,
    pub parents: Vec<String>,
    pub clear_parents: bool,
}

impl IdeaUpdateArgs {
    fn into_patch(self) -> Result<IdeaPatch> {
        let collection_id = if self.unassign {
            Some(None)
        } else {
            self.collection.map(Some)
        };
        let parent_ids = if self.clear_parents {
            Some(Vec::new())
        } else if self.parents.is_empty() {
            None
        } else {
            Some(self.parents)
        };

        Ok(IdeaPatch {
            title: self.title,
            stage: self.stage.as_deref().map(str::parse::<Stage>).transpose()?,
            priority: self
                .priority
                .as_deref()
                .map(str::parse::<Priority>)
                .transpose()?,
            collection_id,
            description: self.description,
            parent_ids,
        })
    }
}

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "!!",
        Priority::Medium => "! ",
        Priority::Low => "  ",
    }
}

fn human_line(idea: &Idea) -> String {
    format!(
        "{} {} {} [{}]",
        priority_marker(idea.priority),
        idea.id,
        idea.title,
        idea.stage
    )
}

// === Create ===

#[derive(Serialize)]
pub struct IdeaCreated {
    #[serde(flatten)]
    pub idea: Idea,
}

impl Output for IdeaCreated {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        format!("Created idea {} \"{}\"", self.idea.id, self.idea.title)
    }
}

/// Create an idea.
pub fn idea_create(
    config: &ResolvedConfig,
    title: &str,
    stage: Option<&str>,
    priority: Option<&str>,
    collection: Option<String>,
    description: Option<String>,
    parents: Vec<String>,
) -> Result<IdeaCreated> {
    let mut draft = IdeaDraft::new(title);
    if let Some(stage) = stage {
        draft = draft.with_stage(stage.parse()?);
    }
    if let Some(priority) = priority {
        draft = draft.with_priority(priority.parse()?);
    }
    draft.collection_id = collection;
    draft.description = description;
    draft.parent_ids = parents;

    let mut vault = open_vault_for_write(config)?;
    let idea = vault.create_idea(draft)?.into_result()?;
    Ok(IdeaCreated { idea })
}

// === Update ===

#[derive(Serialize)]
pub struct IdeaUpdated {
    #[serde(flatten)]
    pub idea: Idea,
    pub updated_fields: Vec<&'static str>,
}

impl Output for IdeaUpdated {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        if self.updated_fields.is_empty() {
            format!("No changes to idea {}", self.idea.id)
        } else {
            format!(
                "Updated idea {}: {}",
                self.idea.id,
                self.updated_fields.join(", ")
            )
        }
    }
}

/// Update an idea. Only the supplied fields change.
pub fn idea_update(config: &ResolvedConfig, id: &str, args: IdeaUpdateArgs) -> Result<IdeaUpdated> {
    let patch = args.into_patch()?;
    let updated_fields = patch.field_names();

    let mut vault = open_vault_for_write(config)?;
    if patch.is_empty() {
        let idea = vault.graph().get_idea(id)?.clone();
        return Ok(IdeaUpdated {
            idea,
            updated_fields,
        });
    }

    let idea = vault.update_idea(id, patch)?.into_result()?;
    Ok(IdeaUpdated {
        idea,
        updated_fields,
    })
}

// === Show ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaDetail {
    #[serde(flatten)]
    pub idea: Idea,
    pub collection_name: Option<String>,
    pub parents: Vec<IdeaRef>,
    pub children: Vec<IdeaRef>,
}

impl Output for IdeaDetail {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let idea = &self.idea;
        let mut lines = vec![
            format!("{} {}", idea.id, idea.title),
            format!("  Stage:      {}", idea.stage),
            format!("  Priority:   {}", idea.priority),
            format!(
                "  Collection: {}",
                self.collection_name.as_deref().unwrap_or("-")
            ),
            format!("  Created:    {}", idea.created.format("%Y-%m-%d %H:%M:%S UTC")),
        ];
        if let Some(ref description) = idea.description {
            lines.push(format!("  Description: {}", description));
        }
        for (label, refs) in [("Parents", &self.parents), ("Children", &self.children)] {
            if refs.is_empty() {
                continue;
            }
            lines.push(format!("  {}:", label));
            for r in refs {
                lines.push(format!("    {} {}", r.id, r.title));
            }
        }
        lines.join("\n")
    }
}

/// Show an idea with its resolved collection and direct neighbours.
pub fn idea_show(config: &ResolvedConfig, id: &str) -> Result<IdeaDetail> {
    let vault = open_vault(config)?;
    let graph = vault.graph();
    let idea = graph.get_idea(id)?;

    Ok(IdeaDetail {
        idea: idea.clone(),
        collection_name: idea
            .collection_id
            .as_deref()
            .and_then(|c| graph.collection(c))
            .map(|c| c.name.clone()),
        parents: idea
            .parent_ids
            .iter()
            .filter_map(|p| graph.idea(p))
            .map(IdeaRef::from)
            .collect(),
        children: query::children_of(graph, id)
            .into_iter()
            .map(IdeaRef::from)
            .collect(),
    })
}

// === Delete ===

#[derive(Serialize)]
pub struct IdeaDeleted {
    pub id: String,
    pub title: String,
    /// Ideas that lost this idea as a parent
    pub detached: Vec<String>,
}

impl Output for IdeaDeleted {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!("Deleted idea {} \"{}\"", self.id, self.title);
        if !self.detached.is_empty() {
            out.push_str(&format!(
                "\nDetached {} child idea(s): {}",
                self.detached.len(),
                self.detached.join(", ")
            ));
        }
        out
    }
}

/// Delete an idea, detaching its children.
pub fn idea_delete(config: &ResolvedConfig, id: &str) -> Result<IdeaDeleted> {
    let mut vault = open_vault_for_write(config)?;
    let deleted = vault.delete_idea(id)?.into_result()?;
    Ok(IdeaDeleted {
        id: deleted.idea.id,
        title: deleted.idea.title,
        detached: deleted.detached,
    })
}

// === List ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaRow {
    #[serde(flatten)]
    pub idea: Idea,
    pub collection_name: Option<String>,
}

#[derive(Serialize)]
pub struct IdeaList {
    pub count: usize,
    pub ideas: Vec<IdeaRow>,
}

impl Output for IdeaList {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        if self.ideas.is_empty() {
            return "No ideas found.".to_string();
        }
        let mut lines = vec![format!("{} idea(s):", self.count)];
        for row in &self.ideas {
            lines.push(format!(
                "{}  ({})",
                human_line(&row.idea),
                row.collection_name.as_deref().unwrap_or("-")
            ));
        }
        lines.join("\n")
    }
}

/// Build a list query from CLI arguments.
pub fn list_query(collection: &str, search: Option<String>, in_description: bool) -> ListQuery {
    let mut query = ListQuery::new().in_collection(CollectionFilter::from(collection));
    if let Some(term) = search {
        query = query.search(term);
    }
    if in_description {
        query = query.include_descriptions();
    }
    query
}

/// List ideas, newest first.
pub fn idea_list(config: &ResolvedConfig, query: &ListQuery) -> Result<IdeaList> {
    let vault = open_vault(config)?;
    let ideas: Vec<IdeaRow> = query::list_rows(vault.graph(), query)
        .into_iter()
        .map(|row| IdeaRow {
            idea: row.idea.clone(),
            collection_name: row.collection_name.map(str::to_string),
        })
        .collect();

    Ok(IdeaList {
        count: ideas.len(),
        ideas,
    })
}

// === Candidates ===

#[derive(Serialize)]
pub struct CandidateEntry {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct CandidateList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing: Option<String>,
    pub count: usize,
    pub candidates: Vec<CandidateEntry>,
}

impl Output for CandidateList {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        if self.candidates.is_empty() {
            return "No candidates.".to_string();
        }
        self.candidates
            .iter()
            .map(|c| {
                let mark = if c.selected { "[x]" } else { "[ ]" };
                format!("{} {} {}", mark, c.id, c.title)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Ideas that can become parents of `editing`.
pub fn idea_candidates(
    config: &ResolvedConfig,
    editing: Option<&str>,
    search: Option<&str>,
) -> Result<CandidateList> {
    let vault = open_vault(config)?;
    let candidates: Vec<CandidateEntry> = query::connect_candidates(vault.graph(), editing, search)?
        .into_iter()
        .map(|c| CandidateEntry {
            id: c.id.to_string(),
            title: c.title.to_string(),
            selected: c.selected,
        })
        .collect();

    Ok(CandidateList {
        editing: editing.map(str::to_string),
        count: candidates.len(),
        candidates,
    })
}

// === Roots / relatives ===

#[derive(Serialize)]
pub struct IdeaRefList {
    /// Idea the list is relative to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub count: usize,
    pub ideas: Vec<IdeaRef>,
}

impl IdeaRefList {
    fn new(id: Option<&str>, ideas: Vec<&Idea>) -> Self {
        let ideas: Vec<IdeaRef> = ideas.into_iter().map(IdeaRef::from).collect();
        Self {
            id: id.map(str::to_string),
            count: ideas.len(),
            ideas,
        }
    }
}

impl Output for IdeaRefList {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        if self.ideas.is_empty() {
            return "No ideas found.".to_string();
        }
        self.ideas
            .iter()
            .map(|r| format!("{} {}", r.id, r.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Ideas without parents, by title.
pub fn idea_roots(config: &ResolvedConfig) -> Result<IdeaRefList> {
    let vault = open_vault(config)?;
    Ok(IdeaRefList::new(None, query::roots(vault.graph())))
}

/// Every idea below `id`.
pub fn idea_descendants(config: &ResolvedConfig, id: &str) -> Result<IdeaRefList> {
    let vault = open_vault(config)?;
    let found = query::descendants(vault.graph(), id)?;
    Ok(IdeaRefList::new(Some(id), found))
}

/// Every idea above `id`.
pub fn idea_ancestors(config: &ResolvedConfig, id: &str) -> Result<IdeaRefList> {
    let vault = open_vault(config)?;
    let found = query::ancestors(vault.graph(), id)?;
    Ok(IdeaRefList::new(Some(id), found))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_args_unassign() {
        let patch = IdeaUpdateArgs {
            unassign: true,
            ..IdeaUpdateArgs::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.collection_id, Some(None));
    }

    #[test]
    fn test_update_args_clear_parents() {
        let patch = IdeaUpdateArgs {
            clear_parents: true,
            ..IdeaUpdateArgs::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.parent_ids, Some(Vec::new()));

        let untouched = IdeaUpdateArgs::default().into_patch().unwrap();
        assert!(untouched.is_empty());
    }

    #[test]
    fn test_update_args_bad_priority() {
        let err = IdeaUpdateArgs {
            priority: Some("urgent".to_string()),
            ..IdeaUpdateArgs::default()
        }
        .into_patch()
        .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
    }

    #[test]
    fn test_list_query_from_args() {
        let query = list_query("unassigned", Some("x".to_string()), true);
        assert_eq!(query.collection, CollectionFilter::Unassigned);
        assert_eq!(query.search.as_deref(), Some("x"));
        assert!(query.search_description);
    }
}
