//! Data models for the idea vault.
//!
//! This module defines the core data structures:
//! - `Idea` - A node in the relationship graph, with zero or more parent ideas
//! - `Collection` - A named bucket that groups ideas (many ideas to one collection)
//! - `VaultDocument` - The whole persisted blob (`{ ideas, collections }`)
//! - `IdeaDraft` / `IdeaPatch` - Inputs for creating and updating ideas

pub mod graph;
pub mod migrate;
mod record;

pub use graph::{DeletedCollection, DeletedIdea, Graph};
pub use migrate::MigrationReport;

use record::StoredShape;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Development stage of an idea.
///
/// The engine treats stages as opaque labels. Values outside the known set
/// are kept verbatim in `Other` so stored documents survive a load/save cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    #[default]
    Idea,
    Validating,
    Building,
    Launched,
    Other(String),
}

impl Stage {
    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Idea => "Idea",
            Stage::Validating => "Validating",
            Stage::Building => "Building",
            Stage::Launched => "Launched",
            Stage::Other(s) => s,
        }
    }
}

impl From<String> for Stage {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Idea" => Stage::Idea,
            "Validating" => Stage::Validating,
            "Building" => Stage::Building,
            "Launched" => Stage::Launched,
            _ => Stage::Other(s),
        }
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Parses user input case-insensitively; unknown non-empty labels become `Other`.
impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("Stage cannot be empty".to_string()));
        }
        Ok(match trimmed.to_lowercase().as_str() {
            "idea" => Stage::Idea,
            "validating" => Stage::Validating,
            "building" => Stage::Building,
            "launched" => Stage::Launched,
            _ => Stage::Other(trimmed.to_string()),
        })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display priority of an idea. Used for grouping and coloring only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::Validation(format!(
                "Invalid priority: {} (expected Low, Medium or High)",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the idea graph.
///
/// Serialized through [`record::IdeaRecord`], which keeps the stored
/// spelling of a loaded idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "record::IdeaRecord", into = "record::IdeaRecord")]
pub struct Idea {
    /// Unique identifier, immutable after creation
    pub id: String,

    /// Display title (never empty for ideas created through the engine)
    pub title: String,

    pub stage: Stage,

    pub priority: Priority,

    /// Owning collection; `None` means unassigned
    pub collection_id: Option<String>,

    pub description: Option<String>,

    /// Creation timestamp, never modified
    pub created: DateTime<Utc>,

    /// Incoming edges: each entry is a parent idea id.
    /// Ordered, but treated as a set (no duplicates, never the idea's own id).
    pub parent_ids: Vec<String>,

    /// Single-parent `upIdeaId` from older documents. Folded into
    /// `parent_ids` on load and never written back.
    pub(crate) legacy_parent: Option<String>,

    /// Fields this version does not know about, kept for round-tripping
    pub extra: Map<String, Value>,

    pub(crate) stored: StoredShape,
}

impl Idea {
    /// Create a new idea with the given ID and title, stamped with the current time.
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            stage: Stage::default(),
            priority: Priority::default(),
            collection_id: None,
            description: None,
            created: now_millis(),
            parent_ids: Vec::new(),
            legacy_parent: None,
            extra: Map::new(),
            stored: StoredShape::default(),
        }
    }

    /// Set the priority, dropping any stored spelling of the old one.
    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
        self.stored.priority = None;
    }

    /// Assign or unassign the collection. The key is always written afterwards.
    pub fn set_collection(&mut self, collection_id: Option<String>) {
        self.collection_id = collection_id;
        self.stored.collection_absent = false;
    }

    /// Stored priority text that names no known priority.
    ///
    /// Such ideas load with the default priority and keep the text until
    /// the priority is set.
    pub fn unrecognized_priority(&self) -> Option<&str> {
        self.stored
            .priority
            .as_ref()
            .map(|(raw, _)| raw.as_str())
            .filter(|raw| raw.parse::<Priority>().is_err())
    }

    /// True when the idea has no parents.
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// True when `id` is one of this idea's parents.
    pub fn has_parent(&self, id: &str) -> bool {
        self.parent_ids.iter().any(|p| p == id)
    }

    /// The legacy single-parent value, if this idea has not been migrated yet.
    pub fn legacy_parent(&self) -> Option<&str> {
        self.legacy_parent.as_deref()
    }
}

/// A named grouping bucket for ideas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            extra: Map::new(),
        }
    }
}

/// The persisted idea-vault document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultDocument {
    #[serde(default)]
    pub ideas: Vec<Idea>,

    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl VaultDocument {
    /// True when the document holds neither ideas nor collections.
    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty() && self.collections.is_empty()
    }
}

/// Fields for a new idea.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeaDraft {
    pub title: String,
    pub stage: Stage,
    pub priority: Priority,
    pub collection_id: Option<String>,
    pub description: Option<String>,
    pub parent_ids: Vec<String>,
}

impl IdeaDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_ids.push(parent_id.into());
        self
    }
}

/// A partial update to an idea. `None` leaves a field untouched.
///
/// `parent_ids`, when present, replaces the whole parent set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub stage: Option<Stage>,
    pub priority: Option<Priority>,
    /// `Some(None)` unassigns the idea from its collection
    pub collection_id: Option<Option<String>>,
    pub description: Option<String>,
    pub parent_ids: Option<Vec<String>>,
}

impl IdeaPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.stage.is_none()
            && self.priority.is_none()
            && self.collection_id.is_none()
            && self.description.is_none()
            && self.parent_ids.is_none()
    }

    /// Names of the fields this patch sets, in wire-format spelling.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.stage.is_some() {
            fields.push("stage");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.collection_id.is_some() {
            fields.push("collectionId");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.parent_ids.is_some() {
            fields.push("parentIds");
        }
        fields
    }
}

/// Current time truncated to the precision the wire format can carry.
pub(crate) fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Deduplicate a parent list, keeping first occurrences, and drop
/// blank entries and any reference to `own_id`.
pub(crate) fn normalize_parents(parent_ids: Vec<String>, own_id: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    parent_ids
        .into_iter()
        .filter(|p| !p.trim().is_empty() && p != own_id)
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
