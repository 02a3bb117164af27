//! Wire form of an idea.
//!
//! Ideas are read and written through [`IdeaRecord`] so that a document
//! loaded and saved without edits comes back unchanged. Absent keys stay
//! absent, explicit nulls stay null, and `created` and `priority` keep the
//! text they were stored with until the value itself changes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{Idea, Priority, Stage};

/// How an idea was spelled in the document it was loaded from.
///
/// Ideas built in memory carry the default shape and are written in the
/// canonical form.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoredShape {
    pub(crate) stage_absent: bool,
    pub(crate) priority_absent: bool,
    /// Stored priority text and the value it was read as
    pub(crate) priority: Option<(String, Priority)>,
    pub(crate) collection_absent: bool,
    pub(crate) description_null: bool,
    /// Stored timestamp text and the instant it parses to
    pub(crate) created: Option<(String, DateTime<Utc>)>,
    pub(crate) parents_absent: bool,
}

/// Ideas with the same content are equal however they were spelled on disk.
impl PartialEq for StoredShape {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IdeaRecord {
    id: String,
    title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<String>,

    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    collection_id: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    description: Option<Option<String>>,

    created: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_ids: Option<Vec<String>>,

    #[serde(
        rename = "upIdeaId",
        default,
        deserialize_with = "nullable",
        skip_serializing
    )]
    legacy_parent: Option<Option<String>>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Outer `None` for an absent key, `Some(None)` for an explicit null.
fn nullable<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// Canonical timestamp text: milliseconds and a `Z` suffix.
pub(crate) fn format_created(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl TryFrom<IdeaRecord> for Idea {
    type Error = String;

    fn try_from(record: IdeaRecord) -> Result<Self, Self::Error> {
        let created = DateTime::parse_from_rfc3339(&record.created)
            .map_err(|e| format!("invalid created timestamp {:?}: {}", record.created, e))?
            .with_timezone(&Utc);
        // Unknown priorities load as the default and are reported by the integrity check
        let priority = record
            .priority
            .as_deref()
            .map(|raw| raw.parse::<Priority>().unwrap_or_default())
            .unwrap_or_default();

        let stored = StoredShape {
            stage_absent: record.stage.is_none(),
            priority_absent: record.priority.is_none(),
            priority: record.priority.map(|raw| (raw, priority)),
            collection_absent: record.collection_id.is_none(),
            description_null: matches!(record.description, Some(None)),
            created: Some((record.created, created)),
            parents_absent: record.parent_ids.is_none() && record.legacy_parent.is_none(),
        };

        Ok(Idea {
            id: record.id,
            title: record.title,
            stage: record.stage.unwrap_or_default(),
            priority,
            collection_id: record.collection_id.flatten(),
            description: record.description.flatten(),
            created,
            parent_ids: record.parent_ids.unwrap_or_default(),
            legacy_parent: record.legacy_parent.flatten(),
            extra: record.extra,
            stored,
        })
    }
}

impl From<Idea> for IdeaRecord {
    fn from(idea: Idea) -> Self {
        let stored = idea.stored;

        let stage = if stored.stage_absent && idea.stage == Stage::default() {
            None
        } else {
            Some(idea.stage)
        };
        let priority = match stored.priority {
            Some((raw, read_as)) if read_as == idea.priority => Some(raw),
            None if stored.priority_absent && idea.priority == Priority::default() => None,
            _ => Some(idea.priority.as_str().to_string()),
        };
        let collection_id = match idea.collection_id {
            None if stored.collection_absent => None,
            id => Some(id),
        };
        let description = match idea.description {
            None if stored.description_null => Some(None),
            None => None,
            text => Some(text),
        };
        let created = match stored.created {
            Some((raw, at)) if at == idea.created => raw,
            _ => format_created(&idea.created),
        };
        let parent_ids = if stored.parents_absent && idea.parent_ids.is_empty() {
            None
        } else {
            Some(idea.parent_ids)
        };

        IdeaRecord {
            id: idea.id,
            title: idea.title,
            stage,
            priority,
            collection_id,
            description,
            created,
            parent_ids,
            legacy_parent: None,
            extra: idea.extra,
        }
    }
}
