//! Integrity checks for idea-vault documents.
//!
//! Documents written by the engine keep their references consistent, but
//! stored data can come from older versions or hand edits. `check` reports
//! problems without touching the graph; `repair` fixes the ones that have a
//! single obvious fix. Cycles are reported only.

use serde::Serialize;
use std::collections::HashSet;

use crate::models::Graph;
use crate::query::find_cycles;

/// A single integrity problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// A parent id names no idea
    DanglingParent { idea_id: String, parent_id: String },
    /// A collection id names no collection
    DanglingCollection {
        idea_id: String,
        collection_id: String,
    },
    /// An idea lists itself as a parent
    SelfParent { idea_id: String },
    /// An idea lists the same parent more than once
    DuplicateParent { idea_id: String, parent_id: String },
    DuplicateIdeaId { id: String },
    DuplicateCollectionId { id: String },
    /// The edge closes a cycle
    Cycle { parent_id: String, child_id: String },
    EmptyTitle { idea_id: String },
    EmptyCollectionName { collection_id: String },
    /// The stored priority names no known priority
    UnknownPriority { idea_id: String, value: String },
}

impl IntegrityIssue {
    /// True when [`repair`] knows how to fix this issue.
    pub fn is_repairable(&self) -> bool {
        matches!(
            self,
            IntegrityIssue::DanglingParent { .. }
                | IntegrityIssue::DanglingCollection { .. }
                | IntegrityIssue::SelfParent { .. }
                | IntegrityIssue::DuplicateParent { .. }
                | IntegrityIssue::UnknownPriority { .. }
        )
    }

    /// One-line description for humans.
    pub fn describe(&self) -> String {
        match self {
            IntegrityIssue::DanglingParent { idea_id, parent_id } => {
                format!("{} lists missing parent {}", idea_id, parent_id)
            }
            IntegrityIssue::DanglingCollection {
                idea_id,
                collection_id,
            } => format!("{} belongs to missing collection {}", idea_id, collection_id),
            IntegrityIssue::SelfParent { idea_id } => {
                format!("{} lists itself as a parent", idea_id)
            }
            IntegrityIssue::DuplicateParent { idea_id, parent_id } => {
                format!("{} lists parent {} more than once", idea_id, parent_id)
            }
            IntegrityIssue::DuplicateIdeaId { id } => format!("idea id {} is not unique", id),
            IntegrityIssue::DuplicateCollectionId { id } => {
                format!("collection id {} is not unique", id)
            }
            IntegrityIssue::Cycle {
                parent_id,
                child_id,
            } => format!("edge {} -> {} closes a cycle", parent_id, child_id),
            IntegrityIssue::EmptyTitle { idea_id } => format!("{} has an empty title", idea_id),
            IntegrityIssue::EmptyCollectionName { collection_id } => {
                format!("collection {} has an empty name", collection_id)
            }
            IntegrityIssue::UnknownPriority { idea_id, value } => {
                format!("{} has unknown priority {:?}", idea_id, value)
            }
        }
    }
}

/// Outcome of a check or repair pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Problems still present
    pub issues: Vec<IntegrityIssue>,
    /// Problems fixed by this pass
    pub repaired: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    /// True when no problems remain.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Inspect `graph` and list every problem found.
pub fn check(graph: &Graph) -> IntegrityReport {
    let mut issues = Vec::new();

    let mut idea_ids = HashSet::new();
    for idea in graph.ideas() {
        if !idea_ids.insert(idea.id.as_str()) {
            issues.push(IntegrityIssue::DuplicateIdeaId {
                id: idea.id.clone(),
            });
        }
    }
    let mut collection_ids = HashSet::new();
    for collection in graph.collections() {
        if !collection_ids.insert(collection.id.as_str()) {
            issues.push(IntegrityIssue::DuplicateCollectionId {
                id: collection.id.clone(),
            });
        }
        if collection.name.trim().is_empty() {
            issues.push(IntegrityIssue::EmptyCollectionName {
                collection_id: collection.id.clone(),
            });
        }
    }

    for idea in graph.ideas() {
        if idea.title.trim().is_empty() {
            issues.push(IntegrityIssue::EmptyTitle {
                idea_id: idea.id.clone(),
            });
        }
        if let Some(value) = idea.unrecognized_priority() {
            issues.push(IntegrityIssue::UnknownPriority {
                idea_id: idea.id.clone(),
                value: value.to_string(),
            });
        }
        if let Some(ref collection_id) = idea.collection_id {
            if !collection_ids.contains(collection_id.as_str()) {
                issues.push(IntegrityIssue::DanglingCollection {
                    idea_id: idea.id.clone(),
                    collection_id: collection_id.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for parent in &idea.parent_ids {
            if !seen.insert(parent.as_str()) {
                issues.push(IntegrityIssue::DuplicateParent {
                    idea_id: idea.id.clone(),
                    parent_id: parent.clone(),
                });
            } else if *parent == idea.id {
                issues.push(IntegrityIssue::SelfParent {
                    idea_id: idea.id.clone(),
                });
            } else if !idea_ids.contains(parent.as_str()) {
                issues.push(IntegrityIssue::DanglingParent {
                    idea_id: idea.id.clone(),
                    parent_id: parent.clone(),
                });
            }
        }
    }

    // Self-loops are already reported above
    issues.extend(
        find_cycles(graph)
            .into_iter()
            .filter(|edge| edge.parent_id != edge.child_id)
            .map(|edge| IntegrityIssue::Cycle {
                parent_id: edge.parent_id,
                child_id: edge.child_id,
            }),
    );

    IntegrityReport {
        issues,
        repaired: Vec::new(),
    }
}

/// Fix every repairable issue in place and report what changed.
///
/// Parent lists lose dangling, self and duplicate entries (first occurrence
/// wins); ideas pointing at a missing collection are unassigned; unknown
/// priorities are replaced by the priority they loaded as. The returned
/// report's `issues` holds what is left afterwards.
pub fn repair(graph: &mut Graph) -> IntegrityReport {
    let repaired: Vec<IntegrityIssue> = check(graph)
        .issues
        .into_iter()
        .filter(IntegrityIssue::is_repairable)
        .collect();

    if !repaired.is_empty() {
        let idea_ids: HashSet<String> = graph.ideas().iter().map(|i| i.id.clone()).collect();
        let collection_ids: HashSet<String> =
            graph.collections().iter().map(|c| c.id.clone()).collect();

        for idea in graph.ideas_mut() {
            let own_id = idea.id.clone();
            let mut seen = HashSet::new();
            idea.parent_ids.retain(|p| {
                *p != own_id && idea_ids.contains(p) && seen.insert(p.clone())
            });

            let dangling = idea
                .collection_id
                .as_ref()
                .is_some_and(|c| !collection_ids.contains(c));
            if dangling {
                idea.set_collection(None);
            }
            if idea.unrecognized_priority().is_some() {
                idea.set_priority(idea.priority);
            }
        }
        tracing::info!(count = repaired.len(), "repaired integrity issues");
    }

    IntegrityReport {
        issues: check(graph).issues,
        repaired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VaultDocument;

    fn damaged_graph() -> Graph {
        let doc: VaultDocument = serde_json::from_value(serde_json::json!({
            "ideas": [
                {"id": "a", "title": "A", "stage": "Idea", "priority": "Low",
                 "collectionId": "gone", "created": "2024-01-01T00:00:00.000Z",
                 "parentIds": ["a", "ghost", "b", "b"]},
                {"id": "b", "title": " ", "stage": "Idea", "priority": "Low",
                 "collectionId": "c1", "created": "2024-01-02T00:00:00.000Z",
                 "parentIds": []}
            ],
            "collections": [{"id": "c1", "name": "Kept"}]
        }))
        .unwrap();
        Graph::from_document(doc).0
    }

    #[test]
    fn test_check_clean_graph() {
        let mut graph = Graph::new();
        let a = graph
            .create_idea(crate::models::IdeaDraft::new("A"))
            .unwrap()
            .id
            .clone();
        graph
            .create_idea(crate::models::IdeaDraft::new("B").with_parent(a))
            .unwrap();

        assert!(check(&graph).is_clean());
    }

    #[test]
    fn test_check_reports_every_issue() {
        let graph = damaged_graph();
        let report = check(&graph);

        assert!(report.issues.contains(&IntegrityIssue::SelfParent {
            idea_id: "a".to_string()
        }));
        assert!(report.issues.contains(&IntegrityIssue::DanglingParent {
            idea_id: "a".to_string(),
            parent_id: "ghost".to_string()
        }));
        assert!(report.issues.contains(&IntegrityIssue::DuplicateParent {
            idea_id: "a".to_string(),
            parent_id: "b".to_string()
        }));
        assert!(report.issues.contains(&IntegrityIssue::DanglingCollection {
            idea_id: "a".to_string(),
            collection_id: "gone".to_string()
        }));
        assert!(report.issues.contains(&IntegrityIssue::EmptyTitle {
            idea_id: "b".to_string()
        }));
        assert_eq!(report.issues.len(), 5);
    }

    #[test]
    fn test_check_does_not_mutate() {
        let graph = damaged_graph();
        let before = graph.clone();
        check(&graph);
        assert_eq!(graph, before);
    }

    #[test]
    fn test_repair_fixes_references() {
        let mut graph = damaged_graph();
        let report = repair(&mut graph);

        assert_eq!(report.repaired.len(), 4);
        // The empty title is not mechanically fixable
        assert_eq!(
            report.issues,
            vec![IntegrityIssue::EmptyTitle {
                idea_id: "b".to_string()
            }]
        );

        let a = graph.get_idea("a").unwrap();
        assert_eq!(a.parent_ids, vec!["b"]);
        assert!(a.collection_id.is_none());
        assert_eq!(graph.get_idea("b").unwrap().collection_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_cycles_are_reported_not_repaired() {
        let doc: VaultDocument = serde_json::from_value(serde_json::json!({
            "ideas": [
                {"id": "x", "title": "X", "created": "2024-01-01T00:00:00.000Z", "parentIds": ["y"]},
                {"id": "y", "title": "Y", "created": "2024-01-01T00:00:00.000Z", "parentIds": ["x"]}
            ]
        }))
        .unwrap();
        let mut graph = Graph::from_document(doc).0;

        let report = repair(&mut graph);
        assert!(report.repaired.is_empty());
        assert_eq!(report.issues.len(), 1);
        assert!(matches!(report.issues[0], IntegrityIssue::Cycle { .. }));
    }

    #[test]
    fn test_unknown_priority_is_reported_and_repaired() {
        let doc: VaultDocument = serde_json::from_value(serde_json::json!({
            "ideas": [
                {"id": "u", "title": "U", "priority": "Urgent", "created": "2024-01-01T00:00:00.000Z"}
            ]
        }))
        .unwrap();
        let mut graph = Graph::from_document(doc).0;

        let unknown = IntegrityIssue::UnknownPriority {
            idea_id: "u".to_string(),
            value: "Urgent".to_string(),
        };
        assert_eq!(check(&graph).issues, vec![unknown.clone()]);

        let report = repair(&mut graph);
        assert_eq!(report.repaired, vec![unknown]);
        assert!(report.is_clean());
        let json = serde_json::to_value(graph.to_document()).unwrap();
        assert_eq!(json["ideas"][0]["priority"], "Medium");
    }
}
