//! Read-only projections over the idea graph.
//!
//! Every function here borrows a [`Graph`] and never mutates it. Each display
//! mode has its own pure function; [`project`] dispatches on [`ViewMode`].
//!
//! | Mode          | Function               |
//! |---------------|------------------------|
//! | `grid`        | [`list_ideas`]         |
//! | `list`        | [`list_rows`]          |
//! | `collections` | [`group_by_collection`] |
//! | `mindmap`     | [`mind_map`]           |

pub mod traverse;

pub use traverse::{CycleEdge, ancestors, children_of, descendants, find_cycles, roots};

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::models::{Collection, Graph, Idea, Priority};
use crate::{Error, Result};

/// Display mode requested by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Grid,
    List,
    Collections,
    MindMap,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
            ViewMode::Collections => "collections",
            ViewMode::MindMap => "mindmap",
        }
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            "collections" => Ok(ViewMode::Collections),
            "mindmap" | "mind-map" | "map" => Ok(ViewMode::MindMap),
            _ => Err(Error::Validation(format!("Invalid view: {}", s))),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection membership filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CollectionFilter {
    /// No filtering
    #[default]
    All,
    /// Only ideas without a collection
    Unassigned,
    /// Only ideas in this exact collection
    Collection(String),
}

impl CollectionFilter {
    /// True when `idea` passes the filter.
    pub fn matches(&self, idea: &Idea) -> bool {
        match self {
            CollectionFilter::All => true,
            CollectionFilter::Unassigned => idea.collection_id.is_none(),
            CollectionFilter::Collection(id) => idea.collection_id.as_deref() == Some(id.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CollectionFilter::All => "all",
            CollectionFilter::Unassigned => "unassigned",
            CollectionFilter::Collection(id) => id.as_str(),
        }
    }
}

/// `all` and `unassigned` are reserved; any other value is a collection id.
impl From<&str> for CollectionFilter {
    fn from(value: &str) -> Self {
        match value {
            "" | "all" => CollectionFilter::All,
            "unassigned" => CollectionFilter::Unassigned,
            id => CollectionFilter::Collection(id.to_string()),
        }
    }
}

impl fmt::Display for CollectionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filters for the grid and list projections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub collection: CollectionFilter,
    /// Case-insensitive substring; `None` or empty matches everything
    pub search: Option<String>,
    /// Also match `search` against descriptions
    pub search_description: bool,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_collection(mut self, filter: CollectionFilter) -> Self {
        self.collection = filter;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn include_descriptions(mut self) -> Self {
        self.search_description = true;
        self
    }

    fn matches(&self, idea: &Idea) -> bool {
        if !self.collection.matches(idea) {
            return false;
        }
        match self.search.as_deref() {
            None | Some("") => true,
            Some(term) => {
                let needle = term.to_lowercase();
                idea.title.to_lowercase().contains(&needle)
                    || (self.search_description
                        && idea
                            .description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(&needle)))
            }
        }
    }
}

/// Grid projection: filtered ideas, newest first.
///
/// Ideas with equal `created` keep their insertion order.
pub fn list_ideas<'a>(graph: &'a Graph, query: &ListQuery) -> Vec<&'a Idea> {
    let mut ideas: Vec<&Idea> = graph.ideas().iter().filter(|i| query.matches(i)).collect();
    ideas.sort_by(|a, b| b.created.cmp(&a.created));
    ideas
}

/// A list-view row: the idea plus its resolved collection name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow<'a> {
    pub idea: &'a Idea,
    /// `None` when unassigned or the collection no longer exists
    pub collection_name: Option<&'a str>,
}

/// List projection: the grid projection with collection names resolved.
pub fn list_rows<'a>(graph: &'a Graph, query: &ListQuery) -> Vec<ListRow<'a>> {
    list_ideas(graph, query)
        .into_iter()
        .map(|idea| ListRow {
            idea,
            collection_name: idea
                .collection_id
                .as_deref()
                .and_then(|id| graph.collection(id))
                .map(|c| c.name.as_str()),
        })
        .collect()
}

/// One collection and its ideas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionGroup<'a> {
    pub collection: &'a Collection,
    pub ideas: Vec<&'a Idea>,
}

impl CollectionGroup<'_> {
    pub fn count(&self) -> usize {
        self.ideas.len()
    }
}

/// Collections projection: one group per collection, in collection order,
/// including empty ones. Unassigned ideas are not part of this projection.
pub fn group_by_collection(graph: &Graph) -> Vec<CollectionGroup<'_>> {
    graph
        .collections()
        .iter()
        .map(|collection| CollectionGroup {
            collection,
            ideas: graph
                .ideas()
                .iter()
                .filter(|i| i.collection_id.as_deref() == Some(collection.id.as_str()))
                .collect(),
        })
        .collect()
}

/// A node of the mind-map view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapNode<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub priority: Priority,
}

/// A directed edge of the mind-map view, drawn from parent to child.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MapEdge<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

/// Mind-map projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MindMap<'a> {
    pub nodes: Vec<MapNode<'a>>,
    pub edges: Vec<MapEdge<'a>>,
}

/// Mind-map projection: the subgraph induced by the ideas passing `filter`.
///
/// An edge is present only when both its parent and its child pass the
/// filter, so the view never shows an edge to a hidden node. Parent ids that
/// name no idea are skipped.
pub fn mind_map<'a>(graph: &'a Graph, filter: &CollectionFilter) -> MindMap<'a> {
    let visible: Vec<&Idea> = graph.ideas().iter().filter(|i| filter.matches(i)).collect();
    let visible_ids: HashSet<&str> = visible.iter().map(|i| i.id.as_str()).collect();

    let mut map = MindMap::default();
    let mut seen_edges = HashSet::new();
    for idea in visible.iter().copied() {
        map.nodes.push(MapNode {
            id: &idea.id,
            label: &idea.title,
            priority: idea.priority,
        });
        for parent in &idea.parent_ids {
            if !visible_ids.contains(parent.as_str()) {
                continue;
            }
            let edge = MapEdge {
                from: parent.as_str(),
                to: &idea.id,
            };
            if seen_edges.insert(edge.clone()) {
                map.edges.push(edge);
            }
        }
    }
    map
}

/// An entry in the parent picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate<'a> {
    pub id: &'a str,
    pub title: &'a str,
    /// Already a parent of the idea being edited
    pub selected: bool,
}

/// Ideas that can be picked as parents of `editing` (or of a new idea when
/// `editing` is `None`), sorted by title, optionally narrowed by `search`.
pub fn connect_candidates<'a>(
    graph: &'a Graph,
    editing: Option<&str>,
    search: Option<&str>,
) -> Result<Vec<Candidate<'a>>> {
    let edited = match editing {
        Some(id) => Some(graph.get_idea(id)?),
        None => None,
    };
    let needle = search.filter(|s| !s.is_empty()).map(str::to_lowercase);

    let mut candidates: Vec<Candidate> = graph
        .ideas()
        .iter()
        .filter(|i| edited.is_none_or(|e| e.id != i.id))
        .filter(|i| {
            needle
                .as_deref()
                .is_none_or(|n| i.title.to_lowercase().contains(n))
        })
        .map(|i| Candidate {
            id: &i.id,
            title: &i.title,
            selected: edited.is_some_and(|e| e.has_parent(&i.id)),
        })
        .collect();
    candidates.sort_by(|a, b| title_order(a.title, b.title));
    Ok(candidates)
}

/// Alphabetical, ignoring case first and falling back to exact comparison.
pub(crate) fn title_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// The result of [`project`], one variant per view mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "lowercase")]
pub enum Projection<'a> {
    Grid(Vec<&'a Idea>),
    List(Vec<ListRow<'a>>),
    Collections(Vec<CollectionGroup<'a>>),
    MindMap(MindMap<'a>),
}

impl Projection<'_> {
    pub fn mode(&self) -> ViewMode {
        match self {
            Projection::Grid(_) => ViewMode::Grid,
            Projection::List(_) => ViewMode::List,
            Projection::Collections(_) => ViewMode::Collections,
            Projection::MindMap(_) => ViewMode::MindMap,
        }
    }
}

/// Build the projection for `mode`.
///
/// The collections view ignores `query`; the mind map only uses its
/// collection filter.
pub fn project<'a>(graph: &'a Graph, mode: ViewMode, query: &ListQuery) -> Projection<'a> {
    match mode {
        ViewMode::Grid => Projection::Grid(list_ideas(graph, query)),
        ViewMode::List => Projection::List(list_rows(graph, query)),
        ViewMode::Collections => Projection::Collections(group_by_collection(graph)),
        ViewMode::MindMap => Projection::MindMap(mind_map(graph, &query.collection)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdeaDraft, IdeaPatch, VaultDocument};
    use chrono::{DateTime, Utc};

    fn at(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    fn idea(
        id: &str,
        title: &str,
        collection: Option<&str>,
        created: &str,
        parents: &[&str],
    ) -> Idea {
        let mut idea = Idea::new(id.to_string(), title.to_string());
        idea.collection_id = collection.map(str::to_string);
        idea.created = at(created);
        idea.parent_ids = parents.iter().map(|p| p.to_string()).collect();
        idea
    }

    /// Build a graph from literal ideas so timestamps are deterministic.
    fn graph_from(ideas: Vec<Idea>, collections: &[(&str, &str)]) -> Graph {
        let mut doc = VaultDocument {
            ideas,
            ..VaultDocument::default()
        };
        for (id, name) in collections {
            doc.collections
                .push(Collection::new(id.to_string(), name.to_string()));
        }
        Graph::from_document(doc).0
    }

    fn ids<'a>(ideas: &[&'a Idea]) -> Vec<&'a str> {
        ideas.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_list_sorted_newest_first() {
        let graph = graph_from(
            vec![
                idea("old", "Old", None, "2024-01-01T00:00:00Z", &[]),
                idea("new", "New", None, "2024-03-01T00:00:00Z", &[]),
                idea("mid", "Mid", None, "2024-02-01T00:00:00Z", &[]),
            ],
            &[],
        );

        let listed = list_ideas(&graph, &ListQuery::new());
        assert_eq!(ids(&listed), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_list_ties_keep_insertion_order() {
        let graph = graph_from(
            vec![
                idea("first", "First", None, "2024-01-01T00:00:00Z", &[]),
                idea("second", "Second", None, "2024-01-01T00:00:00Z", &[]),
                idea("third", "Third", None, "2024-01-01T00:00:00Z", &[]),
            ],
            &[],
        );

        let listed = list_ideas(&graph, &ListQuery::new());
        assert_eq!(ids(&listed), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_list_unassigned_with_search() {
        let graph = graph_from(
            vec![
                idea("a", "Xylophone app", None, "2024-01-01T00:00:00Z", &[]),
                idea("b", "Box maker", Some("c1"), "2024-01-02T00:00:00Z", &[]),
                idea("c", "Tax helper", None, "2024-01-03T00:00:00Z", &[]),
                idea("d", "Garden", None, "2024-01-04T00:00:00Z", &[]),
            ],
            &[("c1", "Hardware")],
        );

        let query = ListQuery::new()
            .in_collection(CollectionFilter::Unassigned)
            .search("X");
        let listed = list_ideas(&graph, &query);
        assert_eq!(ids(&listed), vec!["c", "a"]);
    }

    #[test]
    fn test_list_specific_collection() {
        let graph = graph_from(
            vec![
                idea("a", "A", Some("c1"), "2024-01-01T00:00:00Z", &[]),
                idea("b", "B", Some("c2"), "2024-01-02T00:00:00Z", &[]),
            ],
            &[("c1", "One"), ("c2", "Two")],
        );

        let query = ListQuery::new().in_collection(CollectionFilter::from("c2"));
        assert_eq!(ids(&list_ideas(&graph, &query)), vec!["b"]);
    }

    #[test]
    fn test_search_description_is_opt_in() {
        let mut graph = Graph::new();
        graph
            .create_idea(IdeaDraft::new("Bakery").with_description("sourdough delivery"))
            .unwrap();

        assert!(list_ideas(&graph, &ListQuery::new().search("sourdough")).is_empty());
        let query = ListQuery::new().search("SOURDOUGH").include_descriptions();
        assert_eq!(list_ideas(&graph, &query).len(), 1);
    }

    #[test]
    fn test_list_rows_resolve_collection_names() {
        let graph = graph_from(
            vec![
                idea("a", "A", Some("c1"), "2024-01-02T00:00:00Z", &[]),
                idea("b", "B", None, "2024-01-01T00:00:00Z", &[]),
            ],
            &[("c1", "Hardware")],
        );

        let rows = list_rows(&graph, &ListQuery::new());
        assert_eq!(rows[0].collection_name, Some("Hardware"));
        assert_eq!(rows[1].collection_name, None);
    }

    #[test]
    fn test_group_by_collection_includes_empty_groups() {
        let graph = graph_from(
            vec![
                idea("a", "A", Some("c1"), "2024-01-01T00:00:00Z", &[]),
                idea("b", "B", None, "2024-01-02T00:00:00Z", &[]),
            ],
            &[("c1", "Full"), ("c2", "Empty")],
        );

        let groups = group_by_collection(&graph);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].collection.id, "c1");
        assert_eq!(ids(&groups[0].ideas), vec!["a"]);
        assert_eq!(groups[1].count(), 0);
    }

    #[test]
    fn test_mind_map_induced_subgraph() {
        let graph = graph_from(
            vec![
                idea("a", "A", Some("x"), "2024-01-01T00:00:00Z", &[]),
                idea("b", "B", Some("y"), "2024-01-02T00:00:00Z", &["a"]),
            ],
            &[("x", "X"), ("y", "Y")],
        );

        let map = mind_map(&graph, &CollectionFilter::from("y"));
        let node_ids: Vec<&str> = map.nodes.iter().map(|n| n.id).collect();
        assert_eq!(node_ids, vec!["b"]);
        assert!(map.edges.is_empty());

        let full = mind_map(&graph, &CollectionFilter::All);
        assert_eq!(full.nodes.len(), 2);
        assert_eq!(full.edges, vec![MapEdge { from: "a", to: "b" }]);
    }

    #[test]
    fn test_mind_map_skips_dangling_parents() {
        let graph = graph_from(
            vec![idea("a", "A", None, "2024-01-01T00:00:00Z", &["gone", "a"])],
            &[],
        );

        // Dangling parent dropped; the stored self-loop is drawn as-is
        let map = mind_map(&graph, &CollectionFilter::All);
        assert_eq!(map.edges, vec![MapEdge { from: "a", to: "a" }]);
    }

    #[test]
    fn test_connect_candidates() {
        let mut graph = Graph::new();
        let zeta = graph.create_idea(IdeaDraft::new("zeta")).unwrap().id.clone();
        let alpha = graph.create_idea(IdeaDraft::new("Alpha")).unwrap().id.clone();
        let edited = graph.create_idea(IdeaDraft::new("Edited")).unwrap().id.clone();
        let patch = IdeaPatch {
            parent_ids: Some(vec![zeta.clone()]),
            ..IdeaPatch::default()
        };
        graph.update_idea(&edited, patch).unwrap();

        let candidates = connect_candidates(&graph, Some(&edited), None).unwrap();
        let titles: Vec<&str> = candidates.iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Alpha", "zeta"]);
        assert!(!candidates[0].selected);
        assert!(candidates[1].selected);
        assert_eq!(candidates[0].id, alpha);

        let all = connect_candidates(&graph, None, None).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|c| !c.selected));

        let narrowed = connect_candidates(&graph, None, Some("ALP")).unwrap();
        assert_eq!(narrowed.len(), 1);

        assert!(matches!(
            connect_candidates(&graph, Some("missing"), None),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_project_dispatch() {
        let graph = graph_from(
            vec![idea("a", "A", Some("c1"), "2024-01-01T00:00:00Z", &[])],
            &[("c1", "One")],
        );
        let query = ListQuery::new();

        for mode in [
            ViewMode::Grid,
            ViewMode::List,
            ViewMode::Collections,
            ViewMode::MindMap,
        ] {
            assert_eq!(project(&graph, mode, &query).mode(), mode);
        }

        let json = serde_json::to_value(project(&graph, ViewMode::MindMap, &query)).unwrap();
        assert_eq!(json["view"], "mindmap");
        assert_eq!(json["data"]["nodes"][0]["label"], "A");
    }

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("Grid".parse::<ViewMode>().unwrap(), ViewMode::Grid);
        assert_eq!("mind-map".parse::<ViewMode>().unwrap(), ViewMode::MindMap);
        assert!("kanban".parse::<ViewMode>().is_err());
    }
}
