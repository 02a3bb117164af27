//! Cycle-safe graph traversal.
//!
//! The engine does not reject cycles when parents are edited, so nothing here
//! assumes the parent links form a DAG. Every walk keeps a visited set and
//! visits each idea at most once.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::Result;
use crate::models::{Graph, Idea};

use super::title_order;

/// An edge that closes a cycle, drawn from parent to child.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CycleEdge {
    pub parent_id: String,
    pub child_id: String,
}

/// Ideas without parents, sorted by title.
pub fn roots(graph: &Graph) -> Vec<&Idea> {
    let mut roots: Vec<&Idea> = graph.ideas().iter().filter(|i| i.is_root()).collect();
    roots.sort_by(|a, b| title_order(&a.title, &b.title));
    roots
}

/// Direct children of `id`, in graph order.
pub fn children_of<'a>(graph: &'a Graph, id: &str) -> Vec<&'a Idea> {
    graph.ideas().iter().filter(|i| i.has_parent(id)).collect()
}

/// Every idea reachable from `id` by following child links, breadth first.
///
/// The starting idea is never part of the result, even when it sits on a cycle.
pub fn descendants<'a>(graph: &'a Graph, id: &str) -> Result<Vec<&'a Idea>> {
    let start = graph.get_idea(id)?;
    let children = child_index(graph);
    Ok(walk(graph, start, |node| {
        children.get(node).cloned().unwrap_or_default()
    }))
}

/// Every idea reachable from `id` by following parent links, breadth first.
///
/// Parent ids naming no idea are skipped.
pub fn ancestors<'a>(graph: &'a Graph, id: &str) -> Result<Vec<&'a Idea>> {
    let start = graph.get_idea(id)?;
    Ok(walk(graph, start, |node| match graph.idea(node) {
        Some(idea) => idea.parent_ids.iter().map(String::as_str).collect(),
        None => Vec::new(),
    }))
}

/// Find the edges that close cycles.
///
/// Iterative depth-first search with three-colour marking over child links;
/// every edge into a node still on the stack is reported. Self-loops count.
pub fn find_cycles(graph: &Graph) -> Vec<CycleEdge> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let children = child_index(graph);
    let mut marks: HashMap<&str, Mark> = graph
        .ideas()
        .iter()
        .map(|i| (i.id.as_str(), Mark::Unvisited))
        .collect();
    let mut cycles = Vec::new();

    for root in graph.ideas() {
        if marks.get(root.id.as_str()) != Some(&Mark::Unvisited) {
            continue;
        }

        // Stack of (node, index of the next child to look at)
        let mut stack: Vec<(&str, usize)> = vec![(root.id.as_str(), 0)];
        marks.insert(root.id.as_str(), Mark::OnStack);

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let kids = children.get(node).map(Vec::as_slice).unwrap_or(&[]);

            if next >= kids.len() {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            }
            frame.1 += 1;

            let child = kids[next];
            match marks.get(child).copied() {
                Some(Mark::Unvisited) => {
                    marks.insert(child, Mark::OnStack);
                    stack.push((child, 0));
                }
                Some(Mark::OnStack) => cycles.push(CycleEdge {
                    parent_id: node.to_string(),
                    child_id: child.to_string(),
                }),
                Some(Mark::Done) | None => {}
            }
        }
    }

    cycles
}

/// Map from parent id to the ids of its children, in graph order.
///
/// Duplicate parent entries on a child produce a single link.
fn child_index(graph: &Graph) -> HashMap<&str, Vec<&str>> {
    let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
    for idea in graph.ideas() {
        let mut seen = HashSet::new();
        for parent in &idea.parent_ids {
            if seen.insert(parent.as_str()) {
                index.entry(parent.as_str()).or_default().push(idea.id.as_str());
            }
        }
    }
    index
}

/// Breadth-first walk from `start` using `next` to expand a node.
fn walk<'a, F>(graph: &'a Graph, start: &'a Idea, next: F) -> Vec<&'a Idea>
where
    F: Fn(&str) -> Vec<&'a str>,
{
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(start.id.as_str());

    let mut queue: VecDeque<&str> = VecDeque::from([start.id.as_str()]);
    let mut found = Vec::new();

    while let Some(node) = queue.pop_front() {
        for neighbour in next(node) {
            if !visited.insert(neighbour) {
                continue;
            }
            if let Some(idea) = graph.idea(neighbour) {
                found.push(idea);
                queue.push_back(neighbour);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdeaDraft, IdeaPatch};

    fn set_parents(graph: &mut Graph, id: &str, parents: &[&str]) {
        let patch = IdeaPatch {
            parent_ids: Some(parents.iter().map(|p| p.to_string()).collect()),
            ..IdeaPatch::default()
        };
        graph.update_idea(id, patch).unwrap();
    }

    fn add(graph: &mut Graph, title: &str) -> String {
        graph.create_idea(IdeaDraft::new(title)).unwrap().id.clone()
    }

    fn titles(ideas: &[&Idea]) -> Vec<String> {
        ideas.iter().map(|i| i.title.clone()).collect()
    }

    #[test]
    fn test_roots_sorted_by_title() {
        let mut graph = Graph::new();
        let b = add(&mut graph, "beta");
        add(&mut graph, "Alpha");
        let child = add(&mut graph, "Child");
        set_parents(&mut graph, &child, &[&b]);

        assert_eq!(titles(&roots(&graph)), vec!["Alpha", "beta"]);
    }

    #[test]
    fn test_descendants_of_diamond() {
        let mut graph = Graph::new();
        let top = add(&mut graph, "Top");
        let left = add(&mut graph, "Left");
        let right = add(&mut graph, "Right");
        let bottom = add(&mut graph, "Bottom");
        set_parents(&mut graph, &left, &[&top]);
        set_parents(&mut graph, &right, &[&top]);
        set_parents(&mut graph, &bottom, &[&left, &right]);

        let found = descendants(&graph, &top).unwrap();
        assert_eq!(titles(&found), vec!["Left", "Right", "Bottom"]);

        let up = ancestors(&graph, &bottom).unwrap();
        assert_eq!(titles(&up), vec!["Left", "Right", "Top"]);
        assert_eq!(titles(&children_of(&graph, &top)), vec!["Left", "Right"]);
    }

    #[test]
    fn test_traversal_terminates_on_cycle() {
        let mut graph = Graph::new();
        let a = add(&mut graph, "A");
        let b = add(&mut graph, "B");
        let c = add(&mut graph, "C");
        set_parents(&mut graph, &b, &[&a]);
        set_parents(&mut graph, &c, &[&b]);
        // Closing the loop is allowed on write
        set_parents(&mut graph, &a, &[&c]);

        assert_eq!(titles(&descendants(&graph, &a).unwrap()), vec!["B", "C"]);
        assert_eq!(titles(&ancestors(&graph, &a).unwrap()), vec!["C", "B"]);

        let cycles = find_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(
            cycles[0],
            CycleEdge {
                parent_id: c.clone(),
                child_id: a.clone()
            }
        );
    }

    #[test]
    fn test_find_cycles_on_dag_is_empty() {
        let mut graph = Graph::new();
        let a = add(&mut graph, "A");
        let b = add(&mut graph, "B");
        let c = add(&mut graph, "C");
        set_parents(&mut graph, &b, &[&a]);
        set_parents(&mut graph, &c, &[&a, &b]);

        assert!(find_cycles(&graph).is_empty());
    }

    #[test]
    fn test_unknown_start() {
        let graph = Graph::new();
        assert!(descendants(&graph, "nope").is_err());
        assert!(ancestors(&graph, "nope").is_err());
    }
}
