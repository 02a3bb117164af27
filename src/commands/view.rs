//! View command: renders one projection of the vault.

use super::{Output, json_string, open_vault};
use crate::Result;
use crate::config::ResolvedConfig;
use crate::query::{self, ListQuery, Projection, ViewMode};
use crate::session::Vault;

/// A projection of a loaded vault.
///
/// The vault is kept so the projection can borrow from it when rendered.
pub struct ViewResult {
    vault: Vault,
    mode: ViewMode,
    query: ListQuery,
}

impl ViewResult {
    pub fn projection(&self) -> Projection<'_> {
        query::project(self.vault.graph(), self.mode, &self.query)
    }
}

impl Output for ViewResult {
    fn to_json(&self) -> String {
        json_string(&self.projection())
    }

    fn to_human(&self) -> String {
        let graph = self.vault.graph();
        match self.projection() {
            Projection::Grid(ideas) => {
                if ideas.is_empty() {
                    return "No ideas found.".to_string();
                }
                ideas
                    .iter()
                    .map(|i| {
                        let mut card = format!(
                            "┌ {} ({}, {})\n│ {}",
                            i.title, i.stage, i.priority, i.id
                        );
                        if let Some(ref d) = i.description {
                            card.push_str(&format!("\n│ {}", d));
                        }
                        card
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
            Projection::List(rows) => {
                if rows.is_empty() {
                    return "No ideas found.".to_string();
                }
                let mut lines = vec![format!(
                    "{:<36}  {:<30}  {:<10}  {:<6}  {}",
                    "ID", "TITLE", "STAGE", "PRIO", "COLLECTION"
                )];
                for row in rows {
                    lines.push(format!(
                        "{:<36}  {:<30}  {:<10}  {:<6}  {}",
                        row.idea.id,
                        truncate(&row.idea.title, 30),
                        row.idea.stage.as_str(),
                        row.idea.priority.as_str(),
                        row.collection_name.unwrap_or("-")
                    ));
                }
                lines.join("\n")
            }
            Projection::Collections(groups) => {
                if groups.is_empty() {
                    return "No collections.".to_string();
                }
                let mut lines = Vec::new();
                for group in groups {
                    lines.push(format!("{} ({})", group.collection.name, group.count()));
                    for idea in &group.ideas {
                        lines.push(format!("  {} {}", idea.id, idea.title));
                    }
                }
                lines.join("\n")
            }
            Projection::MindMap(map) => {
                let mut lines = vec![format!(
                    "{} node(s), {} edge(s)",
                    map.nodes.len(),
                    map.edges.len()
                )];
                for edge in &map.edges {
                    let title = |id: &str| {
                        graph
                            .idea(id)
                            .map(|i| i.title.clone())
                            .unwrap_or_default()
                    };
                    lines.push(format!("  {} -> {}", title(edge.from), title(edge.to)));
                }
                lines.join("\n")
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}

/// Project the vault in `mode`.
pub fn view(config: &ResolvedConfig, mode: &str, query: ListQuery) -> Result<ViewResult> {
    let mode: ViewMode = mode.parse()?;
    let vault = open_vault(config)?;
    Ok(ViewResult { vault, mode, query })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
