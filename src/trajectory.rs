use crate::models::{InteractionRecord, TrajectoryNode};

/// Turns the ordered interaction log into a chain of nodes.
///
/// Source order is the only chronology: node `i` gets id `i`, label
/// `I{i+1}` and, past the first node, the previous node as its sole parent.
pub fn build(interactions: &[InteractionRecord]) -> Vec<TrajectoryNode> {
    interactions
        .iter()
        .enumerate()
        .map(|(index, record)| TrajectoryNode {
            id: index.to_string(),
            label: format!("I{}", index + 1),
            parent_ids: match index {
                0 => Vec::new(),
                _ => vec![(index - 1).to_string()],
            },
            fields: record.0.clone(),
        })
        .collect()
}
