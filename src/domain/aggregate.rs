//! Category and guild roll-ups.

use super::report::{CategorySummary, NodeType};
use super::status::{worst_of, StatusLevel};

pub const ORGANIZATION_CATEGORY: &str = "organization";

/// Worst level across a category's nodes. An empty category is `Error`.
pub fn category_status(node_levels: &[StatusLevel]) -> StatusLevel {
    worst_of(node_levels)
}

/// Infrastructure summary for a guild's validation: the organization level
/// first, then one entry per node type.
///
/// `nodes` pairs every node with its overall level, already combined with
/// its history the same way node reports are.
pub fn guild_infrastructure(
    organization: StatusLevel,
    nodes: &[(NodeType, StatusLevel)],
) -> Vec<CategorySummary> {
    let mut summary = Vec::with_capacity(NodeType::ALL.len() + 1);
    summary.push(CategorySummary {
        category: ORGANIZATION_CATEGORY.to_string(),
        level: organization,
    });

    for node_type in NodeType::ALL {
        let levels: Vec<StatusLevel> = nodes
            .iter()
            .filter(|(t, _)| *t == node_type)
            .map(|(_, level)| *level)
            .collect();
        summary.push(CategorySummary {
            category: node_type.category().to_string(),
            level: category_status(&levels),
        });
    }

    summary
}
