//! Presentation shapes for the placement tree.
//!
//! The backend returns a flat list of [`TreeNodeRow`]s from one recursive query; assembly into a
//! nested structure happens here, in memory, so the database never pays for per-node lookups.

use std::collections::HashMap;

use bce_common::Pv;
use serde::{Deserialize, Serialize};

use crate::db_types::{Leg, TreeNodeRow};

/// What hangs off one leg of a rendered node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeSlot {
    /// An occupied slot, fully rendered.
    Node(Box<TreeNode>),
    /// An unoccupied slot. Carries enough information to drive a placement straight from the UI.
    Empty { parent_id: i64, leg: Leg },
    /// An occupied slot at the edge of the rendered window. Fetch a new subtree rooted here to
    /// drill deeper.
    Expandable { id: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: i64,
    pub member_number: String,
    pub full_name: String,
    pub left_pv: Pv,
    pub right_pv: Pv,
    /// Human-readable per-leg volume summary, e.g. `L: 100 PV | R: 70 PV`.
    pub pv_summary: String,
    pub left: TreeSlot,
    pub right: TreeSlot,
}

/// Builds the nested tree from the flat subtree rows. Returns `None` when the root itself is not
/// among the rows (i.e. the member does not exist).
pub fn assemble_tree(rows: &[TreeNodeRow], root_id: i64, max_depth: u32) -> Option<TreeNode> {
    let children: HashMap<(i64, Leg), &TreeNodeRow> =
        rows.iter().filter_map(|row| Some(((row.parent_id?, row.leg?), row))).collect();
    let root = rows.iter().find(|row| row.id == root_id)?;
    Some(build_node(root, &children, max_depth))
}

fn build_node(row: &TreeNodeRow, children: &HashMap<(i64, Leg), &TreeNodeRow>, remaining: u32) -> TreeNode {
    let left = build_slot(row.id, Leg::Left, children, remaining);
    let right = build_slot(row.id, Leg::Right, children, remaining);
    TreeNode {
        id: row.id,
        member_number: row.member_number.clone(),
        full_name: row.full_name.clone(),
        left_pv: row.left_pv,
        right_pv: row.right_pv,
        pv_summary: format!("L: {} | R: {}", row.left_pv, row.right_pv),
        left,
        right,
    }
}

fn build_slot(parent_id: i64, leg: Leg, children: &HashMap<(i64, Leg), &TreeNodeRow>, remaining: u32) -> TreeSlot {
    match children.get(&(parent_id, leg)) {
        Some(child) if remaining > 0 => TreeSlot::Node(Box::new(build_node(child, children, remaining - 1))),
        Some(child) => TreeSlot::Expandable { id: child.id },
        None => TreeSlot::Empty { parent_id, leg },
    }
}

#[cfg(test)]
mod test {
    use bce_common::Pv;

    use super::*;

    fn row(id: i64, parent_id: Option<i64>, leg: Option<Leg>, depth: i64) -> TreeNodeRow {
        TreeNodeRow {
            id,
            full_name: format!("Member {id}"),
            member_number: format!("90{id:07}"),
            parent_id,
            leg,
            left_pv: Pv::new(0),
            right_pv: Pv::new(0),
            depth,
        }
    }

    #[test]
    fn empty_rows_yield_no_tree() {
        assert!(assemble_tree(&[], 1, 3).is_none());
    }

    #[test]
    fn lone_root_has_two_empty_slots() {
        let rows = [row(1, None, None, 0)];
        let tree = assemble_tree(&rows, 1, 3).unwrap();
        assert!(matches!(tree.left, TreeSlot::Empty { parent_id: 1, leg: Leg::Left }));
        assert!(matches!(tree.right, TreeSlot::Empty { parent_id: 1, leg: Leg::Right }));
    }

    #[test]
    fn boundary_nodes_become_expandable() {
        // Chain 1 -> 2 -> 3 down the left leg, rendered with a one-level window.
        let rows = [row(1, None, None, 0), row(2, Some(1), Some(Leg::Left), 1), row(3, Some(2), Some(Leg::Left), 2)];
        let tree = assemble_tree(&rows, 1, 1).unwrap();
        let TreeSlot::Node(child) = tree.left else { panic!("left slot should be occupied") };
        assert_eq!(child.id, 2);
        assert!(matches!(child.left, TreeSlot::Expandable { id: 3 }));
        assert!(matches!(child.right, TreeSlot::Empty { parent_id: 2, leg: Leg::Right }));
    }

    #[test]
    fn slots_serialize_with_a_kind_tag() {
        let slot = TreeSlot::Empty { parent_id: 7, leg: Leg::Right };
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["kind"], "empty");
        assert_eq!(json["leg"], "RIGHT");

        let rows = [row(1, None, None, 0)];
        let tree = assemble_tree(&rows, 1, 1).unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["pv_summary"], "L: 0 PV | R: 0 PV");
        assert_eq!(json["left"]["kind"], "empty");
    }

    #[test]
    fn legs_are_kept_apart() {
        let rows = [row(1, None, None, 0), row(2, Some(1), Some(Leg::Right), 1)];
        let tree = assemble_tree(&rows, 1, 2).unwrap();
        assert!(matches!(tree.left, TreeSlot::Empty { .. }));
        let TreeSlot::Node(child) = tree.right else { panic!("right slot should be occupied") };
        assert_eq!(child.id, 2);
    }
}
