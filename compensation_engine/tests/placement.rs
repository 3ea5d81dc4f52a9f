mod support;

use compensation_engine::{
    api::{tree_objects::TreeSlot, TreeApi},
    db_types::Leg,
    traits::PlacementError,
    CompensationDatabase,
    MemberDirectory,
};
use support::{new_test_db, register, register_and_place};

#[tokio::test]
async fn each_leg_holds_exactly_one_member() {
    let (db, root) = new_test_db().await;
    register_and_place(&db, "Alice", "alice@example.com", root.id, root.id, Leg::Left).await;
    let bob = register(&db, "Bob", "bob@example.com", root.id).await;

    let err = db.place_member(bob.id, root.id, Leg::Left).await.unwrap_err();
    assert!(matches!(err, PlacementError::SlotOccupied { parent_id, leg: Leg::Left } if parent_id == root.id));

    // The right leg is still free.
    let bob = db.place_member(bob.id, root.id, Leg::Right).await.unwrap();
    assert_eq!(bob.parent_id, Some(root.id));
    assert_eq!(bob.leg, Some(Leg::Right));
}

#[tokio::test]
async fn placement_is_irreversible() {
    let (db, root) = new_test_db().await;
    let alice = register_and_place(&db, "Alice", "alice@example.com", root.id, root.id, Leg::Left).await;

    let err = db.place_member(alice.id, root.id, Leg::Right).await.unwrap_err();
    assert!(matches!(err, PlacementError::AlreadyPlaced(id) if id == alice.id));

    // Nothing moved.
    let alice = db.fetch_member(alice.id).await.unwrap().unwrap();
    assert_eq!(alice.leg, Some(Leg::Left));
}

#[tokio::test]
async fn placement_validates_both_parties() {
    let (db, root) = new_test_db().await;
    let alice = register(&db, "Alice", "alice@example.com", root.id).await;

    let err = db.place_member(alice.id, 99_999, Leg::Left).await.unwrap_err();
    assert!(matches!(err, PlacementError::ParentNotFound(99_999)));

    let err = db.place_member(99_999, root.id, Leg::Left).await.unwrap_err();
    assert!(matches!(err, PlacementError::MemberNotFound(99_999)));
}

#[tokio::test]
async fn auto_placement_descends_to_the_first_empty_slot() {
    let (db, root) = new_test_db().await;
    let alice = register_and_place(&db, "Alice", "alice@example.com", root.id, root.id, Leg::Left).await;
    let bob = register_and_place(&db, "Bob", "bob@example.com", root.id, alice.id, Leg::Left).await;

    // Left spill line from the root is root -> alice -> bob, so bob owns the first empty left leg.
    let target = db.find_first_empty_leg(root.id, Leg::Left).await.unwrap();
    assert_eq!(target, bob.id);

    let tree = TreeApi::new(db.clone());
    let carol = register(&db, "Carol", "carol@example.com", root.id).await;
    let carol = tree.place_at_first_empty_leg(carol.id, root.id, Leg::Left).await.unwrap();
    assert_eq!(carol.parent_id, Some(bob.id));
    assert_eq!(carol.leg, Some(Leg::Left));
}

#[tokio::test]
async fn pending_placements_tracks_unplaced_recruits() {
    let (db, root) = new_test_db().await;
    let alice = register(&db, "Alice", "alice@example.com", root.id).await;
    let bob = register(&db, "Bob", "bob@example.com", root.id).await;

    let pending = db.pending_placements(root.id).await.unwrap();
    assert_eq!(pending.iter().map(|m| m.id).collect::<Vec<_>>(), vec![alice.id, bob.id]);

    db.place_member(alice.id, root.id, Leg::Left).await.unwrap();
    let pending = db.pending_placements(root.id).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, bob.id);
}

#[tokio::test]
async fn subtree_renders_nodes_empty_slots_and_expansion_points() {
    let (db, root) = new_test_db().await;
    let alice = register_and_place(&db, "Alice", "alice@example.com", root.id, root.id, Leg::Left).await;
    let bob = register_and_place(&db, "Bob", "bob@example.com", root.id, alice.id, Leg::Right).await;
    register_and_place(&db, "Carol", "carol@example.com", root.id, bob.id, Leg::Left).await;

    let tree = TreeApi::new(db.clone());
    let rendered = tree.subtree(root.id, 2).await.unwrap().expect("root should exist");
    assert_eq!(rendered.id, root.id);
    assert!(matches!(rendered.right, TreeSlot::Empty { leg: Leg::Right, .. }));

    let TreeSlot::Node(alice_node) = rendered.left else { panic!("alice should be rendered") };
    assert_eq!(alice_node.id, alice.id);
    let TreeSlot::Node(bob_node) = alice_node.right else { panic!("bob should be rendered") };
    // Carol sits at the window boundary.
    assert!(matches!(bob_node.left, TreeSlot::Expandable { .. }));

    assert!(tree.subtree(99_999, 2).await.unwrap().is_none());
}

#[tokio::test]
async fn subtree_fetch_carries_one_level_of_boundary_occupancy() {
    let (db, root) = new_test_db().await;
    let alice = register_and_place(&db, "Alice", "alice@example.com", root.id, root.id, Leg::Left).await;
    let bob = register_and_place(&db, "Bob", "bob@example.com", root.id, alice.id, Leg::Left).await;
    let carol = register_and_place(&db, "Carol", "carol@example.com", root.id, bob.id, Leg::Left).await;

    // A one-level window still fetches bob (depth 2) so alice's occupied left leg can render as
    // an expansion point rather than an empty slot, but not carol below him.
    let rows = db.fetch_subtree(root.id, 1).await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    assert!(ids.contains(&bob.id));
    assert!(!ids.contains(&carol.id));

    let tree = TreeApi::new(db.clone());
    let rendered = tree.subtree(root.id, 1).await.unwrap().unwrap();
    let TreeSlot::Node(alice_node) = rendered.left else { panic!("alice should be rendered") };
    assert_eq!(alice_node.id, alice.id);
    assert!(matches!(alice_node.left, TreeSlot::Expandable { id } if id == bob.id));
}

#[tokio::test]
async fn placements_show_up_in_freshly_rendered_trees() {
    let (db, root) = new_test_db().await;
    let tree = TreeApi::new(db.clone());

    let before = tree.default_subtree(root.id).await.unwrap().unwrap();
    assert!(matches!(before.left, TreeSlot::Empty { .. }));

    let alice = register(&db, "Alice", "alice@example.com", root.id).await;
    tree.place(alice.id, root.id, Leg::Left).await.unwrap();

    // The placement cleared the cache, so the same query sees the new node.
    let after = tree.default_subtree(root.id).await.unwrap().unwrap();
    let TreeSlot::Node(node) = after.left else { panic!("alice should be rendered") };
    assert_eq!(node.id, alice.id);
}

#[tokio::test]
async fn team_counts_respect_the_leg_filter() {
    let (db, root) = new_test_db().await;
    let alice = register_and_place(&db, "Alice", "alice@example.com", root.id, root.id, Leg::Left).await;
    register_and_place(&db, "Bob", "bob@example.com", root.id, alice.id, Leg::Left).await;
    register_and_place(&db, "Carol", "carol@example.com", root.id, root.id, Leg::Right).await;

    assert_eq!(db.count_team(root.id, None).await.unwrap(), 3);
    assert_eq!(db.count_team(root.id, Some(Leg::Left)).await.unwrap(), 2);
    assert_eq!(db.count_team(root.id, Some(Leg::Right)).await.unwrap(), 1);
    assert_eq!(db.count_team(alice.id, None).await.unwrap(), 1);
}
