//! Integration tests for nesting and flattening menu records.

use rstest::rstest;

use navmenu::domain::{flatten, nestify, ItemId, LinkTarget, MenuItem, MenuTree, NestedItem};

fn rec(id: &str, parent: Option<&str>, position: usize) -> MenuItem {
    MenuItem {
        id: ItemId::new(id),
        label: format!("Label {id}"),
        link: format!("/{id}"),
        link_target: LinkTarget::SameWindow,
        position,
        parent_id: parent.map(ItemId::new),
    }
}

fn leaves(records: &[MenuItem]) -> Vec<NestedItem> {
    records.iter().cloned().map(NestedItem::leaf).collect()
}

fn sorted_by_id(mut records: Vec<MenuItem>) -> Vec<MenuItem> {
    records.sort_by(|a, b| a.id.cmp(&b.id));
    records
}

fn sample() -> Vec<MenuItem> {
    vec![
        rec("a", None, 0),
        rec("a1", Some("a"), 0),
        rec("a2", Some("a"), 1),
        rec("a1x", Some("a1"), 0),
        rec("b", None, 1),
        rec("b1", Some("b"), 0),
    ]
}

#[test]
fn given_valid_flat_list_when_round_tripping_then_records_are_preserved() {
    // Arrange
    let records = sample();

    // Act
    let round_trip = flatten(&nestify(&leaves(&records)));

    // Assert
    assert_eq!(sorted_by_id(round_trip), sorted_by_id(records));
}

#[test]
fn given_flat_list_when_nestifying_then_children_are_embedded_in_position_order() {
    // Arrange: positions listed out of order
    let records = vec![
        rec("b", None, 1),
        rec("a", None, 0),
        rec("a2", Some("a"), 1),
        rec("a1", Some("a"), 0),
    ];

    // Act
    let nested = nestify(&leaves(&records));

    // Assert
    let roots: Vec<&str> = nested.iter().map(|n| n.id().as_str()).collect();
    assert_eq!(roots, vec!["a", "b"]);
    let children: Vec<&str> = nested[0].children.iter().map(|n| n.id().as_str()).collect();
    assert_eq!(children, vec!["a1", "a2"]);
    assert!(nested[1].children.is_empty());
}

#[test]
fn given_nested_input_when_nestifying_then_same_as_nestifying_its_flattening() {
    // Arrange
    let nested = nestify(&leaves(&sample()));

    // Act
    let from_nested = nestify(&nested);
    let from_flat = nestify(&leaves(&flatten(&nested)));

    // Assert
    assert_eq!(from_nested, from_flat);
    assert_eq!(from_nested, nested);
}

#[test]
fn given_mixed_shapes_when_nestifying_then_each_entry_appears_once() {
    // Arrange: "a1" embedded under "a" and also present as a flat record
    let mut a = NestedItem::leaf(rec("a", None, 0));
    a.children.push(NestedItem::leaf(rec("a1", Some("a"), 0)));
    let input = vec![a, NestedItem::leaf(rec("a1", Some("a"), 0)), NestedItem::leaf(rec("b", None, 1))];

    // Act
    let flat = flatten(&nestify(&input));

    // Assert
    let ids: Vec<&str> = flat.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "a1", "b"]);
}

#[test]
fn given_dangling_parent_when_nestifying_then_item_is_promoted_to_root() {
    // Arrange
    let records = vec![rec("a", None, 0), rec("orphan", Some("missing"), 0)];

    // Act
    let flat = flatten(&nestify(&leaves(&records)));

    // Assert
    let orphan = flat.iter().find(|r| r.id.as_str() == "orphan").unwrap();
    assert_eq!(orphan.parent_id, None);
    assert_eq!(flat.len(), 2);
}

#[test]
fn given_parent_cycle_when_building_tree_then_every_entry_is_kept_and_acyclic() {
    // Arrange
    let records = vec![rec("a", Some("b"), 0), rec("b", Some("a"), 0), rec("c", None, 0)];

    // Act
    let tree = MenuTree::from_flat(&records);

    // Assert
    assert_eq!(tree.len(), 3);
    for (_, node) in tree.iter() {
        assert!(tree.depth(&node.item.id).is_some());
    }
    assert!(tree.roots().count() >= 2);
}

#[rstest]
#[case(vec![0, 1, 2])]
#[case(vec![5, 9, 20])]
#[case(vec![2, 2, 0])]
fn given_arbitrary_positions_when_flattening_then_positions_are_contiguous(
    #[case] positions: Vec<usize>,
) {
    // Arrange
    let records: Vec<MenuItem> = positions
        .iter()
        .enumerate()
        .map(|(i, &p)| rec(&format!("r{i}"), None, p))
        .collect();

    // Act
    let flat = flatten(&nestify(&leaves(&records)));

    // Assert
    let got: Vec<usize> = flat.iter().map(|r| r.position).collect();
    assert_eq!(got, vec![0, 1, 2]);
}

#[test]
fn given_flat_json_when_deserializing_then_camel_case_fields_are_read() {
    // Arrange
    let json = r#"[
        {"id": "1", "label": "Home", "link": "/", "linkTarget": "new-window", "position": 0, "parentId": null},
        {"id": "2", "label": "Shop", "link": "/shop", "position": 0, "parentId": "1"}
    ]"#;

    // Act
    let records: Vec<NestedItem> = serde_json::from_str(json).unwrap();
    let nested = nestify(&records);

    // Assert
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].item.link_target, LinkTarget::NewWindow);
    assert_eq!(nested[0].children[0].item.label, "Shop");
    assert_eq!(nested[0].children[0].item.link_target, LinkTarget::SameWindow);
}

#[test]
fn given_repeated_entry_embedding_children_when_nestifying_then_children_survive() {
    // Arrange: "b" is a root and repeats under "a", carrying child "c"
    let mut repeat = NestedItem::leaf(rec("b", Some("a"), 0));
    repeat.children.push(NestedItem::leaf(rec("c", Some("b"), 0)));
    let mut a = NestedItem::leaf(rec("a", None, 1));
    a.children.push(repeat);
    let input = vec![NestedItem::leaf(rec("b", None, 0)), a];

    // Act
    let flat = flatten(&nestify(&input));

    // Assert
    let ids: Vec<&str> = flat.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
    let c = flat.iter().find(|r| r.id.as_str() == "c").unwrap();
    assert_eq!(c.parent_id, Some(ItemId::new("b")));
}
