use std::cmp::Ordering;

use super::*;

const SOURCE: &str = "# Title\n\nHello *world*\n";

fn find_nodes(tree: &DocumentTree, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
    tree.ids()
        .filter(|&id| predicate(&tree.node(id).unwrap().data))
        .collect()
}

fn first_node(tree: &DocumentTree, predicate: impl Fn(&NodeData) -> bool) -> NodeId {
    find_nodes(tree, predicate)[0]
}

#[test]
fn parse_builds_the_expected_structure() {
    let tree = parse(SOURCE).unwrap();
    let root = tree.root();
    assert_eq!(tree.node(root).unwrap().data, NodeData::Document);
    assert_eq!(tree.children(root).len(), 2);

    let heading = tree.children(root)[0];
    let paragraph = tree.children(root)[1];
    assert_eq!(
        tree.node(heading).unwrap().data,
        NodeData::Heading { level: 1 }
    );
    assert_eq!(tree.node(paragraph).unwrap().data, NodeData::Paragraph);
}

#[test]
fn parse_records_source_ranges() {
    let tree = parse(SOURCE).unwrap();
    let heading = tree.children(tree.root())[0];
    let heading_text = tree.children(heading)[0];
    assert_eq!(
        &SOURCE[tree.node(heading_text).unwrap().source_range.clone()],
        "Title"
    );

    let emphasis = first_node(&tree, |data| *data == NodeData::Emphasis);
    assert_eq!(
        &SOURCE[tree.node(emphasis).unwrap().source_range.clone()],
        "*world*"
    );
    let emphasis_text = tree.children(emphasis)[0];
    assert_eq!(
        &SOURCE[tree.node(emphasis_text).unwrap().source_range.clone()],
        "world"
    );
}

#[test]
fn parent_back_references_are_consistent() {
    let tree = parse(SOURCE).unwrap();
    for id in tree.ids() {
        let node = tree.node(id).unwrap();
        match node.parent() {
            None => assert_eq!(id, tree.root()),
            Some(parent) => {
                assert_eq!(tree.children(parent)[node.index_in_parent()], id);
            }
        }
    }
}

#[test]
fn parse_supports_task_lists() {
    let tree = parse("- [x] done\n- [ ] todo\n").unwrap();
    let markers: Vec<bool> = tree
        .ids()
        .filter_map(|id| match tree.node(id).unwrap().data {
            NodeData::TaskMarker { checked } => Some(checked),
            _ => None,
        })
        .collect();
    assert_eq!(markers, vec![true, false]);
}

#[test]
fn contains_walks_the_parent_chain() {
    let tree = parse(SOURCE).unwrap();
    let paragraph = tree.children(tree.root())[1];
    let emphasis = first_node(&tree, |data| *data == NodeData::Emphasis);
    let emphasis_text = tree.children(emphasis)[0];

    assert!(tree.contains(paragraph, emphasis_text));
    assert!(tree.contains(tree.root(), emphasis_text));
    assert!(tree.contains(emphasis, emphasis));
    assert!(!tree.contains(emphasis, paragraph));
}

#[test]
fn common_ancestor_finds_the_deepest_shared_node() {
    let tree = parse(SOURCE).unwrap();
    let heading = tree.children(tree.root())[0];
    let heading_text = tree.children(heading)[0];
    let paragraph = tree.children(tree.root())[1];
    let emphasis = first_node(&tree, |data| *data == NodeData::Emphasis);
    let emphasis_text = tree.children(emphasis)[0];

    assert_eq!(
        tree.common_ancestor(heading_text, emphasis_text).unwrap(),
        tree.root()
    );
    assert_eq!(
        tree.common_ancestor(emphasis_text, paragraph).unwrap(),
        paragraph
    );
}

#[test]
fn document_order_places_ancestors_before_descendants() {
    let tree = parse(SOURCE).unwrap();
    let heading = tree.children(tree.root())[0];
    let paragraph = tree.children(tree.root())[1];
    let emphasis = first_node(&tree, |data| *data == NodeData::Emphasis);

    assert_eq!(tree.order(heading, paragraph), Some(Ordering::Less));
    assert_eq!(tree.order(paragraph, emphasis), Some(Ordering::Less));
    assert_eq!(tree.order(emphasis, emphasis), Some(Ordering::Equal));
    assert_eq!(tree.order(emphasis, heading), Some(Ordering::Greater));
}

#[test]
fn is_between_is_inclusive_and_order_independent() {
    let tree = parse(SOURCE).unwrap();
    let heading = tree.children(tree.root())[0];
    let paragraph = tree.children(tree.root())[1];
    let emphasis = first_node(&tree, |data| *data == NodeData::Emphasis);

    assert!(tree.is_between(paragraph, heading, emphasis));
    assert!(tree.is_between(paragraph, emphasis, heading));
    assert!(tree.is_between(heading, heading, emphasis));
    assert!(!tree.is_between(heading, paragraph, emphasis));
}

#[test]
fn unknown_ids_compare_as_false() {
    let tree = parse(SOURCE).unwrap();
    let bogus = NodeId(999);
    assert!(!tree.contains(tree.root(), bogus));
    assert!(!tree.is_between(bogus, tree.root(), tree.root()));
    assert_eq!(tree.order(bogus, tree.root()), None);
}

#[test]
fn node_lookup_of_unknown_id_is_an_error() {
    let tree = parse(SOURCE).unwrap();
    assert_eq!(
        tree.node(NodeId(999)).unwrap_err(),
        TreeError::NodeNotFound(NodeId(999))
    );
}

#[test]
fn node_at_returns_the_deepest_container() {
    let tree = parse(SOURCE).unwrap();
    let emphasis = first_node(&tree, |data| *data == NodeData::Emphasis);
    let emphasis_text = tree.children(emphasis)[0];
    let inside_world = SOURCE.find("world").unwrap() + 1;
    assert_eq!(tree.node_at(inside_world), emphasis_text);
    // Offsets outside any block resolve to the root.
    assert_eq!(tree.node_at(SOURCE.len()), tree.root());
}

#[test]
fn builder_rejects_child_ranges_escaping_the_parent() {
    let mut builder = TreeBuilder::new(10);
    let paragraph = builder.push(NodeId::ROOT, 0..5, NodeData::Paragraph);
    builder.push(paragraph, 3..8, NodeData::Text);
    assert!(matches!(
        builder.build(),
        Err(TreeError::RangeOutsideParent { .. })
    ));
}

#[test]
fn empty_source_still_has_a_root() {
    let tree = parse("").unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node(tree.root()).unwrap().data, NodeData::Document);
}
