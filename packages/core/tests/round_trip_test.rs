use proptest::prelude::*;
use schema_studio_core::models::{PropertyInput, PropertyTree, PropertyType};
use schema_studio_core::operations::TreeOperationError;
use schema_studio_core::services::{generate_example, CompilerOptions, FixedMarker, SchemaCompiler};
use serde_json::{json, Value};

/// One `add_property` call: (parent pick, name pick, type pick, required, variant pick)
type AddOp = (usize, usize, usize, bool, usize);

fn input_for(name: String, type_pick: usize, required: bool, variant: usize) -> PropertyInput {
    let property_type = PropertyType::ALL[type_pick % PropertyType::ALL.len()];
    let input = PropertyInput::new(name, property_type).with_required(required);

    match (property_type, variant) {
        (PropertyType::String, 1) => input
            .with_constraint("minLength", 1)
            .with_constraint("maxLength", 20),
        (PropertyType::String, 2) => input
            .with_constraint("enum", json!(["a", "b"]))
            .fixed("b"),
        (PropertyType::Number, 1) => input
            .with_constraint("minimum", 0)
            .with_constraint("maximum", 120),
        (PropertyType::Number, 2) => input.with_constraint("multipleOf", 0.5).with_default(1.5),
        (PropertyType::Boolean, 1) => input.fixed(true),
        (PropertyType::Array, 1) => input.with_item_type(PropertyType::String),
        (PropertyType::Array, 2) => input
            .with_constraint("minItems", 1)
            .with_constraint("uniqueItems", true),
        _ => input.with_description(format!("variant {}", variant)),
    }
}

/// Build a tree purely through `add_property`; rejected calls are skipped
fn build_tree(ops: &[AddOp]) -> PropertyTree {
    let mut tree = PropertyTree::new();
    let mut scopes: Vec<Option<String>> = vec![None];

    for &(parent_pick, name_pick, type_pick, required, variant) in ops {
        let parent = scopes[parent_pick % scopes.len()].clone();
        let input = input_for(format!("field{}", name_pick), type_pick, required, variant);
        if let Ok(node) = tree.add_property(parent.as_deref(), input) {
            let accepts_children = match node.property_type() {
                PropertyType::Object => true,
                PropertyType::Array => node.item_type().is_none(),
                _ => false,
            };
            if accepts_children {
                scopes.push(Some(node.id().to_string()));
            }
        }
    }

    tree
}

fn add_ops() -> impl Strategy<Value = Vec<AddOp>> {
    prop::collection::vec((any::<usize>(), 0usize..6, 0usize..5, any::<bool>(), 0usize..3), 0..30)
}

proptest! {
    #[test]
    fn prop_decompile_inverts_compile(ops in add_ops()) {
        let tree = build_tree(&ops);
        let compiler = SchemaCompiler::default();

        let schema = compiler.compile(&tree);
        let restored = compiler.decompile(&schema).expect("compiled schemas always decompile");

        prop_assert!(restored.same_shape(&tree));
        prop_assert_eq!(compiler.compile(&restored), schema);
    }

    #[test]
    fn prop_round_trip_with_extension_marker(ops in add_ops()) {
        let tree = build_tree(&ops);
        let compiler = SchemaCompiler::new(CompilerOptions {
            fixed_marker: FixedMarker::Extension,
            ..CompilerOptions::default()
        });

        let restored = compiler.decompile(&compiler.compile(&tree)).unwrap();
        prop_assert!(restored.same_shape(&tree));
    }

    #[test]
    fn prop_duplicate_names_are_rejected(ops in add_ops(), type_pick in 0usize..5) {
        let mut tree = build_tree(&ops);
        let Some(existing) = tree.properties().first().map(|p| p.name().to_string()) else {
            return Ok(());
        };
        let before = tree.properties().len();

        let result = tree.add_property(None, input_for(existing, type_pick, false, 0));

        let is_duplicate = matches!(result, Err(TreeOperationError::DuplicateName { .. }));
        prop_assert!(is_duplicate);
        prop_assert_eq!(tree.properties().len(), before);
    }

    #[test]
    fn prop_delete_removes_whole_subtree(ops in add_ops(), pick in any::<usize>()) {
        let mut tree = build_tree(&ops);
        if tree.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = tree.iter().map(|n| n.id().to_string()).collect();
        let target = &ids[pick % ids.len()];
        let subtree_size = tree.find_by_id(target).unwrap().descendant_count() + 1;
        let before = tree.node_count();

        tree.delete_property(target).unwrap();

        prop_assert_eq!(tree.node_count(), before - subtree_size);
        prop_assert!(tree.find_by_id(target).is_none());
    }

    #[test]
    fn prop_moving_under_a_descendant_is_rejected(ops in add_ops(), pick in any::<usize>()) {
        let mut tree = build_tree(&ops);
        let candidates: Vec<(String, String)> = tree
            .iter()
            .flat_map(|node| {
                node.iter()
                    .skip(1)
                    .filter(|d| d.property_type().is_container() && d.item_type().is_none())
                    .map(move |d| (node.id().to_string(), d.id().to_string()))
            })
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }
        let (ancestor, descendant) = &candidates[pick % candidates.len()];
        let snapshot = tree.clone();

        let result = tree.move_property(ancestor, Some(descendant), 0);

        let is_cycle = matches!(result, Err(TreeOperationError::CycleDetected { .. }));
        prop_assert!(is_cycle);
        prop_assert_eq!(tree, snapshot);
    }

    #[test]
    fn prop_examples_cover_every_root_property(ops in add_ops()) {
        let tree = build_tree(&ops);
        let example = generate_example(&tree);
        let object = example.as_object().unwrap();

        prop_assert_eq!(object.len(), tree.properties().len());
        for property in tree.properties() {
            prop_assert!(object.contains_key(property.name()));
            if let Some(fixed) = property.fixed_value() {
                prop_assert_eq!(&object[property.name()], fixed);
            }
        }
    }
}

#[test]
fn test_documented_example_compiles_exactly() {
    let mut tree = PropertyTree::new();
    tree.add_property(
        None,
        PropertyInput::new("age", PropertyType::Number)
            .with_required(true)
            .with_constraint("minimum", 0)
            .with_constraint("maximum", 120),
    )
    .unwrap();

    let compiled = SchemaCompiler::default().compile(&tree);
    let expected: Value = serde_json::from_str(
        r#"{"type":"object","properties":{"age":{"type":"number","minimum":0,"maximum":120}},"required":["age"]}"#,
    )
    .unwrap();
    assert_eq!(compiled, expected);
    assert_eq!(
        serde_json::to_string(&compiled).unwrap(),
        r#"{"type":"object","properties":{"age":{"type":"number","minimum":0,"maximum":120}},"required":["age"]}"#
    );
}

#[test]
fn test_fixed_value_fidelity() {
    let mut tree = PropertyTree::new();
    let node = tree
        .add_property(None, PropertyInput::new("answer", PropertyType::Number).fixed(42))
        .unwrap();

    assert_eq!(schema_studio_core::example_for(&node), json!(42));
    let compiled = SchemaCompiler::default().compile(&tree);
    assert_eq!(compiled["properties"]["answer"]["default"], json!(42));
    assert_eq!(compiled["properties"]["answer"]["readOnly"], json!(true));
}
