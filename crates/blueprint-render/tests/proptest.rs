//! Property-based tests for rendering using proptest.

use std::sync::Arc;

use blueprint_render::{
    Blueprint, BlueprintCatalog, BlueprintPredicate, BlueprintValue, InMemoryCatalog, Node,
    OverlayCatalog, RenderingPipeline,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ============================================================================
// Test helpers
// ============================================================================

fn render(blueprint: Blueprint, data: &Value) -> Node {
    let catalog = InMemoryCatalog::new().with("root", blueprint);
    RenderingPipeline::builder()
        .catalog(Arc::new(catalog))
        .build()
        .render("root", data)
        .unwrap()
}

fn texts(values: &[String]) -> Vec<Blueprint> {
    values.iter().map(|v| Blueprint::text(v.as_str())).collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Repeat visits every item once, in order.
    #[test]
    fn repeat_preserves_order(items in prop::collection::vec("[a-z0-9]{0,6}", 0..20)) {
        let blueprint = Blueprint::repeat(
            BlueprintValue::path("items"),
            "item",
            vec![Blueprint::text(BlueprintValue::path("item"))],
        );
        let node = render(blueprint, &json!({ "items": items }));

        let element = node.as_element().unwrap();
        prop_assert_eq!(element.children.len(), items.len());
        prop_assert_eq!(node.text_content(), items.concat());
    }

    /// The loop variable is gone once the repeat completes.
    #[test]
    fn repeat_binding_is_scoped(items in prop::collection::vec(any::<i32>(), 1..10)) {
        let blueprint = Blueprint::element("div")
            .child(Blueprint::repeat(
                BlueprintValue::path("items"),
                "it",
                vec![Blueprint::text("-")],
            ))
            .child(Blueprint::conditional(
                BlueprintPredicate::present(BlueprintValue::path("it")),
                vec![Blueprint::text("leaked")],
                vec![],
            ))
            .build();
        let node = render(blueprint, &json!({ "items": items }));
        prop_assert_eq!(node.text_content(), "-".repeat(items.len()));
    }

    /// Conditional output shape depends only on branch length.
    #[test]
    fn conditional_shape(branch in prop::collection::vec("[a-z]{1,4}", 0..5), flag in any::<bool>()) {
        let (when_true, when_false) = if flag {
            (texts(&branch), vec![])
        } else {
            (vec![], texts(&branch))
        };
        let blueprint = Blueprint::conditional(
            BlueprintPredicate::boolean(BlueprintValue::path("flag")),
            when_true,
            when_false,
        );
        let node = render(blueprint, &json!({ "flag": flag }));

        match branch.len() {
            0 => prop_assert_eq!(node, Node::empty()),
            1 => prop_assert_eq!(node, Node::text(branch[0].clone())),
            n => {
                let element = node.as_element().unwrap();
                prop_assert_eq!(element.tag.as_str(), "div");
                prop_assert_eq!(element.children.len(), n);
                prop_assert_eq!(node.text_content(), branch.concat());
            }
        }
    }

    /// Only attributes whose value resolves to non-null are emitted.
    #[test]
    fn null_attributes_are_omitted(present in prop::collection::btree_map("[a-z]{1,6}", any::<bool>(), 0..8)) {
        let mut data = Map::new();
        let mut builder = Blueprint::element("span");
        for (name, has_value) in &present {
            builder = builder.attribute(name.as_str(), BlueprintValue::path(name.as_str()));
            if *has_value {
                data.insert(name.clone(), json!(format!("v-{name}")));
            }
        }
        let node = render(builder.build(), &Value::Object(data));
        let element = node.as_element().unwrap();

        let expected: Vec<&String> = present.iter().filter(|(_, has)| **has).map(|(n, _)| n).collect();
        let actual: Vec<&String> = element.attributes.keys().collect();
        prop_assert_eq!(actual, expected);
        for (name, value) in &element.attributes {
            prop_assert_eq!(value, &format!("v-{name}"));
        }
    }

    /// `%s-%s` over two constants joins them with a dash.
    #[test]
    fn format_joins_constants(a in "[^%]{0,10}", b in "[^%]{0,10}") {
        let blueprint = Blueprint::text(BlueprintValue::format(
            "%s-%s",
            vec![BlueprintValue::constant(a.clone()), BlueprintValue::constant(b.clone())],
        ));
        prop_assert_eq!(render(blueprint, &json!({})), Node::text(format!("{a}-{b}")));
    }

    /// Overlay entries win; everything else falls through to the base.
    #[test]
    fn overlay_prefers_local(
        base_keys in prop::collection::btree_set("[a-e]", 0..5),
        local_keys in prop::collection::btree_set("[a-e]", 0..5),
    ) {
        let base = Arc::new(InMemoryCatalog::new());
        for key in &base_keys {
            base.register(key, Blueprint::text(format!("base-{key}")));
        }
        let overlay = OverlayCatalog::new(base.clone());
        for key in &local_keys {
            overlay.register(key, Blueprint::text(format!("local-{key}")));
        }

        for key in ["a", "b", "c", "d", "e"] {
            let key = key.to_string();
            let expected = if local_keys.contains(&key) {
                Some(Blueprint::text(format!("local-{key}")))
            } else if base_keys.contains(&key) {
                Some(Blueprint::text(format!("base-{key}")))
            } else {
                None
            };
            prop_assert_eq!(overlay.resolve(&key).ok().map(|bp| (*bp).clone()), expected);
        }
        prop_assert!(base_keys.iter().all(|k| base.resolve(k).is_ok()));
        prop_assert_eq!(base.len(), base_keys.len());
    }
}
