use std::sync::Arc;

use blueprint_render::{
    Blueprint, BlueprintPredicate, BlueprintValue, ConstantFolder, InMemoryCatalog,
    RenderingPipeline,
};
use insta::assert_snapshot;
use serde_json::json;

const PROFILE_YAML: &str = r#"
kind: element
tag: article
attributes:
  class: { kind: constant, value: profile }
  data-id: { kind: path, path: user.id }
children:
  - kind: element
    tag: h1
    children:
      - kind: text
        value:
          kind: format
          pattern: "%s (%s)"
          args:
            - { kind: path, path: user.name }
            - { kind: request_attribute, name: locale }
  - kind: conditional
    predicate:
      kind: contains
      collection: { kind: path, path: user.roles }
      value: { kind: constant, value: admin }
    when_true:
      - kind: include
        key: { kind: constant, value: badge }
        model: { kind: path, path: user }
  - kind: element
    tag: ul
    children:
      - kind: repeat
        collection: { kind: path, path: user.langs }
        item: lang
        body:
          - kind: element
            tag: li
            children:
              - { kind: text, value: { kind: path, path: lang } }
"#;

fn profile_pipeline() -> RenderingPipeline {
    let profile: Blueprint = serde_yaml::from_str(PROFILE_YAML).unwrap();
    let badge = Blueprint::element("span")
        .attribute("title", BlueprintValue::path("name"))
        .child(Blueprint::text("admin"))
        .build();
    let catalog = InMemoryCatalog::new()
        .with("profile", profile)
        .with("badge", badge);
    RenderingPipeline::builder()
        .catalog(Arc::new(catalog))
        .build()
}

#[test]
fn test_profile_markup() {
    let node = profile_pipeline()
        .render_with(
            "profile",
            &json!({"user": {"id": 7, "name": "Ada", "roles": ["admin"], "langs": ["en", "fr"]}}),
            |r| r.with_attribute("locale", "en-GB"),
        )
        .unwrap();
    assert_snapshot!(node.to_markup(), @r#"<article class="profile" data-id="7"><h1>Ada (en-GB)</h1><span title="Ada">admin</span><ul><div><li>en</li><li>fr</li></div></ul></article>"#);
}

#[test]
fn test_profile_markup_without_optional_parts() {
    let node = profile_pipeline()
        .render("profile", &json!({"user": {"name": "Linus & co", "roles": []}}))
        .unwrap();
    assert_snapshot!(node.to_markup(), @r#"<article class="profile"><h1>Linus &amp; co (null)</h1><ul></ul></article>"#);
}

#[test]
fn test_blueprint_json_shape() {
    let blueprint = Blueprint::element("p")
        .attribute("class", "lead")
        .child(Blueprint::text(BlueprintValue::path("title")))
        .build();
    assert_snapshot!(serde_json::to_string(&blueprint).unwrap(), @r#"{"kind":"element","tag":"p","attributes":{"class":{"kind":"constant","value":"lead"}},"children":[{"kind":"text","value":{"kind":"path","path":"title"}}]}"#);
}

#[test]
fn test_node_json_shape() {
    let catalog = InMemoryCatalog::new().with(
        "p",
        Blueprint::element("p")
            .attribute("class", "lead")
            .child(Blueprint::text("Hi"))
            .build(),
    );
    let node = RenderingPipeline::builder()
        .catalog(Arc::new(catalog))
        .build()
        .render("p", &json!({}))
        .unwrap();
    assert_snapshot!(serde_json::to_string(&node).unwrap(), @r#"{"element":{"tag":"p","attributes":{"class":"lead"},"children":[{"text":"Hi"}]}}"#);
}

#[test]
fn test_folded_blueprint() {
    let catalog = InMemoryCatalog::new().with(
        "link",
        Blueprint::conditional(
            BlueprintPredicate::always(),
            vec![Blueprint::element("a")
                .attribute(
                    "href",
                    BlueprintValue::format(
                        "/%s/%s",
                        vec![BlueprintValue::constant("docs"), BlueprintValue::constant("intro")],
                    ),
                )
                .build()],
            vec![],
        ),
    );
    let pipeline = RenderingPipeline::builder()
        .catalog(Arc::new(catalog))
        .transformer(0, ConstantFolder)
        .build();
    let compiled = pipeline.precompile("link").unwrap();
    assert_snapshot!(serde_json::to_string(&*compiled).unwrap(), @r#"{"kind":"conditional","predicate":{"kind":"boolean_value","value":{"kind":"constant","value":true}},"when_true":[{"kind":"element","tag":"a","attributes":{"href":{"kind":"constant","value":"/docs/intro"}},"children":[]}],"when_false":[]}"#);
}
