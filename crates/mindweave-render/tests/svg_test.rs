use mindweave_core::{NodeRecord, NodeTree, Positions, Viewport, logical_point, screen_vector};
use mindweave_render::{Scene, SceneStyle, SvgOptions, viewport_transform};

fn render(title: &str, opts: &SvgOptions) -> String {
    let tree = NodeTree::from_nodes([
        NodeRecord::new("root", title).with_children(["a"]),
        NodeRecord::new("a", "Leaf"),
    ])
    .expect("valid tree");
    let mut positions = Positions::new();
    positions.insert("root".to_string(), logical_point(0.0, 0.0));
    positions.insert("a".to_string(), logical_point(12.5, 144.0));

    let mut scene = Scene::default();
    scene.redraw(&tree, &positions, SceneStyle::default());
    scene.apply_viewport(Viewport::new(screen_vector(25.0, -10.0), 1.5));
    scene.to_svg(opts)
}

#[test]
fn svg_structure_matches_scene() {
    let svg = render("Deep Learning Intro", &SvgOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("width"), Some("100%"));

    let viewport = root
        .children()
        .find(|n| n.has_tag_name("g"))
        .expect("viewport group");
    assert_eq!(viewport.attribute("class"), Some("viewport"));
    assert_eq!(
        viewport.attribute("transform"),
        Some("translate(25, -10) scale(1.5)")
    );

    let kinds: Vec<&str> = viewport
        .children()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name())
        .collect();
    assert_eq!(kinds, vec!["line", "g", "g"], "lines are drawn below nodes");

    let line = viewport
        .children()
        .find(|n| n.has_tag_name("line"))
        .expect("line");
    assert_eq!(line.attribute("data-child-id"), Some("a"));
    assert_eq!(line.attribute("x2"), Some("12.5"));
    assert_eq!(line.attribute("y2"), Some("144"));

    let root_group = viewport
        .descendants()
        .find(|n| n.attribute("data-node-id") == Some("root"))
        .expect("root group");
    assert_eq!(root_group.attribute("class"), Some("node-group"));
    let circle = root_group
        .children()
        .find(|n| n.has_tag_name("circle"))
        .expect("circle");
    assert_eq!(circle.attribute("r"), Some("40"));

    let tspans: Vec<(Option<&str>, Option<&str>)> = root_group
        .descendants()
        .filter(|n| n.has_tag_name("tspan"))
        .map(|n| (n.text(), n.attribute("dy")))
        .collect();
    assert_eq!(
        tspans,
        vec![
            (Some("Deep"), Some("-14.4px")),
            (Some("Learning"), Some("14.4px")),
            (Some("Intro"), Some("14.4px")),
        ]
    );

    let leaf = viewport
        .descendants()
        .find(|n| n.attribute("data-node-id") == Some("a"))
        .expect("leaf group");
    assert_eq!(leaf.attribute("class"), Some("node-group is-child-node"));
    assert_eq!(leaf.attribute("transform"), Some("translate(12.5, 144)"));
}

#[test]
fn text_is_escaped() {
    let svg = render(r#"Q&A <intro> "quoted""#, &SvgOptions::default());
    assert!(svg.contains("Q&amp;A"));
    let doc = roxmltree::Document::parse(&svg).expect("escaped output parses");
    let words: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name("tspan"))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(words, vec!["Q&A", "<intro>", "\"quoted\"", "Leaf"]);
}

#[test]
fn explicit_size_and_style() {
    let opts = SvgOptions {
        width: Some(800.0),
        height: Some(600.0),
        style: Some(".node-circle { fill: #fff; }".to_string()),
    };
    let svg = render("Root", &opts);
    let doc = roxmltree::Document::parse(&svg).expect("parses");
    let root = doc.root_element();
    assert_eq!(root.attribute("width"), Some("800"));
    assert_eq!(root.attribute("height"), Some("600"));
    let style = root
        .children()
        .find(|n| n.has_tag_name("style"))
        .and_then(|n| n.text());
    assert_eq!(style, Some(".node-circle { fill: #fff; }"));
}

#[test]
fn transform_string_format() {
    let vp = Viewport::new(screen_vector(-0.0, 3.25), 0.5);
    assert_eq!(viewport_transform(&vp), "translate(0, 3.25) scale(0.5)");
}

#[test]
fn fixture_module_renders_every_node_once() {
    let text = include_str!("../../../fixtures/modules/ai.json");
    let mut doc = mindweave_core::Document::from_json_str(text).expect("fixture parses");
    let style = SceneStyle::default();
    mindweave_layout::place_unpositioned(&doc.tree, &mut doc.positions, style.node_spacing);

    let mut scene = Scene::new(style);
    scene.redraw(&doc.tree, &doc.positions, style);
    let svg = scene.to_svg(&SvgOptions::default());
    let parsed = roxmltree::Document::parse(&svg).expect("parses");

    let groups: Vec<_> = parsed
        .descendants()
        .filter(|n| n.attribute("data-node-id").is_some())
        .collect();
    assert_eq!(groups.len(), doc.tree.len());
    let lines = parsed
        .descendants()
        .filter(|n| n.has_tag_name("line"))
        .count();
    assert_eq!(lines, doc.tree.len() - 1);

    let ml = groups
        .iter()
        .find(|n| n.attribute("data-node-id") == Some("ml"))
        .and_then(|n| n.attribute("class"));
    assert_eq!(ml, Some("node-group has-submodule is-child-node"));
}
