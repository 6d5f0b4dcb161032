//! End-to-end layout scenarios driven through TOML scenes
//!
//! Each scenario loads a scene, runs measure and layout, and checks the
//! absolute frames the container produced.

use pretty_assertions::assert_eq;

use relative_layout::layout::TextDirection;
use relative_layout::{RectF, Scene};

const EPSILON: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn assert_rect(actual: Option<RectF>, expected: (f64, f64, f64, f64)) {
    let actual = actual.expect("frame should exist");
    let (x, y, w, h) = expected;
    assert!(
        approx_eq(actual.x, x)
            && approx_eq(actual.y, y)
            && approx_eq(actual.width, w)
            && approx_eq(actual.height, h),
        "expected ({}, {}, {}, {}), got {:?}",
        x,
        y,
        w,
        h,
        actual
    );
}

fn run(source: &str) -> Scene {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scene = Scene::from_toml(source).expect("scene should load");
    scene.run();
    scene
}

const CHAIN: &str = r#"
[container]
width = 300
height = 300

[[children]]
id = "a"
width = 80
height = 50
horizontal_chain = "STYLE"
align_rules.left = { anchor = "__container__", align = "start" }
align_rules.right = { anchor = "b", align = "start" }

[[children]]
id = "b"
width = 80
height = 50
align_rules.left = { anchor = "a", align = "end" }
align_rules.right = { anchor = "c", align = "start" }

[[children]]
id = "c"
width = 80
height = 50
align_rules.left = { anchor = "b", align = "end" }
align_rules.right = { anchor = "__container__", align = "end" }
"#;

fn chain_xs(scene: &Scene) -> Vec<f64> {
    ["a", "b", "c"]
        .iter()
        .map(|id| scene.frame(id).map(|f| f.x).unwrap_or(f64::NAN))
        .collect()
}

fn assert_positions(actual: Vec<f64>, expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    assert!(
        actual.iter().zip(expected).all(|(a, e)| approx_eq(*a, *e)),
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

#[test]
fn test_guideline_start() {
    let scene = run(r#"
        [container]
        width = 300
        height = 300

        [[container.guidelines]]
        id = "gl"
        direction = "vertical"
        start = "50vp"

        [[children]]
        id = "box"
        width = 100
        height = 40
        align_rules.left = { anchor = "gl", align = "start" }
        "#);
    assert_rect(scene.frame("box"), (50.0, 0.0, 100.0, 40.0));
}

#[test]
fn test_guideline_end_measures_from_trailing_edge() {
    let scene = run(r#"
        [container]
        width = 300
        height = 300

        [[container.guidelines]]
        id = "gl"
        direction = "horizontal"
        end = 100

        [[children]]
        id = "footer"
        width = 300
        height = 20
        align_rules.top = { anchor = "gl", align = "top" }
        "#);
    assert_rect(scene.frame("footer"), (0.0, 200.0, 300.0, 20.0));
}

#[test]
fn test_barriers_follow_extreme_edges() {
    let scene = run(r#"
        [container]
        width = 300
        height = 300

        [[container.barriers]]
        id = "leading"
        direction = "left"
        referenced_ids = ["a", "b"]

        [[container.barriers]]
        id = "trailing"
        direction = "right"
        referenced_ids = ["a", "b"]

        [[children]]
        id = "a"
        width = 100
        height = 20
        align_rules.left = { anchor = "__container__", align = "start" }

        [[children]]
        id = "b"
        width = 60
        height = 20
        align_rules.left = { anchor = "__container__", align = "start" }
        align_rules.top = { anchor = "a", align = "bottom" }

        [[children]]
        id = "after"
        width = 50
        height = 20
        align_rules.left = { anchor = "trailing", align = "start" }
        "#);

    let lines: Vec<(String, f64)> = scene
        .reference_lines()
        .into_iter()
        .map(|line| (line.id, line.position))
        .collect();
    assert_eq!(
        lines,
        vec![("leading".to_string(), 0.0), ("trailing".to_string(), 100.0)]
    );
    assert_rect(scene.frame("b"), (0.0, 20.0, 60.0, 20.0));
    assert_rect(scene.frame("after"), (100.0, 0.0, 50.0, 20.0));
}

#[test]
fn test_chain_spread() {
    let scene = run(&CHAIN.replace("STYLE", "spread"));
    assert_eq!(chain_xs(&scene), vec![15.0, 110.0, 205.0]);
    let report = scene.report().expect("report");
    assert_eq!(report.chains.len(), 1);
    assert_eq!(report.chains[0].ids, vec!["a", "b", "c"]);
}

#[test]
fn test_chain_spread_inside() {
    let scene = run(&CHAIN.replace("STYLE", "spread_inside"));
    assert_eq!(chain_xs(&scene), vec![0.0, 110.0, 220.0]);
}

#[test]
fn test_chain_packed_with_zero_bias() {
    let source = CHAIN
        .replace("STYLE", "packed")
        .replacen("horizontal_chain", "bias = { horizontal = 0.0 }\nhorizontal_chain", 1);
    let scene = run(&source);
    assert_eq!(chain_xs(&scene), vec![0.0, 80.0, 160.0]);
}

#[test]
fn test_chain_packed_defaults_to_center() {
    let scene = run(&CHAIN.replace("STYLE", "packed"));
    assert_eq!(chain_xs(&scene), vec![30.0, 110.0, 190.0]);
}

#[test]
fn test_chain_packed_keeps_negative_bias() {
    let source = CHAIN
        .replace("STYLE", "packed")
        .replacen("horizontal_chain", "bias = { horizontal = -1.0 }\nhorizontal_chain", 1);
    let scene = run(&source);
    // chain bias is used as declared, so the chain starts 60 before its head
    assert_eq!(chain_xs(&scene), vec![-60.0, 20.0, 100.0]);
}

#[test]
fn test_chain_overflow_is_centered() {
    for style in ["spread", "spread_inside"] {
        let source = CHAIN.replace("STYLE", style).replace("width = 80", "width = 120");
        let scene = run(&source);
        assert_eq!(chain_xs(&scene), vec![-30.0, 90.0, 210.0], "style {}", style);
    }
}

#[test]
fn test_chain_overflow_packed_follows_bias() {
    let source = CHAIN
        .replace("STYLE", "packed")
        .replace("width = 80", "width = 120")
        .replacen("horizontal_chain", "bias = { horizontal = 1.0 }\nhorizontal_chain", 1);
    let scene = run(&source);
    assert_eq!(chain_xs(&scene), vec![-60.0, 60.0, 180.0]);
}

#[test]
fn test_vertical_chain_spread() {
    let scene = run(r#"
        [container]
        width = 300
        height = 300

        [[children]]
        id = "a"
        width = 50
        height = 50
        vertical_chain = "spread"
        align_rules.top = { anchor = "__container__", align = "top" }
        align_rules.bottom = { anchor = "b", align = "top" }

        [[children]]
        id = "b"
        width = 50
        height = 50
        align_rules.top = { anchor = "a", align = "bottom" }
        align_rules.bottom = { anchor = "c", align = "top" }

        [[children]]
        id = "c"
        width = 50
        height = 50
        align_rules.top = { anchor = "b", align = "bottom" }
        align_rules.bottom = { anchor = "__container__", align = "bottom" }
        "#);
    let ys = ["a", "b", "c"]
        .iter()
        .map(|id| scene.frame(id).map(|f| f.y).unwrap_or(f64::NAN))
        .collect();
    assert_positions(ys, &[37.5, 125.0, 212.5]);
    assert_eq!(chain_xs(&scene), vec![0.0, 0.0, 0.0]);

    let report = scene.report().expect("report");
    assert_eq!(report.chains.len(), 1);
    assert_eq!(report.chains[0].ids, vec!["a", "b", "c"]);
}

#[test]
fn test_chain_from_barrier_to_container() {
    let scene = run(r#"
        [container]
        width = 300
        height = 100

        [[container.barriers]]
        id = "edge"
        direction = "right"
        referenced_ids = ["lead"]

        [[children]]
        id = "lead"
        width = 60
        height = 20
        align_rules.left = { anchor = "__container__", align = "start" }

        [[children]]
        id = "a"
        width = 40
        height = 20
        horizontal_chain = "spread"
        align_rules.left = { anchor = "edge", align = "start" }
        align_rules.right = { anchor = "b", align = "start" }

        [[children]]
        id = "b"
        width = 40
        height = 20
        align_rules.left = { anchor = "a", align = "end" }
        align_rules.right = { anchor = "__container__", align = "end" }
        "#);
    let xs = ["a", "b"]
        .iter()
        .map(|id| scene.frame(id).map(|f| f.x).unwrap_or(f64::NAN))
        .collect();
    assert_positions(xs, &[60.0 + 160.0 / 3.0, 60.0 + 320.0 / 3.0 + 40.0]);
}

#[test]
fn test_chain_from_guideline_to_container() {
    let scene = run(r#"
        [container]
        width = 300
        height = 100

        [[container.guidelines]]
        id = "gl"
        direction = "vertical"
        start = 100

        [[children]]
        id = "a"
        width = 50
        height = 20
        horizontal_chain = "spread_inside"
        align_rules.left = { anchor = "gl", align = "start" }
        align_rules.right = { anchor = "b", align = "start" }

        [[children]]
        id = "b"
        width = 50
        height = 20
        align_rules.left = { anchor = "a", align = "end" }
        align_rules.right = { anchor = "__container__", align = "end" }
        "#);
    assert_rect(scene.frame("a"), (100.0, 0.0, 50.0, 20.0));
    assert_rect(scene.frame("b"), (250.0, 0.0, 50.0, 20.0));
}

#[test]
fn test_gone_member_is_skipped_by_chain() {
    let source = CHAIN
        .replace("STYLE", "spread_inside")
        .replacen("id = \"b\"", "id = \"b\"\nvisibility = \"gone\"", 1);
    let scene = run(&source);
    assert_rect(scene.frame("a"), (0.0, 0.0, 80.0, 50.0));
    assert_rect(scene.frame("b"), (0.0, 0.0, 0.0, 0.0));
    assert_rect(scene.frame("c"), (220.0, 0.0, 80.0, 50.0));
}

#[test]
fn test_chain_weights_share_the_span() {
    let scene = run(r#"
        [container]
        width = 300
        height = 100

        [[children]]
        id = "a"
        height = 20
        horizontal_chain = "spread"
        chain_weight = { horizontal = 1.0 }
        align_rules.left = { anchor = "__container__", align = "start" }
        align_rules.right = { anchor = "b", align = "start" }

        [[children]]
        id = "b"
        height = 20
        chain_weight = { horizontal = 2.0 }
        align_rules.left = { anchor = "a", align = "end" }
        align_rules.right = { anchor = "__container__", align = "end" }
        "#);
    assert_rect(scene.frame("a"), (0.0, 0.0, 100.0, 20.0));
    assert_rect(scene.frame("b"), (100.0, 0.0, 200.0, 20.0));
}

const MIXED_WEIGHTS: &str = r#"
[container]
width = 300
height = 100

[[children]]
id = "a"
height = 20
horizontal_chain = "spread"
chain_weight = { horizontal = 1.0 }
align_rules.left = { anchor = "__container__", align = "start" }
align_rules.right = { anchor = "b", align = "start" }

[[children]]
id = "b"
width = 100
height = 20
align_rules.left = { anchor = "a", align = "end" }
align_rules.right = { anchor = "c", align = "start" }

[[children]]
id = "c"
height = 20
chain_weight = { horizontal = 1.0 }
align_rules.left = { anchor = "b", align = "end" }
align_rules.right = { anchor = "__container__", align = "end" }

[[children]]
id = "d"
width = 30
height = 10
align_rules.left = { anchor = "b", align = "end" }
align_rules.top = { anchor = "b", align = "bottom" }
"#;

#[test]
fn test_weighted_members_share_what_fixed_members_leave() {
    let mut scene = Scene::from_toml(MIXED_WEIGHTS).expect("scene should load");
    scene.run();
    assert_rect(scene.frame("a"), (0.0, 0.0, 100.0, 20.0));
    assert_rect(scene.frame("b"), (100.0, 0.0, 100.0, 20.0));
    assert_rect(scene.frame("c"), (200.0, 0.0, 100.0, 20.0));
    assert_rect(scene.frame("d"), (200.0, 20.0, 30.0, 10.0));

    let frames = scene.frames();
    scene.run();
    assert_eq!(scene.frames(), frames);
}

#[test]
fn test_two_rules_derive_size() {
    let scene = run(r#"
        [container]
        width = 300
        height = 200
        padding = 10

        [[children]]
        id = "fill"
        align_rules.left = { anchor = "__container__", align = "start" }
        align_rules.right = { anchor = "__container__", align = "end" }
        align_rules.top = { anchor = "__container__", align = "top" }
        align_rules.center = { anchor = "__container__", align = "center" }
        "#);
    assert_rect(scene.frame("fill"), (10.0, 10.0, 280.0, 180.0));
}

#[test]
fn test_bias_on_fixed_size_item() {
    let expected = [(-1.0, 75.0), (0.0, 0.0), (0.3, 45.0), (0.5, 75.0), (1.0, 150.0), (1.5, 225.0)];
    for (bias, x) in expected {
        let scene = run(&format!(
            r#"
            [container]
            width = 300
            height = 300

            [[children]]
            id = "item"
            width = 150
            height = 50
            bias = {{ horizontal = {bias:?} }}
            align_rules.left = {{ anchor = "__container__", align = "start" }}
            align_rules.right = {{ anchor = "__container__", align = "end" }}
            "#
        ));
        let frame = scene.frame("item").expect("frame");
        assert!(approx_eq(frame.x, x), "bias {} gave x = {}", bias, frame.x);
    }
}

#[test]
fn test_rtl_mirrors_offsets() {
    let source = r#"
        [container]
        width = 300
        height = 100

        [[container.guidelines]]
        id = "gl"
        direction = "vertical"
        start = 20

        [[children]]
        id = "box"
        width = 100
        height = 40
        align_rules.left = { anchor = "gl", align = "start" }

        [[children]]
        id = "plain"
        content = [40, 10]
        "#;
    let ltr = run(source);
    assert_rect(ltr.frame("box"), (20.0, 0.0, 100.0, 40.0));
    assert_rect(ltr.frame("plain"), (0.0, 0.0, 40.0, 10.0));

    let mut rtl = Scene::from_toml(source)
        .expect("scene should load")
        .with_direction(TextDirection::Rtl);
    rtl.run();
    assert_rect(rtl.frame("box"), (300.0 - 100.0 - 20.0, 0.0, 100.0, 40.0));
    assert_rect(rtl.frame("plain"), (260.0, 0.0, 40.0, 10.0));
}

#[test]
fn test_margins_shift_frame_inside_margin_box() {
    let scene = run(r#"
        [container]
        width = 300
        height = 300

        [[children]]
        id = "a"
        width = 100
        height = 20
        margin = { left = 10 }
        align_rules.left = { anchor = "__container__", align = "start" }

        [[children]]
        id = "b"
        width = 50
        height = 20
        align_rules.left = { anchor = "a", align = "end" }
        "#);
    assert_rect(scene.frame("a"), (10.0, 0.0, 100.0, 20.0));
    assert_rect(scene.frame("b"), (110.0, 0.0, 50.0, 20.0));
}

#[test]
fn test_auto_container_wraps_children() {
    let scene = run(r#"
        [container]
        width = "auto"
        height = "auto"
        padding = 10

        [[children]]
        id = "a"
        width = 100
        height = 40

        [[children]]
        id = "b"
        width = 50
        height = 30
        align_rules.left = { anchor = "a", align = "end" }
        align_rules.top = { anchor = "a", align = "bottom" }
        "#);
    assert_rect(scene.frame("__container__"), (0.0, 0.0, 170.0, 90.0));
    assert_rect(scene.frame("a"), (10.0, 10.0, 100.0, 40.0));
    assert_rect(scene.frame("b"), (110.0, 50.0, 50.0, 30.0));
}

#[test]
fn test_auto_container_anchored_to_itself_keeps_offered_size() {
    let scene = run(r#"
        [viewport]
        width = 320
        height = 480

        [container]
        width = "auto"
        height = "auto"

        [[children]]
        id = "a"
        width = 100
        height = 40
        align_rules.right = { anchor = "__container__", align = "end" }
        "#);
    let root = scene.frame("__container__").expect("root");
    assert_eq!(root.width, 320.0);
    assert_eq!(root.height, 40.0);
    assert_rect(scene.frame("a"), (220.0, 0.0, 100.0, 40.0));
}

#[test]
fn test_percent_size_and_scale() {
    let scene = run(r#"
        [config]
        vp_scale = 2.0

        [container]
        width = "200px"
        height = "100px"

        [[children]]
        id = "half"
        width = "50%"
        height = 10
        "#);
    assert_rect(scene.frame("half"), (0.0, 0.0, 100.0, 20.0));
}

#[test]
fn test_dependency_loop_degrades_every_child() {
    let scene = run(r#"
        [container]
        width = 300
        height = 300

        [[children]]
        id = "x"
        width = 100
        height = 50
        align_rules.left = { anchor = "y", align = "end" }

        [[children]]
        id = "y"
        width = 100
        height = 50
        align_rules.left = { anchor = "x", align = "end" }

        [[children]]
        id = "bystander"
        width = 10
        height = 10
        "#);
    let report = scene.report().expect("report");
    assert!(report.degraded);
    assert_eq!(report.loop_nodes, vec!["x", "y"]);
    for id in ["x", "y", "bystander"] {
        let frame = scene.frame(id).expect("frame");
        assert_eq!((frame.width, frame.height), (0.0, 0.0), "{} not collapsed", id);
    }
    assert_rect(scene.frame("__container__"), (0.0, 0.0, 300.0, 300.0));
    assert!(report.clone().into_result().is_err());
}

#[test]
fn test_measure_is_idempotent_and_cached() {
    let mut scene = Scene::from_toml(&CHAIN.replace("STYLE", "spread")).expect("scene should load");
    let first = scene.run();
    let frames = scene.frames();
    let second = scene.run();

    assert_eq!(scene.frames(), frames);
    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.order, second.order);
}

#[test]
fn test_cache_can_be_disabled() {
    let source = format!(
        "[config]\nuse_topological_cache = false\n{}",
        CHAIN.replace("STYLE", "spread")
    );
    let mut scene = Scene::from_toml(&source).expect("scene should load");
    scene.run();
    let second = scene.run();
    assert!(!second.cache_hit);
    assert_eq!(chain_xs(&scene), vec![15.0, 110.0, 205.0]);
}

#[test]
fn test_nested_container_frames_are_absolute() {
    let scene = run(r#"
        [container]
        width = 300
        height = 300

        [[children]]
        id = "card"
        width = 100
        height = 100
        padding = 5
        align_rules.right = { anchor = "__container__", align = "end" }
        align_rules.bottom = { anchor = "__container__", align = "bottom" }

        [[children.children]]
        id = "icon"
        width = 10
        height = 10
        align_rules.right = { anchor = "__container__", align = "end" }
        "#);
    assert_rect(scene.frame("card"), (200.0, 200.0, 100.0, 100.0));
    assert_rect(scene.frame("card/icon"), (285.0, 205.0, 10.0, 10.0));
}

#[test]
fn test_duplicate_ids_fall_back_to_origin() {
    let scene = run(r#"
        [container]
        width = 300
        height = 300
        padding = 4

        [[children]]
        id = "a"
        width = 10
        height = 10
        align_rules.right = { anchor = "__container__", align = "end" }

        [[children]]
        id = "a"
        width = 20
        height = 20
        align_rules.right = { anchor = "__container__", align = "end" }
        "#);
    let report = scene.report().expect("report");
    assert_eq!(report.order, vec!["a"]);
    let root = scene.root();
    let second = root.children()[1].geometry();
    assert_eq!((second.frame_offset.x, second.frame_offset.y), (4.0, 4.0));
}
