//! SVG preview of a laid-out scene
//!
//! Frames are drawn as rectangles in absolute coordinates, nested containers
//! as groups, and the root container's guidelines and barriers as dashed
//! lines on top of everything.

use crate::geometry::{OffsetF, RectF};
use crate::layout::{Axis, ReferenceLine, VisibleType, CONTAINER_ID};
use crate::scene::{Scene, SceneNode};

use super::SvgConfig;

/// Attribute list of one element, in output order
type Attrs = Vec<(&'static str, String)>;

/// Markup writer tracking nesting depth for indentation
struct Markup<'a> {
    config: &'a SvgConfig,
    depth: usize,
    out: String,
}

impl<'a> Markup<'a> {
    fn new(config: &'a SvgConfig) -> Self {
        Self {
            config,
            depth: 0,
            out: String::new(),
        }
    }

    fn line(&mut self, text: &str) {
        if self.config.pretty_print {
            self.out.push_str(&"  ".repeat(self.depth));
        }
        self.out.push_str(text);
        if self.config.pretty_print {
            self.out.push('\n');
        }
    }

    fn open(&mut self, tag: &str, attrs: Attrs) {
        self.line(&format!("<{}{}>", tag, attributes(&attrs)));
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{}>", tag));
    }

    fn empty(&mut self, tag: &str, attrs: Attrs) {
        self.line(&format!("<{}{}/>", tag, attributes(&attrs)));
    }

    fn text(&mut self, tag: &str, attrs: Attrs, content: &str) {
        self.line(&format!(
            "<{}{}>{}</{}>",
            tag,
            attributes(&attrs),
            escape_xml(content),
            tag
        ));
    }

    /// Space-separated class names with the configured prefix
    fn classes(&self, names: &[&str]) -> String {
        names
            .iter()
            .map(|name| self.config.class(name))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn finish(mut self) -> String {
        self.close("svg");
        // the closing tag ends the document
        if self.config.pretty_print && self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }
}

fn attributes(attrs: &Attrs) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!(r#" {}="{}""#, name, escape_xml(value)))
        .collect()
}

fn rect_attrs(id: Option<&str>, class: String, rect: RectF) -> Attrs {
    let mut attrs = Vec::with_capacity(6);
    if let Some(id) = id {
        attrs.push(("id", id.to_string()));
    }
    attrs.extend([
        ("class", class),
        ("x", rect.x.to_string()),
        ("y", rect.y.to_string()),
        ("width", rect.width.to_string()),
        ("height", rect.height.to_string()),
    ]);
    attrs
}

/// Style rules for every class the preview emits
fn default_styles(config: &SvgConfig) -> String {
    [
        ("container", "fill: none; stroke: #5b6b7f;"),
        ("node", "fill: #dce8f5; stroke: #2f5d8a;"),
        ("invisible", "fill-opacity: 0.3; stroke-dasharray: 2 2;"),
        ("line", "stroke-width: 0.5; stroke-dasharray: 4 2;"),
        ("guideline", "stroke: #2a9d5c;"),
        ("barrier", "stroke: #c2452d;"),
        ("label", "font: 10px sans-serif; fill: #1b2733;"),
    ]
    .iter()
    .map(|(class, rule)| format!(".{} {{ {} }}", config.class(class), rule))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Render the scene's last layout as SVG
pub fn render_svg(scene: &Scene, config: &SvgConfig) -> String {
    let root = scene.root();
    let bounds = root.frame();
    let pad = config.viewbox_padding;
    let mut markup = Markup::new(config);

    if config.standalone {
        markup.line(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    }
    markup.open(
        "svg",
        vec![
            ("xmlns", "http://www.w3.org/2000/svg".to_string()),
            (
                "viewBox",
                format!(
                    "{} {} {} {}",
                    bounds.x - pad,
                    bounds.y - pad,
                    bounds.width + 2.0 * pad,
                    bounds.height + 2.0 * pad
                ),
            ),
        ],
    );
    markup.text("style", Vec::new(), &default_styles(config));

    let root_id = root
        .property()
        .inspector_id
        .clone()
        .unwrap_or_else(|| CONTAINER_ID.to_string());
    let class = markup.classes(&["container"]);
    markup.empty("rect", rect_attrs(Some(&root_id), class, bounds));
    render_children(root, bounds.offset(), None, &mut markup);

    if config.show_lines {
        for line in scene.reference_lines() {
            render_line(&line, bounds, &mut markup);
        }
    }

    markup.finish()
}

fn render_children(parent: &SceneNode, origin: OffsetF, prefix: Option<&str>, markup: &mut Markup) {
    for child in parent.children() {
        let property = child.property();
        if property.visibility == VisibleType::Gone {
            continue;
        }
        let id = child.id();
        let path = match prefix {
            Some(prefix) => format!("{}/{}", prefix, id),
            None => id.clone(),
        };
        let geometry = child.geometry();
        let rect = RectF::from_offset_size(origin + geometry.frame_offset, geometry.frame_size);
        let mut names = vec![if child.is_container() { "container" } else { "node" }];
        if property.visibility == VisibleType::Invisible {
            names.push("invisible");
        }
        let class = markup.classes(&names);

        if child.is_container() {
            let group = markup.classes(&["group"]);
            markup.open("g", vec![("id", path.clone()), ("class", group)]);
            markup.empty("rect", rect_attrs(None, class, rect));
            render_label(&id, rect, markup);
            render_children(child, rect.offset(), Some(&path), markup);
            markup.close("g");
        } else {
            markup.empty("rect", rect_attrs(Some(&path), class, rect));
            render_label(&id, rect, markup);
        }
    }
}

fn render_label(text: &str, rect: RectF, markup: &mut Markup) {
    if !markup.config.show_labels {
        return;
    }
    let attrs = vec![
        ("class", markup.classes(&["label"])),
        ("x", (rect.x + 2.0).to_string()),
        ("y", (rect.y + 2.0).to_string()),
        ("dominant-baseline", "hanging".to_string()),
    ];
    markup.text("text", attrs, text);
}

/// A guideline or barrier spans the root frame across its axis
fn render_line(line: &ReferenceLine, bounds: RectF, markup: &mut Markup) {
    let (from, to) = match line.axis {
        Axis::Horizontal => (
            OffsetF::new(line.position, bounds.y),
            OffsetF::new(line.position, bounds.bottom()),
        ),
        Axis::Vertical => (
            OffsetF::new(bounds.x, line.position),
            OffsetF::new(bounds.right(), line.position),
        ),
    };
    let kind = if line.is_barrier { "barrier" } else { "guideline" };
    let attrs = vec![
        ("id", line.id.clone()),
        ("class", markup.classes(&["line", kind])),
        ("x1", from.x.to_string()),
        ("y1", from.y.to_string()),
        ("x2", to.x.to_string()),
        ("y2", to.y.to_string()),
    ];
    markup.empty("line", attrs);
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
