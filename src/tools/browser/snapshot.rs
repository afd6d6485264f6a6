//! Visible-page snapshot serializer
//!
//! Walks the UI tree depth-first and renders the visible structure as compact
//! tagged text: landmarks, headings, interactive controls and anything with an
//! explicit identity keep their tags, everything else is transparent. The
//! result is whitespace-normalized and cut to a fixed size.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dom::{Document, Element, NodeId};

/// Nodes deeper than this (root is depth 0) contribute nothing.
pub const MAX_DEPTH: usize = 25;

/// Hard cap on snapshot length, in characters.
pub const MAX_SNAPSHOT_CHARS: usize = 20_000;

const INTERACTIVE_TEXT_LIMIT: usize = 100;
const HEADING_TEXT_LIMIT: usize = 100;
const LEAF_TEXT_LIMIT: usize = 60;

const LANDMARK_TAGS: [&str; 7] = ["section", "main", "header", "footer", "nav", "article", "form"];
const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const INTERACTIVE_TAGS: [&str; 5] = ["a", "button", "input", "textarea", "select"];
const GENERIC_TAGS: [&str; 7] = ["div", "span", "p", "li", "ul", "ol", "label"];

/// Children of an interactive node that are skipped after its text was taken.
const PRESENTATIONAL_TAGS: [&str; 4] = ["svg", "path", "i", "span"];

/// Attributes that give a generic container its own tag.
const IDENTITY_ATTRIBUTES: [&str; 4] = ["id", "name", "placeholder", "aria-label"];

/// Attributes rendered on an emitted tag, in this order.
const EMITTED_ATTRIBUTES: [&str; 6] = ["id", "name", "placeholder", "aria-label", "type", "href"];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static AFTER_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+").expect("valid regex"));
static BEFORE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+<").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Landmark,
    Heading,
    Interactive,
    Generic,
    Other,
}

impl NodeKind {
    fn of(el: &Element) -> Self {
        let tag = el.tag.as_str();
        if LANDMARK_TAGS.contains(&tag) {
            NodeKind::Landmark
        } else if HEADING_TAGS.contains(&tag) {
            NodeKind::Heading
        } else if INTERACTIVE_TAGS.contains(&tag) {
            NodeKind::Interactive
        } else if GENERIC_TAGS.contains(&tag) {
            NodeKind::Generic
        } else {
            NodeKind::Other
        }
    }

    fn is_tagged(self, el: &Element) -> bool {
        match self {
            NodeKind::Landmark | NodeKind::Heading | NodeKind::Interactive => true,
            NodeKind::Generic => IDENTITY_ATTRIBUTES.iter().any(|a| el.attr(a).is_some()),
            NodeKind::Other => false,
        }
    }
}

/// Bounded textual rendering of the visible UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    /// Serialize the subtree under `root`.
    pub fn capture(doc: &Document, root: NodeId) -> Self {
        let balanced = render_balanced(doc, root);
        let text = truncate_chars(&balanced, MAX_SNAPSHOT_CHARS);
        debug!(
            chars = text.chars().count(),
            truncated = text.len() < balanced.len(),
            "captured page snapshot"
        );
        Snapshot(text.to_string())
    }

    /// Serialize from the document's body.
    pub fn of_page(doc: &Document) -> Self {
        Self::capture(doc, doc.body())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The normalized serialization before the length cut; always tag-balanced.
pub fn render_balanced(doc: &Document, root: NodeId) -> String {
    let mut raw = String::new();
    extract(doc, root, 0, &mut raw);
    normalize(&raw)
}

fn extract(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    if depth > MAX_DEPTH {
        return;
    }
    let Some(el) = doc.get(id) else { return };
    if !el.is_visible() {
        return;
    }

    let kind = NodeKind::of(el);
    let tagged = kind.is_tagged(el);
    if tagged {
        open_tag(el, out);
    }

    let has_children = el.has_children();
    let text = if kind == NodeKind::Interactive || !has_children {
        doc.text_content(id)
    } else {
        String::new()
    };
    let text = text.trim();

    if kind == NodeKind::Interactive && !text.is_empty() {
        let collapsed = WHITESPACE.replace_all(text, " ");
        out.push_str(truncate_chars(&collapsed, INTERACTIVE_TEXT_LIMIT));
        for child in el.children() {
            let skip = doc
                .get(child)
                .is_none_or(|c| PRESENTATIONAL_TAGS.contains(&c.tag.as_str()));
            if !skip {
                extract(doc, child, depth + 1, out);
            }
        }
    } else if !has_children && !text.is_empty() {
        let limit = if kind == NodeKind::Heading {
            HEADING_TEXT_LIMIT
        } else {
            LEAF_TEXT_LIMIT
        };
        out.push_str(truncate_chars(text, limit));
    } else {
        for child in el.children() {
            extract(doc, child, depth + 1, out);
        }
    }

    if tagged {
        out.push_str("</");
        out.push_str(&el.tag);
        out.push('>');
    }
}

fn open_tag(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for name in EMITTED_ATTRIBUTES {
        if let Some(value) = el.attr(name) {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
    }
    out.push('>');
}

fn normalize(raw: &str) -> String {
    let collapsed = WHITESPACE.replace_all(raw, " ");
    let after = AFTER_TAG.replace_all(&collapsed, ">");
    let before = BEFORE_TAG.replace_all(&after, "<");
    before.trim().to_string()
}

/// Prefix of `s` holding at most `max` characters.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeSpec;

    fn page(body: NodeSpec) -> Document {
        Document::from_spec(&NodeSpec::new("html").child(body))
    }

    fn snapshot(body: NodeSpec) -> String {
        Snapshot::of_page(&page(body)).into_string()
    }

    /// Checks that every opened tag is closed in order.
    fn is_balanced(s: &str) -> bool {
        let mut stack: Vec<String> = Vec::new();
        let mut rest = s;
        while let Some(start) = rest.find('<') {
            let Some(len) = rest[start..].find('>') else {
                return false;
            };
            let tag = &rest[start + 1..start + len];
            if let Some(name) = tag.strip_prefix('/') {
                if stack.pop().as_deref() != Some(name) {
                    return false;
                }
            } else {
                let name = tag.split(' ').next().unwrap_or_default();
                stack.push(name.to_string());
            }
            rest = &rest[start + len + 1..];
        }
        stack.is_empty()
    }

    #[test]
    fn test_structure_and_transparency() {
        let out = snapshot(
            NodeSpec::new("body")
                .child(
                    NodeSpec::new("header").child(
                        NodeSpec::new("nav")
                            .child(NodeSpec::new("a").attr("href", "/projects").text("Projects")),
                    ),
                )
                .child(
                    NodeSpec::new("main")
                        .child(NodeSpec::new("h1").text("Title"))
                        .child(NodeSpec::new("div").child(NodeSpec::new("p").text("Para text"))),
                ),
        );
        assert_eq!(
            out,
            r#"<header><nav><a href="/projects">Projects</a></nav></header><main><h1>Title</h1>Para text</main>"#
        );
    }

    #[test]
    fn test_identity_attributes_include_generic_nodes() {
        let plain = snapshot(NodeSpec::new("body").child(NodeSpec::new("div").text("About")));
        assert_eq!(plain, "About");

        let with_id =
            snapshot(NodeSpec::new("body").child(NodeSpec::new("div").id("about").text("About")));
        assert_eq!(with_id, r#"<div id="about">About</div>"#);

        let labelled = snapshot(
            NodeSpec::new("body").child(NodeSpec::new("span").attr("aria-label", "Status")),
        );
        assert_eq!(labelled, r#"<span aria-label="Status"></span>"#);

        // `type` and `href` alone are not identity.
        let typed = snapshot(NodeSpec::new("body").child(NodeSpec::new("div").attr("type", "x")));
        assert_eq!(typed, "");
    }

    #[test]
    fn test_attribute_order_and_quoting() {
        let out = snapshot(
            NodeSpec::new("body").child(
                NodeSpec::new("input")
                    .attr("type", "email")
                    .attr("placeholder", "Say \"hi\"")
                    .attr("name", "email")
                    .attr("id", "email")
                    .attr("class", "field"),
            ),
        );
        assert_eq!(
            out,
            r#"<input id="email" name="email" placeholder="Say &quot;hi&quot;" type="email"></input>"#
        );
    }

    #[test]
    fn test_hidden_subtrees_are_pruned() {
        let hidden_variants = [
            NodeSpec::new("div").hidden(),
            NodeSpec::new("div").invisible(),
            NodeSpec::new("div").transparent(),
            NodeSpec::new("div").size(0.0, 50.0),
            NodeSpec::new("div").size(50.0, 0.0),
        ];
        for container in hidden_variants {
            let out = snapshot(
                NodeSpec::new("body")
                    .child(
                        container
                            .id("panel")
                            .child(NodeSpec::new("button").id("buy").text("Buy now")),
                    )
                    .child(NodeSpec::new("h2").text("Visible")),
            );
            assert_eq!(out, "<h2>Visible</h2>");
        }
    }

    #[test]
    fn test_interactive_text_skips_icons_but_keeps_nested_controls() {
        let out = snapshot(
            NodeSpec::new("body")
                .child(
                    NodeSpec::new("a")
                        .attr("href", "/")
                        .child(NodeSpec::new("i").class("icon-home"))
                        .child(NodeSpec::new("svg").child(NodeSpec::new("path")))
                        .child(NodeSpec::new("span").id("label").text("Home")),
                )
                .child(
                    NodeSpec::new("label")
                        .id("terms")
                        .text("Accept")
                        .child(NodeSpec::new("input").attr("type", "checkbox")),
                ),
        );
        assert_eq!(
            out,
            r#"<a href="/">Home</a><label id="terms"><input type="checkbox"></input></label>"#
        );

        let nested = snapshot(
            NodeSpec::new("body").child(
                NodeSpec::new("button")
                    .text("Menu ")
                    .child(NodeSpec::new("div").id("dropdown").text("Open")),
            ),
        );
        assert_eq!(nested, r#"<button>Menu Open<div id="dropdown">Open</div></button>"#);
    }

    #[test]
    fn test_text_limits() {
        let long = "x".repeat(150);
        let out = snapshot(
            NodeSpec::new("body")
                .child(NodeSpec::new("p").text(long.clone()))
                .child(NodeSpec::new("h3").text(long.clone()))
                .child(NodeSpec::new("button").text(long)),
        );
        let expected = format!(
            "{}<h3>{}</h3><button>{}</button>",
            "x".repeat(60),
            "x".repeat(100),
            "x".repeat(100)
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_whitespace_normalization() {
        let out = snapshot(
            NodeSpec::new("body")
                .child(NodeSpec::new("h1").text("  Hello \n\t  world  "))
                .child(NodeSpec::new("button").text("\n  Save\n   draft  ")),
        );
        assert_eq!(out, "<h1>Hello world</h1><button>Save draft</button>");
        assert!(!out.contains("  "));
        assert!(!out.contains("> ") && !out.contains(" <"));
    }

    #[test]
    fn test_depth_cutoff() {
        let mut node = NodeSpec::new("section").text("deepest");
        for _ in 0..39 {
            node = NodeSpec::new("section").child(node);
        }
        let doc = page(NodeSpec::new("body").child(node));

        let out = Snapshot::of_page(&doc).into_string();
        // body is depth 0, so sections at depths 1..=25 are emitted.
        assert_eq!(out.matches("<section>").count(), MAX_DEPTH);
        assert_eq!(out.matches("</section>").count(), MAX_DEPTH);
        assert!(!out.contains("deepest"));
        assert!(is_balanced(&out));
    }

    #[test]
    fn test_depth_cutoff_under_interactive_text() {
        let mut doc = Document::new("html");
        let body = doc.append_element(doc.root(), Element::new("body")).unwrap();
        let button = doc.append_element(body, Element::new("button")).unwrap();
        let mut parent = button;
        for _ in 0..150_000 {
            parent = doc.append_element(parent, Element::new("b")).unwrap();
        }
        doc.append_text(parent, "deep label").unwrap();

        let out = Snapshot::of_page(&doc).into_string();
        assert_eq!(out, "<button>deep label</button>");
    }

    #[test]
    fn test_size_bound_and_pre_truncation_balance() {
        let mut body = NodeSpec::new("body");
        for i in 0..2_000 {
            body = body.child(
                NodeSpec::new("button")
                    .id(format!("btn-{}", i))
                    .text(format!("Action number {}", i)),
            );
        }
        let doc = page(body);

        let full = render_balanced(&doc, doc.body());
        assert!(full.chars().count() > MAX_SNAPSHOT_CHARS);
        assert!(is_balanced(&full));

        let snap = Snapshot::of_page(&doc);
        assert_eq!(snap.len(), MAX_SNAPSHOT_CHARS);
        assert!(full.starts_with(snap.as_str()));
    }

    #[test]
    fn test_truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_serialization_is_repeatable() {
        let doc = crate::dom::demo_portfolio();
        let first = Snapshot::of_page(&doc);
        let second = Snapshot::of_page(&doc);
        assert_eq!(first, second);
        assert!(is_balanced(first.as_str()));
        assert!(!first.as_str().contains("Internal notes"));
        assert!(first.as_str().contains(r#"<form id="contact-form">"#));
    }
}
