//! Paint server node graph.
//!
//! The resolver only sees a document through [`PaintServerSource`]. A DOM
//! adapter can implement it directly; [`PaintDocument`] is a small arena
//! implementation built from element attribute strings.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::attributes::{GradientAttributes, GradientStop, PatternAttributes};
use crate::error::PaintError;
use crate::paint::Iri;

/// Kind of a document node, as far as paint servers are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    LinearGradient,
    RadialGradient,
    Pattern,
    Other,
}

impl NodeKind {
    /// Classify an element by its local name.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "linearGradient" => NodeKind::LinearGradient,
            "radialGradient" => NodeKind::RadialGradient,
            "pattern" => NodeKind::Pattern,
            _ => NodeKind::Other,
        }
    }

    pub fn is_gradient(self) -> bool {
        matches!(self, NodeKind::LinearGradient | NodeKind::RadialGradient)
    }

    pub fn is_paint_server(self) -> bool {
        self != NodeKind::Other
    }

    /// Whether a node of kind `template` can contribute attributes to a node
    /// of this kind. Gradients of either shape share a family.
    pub fn accepts_template(self, template: NodeKind) -> bool {
        match self {
            NodeKind::LinearGradient | NodeKind::RadialGradient => template.is_gradient(),
            NodeKind::Pattern => template == NodeKind::Pattern,
            NodeKind::Other => false,
        }
    }
}

/// Read-only view of the nodes a paint can reference.
///
/// Implementations must be safe to query from several threads at once if the
/// resolver is shared; nothing here mutates.
pub trait PaintServerSource {
    /// Cheap node identifier.
    type Handle: Copy + Eq + Hash + Debug;

    /// Look up a node by IRI. Unknown or external IRIs return `None`.
    fn lookup_by_iri(&self, iri: &Iri) -> Option<Self::Handle>;

    fn node_kind(&self, node: Self::Handle) -> NodeKind;

    /// The node's `href` template link, if it has one.
    fn template_link(&self, node: Self::Handle) -> Option<Iri>;

    /// Attributes explicitly set on a gradient node.
    fn gradient_attributes(&self, node: Self::Handle) -> GradientAttributes;

    /// Attributes explicitly set on a pattern node.
    fn pattern_attributes(&self, node: Self::Handle) -> PatternAttributes;

    /// The node's own `<stop>` children, in document order.
    fn stops(&self, node: Self::Handle) -> Vec<GradientStop>;

    /// Whether a pattern node has renderable children of its own.
    fn has_content(&self, node: Self::Handle) -> bool;
}

/// Index of a node in a [`PaintDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    href: Option<Iri>,
    gradient: GradientAttributes,
    pattern: PatternAttributes,
    stops: Vec<GradientStop>,
    content_children: usize,
}

/// Arena of paint server nodes keyed by element id.
///
/// Attribute values are parsed as nodes are added. Invalid values are logged,
/// collected in [`diagnostics`](Self::diagnostics), and treated as unset.
#[derive(Debug, Clone, Default)]
pub struct PaintDocument {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
    diagnostics: Vec<PaintError>,
}

impl PaintDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level element.
    pub fn add_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.insert(None, tag, attrs)
    }

    /// Add a child element. A `<stop>` under a gradient becomes one of its
    /// stops; any element under a pattern counts as pattern content.
    ///
    /// A `parent` that is not in this document is ignored and the element is
    /// added at the top level.
    pub fn append_child(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let Some(parent_kind) = self.node(parent).map(|n| n.kind) else {
            warn!(?parent, tag, "Unknown parent node, adding element at top level");
            return self.insert(None, tag, attrs);
        };

        if tag == "stop" && parent_kind.is_gradient() {
            let (stop, errors) = GradientStop::from_attributes(attrs);
            for err in errors {
                self.report(err);
            }
            if let Some(node) = self.nodes.get_mut(parent.0) {
                node.stops.push(stop);
            }
        } else if parent_kind == NodeKind::Pattern {
            if let Some(node) = self.nodes.get_mut(parent.0) {
                node.content_children += 1;
            }
        }

        self.insert(Some(parent), tag, attrs)
    }

    /// Find a node by its `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attribute errors found while building the document.
    pub fn diagnostics(&self) -> &[PaintError] {
        &self.diagnostics
    }

    fn insert(&mut self, parent: Option<NodeId>, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let kind = NodeKind::from_tag(tag);
        let id = NodeId(self.nodes.len());
        let mut node = Node {
            kind,
            parent,
            href: None,
            gradient: GradientAttributes::default(),
            pattern: PatternAttributes::default(),
            stops: Vec::new(),
            content_children: 0,
        };

        let mut xlink_href = None;
        for &(name, value) in attrs {
            let result = match name {
                "id" => {
                    // First element with a given id wins.
                    self.ids.entry(value.to_string()).or_insert(id);
                    Ok(())
                }
                "href" => Iri::parse(value).map(|iri| node.href = Some(iri)),
                "xlink:href" => Iri::parse(value).map(|iri| xlink_href = Some(iri)),
                _ => match kind {
                    NodeKind::LinearGradient => node.gradient.set_attribute(false, name, value),
                    NodeKind::RadialGradient => node.gradient.set_attribute(true, name, value),
                    NodeKind::Pattern => node.pattern.set_attribute(name, value),
                    NodeKind::Other => Ok(()),
                },
            };
            if let Err(err) = result {
                self.report(err);
            }
        }

        // Plain `href` takes precedence over `xlink:href`.
        if node.href.is_none() {
            node.href = xlink_href;
        }

        debug!(node = id.0, ?kind, "Added paint document node");
        self.nodes.push(node);
        id
    }

    fn report(&mut self, err: PaintError) {
        warn!(error = %err, "Ignoring invalid attribute");
        self.diagnostics.push(err);
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }
}

impl PaintServerSource for PaintDocument {
    type Handle = NodeId;

    fn lookup_by_iri(&self, iri: &Iri) -> Option<NodeId> {
        if !iri.is_local() {
            debug!(%iri, "External references are not loaded");
            return None;
        }
        self.get_element_by_id(iri.as_str())
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        self.node(node).map_or(NodeKind::Other, |n| n.kind)
    }

    fn template_link(&self, node: NodeId) -> Option<Iri> {
        self.node(node).and_then(|n| n.href.clone())
    }

    fn gradient_attributes(&self, node: NodeId) -> GradientAttributes {
        self.node(node).map(|n| n.gradient.clone()).unwrap_or_default()
    }

    fn pattern_attributes(&self, node: NodeId) -> PatternAttributes {
        self.node(node).map(|n| n.pattern.clone()).unwrap_or_default()
    }

    fn stops(&self, node: NodeId) -> Vec<GradientStop> {
        self.node(node).map(|n| n.stops.clone()).unwrap_or_default()
    }

    fn has_content(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|n| n.content_children > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorValue;
    use crate::geometry::Length;
    use crate::Color;

    #[test]
    fn test_node_kind_family() {
        assert!(NodeKind::LinearGradient.accepts_template(NodeKind::RadialGradient));
        assert!(NodeKind::RadialGradient.accepts_template(NodeKind::LinearGradient));
        assert!(!NodeKind::Pattern.accepts_template(NodeKind::LinearGradient));
        assert!(!NodeKind::LinearGradient.accepts_template(NodeKind::Other));
        assert_eq!(NodeKind::from_tag("rect"), NodeKind::Other);
    }

    #[test]
    fn test_gradient_node() {
        let mut doc = PaintDocument::new();
        let g = doc.add_element(
            "linearGradient",
            &[("id", "g"), ("x2", "50%"), ("xlink:href", "#base")],
        );
        doc.append_child(g, "stop", &[("offset", "0"), ("stop-color", "red")]);
        doc.append_child(g, "stop", &[("offset", "1"), ("stop-color", "blue")]);

        assert_eq!(doc.lookup_by_iri(&Iri::local("g")), Some(g));
        assert_eq!(doc.node_kind(g), NodeKind::LinearGradient);
        assert_eq!(doc.template_link(g), Some(Iri::local("base")));
        assert_eq!(doc.gradient_attributes(g).x2, Some(Length::percent(50.0)));

        let stops = doc.stops(g);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[1].color, ColorValue::Rgba(Color::from_rgb(0, 0, 255)));
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_href_precedence() {
        let mut doc = PaintDocument::new();
        let g = doc.add_element(
            "radialGradient",
            &[("href", "#a"), ("xlink:href", "#b")],
        );
        assert_eq!(doc.template_link(g), Some(Iri::local("a")));
    }

    #[test]
    fn test_invalid_attributes_are_unset() {
        let mut doc = PaintDocument::new();
        let g = doc.add_element(
            "linearGradient",
            &[("id", "g"), ("spreadMethod", "sideways"), ("x1", "abc")],
        );
        assert_eq!(doc.gradient_attributes(g), GradientAttributes::default());
        assert_eq!(doc.diagnostics().len(), 2);
        assert!(doc.diagnostics().iter().all(|e| e.category() == "invalid_attribute"));
    }

    #[test]
    fn test_pattern_content() {
        let mut doc = PaintDocument::new();
        let empty = doc.add_element("pattern", &[("id", "empty")]);
        let full = doc.add_element("pattern", &[("id", "full"), ("width", "10")]);
        let rect = doc.append_child(full, "rect", &[("width", "5")]);

        assert!(!doc.has_content(empty));
        assert!(doc.has_content(full));
        assert_eq!(doc.parent(rect), Some(full));
        assert_eq!(doc.node_kind(rect), NodeKind::Other);
        assert_eq!(doc.pattern_attributes(full).width, Some(Length::number(10.0)));
    }

    #[test]
    fn test_lookup_misses() {
        let mut doc = PaintDocument::new();
        doc.add_element("linearGradient", &[("id", "g")]);
        let dup = doc.add_element("pattern", &[("id", "g")]);

        assert_ne!(doc.get_element_by_id("g"), Some(dup));
        assert_eq!(doc.lookup_by_iri(&Iri::local("missing")), None);
        assert_eq!(doc.lookup_by_iri(&Iri::parse("other.svg#g").unwrap()), None);
    }

    #[test]
    fn test_append_child_to_foreign_node() {
        let mut other = PaintDocument::new();
        other.add_element("svg", &[]);
        let foreign = other.add_element("linearGradient", &[("id", "g")]);

        let mut doc = PaintDocument::new();
        let stop = doc.append_child(foreign, "stop", &[("offset", "0")]);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.parent(stop), None);
        assert_eq!(doc.node_kind(stop), NodeKind::Other);
    }
}
