//! The visual tree: detached element descriptions and the mounted arena the
//! reconciler mutates.
//!
//! `SvgElement` is what the overlay renderer returns; it owns its children and
//! has no identity. `SvgTree` mounts elements under stable `NodeId`s so a
//! reconciliation pass can tell which nodes survived.

use std::collections::HashMap;
use std::fmt::Write as _;

/// Format a number for attribute output: four decimals, trailing zeros trimmed.
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Escape text content and attribute values for XML output.
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A detached element with owned children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvgElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<SvgElement>,
    /// Escaped on output
    pub text: Option<String>,
    /// Emitted verbatim (host-supplied markup is not sanitized)
    pub markup: Option<String>,
}

impl SvgElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn num(self, name: impl Into<String>, value: f64) -> Self {
        self.attr(name, fmt_num(value))
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(mut self, child: SvgElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }
}

/// Stable identity of a mounted node. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    text: Option<String>,
    markup: Option<String>,
}

/// Mounted element arena
#[derive(Debug, Clone)]
pub struct SvgTree {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
    root: NodeId,
}

impl SvgTree {
    pub fn new(root: SvgElement) -> Self {
        let mut tree = Self {
            nodes: HashMap::new(),
            next_id: 0,
            root: NodeId(0),
        };
        tree.root = tree.mount(None, root);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn mount(&mut self, parent: Option<NodeId>, element: SvgElement) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let SvgElement {
            tag,
            attrs,
            children,
            text,
            markup,
        } = element;
        self.nodes.insert(
            id,
            Node {
                tag,
                attrs,
                children: Vec::with_capacity(children.len()),
                parent,
                text,
                markup,
            },
        );
        // each child links itself into `id`
        for child in children {
            self.mount(Some(id), child);
        }
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(id);
        }
        id
    }

    /// Mount `element` as the last child of `parent`. None if `parent` is gone.
    pub fn append(&mut self, parent: NodeId, element: SvgElement) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        Some(self.mount(Some(parent), element))
    }

    /// Append under a parent known to be mounted.
    pub(crate) fn mount_child(&mut self, parent: NodeId, element: SvgElement) -> NodeId {
        debug_assert!(self.nodes.contains_key(&parent));
        self.mount(Some(parent), element)
    }

    /// Detach and drop a node with its subtree. Returns false if absent.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != id);
        }
        let mut stack = node.children;
        while let Some(child) = stack.pop() {
            if let Some(node) = self.nodes.remove(&child) {
                stack.extend(node.children);
            }
        }
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of mounted nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&id)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        let value = value.into();
        match node.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => node.attrs.push((name.to_string(), value)),
        }
        true
    }

    /// Nodes under `from` (inclusive, document order) carrying attribute `name`.
    pub fn find_with_attr(&self, from: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if self.attr(id, name).is_some() {
                found.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        found
    }

    /// Serialize a subtree as SVG/XML text.
    pub fn to_svg(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let _ = write!(out, "<{}", node.tag);
        for (k, v) in &node.attrs {
            let _ = write!(out, " {}=\"{}\"", k, escape_xml(v));
        }
        if node.children.is_empty() && node.text.is_none() && node.markup.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(&escape_xml(text));
        }
        if let Some(markup) = &node.markup {
            out.push_str(markup);
        }
        for &child in &node.children {
            self.write_node(child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }
}
