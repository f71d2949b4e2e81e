use anyhow::Result;
use std::fmt;

use super::lexer::{Lexer, Token};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Attributes that survive editor normalization only if we put them back
/// Elements that never have children or a closing tag
pub fn is_void_tag(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_preservable_attribute(name: &str) -> bool {
    name == "id" || name == "class" || name.starts_with("data-")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(element) => element.text_content(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// Kept in source order so serialization is stable
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn preservable_attributes(&self) -> Vec<(String, String)> {
        self.attributes
            .iter()
            .filter(|(name, _)| is_preservable_attribute(name))
            .cloned()
            .collect()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
        out.push('>');
        if self.is_void() {
            return;
        }
        for child in &self.children {
            write_node(child, out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
        }
    }
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => escape_into(text, false, out),
        Node::Element(element) => element.write_markup(out),
    }
}

fn push_node(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => roots,
    };
    // Adjacent text runs merge, e.g. around a dropped comment
    if let (Node::Text(new), Some(Node::Text(prev))) = (&node, siblings.last_mut()) {
        prev.push_str(new);
        return;
    }
    siblings.push(node);
}

/// A parsed markup value: a list of top-level nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Build a tree from markup. Unclosed elements are closed at the end of
    /// input and stray closing tags are dropped; a tag cut off mid-way is an
    /// error.
    pub fn parse(input: &str) -> Result<Self> {
        let tokens = Lexer::new(input).tokenize_all()?;
        let mut roots: Vec<Node> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        for token in tokens {
            match token {
                Token::Text(text) => {
                    if !text.is_empty() {
                        push_node(&mut stack, &mut roots, Node::Text(text));
                    }
                }
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let element = Element {
                        tag: name,
                        attributes,
                        children: Vec::new(),
                    };
                    if self_closing || element.is_void() {
                        push_node(&mut stack, &mut roots, Node::Element(element));
                    } else {
                        stack.push(element);
                    }
                }
                Token::EndTag(name) => {
                    if let Some(depth) = stack.iter().rposition(|e| e.tag == name) {
                        while stack.len() > depth {
                            if let Some(done) = stack.pop() {
                                push_node(&mut stack, &mut roots, Node::Element(done));
                            }
                        }
                    }
                }
                Token::Comment | Token::Eof => {}
            }
        }

        while let Some(done) = stack.pop() {
            push_node(&mut stack, &mut roots, Node::Element(done));
        }

        Ok(Self { nodes: roots })
    }

    /// The whole input as a single text node
    pub fn plain(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self {
            nodes: vec![Node::Text(text.to_string())],
        }
    }

    /// Parse, or treat the content as plain text when it is malformed
    pub fn parse_lenient(input: &str) -> Self {
        match Self::parse(input) {
            Ok(fragment) => fragment,
            Err(e) => {
                tracing::debug!(target: "markup", "Treating as plain text: {}", e);
                Self::plain(input)
            }
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, &mut out);
        }
        out
    }

    pub fn top_level_elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }

    pub fn has_elements(&self) -> bool {
        self.top_level_elements().next().is_some()
    }

    /// Paths (child indices from the root) of every element matching
    /// `predicate`, in document order
    pub fn element_paths<F>(&self, predicate: F) -> Vec<Vec<usize>>
    where
        F: Fn(&Element) -> bool,
    {
        fn walk<F: Fn(&Element) -> bool>(
            nodes: &[Node],
            prefix: &mut Vec<usize>,
            predicate: &F,
            out: &mut Vec<Vec<usize>>,
        ) {
            for (idx, node) in nodes.iter().enumerate() {
                if let Node::Element(element) = node {
                    prefix.push(idx);
                    if predicate(element) {
                        out.push(prefix.clone());
                    }
                    walk(&element.children, prefix, predicate, out);
                    prefix.pop();
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.nodes, &mut Vec::new(), &predicate, &mut out);
        out
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut current = self.nodes.get(*first)?.as_element()?;
        for idx in rest {
            current = current.children.get(*idx)?.as_element()?;
        }
        Some(current)
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        let mut current = match self.nodes.get_mut(*first)? {
            Node::Element(element) => element,
            Node::Text(_) => return None,
        };
        for idx in rest {
            current = match current.children.get_mut(*idx)? {
                Node::Element(element) => element,
                Node::Text(_) => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// What a reader sees once tags are stripped and entities decoded
pub fn rendered_text(markup: &str) -> String {
    Fragment::parse_lenient(markup).text_content()
}

/// True when the string parses cleanly and holds at least one element
pub fn contains_tags(markup: &str) -> bool {
    match Fragment::parse(markup) {
        Ok(fragment) => fragment.has_elements(),
        Err(_) => false,
    }
}
