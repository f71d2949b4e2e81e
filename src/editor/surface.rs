use crate::markup::{Element, Fragment, Node, TagProfile};

/// The rich-text editing surface the host embeds.
///
/// It accepts markup, lets the user edit it, and hands back its own
/// normalized form of the content. One instance is reused across edits.
pub trait EditingSurface {
    /// Replace the content and reset the modified flag
    fn load(&mut self, markup: &str);

    /// Normalized markup of the current content
    fn markup(&self) -> String;

    /// Rendered text, blocks separated by newlines
    fn plain_text(&self) -> String;

    /// Whether anything beyond plain paragraphs is present
    fn has_formatting(&self) -> bool;

    /// Whether the user changed the content since the last load
    fn is_modified(&self) -> bool;

    fn clear(&mut self);
}

/// Blocks the surface keeps as-is; every other block becomes the default
const KEPT_BLOCKS: &[&str] = &["p", "h1", "h2", "h3", "blockquote", "pre", "ul", "ol"];

/// Inline formats the surface knows, after renaming
const KEPT_INLINES: &[&str] = &["strong", "em", "u", "s", "a", "code", "sub", "sup", "span"];

/// Reference surface that normalizes the way common rich-text editors do:
/// `b` becomes `strong`, `div` becomes `p`, unknown inline tags become the
/// default inline tag, loose inline content is wrapped in a paragraph, and
/// every attribute except a link's `href` or an image's `src` is dropped.
#[derive(Debug, Clone)]
pub struct NormalizingSurface {
    profile: TagProfile,
    content: Fragment,
    modified: bool,
}

impl NormalizingSurface {
    pub fn new(profile: TagProfile) -> Self {
        Self {
            profile,
            content: Fragment::default(),
            modified: false,
        }
    }

    /// Apply a user edit: the surface ends up holding the normalized form of
    /// `markup`
    pub fn edit(&mut self, markup: &str) {
        self.content = self.normalize(markup);
        self.modified = true;
    }

    /// Replace the text of the whole content, dropping all formatting
    pub fn type_text(&mut self, text: &str) {
        let paragraphs = text
            .split('\n')
            .map(|line| {
                let mut p = Element::new(self.profile.default_block_tag.clone());
                if !line.is_empty() {
                    p.children.push(Node::Text(line.to_string()));
                }
                Node::Element(p)
            })
            .collect();
        self.content = Fragment { nodes: paragraphs };
        self.modified = true;
    }

    fn normalize(&self, markup: &str) -> Fragment {
        let source = Fragment::parse_lenient(markup);
        let mut nodes = Vec::new();
        let mut run: Vec<Node> = Vec::new();

        for node in source.nodes {
            match node {
                Node::Text(text) => {
                    if !text.trim().is_empty() || !run.is_empty() {
                        run.push(Node::Text(text));
                    }
                }
                Node::Element(element) if self.profile.flows_inline(&element.tag) => {
                    run.extend(self.normalize_inline(element));
                }
                Node::Element(element) => {
                    self.flush_run(&mut run, &mut nodes);
                    nodes.push(Node::Element(self.normalize_block(element)));
                }
            }
        }
        self.flush_run(&mut run, &mut nodes);

        Fragment { nodes }
    }

    fn flush_run(&self, run: &mut Vec<Node>, nodes: &mut Vec<Node>) {
        // Trailing whitespace between blocks is not content
        while matches!(run.last(), Some(Node::Text(t)) if t.trim().is_empty()) {
            run.pop();
        }
        if run.is_empty() {
            return;
        }
        let mut p = Element::new(self.profile.default_block_tag.clone());
        p.children = std::mem::take(run);
        nodes.push(Node::Element(p));
    }

    fn normalize_block(&self, element: Element) -> Element {
        let tag = if KEPT_BLOCKS.contains(&element.tag.as_str()) {
            element.tag
        } else {
            self.profile.default_block_tag.clone()
        };

        let mut block = Element::new(tag);
        if block.tag == "ul" || block.tag == "ol" {
            for child in element.children {
                if let Node::Element(item) = child {
                    let mut li = Element::new("li");
                    li.children = self.normalize_inline_children(item.children);
                    block.children.push(Node::Element(li));
                }
            }
        } else {
            block.children = self.normalize_inline_children(element.children);
        }
        block
    }

    fn normalize_inline_children(&self, children: Vec<Node>) -> Vec<Node> {
        children
            .into_iter()
            .flat_map(|child| match child {
                Node::Text(text) => vec![Node::Text(text)],
                Node::Element(element) => self.normalize_inline(element),
            })
            .collect()
    }

    fn normalize_inline(&self, element: Element) -> Vec<Node> {
        // Blocks nested in inline content are unwrapped
        if self.profile.is_block(&element.tag) {
            return self.normalize_inline_children(element.children);
        }

        let tag = match element.tag.as_str() {
            "br" | "img" => element.tag.clone(),
            "b" => "strong".to_string(),
            "i" => "em".to_string(),
            "strike" | "del" => "s".to_string(),
            "ins" => "u".to_string(),
            t if KEPT_INLINES.contains(&t) => element.tag.clone(),
            _ => self.profile.default_inline_tag.clone(),
        };

        let mut out = Element::new(tag);
        match out.tag.as_str() {
            "a" => {
                if let Some(href) = element.attr("href") {
                    out.set_attr("href", href);
                }
            }
            "img" => {
                if let Some(src) = element.attr("src") {
                    out.set_attr("src", src);
                }
            }
            _ => {}
        }
        out.children = self.normalize_inline_children(element.children);
        vec![Node::Element(out)]
    }
}

impl Default for NormalizingSurface {
    fn default() -> Self {
        Self::new(TagProfile::default())
    }
}

fn block_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) if e.tag == "br" => out.push('\n'),
            Node::Element(e) => block_text(&e.children, out),
        }
    }
}

impl EditingSurface for NormalizingSurface {
    fn load(&mut self, markup: &str) {
        self.content = self.normalize(markup);
        self.modified = false;
    }

    fn markup(&self) -> String {
        self.content.to_markup()
    }

    fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for node in &self.content.nodes {
            match node {
                Node::Element(list) if list.tag == "ul" || list.tag == "ol" => {
                    for item in list.child_elements() {
                        let mut line = String::new();
                        block_text(&item.children, &mut line);
                        lines.push(line);
                    }
                }
                Node::Element(block) => {
                    let mut line = String::new();
                    block_text(&block.children, &mut line);
                    lines.push(line);
                }
                Node::Text(text) => lines.push(text.clone()),
            }
        }
        lines.join("\n")
    }

    fn has_formatting(&self) -> bool {
        fn inline_formatting(nodes: &[Node]) -> bool {
            nodes.iter().any(|node| match node {
                Node::Element(e) => e.tag != "br" || inline_formatting(&e.children),
                Node::Text(_) => false,
            })
        }

        self.content.nodes.iter().any(|node| match node {
            Node::Element(block) => {
                block.tag != self.profile.default_block_tag
                    || !block.attributes.is_empty()
                    || inline_formatting(&block.children)
            }
            Node::Text(_) => false,
        })
    }

    fn is_modified(&self) -> bool {
        self.modified
    }

    fn clear(&mut self) {
        self.content = Fragment::default();
        self.modified = false;
    }
}
