//! Markup handling for translation values
//!
//! Values are small HTML-like fragments. This module parses them into an
//! explicit node tree, serializes them back, and records/restores the
//! structure that a normalizing rich-text editor throws away.

pub mod fingerprint;
pub mod lexer;
pub mod node;

pub use fingerprint::{BlockFingerprint, InlineFingerprint, StructuralFingerprint};
pub use node::{contains_tags, is_void_tag, rendered_text, Element, Fragment, Node};

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "cite", "code", "del", "em", "i", "ins", "kbd", "mark", "q", "s", "small",
    "span", "strike", "strong", "sub", "sup", "u",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figure", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// Which tags the editing surface treats as blocks and inlines, and what it
/// produces by default for each role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagProfile {
    pub default_block_tag: String,
    pub default_inline_tag: String,
    pub inline_tags: Vec<String>,
    pub block_tags: Vec<String>,
}

impl Default for TagProfile {
    fn default() -> Self {
        Self {
            default_block_tag: "p".to_string(),
            default_inline_tag: "span".to_string(),
            inline_tags: INLINE_TAGS.iter().map(|t| t.to_string()).collect(),
            block_tags: BLOCK_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TagProfile {
    pub fn is_inline(&self, tag: &str) -> bool {
        self.inline_tags.iter().any(|t| t == tag)
    }

    pub fn is_block(&self, tag: &str) -> bool {
        self.block_tags.iter().any(|t| t == tag)
    }

    /// Whether an element sits inside the surrounding line of text rather
    /// than starting a block: inline tags plus line breaks and images
    pub fn flows_inline(&self, tag: &str) -> bool {
        self.is_inline(tag) || matches!(tag, "br" | "img")
    }
}
