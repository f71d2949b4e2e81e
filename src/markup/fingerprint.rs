use serde::{Deserialize, Serialize};
use std::mem;
use tracing::debug;

use super::node::{is_void_tag, Element, Fragment, Node};
use super::TagProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFingerprint {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFingerprint {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text_content: String,
    pub parent_text_content: String,
}

/// Tag and attribute structure of a markup value, recorded before the value
/// goes through the editor so it can be put back afterwards.
///
/// Blocks are positional: `None` keeps a slot for a top-level block (or run
/// of inline content the editor will wrap in one) with nothing to restore.
/// Inlines are matched by text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralFingerprint {
    pub block_elements: Vec<Option<BlockFingerprint>>,
    pub inline_elements: Vec<InlineFingerprint>,
}

impl StructuralFingerprint {
    pub fn extract(markup: &str, profile: &TagProfile) -> Self {
        let fragment = Fragment::parse_lenient(markup);
        let mut fingerprint = Self::default();
        let mut in_inline_run = false;
        let fragment_text = fragment.text_content();

        for node in &fragment.nodes {
            match node {
                Node::Text(text) => {
                    if !text.trim().is_empty() && !in_inline_run {
                        fingerprint.block_elements.push(None);
                        in_inline_run = true;
                    }
                }
                Node::Element(element) if profile.flows_inline(&element.tag) => {
                    if !in_inline_run {
                        fingerprint.block_elements.push(None);
                        in_inline_run = true;
                    }
                    fingerprint.record_inline(element, &fragment_text, profile);
                    fingerprint.record_descendants(element, profile);
                }
                Node::Element(element) => {
                    in_inline_run = false;
                    let attributes = element.preservable_attributes();
                    let entry = if !attributes.is_empty() || element.tag != profile.default_block_tag
                    {
                        Some(BlockFingerprint {
                            tag: element.tag.clone(),
                            attributes,
                            text_content: element.text_content(),
                        })
                    } else {
                        None
                    };
                    fingerprint.block_elements.push(entry);
                    fingerprint.record_descendants(element, profile);
                }
            }
        }

        debug!(
            target: "markup",
            "Fingerprint: {} block slots ({} kept), {} inline",
            fingerprint.block_elements.len(),
            fingerprint.block_elements.iter().flatten().count(),
            fingerprint.inline_elements.len()
        );
        fingerprint
    }

    fn record_descendants(&mut self, parent: &Element, profile: &TagProfile) {
        let parent_text = parent.text_content();
        for child in parent.child_elements() {
            if !profile.is_block(&child.tag) {
                self.record_inline(child, &parent_text, profile);
            }
            self.record_descendants(child, profile);
        }
    }

    fn record_inline(&mut self, element: &Element, parent_text: &str, profile: &TagProfile) {
        let text = element.text_content();
        // Nothing to match an empty element against later
        if text.trim().is_empty() {
            return;
        }
        let attributes = element.preservable_attributes();
        if attributes.is_empty() && element.tag == profile.default_inline_tag {
            return;
        }
        self.inline_elements.push(InlineFingerprint {
            tag: element.tag.clone(),
            attributes,
            text_content: text,
            parent_text_content: parent_text.to_string(),
        });
    }

    /// True when there is nothing worth restoring
    pub fn is_trivial(&self) -> bool {
        self.inline_elements.is_empty() && self.block_elements.iter().all(Option::is_none)
    }

    /// Put recorded tags and attributes back onto editor output.
    ///
    /// Markup that cannot be parsed is returned untouched.
    pub fn reapply(&self, markup: &str, profile: &TagProfile) -> String {
        if self.is_trivial() {
            return markup.to_string();
        }
        let mut fragment = match Fragment::parse(markup) {
            Ok(fragment) => fragment,
            Err(e) => {
                debug!(target: "markup", "Skipping reapply on unparsable markup: {}", e);
                return markup.to_string();
            }
        };

        let block_slots: Vec<usize> = fragment
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Node::Element(_)))
            .map(|(idx, _)| idx)
            .collect();

        for (slot, recorded) in block_slots.iter().zip(&self.block_elements) {
            let Some(recorded) = recorded else { continue };
            if let Some(Node::Element(candidate)) = fragment.nodes.get_mut(*slot) {
                restore(candidate, &recorded.tag, &recorded.attributes);
            }
        }

        let candidates = fragment.element_paths(|e| profile.is_inline(&e.tag));
        let mut used = vec![false; candidates.len()];
        for recorded in &self.inline_elements {
            let wanted = recorded.text_content.trim();
            let found = candidates.iter().enumerate().position(|(idx, path)| {
                !used[idx]
                    && fragment
                        .element_at(path)
                        .map_or(false, |e| e.text_content().trim() == wanted)
            });

            match found {
                Some(idx) => {
                    used[idx] = true;
                    if let Some(candidate) = fragment.element_at_mut(&candidates[idx]) {
                        restore(candidate, &recorded.tag, &recorded.attributes);
                    }
                }
                None => debug!(
                    target: "markup",
                    "No match for <{}> \"{}\" (in \"{}\")",
                    recorded.tag,
                    recorded.text_content,
                    recorded.parent_text_content
                ),
            }
        }

        fragment.to_markup()
    }
}

/// Swap in an element of the recorded tag carrying the candidate's
/// attributes and children, then set the recorded attributes on it
fn restore(candidate: &mut Element, tag: &str, attributes: &[(String, String)]) {
    if candidate.tag != tag && is_void_tag(tag) && !candidate.children.is_empty() {
        debug!(
            target: "markup",
            "Not turning <{}> with content into void <{}>",
            candidate.tag,
            tag
        );
        return;
    }
    if candidate.tag != tag {
        let replacement = Element {
            tag: tag.to_string(),
            attributes: mem::take(&mut candidate.attributes),
            children: mem::take(&mut candidate.children),
        };
        *candidate = replacement;
    }
    for (name, value) in attributes {
        candidate.set_attr(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> TagProfile {
        TagProfile::default()
    }

    #[test]
    fn test_restores_block_tag_and_id() {
        let fp = StructuralFingerprint::extract(r#"<div id="x">hi</div>"#, &profile());
        assert_eq!(fp.reapply("<p>hi</p>", &profile()), r#"<div id="x">hi</div>"#);
    }

    #[test]
    fn test_default_blocks_become_placeholders() {
        let fp = StructuralFingerprint::extract("<p>one</p><p>two</p>", &profile());
        assert_eq!(fp.block_elements, vec![None, None]);
        assert!(fp.is_trivial());
        assert_eq!(fp.reapply("<p>one!</p>", &profile()), "<p>one!</p>");
    }

    #[test]
    fn test_placeholder_keeps_alignment() {
        let fp = StructuralFingerprint::extract(
            r#"<p>intro</p><section class="note" data-k="7">body</section>"#,
            &profile(),
        );
        assert_eq!(fp.block_elements.len(), 2);
        assert!(fp.block_elements[0].is_none());

        let out = fp.reapply("<p>intro</p><p>body edited</p>", &profile());
        assert_eq!(
            out,
            r#"<p>intro</p><section class="note" data-k="7">body edited</section>"#
        );
    }

    #[test]
    fn test_inline_restore_by_text() {
        let original = r#"<p>Hello <b data-var="name">Bob</b>, meet <x-term class="t">Ann</x-term></p>"#;
        let fp = StructuralFingerprint::extract(original, &profile());
        assert_eq!(fp.inline_elements.len(), 2);
        assert_eq!(fp.inline_elements[0].parent_text_content, "Hello Bob, meet Ann");

        let edited = "<p>Hi <strong>Bob</strong>, meet <span>Ann</span></p>";
        assert_eq!(
            fp.reapply(edited, &profile()),
            r#"<p>Hi <b data-var="name">Bob</b>, meet <x-term class="t">Ann</x-term></p>"#
        );
    }

    #[test]
    fn test_duplicate_inline_text_resolves_in_document_order() {
        let original = r#"<p><b id="first">x</b> and <i id="second">x</i></p>"#;
        let fp = StructuralFingerprint::extract(original, &profile());

        let edited = "<p><em>x</em> and <strong>x</strong></p>";
        assert_eq!(
            fp.reapply(edited, &profile()),
            r#"<p><b id="first">x</b> and <i id="second">x</i></p>"#
        );
    }

    #[test]
    fn test_plain_span_is_not_recorded() {
        let fp = StructuralFingerprint::extract("<p>a <span>b</span></p>", &profile());
        assert!(fp.inline_elements.is_empty());
    }

    #[test]
    fn test_top_level_inline_run_is_one_slot() {
        let fp = StructuralFingerprint::extract(
            r#"<b>a</b> and <i>b</i><div id="q">c</div>"#,
            &profile(),
        );
        assert_eq!(fp.block_elements.len(), 2);
        assert!(fp.block_elements[0].is_none());
        assert_eq!(fp.block_elements[1].as_ref().unwrap().tag, "div");
    }

    #[test]
    fn test_unmatched_inline_leaves_markup_alone() {
        let fp = StructuralFingerprint::extract(r#"<p><b class="k">gone</b></p>"#, &profile());
        assert_eq!(
            fp.reapply("<p><strong>other</strong></p>", &profile()),
            "<p><strong>other</strong></p>"
        );
    }

    #[test]
    fn test_line_break_stays_in_inline_run() {
        let fp = StructuralFingerprint::extract(r#"a<br>b<p class="k">c</p>"#, &profile());
        assert_eq!(fp.block_elements.len(), 2);
        assert!(fp.block_elements[0].is_none());
        assert_eq!(fp.block_elements[1].as_ref().unwrap().tag, "p");

        assert_eq!(
            fp.reapply("<p>a<br>b</p><p><strong>c</strong></p>", &profile()),
            r#"<p>a<br>b</p><p class="k"><strong>c</strong></p>"#
        );
    }

    #[test]
    fn test_block_with_content_never_becomes_void() {
        let fp = StructuralFingerprint {
            block_elements: vec![Some(BlockFingerprint {
                tag: "br".to_string(),
                attributes: vec![("class".to_string(), "k".to_string())],
                text_content: String::new(),
            })],
            inline_elements: Vec::new(),
        };
        assert_eq!(fp.reapply("<p>c</p>", &profile()), "<p>c</p>");
    }
}
