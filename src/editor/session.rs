use tracing::{debug, warn};

use super::surface::EditingSurface;
use crate::markup::{contains_tags, StructuralFingerprint, TagProfile};

/// What the surface holds at save time, classified once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutput {
    /// Rich mode with formatting; carries the surface's normalized markup
    RichFormatted(String),
    /// Rich mode without formatting; carries the rendered text
    RichPlain(String),
    /// Rich mode and the user never touched the content
    RichUnedited,
    /// Raw mode, text differs from what raw mode first showed
    RawEdited(String),
    /// Raw mode, text byte-identical to what raw mode first showed
    RawUnedited,
}

/// Everything recorded about the one cell being edited
#[derive(Debug, Clone)]
pub struct EditContext {
    pub key: String,
    pub column_index: usize,
    pub original_value: String,
    pub original_fingerprint: StructuralFingerprint,
    pub original_plain_text: String,
    pub is_markup_preview_mode: bool,
    raw_baseline: String,
    raw_text: String,
}

impl EditContext {
    /// Text shown in raw mode, including the user's raw edits
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

/// A committed edit, ready to be written into the working matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedEdit {
    pub key: String,
    pub column_index: usize,
    pub value: String,
}

/// Map the classified editor output to the value that gets stored.
///
/// Unedited content keeps the original bytes; plain edits are stored as
/// plain text with no wrapper; formatted edits get the recorded structure
/// put back.
pub fn persisted_value(ctx: &EditContext, output: EditorOutput, profile: &TagProfile) -> String {
    match output {
        EditorOutput::RawUnedited | EditorOutput::RichUnedited => ctx.original_value.clone(),
        EditorOutput::RawEdited(text) => text,
        EditorOutput::RichPlain(text) if text == ctx.original_plain_text => {
            ctx.original_value.clone()
        }
        EditorOutput::RichPlain(text) => text,
        EditorOutput::RichFormatted(markup) => {
            if ctx.original_fingerprint.is_trivial() {
                markup
            } else {
                ctx.original_fingerprint.reapply(&markup, profile)
            }
        }
    }
}

/// Single-cell edit state machine. `None` is idle.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    context: Option<EditContext>,
    profile: TagProfile,
}

impl EditSession {
    pub fn new(profile: TagProfile) -> Self {
        Self {
            context: None,
            profile,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&EditContext> {
        self.context.as_ref()
    }

    /// Start editing a cell. Refused while another edit is open.
    pub fn open<S: EditingSurface>(
        &mut self,
        key: &str,
        column_index: usize,
        current_value: &str,
        surface: &mut S,
    ) -> bool {
        if let Some(active) = &self.context {
            warn!(
                target: "edit",
                "Edit of [{}] {} still open, ignoring open of [{}] {}",
                active.column_index, active.key, column_index, key
            );
            return false;
        }

        surface.clear();
        surface.load(current_value);

        self.context = Some(EditContext {
            key: key.to_string(),
            column_index,
            original_value: current_value.to_string(),
            original_fingerprint: StructuralFingerprint::extract(current_value, &self.profile),
            original_plain_text: surface.plain_text(),
            is_markup_preview_mode: false,
            raw_baseline: String::new(),
            raw_text: String::new(),
        });
        debug!(target: "edit", "Opened [{}] {}", column_index, key);
        true
    }

    /// Drop the edit without touching the matrix
    pub fn cancel<S: EditingSurface>(&mut self, surface: &mut S) -> bool {
        match self.context.take() {
            Some(ctx) => {
                surface.clear();
                debug!(target: "edit", "Cancelled [{}] {}", ctx.column_index, ctx.key);
                true
            }
            None => false,
        }
    }

    /// Switch between rich and raw mode.
    ///
    /// Entering raw mode shows the original value, or the surface markup if
    /// the user already edited in rich mode. Leaving raw mode with edited
    /// text loads it into the surface and makes it the new baseline,
    /// fingerprint included.
    pub fn toggle_markup_preview<S: EditingSurface>(&mut self, surface: &mut S) -> bool {
        let Some(ctx) = self.context.as_mut() else {
            return false;
        };

        if !ctx.is_markup_preview_mode {
            ctx.raw_baseline = if surface.is_modified() {
                surface.markup()
            } else {
                ctx.original_value.clone()
            };
            ctx.raw_text = ctx.raw_baseline.clone();
            ctx.is_markup_preview_mode = true;
            return true;
        }

        if ctx.raw_text != ctx.raw_baseline {
            if !contains_tags(&ctx.raw_text) {
                debug!(target: "edit", "Raw text has no markup, storing as plain text");
            }
            surface.load(&ctx.raw_text);
            ctx.original_value = ctx.raw_text.clone();
            ctx.original_fingerprint = StructuralFingerprint::extract(&ctx.raw_text, &self.profile);
            ctx.original_plain_text = surface.plain_text();
            debug!(target: "edit", "Applied raw markup, fingerprint re-derived");
        }
        ctx.is_markup_preview_mode = false;
        true
    }

    /// Record raw-mode typing. Ignored outside raw mode.
    pub fn set_raw_text(&mut self, text: &str) -> bool {
        match self.context.as_mut() {
            Some(ctx) if ctx.is_markup_preview_mode => {
                ctx.raw_text = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Classify what the surface (or the raw text) holds right now
    pub fn capture_output<S: EditingSurface>(&self, surface: &S) -> Option<EditorOutput> {
        let ctx = self.context.as_ref()?;

        if ctx.is_markup_preview_mode {
            if ctx.raw_text != ctx.raw_baseline {
                return Some(EditorOutput::RawEdited(ctx.raw_text.clone()));
            }
            // An untouched raw view over rich edits still commits those edits
            if !surface.is_modified() {
                return Some(EditorOutput::RawUnedited);
            }
        } else if !surface.is_modified() {
            return Some(EditorOutput::RichUnedited);
        }

        Some(if surface.has_formatting() {
            EditorOutput::RichFormatted(surface.markup())
        } else {
            EditorOutput::RichPlain(surface.plain_text())
        })
    }

    /// Close the edit and hand back the value to store
    pub fn save<S: EditingSurface>(&mut self, surface: &mut S) -> Option<SavedEdit> {
        let output = self.capture_output(surface)?;
        let ctx = self.context.take()?;
        debug!(target: "edit", "Saving [{}] {} as {:?}", ctx.column_index, ctx.key, output);

        let value = persisted_value(&ctx, output, &self.profile);
        surface.clear();

        Some(SavedEdit {
            key: ctx.key,
            column_index: ctx.column_index,
            value,
        })
    }
}
