//! Keeps a host document and an editor's node tree in step.
//!
//! Text flows in from the host through [EditSync::on_host_text_changed], and flows back out after
//! local edits have settled for the configured debounce interval. Both directions compare content
//! before acting, which is what stops the editor's own writes from bouncing back as reparses.

use tracing::{debug, trace, warn, Span};
use web_time::Instant;

use crate::{
    config::EditorConfig,
    error::{HostError, SyncError},
    nav::Caret,
    node::{navigation::{FocusState, Intent}, tree::Document},
    serialize::{Deserializable, Serializable},
};

/// Shown in place of the preview when the host fails to render the current LaTeX.
pub const PREVIEW_FALLBACK: &str = "Error rendering math";

/// The editor's view of whatever owns the real document.
pub trait Host {
    /// The host's current, authoritative document text.
    fn text(&self) -> String;

    /// Replaces the host's entire document. Calling this with the text the host already holds
    /// should be harmless.
    fn replace_text(&mut self, text: &str) -> Result<(), HostError>;

    /// Splices literal text in at the host's own caret, bypassing the node tree entirely.
    fn insert_at_caret(&mut self, literal: &str) -> Result<(), HostError>;

    /// Renders a visual preview of `latex`.
    fn show_preview(&mut self, latex: &str) -> Result<(), HostError> {
        let _ = latex;
        Ok(())
    }

    /// Shows a message in place of a preview which could not be rendered.
    fn show_preview_error(&mut self, message: &str) {
        let _ = message;
    }
}

/// Counters describing what the controller has done, mostly useful to check that echoes are being
/// suppressed.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct SyncStats {
    /// Host text was parsed into a new tree.
    pub reparses: usize,

    /// Serialized text was written to the host.
    pub pushes: usize,

    /// Host text was ignored because the editor already had it.
    pub skipped_echoes: usize,

    /// A due push was skipped because the host already had the text.
    pub skipped_pushes: usize,
}

/// The edit-sync controller for one open editor surface.
pub struct EditSync<H: Host> {
    host: H,
    config: EditorConfig,
    document: Document,
    caret: Caret,

    /// Canonical LaTeX for `document`, kept current after every change.
    serialized: String,

    /// The last text known to be held by the host, either because it told us or because we wrote
    /// it.
    last_synced: String,

    /// When the pending push becomes due, if there is one.
    deadline: Option<Instant>,

    stats: SyncStats,
    span: Span,
}

impl<H: Host> EditSync<H> {
    /// Opens an editor on the host's current text. Diagnostics are recorded within `span`.
    pub fn open(host: H, config: EditorConfig, span: Span) -> Self {
        let text = host.text();
        let document = Document::deserialize(&text);
        let serialized = document.serialize();
        let caret = document.end_caret();

        let mut sync = EditSync {
            host,
            config,
            document,
            caret,
            serialized,
            last_synced: text,
            deadline: None,
            stats: SyncStats::default(),
            span,
        };
        sync.refresh_preview();
        sync
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn caret(&self) -> &Caret {
        &self.caret
    }

    pub fn focus_state(&self) -> FocusState {
        self.document.focus_state(&self.caret)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The canonical LaTeX for the current tree.
    pub fn serialized(&self) -> &str {
        &self.serialized
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// When the pending push will become due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Handles the host's document text changing. Returns true if the tree was rebuilt.
    ///
    /// Text the editor already holds, or last exchanged with the host, is an echo of an earlier
    /// sync and is ignored. Anything else replaces the tree wholesale and cancels any pending push.
    pub fn on_host_text_changed(&mut self, text: &str) -> bool {
        let span = self.span.clone();
        let _enter = span.enter();

        if text == self.serialized || text == self.last_synced {
            self.stats.skipped_echoes += 1;
            trace!(len = text.len(), "ignoring echoed host text");
            return false;
        }

        if self.deadline.take().is_some() {
            debug!("external change discards pending push");
        }

        self.document.reparse(text);
        self.serialized = self.document.serialize();
        self.caret = self.document.end_caret();
        self.last_synced = text.to_string();
        self.stats.reparses += 1;
        debug!(len = text.len(), "rebuilt document from host text");

        self.refresh_preview();
        true
    }

    /// Applies an editing intent. If the document's text changed, the preview is refreshed and
    /// the push deadline restarts from `now`.
    pub fn apply(&mut self, intent: Intent, now: Instant) -> FocusState {
        let span = self.span.clone();
        let _enter = span.enter();

        let state = self.document.apply(&mut self.caret, intent, &self.config);
        trace!(?intent, ?state, "applied intent");

        let serialized = self.document.serialize();
        if serialized != self.serialized {
            self.serialized = serialized;
            self.deadline = Some(now + self.config.debounce());
            self.refresh_preview();
        }

        state
    }

    /// Moves the caret, as when the user clicks into a region. A caret whose region no longer
    /// exists goes to the end of the document instead.
    pub fn set_caret(&mut self, caret: Caret) -> FocusState {
        self.document.apply(&mut self.caret, Intent::Focus(caret), &self.config)
    }

    /// Pushes the document to the host if the debounce interval has elapsed. Returns true if the
    /// host was written to.
    pub fn poll(&mut self, now: Instant) -> Result<bool, SyncError> {
        match self.deadline {
            Some(deadline) if deadline <= now => self.push_pending(deadline),
            _ => Ok(false),
        }
    }

    /// Pushes any pending change immediately, without waiting for the debounce interval.
    pub fn flush(&mut self) -> Result<bool, SyncError> {
        match self.deadline {
            Some(deadline) => self.push_pending(deadline),
            None => Ok(false),
        }
    }

    /// Closes the editor, dropping any push which has not yet become due, and hands back the host.
    pub fn close(mut self) -> H {
        if self.deadline.take().is_some() {
            self.span.in_scope(|| debug!("closing with a pending push; discarding it"));
        }
        self.host
    }

    fn push_pending(&mut self, deadline: Instant) -> Result<bool, SyncError> {
        let span = self.span.clone();
        let _enter = span.enter();
        self.deadline = None;

        if self.host.text() == self.serialized {
            self.stats.skipped_pushes += 1;
            self.last_synced = self.serialized.clone();
            trace!("host already up to date");
            return Ok(false);
        }

        if let Err(err) = self.host.replace_text(&self.serialized) {
            // Keep it pending so the next poll tries again
            self.deadline = Some(deadline);
            warn!(error = %err, "failed to push document to host");
            return Err(err.into());
        }

        self.last_synced = self.serialized.clone();
        self.stats.pushes += 1;
        debug!(len = self.serialized.len(), "pushed document to host");
        Ok(true)
    }

    fn refresh_preview(&mut self) {
        if let Err(err) = self.host.show_preview(&self.serialized) {
            warn!(error = %err, "preview failed to render");
            self.host.show_preview_error(PREVIEW_FALLBACK);
        }
    }
}
