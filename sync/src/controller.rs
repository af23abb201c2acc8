//! Sync controller state machine
//!
//! Owns the single source of truth: the committed schema graph and the
//! DDL text derived from it. Transitions are explicit method calls;
//! regeneration is a deterministic function of the graph and settings,
//! never an implicit reactive effect.
//!
//! States:
//! - `Clean` - displayed DDL equals the generated DDL of the committed
//!   graph
//! - `Editing` - the text buffer holds user modifications not yet applied
//! - `LiveEditing` - like `Editing`, but every text change immediately
//!   attempts repair, parse, reconcile, commit

use std::mem;

use canvasql_types::{Dialect, GraphSettings, SchemaGraph};

use crate::error::{GenerateWarning, SqlParseError};
use crate::generate::Generator;
use crate::parse::parse;
use crate::reconcile::reconcile;
use crate::repair::repair;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Clean,
    Editing,
    LiveEditing,
}

/// The orchestrator between generator and parser
#[derive(Debug, Clone)]
pub struct SyncController {
    dialect: Dialect,
    graph: SchemaGraph,
    /// Generated DDL of the committed graph
    ddl: String,
    /// Text being displayed/edited; equals `ddl` while `Clean`
    buffer: String,
    /// Rollback point taken when editing starts
    snapshot: Option<String>,
    state: SyncState,
    last_error: Option<SqlParseError>,
    warnings: Vec<GenerateWarning>,
    pending_dialect: Option<Dialect>,
    pending_settings: Option<GraphSettings>,
    notices: Vec<String>,
}

impl SyncController {
    /// Controller over an empty graph
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self::with_graph(dialect, SchemaGraph::new())
    }

    /// Controller over an existing graph (e.g. loaded from a template)
    #[must_use]
    pub fn with_graph(dialect: Dialect, graph: SchemaGraph) -> Self {
        let mut controller = Self {
            dialect,
            graph,
            ddl: String::new(),
            buffer: String::new(),
            snapshot: None,
            state: SyncState::Clean,
            last_error: None,
            warnings: Vec::new(),
            pending_dialect: None,
            pending_settings: None,
            notices: Vec::new(),
        };
        controller.regenerate();
        controller.buffer = controller.ddl.clone();
        controller
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    #[inline]
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The committed graph
    #[inline]
    #[must_use]
    pub const fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// The text currently displayed in the editor
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// The generated DDL of the committed graph
    #[inline]
    #[must_use]
    pub fn committed_ddl(&self) -> &str {
        &self.ddl
    }

    /// The error from the most recent failed parse, if any
    #[must_use]
    pub const fn last_error(&self) -> Option<&SqlParseError> {
        self.last_error.as_ref()
    }

    /// Warnings from the most recent generation
    #[must_use]
    pub fn warnings(&self) -> &[GenerateWarning] {
        &self.warnings
    }

    /// Whether a dialect or settings change is waiting for the next apply
    #[must_use]
    pub const fn has_deferred_changes(&self) -> bool {
        self.pending_dialect.is_some() || self.pending_settings.is_some()
    }

    /// Drain user-facing notices (e.g. about deferred setting changes)
    pub fn take_notices(&mut self) -> Vec<String> {
        mem::take(&mut self.notices)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Record a text change from the editor.
    ///
    /// From `Clean` this snapshots the current DDL as the rollback point
    /// and enters `Editing`. In `LiveEditing` every change immediately
    /// attempts the full pipeline; a failure sets the displayed error but
    /// never reverts the buffer.
    pub fn update_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self.state {
            SyncState::Clean => {
                if text == self.ddl {
                    return;
                }
                self.snapshot = Some(self.ddl.clone());
                self.state = SyncState::Editing;
                self.buffer = text;
            }
            SyncState::Editing => {
                self.buffer = text;
            }
            SyncState::LiveEditing => {
                self.buffer = text;
                match self.run_pipeline() {
                    Ok(merged) => {
                        self.graph = merged;
                        self.regenerate();
                        self.last_error = None;
                        tracing::debug!(tables = self.graph.tables.len(), "live commit");
                    }
                    Err(err) => {
                        tracing::warn!(%err, "live apply failed");
                        self.last_error = Some(err);
                    }
                }
            }
        }
    }

    /// Discard the edited text and restore the snapshot
    pub fn cancel(&mut self) {
        if self.state == SyncState::Clean {
            return;
        }
        if let Some(snapshot) = self.snapshot.take() {
            self.buffer = snapshot;
            // live edits may already have committed; restore the graph
            // from the snapshot text (generator output parses cleanly)
            if self.ddl != self.buffer {
                if let Ok(parsed) = parse(&self.buffer) {
                    let mut merged = reconcile(&self.graph, parsed);
                    merged.settings = self.graph.settings;
                    self.graph = merged;
                    self.regenerate();
                }
            }
        }
        self.last_error = None;
        self.state = SyncState::Clean;
    }

    /// Run repair, parse, reconcile, and commit the edited text.
    ///
    /// On success any deferred dialect/settings change is applied, the
    /// DDL is regenerated from the committed graph, and the state returns
    /// to `Clean`. On failure nothing is touched: the committed graph,
    /// the displayed text, and the state all stay as they were, with the
    /// error available from [`last_error`](Self::last_error).
    pub fn apply(&mut self) -> Result<(), SqlParseError> {
        if self.state == SyncState::Clean {
            return Ok(());
        }
        match self.run_pipeline() {
            Ok(mut merged) => {
                if let Some(dialect) = self.pending_dialect.take() {
                    self.dialect = dialect;
                }
                if let Some(settings) = self.pending_settings.take() {
                    merged.settings = settings;
                }
                self.graph = merged;
                self.regenerate();
                self.buffer = self.ddl.clone();
                self.snapshot = None;
                self.last_error = None;
                self.state = SyncState::Clean;
                tracing::debug!(tables = self.graph.tables.len(), "apply committed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "apply failed");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Toggle live-editing. Entering from `Clean` snapshots first, like a
    /// regular edit
    pub fn toggle_live(&mut self) {
        self.state = match self.state {
            SyncState::Clean => {
                self.snapshot = Some(self.ddl.clone());
                SyncState::LiveEditing
            }
            SyncState::Editing => SyncState::LiveEditing,
            SyncState::LiveEditing => SyncState::Editing,
        };
    }

    /// Change the target dialect. Applied immediately while `Clean`;
    /// deferred until the next successful apply otherwise
    pub fn set_dialect(&mut self, dialect: Dialect) {
        if self.state == SyncState::Clean {
            self.dialect = dialect;
            self.regenerate();
            self.buffer = self.ddl.clone();
        } else {
            self.pending_dialect = Some(dialect);
            self.notices
                .push("dialect change deferred: pending edits take precedence".to_string());
        }
    }

    /// Change generation settings. Applied immediately while `Clean`;
    /// deferred until the next successful apply otherwise
    pub fn set_settings(&mut self, settings: GraphSettings) {
        if self.state == SyncState::Clean {
            self.graph.settings = settings;
            self.regenerate();
            self.buffer = self.ddl.clone();
        } else {
            self.pending_settings = Some(settings);
            self.notices
                .push("settings change deferred: pending edits take precedence".to_string());
        }
    }

    /// Accept a graph pushed by the visual editor as authoritative
    pub fn replace_graph(&mut self, graph: SchemaGraph) {
        self.graph = graph;
        if self.state == SyncState::Clean {
            self.regenerate();
            self.buffer = self.ddl.clone();
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn run_pipeline(&self) -> Result<SchemaGraph, SqlParseError> {
        let repaired = repair(&self.buffer);
        let parsed = parse(&repaired)?;
        let mut merged = reconcile(&self.graph, parsed);
        // settings are controller state, not derivable from the text
        merged.settings = self.graph.settings;
        Ok(merged)
    }

    fn regenerate(&mut self) {
        let out = Generator::new(self.dialect).generate(&self.graph);
        self.ddl = out.sql;
        self.warnings = out.warnings;
    }
}
