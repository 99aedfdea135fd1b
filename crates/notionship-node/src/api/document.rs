//! Document API endpoints.
//!
//! Every mutating endpoint answers with the resulting document. Out-of-range
//! positions and unknown row ids are not errors: the document simply comes
//! back unchanged.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use notionship_command::{Command, Key, KeyChord, Resolution};
use notionship_core::{IndentDirection, Row, RowId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::Engine;
use crate::state::AppState;

/// Query for the document view.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    /// Drop checked rows from the listing.
    #[serde(default)]
    pub hide_completed: bool,
}

/// A visible row with its position in the full document.
#[derive(Debug, Serialize, Deserialize)]
pub struct VisibleRow {
    pub index: usize,
    #[serde(flatten)]
    pub row: Row,
}

/// Response with the filtered view.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentView {
    pub revision: u64,
    pub total: usize,
    pub rows: Vec<VisibleRow>,
}

/// Response with the full document after a mutation.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub revision: u64,
    pub rows: Vec<Row>,
}

impl DocumentResponse {
    fn from_engine(engine: &Engine) -> Self {
        Self {
            revision: engine.revision(),
            rows: engine.document().rows().to_vec(),
        }
    }
}

/// Response after a keyboard command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    /// False when the command did not apply and the client should fall back
    /// to the key's default behaviour.
    pub handled: bool,
    pub focus: Option<RowId>,
    #[serde(flatten)]
    pub document: DocumentResponse,
}

impl CommandResponse {
    fn new(resolution: Resolution, engine: &Engine) -> Self {
        Self {
            handled: resolution.handled,
            focus: resolution.focus,
            document: DocumentResponse::from_engine(engine),
        }
    }
}

/// Request to apply a command.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: Command,
    pub index: usize,
}

/// Request to apply a raw key press, using DOM key names.
#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: String,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub ctrl: bool,
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckedRequest {
    pub checked: bool,
}

#[derive(Debug, Deserialize)]
pub struct IndentRequest {
    pub direction: IndentDirection,
}

/// Get the document, optionally without completed rows.
pub async fn get_document(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Json<DocumentView> {
    let engine = state.engine.lock().await;
    let document = engine.document();

    let rows = document
        .visible_indexed(query.hide_completed)
        .into_iter()
        .map(|(index, row)| VisibleRow {
            index,
            row: row.clone(),
        })
        .collect();

    Json(DocumentView {
        revision: engine.revision(),
        total: document.len(),
        rows,
    })
}

/// Apply a keyboard command.
pub async fn apply_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Json<CommandResponse> {
    let mut engine = state.engine.lock().await;
    let resolution = engine.apply_command(req.command, req.index);
    Json(CommandResponse::new(resolution, &engine))
}

/// Apply a raw key press through the key map.
pub async fn apply_key(
    State(state): State<AppState>,
    Json(req): Json<KeyRequest>,
) -> Json<CommandResponse> {
    let mut engine = state.engine.lock().await;

    let resolution = match Key::from_name(&req.key) {
        Some(key) => {
            let chord = KeyChord {
                key,
                shift: req.shift,
                alt: req.alt,
                ctrl: req.ctrl,
            };
            engine.apply_key(chord, req.index)
        }
        None => Resolution::unhandled(engine.document()),
    };

    Json(CommandResponse::new(resolution, &engine))
}

/// Append an empty top-level row.
pub async fn append_row(State(state): State<AppState>) -> Json<CommandResponse> {
    let mut engine = state.engine.lock().await;
    let id = engine.append_row();
    let resolution = Resolution::handled(engine.document().clone(), Some(id));
    Json(CommandResponse::new(resolution, &engine))
}

/// Replace a row's text.
pub async fn set_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TextRequest>,
) -> Json<DocumentResponse> {
    let mut engine = state.engine.lock().await;
    engine.set_text(RowId::from(id), req.text);
    Json(DocumentResponse::from_engine(&engine))
}

/// Replace a row's completion flag.
pub async fn set_checked(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CheckedRequest>,
) -> Json<DocumentResponse> {
    let mut engine = state.engine.lock().await;
    engine.set_checked(RowId::from(id), req.checked);
    Json(DocumentResponse::from_engine(&engine))
}

/// Reindent the row at a position.
pub async fn reindent(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<IndentRequest>,
) -> Json<DocumentResponse> {
    let mut engine = state.engine.lock().await;
    engine.reindent(index, req.direction);
    Json(DocumentResponse::from_engine(&engine))
}

/// Remove the row at a position.
pub async fn remove_row(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Json<DocumentResponse> {
    let mut engine = state.engine.lock().await;
    engine.remove_row(index);
    Json(DocumentResponse::from_engine(&engine))
}

/// Reset to a single empty row.
pub async fn clear(State(state): State<AppState>) -> Json<DocumentResponse> {
    let mut engine = state.engine.lock().await;
    engine.clear();
    Json(DocumentResponse::from_engine(&engine))
}
