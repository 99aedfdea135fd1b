//! Editing session engine.
//!
//! The engine is the single owner of the live document. Every change goes
//! through [`Engine::commit`], which bumps the revision, queues a save and
//! publishes a change event. Operations that leave the document as it was do
//! none of those.

use std::sync::Arc;

use notionship_command::{
    Command, CommandInterpreter, FocusMover, KeyChord, OutlineInterpreter, Resolution,
};
use notionship_core::{Document, IndentDirection, Level, Row, RowId};
use notionship_state::{LoadedDocument, OutlineEvent, Persister, SubscriptionManager};
use tracing::{debug, warn};

/// Focus mover that announces focus changes to subscribers.
pub struct EventFocus {
    events: Arc<SubscriptionManager>,
}

impl EventFocus {
    /// Create a focus mover publishing on `events`.
    pub fn new(events: Arc<SubscriptionManager>) -> Self {
        Self { events }
    }
}

impl FocusMover for EventFocus {
    fn focus(&self, id: RowId) {
        self.events.publish(OutlineEvent::focus(id));
    }
}

/// The editing session.
pub struct Engine {
    document: Document,
    revision: u64,
    interpreter: Box<dyn CommandInterpreter>,
    persister: Option<Persister>,
    focus: Box<dyn FocusMover>,
    events: Arc<SubscriptionManager>,
}

impl Engine {
    /// Create an engine around a loaded document.
    ///
    /// The seed is queued for saving straight away, so a fallback document
    /// replaces missing or unusable stored data. After a failed read nothing
    /// is written until the first edit.
    pub fn new(
        loaded: LoadedDocument,
        persister: Persister,
        focus: Box<dyn FocusMover>,
        events: Arc<SubscriptionManager>,
    ) -> Self {
        if loaded.may_overwrite() {
            persister.notify(&loaded.document);
        }
        Self {
            document: loaded.document,
            revision: 0,
            interpreter: Box::new(OutlineInterpreter::new()),
            persister: Some(persister),
            focus,
            events,
        }
    }

    /// The current document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Number of changes committed since startup.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply a keyboard command to the row at `index`.
    pub fn apply_command(&mut self, command: Command, index: usize) -> Resolution {
        let resolution = self.interpreter.apply(&self.document, command, index);
        self.commit(resolution.document.clone());

        if let Some(id) = resolution.focus {
            self.focus.focus(id);
        }

        resolution
    }

    /// Apply whatever command `chord` is bound to. Unbound chords are
    /// unhandled.
    pub fn apply_key(&mut self, chord: KeyChord, index: usize) -> Resolution {
        match chord.command() {
            Some(command) => self.apply_command(command, index),
            None => Resolution::unhandled(&self.document),
        }
    }

    /// Replace a row's text.
    pub fn set_text(&mut self, id: RowId, text: String) -> bool {
        let next = self.document.set_text(id, text);
        self.commit(next)
    }

    /// Replace a row's completion flag.
    pub fn set_checked(&mut self, id: RowId, checked: bool) -> bool {
        let next = self.document.set_checked(id, checked);
        self.commit(next)
    }

    /// Append an empty top-level row and return its id.
    pub fn append_row(&mut self) -> RowId {
        let row = Row::new(Level::ROOT);
        let id = row.id;
        let next = self.document.append(row);
        self.commit(next);
        id
    }

    /// Remove the row at `index`, unless it is the last one.
    pub fn remove_row(&mut self, index: usize) -> bool {
        let next = self.document.remove_at(index);
        self.commit(next)
    }

    /// Reindent the row at `index`.
    pub fn reindent(&mut self, index: usize, direction: IndentDirection) -> bool {
        let next = self.document.reindent(index, direction);
        self.commit(next)
    }

    /// Replace everything with the default single-row document.
    pub fn clear(&mut self) -> RowId {
        let next = Document::default();
        let id = next.rows()[0].id;
        self.commit(next);
        id
    }

    /// Release the persister so its writer can drain and stop, even while
    /// other handles to the engine are still alive. Later edits are not saved.
    pub fn close_persister(&mut self) {
        if self.persister.take().is_some() {
            debug!("Persister released at revision {}", self.revision);
        }
    }

    fn commit(&mut self, next: Document) -> bool {
        if next == self.document {
            return false;
        }

        self.document = next;
        self.revision += 1;
        debug!(
            "Committed revision {} ({} rows)",
            self.revision,
            self.document.len()
        );

        match &self.persister {
            Some(persister) => persister.notify(&self.document),
            None => warn!("Revision {} not saved, persister closed", self.revision),
        }
        self.events
            .publish(OutlineEvent::changed(self.revision, &self.document));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notionship_command::Key;
    use notionship_core::MoveDirection;
    use notionship_state::{
        load_document, InMemoryDocumentStore, LoadSource, DEFAULT_STORAGE_KEY,
    };
    use std::sync::Mutex;

    struct Harness {
        engine: Engine,
        store: Arc<InMemoryDocumentStore>,
        writer: tokio::task::JoinHandle<()>,
        focused: Arc<Mutex<Vec<RowId>>>,
        events: Arc<SubscriptionManager>,
    }

    impl Harness {
        fn new(document: Document) -> Self {
            let store = Arc::new(InMemoryDocumentStore::new());
            let (persister, writer) = Persister::spawn(store.clone(), DEFAULT_STORAGE_KEY);
            let focused = Arc::new(Mutex::new(Vec::new()));
            let sink = focused.clone();
            let events = Arc::new(SubscriptionManager::default());
            let engine = Engine::new(
                LoadedDocument {
                    document,
                    source: LoadSource::Fresh,
                },
                persister,
                Box::new(move |id: RowId| sink.lock().unwrap().push(id)),
                events.clone(),
            );
            Self {
                engine,
                store,
                writer,
                focused,
                events,
            }
        }

        /// Stop the writer and return what ended up in the store.
        async fn persisted(self) -> Document {
            let Harness {
                engine,
                store,
                writer,
                ..
            } = self;
            drop(engine);
            writer.await.unwrap();
            load_document(store.as_ref(), DEFAULT_STORAGE_KEY)
                .await
                .document
        }
    }

    fn texts(document: &Document) -> Vec<&str> {
        document.iter().map(|r| r.text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_command_moves_focus_and_persists() {
        let mut harness = Harness::new(Document::default());
        let first = harness.engine.document().rows()[0].id;
        harness.engine.set_text(first, "A".to_string());

        let resolution = harness.engine.apply_command(Command::NewRowBelow, 0);
        let created = resolution.focus.unwrap();

        assert_eq!(*harness.focused.lock().unwrap(), vec![created]);
        assert_eq!(harness.engine.revision(), 2);

        let expected = harness.engine.document().clone();
        assert_eq!(harness.persisted().await, expected);
    }

    #[tokio::test]
    async fn test_noop_does_not_bump_revision() {
        let mut harness = Harness::new(Document::default());

        let resolution = harness.engine.apply_command(Command::IndentIn, 0);
        assert!(resolution.handled);
        assert_eq!(harness.engine.revision(), 0);
        assert!(!harness.engine.remove_row(0));
        assert!(!harness.engine.set_text(RowId::new(), "x".to_string()));
        assert_eq!(harness.engine.revision(), 0);
    }

    #[tokio::test]
    async fn test_apply_key() {
        let mut harness = Harness::new(Document::default());

        harness.engine.apply_key(KeyChord::plain(Key::Enter), 0);
        assert_eq!(harness.engine.document().len(), 2);

        let unbound = harness.engine.apply_key(KeyChord::plain(Key::Char('x')), 0);
        assert!(!unbound.handled);
        assert_eq!(harness.engine.document().len(), 2);

        harness.engine.apply_key(KeyChord::plain(Key::Tab), 1);
        assert_eq!(harness.engine.document().rows()[1].level.get(), 1);
    }

    #[tokio::test]
    async fn test_delete_backward_focuses_row_above() {
        let mut harness = Harness::new(Document::default());
        let first = harness.engine.document().rows()[0].id;
        harness.engine.set_text(first, "A".to_string());
        harness.engine.apply_command(Command::NewRowBelow, 0);
        harness.focused.lock().unwrap().clear();

        let resolution = harness.engine.apply_command(Command::DeleteBackwardIfEmpty, 1);
        assert_eq!(resolution.focus, Some(first));
        assert_eq!(*harness.focused.lock().unwrap(), vec![first]);
        assert_eq!(texts(harness.engine.document()), vec!["A"]);
    }

    #[tokio::test]
    async fn test_toolbar_operations() {
        let mut harness = Harness::new(Document::default());
        let first = harness.engine.document().rows()[0].id;
        harness.engine.set_text(first, "A".to_string());

        let second = harness.engine.append_row();
        harness.engine.set_text(second, "B".to_string());
        assert!(harness.engine.reindent(1, IndentDirection::In));
        assert!(harness.engine.set_checked(second, true));
        harness.engine.apply_command(
            Command::MoveRow {
                direction: MoveDirection::Up,
            },
            1,
        );
        assert_eq!(texts(harness.engine.document()), vec!["B", "A"]);

        assert!(harness.engine.remove_row(0));
        assert_eq!(texts(harness.engine.document()), vec!["A"]);

        let fresh = harness.engine.clear();
        assert_eq!(harness.engine.document().len(), 1);
        assert_eq!(harness.engine.document().rows()[0].id, fresh);

        let expected = harness.engine.document().clone();
        assert_eq!(harness.persisted().await, expected);
    }

    #[tokio::test]
    async fn test_changes_are_published() {
        let mut harness = Harness::new(Document::default());
        let mut rx = harness.events.subscribe();

        harness.engine.apply_command(Command::NewRowBelow, 0);

        match rx.recv().await.unwrap() {
            OutlineEvent::Changed { revision, rows, .. } => {
                assert_eq!(revision, 1);
                assert_eq!(rows.len(), 2);
            }
            other => panic!("expected change event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_persister_stops_writer_while_engine_lives() {
        let mut harness = Harness::new(Document::default());
        harness.engine.apply_command(Command::NewRowBelow, 0);
        let saved = harness.engine.document().clone();

        harness.engine.close_persister();
        tokio::time::timeout(std::time::Duration::from_secs(5), &mut harness.writer)
            .await
            .expect("writer should stop once the persister is released")
            .unwrap();

        // Edits after closing stay in memory only.
        harness.engine.apply_command(Command::NewRowBelow, 0);
        assert_eq!(harness.engine.document().len(), 3);

        let stored = load_document(harness.store.as_ref(), DEFAULT_STORAGE_KEY).await;
        assert_eq!(stored.document, saved);
    }

    #[tokio::test]
    async fn test_unreadable_store_seed_is_not_saved() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let (persister, writer) = Persister::spawn(store.clone(), DEFAULT_STORAGE_KEY);
        let engine = Engine::new(
            LoadedDocument {
                document: Document::default(),
                source: LoadSource::Unavailable,
            },
            persister,
            Box::new(|_: RowId| {}),
            Arc::new(SubscriptionManager::default()),
        );

        drop(engine);
        writer.await.unwrap();
        assert_eq!(store.version().await, 0);
    }

    #[tokio::test]
    async fn test_event_focus_publishes() {
        let events = Arc::new(SubscriptionManager::default());
        let mut rx = events.subscribe();
        let focus = EventFocus::new(events.clone());

        let id = RowId::new();
        focus.focus(id);

        match rx.recv().await.unwrap() {
            OutlineEvent::Focus { row_id, .. } => assert_eq!(row_id, id),
            other => panic!("expected focus event, got {other:?}"),
        }
    }
}
