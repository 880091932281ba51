//! Request-scoped fetch and save.

use sctext_shortcode::{Engine, TextEdit, TextStrategy};
use sctext_storage::{Document, DocumentStore, revision_of};

use crate::envelope::{DocumentOutcome, FetchResponse, OutcomeStatus, SaveRequest, TextRecord};
use crate::error::EditorError;
use crate::guard::{AllowAll, Guard};
use crate::sanitize::{PostSanitizer, Sanitizer};

static ALLOW_ALL: AllowAll = AllowAll;
static POST_SANITIZER: PostSanitizer = PostSanitizer;

/// Fetches editable text from stored documents and writes edits back.
///
/// Every call re-reads the current document; nothing is cached between
/// requests. Each document of a save is independent: one failure never
/// blocks the others.
///
/// # Example
///
/// ```
/// use sctext_editor::{Editor, OutcomeStatus, SaveRequest};
/// use sctext_shortcode::{Catalog, Engine, FallbackExtractor, Grammar};
/// use sctext_storage::{DocumentStore, FsStore};
///
/// let dir = tempfile::tempdir()?;
/// let store = FsStore::new(dir.path());
/// store.save("home.txt", "[et_pb_text]Hello[/et_pb_text]")?;
///
/// let catalog = Catalog::builtin();
/// let grammar = Grammar::permissive();
/// let fallback = FallbackExtractor::new();
/// let editor = Editor::new(&store, Engine::select(Some(&grammar), &catalog, &fallback));
///
/// let fetched = editor.fetch("home.txt")?;
/// let mut edit = fetched.texts[0].clone();
/// edit.text.value = "World".to_owned();
///
/// let request: SaveRequest = serde_json::from_value(serde_json::json!({
///     "edits": [{
///         "document": "home.txt",
///         "block_index": edit.text.block_index,
///         "kind": edit.text.kind,
///         "key": edit.text.key,
///         "value": edit.text.value,
///     }],
/// }))?;
/// let outcomes = editor.save(&request);
///
/// assert_eq!(outcomes[0].status, OutcomeStatus::Saved);
/// assert_eq!(store.load("home.txt")?.content, "[et_pb_text]World[/et_pb_text]");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Editor<'a> {
    store: &'a dyn DocumentStore,
    engine: Engine<'a>,
    guard: &'a dyn Guard,
    sanitizer: &'a dyn Sanitizer,
}

impl<'a> Editor<'a> {
    /// Create an editor that allows every document and sanitizes with
    /// [`PostSanitizer`].
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore, engine: Engine<'a>) -> Self {
        Self {
            store,
            engine,
            guard: &ALLOW_ALL,
            sanitizer: &POST_SANITIZER,
        }
    }

    /// Use `guard` for authorization.
    #[must_use]
    pub fn with_guard(mut self, guard: &'a dyn Guard) -> Self {
        self.guard = guard;
        self
    }

    /// Use `sanitizer` for incoming values.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: &'a dyn Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Extraction strategy in use.
    #[must_use]
    pub fn engine(&self) -> &Engine<'a> {
        &self.engine
    }

    /// Extract the editable text of one document.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidTarget`] for an empty id,
    /// [`EditorError::Unauthorized`] if the guard refuses, and
    /// [`EditorError::Storage`] if the document can't be loaded.
    pub fn fetch(&self, id: &str) -> Result<FetchResponse, EditorError> {
        let document = self.read(id)?;
        let extraction = self.engine.extract(&document.content);

        tracing::debug!(
            id,
            strategy = ?extraction.debug.strategy,
            texts = extraction.texts.len(),
            blocks = extraction.blocks.len(),
            "Fetched document"
        );

        Ok(FetchResponse {
            revision: document.revision(),
            texts: extraction
                .texts
                .into_iter()
                .map(|text| TextRecord {
                    document: document.id.clone(),
                    text,
                })
                .collect(),
            blocks: extraction.blocks,
            debug: extraction.debug,
            document: document.id,
        })
    }

    /// Extract the editable text of several documents.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`Editor::fetch`].
    pub fn fetch_many<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<FetchResponse>, EditorError> {
        ids.iter().map(|id| self.fetch(id.as_ref())).collect()
    }

    /// Apply a save request and write the changed documents.
    #[must_use]
    pub fn save(&self, request: &SaveRequest) -> Vec<DocumentOutcome> {
        self.run(request, true)
    }

    /// Compute what a save would do without writing anything.
    #[must_use]
    pub fn preview(&self, request: &SaveRequest) -> Vec<DocumentOutcome> {
        self.run(request, false)
    }

    fn run(&self, request: &SaveRequest, write: bool) -> Vec<DocumentOutcome> {
        request
            .by_document()
            .into_iter()
            .map(|(id, edits)| {
                let expected = request.revisions.get(id).map(String::as_str);
                self.process(id, &edits, expected, write)
                    .unwrap_or_else(|err| {
                        tracing::warn!(id, error = %err, "Document not saved");
                        let mut outcome = DocumentOutcome::new(id, OutcomeStatus::Failed);
                        outcome.error_code = Some(err.code().to_owned());
                        outcome.error = Some(err.to_string());
                        outcome
                    })
            })
            .collect()
    }

    fn process(
        &self,
        id: &str,
        edits: &[TextEdit],
        expected: Option<&str>,
        write: bool,
    ) -> Result<DocumentOutcome, EditorError> {
        let document = self.read(id)?;
        let current = document.revision();
        if let Some(expected) = expected
            && expected != current
        {
            return Err(EditorError::Conflict {
                id: id.to_owned(),
                expected: expected.to_owned(),
                actual: current,
            });
        }

        let sanitized: Vec<TextEdit> = edits
            .iter()
            .map(|edit| TextEdit {
                value: self.sanitizer.sanitize(&edit.value),
                ..edit.clone()
            })
            .collect();
        let reinjection = self.engine.reinject(&document.content, &sanitized);

        let status = if !write {
            OutcomeStatus::Previewed
        } else if reinjection.is_changed() {
            self.authorize(id)?;
            self.store.save(id, &reinjection.document)?;
            OutcomeStatus::Saved
        } else {
            OutcomeStatus::Unchanged
        };

        tracing::info!(
            id,
            ?status,
            applied = reinjection.applied.len(),
            skipped = reinjection.skipped.len(),
            "Processed edits"
        );

        let mut outcome = DocumentOutcome::new(id, status);
        outcome.revision = Some(if reinjection.is_changed() {
            revision_of(&reinjection.document)
        } else {
            current
        });
        if status == OutcomeStatus::Previewed {
            outcome.content = Some(reinjection.document);
        }
        outcome.applied = reinjection.applied;
        outcome.skipped = reinjection.skipped;
        Ok(outcome)
    }

    /// Guard check and load.
    fn read(&self, id: &str) -> Result<Document, EditorError> {
        if id.trim().is_empty() {
            return Err(EditorError::InvalidTarget(
                "document id cannot be empty".to_owned(),
            ));
        }
        self.authorize(id)?;
        Ok(self.store.load(id)?)
    }

    fn authorize(&self, id: &str) -> Result<(), EditorError> {
        if self.guard.can_edit(id) {
            Ok(())
        } else {
            Err(EditorError::Unauthorized { id: id.to_owned() })
        }
    }
}
