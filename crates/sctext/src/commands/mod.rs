//! CLI command implementations.

pub(crate) mod apply;
pub(crate) mod extract;

pub(crate) use apply::ApplyArgs;
pub(crate) use extract::ExtractArgs;

use std::path::Path;

use sctext_config::{CliSettings, Config};
use sctext_editor::{AllowList, Editor};
use sctext_shortcode::{Catalog, Engine, FallbackExtractor, Grammar};
use sctext_storage::FsStore;

use crate::error::CliError;

/// Everything an editor borrows, built once from configuration.
pub(crate) struct Session {
    catalog: Catalog,
    grammar: Option<Grammar>,
    fallback: FallbackExtractor,
    store: FsStore,
    guard: Option<AllowList>,
}

impl Session {
    /// Load configuration and build the session.
    pub(crate) fn load(
        config_path: Option<&Path>,
        settings: &CliSettings,
    ) -> Result<Self, CliError> {
        let config = Config::load(config_path, Some(settings))?;
        tracing::debug!(
            config = ?config.config_path,
            root = %config.store_resolved.root.display(),
            "Loaded configuration"
        );

        Ok(Self {
            catalog: config.catalog(),
            grammar: config.grammar(),
            fallback: config.fallback(),
            store: FsStore::new(&config.store_resolved.root),
            guard: config.access.editable.as_ref().map(AllowList::new),
        })
    }

    /// Editor over the configured store and strategy.
    pub(crate) fn editor(&self) -> Editor<'_> {
        let engine = Engine::select(self.grammar.as_ref(), &self.catalog, &self.fallback);
        let editor = Editor::new(&self.store, engine);
        match &self.guard {
            Some(guard) => editor.with_guard(guard),
            None => editor,
        }
    }
}
