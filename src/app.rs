//! App Core for the bookmark transcoder.
//!
//! Holds the record database and the settings engine shared by the RPC server.

use crate::database::connection::Database;
use crate::managers::bookmark_store::BookmarkStore;
use crate::services::html_serializer::SerializeOptions;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

/// Central application struct.
///
/// `BookmarkStore` is created on demand via [`App::store`] because it borrows
/// the connection with a lifetime parameter.
pub struct App {
    pub db: Database,
    pub settings_engine: SettingsEngine,
}

impl App {
    /// Creates a new App.
    ///
    /// Settings are loaded from `settings_path` (or the default config file).
    /// The database opens at `db_override` when given, otherwise at the
    /// configured `storage.database_path`.
    pub fn new(
        settings_path: Option<String>,
        db_override: Option<&str>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings_engine = SettingsEngine::new(settings_path);
        let settings = settings_engine.load()?;

        let db_path = db_override.unwrap_or(&settings.storage.database_path);
        let db = Database::open(db_path)?;

        Ok(Self {
            db,
            settings_engine,
        })
    }

    /// A store over the app's connection.
    pub fn store(&self) -> BookmarkStore<'_> {
        BookmarkStore::new(self.db.connection())
    }

    /// Export options from the current settings.
    pub fn export_options(&self) -> SerializeOptions {
        SerializeOptions::from(&self.settings_engine.get_settings().export)
    }
}
