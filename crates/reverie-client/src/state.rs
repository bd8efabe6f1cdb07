//! Application state shared by every command.
//!
//! [`AppState`] wires the store components and the network clients to one
//! database handle, one clock and one change notifier.  Hosts build it once at
//! startup and pass `&AppState` into the command functions.

use std::sync::Arc;

use reverie_ai::{CompletionClient, ContentClient, InterpretationClient, LanguageDetector, ScriptDetector};
use reverie_shared::{Clock, SystemClock};
use reverie_store::{
    ChangeNotifier, ContentCache, Database, DreamRepository, SharedDatabase, StreakStore,
};

use crate::config::ClientConfig;
use crate::error::Result;

pub struct AppState {
    pub config: ClientConfig,

    /// Source of "now" for entries, cache freshness and streak days.
    pub clock: Arc<dyn Clock>,

    /// The single SQLite connection behind every store component.
    pub db: SharedDatabase,

    /// Shared with `dreams`; observers subscribe here.
    pub notifier: ChangeNotifier,

    pub dreams: DreamRepository,
    pub content_cache: ContentCache,
    pub streak: StreakStore,

    pub interpreter: InterpretationClient,
    pub content: ContentClient,
}

impl AppState {
    /// Open the configured database with the system clock and the built-in
    /// language detector.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let db = match &config.database_path {
            Some(path) => Database::open_at(path)?,
            None => Database::open_default()?,
        };
        Self::build(config, db, Arc::new(SystemClock), Arc::new(ScriptDetector))
    }

    /// Assemble state from explicit collaborators.
    pub fn build(
        config: ClientConfig,
        db: Database,
        clock: Arc<dyn Clock>,
        detector: Arc<dyn LanguageDetector>,
    ) -> Result<Self> {
        let db = db.into_shared();
        let notifier = ChangeNotifier::default();

        let dreams = DreamRepository::new(db.clone(), notifier.clone());
        let content_cache = ContentCache::new(db.clone(), clock.clone());
        let streak = StreakStore::load(db.clone(), clock.clone())?;

        let completion = CompletionClient::new(config.completion_config());
        let interpreter = InterpretationClient::with_detector(completion.clone(), detector)
            .with_temperature(config.interpretation_temperature);
        let content = ContentClient::with_clock(completion, clock.clone())
            .with_temperature(config.content_temperature);

        tracing::info!(
            model = %config.model,
            content_mode = %config.content_mode,
            authenticated = config.api_key.is_some(),
            "client state ready"
        );

        Ok(Self {
            config,
            clock,
            db,
            notifier,
            dreams,
            content_cache,
            streak,
            interpreter,
            content,
        })
    }
}
