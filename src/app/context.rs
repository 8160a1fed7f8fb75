use std::sync::Arc;
use std::time::Duration;

use crate::app::error::{Result, TributaryError};
use crate::config::Config;
use crate::counters::UnreadTally;
use crate::remote::{CounterSource, EntryMutations, EntrySource, MinifluxClient};
use crate::view::ViewCoordinator;

pub struct AppContext {
    pub config: Config,
    pub counters: Arc<UnreadTally>,
    pub view: ViewCoordinator,
}

impl AppContext {
    /// Connect to the server named in `config`.
    pub fn new(config: Config) -> Result<Self> {
        let url = config
            .server
            .url
            .as_deref()
            .ok_or_else(|| TributaryError::Config("No server URL (set [server] url or pass --url)".into()))?;
        let token = config
            .server
            .token
            .as_deref()
            .ok_or_else(|| TributaryError::Config("No API token (set [server] token or pass --token)".into()))?;

        let timeout = Duration::from_secs(config.server.timeout_secs);
        let client = Arc::new(MinifluxClient::new(url, token, timeout)?);
        Ok(Self::with_remote(config, client.clone(), client.clone(), client))
    }

    /// Wire the view core over arbitrary collaborators.
    pub fn with_remote(
        config: Config,
        source: Arc<dyn EntrySource>,
        remote: Arc<dyn EntryMutations>,
        counter_source: Arc<dyn CounterSource>,
    ) -> Self {
        let counters = Arc::new(UnreadTally::new(counter_source));
        let view = ViewCoordinator::new(source, remote, counters.clone(), config.view.page_size);
        view.set_filter(config.view.filter());

        Self {
            config,
            counters,
            view,
        }
    }
}
