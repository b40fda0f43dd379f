//! Unified service container for matchstream
//!
//! Provides shared access to all core services.

use crate::core::config::Config;
use crate::core::credentials::{CredentialProvider, EnvTokenProvider};
use crate::core::error::Result;
use crate::core::explain::{ExplanationParser, HeaderVocabulary};
use crate::core::session::SearchSession;
use crate::core::stream::{HttpTransport, StreamTransport};
use std::sync::Arc;

/// Unified services container
///
/// Adapters use this same struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Stream transport used by new sessions
    pub transport: Arc<dyn StreamTransport>,

    /// Bearer token source
    pub credentials: Arc<dyn CredentialProvider>,

    /// Explanation parser with the configured vocabulary
    pub parser: Arc<ExplanationParser>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration
    pub fn new(config: Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.server)?);
        let credentials = Arc::new(EnvTokenProvider::new(config.auth.token_env.clone()));
        Ok(Self::with_transport(config, transport, credentials))
    }

    /// Create services around a caller-supplied transport and credentials
    pub fn with_transport(
        config: Config,
        transport: Arc<dyn StreamTransport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let vocabulary = HeaderVocabulary::extended(
            &config.explanation.header_rules,
            &config.explanation.placeholder_phrases,
        );

        Self {
            transport,
            credentials,
            parser: Arc::new(ExplanationParser::new(vocabulary)),
            config: Arc::new(config),
        }
    }

    /// Spawn a new search session bound to these services
    pub fn session(&self) -> SearchSession {
        SearchSession::from_services(self)
    }
}
