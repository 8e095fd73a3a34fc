//! LLM client with an ordered provider chain
//!
//! Each query walks the chain once: the first provider that answers wins and
//! there are no retries. With the default chain (local HTTP model, then the
//! fallback responder) a query always produces a reply.

use super::config::LlmConfig;
use super::providers::{CompletionProvider, FallbackResponder, HttpCompletionProvider};
use super::response::{LlmRequest, LlmResponse, ProviderKind, ProviderState};
use crate::utils::Broadcast;
use crate::{JarvisError, Result};
use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

pub struct LlmClient {
    providers: Vec<Box<dyn CompletionProvider>>,
    /// Used for the startup health probe
    health: Option<HttpCompletionProvider>,
    state: Broadcast<ProviderState>,
}

impl LlmClient {
    /// Local HTTP provider followed by the fallback responder
    pub fn new(config: LlmConfig) -> Result<Self> {
        let local = HttpCompletionProvider::new(config.clone())?;
        let health = HttpCompletionProvider::new(config)?;

        Ok(Self {
            providers: vec![Box::new(local), Box::new(FallbackResponder)],
            health: Some(health),
            state: Broadcast::default(),
        })
    }

    /// Client over an explicit provider chain, with no health probe
    pub fn with_providers(providers: Vec<Box<dyn CompletionProvider>>) -> Self {
        Self {
            providers,
            health: None,
            state: Broadcast::default(),
        }
    }

    /// Client that only uses the fallback responder
    pub fn offline() -> Self {
        Self::with_providers(vec![Box::new(FallbackResponder)])
    }

    /// Ask the provider chain for a completion
    pub async fn query(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let mut last_error = None;

        for provider in &self.providers {
            let kind = provider.kind();
            match provider.complete(request).await {
                Ok(response) => {
                    debug!("{} provider answered ({} chars)", kind, response.text.len());
                    self.state.publish(ProviderState {
                        connected: kind != ProviderKind::Fallback,
                        active_provider: kind,
                    });
                    return Ok(response);
                }
                Err(e) => {
                    warn!("{} provider unavailable: {}", kind, e);
                    last_error = Some(e);
                }
            }
        }

        self.state.publish(ProviderState {
            connected: false,
            active_provider: ProviderKind::Fallback,
        });
        Err(match last_error {
            Some(e) => JarvisError::Llm(format!("All providers failed, last error: {}", e)),
            None => JarvisError::Llm("No providers configured".to_string()),
        })
    }

    /// Probe the local endpoint once and seed the provider state
    ///
    /// The outcome is informational only; later queries still try every provider.
    pub async fn probe(&self) -> ProviderState {
        let state = match &self.health {
            Some(provider) => match provider.check_health().await {
                Ok(()) => {
                    info!("Local LLM reachable");
                    ProviderState {
                        connected: true,
                        active_provider: ProviderKind::Local,
                    }
                }
                Err(e) => {
                    info!("Local LLM not reachable, using fallback replies: {}", e);
                    ProviderState {
                        connected: false,
                        active_provider: ProviderKind::Fallback,
                    }
                }
            },
            None => ProviderState::default(),
        };

        self.state.publish(state);
        state
    }

    pub fn provider_state(&self) -> ProviderState {
        self.state.get()
    }

    pub fn subscribe(&self) -> Receiver<ProviderState> {
        self.state.subscribe()
    }

    /// Provider kinds in the order they are tried
    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }
}
