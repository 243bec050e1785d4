//! Backend session lifecycle
//!
//! A session is an explicit context object owned by its caller rather than
//! process-wide state. It moves `Unloaded -> Loading -> Loaded -> Unloaded`;
//! a failed load lands back in `Unloaded`.

use crate::aggregator::RatingOptions;
use crate::backend::{create_backend, Provider, ReasoningBackend};
use crate::config::CompassConfig;
use crate::error::{CompassError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  Unloaded,
  Loading,
  Loaded,
}

struct LoadedBackend {
  provider: Provider,
  backend: Box<dyn ReasoningBackend>,
  options: RatingOptions,
}

pub struct BackendSession {
  state: SessionState,
  loaded: Option<LoadedBackend>,
}

impl Default for BackendSession {
  fn default() -> Self {
    Self::new()
  }
}

impl BackendSession {
  pub fn new() -> Self {
    Self { state: SessionState::Unloaded, loaded: None }
  }

  pub fn state(&self) -> SessionState {
    self.state
  }

  pub fn is_loaded(&self) -> bool {
    self.state == SessionState::Loaded
  }

  pub fn provider(&self) -> Option<Provider> {
    self.loaded.as_ref().map(|loaded| loaded.provider)
  }

  /// Resolve `provider` and construct its backend. Any previously loaded
  /// backend is released first.
  pub fn load(
    &mut self,
    provider: &str,
    config: &CompassConfig,
    api_key: Option<String>,
  ) -> Result<()> {
    self.unload();
    self.state = SessionState::Loading;

    let result = provider.parse::<Provider>().and_then(|provider| {
      let settings = config.backend(provider);
      let backend = create_backend(provider, settings, config.scale, api_key)?;
      Ok((provider, backend))
    });

    match result {
      Ok((provider, backend)) => {
        let options = RatingOptions::for_provider(config, provider);
        self.install(provider, backend, options);
        Ok(())
      }
      Err(e) => {
        tracing::warn!("Failed to load backend '{provider}': {e}");
        self.state = SessionState::Unloaded;
        Err(e)
      }
    }
  }

  /// Load an already constructed backend
  pub fn load_with(
    &mut self,
    provider: Provider,
    backend: Box<dyn ReasoningBackend>,
    options: RatingOptions,
  ) {
    self.unload();
    self.state = SessionState::Loading;
    self.install(provider, backend, options);
  }

  fn install(&mut self, provider: Provider, backend: Box<dyn ReasoningBackend>, options: RatingOptions) {
    tracing::info!("Loaded {provider} backend (max_chars={})", options.max_chars);
    self.loaded = Some(LoadedBackend { provider, backend, options });
    self.state = SessionState::Loaded;
  }

  /// Release the backend; always succeeds
  pub fn unload(&mut self) {
    if let Some(loaded) = self.loaded.take() {
      tracing::info!("Unloaded {} backend", loaded.provider);
    }
    self.state = SessionState::Unloaded;
  }

  pub fn backend(&self) -> Result<&dyn ReasoningBackend> {
    self.loaded().map(|loaded| loaded.backend.as_ref())
  }

  pub fn rating_options(&self) -> Result<&RatingOptions> {
    self.loaded().map(|loaded| &loaded.options)
  }

  fn loaded(&self) -> Result<&LoadedBackend> {
    match (&self.state, &self.loaded) {
      (SessionState::Loaded, Some(loaded)) => Ok(loaded),
      _ => Err(CompassError::ModelNotLoaded),
    }
  }
}
