use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{CaseError, Result};

/// Puts the provider into a named state before an example is replayed.
pub trait StateSetup: Send + Sync {
    fn setup(&self) -> Result<()>;
}

impl<F> StateSetup for F
where
    F: Fn() -> Result<()> + Send + Sync,
{
    fn setup(&self) -> Result<()> {
        self()
    }
}

/// Thread-safe registry of state setups, keyed by state name.
#[derive(Clone, Default)]
pub struct StateSetups {
    inner: Arc<HashMap<String, Arc<dyn StateSetup>>>,
}

impl StateSetups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: StateSetup + 'static>(&mut self, name: impl Into<String>, setup: S) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(name.into(), Arc::new(setup));
    }

    /// Builder form of [`StateSetups::register`].
    pub fn with<S: StateSetup + 'static>(mut self, name: impl Into<String>, setup: S) -> Self {
        self.register(name, setup);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn StateSetup>> {
        self.inner.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Runs the setup for `name`.
    pub fn run(&self, name: &str) -> Result<()> {
        match self.get(name) {
            Some(setup) => setup.setup(),
            None => Err(CaseError::Configuration(format!(
                "No state setup registered for '{name}'"
            ))),
        }
    }
}

/// Names a provider state an example depends on.
pub fn in_state(name: impl Into<String>) -> String {
    name.into()
}
