//! Process-wide initialization.
//!
//! Metadata is registered once at startup with [`install`]; afterwards
//! [`Wrapper::global`] builds wrappers against it without threading a
//! registry reference through the application.

use std::sync::OnceLock;

use crate::config::JoinConfig;
use crate::error::{JoinError, Result};
use crate::function::FunctionRegistry;
use crate::metadata::{Entity, Registry};
use crate::wrapper::Wrapper;

/// Metadata, functions and configuration shared by every global wrapper.
#[derive(Debug)]
pub struct Runtime {
    registry: Registry,
    functions: FunctionRegistry,
    config: JoinConfig,
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

impl Runtime {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            functions: FunctionRegistry::with_defaults(),
            config: JoinConfig::default(),
        }
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_config(mut self, config: JoinConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// A wrapper driven by `E` against this runtime.
    pub fn wrapper<E: Entity>(&self) -> Result<Wrapper<'_>> {
        Wrapper::new::<E>(&self.registry)?
            .with_functions(&self.functions)
            .with_config(self.config.clone())
    }
}

/// Installs `registry` with the default configuration.
pub fn install(registry: Registry) -> Result<&'static Runtime> {
    install_runtime(Runtime::new(registry))
}

pub fn install_with(registry: Registry, config: JoinConfig) -> Result<&'static Runtime> {
    install_runtime(Runtime::new(registry).with_config(config))
}

/// Installs `runtime` process-wide; a second installation fails.
pub fn install_runtime(runtime: Runtime) -> Result<&'static Runtime> {
    runtime.config.validate()?;
    RUNTIME
        .set(runtime)
        .map_err(|_| JoinError::Bootstrap("joinwise runtime is already installed".into()))?;
    self::runtime()
}

/// The installed runtime.
pub fn runtime() -> Result<&'static Runtime> {
    RUNTIME
        .get()
        .ok_or_else(|| JoinError::Bootstrap("joinwise runtime is not installed; call `install` at startup".into()))
}

impl Wrapper<'static> {
    /// A wrapper driven by `E` against the installed runtime.
    pub fn global<E: Entity>() -> Result<Self> {
        runtime()?.wrapper::<E>()
    }
}
