/// Embedded WASM script runtime
///
/// Owns a single wasmtime engine for the lifetime of the application. All
/// calls into scripts must happen on the thread that owns the frame loop;
/// other threads only pass around [`ScriptFunction`] handles and script paths.
use std::fmt;
use std::path::PathBuf;

pub mod reload;
pub mod wasm;

pub use reload::{setup_reload_signal, ReloadSignal};
pub use wasm::{ScriptRuntime, ScriptState};

/// Identifies a module loaded into a [`ScriptRuntime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub(crate) usize);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// Handle to a zero-argument function exported by a loaded module.
///
/// Handles are plain data and can be sent to other threads; they are only
/// resolved when the runtime calls them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptFunction {
    module: ModuleId,
    export: String,
}

impl ScriptFunction {
    pub fn new(module: ModuleId, export: impl Into<String>) -> Self {
        Self {
            module,
            export: export.into(),
        }
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn export(&self) -> &str {
        &self.export
    }
}

impl fmt::Display for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.export)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to load script {name}: {message}")]
    Load { name: String, message: String },
    #[error("unknown script module {0}")]
    UnknownModule(ModuleId),
    #[error("{module} has no `() -> ()` export named '{export}'")]
    MissingExport { module: String, export: String },
    #[error("{} exports neither '{entry_point}' nor 'run'", .path.display())]
    MissingEntryPoint { path: PathBuf, entry_point: String },
    #[error("script function '{export}' failed: {message}")]
    Trap { export: String, message: String },
}

impl ScriptError {
    pub(crate) fn trap(export: &str, error: anyhow::Error) -> Self {
        ScriptError::Trap {
            export: export.to_string(),
            message: format!("{:#}", error),
        }
    }
}
