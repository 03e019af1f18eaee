use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};
use wasmtime::{Engine, Instance, Linker, Module, Store};

use super::bindings::add_host_imports;
use super::{create_engine, ScriptState};
use crate::{ModuleId, ScriptError, ScriptFunction};
use cinnamon_core::config::ScriptingConfig;

/// Export tried when the configured entry point is missing
const FALLBACK_ENTRY_POINT: &str = "run";

struct LoadedModule {
    name: String,
    instance: Instance,
}

/// The process-wide script interpreter.
///
/// Created once at start-up and torn down with [`ScriptRuntime::shutdown`].
/// Modules loaded with `load_module*` live in one long-lived store and keep
/// their state between calls; script files run through [`ScriptRuntime::run_file`]
/// get a fresh store each time.
pub struct ScriptRuntime {
    engine: Engine,
    linker: Linker<ScriptState>,
    store: Store<ScriptState>,
    modules: Vec<LoadedModule>,
    /// Compiled script files, keyed by path
    file_cache: HashMap<PathBuf, Module>,
    config: ScriptingConfig,
}

impl ScriptRuntime {
    pub fn new(config: &ScriptingConfig) -> anyhow::Result<Self> {
        let engine = create_engine()?;
        let mut linker = Linker::new(&engine);
        add_host_imports(&mut linker).context("Failed to register host functions")?;

        let state = ScriptState::new(config.data_dir.as_deref())?;
        let store = Store::new(&engine, state);

        debug!(target: "cinnamon::scripting", "Script runtime initialized");

        Ok(Self {
            engine,
            linker,
            store,
            modules: Vec::new(),
            file_cache: HashMap::new(),
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ScriptingConfig {
        &self.config
    }

    /// Resolve a script path against the configured script directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.config.resolve_script(path)
    }

    /// Compile and instantiate a script file, keeping the instance alive
    pub fn load_module(&mut self, path: &Path) -> Result<ModuleId, ScriptError> {
        let path = self.resolve_path(path);
        let module = Module::from_file(&self.engine, &path).map_err(|e| ScriptError::Load {
            name: path.display().to_string(),
            message: format!("{:#}", e),
        })?;
        self.instantiate(path.display().to_string(), &module)
    }

    /// Compile and instantiate a module from WASM bytes or WAT text
    pub fn load_module_source(
        &mut self,
        name: &str,
        source: impl AsRef<[u8]>,
    ) -> Result<ModuleId, ScriptError> {
        let module = Module::new(&self.engine, source).map_err(|e| ScriptError::Load {
            name: name.to_string(),
            message: format!("{:#}", e),
        })?;
        self.instantiate(name.to_string(), &module)
    }

    fn instantiate(&mut self, name: String, module: &Module) -> Result<ModuleId, ScriptError> {
        let instance = self
            .linker
            .instantiate(&mut self.store, module)
            .map_err(|e| ScriptError::Load {
                name: name.clone(),
                message: format!("{:#}", e),
            })?;

        let id = ModuleId(self.modules.len());
        info!(target: "cinnamon::scripting", "Loaded script module {} as {}", name, id);
        self.modules.push(LoadedModule { name, instance });
        Ok(id)
    }

    /// Look up a `() -> ()` export of a loaded module
    pub fn function(
        &mut self,
        module: ModuleId,
        export: &str,
    ) -> Result<ScriptFunction, ScriptError> {
        let loaded = self
            .modules
            .get(module.0)
            .ok_or(ScriptError::UnknownModule(module))?;

        loaded
            .instance
            .get_typed_func::<(), ()>(&mut self.store, export)
            .map_err(|_| ScriptError::MissingExport {
                module: loaded.name.clone(),
                export: export.to_string(),
            })?;

        Ok(ScriptFunction::new(module, export))
    }

    /// Call a scripted function with no arguments
    pub fn call(&mut self, function: &ScriptFunction) -> Result<(), ScriptError> {
        let loaded = self
            .modules
            .get(function.module().0)
            .ok_or(ScriptError::UnknownModule(function.module()))?;

        let func = loaded
            .instance
            .get_typed_func::<(), ()>(&mut self.store, function.export())
            .map_err(|_| ScriptError::MissingExport {
                module: loaded.name.clone(),
                export: function.export().to_string(),
            })?;

        debug!(target: "cinnamon::scripting", "Calling {}::{}", loaded.name, function.export());

        func.call(&mut self.store, ())
            .map_err(|e| ScriptError::trap(function.export(), e))
    }

    /// Load the script file at `path` and run its entry point.
    ///
    /// The entry point is the configured export (`_start` by default), falling
    /// back to `run`. A WASI `proc_exit(0)` counts as success.
    pub fn run_file(&mut self, path: &Path) -> Result<(), ScriptError> {
        let path = self.resolve_path(path);
        let module = match self.file_cache.get(&path) {
            Some(module) => module.clone(),
            None => {
                let module =
                    Module::from_file(&self.engine, &path).map_err(|e| ScriptError::Load {
                        name: path.display().to_string(),
                        message: format!("{:#}", e),
                    })?;
                self.file_cache.insert(path.clone(), module.clone());
                module
            }
        };

        let state = ScriptState::new(self.config.data_dir.as_deref()).map_err(|e| {
            ScriptError::Load {
                name: path.display().to_string(),
                message: format!("{:#}", e),
            }
        })?;
        let mut store = Store::new(&self.engine, state);

        let instance = self
            .linker
            .instantiate(&mut store, &module)
            .map_err(|e| ScriptError::Load {
                name: path.display().to_string(),
                message: format!("{:#}", e),
            })?;

        let entry_point = self.config.entry_point.as_str();
        let (export, func) = match instance.get_typed_func::<(), ()>(&mut store, entry_point) {
            Ok(func) => (entry_point, func),
            Err(_) => instance
                .get_typed_func::<(), ()>(&mut store, FALLBACK_ENTRY_POINT)
                .map(|func| (FALLBACK_ENTRY_POINT, func))
                .map_err(|_| ScriptError::MissingEntryPoint {
                    path: path.clone(),
                    entry_point: entry_point.to_string(),
                })?,
        };

        debug!(target: "cinnamon::scripting", "Running {} ({})", path.display(), export);

        match func.call(&mut store, ()) {
            Ok(()) => Ok(()),
            Err(e) => match e.downcast_ref::<wasmtime_wasi::I32Exit>() {
                Some(exit) if exit.0 == 0 => Ok(()),
                _ => Err(ScriptError::trap(export, e)),
            },
        }
    }

    /// Read an exported i32 global of a loaded module
    pub fn global_i32(&mut self, module: ModuleId, name: &str) -> Option<i32> {
        let loaded = self.modules.get(module.0)?;
        let global = loaded.instance.get_global(&mut self.store, name)?;
        global.get(&mut self.store).i32()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Forget compiled script files so the next run recompiles them
    pub fn clear_cache(&mut self) {
        debug!(
            target: "cinnamon::scripting",
            "Dropping {} compiled script file(s)",
            self.file_cache.len()
        );
        self.file_cache.clear();
    }

    /// Tear down the interpreter and everything loaded into it
    pub fn shutdown(self) {
        info!(
            target: "cinnamon::scripting",
            "Shutting down script runtime ({} module(s) loaded)",
            self.modules.len()
        );
    }
}
