use anyhow::{Context, Result};
use std::path::Path;
use wasmtime::{Config, Engine};
use wasmtime_wasi::preview1::WasiP1Ctx;
use wasmtime_wasi::{DirPerms, FilePerms, WasiCtxBuilder};

/// Guest path the configured script data directory is mounted at
pub const SCRIPT_DATA_GUEST_PATH: &str = "/script_data";

/// Per-store host state
pub struct ScriptState {
    pub(crate) wasi: WasiP1Ctx,
}

impl ScriptState {
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        Ok(Self {
            wasi: create_wasi_context(data_dir)?,
        })
    }
}

/// Create a configured Wasmtime engine for script execution
pub fn create_engine() -> Result<Engine> {
    let mut config = Config::new();

    // Scripts run synchronously on the main thread
    config.async_support(false);

    #[cfg(not(debug_assertions))]
    {
        config.cranelift_opt_level(wasmtime::OptLevel::Speed);
    }

    Engine::new(&config).context("Failed to create Wasmtime engine")
}

/// Create a WASI preview1 context, pre-opening `data_dir` as `/script_data`
pub fn create_wasi_context(data_dir: Option<&Path>) -> Result<WasiP1Ctx> {
    let mut builder = WasiCtxBuilder::new();
    builder.inherit_stdio();

    if let Some(dir) = data_dir {
        std::fs::create_dir_all(dir).context("Failed to create script_data directory")?;
        builder.preopened_dir(dir, SCRIPT_DATA_GUEST_PATH, DirPerms::all(), FilePerms::all())?;
    }

    Ok(builder.build_p1())
}
