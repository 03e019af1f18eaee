use anyhow::{anyhow, Result};
use wasmtime::{Caller, Linker};

use super::ScriptState;
use cinnamon_core::{log, LogLevel};

/// Module name scripts import host functions from
pub const HOST_MODULE: &str = "cinnamon";

/// Add WASI and the `cinnamon` host functions to the linker
pub fn add_host_imports(linker: &mut Linker<ScriptState>) -> Result<()> {
    wasmtime_wasi::preview1::add_to_linker_sync(linker, |state| &mut state.wasi)?;

    // log(level, ptr, len): `level` indexes DEBUG..CRITICAL
    linker.func_wrap(
        HOST_MODULE,
        "log",
        |mut caller: Caller<'_, ScriptState>, level: i32, ptr: i32, len: i32| -> Result<()> {
            let memory = caller
                .get_export("memory")
                .and_then(|export| export.into_memory())
                .ok_or_else(|| anyhow!("script does not export its memory"))?;
            let message = read_guest_str(memory.data(&caller), ptr, len)?;
            log(level_from_guest(level), message);
            Ok(())
        },
    )?;

    Ok(())
}

/// Out-of-range levels are treated as CRITICAL
fn level_from_guest(level: i32) -> LogLevel {
    u8::try_from(level)
        .ok()
        .and_then(LogLevel::from_index)
        .unwrap_or(LogLevel::Critical)
}

fn read_guest_str(memory: &[u8], ptr: i32, len: i32) -> Result<String> {
    // Guest pointers are unsigned 32-bit offsets
    let start = ptr as u32 as usize;
    let end = start
        .checked_add(len as u32 as usize)
        .ok_or_else(|| anyhow!("guest string overflows address space"))?;
    let bytes = memory
        .get(start..end)
        .ok_or_else(|| anyhow!("guest string {}..{} is out of bounds", start, end))?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
