pub(crate) mod bindings;
mod engine;
mod runtime;

pub use engine::{create_engine, create_wasi_context, ScriptState};
pub use runtime::ScriptRuntime;
