use strum_macros::Display;

/// Status codes reported by a hooking backend, displayed with the names
/// MinHook-style installers print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HookStatus {
    #[strum(serialize = "MH_UNKNOWN")]
    Unknown,
    #[strum(serialize = "MH_OK")]
    Ok,
    #[strum(serialize = "MH_ERROR_ALREADY_INITIALIZED")]
    AlreadyInitialized,
    #[strum(serialize = "MH_ERROR_NOT_INITIALIZED")]
    NotInitialized,
    #[strum(serialize = "MH_ERROR_ALREADY_CREATED")]
    AlreadyCreated,
    #[strum(serialize = "MH_ERROR_NOT_CREATED")]
    NotCreated,
    #[strum(serialize = "MH_ERROR_ENABLED")]
    Enabled,
    #[strum(serialize = "MH_ERROR_DISABLED")]
    Disabled,
    #[strum(serialize = "MH_ERROR_NOT_EXECUTABLE")]
    NotExecutable,
    #[strum(serialize = "MH_ERROR_UNSUPPORTED_FUNCTION")]
    UnsupportedFunction,
    #[strum(serialize = "MH_ERROR_MEMORY_ALLOC")]
    MemoryAlloc,
    #[strum(serialize = "MH_ERROR_MEMORY_PROTECT")]
    MemoryProtect,
    #[strum(serialize = "MH_ERROR_MODULE_NOT_FOUND")]
    ModuleNotFound,
    #[strum(serialize = "MH_ERROR_FUNCTION_NOT_FOUND")]
    FunctionNotFound,
}

impl HookStatus {
    pub fn is_ok(self) -> bool {
        self == HookStatus::Ok
    }
}
