//! Hook installation.
//!
//! The actual code patching is done by a [`HookBackend`]. [`HookInstaller`]
//! wraps a backend, logs every request and its status through the sink, and
//! keeps track of what has been installed. Failures are reported as a
//! [`HookStatus`], never as an error.

mod status;
mod table;

use cinnamon_core::{log, LogLevel};
use tracing::debug;

pub use status::HookStatus;
pub use table::TableBackend;

/// Address of a function in the host process
pub type Address = usize;

/// Something that can redirect calls from a target function to a detour.
pub trait HookBackend {
    fn initialize(&mut self) -> HookStatus;

    /// Prepare a hook. Returns the address to call to reach the original
    /// function, when the backend produced one.
    fn create_hook(&mut self, target: Address, detour: Address) -> (Option<Address>, HookStatus);

    fn enable_hook(&mut self, target: Address) -> HookStatus;

    fn disable_hook(&mut self, target: Address) -> HookStatus;

    fn remove_hook(&mut self, target: Address) -> HookStatus;
}

/// Result of [`HookInstaller::hook`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookOutcome {
    pub original: Option<Address>,
    pub status: HookStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstalledHook {
    pub target: Address,
    pub detour: Address,
    pub original: Option<Address>,
    pub enabled: bool,
}

pub struct HookInstaller<B: HookBackend> {
    backend: B,
    installed: Vec<InstalledHook>,
}

impl<B: HookBackend> HookInstaller<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            installed: Vec::new(),
        }
    }

    pub fn initialize(&mut self) -> HookStatus {
        let status = self.backend.initialize();
        debug!(target: "cinnamon::hooks", "Hook backend initialized with status {}", status);
        status
    }

    /// Create a hook redirecting `target` to `detour`.
    pub fn hook(&mut self, target: Address, detour: Address) -> HookOutcome {
        log(
            LogLevel::Debug,
            format_args!("Hooking {:#x}: {}", target, target),
        );
        let (original, status) = self.backend.create_hook(target, detour);
        log(
            LogLevel::Debug,
            format_args!("Hooked {:#x} with status {}", target, status),
        );

        if status.is_ok() {
            self.installed.push(InstalledHook {
                target,
                detour,
                original,
                enabled: false,
            });
        }

        HookOutcome { original, status }
    }

    pub fn enable(&mut self, target: Address) -> HookStatus {
        let status = self.backend.enable_hook(target);
        if status.is_ok() {
            self.set_enabled(target, true);
        }
        debug!(target: "cinnamon::hooks", "Enable {:#x}: {}", target, status);
        status
    }

    pub fn disable(&mut self, target: Address) -> HookStatus {
        let status = self.backend.disable_hook(target);
        if status.is_ok() {
            self.set_enabled(target, false);
        }
        debug!(target: "cinnamon::hooks", "Disable {:#x}: {}", target, status);
        status
    }

    /// Enable every created hook that is not enabled yet. Returns how many were enabled.
    pub fn enable_all(&mut self) -> usize {
        let pending: Vec<Address> = self
            .installed
            .iter()
            .filter(|hook| !hook.enabled)
            .map(|hook| hook.target)
            .collect();

        pending
            .into_iter()
            .filter(|&target| self.enable(target).is_ok())
            .count()
    }

    pub fn remove(&mut self, target: Address) -> HookStatus {
        let status = self.backend.remove_hook(target);
        if status.is_ok() {
            self.installed.retain(|hook| hook.target != target);
        }
        debug!(target: "cinnamon::hooks", "Remove {:#x}: {}", target, status);
        status
    }

    pub fn installed(&self) -> &[InstalledHook] {
        &self.installed
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn set_enabled(&mut self, target: Address, enabled: bool) {
        if let Some(hook) = self.installed.iter_mut().find(|hook| hook.target == target) {
            hook.enabled = enabled;
        }
    }
}
