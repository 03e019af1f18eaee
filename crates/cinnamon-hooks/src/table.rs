use std::collections::HashMap;

use crate::{Address, HookBackend, HookStatus};

#[derive(Debug, Clone, Copy)]
struct TableEntry {
    detour: Address,
    enabled: bool,
}

/// Backend for hosts that call through a dispatch table: hooks are recorded
/// and [`TableBackend::resolve`] tells the caller where a call should go.
/// The original function stays reachable at its own address.
#[derive(Debug, Default)]
pub struct TableBackend {
    initialized: bool,
    entries: HashMap<Address, TableEntry>,
}

impl TableBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address a call to `target` should be routed to
    pub fn resolve(&self, target: Address) -> Address {
        match self.entries.get(&target) {
            Some(entry) if entry.enabled => entry.detour,
            _ => target,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HookBackend for TableBackend {
    fn initialize(&mut self) -> HookStatus {
        if self.initialized {
            return HookStatus::AlreadyInitialized;
        }
        self.initialized = true;
        HookStatus::Ok
    }

    fn create_hook(&mut self, target: Address, detour: Address) -> (Option<Address>, HookStatus) {
        if !self.initialized {
            return (None, HookStatus::NotInitialized);
        }
        if target == 0 || detour == 0 {
            return (None, HookStatus::NotExecutable);
        }
        if self.entries.contains_key(&target) {
            return (None, HookStatus::AlreadyCreated);
        }

        self.entries.insert(
            target,
            TableEntry {
                detour,
                enabled: false,
            },
        );
        (Some(target), HookStatus::Ok)
    }

    fn enable_hook(&mut self, target: Address) -> HookStatus {
        self.toggle(target, true)
    }

    fn disable_hook(&mut self, target: Address) -> HookStatus {
        self.toggle(target, false)
    }

    fn remove_hook(&mut self, target: Address) -> HookStatus {
        if !self.initialized {
            return HookStatus::NotInitialized;
        }
        match self.entries.remove(&target) {
            Some(_) => HookStatus::Ok,
            None => HookStatus::NotCreated,
        }
    }
}

impl TableBackend {
    fn toggle(&mut self, target: Address, enable: bool) -> HookStatus {
        if !self.initialized {
            return HookStatus::NotInitialized;
        }
        let Some(entry) = self.entries.get_mut(&target) else {
            return HookStatus::NotCreated;
        };
        match (entry.enabled, enable) {
            (true, true) => HookStatus::Enabled,
            (false, false) => HookStatus::Disabled,
            _ => {
                entry.enabled = enable;
                HookStatus::Ok
            }
        }
    }
}
