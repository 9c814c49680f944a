//! Per-thread recovery-boundary registry.
//!
//! Every assertion call reads this registry; boundary entry and exit are the
//! only writers. The lock is a `parking_lot::RwLock` held for single map
//! operations — reads vastly outnumber writes, and neither path blocks on
//! anything while holding it.
//!
//! Ownership protocol: the first (outermost) boundary entered on a thread
//! registers that thread and owns the entry; nested boundaries observe the
//! existing registration and are non-owning. Only the owning boundary's exit
//! unregisters the thread.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::marker::PhantomData;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::RwLock;

/// What a raise does when no recovery boundary is registered on its thread.
///
/// Silent continuation is not an option by design: an unobserved raised
/// error either stops the process or parks the thread for external
/// observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnhandledRaise {
    /// Report the error and abort the process.
    #[default]
    Terminate,
    /// Report the error and park the raising thread indefinitely, pending a
    /// debugger or supervisor.
    Block,
}

/// Registry of threads that currently have a recovery boundary installed.
#[derive(Debug)]
pub struct BoundaryRegistry {
    owners: RwLock<HashMap<ThreadId, u64>>,
    next_token: AtomicU64,
    policy: RwLock<UnhandledRaise>,
}

impl BoundaryRegistry {
    /// Empty registry with the default [`UnhandledRaise`] policy.
    pub fn new() -> Self {
        Self {
            owners: RwLock::new(HashMap::new()),
            next_token: AtomicU64::new(1),
            policy: RwLock::new(UnhandledRaise::default()),
        }
    }

    /// The process-wide registry used by the bridge.
    pub fn global() -> &'static BoundaryRegistry {
        static GLOBAL: OnceLock<BoundaryRegistry> = OnceLock::new();
        GLOBAL.get_or_init(BoundaryRegistry::new)
    }

    /// Enter a boundary on the current thread.
    ///
    /// The returned guard unregisters the thread on drop iff this entry was
    /// the outermost one.
    pub fn enter(&self) -> BoundaryGuard<'_> {
        let thread = thread::current().id();
        let mut owners = self.owners.write();
        match owners.entry(thread) {
            Entry::Vacant(slot) => {
                let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                slot.insert(token);
                BoundaryGuard {
                    registry: self,
                    thread,
                    token: Some(token),
                    _not_send: PhantomData,
                }
            }
            Entry::Occupied(_) => BoundaryGuard {
                registry: self,
                thread,
                token: None,
                _not_send: PhantomData,
            },
        }
    }

    /// True when the current thread has a boundary registered.
    pub fn is_registered(&self) -> bool {
        self.owners.read().contains_key(&thread::current().id())
    }

    fn exit(&self, thread: ThreadId, token: u64) {
        let mut owners = self.owners.write();
        if owners.get(&thread) == Some(&token) {
            owners.remove(&thread);
        }
    }

    /// The policy applied when a raise finds no boundary.
    pub fn policy(&self) -> UnhandledRaise {
        *self.policy.read()
    }

    /// Set the unhandled-raise policy.
    pub fn set_policy(&self, policy: UnhandledRaise) {
        *self.policy.write() = policy;
    }

    /// Drop all registrations. Test-isolation hook.
    pub fn reset(&self) {
        self.owners.write().clear();
        *self.policy.write() = UnhandledRaise::default();
    }
}

impl Default for BoundaryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle for one boundary entry.
///
/// Tied to the thread it was created on (`!Send`): moving it elsewhere would
/// unregister the wrong thread.
#[derive(Debug)]
pub struct BoundaryGuard<'a> {
    registry: &'a BoundaryRegistry,
    thread: ThreadId,
    token: Option<u64>,
    _not_send: PhantomData<*const ()>,
}

impl BoundaryGuard<'_> {
    /// True for the outermost boundary on this thread.
    pub fn is_owner(&self) -> bool {
        self.token.is_some()
    }
}

impl Drop for BoundaryGuard<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token {
            self.registry.exit(self.thread, token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outermost_entry_owns_the_registration() {
        let registry = BoundaryRegistry::new();
        assert!(!registry.is_registered());

        let outer = registry.enter();
        assert!(outer.is_owner());
        assert!(registry.is_registered());

        let inner = registry.enter();
        assert!(!inner.is_owner());

        drop(inner);
        assert!(registry.is_registered(), "inner exit must not unregister");

        drop(outer);
        assert!(!registry.is_registered());
    }

    #[test]
    fn registration_is_per_thread() {
        let registry = BoundaryRegistry::global();
        let _guard = registry.enter();
        let other = std::thread::spawn(|| BoundaryRegistry::global().is_registered())
            .join()
            .unwrap();
        assert!(!other, "another thread must not observe this registration");
    }

    #[test]
    fn policy_round_trips() {
        let registry = BoundaryRegistry::new();
        assert_eq!(registry.policy(), UnhandledRaise::Terminate);
        registry.set_policy(UnhandledRaise::Block);
        assert_eq!(registry.policy(), UnhandledRaise::Block);
        registry.reset();
        assert_eq!(registry.policy(), UnhandledRaise::Terminate);
    }
}
