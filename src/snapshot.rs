//! The published enumeration result: a single-writer, many-reader snapshot
//! the console commands read from.
//!
//! Guarded by a [`spin::Mutex`], following the same "cheap global lock around
//! a plain struct" shape the framebuffer backend uses for its own published
//! state. Contention is not a real concern here — one orchestrator pass
//! writes, console commands read — but the lock keeps the access pattern
//! uniform with the rest of the codebase rather than reaching for unsafe
//! statics.

use crate::constants::{MAX_IRQ_BINDINGS, MAX_TILES, MAX_WINDOW_BINDINGS};
use crate::descriptors::{BankDescriptor, CpuDescriptor, PeripheralDescriptor};
use crate::irq_map::IrqBinding;
use crate::reason::EnumReason;
use crate::window_map::DecodeBinding;
use spin::Mutex;

/// The full published result of one enumeration attempt.
#[derive(Debug, Clone)]
pub struct EnumerationSnapshot {
    pub reason: EnumReason,
    pub cpu: Option<CpuDescriptor>,
    pub bank: Option<BankDescriptor>,
    pub tiles: [Option<PeripheralDescriptor>; MAX_TILES],
    pub windows: Vec<DecodeBinding>,
    pub irqs: Vec<IrqBinding>,
}

impl EnumerationSnapshot {
    fn empty() -> Self {
        EnumerationSnapshot {
            reason: EnumReason::default(),
            cpu: None,
            bank: None,
            tiles: [None, None, None, None, None],
            windows: Vec::new(),
            irqs: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        !self.reason.is_failure()
    }
}

/// Process-wide store for the most recent enumeration snapshot.
pub struct SnapshotStore {
    inner: Mutex<EnumerationSnapshot>,
}

impl SnapshotStore {
    pub const fn new() -> Self {
        SnapshotStore {
            inner: Mutex::new(EnumerationSnapshot {
                reason: EnumReason::UnknownFail,
                cpu: None,
                bank: None,
                tiles: [None, None, None, None, None],
                windows: Vec::new(),
                irqs: Vec::new(),
            }),
        }
    }

    /// Clears the snapshot back to its pre-boot state, reason `UnknownFail`.
    pub fn reset(&self) {
        *self.inner.lock() = EnumerationSnapshot::empty();
    }

    /// Records a failure reason without touching any other field. Distinct
    /// from [`SnapshotStore::reset`], which the orchestrator calls once at
    /// the start of each pass: `set_failure` only ever runs after that reset,
    /// so a failing step leaves the descriptor and binding fields exactly as
    /// last observed (unset on a fresh run, or whatever a prior caller wrote
    /// directly, for callers outside the orchestrator's own reset/fail
    /// sequence) rather than wiping them a second time.
    pub fn set_failure(&self, reason: EnumReason) {
        self.inner.lock().reason = reason;
    }

    /// Publishes a complete successful enumeration, clamping each table to
    /// the snapshot's fixed capacity.
    pub fn publish(
        &self,
        cpu: CpuDescriptor,
        bank: BankDescriptor,
        tiles: [Option<PeripheralDescriptor>; MAX_TILES],
        mut windows: Vec<DecodeBinding>,
        mut irqs: Vec<IrqBinding>,
    ) {
        windows.truncate(MAX_WINDOW_BINDINGS);
        irqs.truncate(MAX_IRQ_BINDINGS);
        let mut guard = self.inner.lock();
        *guard = EnumerationSnapshot {
            reason: EnumReason::Ok,
            cpu: Some(cpu),
            bank: Some(bank),
            tiles,
            windows,
            irqs,
        };
    }

    /// Takes a consistent point-in-time copy for a console command to read.
    pub fn read(&self) -> EnumerationSnapshot {
        self.inner.lock().clone()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_reports_unknown_fail() {
        let store = SnapshotStore::new();
        assert_eq!(store.read().reason, EnumReason::UnknownFail);
    }

    #[test]
    fn set_failure_leaves_prior_published_data_untouched() {
        let store = SnapshotStore::new();
        store.publish(
            CpuDescriptor::default(),
            BankDescriptor::default(),
            [None, None, None, None, None],
            vec![],
            vec![],
        );
        store.set_failure(EnumReason::RouteMissing);
        let snap = store.read();
        assert_eq!(snap.reason, EnumReason::RouteMissing);
        assert!(snap.cpu.is_some());
        assert!(snap.bank.is_some());
    }

    #[test]
    fn publish_marks_success() {
        let store = SnapshotStore::new();
        store.publish(
            CpuDescriptor::default(),
            BankDescriptor::default(),
            [None, None, None, None, None],
            vec![],
            vec![],
        );
        assert!(store.read().succeeded());
    }
}
