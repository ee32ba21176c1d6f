//! Boot-time platform enumerator for the uBITz modular retro-computing dock.
//!
//! On every boot the dock's control MCU reads a CPU card's self-description,
//! a memory-bank card's self-description, and the self-description of
//! whichever peripheral tiles are plugged into the backplane, then derives
//! and programs the CPLD's address decoder and interrupt router from
//! whatever is actually present. The whole pipeline lives in
//! [`orchestrator::run_enumeration`]; everything else in this crate is a
//! stage of it:
//!
//! - [`codec`] turns raw descriptor bytes into typed records.
//! - [`validator`] checks those records for internal and cross-descriptor
//!   consistency, and owns every collision/uniqueness rule.
//! - [`window_map`] and [`irq_map`] bind the CPU's decode windows and
//!   interrupt routes to the device instances actually present.
//! - [`snapshot`] publishes the result for the [`console`] to read back.
//! - [`transport`] is the seam: real hardware backends and the in-memory
//!   [`sim`] backend both implement the same four traits.

pub mod codec;
pub mod console;
pub mod constants;
pub mod descriptors;
pub mod ids;
pub mod irq_map;
pub mod orchestrator;
pub mod reason;
pub mod snapshot;
pub mod transport;
pub mod validator;
pub mod window_map;

pub mod sim;

pub use reason::EnumReason;
pub use snapshot::{EnumerationSnapshot, SnapshotStore};
