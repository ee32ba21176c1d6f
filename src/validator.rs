//! Pure predicates over decoded descriptors. This module is the single
//! source of truth for the window- and route-uniqueness checks; the mapping
//! stages (`window_map`, `irq_map`) call into it rather than re-deriving
//! collision logic of their own.

use crate::descriptors::{BankDescriptor, CpuDescriptor};
use crate::reason::EnumReason;

/// Sanity-checks the CPU descriptor's own fields, independent of any bank or
/// peripheral: both bus widths must be one of the three values the decoder
/// actually supports, matching the original firmware's explicit
/// `ubitz_validate_cpu_desc` enum check rather than a bare non-zero test.
pub fn cpu_ok(cpu: &CpuDescriptor) -> Result<(), EnumReason> {
    if !matches!(cpu.data_bus_width, 8 | 16 | 32) || !matches!(cpu.addr_bus_width, 8 | 16 | 32) {
        return Err(EnumReason::CpuDescBad);
    }
    Ok(())
}

/// Checks the bank descriptor against itself and against the CPU it will be
/// paired with. The bus-width mismatch is checked first and reported as its
/// own reason, ahead of any other bank/CPU incompatibility, matching the
/// original firmware's check ordering.
pub fn bank_ok_vs_cpu(bank: &BankDescriptor, cpu: &CpuDescriptor) -> Result<(), EnumReason> {
    if bank.data_bus_width == 0 || bank.ram_addr_width == 0 {
        return Err(EnumReason::BankDescBad);
    }
    if bank.data_bus_width != cpu.data_bus_width {
        return Err(EnumReason::BankWidthMismatch);
    }
    Ok(())
}

/// True if two non-empty windows' decode keys collide: same (base, mask,
/// opsel) but a different (function, instance) target. Identical targets on
/// an identical key are not a collision (a window may legitimately be
/// re-asserted), matching the original firmware's duplicate-entry tolerance.
pub fn windows_collide(
    a: &crate::descriptors::WindowEntry,
    b: &crate::descriptors::WindowEntry,
) -> bool {
    a.decode_key() == b.decode_key() && a.target() != b.target()
}

/// Checks the full window table for pairwise collisions, returning the
/// first one found in table order.
pub fn windows_unique(cpu: &CpuDescriptor) -> Result<(), EnumReason> {
    let entries: Vec<_> = cpu.non_empty_windows().map(|(_, w)| *w).collect();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if windows_collide(&entries[i], &entries[j]) {
                return Err(EnumReason::WindowCollision);
            }
        }
    }
    Ok(())
}

/// True if two non-empty routes collide: identical (function, instance,
/// channel) but the table holds them as separate entries. The original
/// firmware rejects this outright rather than treating it as a harmless
/// duplicate, since the CPLD router has exactly one slot per channel.
pub fn routes_collide(
    a: &crate::descriptors::InterruptRouteEntry,
    b: &crate::descriptors::InterruptRouteEntry,
) -> bool {
    a.collision_key() == b.collision_key()
}

/// Checks the full route table for pairwise duplicates, returning the first
/// one found in table order.
pub fn routes_unique(cpu: &CpuDescriptor) -> Result<(), EnumReason> {
    let entries: Vec<_> = cpu.non_empty_routes().map(|(_, r)| *r).collect();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if routes_collide(&entries[i], &entries[j]) {
                return Err(EnumReason::RouteDuplicate);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::WindowEntry;
    use crate::ids::{Function, Instance, OpSelect, WindowFlags};

    fn cpu_zero_width() -> CpuDescriptor {
        CpuDescriptor {
            data_bus_width: 0,
            ..Default::default()
        }
    }

    #[test]
    fn cpu_ok_rejects_zero_bus_width() {
        assert_eq!(cpu_ok(&cpu_zero_width()), Err(EnumReason::CpuDescBad));
    }

    #[test]
    fn cpu_ok_rejects_bus_width_outside_8_16_32() {
        let cpu = CpuDescriptor {
            data_bus_width: 24,
            addr_bus_width: 16,
            ..Default::default()
        };
        assert_eq!(cpu_ok(&cpu), Err(EnumReason::CpuDescBad));

        let cpu = CpuDescriptor {
            data_bus_width: 16,
            addr_bus_width: 64,
            ..Default::default()
        };
        assert_eq!(cpu_ok(&cpu), Err(EnumReason::CpuDescBad));
    }

    #[test]
    fn cpu_ok_accepts_each_enumerated_bus_width() {
        for &w in &[8u8, 16, 32] {
            let cpu = CpuDescriptor {
                data_bus_width: w,
                addr_bus_width: w,
                ..Default::default()
            };
            assert_eq!(cpu_ok(&cpu), Ok(()));
        }
    }

    #[test]
    fn bank_ok_vs_cpu_reports_width_mismatch_before_other_checks() {
        let cpu = CpuDescriptor {
            data_bus_width: 16,
            addr_bus_width: 16,
            ..Default::default()
        };
        let bank = BankDescriptor {
            data_bus_width: 8,
            ram_addr_width: 16,
            ..Default::default()
        };
        assert_eq!(
            bank_ok_vs_cpu(&bank, &cpu),
            Err(EnumReason::BankWidthMismatch)
        );
    }

    #[test]
    fn windows_unique_flags_colliding_decode_keys() {
        let mut cpu = CpuDescriptor::default();
        cpu.window[0] = WindowEntry {
            function: Function(0x20),
            instance: Instance(0),
            base: 0x1000,
            mask: 0xF000,
            opsel: OpSelect::Any,
            flags: WindowFlags::empty(),
        };
        cpu.window[1] = WindowEntry {
            function: Function(0x21),
            instance: Instance(0),
            ..cpu.window[0]
        };
        assert_eq!(windows_unique(&cpu), Err(EnumReason::WindowCollision));
    }

    #[test]
    fn windows_unique_allows_identical_redundant_entries() {
        let mut cpu = CpuDescriptor::default();
        let w = WindowEntry {
            function: Function(0x20),
            instance: Instance(0),
            base: 0x1000,
            mask: 0xF000,
            opsel: OpSelect::Any,
            flags: WindowFlags::empty(),
        };
        cpu.window[0] = w;
        cpu.window[1] = w;
        assert_eq!(windows_unique(&cpu), Ok(()));
    }
}
