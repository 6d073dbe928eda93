// Licensed under the Apache-2.0 license

//! Address allocation.
//!
//! Two passes over the registers:
//!
//! 1. every explicit address is reserved (a repeated explicit address is a
//!    collision);
//! 2. in declaration order a cursor walks the address space. An explicit
//!    register pushes the cursor past itself; an unaddressed register takes
//!    the first free, aligned slot at or after the cursor.
//!
//! Explicit addresses therefore win regardless of where they are declared.

use crate::error::{AllocationError, AllocationFailure};
use crate::types::RegisterFile;
use log::{debug, trace};
use std::collections::BTreeMap;

/// Addresses for every register (declaration order) plus the problems
/// found while computing them.
pub(crate) struct Plan {
    pub addresses: Vec<u64>,
    pub failures: Vec<AllocationFailure>,
}

/// Computes the address of every register without modifying the file.
pub(crate) fn plan(file: &RegisterFile) -> Plan {
    let unit = file.access_unit();
    let mut failures = Vec::new();

    let mut reserved: BTreeMap<u64, &str> = BTreeMap::new();
    for reg in &file.registers {
        let Some(address) = reg.address else {
            continue;
        };
        match reserved.get(&address) {
            Some(first) => failures.push(AllocationFailure::Collision {
                address,
                first: first.to_string(),
                second: reg.name.clone(),
            }),
            None => {
                reserved.insert(address, &reg.name);
            }
        }
    }

    let mut cursor = 0u64;
    let mut addresses = Vec::with_capacity(file.registers.len());
    for reg in &file.registers {
        let address = match reg.address {
            Some(address) => address,
            None => {
                let address = next_free(&reserved, cursor, unit);
                trace!("allocated {} at {address:#x}", reg.name);
                address
            }
        };
        cursor = cursor.max(address.saturating_add(unit));
        if !file.address_fits(address) {
            failures.push(AllocationFailure::OutOfRange {
                register: reg.name.clone(),
                address,
                address_width: file.address_width,
            });
        }
        addresses.push(address);
    }

    Plan {
        addresses,
        failures,
    }
}

/// First multiple of `unit` at or after `cursor` whose `unit`-byte slot does
/// not touch a reserved register.
fn next_free(reserved: &BTreeMap<u64, &str>, cursor: u64, unit: u64) -> u64 {
    let Some(mut candidate) = cursor.checked_next_multiple_of(unit) else {
        return u64::MAX;
    };
    while reserved
        .range(candidate.saturating_sub(unit - 1)..=candidate.saturating_add(unit - 1))
        .next()
        .is_some()
    {
        match candidate.checked_add(unit) {
            Some(next) => candidate = next,
            None => return u64::MAX,
        }
    }
    candidate
}

/// Assigns an address to every unaddressed register.
///
/// Fails with every collision and out-of-range address found; on success
/// each register carries `Some(address)` and nothing else changes.
pub fn allocate(mut file: RegisterFile) -> Result<RegisterFile, AllocationError> {
    let Plan {
        addresses,
        failures,
    } = plan(&file);
    if !failures.is_empty() {
        return Err(AllocationError(failures));
    }
    for (reg, address) in file.registers.iter_mut().zip(addresses) {
        if reg.address.is_none() {
            debug!("{}: {} -> {address:#x}", file.name, reg.name);
        }
        reg.address = Some(address);
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessType;
    use crate::types::Register;

    fn reg(name: &str) -> Register {
        Register::new(name, AccessType::ReadWrite)
    }

    fn addresses(file: &RegisterFile) -> Vec<u64> {
        file.registers.iter().map(|r| r.address.unwrap()).collect()
    }

    #[test]
    fn test_sequential() {
        let file = RegisterFile::new("seq", 32, 8)
            .with_register(reg("A"))
            .with_register(reg("B"))
            .with_register(reg("C"));
        let file = allocate(file).unwrap();
        assert_eq!(addresses(&file), vec![0x0, 0x4, 0x8]);
    }

    #[test]
    fn test_gap_between_explicit_registers() {
        let file = RegisterFile::new("gap", 32, 8)
            .with_register(reg("A").at(0x0))
            .with_register(reg("B"))
            .with_register(reg("C").at(0x8));
        assert_eq!(addresses(&allocate(file).unwrap()), vec![0x0, 0x4, 0x8]);
    }

    #[test]
    fn test_declared_after_explicit_registers() {
        let file = RegisterFile::new("after", 32, 8)
            .with_register(reg("A").at(0x0))
            .with_register(reg("C").at(0x8))
            .with_register(reg("B"));
        assert_eq!(addresses(&allocate(file).unwrap()), vec![0x0, 0x8, 0xC]);
    }

    #[test]
    fn test_explicit_wins_regardless_of_order() {
        // B is declared first but may not take 0x0 or 0x4, both reserved later.
        let file = RegisterFile::new("order", 32, 8)
            .with_register(reg("B"))
            .with_register(reg("C"))
            .with_register(reg("A").at(0x0))
            .with_register(reg("D").at(0x4));
        assert_eq!(
            addresses(&allocate(file).unwrap()),
            vec![0x8, 0xC, 0x0, 0x4]
        );
    }

    #[test]
    fn test_unit_follows_data_width() {
        let file = RegisterFile::new("narrow", 16, 8)
            .with_register(reg("A"))
            .with_register(reg("B"))
            .with_register(reg("C").at(0x10))
            .with_register(reg("D"));
        assert_eq!(
            addresses(&allocate(file).unwrap()),
            vec![0x0, 0x2, 0x10, 0x12]
        );
    }

    #[test]
    fn test_unaligned_cursor_is_realigned() {
        let file = RegisterFile::new("unaligned", 32, 8)
            .with_register(reg("A").at(0x1).unaligned())
            .with_register(reg("B"));
        assert_eq!(addresses(&allocate(file).unwrap()), vec![0x1, 0x8]);
    }

    #[test]
    fn test_duplicate_explicit_addresses() {
        let file = RegisterFile::new("dup", 32, 8)
            .with_register(reg("A").at(0x4))
            .with_register(reg("B").at(0x4))
            .with_register(reg("C").at(0x4));
        let err = allocate(file).unwrap_err();
        assert_eq!(
            err.0,
            vec![
                AllocationFailure::Collision {
                    address: 0x4,
                    first: "A".into(),
                    second: "B".into(),
                },
                AllocationFailure::Collision {
                    address: 0x4,
                    first: "A".into(),
                    second: "C".into(),
                },
            ]
        );
    }

    #[test]
    fn test_address_space_exhausted() {
        // A 4-bit address space holds four 32-bit registers.
        let mut file = RegisterFile::new("tiny", 32, 4);
        for name in ["A", "B", "C", "D", "E"] {
            file = file.with_register(reg(name));
        }
        let err = allocate(file).unwrap_err();
        assert_eq!(
            err.0,
            vec![AllocationFailure::OutOfRange {
                register: "E".into(),
                address: 0x10,
                address_width: 4,
            }]
        );
    }

    #[test]
    fn test_identity_preserved() {
        let file = RegisterFile::new("id", 32, 8)
            .with_register(reg("A").describe("first"))
            .with_register(reg("B").at(0x20));
        let allocated = allocate(file.clone()).unwrap();
        assert_eq!(allocated.registers.len(), 2);
        for (before, after) in file.registers.iter().zip(&allocated.registers) {
            assert_eq!(before.name, after.name);
            assert_eq!(before.description, after.description);
            assert_eq!(before.fields, after.fields);
        }
    }
}
