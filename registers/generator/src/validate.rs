// Licensed under the Apache-2.0 license

//! Structural validation of a register file.
//!
//! [`validate`] never stops at the first problem: every violation found in
//! one pass is returned together so a definition can be fixed in one go.

use crate::allocate::plan;
use crate::error::{AllocationFailure, InvalidAccessReason, Violation};
use crate::types::{AccessTag, BitField, Register, RegisterFile, SUPPORTED_DATA_WIDTHS};
use crate::util::{bit_mask, constant_case};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};

/// Checks `file` for structural problems.
///
/// Address collisions and range checks run against a trial allocation, so
/// they cover allocated addresses as well as explicit ones. The input is not
/// modified.
pub fn validate(file: &RegisterFile) -> Result<(), Vec<Violation>> {
    debug!(
        "validating {} ({} registers, {}-bit)",
        file.name,
        file.registers.len(),
        file.data_width
    );
    let mut violations = Vec::new();

    let width_ok = SUPPORTED_DATA_WIDTHS.contains(&file.data_width);
    if !width_ok {
        violations.push(Violation::InvalidDataWidth {
            width: file.data_width,
        });
    }

    let mut names: HashMap<String, &str> = HashMap::new();
    for reg in &file.registers {
        if let Some(first) = names.get(&reg.name.to_ascii_lowercase()) {
            violations.push(Violation::DuplicateRegisterName {
                name: reg.name.clone(),
                first: first.to_string(),
            });
        } else {
            names.insert(reg.name.to_ascii_lowercase(), &reg.name);
        }
    }

    for reg in &file.registers {
        trace!("checking register {}", reg.name);
        check_register(file, reg, width_ok, &mut violations);
    }
    check_identifiers(file, &mut violations);

    for failure in plan(file).failures {
        violations.push(match failure {
            AllocationFailure::Collision {
                address,
                first,
                second,
            } => Violation::AddressCollision {
                address,
                first,
                second,
            },
            AllocationFailure::OutOfRange {
                register,
                address,
                address_width,
            } => Violation::AddressOutOfRange {
                register,
                address,
                address_width,
            },
        });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        debug!("{}: {} violation(s)", file.name, violations.len());
        Err(violations)
    }
}

fn check_register(
    file: &RegisterFile,
    reg: &Register,
    width_ok: bool,
    violations: &mut Vec<Violation>,
) {
    let data_width = file.data_width as u32;

    if width_ok {
        if let Some(address) = reg.address {
            let unit = file.access_unit();
            if !reg.allow_unaligned && address % unit != 0 {
                violations.push(Violation::AddressMisaligned {
                    register: reg.name.clone(),
                    address,
                    unit,
                });
            }
        }
        if let Some(reset) = reg.reset {
            if reset & !bit_mask(0, data_width) != 0 {
                violations.push(Violation::ResetOutOfRange {
                    location: reg.name.clone(),
                    reset,
                    width: data_width,
                });
            }
        }
    }

    if let AccessTag::Unknown(tag) = &reg.access {
        violations.push(Violation::InvalidAccessType {
            location: reg.name.clone(),
            tag: tag.clone(),
            reason: InvalidAccessReason::UnknownTag,
        });
    }

    let fields = reg.effective_fields(file.data_width);
    let location = |field: &BitField| {
        if reg.fields.is_empty() {
            reg.name.clone()
        } else {
            format!("{}.{}", reg.name, field.name)
        }
    };

    let mut names: HashMap<String, &str> = HashMap::new();
    for field in fields.iter() {
        if let Some(first) = names.get(&field.name.to_ascii_lowercase()) {
            violations.push(Violation::DuplicateFieldName {
                register: reg.name.clone(),
                name: field.name.clone(),
                first: first.to_string(),
            });
        } else {
            names.insert(field.name.to_ascii_lowercase(), &field.name);
        }
    }

    for field in fields.iter() {
        if width_ok && (field.width == 0 || field.end() > data_width as u64) {
            violations.push(Violation::FieldOutOfRange {
                register: reg.name.clone(),
                field: field.name.clone(),
                position: field.position,
                width: field.width,
                data_width: file.data_width,
            });
        }

        if let Some(AccessTag::Unknown(tag)) = &field.access {
            violations.push(Violation::InvalidAccessType {
                location: location(field),
                tag: tag.clone(),
                reason: InvalidAccessReason::UnknownTag,
            });
        }
        if let Some(access) = reg.field_access(field).access_type() {
            if access.semantics().requires_reset && reg.field_reset(field).is_none() {
                violations.push(Violation::InvalidAccessType {
                    location: location(field),
                    tag: access.to_string(),
                    reason: InvalidAccessReason::MissingReset,
                });
            }
        }

        if let Some(reset) = field.reset {
            if reset & !bit_mask(0, field.width) != 0 {
                violations.push(Violation::ResetOutOfRange {
                    location: location(field),
                    reset,
                    width: field.width,
                });
            } else if let Some(register_reset) = reg.reset {
                let in_range = width_ok
                    && field.width > 0
                    && field.end() <= data_width as u64
                    && register_reset & !bit_mask(0, data_width) == 0;
                let slice = (register_reset & field.mask())
                    .checked_shr(field.position)
                    .unwrap_or(0);
                if in_range && slice != reset {
                    violations.push(Violation::ResetConflict {
                        location: location(field),
                        reset,
                        register_reset: slice,
                    });
                }
            }
        }

        if let Some(lock) = &field.locked_by {
            let is_self = |target: &Register, target_field: &BitField| {
                target.name.eq_ignore_ascii_case(&reg.name)
                    && target_field.name.eq_ignore_ascii_case(&field.name)
            };
            match file.lock_target(lock) {
                Some((target, target_field)) if !is_self(target, &target_field) => {}
                _ => violations.push(Violation::UnknownLockTarget {
                    location: location(field),
                    target: lock.to_string(),
                }),
            }
        }
    }

    check_overlap(reg, &fields, violations);
}

/// Reports distinct registers or fields whose names normalise to the same
/// generated identifier.
///
/// Identifiers are compared without the file prefix, which all of them
/// share. Reset constants and accessors count only where they are emitted. Names
/// already reported as duplicates are skipped, as is every further clash of
/// a pair that has been reported once.
fn check_identifiers(file: &RegisterFile, violations: &mut Vec<Violation>) {
    let mut owners: HashMap<String, String> = HashMap::new();
    let mut reported: HashSet<(String, String)> = HashSet::new();
    let mut claim = |identifier: String, owner: &str, violations: &mut Vec<Violation>| {
        match owners.get(&identifier) {
            Some(first) if first != owner => {
                if reported.insert((first.clone(), owner.to_string())) {
                    violations.push(Violation::IdentifierCollision {
                        identifier,
                        first: first.clone(),
                        second: owner.to_string(),
                    });
                }
            }
            Some(_) => {}
            None => {
                owners.insert(identifier, owner.to_string());
            }
        }
    };

    let mut register_names = HashSet::new();
    for reg in &file.registers {
        if !register_names.insert(reg.name.to_ascii_lowercase()) {
            continue;
        }
        let reg_ident = constant_case(&reg.name);
        let fields = reg.effective_fields(file.data_width);
        claim(format!("{reg_ident}_ADDR"), &reg.name, violations);
        if reg.reset.is_some() || fields.iter().all(|f| reg.field_reset(f).is_some()) {
            claim(format!("{reg_ident}_RESET"), &reg.name, violations);
        }

        let mut field_names = HashSet::new();
        for field in fields.iter() {
            if !field_names.insert(field.name.to_ascii_lowercase()) {
                continue;
            }
            let field_ident = constant_case(&field.name);
            let (owner, accessor) = if reg.fields.is_empty() {
                (reg.name.clone(), reg_ident.clone())
            } else {
                (
                    format!("{}.{}", reg.name, field.name),
                    format!("{reg_ident}_{field_ident}"),
                )
            };
            for suffix in ["POS", "MASK"] {
                claim(format!("{reg_ident}_{field_ident}_{suffix}"), &owner, violations);
            }
            if reg.field_reset(field).is_some() {
                claim(format!("{reg_ident}_{field_ident}_RESET"), &owner, violations);
            }
            // Unknown access tags are reported elsewhere; assume every accessor.
            let semantics = reg.field_access(field).access_type().map(|a| a.semantics());
            let accessors = [
                ("GET", semantics.map_or(true, |s| s.can_read())),
                ("SET", semantics.map_or(true, |s| s.can_write())),
                ("AFTER_READ", semantics.map_or(true, |s| s.destructive_read())),
            ];
            for (suffix, emitted) in accessors {
                if emitted {
                    claim(format!("{accessor}_{suffix}"), &owner, violations);
                }
            }
        }
    }
}

/// Reports every pair of fields sharing at least one bit, naming the lowest
/// shared bit.
fn check_overlap(reg: &Register, fields: &[BitField], violations: &mut Vec<Violation>) {
    for (i, a) in fields.iter().enumerate() {
        for b in fields.iter().skip(i + 1) {
            if a.width == 0 || b.width == 0 {
                continue;
            }
            let start = a.position.max(b.position) as u64;
            if start < a.end().min(b.end()) {
                violations.push(Violation::FieldOverlap {
                    register: reg.name.clone(),
                    first: a.name.clone(),
                    second: b.name.clone(),
                    bit: start as u32,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessType;

    fn uart() -> RegisterFile {
        RegisterFile::new("uart", 32, 8)
            .with_register(
                Register::new("CTRL", AccessType::ReadWrite)
                    .at(0x0)
                    .with_field(BitField::new("EN", 0, 1))
                    .with_field(BitField::new("MODE", 1, 3))
                    .with_field(BitField::new("IRQ", 4, 1).with_access(AccessType::Write1Clear)),
            )
            .with_register(Register::new("DATA", AccessType::ReadWrite))
            .with_register(Register::new("STATUS", AccessType::ReadClear))
    }

    fn violations(file: &RegisterFile) -> Vec<Violation> {
        validate(file).unwrap_err()
    }

    #[test]
    fn test_valid_file() {
        let file = uart();
        assert_eq!(validate(&file), Ok(()));
        // The trial allocation does not leak into the input.
        assert_eq!(file.registers[1].address, None);
    }

    #[test]
    fn test_field_overlap() {
        let file = RegisterFile::new("f", 32, 8).with_register(
            Register::new("CFG", AccessType::ReadWrite)
                .with_field(BitField::new("A", 0, 4))
                .with_field(BitField::new("B", 2, 4)),
        );
        assert_eq!(
            violations(&file),
            vec![Violation::FieldOverlap {
                register: "CFG".into(),
                first: "A".into(),
                second: "B".into(),
                bit: 2,
            }]
        );
    }

    #[test]
    fn test_adjacent_fields_do_not_overlap() {
        let file = RegisterFile::new("f", 8, 8).with_register(
            Register::new("CFG", AccessType::ReadWrite)
                .with_field(BitField::new("HI", 4, 4))
                .with_field(BitField::new("LO", 0, 4)),
        );
        assert_eq!(validate(&file), Ok(()));
    }

    #[test]
    fn test_field_out_of_range() {
        let file = RegisterFile::new("f", 16, 8).with_register(
            Register::new("CFG", AccessType::ReadWrite)
                .with_field(BitField::new("WIDE", 8, 9))
                .with_field(BitField::new("EMPTY", 0, 0)),
        );
        let found = violations(&file);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|v| matches!(v, Violation::FieldOutOfRange { .. })));
    }

    #[test]
    fn test_duplicate_names_ignore_case() {
        let file = RegisterFile::new("f", 32, 8)
            .with_register(
                Register::new("Ctrl", AccessType::ReadWrite)
                    .with_field(BitField::new("en", 0, 1))
                    .with_field(BitField::new("EN", 1, 1)),
            )
            .with_register(Register::new("CTRL", AccessType::ReadWrite));
        let found = violations(&file);
        assert!(found.contains(&Violation::DuplicateRegisterName {
            name: "CTRL".into(),
            first: "Ctrl".into(),
        }));
        assert!(found.contains(&Violation::DuplicateFieldName {
            register: "Ctrl".into(),
            name: "EN".into(),
            first: "en".into(),
        }));
    }

    #[test]
    fn test_misaligned_address() {
        let file = RegisterFile::new("f", 32, 8)
            .with_register(Register::new("A", AccessType::ReadWrite).at(0x2))
            .with_register(Register::new("B", AccessType::ReadWrite).at(0x9).unaligned());
        assert_eq!(
            violations(&file),
            vec![Violation::AddressMisaligned {
                register: "A".into(),
                address: 0x2,
                unit: 4,
            }]
        );
    }

    #[test]
    fn test_address_collision_and_range() {
        let file = RegisterFile::new("f", 32, 4)
            .with_register(Register::new("A", AccessType::ReadWrite).at(0x4))
            .with_register(Register::new("B", AccessType::ReadWrite).at(0x4))
            .with_register(Register::new("C", AccessType::ReadWrite).at(0x10));
        assert_eq!(
            violations(&file),
            vec![
                Violation::AddressCollision {
                    address: 0x4,
                    first: "A".into(),
                    second: "B".into(),
                },
                Violation::AddressOutOfRange {
                    register: "C".into(),
                    address: 0x10,
                    address_width: 4,
                },
            ]
        );
    }

    #[test]
    fn test_unknown_access_tag() {
        let file = RegisterFile::new("f", 32, 8)
            .with_register(Register::new("A", "Sticky"))
            .with_register(
                Register::new("B", AccessType::ReadWrite)
                    .with_field(BitField::new("X", 0, 1).with_access("W2C")),
            );
        assert_eq!(
            violations(&file),
            vec![
                Violation::InvalidAccessType {
                    location: "A".into(),
                    tag: "Sticky".into(),
                    reason: InvalidAccessReason::UnknownTag,
                },
                Violation::InvalidAccessType {
                    location: "B.X".into(),
                    tag: "W2C".into(),
                    reason: InvalidAccessReason::UnknownTag,
                },
            ]
        );
    }

    #[test]
    fn test_write_once_requires_reset() {
        let missing = RegisterFile::new("f", 32, 8).with_register(
            Register::new("KEY", AccessType::ReadWrite)
                .with_field(BitField::new("LOCK", 0, 1).with_access(AccessType::WriteOnce)),
        );
        assert_eq!(
            violations(&missing),
            vec![Violation::InvalidAccessType {
                location: "KEY.LOCK".into(),
                tag: "W1".into(),
                reason: InvalidAccessReason::MissingReset,
            }]
        );

        // A register-level reset covers the field.
        let covered = RegisterFile::new("f", 32, 8).with_register(
            Register::new("KEY", AccessType::WriteOnlyOnce).with_reset(0),
        );
        assert_eq!(validate(&covered), Ok(()));
    }

    #[test]
    fn test_reset_out_of_range() {
        let file = RegisterFile::new("f", 8, 8).with_register(
            Register::new("CFG", AccessType::ReadWrite)
                .with_reset(0x1FF)
                .with_field(BitField::new("MODE", 0, 2).with_reset(4)),
        );
        assert_eq!(
            violations(&file),
            vec![
                Violation::ResetOutOfRange {
                    location: "CFG".into(),
                    reset: 0x1FF,
                    width: 8,
                },
                Violation::ResetOutOfRange {
                    location: "CFG.MODE".into(),
                    reset: 4,
                    width: 2,
                },
            ]
        );
    }

    #[test]
    fn test_lock_targets() {
        let file = RegisterFile::new("f", 32, 8)
            .with_register(
                Register::new("LOCK", AccessType::WriteOnce)
                    .with_reset(0)
                    .with_field(BitField::new("EN", 0, 1)),
            )
            .with_register(
                Register::new("KEY", AccessType::ReadWrite)
                    .with_field(BitField::new("A", 0, 8).locked_by("lock", "en"))
                    .with_field(BitField::new("B", 8, 8).locked_by("LOCK", "MISSING"))
                    .with_field(BitField::new("C", 16, 8).locked_by("KEY", "C")),
            )
            .with_register(Register::new("DATA", AccessType::ReadWrite));
        assert_eq!(
            violations(&file),
            vec![
                Violation::UnknownLockTarget {
                    location: "KEY.B".into(),
                    target: "LOCK.MISSING".into(),
                },
                Violation::UnknownLockTarget {
                    location: "KEY.C".into(),
                    target: "KEY.C".into(),
                },
            ]
        );
    }

    #[test]
    fn test_identifier_collisions() {
        let file = RegisterFile::new("uart", 32, 8)
            .with_register(
                Register::new("CTRL", AccessType::ReadWrite).with_field(BitField::new("EN", 0, 1)),
            )
            .with_register(Register::new("CTRL_EN", AccessType::ReadWrite))
            .with_register(Register::new("tx-fifo", AccessType::WriteOnly))
            .with_register(Register::new("TX_FIFO", AccessType::WriteOnly));
        assert_eq!(
            violations(&file),
            vec![
                Violation::IdentifierCollision {
                    identifier: "CTRL_EN_GET".into(),
                    first: "CTRL.EN".into(),
                    second: "CTRL_EN".into(),
                },
                Violation::IdentifierCollision {
                    identifier: "TX_FIFO_ADDR".into(),
                    first: "tx-fifo".into(),
                    second: "TX_FIFO".into(),
                },
            ]
        );
    }

    #[test]
    fn test_field_identifier_collision() {
        let file = RegisterFile::new("f", 32, 8).with_register(
            Register::new("CFG", AccessType::ReadWrite)
                .with_field(BitField::new("rx en", 0, 1))
                .with_field(BitField::new("RX_EN", 1, 1)),
        );
        assert_eq!(
            violations(&file),
            vec![Violation::IdentifierCollision {
                identifier: "CFG_RX_EN_POS".into(),
                first: "CFG.rx en".into(),
                second: "CFG.RX_EN".into(),
            }]
        );

        // Distinct identifiers pass.
        let file = RegisterFile::new("f", 32, 8)
            .with_register(
                Register::new("CTRL", AccessType::ReadWrite).with_field(BitField::new("EN", 0, 1)),
            )
            .with_register(
                Register::new("CTRL_EN", AccessType::ReadWrite)
                    .with_field(BitField::new("LATCH", 0, 1)),
            );
        assert_eq!(validate(&file), Ok(()));
    }

    #[test]
    fn test_reset_conflict() {
        let file = RegisterFile::new("f", 32, 8).with_register(
            Register::new("CTRL", AccessType::ReadWrite)
                .with_reset(0x20)
                .with_field(BitField::new("EN", 0, 1).with_reset(1))
                .with_field(BitField::new("MODE", 4, 2).with_reset(2)),
        );
        assert_eq!(
            violations(&file),
            vec![Violation::ResetConflict {
                location: "CTRL.EN".into(),
                reset: 1,
                register_reset: 0,
            }]
        );

        let agreeing = RegisterFile::new("f", 32, 8).with_register(
            Register::new("CTRL", AccessType::ReadWrite)
                .with_reset(0x21)
                .with_field(BitField::new("EN", 0, 1).with_reset(1))
                .with_field(BitField::new("MODE", 4, 2).with_reset(2)),
        );
        assert_eq!(validate(&agreeing), Ok(()));
    }

    #[test]
    fn test_invalid_data_width() {
        let file = RegisterFile::new("f", 24, 8).with_register(
            Register::new("A", AccessType::ReadWrite).with_field(BitField::new("X", 0, 32)),
        );
        assert_eq!(
            violations(&file),
            vec![Violation::InvalidDataWidth { width: 24 }]
        );
    }

    #[test]
    fn test_collects_everything() {
        let file = RegisterFile::new("f", 32, 8).with_register(
            Register::new("A", "bogus")
                .at(0x3)
                .with_field(BitField::new("X", 0, 4))
                .with_field(BitField::new("Y", 3, 40)),
        );
        let found = violations(&file);
        assert!(found
            .iter()
            .any(|v| matches!(v, Violation::AddressMisaligned { .. })));
        assert!(found.iter().any(|v| matches!(v, Violation::FieldOverlap { .. })));
        assert!(found
            .iter()
            .any(|v| matches!(v, Violation::FieldOutOfRange { .. })));
        assert!(found
            .iter()
            .any(|v| matches!(v, Violation::InvalidAccessType { .. })));
    }
}
