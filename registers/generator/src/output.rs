// Licensed under the Apache-2.0 license

//! Lowered model every emitter target renders from.
//!
//! Lowering resolves everything the targets would otherwise recompute:
//! addresses, masks, effective access semantics, derived reset values and
//! identifier spellings.
//!
//! ## Code Generation Flow
//!
//! ```text
//! RegisterFile (validated, allocated) → GeneratedRegisterFile → target text
//!                                       └── GeneratedRegister[]   # declaration order
//!                                           └── GeneratedField[]  # declaration order
//! ```

use crate::access::{AccessSemantics, AccessType};
use crate::config::NameConfig;
use crate::error::EmitError;
use crate::types::{AccessTag, LockRef, RegisterFile, SUPPORTED_DATA_WIDTHS};
use crate::util::{bit_mask, constant_case};

//=============================================================================
// Generated Types
//=============================================================================

/// A lowered bit field.
#[derive(Clone, Debug)]
pub struct GeneratedField {
    /// Field name as declared.
    pub name: String,
    /// UPPER_SNAKE spelling used in identifiers.
    pub ident: String,
    /// Bit offset within the register.
    pub position: u32,
    /// Width in bits.
    pub width: u32,
    /// `((1 << width) - 1) << position`
    pub mask: u64,
    pub access: AccessType,
    pub semantics: &'static AccessSemantics,
    pub description: String,
    /// Own reset or the matching slice of the register reset.
    pub reset: Option<u64>,
    pub locked_by: Option<LockRef>,
    /// Stands in for a register declared without fields.
    pub implicit: bool,
}

/// A lowered register.
#[derive(Clone, Debug)]
pub struct GeneratedRegister {
    pub name: String,
    /// UPPER_SNAKE spelling used in identifiers.
    pub ident: String,
    /// Byte offset from the start of the register file.
    pub address: u64,
    pub description: String,
    /// Default access type of the register.
    pub access: AccessType,
    /// Declared reset, else the fields' resets combined when every field has one.
    pub reset: Option<u64>,
    pub fields: Vec<GeneratedField>,
}

impl GeneratedRegister {
    /// Whether software can read at least one field.
    pub fn can_read(&self) -> bool {
        self.fields.iter().any(|f| f.semantics.can_read())
    }

    /// Whether software can write at least one field.
    pub fn can_write(&self) -> bool {
        self.fields.iter().any(|f| f.semantics.can_write())
    }

    /// Declared without fields; accessors address the whole register.
    pub fn is_plain(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].implicit
    }
}

/// The complete lowered output for a register file.
#[derive(Clone, Debug)]
pub struct GeneratedRegisterFile {
    /// Register file name as declared.
    pub name: String,
    /// Identifier prefix in UPPER_SNAKE case, possibly empty.
    pub prefix: String,
    pub data_width: u8,
    pub address_width: u8,
    pub registers: Vec<GeneratedRegister>,
}

impl GeneratedRegisterFile {
    /// Lowers a validated and allocated register file.
    ///
    /// Fails with [`EmitError::Unvalidated`] instead of guessing when the
    /// model still carries an unassigned address, an unknown access tag or
    /// an unsupported data width.
    pub fn lower(file: &RegisterFile, names: &NameConfig) -> Result<Self, EmitError> {
        if !SUPPORTED_DATA_WIDTHS.contains(&file.data_width) {
            return Err(EmitError::Unvalidated(format!(
                "data width {} is not supported",
                file.data_width
            )));
        }

        let mut registers = Vec::with_capacity(file.registers.len());
        for reg in &file.registers {
            let address = reg.address.ok_or_else(|| {
                EmitError::Unvalidated(format!("register `{}` has no address", reg.name))
            })?;
            let access = known(&reg.access, &reg.name)?;

            let mut fields = Vec::new();
            for field in reg.effective_fields(file.data_width).iter() {
                let location = format!("{}.{}", reg.name, field.name);
                let access = known(reg.field_access(field), &location)?;
                fields.push(GeneratedField {
                    name: field.name.clone(),
                    ident: constant_case(&field.name),
                    position: field.position,
                    width: field.width,
                    mask: bit_mask(field.position, field.width),
                    access,
                    semantics: access.semantics(),
                    description: field.description.clone(),
                    reset: reg.field_reset(field),
                    locked_by: field.locked_by.clone(),
                    implicit: reg.fields.is_empty(),
                });
            }

            let reset = reg.reset.or_else(|| {
                fields.iter().try_fold(0u64, |acc, f| {
                    f.reset.map(|r| acc | (r.wrapping_shl(f.position) & f.mask))
                })
            });

            registers.push(GeneratedRegister {
                name: reg.name.clone(),
                ident: constant_case(&reg.name),
                address,
                description: reg.description.clone(),
                access,
                reset,
                fields,
            });
        }

        Ok(Self {
            name: file.name.clone(),
            prefix: names.identifier_prefix(&file.name),
            data_width: file.data_width,
            address_width: file.address_width,
            registers,
        })
    }

    /// `PREFIX_PART_PART`, or just the parts when the prefix is empty.
    pub fn ident(&self, parts: &[&str]) -> String {
        let mut ident = self.prefix.clone();
        for part in parts {
            if !ident.is_empty() {
                ident.push('_');
            }
            ident.push_str(part);
        }
        ident
    }

    /// Bytes per register.
    pub fn unit(&self) -> u64 {
        self.data_width as u64 / 8
    }

    /// Bytes spanned from offset zero to the end of the highest register.
    pub fn size(&self) -> u64 {
        self.registers
            .iter()
            .map(|r| r.address.saturating_add(self.unit()))
            .max()
            .unwrap_or(0)
    }

    /// Whether an overlay record with members in declaration order lands
    /// every register on its address: ascending, non-overlapping, aligned.
    pub fn overlay_is_exact(&self) -> bool {
        self.registers
            .windows(2)
            .all(|w| w[0].address.saturating_add(self.unit()) <= w[1].address)
            && self.registers.iter().all(|r| r.address % self.unit() == 0)
    }
}

fn known(tag: &AccessTag, location: &str) -> Result<AccessType, EmitError> {
    tag.access_type().ok_or_else(|| {
        EmitError::Unvalidated(format!("{location}: unknown access type `{tag}`"))
    })
}
