// Licensed under the Apache-2.0 license

//! Register model.
//!
//! Plain data handed over by a front-end (spreadsheet, structured config or
//! template parser) and passed immutably through the pipeline.
//!
//! ```text
//! RegisterFile
//! └── registers: Vec<Register>          # declaration order
//!     └── fields: Vec<BitField>         # empty = one implicit full-width field
//! ```
//!
//! Ownership is strictly top-down. Nothing points back at its parent; name
//! lookups are built on demand by whoever needs them.

use crate::access::AccessType;
use crate::util::bit_mask;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;

/// Register widths the emitters know how to render.
pub const SUPPORTED_DATA_WIDTHS: [u8; 4] = [8, 16, 32, 64];

/// Name of the implicit field of a register declared without fields.
pub const IMPLICIT_FIELD_NAME: &str = "VALUE";

fn default_data_width() -> u8 {
    32
}

fn default_address_width() -> u8 {
    32
}

//=============================================================================
// AccessTag
//=============================================================================

/// An access type as delivered by the front-end.
///
/// Unrecognised tags are kept verbatim so the validator can report them
/// instead of the front-end silently dropping them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccessTag {
    Known(AccessType),
    Unknown(String),
}

impl AccessTag {
    pub fn access_type(&self) -> Option<AccessType> {
        match self {
            AccessTag::Known(access) => Some(*access),
            AccessTag::Unknown(_) => None,
        }
    }
}

impl Default for AccessTag {
    fn default() -> Self {
        AccessTag::Known(AccessType::ReadWrite)
    }
}

impl From<AccessType> for AccessTag {
    fn from(access: AccessType) -> Self {
        AccessTag::Known(access)
    }
}

impl From<String> for AccessTag {
    fn from(tag: String) -> Self {
        match AccessType::from_str(tag.trim()) {
            Ok(access) => AccessTag::Known(access),
            Err(_) => AccessTag::Unknown(tag),
        }
    }
}

impl From<&str> for AccessTag {
    fn from(tag: &str) -> Self {
        AccessTag::from(tag.to_string())
    }
}

impl From<AccessTag> for String {
    fn from(tag: AccessTag) -> Self {
        tag.to_string()
    }
}

impl std::fmt::Display for AccessTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessTag::Known(access) => write!(f, "{access}"),
            AccessTag::Unknown(tag) => f.write_str(tag),
        }
    }
}

//=============================================================================
// LockRef
//=============================================================================

/// Reference to the field whose non-zero value blocks writes to another
/// field, spelled `REGISTER.FIELD`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LockRef {
    pub register: String,
    pub field: String,
}

impl LockRef {
    pub fn new(register: &str, field: &str) -> Self {
        Self {
            register: register.to_string(),
            field: field.to_string(),
        }
    }
}

impl FromStr for LockRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('.') {
            Some((register, field)) if !register.is_empty() && !field.is_empty() => {
                Ok(LockRef::new(register.trim(), field.trim()))
            }
            _ => Err(format!("lock reference `{s}` is not of the form REGISTER.FIELD")),
        }
    }
}

impl TryFrom<String> for LockRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LockRef> for String {
    fn from(lock: LockRef) -> Self {
        lock.to_string()
    }
}

impl std::fmt::Display for LockRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.register, self.field)
    }
}

//=============================================================================
// BitField
//=============================================================================

/// A contiguous run of bits inside a register.
///
/// `position` and `width` must arrive normalised as integers; a textual bit
/// range (`"7:0"`) is a front-end bug and fails deserialisation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BitField {
    pub name: String,
    /// Least significant bit.
    pub position: u32,
    /// Number of bits, at least one.
    pub width: u32,
    /// Overrides the register's default access type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessTag>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<LockRef>,
}

impl BitField {
    pub fn new(name: &str, position: u32, width: u32) -> Self {
        Self {
            name: name.to_string(),
            position,
            width,
            access: None,
            description: String::new(),
            reset: None,
            locked_by: None,
        }
    }

    pub fn with_access(mut self, access: impl Into<AccessTag>) -> Self {
        self.access = Some(access.into());
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_reset(mut self, reset: u64) -> Self {
        self.reset = Some(reset);
        self
    }

    pub fn locked_by(mut self, register: &str, field: &str) -> Self {
        self.locked_by = Some(LockRef::new(register, field));
        self
    }

    /// One past the most significant bit.
    pub fn end(&self) -> u64 {
        self.position as u64 + self.width as u64
    }

    /// `((1 << width) - 1) << position`
    pub fn mask(&self) -> u64 {
        bit_mask(self.position, self.width)
    }
}

//=============================================================================
// Register
//=============================================================================

/// An addressable register.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Register {
    pub name: String,
    /// Byte offset; `None` until the allocator assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<u64>,
    /// Accept an explicit address that is not a multiple of the access unit.
    #[serde(default)]
    pub allow_unaligned: bool,
    #[serde(default)]
    pub description: String,
    /// Default access type of the register's fields.
    #[serde(default)]
    pub access: AccessTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<u64>,
    #[serde(default)]
    pub fields: Vec<BitField>,
}

impl Register {
    pub fn new(name: &str, access: impl Into<AccessTag>) -> Self {
        Self {
            name: name.to_string(),
            address: None,
            allow_unaligned: false,
            description: String::new(),
            access: access.into(),
            reset: None,
            fields: Vec::new(),
        }
    }

    pub fn at(mut self, address: u64) -> Self {
        self.address = Some(address);
        self
    }

    pub fn unaligned(mut self) -> Self {
        self.allow_unaligned = true;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_reset(mut self, reset: u64) -> Self {
        self.reset = Some(reset);
        self
    }

    pub fn with_field(mut self, field: BitField) -> Self {
        self.fields.push(field);
        self
    }

    /// Access type in force for `field`: its own override, else the
    /// register default.
    pub fn field_access<'a>(&'a self, field: &'a BitField) -> &'a AccessTag {
        field.access.as_ref().unwrap_or(&self.access)
    }

    /// The declared fields, or the single implicit full-width field when
    /// none are declared.
    pub fn effective_fields(&self, data_width: u8) -> Cow<'_, [BitField]> {
        if self.fields.is_empty() {
            let mut implicit = BitField::new(IMPLICIT_FIELD_NAME, 0, data_width as u32);
            implicit.description = self.description.clone();
            Cow::Owned(vec![implicit])
        } else {
            Cow::Borrowed(&self.fields)
        }
    }

    /// Reset value of `field`: its own, else the matching slice of the
    /// register reset.
    pub fn field_reset(&self, field: &BitField) -> Option<u64> {
        field
            .reset
            .or_else(|| {
                self.reset
                    .map(|r| (r & field.mask()).checked_shr(field.position).unwrap_or(0))
            })
    }
}

//=============================================================================
// RegisterFile
//=============================================================================

/// A block of memory-mapped registers sharing one data width.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterFile {
    pub name: String,
    /// Register width in bits (8, 16, 32 or 64).
    #[serde(default = "default_data_width")]
    pub data_width: u8,
    /// Width of a byte address in bits.
    #[serde(default = "default_address_width")]
    pub address_width: u8,
    #[serde(default)]
    pub registers: Vec<Register>,
}

impl RegisterFile {
    pub fn new(name: &str, data_width: u8, address_width: u8) -> Self {
        Self {
            name: name.to_string(),
            data_width,
            address_width,
            registers: Vec::new(),
        }
    }

    pub fn with_register(mut self, register: Register) -> Self {
        self.registers.push(register);
        self
    }

    /// Bytes per register, the allocation and alignment unit.
    pub fn access_unit(&self) -> u64 {
        (self.data_width as u64 / 8).max(1)
    }

    /// Whether `address` is representable in `address_width` bits.
    pub fn address_fits(&self, address: u64) -> bool {
        self.address_width >= 64 || address < (1u64 << self.address_width)
    }

    /// Case-insensitive register lookup.
    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive lookup of a field through a lock reference.
    pub fn lock_target(&self, lock: &LockRef) -> Option<(&Register, BitField)> {
        let register = self.register(&lock.register)?;
        let field = register
            .effective_fields(self.data_width)
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(&lock.field))
            .cloned()?;
        Some((register, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_tag_parsing() {
        assert_eq!(AccessTag::from("W1C"), AccessTag::Known(AccessType::Write1Clear));
        assert_eq!(
            AccessTag::from(" ReadOnly "),
            AccessTag::Known(AccessType::ReadOnly)
        );
        assert_eq!(AccessTag::from("bogus"), AccessTag::Unknown("bogus".into()));
        assert_eq!(AccessTag::from(AccessType::Write0Pulse).to_string(), "W0P");
    }

    #[test]
    fn test_lock_ref_parsing() {
        let lock: LockRef = "LOCK.EN".parse().unwrap();
        assert_eq!(lock, LockRef::new("LOCK", "EN"));
        assert!("LOCK".parse::<LockRef>().is_err());
        assert!(".EN".parse::<LockRef>().is_err());
    }

    #[test]
    fn test_implicit_field() {
        let reg = Register::new("DATA", AccessType::ReadWrite)
            .describe("data port")
            .with_reset(0xAB);
        let fields = reg.effective_fields(16);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, IMPLICIT_FIELD_NAME);
        assert_eq!((fields[0].position, fields[0].width), (0, 16));
        assert_eq!(fields[0].description, "data port");
        assert_eq!(reg.field_reset(&fields[0]), Some(0xAB));
    }

    #[test]
    fn test_field_reset_from_register() {
        let reg = Register::new("CTRL", AccessType::ReadWrite)
            .with_reset(0x0000_0350)
            .with_field(BitField::new("MODE", 4, 4))
            .with_field(BitField::new("EN", 0, 1).with_reset(1));
        assert_eq!(reg.field_reset(&reg.fields[0]), Some(0x5));
        assert_eq!(reg.field_reset(&reg.fields[1]), Some(1));
        assert_eq!(
            reg.field_access(&reg.fields[0]),
            &AccessTag::Known(AccessType::ReadWrite)
        );
    }

    #[test]
    fn test_address_fits() {
        let file = RegisterFile::new("f", 32, 8);
        assert!(file.address_fits(0xFC));
        assert!(!file.address_fits(0x100));
        assert!(RegisterFile::new("f", 64, 64).address_fits(u64::MAX));
        assert_eq!(RegisterFile::new("f", 16, 8).access_unit(), 2);
    }

    #[test]
    fn test_deserialize_model() {
        let file: RegisterFile = serde_json::from_str(
            r#"{
                "name": "uart",
                "data_width": 32,
                "address_width": 8,
                "registers": [
                    {"name": "CTRL", "address": 0, "access": "RW", "fields": [
                        {"name": "EN", "position": 0, "width": 1},
                        {"name": "IRQ", "position": 1, "width": 1, "access": "W1C"},
                        {"name": "KEY", "position": 8, "width": 8, "access": "W1",
                         "reset": 0, "locked_by": "CTRL.EN"}
                    ]},
                    {"name": "STATUS", "access": "Sticky"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(file.registers.len(), 2);
        let ctrl = &file.registers[0];
        assert_eq!(ctrl.address, Some(0));
        assert_eq!(
            ctrl.fields[1].access,
            Some(AccessTag::Known(AccessType::Write1Clear))
        );
        assert_eq!(ctrl.fields[2].locked_by, Some(LockRef::new("CTRL", "EN")));
        assert_eq!(file.registers[1].access, AccessTag::Unknown("Sticky".into()));
        assert_eq!(file.registers[1].address, None);
    }

    #[test]
    fn test_textual_bit_range_is_rejected() {
        let err = serde_json::from_str::<BitField>(
            r#"{"name": "MODE", "position": "7:4", "width": 4}"#,
        );
        assert!(err.is_err());
    }
}
