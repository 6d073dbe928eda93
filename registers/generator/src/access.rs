// Licensed under the Apache-2.0 license

//! Hardware access semantics.
//!
//! Every access behaviour a register or field can have is described by one
//! row of a single immutable table ([`resolve`]). A row names the read
//! formula, the write formula, the read side effect and the flags
//! (single-write lock, pulse, reset requirement). The emitters render the
//! formulas into target source text through [`Dialect`]; the same formulas
//! can be evaluated on concrete values through [`FieldLayout`].
//!
//! All formulas are parameterised by `(mask, shift, current, value)`:
//!
//! ```text
//! plain read        (cur & mask) >> shift
//! plain write       (cur & ~mask) | ((val << shift) & mask)
//! write-1-clear     cur & ~((val << shift) & mask)
//! write-1-set       cur | ((val << shift) & mask)
//! write-0-clear     cur & ~(~(val << shift) & mask)
//! write-0-set       cur | (~(val << shift) & mask)
//! clear on read     cur & ~mask
//! set on read       cur | mask
//! ```

use crate::util::bit_mask;
use strum_macros::{EnumIter, EnumString};

/// The closed set of hardware access behaviours.
///
/// Tags parse case-insensitively from the short form (`W1C`), the long form
/// of the original definition sheets (`Write1Clean`) or a kebab form
/// (`write-1-clear`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AccessType {
    #[strum(serialize = "RW", serialize = "ReadWrite", serialize = "read-write")]
    ReadWrite,
    #[strum(serialize = "RO", serialize = "ReadOnly", serialize = "read-only")]
    ReadOnly,
    #[strum(serialize = "WO", serialize = "WriteOnly", serialize = "write-only")]
    WriteOnly,
    #[strum(
        serialize = "W1C",
        serialize = "Write1Clean",
        serialize = "Write1Clear",
        serialize = "write-1-clear"
    )]
    Write1Clear,
    #[strum(serialize = "W1S", serialize = "Write1Set", serialize = "write-1-set")]
    Write1Set,
    #[strum(
        serialize = "W0C",
        serialize = "Write0Clean",
        serialize = "Write0Clear",
        serialize = "write-0-clear"
    )]
    Write0Clear,
    #[strum(serialize = "W0S", serialize = "Write0Set", serialize = "write-0-set")]
    Write0Set,
    #[strum(serialize = "W1", serialize = "WriteOnce", serialize = "write-once")]
    WriteOnce,
    #[strum(
        serialize = "WO1",
        serialize = "WriteOnlyOnce",
        serialize = "write-only-once"
    )]
    WriteOnlyOnce,
    #[strum(
        serialize = "RC",
        serialize = "ReadClean",
        serialize = "ReadClear",
        serialize = "read-clear"
    )]
    ReadClear,
    #[strum(serialize = "RS", serialize = "ReadSet", serialize = "read-set")]
    ReadSet,
    #[strum(
        serialize = "WRC",
        serialize = "WriteReadClean",
        serialize = "WriteReadClear",
        serialize = "write-read-clear"
    )]
    WriteReadClear,
    #[strum(
        serialize = "WRS",
        serialize = "WriteReadSet",
        serialize = "write-read-set"
    )]
    WriteReadSet,
    #[strum(
        serialize = "W1P",
        serialize = "Write1Pulse",
        serialize = "write-1-pulse"
    )]
    Write1Pulse,
    #[strum(
        serialize = "W0P",
        serialize = "Write0Pulse",
        serialize = "write-0-pulse"
    )]
    Write0Pulse,
}

impl AccessType {
    /// Canonical short tag, e.g. `W1C`.
    pub fn tag(self) -> &'static str {
        resolve(self).tag
    }

    /// Looks up the semantics row for this access type.
    pub fn semantics(self) -> &'static AccessSemantics {
        resolve(self)
    }
}

impl std::fmt::Display for AccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

//=============================================================================
// Formulas
//=============================================================================

/// How a field value is decoded on read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadFormula {
    /// Not readable; no read accessor is emitted.
    None,
    /// `(cur & mask) >> shift`
    Plain,
}

/// How a written value is merged into the current register value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteFormula {
    /// Not writable; no write accessor is emitted.
    None,
    /// `(cur & ~mask) | ((val << shift) & mask)`
    Plain,
    /// Clear the bits where the written value has a 1.
    OneToClear,
    /// Set the bits where the written value has a 1.
    OneToSet,
    /// Clear the bits where the written value has a 0.
    ZeroToClear,
    /// Set the bits where the written value has a 0.
    ZeroToSet,
}

/// What a read does to the stored field afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadAction {
    None,
    /// `cur & ~mask`
    Clear,
    /// `cur | mask`
    Set,
}

/// Side effects and behavioural flags attached to an access type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideEffect {
    /// The field is cleared after it is read.
    ClearOnRead,
    /// The field is set after it is read.
    SetOnRead,
    /// Only the first write after reset takes effect.
    SingleWriteLock,
    /// The written value is asserted for one cycle and does not persist.
    Pulse,
}

impl SideEffect {
    /// Human readable note used in generated documentation.
    pub fn note(self) -> &'static str {
        match self {
            SideEffect::ClearOnRead => "reading clears the field",
            SideEffect::SetOnRead => "reading sets the field",
            SideEffect::SingleWriteLock => {
                "single-write lock: only the first write after reset takes effect"
            }
            SideEffect::Pulse => "pulse: the written value is asserted for one cycle, not stored",
        }
    }
}

/// One row of the access table.
#[derive(Debug, PartialEq, Eq)]
pub struct AccessSemantics {
    pub access: AccessType,
    /// Canonical short tag.
    pub tag: &'static str,
    /// Long descriptive name, e.g. `write-1-clear`.
    pub name: &'static str,
    pub read: ReadFormula,
    pub write: WriteFormula,
    pub on_read: ReadAction,
    pub side_effects: &'static [SideEffect],
    /// A reset value must be defined for fields of this type.
    pub requires_reset: bool,
}

impl AccessSemantics {
    pub fn can_read(&self) -> bool {
        self.read != ReadFormula::None
    }

    pub fn can_write(&self) -> bool {
        self.write != WriteFormula::None
    }

    /// Reading alters the stored value.
    pub fn destructive_read(&self) -> bool {
        self.on_read != ReadAction::None
    }

    pub fn write_lock(&self) -> bool {
        self.side_effects.contains(&SideEffect::SingleWriteLock)
    }

    pub fn pulse(&self) -> bool {
        self.side_effects.contains(&SideEffect::Pulse)
    }

    /// `get(set(v, x)) == x` holds for every in-range `x`.
    pub fn is_reversible(&self) -> bool {
        self.read == ReadFormula::Plain
            && self.write == WriteFormula::Plain
            && self.on_read == ReadAction::None
    }
}

static ACCESS_TABLE: [AccessSemantics; 15] = [
    AccessSemantics {
        access: AccessType::ReadWrite,
        tag: "RW",
        name: "read-write",
        read: ReadFormula::Plain,
        write: WriteFormula::Plain,
        on_read: ReadAction::None,
        side_effects: &[],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::ReadOnly,
        tag: "RO",
        name: "read-only",
        read: ReadFormula::Plain,
        write: WriteFormula::None,
        on_read: ReadAction::None,
        side_effects: &[],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::WriteOnly,
        tag: "WO",
        name: "write-only",
        read: ReadFormula::None,
        write: WriteFormula::Plain,
        on_read: ReadAction::None,
        side_effects: &[],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::Write1Clear,
        tag: "W1C",
        name: "write-1-clear",
        read: ReadFormula::Plain,
        write: WriteFormula::OneToClear,
        on_read: ReadAction::None,
        side_effects: &[],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::Write1Set,
        tag: "W1S",
        name: "write-1-set",
        read: ReadFormula::Plain,
        write: WriteFormula::OneToSet,
        on_read: ReadAction::None,
        side_effects: &[],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::Write0Clear,
        tag: "W0C",
        name: "write-0-clear",
        read: ReadFormula::Plain,
        write: WriteFormula::ZeroToClear,
        on_read: ReadAction::None,
        side_effects: &[],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::Write0Set,
        tag: "W0S",
        name: "write-0-set",
        read: ReadFormula::Plain,
        write: WriteFormula::ZeroToSet,
        on_read: ReadAction::None,
        side_effects: &[],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::WriteOnce,
        tag: "W1",
        name: "write-once",
        read: ReadFormula::Plain,
        write: WriteFormula::Plain,
        on_read: ReadAction::None,
        side_effects: &[SideEffect::SingleWriteLock],
        requires_reset: true,
    },
    AccessSemantics {
        access: AccessType::WriteOnlyOnce,
        tag: "WO1",
        name: "write-only-once",
        read: ReadFormula::None,
        write: WriteFormula::Plain,
        on_read: ReadAction::None,
        side_effects: &[SideEffect::SingleWriteLock],
        requires_reset: true,
    },
    AccessSemantics {
        access: AccessType::ReadClear,
        tag: "RC",
        name: "read-clear",
        read: ReadFormula::Plain,
        write: WriteFormula::None,
        on_read: ReadAction::Clear,
        side_effects: &[SideEffect::ClearOnRead],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::ReadSet,
        tag: "RS",
        name: "read-set",
        read: ReadFormula::Plain,
        write: WriteFormula::None,
        on_read: ReadAction::Set,
        side_effects: &[SideEffect::SetOnRead],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::WriteReadClear,
        tag: "WRC",
        name: "write-read-clear",
        read: ReadFormula::Plain,
        write: WriteFormula::Plain,
        on_read: ReadAction::Clear,
        side_effects: &[SideEffect::ClearOnRead],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::WriteReadSet,
        tag: "WRS",
        name: "write-read-set",
        read: ReadFormula::Plain,
        write: WriteFormula::Plain,
        on_read: ReadAction::Set,
        side_effects: &[SideEffect::SetOnRead],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::Write1Pulse,
        tag: "W1P",
        name: "write-1-pulse",
        read: ReadFormula::Plain,
        write: WriteFormula::OneToSet,
        on_read: ReadAction::None,
        side_effects: &[SideEffect::Pulse],
        requires_reset: false,
    },
    AccessSemantics {
        access: AccessType::Write0Pulse,
        tag: "W0P",
        name: "write-0-pulse",
        read: ReadFormula::Plain,
        write: WriteFormula::ZeroToSet,
        on_read: ReadAction::None,
        side_effects: &[SideEffect::Pulse],
        requires_reset: false,
    },
];

/// Returns the semantics row for `access`.
///
/// Total: every member of the closed [`AccessType`] set has exactly one row.
pub fn resolve(access: AccessType) -> &'static AccessSemantics {
    &ACCESS_TABLE[access as usize]
}

//=============================================================================
// Evaluation
//=============================================================================

/// Position of a field inside a register of `data_width` bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub position: u32,
    pub width: u32,
    pub data_width: u32,
}

/// Result of evaluating a read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Decoded field value.
    pub value: u64,
    /// Register value after the read side effect.
    pub next: u64,
}

/// Stored register value plus the single-write lock flag of one field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldState {
    pub current: u64,
    pub locked: bool,
}

/// Result of evaluating a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write took effect.
    Written { next: u64, locked: bool },
    /// A single-write lock already held; the write is ignored.
    Locked,
    /// The access type has no write formula.
    Rejected,
}

impl FieldLayout {
    pub fn new(position: u32, width: u32, data_width: u32) -> Self {
        Self {
            position,
            width,
            data_width,
        }
    }

    pub fn mask(&self) -> u64 {
        bit_mask(self.position, self.width) & self.register_mask()
    }

    pub fn shift(&self) -> u32 {
        self.position
    }

    fn register_mask(&self) -> u64 {
        bit_mask(0, self.data_width)
    }

    fn shifted(&self, value: u64) -> u64 {
        value.wrapping_shl(self.position) & self.register_mask()
    }

    /// Evaluates the read formula and side effect of `semantics`.
    pub fn read(&self, semantics: &AccessSemantics, current: u64) -> Option<ReadOutcome> {
        let value = semantics.read.eval(self, current)?;
        let next = semantics.on_read.eval(self, current);
        Some(ReadOutcome { value, next })
    }

    /// Evaluates the write formula of `semantics`, honouring the lock flag.
    pub fn write(&self, semantics: &AccessSemantics, state: FieldState, value: u64) -> WriteOutcome {
        if semantics.write_lock() && state.locked {
            return WriteOutcome::Locked;
        }
        match semantics.write.eval(self, state.current, value) {
            Some(next) => WriteOutcome::Written {
                next,
                locked: state.locked || semantics.write_lock(),
            },
            None => WriteOutcome::Rejected,
        }
    }
}

impl ReadFormula {
    pub fn eval(self, layout: &FieldLayout, current: u64) -> Option<u64> {
        match self {
            ReadFormula::None => None,
            ReadFormula::Plain => Some((current & layout.mask()) >> layout.shift()),
        }
    }
}

impl WriteFormula {
    pub fn eval(self, layout: &FieldLayout, current: u64, value: u64) -> Option<u64> {
        let mask = layout.mask();
        let full = layout.register_mask();
        let shifted = layout.shifted(value);
        let next = match self {
            WriteFormula::None => return None,
            WriteFormula::Plain => (current & !mask) | (shifted & mask),
            WriteFormula::OneToClear => current & !(shifted & mask),
            WriteFormula::OneToSet => current | (shifted & mask),
            WriteFormula::ZeroToClear => current & !(!shifted & mask),
            WriteFormula::ZeroToSet => current | (!shifted & mask),
        };
        Some(next & full)
    }
}

impl ReadAction {
    pub fn eval(self, layout: &FieldLayout, current: u64) -> u64 {
        match self {
            ReadAction::None => current,
            ReadAction::Clear => current & !layout.mask(),
            ReadAction::Set => current | layout.mask(),
        }
    }
}

//=============================================================================
// Rendering
//=============================================================================

/// Operator spelling of a target language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dialect {
    /// Bitwise complement operator.
    pub not: &'static str,
}

impl Dialect {
    pub const C: Dialect = Dialect { not: "~" };
    pub const RUST: Dialect = Dialect { not: "!" };
}

/// Source-text operands substituted into a rendered formula.
#[derive(Clone, Copy, Debug)]
pub struct Operands<'a> {
    pub current: &'a str,
    pub value: &'a str,
    pub mask: &'a str,
    pub shift: &'a str,
}

impl ReadFormula {
    /// Plain reads need no complement, so the text is the same in every
    /// dialect.
    pub fn render(self, ops: &Operands) -> Option<String> {
        let Operands {
            current: cur,
            mask,
            shift,
            ..
        } = *ops;
        match self {
            ReadFormula::None => None,
            ReadFormula::Plain => Some(format!("({cur} & {mask}) >> {shift}")),
        }
    }
}

impl WriteFormula {
    pub fn render(self, dialect: Dialect, ops: &Operands) -> Option<String> {
        let Operands {
            current: cur,
            value: val,
            mask,
            shift,
        } = *ops;
        let not = dialect.not;
        let text = match self {
            WriteFormula::None => return None,
            WriteFormula::Plain => {
                format!("({cur} & {not}{mask}) | (({val} << {shift}) & {mask})")
            }
            WriteFormula::OneToClear => format!("{cur} & {not}(({val} << {shift}) & {mask})"),
            WriteFormula::OneToSet => format!("{cur} | (({val} << {shift}) & {mask})"),
            WriteFormula::ZeroToClear => {
                format!("{cur} & {not}({not}({val} << {shift}) & {mask})")
            }
            WriteFormula::ZeroToSet => format!("{cur} | ({not}({val} << {shift}) & {mask})"),
        };
        Some(text)
    }
}

impl ReadAction {
    /// Renders the register value left behind by a read, if the read has a
    /// side effect.
    pub fn render(self, dialect: Dialect, ops: &Operands) -> Option<String> {
        let Operands {
            current: cur, mask, ..
        } = *ops;
        match self {
            ReadAction::None => None,
            ReadAction::Clear => Some(format!("{cur} & {}{mask}", dialect.not)),
            ReadAction::Set => Some(format!("{cur} | {mask}")),
        }
    }
}
