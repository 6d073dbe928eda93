// Licensed under the Apache-2.0 license

//! Error taxonomy of the compiler core.
//!
//! - [`Violation`]: structural problems, batch-collected by the validator.
//! - [`AllocationError`]: every [`AllocationFailure`] found by the allocator.
//! - [`EmitError`]: fatal emitter failures (unknown target, unvalidated input).
//! - [`CompileError`]: the union returned by [`crate::compile`].

use thiserror::Error;

/// Why an access tag was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidAccessReason {
    /// The tag is not one of the known access types.
    UnknownTag,
    /// The access type needs a reset value and none was given.
    MissingReset,
}

impl std::fmt::Display for InvalidAccessReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidAccessReason::UnknownTag => f.write_str("unknown access type"),
            InvalidAccessReason::MissingReset => f.write_str("access type requires a reset value"),
        }
    }
}

/// A structural problem in a register file definition.
///
/// Locations are spelled `REGISTER` or `REGISTER.FIELD`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("data width {width} is not one of 8, 16, 32 or 64")]
    InvalidDataWidth { width: u8 },

    #[error("register name `{name}` collides with `{first}`")]
    DuplicateRegisterName { name: String, first: String },

    #[error("{register}: field name `{name}` collides with `{first}`")]
    DuplicateFieldName {
        register: String,
        name: String,
        first: String,
    },

    #[error("{register}: fields `{first}` and `{second}` overlap at bit {bit}")]
    FieldOverlap {
        register: String,
        first: String,
        second: String,
        bit: u32,
    },

    #[error("{register}.{field}: bits [{position}, {position}+{width}) do not fit a {data_width}-bit register")]
    FieldOutOfRange {
        register: String,
        field: String,
        position: u32,
        width: u32,
        data_width: u8,
    },

    #[error("address {address:#x} of `{second}` collides with `{first}`")]
    AddressCollision {
        address: u64,
        first: String,
        second: String,
    },

    #[error("{register}: address {address:#x} is not a multiple of {unit} bytes")]
    AddressMisaligned {
        register: String,
        address: u64,
        unit: u64,
    },

    #[error("{register}: address {address:#x} does not fit a {address_width}-bit address space")]
    AddressOutOfRange {
        register: String,
        address: u64,
        address_width: u8,
    },

    #[error("{location}: `{tag}`: {reason}")]
    InvalidAccessType {
        location: String,
        tag: String,
        reason: InvalidAccessReason,
    },

    #[error("{location}: reset value {reset:#x} does not fit {width} bits")]
    ResetOutOfRange {
        location: String,
        reset: u64,
        width: u32,
    },

    #[error("{location}: lock target `{target}` is not another field of this register file")]
    UnknownLockTarget { location: String, target: String },

    #[error("{location}: reset value {reset:#x} disagrees with {register_reset:#x} taken from the register reset")]
    ResetConflict {
        location: String,
        reset: u64,
        register_reset: u64,
    },

    /// Two distinct names normalise to the same generated identifier.
    #[error("{second}: generated identifier `{identifier}` collides with `{first}`")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },
}

/// One problem found while placing registers in the address space.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AllocationFailure {
    #[error("address {address:#x} of `{second}` collides with `{first}`")]
    Collision {
        address: u64,
        first: String,
        second: String,
    },

    #[error("register `{register}` at {address:#x} does not fit a {address_width}-bit address space")]
    OutOfRange {
        register: String,
        address: u64,
        address_width: u8,
    },
}

/// Allocation failed; holds every failure of the run.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("address allocation failed with {} problem(s)", .0.len())]
pub struct AllocationError(pub Vec<AllocationFailure>);

/// Fatal emitter failures.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("unsupported output target `{0}`")]
    UnsupportedTarget(String),

    /// The model reached the emitter without passing validation/allocation.
    #[error("model is not ready for emission: {0}")]
    Unvalidated(String),

    #[error("failed to format output")]
    Format(#[from] std::fmt::Error),
}

/// Everything [`crate::compile`] can fail with.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("register file has {} structural violation(s)", .0.len())]
    Structural(Vec<Violation>),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl CompileError {
    /// Individual problem descriptions, one per line of user-facing output.
    pub fn details(&self) -> Vec<String> {
        match self {
            CompileError::Structural(violations) => {
                violations.iter().map(|v| v.to_string()).collect()
            }
            CompileError::Allocation(err) => err.0.iter().map(|f| f.to_string()).collect(),
            CompileError::Emit(err) => vec![err.to_string()],
        }
    }
}
