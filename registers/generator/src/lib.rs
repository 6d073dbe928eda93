// Licensed under the Apache-2.0 license

//! Register-file definition compiler.
//!
//! This crate turns an in-memory description of a memory-mapped register
//! block into deterministic, bit-exact artifacts: address constants, field
//! position/mask constants, accessors that encode the hardware access
//! behaviour of every field, and a memory-overlay record.
//!
//! ## Usage
//!
//! ```
//! use regfile_generator::{compile, AccessType, BitField, EmitOptions, Register, RegisterFile};
//!
//! let file = RegisterFile::new("uart_regs", 32, 8)
//!     .with_register(
//!         Register::new("CTRL", AccessType::ReadWrite)
//!             .with_field(BitField::new("EN", 0, 1))
//!             .with_field(BitField::new("IRQ", 1, 1).with_access(AccessType::Write1Clear)),
//!     )
//!     .with_register(Register::new("STATUS", AccessType::ReadOnly));
//!
//! let header = compile("c-header", file, &EmitOptions::default()).unwrap();
//! assert!(header.contains("#define UART_STATUS_ADDR 0x04U"));
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: the register model handed over by front-ends
//! - [`mod@validate`]: structural checks, all violations collected at once
//! - [`mod@allocate`]: address assignment for unaddressed registers
//! - [`access`]: the access-semantics table and its formulas
//! - [`output`]: the lowered model every target renders from
//! - [`config`]: naming and provenance options ([`NameConfig`], [`EmitOptions`])
//! - [`util`]: name conversion and literal formatting
//! - [`error`]: the error taxonomy

pub mod access;
pub mod allocate;
pub mod config;
pub mod error;
pub mod output;
pub mod types;
pub mod util;
pub mod validate;

mod codegen;

// Re-export main public API
pub use access::{resolve, AccessSemantics, AccessType};
pub use allocate::allocate;
pub use codegen::{compile, emit, emit_target, Target};
pub use config::{EmitOptions, NameConfig, Provenance};
pub use error::{AllocationError, AllocationFailure, CompileError, EmitError, Violation};
pub use types::{AccessTag, BitField, LockRef, Register, RegisterFile};
pub use validate::validate;
