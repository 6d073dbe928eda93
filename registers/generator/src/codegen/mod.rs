// Licensed under the Apache-2.0 license

//! Artifact emission and the compile pipeline.
//!
//! Every target renders the same four sections in the same order:
//!
//! 1. register address (and reset) constants
//! 2. field position, mask and reset constants
//! 3. accessors realising each field's access semantics
//! 4. one overlay record with a member per register, in declaration order
//!
//! The implementation is split across submodules:
//! - `c_header`: C header with `#define`s and `static inline` accessors
//! - `rust`: Rust module with `pub const`s and `const fn` accessors
//! - `markdown`: register documentation tables

mod c_header;
mod markdown;
mod rust;


use crate::access::{Dialect, Operands};
use crate::allocate::allocate;
use crate::config::EmitOptions;
use crate::error::{CompileError, EmitError};
use crate::output::{GeneratedField, GeneratedRegister, GeneratedRegisterFile};
use crate::types::RegisterFile;
use crate::validate::validate;
use log::{debug, info};
use strum_macros::{EnumIter, EnumString};

/// Output languages the emitter knows.
///
/// Names parse case-insensitively; each target also has short aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Target {
    #[strum(serialize = "c-header", serialize = "c", serialize = "h")]
    CHeader,
    #[strum(serialize = "rust", serialize = "rs")]
    Rust,
    #[strum(serialize = "markdown", serialize = "md")]
    Markdown,
}

impl Target {
    /// Canonical target name.
    pub fn name(self) -> &'static str {
        match self {
            Target::CHeader => "c-header",
            Target::Rust => "rust",
            Target::Markdown => "markdown",
        }
    }

    /// Conventional file extension of the artifact.
    pub fn extension(self) -> &'static str {
        match self {
            Target::CHeader => "h",
            Target::Rust => "rs",
            Target::Markdown => "md",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders a validated, allocated register file for `target`.
///
/// An unknown target fails with [`EmitError::UnsupportedTarget`] before
/// anything is rendered.
pub fn emit(target: &str, file: &RegisterFile, options: &EmitOptions) -> Result<String, EmitError> {
    let target = parse_target(target)?;
    emit_target(target, file, options)
}

/// [`emit`] for an already parsed target.
pub fn emit_target(
    target: Target,
    file: &RegisterFile,
    options: &EmitOptions,
) -> Result<String, EmitError> {
    let lowered = GeneratedRegisterFile::lower(file, &options.names)?;
    debug!(
        "emitting {} for {} ({} registers)",
        target,
        lowered.name,
        lowered.registers.len()
    );
    let mut output = String::new();
    match target {
        Target::CHeader => c_header::render(&lowered, options, &mut output)?,
        Target::Rust => rust::render(&lowered, options, &mut output)?,
        Target::Markdown => markdown::render(&lowered, options, &mut output)?,
    }
    Ok(output)
}

/// Validates, allocates and emits `file` in one go.
pub fn compile(
    target: &str,
    file: RegisterFile,
    options: &EmitOptions,
) -> Result<String, CompileError> {
    let target = parse_target(target)?;
    validate(&file).map_err(CompileError::Structural)?;
    let file = allocate(file)?;
    let output = emit_target(target, &file, options)?;
    info!("generated {} for {} ({} bytes)", target, file.name, output.len());
    Ok(output)
}

fn parse_target(target: &str) -> Result<Target, EmitError> {
    target
        .trim()
        .parse()
        .map_err(|_| EmitError::UnsupportedTarget(target.to_string()))
}

/// Identifiers generated for one field, shared by the source targets.
struct FieldIdents {
    pos: String,
    mask: String,
    reset: String,
    /// Accessor base name in lower case; `_get`/`_set`/`_after_read` follow.
    accessor: String,
}

impl FieldIdents {
    fn new(file: &GeneratedRegisterFile, reg: &GeneratedRegister, field: &GeneratedField) -> Self {
        let accessor = if reg.is_plain() {
            file.ident(&[&reg.ident])
        } else {
            file.ident(&[&reg.ident, &field.ident])
        };
        Self {
            pos: file.ident(&[&reg.ident, &field.ident, "POS"]),
            mask: file.ident(&[&reg.ident, &field.ident, "MASK"]),
            reset: file.ident(&[&reg.ident, &field.ident, "RESET"]),
            accessor: accessor.to_ascii_lowercase(),
        }
    }

    fn operands<'a>(&'a self, current: &'a str, value: &'a str) -> Operands<'a> {
        Operands {
            current,
            value,
            mask: &self.mask,
            shift: &self.pos,
        }
    }
}

/// Source text of the read, write and after-read formulas of `field`.
struct Formulas {
    read: Option<String>,
    write: Option<String>,
    after_read: Option<String>,
}

impl Formulas {
    fn new(field: &GeneratedField, idents: &FieldIdents, dialect: Dialect) -> Self {
        let ops = idents.operands("reg", "value");
        let semantics = field.semantics;
        Self {
            read: semantics.read.render(&ops),
            write: semantics.write.render(dialect, &ops),
            after_read: semantics.on_read.render(dialect, &ops),
        }
    }
}

/// Behaviour notes rendered next to a field's accessors.
fn field_notes(field: &GeneratedField) -> Vec<String> {
    let mut notes: Vec<String> = field
        .semantics
        .side_effects
        .iter()
        .map(|effect| effect.note().to_string())
        .collect();
    if let Some(lock) = &field.locked_by {
        notes.push(format!("writes are ignored while {lock} is non-zero"));
    }
    notes
}

/// `REG.FIELD (TAG)`, or `REG (TAG)` for a register without fields.
fn field_title(reg: &GeneratedRegister, field: &GeneratedField) -> String {
    if field.implicit {
        format!("{} ({})", reg.name, field.access)
    } else {
        format!("{}.{} ({})", reg.name, field.name, field.access)
    }
}

/// One-line description safe inside a block or line comment.
fn comment_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "* /")
}
