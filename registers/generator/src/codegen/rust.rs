// Licensed under the Apache-2.0 license

//! Rust module target.
//!
//! Constants and `const fn` accessors are free items prefixed like the C
//! header; the overlay record uses tock-registers cells.

use super::{comment_text, field_notes, field_title, FieldIdents, Formulas};
use crate::access::Dialect;
use crate::config::EmitOptions;
use crate::output::{GeneratedField, GeneratedRegister, GeneratedRegisterFile};
use crate::util::{camel_case, hex_const, rust_type, snake_case};
use std::fmt::{Result, Write};

pub(super) fn render(file: &GeneratedRegisterFile, options: &EmitOptions, out: &mut String) -> Result {
    if let Some(provenance) = &options.provenance {
        for line in provenance.lines() {
            writeln!(out, "// {}", comment_text(&line))?;
        }
        writeln!(out)?;
    }
    writeln!(out, "// Register file: {}", comment_text(&file.name))?;
    writeln!(out)?;
    writeln!(
        out,
        "pub const {}: u32 = {};",
        file.ident(&["DATA_WIDTH"]),
        file.data_width
    )?;
    writeln!(
        out,
        "pub const {}: u32 = {};",
        file.ident(&["ADDR_WIDTH"]),
        file.address_width
    )?;

    write_addresses(file, out)?;
    write_fields(file, out)?;
    write_accessors(file, out)?;
    write_overlay(file, out)?;
    Ok(())
}

fn address_type(file: &GeneratedRegisterFile) -> &'static str {
    if file.address_width <= 32 {
        "u32"
    } else {
        "u64"
    }
}

fn write_addresses(file: &GeneratedRegisterFile, out: &mut String) -> Result {
    let addr_ty = address_type(file);
    let ty = rust_type(file.data_width);
    writeln!(out)?;
    writeln!(out, "// Register addresses")?;
    for reg in &file.registers {
        writeln!(
            out,
            "pub const {}: {addr_ty} = {};",
            file.ident(&[&reg.ident, "ADDR"]),
            hex_const(reg.address)
        )?;
        if let Some(reset) = reg.reset {
            writeln!(
                out,
                "pub const {}: {ty} = {};",
                file.ident(&[&reg.ident, "RESET"]),
                hex_const(reset)
            )?;
        }
    }
    Ok(())
}

fn write_fields(file: &GeneratedRegisterFile, out: &mut String) -> Result {
    let ty = rust_type(file.data_width);
    writeln!(out)?;
    writeln!(out, "// Register fields")?;
    for reg in &file.registers {
        for field in &reg.fields {
            let idents = FieldIdents::new(file, reg, field);
            writeln!(out, "/// {}", field_title(reg, field))?;
            writeln!(out, "pub const {}: u32 = {};", idents.pos, field.position)?;
            writeln!(out, "pub const {}: {ty} = {};", idents.mask, hex_const(field.mask))?;
            if let Some(reset) = field.reset {
                writeln!(out, "pub const {}: {ty} = {};", idents.reset, hex_const(reset))?;
            }
        }
    }
    Ok(())
}

fn write_accessors(file: &GeneratedRegisterFile, out: &mut String) -> Result {
    let ty = rust_type(file.data_width);
    writeln!(out)?;
    writeln!(out, "// Accessors")?;
    for reg in &file.registers {
        for field in &reg.fields {
            let idents = FieldIdents::new(file, reg, field);
            let formulas = Formulas::new(field, &idents, Dialect::RUST);
            let name = &idents.accessor;

            if let Some(read) = &formulas.read {
                write_docs(out, "Reads", reg, field)?;
                writeln!(out, "pub const fn {name}_get(reg: {ty}) -> {ty} {{")?;
                writeln!(out, "    {read}")?;
                writeln!(out, "}}")?;
            }
            if let Some(after_read) = &formulas.after_read {
                write_docs(out, "Register value left behind by reading", reg, field)?;
                writeln!(out, "pub const fn {name}_after_read(reg: {ty}) -> {ty} {{")?;
                writeln!(out, "    {after_read}")?;
                writeln!(out, "}}")?;
            }
            if let Some(write) = &formulas.write {
                write_docs(out, "Writes", reg, field)?;
                writeln!(out, "pub const fn {name}_set(reg: {ty}, value: {ty}) -> {ty} {{")?;
                writeln!(out, "    {write}")?;
                writeln!(out, "}}")?;
            }
        }
    }
    Ok(())
}

fn write_docs(
    out: &mut String,
    what: &str,
    reg: &GeneratedRegister,
    field: &GeneratedField,
) -> Result {
    writeln!(out)?;
    writeln!(out, "/// {what} {}.", field_title(reg, field))?;
    if !field.description.is_empty() {
        writeln!(out, "///")?;
        writeln!(out, "/// {}", comment_text(&field.description))?;
    }
    for note in field_notes(field) {
        writeln!(out, "///")?;
        writeln!(out, "/// Note: {note}.")?;
    }
    Ok(())
}

fn write_overlay(file: &GeneratedRegisterFile, out: &mut String) -> Result {
    let ty = rust_type(file.data_width);
    let exact = file.overlay_is_exact();
    writeln!(out)?;
    writeln!(out, "// Register overlay")?;
    if !exact {
        writeln!(
            out,
            "// NOTE: declaration order does not match the address map; member offsets differ from the register addresses"
        )?;
    }
    writeln!(out, "#[repr(C)]")?;
    writeln!(out, "pub struct {} {{", camel_case(&file.ident(&["REGS"])))?;
    let mut cursor = 0u64;
    let mut reserved = 0;
    for reg in &file.registers {
        if exact && reg.address > cursor {
            let count = (reg.address - cursor) / file.unit();
            writeln!(out, "    _reserved{reserved}: [{ty}; {count}],")?;
            reserved += 1;
        }
        let cell = match (reg.can_read(), reg.can_write()) {
            (true, true) => "ReadWrite",
            (true, false) => "ReadOnly",
            _ => "WriteOnly",
        };
        writeln!(out, "    /// {}", hex_const(reg.address))?;
        writeln!(
            out,
            "    pub {}: tock_registers::registers::{cell}<{ty}>,",
            snake_case(&reg.name)
        )?;
        cursor = reg.address.saturating_add(file.unit());
    }
    writeln!(out, "}}")?;
    Ok(())
}
