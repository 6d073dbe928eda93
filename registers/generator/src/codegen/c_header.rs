// Licensed under the Apache-2.0 license

//! C header target.
//!
//! ```text
//! #define UART_CTRL_ADDR 0x00U
//! #define UART_CTRL_EN_POS 0U
//! #define UART_CTRL_EN_MASK 0x00000001U
//! static inline uint32_t uart_ctrl_en_get(uint32_t reg) { ... }
//! static inline uint32_t uart_ctrl_en_set(uint32_t reg, uint32_t value) { ... }
//! typedef struct { volatile uint32_t CTRL; ... } uart_regs_t;
//! ```

use super::{comment_text, field_notes, field_title, FieldIdents, Formulas};
use crate::access::Dialect;
use crate::config::EmitOptions;
use crate::output::GeneratedRegisterFile;
use crate::util::{c_hex, c_type, constant_case};
use std::fmt::{Result, Write};

pub(super) fn render(file: &GeneratedRegisterFile, options: &EmitOptions, out: &mut String) -> Result {
    if let Some(provenance) = &options.provenance {
        writeln!(out, "/*")?;
        for line in provenance.lines() {
            writeln!(out, " * {}", comment_text(&line))?;
        }
        writeln!(out, " */")?;
        writeln!(out)?;
    }

    let guard = format!("{}_H", constant_case(&file.name));
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "#include <stdint.h>")?;
    writeln!(out)?;
    writeln!(out, "#ifdef __cplusplus")?;
    writeln!(out, "extern \"C\" {{")?;
    writeln!(out, "#endif")?;
    writeln!(out)?;
    writeln!(out, "#define {} {}U", file.ident(&["DATA_WIDTH"]), file.data_width)?;
    writeln!(out, "#define {} {}U", file.ident(&["ADDR_WIDTH"]), file.address_width)?;

    write_addresses(file, out)?;
    write_fields(file, out)?;
    write_accessors(file, out)?;
    write_overlay(file, out)?;

    writeln!(out)?;
    writeln!(out, "#ifdef __cplusplus")?;
    writeln!(out, "}}")?;
    writeln!(out, "#endif")?;
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")?;
    Ok(())
}

fn write_addresses(file: &GeneratedRegisterFile, out: &mut String) -> Result {
    writeln!(out)?;
    writeln!(out, "/* Register addresses */")?;
    for reg in &file.registers {
        let addr = c_hex(reg.address, file.address_width as u32);
        writeln!(out, "#define {} {addr}", file.ident(&[&reg.ident, "ADDR"]))?;
        if let Some(reset) = reg.reset {
            let reset = c_hex(reset, file.data_width as u32);
            writeln!(out, "#define {} {reset}", file.ident(&[&reg.ident, "RESET"]))?;
        }
    }
    Ok(())
}

fn write_fields(file: &GeneratedRegisterFile, out: &mut String) -> Result {
    writeln!(out)?;
    writeln!(out, "/* Register fields */")?;
    for reg in &file.registers {
        for field in &reg.fields {
            let idents = FieldIdents::new(file, reg, field);
            writeln!(out)?;
            writeln!(out, "/* {} */", field_title(reg, field))?;
            writeln!(out, "#define {} {}U", idents.pos, field.position)?;
            writeln!(
                out,
                "#define {} {}",
                idents.mask,
                c_hex(field.mask, file.data_width as u32)
            )?;
            if let Some(reset) = field.reset {
                writeln!(out, "#define {} {}", idents.reset, c_hex(reset, field.width))?;
            }
        }
    }
    Ok(())
}

fn write_accessors(file: &GeneratedRegisterFile, out: &mut String) -> Result {
    let ty = c_type(file.data_width);
    writeln!(out)?;
    writeln!(out, "/* Accessors */")?;
    for reg in &file.registers {
        for field in &reg.fields {
            let idents = FieldIdents::new(file, reg, field);
            let formulas = Formulas::new(field, &idents, Dialect::C);
            let name = &idents.accessor;

            writeln!(out)?;
            if field.description.is_empty() {
                writeln!(out, "/* {} */", field_title(reg, field))?;
            } else {
                writeln!(
                    out,
                    "/* {}: {} */",
                    field_title(reg, field),
                    comment_text(&field.description)
                )?;
            }
            for note in field_notes(field) {
                writeln!(out, "/* {note} */")?;
            }

            if let Some(read) = &formulas.read {
                writeln!(out, "static inline {ty} {name}_get({ty} reg)")?;
                writeln!(out, "{{")?;
                writeln!(out, "    return ({ty})({read});")?;
                writeln!(out, "}}")?;
            }
            if let Some(after_read) = &formulas.after_read {
                writeln!(out, "/* Register value left behind by a read */")?;
                writeln!(out, "static inline {ty} {name}_after_read({ty} reg)")?;
                writeln!(out, "{{")?;
                writeln!(out, "    return ({ty})({after_read});")?;
                writeln!(out, "}}")?;
            }
            if let Some(write) = &formulas.write {
                writeln!(out, "static inline {ty} {name}_set({ty} reg, {ty} value)")?;
                writeln!(out, "{{")?;
                writeln!(out, "    return ({ty})({write});")?;
                writeln!(out, "}}")?;
            }
        }
    }
    Ok(())
}

fn write_overlay(file: &GeneratedRegisterFile, out: &mut String) -> Result {
    let ty = c_type(file.data_width);
    let exact = file.overlay_is_exact();
    writeln!(out)?;
    writeln!(out, "/* Register overlay */")?;
    if !exact {
        writeln!(
            out,
            "/* NOTE: declaration order does not match the address map; member offsets differ from the register addresses */"
        )?;
    }
    writeln!(out, "typedef struct {{")?;
    let mut cursor = 0u64;
    let mut reserved = 0;
    for reg in &file.registers {
        if exact && reg.address > cursor {
            let count = (reg.address - cursor) / file.unit();
            writeln!(
                out,
                "    {ty} _reserved{reserved}[{count}]; /* {} - {} */",
                c_hex(cursor, file.address_width as u32),
                c_hex(reg.address - 1, file.address_width as u32)
            )?;
            reserved += 1;
        }
        let qualifier = if reg.can_write() {
            "volatile"
        } else {
            "const volatile"
        };
        writeln!(
            out,
            "    {qualifier} {ty} {}; /* {} */",
            reg.ident,
            c_hex(reg.address, file.address_width as u32)
        )?;
        cursor = reg.address.saturating_add(file.unit());
    }
    writeln!(out, "}} {}_t;", file.ident(&["REGS"]).to_ascii_lowercase())?;
    Ok(())
}
