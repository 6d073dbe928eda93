// Licensed under the Apache-2.0 license

//! Markdown documentation target.

use super::{field_notes, FieldIdents, Formulas};
use crate::access::Dialect;
use crate::config::EmitOptions;
use crate::output::GeneratedRegisterFile;
use crate::util::hex_const;
use std::fmt::{Result, Write};

pub(super) fn render(file: &GeneratedRegisterFile, options: &EmitOptions, out: &mut String) -> Result {
    if let Some(provenance) = &options.provenance {
        for line in provenance.lines() {
            writeln!(out, "<!-- {} -->", comment_safe(&line))?;
        }
        writeln!(out)?;
    }
    writeln!(out, "# {}", cell(&file.name))?;
    writeln!(out)?;
    writeln!(out, "| Property | Value |")?;
    writeln!(out, "| --- | --- |")?;
    writeln!(out, "| Data width | {} bits |", file.data_width)?;
    writeln!(out, "| Address width | {} bits |", file.address_width)?;
    writeln!(out, "| Size | {} bytes |", hex_const(file.size()))?;

    writeln!(out)?;
    writeln!(out, "## Register map")?;
    writeln!(out)?;
    writeln!(out, "| Address | Register | Access | Reset | Description |")?;
    writeln!(out, "| --- | --- | --- | --- | --- |")?;
    for reg in &file.registers {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            hex_const(reg.address),
            cell(&reg.name),
            reg.access,
            reg.reset.map(hex_const).unwrap_or_else(|| "-".into()),
            cell(&reg.description)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "## Fields")?;
    for reg in &file.registers {
        writeln!(out)?;
        writeln!(out, "### {} ({})", cell(&reg.name), hex_const(reg.address))?;
        writeln!(out)?;
        writeln!(out, "| Bits | Field | Access | Reset | Mask | Description |")?;
        writeln!(out, "| --- | --- | --- | --- | --- | --- |")?;
        for field in reg.fields.iter().rev() {
            let bits = if field.width == 1 {
                format!("[{}]", field.position)
            } else {
                format!("[{}:{}]", field.position + field.width - 1, field.position)
            };
            let mut description = cell(&field.description);
            if let Some(lock) = &field.locked_by {
                if !description.is_empty() {
                    description.push(' ');
                }
                description.push_str(&format!("Locked by `{lock}`."));
            }
            writeln!(
                out,
                "| {bits} | {} | {} | {} | {} | {description} |",
                cell(&field.name),
                field.access,
                field.reset.map(hex_const).unwrap_or_else(|| "-".into()),
                hex_const(field.mask)
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "## Access behaviour")?;
    writeln!(out)?;
    writeln!(out, "| Field | Read | Write | After read | Notes |")?;
    writeln!(out, "| --- | --- | --- | --- | --- |")?;
    for reg in &file.registers {
        for field in &reg.fields {
            let idents = FieldIdents::new(file, reg, field);
            let formulas = Formulas::new(field, &idents, Dialect::C);
            let location = if field.implicit {
                cell(&reg.name)
            } else {
                format!("{}.{}", cell(&reg.name), cell(&field.name))
            };
            writeln!(
                out,
                "| {location} | {} | {} | {} | {} |",
                code(formulas.read.as_deref()),
                code(formulas.write.as_deref()),
                code(formulas.after_read.as_deref()),
                cell(&field_notes(field).join("; "))
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "## Memory layout")?;
    writeln!(out)?;
    if !file.overlay_is_exact() {
        writeln!(
            out,
            "> Declaration order does not match the address map; record member offsets differ from the register addresses."
        )?;
        writeln!(out)?;
    }
    writeln!(out, "| Member | Offset | Software access |")?;
    writeln!(out, "| --- | --- | --- |")?;
    for reg in &file.registers {
        let access = match (reg.can_read(), reg.can_write()) {
            (true, true) => "read/write",
            (true, false) => "read",
            _ => "write",
        };
        writeln!(
            out,
            "| {} | {} | {access} |",
            cell(&reg.name),
            hex_const(reg.address)
        )?;
    }
    Ok(())
}

/// HTML comment text with no `--` left anywhere.
fn comment_safe(text: &str) -> String {
    let mut text = text.replace('\n', " ");
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    text
}

/// Table cell text: one line, pipes escaped.
fn cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

fn code(formula: Option<&str>) -> String {
    match formula {
        Some(formula) => format!("`{}`", formula.replace('|', "\\|")),
        None => "-".to_string(),
    }
}
