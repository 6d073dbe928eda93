// Licensed under the Apache-2.0 license

//! Commands to check register file definitions and generate artifacts from them.

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use log::{debug, info};
use regfile_generator::{
    compile, validate, CompileError, EmitOptions, NameConfig, Provenance, RegisterFile, Target,
};
use std::path::Path;

/// Naming options shared by the generating commands.
pub struct NameOptions<'a> {
    pub prefix: Option<&'a str>,
    pub strip_suffixes: &'a [String],
    pub strip_prefixes: &'a [String],
    pub no_default_strip: bool,
}

impl NameOptions<'_> {
    fn name_config(&self) -> NameConfig {
        let mut name_config = if self.no_default_strip {
            NameConfig::none()
        } else {
            NameConfig::with_defaults()
        };
        for suffix in self.strip_suffixes {
            name_config = name_config.add_suffix(suffix);
        }
        for prefix in self.strip_prefixes {
            name_config = name_config.add_prefix(prefix);
        }
        if let Some(prefix) = self.prefix {
            name_config = name_config.with_prefix(prefix);
        }
        name_config
    }
}

/// Loads a register file definition from a `.toml` or `.json` file.
pub fn load(path: &Path) -> Result<RegisterFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?,
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?,
        _ => bail!(
            "{}: unknown definition format, expected .toml or .json",
            path.display()
        ),
    };
    debug!("loaded {}", path.display());
    Ok(file)
}

/// Validate a definition and report every violation.
pub fn check(input: &Path) -> Result<()> {
    let file = load(input)?;
    match validate(&file) {
        Ok(()) => {
            println!(
                "{}: {} registers, no problems found",
                input.display(),
                file.registers.len()
            );
            Ok(())
        }
        Err(violations) => {
            for violation in &violations {
                eprintln!("{}: {violation}", input.display());
            }
            bail!("{}: {} violation(s)", input.display(), violations.len())
        }
    }
}

/// Generate an artifact from a definition.
///
/// Without `output` the artifact is printed to stdout.
pub fn generate(
    input: &Path,
    target: &str,
    output: Option<&Path>,
    names: &NameOptions,
    stamp: bool,
) -> Result<()> {
    let file = load(input)?;
    let target: Target = target
        .parse()
        .map_err(|_| anyhow::anyhow!("unsupported output target `{target}`"))?;

    let mut options = EmitOptions::default().with_names(names.name_config());
    if stamp {
        let mut provenance =
            Provenance::new(&format!("regfile-generator {}", env!("CARGO_PKG_VERSION")))
                .with_timestamp(&Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        if let Some(source) = input.file_name().and_then(|n| n.to_str()) {
            provenance = provenance.with_source(source);
        }
        options = options.with_provenance(provenance);
    }

    let artifact = match compile(target.name(), file, &options) {
        Ok(artifact) => artifact,
        Err(err) => {
            report(input, &err);
            bail!("{}: {err}", input.display());
        }
    };

    if let Some(output_path) = output {
        std::fs::write(output_path, &artifact)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        info!("{} written to {}", target, output_path.display());
    } else {
        print!("{artifact}");
    }
    Ok(())
}

fn report(input: &Path, err: &CompileError) {
    for detail in err.details() {
        eprintln!("{}: {detail}", input.display());
    }
}
