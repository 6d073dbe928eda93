// Licensed under the Apache-2.0 license

//! Configuration for identifier naming and provenance during emission.
//!
//! [`NameConfig`] controls how the register file name is turned into the
//! identifier prefix of every generated symbol. Common use cases include
//! stripping suffixes like `_regs` or `_csr` so `uart_regs` produces
//! `UART_CTRL_ADDR` instead of `UART_REGS_CTRL_ADDR`.
//!
//! [`EmitOptions`] bundles the naming rules with the optional
//! [`Provenance`] banner.

/// Configuration for name transformations during emission.
///
/// # Example
///
/// ```
/// use regfile_generator::config::NameConfig;
///
/// // Use defaults (strips _regs, _reg, _csr, _regfile, ...)
/// let config = NameConfig::with_defaults();
/// assert_eq!(config.transform("uart_regs"), "uart");
/// assert_eq!(config.transform("TimerCSR"), "Timer");
///
/// // Custom configuration
/// let config = NameConfig::none()
///     .add_suffix("_block")
///     .add_prefix("soc_");
/// assert_eq!(config.transform("soc_dma_block"), "dma");
///
/// // Fixed prefix, ignoring the file name
/// let config = NameConfig::none().with_prefix("SPI0");
/// assert_eq!(config.identifier_prefix("spi"), "SPI0");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameConfig {
    /// Suffixes to strip from names (case-insensitive, checked in order).
    pub strip_suffixes: Vec<String>,

    /// Prefixes to strip from names (case-insensitive, checked in order).
    pub strip_prefixes: Vec<String>,

    /// Explicit identifier prefix; replaces the transformed file name.
    /// An empty string emits unprefixed identifiers.
    pub prefix: Option<String>,
}

impl NameConfig {
    /// Create a new NameConfig with default suffix stripping.
    ///
    /// Default suffixes stripped (case-insensitive):
    /// - `_regfile`, `_regs`, `_reg`, `_csr` (with underscore)
    /// - `csr` (without underscore, e.g. for "TimerCSR" -> "Timer")
    pub fn with_defaults() -> Self {
        Self {
            strip_suffixes: vec![
                "_regfile".to_string(),
                "_regs".to_string(),
                "_reg".to_string(),
                "_csr".to_string(),
                "csr".to_string(),
            ],
            strip_prefixes: vec![],
            prefix: None,
        }
    }

    /// Create a NameConfig that performs no transformations.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a suffix to strip (case-insensitive).
    pub fn add_suffix(mut self, suffix: &str) -> Self {
        self.strip_suffixes.push(suffix.to_string());
        self
    }

    /// Add a prefix to strip (case-insensitive).
    pub fn add_prefix(mut self, prefix: &str) -> Self {
        self.strip_prefixes.push(prefix.to_string());
        self
    }

    /// Use `prefix` for generated identifiers instead of the file name.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Apply name transformations to the given name.
    ///
    /// Strips matching prefixes first, then suffixes.
    /// Matching is case-insensitive but preserves the case of the remaining characters.
    pub fn transform(&self, name: &str) -> String {
        let mut result = name.to_string();

        for prefix in &self.strip_prefixes {
            if starts_with_ignore_case(&result, prefix) && result.len() > prefix.len() {
                result = result[prefix.len()..].to_string();
            }
        }

        // Repeat until no suffix matches, to handle chained suffixes
        'strip: loop {
            for suffix in &self.strip_suffixes {
                if ends_with_ignore_case(&result, suffix) && result.len() > suffix.len() {
                    result.truncate(result.len() - suffix.len());
                    continue 'strip;
                }
            }
            break;
        }

        result
    }

    /// The identifier prefix for a register file called `file_name`, in the
    /// case used for constants (`UART`), without a trailing underscore.
    pub fn identifier_prefix(&self, file_name: &str) -> String {
        match &self.prefix {
            Some(prefix) => crate::util::constant_case(prefix),
            None => crate::util::constant_case(&self.transform(file_name)),
        }
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    s.len() >= suffix.len()
        && s.get(s.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

/// Where a generated artifact came from.
///
/// Rendered as a leading comment. Supplied by the caller so the core never
/// reads the clock; two runs with the same provenance are byte-identical.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Provenance {
    /// Tool name and version, e.g. `regfile-generator 0.1.0`.
    pub generator: String,
    /// Definition the artifact was generated from.
    pub source: Option<String>,
    /// Generation time, already formatted.
    pub timestamp: Option<String>,
}

impl Provenance {
    pub fn new(generator: &str) -> Self {
        Self {
            generator: generator.to_string(),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    /// Banner lines without comment markers.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Generated by {}.", self.generator)];
        if let Some(source) = &self.source {
            lines.push(format!("Source: {source}"));
        }
        if let Some(timestamp) = &self.timestamp {
            lines.push(format!("Generated at: {timestamp}"));
        }
        lines
    }
}

/// Everything an emitter needs besides the register file itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    pub names: NameConfig,
    /// `None` emits no provenance banner at all.
    pub provenance: Option<Provenance>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            names: NameConfig::with_defaults(),
            provenance: None,
        }
    }
}

impl EmitOptions {
    pub fn with_names(mut self, names: NameConfig) -> Self {
        self.names = names;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
}
