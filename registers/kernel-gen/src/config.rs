// Licensed under the Apache-2.0 license

//! Configuration for the encoding scanner and the generator.
//!
//! [`ScanConfig`] names the tokens the scanner looks for in an encoding
//! header. [`GeneratorConfig`] is the TOML document that lists the kernels
//! to generate registers for:
//!
//! ```toml
//! indent = 0
//!
//! [scan]
//! prefix = "XMK"
//!
//! [[kernel]]
//! name = "conv2d"
//! description = "2D convolution kernel"
//! csr_address = "0x7c0"
//! ```

use crate::descriptor::{KernelDescriptor, RegisterDescriptor};
use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Tokens that identify kernel encoding lines.
///
/// A line is recognized when it contains `<prefix><index><suffix> <value>`;
/// the keywords decide whether the value is the match or the mask half.
///
/// # Example
///
/// ```
/// use registers_kernel_gen::config::ScanConfig;
///
/// let config = ScanConfig::new();
/// assert_eq!(config.prefix, "XMK");
/// assert_eq!(config.suffix, "_W");
///
/// let config = ScanConfig::new().prefix("ACC").suffix("_D");
/// assert_eq!(config.prefix, "ACC");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Literal text preceding the kernel index.
    pub prefix: String,
    /// Literal text following the kernel index, before the single space.
    pub suffix: String,
    /// Lines containing this keyword carry the match value.
    pub match_keyword: String,
    /// Lines containing this keyword (and not the match keyword) carry the mask value.
    pub mask_keyword: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            prefix: "XMK".to_string(),
            suffix: "_W".to_string(),
            match_keyword: "MATCH".to_string(),
            mask_keyword: "MASK".to_string(),
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn match_keyword(mut self, keyword: &str) -> Self {
        self.match_keyword = keyword.to_string();
        self
    }

    pub fn mask_keyword(mut self, keyword: &str) -> Self {
        self.mask_keyword = keyword.to_string();
        self
    }
}

/// One `[[kernel]]` entry of a [`GeneratorConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KernelEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub csr_address: Option<String>,
}

impl KernelEntry {
    pub fn to_descriptor(&self) -> KernelDescriptor {
        KernelDescriptor::from_register(RegisterDescriptor {
            csr_address: self.csr_address.clone(),
            ..RegisterDescriptor::new(&self.name, &self.description)
        })
    }
}

/// Kernel list and scan settings for one generated register block.
///
/// Kernel indices in the encoding header refer to positions in `kernels`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Extra nesting applied to every rendered block.
    #[serde(default)]
    pub indent: usize,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default, rename = "kernel")]
    pub kernels: Vec<KernelEntry>,
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        debug!(
            "Loaded generator config with {} kernels",
            config.kernels.len()
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Builds the kernel descriptors in listed order.
    pub fn kernels(&self) -> Vec<KernelDescriptor> {
        self.kernels.iter().map(KernelEntry::to_descriptor).collect()
    }
}
