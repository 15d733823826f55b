// Licensed under the Apache-2.0 license

//! Register and kernel descriptors.
//!
//! A descriptor holds the metadata for one register and renders it as a
//! register entry with a single field spanning [`RegisterDescriptor::bits`]:
//!
//! ```text
//! {
//!     name: "conv2d",
//!     desc: "2D convolution kernel",
//!     fields: [
//!         {
//!             bits: "31:0",
//!             name: "conv2d",
//!             desc: "2D convolution kernel",
//!             swaccess: "rw",
//!             hwaccess: "hro",
//!             resval: "0",
//!         }
//!     ]
//!     swaccess: "ro",
//!     hwaccess: "none",
//!     resval: "0",
//! },
//! ```
//!
//! The register-level `swaccess`/`hwaccess`/`resval` are fixed; only the
//! field entry carries the descriptor's own access modes and reset value.

use crate::util::tabs;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

pub const DEFAULT_SWACCESS: &str = "rw";
pub const DEFAULT_HWACCESS: &str = "hrw";
pub const DEFAULT_RESVAL: &str = "0";
pub const DEFAULT_BITS: &str = "31:0";

/// Hardware access of kernel registers.
pub const KERNEL_HWACCESS: &str = "hro";

const REGISTER_SWACCESS: &str = "ro";
const REGISTER_HWACCESS: &str = "none";
const REGISTER_RESVAL: &str = "0";

/// Metadata for one register and its single field.
///
/// Fields are public and may be changed at any time; [`render`](Self::render)
/// always reads the current values. Nothing is validated, so `bits` is
/// emitted exactly as stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDescriptor {
    /// Register name, also used as the field name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Software access of the field.
    pub swaccess: String,
    /// Hardware access of the field.
    pub hwaccess: String,
    /// Reset value of the field.
    pub resval: String,
    /// Bit range as `high:low`.
    pub bits: String,
    /// CSR address, when the register is also reachable as a CSR.
    pub csr_address: Option<String>,
}

impl RegisterDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            swaccess: DEFAULT_SWACCESS.to_string(),
            hwaccess: DEFAULT_HWACCESS.to_string(),
            resval: DEFAULT_RESVAL.to_string(),
            bits: DEFAULT_BITS.to_string(),
            csr_address: None,
        }
    }

    pub fn with_csr_address(
        name: impl Into<String>,
        description: impl Into<String>,
        csr_address: impl Into<String>,
    ) -> Self {
        Self {
            csr_address: Some(csr_address.into()),
            ..Self::new(name, description)
        }
    }

    /// Renders the register block, nested `indent` levels below the
    /// register list.
    pub fn render(&self, indent: usize) -> String {
        let mut output = String::new();
        let t0 = tabs(indent, 0);
        let t1 = tabs(indent, 1);
        let t2 = tabs(indent, 2);
        let t3 = tabs(indent, 3);

        writeln!(output, "{t0}{{").unwrap();
        writeln!(output, "{t1}name: \"{}\",", self.name).unwrap();
        writeln!(output, "{t1}desc: \"{}\",", self.description).unwrap();
        writeln!(output, "{t1}fields: [").unwrap();
        writeln!(output, "{t2}{{").unwrap();
        writeln!(output, "{t3}bits: \"{}\",", self.bits).unwrap();
        writeln!(output, "{t3}name: \"{}\",", self.name).unwrap();
        writeln!(output, "{t3}desc: \"{}\",", self.description).unwrap();
        writeln!(output, "{t3}swaccess: \"{}\",", self.swaccess).unwrap();
        writeln!(output, "{t3}hwaccess: \"{}\",", self.hwaccess).unwrap();
        writeln!(output, "{t3}resval: \"{}\",", self.resval).unwrap();
        writeln!(output, "{t2}}}").unwrap();
        writeln!(output, "{t1}]").unwrap();
        writeln!(output, "{t1}swaccess: \"{REGISTER_SWACCESS}\",").unwrap();
        writeln!(output, "{t1}hwaccess: \"{REGISTER_HWACCESS}\",").unwrap();
        writeln!(output, "{t1}resval: \"{REGISTER_RESVAL}\",").unwrap();
        writeln!(output, "{t0}}},").unwrap();

        output
    }
}

impl fmt::Display for RegisterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0))
    }
}

/// A kernel control register.
///
/// Kernels are software read-write and hardware read-only. Their instruction
/// encoding (`match_value`/`mask_value`) is filled in by the
/// [encoding scanner](crate::encoding::EncodingScanner); it is not part of
/// the rendered block and is exposed for consumers through serde.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelDescriptor {
    pub register: RegisterDescriptor,
    /// Value of the `MATCH` encoding line for this kernel.
    pub match_value: Option<String>,
    /// Value of the `MASK` encoding line for this kernel.
    pub mask_value: Option<String>,
}

impl KernelDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::from_register(RegisterDescriptor::new(name, description))
    }

    /// Wraps `register`, switching it to kernel access modes.
    pub fn from_register(mut register: RegisterDescriptor) -> Self {
        register.swaccess = DEFAULT_SWACCESS.to_string();
        register.hwaccess = KERNEL_HWACCESS.to_string();
        Self {
            register,
            match_value: None,
            mask_value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.register.name
    }

    /// True once both halves of the encoding have been scanned.
    pub fn has_encoding(&self) -> bool {
        self.match_value.is_some() && self.mask_value.is_some()
    }

    pub fn render(&self, indent: usize) -> String {
        self.register.render(indent)
    }
}

impl fmt::Display for KernelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.register, f)
    }
}

impl AsRef<RegisterDescriptor> for RegisterDescriptor {
    fn as_ref(&self) -> &RegisterDescriptor {
        self
    }
}

impl AsRef<RegisterDescriptor> for KernelDescriptor {
    fn as_ref(&self) -> &RegisterDescriptor {
        &self.register
    }
}
