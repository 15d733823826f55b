// Licensed under the Apache-2.0 license

//! Kernel register description generator.
//!
//! This crate reads an instruction-encoding header (lines such as
//! `#define MATCH_XMK3_W 0x0000302b`) and produces register description
//! blocks for the register generation toolchain, one block per kernel.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use registers_kernel_gen::{parse_encoding_file, render_registers, KernelDescriptor};
//!
//! let mut kernels = vec![
//!     KernelDescriptor::new("conv2d", "2D convolution kernel"),
//!     KernelDescriptor::new("gemm", "Matrix multiply kernel"),
//! ];
//! parse_encoding_file(Path::new("encoding.h"), &mut kernels).unwrap();
//! let text = render_registers(&kernels, 0);
//! println!("{text}");
//! ```
//!
//! ## Module Organization
//!
//! - [`descriptor`]: Register and kernel descriptors and their text rendering
//! - [`encoding`]: Encoding header scanner that fills in match/mask values
//! - [`config`]: Scanner and generator configuration ([`ScanConfig`], [`GeneratorConfig`])
//! - [`output`]: Assembly of rendered blocks into generated text
//! - [`error`]: Crate error type

pub mod config;
pub mod descriptor;
pub mod encoding;
pub mod error;
pub mod output;

mod util;

// Re-export main public API
pub use config::{GeneratorConfig, KernelEntry, ScanConfig};
pub use descriptor::{KernelDescriptor, RegisterDescriptor};
pub use encoding::{parse_encoding_file, EncodingScanner, KernelTable};
pub use error::{Error, Result};
pub use output::{
    generate_kernel_registers, generate_kernel_registers_from_config, render_registers,
};
