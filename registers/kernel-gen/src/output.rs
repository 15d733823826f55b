// Licensed under the Apache-2.0 license

//! Assembly of rendered register blocks.
//!
//! ```text
//! encoding header ──scan──▶ KernelDescriptor[] ──render──▶ register list text
//!                               ▲
//! GeneratorConfig ──kernels()───┘
//! ```
//!
//! The text is a sequence of register entries meant to be pasted into a
//! larger register description; no enclosing document is emitted.

use crate::config::GeneratorConfig;
use crate::descriptor::{KernelDescriptor, RegisterDescriptor};
use crate::encoding::{EncodingScanner, KernelTable};
use crate::error::Result;
use log::info;
use std::path::Path;

/// Concatenates the rendered blocks of `descriptors`, in order.
pub fn render_registers<I, D>(descriptors: I, indent: usize) -> String
where
    I: IntoIterator<Item = D>,
    D: AsRef<RegisterDescriptor>,
{
    descriptors
        .into_iter()
        .map(|d| d.as_ref().render(indent))
        .collect()
}

/// Fills `kernels` from the encoding file and renders them.
pub fn generate_kernel_registers(
    encoding_file: &Path,
    kernels: &mut [KernelDescriptor],
    indent: usize,
) -> Result<String> {
    crate::encoding::parse_encoding_file(encoding_file, kernels)?;
    Ok(render_registers(kernels.iter(), indent))
}

/// Builds the kernels listed in `config`, fills them from the encoding file
/// and renders them.
///
/// Returns the kernels, with their match/mask values, alongside the text.
pub fn generate_kernel_registers_from_config(
    config: &GeneratorConfig,
    encoding_file: &Path,
) -> Result<(Vec<KernelDescriptor>, String)> {
    let scanner = EncodingScanner::new(&config.scan)?;
    let mut kernels = config.kernels();
    scanner.scan_file(encoding_file, &mut kernels)?;

    let missing = kernels.iter().filter(|k| !k.has_encoding()).count();
    if missing > 0 {
        info!(
            "{missing} of {} kernels have no complete encoding in {}",
            kernels.kernel_count(),
            encoding_file.display()
        );
    }

    let text = render_registers(&kernels, config.indent);
    Ok((kernels, text))
}
