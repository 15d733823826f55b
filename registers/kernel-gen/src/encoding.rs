// Licensed under the Apache-2.0 license

//! Scanner for kernel instruction encoding headers.
//!
//! Encoding headers define one match and one mask value per kernel:
//!
//! ```text
//! #define MATCH_XMK0_W 0x0000002b
//! #define MASK_XMK0_W  0x0000707f
//! ```
//!
//! Each recognized line targets the kernel at the decimal index following the
//! prefix, in a table the caller sized beforehand. Later lines overwrite
//! earlier ones.

use crate::config::ScanConfig;
use crate::descriptor::KernelDescriptor;
use crate::error::{Error, Result};
use crate::util::strip_keyword;
use log::{debug, trace};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Indexed kernels the scanner fills in.
///
/// The scanner only looks entries up; it never inserts or removes them.
pub trait KernelTable {
    fn kernel_mut(&mut self, index: usize) -> Option<&mut KernelDescriptor>;
    fn kernel_count(&self) -> usize;
}

impl KernelTable for [KernelDescriptor] {
    fn kernel_mut(&mut self, index: usize) -> Option<&mut KernelDescriptor> {
        self.get_mut(index)
    }
    fn kernel_count(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> KernelTable for [KernelDescriptor; N] {
    fn kernel_mut(&mut self, index: usize) -> Option<&mut KernelDescriptor> {
        self.get_mut(index)
    }
    fn kernel_count(&self) -> usize {
        N
    }
}

impl KernelTable for Vec<KernelDescriptor> {
    fn kernel_mut(&mut self, index: usize) -> Option<&mut KernelDescriptor> {
        self.get_mut(index)
    }
    fn kernel_count(&self) -> usize {
        self.len()
    }
}

impl KernelTable for BTreeMap<usize, KernelDescriptor> {
    fn kernel_mut(&mut self, index: usize) -> Option<&mut KernelDescriptor> {
        self.get_mut(&index)
    }
    fn kernel_count(&self) -> usize {
        self.len()
    }
}

impl KernelTable for HashMap<usize, KernelDescriptor> {
    fn kernel_mut(&mut self, index: usize) -> Option<&mut KernelDescriptor> {
        self.get_mut(&index)
    }
    fn kernel_count(&self) -> usize {
        self.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EncodingPart {
    Match,
    Mask,
}

/// Compiled matcher for one [`ScanConfig`].
#[derive(Clone, Debug)]
pub struct EncodingScanner {
    config: ScanConfig,
    pattern: Regex,
}

impl EncodingScanner {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        // The leading `.*` is greedy: with several tokens on a line the last one is used.
        let pattern = Regex::new(&format!(
            r"^.*{}([0-9]+){} (.*)",
            regex::escape(&config.prefix),
            regex::escape(&config.suffix)
        ))?;
        Ok(Self {
            config: config.clone(),
            pattern,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scans the encoding file at `path` into `kernels`.
    ///
    /// The file is read lazily and closed before returning, on success or error.
    pub fn scan_file<T>(&self, path: &Path, kernels: &mut T) -> Result<()>
    where
        T: KernelTable + ?Sized,
    {
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Scanning kernel encodings from {}", path.display());
        self.scan_reader(BufReader::new(file), kernels)
    }

    /// Scans encoding lines from `reader` into `kernels`.
    ///
    /// Kernels updated before a failing line keep their new values.
    pub fn scan_reader<R, T>(&self, reader: R, kernels: &mut T) -> Result<()>
    where
        R: BufRead,
        T: KernelTable + ?Sized,
    {
        for (i, line) in reader.lines().enumerate() {
            let line_number = i + 1;
            let line = line.map_err(|source| Error::Read {
                line: line_number,
                source,
            })?;
            self.scan_line(&line, line_number, kernels)?;
        }
        Ok(())
    }

    fn scan_line<T>(&self, line: &str, line_number: usize, kernels: &mut T) -> Result<()>
    where
        T: KernelTable + ?Sized,
    {
        let Some(caps) = self.pattern.captures(line) else {
            return Ok(());
        };
        let part = if line.contains(&self.config.match_keyword) {
            EncodingPart::Match
        } else if line.contains(&self.config.mask_keyword) {
            EncodingPart::Mask
        } else {
            trace!("line {line_number}: no match/mask keyword, ignoring");
            return Ok(());
        };

        // Indices too large for usize cannot exist in any table.
        let index = caps[1].parse::<usize>().unwrap_or(usize::MAX);
        let len = kernels.kernel_count();
        let kernel = kernels
            .kernel_mut(index)
            .ok_or(Error::IndexOutOfRange {
                index,
                line: line_number,
                len,
            })?;

        match part {
            EncodingPart::Match => {
                let value = strip_keyword(&caps[2], &self.config.match_keyword);
                debug!("kernel {index} ({}): match = {value}", kernel.name());
                kernel.match_value = Some(value.to_string());
            }
            EncodingPart::Mask => {
                let value = strip_keyword(&caps[2], &self.config.mask_keyword);
                debug!("kernel {index} ({}): mask = {value}", kernel.name());
                kernel.mask_value = Some(value.to_string());
            }
        }
        Ok(())
    }
}

/// Scans the encoding file at `path` with the default [`ScanConfig`].
pub fn parse_encoding_file<T>(path: &Path, kernels: &mut T) -> Result<()>
where
    T: KernelTable + ?Sized,
{
    EncodingScanner::new(&ScanConfig::default())?.scan_file(path, kernels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn kernels(count: usize) -> Vec<KernelDescriptor> {
        (0..count)
            .map(|i| KernelDescriptor::new(format!("kernel{i}"), format!("Kernel {i}")))
            .collect()
    }

    fn encoding_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn scan_str<T: KernelTable + ?Sized>(text: &str, kernels: &mut T) -> Result<()> {
        EncodingScanner::new(&ScanConfig::default())
            .unwrap()
            .scan_reader(Cursor::new(text), kernels)
    }

    #[test]
    fn test_keyword_after_token() {
        let file = encoding_file("XMK0_W MATCH 0x1234\nXMK0_W MASK 0xffff\n");
        let mut table = kernels(1);
        parse_encoding_file(file.path(), &mut table).unwrap();
        assert_eq!(table[0].match_value.as_deref(), Some("0x1234"));
        assert_eq!(table[0].mask_value.as_deref(), Some("0xffff"));
        assert!(table[0].has_encoding());
    }

    #[test]
    fn test_header_defines() {
        let file = encoding_file(
            "#ifndef ENCODING_H\n\
             #define ENCODING_H\n\
             #define MATCH_XMK0_W 0x0000002b\n\
             #define MASK_XMK0_W 0x0000707f\n\
             #define MATCH_XMK2_W 0x0000202b\n\
             #define MASK_XMK2_W 0xfe00707f\n\
             DECLARE_INSN(xmk0_w, MATCH_XMK0_W, MASK_XMK0_W)\n\
             #endif\n",
        );
        let mut table = kernels(3);
        parse_encoding_file(file.path(), &mut table).unwrap();
        assert_eq!(table[0].match_value.as_deref(), Some("0x0000002b"));
        assert_eq!(table[0].mask_value.as_deref(), Some("0x0000707f"));
        assert_eq!(table[1].match_value, None);
        assert_eq!(table[1].mask_value, None);
        assert_eq!(table[2].match_value.as_deref(), Some("0x0000202b"));
        assert_eq!(table[2].mask_value.as_deref(), Some("0xfe00707f"));
    }

    #[test]
    fn test_last_write_wins() {
        let mut table = kernels(2);
        scan_str(
            "XMK1_W MATCH 0xaaaa\nunrelated\nXMK1_W MATCH 0xbbbb\n",
            &mut table,
        )
        .unwrap();
        assert_eq!(table[1].match_value.as_deref(), Some("0xbbbb"));
        assert_eq!(table[1].mask_value, None);
        assert_eq!(table[0].match_value, None);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut table = kernels(2);
        let err = scan_str("XMK0_W MATCH 0x0\nXMK5_W MATCH 0x1\n", &mut table).unwrap_err();
        match err {
            Error::IndexOutOfRange { index, line, len } => {
                assert_eq!(index, 5);
                assert_eq!(line, 2);
                assert_eq!(len, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Lines before the failure stay applied.
        assert_eq!(table[0].match_value.as_deref(), Some("0x0"));
    }

    #[test]
    fn test_huge_index_out_of_range() {
        let mut table = kernels(1);
        let err = scan_str("XMK99999999999999999999999_W MATCH 0x1\n", &mut table).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { .. }));
    }

    #[test]
    fn test_no_keyword_ignored() {
        let mut table = kernels(1);
        table[0].match_value = Some("0x1".to_string());
        scan_str("XMK0_W 0x5555\n", &mut table).unwrap();
        assert_eq!(table[0].match_value.as_deref(), Some("0x1"));
        assert_eq!(table[0].mask_value, None);

        // No lookup happens, so an unknown index is not an error either.
        scan_str("XMK9_W 0x5555\n", &mut table).unwrap();
    }

    #[test]
    fn test_match_takes_precedence() {
        let mut table = kernels(1);
        scan_str("MATCH_MASK_XMK0_W 0x7\n", &mut table).unwrap();
        assert_eq!(table[0].match_value.as_deref(), Some("0x7"));
        assert_eq!(table[0].mask_value, None);
    }

    #[test]
    fn test_non_matching_lines_skipped() {
        let mut table = kernels(1);
        scan_str(
            "MATCH_XMK_W 0x1\nMATCH_XMK0_W\nMATCH_XMK0_W0x1\nMASK_XMK0_D 0x2\n\n",
            &mut table,
        )
        .unwrap();
        assert_eq!(table[0], KernelDescriptor::new("kernel0", "Kernel 0"));
    }

    #[test]
    fn test_crlf_and_trailing_text() {
        let mut table = kernels(1);
        scan_str(
            "#define MATCH_XMK0_W 0x2b // conv\r\n#define MASK_XMK0_W  0x7f\r\n",
            &mut table,
        )
        .unwrap();
        assert_eq!(table[0].match_value.as_deref(), Some("0x2b // conv"));
        assert_eq!(table[0].mask_value.as_deref(), Some(" 0x7f"));
    }

    #[test]
    fn test_last_token_on_line() {
        let mut table = kernels(4);
        scan_str("MATCH XMK1_W XMK3_W 0x9\n", &mut table).unwrap();
        assert_eq!(table[1].match_value, None);
        assert_eq!(table[3].match_value.as_deref(), Some("0x9"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = kernels(1);
        let err = parse_encoding_file(&dir.path().join("encoding.h"), &mut table).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
        assert!(err.is_io());
        assert_eq!(table, kernels(1));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut table = kernels(1);
        let data: &[u8] = b"#define MATCH_XMK0_W 0x1\n\xff\xfe\n";
        let err = EncodingScanner::new(&ScanConfig::default())
            .unwrap()
            .scan_reader(data, &mut table)
            .unwrap_err();
        assert!(matches!(err, Error::Read { line: 2, .. }));
        assert_eq!(table[0].match_value.as_deref(), Some("0x1"));
    }

    #[test]
    fn test_map_tables() {
        let mut btree: BTreeMap<usize, KernelDescriptor> = BTreeMap::new();
        btree.insert(4, KernelDescriptor::new("pool", "Pooling"));
        scan_str("MATCH_XMK4_W 0x4\nMASK_XMK4_W 0xf\n", &mut btree).unwrap();
        assert_eq!(btree[&4].match_value.as_deref(), Some("0x4"));
        assert_eq!(btree[&4].mask_value.as_deref(), Some("0xf"));

        let err = scan_str("MATCH_XMK0_W 0x0\n", &mut btree).unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfRange {
                index: 0,
                line: 1,
                len: 1
            }
        ));

        let mut hash: HashMap<usize, KernelDescriptor> = HashMap::new();
        hash.insert(1, KernelDescriptor::new("relu", "Activation"));
        scan_str("MASK_XMK1_W 0x3\n", &mut hash).unwrap();
        assert_eq!(hash[&1].mask_value.as_deref(), Some("0x3"));
    }

    #[test]
    fn test_slice_and_array_tables() {
        let mut array = [
            KernelDescriptor::new("a", "A"),
            KernelDescriptor::new("b", "B"),
        ];
        scan_str("MATCH_XMK1_W 0x1\n", &mut array).unwrap();
        assert_eq!(array[1].match_value.as_deref(), Some("0x1"));

        let slice: &mut [KernelDescriptor] = &mut array[..1];
        let err = scan_str("MATCH_XMK1_W 0x1\n", slice).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { len: 1, .. }));
    }

    #[test]
    fn test_custom_tokens() {
        let config = ScanConfig::new()
            .prefix("ACC.")
            .suffix("(D)")
            .match_keyword("ENC")
            .mask_keyword("MSK");
        let scanner = EncodingScanner::new(&config).unwrap();
        assert_eq!(scanner.config(), &config);

        let mut table = kernels(1);
        scanner
            .scan_reader(
                Cursor::new("ENC_ACC.0(D) 0x10\nMSK_ACC.0(D) 0x1f\nENC_ACCx0(D) 0x99\nMATCH_XMK0_W 0x5\n"),
                &mut table,
            )
            .unwrap();
        assert_eq!(table[0].match_value.as_deref(), Some("0x10"));
        assert_eq!(table[0].mask_value.as_deref(), Some("0x1f"));
    }
}
