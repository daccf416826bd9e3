#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use bigx::BigEntry;
use bigx::big::{HEADER_SIZE, Variant};

/// Builds synthetic archives with payloads laid out right after the table.
pub struct ArchiveBuilder {
    variant: Variant,
    files: Vec<(String, Vec<u8>)>,
    declared_size: Option<u32>,
}

impl ArchiveBuilder {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            files: Vec::new(),
            declared_size: None,
        }
    }

    pub fn file(mut self, path: &str, data: &[u8]) -> Self {
        self.files.push((path.to_string(), data.to_vec()));
        self
    }

    /// Override the header's size field (defaults to the real length).
    pub fn declared_size(mut self, size: u32) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Table entries with offsets as `build` lays them out.
    pub fn entries(&self) -> Vec<BigEntry> {
        let layout = self.variant.layout();
        let toc_len: usize = layout.reserved_len
            + self
                .files
                .iter()
                .map(|(path, _)| layout.entry_prefix_len + 8 + path.len() + 1)
                .sum::<usize>();

        let mut offset = (HEADER_SIZE + toc_len) as u32;
        self.files
            .iter()
            .map(|(path, data)| {
                let entry = BigEntry {
                    offset,
                    size: data.len() as u32,
                    path: path.clone(),
                };
                offset += data.len() as u32;
                entry
            })
            .collect()
    }

    pub fn build(&self) -> Vec<u8> {
        let entries = self.entries();
        let toc = encode_toc(self.variant, &entries);
        let total_len =
            HEADER_SIZE + toc.len() + self.files.iter().map(|(_, d)| d.len()).sum::<usize>();

        let mut out = Vec::with_capacity(total_len);
        out.extend_from_slice(b"BIG");
        out.push(self.variant.tag());
        out.extend_from_slice(
            &self
                .declared_size
                .unwrap_or(total_len as u32)
                .to_le_bytes(),
        );
        out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
        out.extend_from_slice(&toc);
        for (_, data) in &self.files {
            out.extend_from_slice(data);
        }
        out
    }

    /// Write the archive to `dir/name` and return its path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.build()).unwrap();
        path
    }
}

/// Encode the region after the header: reserved bytes, then every entry.
/// Unknown bytes are written as zero.
pub fn encode_toc(variant: Variant, entries: &[BigEntry]) -> Vec<u8> {
    let layout = variant.layout();
    let mut out = vec![0u8; layout.reserved_len];
    for entry in entries {
        out.extend(std::iter::repeat_n(0u8, layout.entry_prefix_len));
        out.extend_from_slice(&entry.offset.to_be_bytes());
        out.extend_from_slice(&entry.size.to_be_bytes());
        out.extend_from_slice(entry.path.as_bytes());
        out.push(0);
    }
    out
}

/// The one-entry archive from the format notes: `a.txt` holding DE AD BE EF
/// at offset 0x20, declared size 0x10.
pub fn sample_archive(variant: Variant) -> Vec<u8> {
    let mut data = b"BIG".to_vec();
    data.push(variant.tag());
    data.extend_from_slice(&0x10u32.to_le_bytes());
    data.extend_from_slice(&1u32.to_be_bytes());
    data.extend(encode_toc(
        variant,
        &[BigEntry {
            offset: 0x20,
            size: 4,
            path: "a.txt".to_string(),
        }],
    ));
    data.resize(0x20, 0);
    data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    data
}

/// Every file under `root`, relative path to contents, sorted.
pub fn read_tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<(String, Vec<u8>)>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                let rel = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push((rel, fs::read(&path).unwrap()));
            }
        }
    }

    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}
