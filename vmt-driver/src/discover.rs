//! Finding the modules of a program on disk

use anyhow::{bail, Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

pub const VM_EXTENSION: &str = "vm";

/// One `.vm` file and the module name it translates under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    pub name: String,
    pub path: PathBuf,
}

impl ModuleFile {
    pub fn from_path(path: PathBuf) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .with_context(|| format!("cannot derive a module name from {}", path.display()))?
            .to_string();
        Ok(Self { name, path })
    }
}

/// Modules of `input`, in translation order
///
/// A file is a single module. A directory contributes every `.vm` file
/// directly inside it, ordered by file name.
pub fn discover_modules(input: &Path) -> Result<Vec<ModuleFile>> {
    if input.is_dir() {
        let dir = input
            .to_str()
            .with_context(|| format!("path is not valid UTF-8: {}", input.display()))?;
        let pattern = format!("{}/*.{}", glob::Pattern::escape(dir), VM_EXTENSION);

        let mut paths = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry?;
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        if paths.is_empty() {
            bail!("no .{} files in {}", VM_EXTENSION, input.display());
        }
        debug!("found {} modules in {}", paths.len(), input.display());
        paths.into_iter().map(ModuleFile::from_path).collect()
    } else if input.extension().is_some_and(|ext| ext == VM_EXTENSION) {
        Ok(vec![ModuleFile::from_path(input.to_path_buf())?])
    } else {
        bail!("{} is neither a .{} file nor a directory", input.display(), VM_EXTENSION)
    }
}

/// `Dir/Dir.asm` for a directory, `File.asm` beside a file
pub fn default_output(input: &Path) -> PathBuf {
    if input.is_dir() {
        let mut name = input
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()))
            .unwrap_or_else(|| "out".into());
        name.push(".asm");
        input.join(name)
    } else {
        input.with_extension("asm")
    }
}
