//! Template resources and the sources that enumerate and open them.

use globset::GlobSet;
use log::debug;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Suffixes of resources copied verbatim instead of being substituted.
pub const BINARY_EXTENSIONS: [&str; 2] = [".exe", ".dll"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Binary,
    Text,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Binary => write!(f, "binary"),
            ResourceKind::Text => write!(f, "text"),
        }
    }
}

/// One file of a template bundle, named relative to the bundle root.
///
/// The relative name may itself contain tokens, e.g. `src/[[SOLUTION.NAME]].sln`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub relative_name: String,
}

impl ResourceDescriptor {
    pub fn new<S: Into<String>>(relative_name: S) -> Self {
        Self { relative_name: relative_name.into() }
    }

    pub fn kind(&self) -> ResourceKind {
        if is_binary(&self.relative_name) {
            ResourceKind::Binary
        } else {
            ResourceKind::Text
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative_name)
    }
}

/// Checks the name against [`BINARY_EXTENSIONS`], ignoring case.
pub fn is_binary(relative_name: &str) -> bool {
    let name = relative_name.to_ascii_lowercase();
    BINARY_EXTENSIONS.iter().any(|extension| name.ends_with(extension))
}

/// Provides the resources of a template bundle.
pub trait ResourceSource {
    /// Lists resources in the order they should be generated.
    fn resources(&self) -> Result<Vec<ResourceDescriptor>>;

    /// Opens the content of a resource previously listed by [`ResourceSource::resources`].
    fn open(&self, descriptor: &ResourceDescriptor) -> Result<Box<dyn Read>>;
}

/// Template bundle stored as a directory tree.
pub struct DirectorySource {
    root: PathBuf,
    ignored: GlobSet,
}

impl DirectorySource {
    /// # Errors
    /// * `Error::TemplateDoesNotExistError` if `root` is not a directory
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::TemplateDoesNotExistError {
                template_dir: root.display().to_string(),
            });
        }
        Ok(Self { root: root.to_path_buf(), ignored: GlobSet::empty() })
    }

    /// Skips every resource whose relative name matches `ignored`.
    pub fn with_ignored(mut self, ignored: GlobSet) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceSource for DirectorySource {
    fn resources(&self) -> Result<Vec<ResourceDescriptor>> {
        let mut resources = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| Error::TemplateError(e.to_string()))?;
            let relative_name = relative_path
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    Error::TemplateError(format!(
                        "invalid resource path: {}",
                        relative_path.display()
                    ))
                })?
                .join("/");

            if self.ignored.is_match(&relative_name) {
                debug!("Skipping resource '{relative_name}' from ignore file");
                continue;
            }

            resources.push(ResourceDescriptor::new(relative_name));
        }
        Ok(resources)
    }

    fn open(&self, descriptor: &ResourceDescriptor) -> Result<Box<dyn Read>> {
        let file = File::open(self.root.join(&descriptor.relative_name))?;
        Ok(Box::new(file))
    }
}

/// Template bundle held in memory, e.g. built from `include_bytes!`.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: Vec<(String, Vec<u8>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resource; resources are listed in insertion order.
    pub fn add<S: Into<String>, B: Into<Vec<u8>>>(mut self, relative_name: S, content: B) -> Self {
        self.files.push((relative_name.into(), content.into()));
        self
    }
}

impl ResourceSource for MemorySource {
    fn resources(&self) -> Result<Vec<ResourceDescriptor>> {
        Ok(self.files.iter().map(|(name, _)| ResourceDescriptor::new(name.as_str())).collect())
    }

    fn open(&self, descriptor: &ResourceDescriptor) -> Result<Box<dyn Read>> {
        self.files
            .iter()
            .find(|(name, _)| *name == descriptor.relative_name)
            .map(|(_, content)| Box::new(Cursor::new(content.clone())) as Box<dyn Read>)
            .ok_or_else(|| Error::ResourceNotFoundError {
                relative_name: descriptor.relative_name.clone(),
            })
    }
}
