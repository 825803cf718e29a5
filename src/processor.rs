//! Core generation orchestration.
//! Materializes every resource of a template into the target directory,
//! substituting tokens in resource paths and text contents.

use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

use crate::context::TemplateContext;
use crate::engine::TemplateEngine;
use crate::error::{Error, Result};
use crate::resource::{ResourceDescriptor, ResourceKind, ResourceSource};
use crate::value::ValueProviderGroup;

const UTF8_BOM: &str = "\u{feff}";

/// Outcome of materializing one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub source: String,
    pub target: PathBuf,
    pub kind: ResourceKind,
}

/// Drives the [`TemplateEngine`] over every resource of a [`ResourceSource`].
pub struct Processor<'a> {
    engine: &'a TemplateEngine,
    source: &'a dyn ResourceSource,
}

impl<'a> Processor<'a> {
    pub fn new(engine: &'a TemplateEngine, source: &'a dyn ResourceSource) -> Self {
        Self { engine, source }
    }

    /// Generates every resource, sequentially and in source order.
    ///
    /// # Returns
    /// * `Result<Vec<GeneratedFile>>` - Written files in processing order
    ///
    /// # Errors
    /// Any failure stops the run. Files written before the failure are kept.
    pub fn generate(&self, context: &dyn TemplateContext) -> Result<Vec<GeneratedFile>> {
        let groups = context.provider_groups();
        debug!("Found '{}' value provider groups on context", groups.len());

        let resources = self.source.resources()?;
        debug!("Found '{}' resources", resources.len());

        let mut generated = Vec::with_capacity(resources.len());
        for resource in &resources {
            generated.push(self.process(context.target_dir(), &groups, resource)?);
        }

        info!("Generated '{}' files in '{}'", generated.len(), context.target_dir().display());
        Ok(generated)
    }

    /// Materializes a single resource under `target_dir`.
    pub fn process(
        &self,
        target_dir: &Path,
        groups: &[ValueProviderGroup],
        resource: &ResourceDescriptor,
    ) -> Result<GeneratedFile> {
        let kind = resource.kind();

        debug!("Determining final name for '{resource}'");
        let target_name = self.engine.substitute_all(&resource.relative_name, groups)?;
        let target = resolve_target_path(&target_name, target_dir)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut source = self.source.open(resource)?;
        match kind {
            ResourceKind::Binary => {
                debug!("Copying binary content for '{resource}'");
                let mut writer = BufWriter::new(File::create(&target)?);
                io::copy(&mut source, &mut writer)?;
                writer.flush()?;
            }
            ResourceKind::Text => {
                debug!("Extracting content for '{resource}'");
                let content = read_text(source.as_mut())?;

                debug!("Replacing template values in content for '{resource}'");
                let content = self.engine.substitute_all(&content, groups)?;
                let mut writer = BufWriter::new(File::create(&target)?);
                writer.write_all(content.as_bytes())?;
                writer.flush()?;
            }
        }

        debug!("Extracted resource '{resource}' to '{target_name}'");
        Ok(GeneratedFile { source: resource.relative_name.clone(), target, kind })
    }
}

/// Reads UTF-8 text, dropping a leading byte order mark.
fn read_text(source: &mut dyn Read) -> Result<String> {
    let mut content = String::new();
    source.read_to_string(&mut content)?;
    Ok(match content.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Ensures the output directory is safe to write to.
///
/// # Arguments
/// * `output_dir` - Target directory path for generated output
/// * `force` - Whether to write into an existing directory
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the directory exists and force is false
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

/// Joins a substituted resource name under `target_dir`.
///
/// # Errors
/// * `Error::TemplateError` if the name is empty, absolute or contains `..`
pub fn resolve_target_path<P: AsRef<Path>>(target_name: &str, target_dir: P) -> Result<PathBuf> {
    let relative = Path::new(target_name);
    let escapes = relative.components().any(|component| {
        matches!(component, Component::RootDir | Component::Prefix(_) | Component::ParentDir)
    });

    if target_name.trim().is_empty() || escapes {
        return Err(Error::TemplateError(format!(
            "invalid target path '{target_name}' for resource"
        )));
    }
    Ok(target_dir.as_ref().join(relative))
}
