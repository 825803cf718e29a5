//! Generation context: where the solution is written and which value
//! providers fill its tokens.

use std::path::{Path, PathBuf};

use crate::value::{
    CompanyTemplate, DateTimeTemplate, SolutionTemplate, TemplateModel, ValueProviderGroup,
};

/// Supplies the target directory and value providers of a generation run.
pub trait TemplateContext {
    /// Directory under which resources are materialized.
    fn target_dir(&self) -> &Path;

    /// Value provider groups, in the order they are applied.
    fn provider_groups(&self) -> Vec<ValueProviderGroup>;
}

/// Context of a generated solution.
///
/// The built-in `Solution`, `Company` and `DateTime` groups are always
/// registered first; additional groups follow in registration order.
#[derive(Debug, Clone)]
pub struct SolutionContext {
    directory: PathBuf,
    groups: Vec<ValueProviderGroup>,
}

impl SolutionContext {
    pub fn new<P: AsRef<Path>>(directory: P, solution: SolutionTemplate, company: CompanyTemplate) -> Self {
        let directory = directory.as_ref().to_path_buf();
        let solution = if solution.directory.is_empty() {
            SolutionTemplate { directory: directory.display().to_string(), ..solution }
        } else {
            solution
        };

        Self {
            directory,
            groups: vec![
                ValueProviderGroup::from_model(&solution),
                ValueProviderGroup::from_model(&company),
                ValueProviderGroup::from_model(&DateTimeTemplate::new()),
            ],
        }
    }

    /// Registers a group. Properties of an already registered group with the
    /// same name are merged into it, keeping its position.
    pub fn with_group(mut self, group: ValueProviderGroup) -> Self {
        self.add_group(group);
        self
    }

    pub fn with_model(self, model: &dyn TemplateModel) -> Self {
        self.with_group(ValueProviderGroup::from_model(model))
    }

    pub fn add_group(&mut self, group: ValueProviderGroup) {
        match self.groups.iter_mut().find(|existing| existing.is_named(group.name())) {
            Some(existing) => existing.merge(group),
            None => self.groups.push(group),
        }
    }

    pub fn group(&self, name: &str) -> Option<&ValueProviderGroup> {
        self.groups.iter().find(|group| group.is_named(name))
    }
}

impl TemplateContext for SolutionContext {
    fn target_dir(&self) -> &Path {
        &self.directory
    }

    fn provider_groups(&self) -> Vec<ValueProviderGroup> {
        self.groups.clone()
    }
}
