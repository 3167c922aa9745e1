//! Reference host: an in-memory project and its scoped access lock.
//!
//! The engine itself only consumes capabilities (scoped read/write sections,
//! reference lookup, declaration renames, generated-code rewrites). This
//! module provides the concrete host used by the binary and the tests: a
//! [`Project`] holding parsed markup files plus the source files that use
//! generated accessors, wrapped in a [`ProjectLock`] whose closures are the
//! consistent-snapshot and exclusive-write sections.

use std::sync::RwLock;

use anyhow::{Result, anyhow};
use log::debug;
use regex::Regex;

use crate::{
    accessor,
    markup::MarkupFile,
    resources::{AttrAddress, DeclarationSite, ReferenceSite, ResourceCategory, ResourceUrl},
};

/// A generated or handwritten source file that may use derived accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the project root.
    pub path: String,
    pub text: String,
}

/// Project state: markup files in input order plus accessor-using sources.
#[derive(Debug, Default)]
pub struct Project {
    pub markup: Vec<MarkupFile>,
    pub sources: Vec<SourceFile>,
}

impl Project {
    pub fn new(markup: Vec<MarkupFile>, sources: Vec<SourceFile>) -> Self {
        Self { markup, sources }
    }

    /// Every site that currently reads `url` by its old name: markup
    /// attribute values resolving to the URL, plus source files using the
    /// accessor derived from it. Returns `None` when nothing references the
    /// symbol.
    pub fn find_references(&self, url: &ResourceUrl) -> Option<Vec<ReferenceSite>> {
        let mut sites = Vec::new();
        for (file_id, file) in self.markup.iter().enumerate() {
            for (path, _, attribute) in file.attributes_dfs() {
                if ResourceUrl::parse_reference(&attribute.value).as_ref() == Some(url) {
                    sites.push(ReferenceSite::Attribute(AttrAddress {
                        file: file_id,
                        path,
                    }));
                }
            }
        }
        if let Some(accessor_name) = derived_accessor(url) {
            let pattern = word_pattern(&accessor_name);
            for (source_id, source) in self.sources.iter().enumerate() {
                if pattern.is_match(&source.text) {
                    sites.push(ReferenceSite::Generated {
                        file: source_id,
                        name: accessor_name.clone(),
                    });
                }
            }
        }
        if sites.is_empty() { None } else { Some(sites) }
    }

    /// Splice a new name into one declaration site: the value of an
    /// attribute node, or a file's own name.
    pub fn rename_declaration(
        &mut self,
        site: &DeclarationSite,
        new_name: &str,
        label: &str,
    ) -> Result<()> {
        match site {
            DeclarationSite::Attribute(address) => {
                let old = self.splice_attribute_value(address, new_name)?;
                debug!("renamed {label} `{old}` -> `{new_name}`");
            }
            DeclarationSite::File(file_id) => {
                let file = self
                    .markup
                    .get_mut(*file_id)
                    .ok_or_else(|| anyhow!("no markup file #{file_id}"))?;
                debug!("renamed {label} `{}` -> `{new_name}`", file.name);
                file.name = new_name.to_owned();
            }
        }
        Ok(())
    }

    /// Rename one markup reference site, preserving the reference prefix
    /// (`@id/` vs `@+id/`).
    pub fn rename_reference_site(&mut self, address: &AttrAddress, new_name: &str) -> Result<()> {
        self.splice_attribute_value(address, new_name).map(|_| ())
    }

    /// Retarget generated-code usages at the given sites to a new derived
    /// name, word-boundary exact.
    pub fn rewrite_references(&mut self, sites: &[ReferenceSite], new_name: &str) -> Result<()> {
        for site in sites {
            let ReferenceSite::Generated { file, name } = site else {
                continue;
            };
            let source = self
                .sources
                .get_mut(*file)
                .ok_or_else(|| anyhow!("no source file #{file}"))?;
            let rewritten = word_pattern(name)
                .replace_all(&source.text, new_name)
                .into_owned();
            debug!("rewrote `{name}` -> `{new_name}` in {}", source.path);
            source.text = rewritten;
        }
        Ok(())
    }

    fn splice_attribute_value(&mut self, address: &AttrAddress, new_name: &str) -> Result<String> {
        let attribute = self
            .markup
            .get_mut(address.file)
            .and_then(|file| file.attribute_mut(&address.path))
            .ok_or_else(|| anyhow!("dangling attribute address in file #{}", address.file))?;
        let value = &attribute.value;
        let new_value = match value.rfind('/') {
            Some(slash) if value.starts_with('@') => format!("{}{new_name}", &value[..=slash]),
            _ => new_name.to_owned(),
        };
        Ok(std::mem::replace(&mut attribute.value, new_value))
    }
}

/// Accessor identifier generated code derives from a symbol's current name,
/// if the category produces one.
fn derived_accessor(url: &ResourceUrl) -> Option<String> {
    match url.category {
        ResourceCategory::Id => Some(accessor::field_name(&url.name)),
        ResourceCategory::Layout => Some(accessor::binding_class_name(&url.name)),
        _ => None,
    }
}

fn word_pattern(name: &str) -> Regex {
    Regex::new(&format!(r"\b{}\b", regex::escape(name)))
        .expect("escaped identifier is a valid pattern")
}

/// Scoped access to the project: `with_read` runs its body under a
/// consistent snapshot, `with_write` with exclusive mutation rights. The
/// guards release on every exit path.
#[derive(Debug)]
pub struct ProjectLock {
    inner: RwLock<Project>,
}

impl ProjectLock {
    pub fn new(project: Project) -> Self {
        Self {
            inner: RwLock::new(project),
        }
    }

    pub fn with_read<R>(&self, body: impl FnOnce(&Project) -> R) -> R {
        let guard = self.inner.read().expect("project lock poisoned");
        body(&guard)
    }

    pub fn with_write<R>(&self, body: impl FnOnce(&mut Project) -> R) -> R {
        let mut guard = self.inner.write().expect("project lock poisoned");
        body(&mut guard)
    }

    pub fn into_inner(self) -> Project {
        self.inner.into_inner().expect("project lock poisoned")
    }
}
