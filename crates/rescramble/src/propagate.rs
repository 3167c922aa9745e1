//! Reference propagation after a declaration rename.
//!
//! Invoked once per symbol, immediately after its declaration site has been
//! renamed. Markup reference sites are renamed directly; for categories
//! backing a generated accessor (ids and layouts) the accessor identifier is
//! recomputed from the *new* name and every usage of the old one is
//! retargeted. A symbol nothing references gets no accessor rewrite at all.

use anyhow::Result;
use log::{info, trace};

use crate::{
    accessor,
    project::ProjectLock,
    resources::{ReferenceSite, ResourceCategory, ResourceSymbol},
};

/// Rewrites reference sites for renamed symbols and records the derived-name
/// diagnostics it emits.
#[derive(Debug)]
pub struct ReferencePropagator<'a> {
    lock: &'a ProjectLock,
    diagnostics: Vec<String>,
}

impl<'a> ReferencePropagator<'a> {
    pub fn new(lock: &'a ProjectLock) -> Self {
        Self {
            lock,
            diagnostics: Vec::new(),
        }
    }

    /// Propagate one symbol's rename to all of its reference sites.
    pub fn propagate(&mut self, symbol: &ResourceSymbol, new_name: &str) -> Result<()> {
        match symbol.url.category {
            ResourceCategory::Id => {
                self.propagate_derived(symbol, new_name, "Id", accessor::field_name(new_name))
            }
            ResourceCategory::Layout => {
                let stem = new_name.rsplit_once('.').map_or(new_name, |(stem, _)| stem);
                self.propagate_derived(
                    symbol,
                    stem,
                    "Layout",
                    accessor::binding_class_name(new_name),
                )
            }
            // Plain categories produce no generated accessor; the
            // declaration rename is the whole story.
            _ => Ok(()),
        }
    }

    /// Diagnostics recorded so far, leaving the propagator empty.
    pub fn take_diagnostics(&mut self) -> Vec<String> {
        std::mem::take(&mut self.diagnostics)
    }

    fn propagate_derived(
        &mut self,
        symbol: &ResourceSymbol,
        new_markup_name: &str,
        kind: &str,
        derived: String,
    ) -> Result<()> {
        let references = self.lock.with_read(|project| project.find_references(&symbol.url));
        let Some(references) = references else {
            trace!("no references for {}, skipping accessor rewrite", symbol.url);
            return Ok(());
        };
        self.lock.with_write(|project| -> Result<()> {
            for site in &references {
                if let ReferenceSite::Attribute(address) = site {
                    project.rename_reference_site(address, new_markup_name)?;
                }
            }
            project.rewrite_references(&references, &derived)
        })?;
        let record = format!("[{kind}Binding] >>> {derived}");
        info!("{record}");
        self.diagnostics.push(record);
        Ok(())
    }
}
