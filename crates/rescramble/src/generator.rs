//! Randomized name generation with a process-lifetime issued-name registry.
//!
//! The registry is the single source of truth for every name the generator
//! has ever handed out, keyed by name kind: attribute-backed identifiers and
//! file-backed names obey different syntactic rules and draw from separate
//! pools. Repeated runs against the same registry never reissue a name.

use std::sync::Mutex;

use anyhow::{Result, anyhow};
use log::trace;
use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng, rngs::StdRng};
use regex::Regex;
use rustc_hash::FxHashSet;

/// Name-generation capabilities consumed by the orchestrator.
///
/// The two entry points are deliberately independent: file names carry an
/// extension, identifiers must start with a letter.
pub trait NameSource {
    /// A fresh attribute-backed identifier, unique for the lifetime of the
    /// source.
    fn next_attribute_name(&self) -> Result<String>;
    /// A fresh file-backed name including its extension, unique for the
    /// lifetime of the source.
    fn next_file_name(&self) -> Result<String>;
}

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*$").expect("valid identifier pattern"));

const HEAD_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const TAIL_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Attempts per draw before the generator reports exhaustion. With the
/// default name length the space is far larger than any real project, so
/// hitting this limit indicates a misconfigured length of 1-2 characters.
const MAX_ATTEMPTS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
enum NameKind {
    Attribute,
    File,
}

impl NameKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::File => "file",
        }
    }
}

#[derive(Debug)]
struct RegistryState {
    rng: StdRng,
    issued_attribute: FxHashSet<String>,
    issued_file: FxHashSet<String>,
}

impl RegistryState {
    fn issued_mut(&mut self, kind: NameKind) -> &mut FxHashSet<String> {
        match kind {
            NameKind::Attribute => &mut self.issued_attribute,
            NameKind::File => &mut self.issued_file,
        }
    }
}

/// Seedable random name source backed by per-kind issued-name sets.
///
/// Interior state lives behind a mutex so reentrant use cannot corrupt the
/// registry; the engine itself calls it from one thread only.
#[derive(Debug)]
pub struct NameRegistry {
    length: usize,
    state: Mutex<RegistryState>,
}

impl NameRegistry {
    pub fn new(length: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            length: length.max(1),
            state: Mutex::new(RegistryState {
                rng,
                issued_attribute: FxHashSet::default(),
                issued_file: FxHashSet::default(),
            }),
        }
    }

    fn random_identifier(rng: &mut StdRng, length: usize) -> String {
        let mut name = String::with_capacity(length);
        name.push(HEAD_CHARS[rng.gen_range(0..HEAD_CHARS.len())] as char);
        for _ in 1..length {
            name.push(TAIL_CHARS[rng.gen_range(0..TAIL_CHARS.len())] as char);
        }
        name
    }

    fn issue(&self, kind: NameKind) -> Result<String> {
        let mut state = self.state.lock().expect("name registry lock poisoned");
        for _ in 0..MAX_ATTEMPTS {
            let candidate = Self::random_identifier(&mut state.rng, self.length);
            debug_assert!(IDENT_RE.is_match(&candidate));
            if state.issued_mut(kind).insert(candidate.clone()) {
                trace!("issued {} name `{candidate}`", kind.as_str());
                return Ok(candidate);
            }
        }
        Err(anyhow!(
            "name space exhausted for {} names after {MAX_ATTEMPTS} attempts (length {})",
            kind.as_str(),
            self.length
        ))
    }
}

impl NameSource for NameRegistry {
    fn next_attribute_name(&self) -> Result<String> {
        self.issue(NameKind::Attribute)
    }

    fn next_file_name(&self) -> Result<String> {
        let stem = self.issue(NameKind::File)?;
        Ok(format!("{stem}.xml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_across_draws() {
        let registry = NameRegistry::new(6, Some(7));
        let mut seen = FxHashSet::default();
        for _ in 0..500 {
            assert!(seen.insert(registry.next_attribute_name().unwrap()));
        }
    }

    #[test]
    fn test_names_are_unique_across_runs_of_one_registry() {
        let registry = NameRegistry::new(6, Some(7));
        let first_run: FxHashSet<String> =
            (0..50).map(|_| registry.next_attribute_name().unwrap()).collect();
        for _ in 0..50 {
            assert!(!first_run.contains(&registry.next_attribute_name().unwrap()));
        }
    }

    #[test]
    fn test_attribute_names_are_valid_identifiers() {
        let registry = NameRegistry::new(8, Some(11));
        for _ in 0..100 {
            let name = registry.next_attribute_name().unwrap();
            assert!(IDENT_RE.is_match(&name), "bad identifier: {name}");
        }
    }

    #[test]
    fn test_file_names_carry_extension() {
        let registry = NameRegistry::new(8, Some(11));
        let name = registry.next_file_name().unwrap();
        assert!(name.ends_with(".xml"));
        assert!(IDENT_RE.is_match(name.strip_suffix(".xml").unwrap()));
    }

    #[test]
    fn test_seed_makes_generation_deterministic() {
        let a = NameRegistry::new(8, Some(42));
        let b = NameRegistry::new(8, Some(42));
        for _ in 0..20 {
            assert_eq!(
                a.next_attribute_name().unwrap(),
                b.next_attribute_name().unwrap()
            );
        }
    }

    #[test]
    fn test_exhaustion_is_reported() {
        // Length 1 limits the space to 26 names.
        let registry = NameRegistry::new(1, Some(3));
        let mut issued = 0;
        for _ in 0..26 {
            if registry.next_attribute_name().is_ok() {
                issued += 1;
            }
        }
        assert_eq!(issued, 26);
        assert!(registry.next_attribute_name().is_err());
    }
}
