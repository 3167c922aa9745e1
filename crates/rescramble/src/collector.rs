//! Symbol collection over a project-scoped markup file set.
//!
//! Collection is a pure read: every attribute value is walked in depth-first
//! document order (files in input order), resolved to a resource identity
//! where possible, and deduplicated by canonical URL with the first
//! occurrence winning. Unresolvable nodes are skipped silently; they are not
//! an error. The deterministic output order exists for reproducible
//! fixtures, not for the rename itself.

use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use log::{debug, trace};
use rustc_hash::FxHasher;

use crate::{
    markup::{MarkupElement, MarkupFile},
    resources::{AttrAddress, DeclarationSite, ResourceCategory, ResourceSymbol, ResourceUrl},
};

/// Type alias for FxHasher-based IndexMap
type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Collect every attribute-declared symbol: resource references embedded in
/// attribute values plus `name="..."` declarations inside values files.
pub fn collect_attribute_symbols(files: &[MarkupFile]) -> Vec<ResourceSymbol> {
    let mut seen: FxIndexMap<ResourceUrl, ResourceSymbol> = FxIndexMap::default();
    for (file_id, file) in files.iter().enumerate() {
        for (path, element, attribute) in file.attributes_dfs() {
            let Some(url) = resolve_attribute(file, element, &attribute.name, &attribute.value)
            else {
                continue;
            };
            if seen.contains_key(&url) {
                continue;
            }
            trace!("collected {url} from {}/{}", file.dir, file.name);
            let site = DeclarationSite::Attribute(AttrAddress {
                file: file_id,
                path,
            });
            seen.insert(url.clone(), ResourceSymbol { url, site });
        }
    }
    debug!("collected {} attribute symbols", seen.len());
    seen.into_values().collect()
}

/// Collect every file-declared symbol: one per markup file living in a
/// resource directory whose files are themselves resources.
pub fn collect_file_symbols(files: &[MarkupFile]) -> Vec<ResourceSymbol> {
    let mut seen: FxIndexMap<ResourceUrl, ResourceSymbol> = FxIndexMap::default();
    for (file_id, file) in files.iter().enumerate() {
        if ResourceCategory::from_res_dir(&file.dir).is_none() {
            continue;
        }
        let type_name = file.dir.split('-').next().unwrap_or(&file.dir);
        let Some(url) = ResourceUrl::new(type_name, file.stem()) else {
            continue;
        };
        trace!("collected {url} for file {}/{}", file.dir, file.name);
        let site = DeclarationSite::File(file_id);
        seen.entry(url.clone())
            .or_insert(ResourceSymbol { url, site });
    }
    debug!("collected {} file symbols", seen.len());
    seen.into_values().collect()
}

/// Split attribute symbols into the two attribute phases: ids first, then
/// the plain included categories.
pub fn partition_attribute_symbols(
    symbols: Vec<ResourceSymbol>,
) -> (Vec<ResourceSymbol>, Vec<ResourceSymbol>) {
    let mut ids = Vec::new();
    let mut plain = Vec::new();
    for symbol in symbols {
        if symbol.url.category.is_id() {
            ids.push(symbol);
        } else if ResourceCategory::INCLUDED_ATTRIBUTE_CATEGORIES.contains(&symbol.url.category) {
            plain.push(symbol);
        }
    }
    (ids, plain)
}

/// Split file symbols into the two file phases: layouts first, then every
/// file category not in the exclusion set.
pub fn partition_file_symbols(
    symbols: Vec<ResourceSymbol>,
) -> (Vec<ResourceSymbol>, Vec<ResourceSymbol>) {
    let mut layouts = Vec::new();
    let mut generic = Vec::new();
    for symbol in symbols {
        if symbol.url.category.is_layout() {
            layouts.push(symbol);
        } else if !ResourceCategory::EXCLUDED_FILE_CATEGORIES.contains(&symbol.url.category) {
            generic.push(symbol);
        }
    }
    (layouts, generic)
}

fn resolve_attribute(
    file: &MarkupFile,
    element: &MarkupElement,
    attr_name: &str,
    value: &str,
) -> Option<ResourceUrl> {
    if value.starts_with('@') {
        return ResourceUrl::parse_reference(value);
    }
    if attr_name == "name" && file.dir.split('-').next() == Some("values") {
        let (type_name, _) = ResourceCategory::from_value_tag(&element.tag)?;
        return ResourceUrl::new(type_name, value);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;

    fn fixture() -> Vec<MarkupFile> {
        let layout = markup::parse(
            "layout",
            "screen_main.xml",
            r#"<LinearLayout>
                <Button android:id="@+id/submit_button" android:text="@string/submit_label" />
                <TextView android:labelFor="@id/submit_button" android:textColor="@color/primary" />
                <TextView android:text="plain literal" android:padding="16dp" />
            </LinearLayout>"#,
        )
        .unwrap();
        let values = markup::parse(
            "values",
            "strings.xml",
            r#"<resources>
                <string name="submit_label">Submit</string>
                <color name="primary">#ff0000</color>
                <item name="ignored_tag">x</item>
            </resources>"#,
        )
        .unwrap();
        vec![layout, values]
    }

    #[test]
    fn test_dedup_by_canonical_url() {
        let files = fixture();
        let symbols = collect_attribute_symbols(&files);
        let urls: Vec<String> = symbols.iter().map(|s| s.url.to_string()).collect();
        // `@id/submit_button` appears twice in the layout but is collected
        // once, at its first (declaration) occurrence.
        assert_eq!(
            urls,
            vec!["@id/submit_button", "@string/submit_label", "@color/primary"]
        );
        match &symbols[0].site {
            DeclarationSite::Attribute(address) => assert_eq!(address.file, 0),
            DeclarationSite::File(_) => panic!("attribute symbol with file site"),
        }
    }

    #[test]
    fn test_unresolved_values_are_skipped() {
        let files = fixture();
        let symbols = collect_attribute_symbols(&files);
        assert!(
            symbols
                .iter()
                .all(|s| !s.url.name.contains("plain") && s.url.name != "16dp"),
            "literal values must not resolve"
        );
        assert!(symbols.iter().all(|s| s.url.name != "ignored_tag"));
    }

    #[test]
    fn test_collection_is_idempotent() {
        let files = fixture();
        assert_eq!(
            collect_attribute_symbols(&files),
            collect_attribute_symbols(&files)
        );
        assert_eq!(collect_file_symbols(&files), collect_file_symbols(&files));
    }

    #[test]
    fn test_file_symbols_skip_values_files() {
        let files = fixture();
        let symbols = collect_file_symbols(&files);
        let urls: Vec<String> = symbols.iter().map(|s| s.url.to_string()).collect();
        assert_eq!(urls, vec!["@layout/screen_main"]);
        assert_eq!(symbols[0].site, DeclarationSite::File(0));
    }

    #[test]
    fn test_attribute_partition() {
        let files = fixture();
        let (ids, plain) = partition_attribute_symbols(collect_attribute_symbols(&files));
        assert_eq!(ids.len(), 1);
        assert!(ids[0].url.category.is_id());
        assert_eq!(plain.len(), 2);
    }

    #[test]
    fn test_file_partition_excludes_special_categories() {
        let files = vec![
            markup::parse("layout", "a.xml", "<x />").unwrap(),
            markup::parse("drawable", "b.xml", "<x />").unwrap(),
            markup::parse("mipmap-hdpi", "c.xml", "<x />").unwrap(),
        ];
        let (layouts, generic) = partition_file_symbols(collect_file_symbols(&files));
        assert_eq!(layouts.len(), 1);
        assert_eq!(generic.len(), 1);
        assert_eq!(generic[0].url.to_string(), "@drawable/b");
    }
}
