//! Resource identity types shared across the engine.
//!
//! A resource symbol is identified by its canonical URL, the pair of a
//! resource type and a simple name (`@id/submit_button`). Everything else in
//! the engine (collection, renaming, reference propagation) keys off this
//! identity.

use std::fmt;

use crate::markup::AttrPath;

/// Classification of a declared resource.
///
/// The first ten variants mirror the resource types the engine knows how to
/// rename; `File` covers every remaining file-backed resource directory
/// (drawables, menus, raw assets and so on) that carries no special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    String,
    Integer,
    Array,
    Style,
    Color,
    Dimen,
    Attr,
    Id,
    Layout,
    Mipmap,
    File,
}

impl ResourceCategory {
    /// Categories renamed during the plain attribute phase.
    pub const INCLUDED_ATTRIBUTE_CATEGORIES: [Self; 6] = [
        Self::String,
        Self::Integer,
        Self::Array,
        Self::Style,
        Self::Color,
        Self::Dimen,
    ];

    /// Categories whose file-backed form is never renamed by the generic
    /// file phase. Layouts have a phase of their own; the value-backed
    /// categories have no file identity to rename.
    pub const EXCLUDED_FILE_CATEGORIES: [Self; 8] = [
        Self::String,
        Self::Integer,
        Self::Attr,
        Self::Style,
        Self::Color,
        Self::Dimen,
        Self::Layout,
        Self::Mipmap,
    ];

    /// Map a resource URL type segment (the part between `@` and `/`) to a
    /// category. Unknown segments stay unresolved and are skipped by
    /// collection.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        match type_name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "array" => Some(Self::Array),
            "style" => Some(Self::Style),
            "color" => Some(Self::Color),
            "dimen" => Some(Self::Dimen),
            "attr" => Some(Self::Attr),
            "id" => Some(Self::Id),
            "layout" => Some(Self::Layout),
            "mipmap" => Some(Self::Mipmap),
            "drawable" | "anim" | "animator" | "menu" | "xml" | "raw" | "font" | "transition"
            | "navigation" | "interpolator" => Some(Self::File),
            _ => None,
        }
    }

    /// Map a resource directory name (`layout`, `mipmap-hdpi`, `drawable`)
    /// to the category of the files it holds. Configuration qualifiers
    /// after the first `-` are ignored. Value directories return `None`:
    /// a values file is a container of declarations, not a symbol itself.
    pub fn from_res_dir(dir: &str) -> Option<Self> {
        let base = dir.split('-').next().unwrap_or(dir);
        match base {
            "values" => None,
            "layout" => Some(Self::Layout),
            "mipmap" => Some(Self::Mipmap),
            "color" => Some(Self::Color),
            other => Self::from_type_name(other),
        }
    }

    /// Tags that declare a value-backed resource inside a values file,
    /// mapped to (type segment, category).
    pub fn from_value_tag(tag: &str) -> Option<(&'static str, Self)> {
        match tag {
            "string" => Some(("string", Self::String)),
            "integer" => Some(("integer", Self::Integer)),
            "array" | "string-array" | "integer-array" => Some(("array", Self::Array)),
            "style" => Some(("style", Self::Style)),
            "color" => Some(("color", Self::Color)),
            "dimen" => Some(("dimen", Self::Dimen)),
            "attr" => Some(("attr", Self::Attr)),
            _ => None,
        }
    }

    pub fn is_id(&self) -> bool {
        matches!(self, Self::Id)
    }

    pub fn is_layout(&self) -> bool {
        matches!(self, Self::Layout)
    }
}

/// Canonical identity of a resource symbol: type segment plus simple name.
///
/// The raw type segment is kept alongside the category so that two generic
/// file resources of different kinds (`@drawable/a` vs `@menu/a`) never
/// collapse into one identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceUrl {
    pub category: ResourceCategory,
    pub type_name: String,
    pub name: String,
}

impl ResourceUrl {
    pub fn new(type_name: &str, name: &str) -> Option<Self> {
        let category = ResourceCategory::from_type_name(type_name)?;
        if name.is_empty() {
            return None;
        }
        Some(Self {
            category,
            type_name: type_name.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Parse a markup attribute value of the reference shape `@type/name`
    /// or `@+type/name`. Package-qualified references (`@android:string/ok`)
    /// point outside the project and stay unresolved.
    pub fn parse_reference(value: &str) -> Option<Self> {
        let rest = value.strip_prefix('@')?;
        let rest = rest.strip_prefix('+').unwrap_or(rest);
        if rest.contains(':') {
            return None;
        }
        let (type_name, name) = rest.split_once('/')?;
        Self::new(type_name, name)
    }
}

impl fmt::Display for ResourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}/{}", self.type_name, self.name)
    }
}

/// Index of a markup file within the project, in input order.
pub type FileId = usize;

/// Index of a generated/handwritten source file within the project.
pub type SourceId = usize;

/// Address of one attribute value inside one markup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrAddress {
    pub file: FileId,
    pub path: AttrPath,
}

/// Where a symbol's name is physically declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationSite {
    /// An attribute value embedded in a markup file.
    Attribute(AttrAddress),
    /// A file whose name itself is the symbol.
    File(FileId),
}

/// A location that reads a symbol by its old name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSite {
    /// A markup attribute value resolved by simple name lookup.
    Attribute(AttrAddress),
    /// A generated accessor usage in a source file; `name` is the accessor
    /// identifier currently derived from the symbol's name.
    Generated { file: SourceId, name: String },
}

/// A collected symbol: canonical identity plus its owning declaration site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSymbol {
    pub url: ResourceUrl,
    pub site: DeclarationSite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_reference() {
        let url = ResourceUrl::parse_reference("@string/app_name").unwrap();
        assert_eq!(url.category, ResourceCategory::String);
        assert_eq!(url.type_name, "string");
        assert_eq!(url.name, "app_name");
        assert_eq!(url.to_string(), "@string/app_name");
    }

    #[test]
    fn test_parse_id_declaration_reference() {
        let url = ResourceUrl::parse_reference("@+id/submit_button").unwrap();
        assert_eq!(url.category, ResourceCategory::Id);
        // The canonical form drops the `+` marker.
        assert_eq!(url.to_string(), "@id/submit_button");
    }

    #[test]
    fn test_parse_rejects_framework_and_unknown() {
        assert!(ResourceUrl::parse_reference("@android:string/ok").is_none());
        assert!(ResourceUrl::parse_reference("@nonsense/foo").is_none());
        assert!(ResourceUrl::parse_reference("16dp").is_none());
        assert!(ResourceUrl::parse_reference("@string/").is_none());
    }

    #[test]
    fn test_res_dir_mapping() {
        assert_eq!(
            ResourceCategory::from_res_dir("layout"),
            Some(ResourceCategory::Layout)
        );
        assert_eq!(
            ResourceCategory::from_res_dir("mipmap-xxhdpi"),
            Some(ResourceCategory::Mipmap)
        );
        assert_eq!(
            ResourceCategory::from_res_dir("drawable-v24"),
            Some(ResourceCategory::File)
        );
        assert_eq!(ResourceCategory::from_res_dir("values"), None);
        assert_eq!(ResourceCategory::from_res_dir("values-night"), None);
    }

    #[test]
    fn test_category_filters_are_disjoint_where_expected() {
        assert!(
            !ResourceCategory::INCLUDED_ATTRIBUTE_CATEGORIES.contains(&ResourceCategory::Id),
            "ids are renamed by their own phase"
        );
        assert!(
            ResourceCategory::EXCLUDED_FILE_CATEGORIES.contains(&ResourceCategory::Layout),
            "layouts are renamed by their own phase"
        );
    }
}
