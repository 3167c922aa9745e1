//! Derived accessor-name transforms.
//!
//! Generated code accesses resources through identifiers mechanically
//! derived from resource names: an id backs a lower-camel field, a layout
//! file backs a Pascal-case class with a fixed `Binding` suffix. The
//! transforms are pure and deterministic; the propagator recomputes them
//! from a symbol's *new* name after every rename.

/// Fixed suffix of generated accessor classes.
pub const BINDING_SUFFIX: &str = "Binding";

/// Lower-camel field name derived from an id.
///
/// Chunks split on `_`/`-` are camel-joined (`submit_button` →
/// `submitButton`). Within a chunk, the first letter after the first digit
/// run is uppercased (`k3f9x` → `k3F9x`); subsequent digit runs leave the
/// following letters untouched.
pub fn field_name(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut first = true;
    for chunk in id.split(['_', '-']).filter(|chunk| !chunk.is_empty()) {
        out.push_str(&camel_chunk(chunk, !first));
        first = false;
    }
    out
}

/// Pascal-case class name derived from a file name; the extension is
/// stripped first (`screen_main.xml` → `ScreenMain`, `q7z2.xml` → `Q7z2`).
pub fn class_name(file_name: &str) -> String {
    let base = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    let mut out = String::with_capacity(base.len());
    for chunk in base.split(['_', '-']).filter(|chunk| !chunk.is_empty()) {
        let mut chars = chunk.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Generated accessor class name for a layout file.
pub fn binding_class_name(file_name: &str) -> String {
    let mut out = class_name(file_name);
    out.push_str(BINDING_SUFFIX);
    out
}

fn camel_chunk(chunk: &str, capitalize_head: bool) -> String {
    let mut out = String::with_capacity(chunk.len());
    let mut in_digit_run = false;
    let mut raised = false;
    for (index, c) in chunk.chars().enumerate() {
        if index == 0 && capitalize_head {
            out.extend(c.to_uppercase());
            continue;
        }
        if c.is_ascii_digit() {
            if !raised {
                in_digit_run = true;
            }
            out.push(c);
        } else if in_digit_run && !raised {
            out.extend(c.to_uppercase());
            raised = true;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_camel_joins_chunks() {
        assert_eq!(field_name("submit_button"), "submitButton");
        assert_eq!(field_name("nav_bar-title"), "navBarTitle");
        assert_eq!(field_name("plain"), "plain");
    }

    #[test]
    fn test_field_name_raises_letter_after_first_digit_run() {
        assert_eq!(field_name("k3f9x"), "k3F9x");
        assert_eq!(field_name("item2label"), "item2Label");
    }

    #[test]
    fn test_class_name_strips_extension() {
        assert_eq!(class_name("screen_main.xml"), "ScreenMain");
        assert_eq!(class_name("q7z2.xml"), "Q7z2");
    }

    #[test]
    fn test_binding_class_name() {
        assert_eq!(binding_class_name("screen_main.xml"), "ScreenMainBinding");
        assert_eq!(binding_class_name("q7z2.xml"), "Q7z2Binding");
        assert_eq!(binding_class_name("q7z2"), "Q7z2Binding");
    }
}
