//! In-memory markup model plus a reader/writer for the XML subset the tool
//! consumes.
//!
//! The engine never works on markup text directly; files are parsed into
//! this tree once, every mutation edits the tree, and the writer serializes
//! the result back out. Attribute values are addressed by [`AttrPath`], a
//! chain of child indices that stays stable across value edits.

use anyhow::{Context, Result, bail};

/// One markup file: its resource directory, file name, and element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupFile {
    /// Resource directory name, e.g. `layout` or `values-night`.
    pub dir: String,
    /// File name including extension.
    pub name: String,
    pub root: MarkupElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    pub tag: String,
    pub attributes: Vec<MarkupAttribute>,
    pub children: Vec<MarkupNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(MarkupElement),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupAttribute {
    pub name: String,
    pub value: String,
}

/// Stable address of one attribute value within a file: the chain of child
/// indices leading to the owning element, plus the attribute's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrPath {
    pub elements: Vec<usize>,
    pub attr: usize,
}

impl MarkupFile {
    /// File name without its extension.
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }

    /// Resolve a chain of child indices to an element.
    pub fn element(&self, path: &[usize]) -> Option<&MarkupElement> {
        let mut current = &self.root;
        for &index in path {
            match current.children.get(index)? {
                MarkupNode::Element(child) => current = child,
                _ => return None,
            }
        }
        Some(current)
    }

    fn element_mut(&mut self, path: &[usize]) -> Option<&mut MarkupElement> {
        let mut current = &mut self.root;
        for &index in path {
            match current.children.get_mut(index)? {
                MarkupNode::Element(child) => current = child,
                _ => return None,
            }
        }
        Some(current)
    }

    pub fn attribute(&self, path: &AttrPath) -> Option<&MarkupAttribute> {
        self.element(&path.elements)?.attributes.get(path.attr)
    }

    pub fn attribute_mut(&mut self, path: &AttrPath) -> Option<&mut MarkupAttribute> {
        self.element_mut(&path.elements)?.attributes.get_mut(path.attr)
    }

    /// Every attribute in the file in depth-first document order, each with
    /// its address and owning element.
    pub fn attributes_dfs(&self) -> Vec<(AttrPath, &MarkupElement, &MarkupAttribute)> {
        fn walk<'a>(
            element: &'a MarkupElement,
            trail: &mut Vec<usize>,
            out: &mut Vec<(AttrPath, &'a MarkupElement, &'a MarkupAttribute)>,
        ) {
            for (index, attribute) in element.attributes.iter().enumerate() {
                out.push((
                    AttrPath {
                        elements: trail.clone(),
                        attr: index,
                    },
                    element,
                    attribute,
                ));
            }
            for (index, child) in element.children.iter().enumerate() {
                if let MarkupNode::Element(child) = child {
                    trail.push(index);
                    walk(child, trail, out);
                    trail.pop();
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &mut Vec::new(), &mut out);
        out
    }
}

/// Parse markup text into a [`MarkupFile`].
pub fn parse(dir: &str, name: &str, src: &str) -> Result<MarkupFile> {
    let root =
        parse_document(src).with_context(|| format!("failed to parse {dir}/{name}"))?;
    Ok(MarkupFile {
        dir: dir.to_owned(),
        name: name.to_owned(),
        root,
    })
}

/// Serialize a [`MarkupFile`] back to markup text with a standard prolog.
pub fn render(file: &MarkupFile) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    render_element(&file.root, 0, &mut out);
    out
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl Reader<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, lit: &str) -> bool {
        if self.src[self.pos..].starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, lit: &str) -> Result<()> {
        if self.eat(lit) {
            Ok(())
        } else {
            bail!("expected `{lit}` at offset {}", self.pos)
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || "_-.:".contains(c)) {
            self.bump();
        }
        self.src[start..self.pos].to_owned()
    }

    /// Consume everything up to and including `delim`, returning the text
    /// before it.
    fn read_until(&mut self, delim: &str) -> Result<String> {
        match self.src[self.pos..].find(delim) {
            Some(offset) => {
                let content = self.src[self.pos..self.pos + offset].to_owned();
                self.pos += offset + delim.len();
                Ok(content)
            }
            None => bail!("unterminated `{delim}` from offset {}", self.pos),
        }
    }
}

fn parse_document(src: &str) -> Result<MarkupElement> {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);
    let mut reader = Reader { src, pos: 0 };
    reader.skip_ws();
    if reader.eat("<?") {
        reader.read_until("?>")?;
    }
    let root = loop {
        reader.skip_ws();
        if reader.eat("<!--") {
            reader.read_until("-->")?;
            continue;
        }
        break parse_element(&mut reader)?;
    };
    loop {
        reader.skip_ws();
        if reader.eat("<!--") {
            reader.read_until("-->")?;
            continue;
        }
        break;
    }
    if reader.peek().is_some() {
        bail!("trailing content at offset {}", reader.pos);
    }
    Ok(root)
}

fn parse_element(reader: &mut Reader<'_>) -> Result<MarkupElement> {
    reader.expect("<")?;
    let tag = reader.read_name();
    if tag.is_empty() {
        bail!("missing element name at offset {}", reader.pos);
    }
    let mut attributes = Vec::new();
    loop {
        reader.skip_ws();
        if reader.eat("/>") {
            return Ok(MarkupElement {
                tag,
                attributes,
                children: Vec::new(),
            });
        }
        if reader.eat(">") {
            break;
        }
        let name = reader.read_name();
        if name.is_empty() {
            bail!("malformed attribute in <{tag}> at offset {}", reader.pos);
        }
        reader.skip_ws();
        reader.expect("=")?;
        reader.skip_ws();
        let raw = match reader.bump() {
            Some('"') => reader.read_until("\"")?,
            Some('\'') => reader.read_until("'")?,
            _ => bail!("unquoted value for `{name}` at offset {}", reader.pos),
        };
        attributes.push(MarkupAttribute {
            name,
            value: unescape(&raw),
        });
    }
    let children = parse_children(reader, &tag)?;
    Ok(MarkupElement {
        tag,
        attributes,
        children,
    })
}

fn parse_children(reader: &mut Reader<'_>, tag: &str) -> Result<Vec<MarkupNode>> {
    let mut children = Vec::new();
    loop {
        if reader.eat("</") {
            let close = reader.read_name();
            if close != tag {
                bail!("mismatched closing tag `</{close}>` for <{tag}>");
            }
            reader.skip_ws();
            reader.expect(">")?;
            return Ok(children);
        }
        if reader.eat("<!--") {
            let comment = reader.read_until("-->")?;
            children.push(MarkupNode::Comment(comment.trim().to_owned()));
            continue;
        }
        if reader.eat("<![CDATA[") {
            let text = reader.read_until("]]>")?;
            children.push(MarkupNode::Text(text));
            continue;
        }
        match reader.peek() {
            Some('<') => children.push(MarkupNode::Element(parse_element(reader)?)),
            Some(_) => {
                let start = reader.pos;
                while matches!(reader.peek(), Some(c) if c != '<') {
                    reader.bump();
                }
                let text = unescape(&reader.src[start..reader.pos]);
                let text = text.trim();
                if !text.is_empty() {
                    children.push(MarkupNode::Text(text.to_owned()));
                }
            }
            None => bail!("unexpected end of input inside <{tag}>"),
        }
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(index) = rest.find('&') {
        out.push_str(&rest[..index]);
        rest = &rest[index..];
        if let Some(end) = rest.find(';') {
            let replacement = match &rest[1..end] {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => None,
            };
            if let Some(c) = replacement {
                out.push(c);
                rest = &rest[end + 1..];
                continue;
            }
        }
        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

fn escape(s: &str, in_attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_element(element: &MarkupElement, depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(&element.tag);
    for attribute in &element.attributes {
        out.push(' ');
        out.push_str(&attribute.name);
        out.push_str("=\"");
        out.push_str(&escape(&attribute.value, true));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str(" />\n");
        return;
    }
    out.push('>');
    if let [MarkupNode::Text(text)] = element.children.as_slice() {
        out.push_str(&escape(text, false));
    } else {
        out.push('\n');
        for child in &element.children {
            match child {
                MarkupNode::Element(nested) => render_element(nested, depth + 1, out),
                MarkupNode::Text(text) => {
                    out.push_str(&"    ".repeat(depth + 1));
                    out.push_str(&escape(text, false));
                    out.push('\n');
                }
                MarkupNode::Comment(comment) => {
                    out.push_str(&"    ".repeat(depth + 1));
                    out.push_str("<!-- ");
                    out.push_str(comment);
                    out.push_str(" -->\n");
                }
            }
        }
        out.push_str(&indent);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push_str(">\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android"
    android:orientation="vertical">
    <!-- primary action -->
    <Button
        android:id="@+id/submit_button"
        android:text="@string/submit_label" />
</LinearLayout>
"#;

    #[test]
    fn test_parse_layout_shape() {
        let file = parse("layout", "screen_main.xml", LAYOUT).unwrap();
        assert_eq!(file.stem(), "screen_main");
        assert_eq!(file.root.tag, "LinearLayout");
        assert_eq!(file.root.children.len(), 2);
        let button = file.element(&[1]).expect("button element");
        assert_eq!(button.tag, "Button");
        assert_eq!(button.attributes[0].value, "@+id/submit_button");
    }

    #[test]
    fn test_attributes_dfs_document_order() {
        let file = parse("layout", "screen_main.xml", LAYOUT).unwrap();
        let values: Vec<&str> = file
            .attributes_dfs()
            .iter()
            .map(|(_, _, attribute)| attribute.value.as_str())
            .collect();
        assert_eq!(
            values,
            vec![
                "http://schemas.android.com/apk/res/android",
                "vertical",
                "@+id/submit_button",
                "@string/submit_label",
            ]
        );
    }

    #[test]
    fn test_attribute_addressing() {
        let mut file = parse("layout", "screen_main.xml", LAYOUT).unwrap();
        let (path, _, attribute) = file
            .attributes_dfs()
            .into_iter()
            .find(|(_, _, attribute)| attribute.value == "@+id/submit_button")
            .map(|(path, element, attribute)| (path, element.tag.clone(), attribute.clone()))
            .expect("id attribute");
        assert_eq!(file.attribute(&path), Some(&attribute));
        file.attribute_mut(&path).unwrap().value = "@+id/x".to_owned();
        assert_eq!(file.attribute(&path).unwrap().value, "@+id/x");
    }

    #[test]
    fn test_render_round_trip() {
        let file = parse("layout", "screen_main.xml", LAYOUT).unwrap();
        let rendered = render(&file);
        let reparsed = parse("layout", "screen_main.xml", &rendered).unwrap();
        assert_eq!(file, reparsed);
    }

    #[test]
    fn test_text_and_entities() {
        let file = parse(
            "values",
            "strings.xml",
            r#"<resources><string name="amp">a &amp; b</string></resources>"#,
        )
        .unwrap();
        let string = file.element(&[0]).unwrap();
        assert_eq!(string.children, vec![MarkupNode::Text("a & b".to_owned())]);
        let rendered = render(&file);
        assert!(rendered.contains("a &amp; b"));
    }

    #[test]
    fn test_mismatched_tag_is_an_error() {
        assert!(parse("layout", "bad.xml", "<a><b></a></b>").is_err());
        assert!(parse("layout", "bad.xml", "<a>").is_err());
    }
}
