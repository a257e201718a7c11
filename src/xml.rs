//! XML namespaces and small tree helpers shared by the SRU and manifest parsers.

use roxmltree::Node;

/// SRU (Search/Retrieve via URL) response namespace.
pub const NS_SRW: &str = "http://www.loc.gov/zing/srw/";
/// KB DDD record namespace carrying the `metadataKey` field.
pub const NS_DDDX: &str = "http://www.kb.nl/ddd";
/// OAI-PMH envelope namespace.
pub const NS_OAI: &str = "http://www.openarchives.org/OAI/2.0/";
/// MPEG-21 DIDL namespace.
pub const NS_DIDL: &str = "urn:mpeg:mpeg21:2002:02-DIDL-NS";
/// Dublin Core elements.
pub const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
/// KB DCX extensions (record identifiers, checksums, filenames).
pub const NS_DCX: &str = "http://krait.kb.nl/coop/tel/handbook/telterms.html";
/// XML Schema instance namespace (`xsi:type`).
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Returns the first element among `node`'s children with the given name.
pub(crate) fn child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name((namespace, name)))
}

/// Iterates over `node`'s child elements with the given name.
pub(crate) fn children<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name((namespace, name)))
}

/// Returns the first element in document order below (or at) `node` with the given name.
pub(crate) fn descendant<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.has_tag_name((namespace, name)))
}

/// Returns the trimmed, non-empty text content of an element.
pub(crate) fn text_of<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.text().map(str::trim).filter(|text| !text.is_empty())
}

/// Serializes an element as a standalone XML document.
///
/// The element's source text is reused verbatim. Namespace declarations that
/// were inherited from ancestors are added to the start tag so the fragment
/// stays resolvable on its own.
#[must_use]
pub fn standalone_fragment(node: Node<'_, '_>) -> String {
    let source = &node.document().input_text()[node.range()];
    let (start_tag_end, own_attributes) = scan_start_tag(source);
    let start_tag = &source[..start_tag_end];
    let name_end = start_tag
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_whitespace() || *c == '/')
        .map_or(start_tag_end, |(index, _)| index);

    let mut declarations = String::new();
    for namespace in node.namespaces() {
        let attribute = match namespace.name() {
            Some("xml") => continue,
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        if own_attributes.contains(&attribute.as_str()) {
            continue;
        }
        declarations.push_str(&format!(
            " {attribute}=\"{}\"",
            escape_attribute(namespace.uri())
        ));
    }

    let mut out = String::with_capacity(XML_DECLARATION.len() + source.len() + declarations.len());
    out.push_str(XML_DECLARATION);
    out.push_str(&source[..name_end]);
    out.push_str(&declarations);
    out.push_str(&source[name_end..]);
    out
}

/// Finds the `>` closing the start tag and the attribute names declared in it.
///
/// Quoted attribute values may contain `>` and `=`, so both are only
/// recognized outside quotes.
fn scan_start_tag(source: &str) -> (usize, Vec<&str>) {
    let mut names = Vec::new();
    let mut quote = None;
    let mut segment_start = 0;
    for (index, c) in source.char_indices() {
        match quote {
            Some(open) if c == open => {
                quote = None;
                segment_start = index + 1;
            }
            Some(_) => {}
            None => match c {
                '"' | '\'' => {
                    names.extend(attribute_name(&source[segment_start..index]));
                    quote = Some(c);
                }
                '>' => return (index, names),
                _ => {}
            },
        }
    }
    (source.len(), names)
}

/// The name in an unquoted run ending with `name =`.
fn attribute_name(segment: &str) -> Option<&str> {
    let before_equals = segment.trim_end().strip_suffix('=')?.trim_end();
    before_equals
        .rsplit(char::is_whitespace)
        .next()
        .filter(|name| !name.is_empty())
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
