//! Small quick-xml helpers shared by the part parsers.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesStart;

/// Unescaped attribute value, falling back to the raw bytes on bad escapes.
pub(crate) fn attr_value(attr: &Attribute<'_>) -> String {
    match attr.unescape_value() {
        Ok(value) => value.into_owned(),
        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
    }
}

/// Value of the attribute named `key` (qualified name, e.g. `b"xml:space"`).
pub(crate) fn get_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| attr_value(&attr))
}

/// Value of a relationship-id attribute (`r:id`, whatever the prefix).
pub(crate) fn get_relationship_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some())
        .map(|attr| attr_value(&attr))
}

/// Whether a boolean-ish toggle element (`<b/>`, `<i val="0"/>`) is on.
pub(crate) fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(
        get_attr(e, b"val").as_deref(),
        Some("0") | Some("false")
    )
}

/// Parse a numeric attribute, logging values that fail to parse.
pub(crate) fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring unparsable {} {:?}", what, value);
            None
        }
    }
}
