//! Attribute access for the simulation's XML files.
//!
//! Event logs and networks are flat lists of attribute-only elements
//! (`<event time=".." type=".." .../>`, `<node id=".." x=".." y=".."/>`), so
//! loaders only ever need an element's attributes as owned strings.

use quick_xml::events::BytesStart;

use crate::{CoreError, CoreResult};

/// Collect the attributes of `e` as unescaped `(key, value)` pairs in
/// document order.
pub fn attributes(e: &BytesStart<'_>) -> CoreResult<Vec<(String, String)>> {
    e.attributes()
        .map(|attr| {
            let attr = attr.map_err(|err| CoreError::Parse(format!("malformed XML attribute: {err}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| CoreError::Parse(format!("non-UTF-8 attribute name: {err}")))?
                .to_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| CoreError::Parse(format!("bad value for attribute {key:?}: {err}")))?
                .into_owned();
            Ok((key, value))
        })
        .collect()
}

/// Value of attribute `key`, if present.
pub fn find<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}
