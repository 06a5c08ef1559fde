//! Network file loader.
//!
//! # Format
//!
//! The simulation's network file (plain or gzip):
//!
//! ```xml
//! <network>
//!   <nodes>
//!     <node id="1" x="4400.0" y="1200.0"/>
//!     <node id="2" x="4500.0" y="1200.0"/>
//!   </nodes>
//!   <links capperiod="01:00:00">
//!     <link id="12" from="1" to="2" length="100.0" freespeed="13.9" .../>
//!   </links>
//! </network>
//! ```
//!
//! Only node coordinates and link endpoints are read.  Each link becomes
//! the straight segment from its from-node to its to-node.  Nodes may appear
//! after the links that reference them.

use std::io::BufRead;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use pp_core::xml::{attributes, find};
use pp_core::{Coord, open_input};

use crate::{LinkNetwork, LinkNetworkBuilder, NetworkError, NetworkResult};

/// Load a network file, transparently decompressing gzip.
pub fn load_network_xml(path: &Path) -> NetworkResult<LinkNetwork> {
    let input = open_input(path)?;
    let net = load_network_reader(input)?;
    log::info!(
        "loaded {} links from {} (bounds {} .. {})",
        net.link_count(),
        path.display(),
        net.bounds().min,
        net.bounds().max,
    );
    Ok(net)
}

/// Like [`load_network_xml`] but accepts any buffered reader.
pub fn load_network_reader<R: BufRead>(input: R) -> NetworkResult<LinkNetwork> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut builder = LinkNetworkBuilder::new();
    let mut raw_links: Vec<(String, String, String)> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                b"node" => {
                    let attrs = attributes(&e)?;
                    let id = required(&attrs, "node", "id")?;
                    let x = coordinate(&attrs, id, "x")?;
                    let y = coordinate(&attrs, id, "y")?;
                    builder.add_node(id, Coord::new(x, y))?;
                }
                b"link" => {
                    let attrs = attributes(&e)?;
                    let id = required(&attrs, "link", "id")?.to_owned();
                    let from = required(&attrs, "link", "from")?.to_owned();
                    let to = required(&attrs, "link", "to")?.to_owned();
                    raw_links.push((id, from, to));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(NetworkError::Xml {
                    position: reader.buffer_position(),
                    message:  e.to_string(),
                });
            }
            Ok(_) => {}
        }
        buf.clear();
    }

    for (id, from, to) in raw_links {
        builder.add_link(id, from, to)?;
    }
    Ok(builder.build())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn required<'a>(attrs: &'a [(String, String)], element: &str, key: &str) -> NetworkResult<&'a str> {
    find(attrs, key)
        .ok_or_else(|| NetworkError::Malformed(format!("<{element}> without {key:?} attribute")))
}

fn coordinate(attrs: &[(String, String)], node: &str, key: &str) -> NetworkResult<f64> {
    let raw = required(attrs, "node", key)?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| NetworkError::Malformed(format!("node {node}: invalid {key} {raw:?}")))
}
