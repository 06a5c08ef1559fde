//! Lazy reader for the simulation's XML event log.
//!
//! # Format
//!
//! ```xml
//! <events version="1.0">
//!   <event time="21600.0" type="entered link" person="p1" link="12" vehicle="v1"/>
//!   <event time="21610.0" type="warmEmissionEvent" linkId="12" vehicleId="v1" CO="0.01" NOx="0.2"/>
//!   <event time="21640.0" type="left link" link="12" vehicle="v1"/>
//! </events>
//! ```
//!
//! | `type`                                    | Produces                  |
//! |-------------------------------------------|---------------------------|
//! | `entered link`, `left link`               | `Event::LinkTraversal`    |
//! | `warmEmissionEvent`, `coldEmissionEvent`  | `Event::Emission`         |
//! | anything else                             | skipped (counted)         |
//!
//! For emission events every attribute other than `time`, `type`, `linkId`
//! and `vehicleId` is a pollutant amount.

use std::io::BufRead;
use std::path::Path;

use quick_xml::events::Event as XmlEvent;
use quick_xml::reader::Reader;

use pp_core::xml::{attributes, find};
use pp_core::{InputReader, LinkId, VehicleId, open_input};

use crate::event::{EmissionKind, EmissionRecord, Event, LinkTraversal, TraversalDirection};
use crate::{EventError, EventResult};

/// Attributes of an emission event that are not pollutant amounts.
const EMISSION_META: [&str; 4] = ["time", "type", "linkId", "vehicleId"];

/// Forward-only iterator over the events of one log.
///
/// Yields `Err` at most once; iteration ends after the first error.
pub struct EventReader<R: BufRead> {
    reader:  Reader<R>,
    buf:     Vec<u8>,
    /// `<event>` elements seen so far, including skipped ones.
    seen:    u64,
    skipped: u64,
    done:    bool,
}

impl EventReader<InputReader> {
    /// Open an event log, transparently decompressing gzip.
    pub fn from_path(path: &Path) -> EventResult<Self> {
        log::debug!("opening event log {}", path.display());
        Ok(Self::new(open_input(path)?))
    }
}

impl<R: BufRead> EventReader<R> {
    pub fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::with_capacity(512),
            seen: 0,
            skipped: 0,
            done: false,
        }
    }

    /// Number of `<event>` elements read so far.
    pub fn events_seen(&self) -> u64 {
        self.seen
    }

    /// Number of events of types no consumer here cares about.
    pub fn events_skipped(&self) -> u64 {
        self.skipped
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = EventResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                Ok(XmlEvent::Empty(e)) | Ok(XmlEvent::Start(e)) if e.name().as_ref() == b"event" => {
                    self.seen += 1;
                    let parsed = attributes(&e)
                        .map_err(EventError::from)
                        .and_then(|attrs| parse_event(self.seen, &attrs));
                    match parsed {
                        Ok(Some(event)) => return Some(Ok(event)),
                        Ok(None) => self.skipped += 1,
                        Err(err) => {
                            self.done = true;
                            return Some(Err(err));
                        }
                    }
                }
                Ok(XmlEvent::Eof) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(EventError::Xml {
                        position: self.reader.buffer_position(),
                        message:  e.to_string(),
                    }));
                }
                Ok(_) => {}
            }
        }
    }
}

// ── Attribute decoding ────────────────────────────────────────────────────────

fn parse_event(ordinal: u64, attrs: &[(String, String)]) -> EventResult<Option<Event>> {
    let Some(kind) = find(attrs, "type") else {
        return Err(malformed(ordinal, "missing type attribute".into()));
    };
    let event = match kind {
        "entered link" | "left link" => {
            let direction = if kind == "entered link" {
                TraversalDirection::Enter
            } else {
                TraversalDirection::Leave
            };
            Event::LinkTraversal(LinkTraversal {
                time:    parse_time(ordinal, attrs)?,
                link:    LinkId::from(required(ordinal, attrs, "link")?),
                vehicle: find(attrs, "vehicle").map(VehicleId::from),
                direction,
            })
        }
        "warmEmissionEvent" | "coldEmissionEvent" => {
            let amounts = attrs
                .iter()
                .filter(|(k, _)| !EMISSION_META.contains(&k.as_str()))
                .map(|(k, v)| {
                    v.trim()
                        .parse::<f64>()
                        .map(|amount| (k.clone(), amount))
                        .map_err(|_| malformed(ordinal, format!("amount {k}={v:?} is not a number")))
                })
                .collect::<EventResult<Vec<_>>>()?;
            Event::Emission(EmissionRecord {
                time:    parse_time(ordinal, attrs)?,
                link:    LinkId::from(required(ordinal, attrs, "linkId")?),
                vehicle: find(attrs, "vehicleId").map(VehicleId::from),
                kind:    if kind == "warmEmissionEvent" { EmissionKind::Warm } else { EmissionKind::Cold },
                amounts,
            })
        }
        other => {
            log::trace!("event #{ordinal}: skipping type {other:?}");
            return Ok(None);
        }
    };
    Ok(Some(event))
}

fn parse_time(ordinal: u64, attrs: &[(String, String)]) -> EventResult<f64> {
    let raw = required(ordinal, attrs, "time")?;
    match raw.trim().parse::<f64>() {
        Ok(t) if t.is_finite() && t >= 0.0 => Ok(t),
        _ => Err(malformed(ordinal, format!("invalid time {raw:?}"))),
    }
}

fn required<'a>(ordinal: u64, attrs: &'a [(String, String)], key: &str) -> EventResult<&'a str> {
    find(attrs, key).ok_or_else(|| malformed(ordinal, format!("missing {key} attribute")))
}

fn malformed(ordinal: u64, reason: String) -> EventError {
    EventError::MalformedEvent(format!("event #{ordinal}: {reason}"))
}
