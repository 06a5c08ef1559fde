//! Typed simulation events.

use pp_core::{LinkId, Pollutant, VehicleId};

use crate::{EventError, EventResult};

/// A vehicle entering or leaving a link.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TraversalDirection {
    Enter,
    Leave,
}

/// Emissions produced while driving (`Warm`) or at engine start (`Cold`).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EmissionKind {
    Warm,
    Cold,
}

#[derive(Clone, PartialEq, Debug)]
pub struct LinkTraversal {
    pub time:      f64,
    pub link:      LinkId,
    pub vehicle:   Option<VehicleId>,
    pub direction: TraversalDirection,
}

/// Pollutant amounts emitted on one link at one instant.
///
/// Pollutant names are kept as written in the log; consumers resolve them
/// with [`EmissionRecord::pollutants`] so that an unknown name fails the
/// consumer's `ingest` rather than the read.
#[derive(Clone, PartialEq, Debug)]
pub struct EmissionRecord {
    pub time:    f64,
    pub link:    LinkId,
    pub vehicle: Option<VehicleId>,
    pub kind:    EmissionKind,
    pub amounts: Vec<(String, f64)>,
}

impl EmissionRecord {
    /// Convenience constructor from already-typed pollutants.
    pub fn new(time: f64, link: impl Into<LinkId>, amounts: &[(Pollutant, f64)]) -> Self {
        Self {
            time,
            link: link.into(),
            vehicle: None,
            kind: EmissionKind::Warm,
            amounts: amounts.iter().map(|&(p, v)| (p.as_str().to_owned(), v)).collect(),
        }
    }

    /// Resolve every amount against the closed [`Pollutant`] set.
    ///
    /// Fails on the first unknown name or non-finite amount; zero and
    /// negative amounts are valid.
    pub fn pollutants(&self) -> EventResult<Vec<(Pollutant, f64)>> {
        self.amounts
            .iter()
            .map(|(name, amount)| {
                let p = name.parse::<Pollutant>().map_err(|_| {
                    EventError::MalformedEvent(format!(
                        "unknown pollutant {name:?} on link {} at t={}",
                        self.link, self.time
                    ))
                })?;
                if !amount.is_finite() {
                    return Err(EventError::MalformedEvent(format!(
                        "non-finite {name} amount on link {} at t={}",
                        self.link, self.time
                    )));
                }
                Ok((p, *amount))
            })
            .collect()
    }
}

/// One event from the simulation's log.
#[derive(Clone, PartialEq, Debug)]
pub enum Event {
    LinkTraversal(LinkTraversal),
    Emission(EmissionRecord),
}

impl Event {
    /// Simulation seconds.
    #[inline]
    pub fn time(&self) -> f64 {
        match self {
            Event::LinkTraversal(t) => t.time,
            Event::Emission(e)      => e.time,
        }
    }

    #[inline]
    pub fn link(&self) -> &LinkId {
        match self {
            Event::LinkTraversal(t) => &t.link,
            Event::Emission(e)      => &e.link,
        }
    }

    pub fn as_emission(&self) -> Option<&EmissionRecord> {
        match self {
            Event::Emission(e) => Some(e),
            Event::LinkTraversal(_) => None,
        }
    }
}

impl From<EmissionRecord> for Event {
    fn from(e: EmissionRecord) -> Self {
        Event::Emission(e)
    }
}

impl From<LinkTraversal> for Event {
    fn from(t: LinkTraversal) -> Self {
        Event::LinkTraversal(t)
    }
}
