//! The time-bin aggregator.
//!
//! # Data layout
//!
//! ```text
//! BTreeMap<TimeBin, BinAccumulator>          ordered by bin start
//!   BinAccumulator
//!     links: Vec<LinkEmissions>               first-touch order
//!     index: FxHashMap<LinkId, usize>         LinkId → position in links
//!       LinkEmissions
//!         values: BTreeMap<Pollutant, f64>    declaration order
//! ```
//!
//! Every key is created on first touch; nothing is pre-allocated per link or
//! per pollutant.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use pp_core::{LinkId, Pollutant, TimeBin, TimeBinning};
use pp_events::{Event, EventConsumer};

use crate::{AggregateError, AggregateResult};

// ── Accumulation state ────────────────────────────────────────────────────────

/// Pollutant totals for one link within one bin.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkEmissions {
    pub link:   LinkId,
    pub values: BTreeMap<Pollutant, f64>,
}

#[derive(Clone, Debug, Default)]
struct BinAccumulator {
    links: Vec<LinkEmissions>,
    index: FxHashMap<LinkId, usize>,
}

impl BinAccumulator {
    fn link_mut(&mut self, link: &LinkId) -> &mut LinkEmissions {
        let i = match self.index.get(link) {
            Some(&i) => i,
            None => {
                let i = self.links.len();
                self.index.insert(link.clone(), i);
                self.links.push(LinkEmissions { link: link.clone(), values: BTreeMap::new() });
                i
            }
        };
        &mut self.links[i]
    }
}

// ── TimeBinAggregator ─────────────────────────────────────────────────────────

/// Sums emission quantities per (time bin, link, pollutant).
///
/// Link traversals are counted but otherwise ignored.  Instances built over
/// disjoint slices of one event log can be combined with
/// [`merge`](Self::merge).
pub struct TimeBinAggregator {
    binning:          TimeBinning,
    bins:             BTreeMap<TimeBin, BinAccumulator>,
    events_seen:      u64,
    records_ingested: u64,
}

impl TimeBinAggregator {
    pub fn new(binning: TimeBinning) -> Self {
        Self {
            binning,
            bins: BTreeMap::new(),
            events_seen: 0,
            records_ingested: 0,
        }
    }

    pub fn binning(&self) -> TimeBinning {
        self.binning
    }

    /// Every event passed to `ingest`, including traversals.
    pub fn events_seen(&self) -> u64 {
        self.events_seen
    }

    /// Emission records folded into the totals.
    pub fn records_ingested(&self) -> u64 {
        self.records_ingested
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Fold `other` into `self`.
    ///
    /// Links that `other` touched first within a bin are appended after the
    /// links `self` already holds for that bin.
    pub fn merge(&mut self, other: TimeBinAggregator) -> AggregateResult<()> {
        if self.binning.width() != other.binning.width() {
            return Err(AggregateError::BinWidthMismatch {
                ours:   self.binning.width(),
                theirs: other.binning.width(),
            });
        }
        for (bin, acc) in other.bins {
            let ours = self.bins.entry(bin).or_default();
            for le in acc.links {
                let target = ours.link_mut(&le.link);
                for (p, v) in le.values {
                    *target.values.entry(p).or_insert(0.0) += v;
                }
            }
        }
        self.events_seen += other.events_seen;
        self.records_ingested += other.records_ingested;
        Ok(())
    }

    /// Consume the aggregator and return its totals ordered by bin start.
    pub fn finalize(self) -> BinnedEmissions {
        let bins: Vec<BinEmissions> = self
            .bins
            .into_iter()
            .map(|(bin, acc)| BinEmissions {
                bin,
                start: self.binning.start(bin),
                links: acc.links,
            })
            .collect();
        let out = BinnedEmissions { binning: self.binning, bins };
        log::info!(
            "aggregated {} emission records into {} bins ({} entries)",
            self.records_ingested,
            out.bins.len(),
            out.len(),
        );
        out
    }
}

impl EventConsumer for TimeBinAggregator {
    type Error = AggregateError;

    fn ingest(&mut self, event: &Event) -> AggregateResult<()> {
        self.events_seen += 1;
        let Some(record) = event.as_emission() else {
            return Ok(());
        };
        let bin = self.binning.bin_of(record.time).ok_or_else(|| {
            AggregateError::MalformedEvent(format!(
                "emission on link {} has invalid time {}",
                record.link, record.time
            ))
        })?;
        // Resolve every pollutant before touching the accumulator.
        let amounts = record.pollutants()?;

        let entry = self.bins.entry(bin).or_default().link_mut(&record.link);
        for (p, v) in amounts {
            *entry.values.entry(p).or_insert(0.0) += v;
        }
        self.records_ingested += 1;
        Ok(())
    }
}

// ── Finalized output ──────────────────────────────────────────────────────────

/// All links touched in one bin.
#[derive(Clone, Debug, PartialEq)]
pub struct BinEmissions {
    pub bin:   TimeBin,
    /// Bin start, simulation seconds.
    pub start: f64,
    /// First-touch order.
    pub links: Vec<LinkEmissions>,
}

/// Finalized aggregator output.
#[derive(Clone, Debug, PartialEq)]
pub struct BinnedEmissions {
    pub binning: TimeBinning,
    /// Ascending by bin start.
    pub bins:    Vec<BinEmissions>,
}

/// One (bin, link, pollutant) total.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EmissionEntry<'a> {
    pub bin:       TimeBin,
    pub start:     f64,
    pub link:      &'a LinkId,
    pub pollutant: Pollutant,
    pub value:     f64,
}

impl BinnedEmissions {
    /// Flat view in output order: bin, then link, then pollutant.
    pub fn entries(&self) -> impl Iterator<Item = EmissionEntry<'_>> + '_ {
        self.bins.iter().flat_map(|b| {
            b.links.iter().flat_map(move |le| {
                le.values.iter().map(move |(&pollutant, &value)| EmissionEntry {
                    bin: b.bin,
                    start: b.start,
                    link: &le.link,
                    pollutant,
                    value,
                })
            })
        })
    }

    /// Number of (bin, link, pollutant) entries.
    pub fn len(&self) -> usize {
        self.bins
            .iter()
            .flat_map(|b| b.links.iter())
            .map(|le| le.values.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bin(&self, bin: TimeBin) -> Option<&BinEmissions> {
        self.bins
            .binary_search_by_key(&bin, |b| b.bin)
            .ok()
            .map(|i| &self.bins[i])
    }

    /// Total of `pollutant` on `link` in `bin`, if any was recorded.
    pub fn get(&self, bin: TimeBin, link: &str, pollutant: Pollutant) -> Option<f64> {
        self.bin(bin)?
            .links
            .iter()
            .find(|le| le.link.as_str() == link)?
            .values
            .get(&pollutant)
            .copied()
    }

    /// Sum over every bin and link, per pollutant.
    pub fn totals_by_pollutant(&self) -> BTreeMap<Pollutant, f64> {
        let mut totals = BTreeMap::new();
        for e in self.entries() {
            *totals.entry(e.pollutant).or_insert(0.0) += e.value;
        }
        totals
    }
}
