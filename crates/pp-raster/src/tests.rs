//! Unit tests for pp-raster.

use pp_core::{Coord, GridConfig, Kernel, Pollutant};
use pp_events::{EmissionRecord, Event, EventResult};
use pp_network::{LinkNetwork, LinkNetworkBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Three links: a 200 m horizontal, a 150 m vertical, and an L-shaped
/// polyline.
fn network() -> LinkNetwork {
    let mut b = LinkNetworkBuilder::new();
    b.add_node("a", Coord::new(1000.0, 2000.0)).unwrap();
    b.add_node("b", Coord::new(1200.0, 2000.0)).unwrap();
    b.add_node("c", Coord::new(1200.0, 2150.0)).unwrap();
    b.add_link("ab", "a", "b").unwrap();
    b.add_link("bc", "b", "c").unwrap();
    b.add_polyline(
        "bend",
        vec![Coord::new(1000.0, 2100.0), Coord::new(1100.0, 2100.0), Coord::new(1100.0, 2300.0)],
    )
    .unwrap();
    b.build()
}

fn grid(cell_size: f64, smoothing_radius: f64, kernel: Kernel) -> GridConfig {
    GridConfig { cell_size, smoothing_radius, kernel }
}

fn emission(time: f64, link: &str, amounts: &[(Pollutant, f64)]) -> EventResult<Event> {
    Ok(EmissionRecord::new(time, link, amounts).into())
}

fn sample_events() -> Vec<EventResult<Event>> {
    vec![
        emission(10.0, "ab", &[(Pollutant::Co, 4.0), (Pollutant::Nox, 1.5)]),
        emission(20.0, "bc", &[(Pollutant::Co, 2.0)]),
        emission(30.0, "bend", &[(Pollutant::Co, 1.0), (Pollutant::Pm, 0.25)]),
        emission(40.0, "ab", &[(Pollutant::Co, 3.0)]),
    ]
}

#[cfg(test)]
mod transform {
    use pp_core::Bounds;

    use super::*;
    use crate::{Cell, GridTransform};

    #[test]
    fn cell_of_and_center_agree() {
        let t = GridTransform::new(Coord::new(100.0, 200.0), 50.0);
        assert_eq!(t.cell_of(Coord::new(100.0, 200.0)), Cell::new(0, 0));
        assert_eq!(t.cell_of(Coord::new(149.999, 249.999)), Cell::new(0, 0));
        assert_eq!(t.cell_of(Coord::new(150.0, 250.0)), Cell::new(1, 1));
        assert_eq!(t.cell_of(Coord::new(99.0, 200.0)), Cell::new(-1, 0));
        assert_eq!(t.cell_center(Cell::new(2, 3)), Coord::new(225.0, 375.0));
        for x in -3..3 {
            for y in -3..3 {
                let c = Cell::new(x, y);
                assert_eq!(t.cell_of(t.cell_center(c)), c);
            }
        }
    }

    #[test]
    fn aligned_origin_is_pulled_back_by_margin() {
        let b = Bounds::from_coords(&[Coord::new(10.0, 20.0), Coord::new(50.0, 70.0)]);
        let t = GridTransform::aligned_to(b, 25.0, 30.0);
        assert_eq!(t.origin(), Coord::new(-20.0, -10.0));
        assert_eq!(t.cell_size(), 25.0);
    }

    #[test]
    fn empty_bounds_align_to_zero() {
        let t = GridTransform::aligned_to(Bounds::EMPTY, 10.0, 5.0);
        assert_eq!(t.origin(), Coord::new(0.0, 0.0));
    }
}

#[cfg(test)]
mod footprint {
    use super::*;
    use crate::GridTransform;
    use crate::footprint::{kernel_weight, link_footprint, sample_polyline};

    #[test]
    fn samples_include_endpoints_and_respect_step() {
        let pts = sample_polyline(&[Coord::new(0.0, 0.0), Coord::new(100.0, 0.0)], 15.0);
        assert_eq!(pts.first(), Some(&[0.0, 0.0]));
        assert_eq!(pts.last(), Some(&[100.0, 0.0]));
        for w in pts.windows(2) {
            assert!(w[1][0] - w[0][0] <= 15.0 + 1e-9);
        }
    }

    #[test]
    fn single_point_polyline_samples_once() {
        let pts = sample_polyline(&[Coord::new(5.0, 5.0)], 10.0);
        assert_eq!(pts, vec![[5.0, 5.0]]);
    }

    #[test]
    fn kernels_decay_with_distance() {
        for k in [Kernel::InverseDistance, Kernel::Gaussian] {
            assert!(kernel_weight(k, 0.0, 50.0, 30.0) > kernel_weight(k, 20.0, 50.0, 30.0));
        }
        assert_eq!(kernel_weight(Kernel::Gaussian, 0.0, 50.0, 30.0), 1.0);
        assert_eq!(kernel_weight(Kernel::InverseDistance, 0.0, 50.0, 30.0), 1.0 / 25.0);
        assert_eq!(kernel_weight(Kernel::Uniform, 40.0, 50.0, 30.0), 1.0);
    }

    #[test]
    fn weights_are_normalised_for_every_kernel() {
        let net = network();
        for kernel in [Kernel::InverseDistance, Kernel::Gaussian, Kernel::Uniform] {
            let g = grid(20.0, 30.0, kernel);
            let t = GridTransform::aligned_to(net.bounds(), g.cell_size, g.smoothing_radius);
            for link in net.links() {
                let fp = link_footprint(link, &t, &g);
                assert!(!fp.is_empty());
                let sum: f64 = fp.iter().map(|(_, w)| w).sum();
                assert!((sum - 1.0).abs() < 1e-12, "{kernel:?} {}: {sum}", link.id);
                assert!(fp.iter().all(|(c, w)| *w > 0.0 && c.x >= 0 && c.y >= 0));
            }
        }
    }

    #[test]
    fn cells_beyond_radius_are_excluded() {
        let net = network();
        let g = grid(10.0, 25.0, Kernel::InverseDistance);
        let t = GridTransform::aligned_to(net.bounds(), g.cell_size, g.smoothing_radius);
        let link = net.link("ab").unwrap();
        for (cell, _) in link_footprint(link, &t, &g) {
            let centre = t.cell_center(cell);
            // "ab" runs along y = 2000 from x = 1000 to 1200.
            let dx = (centre.x - centre.x.clamp(1000.0, 1200.0)).abs();
            let dy = (centre.y - 2000.0).abs();
            assert!((dx * dx + dy * dy).sqrt() <= 25.0 + 1e-9, "{cell} too far");
        }
    }

    #[test]
    fn tiny_radius_still_covers_the_link() {
        let net = network();
        let g = grid(100.0, 5.0, Kernel::InverseDistance);
        let t = GridTransform::aligned_to(net.bounds(), g.cell_size, g.smoothing_radius);
        let fp = link_footprint(net.link("ab").unwrap(), &t, &g);
        // 200 m link on a 100 m grid touches at least two cells.
        assert!(fp.len() >= 2);
    }

    #[test]
    fn zero_radius_uses_containing_cells_only() {
        let net = network();
        let g = grid(50.0, 0.0, Kernel::Uniform);
        let t = GridTransform::aligned_to(net.bounds(), g.cell_size, g.smoothing_radius);
        let link = net.link("bc").unwrap();
        let fp = link_footprint(link, &t, &g);
        // Vertical 150 m link from an aligned corner: cells y = 0..=3 at x = 4.
        let cells: Vec<_> = fp.iter().map(|(c, _)| (c.x, c.y)).collect();
        assert_eq!(cells, vec![(4, 0), (4, 1), (4, 2), (4, 3)]);
        assert!(fp.iter().all(|(_, w)| (*w - 0.25).abs() < 1e-12));
    }
}

#[cfg(test)]
mod rasterizer {
    use std::collections::BTreeMap;

    use pp_events::{EventConsumer, LinkTraversal, TraversalDirection};

    use super::*;
    use crate::{RasterError, Rasterizer, analyze, analyze_with};

    #[test]
    fn conserves_quantity_per_pollutant() {
        let net = network();
        let set = analyze(sample_events(), &net, 25.0, 30.0).unwrap();
        assert!((set.total(Pollutant::Co) - 10.0).abs() < 1e-9);
        assert!((set.total(Pollutant::Nox) - 1.5).abs() < 1e-9);
        assert!((set.total(Pollutant::Pm) - 0.25).abs() < 1e-9);
        assert!(set.get(Pollutant::Co2Total).is_none());
    }

    #[test]
    fn conserves_each_link_separately() {
        let net = network();
        for link in ["ab", "bc", "bend"] {
            let set = analyze(vec![emission(0.0, link, &[(Pollutant::Co, 7.0)])], &net, 10.0, 30.0).unwrap();
            assert!((set.total(Pollutant::Co) - 7.0).abs() < 1e-9, "{link}");
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let net = network();
        for kernel in [Kernel::InverseDistance, Kernel::Gaussian, Kernel::Uniform] {
            let g = grid(20.0, 40.0, kernel);
            let a = analyze_with(sample_events(), &net, &g).unwrap();
            let b = analyze_with(sample_events(), &net, &g).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn randomized_events_keep_totals() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let net = network();
        let links = ["ab", "bc", "bend"];
        let mut rng = SmallRng::seed_from_u64(3);
        let mut expected: BTreeMap<Pollutant, f64> = BTreeMap::new();
        let events: Vec<_> = (0..300)
            .map(|i| {
                let p = Pollutant::ALL[rng.gen_range(0..5)];
                let q = rng.gen_range(0.0..5.0);
                *expected.entry(p).or_insert(0.0) += q;
                emission(i as f64, links[rng.gen_range(0..links.len())], &[(p, q)])
            })
            .collect();
        let set = analyze(events, &net, 30.0, 30.0).unwrap();
        for (p, q) in expected {
            assert!((set.total(p) - q).abs() < 1e-6, "{p}");
        }
    }

    #[test]
    fn unknown_link_is_fatal() {
        let net = network();
        let err = analyze(vec![emission(1.0, "nowhere", &[(Pollutant::Co, 1.0)])], &net, 50.0, 30.0)
            .unwrap_err();
        assert!(matches!(&err, RasterError::UnknownLink(id) if id.as_str() == "nowhere"), "{err}");
    }

    #[test]
    fn bad_parameters_are_rejected() {
        let net = network();
        let err = Rasterizer::new(&net, &grid(0.0, 30.0, Kernel::Uniform)).err().unwrap();
        assert!(matches!(err, RasterError::InvalidParameter(_)));
        let err = Rasterizer::new(&net, &grid(50.0, -1.0, Kernel::Uniform)).err().unwrap();
        assert!(matches!(err, RasterError::InvalidParameter(_)));
    }

    #[test]
    fn unknown_pollutant_is_malformed() {
        let net = network();
        let mut bad = EmissionRecord::new(1.0, "ab", &[]);
        bad.amounts.push(("XYZ".into(), 1.0));
        let mut r = Rasterizer::new(&net, &GridConfig::default()).unwrap();
        let err = r.ingest(&bad.into()).unwrap_err();
        assert!(matches!(err, RasterError::MalformedEvent(_)));
        assert_eq!(r.link_count(), 0);
    }

    #[test]
    fn traversals_and_zero_totals_leave_no_cells() {
        let net = network();
        let mut r = Rasterizer::new(&net, &GridConfig::default()).unwrap();
        let t = LinkTraversal {
            time:      0.0,
            link:      "ab".into(),
            vehicle:   None,
            direction: TraversalDirection::Leave,
        };
        r.ingest(&t.into()).unwrap();
        r.ingest_all(vec![
            emission(1.0, "ab", &[(Pollutant::Pm, 0.5)]),
            emission(2.0, "ab", &[(Pollutant::Pm, -0.5)]),
        ])
        .unwrap();
        assert_eq!(r.events_seen(), 3);
        assert_eq!(r.records_ingested(), 2);
        let set = r.finalize();
        assert!(set.is_empty());
        assert_eq!(set.cell_count(), 0);
    }

    #[test]
    fn populated_cells_are_non_negative_and_non_zero() {
        let net = network();
        let set = analyze(sample_events(), &net, 25.0, 30.0).unwrap();
        assert!(set.cell_count() > 0);
        for (_, cell, v) in set.cells() {
            assert!(cell.x >= 0 && cell.y >= 0);
            assert!(v != 0.0);
        }
    }

    #[test]
    fn cells_iterate_in_output_order() {
        let net = network();
        let set = analyze(sample_events(), &net, 25.0, 30.0).unwrap();
        let keys: Vec<_> = set.cells().map(|(p, c, _)| (p, c.x, c.y)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
