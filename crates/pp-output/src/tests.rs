//! Tests for pp-output.

use pp_aggregate::{BinnedEmissions, TimeBinAggregator};
use pp_core::{Coord, Pollutant, TimeBinning};
use pp_events::{EmissionRecord, EventConsumer};
use pp_network::{LinkNetwork, LinkNetworkBuilder};
use pp_raster::RasterSet;

use crate::row::{GridCellRow, LinkEmissionRow};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn network() -> LinkNetwork {
    let mut b = LinkNetworkBuilder::new();
    b.add_node("1", Coord::new(0.0, 0.0)).unwrap();
    b.add_node("2", Coord::new(120.0, 0.0)).unwrap();
    b.add_node("3", Coord::new(120.0, 90.0)).unwrap();
    b.add_link("12", "1", "2").unwrap();
    b.add_link("23", "2", "3").unwrap();
    b.build()
}

fn records() -> Vec<EmissionRecord> {
    vec![
        EmissionRecord::new(5.0, "12", &[(Pollutant::Co, 0.123), (Pollutant::Nox, 2.0)]),
        EmissionRecord::new(100.0, "23", &[(Pollutant::Co, 1.0 / 3.0)]),
        EmissionRecord::new(3700.0, "12", &[(Pollutant::Co, 10.005)]),
        EmissionRecord::new(3800.0, "12", &[(Pollutant::Pm, -0.5)]),
    ]
}

fn binned() -> BinnedEmissions {
    let mut agg = TimeBinAggregator::new(TimeBinning::new(3600.0).unwrap());
    for r in records() {
        agg.ingest(&r.into()).unwrap();
    }
    agg.finalize()
}

fn rasters(net: &LinkNetwork) -> RasterSet {
    pp_raster::analyze(records().into_iter().map(|r| Ok(r.into())), net, 30.0, 30.0).unwrap()
}

#[cfg(test)]
mod rows {
    use super::*;

    #[test]
    fn link_rows_follow_aggregation_order() {
        let rows = LinkEmissionRow::from_bins(&binned());
        let keys: Vec<(f64, &str, Pollutant)> =
            rows.iter().map(|r| (r.time_bin, r.link_id.as_str(), r.pollutant)).collect();
        assert_eq!(
            keys,
            vec![
                (0.0, "12", Pollutant::Co),
                (0.0, "12", Pollutant::Nox),
                (0.0, "23", Pollutant::Co),
                (3600.0, "12", Pollutant::Co),
                (3600.0, "12", Pollutant::Pm),
            ]
        );
    }

    #[test]
    fn grid_rows_are_sorted() {
        let net = network();
        let rows = GridCellRow::from_rasters(&rasters(&net));
        assert!(!rows.is_empty());
        assert!(rows.windows(2).all(|w| {
            (w[0].pollutant, w[0].cell_x, w[0].cell_y) < (w[1].pollutant, w[1].cell_x, w[1].cell_y)
        }));
    }

    #[test]
    fn grid_rows_carry_cell_centres() {
        let net = network();
        let set = rasters(&net);
        for row in GridCellRow::from_rasters(&set) {
            let c = set.transform.cell_center(pp_raster::Cell::new(row.cell_x, row.cell_y));
            assert_eq!((row.center_x, row.center_y), (c.x, c.y));
        }
    }
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::{CsvWriter, GRID_FILE, LINK_EMISSIONS_FILE};
    use crate::writer::{OutputWriter, write_results};
    use crate::OutputError;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn reader(path: &std::path::Path, delimiter: u8) -> csv::Reader<std::fs::File> {
        csv::ReaderBuilder::new().delimiter(delimiter).from_path(path).unwrap()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join(LINK_EMISSIONS_FILE).exists());
        assert!(dir.path().join(GRID_FILE).exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let text = std::fs::read_to_string(dir.path().join(LINK_EMISSIONS_FILE)).unwrap();
        assert_eq!(text, "timeBin;linkId;pollutant;maxEmission\n");
        let text = std::fs::read_to_string(dir.path().join(GRID_FILE)).unwrap();
        assert_eq!(text, "Pollutant,CellX,CellY,Value\n");
    }

    #[test]
    fn link_values_use_two_decimals() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_link_emissions(&[LinkEmissionRow {
            time_bin:  1800.0,
            link_id:   "a;b".into(),
            pollutant: Pollutant::Co2Total,
            value:     2.0 / 3.0,
        }])
        .unwrap();
        w.finish().unwrap();

        let text = std::fs::read_to_string(dir.path().join(LINK_EMISSIONS_FILE)).unwrap();
        let line = text.lines().nth(1).unwrap();
        // The delimiter inside the link id is quoted.
        assert_eq!(line, "1800.00;\"a;b\";CO2_TOTAL;0.67");
    }

    #[test]
    fn link_emissions_round_trip() {
        let dir = tmp();
        let bins = binned();
        let rows = LinkEmissionRow::from_bins(&bins);
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_link_emissions(&rows).unwrap();
        w.finish().unwrap();

        let mut rdr = reader(&dir.path().join(LINK_EMISSIONS_FILE), b';');
        let read: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read.len(), rows.len());
        for (rec, row) in read.iter().zip(&rows) {
            let t: f64 = rec[0].parse().unwrap();
            let v: f64 = rec[3].parse().unwrap();
            assert_eq!(t, row.time_bin);
            assert_eq!(&rec[1], row.link_id);
            assert_eq!(rec[2].parse::<Pollutant>().unwrap(), row.pollutant);
            assert!((v - row.value).abs() <= 0.005 + 1e-12, "{v} vs {}", row.value);
        }
    }

    #[test]
    fn grid_cells_round_trip_exactly() {
        let dir = tmp();
        let net = network();
        let set = rasters(&net);
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_grid_cells(&GridCellRow::from_rasters(&set)).unwrap();
        w.finish().unwrap();

        let mut rdr = reader(&dir.path().join(GRID_FILE), b',');
        let mut n = 0;
        for rec in rdr.records() {
            let rec = rec.unwrap();
            let p: Pollutant = rec[0].parse().unwrap();
            let cell = pp_raster::Cell::new(rec[1].parse().unwrap(), rec[2].parse().unwrap());
            let v: f64 = rec[3].parse().unwrap();
            assert_eq!(set.value(p, cell), Some(v));
            n += 1;
        }
        assert_eq!(n, set.cell_count());
    }

    #[test]
    fn write_results_writes_both_files() {
        let dir = tmp();
        let net = network();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        write_results(&mut w, &binned(), &rasters(&net)).unwrap();

        let links = reader(&dir.path().join(LINK_EMISSIONS_FILE), b';').records().count();
        let cells = reader(&dir.path().join(GRID_FILE), b',').records().count();
        assert_eq!(links, 5);
        assert_eq!(cells, rasters(&net).cell_count());
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batches_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_link_emissions(&[]).unwrap();
        w.write_grid_cells(&[]).unwrap();
    }

    #[test]
    fn missing_directory_reports_path() {
        let dir = tmp();
        let missing = dir.path().join("not-there");
        let err = CsvWriter::new(&missing).err().unwrap();
        assert!(matches!(err, OutputError::Create { .. }));
        assert!(err.to_string().contains("not-there"), "{err}");
    }

    #[test]
    fn rows_written_before_drop_stay_on_disk() {
        let dir = tmp();
        {
            let mut w = CsvWriter::new(dir.path()).unwrap();
            w.write_link_emissions(&LinkEmissionRow::from_bins(&binned())).unwrap();
            // Dropped without finish().
        }
        let n = reader(&dir.path().join(LINK_EMISSIONS_FILE), b';').records().count();
        assert_eq!(n, 5);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::sqlite::{DB_FILE, SqliteWriter};
    use crate::writer::{OutputWriter, write_results};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join(DB_FILE).exists());
    }

    #[test]
    fn sqlite_row_counts() {
        let dir = tmp();
        let net = network();
        let set = rasters(&net);
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        write_results(&mut w, &binned(), &set).unwrap();

        let conn = rusqlite::Connection::open(dir.path().join(DB_FILE)).unwrap();
        let links: i64 = conn
            .query_row("SELECT COUNT(*) FROM link_emissions", [], |r| r.get(0))
            .unwrap();
        let cells: i64 = conn
            .query_row("SELECT COUNT(*) FROM grid_cells", [], |r| r.get(0))
            .unwrap();
        assert_eq!(links, 5);
        assert_eq!(cells as usize, set.cell_count());
    }

    #[test]
    fn sqlite_keeps_full_precision() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_link_emissions(&[LinkEmissionRow {
            time_bin:  0.0,
            link_id:   "x".into(),
            pollutant: Pollutant::Nox,
            value:     1.0 / 3.0,
        }])
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join(DB_FILE)).unwrap();
        let (pollutant, value): (String, f64) = conn
            .query_row(
                "SELECT pollutant, value FROM link_emissions WHERE link_id = 'x'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(pollutant, "NOx");
        assert_eq!(value, 1.0 / 3.0);
    }

    #[test]
    fn sqlite_grid_cells_store_centres() {
        let dir = tmp();
        let net = network();
        let set = rasters(&net);
        let rows = GridCellRow::from_rasters(&set);
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_grid_cells(&rows).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join(DB_FILE)).unwrap();
        let first = rows[0];
        let (cx, cy, v): (f64, f64, f64) = conn
            .query_row(
                "SELECT center_x, center_y, value FROM grid_cells \
                 WHERE pollutant = ?1 AND cell_x = ?2 AND cell_y = ?3",
                rusqlite::params![first.pollutant.as_str(), first.cell_x, first.cell_y],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((cx, cy, v), (first.center_x, first.center_y, first.value));
    }

    #[test]
    fn sqlite_pollutant_totals_view() {
        let dir = tmp();
        let net = network();
        let bins = binned();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        write_results(&mut w, &bins, &rasters(&net)).unwrap();

        let conn = rusqlite::Connection::open(dir.path().join(DB_FILE)).unwrap();
        let total: f64 = conn
            .query_row("SELECT total FROM pollutant_totals WHERE pollutant = 'CO'", [], |r| r.get(0))
            .unwrap();
        let expected = bins.totals_by_pollutant()[&Pollutant::Co];
        assert!((total - expected).abs() < 1e-12, "{total} vs {expected}");
    }

    #[test]
    fn sqlite_finish_idempotent() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

// ── Parquet tests ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use tempfile::TempDir;

    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::*;
    use crate::parquet::{GRID_FILE, LINK_EMISSIONS_FILE, ParquetWriter};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn parquet_files_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join(LINK_EMISSIONS_FILE).exists());
        assert!(dir.path().join(GRID_FILE).exists());
    }

    #[test]
    fn parquet_link_round_trip() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_link_emissions(&LinkEmissionRow::from_bins(&binned())).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join(LINK_EMISSIONS_FILE)).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let reader = builder.build().unwrap();

        let total_rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total_rows, 5);

        let field_names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(field_names, ["time_bin", "link_id", "pollutant", "value"]);
    }

    #[test]
    fn parquet_cell_columns_are_integers() {
        let dir = tmp();
        let net = network();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_grid_cells(&GridCellRow::from_rasters(&rasters(&net))).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join(GRID_FILE)).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        assert_eq!(*schema.field_with_name("cell_x").unwrap().data_type(), DataType::Int64);
        assert_eq!(*schema.field_with_name("value").unwrap().data_type(), DataType::Float64);
        let field_names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(field_names, ["pollutant", "cell_x", "cell_y", "center_x", "center_y", "value"]);
    }

    #[test]
    fn parquet_grid_rows_round_trip() {
        use arrow::array::{Float64Array, Int64Array};

        let dir = tmp();
        let net = network();
        let rows = GridCellRow::from_rasters(&rasters(&net));
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_grid_cells(&rows).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join(GRID_FILE)).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file).unwrap().build().unwrap();
        let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), rows.len());

        let xs = batch.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
        let cx = batch.column(3).as_any().downcast_ref::<Float64Array>().unwrap();
        let values = batch.column(5).as_any().downcast_ref::<Float64Array>().unwrap();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(xs.value(i), row.cell_x);
            assert_eq!(cx.value(i), row.center_x);
            assert_eq!(values.value(i), row.value);
        }
    }

    #[test]
    fn parquet_finish_required() {
        let dir = tmp();
        {
            let mut w = ParquetWriter::new(dir.path()).unwrap();
            w.write_link_emissions(&LinkEmissionRow::from_bins(&binned())).unwrap();
            // Dropped without finish(): no footer.
        }

        let file = std::fs::File::open(dir.path().join(LINK_EMISSIONS_FILE)).unwrap();
        let result = ParquetRecordBatchReaderBuilder::try_new(file);
        assert!(result.is_err(), "file without Parquet footer should fail to open");
    }
}
