//! SQLite output backend (feature `sqlite`).
//!
//! One `emissions.db` file in the output directory:
//!
//! | Object             | Kind  | Rows                                          |
//! |--------------------|-------|-----------------------------------------------|
//! | `link_emissions`   | table | one per (bin, link, pollutant)                |
//! | `grid_cells`       | table | one per (pollutant, cell), with cell centre   |
//! | `pollutant_totals` | view  | link emissions summed per pollutant           |
//!
//! Values are stored at full precision.  Each batch is one transaction, so a
//! failed batch leaves earlier batches in place and none of its own rows.

use std::path::Path;

use rusqlite::{Connection, Statement};

use crate::writer::OutputWriter;
use crate::{GridCellRow, LinkEmissionRow, OutputResult};

pub const DB_FILE: &str = "emissions.db";

const SCHEMA: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous  = NORMAL;
    CREATE TABLE IF NOT EXISTS link_emissions (
        time_bin  REAL NOT NULL,
        link_id   TEXT NOT NULL,
        pollutant TEXT NOT NULL,
        value     REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS link_emissions_by_link
        ON link_emissions (link_id, time_bin);
    CREATE TABLE IF NOT EXISTS grid_cells (
        pollutant TEXT    NOT NULL,
        cell_x    INTEGER NOT NULL,
        cell_y    INTEGER NOT NULL,
        center_x  REAL    NOT NULL,
        center_y  REAL    NOT NULL,
        value     REAL    NOT NULL,
        PRIMARY KEY (pollutant, cell_x, cell_y)
    );
    CREATE VIEW IF NOT EXISTS pollutant_totals AS
        SELECT pollutant, SUM(value) AS total
        FROM link_emissions
        GROUP BY pollutant;
";

const INSERT_LINK: &str =
    "INSERT INTO link_emissions (time_bin, link_id, pollutant, value) VALUES (?1, ?2, ?3, ?4)";

const INSERT_CELL: &str = "INSERT INTO grid_cells (pollutant, cell_x, cell_y, center_x, center_y, value) \
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) [`DB_FILE`] in `dir` and create the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join(DB_FILE))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, finished: false })
    }

    /// Insert `rows` in one transaction through the cached statement `sql`.
    fn insert_all<T>(
        &self,
        sql:  &str,
        rows: &[T],
        bind: impl Fn(&mut Statement<'_>, &T) -> rusqlite::Result<usize>,
    ) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(sql)?;
            for row in rows {
                bind(&mut *stmt, row)?;
            }
        }
        tx.commit()?;
        log::debug!("sqlite: inserted {} rows", rows.len());
        Ok(())
    }
}

impl OutputWriter for SqliteWriter {
    fn write_link_emissions(&mut self, rows: &[LinkEmissionRow]) -> OutputResult<()> {
        self.insert_all(INSERT_LINK, rows, |stmt, r| {
            stmt.execute(rusqlite::params![r.time_bin, r.link_id, r.pollutant.as_str(), r.value])
        })
    }

    fn write_grid_cells(&mut self, rows: &[GridCellRow]) -> OutputResult<()> {
        self.insert_all(INSERT_CELL, rows, |stmt, r| {
            stmt.execute(rusqlite::params![
                r.pollutant.as_str(),
                r.cell_x,
                r.cell_y,
                r.center_x,
                r.center_y,
                r.value,
            ])
        })
    }

    fn finish(&mut self) -> OutputResult<()> {
        if std::mem::replace(&mut self.finished, true) {
            return Ok(());
        }
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
