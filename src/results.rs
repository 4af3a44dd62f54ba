//! The results table and its two output forms: a CSV for downstream
//! figure scripts and a console table for humans.

use std::io::Write;

use anyhow::{Context, Result as AnyhowResult};
use prettytable::{format, row, Table};
use serde::Serialize;

use crate::config::RunConfig;
use crate::model::Model;

/// One row per reaction, columns in the exact order of the persisted CSV
/// header.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub reaction_id: String,
    pub reaction_equation: String,
    pub dead_end_test: String,
    pub dilution_test: String,
    pub diphosphate_test: String,
    pub duplicate_test_exact: String,
    pub duplicate_test_directions: String,
    pub duplicate_test_coefficients: String,
    pub duplicate_test_redox: String,
    pub loop_test: String,
    pub pathway: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    pub rows: Vec<ResultRow>,
}

impl ResultsTable {
    pub fn row(&self, reaction_id: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.reaction_id == reaction_id)
    }
}

/// Renders a reaction's equation for the equation column, honoring the
/// display-only `use_names`/`add_suffixes` knobs.
pub fn render_equation(model: &Model, reaction_id: &str, run_config: &RunConfig) -> String {
    let Some(r) = model.reaction(reaction_id) else {
        return String::new();
    };
    if let Some(eq) = &r.equation {
        return eq.clone();
    }
    let token = |id: &str| -> String {
        model
            .metabolite(id)
            .map(|m| m.display_token(run_config.use_names, run_config.add_suffixes))
            .unwrap_or_else(|| id.to_string())
    };
    let mut reactants: Vec<(String, f64)> =
        r.reactants().map(|(m, c)| (token(m), crate::model::reaction::ratio_to_f64(c).abs())).collect();
    let mut products: Vec<(String, f64)> =
        r.products().map(|(m, c)| (token(m), crate::model::reaction::ratio_to_f64(c))).collect();
    reactants.sort_by(|a, b| a.0.cmp(&b.0));
    products.sort_by(|a, b| a.0.cmp(&b.0));

    let side = |terms: &[(String, f64)]| -> String {
        terms
            .iter()
            .map(|(id, coef)| if (coef - 1.0).abs() < 1e-9 { id.clone() } else { format!("{coef} {id}") })
            .collect::<Vec<_>>()
            .join(" + ")
    };
    let arrow = if r.is_reversible() { "<->" } else { "->" };
    format!("{} {arrow} {}", side(&reactants), side(&products))
}

pub trait OutWriter<T> {
    fn write(&mut self, item: T) -> AnyhowResult<u64>;
}

pub struct CsvTableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvTableWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { writer: csv::WriterBuilder::new().has_headers(true).from_writer(inner) }
    }
}

impl<W: Write> OutWriter<&ResultsTable> for CsvTableWriter<W> {
    fn write(&mut self, item: &ResultsTable) -> AnyhowResult<u64> {
        let mut rows_written = 0u64;
        for row in &item.rows {
            self.writer.serialize(row).context("failed to write results row")?;
            rows_written += 1;
        }
        self.writer.flush().context("failed to flush results CSV")?;
        Ok(rows_written)
    }
}

pub struct ConsoleTableWriter<W: Write> {
    writer: W,
}

impl<W: Write> ConsoleTableWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutWriter<&ResultsTable> for ConsoleTableWriter<W> {
    fn write(&mut self, item: &ResultsTable) -> AnyhowResult<u64> {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.set_titles(row![
            "reaction_id",
            "dead_end_test",
            "dilution_test",
            "diphosphate_test",
            "duplicate_test_exact",
            "duplicate_test_directions",
            "duplicate_test_coefficients",
            "duplicate_test_redox",
            "loop_test",
            "pathway",
        ]);
        for r in &item.rows {
            table.add_row(row![
                r.reaction_id,
                r.dead_end_test,
                r.dilution_test,
                r.diphosphate_test,
                r.duplicate_test_exact,
                r.duplicate_test_directions,
                r.duplicate_test_coefficients,
                r.duplicate_test_redox,
                r.loop_test,
                r.pathway,
            ]);
        }
        let rows_written = table.print(&mut self.writer).context("failed to print results table")?;
        Ok(rows_written as u64)
    }
}
