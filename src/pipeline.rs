use log::{info, warn};

use crate::clean::clean;
use crate::error::{PlotError, Result};
use crate::load::RawTable;
use crate::render::{render, Figure};
use crate::resample::daily_mean;
use crate::select::{ChartKind, ColumnChoices, Selection};
use crate::table::Table;
use crate::PIE_MAX_CATEGORIES;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Resample the cleaned table to daily means.
    pub aggregate: bool,
    /// Largest number of distinct X values a pie chart accepts.
    pub max_pie_categories: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            aggregate: false,
            max_pie_categories: PIE_MAX_CATEGORIES,
        }
    }
}

/// A loaded file, ready for chart requests.
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: Table,
    choices: ColumnChoices,
    config: PipelineConfig,
}

impl Dashboard {
    /// Loads, cleans and, if configured, resamples the uploaded bytes.
    pub fn load(bytes: &[u8], config: PipelineConfig) -> Result<Dashboard> {
        let raw = RawTable::from_bytes(bytes)?;
        Ok(Dashboard::from_raw(&raw, config))
    }

    pub fn from_raw(raw: &RawTable, config: PipelineConfig) -> Dashboard {
        let cleaned = clean(raw);
        let table = if config.aggregate {
            daily_mean(&cleaned)
        } else {
            cleaned
        };
        info!(
            "active table has {} rows and {} columns",
            table.n_rows(),
            table.n_columns()
        );
        let choices = ColumnChoices::new(&table, config.aggregate);
        Dashboard {
            table,
            choices,
            config,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn choices(&self) -> &ColumnChoices {
        &self.choices
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Checks the selection against the table, then renders it.
    /// A chart that cannot be drawn is the inner error; the dashboard stays
    /// usable for the next request either way.
    pub fn plot(&self, selection: &Selection) -> Result<std::result::Result<Figure, PlotError>> {
        self.choices.validate(selection)?;
        let figure = render(&self.table, selection, self.config.max_pie_categories);
        if let Err(e) = &figure {
            warn!("no chart for {:?}: {}", selection, e);
        }
        Ok(figure)
    }
}

/// One interaction: the uploaded file, the pipeline variant and, when the
/// user asked for a chart, the selection. Unset columns and kind fall back
/// to the defaults of the active table.
#[derive(Debug, Clone, Default)]
pub struct Request<'a> {
    pub bytes: &'a [u8],
    pub config: PipelineConfig,
    pub x: Option<String>,
    pub y: Option<String>,
    pub kind: Option<ChartKind>,
    pub render: bool,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub table: Table,
    pub choices: ColumnChoices,
    /// `None` when no chart was requested.
    pub chart: Option<std::result::Result<Figure, PlotError>>,
}

/// Runs the whole pipeline for a single request, keeping nothing between
/// calls.
pub fn run(request: &Request<'_>) -> Result<Response> {
    let dashboard = Dashboard::load(request.bytes, request.config)?;
    let chart = if request.render {
        let selection = dashboard.choices().select(
            request.x.as_deref(),
            request.y.as_deref(),
            request.kind,
        )?;
        Some(dashboard.plot(&selection)?)
    } else {
        None
    };
    let Dashboard { table, choices, .. } = dashboard;
    Ok(Response {
        table,
        choices,
        chart,
    })
}
