use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Line,
    Scatter,
    Bar,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Bar,
        ChartKind::Pie,
    ];

    /// Pie charts are not offered for daily resampled tables.
    pub const AGGREGATED: [ChartKind; 3] = [ChartKind::Line, ChartKind::Scatter, ChartKind::Bar];

    pub fn available(aggregated: bool) -> &'static [ChartKind] {
        if aggregated {
            &ChartKind::AGGREGATED
        } else {
            &ChartKind::ALL
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Scatter => "Scatter",
            ChartKind::Bar => "Bar",
            ChartKind::Pie => "Pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<ChartKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ChartKind::Line),
            "scatter" => Ok(ChartKind::Scatter),
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            _ => Err(Error::UnknownChartKind(s.to_string())),
        }
    }
}

/// The user's choice of columns and chart kind for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub x: String,
    pub y: String,
    pub kind: ChartKind,
}

impl Selection {
    pub fn new(x: impl Into<String>, y: impl Into<String>, kind: ChartKind) -> Selection {
        Selection {
            x: x.into(),
            y: y.into(),
            kind,
        }
    }
}

/// What the UI can offer for the active table: the columns in order, the
/// chart kinds, and the preselected X and Y columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChoices {
    pub columns: Vec<String>,
    pub kinds: &'static [ChartKind],
    pub default_x: String,
    pub default_y: String,
}

impl ColumnChoices {
    /// X defaults to the first column. Y defaults to the second column,
    /// which for a resampled table is the first column after `Timestamp`;
    /// a table with a single column falls back to it for both.
    pub fn new(table: &Table, aggregated: bool) -> ColumnChoices {
        let columns: Vec<String> = table.column_names().into_iter().map(String::from).collect();
        let default_x = columns[0].clone();
        let default_y = columns.get(1).unwrap_or(&columns[0]).clone();
        ColumnChoices {
            columns,
            kinds: ChartKind::available(aggregated),
            default_x,
            default_y,
        }
    }

    /// Selection made of the defaults and the first chart kind.
    pub fn default_selection(&self) -> Selection {
        Selection::new(self.default_x.clone(), self.default_y.clone(), self.kinds[0])
    }

    /// Fills the fields the user left unset with the defaults.
    pub fn select(
        &self,
        x: Option<&str>,
        y: Option<&str>,
        kind: Option<ChartKind>,
    ) -> Result<Selection> {
        let selection = Selection::new(
            x.unwrap_or(self.default_x.as_str()),
            y.unwrap_or(self.default_y.as_str()),
            kind.unwrap_or(self.kinds[0]),
        );
        self.validate(&selection)?;
        Ok(selection)
    }

    pub fn validate(&self, selection: &Selection) -> Result<()> {
        for name in [&selection.x, &selection.y].iter() {
            if !self.columns.iter().any(|c| c == *name) {
                return Err(Error::UnknownColumn(name.to_string()));
            }
        }
        if !self.kinds.contains(&selection.kind) {
            return Err(Error::UnsupportedChart(selection.kind));
        }
        Ok(())
    }
}
