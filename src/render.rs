use chrono::prelude::*;
use log::debug;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use std::path::Path;

use crate::error::PlotError;
use crate::select::{ChartKind, Selection};
use crate::table::{Series, Table};
use crate::{min_and_max, suitable_xfmt};

const SVG_SIZE: (u32, u32) = (1600, 800);

const SLICE_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// How x positions map back to axis labels.
#[derive(Debug, Clone, PartialEq)]
pub enum XScale {
    /// Seconds since the epoch.
    Time,
    Numeric,
    /// Position `i` is the `i`-th distinct label, in order of appearance.
    Category(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub percent: f64,
}

impl Slice {
    /// Label drawn next to the slice, with the percentage to one decimal.
    pub fn text(&self) -> String {
        format!("{} ({:.1}%)", self.label, self.percent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    /// Points in row order; a NaN y breaks a line.
    Xy {
        scale: XScale,
        points: Vec<(f64, f64)>,
    },
    Pie {
        slices: Vec<Slice>,
        start_angle: f64,
    },
}

/// A chart ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub plot: Plot,
}

fn x_positions(series: &Series) -> (XScale, Vec<f64>) {
    match series {
        Series::Timestamp(v) => (
            XScale::Time,
            v.iter()
                .map(|t| TimeZone::from_utc_datetime(&Utc, t).timestamp() as f64)
                .collect(),
        ),
        Series::Numeric(v) => (XScale::Numeric, v.clone()),
        Series::Text(v) => {
            let mut labels: Vec<String> = Vec::new();
            let xs = v
                .iter()
                .map(|cell| match cell {
                    Some(s) => match labels.iter().position(|l| l == s) {
                        Some(i) => i as f64,
                        None => {
                            labels.push(s.clone());
                            (labels.len() - 1) as f64
                        }
                    },
                    None => f64::NAN,
                })
                .collect();
            (XScale::Category(labels), xs)
        }
    }
}

/// One slice per distinct X value, in order of appearance, sized by the sum
/// of its Y values. The category count is checked before the Y column type.
fn pie_slices(
    x: &Series,
    y: &Series,
    y_name: &str,
    max_categories: usize,
) -> Result<Vec<Slice>, PlotError> {
    let mut labels: Vec<String> = Vec::new();
    let mut groups: Vec<usize> = Vec::with_capacity(x.len());
    for i in 0..x.len() {
        let label = x.value(i).to_string();
        match labels.iter().position(|l| *l == label) {
            Some(g) => groups.push(g),
            None => {
                labels.push(label);
                groups.push(labels.len() - 1);
            }
        }
    }
    if labels.len() > max_categories {
        return Err(PlotError::TooManyCategories {
            found: labels.len(),
            max: max_categories,
        });
    }
    let ys = y
        .as_numeric()
        .ok_or_else(|| PlotError::NonNumeric(y_name.to_string()))?;
    let mut sums = vec![0.; labels.len()];
    for (&g, v) in groups.iter().zip(ys.iter()) {
        if !v.is_nan() {
            sums[g] += v;
        }
    }
    if let Some(g) = sums.iter().position(|s| *s < 0.) {
        return Err(PlotError::NegativeSlice(labels[g].clone()));
    }
    let total: f64 = sums.iter().sum();
    if total <= 0. {
        return Err(PlotError::EmptyPie);
    }
    Ok(labels
        .into_iter()
        .zip(sums)
        .map(|(label, value)| Slice {
            label,
            value,
            percent: value / total * 100.,
        })
        .collect())
}

/// Builds the chart for the selected columns of the table.
/// The selection must name columns of the table; see `ColumnChoices::validate`.
pub fn render(
    table: &Table,
    selection: &Selection,
    max_pie_categories: usize,
) -> Result<Figure, PlotError> {
    let (x, y) = match (table.column(&selection.x), table.column(&selection.y)) {
        (Some(x), Some(y)) => (&x.series, &y.series),
        (None, _) => return Err(PlotError::MissingColumn(selection.x.clone())),
        (_, None) => return Err(PlotError::MissingColumn(selection.y.clone())),
    };
    debug!(
        "rendering {} chart of {} vs {}",
        selection.kind, selection.y, selection.x
    );

    if selection.kind == ChartKind::Pie {
        let slices = pie_slices(x, y, &selection.y, max_pie_categories)?;
        return Ok(Figure {
            kind: ChartKind::Pie,
            title: format!("{} (Pie Chart)", selection.y),
            x_label: None,
            y_label: None,
            plot: Plot::Pie {
                slices,
                start_angle: 90.,
            },
        });
    }

    let ys = y
        .as_numeric()
        .ok_or_else(|| PlotError::NonNumeric(selection.y.clone()))?;
    let (scale, xs) = x_positions(x);
    let points: Vec<(f64, f64)> = xs
        .into_iter()
        .zip(ys.iter().copied())
        .filter(|(x, _)| !x.is_nan())
        .collect();
    if points.iter().all(|(_, y)| y.is_nan()) {
        return Err(PlotError::NonNumeric(selection.y.clone()));
    }
    let suffix = match selection.kind {
        ChartKind::Line => "Line Plot",
        ChartKind::Scatter => "Scatter Plot",
        _ => "Bar Chart",
    };
    Ok(Figure {
        kind: selection.kind,
        title: format!("{} vs {} ({})", selection.y, selection.x, suffix),
        x_label: Some(selection.x.clone()),
        y_label: Some(selection.y.clone()),
        plot: Plot::Xy { scale, points },
    })
}

impl Figure {
    /// Number of pie slices, zero for the other kinds.
    pub fn slice_count(&self) -> usize {
        match &self.plot {
            Plot::Pie { slices, .. } => slices.len(),
            Plot::Xy { .. } => 0,
        }
    }

    /// plots the figure to an svg file
    pub fn draw_svg<P: AsRef<Path>>(&self, fout: P) -> Result<(), PlotError> {
        let root = SVGBackend::new(fout.as_ref(), SVG_SIZE).into_drawing_area();
        self.draw(&root)
            .map_err(|e| PlotError::Drawing(e.to_string()))
    }

    /// plots the figure to an svg document kept in memory
    pub fn to_svg_string(&self) -> Result<String, PlotError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, SVG_SIZE).into_drawing_area();
            self.draw(&root)
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }
        Ok(svg)
    }

    fn draw(&self, root: &DrawingArea<SVGBackend<'_>, Shift>) -> Result<(), Box<dyn std::error::Error>> {
        root.fill(&WHITE)?;
        match &self.plot {
            Plot::Pie {
                slices,
                start_angle,
            } => self.draw_pie(root, slices, *start_angle)?,
            Plot::Xy { scale, points } => self.draw_xy(root, scale, points)?,
        }
        root.present()?;
        Ok(())
    }

    fn draw_pie(
        &self,
        root: &DrawingArea<SVGBackend<'_>, Shift>,
        slices: &[Slice],
        start_angle: f64,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let area = root.titled(&self.title, ("sans-serif", 32))?;
        let dims = area.dim_in_pixel();
        let center = (dims.0 as i32 / 2, dims.1 as i32 / 2);
        let radius = f64::from(dims.0.min(dims.1)) * 0.35;
        // plotters turns clockwise from 3 o'clock with y pointing down; drawing
        // the slices in reverse from the mirrored angle lays them out
        // counterclockwise from `start_angle`.
        let sizes: Vec<f64> = slices.iter().rev().map(|s| s.value).collect();
        let colors: Vec<RGBColor> = (0..slices.len())
            .rev()
            .map(|i| SLICE_COLORS[i % SLICE_COLORS.len()])
            .collect();
        let labels: Vec<String> = slices.iter().rev().map(Slice::text).collect();
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-start_angle);
        pie.label_style(("sans-serif", 24).into_font().color(&BLACK));
        area.draw(&pie)?;
        Ok(())
    }

    fn draw_xy(
        &self,
        root: &DrawingArea<SVGBackend<'_>, Shift>,
        scale: &XScale,
        points: &[(f64, f64)],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let points: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && !y.is_infinite())
            .collect();
        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let (xmin, xmax) = min_and_max(&xs[..]).unwrap_or((0., 1.));
        let (mut ymin, mut ymax) = min_and_max(&ys[..]).unwrap_or((0., 1.));
        if self.kind == ChartKind::Bar {
            ymin = ymin.min(0.);
            ymax = ymax.max(0.);
        }
        let bar_width = min_gap(&xs) * 0.8;
        let xspan = if xmax > xmin { xmax - xmin } else { 1. };
        let yspan = if ymax > ymin { ymax - ymin } else { 1. };
        let xmargin = (xspan / 20.).max(bar_width / 2.);
        let ymargin = yspan / 10.;
        if !(xspan + 2. * xmargin).is_finite() || !(yspan + 2. * ymargin).is_finite() {
            return Err(format!("axis range of '{}' is too large to draw", self.title).into());
        }

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 32))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(100)
            .build_cartesian_2d(xmin - xmargin..xmax + xmargin, ymin - ymargin..ymax + ymargin)?;

        let xfmt = match scale {
            XScale::Time => suitable_xfmt(chrono::Duration::seconds(xspan as i64)),
            _ => "",
        };
        let x_label_formatter = |x: &f64| -> String {
            match scale {
                XScale::Time => Utc
                    .timestamp_opt(*x as i64, 0)
                    .single()
                    .map(|t| t.format(xfmt).to_string())
                    .unwrap_or_default(),
                XScale::Numeric => format!("{}", x),
                XScale::Category(labels) => {
                    let i = x.round();
                    if (x - i).abs() < 1e-6 && i >= 0. {
                        labels.get(i as usize).cloned().unwrap_or_default()
                    } else {
                        String::new()
                    }
                }
            }
        };
        let x_desc = match (&self.x_label, scale) {
            (Some(l), XScale::Time) => format!("{} [{}]", l, xfmt.replace("%", "")),
            (Some(l), _) => l.clone(),
            (None, _) => String::new(),
        };
        let x_labels = match scale {
            XScale::Category(labels) => labels.len().min(30),
            _ => 14,
        };

        chart
            .configure_mesh()
            .light_line_style(&TRANSPARENT)
            .bold_line_style(RGBColor(150, 150, 150).stroke_width(2))
            .set_all_tick_mark_size(2)
            .label_style(("sans-serif", 24))
            .x_labels(x_labels)
            .x_label_formatter(&x_label_formatter)
            .y_label_formatter(&|y: &f64| format!("{:5}", y))
            .x_desc(x_desc)
            .y_desc(self.y_label.clone().unwrap_or_default())
            .draw()?;

        let valid = points.iter().copied().filter(|(_, y)| !y.is_nan());
        match self.kind {
            ChartKind::Line => {
                for chunk in points.split(|(_, y)| y.is_nan()) {
                    if chunk.is_empty() {
                        continue;
                    }
                    chart.draw_series(LineSeries::new(
                        chunk.iter().copied(),
                        RED.stroke_width(2),
                    ))?;
                }
                chart.draw_series(valid.map(|p| Circle::new(p, 5, RED.filled())))?;
            }
            ChartKind::Scatter => {
                chart.draw_series(valid.map(|p| Circle::new(p, 5, BLUE.filled())))?;
            }
            _ => {
                chart.draw_series(valid.map(|(x, y)| {
                    Rectangle::new(
                        [(x - bar_width / 2., 0.), (x + bar_width / 2., y)],
                        BLUE.mix(0.6).filled(),
                    )
                }))?;
            }
        }
        Ok(())
    }
}

/// Smallest distance between distinct x positions, 1 when there is none.
fn min_gap(xs: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = xs.iter().copied().filter(|x| !x.is_nan()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.)
        .fold(None, |m: Option<f64>, d| Some(m.map_or(d, |m| m.min(d))))
        .unwrap_or(1.)
}
