use anyhow::anyhow;
use clap::{App, Arg, ArgMatches};
use std::path::PathBuf;

use super::VERSION;
use crate::select::ChartKind;
use crate::PipelineConfig;

/// Settings of one run of the command line app.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub csvin: PathBuf,
    pub svgout: PathBuf,
    pub x: Option<String>,
    pub y: Option<String>,
    pub kind: Option<ChartKind>,
    pub config: PipelineConfig,
    pub preview: usize,
    pub list: bool,
}

fn app() -> App<'static, 'static> {
    let arg_csvin = Arg::with_name("input_csvfile")
        .help("name for the csv file; the first row is skipped, the second is the header")
        .short("f")
        .long("csvfile")
        .takes_value(true)
        .required(true);
    let arg_svgout = Arg::with_name("output_svgfile")
        .help("name of the output svg file, defaults to the csv name with svg extension")
        .short("o")
        .long("svgfile")
        .takes_value(true);
    let arg_xcol = Arg::with_name("xcol")
        .help("column for the x axis, defaults to Timestamp")
        .short("x")
        .long("xcol")
        .takes_value(true);
    let arg_ycol = Arg::with_name("ycol")
        .help("column for the y axis, defaults to the second column")
        .short("y")
        .long("ycol")
        .takes_value(true);
    let arg_kind = Arg::with_name("kind")
        .help("chart type; pie is not available with --daily")
        .short("k")
        .long("kind")
        .takes_value(true)
        .case_insensitive(true)
        .possible_values(&["line", "scatter", "bar", "pie"])
        .default_value("line");
    let arg_daily = Arg::with_name("daily")
        .help("resample to daily means before plotting")
        .short("d")
        .long("daily")
        .takes_value(false);
    let arg_preview = Arg::with_name("preview")
        .help("number of rows of the table to print")
        .short("n")
        .long("preview")
        .takes_value(true)
        .default_value("10");
    let arg_max_pie = Arg::with_name("max_pie_categories")
        .help("maximum number of distinct x values for a pie chart")
        .long("max_pie_categories")
        .takes_value(true)
        .default_value("10");
    let arg_list = Arg::with_name("list")
        .help("print the available columns and chart types, do not plot")
        .short("l")
        .long("list")
        .takes_value(false);
    App::new("csv_dashboard")
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to preview a csv time series and plot two of its columns")
        .arg(arg_csvin)
        .arg(arg_svgout)
        .arg(arg_xcol)
        .arg(arg_ycol)
        .arg(arg_kind)
        .arg(arg_daily)
        .arg(arg_preview)
        .arg(arg_max_pie)
        .arg(arg_list)
}

fn parse_number<T: std::str::FromStr>(m: &ArgMatches, name: &str) -> anyhow::Result<T> {
    let v = m.value_of(name).unwrap_or_default();
    v.parse::<T>()
        .map_err(|_| anyhow!("invalid value '{}' for --{}", v, name))
}

fn from_matches(m: &ArgMatches) -> anyhow::Result<CliArgs> {
    let csvin = PathBuf::from(m.value_of("input_csvfile").unwrap_or_default());
    let svgout = match m.value_of("output_svgfile") {
        Some(p) => PathBuf::from(p),
        None => {
            let mut svgout = csvin.clone();
            svgout.set_extension("svg");
            svgout
        }
    };
    let kind = match m.value_of("kind") {
        Some(k) => Some(k.parse::<ChartKind>()?),
        None => None,
    };
    Ok(CliArgs {
        csvin,
        svgout,
        x: m.value_of("xcol").map(String::from),
        y: m.value_of("ycol").map(String::from),
        kind,
        config: PipelineConfig {
            aggregate: m.is_present("daily"),
            max_pie_categories: parse_number(m, "max_pie_categories")?,
        },
        preview: parse_number(m, "preview")?,
        list: m.is_present("list"),
    })
}

/// Takes the CLI arguments that control loading and plotting.
pub fn parse_cli() -> anyhow::Result<CliArgs> {
    from_matches(&app().get_matches())
}
