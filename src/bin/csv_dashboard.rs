use anyhow::{bail, Context};
use csv_dashboard::cli::parse_cli;
use csv_dashboard::Dashboard;
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_cli()?;
    info!(
        "read data from {} and plot to {}",
        args.csvin.display(),
        args.svgout.display()
    );
    let bytes = std::fs::read(&args.csvin)
        .with_context(|| format!("reading {}", args.csvin.display()))?;
    let dashboard = Dashboard::load(&bytes, args.config)
        .with_context(|| format!("loading {}", args.csvin.display()))?;

    println!("Data Preview");
    print!("{}", dashboard.table().head(args.preview));
    if dashboard.table().n_rows() > args.preview {
        println!("... {} rows in total", dashboard.table().n_rows());
    }

    let choices = dashboard.choices();
    if args.list {
        println!("columns: {}", choices.columns.join(", "));
        let kinds: Vec<&str> = choices.kinds.iter().map(|k| k.as_str()).collect();
        println!("chart types: {}", kinds.join(", "));
        return Ok(());
    }

    let selection = choices.select(args.x.as_deref(), args.y.as_deref(), args.kind)?;
    let figure = match dashboard.plot(&selection)? {
        Ok(figure) => figure,
        Err(e) => bail!("{}", e),
    };
    figure
        .draw_svg(&args.svgout)
        .with_context(|| format!("plotting to {}", args.svgout.display()))?;
    info!("{} written to {}", figure.title, args.svgout.display());
    Ok(())
}
