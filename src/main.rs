use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use songdash::chart::{build_ranked_bar, build_scatter, Chart, HierarchyShape};
use songdash::config::AppConfig;
use songdash::dashboard::{
    build_dashboard, dashboard_options, popular_artists, DashboardChoices, DashboardSettings,
};
use songdash::data::Dataset;
use songdash::field::Field;
use songdash::filter::filter;
use songdash::labels::resolve_axis;
use songdash::parser::apply_selection;
use songdash::selection::Selection;
use songdash::{graph, table, OutputFormat, RenderOptions};

#[derive(Parser)]
#[command(name = "songdash", version, about = "Filter the Spotify top-hits dataset and build dashboard charts", long_about = None)]
struct Cli {
    /// Songs CSV (overrides the config file)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Config file (defaults to ./songdash.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Selection expression, e.g. 'artist("Eminem") | year(2005..2015)'
    #[arg(short = 'w', long = "where", global = true, default_value = "")]
    selection: String,

    /// Output format: json, png or svg
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Write output to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List selector values, slider bounds and picker options
    Options,

    /// Print the filtered rows (CSV, or JSON with --format json)
    Table,

    /// Scatter plot of two numeric fields
    Scatter {
        /// X axis: display label or column name
        #[arg(long, default_value = "year")]
        x: String,

        /// Y axis: display label or column name
        #[arg(long, default_value = "Duração")]
        y: String,

        #[arg(long)]
        title: Option<String>,
    },

    /// Summed popularity per category, largest first
    Bar {
        /// Category: display label or column name (text fields or year)
        #[arg(long, default_value = "Gênero")]
        by: String,

        /// Maximum number of bars
        #[arg(long)]
        cap: Option<usize>,

        #[arg(long)]
        title: Option<String>,
    },

    /// Most popular artists and their songs
    Hierarchy {
        /// sunburst or treemap
        #[arg(long, default_value = "sunburst")]
        shape: HierarchyShape,

        /// Number of artists
        #[arg(long)]
        top: Option<usize>,

        #[arg(long)]
        title: Option<String>,
    },

    /// Every section of the dashboard as one JSON document
    Dashboard {
        #[arg(long, default_value = "sunburst")]
        shape: HierarchyShape,

        /// Parameter plotted over the years
        #[arg(long, default_value = "Duração")]
        years_parameter: String,

        /// Profile correlation X axis
        #[arg(long, default_value = "Energia")]
        profile_x: String,

        /// Profile correlation Y axis
        #[arg(long, default_value = "Volume")]
        profile_y: String,

        /// Popularity bar category
        #[arg(long, default_value = "Gênero")]
        bar_parameter: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;

    // CLI > config
    let data_path = cli.data.clone().unwrap_or_else(|| config.data_path.clone());
    let dataset = Dataset::load(&data_path)?;

    let selection = apply_selection(Selection::for_dataset(&dataset), &cli.selection)
        .context("Invalid --where expression")?;

    let render = RenderOptions {
        format: cli.format.unwrap_or(config.render.format),
        ..config.render.clone()
    };
    let output = cli.output.as_deref();

    match cli.command {
        Commands::Options => {
            let options = dashboard_options(&dataset);
            emit_json(&options, output)
        }
        Commands::Table => {
            let view = filter(&dataset, &selection);
            let mut buffer = Vec::new();
            match cli.format {
                None => table::write_csv(&view, &mut buffer)?,
                Some(OutputFormat::Json) => table::write_json(&view, &mut buffer)?,
                Some(other) => bail!("The table can be written as CSV or JSON, not {}", other),
            }
            emit(&buffer, output)
        }
        Commands::Scatter { x, y, title } => {
            let view = filter(&dataset, &selection);
            let chart = build_scatter(&view, resolve_axis(&x)?, resolve_axis(&y)?)?;
            emit_chart(&Chart::Scatter(chart), title.as_deref(), &render, output)
        }
        Commands::Bar { by, cap, title } => {
            let view = filter(&dataset, &selection);
            let cap = cap.unwrap_or(config.bar_cap);
            let chart = build_ranked_bar(&view, resolve_axis(&by)?, Field::Popularity, cap)?;
            emit_chart(&Chart::RankedBar(chart), title.as_deref(), &render, output)
        }
        Commands::Hierarchy { shape, top, title } => {
            let view = filter(&dataset, &selection);
            let top = top.unwrap_or(config.top_artists);
            let (_, chart) = popular_artists(&view, top, shape)?;
            emit_chart(&Chart::Hierarchy(chart), title.as_deref(), &render, output)
        }
        Commands::Dashboard {
            shape,
            years_parameter,
            profile_x,
            profile_y,
            bar_parameter,
        } => {
            if matches!(cli.format, Some(OutputFormat::Png | OutputFormat::Svg)) {
                bail!("The dashboard is only available as JSON; render single charts instead");
            }
            let choices = DashboardChoices {
                hierarchy_shape: shape,
                years_parameter,
                profile_x,
                profile_y,
                bar_parameter,
            };
            let settings = DashboardSettings {
                top_artists: config.top_artists,
                bar_cap: config.bar_cap,
            };
            let dashboard = build_dashboard(&dataset, &selection, &choices, settings)?;
            emit_json(&dashboard, output)
        }
    }
}

fn emit_chart(
    chart: &Chart,
    title: Option<&str>,
    render: &RenderOptions,
    output: Option<&Path>,
) -> Result<()> {
    match render.format {
        OutputFormat::Json => emit_json(chart, output),
        _ => {
            let bytes = graph::render_chart(chart, title, render).context("Failed to render chart")?;
            emit(&bytes, output)
        }
    }
}

fn emit_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).context("Failed to serialize output")?;
    bytes.push(b'\n');
    emit(&bytes, output)
}

fn emit(bytes: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write '{}'", path.display())),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(bytes)
                .context("Failed to write to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
            Ok(())
        }
    }
}
