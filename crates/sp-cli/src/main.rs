//! shapeplot CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use sp_core::{Analysis, AnalysisConfig, PlotBin, RootHistogramSource, ShapeComparison};
use sp_render::{OutputFormat, ShapeRenderer, StyleConfig};

#[derive(Parser)]
#[command(name = "shapeplot")]
#[command(about = "shapeplot - data versus transfer-factor background shape comparisons")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every (variable, jet bin, b-tag bin, HT bin) comparison
    Plot {
        /// Analysis configuration (YAML). Defaults to the built-in run.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Plot style (YAML), merged over its `theme` (cms2012 or minimal)
        #[arg(long)]
        style: Option<PathBuf>,

        /// Directory holding the input ROOT files
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Output directory
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Image format (pdf, svg, png)
        #[arg(long)]
        format: Option<String>,

        /// Only plot these variables (repeatable)
        #[arg(long = "var")]
        vars: Vec<String>,

        /// Also write each comparison as JSON next to the image
        #[arg(long)]
        emit_json: bool,
    },

    /// Print per-region transfer factors and estimates for one bin (pretty JSON)
    Yields {
        /// Analysis configuration (YAML). Defaults to the built-in run.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the input ROOT files
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Histogram title, e.g. AlphaT
        #[arg(long)]
        var: String,

        /// Jet bin label (le3j, ge4j)
        #[arg(long)]
        njet: String,

        /// B-tag bin label (eq0b, eq1b, ...)
        #[arg(long)]
        btag: String,

        /// HT bin label, e.g. 375_475
        #[arg(long)]
        ht: String,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a comparison JSON written by `plot --emit-json`
    Render {
        /// Comparison JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output image; the format follows the extension
        #[arg(short, long)]
        output: PathBuf,

        /// Plot style (YAML)
        #[arg(long)]
        style: Option<PathBuf>,
    },

    /// List the keys of a ROOT file or one of its directories
    Keys {
        /// ROOT file
        file: PathBuf,

        /// Directory path inside the file
        #[arg(long, default_value = "")]
        dir: String,
    },

    /// Print the built-in analysis configuration as YAML
    DefaultConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Plot { config, style, input_dir, out_dir, format, vars, emit_json } => {
            let overrides = PlotOverrides { input_dir, out_dir, format, vars, emit_json };
            cmd_plot(config.as_deref(), style.as_deref(), overrides)
        }
        Commands::Yields { config, input_dir, var, njet, btag, ht, output } => {
            cmd_yields(config.as_deref(), input_dir, &var, &njet, &btag, &ht, output.as_deref())
        }
        Commands::Render { input, output, style } => cmd_render(&input, &output, style.as_deref()),
        Commands::Keys { file, dir } => cmd_keys(&file, &dir),
        Commands::DefaultConfig => {
            print!("{}", AnalysisConfig::default().to_yaml()?);
            Ok(())
        }
    }
}

struct PlotOverrides {
    input_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    format: Option<String>,
    vars: Vec<String>,
    emit_json: bool,
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::load(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_style(path: Option<&Path>) -> Result<StyleConfig> {
    let Some(p) = path else {
        return Ok(StyleConfig::default());
    };
    let text = std::fs::read_to_string(p)
        .with_context(|| format!("failed to read style {}", p.display()))?;
    sp_render::resolve_style(Some(&text))
        .with_context(|| format!("invalid style {}", p.display()))
}

fn cmd_plot(config: Option<&Path>, style: Option<&Path>, overrides: PlotOverrides) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(dir) = overrides.input_dir {
        config.input_dir = dir;
    }
    if let Some(dir) = overrides.out_dir {
        config.output.dir = dir;
    }
    if let Some(format) = overrides.format {
        config.output.format = format;
    }
    if !overrides.vars.is_empty() {
        config.variables = overrides.vars;
    }
    config.output.emit_json |= overrides.emit_json;
    config.validate()?;

    let format: OutputFormat = config.output.format.parse()?;
    let renderer = ShapeRenderer::new(load_style(style)?)?;
    std::fs::create_dir_all(&config.output.dir).with_context(|| {
        format!("failed to create output directory {}", config.output.dir.display())
    })?;

    let bins = config.plot_bins()?;
    let mut analysis = Analysis::new(&config, RootHistogramSource::new(config.path_template()));
    for bin in &bins {
        let cmp = analysis.compare(bin).with_context(|| format!("failed to build {bin}"))?;
        let image = plot_path(&config, bin, format.extension());
        renderer.to_file(&cmp, &image).with_context(|| format!("failed to render {bin}"))?;
        if config.output.emit_json {
            let json = plot_path(&config, bin, "json");
            std::fs::write(&json, cmp.to_json_pretty()?)
                .with_context(|| format!("failed to write {}", json.display()))?;
        }
    }
    tracing::info!(
        plots = bins.len(),
        files = analysis.source().open_files(),
        dir = %config.output.dir.display(),
        "done"
    );
    Ok(())
}

fn plot_path(config: &AnalysisConfig, bin: &PlotBin, ext: &str) -> PathBuf {
    sp_core::output_path(&config.output.dir, &config.output.stem, bin, ext)
}

fn cmd_yields(
    config: Option<&Path>,
    input_dir: Option<PathBuf>,
    var: &str,
    njet: &str,
    btag: &str,
    ht: &str,
    output: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(dir) = input_dir {
        config.input_dir = dir;
    }
    config.validate()?;

    let bin = PlotBin::parse(var, njet, btag, ht)?;
    let mut analysis = Analysis::new(&config, RootHistogramSource::new(config.path_template()));
    let report = analysis.yields(&bin).with_context(|| format!("failed to compute {bin}"))?;
    let json = report.to_json_pretty()?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_render(input: &Path, output: &Path, style: Option<&Path>) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let cmp: ShapeComparison = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a shape comparison", input.display()))?;
    ShapeRenderer::new(load_style(style)?)?.to_file(&cmp, output)?;
    Ok(())
}

fn cmd_keys(file: &Path, dir: &str) -> Result<()> {
    let root = sp_root::RootFile::open(file)
        .with_context(|| format!("failed to open {}", file.display()))?;
    for key in root.list_keys(dir)? {
        println!("{};{}\t{}\t{}", key.name, key.cycle, key.class_name, key.title);
    }
    Ok(())
}
