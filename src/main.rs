use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};

use schedgraph::algorithms::analysis::{analyze_file, collect_datasets, AnalysisConfig, DatasetReport, Task};
use schedgraph::generator::{generate_dataset, GeneratorConfig};
use schedgraph::types::graph_file::DescriptionFormat;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze graph description files, or every .json/.yaml/.yml file in a directory.
    Analyze {
        /// Description files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Source vertex for path analysis, overriding each file's `source`.
        #[arg(short, long)]
        source: Option<usize>,

        /// Analyses to run.
        #[arg(short, long, value_enum, value_delimiter = ',', default_value = "all")]
        task: Vec<Task>,

        /// Report format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Show a progress bar over the datasets.
        #[arg(short, long)]
        progress: bool,
    },
    /// Generate a synthetic dataset file.
    Generate {
        /// Output file; the extension selects JSON or YAML
        out: PathBuf,

        /// Vertex count.
        #[arg(short = 'n', long, default_value_t = 10)]
        vertices: usize,

        /// Target edge count.
        #[arg(short, long, default_value_t = 15)]
        edges: usize,

        /// Plant cycles before the random edges.
        #[arg(short, long)]
        cyclic: bool,

        /// Number of planted ring blocks when cyclic.
        #[arg(long, default_value_t = 1)]
        sccs: usize,

        /// Random seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Description written as a `#` header line.
        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb.set_message("Analyzing datasets.");
    pb
}

fn run_analyze(paths: &[PathBuf], config: &AnalysisConfig, format: OutputFormat, progress: bool) -> ExitCode {
    let datasets = match collect_datasets(paths) {
        Ok(datasets) => datasets,
        Err(err) => {
            error!("Cannot list datasets: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if datasets.is_empty() {
        error!("No dataset files found.");
        return ExitCode::FAILURE;
    }

    let pb = progress.then(|| progress_bar(datasets.len()));
    let mut reports: Vec<DatasetReport> = Vec::new();
    for dataset in &datasets {
        match analyze_file(dataset, config) {
            Ok(report) => {
                if format == OutputFormat::Text {
                    let text = format!("{}\n{}", "=".repeat(60), report);
                    match &pb {
                        Some(pb) => pb.suspend(|| print!("{}", text)),
                        None => print!("{}", text),
                    }
                }
                reports.push(report);
            }
            Err(err) => warn!("Skipping {}: {}", dataset.display(), err),
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }
    if let Some(pb) = pb {
        pb.finish_with_message("Analysis finished.");
    }

    let rendered = match format {
        OutputFormat::Text => Ok(String::new()),
        OutputFormat::Json => serde_json::to_string_pretty(&reports).map_err(|err| err.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(&reports).map_err(|err| err.to_string()),
    };
    match rendered {
        Ok(rendered) if !rendered.is_empty() => println!("{}", rendered),
        Ok(_) => {}
        Err(err) => {
            error!("Cannot render reports: {}", err);
            return ExitCode::FAILURE;
        }
    }

    info!("Analyzed {} of {} datasets.", reports.len(), datasets.len());
    if reports.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Args = Args::parse();
    match args.command {
        Command::Analyze {
            paths,
            source,
            task,
            format,
            progress,
        } => {
            let config = AnalysisConfig {
                tasks: task,
                source_override: source,
            };
            run_analyze(&paths, &config, format, progress)
        }
        Command::Generate {
            out,
            vertices,
            edges,
            cyclic,
            sccs,
            seed,
            description,
        } => {
            let config = GeneratorConfig {
                vertices,
                edges,
                cyclic,
                sccs,
                seed,
            };
            if !DescriptionFormat::is_supported(&out) {
                warn!("Unknown extension for {}, writing JSON.", out.display());
            }
            let dataset = generate_dataset(&config);
            match dataset.save(&out, description.as_deref()) {
                Ok(()) => {
                    info!("Generated: {} ({} edges).", out.display(), dataset.edges.len());
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    error!("Cannot write {}: {}", out.display(), err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
