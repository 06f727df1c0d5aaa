use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use region_map_cli::MapJob;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace every region of a mask image and export the areas as GeoJSON
    Trace {
        /// Path to the mask image (overrides the job file)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Path to a TOML or JSON job file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Where to write the GeoJSON (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Alpha values above this are foreground
        #[arg(long)]
        threshold: Option<u8>,
        /// Vertex budget per traced region
        #[arg(long)]
        max_vertices: Option<usize>,
        /// Allowed outline deviation in pixels
        #[arg(long)]
        precision: Option<f64>,
    },
    /// Report which area covers an image coordinate (Y down)
    Lookup {
        /// Path to the mask image (overrides the job file)
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short = 'x', allow_negative_numbers = true)]
        x: i32,
        #[arg(short = 'y', allow_negative_numbers = true)]
        y: i32,
        /// Path to a TOML or JSON job file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the JSON schema of job files
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Trace {
            input,
            config,
            output,
            threshold,
            max_vertices,
            precision,
        } => {
            let mut job = load_job(input.as_deref(), config.as_deref())?;
            if let Some(threshold) = threshold {
                job.mapper.alpha_threshold = *threshold;
            }
            if let Some(max_vertices) = max_vertices {
                job.mapper.max_vertices = *max_vertices;
            }
            if let Some(precision) = precision {
                job.mapper.precision = *precision;
            }
            if output.is_some() {
                job.output = output.clone();
            }
            trace(&job)?;
        }
        Commands::Lookup { input, x, y, config } => {
            let job = load_job(input.as_deref(), config.as_deref())?;
            lookup(&job, *x, *y)?;
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(MapJob);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn load_job(input: Option<&Path>, config: Option<&Path>) -> Result<MapJob> {
    let mut job = match (config, input) {
        (Some(config), _) => MapJob::from_file(config)?,
        (None, Some(input)) => MapJob::new(input),
        (None, None) => {
            return Err(eyre!("Provide a mask with --input or a job file with --config"));
        }
    };
    if let Some(input) = input {
        job.input = input.to_path_buf();
    }
    Ok(job)
}

fn trace(job: &MapJob) -> Result<()> {
    info!("Tracing regions of {:?}", job.input);
    let mapper = job.run()?;

    let areas = mapper.areas();
    if areas.is_empty() {
        warn!("No areas found in {:?}", job.input);
    }
    for area in areas {
        info!(
            "{} [{}] coords={:?}",
            area.tag,
            area.shape.kind(),
            area.shape.coords()
        );
    }

    match &job.output {
        Some(path) => {
            mapper.save_geojson(path)?;
            info!("✅ Wrote {} areas to {:?}", areas.len(), path);
        }
        None => println!("{}", mapper.to_geojson_string()?),
    }
    Ok(())
}

fn lookup(job: &MapJob, x: i32, y: i32) -> Result<()> {
    let mapper = job.run()?;
    match mapper.lookup_object_at(x, y) {
        Some(tag) => println!("{tag}"),
        None => {
            warn!("No area at ({}, {})", x, y);
            println!("none");
        }
    }
    Ok(())
}
