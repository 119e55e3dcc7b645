//! docflow command-line host.
//!
//! Reads documents from disk, runs them through the conversion or metadata
//! pipeline and routes the results to stdout or to an output directory.

mod router;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docflow::{
    ConversionPipeline, DataSize, FailureReason, FlowRecord, MetadataPipeline, PipelineConfig, RecordingRouter,
    Relationship, ResultRouter, route_conversion, route_metadata,
};
use router::DirectoryRouter;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "docflow", version)]
#[command(about = "Convert documents to plain text and extract their properties", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Documents to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Largest accepted document, e.g. "1 MB" or "512KB"; "0" disables the bound
    #[arg(short = 's', long)]
    max_size: Option<DataSize>,

    /// Password for encrypted documents
    #[arg(short, long)]
    password: Option<String>,

    /// Config file (.toml, .yaml, .yml or .json); defaults to a discovered docflow.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write original/success/failure records under this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print a JSON summary instead of the extracted content
    #[arg(long)]
    json: bool,

    /// Maximum documents processed at once
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert documents to plain text
    Convert(CommonArgs),

    /// Extract document properties as attributes
    Metadata(CommonArgs),
}

/// Where one input ended up.
#[derive(Debug, Serialize)]
struct Disposition {
    source: PathBuf,
    relationship: Relationship,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<FailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Summary {
    processed: usize,
    succeeded: usize,
    failed: usize,
    documents: Vec<Disposition>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &CommonArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::discover()
            .context("searching for docflow.toml")?
            .unwrap_or_default(),
    };

    if let Some(max_size) = args.max_size {
        config.max_input_size = max_size;
    }
    if let Some(password) = &args.password {
        config.decode_password = Some(password.as_str().into());
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrent_extractions = Some(concurrency);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// File-backed records: only metadata is read here; each document's bytes
/// are read by the pipeline task that processes it.
fn read_records(files: &[PathBuf]) -> Result<Vec<(PathBuf, FlowRecord)>> {
    files
        .iter()
        .map(|path| {
            let record = FlowRecord::from_path(path).with_context(|| format!("reading {}", path.display()))?;
            Ok((path.clone(), record))
        })
        .collect()
}

enum Router {
    Directory(DirectoryRouter),
    Memory(RecordingRouter),
}

impl Router {
    fn new(output_dir: Option<&PathBuf>) -> Result<Self> {
        Ok(match output_dir {
            Some(dir) => Router::Directory(
                DirectoryRouter::new(dir).with_context(|| format!("creating output directory {}", dir.display()))?,
            ),
            None => Router::Memory(RecordingRouter::new()),
        })
    }

    fn as_router(&mut self) -> &mut dyn ResultRouter {
        match self {
            Router::Directory(router) => router,
            Router::Memory(router) => router,
        }
    }

    fn output_path(&self, relationship: Relationship, record: &FlowRecord) -> Option<PathBuf> {
        match self {
            Router::Directory(router) => router.path_of(relationship, record).map(PathBuf::from),
            Router::Memory(_) => None,
        }
    }
}

async fn convert(args: CommonArgs) -> Result<Summary> {
    let config = load_config(&args)?;
    let pipeline = ConversionPipeline::from_config(&config).context("building conversion pipeline")?;
    let limits = config.limits();

    let inputs = read_records(&args.files)?;
    let (paths, records): (Vec<PathBuf>, Vec<FlowRecord>) = inputs.into_iter().unzip();
    let results = pipeline.run_batch(records, &limits).await?;

    let mut router = Router::new(args.output_dir.as_ref())?;
    let mut documents = Vec::with_capacity(results.len());

    for (path, (source, result)) in paths.into_iter().zip(results) {
        let failure = result.outcome.failure().cloned();
        let mime_type = result
            .artifact
            .as_ref()
            .and_then(|artifact| artifact.attribute(docflow::attributes::MIME_TYPE))
            .map(str::to_string);
        let artifact = result.artifact.clone();

        let relationship = route_conversion(router.as_router(), &source, result)?;
        let output = match (&relationship, &artifact) {
            (Relationship::Success, Some(artifact)) => router.output_path(relationship, artifact),
            _ => router.output_path(relationship, &source),
        };

        if !args.json
            && args.output_dir.is_none()
            && let Some(artifact) = &artifact
        {
            if args.files.len() > 1 {
                println!("==> {} <==", path.display());
            }
            println!("{}", String::from_utf8_lossy(&artifact.read_content()?));
        }

        documents.push(Disposition {
            source: path,
            relationship,
            mime_type,
            failure,
            output,
        });
    }

    Ok(summarize(documents))
}

async fn metadata(args: CommonArgs) -> Result<Summary> {
    let config = load_config(&args)?;
    let pipeline = MetadataPipeline::from_config(&config).context("building metadata pipeline")?;

    let inputs = read_records(&args.files)?;
    let (paths, records): (Vec<PathBuf>, Vec<FlowRecord>) = inputs.into_iter().unzip();
    let results = pipeline.run_batch(records).await?;

    let mut router = Router::new(args.output_dir.as_ref())?;
    let mut documents = Vec::with_capacity(results.len());

    for (path, (source, result)) in paths.into_iter().zip(results) {
        let failure = result.outcome.failure().cloned();
        let companion = result.companion.clone();
        let mime_type = companion
            .as_ref()
            .and_then(|record| record.attribute(docflow::attributes::MIME_TYPE))
            .map(str::to_string);

        let relationship = route_metadata(router.as_router(), &source, result)?;
        let output = match (&relationship, &companion) {
            (Relationship::Success, Some(companion)) => router.output_path(relationship, companion),
            _ => router.output_path(relationship, &source),
        };

        if !args.json
            && args.output_dir.is_none()
            && let Some(companion) = &companion
        {
            println!("==> {} <==", path.display());
            let mut attributes: Vec<(&String, &String)> = companion.attributes().iter().collect();
            attributes.sort();
            for (key, value) in attributes {
                println!("{}: {}", key, value);
            }
        }

        documents.push(Disposition {
            source: path,
            relationship,
            mime_type,
            failure,
            output,
        });
    }

    Ok(summarize(documents))
}

fn summarize(documents: Vec<Disposition>) -> Summary {
    let succeeded = documents
        .iter()
        .filter(|doc| doc.relationship == Relationship::Success)
        .count();
    Summary {
        processed: documents.len(),
        succeeded,
        failed: documents.len() - succeeded,
        documents,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let (summary, json) = match cli.command {
        Commands::Convert(args) => {
            let json = args.json;
            (convert(args).await?, json)
        }
        Commands::Metadata(args) => {
            let json = args.json;
            (metadata(args).await?, json)
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for doc in summary.documents.iter().filter(|doc| doc.failure.is_some()) {
            if let Some(reason) = &doc.failure {
                eprintln!("{}: {}", doc.source.display(), reason);
            }
        }
    }

    tracing::info!(
        processed = summary.processed,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Done"
    );

    Ok(if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
