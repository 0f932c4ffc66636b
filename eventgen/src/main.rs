use anyhow::{Context, Result};
use clap::Parser;
use eventgen::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "eventgen")]
#[command(about = "Generate DOM event classes and WebIDL bindings from XPIDL event interfaces")]
struct Args {
    /// Configuration file listing the events to generate
    config: PathBuf,

    /// Additional schema search directory, searched after the current directory
    #[arg(short = 'I', value_name = "DIR")]
    include_dirs: Vec<PathBuf>,

    /// Implementation file
    #[arg(short = 'o', long = "stub-output")]
    stub_output: Option<PathBuf>,

    /// Factory prototype header
    #[arg(long)]
    header_output: Option<PathBuf>,

    /// Class declarations header
    #[arg(long)]
    class_declarations: Option<PathBuf>,

    /// Dependency file for the implementation file
    #[arg(long)]
    makedepend_output: Option<PathBuf>,

    /// Directory receiving one WebIDL file per event
    #[arg(long = "webidltarget", value_name = "DIR")]
    webidl_target: Option<PathBuf>,
}

impl Args {
    fn search_path(&self) -> Vec<PathBuf> {
        let mut dirs = vec![PathBuf::from(".")];
        dirs.extend(self.include_dirs.iter().cloned());
        dirs
    }

    fn outputs(&self) -> OutputPaths {
        OutputPaths {
            header: self.header_output.clone(),
            class_declarations: self.class_declarations.clone(),
            stub: self.stub_output.clone(),
            makedepend: self.makedepend_output.clone(),
            webidl_dir: self.webidl_target.clone(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = Configuration::from_file(&args.config)
        .with_context(|| format!("failed to read configuration {}", args.config.display()))?;
    tracing::info!(
        "generating {} event(s) from {}",
        config.simple_events.len(),
        args.config.display()
    );

    let session = GenerationSession::open(config, SchemaLoader::new(args.search_path()))
        .context("failed to load event interfaces")?;
    let summary = Generator::new(&session)
        .write(&args.outputs())
        .context("failed to generate event classes")?;

    tracing::info!(
        "wrote {} file(s), kept {} existing WebIDL file(s)",
        summary.written.len(),
        summary.skipped.len()
    );
    Ok(())
}
