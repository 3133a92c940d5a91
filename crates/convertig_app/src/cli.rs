//! Command-line surface of `convertig`.
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use convertig_core::{catalog, ArtifactState, ItemId, Selection};
use convertig_engine::{LocalFile, Session};
use convertig_logging::{cv_info, cv_warn};

use crate::config::AppConfig;

/// Convert files through the conversion service.
#[derive(Debug, Parser)]
#[command(name = "convertig", version, about = "Multi-source file conversion client")]
pub struct Cli {
    /// RON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity; repeat for trace output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the category and target formats offered for a file
    Formats {
        file: PathBuf,
    },
    /// Convert files and save every converted result
    Convert {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// `SUBCATEGORY:FORMAT`, once for all files or once per file
        #[arg(long = "to", required = true)]
        to: Vec<String>,
        /// Directory the converted files are saved into
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Returns whether every requested file was converted and saved.
pub async fn run(cli: Cli, config: AppConfig) -> Result<bool> {
    match cli.command {
        Commands::Formats { file } => {
            print!("{}", describe_formats(&file.to_string_lossy()));
            Ok(true)
        }
        Commands::Convert { files, to, out } => convert(config, files, to, out).await,
    }
}

pub fn describe_formats(name: &str) -> String {
    let category = catalog::category_of(&catalog::extension_of(name));
    let mut text = format!("{name}: {category}\n");
    for sub in catalog::subcategories_of(category) {
        text.push_str(&format!(
            "  {sub}: {}\n",
            catalog::targets_of(category, sub).join(" ")
        ));
    }
    text
}

/// One selection per file; a single `--to` applies to all of them.
pub fn selections_for(file_count: usize, tokens: &[String]) -> Result<Vec<Selection>> {
    let parsed = tokens
        .iter()
        .map(|token| {
            Selection::parse(token)
                .with_context(|| format!("--to {token:?} is not of the form SUBCATEGORY:FORMAT"))
        })
        .collect::<Result<Vec<_>>>()?;
    match parsed.as_slice() {
        [only] => Ok(vec![only.clone(); file_count]),
        _ if parsed.len() == file_count => Ok(parsed),
        _ => bail!(
            "got {} --to values for {} files; pass one for all or one per file",
            parsed.len(),
            file_count
        ),
    }
}

async fn convert(
    config: AppConfig,
    files: Vec<PathBuf>,
    to: Vec<String>,
    out: Option<PathBuf>,
) -> Result<bool> {
    let selections = selections_for(files.len(), &to)?;
    let mut inputs = Vec::with_capacity(files.len());
    for path in &files {
        inputs.push(LocalFile::read(path).with_context(|| format!("reading {}", path.display()))?);
    }
    let mut wanted: Vec<(String, Selection)> = inputs
        .iter()
        .map(|file| file.name.clone())
        .zip(selections)
        .collect();

    let mut session = Session::new(config.engine_config(out)?)?;
    session.ingest_local(inputs);
    let mut complete = true;
    if let Some(message) = session.state().diagnostic() {
        eprintln!("{message}");
        complete = false;
    }

    let tracked: Vec<(ItemId, String)> = session
        .state()
        .store()
        .list()
        .iter()
        .map(|item| (item.id(), item.name().to_string()))
        .collect();
    if tracked.is_empty() {
        bail!("no files left to convert");
    }
    for (id, name) in &tracked {
        let Some(index) = wanted.iter().position(|(wanted_name, _)| wanted_name == name) else {
            continue;
        };
        let (_, selection) = wanted.remove(index);
        session.select_subcategory(*id, &selection.subcategory);
        session.select_format(*id, &selection.subcategory, &selection.format);
        let applied = session
            .state()
            .store()
            .get(*id)
            .is_some_and(|item| item.selection().is_some());
        if !applied {
            bail!(
                "{selection} is not offered for {name}; run `convertig formats {name}` for the options"
            );
        }
    }

    session.submit_batch()?;
    cv_info!("submitted {} file(s)", tracked.len());
    session.settle().await;

    for (id, _) in &tracked {
        if session.state().store().artifact(*id).is_some_and(|a| a.is_ready()) {
            session.download(*id)?;
        }
    }
    session.settle().await;

    for (id, name) in &tracked {
        match session.state().store().artifact(*id) {
            Some(artifact) if artifact.state == ArtifactState::Ready => {
                println!("{name} -> {}", artifact.name);
            }
            Some(artifact) => {
                complete = false;
                let reason = artifact
                    .failure
                    .as_ref()
                    .map(|failure| failure.message.as_str())
                    .unwrap_or("not converted");
                println!("{name} failed: {reason}");
            }
            None => {
                complete = false;
                println!("{name} failed: no result");
            }
        }
    }
    if let Some(message) = session.state().diagnostic() {
        cv_warn!("{}", message);
        eprintln!("{message}");
        complete = false;
    }
    println!("saved into {}", session.config().save_dir.display());
    Ok(complete)
}
