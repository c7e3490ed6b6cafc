// SPDX-License-Identifier: MIT OR Apache-2.0
//! `ordoplay-shader`: converts serialized source materials into target
//! materials and re-applies gamma to converted ones.
//!
//! ```bash
//! ordoplay-shader convert brick.ron --out brick.material.ron --gamma 2.2
//! ordoplay-shader convert brick.ron --out brick.material.ron --cache shaders.cache.ron
//! ordoplay-shader gamma brick.material.ron 1.8
//! ```

use clap::{Parser, Subcommand};
use ordoplay_shader_convert::{
    CacheError, ConversionError, ConversionRequest, ConversionSettings, Converter, DedupCache,
    InMemoryScene, ProviderError, SettingsError, SourceDocument, TargetHost,
};
use ordoplay_shader_graph::{Material, MaterialError, MaterialId};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Shader graph converter
#[derive(Parser, Debug)]
#[command(name = "ordoplay-shader", version, about = "Convert shader node graphs", long_about = None)]
struct Args {
    /// Log every stage
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a source material document (.ron or .json)
    Convert {
        /// Source document
        #[arg(value_name = "SOURCE")]
        input: PathBuf,

        /// Target material file to write
        #[arg(short, long, value_name = "MATERIAL")]
        out: PathBuf,

        /// Gamma for colour images
        #[arg(short, long)]
        gamma: Option<f32>,

        /// Conversion settings (RON)
        #[arg(short, long, value_name = "SETTINGS")]
        settings: Option<PathBuf>,

        /// Dedup cache file, read and updated
        #[arg(short, long, value_name = "CACHE")]
        cache: Option<PathBuf>,
    },
    /// Re-apply gamma to a converted material in place
    Gamma {
        /// Target material file
        #[arg(value_name = "MATERIAL")]
        material: PathBuf,

        /// New gamma
        gamma: f32,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to read source document: {0}")]
    Document(#[from] ProviderError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Cache file error: {0}")]
    Cache(#[from] CacheError),

    #[error("Material file error: {0}")]
    Material(#[from] MaterialError),

    #[error("Converted material {0} disappeared from the scene")]
    MissingMaterial(MaterialId),
}

fn init_logging(verbose: bool) {
    let directive = if verbose {
        "ordoplay_shader_convert=debug"
    } else {
        "ordoplay_shader_convert=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Convert {
            input,
            out,
            gamma,
            settings,
            cache,
        } => convert(&input, &out, gamma, settings.as_deref(), cache.as_deref()),
        Command::Gamma { material, gamma } => regamma(&material, gamma),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn convert(
    input: &Path,
    out: &Path,
    gamma: Option<f32>,
    settings: Option<&Path>,
    cache_path: Option<&Path>,
) -> Result<(), CliError> {
    let settings = match settings {
        Some(path) => ConversionSettings::load(path)?,
        None => ConversionSettings::default(),
    };
    let document = SourceDocument::load(input)?;
    let mut scene = InMemoryScene::with_catalog();

    // A previous result makes the cached entry live again
    if out.exists() {
        let previous = Material::load(out)?;
        tracing::debug!(material = %previous.id, "loaded previous conversion");
        scene.insert_material(previous);
    }
    let cache = match cache_path {
        Some(path) if path.exists() => DedupCache::load(path, |id| scene.contains_material(id))?,
        _ => DedupCache::new(),
    };

    let mut request = ConversionRequest::new(input.to_string_lossy()).with_object_scale(document.object_scale);
    request.gamma = gamma;

    let converter = Converter::new(settings);
    let outcome = converter.convert_material(&cache, &document, &mut scene, &request)?;

    let material = scene
        .take_material(outcome.target_id)
        .ok_or(CliError::MissingMaterial(outcome.target_id))?;
    material.save(out)?;
    if let Some(path) = cache_path {
        cache.save(path)?;
    }

    println!(
        "{} -> {} ({}, {} links, {} warnings)",
        input.display(),
        out.display(),
        if outcome.cache_hit { "cached" } else { "converted" },
        outcome.links.len(),
        outcome.diagnostics.len()
    );
    Ok(())
}

fn regamma(path: &Path, gamma: f32) -> Result<(), CliError> {
    let material = Material::load(path)?;
    let mut scene = InMemoryScene::with_catalog();
    let id = scene.insert_material(material);

    let sites = Converter::default().update_gamma(&mut scene, id, gamma)?;
    let material = scene.take_material(id).ok_or(CliError::MissingMaterial(id))?;
    material.save(path)?;

    println!("{}: gamma {gamma} on {sites} image(s)", path.display());
    Ok(())
}
