//! osdoc. Generate script-facing API documentation for engine libraries.
//!
//! Each input library is described by a metadata dump (`Acme.Lib.meta.json`)
//! and the XML doc file the compiler wrote next to it (`Acme.Lib.xml`):
//!
//! - `osdoc bin/Acme.Lib.dll` renders markdown to stdout
//! - `osdoc -f xml -o docs/stdlib.xml bin/` documents every library in `bin/`

mod builder;
mod comments;
mod config;
mod error;
mod logging;
mod metadata;
mod model;
mod names;
mod render;
mod signature;
mod toc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use comments::CommentSource;
use config::{Config, Overrides, ProjectFile};
use metadata::dump::{self, DumpProvider};
use metadata::MetadataProvider;
use model::{DocumentCollection, LibraryDoc};
use names::{NameNormalizer, TypeDictionary};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(
    name = "osdoc",
    about = "Generate script-facing API documentation from annotated engine libraries"
)]
struct Cli {
    /// Library inputs: `.dll` or `.meta.json` paths, directories, or glob patterns.
    libraries: Vec<String>,

    /// Output file. Writes to stdout when omitted; a directory gets `stdlib.<ext>`.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: markdown (default), html, json, xml
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// JSON project file with defaults for every other option
    #[arg(long)]
    project: Option<PathBuf>,

    /// Type dictionary shared between runs
    #[arg(long)]
    types_map: Option<PathBuf>,

    /// Neither read nor update the type dictionary
    #[arg(long, conflicts_with = "types_map")]
    no_types_map: bool,

    /// Prefix for links to documented types
    #[arg(long)]
    base_url: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Only print errors from the command itself
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing_subscriber(logging::LogOptions {
        verbosity: cli.verbose,
        quiet: cli.quiet,
    })?;

    let project = cli.project.as_deref().map(ProjectFile::load).transpose()?;
    let config = Config::resolve(
        project,
        Overrides {
            libraries: cli.libraries,
            output: cli.output,
            format: cli.format,
            base_url: cli.base_url,
            types_map: cli.types_map,
            no_types_map: cli.no_types_map,
        },
    );
    run(&config)
}

fn run(config: &Config) -> Result<()> {
    if config.libraries.is_empty() {
        bail!("no libraries given");
    }
    let renderer = render::create_renderer(&config.format)?;
    let inputs = expand_globs(&config.libraries)?;

    let mut dictionary = match config.types_map {
        Some(ref path) => TypeDictionary::load(path)?,
        None => TypeDictionary::default(),
    };

    let mut docs = DocumentCollection::default();
    for input in &inputs {
        match document_library(input, config, &mut dictionary) {
            Ok(Some(library)) => docs.push(library),
            Ok(None) => {}
            Err(e) if e.is_library_level() => error!("{}: {}", input.display(), e),
            Err(e) => return Err(e.into()),
        }
    }

    if docs.is_empty() {
        warn!("no documented types found");
    } else {
        info!("Documented {} types", docs.nodes().count());
    }

    if let Some(ref path) = config.types_map {
        if dictionary.added() > 0 {
            dictionary.save(path)?;
            info!("Added {} types to {}", dictionary.added(), path.display());
        }
    }

    let names = NameNormalizer::new(&dictionary);
    let ctx = render::RenderContext {
        names: &names,
        base_url: &config.base_url,
    };
    let output = renderer.render(&docs, &ctx)?;

    match config.output {
        Some(ref path) => {
            let out_path = resolve_output(path, renderer.file_extension());
            if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory: {}", parent.display())
                })?;
            }
            fs::write(&out_path, &output)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            info!("Documentation written to {}", out_path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

/// Build the tree of one library. `Ok(None)` when it has no XML doc file.
fn document_library(
    input: &Path,
    config: &Config,
    dictionary: &mut TypeDictionary,
) -> error::Result<Option<LibraryDoc>> {
    let provider = DumpProvider::open(input, config.catalog.clone())?;
    let comment_path = provider.comment_path();
    if !comment_path.is_file() {
        warn!("Missing xml-doc: {}", comment_path.display());
        return Ok(None);
    }

    info!("Processing: {}", provider.name());
    debug!(references = ?provider.references(), "resolved references");
    let comments = CommentSource::read(&comment_path)?;
    let library = builder::build_library(&provider, &comments, dictionary)?;
    debug!(
        global_contexts = library.global_contexts().count(),
        classes = library.classes().count(),
        enums = library.enums().count(),
        "built {}",
        library.name
    );
    Ok(Some(library))
}

/// An existing directory receives `stdlib.<ext>`.
fn resolve_output(path: &Path, ext: &str) -> PathBuf {
    if path.is_dir() {
        path.join(format!("stdlib.{}", ext))
    } else {
        path.to_path_buf()
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand glob patterns and directories into library inputs.
///
/// Plain paths pass through untouched so a missing library is reported by
/// the loader. `X.dll` and `X.meta.json` in one directory count once.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        let mut matches: Vec<PathBuf> = if path.is_dir() {
            // Non-recursive scan for library inputs
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_file() && dump::is_library_input(p))
                .collect()
        } else if is_glob(pattern) {
            glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {}", pattern))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file() && dump::is_library_input(p))
                .collect()
        } else {
            vec![path.to_path_buf()]
        };
        if matches.is_empty() {
            warn!("no libraries matched: {}", pattern);
        }
        // Sort for deterministic output within one pattern
        matches.sort();
        for file in matches {
            let Some(stem) = dump::library_stem(&file) else {
                continue;
            };
            if seen.insert(file.with_file_name(&stem)) {
                files.push(file);
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn directory_scan_dedups_library_forms() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Acme.Lib.dll");
        touch(dir.path(), "Acme.Lib.meta.json");
        touch(dir.path(), "Acme.Lib.xml");
        touch(dir.path(), "Other.meta.json");

        let found = expand_globs(&[dir.path().to_string_lossy().into_owned()]).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("Acme.Lib.dll"), dir.path().join("Other.meta.json")]
        );
    }

    #[test]
    fn plain_paths_pass_through_in_order() {
        let found = expand_globs(&["b/Second.dll".to_string(), "a/First.dll".to_string()]).unwrap();
        assert_eq!(
            found,
            vec![PathBuf::from("b/Second.dll"), PathBuf::from("a/First.dll")]
        );
    }

    #[test]
    fn glob_without_matches_is_empty() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().join("*.dll").to_string_lossy().into_owned();
        assert!(expand_globs(&[pattern]).unwrap().is_empty());
    }

    #[test]
    fn output_directory_gets_default_name() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_output(dir.path(), "md"), dir.path().join("stdlib.md"));
        let file = dir.path().join("api.xml");
        assert_eq!(resolve_output(&file, "xml"), file);
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from(["osdoc", "-vv", "-f", "xml", "--no-types-map", "bin/"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format.as_deref(), Some("xml"));
        assert!(cli.no_types_map);
        assert_eq!(cli.libraries, vec!["bin/"]);
        assert!(Cli::try_parse_from(["osdoc", "-q", "-v", "x"]).is_err());
    }
}
