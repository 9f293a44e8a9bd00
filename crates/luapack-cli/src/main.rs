use clap::Parser;
use luapack_core::resolver::normalize_path;
use luapack_core::{BundlerConfig, CliOverrides, Container};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// luapack - bundle a tree of Lua modules into one self-contained file
#[derive(Parser, Debug, Clone)]
#[command(name = "luapack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base directory every module path is resolved against
    #[arg(value_name = "BASE_DIR")]
    base_dir: PathBuf,

    /// Entry module, relative to the base directory
    #[arg(value_name = "ENTRY")]
    entry: PathBuf,

    /// Where to write the bundled artifact
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to a luapack.yaml / luapack.json configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write a JSON build manifest
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Rebuild whenever a module under the base directory changes
    #[arg(short, long)]
    watch: bool,

    /// Extensions probed for extension-less imports (comma-separated, in order)
    #[arg(long, value_name = "EXTS")]
    extensions: Option<String>,

    /// Omit the header comment
    #[arg(long)]
    no_header: bool,

    /// Omit the host bridge
    #[arg(long)]
    no_bridge: bool,

    /// Do not warn about type declarations
    #[arg(long)]
    no_type_warnings: bool,

    /// Print diagnostics without ANSI styling
    #[arg(long)]
    no_pretty: bool,
}

fn main() {
    // Set RUST_LOG=debug to trace every resolved import
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let base_dir = absolute(&cli.base_dir)?;
    let config = load_config(&cli, &base_dir)?;

    info!("Base directory: {}", base_dir.display());
    debug!("Extensions: {:?}", config.extensions);
    debug!("Watch mode: {}", cli.watch);

    if cli.watch {
        watch_mode(&cli, &base_dir, config)
    } else {
        build(&cli, &base_dir, &config)
    }
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Load configuration from file (explicit or discovered) and apply CLI overrides
fn load_config(cli: &Cli, base_dir: &Path) -> anyhow::Result<BundlerConfig> {
    let config_path = match cli.config {
        Some(ref path) => Some(path.clone()),
        None => BundlerConfig::discover(base_dir),
    };

    let mut config = match config_path {
        Some(ref path) => {
            info!("Using configuration {}", path.display());
            BundlerConfig::from_file(path)?
        }
        None => BundlerConfig::default(),
    };

    let mut overrides = CliOverrides::default();
    if let Some(ref extensions) = cli.extensions {
        overrides.extensions = Some(
            extensions
                .split(',')
                .map(|ext| ext.trim().to_string())
                .collect(),
        );
    }
    if cli.no_header {
        overrides.header = Some(false);
    }
    if cli.no_bridge {
        overrides.bridge = Some(false);
    }
    if cli.no_type_warnings {
        overrides.type_warnings = Some(false);
    }
    if cli.no_pretty {
        overrides.pretty = Some(false);
    }

    config.merge(&overrides);
    Ok(config.validated()?)
}

/// Bundle once and write the artifact (and manifest, if requested)
///
/// Nothing is written unless the whole build succeeds.
fn build(cli: &Cli, base_dir: &Path, config: &BundlerConfig) -> anyhow::Result<()> {
    let container = Container::new(config.clone());
    let bundle = container.bundle(base_dir, &cli.entry)?;

    let manifest = match cli.manifest {
        Some(_) => Some(bundle.manifest().to_json()?),
        None => None,
    };

    // The artifact goes last, so a failed manifest write leaves no artifact behind
    let fs = container.file_system();
    if let (Some(path), Some(json)) = (&cli.manifest, manifest) {
        fs.write_file(path, &json)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    }

    fs.write_file(&cli.output, &bundle.artifact)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", cli.output.display(), e))?;

    let warnings = container.warning_count();
    if warnings > 0 {
        warn!("{} advisory warning(s)", warnings);
    }

    println!(
        "Bundled {} module(s) from {} into {}",
        bundle.graph.len(),
        bundle.graph.entry.path,
        cli.output.display()
    );

    Ok(())
}

/// Rebuild on every change to a module file under the base directory
fn watch_mode(cli: &Cli, base_dir: &Path, config: BundlerConfig) -> anyhow::Result<()> {
    use notify::{
        event::{EventKind, ModifyKind},
        Event, RecursiveMode, Watcher,
    };
    use std::sync::mpsc::channel;
    use std::time::Duration;

    println!("Watching {} for changes... (Press Ctrl+C to stop)", base_dir.display());

    // Initial build
    if let Err(err) = build(cli, base_dir, &config) {
        eprintln!("Error: {:#}", err);
    }

    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;
    watcher.watch(base_dir, RecursiveMode::Recursive)?;

    let outputs = output_paths(cli);

    let mut last_build = std::time::Instant::now();
    let debounce_duration = Duration::from_millis(100);

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let should_rebuild = matches!(
                    event.kind,
                    EventKind::Modify(ModifyKind::Data(_))
                        | EventKind::Modify(ModifyKind::Name(_))
                        | EventKind::Create(_)
                        | EventKind::Remove(_)
                ) && event
                    .paths
                    .iter()
                    .any(|path| is_module_change(path, &outputs, &config.extensions));

                if should_rebuild {
                    let now = std::time::Instant::now();
                    if now.duration_since(last_build) >= debounce_duration {
                        println!("\nModule changed, rebuilding...");
                        if let Err(err) = build(cli, base_dir, &config) {
                            eprintln!("Error: {:#}", err);
                        }
                        last_build = now;
                    }
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                return Err(anyhow::anyhow!("File watcher disconnected"));
            }
        }
    }
}

/// Absolute, lexically normalized paths of everything a build writes
fn output_paths(cli: &Cli) -> Vec<PathBuf> {
    std::iter::once(&cli.output)
        .chain(cli.manifest.as_ref())
        .filter_map(|path| absolute(path).ok())
        .map(|path| normalize_path(&path))
        .collect()
}

/// A watcher event path that should trigger a rebuild
///
/// Our own outputs may live under the base directory and never count.
fn is_module_change(path: &Path, outputs: &[PathBuf], extensions: &[String]) -> bool {
    let path = normalize_path(path);
    let name = path.to_string_lossy();
    !outputs.contains(&path) && extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extensions() -> Vec<String> {
        vec![".luau".to_string(), ".lua".to_string()]
    }

    #[test]
    fn test_output_paths_are_normalized() {
        let cli = Cli::parse_from([
            "luapack",
            "/project",
            "main.luau",
            "/project/dist/../out.lua",
            "--manifest",
            "/project/./build/manifest.json",
        ]);

        assert_eq!(
            output_paths(&cli),
            vec![
                PathBuf::from("/project/out.lua"),
                PathBuf::from("/project/build/manifest.json"),
            ]
        );
    }

    #[test]
    fn test_own_output_does_not_trigger_rebuild() {
        let cli = Cli::parse_from(["luapack", "/project", "main.luau", "/project/dist/../out.lua"]);
        let outputs = output_paths(&cli);

        assert!(!is_module_change(Path::new("/project/out.lua"), &outputs, &extensions()));
        assert!(!is_module_change(
            Path::new("/project/./out.lua"),
            &outputs,
            &extensions()
        ));
    }

    #[test]
    fn test_module_edit_triggers_rebuild() {
        let outputs = vec![PathBuf::from("/project/out.lua")];

        assert!(is_module_change(Path::new("/project/src/a.luau"), &outputs, &extensions()));
        assert!(is_module_change(Path::new("/project/b.lua"), &outputs, &extensions()));
        assert!(!is_module_change(Path::new("/project/notes.txt"), &outputs, &extensions()));
    }
}
