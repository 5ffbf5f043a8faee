use clap::{Parser, Subcommand};
use folio::process::ProcessEvent;
use folio::{config, generate, output, process, scan};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

/// Shared flags for commands that render documents.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the render cache and re-render every document
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Static site generator for personal portfolios and blogs")]
#[command(long_about = "\
Static site generator for personal portfolios and blogs

Blog posts and project write-ups are Markdown/MDX files with YAML front
matter. Code blocks are syntax-highlighted at build time in a light and a
dark theme.

Content structure:

  content/
  ├── config.toml                  # Site config: profile, links, stack, themes (optional)
  ├── blog/
  │   ├── hello-world.mdx          # → /blog/hello-world/
  │   └── my.notes.mdx             # → /blog/my.notes/ (only .mdx is stripped)
  └── project/
      └── weather-app.mdx          # → /portfolio/weather-app/

Front matter:
  Blog:     title, publishedAt, summary (required); image, tags (optional)
  Project:  title, publishedAt, summary, image, tag (all required)

Code fences accept a title, line numbers and highlighted lines:

  ```rust title=\"src/main.rs\" showLineNumbers {1,3-4}

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifests, rendered fragments)
    #[arg(long, default_value = ".folio-temp", global = true)]
    temp_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Render document bodies to highlighted HTML
    Process(CacheArgs),
    /// Produce the final HTML site from rendered documents
    Generate,
    /// Run the full pipeline: scan → process → generate
    Build(CacheArgs),
    /// Validate content directory without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&manifest, has_config_file(&cli.source));
        }
        Command::Process(cache_args) => {
            let scan_manifest_path = cli.temp_dir.join("manifest.json");
            let manifest_content = std::fs::read_to_string(&scan_manifest_path)?;
            let manifest: scan::Manifest = serde_json::from_str(&manifest_content)?;
            init_thread_pool(&manifest.config.processing);
            let processed_dir = cli.temp_dir.join("processed");
            let (tx, printer) = spawn_printer();
            let result =
                process::process_manifest(manifest, &processed_dir, !cache_args.no_cache, Some(tx))?;
            join_printer(printer)?;
            let output_manifest = processed_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&result.manifest)?;
            std::fs::write(&output_manifest, &json)?;
            println!("Cache: {}", result.cache_stats);
        }
        Command::Generate => {
            let processed_manifest_path = cli.temp_dir.join("processed").join("manifest.json");
            let manifest_content = std::fs::read_to_string(&processed_manifest_path)?;
            let manifest: process::OutputManifest = serde_json::from_str(&manifest_content)?;
            generate::generate_manifest(&manifest, &cli.output)?;
            output::print_generate_output(&manifest);
        }
        Command::Build(cache_args) => {
            let source = cli.source.as_path();

            std::fs::create_dir_all(&cli.temp_dir)?;

            println!("==> Stage 1: Scanning {}", source.display());
            let manifest = scan::scan(source)?;
            let scan_manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&scan_manifest_path, json)?;
            output::print_scan_output(&manifest, has_config_file(source));

            println!("==> Stage 2: Rendering documents");
            init_thread_pool(&manifest.config.processing);
            let processed_dir = cli.temp_dir.join("processed");
            let (tx, printer) = spawn_printer();
            let result = process::process(
                &scan_manifest_path,
                &processed_dir,
                !cache_args.no_cache,
                Some(tx),
            )?;
            join_printer(printer)?;
            let processed_manifest_path = processed_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&result.manifest)?;
            std::fs::write(&processed_manifest_path, &json)?;
            println!("Cache: {}", result.cache_stats);

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            generate::generate(&processed_manifest_path, &cli.output)?;
            output::print_generate_output(&result.manifest);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, has_config_file(&cli.source));
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize diagnostics on stderr. `RUST_LOG` overrides `-v`.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match verbose {
        0 => "folio=warn",
        1 => "folio=info",
        2 => "folio=debug",
        _ => "folio=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Print process events as they arrive, on a dedicated thread.
fn spawn_printer() -> (Sender<ProcessEvent>, JoinHandle<()>) {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    (tx, printer)
}

fn join_printer(printer: JoinHandle<()>) -> Result<(), Box<dyn std::error::Error>> {
    printer
        .join()
        .map_err(|_| "progress printer thread panicked".into())
}

fn has_config_file(source: &Path) -> bool {
    source.join("config.toml").is_file()
}
