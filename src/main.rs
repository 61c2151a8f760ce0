//! investigator - region redaction and object extraction
//!
//! CLI entry point

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use image::{ImageFormat, RgbaImage};
use investigator::{
    exit_codes, CliOverrides, Cli, Commands, Config, GraphCut, Investigator, RedactArgs,
    RedactOp, RegionEditor, SelectObjectArgs,
};

#[cfg(feature = "web")]
use investigator::{ServeArgs, ServerConfig, WebServer};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(exit_codes::INVALID_ARGS);
        }
        // --help and --version
        Err(e) => e.exit(),
    };
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Crop(args) => run_redact(&cli, RedactOp::Crop, args),
        Commands::Blackout(args) => run_redact(&cli, RedactOp::Blackout, args),
        Commands::Blur(args) => run_redact(&cli, RedactOp::Blur, args),
        Commands::SelectObject(args) => run_select_object(&cli, args),
        Commands::Info => run_info(&cli),
        #[cfg(feature = "web")]
        Commands::Serve(args) => run_serve(&cli, args),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::GENERAL_ERROR
        }
    });
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ============ Helper Functions ============

/// Config file from `--config` or the default location, then CLI overrides
fn load_config(cli: &Cli, overrides: &CliOverrides) -> Config {
    let file_config = match &cli.config {
        Some(path) => match Config::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load config file, using defaults");
                Config::default()
            }
        },
        None => Config::load().unwrap_or_default(),
    };

    file_config.merge_with_cli(overrides)
}

fn require_input(path: &Path) {
    if !path.exists() {
        eprintln!("Error: Input file does not exist: {}", path.display());
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }
}

fn load_image(path: &Path) -> anyhow::Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(image.to_rgba8())
}

/// Save, dropping alpha for formats that cannot hold it
fn save_image(image: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    if image.width() == 0 || image.height() == 0 {
        bail!("result is empty (selection lies outside the image)");
    }

    let format = ImageFormat::from_path(path)
        .with_context(|| format!("unsupported output format: {}", path.display()))?;

    let saved = match format {
        ImageFormat::Jpeg | ImageFormat::Bmp => {
            image::DynamicImage::ImageRgba8(image.clone()).to_rgb8().save_with_format(path, format)
        }
        _ => image.save_with_format(path, format),
    };
    saved.with_context(|| format!("failed to write {}", path.display()))
}

// ============ Redact Commands ============

fn run_redact(cli: &Cli, op: RedactOp, args: &RedactArgs) -> anyhow::Result<()> {
    require_input(&args.input);
    let config = load_config(cli, &args.overrides());
    let editor = RegionEditor::new(config.editor_options());

    let start = Instant::now();
    let image = load_image(&args.input)?;
    let output = editor.apply(op, &image, &args.selections());
    save_image(&output, &args.output)?;

    tracing::info!(
        %op,
        output = %args.output.display(),
        width = output.width(),
        height = output.height(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}

// ============ Select Object Command ============

fn run_select_object(cli: &Cli, args: &SelectObjectArgs) -> anyhow::Result<()> {
    require_input(&args.input);
    let config = load_config(cli, &args.overrides());
    let investigator = Investigator::from_config(&config);

    let start = Instant::now();
    let image = load_image(&args.input)?;
    let extraction = investigator.select_object(&image, &args.selections())?;
    save_image(&extraction.image, &args.output)?;

    tracing::info!(
        strategy = extraction.strategy,
        output = %args.output.display(),
        width = extraction.image.width(),
        height = extraction.image.height(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}

// ============ Info Command ============

fn run_info(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli, &CliOverrides::new());

    println!("investigator v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    println!();
    println!("Segmentation:");
    let command = config.segment.matting_command.trim();
    if command.is_empty() {
        println!("  Matting: disabled");
    } else {
        match which::which(command) {
            Ok(path) => println!("  Matting: {} (found)", path.display()),
            Err(_) => println!("  Matting: {} (not found, graph-cut fallback)", command),
        }
    }
    println!(
        "  Saliency seeding: {}",
        if config.segment.saliency { "YES" } else { "NO" }
    );
    println!("  Graph-cut iterations: {}", config.segment.graph_cut_iterations);
    println!(
        "  OpenCV (saliency, graph-cut, CLAHE): {}",
        if GraphCut::is_available() { "YES" } else { "NO" }
    );

    println!();
    println!("Config File Locations:");
    match &cli.config {
        Some(path) => println!("  Given: {}", path.display()),
        None => match Config::default_path() {
            Some(path) => println!("  User:  {}", path.display()),
            None => println!("  User:  (no config directory)"),
        },
    }

    if cli.verbose > 0 {
        println!();
        println!("Effective Configuration:");
        println!("{}", config.to_toml()?);
    }

    Ok(())
}

// ============ Serve Command (Web Server) ============

#[cfg(feature = "web")]
fn run_serve(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    let config = load_config(cli, &args.overrides());
    let server_config = ServerConfig::from_config(&config);
    let investigator = Investigator::from_config(&config);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let server = WebServer::with_config(server_config, investigator);
        server.run().await.map_err(|e| anyhow::anyhow!(e))
    })
}
