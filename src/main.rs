use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use landscape_ink::display::{
    AdapterOptions, BoundDriver, CancelToken, DisplayAdapter, DriverRegistry,
};
use landscape_ink::models::{PresetCatalog, Secrets};
use landscape_ink::services::{HorizonArtist, OpenWeatherMap, RenderPipeline};

#[derive(Parser)]
#[command(name = "landscape-ink")]
#[command(about = "Weather landscapes for 2.13\" e-paper panels")]
struct Cli {
    /// Preset catalog (YAML); defaults to PRESETS_FILE, then the built-in presets
    #[arg(long, global = true)]
    presets: Option<PathBuf>,

    /// Secrets file (YAML with OWM_KEY, OWM_LAT, OWM_LON); defaults to SECRETS_FILE
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configuration variants
    Variants,
    /// Fetch the forecast and write the landscape image
    Render {
        /// Configuration variant (defaults to the catalog's default variant)
        #[arg(short, long)]
        variant: Option<String>,
    },
    /// Push a rendered image to the panel
    Display {
        /// Configuration variant whose output file is shown
        #[arg(short, long, conflicts_with = "image")]
        variant: Option<String>,

        /// Image file to show instead of a variant's output
        #[arg(short, long)]
        image: Option<PathBuf>,

        #[command(flatten)]
        panel: PanelArgs,
    },
    /// Render, then display
    Run {
        #[arg(short, long)]
        variant: Option<String>,

        #[command(flatten)]
        panel: PanelArgs,
    },
}

#[derive(Args, Clone)]
struct PanelArgs {
    /// Write frames as PNG files into this directory instead of driving hardware
    #[arg(long)]
    simulate: Option<PathBuf>,

    /// Seconds to wait between pushing the frame and putting the panel to sleep
    #[arg(long, default_value_t = 5)]
    settle: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "landscape_ink=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let presets = cli
        .presets
        .or_else(|| std::env::var("PRESETS_FILE").ok().map(PathBuf::from));
    let secrets = cli
        .secrets
        .or_else(|| std::env::var("SECRETS_FILE").ok().map(PathBuf::from));

    match cli.command {
        Some(Commands::Variants) => run_variants_command(presets.as_deref()),
        Some(Commands::Render { variant }) => {
            run_render_command(presets, secrets, variant).await?;
            Ok(())
        }
        Some(Commands::Display {
            variant,
            image,
            panel,
        }) => {
            let image = match image {
                Some(path) => path,
                None => variant_output(presets.as_deref(), variant.as_deref())?,
            };
            run_display_command(panel_adapter(&panel)?, None, image).await
        }
        Some(Commands::Run { variant, panel }) => {
            // no forecast fetch without a panel to show it on
            let mut adapter = panel_adapter(&panel)?;
            let bound = adapter.bind()?;
            tracing::info!(driver = %bound.name, "Driver available");

            match run_render_command(presets, secrets, variant).await {
                Ok(image) => run_display_command(adapter, Some(bound), image).await,
                Err(e) => {
                    adapter.release(bound);
                    Err(e)
                }
            }
        }
        None => {
            run_status_command(presets.as_deref(), secrets.as_deref());
            Ok(())
        }
    }
}

fn run_variants_command(presets: Option<&Path>) -> anyhow::Result<()> {
    let catalog = PresetCatalog::load(presets)?;
    for name in catalog.variant_names() {
        let config = catalog.merged(name)?;
        let marker = if name == catalog.default_variant { "*" } else { " " };
        println!(
            "{marker} {name:<10} {:<24} {}x{} {} -> {}",
            config.title,
            config.width,
            config.height,
            config.sprites_mode,
            config.output_path().display()
        );
    }
    Ok(())
}

/// Resolve the configuration and render on a blocking thread
async fn run_render_command(
    presets: Option<PathBuf>,
    secrets: Option<PathBuf>,
    variant: Option<String>,
) -> anyhow::Result<PathBuf> {
    let catalog = PresetCatalog::load(presets.as_deref())?;
    let name = variant.unwrap_or_else(|| catalog.default_variant.clone());
    let secrets = Secrets::load(secrets.as_deref())?;
    let config = catalog.resolve(&name, &secrets)?;

    let path = tokio::task::spawn_blocking(move || -> anyhow::Result<PathBuf> {
        let pipeline = RenderPipeline::new(OpenWeatherMap::new()?, HorizonArtist);
        Ok(pipeline.save_image(&config)?)
    })
    .await??;

    println!("{}", path.display());
    Ok(path)
}

/// Output path of a variant, without needing secrets
fn variant_output(presets: Option<&Path>, variant: Option<&str>) -> anyhow::Result<PathBuf> {
    let catalog = PresetCatalog::load(presets)?;
    let name = variant.unwrap_or(catalog.default_variant.as_str());
    let config = catalog.merged(name)?;
    config.validate_layout()?;
    Ok(config.output_path())
}

/// Adapter for the simulator directory or the hardware panel, stopped by Ctrl-C
fn panel_adapter(panel: &PanelArgs) -> anyhow::Result<DisplayAdapter> {
    let registry = match &panel.simulate {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            DriverRegistry::simulated(dir)
        }
        None => DriverRegistry::hardware(),
    };
    let options = AdapterOptions {
        settle: Duration::from_secs(panel.settle),
        ..Default::default()
    };

    let cancel = CancelToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::warn!("Received interrupt, stopping after the current step");
        cancel_on_signal.cancel();
    });

    Ok(DisplayAdapter::new(registry, options).with_cancel_token(cancel))
}

/// Show `image`, on `bound` if a driver was already discovered
async fn run_display_command(
    mut adapter: DisplayAdapter,
    bound: Option<BoundDriver>,
    image: PathBuf,
) -> anyhow::Result<()> {
    let report = tokio::task::spawn_blocking(move || match bound {
        Some(bound) => adapter.show_bound(bound, &image),
        None => adapter.show(&image),
    })
    .await??;

    for diagnostic in &report.diagnostics {
        tracing::info!(?diagnostic, "Frame adjustment");
    }
    println!(
        "Displayed on {} ({}){}",
        report.driver,
        report.native,
        if report.is_degraded() { ", degraded" } else { "" }
    );
    Ok(())
}

fn run_status_command(presets: Option<&Path>, secrets: Option<&Path>) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    fn shown(value: Option<String>) -> String {
        value.unwrap_or_else(|| "(not set)".to_string())
    }

    println!("landscape-ink v{VERSION}");
    println!("Weather landscapes for 2.13\" e-paper panels\n");

    println!("Configuration:");
    println!(
        "  Presets  = {}",
        presets
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    );
    println!(
        "  Secrets  = {}",
        shown(secrets.map(|p| p.display().to_string()))
    );
    println!(
        "  OWM_KEY  = {}",
        if std::env::var("OWM_KEY").is_ok() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!("  OWM_LAT  = {}", shown(std::env::var("OWM_LAT").ok()));
    println!("  OWM_LON  = {}", shown(std::env::var("OWM_LON").ok()));

    println!("\nCommands:");
    println!("  landscape-ink variants   List configuration variants");
    println!("  landscape-ink render     Render the landscape image");
    println!("  landscape-ink display    Push an image to the panel");
    println!("  landscape-ink run        Render, then display");
    println!("\nRun 'landscape-ink --help' for more details.");
}
