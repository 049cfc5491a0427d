use clap::Parser;
use std::path::PathBuf;

use detectview::config::{Config, DEFAULT_CONFIG_FILE};
use detectview::core::histogram::{HistogramPresenter, LogPresenter, PngPresenter};
use detectview::core::{InspectorController, Renderer, SqliteStore, Typeface, ViewState};
use detectview::{detection, logging, InspectorError};

#[derive(Parser)]
#[command(name = "detectview")]
#[command(about = "Inspect object detections in an image")]
struct Cli {
    /// Image to inspect without opening a window
    #[arg(value_name = "IMAGE")]
    image_path: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Highlight this label and build its histogram (headless only)
    #[arg(long, value_name = "LABEL", requires = "image_path")]
    label: Option<String>,

    /// Save the final canvas as PNG (headless only)
    #[arg(long, value_name = "PNG", requires = "image_path")]
    canvas_out: Option<PathBuf>,

    /// Save the histogram plot as PNG (headless only)
    #[arg(long, value_name = "PNG", requires = "label")]
    histogram_out: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = Config::load_or_default(&args.config)?;

    let filter = if args.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    logging::init(filter);

    match args.image_path.clone() {
        Some(image_path) => run_headless(&args, &config, image_path),
        None => run_gui(config),
    }
}

#[cfg(feature = "gui")]
fn run_gui(config: Config) -> anyhow::Result<()> {
    detectview::gui::run(config)
}

#[cfg(not(feature = "gui"))]
fn run_gui(_config: Config) -> anyhow::Result<()> {
    anyhow::bail!("Built without the `gui` feature; pass an IMAGE to run headless")
}

fn run_headless(args: &Cli, config: &Config, image_path: PathBuf) -> anyhow::Result<()> {
    let typeface = Typeface::locate(config.render.font_path.as_deref());
    let presenter: Box<dyn HistogramPresenter> = match &args.histogram_out {
        Some(path) => Box::new(PngPresenter::new(path, typeface.clone())),
        None => Box::new(LogPresenter),
    };
    let mut controller = InspectorController::new(
        detection::from_config(&config.detector),
        SqliteStore::new(&config.database.path)?,
        presenter,
        Renderer::new(typeface),
    );

    match controller.load_image(&image_path) {
        Ok(()) | Err(InspectorError::EmptyDetection) => {}
        Err(e) => return Err(e.into()),
    }
    println!("{}", controller.status());
    for control in controller.registry().controls() {
        println!("  {}", control.caption());
    }

    let highlighted = match &args.label {
        Some(label) => controller.highlight(label).map(|drawn| {
            println!("Highlighted {} detection(s) of '{}'", drawn, label);
            if controller.view_state() != ViewState::HistogramShown {
                println!("No histogram was produced for '{}'", label);
            }
        }),
        None => Ok(()),
    };

    if let Some(path) = &args.canvas_out {
        if let Some(canvas) = controller.canvas() {
            canvas.save(path)?;
            println!("Canvas written to {}", path.display());
        }
    }

    highlighted?;
    Ok(())
}
