//! Main application entry point.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use vocamark_app::AppConfig;
use vocamark_core::CreationGesture;

#[derive(Parser)]
#[command(name = "vocamark", about = "Document viewer with draggable voice notes")]
struct Cli {
    /// Document to open (PDF). Prompts with a file dialog when omitted.
    document: Option<PathBuf>,

    /// Gesture that creates a new note.
    #[arg(long, value_enum, default_value = "secondary-click")]
    gesture: GestureArg,

    /// Raster scale for page rendering.
    #[arg(long, default_value_t = 1.5)]
    scale: f32,

    /// Dump finalized recordings as WAV files into this directory (debug).
    #[arg(long, value_name = "DIR")]
    dump_audio: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GestureArg {
    SecondaryClick,
    AddButton,
}

impl From<GestureArg> for CreationGesture {
    fn from(arg: GestureArg) -> Self {
        match arg {
            GestureArg::SecondaryClick => CreationGesture::SecondaryClick,
            GestureArg::AddButton => CreationGesture::AddButton,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting Vocamark");

    let config = AppConfig {
        document: cli.document,
        gesture: cli.gesture.into(),
        render_scale: cli.scale,
        dump_audio: cli.dump_audio,
        ..AppConfig::default()
    };

    pollster::block_on(vocamark_app::App::run(config));
}
