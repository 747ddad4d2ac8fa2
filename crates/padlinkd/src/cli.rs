use std::path::PathBuf;

use clap::Parser;

/// Forwards a physical Pro Controller to a console by impersonating
/// the console's own controller over a wireless link.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Path to the controller's evdev node (e.g. /dev/input/event17)
    #[arg(short, long)]
    pub device: Option<PathBuf>,

    /// Locate the controller by its advertised device name instead
    #[arg(short, long, default_value = "Pro Controller")]
    pub name: String,

    /// File holding the console address remembered from the last session
    #[arg(long, default_value = "console.addr")]
    pub hints_file: PathBuf,

    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
