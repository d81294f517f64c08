//! Columnstui — Columns-style falling-jewel puzzle, driven from the terminal.

use anyhow::Result;
use clap::Parser;
use columnstui::app::App;
use columnstui::{GameConfig, Jewel, Mode};
use log::LevelFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = GameConfig {
        rows: usize::from(args.rows),
        columns: usize::from(args.columns),
        mode: args.mode,
        contents: args.contents,
        seed: args.seed,
        ticks: args.ticks,
        color: args.color,
        show_buffer: args.show_buffer,
        jewel_colors: args.jewel_color,
    };
    let mut app = App::new(config)?;
    app.run()?;
    Ok(())
}

/// Logs go to stderr; stdout carries the rendered field. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Columns-style matching puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "columnstui",
    version,
    about = "Columns-style falling-jewel puzzle. Line up three or more equal jewels to clear them.",
    long_about = "Columnstui runs a Columns-style puzzle engine.\n\n\
        Fallers of three jewels (S T V W X Y Z) drop into the field. Shift and rotate them \
        while they fall; once frozen, runs of three or more equal jewels in any direction \
        are cleared and everything above falls down.\n\n\
        COMMANDS (script mode, one per line):\n  (empty)       Tick\n  R             Rotate\n  \
        <  >          Move left / right\n  F c j j j     Spawn jewels top-to-bottom in column c (1-based)\n  \
        Q             Quit"
)]
pub struct Args {
    /// Visible rows.
    #[arg(long, default_value = "13", value_name = "ROWS", value_parser = clap::value_parser!(u16).range(1..))]
    pub rows: u16,

    /// Columns.
    #[arg(long, default_value = "6", value_name = "COLS", value_parser = clap::value_parser!(u16).range(1..))]
    pub columns: u16,

    /// Driver: script (commands from stdin) or auto (random spawns on a tick loop).
    #[arg(short, long, default_value = "script")]
    pub mode: Mode,

    /// Initial field: one line per visible row from the top, jewels or spaces, exactly COLS wide.
    #[arg(short, long, value_name = "FILE")]
    pub contents: Option<std::path::PathBuf>,

    /// Seed for random spawns.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// In mode 'auto': maximum ticks before stopping.
    #[arg(long, default_value = "500", value_name = "N")]
    pub ticks: u32,

    /// Colour jewels with ANSI escapes.
    #[arg(long)]
    pub color: bool,

    /// Also render the three hidden buffer rows.
    #[arg(long)]
    pub show_buffer: bool,

    /// Override a jewel colour, e.g. `--jewel-color S=#E06C75`. Repeatable.
    #[arg(long, value_name = "JEWEL=HEX", value_parser = parse_jewel_color)]
    pub jewel_color: Vec<(Jewel, String)>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_jewel_color(s: &str) -> Result<(Jewel, String), String> {
    let (jewel, hex) = s.split_once('=').ok_or_else(|| format!("expected JEWEL=HEX, got {s:?}"))?;
    let jewel = jewel.parse::<Jewel>().map_err(|e| e.to_string())?;
    columnstui::theme::parse_hex(hex).map_err(|e| e.to_string())?;
    Ok((jewel, hex.to_string()))
}
