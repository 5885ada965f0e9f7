// SPDX-License-Identifier: MIT
//
// co — a small full-screen terminal text editor.
//
// This is the binary that wires the two crates together:
//
//   co-term   → terminal control, input parsing, cell grid, diff renderer
//   co-editor → line buffer, cursor, viewport, keymap, dispatcher, view
//
// Startup: parse arguments → set up logging → load the file → take over the
// terminal → run the editor until quit → restore the terminal.
//
// Exit codes: 0 normal quit, 1 startup or terminal failure, 2 usage error.
//
// Logging goes to a file only (stdout belongs to the editor): set
// CO_LOG=<path> to enable it, CO_LOG_LEVEL to filter (default "info").

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use co_editor::buffer::LineBuffer;
use co_editor::editor::Editor;
use co_editor::options::Options;
use co_term::screen::TermScreen;

const DEFAULT_FILE: &str = "untitled.txt";

const USAGE: &str = "\
usage: co [-h|--help] [-V|--version] [--set NAME[=VALUE]]... [FILE]

A small full-screen text editor.

arguments:
  FILE                 the file to open or create (default: untitled.txt)

options:
  -h, --help           show this help and exit
  -V, --version        show the version and exit
  --set NAME[=VALUE]   set an option; may be repeated
                         number | nonumber     line-number gutter
                         indent=auto|1..8      indent width
                         save=L quit=L         Ctrl+L bindings for save,
                         kill=L exit=L         quit, kill line, save-and-quit

keys:
  arrows Home End PgUp PgDn   move
  Ctrl+S save   Ctrl+X save and quit   Ctrl+Q quit   Ctrl+K kill line

environment:
  CO_LOG=<path>        write a log to <path>
  CO_LOG_LEVEL=<spec>  log filter (default: info)";

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Cli {
    Help,
    Version,
    Edit { path: PathBuf, sets: Vec<String> },
}

/// Parse everything after the program name.
fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Cli, String> {
    let mut args = args.into_iter();
    let mut path: Option<PathBuf> = None;
    let mut sets = Vec::new();
    let mut flags_done = false;

    while let Some(arg) = args.next() {
        if flags_done || !arg.starts_with('-') || arg == "-" {
            if path.is_some() {
                return Err(format!("unexpected argument: {arg}"));
            }
            path = Some(PathBuf::from(arg));
            continue;
        }
        match arg.as_str() {
            "-h" | "--help" => return Ok(Cli::Help),
            "-V" | "--version" => return Ok(Cli::Version),
            "--" => flags_done = true,
            "--set" => {
                let value = args.next().ok_or("--set needs an option")?;
                sets.push(value);
            }
            _ => match arg.strip_prefix("--set=") {
                Some(value) => sets.push(value.to_owned()),
                None => return Err(format!("unknown flag: {arg}")),
            },
        }
    }

    Ok(Cli::Edit {
        path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_FILE)),
        sets,
    })
}

// ─── Logging ────────────────────────────────────────────────────────────────

fn init_logging() -> Result<()> {
    let Some(log_path) = env::var_os("CO_LOG") else {
        return Ok(());
    };
    let file = File::create(&log_path)
        .with_context(|| format!("cannot create log file {}", Path::new(&log_path).display()))?;
    let filter = EnvFilter::try_from_env("CO_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("cannot install logger")
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run(path: &Path, options: Options) -> Result<()> {
    init_logging()?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), path = %path.display(), "starting");

    let buffer = LineBuffer::load(path)?;
    let mut editor = Editor::new(buffer, options);

    let mut screen = TermScreen::open().context("cannot set up the terminal")?;
    let result = editor.run(&mut screen);
    let restored = screen.close();

    result.context("terminal I/O failed")?;
    restored.context("cannot restore the terminal")?;
    tracing::info!("bye");
    Ok(())
}

fn main() -> ExitCode {
    let (path, sets) = match parse_args(env::args().skip(1)) {
        Ok(Cli::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Ok(Cli::Version) => {
            println!("co {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Ok(Cli::Edit { path, sets }) => (path, sets),
        Err(msg) => return usage_error(&msg),
    };

    let options = match Options::from_args(&sets) {
        Ok(options) => options,
        Err(e) => return usage_error(&e.to_string()),
    };

    if let Err(e) = run(&path, options) {
        eprintln!("co: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn usage_error(msg: &str) -> ExitCode {
    eprintln!("co: {msg}\n\n{USAGE}");
    ExitCode::from(2)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
