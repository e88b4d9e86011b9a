mod app;
mod input;
mod mode;
mod ui;

use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;

use tracing::{error, info, Level};
use tracing_subscriber::fmt::writer::MakeWriter;

use crossterm::{
    cursor::MoveToColumn,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use layerstack::config::{AppConfig, Settings};
use layerstack::{Layer, LayerId, LayerKind, LayerStack};

use app::App;

/// Command line options
struct Args {
    config_path: Option<PathBuf>,
    capacity: Option<usize>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        config_path: None,
        capacity: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --config requires an argument");
                    std::process::exit(1);
                }
            }
            "--capacity" => {
                match args.get(i + 1).and_then(|s| s.parse::<usize>().ok()) {
                    Some(n) if n > 0 => parsed.capacity = Some(n),
                    _ => {
                        eprintln!("Error: --capacity requires a positive integer");
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
        }
    }

    parsed
}

/// Handle panics gracefully
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();

        if let Some(location) = info.location() {
            error!(
                file = location.file(),
                line = location.line(),
                "panic occured"
            );
        } else {
            error!("panic occured");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

/// A `MakeWriter` for `tracing` that logs to the **main screen** by leaving the alternate screen temporarily.
pub struct MainScreenWriter;

impl<'a> MakeWriter<'a> for MainScreenWriter {
    type Writer = MainScreenWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        MainScreenWriterHandle
    }
}

/// A handle that writes to stdout outside the alternate screen
pub struct MainScreenWriterHandle;

impl Write for MainScreenWriterHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        execute!(io::stdout(), LeaveAlternateScreen)?;
        println!();
        execute!(io::stdout(), MoveToColumn(0))?;
        let result = io::stdout().write(buf);
        execute!(io::stdout(), MoveToColumn(0))?;
        io::stdout().flush()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

fn print_help() {
    eprintln!("layerstack - A terminal layers panel with bounded undo/redo");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    layerstack [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config <FILE>  Load settings from a TOML file");
    eprintln!("    --capacity <N>       Number of history entries kept for undo");
    eprintln!("    -h, --help           Print this help message");
    eprintln!();
    eprintln!("KEYS:");
    eprintln!("    j/k        move cursor        space   toggle selection");
    eprintln!("    va/vn      select all/none    a/A     add layer (default/other end)");
    eprintln!("    dd/yy      delete/duplicate   u/^r    undo/redo");
    eprintln!("    ]/[        forward/backward   }}/{{     to front/to back");
    eprintln!("    m          nudge selection    r       rename layer");
    eprintln!("    q          quit");
}

fn load_settings(args: &Args) -> io::Result<Settings> {
    let mut settings = match &args.config_path {
        Some(path) => Settings::from_file(path).map_err(|e| {
            eprintln!("{}", e);
            io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
        })?,
        None => Settings::default(),
    };
    if let Some(capacity) = args.capacity {
        settings.history_capacity = capacity;
    }
    Ok(settings)
}

fn main() -> io::Result<()> {
    let args = parse_args();
    let settings = load_settings(&args)?;

    tracing_subscriber::fmt()
        .with_max_level(Level::from(settings.log_level))
        .with_writer(MainScreenWriter)
        .init();
    info!(capacity = settings.history_capacity, "layerstack started");

    install_panic_hook();

    let background = Layer::new(
        LayerId(1),
        "Background",
        LayerKind::Fill {
            color: [255, 255, 255, 255],
        },
    );
    let stack = LayerStack::from_layers(vec![background], settings.history_capacity).map_err(|e| {
        error!(error = %e, "Failed to create layer stack");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(stack, AppConfig::new(settings));
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}
