// Appkeys CLI
// X11 daemon that remaps hotkeys depending on the focused application

use std::sync::Arc;

use clap::Parser;
use log::LevelFilter;
use parking_lot::Mutex;

use appkeys_core::config::read_records;
use appkeys_core::event::{shutdown, CancellationToken, EventLoop};
use appkeys_core::mapping::RemapTable;
use appkeys_core::remapper::Remapper;
use appkeys_core::settings::Settings;
use appkeys_core::x11::{RecordControl, X11Backend};

/// Per-application hotkey remapper for X11
#[derive(Parser, Debug)]
#[command(name = "appkeys")]
#[command(version)]
#[command(about = "Per-application hotkey remapper for X11", long_about = None)]
struct Args {
    /// Stay in the foreground and log at debug level
    #[arg(short, long)]
    debug: bool,
}

/// Main application state
struct Application {
    args: Args,
    settings: Settings,
}

impl Application {
    fn new(args: Args, settings: Settings) -> Self {
        Self { args, settings }
    }

    fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let backend = X11Backend::connect()?;
        log::debug!("Connected to X server");

        if !self.args.debug {
            daemonize()?;
        }

        let path = self.settings.mappings_path()?;
        let records = read_records(&path, self.settings.strict())
            .map_err(|e| format!("Error opening configuration file {}: {}", path.display(), e))?;
        log::debug!("Read {} record(s) from {}", records.len(), path.display());

        let layout = backend.layout().clone();
        let table = RemapTable::load(&records, &layout);
        let (mut source, control) = backend.record()?;

        let mut remapper = Remapper::new(
            table,
            layout,
            Box::new(backend.clone()),
            Box::new(backend),
        );
        remapper.register_existing_windows();

        let context = Arc::new(Mutex::new(remapper));
        let token = CancellationToken::new();
        spawn_signal_watcher(token.clone(), Arc::clone(&context), control.clone())?;

        let mut event_loop = EventLoop::new(context, token);
        event_loop.run(&mut source)?;

        if let Err(e) = control.free() {
            log::debug!("Could not free RECORD context: {}", e);
        }
        log::info!("Exiting after {} event(s)", event_loop.dispatched());
        Ok(())
    }
}

/// Detach from the terminal
fn daemonize() -> std::io::Result<()> {
    // SAFETY: called before any thread is spawned
    if unsafe { libc::daemon(0, 0) } == -1 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Stop the event loop on SIGINT/SIGTERM
fn spawn_signal_watcher(
    token: CancellationToken,
    context: Arc<Mutex<Remapper>>,
    control: RecordControl,
) -> std::io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            log::info!("Received signal {}, shutting down", signal);
            if let Err(e) = shutdown(&token, &context, &control) {
                log::error!("Could not stop event source: {}", e);
                std::process::exit(1);
            }
        }
    });
    Ok(())
}

fn init_logging(args: &Args, settings: &Settings) {
    let level = if args.debug {
        LevelFilter::Debug
    } else {
        settings.log_level()
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Usage errors and --help both print and exit successfully
            e.print()?;
            return Ok(());
        }
    };

    let settings = match Settings::load_default() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Warning: could not load settings: {}", e);
            Settings::new()
        }
    };
    init_logging(&args, &settings);

    Application::new(args, settings).run()
}
