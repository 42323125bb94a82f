use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

mod args;
mod ascent;
mod config;
mod error;
#[cfg(windows)]
mod finder;
mod logger;
#[cfg(windows)]
mod uia;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let mut builder = Builder::new();
    builder.filter_level(if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    builder.init();

    banner();

    #[cfg(windows)]
    {
        if let Err(e) = run(args) {
            log::error!("{e}");
            std::process::exit(1);
        }
    }

    #[cfg(not(windows))]
    {
        let _ = args;
        log::error!("uiaspy inspects the Windows UI Automation tree and only runs on Windows");
        std::process::exit(1);
    }
}

fn banner() {
    println!("uiaspy - UI Automation event spy");
    println!();
}

#[cfg(windows)]
fn run(args: Args) -> error::Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex, OnceLock};

    use windows::Win32::Foundation::{BOOL, TRUE};
    use windows::Win32::System::Console::SetConsoleCtrlHandler;

    use crate::args::Command;
    use crate::ascent::NameAscent;
    use crate::config::{SpyConfig, Target};
    use crate::finder::Finder;
    use crate::logger::Logger;
    use crate::uia::{self, monitor, MonitorKind, TreeWalker, UiaContext};

    static SHUTDOWN: OnceLock<Arc<AtomicBool>> = OnceLock::new();

    unsafe extern "system" fn ctrl_handler(_ctrl_type: u32) -> BOOL {
        if let Some(stop) = SHUTDOWN.get() {
            stop.store(true, Ordering::SeqCst);
        }
        TRUE
    }

    uia::init_com()?;

    let result = (|| -> error::Result<()> {
        match args.command {
            Command::Find => Finder::display_active_windows(UiaContext::new()?.automation()),
            Command::Spy {
                window,
                pid,
                logfile,
                ignore_handlers,
                timeout,
                no_uia_events,
                no_property_events,
            } => {
                let config =
                    SpyConfig::new(timeout, ignore_handlers, no_uia_events, no_property_events);
                let target = Target::from_selectors(window, pid);

                let logger = Arc::new(Mutex::new(match logfile {
                    Some(path) => {
                        log::info!("writing events to {}", path.display());
                        Logger::with_file(path)?
                    }
                    None => Logger::new(),
                }));

                // Fail fast: no point spawning monitors when the target
                // or the ascent primitive is unobtainable.
                {
                    let uia = UiaContext::new()?;
                    let element = Finder::resolve_target(uia.automation(), &target)?;
                    let walker = TreeWalker::new(uia.automation())?;
                    match walker.resolve_ascending_name(&element) {
                        NameAscent::Named(name) => log::info!("spying on {name:?}"),
                        NameAscent::Unavailable => log::info!("spying on an unnamed target"),
                    }
                }

                let stop = Arc::new(AtomicBool::new(false));
                let _ = SHUTDOWN.set(stop.clone());
                unsafe { SetConsoleCtrlHandler(Some(ctrl_handler), TRUE)? };

                let mut monitors = Vec::new();
                if config.uia_events {
                    monitors.push(monitor::spawn(
                        MonitorKind::Automation,
                        target.clone(),
                        config.clone(),
                        logger.clone(),
                        stop.clone(),
                    )?);
                }
                if config.property_events {
                    monitors.push(monitor::spawn(
                        MonitorKind::PropertyChange,
                        target,
                        config,
                        logger,
                        stop,
                    )?);
                }

                if monitors.is_empty() {
                    log::warn!("both monitors are disabled, nothing to do");
                    return Ok(());
                }

                log::info!("press Ctrl-C to stop");
                for handle in monitors {
                    let _ = handle.join();
                }
                Ok(())
            }
        }
    })();

    uia::uninit_com();
    result
}
