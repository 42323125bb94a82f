use std::path::PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Display debug traces
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Find the windows available for spying
    Find,

    /// Spy on a specific window or process
    Spy {
        /// Window name to spy on
        #[arg(short, long)]
        window: Option<String>,

        /// Process ID to spy on (GUI required)
        #[arg(short, long)]
        pid: Option<u32>,

        /// Log file to write events to
        #[arg(short, long)]
        logfile: Option<PathBuf>,

        /// Use the generic handler even for apps with a specialized one
        #[arg(short, long)]
        ignore_handlers: bool,

        /// Interval in seconds between shutdown checks
        #[arg(short, long, default_value = "1")]
        timeout: u64,

        /// Disable the automation event monitor
        #[arg(long)]
        no_uia_events: bool,

        /// Disable the property change event monitor
        #[arg(long)]
        no_property_events: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spy_with_flags() {
        let args = Args::try_parse_from([
            "uiaspy",
            "spy",
            "--window",
            "Program Manager",
            "--timeout",
            "5",
            "--ignore-handlers",
            "--no-property-events",
        ])
        .unwrap();

        assert!(!args.debug);
        match args.command {
            Command::Spy {
                window,
                pid,
                logfile,
                ignore_handlers,
                timeout,
                no_uia_events,
                no_property_events,
            } => {
                assert_eq!(window.as_deref(), Some("Program Manager"));
                assert_eq!(pid, None);
                assert!(logfile.is_none());
                assert!(ignore_handlers);
                assert_eq!(timeout, 5);
                assert!(!no_uia_events);
                assert!(no_property_events);
            }
            Command::Find => panic!("expected spy mode"),
        }
    }

    #[test]
    fn spy_defaults_to_one_second_timeout() {
        let args = Args::try_parse_from(["uiaspy", "spy", "--pid", "1234"]).unwrap();
        match args.command {
            Command::Spy { pid, timeout, .. } => {
                assert_eq!(pid, Some(1234));
                assert_eq!(timeout, 1);
            }
            Command::Find => panic!("expected spy mode"),
        }
    }

    #[test]
    fn parses_find_mode() {
        let args = Args::try_parse_from(["uiaspy", "--debug", "find"]).unwrap();
        assert!(args.debug);
        assert!(matches!(args.command, Command::Find));
    }
}
