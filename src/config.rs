use std::time::Duration;

/// Runtime configuration, assembled once from the command line and handed
/// to every component that needs it.
#[derive(Debug, Clone)]
pub struct SpyConfig {
    /// Cadence of each monitor's shutdown check.
    pub poll_interval: Duration,
    /// Force the generic handlers even when an app-specific one exists.
    pub ignore_handlers: bool,
    /// Run the automation event monitor.
    pub uia_events: bool,
    /// Run the property change event monitor.
    pub property_events: bool,
}

impl SpyConfig {
    pub fn new(
        timeout_secs: u64,
        ignore_handlers: bool,
        no_uia_events: bool,
        no_property_events: bool,
    ) -> Self {
        // zero means "default cadence", never a busy loop
        let secs = if timeout_secs == 0 { 1 } else { timeout_secs };
        SpyConfig {
            poll_interval: Duration::from_secs(secs),
            ignore_handlers,
            uia_events: !no_uia_events,
            property_events: !no_property_events,
        }
    }
}

/// What the monitors attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Window(String),
    Process(u32),
    Desktop,
}

impl Target {
    /// `--pid` wins when both selectors are supplied.
    pub fn from_selectors(window: Option<String>, pid: Option<u32>) -> Self {
        match (pid, window) {
            (Some(pid), _) => Target::Process(pid),
            (None, Some(name)) => Target::Window(name),
            (None, None) => Target::Desktop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_falls_back_to_default_cadence() {
        let config = SpyConfig::new(0, false, false, false);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn timeout_is_taken_verbatim_otherwise() {
        let config = SpyConfig::new(5, false, false, false);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn disable_flags_invert_into_enables() {
        let config = SpyConfig::new(1, false, true, false);
        assert!(!config.uia_events);
        assert!(config.property_events);
    }

    #[test]
    fn pid_selector_wins_over_window() {
        let target = Target::from_selectors(Some("Notepad".to_string()), Some(42));
        assert_eq!(target, Target::Process(42));
    }

    #[test]
    fn missing_selectors_mean_the_whole_desktop() {
        assert_eq!(Target::from_selectors(None, None), Target::Desktop);
        assert_eq!(
            Target::from_selectors(Some("Notepad".to_string()), None),
            Target::Window("Notepad".to_string())
        );
    }
}
