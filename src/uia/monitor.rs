use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{info, warn};
use windows::Win32::UI::Accessibility::{
    IUIAutomationEventHandler, IUIAutomationPropertyChangedEventHandler, TreeScope_Subtree,
    UIA_EVENT_ID, UIA_PROPERTY_ID, UIA_Invoke_InvokedEventId, UIA_IsEnabledPropertyId,
    UIA_MenuOpenedEventId, UIA_NamePropertyId, UIA_Text_TextChangedEventId,
    UIA_Text_TextSelectionChangedEventId, UIA_ToggleToggleStatePropertyId,
    UIA_ValueValuePropertyId, UIA_Window_WindowClosedEventId, UIA_Window_WindowOpenedEventId,
};

use crate::config::{SpyConfig, Target};
use crate::error::Result;
use crate::finder::Finder;
use crate::logger::Logger;
use super::{init_com, uninit_com, AutomationEventHandler, PropertyChangedEventHandler, TreeWalker, UiaContext};

/// Automation events the structural monitor subscribes to.
const WATCHED_EVENTS: &[UIA_EVENT_ID] = &[
    UIA_Window_WindowOpenedEventId,
    UIA_Window_WindowClosedEventId,
    UIA_Invoke_InvokedEventId,
    UIA_MenuOpenedEventId,
    UIA_Text_TextChangedEventId,
    UIA_Text_TextSelectionChangedEventId,
];

/// Properties the change monitor subscribes to.
const WATCHED_PROPERTIES: [UIA_PROPERTY_ID; 4] = [
    UIA_NamePropertyId,
    UIA_ValueValuePropertyId,
    UIA_ToggleToggleStatePropertyId,
    UIA_IsEnabledPropertyId,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorKind {
    Automation,
    PropertyChange,
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorKind::Automation => f.write_str("automation-events"),
            MonitorKind::PropertyChange => f.write_str("property-events"),
        }
    }
}

/// Starts one monitor on its own thread and returns the handle to join.
///
/// The thread owns every COM object it touches: it initializes its own
/// apartment, opens its own provider connection and re-resolves the
/// target, so no interface pointer ever crosses threads. The loop runs
/// until `stop` is set, then unhooks and exits. A setup failure inside
/// the thread ends only this monitor.
pub fn spawn(
    kind: MonitorKind,
    target: Target,
    config: SpyConfig,
    logger: Arc<Mutex<Logger>>,
    stop: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name(kind.to_string())
        .spawn(move || {
            if let Err(e) = init_com() {
                warn!("{kind} monitor could not initialize COM: {e}");
                return;
            }
            if let Err(e) = run(kind, &target, &config, logger, &stop) {
                warn!("{kind} monitor stopped: {e}");
            }
            uninit_com();
        })?;
    Ok(handle)
}

fn run(
    kind: MonitorKind,
    target: &Target,
    config: &SpyConfig,
    logger: Arc<Mutex<Logger>>,
    stop: &AtomicBool,
) -> Result<()> {
    let uia = UiaContext::new()?;
    let automation = uia.automation();
    let element = Finder::resolve_target(automation, target)?;
    let walker = TreeWalker::new(automation)?;

    // Registration add-refs the handler for the lifetime of the
    // subscription; delivery happens on COM worker threads while this
    // loop sleeps.
    match kind {
        MonitorKind::Automation => {
            let handler: IUIAutomationEventHandler =
                AutomationEventHandler::new(logger, walker, config).into();
            for &event in WATCHED_EVENTS {
                unsafe {
                    automation.AddAutomationEventHandler(
                        event,
                        &element,
                        TreeScope_Subtree,
                        None,
                        &handler,
                    )?
                };
            }
        }
        MonitorKind::PropertyChange => {
            let handler: IUIAutomationPropertyChangedEventHandler =
                PropertyChangedEventHandler::new(logger, walker, config).into();
            unsafe {
                automation.AddPropertyChangedEventHandlerNativeArray(
                    &element,
                    TreeScope_Subtree,
                    None,
                    &handler,
                    &WATCHED_PROPERTIES,
                )?
            };
        }
    }

    info!(
        "{kind} monitor armed, checking for shutdown every {:?}",
        config.poll_interval
    );
    while !stop.load(Ordering::SeqCst) {
        thread::sleep(config.poll_interval);
    }

    info!("{kind} monitor shutting down");
    unsafe { automation.RemoveAllEventHandlers()? };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_setup() -> (SpyConfig, Arc<Mutex<Logger>>, Arc<AtomicBool>) {
        (
            SpyConfig::new(1, true, false, false),
            Arc::new(Mutex::new(Logger::new())),
            Arc::new(AtomicBool::new(false)),
        )
    }

    /// Both monitors run side by side against the same target and both
    /// come down when the shared token flips. In a session without a
    /// desktop, setup fails inside each thread and join still observes a
    /// clean exit.
    #[test]
    fn monitor_pair_runs_and_stops_on_cancellation() {
        let (config, logger, stop) = test_setup();

        let automation = spawn(
            MonitorKind::Automation,
            Target::Desktop,
            config.clone(),
            logger.clone(),
            stop.clone(),
        )
        .unwrap();
        let properties = spawn(
            MonitorKind::PropertyChange,
            Target::Desktop,
            config,
            logger,
            stop.clone(),
        )
        .unwrap();

        thread::sleep(Duration::from_secs(3));

        stop.store(true, Ordering::SeqCst);
        assert!(automation.join().is_ok());
        assert!(properties.join().is_ok());
    }

    /// A monitor whose sibling never starts (bogus target, resolution
    /// fails inside the thread) is unaffected by that failure.
    #[test]
    fn failed_sibling_does_not_stop_a_monitor() {
        let (config, logger, stop) = test_setup();

        let healthy = spawn(
            MonitorKind::Automation,
            Target::Desktop,
            config.clone(),
            logger.clone(),
            stop.clone(),
        )
        .unwrap();
        let doomed = spawn(
            MonitorKind::PropertyChange,
            Target::Window("no such window should ever carry this name".to_string()),
            config,
            logger,
            stop.clone(),
        )
        .unwrap();

        assert!(doomed.join().is_ok());

        stop.store(true, Ordering::SeqCst);
        assert!(healthy.join().is_ok());
    }

    #[test]
    fn pre_cancelled_token_stops_immediately() {
        let (config, logger, stop) = test_setup();
        stop.store(true, Ordering::SeqCst);

        let monitor = spawn(MonitorKind::Automation, Target::Desktop, config, logger, stop)
            .unwrap();
        assert!(monitor.join().is_ok());
    }
}
