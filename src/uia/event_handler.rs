use std::sync::{Arc, Mutex};

use chrono::Local;
use log::debug;
use windows::core::implement;
use windows::Win32::UI::Accessibility::{
    IUIAutomationElement, IUIAutomationEventHandler, IUIAutomationEventHandler_Impl, UIA_EVENT_ID,
};

use crate::config::SpyConfig;
use crate::finder::Finder;
use crate::logger::Logger;
use super::handlers::{common, HandlerRegistry};
use super::TreeWalker;

/// Structural/automation event callback. COM invokes it on its own
/// worker threads; every delivery must come back `Ok` so one bad event
/// cannot unhook the monitor.
#[implement(IUIAutomationEventHandler)]
pub struct AutomationEventHandler {
    logger: Arc<Mutex<Logger>>,
    registry: HandlerRegistry,
    walker: TreeWalker,
    ignore_handlers: bool,
}

impl AutomationEventHandler {
    pub fn new(logger: Arc<Mutex<Logger>>, walker: TreeWalker, config: &SpyConfig) -> Self {
        Self {
            registry: HandlerRegistry::new(logger.clone()),
            logger,
            walker,
            ignore_handlers: config.ignore_handlers,
        }
    }
}

impl IUIAutomationEventHandler_Impl for AutomationEventHandler_Impl {
    fn HandleAutomationEvent(
        &self,
        sender: Option<&IUIAutomationElement>,
        event_id: UIA_EVENT_ID,
    ) -> windows::core::Result<()> {
        let Some(element) = sender else {
            return Ok(());
        };

        let process_name = match unsafe { element.CurrentProcessId() } {
            Ok(pid) => Finder::process_name(pid as u32)
                .unwrap_or_else(|_| String::from("<unknown>")),
            Err(e) => {
                // sender vanished between delivery and inspection
                debug!("event sender has no process id: {e}");
                return Ok(());
            }
        };
        let date = Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let outcome = if self.ignore_handlers {
            common::handle_generic_event(
                &self.walker,
                element,
                &process_name,
                &date,
                event_id,
                &self.logger,
            )
        } else if let Some(handler) = self.registry.event_handler(&process_name) {
            handler(&self.walker, element, &process_name, &date, event_id)
        } else {
            common::handle_generic_event(
                &self.walker,
                element,
                &process_name,
                &date,
                event_id,
                &self.logger,
            )
        };

        if let Err(e) = outcome {
            if let Ok(mut sink) = self.logger.lock() {
                let _ = sink.warn(&format!("automation event from {process_name} dropped: {e}"));
            }
        }
        Ok(())
    }
}
