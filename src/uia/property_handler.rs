use std::sync::{Arc, Mutex};

use chrono::Local;
use log::debug;
use windows::core::{implement, VARIANT};
use windows::Win32::UI::Accessibility::{
    IUIAutomationElement, IUIAutomationPropertyChangedEventHandler,
    IUIAutomationPropertyChangedEventHandler_Impl, UIA_PROPERTY_ID,
};

use crate::config::SpyConfig;
use crate::finder::Finder;
use crate::logger::Logger;
use super::handlers::{common, HandlerRegistry};
use super::TreeWalker;

/// Property change callback, the second half of the monitor pair. Same
/// contract as the automation event handler: log and skip bad
/// deliveries, never fail the callback.
#[implement(IUIAutomationPropertyChangedEventHandler)]
pub struct PropertyChangedEventHandler {
    logger: Arc<Mutex<Logger>>,
    registry: HandlerRegistry,
    walker: TreeWalker,
    ignore_handlers: bool,
}

impl PropertyChangedEventHandler {
    pub fn new(logger: Arc<Mutex<Logger>>, walker: TreeWalker, config: &SpyConfig) -> Self {
        Self {
            registry: HandlerRegistry::new(logger.clone()),
            logger,
            walker,
            ignore_handlers: config.ignore_handlers,
        }
    }
}

impl IUIAutomationPropertyChangedEventHandler_Impl for PropertyChangedEventHandler_Impl {
    fn HandlePropertyChangedEvent(
        &self,
        sender: Option<&IUIAutomationElement>,
        property_id: UIA_PROPERTY_ID,
        new_value: &VARIANT,
    ) -> windows::core::Result<()> {
        let Some(element) = sender else {
            return Ok(());
        };

        let process_name = match unsafe { element.CurrentProcessId() } {
            Ok(pid) => Finder::process_name(pid as u32)
                .unwrap_or_else(|_| String::from("<unknown>")),
            Err(e) => {
                debug!("property change sender has no process id: {e}");
                return Ok(());
            }
        };
        let date = Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let outcome = if self.ignore_handlers {
            common::handle_generic_property_change(
                &self.walker,
                element,
                &process_name,
                &date,
                property_id,
                new_value,
                &self.logger,
            )
        } else if let Some(handler) = self.registry.property_handler(&process_name) {
            handler(
                &self.walker,
                element,
                &process_name,
                &date,
                property_id,
                new_value,
            )
        } else {
            common::handle_generic_property_change(
                &self.walker,
                element,
                &process_name,
                &date,
                property_id,
                new_value,
                &self.logger,
            )
        };

        if let Err(e) = outcome {
            if let Ok(mut sink) = self.logger.lock() {
                let _ = sink.warn(&format!("property change from {process_name} dropped: {e}"));
            }
        }
        Ok(())
    }
}
