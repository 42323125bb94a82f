use std::sync::{Arc, Mutex};

use windows::Win32::UI::Accessibility::{
    IUIAutomationElement, UIA_Invoke_InvokedEventId, UIA_Window_WindowOpenedEventId,
};

use crate::error::Result;
use crate::logger::Logger;
use super::common;
use super::HandlerFn;

pub fn create_explorer_handler(logger: Arc<Mutex<Logger>>) -> HandlerFn {
    Box::new(move |walker, element, process_name, date, event_id| match event_id {
        UIA_Window_WindowOpenedEventId => {
            handle_window_opened(element, process_name, date, &logger)
        }
        UIA_Invoke_InvokedEventId => handle_item_invoked(element, process_name, date, &logger),
        _ => common::handle_generic_event(walker, element, process_name, date, event_id, &logger),
    })
}

/// Explorer names its windows after the open folder, so a window-open
/// event reveals the path being browsed.
fn handle_window_opened(
    element: &IUIAutomationElement,
    process_name: &str,
    date: &str,
    logger: &Arc<Mutex<Logger>>,
) -> Result<()> {
    let path = common::element_name(element);
    let class_name = common::element_class(element);

    let record = format!(
        "{date} {process_name} [Explorer Window]\nPath: {path}\nClass: {class_name}\n"
    );
    common::log_record(logger, &record)
}

fn handle_item_invoked(
    element: &IUIAutomationElement,
    process_name: &str,
    date: &str,
    logger: &Arc<Mutex<Logger>>,
) -> Result<()> {
    let action = common::element_name(element);
    let class_name = common::element_class(element);

    let record = format!(
        "{date} {process_name} [Explorer Action]\nAction: {action}\nClass: {class_name}\n"
    );
    common::log_record(logger, &record)
}
