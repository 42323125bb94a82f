use std::sync::{Arc, Mutex};

use windows::core::{BSTR, VARIANT};
use windows::Win32::UI::Accessibility::{
    IUIAutomationElement, UIA_EVENT_ID, UIA_PROPERTY_ID, UIA_IsEnabledPropertyId,
    UIA_LegacyIAccessibleHelpPropertyId, UIA_NamePropertyId, UIA_ToggleToggleStatePropertyId,
    UIA_ValueValuePropertyId,
};

use crate::ascent::NameAscent;
use crate::error::Result;
use crate::logger::Logger;
use crate::uia::TreeWalker;

/// Generic fallback for automation events: the owning window recovered
/// through the ascending name walk, plus whatever element properties
/// still read.
pub fn handle_generic_event(
    walker: &TreeWalker,
    element: &IUIAutomationElement,
    process_name: &str,
    date: &str,
    event_id: UIA_EVENT_ID,
    logger: &Arc<Mutex<Logger>>,
) -> Result<()> {
    let window = window_identity(walker, element);
    let class_name = element_class(element);
    let help = element_property(element, UIA_LegacyIAccessibleHelpPropertyId);
    let value = element_value(element);

    let mut record = format!("{date} {process_name} [{}]\n", event_name(event_id));
    record.push_str(&format!("Window: {window}\n"));
    record.push_str(&format!("Class: {class_name}\n"));
    if !help.is_empty() {
        record.push_str(&format!("Help: {help}\n"));
    }
    if !value.is_empty() {
        record.push_str(&format!("Value: {value}\n"));
    }

    log_record(logger, &record)
}

/// Generic fallback for property change events.
pub fn handle_generic_property_change(
    walker: &TreeWalker,
    element: &IUIAutomationElement,
    process_name: &str,
    date: &str,
    property_id: UIA_PROPERTY_ID,
    new_value: &VARIANT,
    logger: &Arc<Mutex<Logger>>,
) -> Result<()> {
    let window = window_identity(walker, element);
    let control_type = unsafe { element.CurrentLocalizedControlType() }
        .map(|t| t.to_string())
        .unwrap_or_default();

    let record = format!(
        "{date} {process_name} [{control_type}]\nWindow: {window}\nNew {}: {}\n",
        property_name(property_id),
        render_variant(new_value),
    );

    log_record(logger, &record)
}

/// The nearest named ancestor, or a placeholder when the whole chain is
/// unnamed. Routine for popup elements, so never an error.
pub fn window_identity(walker: &TreeWalker, element: &IUIAutomationElement) -> String {
    match walker.resolve_ascending_name(element) {
        NameAscent::Named(name) => name,
        NameAscent::Unavailable => String::from("<unavailable>"),
    }
}

pub fn element_name(element: &IUIAutomationElement) -> String {
    unsafe { element.CurrentName() }
        .map(|name| name.to_string())
        .unwrap_or_default()
}

pub fn element_value(element: &IUIAutomationElement) -> String {
    element_property(element, UIA_ValueValuePropertyId)
}

pub fn element_class(element: &IUIAutomationElement) -> String {
    unsafe { element.CurrentClassName() }
        .map(|class| class.to_string())
        .unwrap_or_default()
}

/// Reads one string-valued property, degrading to empty when the element
/// is gone or the property does not carry text.
pub fn element_property(element: &IUIAutomationElement, property: UIA_PROPERTY_ID) -> String {
    unsafe { element.GetCurrentPropertyValue(property) }
        .ok()
        .and_then(|value| BSTR::try_from(&value).ok())
        .map(|text| text.to_string())
        .unwrap_or_default()
}

pub fn render_variant(value: &VARIANT) -> String {
    if let Ok(text) = BSTR::try_from(value) {
        text.to_string()
    } else if let Ok(number) = i32::try_from(value) {
        number.to_string()
    } else if let Ok(flag) = bool::try_from(value) {
        flag.to_string()
    } else {
        String::from("<opaque>")
    }
}

pub fn property_name(property_id: UIA_PROPERTY_ID) -> &'static str {
    match property_id {
        UIA_NamePropertyId => "Name",
        UIA_ValueValuePropertyId => "Value",
        UIA_ToggleToggleStatePropertyId => "ToggleState",
        UIA_IsEnabledPropertyId => "IsEnabled",
        _ => "Property",
    }
}

fn event_name(event_id: UIA_EVENT_ID) -> String {
    use windows::Win32::UI::Accessibility::{
        UIA_Invoke_InvokedEventId, UIA_MenuOpenedEventId, UIA_Text_TextChangedEventId,
        UIA_Text_TextSelectionChangedEventId, UIA_Window_WindowClosedEventId,
        UIA_Window_WindowOpenedEventId,
    };
    match event_id {
        UIA_Window_WindowOpenedEventId => "WindowOpened".to_string(),
        UIA_Window_WindowClosedEventId => "WindowClosed".to_string(),
        UIA_Invoke_InvokedEventId => "Invoked".to_string(),
        UIA_MenuOpenedEventId => "MenuOpened".to_string(),
        UIA_Text_TextChangedEventId => "TextChanged".to_string(),
        UIA_Text_TextSelectionChangedEventId => "TextSelectionChanged".to_string(),
        other => format!("Event {}", other.0),
    }
}

pub(crate) fn log_record(logger: &Arc<Mutex<Logger>>, record: &str) -> Result<()> {
    if let Ok(mut sink) = logger.lock() {
        sink.log(record)?;
    }
    Ok(())
}
