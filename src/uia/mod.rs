mod event_handler;
pub mod monitor;
mod property_handler;
mod tree_walker;
pub mod handlers;

pub use event_handler::AutomationEventHandler;
pub use monitor::MonitorKind;
pub use property_handler::PropertyChangedEventHandler;
pub use tree_walker::TreeWalker;

use windows::Win32::Foundation::E_POINTER;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED,
};
use windows::Win32::UI::Accessibility::{
    CUIAutomation, IUIAutomation, IUIAutomationCondition, IUIAutomationElement, TreeScope_Subtree,
};

use crate::ascent::SearchOutcome;
use crate::error::Result;

/// Connection to the automation subsystem. Each thread that talks UIA
/// creates its own; COM interface pointers stay on the thread that made
/// them.
pub struct UiaContext {
    automation: IUIAutomation,
}

impl UiaContext {
    /// Requires COM to be initialized on the calling thread.
    pub fn new() -> Result<Self> {
        let automation: IUIAutomation =
            unsafe { CoCreateInstance(&CUIAutomation, None, CLSCTX_INPROC_SERVER)? };
        Ok(Self { automation })
    }

    pub fn automation(&self) -> &IUIAutomation {
        &self.automation
    }
}

/// Per-thread COM setup, multithreaded apartment so event callbacks are
/// delivered while the monitor loops sleep.
pub fn init_com() -> Result<()> {
    unsafe { CoInitializeEx(None, COINIT_MULTITHREADED).ok()? };
    Ok(())
}

pub fn uninit_com() {
    unsafe { CoUninitialize() };
}

/// One subtree query. The bindings surface a null "no match" result as
/// `E_POINTER`; anything else is a real failure worth keeping separate.
pub(crate) fn find_first_in_subtree(
    scope: &IUIAutomationElement,
    condition: &IUIAutomationCondition,
) -> SearchOutcome<IUIAutomationElement> {
    match unsafe { scope.FindFirst(TreeScope_Subtree, condition) } {
        Ok(element) => SearchOutcome::Found(element),
        Err(e) if e.code() == E_POINTER => SearchOutcome::NotFound,
        Err(e) => SearchOutcome::QueryFailed(e.message().to_string()),
    }
}
