use log::{debug, info};
use windows::core::{BSTR, PWSTR, VARIANT};
use windows::Win32::Foundation::{CloseHandle, FALSE};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::Accessibility::{
    IUIAutomation, IUIAutomationElement, TreeScope_Children, UIA_NamePropertyId,
    UIA_ProcessIdPropertyId,
};

use crate::ascent::SearchOutcome;
use crate::config::Target;
use crate::error::{Result, SpyError};
use crate::uia::find_first_in_subtree;

/// Resolves the element the monitors will watch.
pub struct Finder;

impl Finder {
    /// Exact-name subtree search from the desktop root. First match in
    /// the tree's own enumeration order, which is not stable while the
    /// tree mutates.
    pub fn by_name(automation: &IUIAutomation, name: &str) -> Result<IUIAutomationElement> {
        let root = Self::desktop(automation)?;
        let value = VARIANT::from(BSTR::from(name));
        let condition =
            unsafe { automation.CreatePropertyCondition(UIA_NamePropertyId, &value)? };
        match find_first_in_subtree(&root, &condition) {
            SearchOutcome::Found(element) => Ok(element),
            SearchOutcome::NotFound => Err(SpyError::WindowNotFound(name.to_string())),
            SearchOutcome::QueryFailed(reason) => Err(SpyError::Uia(reason)),
        }
    }

    /// Subtree search filtered by owning process id.
    pub fn by_pid(automation: &IUIAutomation, pid: u32) -> Result<IUIAutomationElement> {
        let root = Self::desktop(automation)?;
        let value = VARIANT::from(pid as i32);
        let condition =
            unsafe { automation.CreatePropertyCondition(UIA_ProcessIdPropertyId, &value)? };
        match find_first_in_subtree(&root, &condition) {
            SearchOutcome::Found(element) => Ok(element),
            SearchOutcome::NotFound => Err(SpyError::ProcessNotFound(pid)),
            SearchOutcome::QueryFailed(reason) => Err(SpyError::Uia(reason)),
        }
    }

    /// The desktop root. Failing here is fatal; without some root there
    /// is nothing to monitor.
    pub fn desktop(automation: &IUIAutomation) -> Result<IUIAutomationElement> {
        Ok(unsafe { automation.GetRootElement()? })
    }

    pub fn resolve_target(
        automation: &IUIAutomation,
        target: &Target,
    ) -> Result<IUIAutomationElement> {
        match target {
            Target::Window(name) => {
                debug!("resolving window {name:?}");
                Self::by_name(automation, name)
            }
            Target::Process(pid) => {
                debug!("resolving process {pid}");
                Self::by_pid(automation, *pid)
            }
            Target::Desktop => {
                info!("no window or pid given, spying on the whole desktop");
                Self::desktop(automation)
            }
        }
    }

    /// FIND mode: list the top-level windows with their owning process.
    pub fn display_active_windows(automation: &IUIAutomation) -> Result<()> {
        let root = Self::desktop(automation)?;
        let condition = unsafe { automation.CreateTrueCondition()? };
        let top_level = unsafe { root.FindAll(TreeScope_Children, &condition)? };
        let count = unsafe { top_level.Length()? };

        println!("{:>8}  {:<24}  {}", "PID", "PROCESS", "WINDOW");
        for index in 0..count {
            let Ok(window) = (unsafe { top_level.GetElement(index) }) else {
                continue;
            };
            let name = unsafe { window.CurrentName() }
                .map(|n| n.to_string())
                .unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            let pid = unsafe { window.CurrentProcessId() }.unwrap_or(0) as u32;
            let process =
                Self::process_name(pid).unwrap_or_else(|_| String::from("<unknown>"));
            println!("{pid:>8}  {process:<24}  {name}");
        }
        Ok(())
    }

    /// Image base name of a process, lowercased; this is the key the
    /// handler registry dispatches on.
    pub fn process_name(pid: u32) -> Result<String> {
        unsafe {
            let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid)?;
            let mut buffer = [0u16; 512];
            let mut len = buffer.len() as u32;
            let queried = QueryFullProcessImageNameW(
                process,
                PROCESS_NAME_WIN32,
                PWSTR(buffer.as_mut_ptr()),
                &mut len,
            );
            let _ = CloseHandle(process);
            queried?;

            let path = String::from_utf16_lossy(&buffer[..len as usize]);
            let name = path.rsplit('\\').next().unwrap_or(path.as_str());
            Ok(name.to_ascii_lowercase())
        }
    }
}
