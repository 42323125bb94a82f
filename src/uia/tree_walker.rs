use log::{debug, warn};
use windows::Win32::UI::Accessibility::{
    IUIAutomation, IUIAutomationCondition, IUIAutomationElement, IUIAutomationTreeWalker,
};

use crate::ascent::{self, NameAscent, SearchOutcome};
use crate::error::Result;
use super::find_first_in_subtree;

/// Ancestor-direction navigation over the live automation tree.
///
/// Binds one provider connection and its raw-view walker, the traversal
/// that surfaces every node including non-interactive containers.
/// Elements are never owned here; they pass through as COM references,
/// and any of them can go stale mid-walk when the owning application
/// tears its UI down.
pub struct TreeWalker {
    automation: IUIAutomation,
    walker: IUIAutomationTreeWalker,
}

impl TreeWalker {
    /// Fails when the provider cannot hand out a raw-view walker; nothing
    /// in this module works without one.
    pub fn new(automation: &IUIAutomation) -> Result<Self> {
        let walker = unsafe { automation.RawViewWalker() }.map_err(|e| {
            warn!("failed to obtain the raw view walker: {e}");
            e
        })?;
        Ok(Self {
            automation: automation.clone(),
            walker,
        })
    }

    pub fn automation(&self) -> &IUIAutomation {
        &self.automation
    }

    /// One-hop ascent. Absence covers both "this is the root" and "the
    /// query failed"; the caller's only correct reaction is the same
    /// either way: stop climbing.
    pub fn get_parent(&self, element: &IUIAutomationElement) -> Option<IUIAutomationElement> {
        match unsafe { self.walker.GetParentElement(element) } {
            Ok(parent) => Some(parent),
            Err(e) => {
                debug!("no parent element: {e}");
                None
            }
        }
    }

    /// Climbs from the element toward the root until a non-empty name is
    /// found. Unnamed container chains are common; so is the whole chain
    /// being unnamed, which reports `Unavailable` rather than an error.
    pub fn resolve_ascending_name(&self, element: &IUIAutomationElement) -> NameAscent {
        ascent::resolve_ascending_name(
            element,
            |child| self.get_parent(child),
            |node| match unsafe { node.CurrentName() } {
                Ok(name) => Some(name.to_string()),
                Err(e) => {
                    debug!("name read failed during ascent: {e}");
                    None
                }
            },
        )
    }

    /// Expanding search: walks upward from the parent of `start`,
    /// searching each ancestor's whole subtree for a match. Events often
    /// fire on deeply nested elements whose meaningful container sits
    /// several levels up, outside any single parent hop. `start` itself
    /// never matches.
    pub fn find_first_ascending(
        &self,
        start: &IUIAutomationElement,
        condition: &IUIAutomationCondition,
    ) -> SearchOutcome<IUIAutomationElement> {
        ascent::find_first_ascending(
            start,
            |child| self.get_parent(child),
            |scope| find_first_in_subtree(scope, condition),
            |a, b| self.same_element(a, b),
        )
    }

    fn same_element(&self, a: &IUIAutomationElement, b: &IUIAutomationElement) -> bool {
        unsafe { self.automation.CompareElements(a, b) }
            .map(|equal| equal.as_bool())
            .unwrap_or(false)
    }
}
