//! Ancestor-walk algorithms behind the UIA tree walker.
//!
//! Generic over the node handle so the loops can be exercised against an
//! in-memory tree; the walker supplies closures backed by the raw-view
//! traversal.

/// Outcome of climbing for a window name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameAscent {
    Named(String),
    /// The element and its reachable ancestor chain carry no usable name,
    /// or a name read failed mid-climb. Expected for ephemeral popups.
    Unavailable,
}

/// Outcome of an ascending subtree search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<N> {
    Found(N),
    NotFound,
    /// Nothing matched and at least one subtree query failed on the way up.
    QueryFailed(String),
}

/// Upper bound on parent hops. The foreign tree mutates underneath the
/// walk and may even report inconsistent parent links; the bound keeps
/// every ascent finite regardless.
const MAX_ASCENT: usize = 128;

/// Reads the element's own name; while it is empty, climbs to the parent
/// and reads again. `name_of` returning `None` means the read itself
/// failed, which disqualifies the whole chain.
pub fn resolve_ascending_name<N>(
    start: &N,
    parent_of: impl Fn(&N) -> Option<N>,
    name_of: impl Fn(&N) -> Option<String>,
) -> NameAscent {
    match name_of(start) {
        Some(name) if !name.is_empty() => return NameAscent::Named(name),
        Some(_) => {}
        None => return NameAscent::Unavailable,
    }

    let mut current = match parent_of(start) {
        Some(parent) => parent,
        None => return NameAscent::Unavailable,
    };

    for _ in 0..MAX_ASCENT {
        match name_of(&current) {
            Some(name) if !name.is_empty() => return NameAscent::Named(name),
            Some(_) => {}
            None => return NameAscent::Unavailable,
        }
        current = match parent_of(&current) {
            Some(parent) => parent,
            None => return NameAscent::Unavailable,
        };
    }

    NameAscent::Unavailable
}

/// Outward-expanding search. Beginning at the parent of `start`, searches
/// each ancestor's whole subtree for a match, climbing one level whenever
/// a subtree yields nothing. `start` itself never matches; a subtree hit
/// equal to it is discarded and the climb continues.
///
/// A failed subtree query behaves like a miss for control-flow purposes,
/// but is remembered: when the walk tops out without a match, the first
/// failure is reported instead of a plain `NotFound`.
pub fn find_first_ascending<N>(
    start: &N,
    parent_of: impl Fn(&N) -> Option<N>,
    search_subtree: impl Fn(&N) -> SearchOutcome<N>,
    is_same: impl Fn(&N, &N) -> bool,
) -> SearchOutcome<N> {
    let mut first_failure: Option<String> = None;

    let mut current = match parent_of(start) {
        Some(parent) => parent,
        None => return SearchOutcome::NotFound,
    };

    for _ in 0..MAX_ASCENT {
        match search_subtree(&current) {
            SearchOutcome::Found(hit) if is_same(&hit, start) => {}
            SearchOutcome::Found(hit) => return SearchOutcome::Found(hit),
            SearchOutcome::NotFound => {}
            SearchOutcome::QueryFailed(reason) => {
                first_failure.get_or_insert(reason);
            }
        }
        current = match parent_of(&current) {
            Some(parent) => parent,
            None => break,
        };
    }

    match first_failure {
        Some(reason) => SearchOutcome::QueryFailed(reason),
        None => SearchOutcome::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Arena-backed stand-in for the live automation tree. A node's name
    /// of `None` simulates a failed property read; `fails_search`
    /// simulates a subtree query error.
    struct TreeFixture {
        parent: Vec<Option<usize>>,
        name: Vec<Option<&'static str>>,
        matches: Vec<bool>,
        fails_search: Vec<bool>,
    }

    impl TreeFixture {
        fn new(parent: Vec<Option<usize>>, name: Vec<Option<&'static str>>) -> Self {
            let len = parent.len();
            TreeFixture {
                parent,
                name,
                matches: vec![false; len],
                fails_search: vec![false; len],
            }
        }

        fn parent_of(&self, node: &usize) -> Option<usize> {
            self.parent[*node]
        }

        fn name_of(&self, node: &usize) -> Option<String> {
            self.name[*node].map(str::to_string)
        }

        fn in_subtree(&self, node: usize, scope: usize) -> bool {
            let mut current = Some(node);
            while let Some(n) = current {
                if n == scope {
                    return true;
                }
                current = self.parent[n];
            }
            false
        }

        /// Subtree search in arena order, matching UIA scope semantics:
        /// the scope element itself is part of its own subtree.
        fn search(&self, scope: &usize) -> SearchOutcome<usize> {
            if self.fails_search[*scope] {
                return SearchOutcome::QueryFailed("element not available".to_string());
            }
            for node in 0..self.parent.len() {
                if self.matches[node] && self.in_subtree(node, *scope) {
                    return SearchOutcome::Found(node);
                }
            }
            SearchOutcome::NotFound
        }

        fn resolve_name(&self, start: usize) -> NameAscent {
            resolve_ascending_name(&start, |n| self.parent_of(n), |n| self.name_of(n))
        }

        fn find_ascending(&self, start: usize) -> SearchOutcome<usize> {
            find_first_ascending(
                &start,
                |n| self.parent_of(n),
                |scope| self.search(scope),
                |a, b| a == b,
            )
        }
    }

    /// Root("Desktop") <- A("") <- B("") <- C("")
    fn desktop_chain() -> TreeFixture {
        TreeFixture::new(
            vec![None, Some(0), Some(1), Some(2)],
            vec![Some("Desktop"), Some(""), Some(""), Some("")],
        )
    }

    #[test]
    fn own_name_returns_without_ascending() {
        let tree = TreeFixture::new(vec![None, Some(0)], vec![Some("Shell"), Some("Editor")]);
        let no_ascend = |_: &usize| -> Option<usize> { panic!("must not ascend") };
        let result = resolve_ascending_name(&1, no_ascend, |n| tree.name_of(n));
        assert_eq!(result, NameAscent::Named("Editor".to_string()));
    }

    #[test]
    fn resolves_nearest_named_ancestor() {
        let tree = TreeFixture::new(
            vec![None, Some(0), Some(1), Some(2)],
            vec![Some("Desktop"), Some(""), Some("Dialog"), Some("")],
        );
        assert_eq!(tree.resolve_name(3), NameAscent::Named("Dialog".to_string()));
    }

    #[test]
    fn empty_chain_resolves_to_desktop() {
        assert_eq!(
            desktop_chain().resolve_name(3),
            NameAscent::Named("Desktop".to_string())
        );
    }

    #[test]
    fn fully_unnamed_chain_is_unavailable() {
        let tree = TreeFixture::new(
            vec![None, Some(0), Some(1)],
            vec![Some(""), Some(""), Some("")],
        );
        assert_eq!(tree.resolve_name(2), NameAscent::Unavailable);
    }

    #[test]
    fn failed_read_mid_chain_is_unavailable() {
        // ancestor 1 fails its name read even though the root is named
        let tree = TreeFixture::new(
            vec![None, Some(0), Some(1)],
            vec![Some("Desktop"), None, Some("")],
        );
        assert_eq!(tree.resolve_name(2), NameAscent::Unavailable);
    }

    #[test]
    fn failed_read_on_start_is_unavailable() {
        let tree = TreeFixture::new(vec![None, Some(0)], vec![Some("Desktop"), None]);
        assert_eq!(tree.resolve_name(1), NameAscent::Unavailable);
    }

    #[test]
    fn never_matches_the_start_element() {
        // start satisfies the condition and sits in every ancestor subtree
        let mut tree = desktop_chain();
        tree.matches[3] = true;
        assert_eq!(tree.find_ascending(3), SearchOutcome::NotFound);
    }

    #[test]
    fn nearest_ancestor_subtree_wins() {
        // 0 <- 1 <- 2(start), 1 <- 3(match), 0 <- 4(match)
        let mut tree = TreeFixture::new(
            vec![None, Some(0), Some(1), Some(1), Some(0)],
            vec![Some("Desktop"), Some(""), Some(""), Some(""), Some("")],
        );
        tree.matches[3] = true;
        tree.matches[4] = true;
        assert_eq!(tree.find_ascending(2), SearchOutcome::Found(3));
    }

    #[test]
    fn climbs_until_a_subtree_matches() {
        // 0 <- A(1) <- B(2) <- C(3), match M(4) hangs off A, outside B
        let mut tree = TreeFixture::new(
            vec![None, Some(0), Some(1), Some(2), Some(1)],
            vec![Some("Desktop"), Some(""), Some(""), Some(""), Some("")],
        );
        tree.matches[4] = true;
        // ascent starts at B: B's subtree misses, A's subtree hits M
        assert_eq!(tree.find_ascending(3), SearchOutcome::Found(4));
    }

    #[test]
    fn matching_ancestor_is_returned_when_it_satisfies_the_condition() {
        let mut tree = desktop_chain();
        tree.matches[1] = true;
        assert_eq!(tree.find_ascending(3), SearchOutcome::Found(1));
    }

    #[test]
    fn exhausted_chain_reports_not_found() {
        assert_eq!(desktop_chain().find_ascending(3), SearchOutcome::NotFound);
    }

    #[test]
    fn start_without_parent_reports_not_found() {
        let tree = TreeFixture::new(vec![None], vec![Some("Desktop")]);
        assert_eq!(tree.find_ascending(0), SearchOutcome::NotFound);
    }

    #[test]
    fn query_failure_is_reported_when_nothing_matches() {
        let mut tree = desktop_chain();
        tree.fails_search[1] = true;
        assert_eq!(
            tree.find_ascending(3),
            SearchOutcome::QueryFailed("element not available".to_string())
        );
    }

    #[test]
    fn match_above_a_failed_subtree_still_wins() {
        let mut tree = desktop_chain();
        tree.fails_search[2] = true;
        tree.matches[1] = true;
        assert_eq!(tree.find_ascending(3), SearchOutcome::Found(1));
    }
}
