//! Lyric line selection
//!
//! A selection is empty, a single line, or a contiguous ascending run of at
//! most [`MAX_SELECTED_LINES`] lines. Every transition in [`Selection::apply_click`]
//! keeps that shape, so callers never need a separate repair pass.

use std::collections::BTreeSet;
use thiserror::Error;

/// Maximum number of lines that can go into one snippet.
pub const MAX_SELECTED_LINES: usize = 4;

/// Reasons a selection action is refused. These never leave the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("You can select up to {max} lines")]
    LimitReached { max: usize },
    #[error("Select at least one line first")]
    Empty,
    #[error("Selected lines must be next to each other")]
    NonContiguous,
}

/// Set of selected line indices, always read back in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    indices: BTreeSet<usize>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(index: usize) -> Self {
        Self {
            indices: BTreeSet::from([index]),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Selected indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Next selection after the user clicks `clicked`.
    ///
    /// - empty selection: the clicked line alone
    /// - clicking a selected line: clears everything
    /// - clicking next to either end of the run while under `max`: extends it
    /// - any other click at the limit: `Err(LimitReached)`, keep the current value
    /// - any other click under the limit: restarts at the clicked line
    pub fn apply_click(&self, clicked: usize, max: usize) -> Result<Selection, SelectionError> {
        let (Some(lo), Some(hi)) = (self.first(), self.last()) else {
            return Ok(Self::single(clicked));
        };

        if self.contains(clicked) {
            return Ok(Self::empty());
        }

        let adjacent = lo.checked_sub(1) == Some(clicked) || hi.checked_add(1) == Some(clicked);
        if adjacent && self.len() < max {
            let mut indices = self.indices.clone();
            indices.insert(clicked);
            return Ok(Self { indices });
        }

        if self.len() >= max {
            return Err(SelectionError::LimitReached { max });
        }

        Ok(Self::single(clicked))
    }

    /// True when the sorted indices have no gaps. Empty and single selections
    /// are trivially contiguous.
    pub fn is_contiguous(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(lo), Some(hi)) => hi - lo + 1 == self.len(),
            _ => true,
        }
    }

    /// Last check before the export modal may open.
    pub fn validate_for_export(&self) -> Result<(), SelectionError> {
        if self.is_empty() {
            return Err(SelectionError::Empty);
        }
        if !self.is_contiguous() {
            return Err(SelectionError::NonContiguous);
        }
        Ok(())
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn click(sel: &Selection, i: usize) -> Selection {
        sel.apply_click(i, MAX_SELECTED_LINES).unwrap_or_else(|_| sel.clone())
    }

    fn ids(sel: &Selection) -> Vec<usize> {
        sel.iter().collect()
    }

    #[test]
    fn test_first_click_selects_single_line() {
        let sel = Selection::empty().apply_click(7, MAX_SELECTED_LINES).unwrap();
        assert_eq!(ids(&sel), vec![7]);
    }

    #[test]
    fn test_walkthrough_with_blank_line() {
        // lines: ["a", "", "c", "d"]
        let sel = click(&Selection::empty(), 2);
        assert_eq!(ids(&sel), vec![2]);
        let sel = click(&sel, 3);
        assert_eq!(ids(&sel), vec![2, 3]);
        let sel = click(&sel, 1);
        assert_eq!(ids(&sel), vec![1, 2, 3]);
        let sel = click(&sel, 0);
        assert_eq!(ids(&sel), vec![0, 1, 2, 3]);

        // Run is full: the next adjacent line is refused.
        assert_eq!(
            sel.apply_click(4, MAX_SELECTED_LINES),
            Err(SelectionError::LimitReached { max: 4 })
        );
    }

    #[test]
    fn test_click_on_member_clears_everything() {
        let sel: Selection = [3, 4, 5].into_iter().collect();
        assert!(sel.apply_click(4, MAX_SELECTED_LINES).unwrap().is_empty());
        assert!(sel.apply_click(3, MAX_SELECTED_LINES).unwrap().is_empty());
        assert!(Selection::single(0).apply_click(0, MAX_SELECTED_LINES).unwrap().is_empty());
    }

    #[test]
    fn test_non_adjacent_click_restarts_under_limit() {
        let sel: Selection = [3, 4].into_iter().collect();
        let next = sel.apply_click(10, MAX_SELECTED_LINES).unwrap();
        assert_eq!(ids(&next), vec![10]);
    }

    #[test]
    fn test_non_adjacent_click_rejected_at_limit() {
        let sel: Selection = [3, 4, 5, 6].into_iter().collect();
        assert_eq!(
            sel.apply_click(10, MAX_SELECTED_LINES),
            Err(SelectionError::LimitReached { max: 4 })
        );
        assert_eq!(
            sel.apply_click(2, MAX_SELECTED_LINES),
            Err(SelectionError::LimitReached { max: 4 })
        );
    }

    #[test]
    fn test_line_zero_has_no_lower_neighbour() {
        let sel = Selection::single(0);
        let next = sel.apply_click(1, MAX_SELECTED_LINES).unwrap();
        assert_eq!(ids(&next), vec![0, 1]);
        let next = sel.apply_click(2, MAX_SELECTED_LINES).unwrap();
        assert_eq!(ids(&next), vec![2]);
    }

    #[test]
    fn test_validate_for_export() {
        assert_eq!(Selection::empty().validate_for_export(), Err(SelectionError::Empty));
        assert_eq!(Selection::single(5).validate_for_export(), Ok(()));
        let gappy: Selection = [1, 2, 4].into_iter().collect();
        assert_eq!(gappy.validate_for_export(), Err(SelectionError::NonContiguous));
        let run: Selection = [4, 5, 6].into_iter().collect();
        assert_eq!(run.validate_for_export(), Ok(()));
    }

    proptest! {
        #[test]
        fn prop_any_click_sequence_keeps_shape(clicks in prop::collection::vec(0usize..12, 0..64)) {
            let mut sel = Selection::empty();
            for c in clicks {
                sel = click(&sel, c);
                prop_assert!(sel.len() <= MAX_SELECTED_LINES);
                prop_assert!(sel.is_contiguous());
            }
        }

        #[test]
        fn prop_member_click_always_clears(
            clicks in prop::collection::vec(0usize..12, 1..32),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut sel = Selection::empty();
            for c in clicks {
                sel = click(&sel, c);
            }
            prop_assume!(!sel.is_empty());
            let members = ids(&sel);
            let member = members[pick.index(members.len())];
            prop_assert!(sel.apply_click(member, MAX_SELECTED_LINES).unwrap().is_empty());
        }

        #[test]
        fn prop_adjacent_click_extends_by_one_or_is_rejected(
            start in 1usize..20,
            len in 1usize..=MAX_SELECTED_LINES,
            upward in any::<bool>(),
        ) {
            let sel: Selection = (start..start + len).collect();
            let target = if upward { start + len } else { start - 1 };
            match sel.apply_click(target, MAX_SELECTED_LINES) {
                Ok(next) => {
                    prop_assert!(len < MAX_SELECTED_LINES);
                    prop_assert_eq!(next.len(), len + 1);
                    prop_assert!(next.contains(target));
                }
                Err(e) => {
                    prop_assert_eq!(len, MAX_SELECTED_LINES);
                    prop_assert_eq!(e, SelectionError::LimitReached { max: MAX_SELECTED_LINES });
                }
            }
        }

        #[test]
        fn prop_far_click_under_limit_restarts(
            start in 0usize..20,
            len in 1usize..MAX_SELECTED_LINES,
            gap in 2usize..10,
        ) {
            let sel: Selection = (start..start + len).collect();
            let target = start + len - 1 + gap;
            let next = sel.apply_click(target, MAX_SELECTED_LINES).unwrap();
            prop_assert_eq!(ids(&next), vec![target]);
        }
    }
}
