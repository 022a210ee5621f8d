//! Forward scan that locates a folder's child list among the siblings that
//! follow its heading.
//!
//! Exports in the wild nest a folder's `<DL>` in several ways: directly after
//! the `<H3>`, wrapped in a `<DD>`, or separated from the heading by stray
//! `<p>` spacers and other markup. The scan walks the siblings once as a small
//! state machine so the rules live in one table instead of nested loops.

/// How a sibling element looks to the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingKind {
    /// `<p>` spacer.
    Paragraph,
    /// `<dd>`; `has_list` is true when a `<dl>` is nested somewhere inside it.
    Description { has_list: bool },
    /// `<dl>`.
    List,
    /// `<dt>` or `<hr>`: the next entry of the enclosing list.
    Item,
    Other,
}

/// Scan state. `FoundList` and `Exhausted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Skipping leading spacers; a `<dd>` seen here is searched for a list.
    SeekingContent,
    /// Past the first real sibling; only a bare `<dl>` is accepted now.
    ScanningForward,
    /// The child list is the sibling at this position (or nested inside it).
    FoundList(usize),
    /// No child list belongs to this heading.
    Exhausted,
}

impl ScanState {
    fn is_terminal(self) -> bool {
        matches!(self, ScanState::FoundList(_) | ScanState::Exhausted)
    }

    /// Transition on one sibling at `position`.
    pub fn step(self, position: usize, kind: SiblingKind) -> Self {
        match (self, kind) {
            (ScanState::FoundList(_) | ScanState::Exhausted, _) => self,
            (_, SiblingKind::List) => ScanState::FoundList(position),
            (_, SiblingKind::Item) => ScanState::Exhausted,
            (ScanState::SeekingContent, SiblingKind::Paragraph) => ScanState::SeekingContent,
            (ScanState::SeekingContent, SiblingKind::Description { has_list: true }) => {
                ScanState::FoundList(position)
            }
            (ScanState::SeekingContent | ScanState::ScanningForward, _) => {
                ScanState::ScanningForward
            }
        }
    }
}

/// Runs the scan to completion. Always returns a terminal state.
pub fn scan<I>(siblings: I) -> ScanState
where
    I: IntoIterator<Item = SiblingKind>,
{
    let mut state = ScanState::SeekingContent;
    for (position, kind) in siblings.into_iter().enumerate() {
        state = state.step(position, kind);
        if state.is_terminal() {
            return state;
        }
    }
    ScanState::Exhausted
}
