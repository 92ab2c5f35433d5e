//! Presentation state derived from fetch status and row count.

use crate::query::FetchStatus;

/// What the body of the grid should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// No rows yet and a fetch for the current query is outstanding.
    Loading,
    /// At least one row is available.
    Populated,
    /// The current query succeeded with zero rows.
    Empty,
    /// The current query failed and there are no rows to show.
    Errored,
}

/// Derived load state: a [`Presentation`] plus the background-refresh flag.
///
/// Recomputed from scratch on every render; it has no memory of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadState {
    /// Presentation to render.
    pub presentation: Presentation,
    /// Rows are shown while a refetch is outstanding.
    pub revalidating: bool,
}

impl LoadState {
    /// Derives the load state.
    ///
    /// Rows win over everything: a pending or failed refetch on top of
    /// populated rows stays [`Presentation::Populated`].
    ///
    /// # Example
    ///
    /// ```
    /// use datagrid_lib::load_state::{LoadState, Presentation};
    /// use datagrid_lib::query::FetchStatus;
    ///
    /// let state = LoadState::derive(FetchStatus::Pending, 10);
    /// assert_eq!(state.presentation, Presentation::Populated);
    /// assert!(state.revalidating);
    /// ```
    pub fn derive(status: FetchStatus, row_count: usize) -> Self {
        let presentation = match (status, row_count) {
            (_, n) if n > 0 => Presentation::Populated,
            (FetchStatus::Pending, _) => Presentation::Loading,
            (FetchStatus::Success, _) => Presentation::Empty,
            (FetchStatus::Error, _) => Presentation::Errored,
        };

        Self {
            presentation,
            revalidating: presentation == Presentation::Populated && status == FetchStatus::Pending,
        }
    }
}
