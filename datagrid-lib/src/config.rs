//! Grid configuration

use crate::error::ConfigError;

/// Which parts of the view state survive a restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistMode {
    /// Column order and column visibility only.
    Basic,
    /// Everything: also pagination, row selection, sorting and filters.
    #[default]
    Extended,
}

/// How page numbers are sent to the remote collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageBase {
    /// The first page is `0`.
    #[default]
    Zero,
    /// The first page is `1`.
    One,
}

impl PageBase {
    /// Converts a zero-based page index into the remote page number.
    pub fn page_number(self, page_index: usize) -> usize {
        match self {
            Self::Zero => page_index,
            Self::One => page_index + 1,
        }
    }
}

/// Per-grid configuration.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::{GridConfig, PageBase, PersistMode};
///
/// let config = GridConfig::default()
///     .with_page_size(25)
///     .with_page_base(PageBase::One)
///     .with_persist(PersistMode::Basic);
/// ```
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Page size used when nothing is persisted.
    ///
    /// Default: 10
    pub page_size: usize,

    /// Column kept last in the column order after every mutation.
    ///
    /// Default: `actions`
    pub pinned_trailing_column: Option<String>,

    /// Which fields are written to the store.
    ///
    /// Default: [`PersistMode::Extended`]
    pub persist: PersistMode,

    /// Page numbering of the remote API.
    ///
    /// Default: [`PageBase::Zero`]
    pub page_base: PageBase,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            pinned_trailing_column: Some("actions".to_string()),
            persist: PersistMode::Extended,
            page_base: PageBase::Zero,
        }
    }
}

impl GridConfig {
    /// Sets the default page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the trailing-pinned column.
    pub fn with_pinned_trailing_column(mut self, column: impl Into<String>) -> Self {
        self.pinned_trailing_column = Some(column.into());
        self
    }

    /// Sets the persist mode.
    pub fn with_persist(mut self, persist: PersistMode) -> Self {
        self.persist = persist;
        self
    }

    /// Sets the remote page numbering.
    pub fn with_page_base(mut self, page_base: PageBase) -> Self {
        self.page_base = page_base;
        self
    }

    /// Checks the values that cannot be normalized later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}
