use crate::endpoint::total_pages;

/// Page count of the filter being traversed
///
/// Starts `Unknown` for every filter and is fixed once the first page
/// has been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationState {
    #[default]
    Unknown,

    /// Number of pages after the first one
    Known(u32),
}

impl PaginationState {
    /// Derives the state from the first page's pagination terminus
    pub fn from_terminus(terminus_offset: Option<u32>) -> Self {
        match terminus_offset {
            Some(offset) => Self::Known(total_pages(offset)),
            None => Self::Unknown,
        }
    }

    /// Pages left to fetch after the first; unknown counts as zero
    pub fn remaining_pages(&self) -> u32 {
        match self {
            Self::Known(pages) => *pages,
            Self::Unknown => 0,
        }
    }
}
