//! Result pagination
//!
//! Pages are one-based. The limit defaults to the configured maximum when
//! absent and is rejected outside `1..=max`. The page number defaults to 1
//! and is rejected outside the result's page count, with one deliberate
//! exception: an empty result still has one page, so page 1 of nothing is a
//! valid, empty response rather than an error.

use vista_core::{Error, Limits, Result};

/// One page of a larger result
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The sliced items
    pub items: Vec<T>,
    /// One-based page number
    pub number: usize,
    /// Total page count, never zero
    pub pages: usize,
    /// Whether a previous page exists
    pub has_previous: bool,
    /// Whether a next page exists
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Transform the items, keeping the page frame
    pub fn try_map<U, F>(self, f: F) -> Result<Page<U>>
    where
        F: FnMut(T) -> Result<U>,
    {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>>>()?;
        Ok(Page {
            items,
            number: self.number,
            pages: self.pages,
            has_previous: self.has_previous,
            has_next: self.has_next,
        })
    }
}

/// Slice a full result into one page
///
/// # Errors
///
/// [`Error::InvalidLimit`] when the limit is zero or above the configured
/// maximum, [`Error::InvalidPage`] when the page number is zero or past the
/// last page.
pub fn paginate<T>(
    items: Vec<T>,
    limit: Option<usize>,
    number: Option<usize>,
    limits: &Limits,
) -> Result<Page<T>> {
    let limit = limits.validate_limit(limit)?;
    let total = items.len();
    let pages = ((total + limit - 1) / limit).max(1);

    let number = number.unwrap_or(1);
    if number == 0 || number > pages {
        return Err(Error::InvalidPage {
            actual: number,
            pages,
        });
    }

    let start = (number - 1) * limit;
    let items: Vec<T> = items.into_iter().skip(start).take(limit).collect();
    Ok(Page {
        items,
        number,
        pages,
        has_previous: number > 1,
        has_next: number < pages,
    })
}
