use thiserror::Error;

// ###############################################
// ################## PAGINATION #################
// ###############################################

/// Page computed from the `from`/`size` query parameters.
///
/// `from` is the index of the first element to return and `size` the page
/// size; the page number is `from / size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("from and size cannot be negative")]
    NegativeRange,
    #[error("a page size of zero selects nothing")]
    EmptyRange,
}

impl Page {
    /// Builds an optional page from query parameters.
    ///
    /// Paging applies only when both `from` and `size` are supplied; a single
    /// parameter is ignored and the result set stays unpaged.
    ///
    /// # Errors
    /// * [PageError::NegativeRange] - If either parameter is negative.
    /// * [PageError::EmptyRange] - If `size` is zero.
    pub fn from_query(from: Option<i64>, size: Option<i64>) -> Result<Option<Page>, PageError> {
        let (from, size) = match (from, size) {
            (Some(from), Some(size)) => (from, size),
            _ => return Ok(None),
        };
        if from < 0 || size < 0 {
            return Err(PageError::NegativeRange);
        }
        if size == 0 {
            return Err(PageError::EmptyRange);
        }
        Ok(Some(Page {
            number: from / size,
            size,
        }))
    }

    /// Truncates `records` to this page.
    pub fn apply<T>(&self, records: Vec<T>) -> Vec<T> {
        records
            .into_iter()
            .skip((self.number * self.size) as usize)
            .take(self.size as usize)
            .collect()
    }
}

/// Applies an optional page, returning the full set when no page is given.
pub fn paged<T>(records: Vec<T>, page: Option<Page>) -> Vec<T> {
    match page {
        Some(page) => page.apply(records),
        None => records,
    }
}
