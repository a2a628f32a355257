//! Data models for extracted job listings.
//!
//! - [`Record`]: one normalized job listing pulled from a result card
//! - [`PageIndex`]: a 1-based page number as the site paginates it
//! - [`RunSummary`]: what a finished run did

use crate::utils::normalize_whitespace;
use std::fmt;
use std::time::Duration;

/// A single job listing as extracted from one result card.
///
/// All text fields are whitespace-normalized on construction through
/// [`Record::new`]: no leading or trailing whitespace, no embedded newlines,
/// internal runs collapsed to one space. Any field may be empty when the
/// card did not carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Site-assigned listing identifier, used to build the detail-page URL.
    pub id: String,
    /// Job title.
    pub title: String,
    /// Work location.
    pub location: String,
    /// Hiring company.
    pub company: String,
    /// Employment conditions (experience, education, contract type, ...).
    pub condition: String,
    /// Application deadline as the site displays it.
    pub expire_date: String,
}

impl Record {
    /// Build a record from raw field text, normalizing every field.
    pub fn new(
        id: &str,
        title: &str,
        location: &str,
        company: &str,
        condition: &str,
        expire_date: &str,
    ) -> Self {
        Self {
            id: normalize_whitespace(id),
            title: normalize_whitespace(title),
            location: normalize_whitespace(location),
            company: normalize_whitespace(company),
            condition: normalize_whitespace(condition),
            expire_date: normalize_whitespace(expire_date),
        }
    }

    /// Full detail-page URL for this listing.
    pub fn detail_url(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.id)
    }
}

/// Site-relative page number. Always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageIndex(u32);

impl PageIndex {
    /// The first page of any result set.
    pub const FIRST: PageIndex = PageIndex(1);

    /// Returns `None` for zero, which is not a valid page.
    pub fn new(n: u32) -> Option<Self> {
        (n >= 1).then_some(PageIndex(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Pages `1..=total` in ascending order.
    pub fn range(total: u32) -> impl Iterator<Item = PageIndex> {
        (1..=total).filter_map(PageIndex::new)
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Pages discovered (and dispatched).
    pub pages: u32,
    /// Rows written to the output, excluding the header.
    pub records: u64,
    /// Pages that failed and were skipped. Always empty under the abort policy.
    pub failed_pages: Vec<PageIndex>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}
