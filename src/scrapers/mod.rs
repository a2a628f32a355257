//! Site-specific page parsing.
//!
//! A scraper module knows the markup of one job site and exposes two pure
//! functions over a fetched body:
//!
//! - `count_pages(body)`: how many result pages the first page advertises
//! - `extract_page(body)`: the [`Record`](crate::models::Record)s on a page
//!
//! | Site | Module | Cards | Pagination |
//! |------|--------|-------|------------|
//! | Saramin | [`saramin`] | `.item_recruit` | links in `.pagination` |

pub mod saramin;
