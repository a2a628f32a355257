//! Saramin recruit-search result pages.
//!
//! Each result page lists job cards matching `.item_recruit`. The card's
//! `value` attribute is the listing id; the remaining fields live in nested
//! elements. The page count comes from the links inside `.pagination`.
//!
//! Everything here is synchronous and works on an already-fetched body:
//! a parsed [`Html`] document is not `Send`, so it must never be held across
//! an await point.

use crate::models::{PageIndex, Record};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

static CARD: Lazy<Selector> = Lazy::new(|| selector(".item_recruit"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector(".job_tit>a"));
static LOCATION: Lazy<Selector> = Lazy::new(|| selector(".job_condition>span>a"));
static COMPANY: Lazy<Selector> = Lazy::new(|| selector(".area_corp>strong>a"));
static CONDITION: Lazy<Selector> = Lazy::new(|| selector(".job_condition>span"));
static EXPIRE_DATE: Lazy<Selector> = Lazy::new(|| selector(".job_date>span"));
static PAGINATION: Lazy<Selector> = Lazy::new(|| selector(".pagination"));
static PAGE_LINK: Lazy<Selector> = Lazy::new(|| selector("a"));

/// Text of every element under `card` matching `sel`, space-separated.
/// Empty when nothing matches.
fn field_text(card: &ElementRef<'_>, sel: &Selector) -> String {
    card.select(sel)
        .map(|el| el.text().collect::<String>())
        .join(" ")
}

/// Turn one result card into a [`Record`].
///
/// Missing elements yield empty fields rather than errors.
pub fn extract_record(card: &ElementRef<'_>) -> Record {
    Record::new(
        card.value().attr("value").unwrap_or_default(),
        &field_text(card, &TITLE),
        &field_text(card, &LOCATION),
        &field_text(card, &COMPANY),
        &field_text(card, &CONDITION),
        &field_text(card, &EXPIRE_DATE),
    )
}

/// Every record on a result page, in card order.
pub fn extract_page(body: &str) -> Vec<Record> {
    let document = Html::parse_document(body);
    let records: Vec<Record> = document.select(&CARD).map(|c| extract_record(&c)).collect();
    debug!(count = records.len(), "Extracted cards");
    records
}

/// Number of pages advertised by the first result page.
///
/// Counts the links inside the last pagination control on the page. A
/// result set small enough to have no pagination control (or an empty one)
/// is a single page.
pub fn count_pages(body: &str) -> u32 {
    let document = Html::parse_document(body);
    let links = document
        .select(&PAGINATION)
        .last()
        .map(|p| p.select(&PAGE_LINK).count())
        .unwrap_or(0);
    let pages = u32::try_from(links).unwrap_or(u32::MAX);
    pages.max(PageIndex::FIRST.get())
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal HTML in the shape of a Saramin result page.

    /// One card with fields derived from `id`.
    pub fn card(id: &str) -> String {
        format!(
            r#"<div class="item_recruit" value="{id}">
                 <div class="area_corp"><strong class="corp_name"><a href="/c">  Company {id} </a></strong></div>
                 <div class="area_job">
                   <h2 class="job_tit"><a href="/j" title="t">Job
                      {id}</a></h2>
                   <div class="job_date"><span class="date">~ 12/31(Wed)</span></div>
                   <div class="job_condition">
                     <span><a href="/l">Seoul</a> <a href="/l2">Gangnam</a></span>
                     <span>3 years</span>
                   </div>
                 </div>
               </div>"#
        )
    }

    /// A result page with the given card ids and `links` pagination links.
    /// `links == None` omits the pagination control entirely.
    pub fn page(ids: &[String], links: Option<usize>) -> String {
        let cards: String = ids.iter().map(|id| card(id)).collect();
        let pagination = links
            .map(|n| {
                let anchors: String = (1..=n)
                    .map(|i| format!(r#"<a href="?recruitPage={i}">{i}</a>"#))
                    .collect();
                format!(r#"<div class="pagination">{anchors}</div>"#)
            })
            .unwrap_or_default();
        format!(
            r#"<!DOCTYPE html><html><body><div class="content">{cards}</div>{pagination}</body></html>"#
        )
    }
}
