//! Paginated link discovery
//!
//! Walks the catalog's listing pages via the "next page" control and
//! collects every detail-page link in page-major, document order. Runs
//! once per manufacturer; the resulting universe is persisted and reused
//! on every later run.

use crate::config::DelayRange;
use crate::crawler::fetcher::{FetchError, FetchSession};
use crate::crawler::sleep_jitter;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Selector for catalog-item anchors on a listing page
const CATALOG_ITEM_SELECTOR: &str = "div.makers ul li a";

/// Selector for the next-page control
const NEXT_PAGE_SELECTOR: &str = r#"a.prevnextbutton[title="Next page"]"#;

/// Errors that abort the discovery phase
///
/// Discovery is not retried per page: a failure here aborts the phase, and
/// the orchestrator re-runs it from scratch on the next invocation if no
/// universe was persisted.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid listing URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Failed to fetch listing page {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("Cannot resolve href {href:?} on {page}: {source}")]
    Resolve {
        href: String,
        page: String,
        source: url::ParseError,
    },
}

/// Discovers all detail-page links reachable from `start_url`
///
/// Visits at most `max_pages` listing pages when a bound is given, stops
/// when the next-page control disappears or a page yields no catalog
/// items, and sleeps a random delay from `page_delay` between page
/// transitions.
pub async fn discover(
    session: &dyn FetchSession,
    start_url: &str,
    max_pages: Option<u32>,
    page_delay: DelayRange,
) -> Result<Vec<String>, DiscoveryError> {
    let mut current = Url::parse(start_url).map_err(|source| DiscoveryError::InvalidUrl {
        url: start_url.to_string(),
        source,
    })?;

    let mut all_links = Vec::new();
    let mut page_number: u32 = 1;

    loop {
        if let Some(bound) = max_pages {
            if page_number > bound {
                break;
            }
        }

        tracing::info!("Extracting links from listing page {}", page_number);
        let html = session
            .fetch(current.as_str())
            .await
            .map_err(|source| DiscoveryError::Fetch {
                url: current.to_string(),
                source,
            })?;

        let listing = parse_listing(&html);
        if listing.item_hrefs.is_empty() {
            tracing::info!("Listing page {} yielded no catalog items, stopping", page_number);
            break;
        }

        for href in listing.item_hrefs {
            let absolute = current
                .join(&href)
                .map_err(|source| DiscoveryError::Resolve {
                    href,
                    page: current.to_string(),
                    source,
                })?;
            all_links.push(absolute.to_string());
        }

        let Some(next_href) = listing.next_href else {
            break;
        };

        let next = current
            .join(&next_href)
            .map_err(|source| DiscoveryError::Resolve {
                href: next_href,
                page: current.to_string(),
                source,
            })?;

        tracing::info!("Navigating to next listing page: {}", next);
        current = next;
        page_number += 1;

        sleep_jitter(page_delay).await;
    }

    Ok(all_links)
}

struct Listing {
    item_hrefs: Vec<String>,
    next_href: Option<String>,
}

/// Pulls catalog-item hrefs and the next-page href out of a listing page
fn parse_listing(html: &str) -> Listing {
    let document = Html::parse_document(html);

    let mut item_hrefs = Vec::new();
    if let Ok(selector) = Selector::parse(CATALOG_ITEM_SELECTOR) {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                item_hrefs.push(href.to_string());
            }
        }
    }

    let next_href = Selector::parse(NEXT_PAGE_SELECTOR)
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .map(String::from)
        });

    Listing {
        item_hrefs,
        next_href,
    }
}
