use std::collections::HashSet;

use select::document::Document;
use select::node::Node;
use select::predicate::{Class, Name, Predicate};
use tracing::{debug, info};

use crate::config::Partition;
use crate::fetch::{PageSource, Target};
use crate::listing::{extract_links, FacilityLink};
use crate::LOG_TARGET;

/// One `li` of the pagination control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageItem {
    /// Current or disabled entry; the site marks these with a class.
    Active,
    /// Truncation marker, or an entry without a usable link.
    Ellipsis,
    Numbered { number: u32, href: String },
    /// "Previous", "Next", "First", "Last" and similar.
    PrevNext,
}

impl PageItem {
    pub fn classify(item: &Node) -> Self {
        if item.attr("class").is_some() {
            return PageItem::Active;
        }
        let Some(anchor) = item.find(Name("a")).next() else {
            return PageItem::Ellipsis;
        };

        let text = anchor.text();
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            return match (digits.parse(), anchor.attr("href")) {
                (Ok(number), Some(href)) => PageItem::Numbered {
                    number,
                    href: href.to_owned(),
                },
                _ => PageItem::Ellipsis,
            };
        }

        match text.trim() {
            "" | "…" | "..." => PageItem::Ellipsis,
            _ => PageItem::PrevNext,
        }
    }
}

/// Links to the other result pages, in document order, without repeats.
///
/// Returns an empty list when the page has no pagination control.
pub fn page_links(document: &Document) -> Vec<String> {
    let Some(control) = document.find(Name("ul").and(Class("pagination"))).next() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    control
        .find(Name("li"))
        .filter_map(|li| match PageItem::classify(&li) {
            PageItem::Numbered { href, .. } => Some(href),
            _ => None,
        })
        .filter(|href| seen.insert(href.clone()))
        .collect()
}

/// Every facility listed for `partition`, across all result pages.
pub async fn collect_all_listings<S>(source: &S, partition: &Partition) -> Vec<FacilityLink>
where
    S: PageSource + ?Sized,
{
    let first = source.fetch(Target::Partition(partition)).await;
    let (mut listings, pages) = {
        let document = Document::from(first.markup());
        (extract_links(&document), page_links(&document))
    };

    if pages.is_empty() {
        info!(target: LOG_TARGET, "{}: single result page", partition.name);
    } else {
        info!(
            target: LOG_TARGET,
            "{}: {} more result pages",
            partition.name,
            pages.len()
        );
    }

    for href in &pages {
        let page = source.fetch(Target::Url(href)).await;
        let document = Document::from(page.markup());
        listings.extend(extract_links(&document));
    }

    let mut seen = HashSet::new();
    listings.retain(|link| {
        let fresh = seen.insert(link.url.clone());
        if !fresh {
            debug!(target: LOG_TARGET, "Dropping repeated listing {}", link.url);
        }
        fresh
    });

    info!(
        target: LOG_TARGET,
        "{}: {} facilities listed",
        partition.name,
        listings.len()
    );
    listings
}
