use select::document::Document;
use select::predicate::{Class, Name, Predicate};

/// One facility entry on a search-result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityLink {
    pub name: String,
    pub url: String,
}

/// Facility entries in document order.
pub fn extract_links(document: &Document) -> Vec<FacilityLink> {
    document
        .find(Name("div").and(Class("qf-search-record")))
        .filter_map(|record| {
            let anchor = record.find(Name("a")).next()?;
            let url = anchor.attr("href")?;
            Some(FacilityLink {
                name: anchor.text().trim().to_owned(),
                url: url.to_owned(),
            })
        })
        .collect()
}
