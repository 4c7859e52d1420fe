use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Name, Predicate};

use crate::error::{Result, ScrapeError};
use crate::fetch::{PageSource, Target};

pub const LINK_LABEL: &str = "Link to web page";

const GENERAL_TABLE: &str = "table table-bordered";
const BEDS_TABLE: &str = "table table-bordered qf-table-beds";
const ROOMS_TABLE: &str = "table table-bordered qf-table-rooms";

/// Ordered `(label, value)` pairs harvested from one detail page.
pub type FieldRecord = Vec<(String, String)>;

/// How a table's `td` cells pair up into labels and values.
///
/// Labels sit at `offset`, `offset + stride`, ...; each value is the cell
/// right after its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingRule {
    pub offset: usize,
    pub stride: usize,
}

impl PairingRule {
    /// The general table's cells open with a single icon cell.
    pub const GENERAL: PairingRule = PairingRule { offset: 1, stride: 2 };
    pub const COUNTS: PairingRule = PairingRule { offset: 0, stride: 2 };

    pub fn pair(&self, cells: &[String]) -> Vec<(String, String)> {
        let stride = self.stride.max(1);
        cells
            .iter()
            .skip(self.offset)
            .step_by(stride)
            .zip(cells.iter().skip(self.offset + 1).step_by(stride))
            .map(|(label, value)| (label.clone(), value.clone()))
            .collect()
    }
}

fn enclosing_table<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.name() == Some("table") {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// Text of the table's own `td` cells; cells of nested tables are left out.
fn cell_texts(table: &Node) -> Vec<String> {
    table
        .find(Name("td"))
        .filter(|td| enclosing_table(td).map(|t| t.index()) == Some(table.index()))
        .map(|td| td.text().trim().to_owned())
        .collect()
}

fn table_with_class<'a>(document: &'a Document, class: &'static str, url: &str) -> Result<Node<'a>> {
    document
        .find(Name("table").and(Attr("class", class)))
        .next()
        .ok_or_else(|| ScrapeError::missing(class, url))
}

/// Parses an already fetched detail page. `url` only labels errors.
pub fn parse_detail(document: &Document, url: &str) -> Result<FieldRecord> {
    let general = table_with_class(document, GENERAL_TABLE, url)?;
    let beds = table_with_class(document, BEDS_TABLE, url)?;
    let rooms = table_with_class(document, ROOMS_TABLE, url)?;

    let mut headers = general.find(Name("th")).map(|th| th.text().trim().to_owned());
    let header = match (headers.next(), headers.next()) {
        (Some(label), Some(value)) => (label, value),
        _ => return Err(ScrapeError::missing("general table header", url)),
    };

    let link_table = document
        .find(Name("table"))
        .find(|table| {
            table
                .find(Name("th"))
                .next()
                .is_some_and(|th| th.text().trim() == LINK_LABEL)
        })
        .ok_or_else(|| ScrapeError::missing("web page link table", url))?;
    let href = link_table
        .find(Name("td"))
        .next()
        .and_then(|td| td.find(Name("a")).next())
        .and_then(|a| a.attr("href"))
        .ok_or_else(|| ScrapeError::missing("web page link", url))?;

    let mut record = vec![header];
    record.extend(PairingRule::GENERAL.pair(&cell_texts(&general)));
    record.extend(PairingRule::COUNTS.pair(&cell_texts(&beds)));
    record.extend(PairingRule::COUNTS.pair(&cell_texts(&rooms)));
    record.push((LINK_LABEL.to_owned(), href.to_owned()));
    Ok(record)
}

/// Fetches and parses one facility's detail page.
pub async fn parse_facility<S>(source: &S, url: &str) -> Result<FieldRecord>
where
    S: PageSource + ?Sized,
{
    let page = source.fetch(Target::Url(url)).await;
    if !page.is_available() {
        return Err(ScrapeError::PageUnavailable(url.to_owned()));
    }
    parse_detail(&Document::from(page.markup()), url)
}
