#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ltc_facility_scraper::{Page, PageSource, Target};

/// Serves canned pages and remembers what was asked for.
///
/// Partition queries are keyed as `partition:<id>`; anything not registered
/// comes back as `Page::NotAvailable`.
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    log: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partition(mut self, id: u32, html: impl Into<String>) -> Self {
        self.pages.insert(format!("partition:{}", id), html.into());
        self
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_owned(), html.into());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for FakeSite {
    async fn fetch(&self, target: Target<'_>) -> Page {
        let key = match target {
            Target::Partition(p) => format!("partition:{}", p.id),
            Target::Url(url) => url.to_owned(),
        };
        self.log.lock().unwrap().push(key.clone());
        match self.pages.get(&key) {
            Some(html) => Page::Text(html.clone()),
            None => Page::NotAvailable,
        }
    }
}

pub fn listing_page(facilities: &[(&str, &str)], pagination: Option<&str>) -> String {
    let mut html = String::from("<html><body>");
    for (name, url) in facilities {
        html.push_str(&format!(
            r#"<div class="col-md-12 qf-search-record"><h4><a href="{url}">{name}</a></h4></div>"#
        ));
    }
    if let Some(items) = pagination {
        html.push_str(&format!(r#"<ul class="pagination">{items}</ul>"#));
    }
    html.push_str("</body></html>");
    html
}

pub fn detail_page(
    name: &str,
    general: &[(&str, &str)],
    beds: &[(&str, &str)],
    rooms: &[(&str, &str)],
    link: &str,
) -> String {
    let rows = |pairs: &[(&str, &str)]| -> String {
        pairs
            .iter()
            .map(|(l, v)| format!("<tr><td>{l}</td><td>{v}</td></tr>"))
            .collect()
    };
    // The general table body opens with a single icon cell.
    let general_rows = format!(r#"<tr><td><span class="icon"></span></td></tr>{}"#, rows(general));
    format!(
        r#"<html><body>
        <table class="table table-bordered">
          <tr><th>Name</th><th>{name}</th></tr>
          {general_rows}
        </table>
        <table class="table table-bordered qf-table-beds">{beds}</table>
        <table class="table table-bordered qf-table-rooms">{rooms}</table>
        <table class="table"><tr><th>Link to web page</th></tr><tr><td><a href="{link}">web</a></td></tr></table>
        </body></html>"#,
        beds = rows(beds),
        rooms = rows(rooms),
    )
}
