//! Catalog query builder
//!
//! Turns the storefront's filter form into the path + query string of one of
//! three endpoint families. Filtering and paging happen on the server; this
//! module only decides where to send the parameters.
//! E.g. keyword "soap" + minPrice 5 -> /products/public/search?keyword=soap&minPrice=5&page=0&size=12

use std::fmt;

use crate::config::DEFAULT_PAGE_SIZE;

pub const LIST_ALL_PATH: &str = "/products/public/all";
pub const FILTER_PATH: &str = "/products/public/filter";
pub const SEARCH_PATH: &str = "/products/public/search";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEndpoint {
    ListAll,
    Filter,
    Search,
}

impl CatalogEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            CatalogEndpoint::ListAll => LIST_ALL_PATH,
            CatalogEndpoint::Filter => FILTER_PATH,
            CatalogEndpoint::Search => SEARCH_PATH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub by: String,
    pub direction: SortDirection,
}

/// Storefront filter form. Text fields hold raw user input; they are trimmed
/// when the URL is built and dropped when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub store: Option<String>,
    pub eco_label: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_rating: Option<String>,
    pub page: u32,
    /// Must be positive; zero is sent as the default page size.
    pub page_size: u32,
    pub sort: Option<Sort>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            keyword: None,
            category: None,
            brand: None,
            store: None,
            eco_label: None,
            min_price: None,
            max_price: None,
            min_rating: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl FilterCriteria {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }

    fn keyword_value(&self) -> Option<&str> {
        present(&self.keyword)
    }

    /// Present optional filters (everything except keyword) in wire order.
    fn filter_params(&self) -> Vec<(&'static str, &str)> {
        [
            ("category", &self.category),
            ("brand", &self.brand),
            ("store", &self.store),
            ("ecoLabel", &self.eco_label),
            ("minPrice", &self.min_price),
            ("maxPrice", &self.max_price),
            ("minRating", &self.min_rating),
        ]
        .into_iter()
        .filter_map(|(name, value)| present(value).map(|v| (name, v)))
        .collect()
    }

    /// Which endpoint family these criteria go to. Keyword wins over filters.
    pub fn endpoint(&self) -> CatalogEndpoint {
        if self.keyword_value().is_some() {
            CatalogEndpoint::Search
        } else if !self.filter_params().is_empty() {
            CatalogEndpoint::Filter
        } else {
            CatalogEndpoint::ListAll
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Path and query string for a catalog listing. Pure and deterministic.
pub fn build_list_url(criteria: &FilterCriteria) -> String {
    let endpoint = criteria.endpoint();
    let mut query = form_urlencoded::Serializer::new(String::new());

    if endpoint != CatalogEndpoint::ListAll {
        if let Some(keyword) = criteria.keyword_value() {
            query.append_pair("keyword", keyword);
        }
        for (name, value) in criteria.filter_params() {
            query.append_pair(name, value);
        }
    }

    let size = if criteria.page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        criteria.page_size
    };
    query.append_pair("page", &criteria.page.to_string());
    query.append_pair("size", &size.to_string());

    if let Some(sort) = &criteria.sort {
        if !sort.by.trim().is_empty() {
            query.append_pair("sortBy", sort.by.trim());
            query.append_pair("sortDir", &sort.direction.to_string());
        }
    }

    format!("{}?{}", endpoint.path(), query.finish())
}
