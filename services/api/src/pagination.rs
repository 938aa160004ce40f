//! Query-side presentation: record filters and offset pagination.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vitibrasil_parser::{LabelKind, Record};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    pub fn from_env() -> Self {
        let var = |key: &str, default: usize| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        Self {
            default_page_size: var("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            max_page_size: var("MAX_PAGE_SIZE", MAX_PAGE_SIZE),
        }
    }
}

/// Numeric parameters arrive as raw strings: a blank or malformed value
/// (`?page=` or `?ano=abc`) is ignored rather than rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub ano: Option<String>,
    pub produto: Option<String>,
    pub cultivar: Option<String>,
    pub pais: Option<String>,
}

fn lenient<T: FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

impl ListQuery {
    /// Page number >= 1 and page size clamped to `[1, max_page_size]`.
    pub fn page_params(&self, limits: &PageLimits) -> (usize, usize) {
        let page = lenient::<i64>(&self.page).unwrap_or(1).max(1) as usize;
        let per_page = lenient::<i64>(&self.per_page)
            .unwrap_or(limits.default_page_size as i64)
            .min(limits.max_page_size as i64)
            .max(1) as usize;
        (page, per_page)
    }

    /// Exact match on year, case-insensitive substring match on the label.
    /// A label filter only matches records carrying that kind of label.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(ano) = lenient::<i32>(&self.ano) {
            if record.ano != ano {
                return false;
            }
        }

        let label_filters = [
            (LabelKind::Produto, &self.produto),
            (LabelKind::Cultivar, &self.cultivar),
            (LabelKind::Pais, &self.pais),
        ];
        label_filters.iter().all(|(kind, needle)| match needle {
            Some(needle) if !needle.is_empty() => {
                record.label.kind() == *kind
                    && record
                        .label
                        .as_str()
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
            }
            _ => true,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let total = items.len();
    let pages = total.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page);

    let data = items.into_iter().skip(start).take(per_page).collect();

    Page {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            pages,
            has_prev: page > 1,
            has_next: page < pages,
        },
    }
}
