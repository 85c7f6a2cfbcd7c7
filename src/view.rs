//! Sorting and filtering of directory entries.
//!
//! [`view`] is a pure function from raw entries plus the user's search text
//! and sort choice to the ordered list that gets displayed. It runs on every
//! keystroke, so it borrows entries instead of cloning them.

use std::cmp::Ordering;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fs::Entry;

/// Column to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Size,
    ModifiedTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }

    /// Next state when the user clicks the `key` column header:
    /// none, ascending, descending, then back to none.
    pub fn toggle(current: Option<SortSpec>, key: SortKey) -> Option<SortSpec> {
        match current {
            Some(spec) if spec.key == key => match spec.direction {
                SortDirection::Ascending => Some(Self::descending(key)),
                SortDirection::Descending => None,
            },
            _ => Some(Self::ascending(key)),
        }
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        let ascending = match self.key {
            SortKey::Name => a.name.cmp(&b.name),
            // Directories have no size; `None` sorts before every file size.
            SortKey::Size => a.sort_size().cmp(&b.sort_size()),
            SortKey::ModifiedTime => a.modified_time.cmp(&b.modified_time),
        };
        match self.direction {
            SortDirection::Ascending => ascending,
            SortDirection::Descending => ascending.reverse(),
        }
    }
}

/// How the search text selects entries.
#[derive(Debug, Clone)]
pub enum SearchFilter {
    /// Empty search text: keep everything.
    All,
    /// Case-sensitive substring match.
    Substring(String),
    /// Search text of the form `/pattern/`.
    Pattern(Regex),
}

impl SearchFilter {
    /// Interpret search text. Text wrapped in slashes (and longer than the
    /// slashes alone) is compiled as a regular expression; if it does not
    /// compile it is matched literally.
    pub fn parse(search: &str) -> Self {
        if search.is_empty() {
            return SearchFilter::All;
        }
        if search.len() > 2 && search.starts_with('/') && search.ends_with('/') {
            if let Ok(re) = Regex::new(&search[1..search.len() - 1]) {
                return SearchFilter::Pattern(re);
            }
        }
        SearchFilter::Substring(search.to_string())
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            SearchFilter::All => true,
            SearchFilter::Substring(text) => name.contains(text.as_str()),
            SearchFilter::Pattern(re) => re.is_match(name),
        }
    }
}

/// Entries ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    pub entries: Vec<&'a Entry>,
    /// Number of entries hidden by the search filter
    pub ignored: usize,
}

/// Filter and order `entries`.
///
/// Without a sort spec directories come first, then files, each group by
/// name. With one, the whole filtered set is ordered by the chosen key.
/// Sorting is stable in both directions, so ties keep listing order.
pub fn view<'a>(entries: &'a [Entry], search: &str, sort: Option<SortSpec>) -> View<'a> {
    let filter = SearchFilter::parse(search);
    let mut kept: Vec<&Entry> = entries.iter().filter(|e| filter.matches(&e.name)).collect();
    let ignored = entries.len() - kept.len();

    match sort {
        None => kept.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.cmp(&b.name))
        }),
        Some(spec) => kept.sort_by(|a, b| spec.compare(a, b)),
    }

    View {
        entries: kept,
        ignored,
    }
}
