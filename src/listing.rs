//! Listing

use std::cmp::Ordering;

use jiff::Timestamp;
use rust_decimal::Decimal;
use smallvec::SmallVec;

/// A collection entry the listing engine can filter, search and sort.
pub trait Listable {
    /// Facet the collection can be narrowed by.
    type Filter;

    /// Sortable column identifier.
    type SortKey: Copy;

    /// Whether the entry matches a facet filter.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Whether the entry appears in views at all. Soft-removed entries
    /// return false.
    fn visible_by_default(&self) -> bool {
        true
    }

    /// Creation instant used by the date-range filter.
    fn created(&self) -> Option<Timestamp>;

    /// Fields the search term is matched against.
    fn search_text(&self) -> SmallVec<[String; 3]>;

    /// Value of the given sortable column.
    fn sort_value(&self, key: Self::SortKey) -> SortValue;
}

/// A comparable column value.
///
/// Missing nested values resolve to the identity for their column: empty
/// text, zero, or the earliest instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortValue {
    /// Textual column.
    Text(String),

    /// Numeric column.
    Number(Decimal),

    /// Instant column; `None` sorts before every real instant.
    Instant(Option<Timestamp>),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Text(_) => 0,
            SortValue::Number(_) => 1,
            SortValue::Instant(_) => 2,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.cmp(b),
            (SortValue::Instant(a), SortValue::Instant(b)) => a.cmp(b),
            // A sort key always yields a single variant; mixed pairs only
            // need a deterministic order.
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest value first.
    Ascending,

    /// Largest value first.
    Descending,
}

/// Inclusive creation-date bounds; an absent bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub start: Option<Timestamp>,

    /// Inclusive upper bound.
    pub end: Option<Timestamp>,
}

impl DateRange {
    /// Whether an entry created at `at` falls inside the range.
    ///
    /// A missing instant counts as the earliest possible one, so it only
    /// passes when there is no lower bound.
    #[must_use]
    pub fn contains(&self, at: Option<Timestamp>) -> bool {
        let at = at.unwrap_or(Timestamp::MIN);

        self.start.is_none_or(|start| start <= at) && self.end.is_none_or(|end| at <= end)
    }
}

/// The immutable parameters of one listing view.
#[derive(Debug, Clone)]
pub struct ViewParams<F, K> {
    /// Case-insensitive substring matched against the entry's text fields.
    pub search: Option<String>,

    /// Facet filter; `None` means "all".
    pub filter: Option<F>,

    /// Creation-date bounds.
    pub dates: DateRange,

    /// Column to sort by.
    pub sort_key: K,

    /// Sort direction.
    pub direction: SortDirection,

    /// 1-based page number.
    pub page: usize,

    /// Entries per page.
    pub page_size: usize,
}

/// The visible slice of a filtered collection.
#[derive(Debug)]
pub struct View<'a, L> {
    /// Entries on the requested page, in sorted order.
    pub visible: Vec<&'a L>,

    /// Total pages in the filtered collection.
    pub total_pages: usize,
}

/// Produces the visible slice of a collection for one set of parameters.
///
/// The pipeline is fixed: facet filter, inclusive date range, search,
/// stable sort (ties keep collection order), then the page slice.
#[must_use]
pub fn view<'a, L: Listable>(
    collection: &'a [L],
    params: &ViewParams<L::Filter, L::SortKey>,
) -> View<'a, L> {
    if params.page_size == 0 {
        return View {
            visible: Vec::new(),
            total_pages: 0,
        };
    }

    let needle = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<&L> = collection
        .iter()
        .filter(|entry| entry.visible_by_default())
        .filter(|entry| params.filter.as_ref().is_none_or(|facet| entry.matches(facet)))
        .filter(|entry| params.dates.contains(entry.created()))
        .filter(|entry| {
            needle.as_deref().is_none_or(|needle| {
                entry
                    .search_text()
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle))
            })
        })
        .collect();

    filtered.sort_by(|a, b| {
        let ordering = a
            .sort_value(params.sort_key)
            .cmp(&b.sort_value(params.sort_key));

        match params.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    let total_pages = filtered.len().div_ceil(params.page_size);
    let skipped = (params.page.max(1) - 1) * params.page_size;

    View {
        visible: filtered
            .into_iter()
            .skip(skipped)
            .take(params.page_size)
            .collect(),
        total_pages,
    }
}
