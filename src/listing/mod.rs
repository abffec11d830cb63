pub mod debounce;
pub mod filter;

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::api::{ApiError, CustomerPage, CustomerRecord, ListQuery, PageInfo};
pub use debounce::{Debounce, DEFAULT_DEBOUNCE};
pub use filter::{Filter, PageSize};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListError {
    #[error("page {page} is out of range (1..={last_page})")]
    PageOutOfRange { page: u32, last_page: u32 },
}

/// A fetch the controller wants issued. `generation` identifies it when the
/// result comes back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: ListQuery,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Applied,
    Stale,
    Failed(ApiError),
}

/// State of the paginated customer list: filter, current window, expanded rows,
/// and the debounce timer for typed search input.
///
/// The controller never performs I/O. Operations that need data return a
/// `FetchTicket`; the caller runs the request and hands the result back through
/// `complete`. Only the most recent ticket is ever applied.
#[derive(Debug)]
pub struct ListController {
    filter: Filter,
    default_page_size: PageSize,
    records: Vec<CustomerRecord>,
    meta: Option<PageInfo>,
    expanded: HashSet<u64>,
    debounce: Debounce,
    generation: u64,
    in_flight: Option<u64>,
}

impl Default for ListController {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, PageSize::default())
    }
}

impl ListController {
    pub fn new(debounce: Duration, page_size: PageSize) -> Self {
        Self {
            filter: Filter::with_page_size(page_size),
            default_page_size: page_size,
            records: Vec::new(),
            meta: None,
            expanded: HashSet::new(),
            debounce: Debounce::new(debounce),
            generation: 0,
            in_flight: None,
        }
    }

    /// Starts from a prepared filter instead of the first page of everything.
    pub fn with_filter(debounce: Duration, filter: Filter) -> Self {
        let mut list = Self::new(debounce, filter.page_size);
        list.filter = filter;
        list
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn meta(&self) -> Option<&PageInfo> {
        self.meta.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_expanded(&self, id: u64) -> bool {
        self.expanded.contains(&id)
    }

    /// Drops a pending typed search without sending it.
    pub fn cancel_debounce(&mut self) {
        self.debounce.cancel();
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn set_phone_substring(&mut self, value: impl Into<String>, now: Instant) {
        self.filter.phone_substring = value.into();
        self.debounce.arm(now);
    }

    pub fn set_name_substring(&mut self, value: impl Into<String>, now: Instant) {
        self.filter.name_substring = value.into();
        self.debounce.arm(now);
    }

    /// Issues the settled search once the typing pause has elapsed.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<FetchTicket> {
        if !self.debounce.fire(now) {
            return None;
        }
        self.filter.set_page(1);
        Some(self.fetch_page())
    }

    pub fn submit_search(&mut self) -> FetchTicket {
        self.debounce.cancel();
        self.filter.set_page(1);
        self.fetch_page()
    }

    pub fn clear_search(&mut self) -> FetchTicket {
        self.filter.phone_substring.clear();
        self.filter.name_substring.clear();
        self.submit_search()
    }

    pub fn set_page_size(&mut self, size: PageSize) -> Option<FetchTicket> {
        if size == self.filter.page_size {
            return None;
        }
        self.filter.page_size = size;
        self.filter.set_page(1);
        Some(self.fetch_page())
    }

    pub fn go_to_page(&mut self, page: u32) -> Result<Option<FetchTicket>, ListError> {
        if page == self.filter.page() {
            return Ok(None);
        }
        let last_page = self.last_page();
        if page < 1 || last_page.is_some_and(|last| page > last) {
            return Err(ListError::PageOutOfRange {
                page,
                last_page: last_page.unwrap_or(1),
            });
        }
        self.filter.set_page(page);
        Ok(Some(self.fetch_page()))
    }

    pub fn can_go_prev(&self) -> bool {
        self.filter.page() > 1
    }

    pub fn can_go_next(&self) -> bool {
        match self.last_page() {
            Some(last) => self.filter.page() < last,
            None => false,
        }
    }

    pub fn prev_page(&mut self) -> Option<FetchTicket> {
        if !self.can_go_prev() {
            return None;
        }
        self.go_to_page(self.filter.page() - 1).ok().flatten()
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        if !self.can_go_next() {
            return None;
        }
        self.go_to_page(self.filter.page() + 1).ok().flatten()
    }

    /// One pager control per page of the current result set.
    pub fn page_numbers(&self) -> RangeInclusive<u32> {
        match self.last_page() {
            Some(last) => 1..=last,
            #[allow(clippy::reversed_empty_ranges)]
            None => 1..=0,
        }
    }

    /// Returns whether the row is expanded after the toggle.
    pub fn toggle_expanded(&mut self, id: u64) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    /// Starts a fetch for the current filter, superseding any fetch in flight.
    pub fn fetch_page(&mut self) -> FetchTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        FetchTicket {
            generation: self.generation,
            query: self.filter.to_query(),
        }
    }

    /// Forgets a ticket that was never sent (for example, no session).
    pub fn abandon(&mut self, ticket: &FetchTicket) {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }
    }

    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<CustomerPage, ApiError>,
    ) -> FetchOutcome {
        if generation != self.generation {
            return FetchOutcome::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(page) => {
                self.records = page.data;
                self.meta = Some(page.meta);
                FetchOutcome::Applied
            }
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    /// Drops everything tied to the ended session; results still in flight
    /// become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.records.clear();
        self.meta = None;
        self.expanded.clear();
        self.debounce.cancel();
        self.filter = Filter::with_page_size(self.default_page_size);
    }

    fn last_page(&self) -> Option<u32> {
        self.meta.map(|m| m.last_page.max(1))
    }
}
