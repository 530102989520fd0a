//! Property list view state: applied filter, page, cached records.
//!
//! Every parameter change hands out a [`FetchTicket`]. Only the most recent
//! ticket's response is applied; older responses are dropped on arrival, so
//! out-of-order replies never overwrite newer results.
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, ListQuery, ListResponse, PropertyApi};
use crate::config::Config;
use crate::filter::{FilterCriteria, FilterState};
use crate::model::PropertyRecord;
use crate::pagination::PageState;

/// Tag for one issued list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    query: ListQuery,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// What `apply` did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Records replaced.
    Loaded { count: usize, total: Option<u64> },
    /// The new total no longer covers the requested page. The index was
    /// clamped to the last page and the cached records belong to the old one;
    /// `refetch` requests the clamped page.
    PageClamped { total: u64, refetch: FetchTicket },
    /// Unexpected response shape; cache emptied.
    Cleared,
    /// Request failed; cache untouched, message surfaced.
    Failed(String),
    /// Superseded by a later request; ignored.
    Stale,
}

#[derive(Debug)]
pub struct PropertyList {
    filter: FilterState,
    pages: PageState,
    records: Vec<PropertyRecord>,
    error: Option<String>,
    latest_seq: u64,
    loading: bool,
}

impl PropertyList {
    pub fn new(page_size: u32) -> Self {
        Self {
            filter: FilterState::new(),
            pages: PageState::new(page_size),
            records: Vec::new(),
            error: None,
            latest_seq: 0,
            loading: false,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.listing.page_size)
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn pages(&self) -> &PageState {
        &self.pages
    }

    /// Last surfaced request error, cleared when the next request starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The query the visible list should reflect.
    pub fn current_query(&self) -> ListQuery {
        ListQuery {
            page: self.pages.page_index(),
            page_size: self.pages.page_size(),
            filter: self.filter.applied().clone(),
        }
    }

    /// Edit the draft filter. The list is not refetched.
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut FilterCriteria)) {
        self.filter.update_draft(edit);
    }

    pub fn toggle_amenity(&mut self, name: &str) {
        self.filter.toggle_amenity(name);
    }

    /// Tag a request for the current parameters. Supersedes earlier tickets.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_seq += 1;
        self.loading = true;
        self.error = None;
        let ticket = FetchTicket {
            seq: self.latest_seq,
            query: self.current_query(),
        };
        debug!(seq = ticket.seq, page = ticket.query.page, "list fetch issued");
        ticket
    }

    /// Reconcile a response with the cache if it belongs to the latest ticket.
    pub fn apply(
        &mut self,
        ticket: &FetchTicket,
        result: Result<ListResponse, ApiError>,
    ) -> Applied {
        if ticket.seq != self.latest_seq {
            debug!(seq = ticket.seq, latest = self.latest_seq, "dropping stale list response");
            return Applied::Stale;
        }
        self.loading = false;

        match result {
            Ok(ListResponse::Page(records)) => {
                self.records = records;
                self.pages.set_total(None);
                Applied::Loaded {
                    count: self.records.len(),
                    total: None,
                }
            }
            Ok(ListResponse::Envelope { records, total }) => {
                self.records = records;
                if self.pages.set_total(Some(total)) {
                    debug!(
                        requested = ticket.query.page,
                        page = self.pages.page_index(),
                        total,
                        "page beyond new total; refetching last page"
                    );
                    return Applied::PageClamped {
                        total,
                        refetch: self.begin_fetch(),
                    };
                }
                Applied::Loaded {
                    count: self.records.len(),
                    total: Some(total),
                }
            }
            Ok(ListResponse::Unrecognized) => {
                warn!(seq = ticket.seq, "unexpected list response shape; clearing list");
                self.records.clear();
                self.pages.set_total(None);
                Applied::Cleared
            }
            Err(err) => {
                warn!(%err, seq = ticket.seq, "list fetch failed");
                let message = err.to_string();
                self.error = Some(message.clone());
                Applied::Failed(message)
            }
        }
    }

    /// Issue `ticket` against the backend and apply the result. A clamped
    /// page is followed up until the shown records match the page index.
    pub async fn fetch(&mut self, api: &dyn PropertyApi, ticket: FetchTicket) -> Applied {
        let mut ticket = ticket;
        loop {
            let result = api.list_properties(&ticket.query).await;
            match self.apply(&ticket, result) {
                Applied::PageClamped { refetch, .. } => ticket = refetch,
                applied => return applied,
            }
        }
    }

    /// Refetch with the current parameters.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self, api: &dyn PropertyApi) -> Applied {
        let ticket = self.begin_fetch();
        self.fetch(api, ticket).await
    }

    /// Apply the draft filter, return to page 1 and request a refetch.
    pub fn commit_filter(&mut self) -> FetchTicket {
        self.filter.commit();
        self.pages.reset();
        self.begin_fetch()
    }

    /// Clear draft and applied filters, return to page 1 and refetch.
    pub fn reset_filter(&mut self) -> FetchTicket {
        self.filter.reset();
        self.pages.reset();
        self.begin_fetch()
    }

    /// Request page `n`. `None` when `n` is out of range or already shown.
    pub fn go_to_page(&mut self, n: u32) -> Option<FetchTicket> {
        self.pages.go_to_page(n).then(|| self.begin_fetch())
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        self.pages.next_page().then(|| self.begin_fetch())
    }

    pub fn previous_page(&mut self) -> Option<FetchTicket> {
        self.pages.previous_page().then(|| self.begin_fetch())
    }

    /// Archive one record. Success removes it locally without a refetch;
    /// failure keeps it and surfaces the error.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn archive(&mut self, api: &dyn PropertyApi, id: &str) -> Result<(), ApiError> {
        match api.archive_property(id).await {
            Ok(()) => {
                self.records.retain(|r| r.id != id);
                self.error = None;
                info!(remaining = self.records.len(), "archived property removed from list");
                Ok(())
            }
            Err(err) => {
                warn!(%err, "archive failed; record kept");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
