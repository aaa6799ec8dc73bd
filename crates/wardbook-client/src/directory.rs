//! The patient directory query engine.
//!
//! Owns the committed/draft filter pair, the loaded page of results, the
//! aggregate statistics, and the row selection. Fetches are sequenced
//! with tickets: [`Directory::begin_fetch`] stamps the request with a
//! monotonically increasing number and [`Directory::complete_fetch`]
//! drops any completion whose ticket has been superseded, so the visible
//! result set always reflects the last *committed* filters, never merely
//! the last response to arrive.

use std::collections::HashSet;

use uuid::Uuid;
use wardbook_core::{
  patient::Patient,
  search::{
    FilterState, PatientQuery, PatientStatistics, SearchPage,
    display_bounds,
  },
};

use crate::{api::PatientApi, error::ApiError};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Pagination metadata of the currently visible result set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
  pub total: u64,
  pub page:  u32,
  pub pages: u32,
}

/// A claim on the right to update the visible result set. Issued by
/// `begin_*`, redeemed by [`Directory::complete_fetch`].
#[derive(Debug)]
pub struct FetchTicket {
  seq:           u64,
  filter_action: bool,
  /// The committed query this fetch must send.
  pub query:     PatientQuery,
}

#[derive(Debug)]
pub enum FetchOutcome {
  /// The result set was replaced (and the row selection cleared).
  Updated,
  /// The ticket was superseded by a newer fetch; nothing changed,
  /// including a failure carried by the stale ticket.
  Stale,
  /// A filter action was already in flight; nothing was started.
  Busy,
  /// The fetch failed; the previous result set is retained on screen.
  Failed(ApiError),
}

impl FetchOutcome {
  pub fn is_updated(&self) -> bool {
    matches!(self, FetchOutcome::Updated)
  }
}

// ─── Directory ───────────────────────────────────────────────────────────────

pub struct Directory<P> {
  api:        P,
  filters:    FilterState,
  panel_open: bool,

  patients:   Vec<Patient>,
  pagination: Pagination,
  stats:      PatientStatistics,

  /// Selected rows on the loaded page. Cleared whenever a fetch replaces
  /// the result set, so a selection can never reference invisible rows.
  selected: HashSet<Uuid>,

  /// Sequence number of the most recently issued fetch.
  seq: u64,

  /// Single-flight guard for apply/clear; re-submission while one of
  /// them is pending is refused.
  filter_action_in_flight: bool,
}

impl<P: PatientApi> Directory<P> {
  pub fn new(api: P) -> Self {
    Self {
      api,
      filters: FilterState::new(),
      panel_open: false,
      patients: Vec::new(),
      pagination: Pagination::default(),
      stats: PatientStatistics::default(),
      selected: HashSet::new(),
      seq: 0,
      filter_action_in_flight: false,
    }
  }

  // ── Tickets ───────────────────────────────────────────────────────────

  /// Stamp a fetch of the current committed query. Issuing a new ticket
  /// supersedes every earlier one.
  pub fn begin_fetch(&mut self) -> FetchTicket {
    self.seq += 1;
    FetchTicket {
      seq:           self.seq,
      filter_action: false,
      query:         self.filters.committed().clone(),
    }
  }

  fn begin_filter_fetch(&mut self) -> FetchTicket {
    self.filter_action_in_flight = true;
    let mut ticket = self.begin_fetch();
    ticket.filter_action = true;
    ticket
  }

  /// Redeem a ticket with the fetch result. Only the most recently
  /// issued ticket may touch the visible state; on failure the previous
  /// result set stays on screen.
  pub fn complete_fetch(
    &mut self,
    ticket: FetchTicket,
    result: Result<SearchPage, ApiError>,
  ) -> FetchOutcome {
    if ticket.filter_action {
      self.filter_action_in_flight = false;
    }
    if ticket.seq != self.seq {
      return FetchOutcome::Stale;
    }
    match result {
      Ok(page) => {
        self.pagination = Pagination {
          total: page.total,
          page:  page.page,
          pages: page.pages,
        };
        self.patients = page.patients;
        self.selected.clear();
        FetchOutcome::Updated
      }
      Err(e) => FetchOutcome::Failed(e),
    }
  }

  // ── Operations ────────────────────────────────────────────────────────

  /// Fetch the current committed query.
  pub async fn fetch(&mut self) -> FetchOutcome {
    let ticket = self.begin_fetch();
    let result = self.api.search_patients(&ticket.query).await;
    self.complete_fetch(ticket, result)
  }

  /// Start an apply-filters fetch, or refuse if one is already pending.
  /// Promotes the draft (page reset to 1) and closes the panel.
  pub fn begin_apply_filters(&mut self) -> Option<FetchTicket> {
    if self.filter_action_in_flight {
      return None;
    }
    self.filters.commit();
    self.panel_open = false;
    Some(self.begin_filter_fetch())
  }

  /// Start a clear-filters fetch, or refuse if one is already pending.
  /// Resets draft and committed to the defaults and closes the panel.
  pub fn begin_clear_filters(&mut self) -> Option<FetchTicket> {
    if self.filter_action_in_flight {
      return None;
    }
    self.filters.reset();
    self.panel_open = false;
    Some(self.begin_filter_fetch())
  }

  pub async fn apply_filters(&mut self) -> FetchOutcome {
    let Some(ticket) = self.begin_apply_filters() else {
      return FetchOutcome::Busy;
    };
    let result = self.api.search_patients(&ticket.query).await;
    self.complete_fetch(ticket, result)
  }

  pub async fn clear_filters(&mut self) -> FetchOutcome {
    let Some(ticket) = self.begin_clear_filters() else {
      return FetchOutcome::Busy;
    };
    let result = self.api.search_patients(&ticket.query).await;
    self.complete_fetch(ticket, result)
  }

  /// Install a free-text query (page resets to 1) and fetch.
  pub async fn submit_search(&mut self, text: &str) -> FetchOutcome {
    self.filters.set_search(Some(text.trim().to_string()));
    self.fetch().await
  }

  /// Move to `page`, all other committed filters retained, and fetch.
  pub async fn change_page(&mut self, page: u32) -> FetchOutcome {
    self.filters.set_page(page);
    self.fetch().await
  }

  /// Refresh the aggregate counts. Never fatal: a failure is logged and
  /// the directory stays usable with the previous numbers.
  pub async fn refresh_statistics(&mut self) {
    match self.api.patient_statistics().await {
      Ok(stats) => self.stats = stats,
      Err(e) => tracing::warn!("failed to fetch patient statistics: {e}"),
    }
  }

  // ── Filter panel ──────────────────────────────────────────────────────

  pub fn panel_open(&self) -> bool {
    self.panel_open
  }

  pub fn open_panel(&mut self) {
    self.panel_open = true;
  }

  /// Close the panel, discarding draft edits.
  pub fn close_panel(&mut self) {
    self.panel_open = false;
    self.filters.discard();
  }

  pub fn toggle_panel(&mut self) {
    if self.panel_open {
      self.close_panel();
    } else {
      self.open_panel();
    }
  }

  pub fn draft(&self) -> &PatientQuery {
    self.filters.draft()
  }

  pub fn draft_mut(&mut self) -> &mut PatientQuery {
    self.filters.draft_mut()
  }

  pub fn committed(&self) -> &PatientQuery {
    self.filters.committed()
  }

  pub fn filter_action_in_flight(&self) -> bool {
    self.filter_action_in_flight
  }

  // ── Selection ─────────────────────────────────────────────────────────

  pub fn toggle_row(&mut self, id: Uuid) {
    if !self.selected.remove(&id) {
      self.selected.insert(id);
    }
  }

  /// Select every row on the loaded page, or clear the selection if the
  /// whole page is already selected. Never reaches beyond the page.
  pub fn toggle_all(&mut self) {
    if self.all_selected() {
      self.selected.clear();
    } else {
      self.selected =
        self.patients.iter().map(|p| p.patient_id).collect();
    }
  }

  pub fn is_selected(&self, id: Uuid) -> bool {
    self.selected.contains(&id)
  }

  pub fn all_selected(&self) -> bool {
    !self.patients.is_empty() && self.selected.len() == self.patients.len()
  }

  pub fn selected(&self) -> &HashSet<Uuid> {
    &self.selected
  }

  // ── Read model ────────────────────────────────────────────────────────

  pub fn patients(&self) -> &[Patient] {
    &self.patients
  }

  pub fn pagination(&self) -> Pagination {
    self.pagination
  }

  pub fn statistics(&self) -> &PatientStatistics {
    &self.stats
  }

  /// "Showing X–Y of Z" bounds for the visible page.
  pub fn display_bounds(&self) -> (u64, u64) {
    display_bounds(
      self.pagination.page,
      self.filters.committed().limit,
      self.pagination.total,
    )
  }
}
