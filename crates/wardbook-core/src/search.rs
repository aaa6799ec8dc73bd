//! Directory search state — filters, pagination, statistics.
//!
//! Filter state is held twice: the *committed* query drives the fetch that
//! produced the visible result set; the *draft* is what an open filter
//! panel edits. The two only meet through [`FilterState::commit`] and
//! [`FilterState::discard`], so no rendering layer's reactivity is
//! involved in keeping them in sync.

use serde::{Deserialize, Serialize};

use crate::patient::{Gender, Patient, PatientStatus};

// ─── Query ───────────────────────────────────────────────────────────────────

/// Query parameters for `GET /patients`. Serializes straight into the
/// request query string; unset filters are absent, not empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientQuery {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub query:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status:  Option<PatientStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gender:  Option<Gender>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub age_min: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub age_max: Option<u32>,
  pub page:    u32,
  pub limit:   u32,
}

impl PatientQuery {
  pub const DEFAULT_LIMIT: u32 = 20;

  /// True when any advanced filter (beyond free text and paging) is set.
  /// Drives the "filters active" indicator on the directory screen.
  pub fn has_filters(&self) -> bool {
    self.status.is_some()
      || self.gender.is_some()
      || self.age_min.is_some()
      || self.age_max.is_some()
  }
}

impl Default for PatientQuery {
  fn default() -> Self {
    Self {
      query:   None,
      status:  None,
      gender:  None,
      age_min: None,
      age_max: None,
      page:    1,
      limit:   Self::DEFAULT_LIMIT,
    }
  }
}

// ─── Draft / committed pair ──────────────────────────────────────────────────

/// The two-copy filter holder: `committed` drives fetches, `draft` is what
/// the filter panel edits.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
  committed: PatientQuery,
  draft:     PatientQuery,
}

impl FilterState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn committed(&self) -> &PatientQuery {
    &self.committed
  }

  pub fn draft(&self) -> &PatientQuery {
    &self.draft
  }

  pub fn draft_mut(&mut self) -> &mut PatientQuery {
    &mut self.draft
  }

  /// Promote the draft to committed. Applying filters always lands on the
  /// first page, whatever the draft's page said.
  pub fn commit(&mut self) {
    self.draft.page = 1;
    self.committed = self.draft.clone();
  }

  /// Throw away draft edits, resetting the panel to the committed state.
  pub fn discard(&mut self) {
    self.draft = self.committed.clone();
  }

  /// Reset both copies to the defaults (`page=1`, `limit=20`, nothing
  /// else set).
  pub fn reset(&mut self) {
    self.committed = PatientQuery::default();
    self.draft = PatientQuery::default();
  }

  /// Install a new free-text query on the committed state. Any filter
  /// change other than paging resets to page 1.
  pub fn set_search(&mut self, text: Option<String>) {
    self.committed.query = text.filter(|t| !t.is_empty());
    self.committed.page = 1;
    self.draft = self.committed.clone();
  }

  /// Move to `page`, keeping every other committed filter. Pages are
  /// 1-based; zero is clamped up.
  pub fn set_page(&mut self, page: u32) {
    self.committed.page = page.max(1);
    self.draft.page = self.committed.page;
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// One page of search results, as returned by `GET /patients`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
  pub patients: Vec<Patient>,
  pub total:    u64,
  pub page:     u32,
  pub pages:    u32,
}

/// Aggregate counts from `GET /patients/statistics`. Defaults keep the
/// directory rendering zeros until the first (non-fatal) refresh lands.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientStatistics {
  pub total:            u64,
  pub active:           u64,
  pub inactive:         u64,
  pub deceased:         u64,
  pub gender:           GenderBreakdown,
  pub registered_today: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenderBreakdown {
  pub male:   u64,
  pub female: u64,
  pub other:  u64,
}

/// 1-based display bounds for "Showing X–Y of Z": start is
/// `(page-1)*limit + 1`, end is `min(page*limit, total)`; an empty result
/// set shows 0–0.
pub fn display_bounds(page: u32, limit: u32, total: u64) -> (u64, u64) {
  if total == 0 {
    return (0, 0);
  }
  let start = u64::from(page.saturating_sub(1)) * u64::from(limit) + 1;
  let end = (u64::from(page) * u64::from(limit)).min(total);
  (start, end)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_query_is_first_page_of_twenty() {
    let q = PatientQuery::default();
    assert_eq!(q.page, 1);
    assert_eq!(q.limit, 20);
    assert!(!q.has_filters());
  }

  #[test]
  fn unset_filters_are_absent_from_the_query_string() {
    let q = PatientQuery::default();
    let value = serde_json::to_value(&q).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["page"], 1);
    assert_eq!(map["limit"], 20);
  }

  #[test]
  fn set_filters_serialize_with_their_wire_names() {
    let q = PatientQuery {
      query: Some("amina".into()),
      status: Some(PatientStatus::Active),
      gender: Some(Gender::Female),
      age_min: Some(18),
      age_max: Some(65),
      ..PatientQuery::default()
    };
    let value = serde_json::to_value(&q).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map["query"], "amina");
    assert_eq!(map["status"], "Active");
    assert_eq!(map["gender"], "Female");
    assert_eq!(map["age_min"], 18);
    assert_eq!(map["age_max"], 65);
  }

  #[test]
  fn commit_promotes_the_draft_and_resets_the_page() {
    let mut filters = FilterState::new();
    filters.set_page(4);
    filters.draft_mut().status = Some(PatientStatus::Inactive);
    filters.draft_mut().page = 9;

    filters.commit();

    assert_eq!(filters.committed().status, Some(PatientStatus::Inactive));
    assert_eq!(filters.committed().page, 1);
    assert_eq!(filters.draft().page, 1);
  }

  #[test]
  fn discard_restores_the_committed_state() {
    let mut filters = FilterState::new();
    filters.draft_mut().gender = Some(Gender::Male);
    filters.draft_mut().age_min = Some(30);

    filters.discard();

    assert_eq!(filters.draft(), filters.committed());
    assert!(!filters.draft().has_filters());
  }

  #[test]
  fn reset_returns_both_copies_to_defaults() {
    let mut filters = FilterState::new();
    filters.draft_mut().status = Some(PatientStatus::Deceased);
    filters.commit();
    filters.set_page(7);

    filters.reset();

    assert_eq!(*filters.committed(), PatientQuery::default());
    assert_eq!(*filters.draft(), PatientQuery::default());
  }

  #[test]
  fn set_search_resets_the_page_and_drops_empty_text() {
    let mut filters = FilterState::new();
    filters.set_page(3);

    filters.set_search(Some("odhiambo".into()));
    assert_eq!(filters.committed().query.as_deref(), Some("odhiambo"));
    assert_eq!(filters.committed().page, 1);

    filters.set_search(Some(String::new()));
    assert_eq!(filters.committed().query, None);
  }

  #[test]
  fn set_page_keeps_other_filters_and_clamps_to_one() {
    let mut filters = FilterState::new();
    filters.draft_mut().status = Some(PatientStatus::Active);
    filters.commit();

    filters.set_page(5);
    assert_eq!(filters.committed().page, 5);
    assert_eq!(filters.committed().status, Some(PatientStatus::Active));

    filters.set_page(0);
    assert_eq!(filters.committed().page, 1);
  }

  #[test]
  fn display_bounds_cover_full_and_partial_pages() {
    // 42 results, 20 per page.
    assert_eq!(display_bounds(1, 20, 42), (1, 20));
    assert_eq!(display_bounds(2, 20, 42), (21, 40));
    assert_eq!(display_bounds(3, 20, 42), (41, 42));
    assert_eq!(display_bounds(1, 20, 0), (0, 0));
  }

  #[test]
  fn statistics_decode_with_missing_sections() {
    let stats: PatientStatistics =
      serde_json::from_value(serde_json::json!({
        "total": 42, "active": 30, "inactive": 10, "deceased": 2
      }))
      .unwrap();
    assert_eq!(stats.total, 42);
    assert_eq!(stats.gender.female, 0);
    assert_eq!(stats.registered_today, 0);
  }
}
