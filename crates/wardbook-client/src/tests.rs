//! Integration tests for the session manager and directory engine,
//! driven against in-memory fakes of the API traits.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;
use wardbook_core::{
  patient::{Gender, Patient, PatientStatus},
  search::{PatientQuery, PatientStatistics, SearchPage},
  staff::{Credentials, Role},
};

use crate::{
  api::{AuthApi, LoginResponse, PatientApi},
  directory::{Directory, FetchOutcome},
  error::ApiError,
  session::{SessionManager, SessionState},
  token::{MemoryTokenStore, TokenStore},
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn jwt(role: &str, exp: i64) -> String {
  let claims = serde_json::json!({
    "staff_id": "staff-1",
    "username": "drjane",
    "email": "jane@hospital.test",
    "role": role,
    "exp": exp,
  });
  jsonwebtoken::encode(
    &jsonwebtoken::Header::default(),
    &claims,
    &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
  )
  .expect("encoding test token")
}

fn future_exp() -> i64 {
  (Utc::now() + Duration::hours(1)).timestamp()
}

fn past_exp() -> i64 {
  (Utc::now() - Duration::hours(1)).timestamp()
}

fn patient(first_name: &str) -> Patient {
  Patient {
    patient_id:               Uuid::new_v4(),
    mrn:                      format!("MRN-{first_name}"),
    first_name:               first_name.into(),
    last_name:                "Odhiambo".into(),
    date_of_birth:            NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
    gender:                   Gender::Female,
    national_id:              None,
    phone:                    None,
    email:                    None,
    address:                  None,
    county:                   None,
    sub_county:               None,
    ward:                     None,
    village:                  None,
    blood_group:              None,
    allergies:                None,
    chronic_conditions:       None,
    marital_status:           None,
    occupation:               None,
    insurance_provider:       None,
    insurance_number:         None,
    insurance_status:         None,
    next_of_kin_name:         None,
    next_of_kin_relationship: None,
    next_of_kin_phone:        None,
    next_of_kin_address:      None,
    status:                   PatientStatus::Active,
    created_by:               None,
    updated_by:               None,
    created_at:               Utc::now(),
    updated_at:               Utc::now(),
    identifiers:              None,
    emergency_contacts:       None,
  }
}

fn page_of(names: &[&str], total: u64, page: u32, pages: u32) -> SearchPage {
  SearchPage {
    patients: names.iter().map(|n| patient(n)).collect(),
    total,
    page,
    pages,
  }
}

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeAuthApi {
  login_results: Mutex<VecDeque<Result<LoginResponse, ApiError>>>,
  logout_fails:  bool,
  logout_calls:  Mutex<u32>,
}

impl FakeAuthApi {
  fn queue_login(&self, result: Result<LoginResponse, ApiError>) {
    self.login_results.lock().unwrap().push_back(result);
  }

  fn successful_login(&self, role: Role) {
    self.queue_login(Ok(LoginResponse {
      access_token:  jwt(role.as_str(), future_exp()),
      refresh_token: "refresh-1".into(),
      user:          wardbook_core::staff::StaffUser {
        id:        "staff-1".into(),
        username:  "drjane".into(),
        full_name: "Jane Doe".into(),
        email:     "jane@hospital.test".into(),
        role,
      },
    }));
  }
}

impl AuthApi for &FakeAuthApi {
  async fn login(
    &self,
    _credentials: &Credentials,
  ) -> Result<LoginResponse, ApiError> {
    self
      .login_results
      .lock()
      .unwrap()
      .pop_front()
      .expect("unexpected login call")
  }

  async fn logout(&self) -> Result<(), ApiError> {
    *self.logout_calls.lock().unwrap() += 1;
    if self.logout_fails {
      Err(ApiError::Server {
        status:  500,
        message: "logout exploded".into(),
      })
    } else {
      Ok(())
    }
  }

  async fn forgot_password(&self, _email: &str) -> Result<(), ApiError> {
    Ok(())
  }

  async fn reset_password(
    &self,
    _token: &str,
    _new_password: &str,
  ) -> Result<(), ApiError> {
    Ok(())
  }

  async fn validate_reset_token(&self, _token: &str) -> Result<(), ApiError> {
    Ok(())
  }
}

#[derive(Default)]
struct FakePatientApi {
  search_results: Mutex<VecDeque<Result<SearchPage, ApiError>>>,
  queries:        Mutex<Vec<PatientQuery>>,
  stats_results:  Mutex<VecDeque<Result<PatientStatistics, ApiError>>>,
}

impl FakePatientApi {
  fn queue_page(&self, page: SearchPage) {
    self.search_results.lock().unwrap().push_back(Ok(page));
  }

  fn queue_failure(&self, message: &str) {
    self.search_results.lock().unwrap().push_back(Err(
      ApiError::Server {
        status:  500,
        message: message.into(),
      },
    ));
  }

  fn last_query(&self) -> PatientQuery {
    self.queries.lock().unwrap().last().cloned().expect("no query sent")
  }
}

impl PatientApi for &FakePatientApi {
  async fn search_patients(
    &self,
    query: &PatientQuery,
  ) -> Result<SearchPage, ApiError> {
    self.queries.lock().unwrap().push(query.clone());
    self
      .search_results
      .lock()
      .unwrap()
      .pop_front()
      .expect("no queued search response")
  }

  async fn patient_statistics(&self) -> Result<PatientStatistics, ApiError> {
    self
      .stats_results
      .lock()
      .unwrap()
      .pop_front()
      .expect("no queued statistics response")
  }

  async fn patient(&self, _id: Uuid) -> Result<Patient, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn patient_by_mrn(&self, _mrn: &str) -> Result<Patient, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn create_patient(
    &self,
    _patient: &wardbook_core::patient::NewPatient,
  ) -> Result<Patient, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn update_patient(
    &self,
    _id: Uuid,
    _update: &wardbook_core::patient::PatientUpdate,
  ) -> Result<Patient, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn deactivate_patient(&self, _id: Uuid) -> Result<Patient, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn mark_patient_active(
    &self,
    _id: Uuid,
  ) -> Result<Patient, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn mark_patient_deceased(
    &self,
    _id: Uuid,
  ) -> Result<Patient, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn add_identifier(
    &self,
    _patient_id: Uuid,
    _identifier: &wardbook_core::patient::NewIdentifier,
  ) -> Result<wardbook_core::patient::PatientIdentifier, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn add_emergency_contact(
    &self,
    _patient_id: Uuid,
    _contact: &wardbook_core::patient::NewEmergencyContact,
  ) -> Result<wardbook_core::patient::EmergencyContact, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn update_emergency_contact(
    &self,
    _contact_id: Uuid,
    _update: &wardbook_core::patient::EmergencyContactUpdate,
  ) -> Result<wardbook_core::patient::EmergencyContact, ApiError> {
    unimplemented!("not exercised by these tests")
  }

  async fn delete_emergency_contact(
    &self,
    _contact_id: Uuid,
  ) -> Result<(), ApiError> {
    unimplemented!("not exercised by these tests")
  }
}

// ─── Session manager ─────────────────────────────────────────────────────────

fn session_manager(
  api: &FakeAuthApi,
) -> (SessionManager<&FakeAuthApi, Arc<MemoryTokenStore>>, Arc<MemoryTokenStore>)
{
  let tokens = Arc::new(MemoryTokenStore::new());
  (SessionManager::new(api, Arc::clone(&tokens)), tokens)
}

#[tokio::test]
async fn restore_without_a_token_is_anonymous() {
  let api = FakeAuthApi::default();
  let (mut session, _tokens) = session_manager(&api);

  session.restore();

  assert_eq!(*session.state(), SessionState::Anonymous);
  assert!(!session.is_authenticated());
  assert!(!session.is_restoring());
}

#[tokio::test]
async fn restore_with_a_live_token_builds_a_session() {
  let api = FakeAuthApi::default();
  let (mut session, tokens) = session_manager(&api);
  tokens
    .set_tokens(&jwt("Doctor", future_exp()), "refresh-1")
    .unwrap();

  session.restore();

  let restored = session.session().expect("authenticated");
  assert_eq!(restored.user.username, "drjane");
  assert_eq!(restored.user.role, Role::Doctor);
  // The token carries no full name; only a fresh login does.
  assert_eq!(restored.user.full_name, "");
}

#[tokio::test]
async fn restore_with_an_expired_token_clears_it_silently() {
  let api = FakeAuthApi::default();
  let (mut session, tokens) = session_manager(&api);
  tokens
    .set_tokens(&jwt("Nurse", past_exp()), "refresh-1")
    .unwrap();

  session.restore();

  assert_eq!(*session.state(), SessionState::Anonymous);
  assert_eq!(tokens.access_token().unwrap(), None);
  assert_eq!(tokens.refresh_token().unwrap(), None);
}

#[tokio::test]
async fn restore_with_a_garbage_token_clears_it_silently() {
  let api = FakeAuthApi::default();
  let (mut session, tokens) = session_manager(&api);
  tokens.set_tokens("not-a-jwt", "refresh-1").unwrap();

  session.restore();

  assert_eq!(*session.state(), SessionState::Anonymous);
  assert_eq!(tokens.access_token().unwrap(), None);
}

#[tokio::test]
async fn restore_with_an_unknown_role_clears_it_silently() {
  let api = FakeAuthApi::default();
  let (mut session, tokens) = session_manager(&api);
  tokens
    .set_tokens(&jwt("Janitor", future_exp()), "refresh-1")
    .unwrap();

  session.restore();

  assert_eq!(*session.state(), SessionState::Anonymous);
  assert_eq!(tokens.access_token().unwrap(), None);
}

#[tokio::test]
async fn login_stores_both_tokens_and_the_full_user_record() {
  let api = FakeAuthApi::default();
  api.successful_login(Role::Admin);
  let (mut session, tokens) = session_manager(&api);
  session.restore();

  session
    .login(&Credentials {
      username: "drjane".into(),
      password: "secret".into(),
    })
    .await
    .unwrap();

  let s = session.session().expect("authenticated");
  assert_eq!(s.user.full_name, "Jane Doe");
  assert_eq!(s.user.role, Role::Admin);
  assert!(tokens.access_token().unwrap().is_some());
  assert_eq!(tokens.refresh_token().unwrap().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn failed_login_surfaces_the_server_message_and_changes_nothing() {
  let api = FakeAuthApi::default();
  api.queue_login(Err(ApiError::Unauthorized("Invalid credentials".into())));
  let (mut session, tokens) = session_manager(&api);
  session.restore();

  let err = session
    .login(&Credentials {
      username: "drjane".into(),
      password: "wrong".into(),
    })
    .await
    .unwrap_err();

  assert_eq!(err.to_string(), "Invalid credentials");
  assert_eq!(*session.state(), SessionState::Anonymous);
  assert_eq!(tokens.access_token().unwrap(), None);

  // The caller can retry without a restart.
  api.successful_login(Role::Doctor);
  session
    .login(&Credentials {
      username: "drjane".into(),
      password: "right".into(),
    })
    .await
    .unwrap();
  assert!(session.is_authenticated());
}

#[tokio::test]
async fn logout_clears_locally_even_when_the_server_call_fails() {
  let api = FakeAuthApi {
    logout_fails: true,
    ..FakeAuthApi::default()
  };
  api.successful_login(Role::Nurse);
  let (mut session, tokens) = session_manager(&api);
  session.restore();
  session
    .login(&Credentials {
      username: "nurse".into(),
      password: "secret".into(),
    })
    .await
    .unwrap();

  session.logout().await;

  assert_eq!(*session.state(), SessionState::Anonymous);
  assert_eq!(tokens.access_token().unwrap(), None);
  assert_eq!(tokens.refresh_token().unwrap(), None);
  assert_eq!(*api.logout_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn invalidate_tears_the_session_down_without_a_server_call() {
  let api = FakeAuthApi::default();
  api.successful_login(Role::Doctor);
  let (mut session, tokens) = session_manager(&api);
  session.restore();
  session
    .login(&Credentials {
      username: "drjane".into(),
      password: "secret".into(),
    })
    .await
    .unwrap();

  session.invalidate();

  assert_eq!(*session.state(), SessionState::Anonymous);
  assert_eq!(tokens.access_token().unwrap(), None);
  assert_eq!(*api.logout_calls.lock().unwrap(), 0);
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_sends_the_default_query_and_replaces_results() {
  let api = FakePatientApi::default();
  api.queue_page(page_of(&["Amina", "Otieno"], 2, 1, 1));
  let mut dir = Directory::new(&api);

  let outcome = dir.fetch().await;

  assert!(outcome.is_updated());
  assert_eq!(api.last_query(), PatientQuery::default());
  assert_eq!(dir.patients().len(), 2);
  assert_eq!(dir.pagination().total, 2);
}

#[tokio::test]
async fn clear_filters_always_requests_exact_defaults() {
  let api = FakePatientApi::default();
  api.queue_page(page_of(&["Amina"], 1, 1, 1));
  api.queue_page(page_of(&[], 0, 1, 1));
  api.queue_page(page_of(&["Amina"], 42, 1, 3));
  let mut dir = Directory::new(&api);

  // Build up plenty of prior state.
  dir.submit_search("odhiambo").await;
  dir.open_panel();
  dir.draft_mut().status = Some(PatientStatus::Inactive);
  dir.draft_mut().gender = Some(Gender::Male);
  dir.draft_mut().age_min = Some(30);
  dir.apply_filters().await;

  dir.clear_filters().await;

  let sent = api.last_query();
  assert_eq!(sent, PatientQuery::default());
  assert_eq!(sent.page, 1);
  assert_eq!(sent.limit, 20);
  assert!(!dir.panel_open());
}

#[tokio::test]
async fn apply_filters_resets_the_page_even_when_the_draft_disagrees() {
  let api = FakePatientApi::default();
  api.queue_page(page_of(&[], 0, 1, 1));
  let mut dir = Directory::new(&api);

  dir.open_panel();
  dir.draft_mut().status = Some(PatientStatus::Active);
  dir.draft_mut().page = 9;

  dir.apply_filters().await;

  let sent = api.last_query();
  assert_eq!(sent.page, 1);
  assert_eq!(sent.status, Some(PatientStatus::Active));
  assert!(!dir.panel_open());
}

#[tokio::test]
async fn change_page_retains_every_other_committed_filter() {
  let api = FakePatientApi::default();
  api.queue_page(page_of(&[], 0, 1, 3));
  api.queue_page(page_of(&[], 0, 2, 3));
  let mut dir = Directory::new(&api);

  dir.open_panel();
  dir.draft_mut().gender = Some(Gender::Female);
  dir.apply_filters().await;

  dir.change_page(2).await;

  let sent = api.last_query();
  assert_eq!(sent.page, 2);
  assert_eq!(sent.gender, Some(Gender::Female));
}

#[tokio::test]
async fn submit_search_resets_the_page() {
  let api = FakePatientApi::default();
  api.queue_page(page_of(&[], 0, 3, 3));
  api.queue_page(page_of(&[], 0, 1, 1));
  let mut dir = Directory::new(&api);

  dir.change_page(3).await;
  dir.submit_search("amina").await;

  let sent = api.last_query();
  assert_eq!(sent.query.as_deref(), Some("amina"));
  assert_eq!(sent.page, 1);
}

#[tokio::test]
async fn a_superseded_fetch_never_overwrites_newer_results() {
  let api = FakePatientApi::default();
  let mut dir = Directory::new(&api);

  // Two fetches race: the older one completes last.
  let old_ticket = dir.begin_fetch();
  let new_ticket = dir.begin_fetch();

  let outcome =
    dir.complete_fetch(new_ticket, Ok(page_of(&["Current"], 1, 1, 1)));
  assert!(outcome.is_updated());

  let outcome =
    dir.complete_fetch(old_ticket, Ok(page_of(&["Stale"], 1, 1, 1)));
  assert!(matches!(outcome, FetchOutcome::Stale));
  assert_eq!(dir.patients()[0].first_name, "Current");
}

#[tokio::test]
async fn a_superseded_failure_is_dropped_too() {
  let api = FakePatientApi::default();
  let mut dir = Directory::new(&api);

  let old_ticket = dir.begin_fetch();
  let new_ticket = dir.begin_fetch();

  dir
    .complete_fetch(new_ticket, Ok(page_of(&["Current"], 1, 1, 1)))
    .is_updated();
  let outcome = dir.complete_fetch(
    old_ticket,
    Err(ApiError::Server {
      status:  500,
      message: "late failure".into(),
    }),
  );

  assert!(matches!(outcome, FetchOutcome::Stale));
  assert_eq!(dir.patients().len(), 1);
}

#[tokio::test]
async fn a_failed_fetch_keeps_the_previous_results_visible() {
  let api = FakePatientApi::default();
  api.queue_page(page_of(&["Amina"], 1, 1, 1));
  api.queue_failure("the database is on fire");
  let mut dir = Directory::new(&api);

  dir.fetch().await;
  let outcome = dir.fetch().await;

  match outcome {
    FetchOutcome::Failed(e) => {
      assert_eq!(e.to_string(), "the database is on fire");
    }
    other => panic!("expected Failed, got {other:?}"),
  }
  assert_eq!(dir.patients().len(), 1);
  assert_eq!(dir.patients()[0].first_name, "Amina");
}

#[tokio::test]
async fn selection_is_cleared_when_a_fetch_replaces_the_results() {
  let api = FakePatientApi::default();
  api.queue_page(page_of(&["Amina", "Otieno"], 2, 1, 1));
  api.queue_page(page_of(&["Wanjiru"], 1, 1, 1));
  let mut dir = Directory::new(&api);

  dir.fetch().await;
  dir.toggle_all();
  assert_eq!(dir.selected().len(), 2);
  assert!(dir.all_selected());

  dir.fetch().await;
  assert!(dir.selected().is_empty());
}

#[tokio::test]
async fn toggle_all_covers_only_the_loaded_page() {
  let api = FakePatientApi::default();
  // 42 matches in total, 2 loaded.
  api.queue_page(page_of(&["Amina", "Otieno"], 42, 1, 3));
  let mut dir = Directory::new(&api);
  dir.fetch().await;

  dir.toggle_all();
  assert_eq!(dir.selected().len(), 2);

  // Toggling again clears rather than reaching for the other 40.
  dir.toggle_all();
  assert!(dir.selected().is_empty());

  let id = dir.patients()[0].patient_id;
  dir.toggle_row(id);
  assert!(dir.is_selected(id));
  dir.toggle_row(id);
  assert!(!dir.is_selected(id));
}

#[tokio::test]
async fn filter_actions_are_single_flight() {
  let api = FakePatientApi::default();
  let mut dir = Directory::new(&api);

  let ticket = dir.begin_apply_filters().expect("first action starts");
  // While it is pending, both filter actions are refused.
  assert!(dir.begin_apply_filters().is_none());
  assert!(dir.begin_clear_filters().is_none());
  assert!(dir.filter_action_in_flight());
  assert!(matches!(dir.apply_filters().await, FetchOutcome::Busy));

  dir.complete_fetch(ticket, Ok(page_of(&[], 0, 1, 1)));
  assert!(!dir.filter_action_in_flight());
  assert!(dir.begin_clear_filters().is_some());
}

#[tokio::test]
async fn statistics_failure_is_logged_not_fatal() {
  let api = FakePatientApi::default();
  api.stats_results.lock().unwrap().push_back(Err(ApiError::Server {
    status:  500,
    message: "stats exploded".into(),
  }));
  api.stats_results.lock().unwrap().push_back(Ok(PatientStatistics {
    total: 42,
    active: 30,
    inactive: 10,
    deceased: 2,
    ..PatientStatistics::default()
  }));
  let mut dir = Directory::new(&api);

  dir.refresh_statistics().await;
  assert_eq!(dir.statistics().total, 0);

  dir.refresh_statistics().await;
  assert_eq!(dir.statistics().total, 42);
  assert_eq!(dir.statistics().deceased, 2);
}

#[tokio::test]
async fn closing_the_panel_discards_draft_edits() {
  let api = FakePatientApi::default();
  let mut dir = Directory::new(&api);

  dir.open_panel();
  dir.draft_mut().status = Some(PatientStatus::Deceased);
  dir.draft_mut().age_max = Some(90);
  dir.close_panel();

  assert!(!dir.panel_open());
  assert_eq!(dir.draft().status, None);
  assert_eq!(dir.draft().age_max, None);
}

#[tokio::test]
async fn display_bounds_follow_the_loaded_page() {
  let api = FakePatientApi::default();
  api.queue_page(page_of(&["a", "b", "c", "d", "e", "f", "g", "h"], 42, 1, 3));
  let mut dir = Directory::new(&api);

  dir.fetch().await;
  assert_eq!(dir.display_bounds(), (1, 20));
}
