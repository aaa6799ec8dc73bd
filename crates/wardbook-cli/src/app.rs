//! Application state machine and event dispatcher.
//!
//! Screens: Login → Directory ⇄ Profile. Every gated screen is entered
//! through the access guard, and every status transition goes through a
//! confirmation dialog before the network call — confirmation is part of
//! the contract, not decoration.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use uuid::Uuid;
use wardbook_client::{
  api::{ApiClient, PatientApi},
  directory::{Directory, FetchOutcome},
  error::ApiError,
  session::SessionManager,
  token::TokenStore,
};
use wardbook_core::{
  access::{Decision, GatedRoute},
  patient::{Patient, StatusAction},
  search::PatientQuery,
  staff::Credentials,
};

pub type Session = SessionManager<ApiClient, Arc<dyn TokenStore>>;

// ─── Screen & input modes ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Login,
  Directory,
  Profile,
}

/// What the keyboard is currently editing on the directory screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryInput {
  Normal,
  /// Typing into the free-text search bar.
  Search,
  /// Editing the draft filters in the open panel.
  FilterPanel(FilterField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
  Status,
  Gender,
  AgeMin,
  AgeMax,
}

impl FilterField {
  fn next(self) -> FilterField {
    match self {
      FilterField::Status => FilterField::Gender,
      FilterField::Gender => FilterField::AgeMin,
      FilterField::AgeMin => FilterField::AgeMax,
      FilterField::AgeMax => FilterField::Status,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTab {
  Overview,
  Medical,
  Contacts,
  Identifiers,
}

impl ProfileTab {
  pub const ALL: [ProfileTab; 4] = [
    ProfileTab::Overview,
    ProfileTab::Medical,
    ProfileTab::Contacts,
    ProfileTab::Identifiers,
  ];

  pub fn title(self) -> &'static str {
    match self {
      ProfileTab::Overview => "Overview",
      ProfileTab::Medical => "Medical",
      ProfileTab::Contacts => "Contacts",
      ProfileTab::Identifiers => "Identifiers",
    }
  }

  fn next(self) -> ProfileTab {
    match self {
      ProfileTab::Overview => ProfileTab::Medical,
      ProfileTab::Medical => ProfileTab::Contacts,
      ProfileTab::Contacts => ProfileTab::Identifiers,
      ProfileTab::Identifiers => ProfileTab::Overview,
    }
  }
}

// ─── Dialog state ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct LoginForm {
  pub username:       String,
  pub password:       String,
  pub focus_password: bool,
  /// Inline error from the last failed attempt; the user stays here and
  /// may retry.
  pub error: Option<String>,
}

/// A dismissible notification.
#[derive(Debug)]
pub struct Notice {
  pub title: String,
  pub body:  String,
}

/// Pending status transition awaiting an explicit yes/no.
#[derive(Debug)]
pub struct ConfirmDialog {
  pub action:     StatusAction,
  pub patient_id: Uuid,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub session:   Session,
  pub directory: Directory<ApiClient>,
  api:           ApiClient,

  pub screen: Screen,
  pub login:  LoginForm,

  pub input:        DirectoryInput,
  pub search_input: String,
  /// Cursor row within the loaded page.
  pub cursor:       usize,

  pub profile:     Option<Patient>,
  pub profile_tab: ProfileTab,

  pub confirm:    Option<ConfirmDialog>,
  pub notice:     Option<Notice>,
  pub status_msg: String,
}

impl App {
  /// Build the app after session restoration has already resolved — the
  /// initial screen is decided here, so nothing gated can flash before
  /// the session state is known.
  pub fn new(api: ApiClient, session: Session) -> Self {
    let screen = match GatedRoute::PatientDirectory
      .authorize(session.session())
    {
      Decision::Allow => Screen::Directory,
      Decision::RedirectToLogin | Decision::Deny => Screen::Login,
    };
    Self {
      directory: Directory::new(api.clone()),
      api,
      session,
      screen,
      login: LoginForm::default(),
      input: DirectoryInput::Normal,
      search_input: String::new(),
      cursor: 0,
      profile: None,
      profile_tab: ProfileTab::Overview,
      confirm: None,
      notice: None,
      status_msg: String::new(),
    }
  }

  /// Initial data load for an already-authenticated start.
  pub async fn load_initial(&mut self) {
    if self.screen == Screen::Directory {
      let outcome = self.directory.fetch().await;
      self.digest_fetch(outcome, "Failed to Load Patients");
      self.directory.refresh_statistics().await;
    }
  }

  // ── Guards & error plumbing ───────────────────────────────────────────

  /// Run the access guard for `route`. Returns `true` when the screen
  /// may proceed.
  fn guard(&mut self, route: GatedRoute) -> bool {
    match route.authorize(self.session.session()) {
      Decision::Allow => true,
      Decision::RedirectToLogin => {
        self.screen = Screen::Login;
        false
      }
      Decision::Deny => {
        self.notice = Some(Notice {
          title: "Access Denied".into(),
          body:  "Your role does not have access to this screen.".into(),
        });
        false
      }
    }
  }

  /// Uniform handling for API failures: a dead token tears the session
  /// down and lands on the login screen; anything else becomes a
  /// dismissible notification.
  fn handle_api_error(&mut self, title: &str, err: ApiError) {
    if err.is_unauthorized() {
      self.session.invalidate();
      self.screen = Screen::Login;
      self.login.error = Some("Session expired — please sign in again".into());
    } else {
      self.notice = Some(Notice {
        title: title.into(),
        body:  err.to_string(),
      });
    }
  }

  fn digest_fetch(&mut self, outcome: FetchOutcome, title: &str) {
    match outcome {
      FetchOutcome::Updated => {
        self.clamp_cursor();
      }
      FetchOutcome::Stale => {}
      FetchOutcome::Busy => {
        self.status_msg = "Still applying filters…".into();
      }
      FetchOutcome::Failed(e) => self.handle_api_error(title, e),
    }
  }

  fn clamp_cursor(&mut self) {
    let len = self.directory.patients().len();
    if len == 0 {
      self.cursor = 0;
    } else if self.cursor >= len {
      self.cursor = len - 1;
    }
  }

  pub fn cursor_patient(&self) -> Option<&Patient> {
    self.directory.patients().get(self.cursor)
  }

  // ── Key handling ──────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      return Ok(false);
    }

    self.status_msg.clear();

    // A pending confirmation swallows all input until resolved.
    if self.confirm.is_some() {
      self.handle_confirm_key(key).await;
      return Ok(true);
    }

    // A notification is dismissed by Enter or Esc before anything else.
    if self.notice.is_some() {
      if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
        self.notice = None;
      }
      return Ok(true);
    }

    match self.screen {
      Screen::Login => self.handle_login_key(key).await,
      Screen::Directory => return self.handle_directory_key(key).await,
      Screen::Profile => self.handle_profile_key(key).await,
    }
    Ok(true)
  }

  // ── Login ─────────────────────────────────────────────────────────────

  async fn handle_login_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
        self.login.focus_password = !self.login.focus_password;
      }
      KeyCode::Backspace => {
        let field = if self.login.focus_password {
          &mut self.login.password
        } else {
          &mut self.login.username
        };
        field.pop();
      }
      KeyCode::Char(c) => {
        let field = if self.login.focus_password {
          &mut self.login.password
        } else {
          &mut self.login.username
        };
        field.push(c);
      }
      KeyCode::Enter => self.submit_login().await,
      _ => {}
    }
  }

  async fn submit_login(&mut self) {
    let credentials = Credentials {
      username: self.login.username.trim().to_string(),
      password: self.login.password.clone(),
    };
    if credentials.username.is_empty() || credentials.password.is_empty() {
      self.login.error = Some("Enter a username and password".into());
      return;
    }

    match self.session.login(&credentials).await {
      Ok(()) => {
        self.login = LoginForm::default();
        if self.guard(GatedRoute::PatientDirectory) {
          self.screen = Screen::Directory;
          let outcome = self.directory.fetch().await;
          self.digest_fetch(outcome, "Failed to Load Patients");
          self.directory.refresh_statistics().await;
        }
      }
      // Bad credentials: stay here, show the server's message, retry at
      // will.
      Err(e) => self.login.error = Some(e.to_string()),
    }
  }

  // ── Directory ─────────────────────────────────────────────────────────

  async fn handle_directory_key(
    &mut self,
    key: KeyEvent,
  ) -> anyhow::Result<bool> {
    match self.input {
      DirectoryInput::Search => {
        self.handle_search_key(key).await;
        return Ok(true);
      }
      DirectoryInput::FilterPanel(field) => {
        self.handle_filter_key(key, field).await;
        return Ok(true);
      }
      DirectoryInput::Normal => {}
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),

      // Navigation.
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.directory.patients().len();
        if len > 0 && self.cursor + 1 < len {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      // Paging: every other committed filter is retained.
      KeyCode::Right | KeyCode::Char('n') => {
        let p = self.directory.pagination();
        if p.page < p.pages {
          let outcome = self.directory.change_page(p.page + 1).await;
          self.digest_fetch(outcome, "Failed to Load Patients");
        }
      }
      KeyCode::Left | KeyCode::Char('p') => {
        let p = self.directory.pagination();
        if p.page > 1 {
          let outcome = self.directory.change_page(p.page - 1).await;
          self.digest_fetch(outcome, "Failed to Load Patients");
        }
      }

      // Selection.
      KeyCode::Char(' ') => {
        if let Some(id) = self.cursor_patient().map(|p| p.patient_id) {
          self.directory.toggle_row(id);
        }
      }
      KeyCode::Char('a') => self.directory.toggle_all(),

      // Search & filters.
      KeyCode::Char('/') => {
        self.input = DirectoryInput::Search;
      }
      KeyCode::Char('f') => {
        self.directory.toggle_panel();
        self.input = if self.directory.panel_open() {
          DirectoryInput::FilterPanel(FilterField::Status)
        } else {
          DirectoryInput::Normal
        };
      }

      // Refresh: list and statistics together.
      KeyCode::Char('r') => {
        let outcome = self.directory.fetch().await;
        self.digest_fetch(outcome, "Failed to Load Patients");
        self.directory.refresh_statistics().await;
        self.status_msg = "Patient list updated".into();
      }

      // Open the profile under the cursor.
      KeyCode::Enter => {
        if let Some(id) = self.cursor_patient().map(|p| p.patient_id) {
          self.open_profile(id).await;
        }
      }

      // Sign out. Local state is cleared before the screen switches, so
      // the login screen can never observe a live session.
      KeyCode::Char('o') => {
        self.session.logout().await;
        self.screen = Screen::Login;
        self.login = LoginForm::default();
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.input = DirectoryInput::Normal;
      }
      KeyCode::Enter => {
        self.input = DirectoryInput::Normal;
        let text = self.search_input.clone();
        let outcome = self.directory.submit_search(&text).await;
        self.digest_fetch(outcome, "Failed to Load Patients");
        self.cursor = 0;
      }
      KeyCode::Backspace => {
        self.search_input.pop();
      }
      KeyCode::Char(c) => {
        self.search_input.push(c);
      }
      _ => {}
    }
  }

  async fn handle_filter_key(&mut self, key: KeyEvent, field: FilterField) {
    match key.code {
      // Esc closes the panel and discards draft edits.
      KeyCode::Esc => {
        self.directory.close_panel();
        self.input = DirectoryInput::Normal;
      }
      KeyCode::Tab => {
        self.input = DirectoryInput::FilterPanel(field.next());
      }
      KeyCode::Left | KeyCode::Right => {
        cycle_filter_field(
          self.directory.draft_mut(),
          field,
          key.code == KeyCode::Right,
        );
      }
      KeyCode::Char(c @ '0'..='9') => {
        edit_age_digit(self.directory.draft_mut(), field, Some(c));
      }
      KeyCode::Backspace => {
        edit_age_digit(self.directory.draft_mut(), field, None);
      }
      // Apply: single-flight; a Busy outcome leaves the panel alone.
      KeyCode::Enter | KeyCode::Char('a') => {
        let outcome = self.directory.apply_filters().await;
        if !matches!(outcome, FetchOutcome::Busy) {
          self.input = DirectoryInput::Normal;
          self.cursor = 0;
        }
        self.digest_fetch(outcome, "Failed to Apply Filters");
      }
      KeyCode::Char('c') => {
        let outcome = self.directory.clear_filters().await;
        if !matches!(outcome, FetchOutcome::Busy) {
          self.input = DirectoryInput::Normal;
          self.search_input.clear();
          self.cursor = 0;
        }
        self.digest_fetch(outcome, "Failed to Clear Filters");
      }
      _ => {}
    }
  }

  // ── Profile ───────────────────────────────────────────────────────────

  async fn open_profile(&mut self, id: Uuid) {
    if !self.guard(GatedRoute::PatientProfile) {
      return;
    }
    match self.api.patient(id).await {
      Ok(patient) => {
        self.profile = Some(patient);
        self.profile_tab = ProfileTab::Overview;
        self.screen = Screen::Profile;
      }
      Err(e) => self.handle_api_error("Failed to Load Patient", e),
    }
  }

  async fn handle_profile_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc | KeyCode::Char('h') => {
        self.screen = Screen::Directory;
        self.profile = None;
      }
      KeyCode::Tab => {
        self.profile_tab = self.profile_tab.next();
      }
      // Status actions are only offered for legal transitions; each one
      // must be confirmed before any network call happens.
      KeyCode::Char('d') => self.request_action(StatusAction::Deactivate),
      KeyCode::Char('m') => self.request_action(StatusAction::MarkActive),
      KeyCode::Char('x') => self.request_action(StatusAction::MarkDeceased),
      _ => {}
    }
  }

  fn request_action(&mut self, action: StatusAction) {
    let Some(patient) = &self.profile else { return };
    if !patient.status.can_apply(action) {
      return;
    }
    self.confirm = Some(ConfirmDialog {
      action,
      patient_id: patient.patient_id,
    });
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => {
        if let Some(dialog) = self.confirm.take() {
          self.perform_action(dialog).await;
        }
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
        self.confirm = None;
      }
      _ => {}
    }
  }

  /// Run a confirmed status transition. The result is never applied
  /// optimistically: on success the record is re-fetched; on failure the
  /// last-known-good record stays.
  async fn perform_action(&mut self, dialog: ConfirmDialog) {
    let result = match dialog.action {
      StatusAction::Deactivate => {
        self.api.deactivate_patient(dialog.patient_id).await
      }
      StatusAction::MarkActive => {
        self.api.mark_patient_active(dialog.patient_id).await
      }
      StatusAction::MarkDeceased => {
        self.api.mark_patient_deceased(dialog.patient_id).await
      }
    };

    match result {
      Ok(_) => {
        match self.api.patient(dialog.patient_id).await {
          Ok(patient) => self.profile = Some(patient),
          Err(e) => {
            self.handle_api_error("Failed to Load Patient", e);
            return;
          }
        }
        self.notice = Some(Notice {
          title: dialog.action.confirm_title().into(),
          body:  "Patient status has been updated".into(),
        });
      }
      Err(e) => {
        let title = match dialog.action {
          StatusAction::Deactivate => "Deactivation Failed",
          StatusAction::MarkActive | StatusAction::MarkDeceased => {
            "Update Failed"
          }
        };
        self.handle_api_error(title, e);
      }
    }
  }
}

// ─── Draft editing helpers ───────────────────────────────────────────────────

/// Cycle an enum filter field through None → each value → None, or step
/// an age bound. Lives outside `App` so it can be unit-tested without a
/// terminal.
fn cycle_filter_field(
  draft: &mut PatientQuery,
  field: FilterField,
  forward: bool,
) {
  use wardbook_core::patient::{Gender, PatientStatus};

  match field {
    FilterField::Status => {
      let order = [
        None,
        Some(PatientStatus::Active),
        Some(PatientStatus::Inactive),
        Some(PatientStatus::Deceased),
      ];
      draft.status = cycle(&order, draft.status, forward);
    }
    FilterField::Gender => {
      let order = [
        None,
        Some(Gender::Male),
        Some(Gender::Female),
        Some(Gender::Other),
      ];
      draft.gender = cycle(&order, draft.gender, forward);
    }
    FilterField::AgeMin => {
      draft.age_min = step_age(draft.age_min, forward);
    }
    FilterField::AgeMax => {
      draft.age_max = step_age(draft.age_max, forward);
    }
  }
}

fn cycle<T: Copy + PartialEq>(
  order: &[Option<T>],
  current: Option<T>,
  forward: bool,
) -> Option<T> {
  let position = order.iter().position(|v| *v == current).unwrap_or(0);
  let next = if forward {
    (position + 1) % order.len()
  } else {
    (position + order.len() - 1) % order.len()
  };
  order[next]
}

fn step_age(current: Option<u32>, up: bool) -> Option<u32> {
  match (current, up) {
    (None, true) => Some(0),
    (None, false) => None,
    (Some(0), false) => None,
    (Some(n), true) => Some((n + 1).min(150)),
    (Some(n), false) => Some(n - 1),
  }
}

/// Append or remove a digit on an age bound.
fn edit_age_digit(
  draft: &mut PatientQuery,
  field: FilterField,
  digit: Option<char>,
) {
  let slot = match field {
    FilterField::AgeMin => &mut draft.age_min,
    FilterField::AgeMax => &mut draft.age_max,
    _ => return,
  };
  match digit {
    Some(c) => {
      let current = slot.map(|n| n.to_string()).unwrap_or_default();
      if let Ok(n) = format!("{current}{c}").parse::<u32>() {
        *slot = Some(n.min(150));
      }
    }
    None => {
      let mut current = slot.map(|n| n.to_string()).unwrap_or_default();
      current.pop();
      *slot = current.parse::<u32>().ok();
    }
  }
}

#[cfg(test)]
mod tests {
  use wardbook_core::patient::{Gender, PatientStatus};

  use super::*;

  #[test]
  fn status_filter_cycles_through_none_and_all_values() {
    let mut draft = PatientQuery::default();
    cycle_filter_field(&mut draft, FilterField::Status, true);
    assert_eq!(draft.status, Some(PatientStatus::Active));
    cycle_filter_field(&mut draft, FilterField::Status, true);
    assert_eq!(draft.status, Some(PatientStatus::Inactive));
    cycle_filter_field(&mut draft, FilterField::Status, true);
    assert_eq!(draft.status, Some(PatientStatus::Deceased));
    cycle_filter_field(&mut draft, FilterField::Status, true);
    assert_eq!(draft.status, None);
    cycle_filter_field(&mut draft, FilterField::Status, false);
    assert_eq!(draft.status, Some(PatientStatus::Deceased));
  }

  #[test]
  fn gender_filter_cycles_backwards_to_none() {
    let mut draft = PatientQuery::default();
    draft.gender = Some(Gender::Male);
    cycle_filter_field(&mut draft, FilterField::Gender, false);
    assert_eq!(draft.gender, None);
  }

  #[test]
  fn age_digits_append_and_erase() {
    let mut draft = PatientQuery::default();
    edit_age_digit(&mut draft, FilterField::AgeMin, Some('3'));
    edit_age_digit(&mut draft, FilterField::AgeMin, Some('5'));
    assert_eq!(draft.age_min, Some(35));

    edit_age_digit(&mut draft, FilterField::AgeMin, None);
    assert_eq!(draft.age_min, Some(3));
    edit_age_digit(&mut draft, FilterField::AgeMin, None);
    assert_eq!(draft.age_min, None);
  }

  #[test]
  fn age_input_is_capped() {
    let mut draft = PatientQuery::default();
    for c in ['9', '9', '9'] {
      edit_age_digit(&mut draft, FilterField::AgeMax, Some(c));
    }
    assert_eq!(draft.age_max, Some(150));
  }
}
