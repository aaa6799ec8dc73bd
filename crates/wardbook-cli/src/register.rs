//! Non-interactive registration: `wardbook register --file draft.toml`.
//!
//! Loads a TOML draft into the registration wizard, walks the five steps
//! so every gate runs in order, submits, and prints the server-assigned
//! MRN followed by the created record's profile.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Deserialize;
use wardbook_client::{
  api::{ApiClient, PatientApi},
  session::SessionManager,
  token::TokenStore,
};
use wardbook_core::{
  access::{Decision, GatedRoute},
  patient::{Gender, InsuranceStatus, Patient},
  registration::RegistrationForm,
};

// ─── Draft file ───────────────────────────────────────────────────────────────

/// TOML shape of a registration draft. Everything except the step-1
/// requirements may be left out.
#[derive(Debug, Deserialize)]
struct DraftFile {
  first_name:    String,
  last_name:     String,
  date_of_birth: String,
  gender:        Gender,

  #[serde(default)]
  national_id: String,
  #[serde(default)]
  phone:       String,
  #[serde(default)]
  email:       String,
  #[serde(default)]
  address:     String,
  #[serde(default)]
  county:      String,
  #[serde(default)]
  sub_county:  String,
  #[serde(default)]
  ward:        String,
  #[serde(default)]
  village:     String,
  #[serde(default)]
  blood_group:        String,
  #[serde(default)]
  marital_status:     String,
  #[serde(default)]
  occupation:         String,
  #[serde(default)]
  allergies:          String,
  #[serde(default)]
  chronic_conditions: String,
  #[serde(default)]
  next_of_kin_name:         String,
  #[serde(default)]
  next_of_kin_relationship: String,
  #[serde(default)]
  next_of_kin_phone:        String,
  #[serde(default)]
  next_of_kin_address:      String,
  #[serde(default)]
  insurance_provider: String,
  #[serde(default)]
  insurance_number:   String,
  #[serde(default)]
  insurance_status:   Option<InsuranceStatus>,
}

impl DraftFile {
  fn into_form(self) -> RegistrationForm {
    let mut form = RegistrationForm::new();
    form.first_name = self.first_name;
    form.last_name = self.last_name;
    form.date_of_birth = self.date_of_birth;
    form.gender = self.gender;
    form.national_id = self.national_id;
    form.phone = self.phone;
    form.email = self.email;
    form.address = self.address;
    form.county = self.county;
    form.sub_county = self.sub_county;
    form.ward = self.ward;
    form.village = self.village;
    form.blood_group = self.blood_group;
    form.marital_status = self.marital_status;
    form.occupation = self.occupation;
    form.allergies = self.allergies;
    form.chronic_conditions = self.chronic_conditions;
    form.next_of_kin_name = self.next_of_kin_name;
    form.next_of_kin_relationship = self.next_of_kin_relationship;
    form.next_of_kin_phone = self.next_of_kin_phone;
    form.next_of_kin_address = self.next_of_kin_address;
    form.insurance_provider = self.insurance_provider;
    form.insurance_number = self.insurance_number;
    form.insurance_status =
      self.insurance_status.unwrap_or(InsuranceStatus::Pending);
    form
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

pub async fn run(
  api: &ApiClient,
  session: &SessionManager<ApiClient, Arc<dyn TokenStore>>,
  file: &Path,
) -> Result<()> {
  match GatedRoute::PatientRegistration.authorize(session.session()) {
    Decision::Allow => {}
    Decision::RedirectToLogin => {
      bail!("not signed in — run `wardbook` and log in first")
    }
    Decision::Deny => {
      bail!("your role does not have access to patient registration")
    }
  }

  let raw = std::fs::read_to_string(file)
    .with_context(|| format!("reading draft file {}", file.display()))?;
  let draft: DraftFile = toml::from_str(&raw).context("parsing draft file")?;
  let mut form = draft.into_form();

  let today = Utc::now().date_naive();

  // Walk the wizard so each step's validation gate runs in order, exactly
  // as it would block the interactive form.
  while !form.is_last_step() {
    let step = form.step();
    form.next_step(today).with_context(|| {
      format!("step {} ({}) failed validation", step.number(), step.title())
    })?;
  }

  let payload = form.build_payload(today).context("validating the draft")?;
  let patient = api
    .create_patient(&payload)
    .await
    .context("registering the patient")?;

  println!(
    "Patient registered successfully — MRN: {} has been created",
    patient.mrn
  );

  // Show the new record's profile, the same navigation the interactive
  // flow performs.
  let profile = api
    .patient(patient.patient_id)
    .await
    .context("loading the new patient record")?;
  print_profile(&profile);

  Ok(())
}

fn print_profile(patient: &Patient) {
  let today = Utc::now().date_naive();
  println!();
  println!("{}  ({})", patient.full_name(), patient.mrn);
  println!("  id:            {}", patient.patient_id);
  println!("  status:        {}", patient.status);
  println!(
    "  date of birth: {}  ({} yrs)",
    patient.date_of_birth,
    patient
      .age_on(today)
      .map(|a| a.to_string())
      .unwrap_or_else(|| "—".into())
  );
  println!("  gender:        {}", patient.gender.as_str());
  if let Some(phone) = &patient.phone {
    println!("  phone:         {phone}");
  }
  if let Some(email) = &patient.email {
    println!("  email:         {email}");
  }
  if let Some(county) = &patient.county {
    println!("  county:        {county}");
  }
  if let Some(blood_group) = &patient.blood_group {
    println!("  blood group:   {blood_group}");
  }
}
