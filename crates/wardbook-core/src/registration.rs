//! The five-step patient registration wizard.
//!
//! The form is a draft of plain strings (what the user typed), stepped
//! through Personal Info → Location → Medical Info → Emergency Contact →
//! Insurance. Step validation gates forward navigation only; going back
//! never validates. Submission re-validates every step and builds a
//! [`NewPatient`] in which empty optional fields are omitted entirely.
//!
//! "Today" is always passed in by the caller so the date-of-birth rule
//! stays a pure function.

use chrono::NaiveDate;

use crate::{
  error::Error,
  patient::{Gender, InsuranceStatus, NewPatient},
};

// ─── Steps ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  PersonalInfo,
  Location,
  MedicalInfo,
  EmergencyContact,
  Insurance,
}

impl Step {
  pub const ALL: [Step; 5] = [
    Step::PersonalInfo,
    Step::Location,
    Step::MedicalInfo,
    Step::EmergencyContact,
    Step::Insurance,
  ];

  /// 1-based position for "Step N of 5" display.
  pub fn number(self) -> u8 {
    match self {
      Step::PersonalInfo => 1,
      Step::Location => 2,
      Step::MedicalInfo => 3,
      Step::EmergencyContact => 4,
      Step::Insurance => 5,
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Step::PersonalInfo => "Personal Info",
      Step::Location => "Location",
      Step::MedicalInfo => "Medical Info",
      Step::EmergencyContact => "Emergency Contact",
      Step::Insurance => "Insurance",
    }
  }

  fn next(self) -> Option<Step> {
    match self {
      Step::PersonalInfo => Some(Step::Location),
      Step::Location => Some(Step::MedicalInfo),
      Step::MedicalInfo => Some(Step::EmergencyContact),
      Step::EmergencyContact => Some(Step::Insurance),
      Step::Insurance => None,
    }
  }

  fn previous(self) -> Option<Step> {
    match self {
      Step::PersonalInfo => None,
      Step::Location => Some(Step::PersonalInfo),
      Step::MedicalInfo => Some(Step::Location),
      Step::EmergencyContact => Some(Step::MedicalInfo),
      Step::Insurance => Some(Step::EmergencyContact),
    }
  }
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// The registration draft. Free-text fields hold whatever was typed;
/// nothing is normalised until [`RegistrationForm::build_payload`].
#[derive(Debug, Clone)]
pub struct RegistrationForm {
  step: Step,

  pub first_name:    String,
  pub last_name:     String,
  /// ISO date as typed, `YYYY-MM-DD`.
  pub date_of_birth: String,
  pub gender:        Gender,

  pub national_id: String,
  pub phone:       String,
  pub email:       String,
  pub address:     String,

  pub county:     String,
  pub sub_county: String,
  pub ward:       String,
  pub village:    String,

  pub blood_group:        String,
  pub marital_status:     String,
  pub occupation:         String,
  pub allergies:          String,
  pub chronic_conditions: String,

  pub next_of_kin_name:         String,
  pub next_of_kin_relationship: String,
  pub next_of_kin_phone:        String,
  pub next_of_kin_address:      String,

  pub insurance_provider: String,
  pub insurance_number:   String,
  pub insurance_status:   InsuranceStatus,
}

impl Default for RegistrationForm {
  fn default() -> Self {
    Self {
      step:                     Step::PersonalInfo,
      first_name:               String::new(),
      last_name:                String::new(),
      date_of_birth:            String::new(),
      gender:                   Gender::Male,
      national_id:              String::new(),
      phone:                    String::new(),
      email:                    String::new(),
      address:                  String::new(),
      county:                   String::new(),
      sub_county:               String::new(),
      ward:                     String::new(),
      village:                  String::new(),
      blood_group:              String::new(),
      marital_status:           String::new(),
      occupation:               String::new(),
      allergies:                String::new(),
      chronic_conditions:       String::new(),
      next_of_kin_name:         String::new(),
      next_of_kin_relationship: String::new(),
      next_of_kin_phone:        String::new(),
      next_of_kin_address:      String::new(),
      insurance_provider:       String::new(),
      insurance_number:         String::new(),
      insurance_status:         InsuranceStatus::Pending,
    }
  }
}

impl RegistrationForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn step(&self) -> Step {
    self.step
  }

  pub fn is_last_step(&self) -> bool {
    self.step.next().is_none()
  }

  /// Validate one step's rules.
  ///
  /// Only Personal Info and Emergency Contact carry requirements;
  /// Location, Medical Info, and Insurance are entirely optional.
  pub fn validate_step(
    &self,
    step: Step,
    today: NaiveDate,
  ) -> Result<(), Error> {
    match step {
      Step::PersonalInfo => {
        if self.first_name.trim().is_empty() {
          return Err(Error::MissingField("first_name"));
        }
        if self.last_name.trim().is_empty() {
          return Err(Error::MissingField("last_name"));
        }
        let dob = self.parsed_date_of_birth()?;
        if dob > today {
          return Err(Error::FutureDateOfBirth);
        }
        Ok(())
      }
      Step::EmergencyContact => {
        let name_given = !self.next_of_kin_name.trim().is_empty();
        let phone_given = !self.next_of_kin_phone.trim().is_empty();
        if name_given && !phone_given {
          return Err(Error::NextOfKinPhoneRequired);
        }
        Ok(())
      }
      Step::Location | Step::MedicalInfo | Step::Insurance => Ok(()),
    }
  }

  /// Advance to the next step, gated on the current step's validation.
  /// A no-op on the last step.
  pub fn next_step(&mut self, today: NaiveDate) -> Result<(), Error> {
    self.validate_step(self.step, today)?;
    if let Some(next) = self.step.next() {
      self.step = next;
    }
    Ok(())
  }

  /// Go back one step. Never validates; a no-op on the first step.
  pub fn previous_step(&mut self) {
    if let Some(previous) = self.step.previous() {
      self.step = previous;
    }
  }

  /// Re-run every step's validation, first failure wins.
  pub fn validate_all(&self, today: NaiveDate) -> Result<(), Error> {
    for step in Step::ALL {
      self.validate_step(step, today)?;
    }
    Ok(())
  }

  pub fn parsed_date_of_birth(&self) -> Result<NaiveDate, Error> {
    let raw = self.date_of_birth.trim();
    if raw.is_empty() {
      return Err(Error::MissingField("date_of_birth"));
    }
    raw.parse::<NaiveDate>().map_err(|_| Error::InvalidDate {
      field: "date_of_birth",
      value: raw.to_string(),
    })
  }

  /// Re-validate everything and build the `POST /patients` body. Optional
  /// fields left blank become `None` and are absent from the payload.
  pub fn build_payload(&self, today: NaiveDate) -> Result<NewPatient, Error> {
    self.validate_all(today)?;
    Ok(NewPatient {
      first_name:               self.first_name.trim().to_string(),
      last_name:                self.last_name.trim().to_string(),
      date_of_birth:            self.parsed_date_of_birth()?,
      gender:                   self.gender,
      national_id:              opt(&self.national_id),
      phone:                    opt(&self.phone),
      email:                    opt(&self.email),
      address:                  opt(&self.address),
      county:                   opt(&self.county),
      sub_county:               opt(&self.sub_county),
      ward:                     opt(&self.ward),
      village:                  opt(&self.village),
      blood_group:              opt(&self.blood_group),
      marital_status:           opt(&self.marital_status),
      occupation:               opt(&self.occupation),
      allergies:                opt(&self.allergies),
      chronic_conditions:       opt(&self.chronic_conditions),
      insurance_provider:       opt(&self.insurance_provider),
      insurance_number:         opt(&self.insurance_number),
      insurance_status:         Some(self.insurance_status),
      next_of_kin_name:         opt(&self.next_of_kin_name),
      next_of_kin_relationship: opt(&self.next_of_kin_relationship),
      next_of_kin_phone:        opt(&self.next_of_kin_phone),
      next_of_kin_address:      opt(&self.next_of_kin_address),
    })
  }
}

/// Empty or whitespace-only input is an omitted field, not an empty value.
fn opt(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
  }

  fn valid_form() -> RegistrationForm {
    RegistrationForm {
      first_name: "Amina".into(),
      last_name: "Odhiambo".into(),
      date_of_birth: "1990-06-15".into(),
      gender: Gender::Female,
      ..RegistrationForm::default()
    }
  }

  #[test]
  fn step_one_requires_names_and_birth_date() {
    let form = RegistrationForm::default();
    assert_eq!(
      form.validate_step(Step::PersonalInfo, today()),
      Err(Error::MissingField("first_name"))
    );

    let form = RegistrationForm {
      first_name: "Amina".into(),
      ..RegistrationForm::default()
    };
    assert_eq!(
      form.validate_step(Step::PersonalInfo, today()),
      Err(Error::MissingField("last_name"))
    );

    let form = RegistrationForm {
      first_name: "Amina".into(),
      last_name: "Odhiambo".into(),
      ..RegistrationForm::default()
    };
    assert_eq!(
      form.validate_step(Step::PersonalInfo, today()),
      Err(Error::MissingField("date_of_birth"))
    );
  }

  #[test]
  fn step_one_rejects_a_future_birth_date_and_accepts_today() {
    let mut form = valid_form();
    form.date_of_birth = (today() + Duration::days(1)).to_string();
    assert_eq!(
      form.validate_step(Step::PersonalInfo, today()),
      Err(Error::FutureDateOfBirth)
    );

    form.date_of_birth = today().to_string();
    assert_eq!(form.validate_step(Step::PersonalInfo, today()), Ok(()));
  }

  #[test]
  fn step_one_rejects_an_unparseable_date() {
    let mut form = valid_form();
    form.date_of_birth = "15/06/1990".into();
    assert!(matches!(
      form.validate_step(Step::PersonalInfo, today()),
      Err(Error::InvalidDate { field: "date_of_birth", .. })
    ));
  }

  #[test]
  fn step_four_requires_a_phone_when_a_name_is_given() {
    let mut form = valid_form();

    // Both empty: fine.
    assert_eq!(form.validate_step(Step::EmergencyContact, today()), Ok(()));

    // Name without phone: rejected.
    form.next_of_kin_name = "Otieno Odhiambo".into();
    assert_eq!(
      form.validate_step(Step::EmergencyContact, today()),
      Err(Error::NextOfKinPhoneRequired)
    );

    // Both set: fine.
    form.next_of_kin_phone = "0722111222".into();
    assert_eq!(form.validate_step(Step::EmergencyContact, today()), Ok(()));
  }

  #[test]
  fn optional_steps_always_pass() {
    let form = RegistrationForm::default();
    for step in [Step::Location, Step::MedicalInfo, Step::Insurance] {
      assert_eq!(form.validate_step(step, today()), Ok(()));
    }
  }

  #[test]
  fn next_step_is_gated_and_previous_is_not() {
    let mut form = RegistrationForm::default();
    assert!(form.next_step(today()).is_err());
    assert_eq!(form.step(), Step::PersonalInfo);

    let mut form = valid_form();
    form.next_step(today()).unwrap();
    assert_eq!(form.step(), Step::Location);

    form.previous_step();
    assert_eq!(form.step(), Step::PersonalInfo);
    // Already at the first step; going back stays put.
    form.previous_step();
    assert_eq!(form.step(), Step::PersonalInfo);
  }

  #[test]
  fn wizard_walks_all_five_steps() {
    let mut form = valid_form();
    for expected in [
      Step::Location,
      Step::MedicalInfo,
      Step::EmergencyContact,
      Step::Insurance,
    ] {
      form.next_step(today()).unwrap();
      assert_eq!(form.step(), expected);
    }
    assert!(form.is_last_step());
    // Advancing off the end is a validated no-op.
    form.next_step(today()).unwrap();
    assert_eq!(form.step(), Step::Insurance);
  }

  #[test]
  fn submission_revalidates_every_step() {
    let mut form = valid_form();
    form.next_of_kin_name = "Otieno".into();
    // Step 4 was never visited, but submission still catches it.
    assert_eq!(
      form.build_payload(today()),
      Err(Error::NextOfKinPhoneRequired)
    );
  }

  #[test]
  fn payload_omits_blank_optionals_and_trims_values() {
    let mut form = valid_form();
    form.first_name = "  Amina ".into();
    form.phone = "0712000111".into();
    form.county = "   ".into();

    let payload = form.build_payload(today()).unwrap();
    assert_eq!(payload.first_name, "Amina");
    assert_eq!(payload.phone.as_deref(), Some("0712000111"));
    assert_eq!(payload.county, None);
    assert_eq!(payload.insurance_status, Some(InsuranceStatus::Pending));

    let value = serde_json::to_value(&payload).unwrap();
    let map = value.as_object().unwrap();
    assert!(!map.contains_key("county"));
    assert!(!map.contains_key("allergies"));
    assert!(!map.values().any(|v| v == ""));
  }
}
