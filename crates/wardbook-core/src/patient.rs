//! Patient records and the status state machine.
//!
//! A patient is never hard-deleted: `deactivate` and `mark deceased` are
//! soft states driven through distinct endpoints, each with its own
//! server-side side effects. The client therefore models each transition
//! as a distinct [`StatusAction`], not a generic "set status" call.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
  Male,
  Female,
  Other,
}

impl Gender {
  pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

  pub fn as_str(self) -> &'static str {
    match self {
      Gender::Male => "Male",
      Gender::Female => "Female",
      Gender::Other => "Other",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsuranceStatus {
  Active,
  Inactive,
  Pending,
}

// ─── Status state machine ────────────────────────────────────────────────────

/// Soft lifecycle status of a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientStatus {
  Active,
  Inactive,
  Deceased,
}

impl PatientStatus {
  pub const ALL: [PatientStatus; 3] = [
    PatientStatus::Active,
    PatientStatus::Inactive,
    PatientStatus::Deceased,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      PatientStatus::Active => "Active",
      PatientStatus::Inactive => "Inactive",
      PatientStatus::Deceased => "Deceased",
    }
  }

  /// Whether `action` is a legal transition out of this status.
  ///
  /// `Active ⇄ Inactive`; `Active → Deceased` is terminal. A deceased
  /// record has no outgoing transition.
  pub fn can_apply(self, action: StatusAction) -> bool {
    matches!(
      (self, action),
      (PatientStatus::Active, StatusAction::Deactivate)
        | (PatientStatus::Active, StatusAction::MarkDeceased)
        | (PatientStatus::Inactive, StatusAction::MarkActive)
    )
  }

  /// The actions a screen may offer for a record in this status.
  pub fn available_actions(self) -> &'static [StatusAction] {
    match self {
      PatientStatus::Active => {
        &[StatusAction::Deactivate, StatusAction::MarkDeceased]
      }
      PatientStatus::Inactive => &[StatusAction::MarkActive],
      PatientStatus::Deceased => &[],
    }
  }
}

impl std::fmt::Display for PatientStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One status transition, mapped one-to-one onto its endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
  /// `PUT /patients/:id/deactivate` — reversible.
  Deactivate,
  /// `PUT /patients/:id/active` — reversible.
  MarkActive,
  /// `PUT /patients/:id/deceased` — permanent.
  MarkDeceased,
}

impl StatusAction {
  /// The status the record holds after the server confirms the action.
  pub fn target(self) -> PatientStatus {
    match self {
      StatusAction::Deactivate => PatientStatus::Inactive,
      StatusAction::MarkActive => PatientStatus::Active,
      StatusAction::MarkDeceased => PatientStatus::Deceased,
    }
  }

  /// Permanent actions get the stronger confirmation treatment.
  pub fn is_permanent(self) -> bool {
    matches!(self, StatusAction::MarkDeceased)
  }

  /// Dialog title for the mandatory confirmation step.
  pub fn confirm_title(self) -> &'static str {
    match self {
      StatusAction::Deactivate => "Deactivate Patient",
      StatusAction::MarkActive => "Mark Patient as Active",
      StatusAction::MarkDeceased => "Mark Patient as Deceased",
    }
  }

  /// Dialog body for the mandatory confirmation step.
  pub fn confirm_prompt(self) -> &'static str {
    match self {
      StatusAction::Deactivate => {
        "Are you sure you want to deactivate this patient? This action can \
         be reversed."
      }
      StatusAction::MarkActive => {
        "Are you sure you want to mark this patient as active? This action \
         can be reversed."
      }
      StatusAction::MarkDeceased => {
        "Are you sure you want to mark this patient as deceased? This \
         action is permanent."
      }
    }
  }
}

impl std::fmt::Display for StatusAction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      StatusAction::Deactivate => "deactivate",
      StatusAction::MarkActive => "mark-active",
      StatusAction::MarkDeceased => "mark-deceased",
    })
  }
}

/// Validate `action` against `from`, returning the resulting status.
pub fn check_transition(
  from: PatientStatus,
  action: StatusAction,
) -> Result<PatientStatus, Error> {
  if from.can_apply(action) {
    Ok(action.target())
  } else {
    Err(Error::InvalidTransition { from, action })
  }
}

// ─── Patient record ──────────────────────────────────────────────────────────

/// A patient as returned by the record-keeping API.
///
/// `patient_id` and `mrn` are immutable identity: the MRN is assigned by
/// the server at creation and is never client-chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
  pub patient_id: Uuid,
  pub mrn:        String,

  pub first_name:    String,
  pub last_name:     String,
  pub date_of_birth: NaiveDate,
  pub gender:        Gender,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub national_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address:     Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub county:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sub_county: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ward:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub village:    Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub blood_group:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allergies:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub chronic_conditions: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub marital_status: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub occupation:     Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub insurance_provider: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub insurance_number:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub insurance_status:   Option<InsuranceStatus>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_of_kin_name:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_of_kin_relationship: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_of_kin_phone:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_of_kin_address:      Option<String>,

  pub status: PatientStatus,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_by: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_by: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,

  /// Embedded sub-entities, present when the server includes them
  /// (detail fetches do, list fetches generally do not).
  #[serde(
    default,
    rename = "Identifiers",
    skip_serializing_if = "Option::is_none"
  )]
  pub identifiers: Option<Vec<PatientIdentifier>>,
  #[serde(
    default,
    rename = "EmergencyContacts",
    skip_serializing_if = "Option::is_none"
  )]
  pub emergency_contacts: Option<Vec<EmergencyContact>>,
}

impl Patient {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  /// Whole years of age as of `today`. `None` if `today` precedes the
  /// date of birth.
  pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
    today.years_since(self.date_of_birth)
  }
}

// ─── Sub-entities ────────────────────────────────────────────────────────────

/// A document identifier attached to a patient. At most one identifier per
/// type may be flagged primary; the server enforces this, the client only
/// displays and submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientIdentifier {
  pub identifier_id:    Uuid,
  pub patient_id:       Uuid,
  pub identifier_type:  String,
  pub identifier_value: String,
  pub is_primary:       bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub issuing_authority: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub issue_date:        Option<NaiveDate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub expiry_date:       Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
  pub contact_id:   Uuid,
  pub patient_id:   Uuid,
  pub name:         String,
  pub relationship: String,
  pub phone:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alternate_phone: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address:         Option<String>,
  pub is_primary:         bool,
  pub can_make_decisions: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Outbound payloads ───────────────────────────────────────────────────────

/// Body of `POST /patients`. Optional fields left empty by the form are
/// `None` and therefore absent from the serialized body — the server must
/// never receive an empty string for an omitted field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPatient {
  pub first_name:    String,
  pub last_name:     String,
  pub date_of_birth: NaiveDate,
  pub gender:        Gender,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub national_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub county:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sub_county:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ward:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub village:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blood_group:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub marital_status:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub occupation:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allergies:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chronic_conditions: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub insurance_provider: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub insurance_number:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub insurance_status:   Option<InsuranceStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_of_kin_name:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_of_kin_relationship: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_of_kin_phone:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_of_kin_address:      Option<String>,
}

/// Body of `PUT /patients/:id` — a partial update; absent fields are left
/// untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatientUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date_of_birth: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gender:        Option<Gender>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub national_id:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub county:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sub_county:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ward:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub village:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blood_group:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub marital_status:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub occupation:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allergies:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chronic_conditions: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub insurance_provider: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub insurance_number:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub insurance_status:   Option<InsuranceStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_of_kin_name:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_of_kin_relationship: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_of_kin_phone:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_of_kin_address:      Option<String>,
}

/// Body of `POST /patients/:id/identifiers`.
#[derive(Debug, Clone, Serialize)]
pub struct NewIdentifier {
  pub identifier_type:  String,
  pub identifier_value: String,
  pub is_primary:       bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub issuing_authority: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub issue_date:        Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expiry_date:       Option<NaiveDate>,
}

/// Body of `POST /patients/:id/emergency-contacts`.
#[derive(Debug, Clone, Serialize)]
pub struct NewEmergencyContact {
  pub name:         String,
  pub relationship: String,
  pub phone:        String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alternate_phone: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address:         Option<String>,
  pub is_primary:         bool,
  pub can_make_decisions: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

/// Body of `PUT /patients/emergency-contacts/:contactId` — partial.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmergencyContactUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name:            Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub relationship:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alternate_phone: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_primary:         Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub can_make_decisions: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

// ─── Form-field enumerations ─────────────────────────────────────────────────

pub const BLOOD_GROUPS: [&str; 8] =
  ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

pub const MARITAL_STATUSES: [&str; 5] =
  ["Single", "Married", "Divorced", "Widowed", "Separated"];

pub const RELATIONSHIPS: [&str; 8] = [
  "Spouse", "Parent", "Child", "Sibling", "Relative", "Friend", "Guardian",
  "Other",
];

pub const IDENTIFIER_TYPES: [&str; 7] = [
  "National ID",
  "Passport",
  "Birth Certificate",
  "NHIF",
  "Driving License",
  "Military ID",
  "Other",
];

pub const COUNTIES: [&str; 47] = [
  "Baringo",
  "Bomet",
  "Bungoma",
  "Busia",
  "Elgeyo-Marakwet",
  "Embu",
  "Garissa",
  "Homa Bay",
  "Isiolo",
  "Kajiado",
  "Kakamega",
  "Kericho",
  "Kiambu",
  "Kilifi",
  "Kirinyaga",
  "Kisii",
  "Kisumu",
  "Kitui",
  "Kwale",
  "Laikipia",
  "Lamu",
  "Machakos",
  "Makueni",
  "Mandera",
  "Marsabit",
  "Meru",
  "Migori",
  "Mombasa",
  "Murang'a",
  "Nairobi",
  "Nakuru",
  "Nandi",
  "Narok",
  "Nyamira",
  "Nyandarua",
  "Nyeri",
  "Samburu",
  "Siaya",
  "Taita-Taveta",
  "Tana River",
  "Tharaka-Nithi",
  "Trans Nzoia",
  "Turkana",
  "Uasin Gishu",
  "Vihiga",
  "Wajir",
  "West Pokot",
];

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_patient() -> Patient {
    Patient {
      patient_id:               Uuid::new_v4(),
      mrn:                      "MRN-2024-000123".into(),
      first_name:               "Amina".into(),
      last_name:                "Odhiambo".into(),
      date_of_birth:            NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
      gender:                   Gender::Female,
      national_id:              None,
      phone:                    Some("0712000111".into()),
      email:                    None,
      address:                  None,
      county:                   Some("Nairobi".into()),
      sub_county:               None,
      ward:                     None,
      village:                  None,
      blood_group:              Some("O+".into()),
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

  #[test]
  fn active_can_deactivate_and_decease() {
    assert!(PatientStatus::Active.can_apply(StatusAction::Deactivate));
    assert!(PatientStatus::Active.can_apply(StatusAction::MarkDeceased));
    assert!(!PatientStatus::Active.can_apply(StatusAction::MarkActive));
  }

  #[test]
  fn inactive_can_only_reactivate() {
    assert!(PatientStatus::Inactive.can_apply(StatusAction::MarkActive));
    assert!(!PatientStatus::Inactive.can_apply(StatusAction::Deactivate));
    assert!(!PatientStatus::Inactive.can_apply(StatusAction::MarkDeceased));
  }

  #[test]
  fn deceased_is_terminal() {
    assert!(PatientStatus::Deceased.available_actions().is_empty());
    for action in [
      StatusAction::Deactivate,
      StatusAction::MarkActive,
      StatusAction::MarkDeceased,
    ] {
      assert!(!PatientStatus::Deceased.can_apply(action));
      assert_eq!(
        check_transition(PatientStatus::Deceased, action),
        Err(Error::InvalidTransition {
          from: PatientStatus::Deceased,
          action
        })
      );
    }
  }

  #[test]
  fn check_transition_yields_the_target_status() {
    assert_eq!(
      check_transition(PatientStatus::Active, StatusAction::Deactivate),
      Ok(PatientStatus::Inactive)
    );
    assert_eq!(
      check_transition(PatientStatus::Inactive, StatusAction::MarkActive),
      Ok(PatientStatus::Active)
    );
    assert_eq!(
      check_transition(PatientStatus::Active, StatusAction::MarkDeceased),
      Ok(PatientStatus::Deceased)
    );
  }

  #[test]
  fn only_deceased_marking_is_permanent() {
    assert!(StatusAction::MarkDeceased.is_permanent());
    assert!(!StatusAction::Deactivate.is_permanent());
    assert!(!StatusAction::MarkActive.is_permanent());
  }

  #[test]
  fn age_counts_whole_years_only() {
    let patient = sample_patient();
    // Born 1990-06-15.
    let before_birthday = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
    let on_birthday = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    assert_eq!(patient.age_on(before_birthday), Some(33));
    assert_eq!(patient.age_on(on_birthday), Some(34));
  }

  #[test]
  fn new_patient_omits_absent_optionals() {
    let payload = NewPatient {
      first_name:               "Amina".into(),
      last_name:                "Odhiambo".into(),
      date_of_birth:            NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
      gender:                   Gender::Female,
      national_id:              None,
      phone:                    Some("0712000111".into()),
      email:                    None,
      address:                  None,
      county:                   None,
      sub_county:               None,
      ward:                     None,
      village:                  None,
      blood_group:              None,
      marital_status:           None,
      occupation:               None,
      allergies:                None,
      chronic_conditions:       None,
      insurance_provider:       None,
      insurance_number:         None,
      insurance_status:         Some(InsuranceStatus::Pending),
      next_of_kin_name:         None,
      next_of_kin_relationship: None,
      next_of_kin_phone:        None,
      next_of_kin_address:      None,
    };

    let value = serde_json::to_value(&payload).unwrap();
    let map = value.as_object().unwrap();
    assert!(map.contains_key("first_name"));
    assert!(map.contains_key("phone"));
    assert!(map.contains_key("insurance_status"));
    assert!(!map.contains_key("national_id"));
    assert!(!map.contains_key("email"));
    assert!(!map.contains_key("next_of_kin_name"));
    assert_eq!(map["date_of_birth"], "1990-06-15");
    assert_eq!(map["gender"], "Female");
  }

  #[test]
  fn patient_deserializes_from_api_shape() {
    let json = serde_json::json!({
      "patient_id": "7f6c1e9a-3a6f-4d3e-9f7e-0a6f0e1c2b3d",
      "mrn": "MRN-2024-000123",
      "first_name": "Amina",
      "last_name": "Odhiambo",
      "date_of_birth": "1990-06-15",
      "gender": "Female",
      "phone": "0712000111",
      "status": "Active",
      "created_at": "2024-01-10T08:30:00Z",
      "updated_at": "2024-01-10T08:30:00Z"
    });
    let patient: Patient = serde_json::from_value(json).unwrap();
    assert_eq!(patient.status, PatientStatus::Active);
    assert_eq!(patient.full_name(), "Amina Odhiambo");
    assert!(patient.identifiers.is_none());
    assert!(patient.national_id.is_none());
  }
}
