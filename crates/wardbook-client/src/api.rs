//! Async HTTP client wrapping the hospital REST API.
//!
//! The surface is split into two traits — [`AuthApi`] and [`PatientApi`] —
//! implemented by [`ApiClient`]. The session manager and directory engine
//! are generic over the traits, which keeps them testable without a
//! server.

use std::{sync::Arc, time::Duration};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;
use wardbook_core::{
  patient::{
    EmergencyContact, EmergencyContactUpdate, NewEmergencyContact,
    NewIdentifier, NewPatient, Patient, PatientIdentifier, PatientUpdate,
  },
  search::{PatientQuery, PatientStatistics, SearchPage},
  staff::{Credentials, StaffUser},
};

use crate::{
  error::{ApiError, ErrorBody},
  token::TokenStore,
};

// ─── Wire types ──────────────────────────────────────────────────────────────

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
  #[serde(rename = "accessToken")]
  pub access_token:  String,
  #[serde(rename = "refreshToken")]
  pub refresh_token: String,
  pub user:          StaffUser,
}

/// Most patient endpoints wrap their payload in `{"data": …}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  data: T,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Authentication endpoints.
pub trait AuthApi {
  async fn login(
    &self,
    credentials: &Credentials,
  ) -> Result<LoginResponse, ApiError>;

  async fn logout(&self) -> Result<(), ApiError>;

  async fn forgot_password(&self, email: &str) -> Result<(), ApiError>;

  async fn reset_password(
    &self,
    token: &str,
    new_password: &str,
  ) -> Result<(), ApiError>;

  async fn validate_reset_token(&self, token: &str) -> Result<(), ApiError>;
}

/// Patient-record endpoints.
pub trait PatientApi {
  async fn search_patients(
    &self,
    query: &PatientQuery,
  ) -> Result<SearchPage, ApiError>;

  async fn patient_statistics(&self) -> Result<PatientStatistics, ApiError>;

  async fn patient(&self, id: Uuid) -> Result<Patient, ApiError>;

  async fn patient_by_mrn(&self, mrn: &str) -> Result<Patient, ApiError>;

  async fn create_patient(
    &self,
    patient: &NewPatient,
  ) -> Result<Patient, ApiError>;

  async fn update_patient(
    &self,
    id: Uuid,
    update: &PatientUpdate,
  ) -> Result<Patient, ApiError>;

  /// `Active → Inactive`; reversible.
  async fn deactivate_patient(&self, id: Uuid) -> Result<Patient, ApiError>;

  /// `Inactive → Active`; reversible.
  async fn mark_patient_active(&self, id: Uuid)
  -> Result<Patient, ApiError>;

  /// `Active → Deceased`; permanent on the server side.
  async fn mark_patient_deceased(
    &self,
    id: Uuid,
  ) -> Result<Patient, ApiError>;

  async fn add_identifier(
    &self,
    patient_id: Uuid,
    identifier: &NewIdentifier,
  ) -> Result<PatientIdentifier, ApiError>;

  async fn add_emergency_contact(
    &self,
    patient_id: Uuid,
    contact: &NewEmergencyContact,
  ) -> Result<EmergencyContact, ApiError>;

  async fn update_emergency_contact(
    &self,
    contact_id: Uuid,
    update: &EmergencyContactUpdate,
  ) -> Result<EmergencyContact, ApiError>;

  async fn delete_emergency_contact(
    &self,
    contact_id: Uuid,
  ) -> Result<(), ApiError>;
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Connection settings for the hospital API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Base URL including any path prefix, e.g. `http://localhost:5000/api`.
  pub base_url: String,
}

/// Authenticated HTTP client.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based and the
/// token store is shared. The client attaches the stored access token as
/// a bearer credential on every request; what to do about a 401 is the
/// session manager's decision, not the client's, and nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  tokens:   Arc<dyn TokenStore>,
}

impl ApiClient {
  pub fn new(
    config: ApiConfig,
    tokens: Arc<dyn TokenStore>,
  ) -> Result<Self, ApiError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      tokens,
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.base_url)
  }

  /// Attach the stored access token, if any. An unreadable token store is
  /// treated as "no token"; the request then fails server-side as 401.
  fn authed(&self, req: RequestBuilder) -> RequestBuilder {
    match self.tokens.access_token() {
      Ok(Some(token)) => req.bearer_auth(token),
      Ok(None) => req,
      Err(e) => {
        tracing::warn!("token store read failed: {e}");
        req
      }
    }
  }

  /// Map a non-success response to [`ApiError`], preferring the server's
  /// own message over `fallback`.
  async fn expect_success(
    resp: Response,
    fallback: &str,
  ) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<ErrorBody>()
      .await
      .ok()
      .and_then(ErrorBody::into_message)
      .unwrap_or_else(|| fallback.to_string());
    if status == StatusCode::UNAUTHORIZED {
      Err(ApiError::Unauthorized(message))
    } else {
      Err(ApiError::Server {
        status: status.as_u16(),
        message,
      })
    }
  }

  /// Decode a `{"data": …}` envelope.
  async fn data<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    Ok(resp.json::<Envelope<T>>().await?.data)
  }

  async fn get_data<T: DeserializeOwned>(
    &self,
    path: &str,
    fallback: &str,
  ) -> Result<T, ApiError> {
    let resp = self.authed(self.client.get(self.url(path))).send().await?;
    Self::data(Self::expect_success(resp, fallback).await?).await
  }

  async fn put_data<T: DeserializeOwned>(
    &self,
    path: &str,
    fallback: &str,
  ) -> Result<T, ApiError> {
    let resp = self.authed(self.client.put(self.url(path))).send().await?;
    Self::data(Self::expect_success(resp, fallback).await?).await
  }
}

// ─── AuthApi ─────────────────────────────────────────────────────────────────

impl AuthApi for ApiClient {
  /// `POST /auth/login`
  async fn login(
    &self,
    credentials: &Credentials,
  ) -> Result<LoginResponse, ApiError> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(credentials)
      .send()
      .await?;
    let resp = Self::expect_success(resp, "Login failed").await?;
    Ok(resp.json().await?)
  }

  /// `POST /auth/logout`
  async fn logout(&self) -> Result<(), ApiError> {
    let resp = self
      .authed(self.client.post(self.url("/auth/logout")))
      .send()
      .await?;
    Self::expect_success(resp, "Logout failed").await?;
    Ok(())
  }

  /// `POST /auth/forgot-password`
  async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
    #[derive(Serialize)]
    struct Body<'a> {
      email: &'a str,
    }
    let resp = self
      .client
      .post(self.url("/auth/forgot-password"))
      .json(&Body { email })
      .send()
      .await?;
    Self::expect_success(resp, "Failed to request a password reset").await?;
    Ok(())
  }

  /// `POST /auth/reset-password`
  async fn reset_password(
    &self,
    token: &str,
    new_password: &str,
  ) -> Result<(), ApiError> {
    #[derive(Serialize)]
    struct Body<'a> {
      token:    &'a str,
      password: &'a str,
    }
    let resp = self
      .client
      .post(self.url("/auth/reset-password"))
      .json(&Body {
        token,
        password: new_password,
      })
      .send()
      .await?;
    Self::expect_success(resp, "Failed to reset the password").await?;
    Ok(())
  }

  /// `GET /auth/validate-reset-token/:token`
  async fn validate_reset_token(&self, token: &str) -> Result<(), ApiError> {
    let resp = self
      .client
      .get(self.url(&format!("/auth/validate-reset-token/{token}")))
      .send()
      .await?;
    Self::expect_success(resp, "This reset link is no longer valid").await?;
    Ok(())
  }
}

// ─── PatientApi ──────────────────────────────────────────────────────────────

impl PatientApi for ApiClient {
  /// `GET /patients?query=…&status=…&gender=…&age_min=…&age_max=…&page=…&limit=…`
  async fn search_patients(
    &self,
    query: &PatientQuery,
  ) -> Result<SearchPage, ApiError> {
    let resp = self
      .authed(self.client.get(self.url("/patients")))
      .query(query)
      .send()
      .await?;
    let resp = Self::expect_success(
      resp,
      "An error occurred while loading patients",
    )
    .await?;
    Self::data(resp).await
  }

  /// `GET /patients/statistics`
  async fn patient_statistics(&self) -> Result<PatientStatistics, ApiError> {
    self
      .get_data(
        "/patients/statistics",
        "Failed to load patient statistics",
      )
      .await
  }

  /// `GET /patients/:id`
  async fn patient(&self, id: Uuid) -> Result<Patient, ApiError> {
    self
      .get_data(
        &format!("/patients/{id}"),
        "An error occurred while loading patient data",
      )
      .await
  }

  /// `GET /patients/mrn/:mrn`
  async fn patient_by_mrn(&self, mrn: &str) -> Result<Patient, ApiError> {
    self
      .get_data(
        &format!("/patients/mrn/{mrn}"),
        "An error occurred while loading patient data",
      )
      .await
  }

  /// `POST /patients`
  async fn create_patient(
    &self,
    patient: &NewPatient,
  ) -> Result<Patient, ApiError> {
    let resp = self
      .authed(self.client.post(self.url("/patients")))
      .json(patient)
      .send()
      .await?;
    let resp = Self::expect_success(
      resp,
      "An error occurred while registering the patient",
    )
    .await?;
    Self::data(resp).await
  }

  /// `PUT /patients/:id`
  async fn update_patient(
    &self,
    id: Uuid,
    update: &PatientUpdate,
  ) -> Result<Patient, ApiError> {
    let resp = self
      .authed(self.client.put(self.url(&format!("/patients/{id}"))))
      .json(update)
      .send()
      .await?;
    let resp =
      Self::expect_success(resp, "Failed to update the patient").await?;
    Self::data(resp).await
  }

  /// `PUT /patients/:id/deactivate`
  async fn deactivate_patient(&self, id: Uuid) -> Result<Patient, ApiError> {
    self
      .put_data(
        &format!("/patients/{id}/deactivate"),
        "Failed to deactivate patient",
      )
      .await
  }

  /// `PUT /patients/:id/active`
  async fn mark_patient_active(
    &self,
    id: Uuid,
  ) -> Result<Patient, ApiError> {
    self
      .put_data(
        &format!("/patients/{id}/active"),
        "Failed to update patient status",
      )
      .await
  }

  /// `PUT /patients/:id/deceased`
  async fn mark_patient_deceased(
    &self,
    id: Uuid,
  ) -> Result<Patient, ApiError> {
    self
      .put_data(
        &format!("/patients/{id}/deceased"),
        "Failed to update patient status",
      )
      .await
  }

  /// `POST /patients/:id/identifiers`
  async fn add_identifier(
    &self,
    patient_id: Uuid,
    identifier: &NewIdentifier,
  ) -> Result<PatientIdentifier, ApiError> {
    let resp = self
      .authed(
        self
          .client
          .post(self.url(&format!("/patients/{patient_id}/identifiers"))),
      )
      .json(identifier)
      .send()
      .await?;
    let resp =
      Self::expect_success(resp, "Failed to add the identifier").await?;
    Self::data(resp).await
  }

  /// `POST /patients/:id/emergency-contacts`
  async fn add_emergency_contact(
    &self,
    patient_id: Uuid,
    contact: &NewEmergencyContact,
  ) -> Result<EmergencyContact, ApiError> {
    let resp = self
      .authed(self.client.post(
        self.url(&format!("/patients/{patient_id}/emergency-contacts")),
      ))
      .json(contact)
      .send()
      .await?;
    let resp =
      Self::expect_success(resp, "Failed to add the emergency contact")
        .await?;
    Self::data(resp).await
  }

  /// `PUT /patients/emergency-contacts/:contactId`
  async fn update_emergency_contact(
    &self,
    contact_id: Uuid,
    update: &EmergencyContactUpdate,
  ) -> Result<EmergencyContact, ApiError> {
    let resp = self
      .authed(self.client.put(
        self.url(&format!("/patients/emergency-contacts/{contact_id}")),
      ))
      .json(update)
      .send()
      .await?;
    let resp =
      Self::expect_success(resp, "Failed to update the emergency contact")
        .await?;
    Self::data(resp).await
  }

  /// `DELETE /patients/emergency-contacts/:contactId`
  async fn delete_emergency_contact(
    &self,
    contact_id: Uuid,
  ) -> Result<(), ApiError> {
    let resp = self
      .authed(self.client.delete(
        self.url(&format!("/patients/emergency-contacts/{contact_id}")),
      ))
      .send()
      .await?;
    Self::expect_success(resp, "Failed to delete the emergency contact")
      .await?;
    Ok(())
  }
}
