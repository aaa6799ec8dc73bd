//! Patient profile — tabbed record view with status actions.

use chrono::Utc;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use wardbook_core::patient::{
  EmergencyContact, InsuranceStatus, Patient, PatientIdentifier,
  StatusAction,
};

use crate::{
  app::{App, ProfileTab},
  ui::status_color,
};

/// Render the profile screen into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(patient) = &app.profile else {
    f.render_widget(
      Paragraph::new("No patient loaded.")
        .style(Style::default().fg(Color::DarkGray)),
      area,
    );
    return;
  };

  let block = Block::default()
    .title(format!(" {}  ({}) ", patient.full_name(), patient.mrn))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // tab strip
      Constraint::Min(0),    // tab body
      Constraint::Length(1), // status actions
    ])
    .split(inner);

  draw_tabs(f, rows[0], app.profile_tab);

  let lines = match app.profile_tab {
    ProfileTab::Overview => overview_lines(patient),
    ProfileTab::Medical => medical_lines(patient),
    ProfileTab::Contacts => contact_lines(patient),
    ProfileTab::Identifiers => identifier_lines(patient),
  };
  f.render_widget(
    Paragraph::new(lines).wrap(Wrap { trim: false }),
    rows[1],
  );

  draw_actions(f, rows[2], patient);
}

// ─── Tab strip ────────────────────────────────────────────────────────────────

fn draw_tabs(f: &mut Frame, area: Rect, current: ProfileTab) {
  let mut spans = vec![Span::raw(" ")];
  for (i, tab) in ProfileTab::ALL.into_iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
    }
    let style = if tab == current {
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(tab.title(), style));
  }
  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ─── Tab bodies ───────────────────────────────────────────────────────────────

fn overview_lines(patient: &Patient) -> Vec<Line<'static>> {
  let today = Utc::now().date_naive();
  let age = patient
    .age_on(today)
    .map(|a| format!("{a} yrs"))
    .unwrap_or_else(|| "—".into());

  let mut lines = vec![
    Line::from(""),
    Line::from(vec![
      label("Status"),
      Span::styled(
        patient.status.as_str(),
        Style::default()
          .fg(status_color(patient.status))
          .add_modifier(Modifier::BOLD),
      ),
    ]),
    field("Date of birth", format!("{}  ({age})", patient.date_of_birth)),
    field("Gender", patient.gender.as_str()),
    field("National ID", opt(&patient.national_id)),
    field("Phone", opt(&patient.phone)),
    field("Email", opt(&patient.email)),
    field("Address", opt(&patient.address)),
    Line::from(""),
    field(
      "County",
      match (&patient.county, &patient.sub_county) {
        (Some(county), Some(sub)) => format!("{county} / {sub}"),
        (Some(county), None) => county.clone(),
        _ => "—".into(),
      },
    ),
    field("Ward", opt(&patient.ward)),
    field("Village", opt(&patient.village)),
    Line::from(""),
    field("Marital status", opt(&patient.marital_status)),
    field("Occupation", opt(&patient.occupation)),
  ];

  if patient.next_of_kin_name.is_some() {
    lines.push(Line::from(""));
    lines.push(field(
      "Next of kin",
      format!(
        "{} ({})",
        opt(&patient.next_of_kin_name),
        opt(&patient.next_of_kin_relationship),
      ),
    ));
    lines.push(field("Kin phone", opt(&patient.next_of_kin_phone)));
  }

  lines.push(Line::from(""));
  lines.push(field(
    "Registered",
    patient.created_at.format("%Y-%m-%d %H:%M").to_string(),
  ));
  lines.push(field(
    "Last updated",
    patient.updated_at.format("%Y-%m-%d %H:%M").to_string(),
  ));
  lines
}

fn medical_lines(patient: &Patient) -> Vec<Line<'static>> {
  vec![
    Line::from(""),
    field("Blood group", opt(&patient.blood_group)),
    field("Allergies", opt(&patient.allergies)),
    field("Chronic", opt(&patient.chronic_conditions)),
    Line::from(""),
    field("Insurance", opt(&patient.insurance_provider)),
    field("Member no.", opt(&patient.insurance_number)),
    field(
      "Cover status",
      match patient.insurance_status {
        Some(InsuranceStatus::Active) => "Active",
        Some(InsuranceStatus::Inactive) => "Inactive",
        Some(InsuranceStatus::Pending) => "Pending",
        None => "—",
      },
    ),
  ]
}

fn contact_lines(patient: &Patient) -> Vec<Line<'static>> {
  let Some(contacts) = patient
    .emergency_contacts
    .as_ref()
    .filter(|c| !c.is_empty())
  else {
    return vec![
      Line::from(""),
      Line::from(Span::styled(
        "  No emergency contacts on record.",
        Style::default().fg(Color::DarkGray),
      )),
    ];
  };

  let mut lines = vec![Line::from("")];
  for contact in contacts {
    lines.extend(one_contact(contact));
    lines.push(Line::from(""));
  }
  lines
}

fn one_contact(contact: &EmergencyContact) -> Vec<Line<'static>> {
  let mut head = vec![
    Span::styled(
      format!("  {}", contact.name),
      Style::default().add_modifier(Modifier::BOLD),
    ),
    Span::styled(
      format!("  ({})", contact.relationship),
      Style::default().fg(Color::Gray),
    ),
  ];
  if contact.is_primary {
    head.push(Span::styled(
      "  primary",
      Style::default().fg(Color::Cyan),
    ));
  }
  if contact.can_make_decisions {
    head.push(Span::styled(
      "  can make decisions",
      Style::default().fg(Color::Yellow),
    ));
  }

  let mut lines = vec![Line::from(head), field("Phone", {
    let mut phones = contact.phone.clone();
    if let Some(alt) = &contact.alternate_phone {
      phones.push_str(&format!(" / {alt}"));
    }
    phones
  })];
  if contact.email.is_some() {
    lines.push(field("Email", opt(&contact.email)));
  }
  if contact.address.is_some() {
    lines.push(field("Address", opt(&contact.address)));
  }
  if contact.notes.is_some() {
    lines.push(field("Notes", opt(&contact.notes)));
  }
  lines
}

fn identifier_lines(patient: &Patient) -> Vec<Line<'static>> {
  let Some(identifiers) =
    patient.identifiers.as_ref().filter(|i| !i.is_empty())
  else {
    return vec![
      Line::from(""),
      Line::from(Span::styled(
        "  No identifiers on record.",
        Style::default().fg(Color::DarkGray),
      )),
    ];
  };

  let mut lines = vec![Line::from("")];
  for identifier in identifiers {
    lines.extend(one_identifier(identifier));
    lines.push(Line::from(""));
  }
  lines
}

fn one_identifier(identifier: &PatientIdentifier) -> Vec<Line<'static>> {
  let mut head = vec![
    Span::styled(
      format!("  {}", identifier.identifier_type),
      Style::default().add_modifier(Modifier::BOLD),
    ),
    Span::raw(format!("  {}", identifier.identifier_value)),
  ];
  if identifier.is_primary {
    head.push(Span::styled(
      "  primary",
      Style::default().fg(Color::Cyan),
    ));
  }

  let mut lines = vec![Line::from(head)];
  if identifier.issuing_authority.is_some() {
    lines.push(field("Issued by", opt(&identifier.issuing_authority)));
  }
  match (identifier.issue_date, identifier.expiry_date) {
    (Some(issued), Some(expires)) => {
      lines.push(field("Valid", format!("{issued} — {expires}")));
    }
    (Some(issued), None) => lines.push(field("Issued", issued.to_string())),
    (None, Some(expires)) => {
      lines.push(field("Expires", expires.to_string()));
    }
    (None, None) => {}
  }
  lines
}

// ─── Status actions ───────────────────────────────────────────────────────────

fn draw_actions(f: &mut Frame, area: Rect, patient: &Patient) {
  let actions = patient.status.available_actions();
  let line = if actions.is_empty() {
    Line::from(Span::styled(
      " No status actions — this record is closed.",
      Style::default().fg(Color::DarkGray),
    ))
  } else {
    let mut spans = vec![Span::raw(" ")];
    for (i, action) in actions.iter().enumerate() {
      if i > 0 {
        spans.push(Span::raw("   "));
      }
      let (key, label) = match action {
        StatusAction::Deactivate => ("[d]", "deactivate"),
        StatusAction::MarkActive => ("[m]", "mark active"),
        StatusAction::MarkDeceased => ("[x]", "mark deceased"),
      };
      let color = if action.is_permanent() {
        Color::Red
      } else {
        Color::Cyan
      };
      spans.push(Span::styled(
        key,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
      ));
      spans.push(Span::styled(
        format!(" {label}"),
        Style::default().fg(Color::Gray),
      ));
    }
    Line::from(spans)
  };
  f.render_widget(Paragraph::new(line), area);
}

// ─── Field helpers ────────────────────────────────────────────────────────────

fn label(text: &str) -> Span<'static> {
  Span::styled(
    format!("  {text:<16}"),
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )
}

fn field(name: &str, value: impl Into<String>) -> Line<'static> {
  Line::from(vec![label(name), Span::raw(value.into())])
}

fn opt(value: &Option<String>) -> String {
  value.clone().unwrap_or_else(|| "—".into())
}
