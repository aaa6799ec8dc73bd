//! TUI rendering — orchestrates all screens and overlay dialogs.

pub mod directory;
pub mod login;
pub mod profile;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use wardbook_core::patient::PatientStatus;

use crate::app::{App, DirectoryInput, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);

  match app.screen {
    Screen::Login => login::draw(f, rows[1], app),
    Screen::Directory => directory::draw(f, rows[1], app),
    Screen::Profile => profile::draw(f, rows[1], app),
  }

  draw_status(f, rows[2], app);

  // Overlays go last so they sit on top of whatever screen is showing.
  if let Some(notice) = &app.notice {
    draw_notice(f, area, &notice.title, &notice.body);
  }
  if let Some(confirm) = &app.confirm {
    draw_confirm(
      f,
      area,
      confirm.action.confirm_title(),
      confirm.action.confirm_prompt(),
    );
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let left = Span::styled(
    " wardbook",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = match app.session.session() {
    Some(session) => {
      let who = if session.user.full_name.is_empty() {
        session.user.username.clone()
      } else {
        session.user.full_name.clone()
      };
      Span::styled(
        format!("{} ({}) ", who, session.user.role),
        Style::default().fg(Color::Gray),
      )
    }
    None => Span::styled("signed out ", Style::default().fg(Color::Gray)),
  };

  let pad = area
    .width
    .saturating_sub(left.content.len() as u16)
    .saturating_sub(right.content.len() as u16);
  let line =
    Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    Screen::Login => ("LOGIN", "Tab switch field  Enter sign in  Ctrl-C quit"),
    Screen::Directory => match app.input {
      DirectoryInput::Search => {
        ("SEARCH", "Type query  Enter search  Esc cancel")
      }
      DirectoryInput::FilterPanel(_) => (
        "FILTER",
        "Tab field  ←→ value  0-9 age  Enter apply  c clear  Esc close",
      ),
      DirectoryInput::Normal => (
        "LIST",
        "↑↓ move  ←→ page  Enter open  / search  f filters  space/a select  \
         r refresh  o sign out  q quit",
      ),
    },
    Screen::Profile => (
      "PROFILE",
      "Tab tabs  d deactivate  m mark active  x mark deceased  Esc back",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Overlays ─────────────────────────────────────────────────────────────────

fn draw_notice(f: &mut Frame, area: Rect, title: &str, body: &str) {
  let popup = centered_rect(area, 50, 20);
  let block = Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));
  let inner = block.inner(popup);
  f.render_widget(Clear, popup);
  f.render_widget(block, popup);
  f.render_widget(
    Paragraph::new(vec![
      Line::from(body.to_string()),
      Line::from(""),
      Line::from(Span::styled(
        "Enter / Esc to dismiss",
        Style::default().fg(Color::DarkGray),
      )),
    ])
    .wrap(Wrap { trim: true }),
    inner,
  );
}

fn draw_confirm(f: &mut Frame, area: Rect, title: &str, prompt: &str) {
  let popup = centered_rect(area, 55, 25);
  let block = Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let inner = block.inner(popup);
  f.render_widget(Clear, popup);
  f.render_widget(block, popup);
  f.render_widget(
    Paragraph::new(vec![
      Line::from(prompt.to_string()),
      Line::from(""),
      Line::from(vec![
        Span::styled(
          "[y] confirm",
          Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("[n] cancel", Style::default().fg(Color::DarkGray)),
      ]),
    ])
    .wrap(Wrap { trim: true }),
    inner,
  );
}

/// Colour shared by every screen that shows a patient status.
pub(crate) fn status_color(status: PatientStatus) -> Color {
  match status {
    PatientStatus::Active => Color::Green,
    PatientStatus::Inactive => Color::Yellow,
    PatientStatus::Deceased => Color::Red,
  }
}

/// A rectangle centred in `area`, sized as percentages of it.
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
  let vertical = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage((100 - percent_y) / 2),
      Constraint::Percentage(percent_y),
      Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);
  let horizontal = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - percent_x) / 2),
      Constraint::Percentage(percent_x),
      Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1]);
  horizontal[1]
}
