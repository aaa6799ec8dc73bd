//! Login screen — username/password form with an inline error line.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

/// Render the login form into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let width = 46.min(area.width);
  let height = 9.min(area.height);
  let form = Rect {
    x: area.x + (area.width.saturating_sub(width)) / 2,
    y: area.y + (area.height.saturating_sub(height)) / 2,
    width,
    height,
  };

  let block = Block::default()
    .title(" Sign In ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(form);
  f.render_widget(block, form);

  let masked = "*".repeat(app.login.password.chars().count());
  let lines = vec![
    Line::from(""),
    field_line("Username", &app.login.username, !app.login.focus_password),
    field_line("Password", &masked, app.login.focus_password),
    Line::from(""),
    match &app.login.error {
      Some(error) => Line::from(Span::styled(
        error.clone(),
        Style::default().fg(Color::Red),
      )),
      None => Line::from(Span::styled(
        "Enter to sign in",
        Style::default().fg(Color::DarkGray),
      )),
    },
  ];

  f.render_widget(Paragraph::new(lines), inner);
}

fn field_line<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
  let label_style = if focused {
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  };
  let mut text = value.to_string();
  if focused {
    text.push('_');
  }
  Line::from(vec![
    Span::styled(format!("  {label:<10}"), label_style),
    Span::raw(text),
  ])
}
