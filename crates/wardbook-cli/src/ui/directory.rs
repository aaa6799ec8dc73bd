//! Patient directory — statistics row, search bar, filter panel, results
//! table, pagination footer.

use chrono::Utc;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use crate::{
  app::{App, DirectoryInput, FilterField},
  ui::status_color,
};

/// Render the directory screen into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let mut constraints = vec![
    Constraint::Length(1), // statistics
    Constraint::Length(1), // search bar
  ];
  if app.directory.panel_open() {
    constraints.push(Constraint::Length(4));
  }
  constraints.push(Constraint::Min(0)); // table
  constraints.push(Constraint::Length(1)); // pagination footer

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints(constraints)
    .split(area);

  let mut next = 0;
  let mut take = || {
    let r = rows[next];
    next += 1;
    r
  };

  draw_statistics(f, take(), app);
  draw_search_bar(f, take(), app);
  if app.directory.panel_open() {
    draw_filter_panel(f, take(), app);
  }
  draw_table(f, take(), app);
  draw_footer(f, take(), app);
}

// ─── Statistics ───────────────────────────────────────────────────────────────

fn draw_statistics(f: &mut Frame, area: Rect, app: &App) {
  let stats = app.directory.statistics();
  let line = Line::from(vec![
    Span::styled(
      format!(" {} patients", stats.total),
      Style::default().add_modifier(Modifier::BOLD),
    ),
    Span::raw("   "),
    Span::styled(
      format!("{} active", stats.active),
      Style::default().fg(Color::Green),
    ),
    Span::raw("   "),
    Span::styled(
      format!("{} inactive", stats.inactive),
      Style::default().fg(Color::Yellow),
    ),
    Span::raw("   "),
    Span::styled(
      format!("{} deceased", stats.deceased),
      Style::default().fg(Color::Red),
    ),
    Span::raw("   "),
    Span::styled(
      format!("{} registered today", stats.registered_today),
      Style::default().fg(Color::DarkGray),
    ),
  ]);
  f.render_widget(Paragraph::new(line), area);
}

// ─── Search bar ───────────────────────────────────────────────────────────────

fn draw_search_bar(f: &mut Frame, area: Rect, app: &App) {
  let searching = matches!(app.input, DirectoryInput::Search);
  let committed = app.directory.committed().query.as_deref();

  let (text, style) = if searching {
    (
      format!(" /{}_", app.search_input),
      Style::default().fg(Color::Yellow),
    )
  } else if let Some(query) = committed {
    (format!(" /{query}"), Style::default().fg(Color::Gray))
  } else {
    (
      " press / to search by name, MRN, or phone".to_string(),
      Style::default().fg(Color::DarkGray),
    )
  };

  f.render_widget(Paragraph::new(text).style(style), area);
}

// ─── Filter panel ─────────────────────────────────────────────────────────────

fn draw_filter_panel(f: &mut Frame, area: Rect, app: &App) {
  let active_field = match app.input {
    DirectoryInput::FilterPanel(field) => Some(field),
    _ => None,
  };
  let draft = app.directory.draft();

  let block = Block::default()
    .title(" Filters ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut first = filter_spans(
    "Status",
    draft.status.map(|s| s.as_str().to_string()),
    active_field == Some(FilterField::Status),
  );
  first.push(Span::raw("    "));
  first.extend(filter_spans(
    "Gender",
    draft.gender.map(|g| g.as_str().to_string()),
    active_field == Some(FilterField::Gender),
  ));

  let mut second = filter_spans(
    "Age min",
    draft.age_min.map(|n| n.to_string()),
    active_field == Some(FilterField::AgeMin),
  );
  second.push(Span::raw("   "));
  second.extend(filter_spans(
    "Age max",
    draft.age_max.map(|n| n.to_string()),
    active_field == Some(FilterField::AgeMax),
  ));

  f.render_widget(
    Paragraph::new(vec![Line::from(first), Line::from(second)]),
    inner,
  );
}

fn filter_spans(
  label: &str,
  value: Option<String>,
  active: bool,
) -> Vec<Span<'static>> {
  let label_style = if active {
    Style::default()
      .fg(Color::Yellow)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  };
  vec![
    Span::styled(format!("{label}: "), label_style),
    Span::raw(value.unwrap_or_else(|| "any".into())),
  ]
}

// ─── Results table ────────────────────────────────────────────────────────────

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
  let pagination = app.directory.pagination();
  let block = Block::default()
    .title(format!(" Patients ({}) ", pagination.total))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if app.directory.patients().is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No patients found.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let today = Utc::now().date_naive();
  let rows: Vec<Row> = app
    .directory
    .patients()
    .iter()
    .map(|p| {
      let marker = if app.directory.is_selected(p.patient_id) {
        "●"
      } else {
        " "
      };
      let age = p
        .age_on(today)
        .map(|a| a.to_string())
        .unwrap_or_else(|| "—".into());
      Row::new(vec![
        Cell::from(marker),
        Cell::from(p.mrn.clone()),
        Cell::from(p.full_name()),
        Cell::from(age),
        Cell::from(p.gender.as_str()),
        Cell::from(p.phone.clone().unwrap_or_else(|| "—".into())),
        Cell::from(Span::styled(
          p.status.as_str(),
          Style::default().fg(status_color(p.status)),
        )),
      ])
    })
    .collect();

  let table = Table::new(
    rows,
    [
      Constraint::Length(1),
      Constraint::Length(18),
      Constraint::Min(20),
      Constraint::Length(4),
      Constraint::Length(8),
      Constraint::Length(14),
      Constraint::Length(10),
    ],
  )
  .header(
    Row::new(vec!["", "MRN", "Name", "Age", "Gender", "Phone", "Status"])
      .style(
        Style::default()
          .fg(Color::Gray)
          .add_modifier(Modifier::BOLD),
      ),
  )
  .row_highlight_style(
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )
  .block(block);

  let mut state = TableState::default();
  state.select(Some(app.cursor));
  f.render_stateful_widget(table, area, &mut state);
}

// ─── Footer ───────────────────────────────────────────────────────────────────

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
  let pagination = app.directory.pagination();
  let (start, end) = app.directory.display_bounds();

  let mut spans = vec![Span::styled(
    format!(
      " Showing {start}–{end} of {}  ·  page {}/{}",
      pagination.total,
      pagination.page.max(1),
      pagination.pages.max(1),
    ),
    Style::default().fg(Color::Gray),
  )];

  let selected = app.directory.selected().len();
  if selected > 0 {
    spans.push(Span::styled(
      format!("  ·  {selected} selected"),
      Style::default().fg(Color::Cyan),
    ));
  }
  if app.directory.committed().has_filters() {
    spans.push(Span::styled(
      "  ·  filters set",
      Style::default().fg(Color::Yellow),
    ));
  }
  if app.directory.filter_action_in_flight() {
    spans.push(Span::styled(
      "  ·  applying…",
      Style::default().fg(Color::DarkGray),
    ));
  }

  f.render_widget(Paragraph::new(Line::from(spans)), area);
}
