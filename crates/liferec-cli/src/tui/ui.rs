//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{ActivePane, App, InputMode};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(outer_chunks[0]);

    draw_records_pane(frame, app, pane_chunks[0]);
    draw_detail_pane(frame, app, pane_chunks[1]);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, outer_chunks[1]),
        InputMode::ConfirmDelete => draw_delete_prompt(frame, app, outer_chunks[1]),
    }

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(message) = &app.error_message {
        draw_error_modal(frame, message);
    }
}

fn pane_styles(is_active: bool) -> (Style, Style) {
    let border = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let highlight = if is_active {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };
    (border, highlight)
}

/// Draw the records list (left)
fn draw_records_pane(frame: &mut Frame, app: &App, area: Rect) {
    let (border_style, highlight_style) = pane_styles(app.active_pane == ActivePane::Records);
    let max_len = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = app
        .records
        .iter()
        .map(|record| {
            let label = format!("[ #{} ] {}", record.id, record.title);
            let title_line = Line::from(truncate(&label, max_len));

            let tag = if record.tag.is_empty() {
                "untagged".to_string()
            } else {
                format!("#{}", record.tag)
            };
            let meta_line = Line::from(vec![Span::styled(
                truncate(&format!("  {} · {}", record.timestamp, tag), max_len),
                Style::default().add_modifier(Modifier::DIM),
            )]);

            ListItem::new(vec![title_line, meta_line])
        })
        .collect();

    let title = format!(" Records ({}) ", app.records.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if app.records.is_empty() {
        let paragraph = Paragraph::new(Line::from(vec![Span::styled(
            "No records yet. Press 'a' to add one.",
            Style::default().add_modifier(Modifier::DIM),
        )]))
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style);

    let mut state = ListState::default();
    state.select(Some(app.record_index));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the selected record (right)
fn draw_detail_pane(frame: &mut Frame, app: &App, area: Rect) {
    let (border_style, _) = pane_styles(app.active_pane == ActivePane::Detail);

    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let content = if let Some(record) = app.current_record() {
        let mut lines = vec![
            Line::from(vec![
                Span::styled(record.title.as_str(), bold),
                Span::styled(
                    format!("  [ #{} ]", record.id),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Tag:  ", bold),
                Span::raw(if record.tag.is_empty() {
                    "-"
                } else {
                    record.tag.as_str()
                }),
            ]),
            Line::from(vec![
                Span::styled("Date: ", bold),
                Span::raw(record.timestamp.as_str()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "─".repeat(area.width.saturating_sub(2) as usize),
                Style::default().add_modifier(Modifier::DIM),
            )),
            Line::from(""),
        ];
        lines.extend(record.content.lines().map(Line::from));
        lines
    } else {
        vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Select a record to view details",
                Style::default().add_modifier(Modifier::DIM),
            )]),
        ]
    };

    // Keep 'G' in the detail pane from scrolling past the end
    let max_scroll = (content.len() as u16).saturating_sub(area.height.saturating_sub(2));
    let scroll = app.detail_scroll.min(max_scroll);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        "a:add  e:edit  d:del  ?:help  q:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Draw the y/n prompt for deleting the selected record
fn draw_delete_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let target = app
        .current_record()
        .map(|r| format!("#{} '{}'", r.id, r.title))
        .unwrap_or_default();

    let line = Line::from(vec![
        Span::styled("Delete ", Style::default().fg(Color::Red)),
        Span::raw(truncate(&target, area.width.saturating_sub(16) as usize)),
        Span::styled("? (y/n)", Style::default().fg(Color::Red)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  gg          Jump to first record"),
        Line::from("  G           Jump to last record"),
        Line::from("  h/l, ←/→    Switch panes"),
        Line::from("  Tab         Cycle panes"),
        Line::from(""),
        Line::from("Records:"),
        Line::from("  a           Add record"),
        Line::from("  e           Edit record"),
        Line::from("  d           Delete record"),
        Line::from(""),
        Line::from("  ?           Toggle this help"),
        Line::from("  q, Ctrl-C   Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
}

/// Draw an error modal over everything else
fn draw_error_modal(frame: &mut Frame, message: &str) {
    let popup_area = centered_rect(60, 9, frame.area());
    frame.render_widget(Clear, popup_area);

    let text = vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to continue",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

/// Shorten to `max` characters, marking the cut with an ellipsis
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
