//! Frame rendering: layout, tab dispatch, status bar, and overlays.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, CustomerForm, FormField, LoginFocus, Tab};

use super::styles;
use super::tabs::{customers, history, home};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(1), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::EditingCustomer => {
            if let Some(form) = &app.form {
                render_form_overlay(frame, form);
            }
        }
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  lessondesk";
    let help_hint = "[?] Help";

    let line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + help_hint.len() + 4),
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [Tab::Home, Tab::Customers, Tab::History];

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if app.current_tab == *tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Home => home::render(frame, app, area),
        Tab::Customers => customers::render(frame, app, area),
        Tab::History => history::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // First line: the most relevant message; errors win over chatter
    let first_error = app
        .store_error
        .as_deref()
        .or(app.home_error.as_deref())
        .or(app.history_error.as_deref())
        .or(app.customers_error.as_deref());

    let message_line = if let Some(error) = first_error {
        Line::from(vec![
            Span::raw(" "),
            Span::styled(error.to_string(), styles::error_style()),
        ])
    } else if let Some(message) = &app.status_message {
        Line::from(vec![
            Span::raw(" "),
            Span::styled(message.clone(), styles::success_style()),
        ])
    } else {
        let mut spans = vec![Span::raw(" ")];
        if app.store_loading || app.home_loading || app.history_loading || app.customers_loading {
            spans.push(Span::styled("Loading...", styles::search_style()));
        } else {
            spans.push(Span::styled("Ready", styles::muted_style()));
        }
        if let Some(age) = &app.store_age {
            spans.push(Span::styled(
                format!("  |  stores cached {}", age),
                styles::muted_style(),
            ));
        }
        Line::from(spans)
    };

    let hints = match app.current_tab {
        Tab::Home => " [g] chart  [r] refresh  [Enter] open  [q] quit",
        Tab::Customers => " [/] search  [n] new  [e] edit  [d] delete  [ / ] page  [q] quit",
        Tab::History => " [f] store  [g] chart  [ / ] page  [Enter] open  [q] quit",
    };

    let paragraph = Paragraph::new(vec![
        message_line,
        Line::from(Span::styled(hints, styles::muted_style())),
    ])
    .style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Overlays
// ============================================================================

fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + r.width.saturating_sub(width) / 2;
    let y = r.y + r.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 18, frame.area());
    frame.render_widget(Clear, area);

    let entries: [(&str, &str); 13] = [
        ("1/2/3", "Switch tab"),
        ("Tab", "Next tab"),
        ("j/k", "Move selection"),
        ("[ ]", "Previous / next page"),
        ("/", "Search customers (name or kana)"),
        ("f", "Cycle store filter (admin)"),
        ("g", "Toggle week/month chart"),
        ("n", "New customer"),
        ("e", "Edit selected customer"),
        ("d", "Delete selected customer"),
        ("Enter", "Open lesson detail"),
        ("r / R", "Refresh tab / refresh everything"),
        ("q", "Quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (key, description) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>6}  ", key), styles::help_key_style()),
            Span::styled(description, styles::help_desc_style()),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Keys ")
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(34, 5, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw("  Quit lessondesk? [y/n]")),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let name = app
        .pending_delete
        .as_ref()
        .map(|(_, name)| name.as_str())
        .unwrap_or("?");
    let area = centered_rect_fixed(46, 6, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  Delete "),
            Span::styled(name, styles::title_style()),
            Span::raw("?"),
        ]),
        Line::from(Span::styled(
            "  This cannot be undone. [y/n]",
            styles::error_style(),
        )),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Confirm delete ")
            .borders(Borders::ALL)
            .border_style(styles::error_style()),
    );
    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(48, 11, frame.area());
    frame.render_widget(Clear, area);

    let field = |label: &'static str, value: String, focused: bool| {
        let style = if focused {
            styles::search_style()
        } else {
            styles::list_item_style()
        };
        Line::from(vec![
            Span::styled(format!("  {:<10}", label), styles::muted_style()),
            Span::styled(value, style),
            Span::styled(if focused { "_" } else { "" }, style),
        ])
    };

    let masked = "*".repeat(app.login_password.chars().count());
    let button_focused = matches!(app.login_focus, LoginFocus::Button);

    let mut lines = vec![
        Line::from(""),
        field(
            "Email",
            app.login_email.clone(),
            matches!(app.login_focus, LoginFocus::Email),
        ),
        field(
            "Password",
            masked,
            matches!(app.login_focus, LoginFocus::Password),
        ),
        Line::from(""),
        Line::from(Span::styled(
            if button_focused { "  > Sign in <" } else { "    Sign in" },
            if button_focused {
                styles::title_style()
            } else {
                styles::muted_style()
            },
        )),
    ];

    if let Some(error) = &app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Sign in ")
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}

fn render_form_overlay(frame: &mut Frame, form: &CustomerForm) {
    let height = (FormField::ALL.len() + 6) as u16;
    let area = centered_rect_fixed(58, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (i, field) in FormField::ALL.iter().enumerate() {
        let selected = i == form.field_index;
        let marker = if selected { ">" } else { " " };
        let value_style = if selected {
            styles::search_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} {:<24}", marker, field.label()),
                if selected {
                    styles::highlight_style()
                } else {
                    styles::muted_style()
                },
            ),
            Span::styled(form.field_value(*field), value_style),
            Span::styled(if selected && field.is_text() { "_" } else { "" }, value_style),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  [Enter] save  [Esc] cancel  [Space] toggle",
            styles::muted_style(),
        )));
    }

    let title = if form.editing_id.is_some() {
        " Edit customer "
    } else {
        " New customer "
    };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}
