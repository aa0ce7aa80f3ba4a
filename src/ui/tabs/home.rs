//! Home tab - role-specific dashboard.
//!
//! Admins and managers see the home API's dashboard (recent lessons,
//! total count, pre-bucketed chart, upcoming lessons); trainers see the
//! same layout derived locally from their own lessons.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;

use super::lesson_table;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(home) = &app.home else {
        let message = if app.home_loading {
            "Loading dashboard..."
        } else if let Some(error) = &app.home_error {
            error.as_str()
        } else {
            "No dashboard data yet - press [r] to refresh"
        };
        let style = if app.home_error.is_some() {
            styles::error_style()
        } else {
            styles::muted_style()
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(message, style)))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),  // Summary line
            Constraint::Length(10), // Chart
            Constraint::Min(8),     // Recent + upcoming
        ])
        .split(area);

    render_summary(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);

    let focused = matches!(app.focus, Focus::List);
    lesson_table(
        frame,
        lists[0],
        format!(" Recent lessons ({}) ", home.recent.len()),
        &home.recent,
        Some(app.home_selection),
        focused,
    );
    lesson_table(
        frame,
        lists[1],
        format!(" Upcoming ({}) ", home.upcoming.len()),
        &home.upcoming,
        None,
        false,
    );
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let Some(home) = &app.home else {
        return;
    };

    let mut spans = vec![Span::raw(" ")];
    if let Some(principal) = &app.principal {
        spans.push(Span::styled(
            format!("{} ({})", principal.display_name(), principal.role),
            styles::highlight_style(),
        ));
        spans.push(Span::styled("  |  ", styles::muted_style()));
    }
    spans.push(Span::styled("Completed lessons: ", styles::muted_style()));
    spans.push(Span::styled(
        home.total_lessons.to_string(),
        styles::chart_value_style(),
    ));
    spans.push(Span::styled("  |  ", styles::muted_style()));
    spans.push(Span::styled(
        format!("{} chart [g]", app.granularity.label()),
        styles::muted_style(),
    ));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let Some(home) = &app.home else {
        return;
    };

    let data: Vec<(&str, u64)> = home
        .chart
        .iter()
        .map(|bucket| (bucket.label.as_str(), bucket.count as u64))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!(" Lessons per {} ", app.granularity.as_param()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        )
        .data(&data)
        .bar_width(7)
        .bar_gap(2)
        .max(home.chart_scale as u64)
        .bar_style(styles::chart_bar_style())
        .value_style(styles::chart_value_style());

    frame.render_widget(chart, area);
}
