//! History tab - paginated past lessons with a store filter and a
//! week/month chart.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::Lesson;
use crate::ui::styles;

use super::lesson_table;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Filter line
            Constraint::Min(8),    // Table + detail
            Constraint::Length(9), // Chart
        ])
        .split(area);

    render_filter_line(frame, app, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    let focused = matches!(app.focus, Focus::List);
    let visible = app.visible_history();
    let title = format!(
        " Lesson history ({}) - {} ",
        app.lessons.len(),
        app.history_pager.label(app.lessons.len())
    );
    lesson_table(
        frame,
        panes[0],
        title,
        visible,
        Some(app.history_selection),
        focused,
    );
    render_lesson_detail(frame, app, panes[1]);
    render_chart(frame, app, chunks[2]);
}

fn render_filter_line(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" Store: ", styles::muted_style()),
        Span::styled(app.history_filter_label(), styles::highlight_style()),
        Span::styled("  [f] cycle", styles::muted_style()),
        Span::styled("  |  ", styles::muted_style()),
        Span::styled(
            format!("{} chart [g]", app.granularity.label()),
            styles::muted_style(),
        ),
        Span::styled("  |  [ / ] page", styles::muted_style()),
    ];
    if app.history_loading {
        spans.push(Span::styled("  loading...", styles::search_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_lesson_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let content = match app.selected_history_lesson() {
        Some(lesson) => detail_lines(lesson, app.detail_route.as_deref()),
        None => vec![Line::from(Span::styled(
            "No lesson selected",
            styles::muted_style(),
        ))],
    };

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title(" Lesson ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );
    frame.render_widget(paragraph, area);
}

fn detail_lines<'a>(lesson: &'a Lesson, route: Option<&'a str>) -> Vec<Line<'a>> {
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<10}", label), styles::muted_style()),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            lesson.customer_name.clone(),
            styles::title_style(),
        )),
        Line::from(""),
        field("When", lesson.formatted_span()),
        field("Store", lesson.store_name.clone()),
        field("Trainer", lesson.trainer_name.clone()),
    ];

    if let Some(route) = route {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(route, styles::muted_style())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] open detail",
        styles::muted_style(),
    )));
    lines
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let (buckets, scale) = app.history_chart();
    let data: Vec<(&str, u64)> = buckets
        .iter()
        .map(|bucket| (bucket.label.as_str(), bucket.count as u64))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!(" {} lesson counts ", app.granularity.label()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        )
        .data(&data)
        .bar_width(7)
        .bar_gap(2)
        .max(scale as u64)
        .bar_style(styles::chart_bar_style())
        .value_style(styles::chart_value_style());

    frame.render_widget(chart, area);
}
