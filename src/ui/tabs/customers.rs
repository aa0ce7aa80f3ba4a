//! Customers tab - searchable paginated directory with a detail pane.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, AppState, Focus};
use crate::models::Customer;
use crate::ui::styles;
use crate::utils::format::format_date;
use crate::utils::truncate;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(8)])
        .split(area);

    render_search_line(frame, app, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(chunks[1]);

    render_customer_list(frame, app, panes[0]);
    render_customer_detail(frame, app, panes[1]);
}

fn render_search_line(frame: &mut Frame, app: &App, area: Rect) {
    let searching = matches!(app.state, AppState::Searching);
    let mut spans = vec![Span::styled(" Search: ", styles::muted_style())];
    if app.search_query.is_empty() && !searching {
        spans.push(Span::styled("(press / to filter)", styles::muted_style()));
    } else {
        spans.push(Span::styled(app.search_query.clone(), styles::search_style()));
        if searching {
            spans.push(Span::styled("_", styles::search_style()));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_customer_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);
    let filtered_count = app.filtered_customers().len();
    let visible = app.visible_customers();

    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Kana"),
        Cell::from("Gender"),
        Cell::from("Age"),
        Cell::from("Status"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, customer)| {
            let style = if i == app.customer_selection {
                styles::selected_style()
            } else if customer.is_active {
                styles::list_item_style()
            } else {
                styles::inactive_style()
            };
            Row::new([
                Cell::from(customer.name.clone()),
                Cell::from(customer.kana.clone()),
                Cell::from(customer.gender.display()),
                Cell::from(customer.age_str()),
                Cell::from(customer.status_label()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(28),
        Constraint::Percentage(28),
        Constraint::Length(8),
        Constraint::Length(5),
        Constraint::Length(10),
    ];

    let title = format!(
        " Customers ({}) - {} ",
        filtered_count,
        app.customer_pager.label(filtered_count)
    );

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );

    let mut state = TableState::default();
    state.select(Some(app.customer_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_customer_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let content = match app.selected_customer() {
        Some(customer) => detail_lines(customer),
        None => vec![Line::from(Span::styled(
            "No customer selected",
            styles::muted_style(),
        ))],
    };

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title(" Detail ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );
    frame.render_widget(paragraph, area);
}

fn detail_lines(customer: &Customer) -> Vec<Line<'_>> {
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<12}", label), styles::muted_style()),
            Span::raw(value),
        ])
    };
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        Line::from(Span::styled(customer.name.clone(), styles::title_style())),
        Line::from(Span::styled(customer.kana.clone(), styles::muted_style())),
        Line::from(""),
        field("Gender", customer.gender.display().to_string()),
        field(
            "Birthday",
            format!("{} (age {})", customer.birthday_str(), customer.age_str()),
        ),
        field("Email", optional(&customer.email)),
        field("Phone", optional(&customer.phone)),
        field("Address", truncate(&optional(&customer.address), 40)),
        Line::from(""),
        field("Medical", optional(&customer.medical)),
        field("Restricted", optional(&customer.taboo)),
        field(
            "Height",
            customer
                .height
                .map(|h| format!("{} cm", h))
                .unwrap_or_else(|| "-".to_string()),
        ),
        field("Memo", truncate(&optional(&customer.memo), 40)),
    ];

    lines.push(Line::from(""));
    lines.push(field("Status", customer.status_label().to_string()));
    if let Some(created) = &customer.created_at {
        lines.push(field("Member since", format_date(created)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[n]ew [e]dit [d]elete",
        styles::muted_style(),
    )));

    lines
}
