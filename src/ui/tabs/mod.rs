//! Per-tab content rendering.
//!
//! `lesson_table` is the one lesson list renderer, parameterized by
//! title/rows/selection; home and history both use it rather than
//! keeping forked near-identical copies.

pub mod customers;
pub mod history;
pub mod home;

use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::models::Lesson;
use crate::ui::styles;

/// Render a lesson table. `selection` of `None` renders without a
/// highlight (plain listing panes).
pub fn lesson_table(
    frame: &mut Frame,
    area: Rect,
    title: String,
    lessons: &[Lesson],
    selection: Option<usize>,
    focused: bool,
) {
    let header = Row::new([
        Cell::from("Date"),
        Cell::from("Store"),
        Cell::from("Trainer"),
        Cell::from("Customer"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = lessons
        .iter()
        .enumerate()
        .map(|(i, lesson)| {
            let style = if selection == Some(i) {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new([
                Cell::from(lesson.formatted_span()),
                Cell::from(lesson.store_name.as_str()),
                Cell::from(lesson.trainer_name.as_str()),
                Cell::from(lesson.customer_name.as_str()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(23), // "2024/01/03 10:00~11:00"
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );

    let mut state = TableState::default();
    state.select(selection);
    frame.render_stateful_widget(table, area, &mut state);
}
