//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use shelf_core::Backend as LibraryBackend;

use super::app::{App, InputMode, LoginField, SearchTarget};
use crate::output::truncate;

/// Main UI rendering function
pub fn draw<B: LibraryBackend>(frame: &mut Frame, app: &App<B>) {
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(outer_chunks[1]);

    draw_search_bar(frame, app, outer_chunks[0]);
    draw_books_pane(frame, app, pane_chunks[0]);
    draw_detail_pane(frame, app, pane_chunks[1]);
    draw_status_bar(frame, app, outer_chunks[2]);

    if app.input_mode == InputMode::Login {
        draw_login_popup(frame, app);
    }

    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the search box (top)
fn draw_search_bar<B: LibraryBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let is_active = app.input_mode == InputMode::Search;
    let title = match app.search_target {
        SearchTarget::Catalog => " Search catalog (/) ",
        SearchTarget::Library => " Search my library (p) ",
    };

    let border_style = if is_active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if app.focused_key.is_none() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let paragraph = Paragraph::new(app.search_input.as_str()).block(block);
    frame.render_widget(paragraph, area);

    if is_active {
        let cursor_x = area.x + 1 + app.search_cursor as u16;
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Draw the book list (left)
fn draw_books_pane<B: LibraryBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let focused = app.focused_index();
    let books = app.ctx.books();
    let max_len = area.width.saturating_sub(6) as usize;

    let items: Vec<ListItem> = books
        .iter()
        .map(|book| {
            let entry = &book.entry;
            let (marker, marker_style) = if book.is_member {
                ("✓ ", Style::default().fg(Color::Green))
            } else {
                ("  ", Style::default())
            };

            let title_line = Line::from(vec![
                Span::styled(marker, marker_style),
                Span::raw(truncate(entry.title(), max_len)),
            ]);
            let byline = Line::from(vec![Span::styled(
                format!("  {} ({})", truncate(entry.author(), max_len), entry.year()),
                Style::default().add_modifier(Modifier::DIM),
            )]);

            ListItem::new(vec![title_line, byline])
        })
        .collect();

    let border_style = if focused.is_some() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(app.list_title())
        .borders(Borders::ALL)
        .border_style(border_style);

    if books.is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Press / to search the catalog",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = ListState::default();
    state.select(focused);

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the user and focused-book details (right)
fn draw_detail_pane<B: LibraryBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let session = app.ctx.session();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from(vec![
        Span::styled("User: ", bold),
        Span::raw(session.display_name()),
    ])];
    if session.is_authenticated() {
        lines.push(Line::from(vec![
            Span::styled("Library: ", bold),
            Span::raw(format!("{} book(s)", app.ctx.membership().len())),
        ]));
    }

    lines.push(Line::from(""));
    match app.focused_book() {
        Some(book) => {
            let entry = &book.entry;
            let language = entry.language().to_string();
            lines.push(Line::from(vec![
                Span::styled("Title: ", bold),
                Span::raw(entry.title()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Author: ", bold),
                Span::raw(entry.author()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Year: ", bold),
                Span::raw(entry.year().to_string()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Language: ", bold),
                Span::raw(if language.is_empty() {
                    "-".to_string()
                } else {
                    language
                }),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Key: ", bold),
                Span::raw(entry.key()),
            ]));
            lines.push(Line::from(""));
            let action = if book.is_member {
                "Enter: remove from library"
            } else {
                "Enter: add to library"
            };
            lines.push(Line::from(Span::styled(
                action,
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
        None => lines.push(Line::from(Span::styled(
            "Select a book to view details",
            Style::default().add_modifier(Modifier::DIM),
        ))),
    }

    let block = Block::default().title(" Detail ").borders(Borders::ALL);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Draw the status bar at the bottom
fn draw_status_bar<B: LibraryBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let content = if let Some(busy) = app.busy {
        busy.to_string()
    } else if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.input_mode == InputMode::Search {
        "Enter:search  Esc:cancel".to_string()
    } else if app.ctx.session().is_authenticated() {
        "/:catalog  p:library  j/k:move  Enter:add/remove  O:logout  ?:help  q:quit".to_string()
    } else {
        "/:catalog  j/k:move  L:login  ?:help  q:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw the login / register popup
fn draw_login_popup<B: LibraryBackend>(frame: &mut Frame, app: &App<B>) {
    let popup_area = centered(frame.area(), 44, 9);
    frame.render_widget(Clear, popup_area);

    let form = &app.login_form;
    let field_style = |field: LoginField| {
        if form.field == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let masked = "*".repeat(form.password.chars().count());

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Username: ", field_style(LoginField::Username)),
            Span::raw(form.username.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Password: ", field_style(LoginField::Password)),
            Span::raw(masked),
        ]),
        Line::from(""),
    ];
    match &form.error {
        Some(error) => lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter:login  Ctrl-R:register  Tab:switch  Esc:close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Login ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered(frame.area(), 50, 18);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move through books"),
        Line::from("  Esc         Back to the search box"),
        Line::from(""),
        Line::from("Library:"),
        Line::from("  /           Search the catalog"),
        Line::from("  p           Search my library"),
        Line::from("  Enter       Add or remove focused book"),
        Line::from("  L           Log in or register"),
        Line::from("  O           Log out"),
        Line::from(""),
        Line::from("  q           Quit"),
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

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

/// A `width` x `height` rect centered in `area`, clamped to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
