// services/bank-dash/src/ui.rs
//
// Terminal rendering. Everything drawn here comes from the row models and
// view state; no decisions about content are made in this module.
//

use ratatui::{prelude::*, widgets::*};

use crate::app::App;
use crate::format::{Badge, Tone};
use crate::forms::{FieldKind, Form};
use crate::state::dashboard::{DashboardCard, DashboardLevel};
use crate::state::stock::{GroupCard, StockLevel};
use crate::state::Page;
use crate::table::{Cell as ViewCell, TableRow, TableView};
use crate::toast::ToastKind;

// Palette: blood red, white, silver, gold
mod colors {
    use ratatui::style::Color;

    pub const RED: Color = Color::Rgb(200, 30, 45);
    pub const DARK_RED: Color = Color::Rgb(120, 0, 10);
    pub const WHITE: Color = Color::Rgb(253, 246, 227);
    pub const SILVER: Color = Color::Rgb(147, 161, 161);
    pub const GOLD: Color = Color::Rgb(255, 193, 37);
    pub const CYAN: Color = Color::Rgb(42, 161, 152);
    pub const BLUE: Color = Color::Rgb(38, 139, 210);
    pub const BG_DARK: Color = Color::Rgb(18, 10, 14);
    pub const BG_PANEL: Color = Color::Rgb(32, 18, 24);
    pub const SUCCESS: Color = Color::Rgb(133, 153, 0);
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Success => colors::SUCCESS,
        Tone::Warning => colors::GOLD,
        Tone::Danger => colors::RED,
        Tone::Info => colors::CYAN,
        Tone::Primary => colors::BLUE,
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(colors::WHITE).bold(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL))
}

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(colors::BG_DARK)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Page body
            Constraint::Length(3), // Footer
        ])
        .split(area);

    draw_header(frame, chunks[0], app);
    match app.page() {
        Page::Dashboard => draw_dashboard(frame, chunks[1], app),
        Page::Donors => draw_donors(frame, chunks[1], app),
        Page::Donations => draw_list(frame, chunks[1], "DONATIONS", &app.donations.table(), app),
        Page::Requests => draw_requests(frame, chunks[1], app),
        Page::Stock => draw_stock(frame, chunks[1], app),
        Page::Screenings => draw_list(
            frame,
            chunks[1],
            "HEALTH SCREENING RECORDS",
            &app.screenings.table(),
            app,
        ),
    }
    draw_footer(frame, chunks[2], app);

    if let Some(form) = app.form() {
        draw_form(frame, area, form);
    }
    draw_toasts(frame, area, app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            " BLOOD BANK ",
            Style::default().fg(colors::WHITE).bg(colors::DARK_RED).bold(),
        ),
        Span::raw("  "),
    ];
    for (i, page) in Page::ALL.iter().enumerate() {
        let style = if *page == app.page() {
            Style::default().fg(colors::GOLD).bold().underlined()
        } else {
            Style::default().fg(colors::SILVER)
        };
        spans.push(Span::styled(format!("{} {}", i + 1, page.title()), style));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        format!("[{}]", app.backend_name().to_uppercase()),
        Style::default().fg(colors::GOLD).bold(),
    ));
    if app.is_polling() {
        spans.push(Span::styled(" ⟳", Style::default().fg(colors::SUCCESS)));
    }

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors::DARK_RED))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(header, area);
}

fn draw_stat_box(frame: &mut Frame, area: Rect, label: &str, value: &str, value_color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(
            label,
            Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(value, Style::default().fg(value_color).bold())),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn draw_group_box(frame: &mut Frame, area: Rect, group: &str, units: &str, label: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(group, Style::default().fg(colors::WHITE).bold())),
        Line::from(Span::styled(units, Style::default().fg(colors::WHITE))),
        Line::from(Span::styled(label, Style::default().fg(color))),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn equal_columns(area: Rect, count: usize) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, count.max(1) as u32); count])
        .split(area)
}

fn draw_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Stat tiles
            Constraint::Length(5), // Stock cards
            Constraint::Min(5),    // Recent requests
        ])
        .split(area);

    let tiles = app.dashboard.tiles();
    let boxes = equal_columns(chunks[0], 4);
    draw_stat_box(frame, boxes[0], "TOTAL DONORS", &tiles.total_donors.to_string(), colors::WHITE);
    draw_stat_box(frame, boxes[1], "DONATIONS", &tiles.total_donations.to_string(), colors::SUCCESS);
    draw_stat_box(
        frame,
        boxes[2],
        "PENDING REQUESTS",
        &tiles.pending_requests.to_string(),
        if tiles.pending_requests > 0 { colors::GOLD } else { colors::SILVER },
    );
    draw_stat_box(frame, boxes[3], "LAST 7 DAYS", &tiles.recent_donations.to_string(), colors::CYAN);

    let cards = app.dashboard.cards();
    let slots = equal_columns(chunks[1], cards.len());
    for (card, slot) in cards.iter().zip(slots.iter()) {
        draw_dashboard_card(frame, *slot, card);
    }

    draw_table(frame, chunks[2], "RECENT REQUESTS", &app.dashboard.recent_table(), None);
}

fn draw_dashboard_card(frame: &mut Frame, area: Rect, card: &DashboardCard) {
    let color = match card.level {
        DashboardLevel::LowStock => colors::RED,
        DashboardLevel::Normal => colors::GOLD,
        DashboardLevel::GoodStock => colors::SUCCESS,
    };
    draw_group_box(
        frame,
        area,
        card.blood_group.as_str(),
        &format!("{} Units", card.units),
        card.level.label(),
        color,
    );
}

fn draw_stock_card(frame: &mut Frame, area: Rect, card: &GroupCard) {
    let color = match card.level {
        StockLevel::OutOfStock | StockLevel::Critical => colors::RED,
        StockLevel::Low => colors::GOLD,
        StockLevel::Good => colors::SUCCESS,
    };
    draw_group_box(
        frame,
        area,
        card.blood_group.as_str(),
        &card.units_label(),
        &format!("{} {}", card.level.icon(), card.level.label()),
        color,
    );
}

fn filter_line(parts: Vec<(&str, String)>) -> Paragraph<'static> {
    let mut spans = Vec::new();
    for (label, value) in parts {
        spans.push(Span::styled(
            format!("{}: ", label),
            Style::default().fg(colors::SILVER),
        ));
        spans.push(Span::styled(value, Style::default().fg(colors::WHITE).bold()));
        spans.push(Span::raw("   "));
    }
    Paragraph::new(Line::from(spans))
}

fn or_all(value: Option<&str>) -> String {
    value.unwrap_or("All").to_string()
}

fn draw_stock(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Aggregate cards
            Constraint::Length(1), // Filter + sort state
            Constraint::Min(5),    // Detail table
        ])
        .split(area);

    let cards = app.stock.aggregate();
    let slots = equal_columns(chunks[0], cards.len());
    for (card, slot) in cards.iter().zip(slots.iter()) {
        draw_stock_card(frame, *slot, card);
    }

    let filter = app.stock.filter();
    let bank = filter
        .bank_id
        .map(|id| app.lookups.bank_name(id).map_or_else(|| format!("#{}", id), str::to_string));
    let sort = app
        .stock
        .sort()
        .map(|(column, order)| format!("{} {:?}", column.title(), order));
    let mut parts = vec![
        ("Blood Group", or_all(filter.blood_group.map(|g| g.as_str()))),
        ("Bank", or_all(bank.as_deref())),
        ("Sort", sort.unwrap_or_else(|| "none".to_string())),
        ("Column", app.stock.cursor().title().to_string()),
    ];
    if let Some(error) = app.stock.error() {
        parts.push(("Status", error.to_string()));
    }
    frame.render_widget(filter_line(parts), chunks[1]);

    draw_table(frame, chunks[2], "STOCK DETAILS", &app.stock.table(), None);
}

fn draw_donors(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let search = if app.is_searching() {
        format!("{}▏", app.donors.search())
    } else if app.donors.search().is_empty() {
        "(press /)".to_string()
    } else {
        app.donors.search().to_string()
    };
    let parts = vec![
        ("Search", search),
        ("Blood Group", or_all(app.donors.blood_group().map(|g| g.as_str()))),
    ];
    frame.render_widget(filter_line(parts), chunks[0]);

    draw_table(frame, chunks[1], "DONORS", &app.donors.table(), Some(app.selected()));
}

fn draw_requests(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let filter = app.requests.filter();
    let parts = vec![
        ("Status", or_all(filter.status.map(|s| s.as_str()))),
        ("Blood Group", or_all(filter.blood_group.map(|g| g.as_str()))),
    ];
    frame.render_widget(filter_line(parts), chunks[0]);

    draw_table(frame, chunks[1], "BLOOD REQUESTS", &app.requests.table(), Some(app.selected()));
}

fn draw_list(frame: &mut Frame, area: Rect, title: &str, view: &TableView, app: &App) {
    draw_table(frame, area, title, view, Some(app.selected()));
}

fn view_cell(cell: &ViewCell) -> Cell<'static> {
    match cell {
        ViewCell::Plain(text) => Cell::from(Span::styled(text.clone(), Style::default().fg(colors::WHITE))),
        ViewCell::Strong(text) => {
            Cell::from(Span::styled(text.clone(), Style::default().fg(colors::WHITE).bold()))
        }
        ViewCell::Group(group) => Cell::from(Span::styled(
            group.as_str(),
            Style::default().fg(colors::RED).bold(),
        )),
        ViewCell::Badge(badge) => Cell::from(badge_span(badge)),
    }
}

fn badge_span(badge: &Badge) -> Span<'static> {
    Span::styled(
        format!(" {} ", badge.label),
        Style::default().fg(colors::BG_DARK).bg(tone_color(badge.tone)),
    )
}

fn draw_table(frame: &mut Frame, area: Rect, title: &str, view: &TableView, selected: Option<usize>) {
    let columns = view.headers.len().max(1);
    let rows: Vec<Row> = view
        .rows
        .iter()
        .map(|row| match row {
            TableRow::Record(cells) => Row::new(cells.iter().map(view_cell).collect::<Vec<_>>()),
            TableRow::Placeholder { icon, message } => Row::new(vec![Cell::from(Span::styled(
                format!("{} {}", icon, message).trim().to_string(),
                Style::default().fg(colors::SILVER),
            ))]),
        })
        .collect();

    let header = Row::new(
        view.headers
            .iter()
            .map(|h| Cell::from(Span::styled(h.clone(), Style::default().fg(colors::GOLD).bold())))
            .collect::<Vec<_>>(),
    )
    .bottom_margin(1);

    // placeholder rows span the table
    let widths = if view.record_count() == 0 {
        vec![Constraint::Fill(1)]
    } else {
        vec![Constraint::Fill(1); columns]
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(title))
        .row_highlight_style(Style::default().bg(colors::DARK_RED));

    let mut state = TableState::default();
    if view.record_count() > 0 {
        state.select(selected);
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut keys: Vec<(&str, &str)> = vec![("Q", "Quit"), ("TAB", "Page"), ("R", "Reload")];
    if app.form().is_some() {
        keys = vec![
            ("ENTER", "Submit"),
            ("ESC", "Cancel"),
            ("TAB", "Next field"),
            ("←/→", "Choose"),
        ];
    } else {
        match app.page() {
            Page::Donors => keys.extend([("/", "Search"), ("G", "Group"), ("N", "New"), ("E", "Edit")]),
            Page::Donations | Page::Screenings => keys.push(("N", "New")),
            Page::Requests => keys.extend([("S", "Status"), ("G", "Group"), ("N", "New"), ("U", "Update")]),
            Page::Stock => keys.extend([
                ("←/→", "Column"),
                ("S", "Sort"),
                ("X", "Unsort"),
                ("G", "Group"),
                ("B", "Bank"),
                ("C", "Clear"),
            ]),
            Page::Dashboard => {}
        }
    }

    let mut spans = Vec::new();
    for (key, action) in keys {
        spans.push(Span::styled(
            format!(" [{}] ", key),
            Style::default().fg(colors::BG_DARK).bg(colors::SILVER),
        ));
        spans.push(Span::styled(format!(" {} ", action), Style::default().fg(colors::SILVER)));
        spans.push(Span::raw(" "));
    }

    let footer = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors::DARK_RED))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(footer, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_form(frame: &mut Frame, area: Rect, form: &Form) {
    let rect = centered(area, 64, form.fields().len() as u16 + 4);
    frame.render_widget(Clear, rect);

    let lines: Vec<Line> = form
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focus();
            let marker = if field.required { "*" } else { " " };
            let value = match field.kind {
                FieldKind::Select(_) => format!("‹ {} ›", field.display()),
                _ if focused => format!("{}▏", field.value),
                _ => field.value.clone(),
            };
            let label_style = if focused {
                Style::default().fg(colors::GOLD).bold()
            } else {
                Style::default().fg(colors::SILVER)
            };
            Line::from(vec![
                Span::styled(format!("{:>18}{} ", field.label, marker), label_style),
                Span::styled(value, Style::default().fg(colors::WHITE)),
            ])
        })
        .collect();

    let title = if form.is_submitting() {
        format!("{} (saving…)", form.title())
    } else {
        form.title().to_string()
    };
    let block = Block::default()
        .title(Span::styled(format!(" {} ", title), Style::default().fg(colors::GOLD).bold()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::GOLD))
        .border_type(BorderType::Double)
        .style(Style::default().bg(colors::BG_PANEL));

    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_toasts(frame: &mut Frame, area: Rect, app: &App) {
    let toasts: Vec<_> = app.toasts.visible().collect();
    if toasts.is_empty() {
        return;
    }
    let width = 56.min(area.width);
    let rect = Rect {
        x: area.x + area.width - width,
        y: area.y + 3,
        width,
        height: (toasts.len() as u16 + 2).min(area.height.saturating_sub(3)),
    };
    frame.render_widget(Clear, rect);

    let lines: Vec<Line> = toasts
        .iter()
        .map(|toast| {
            let color = match toast.kind {
                ToastKind::Success => colors::SUCCESS,
                ToastKind::Error => colors::RED,
                ToastKind::Info => colors::CYAN,
            };
            Line::from(vec![
                Span::styled(format!("{} ", toast.kind.icon()), Style::default().fg(color).bold()),
                Span::styled(toast.message.clone(), Style::default().fg(colors::WHITE)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .style(Style::default().bg(colors::BG_PANEL));
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ratatui::backend::TestBackend;
    use svckit::types::{BloodGroup, StockItem};
    use svckit::{MemoryBankApi, MemoryStore};
    use tokio::runtime::Handle;
    use tokio::sync::mpsc;

    use crate::config::DashboardSettings;
    use crate::loader::{AppEvent, Loader};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let api = Arc::new(MemoryBankApi::new(MemoryStore::default()));
        App::new(Loader::new(api, tx, Handle::current()), DashboardSettings::default())
    }

    #[tokio::test]
    async fn test_draw_dashboard_and_stock() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();

        terminal.draw(|frame| draw(frame, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("BLOOD BANK"));
        assert!(text.contains("RECENT REQUESTS"));
        assert!(text.contains("No requests found"));

        app.enter_page(Page::Stock);
        app.apply(AppEvent::Stock(Ok(vec![StockItem {
            stock_id: 1,
            bank_id: 1,
            bank_name: "Central".to_string(),
            location: None,
            blood_group: BloodGroup::AbPos,
            quantity_units: 5,
            status: None,
        }])));
        terminal.draw(|frame| draw(frame, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("STOCK DETAILS"));
        assert!(text.contains("Central"));
        assert!(text.contains("Critical"));
    }

    #[tokio::test]
    async fn test_draw_form_and_empty_list() {
        let mut app = app();
        app.enter_page(Page::Donors);
        app.handle_key(crossterm::event::KeyCode::Char('n').into());

        let mut terminal = Terminal::new(TestBackend::new(120, 36)).unwrap();
        terminal.draw(|frame| draw(frame, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Register New Donor"));
        assert!(text.contains("Select Blood Group"));
    }
}
