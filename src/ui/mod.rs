mod menu;
mod wizard;

use crate::app_state::{App, FocusArea, InputMode, ViewMode, MENU_ITEMS};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 顶部标题栏
            Constraint::Min(0),    // 中间内容区域
            Constraint::Length(11), // 底部命令/日志区域
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app);

    let middle_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(0)])
        .split(chunks[1]);

    render_left_menu(f, middle_chunks[0], app);

    // 可点击区域每帧重建
    app.hit_regions.clear();
    render_main_view(f, middle_chunks[1], app);

    render_bottom_bar(f, chunks[2], app);
}

fn focus_style(app: &App, area: FocusArea) -> Style {
    if app.focus_area == area {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let title = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));

    let title_text = Line::from(vec![
        Span::styled(
            " campusdesk ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" - College departments ({} menu)", app.layout.as_str())),
    ]);

    let paragraph = Paragraph::new(title_text)
        .block(title)
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App) {
    let menu_items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, (text, view))| {
            let is_selected = i == app.menu_selected_index;
            let is_active = *view == app.view_mode;

            let style = if is_selected {
                if app.focus_area == FocusArea::Menu {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                }
            } else if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            let prefix = if is_active { "● " } else { "○ " };
            ListItem::new(format!("{}{}", prefix, text)).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Menu {
        "Menu (Enter)"
    } else {
        "Menu (Tab)"
    };

    let menu = List::new(menu_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app, FocusArea::Menu)),
    );

    f.render_widget(menu, area);
}

fn render_main_view(f: &mut Frame, area: Rect, app: &mut App) {
    match app.view_mode {
        ViewMode::Navigation => menu::render_navigation(f, area, app),
        ViewMode::Departments => render_departments(f, area, app),
        ViewMode::DepartmentPage => render_department_page(f, area, app),
        ViewMode::Wizard => wizard::render_wizard(f, area, app),
    }
}

fn render_departments(f: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .departments
        .iter()
        .map(|row| {
            let (mark, color) = if row.is_active {
                ("●", Color::Green)
            } else {
                ("○", Color::DarkGray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", mark), Style::default().fg(color)),
                Span::styled(
                    format!("{:<10}", row.code),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(format!("{:<40}", row.name)),
                Span::styled(
                    format!("{} › {}", row.program_name, row.placement()),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let title = if app.departments.is_empty() {
        "Departments (none yet, n to create)".to_string()
    } else {
        format!(
            "Departments ({}) Enter open, n new, e edit, d delete, r reload",
            app.departments.len()
        )
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(focus_style(app, FocusArea::MainView)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    app.department_list_state.select(Some(app.selected_index));
    f.render_stateful_widget(list, area, &mut app.department_list_state);
}

fn field_line<'a>(label: &'a str, value: Option<&'a str>) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:<20}", label),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(value.filter(|v| !v.trim().is_empty()).unwrap_or("-")),
    ])
}

fn list_lines<'a>(lines: &mut Vec<Line<'a>>, label: &'a str, values: &'a [String]) {
    lines.push(Line::from(Span::styled(
        label,
        Style::default().fg(Color::Yellow),
    )));
    if values.is_empty() {
        lines.push(Line::from("  -"));
    }
    for v in values {
        lines.push(Line::from(format!("  • {}", v)));
    }
}

fn render_department_page(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .style(focus_style(app, FocusArea::MainView));

    let Some(page) = &app.page else {
        let text = match &app.page_missing {
            Some(slug) => vec![
                Line::from(Span::styled(
                    "Department not found",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("No department matches /departments/{}", slug)),
            ],
            None => vec![Line::from("Loading department...")],
        };
        f.render_widget(Paragraph::new(text).block(block.title("Department")), area);
        return;
    };

    let d = &page.department;
    let mut lines = vec![
        Line::from(Span::styled(
            page.breadcrumb(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            format!("{} ({})", d.name, d.code),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field_line("Description", d.description.as_deref()),
        field_line("Head of Department", d.head_name.as_deref()),
        field_line("Contact Email", d.contact_email.as_deref()),
        field_line("Location", d.location_details.as_deref()),
        field_line("Mission", d.mission.as_deref()),
        field_line("Vision", d.vision.as_deref()),
        field_line("Hero Image", d.hero_image.as_deref()),
        Line::from(""),
    ];
    list_lines(&mut lines, "Facilities", &d.facilities);
    list_lines(&mut lines, "Programs Offered", &d.programs_offered);
    list_lines(&mut lines, "Achievements", &d.achievements);
    lines.push(Line::from(Span::styled(
        format!("Gallery ({})", d.gallery.len()),
        Style::default().fg(Color::Yellow),
    )));
    for item in &d.gallery {
        lines.push(Line::from(format!(
            "  {:>2}. [{}] {}",
            item.display_order,
            item.media_type.as_str(),
            item.media_url().unwrap_or("-")
        )));
    }

    let title = format!("{} (↑↓ scroll, e edit, x back)", d.href());
    let paragraph = Paragraph::new(lines)
        .block(block.title(title))
        .wrap(Wrap { trim: false })
        .scroll((app.page_scroll, 0));
    f.render_widget(paragraph, area);
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let bottom_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let (label, hint) = match &app.input_mode {
        InputMode::Command => (
            "Command: ".to_string(),
            "Enter run, Esc cancel, ←→ cursor, ↑↓ history",
        ),
        InputMode::Prompt(target) => (
            format!("{}: ", target.label()),
            "Enter save, Esc cancel",
        ),
        InputMode::Normal => (String::new(), ""),
    };

    let command_prompt = if app.input_mode == InputMode::Normal {
        vec![
            Line::from(vec![
                Span::styled("Command: ", Style::default().fg(Color::Yellow)),
                Span::raw("(press / for commands)"),
            ]),
            Line::from("/ command, Tab menu, ↑↓ move, Enter select, l layout, r reload, q quit"),
        ]
    } else {
        let cur = app
            .command_input
            .char_indices()
            .nth(app.command_cursor)
            .map(|(i, _)| i)
            .unwrap_or(app.command_input.len());
        let (left, right) = app.command_input.split_at(cur);
        vec![
            Line::from(vec![
                Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(left),
                Span::styled("_", Style::default().fg(Color::Yellow)),
                Span::raw(right),
            ]),
            Line::from(hint),
        ]
    };
    let command_paragraph = Paragraph::new(command_prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Input")
            .style(if app.input_mode == InputMode::Normal {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Green)
            }),
    );
    f.render_widget(command_paragraph, bottom_chunks[0]);

    // 最新的在最上面
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(Color::Green)
            } else if msg.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Log ({})", app.log_messages.len()))
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(log, bottom_chunks[1]);
}
