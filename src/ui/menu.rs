use crate::app_state::{App, FocusArea, HitTarget};
use crate::config::NavLayout;
use crate::hierarchy::MobileRow;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const PROGRAM_WIDTH: u16 = 28;
const PANEL_WIDTH: u16 = 32;

pub fn render_navigation(f: &mut Frame, area: Rect, app: &mut App) {
    if app.programs.is_empty() {
        render_links(f, area, app);
        return;
    }
    match app.layout {
        NavLayout::Desktop => render_desktop(f, area, app),
        NavLayout::Mobile => render_mobile(f, area, app),
    }
}

fn border_style(app: &App) -> Style {
    if app.focus_area == FocusArea::MainView {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn row_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

/// 一行文字，末尾带展开箭头
fn entry(name: &str, chevron: bool, width: u16, active: bool) -> Line<'static> {
    let inner = width.saturating_sub(2) as usize;
    let mut text: String = name.chars().take(inner.saturating_sub(2)).collect();
    if chevron {
        let pad = inner.saturating_sub(text.chars().count() + 1);
        text.push_str(&" ".repeat(pad));
        text.push('›');
    }
    Line::from(Span::styled(text, row_style(active)))
}

fn row_rect(panel: Rect, index: usize) -> Option<Rect> {
    let y = panel.y.checked_add(1 + index as u16)?;
    if y + 1 >= panel.y + panel.height {
        return None;
    }
    Some(Rect::new(panel.x + 1, y, panel.width.saturating_sub(2), 1))
}

/// 面板从触发行的高度开始，超出区域时截断
fn panel_rect(bounds: Rect, x: u16, y: u16, rows: usize) -> Option<Rect> {
    if x >= bounds.x + bounds.width {
        return None;
    }
    let wanted = Rect::new(x, y.saturating_sub(1), PANEL_WIDTH, rows as u16 + 2);
    let clipped = wanted.intersection(bounds);
    (clipped.width > 2 && clipped.height > 2).then_some(clipped)
}

fn render_desktop(f: &mut Frame, area: Rect, app: &mut App) {
    let programs_rect = Rect::new(area.x, area.y, PROGRAM_WIDTH.min(area.width), area.height);
    let hovered = app.desktop.hovered_program().map(str::to_string);

    let lines: Vec<Line> = app
        .programs
        .iter()
        .map(|p| {
            entry(
                &p.name,
                p.has_children(),
                programs_rect.width,
                hovered.as_deref() == Some(p.id.as_str()),
            )
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Programs (hover)")
                .style(border_style(app)),
        ),
        programs_rect,
    );
    for (i, p) in app.programs.iter().enumerate() {
        if let Some(rect) = row_rect(programs_rect, i) {
            app.hit_regions.push((rect, HitTarget::Program(p.id.clone())));
        }
    }

    // 二级面板：trade 在前，直属部门在后
    let Some(program) = app.desktop.open_program(&app.programs).cloned() else {
        return;
    };
    let program_index = app
        .programs
        .iter()
        .position(|p| p.id == program.id)
        .unwrap_or(0);
    let row_y = programs_rect.y + 1 + program_index as u16;
    let item_count = program.trades.len() + program.direct_branches.len();
    let Some(panel) = panel_rect(area, programs_rect.x + programs_rect.width, row_y, item_count)
    else {
        return;
    };

    let hovered_trade = app.desktop.hovered_trade().map(str::to_string);
    let mut lines: Vec<Line> = program
        .trades
        .iter()
        .map(|t| {
            entry(
                &t.name,
                t.has_children(),
                panel.width,
                hovered_trade.as_deref() == Some(t.id.as_str()),
            )
        })
        .collect();
    lines.extend(
        program
            .direct_branches
            .iter()
            .map(|d| entry(&d.name, false, panel.width, false)),
    );
    f.render_widget(Clear, panel);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(program.name.as_str())
                .style(Style::default().fg(Color::Yellow)),
        ),
        panel,
    );
    app.hit_regions
        .push((panel, HitTarget::ProgramPanel(program.id.clone())));
    for (i, t) in program.trades.iter().enumerate() {
        if let Some(rect) = row_rect(panel, i) {
            app.hit_regions.push((
                rect,
                HitTarget::Trade {
                    program_id: program.id.clone(),
                    trade_id: t.id.clone(),
                },
            ));
        }
    }
    for (i, d) in program.direct_branches.iter().enumerate() {
        if let Some(rect) = row_rect(panel, program.trades.len() + i) {
            app.hit_regions.push((
                rect,
                HitTarget::Department {
                    program_id: program.id.clone(),
                    trade_id: None,
                    href: d.href(),
                },
            ));
        }
    }

    // 三级面板：trade 下的部门
    let Some(trade) = app.desktop.open_trade(&app.programs).cloned() else {
        return;
    };
    let trade_index = program
        .trades
        .iter()
        .position(|t| t.id == trade.id)
        .unwrap_or(0);
    let Some(sub) = panel_rect(
        area,
        panel.x + panel.width,
        panel.y + 1 + trade_index as u16,
        trade.departments.len(),
    ) else {
        return;
    };
    let lines: Vec<Line> = trade
        .departments
        .iter()
        .map(|d| entry(&d.name, false, sub.width, false))
        .collect();
    f.render_widget(Clear, sub);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(trade.name.as_str())
                .style(Style::default().fg(Color::Magenta)),
        ),
        sub,
    );
    app.hit_regions.push((
        sub,
        HitTarget::TradePanel {
            program_id: program.id.clone(),
            trade_id: trade.id.clone(),
        },
    ));
    for (i, d) in trade.departments.iter().enumerate() {
        if let Some(rect) = row_rect(sub, i) {
            app.hit_regions.push((
                rect,
                HitTarget::Department {
                    program_id: program.id.clone(),
                    trade_id: Some(trade.id.clone()),
                    href: d.href(),
                },
            ));
        }
    }
}

fn render_mobile(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.mobile.rows(&app.programs);
    let cursor = app.mobile.cursor();
    let visible = area.height.saturating_sub(2) as usize;
    let offset = if visible > 0 && cursor >= visible {
        cursor + 1 - visible
    } else {
        0
    };

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(i, row)| {
            let indent = "  ".repeat(row.depth() as usize);
            let marker = match row {
                MobileRow::Program { expanded, .. } | MobileRow::Trade { expanded, .. } => {
                    if *expanded {
                        "▾ "
                    } else {
                        "▸ "
                    }
                }
                MobileRow::Department { .. } => "• ",
            };
            Line::from(Span::styled(
                format!("{}{}{}", indent, marker, row.label()),
                row_style(i == cursor),
            ))
        })
        .collect();

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Menu (Enter expand/open, l desktop layout)")
                .style(border_style(app)),
        ),
        area,
    );
    for i in offset..rows.len() {
        if let Some(rect) = row_rect(area, i - offset) {
            app.hit_regions.push((rect, HitTarget::MobileRow(i)));
        }
    }
}

fn render_links(f: &mut Frame, area: Rect, app: &mut App) {
    let lines: Vec<Line> = app
        .links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            Line::from(Span::styled(
                format!("{:<40} {}", link.name, link.href()),
                row_style(i == app.nav_cursor),
            ))
        })
        .collect();
    let title = if app.links.is_empty() {
        "Departments (loading...)"
    } else {
        "Departments (r reload)"
    };
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(border_style(app)),
        ),
        area,
    );
    for (i, link) in app.links.iter().enumerate() {
        if let Some(rect) = row_rect(area, i) {
            app.hit_regions.push((rect, HitTarget::Link(link.href())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_stay_inside_panel_border() {
        let panel = Rect::new(10, 5, 20, 4);
        assert_eq!(row_rect(panel, 0), Some(Rect::new(11, 6, 18, 1)));
        assert_eq!(row_rect(panel, 1), Some(Rect::new(11, 7, 18, 1)));
        assert_eq!(row_rect(panel, 2), None);
    }

    #[test]
    fn panels_are_clipped_to_bounds() {
        let bounds = Rect::new(0, 0, 80, 10);
        let panel = panel_rect(bounds, 28, 8, 6).unwrap();
        assert_eq!(panel, Rect::new(28, 7, 32, 3));
        assert!(panel_rect(bounds, 80, 1, 3).is_none());
    }

    #[test]
    fn chevron_is_right_aligned() {
        let line = entry("B.Tech", true, 12, false);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "B.Tech   ›");
    }
}
