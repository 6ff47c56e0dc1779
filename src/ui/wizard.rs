use crate::app_state::{wizard_rows, App, WizardRow};
use crate::wizard::{DepartmentWizard, HeroChange, WizardStep};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn step_header(wizard: &DepartmentWizard) -> Line<'static> {
    let mut spans = Vec::new();
    for step in [
        WizardStep::SelectProgram,
        WizardStep::SelectTrade,
        WizardStep::Details,
    ] {
        let style = if step == wizard.step() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if step.number() < wizard.step().number() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!(" {}. {} ", step.number(), step.title()),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn context_line(wizard: &DepartmentWizard) -> Line<'static> {
    let program = wizard
        .selected_program()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "-".to_string());
    let placement = match (wizard.selected_trade(), wizard.is_direct_branch()) {
        (_, true) => "Direct Branch".to_string(),
        (Some(t), false) => t.name.clone(),
        (None, false) => wizard.trade_id().unwrap_or("-").to_string(),
    };
    let mode = if wizard.is_editing() {
        "Editing"
    } else {
        "Creating"
    };
    Line::from(vec![
        Span::styled(format!("{} ", mode), Style::default().fg(Color::Yellow)),
        Span::raw(format!("Program: {}  Trade: {}", program, placement)),
    ])
}

fn row_text(wizard: &DepartmentWizard, row: &WizardRow) -> String {
    let form = &wizard.form;
    match row {
        WizardRow::Program { name, .. } | WizardRow::Trade { name, .. } => name.clone(),
        WizardRow::CreateProgram => "+ Create new program".to_string(),
        WizardRow::DirectBranch => "Directly Add Branch".to_string(),
        WizardRow::CreateTrade => "+ Create new trade".to_string(),
        WizardRow::Field(field) => format!("{:<22}{}", field.label(), form.text(*field)),
        WizardRow::Active => format!(
            "{:<22}[{}]",
            "Active",
            if form.is_active { "x" } else { " " }
        ),
        WizardRow::Chips(field) => {
            let tags: Vec<String> = form
                .chips(*field)
                .tags
                .iter()
                .map(|t| format!("[{}]", t))
                .collect();
            format!("{:<22}{}", field.label(), tags.join(" "))
        }
        WizardRow::Hero => {
            let state = match (&form.hero, &form.existing_hero) {
                (HeroChange::Replace(file), _) => format!("new: {}", file.file_name),
                (HeroChange::Remove, Some(url)) => format!("remove {}", url),
                (_, Some(url)) => url.clone(),
                _ => "-".to_string(),
            };
            format!("{:<22}{}", "Hero Image", state)
        }
        WizardRow::Gallery => {
            let queued: Vec<&str> = wizard
                .gallery_queue()
                .iter()
                .map(|f| f.file_name.as_str())
                .collect();
            format!(
                "{:<22}{} queued {}",
                "Gallery",
                queued.len(),
                queued.join(", ")
            )
        }
        WizardRow::Submit => {
            if wizard.is_editing() {
                "» Update Department".to_string()
            } else {
                "» Create Department".to_string()
            }
        }
    }
}

fn key_hint(step: WizardStep) -> &'static str {
    match step {
        WizardStep::SelectProgram => "↑↓ move, Enter select, Esc close",
        WizardStep::SelectTrade => "↑↓ move, Enter select, Esc back",
        WizardStep::Details => {
            "Enter edit, Space toggle active, Del remove last chip / clear gallery, x remove hero, Esc back"
        }
    }
}

pub fn render_wizard(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));

    let Some(wizard) = &app.wizard else {
        f.render_widget(
            Paragraph::new("Loading wizard...").block(block.title("Department Wizard")),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let header = Paragraph::new(vec![step_header(wizard), context_line(wizard)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(if wizard.is_editing() {
                "Edit Department"
            } else {
                "Add Department"
            })
            .style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(header, chunks[0]);

    let rows = wizard_rows(wizard);
    let visible = chunks[1].height.saturating_sub(2) as usize;
    let offset = if visible > 0 && app.wizard_cursor >= visible {
        app.wizard_cursor + 1 - visible
    } else {
        0
    };
    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(i, row)| {
            let style = if i == app.wizard_cursor {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                match row {
                    WizardRow::CreateProgram | WizardRow::CreateTrade => {
                        Style::default().fg(Color::Green)
                    }
                    WizardRow::Submit => Style::default().fg(Color::Yellow),
                    _ => Style::default().fg(Color::White),
                }
            };
            Line::from(Span::styled(row_text(wizard, row), style))
        })
        .collect();

    let body = Paragraph::new(lines).block(
        block.title(format!(
            "Step {}: {} ({})",
            wizard.step().number(),
            wizard.step().title(),
            key_hint(wizard.step())
        )),
    );
    f.render_widget(body, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MediaFile;
    use crate::wizard::{ChipField, FormField};

    #[test]
    fn detail_rows_show_current_values() {
        let mut wizard = DepartmentWizard::default();
        wizard.form.set_text(FormField::Code, "cse");
        wizard.form.chips_mut(ChipField::Facilities).pending = "Library".into();
        wizard.form.chips_mut(ChipField::Facilities).commit();
        wizard.form.set_hero_file(MediaFile::new("hero.png", "image/png", vec![]));

        assert!(row_text(&wizard, &WizardRow::Field(FormField::Code)).ends_with("CSE"));
        assert!(row_text(&wizard, &WizardRow::Chips(ChipField::Facilities)).ends_with("[Library]"));
        assert!(row_text(&wizard, &WizardRow::Hero).ends_with("new: hero.png"));
        assert_eq!(row_text(&wizard, &WizardRow::Submit), "» Create Department");
    }
}
