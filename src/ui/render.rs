use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::utils::{clean_text, format_title, truncate_string};

use super::styles::Palette;

pub fn render(frame: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme());

    // Quiz view suppresses the header chrome; everything else keeps it.
    let chunks = if app.show_header {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title bar
                Constraint::Min(10),   // Main content
                Constraint::Length(2), // Status bar
            ])
            .split(frame.area())
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(2)])
            .split(frame.area())
    };

    let (main_area, status_area) = if app.show_header {
        render_title_bar(frame, app, &palette, chunks[0]);
        (chunks[1], chunks[2])
    } else {
        (chunks[0], chunks[1])
    };

    match &app.view {
        View::Home => render_home(frame, app, &palette, main_area),
        View::Chapters { subject } => render_chapters(frame, app, &palette, subject, main_area),
        View::Quiz => render_quiz(frame, app, &palette, main_area),
        View::Summary(_) => render_summary(frame, app, &palette, main_area),
        View::Fatal(message) => render_fatal(frame, &palette, message, main_area),
    }

    render_status_bar(frame, app, &palette, status_area);

    if app.confirming_reset {
        render_reset_overlay(frame, &palette);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let title = "  QuizCache";
    let stats = &app.global_stats;
    let right = format!(
        "Answered {} | Correct {} | Quizzes {}  ",
        stats.total_answered, stats.total_correct, stats.quizzes_taken
    );

    let padding = area
        .width
        .saturating_sub(title.len() as u16 + right.len() as u16) as usize;
    let title_line = Line::from(vec![
        Span::styled(title, palette.title_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, palette.muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(palette.muted_style());
    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_home(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let mut lines = Vec::new();

    // Search bar
    if app.searching {
        lines.push(Line::from(vec![
            Span::styled(" Search: ", palette.muted_style()),
            Span::styled(format!("{}▌", app.search_query), palette.search_style()),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            " Subjects                                  [/] search",
            palette.muted_style(),
        )));
    }
    lines.push(Line::from(""));

    let subjects = app.visible_subjects();
    if subjects.is_empty() {
        let message = if app.search_query.chars().count() >= 2 {
            " No subjects match the search"
        } else {
            " No subjects available"
        };
        lines.push(Line::from(Span::styled(message, palette.muted_style())));
    }

    for (idx, subject) in subjects.iter().enumerate() {
        let selected = idx == app.home_selection;
        let marker = if selected { " ▶ " } else { "   " };
        let style = if selected {
            palette.selected_style()
        } else {
            palette.list_item_style()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, palette.highlight_style()),
            Span::styled(truncate_string(&subject.name, 40), style),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border_style(!app.searching))
        .title(Span::styled(" Library ", palette.title_style()));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_chapters(frame: &mut Frame, app: &App, palette: &Palette, subject: &str, area: Rect) {
    let mut lines = Vec::new();
    lines.push(Line::from(""));

    let rows = app.chapter_rows(subject);

    // Row 0 is always the full bank; chapter rows follow.
    let full_selected = app.chapter_selection == 0;
    let style = if full_selected {
        palette.selected_style()
    } else {
        palette.list_item_style()
    };
    let marker = if full_selected { " ▶ " } else { "   " };
    lines.push(Line::from(vec![
        Span::styled(marker, palette.highlight_style()),
        Span::styled(
            format!("FULL BANK ({} questions)", app.bank_size(subject)),
            style,
        ),
    ]));
    lines.push(Line::from(""));

    for (idx, row) in rows.iter().enumerate() {
        let selected = app.chapter_selection == idx + 1;
        let style = if selected {
            palette.selected_style()
        } else {
            palette.list_item_style()
        };
        let marker = if selected { " ▶ " } else { "   " };
        lines.push(Line::from(vec![
            Span::styled(marker, palette.highlight_style()),
            Span::styled(
                truncate_string(&format!("Ch {}: {}", row.number, row.title), 50),
                style,
            ),
            Span::styled(format!("  ({})", row.count), palette.muted_style()),
        ]));
    }

    if rows.is_empty() && app.bank_size(subject) == 0 {
        lines.push(Line::from(Span::styled(
            " Bank unavailable - connect once to download it",
            palette.muted_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border_style(true))
        .title(Span::styled(
            format!(" {} ", format_title(subject)),
            palette.title_style(),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quiz(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let Some(bank) = app.data.bank(&session.subject) else {
        return;
    };

    let mut lines = Vec::new();

    if session.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " No questions in this selection",
            palette.muted_style(),
        )));
    } else if let Some(question) = session.current_question(bank) {
        let progress = format!(
            " {} [{}]  Question {}/{}",
            format_title(&session.subject),
            session.selector,
            session.position() + 1,
            session.len()
        );
        lines.push(Line::from(Span::styled(progress, palette.muted_style())));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", clean_text(&question.question_text)),
            palette.list_item_style(),
        )));
        lines.push(Line::from(""));

        let answered = session.current_answer();
        let correct_index = question.correct_index();
        for (idx, option) in question.options.iter().enumerate() {
            let letter = (b'a' + idx as u8) as char;
            let style = option_style(palette, answered.map(|a| a.selected), correct_index, idx);
            lines.push(Line::from(vec![
                Span::styled(format!("  {}) ", letter), palette.help_key_style()),
                Span::styled(clean_text(option), style),
            ]));
        }

        if let Some(answered) = answered {
            lines.push(Line::from(""));
            let verdict = if answered.is_correct {
                Span::styled(" Correct", palette.success_style())
            } else {
                Span::styled(" Incorrect", palette.error_style())
            };
            lines.push(Line::from(verdict));
            if !question.explanation.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(" {}", clean_text(&question.explanation)),
                    palette.muted_style(),
                )));
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border_style(true));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

/// Option line style. Before answering every option renders plain;
/// after answering the correct option goes green and a wrong pick red.
fn option_style(
    palette: &Palette,
    selected: Option<usize>,
    correct_index: Option<usize>,
    idx: usize,
) -> Style {
    let Some(selected) = selected else {
        return palette.list_item_style();
    };
    if correct_index == Some(idx) {
        palette.success_style()
    } else if selected == idx {
        palette.error_style()
    } else {
        palette.muted_style()
    }
}

fn render_summary(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let View::Summary(summary) = &app.view else {
        return;
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} - session complete", format_title(&summary.subject)),
            palette.title_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Correct:   ", palette.muted_style()),
            Span::styled(summary.correct.to_string(), palette.success_style()),
        ]),
        Line::from(vec![
            Span::styled("   Wrong:     ", palette.muted_style()),
            Span::styled(summary.wrong.to_string(), palette.error_style()),
        ]),
        Line::from(vec![
            Span::styled("   Skipped:   ", palette.muted_style()),
            Span::styled(summary.skipped.to_string(), palette.list_item_style()),
        ]),
        Line::from(vec![
            Span::styled("   Questions: ", palette.muted_style()),
            Span::styled(summary.total_questions.to_string(), palette.list_item_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Accuracy:  ", palette.muted_style()),
            Span::styled(format!("{}%", summary.accuracy), palette.highlight_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", palette.muted_style()),
            Span::styled("[r]", palette.help_key_style()),
            Span::styled(" to retry, ", palette.muted_style()),
            Span::styled("[Esc]", palette.help_key_style()),
            Span::styled(" for home", palette.muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border_style(true))
        .title(Span::styled(" Summary ", palette.title_style()));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_fatal(frame: &mut Frame, palette: &Palette, message: &str, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Startup failed", palette.error_style())),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", message), palette.list_item_style())),
        Line::from(""),
        Line::from(Span::styled(
            " Check the content origin and connectivity, then restart.",
            palette.muted_style(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.error_style());
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let left_text = if let Some(ref message) = app.status_message {
        format!(" {} ", message)
    } else {
        String::from(" Offline-ready ")
    };
    let right_text = shortcuts_for(app);

    let width = area.width as usize;
    let padding = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, palette.muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, palette.muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(palette.status_bar_style()),
        area,
    );
}

fn shortcuts_for(app: &App) -> String {
    let keys = match app.view {
        View::Home => "[t]heme | [R]eset | [q]uit",
        View::Chapters { .. } => "[o]ffline | [x] remove | [Esc] back | [q]uit",
        View::Quiz => "[a-e] answer | ←/→ move | [Esc] leave",
        View::Summary(_) => "[r]etry | [Esc] home",
        View::Fatal(_) => "[q]uit",
    };
    format!(" {} ", keys)
}

fn render_reset_overlay(frame: &mut Frame, palette: &Palette) {
    let area = centered_rect_fixed(48, 9, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Delete ALL results, stats and caches?",
            palette.error_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "   This cannot be undone.",
            palette.muted_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", palette.muted_style()),
            Span::styled("[Y]", palette.help_key_style()),
            Span::styled(" to reset, ", palette.muted_style()),
            Span::styled("[N]", palette.help_key_style()),
            Span::styled(" to cancel", palette.muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.error_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
