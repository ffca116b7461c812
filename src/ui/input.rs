//! Keyboard input handling for the TUI.
//!
//! Every state change the user can cause goes through here; keys
//! translate into fragment navigations or direct `App` calls.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, View};
use crate::router::{ChapterSelector, Route};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Reset confirmation takes the whole keyboard
    if app.confirming_reset {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                app.full_reset().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.confirming_reset = false;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Search entry mode captures printable keys
    if app.searching {
        match key.code {
            KeyCode::Char(c) => {
                app.search_query.push(c);
                app.home_selection = 0;
            }
            KeyCode::Backspace => {
                app.search_query.pop();
                app.home_selection = 0;
            }
            KeyCode::Enter => app.searching = false,
            KeyCode::Esc => {
                app.searching = false;
                app.search_query.clear();
                app.home_selection = 0;
            }
            _ => {}
        }
        return Ok(false);
    }

    match &app.view {
        View::Fatal(_) => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                app.should_quit = true;
                return Ok(true);
            }
        }
        View::Home => return handle_home_input(app, key).await,
        View::Chapters { .. } => return handle_chapters_input(app, key).await,
        View::Quiz => return handle_quiz_input(app, key).await,
        View::Summary(_) => return handle_summary_input(app, key).await,
    }
    Ok(false)
}

async fn handle_home_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return Ok(true);
        }
        KeyCode::Char('/') => app.searching = true,
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('R') => app.confirming_reset = true,
        KeyCode::Up => app.home_selection = app.home_selection.saturating_sub(1),
        KeyCode::Down => {
            let count = app.visible_subjects().len();
            if app.home_selection + 1 < count {
                app.home_selection += 1;
            }
        }
        KeyCode::Enter => {
            let target = app
                .visible_subjects()
                .get(app.home_selection)
                .map(|s| Route::Subject(s.name.clone()).fragment());
            if let Some(fragment) = target {
                app.navigate(&fragment).await;
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_chapters_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let View::Chapters { subject } = &app.view else {
        return Ok(false);
    };
    let subject = subject.clone();

    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return Ok(true);
        }
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Esc => app.navigate(&Route::Home.fragment()).await,
        KeyCode::Up => app.chapter_selection = app.chapter_selection.saturating_sub(1),
        KeyCode::Down => {
            // Row 0 is the full bank, chapter rows follow
            let count = app.chapter_rows(&subject).len() + 1;
            if app.chapter_selection + 1 < count {
                app.chapter_selection += 1;
            }
        }
        KeyCode::Enter => {
            let selector = if app.chapter_selection == 0 {
                ChapterSelector::All
            } else {
                match app.chapter_rows(&subject).get(app.chapter_selection - 1) {
                    Some(row) => ChapterSelector::Chapter(row.number),
                    None => return Ok(false),
                }
            };
            let fragment = Route::Quiz(subject, selector).fragment();
            app.navigate(&fragment).await;
        }
        KeyCode::Char('o') => {
            let url = app.bank_url(&subject);
            app.save_resource(&url).await;
        }
        KeyCode::Char('x') => {
            let url = app.bank_url(&subject);
            app.delete_resource(&url);
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_quiz_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Leaving mid-session discards it without recording a summary
        KeyCode::Esc => app.navigate(&Route::Home.fragment()).await,
        KeyCode::Left => app.nav_question(-1),
        KeyCode::Right | KeyCode::Enter => app.advance(),
        KeyCode::Char(c @ 'a'..='e') => app.answer_current(c as usize - 'a' as usize),
        KeyCode::Char(c @ '1'..='5') => app.answer_current(c as usize - '1' as usize),
        _ => {}
    }
    Ok(false)
}

async fn handle_summary_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return Ok(true);
        }
        KeyCode::Char('r') => {
            let target = app
                .last_quiz
                .as_ref()
                .map(|(subject, selector)| Route::Quiz(subject.clone(), *selector).fragment());
            if let Some(fragment) = target {
                app.navigate(&fragment).await;
            }
        }
        KeyCode::Esc | KeyCode::Enter => app.navigate(&Route::Home.fragment()).await,
        _ => {}
    }
    Ok(false)
}
