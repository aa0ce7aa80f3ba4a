//! Keyboard event handling, dispatched on the current app state.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Focus, LoginFocus, Tab};
use crate::views::routes::Origin;

/// Handle one key event. Returns true when the app should exit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Any keypress clears a transient status message
    app.status_message = None;

    match app.state {
        AppState::LoggingIn => handle_login(app, key).await,
        AppState::Searching => Ok(handle_search(app, key)),
        AppState::EditingCustomer => handle_form(app, key).await,
        AppState::ConfirmingDelete => handle_delete_confirm(app, key).await,
        AppState::ShowingHelp => {
            app.state = AppState::Normal;
            Ok(false)
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                }
                _ => app.state = AppState::Normal,
            }
            Ok(false)
        }
        AppState::Quitting => Ok(true),
        AppState::Normal => handle_normal(app, key).await,
    }
}

async fn handle_login(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Without a session there is nothing behind the login screen
            if app.is_authenticated() {
                app.state = AppState::Normal;
                Ok(false)
            } else {
                Ok(true)
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
            Ok(false)
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
            Ok(false)
        }
        KeyCode::Enter => {
            match app.login_focus {
                LoginFocus::Email => app.login_focus = LoginFocus::Password,
                LoginFocus::Password | LoginFocus::Button => {
                    // Errors land in login_error; the overlay stays up
                    let _ = app.attempt_login().await;
                }
            }
            Ok(false)
        }
        KeyCode::Backspace => {
            match app.login_focus {
                LoginFocus::Email => {
                    app.login_email.pop();
                }
                LoginFocus::Password => {
                    app.login_password.pop();
                }
                LoginFocus::Button => {}
            }
            Ok(false)
        }
        KeyCode::Char(c) => {
            match app.login_focus {
                LoginFocus::Email => app.login_email.push(c),
                LoginFocus::Password => app.login_password.push(c),
                LoginFocus::Button => {}
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_search(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            let mut query = app.search_query.clone();
            query.pop();
            app.set_search_query(query);
        }
        KeyCode::Char(c) => {
            let mut query = app.search_query.clone();
            query.push(c);
            app.set_search_query(query);
        }
        _ => {}
    }
    false
}

async fn handle_form(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.form = None;
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.submit_customer_form().await,
        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = app.form.as_mut() {
                form.next_field();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = app.form.as_mut() {
                form.prev_field();
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = app.form.as_mut() {
                form.backspace();
            }
        }
        KeyCode::Char(' ') => {
            if let Some(form) = app.form.as_mut() {
                if form.current_field().is_text() {
                    form.insert_char(' ');
                } else {
                    form.toggle_value();
                }
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.form.as_mut() {
                form.insert_char(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_delete_confirm(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete_customer().await,
        _ => app.cancel_delete(),
    }
    Ok(false)
}

async fn handle_normal(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('1') => app.current_tab = Tab::Home,
        KeyCode::Char('2') => app.current_tab = Tab::Customers,
        KeyCode::Char('3') => app.current_tab = Tab::History,
        KeyCode::Tab => app.current_tab = app.current_tab.next(),
        KeyCode::BackTab => app.current_tab = app.current_tab.prev(),
        KeyCode::Esc => {
            app.focus = Focus::List;
            app.detail_route = None;
        }
        KeyCode::Char('/') => {
            if app.current_tab == Tab::Customers {
                app.state = AppState::Searching;
            }
        }
        KeyCode::Char('r') => match app.current_tab {
            Tab::Home => app.refresh_home(),
            Tab::Customers => app.refresh_customers(),
            Tab::History => app.refresh_history(),
        },
        KeyCode::Char('R') => {
            // Full refresh, forcing the store cache past its window
            app.refresh_stores(true);
            app.refresh_home();
            app.refresh_history();
            app.refresh_customers();
        }
        KeyCode::Char('g') => {
            if matches!(app.current_tab, Tab::Home | Tab::History) {
                app.toggle_granularity();
            }
        }
        KeyCode::Char('f') => {
            if app.current_tab == Tab::History {
                app.cycle_history_filter();
            }
        }
        KeyCode::Char('[') => match app.current_tab {
            Tab::Customers => app.customer_page_prev(),
            Tab::History => app.history_page_prev(),
            Tab::Home => {}
        },
        KeyCode::Char(']') => match app.current_tab {
            Tab::Customers => app.customer_page_next(),
            Tab::History => app.history_page_next(),
            Tab::Home => {}
        },
        KeyCode::Char('j') | KeyCode::Down => move_selection(app, 1),
        KeyCode::Char('k') | KeyCode::Up => move_selection(app, -1),
        KeyCode::Char('n') => {
            if app.current_tab == Tab::Customers {
                app.open_new_customer_form();
            }
        }
        KeyCode::Char('e') => {
            if app.current_tab == Tab::Customers {
                app.open_edit_customer_form();
            }
        }
        KeyCode::Char('d') => {
            if app.current_tab == Tab::Customers {
                app.request_delete_customer();
            }
        }
        KeyCode::Enter => match app.current_tab {
            Tab::Home => app.activate_lesson(Origin::Home),
            Tab::History => app.activate_lesson(Origin::History),
            Tab::Customers => app.open_edit_customer_form(),
        },
        _ => {}
    }
    Ok(false)
}

fn move_selection(app: &mut App, delta: i64) {
    let (selection, len) = match app.current_tab {
        Tab::Home => (
            &mut app.home_selection,
            app.home.as_ref().map(|h| h.recent.len()).unwrap_or(0),
        ),
        Tab::Customers => {
            let len = app.visible_customers().len();
            (&mut app.customer_selection, len)
        }
        Tab::History => {
            let len = app.visible_history().len();
            (&mut app.history_selection, len)
        }
    };

    if len == 0 {
        *selection = 0;
        return;
    }
    let current = *selection as i64;
    *selection = (current + delta).clamp(0, len as i64 - 1) as usize;
}
