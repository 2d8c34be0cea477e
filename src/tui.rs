use std::io::stdout;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::api::{FetchError, HttpJobSource, JobSource};
use crate::form::FormField;
use crate::models::Job;
use crate::state::{App, ApplyModal, InputMode, Screen};

type FetchResult = Result<Vec<Job>, FetchError>;

pub fn run_browse(endpoint: &str) -> Result<()> {
    // One fetch per mount, off the event loop thread. If the user quits
    // before it lands the send fails against a dropped receiver.
    let (tx, rx) = mpsc::channel::<FetchResult>();
    let source = HttpJobSource::new(endpoint);
    thread::spawn(move || {
        let _ = tx.send(source.fetch_jobs());
    });

    let mut app = App::new();

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut app, &rx);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    fetch_rx: &mpsc::Receiver<FetchResult>,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        if let Ok(result) = fetch_rx.try_recv() {
            app.finish_fetch(result);
        }
        app.tick(Instant::now());

        terminal.draw(|frame| draw(frame, app, &mut list_state))?;

        // Short poll so the fetch result and the deferred modal close get
        // picked up without a keypress
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key(app, key);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

// Modals take the keyboard before the screens do.
fn handle_key(app: &mut App, key: KeyEvent) {
    if app.apply_modal.is_some() {
        handle_apply_key(app, key);
    } else if app.pending_removal.is_some() {
        handle_confirm_key(app, key);
    } else if app.input_mode == InputMode::Search {
        handle_search_key(app, key);
    } else {
        match app.screen {
            Screen::Jobs => handle_jobs_key(app, key),
            Screen::Saved => handle_saved_key(app, key),
        }
    }
}

fn handle_jobs_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('s') => app.open_saved(),
        KeyCode::Char('/') => app.input_mode = InputMode::Search,
        _ if app.loading => {} // the list is not interactive while loading
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Char('b') | KeyCode::Char(' ') => {
            if let Some(job) = app.current_job().cloned() {
                app.toggle_save(&job);
            }
        }
        KeyCode::Char('a') | KeyCode::Enter => {
            if let Some(job) = app.current_job().cloned() {
                app.open_apply(job);
            }
        }
        _ => {}
    }
}

fn handle_saved_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.back_to_jobs(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Char('r') => {
            if let Some(job) = app.current_saved().cloned() {
                app.request_removal(job);
            }
        }
        KeyCode::Char('a') | KeyCode::Enter => {
            if let Some(job) = app.current_saved().cloned() {
                app.open_apply(job);
            }
        }
        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char(c) => app.search_push(c),
        _ => {}
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_removal(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_removal(),
        _ => {}
    }
}

fn handle_apply_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_apply(),
        KeyCode::Enter => app.submit_apply(Instant::now()),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(modal) = app.apply_modal.as_mut() {
                modal.focus = modal.focus.next();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(modal) = app.apply_modal.as_mut() {
                modal.focus = modal.focus.prev();
            }
        }
        KeyCode::Backspace => {
            if let Some(modal) = app.apply_modal.as_mut() {
                modal.form.field_mut(modal.focus).pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(modal) = app.apply_modal.as_mut() {
                modal.form.field_mut(modal.focus).push(c);
            }
        }
        _ => {}
    }
}

fn draw(frame: &mut Frame, app: &App, list_state: &mut ListState) {
    match app.screen {
        Screen::Jobs => draw_jobs_screen(frame, app, list_state),
        Screen::Saved => draw_saved_screen(frame, app, list_state),
    }
    if app.pending_removal.is_some() {
        draw_confirm_modal(frame);
    }
    if let Some(modal) = &app.apply_modal {
        draw_apply_modal(frame, modal);
    }
}

fn draw_jobs_screen(frame: &mut Frame, app: &App, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_search_bar(frame, app, chunks[0]);

    if app.loading {
        let loading = Paragraph::new("Loading jobs...")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Jobs "));
        frame.render_widget(loading, chunks[1]);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        list_state.select(if app.filtered_jobs.is_empty() {
            None
        } else {
            Some(app.selected)
        });
        draw_job_list(
            frame,
            app,
            &app.filtered_jobs,
            format!(" Jobs ({}) ", app.filtered_jobs.len()),
            body[0],
            list_state,
        );

        let detail = Paragraph::new(build_detail(app, app.current_job()))
            .block(Block::default().borders(Borders::ALL).title(" Detail "))
            .wrap(Wrap { trim: false });
        frame.render_widget(detail, body[1]);
    }

    let status = if let Some(notice) = &app.notice {
        Paragraph::new(format!(" {notice}"))
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        Paragraph::new(" j/k:navigate  /:search  b:save  a:apply  s:saved  q:quit")
            .style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(status, chunks[2]);
}

fn draw_saved_screen(frame: &mut Frame, app: &App, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    if app.saved_jobs.is_empty() {
        let empty = Paragraph::new("No jobs saved yet")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Saved Jobs "));
        frame.render_widget(empty, chunks[0]);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);

        list_state.select(Some(app.saved_selected));
        draw_job_list(
            frame,
            app,
            &app.saved_jobs,
            format!(" Saved Jobs ({}) ", app.saved_jobs.len()),
            body[0],
            list_state,
        );

        let detail = Paragraph::new(build_detail(app, app.current_saved()))
            .block(Block::default().borders(Borders::ALL).title(" Detail "))
            .wrap(Wrap { trim: false });
        frame.render_widget(detail, body[1]);
    }

    let help = Paragraph::new(" j/k:navigate  r:remove  a:apply  Esc:back")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[1]);
}

fn draw_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.input_mode == InputMode::Search;

    let content = if app.search_term.is_empty() && !editing {
        Span::styled(
            "Search by title or company...",
            Style::default().fg(Color::DarkGray),
        )
    } else if editing {
        Span::raw(format!("{}_", app.search_term))
    } else {
        Span::raw(app.search_term.clone())
    };

    let border_style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let widget = Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .border_style(border_style),
    );
    frame.render_widget(widget, area);
}

fn draw_job_list(
    frame: &mut Frame,
    app: &App,
    jobs: &[Job],
    title: String,
    area: Rect,
    list_state: &mut ListState,
) {
    let items: Vec<ListItem> = jobs
        .iter()
        .map(|job| {
            let marker = if app.is_saved(job) { "*" } else { " " };
            let name = if job.title.len() > 32 {
                format!("{}...", &job.title[..29])
            } else {
                job.title.clone()
            };
            ListItem::new(format!("{} {} | {}", marker, name, job.company_name))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, list_state);
}

fn build_detail<'a>(app: &App, job: Option<&'a Job>) -> Text<'a> {
    let Some(job) = job else {
        return Text::raw("No job selected");
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        &job.title,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", job.company_name)));
    lines.push(Line::from(""));
    lines.push(Line::from(format!("Category: {}", job.main_category)));
    lines.push(Line::from(format!("Job Type: {}", job.job_type)));
    lines.push(Line::from(format!("Work Model: {}", job.work_model)));
    lines.push(Line::from(format!(
        "Seniority Level: {}",
        job.seniority_level
    )));

    if app.is_saved(job) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Saved",
            Style::default().fg(Color::Green),
        )));
    }

    Text::from(lines)
}

fn draw_confirm_modal(frame: &mut Frame) {
    let area = centered_rect(46, 5, frame.area());
    frame.render_widget(Clear, area);

    let text = Text::from(vec![
        Line::from("Are you sure you want to remove this job?"),
        Line::from(""),
        Line::from(Span::styled(
            "y: yes    n: no",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    let widget = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Remove Saved Job "),
    );
    frame.render_widget(widget, area);
}

fn draw_apply_modal(frame: &mut Frame, modal: &ApplyModal) {
    let area = centered_rect(60, 22, frame.area());
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("Apply for {}", modal.job.title),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", modal.job.company_name)));
    lines.push(Line::from(""));

    for field in FormField::ALL {
        let focused = field == modal.focus;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(field.label(), label_style)));

        let value = modal.form.field(field);
        let shown = if focused {
            format!("> {value}_")
        } else {
            format!("  {value}")
        };
        lines.push(Line::from(shown));

        if let Some(message) = modal.form.errors.for_field(field) {
            lines.push(Line::from(Span::styled(
                message,
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(""));
    }

    if !modal.form.feedback_message.is_empty() {
        lines.push(Line::from(Span::styled(
            modal.form.feedback_message.as_str(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Tab: next field  Enter: submit  Esc: close",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Application "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height.min(area.height))
}
