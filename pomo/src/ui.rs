use crate::app::{App, View};
use chrono::Duration;
use pomo_core::{DayReport, Phase, SessionKind, SessionStore, TimerStatus};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

const HELP: &str = "s [min] work │ b [min] break │ l [YYYY-MM-DD] list │ q quit";

pub fn draw<S: SessionStore>(f: &mut Frame, app: &App<S>) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, chunks[0], app);

    let status = app.controller.status();
    match (status.phase, &app.view) {
        (Phase::Idle, View::Report(report)) => draw_report(f, chunks[1], app, report),
        (Phase::Idle, View::Prompt) => draw_prompt(f, chunks[1], app),
        (Phase::Active, _) => draw_countdown(f, chunks[1], app, &status),
        _ => draw_banner(f, chunks[1], app, &status),
    }

    draw_status_bar(f, chunks[2], app, &status);
}

fn draw_header<S: SessionStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let text = Line::from(vec![
        Span::raw(icons.header_left.clone()),
        Span::styled(
            "POMO",
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        ),
        Span::raw(icons.header_right.clone()),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.black)),
        ),
        area,
    );
}

fn draw_prompt<S: SessionStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(theme.gray)),
        rows[0],
    );
    let input = if app.input.is_empty() {
        Span::styled("Command...", Style::default().fg(theme.gray))
    } else {
        Span::styled(app.input.clone(), Style::default().fg(theme.foreground))
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(icons.prompt.clone(), Style::default().fg(theme.green)),
            input,
            Span::styled(
                icons.input_cursor.clone(),
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ])),
        rows[1],
    );
    if let Some(error) = &app.error {
        f.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(theme.red)),
            rows[2],
        );
    }
}

fn draw_countdown<S: SessionStore>(f: &mut Frame, area: Rect, app: &App<S>, status: &TimerStatus) {
    let theme = &app.config.theme;
    let accent = kind_color(app, status.kind);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} {} ", kind_icon(app, status.kind), status.kind),
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner_area);
    f.render_widget(
        Paragraph::new(format!(
            "{} Timer: {} left",
            status.kind,
            format_remaining(status.remaining)
        ))
        .style(
            Style::default()
                .fg(theme.foreground)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center),
        v_chunks[0],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(accent).bg(theme.black))
            .ratio(status.percent.clamp(0.0, 1.0))
            .label(format!("{:.0}%", status.percent * 100.0)),
        v_chunks[1],
    );
}

fn draw_banner<S: SessionStore>(f: &mut Frame, area: Rect, app: &App<S>, status: &TimerStatus) {
    let theme = &app.config.theme;
    let text = match status.phase {
        Phase::Opening => format!(
            "Ready to start new {} session for {} minutes in {} seconds...",
            status.kind,
            status.duration.num_minutes(),
            status.opening_secs_left()
        ),
        _ => match status.kind {
            SessionKind::Work => "You have completed one Work session. Keep it up 💪".to_string(),
            SessionKind::Break => {
                "Regained your energy with short Break. Let's start Work session.".to_string()
            }
        },
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(kind_color(app, status.kind)))
            .alignment(Alignment::Center)
            .block(Block::default().style(Style::default().bg(theme.background))),
        rows[0],
    );
}

fn draw_report<S: SessionStore>(f: &mut Frame, area: Rect, app: &App<S>, report: &DayReport) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let title = format!(
        " {} │ {} sessions │ {} ",
        report.date.format("%Y-%m-%d"),
        report.sessions.len(),
        format_total(report.total)
    );
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(theme.gray)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.magenta));

    if report.is_empty() {
        f.render_widget(
            Paragraph::new("No work sessions on this day.")
                .style(Style::default().fg(theme.gray))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = report
        .sessions
        .iter()
        .enumerate()
        .map(|(i, session)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>3}. ", i + 1), Style::default().fg(theme.blue)),
                Span::styled(
                    format!(
                        "{} - {}",
                        session.start_time.format("%H:%M"),
                        session.end_time.format("%H:%M")
                    ),
                    Style::default().fg(theme.foreground),
                ),
                Span::styled(
                    format!(" {} ", icons.separator),
                    Style::default().fg(theme.gray),
                ),
                Span::styled(
                    format!("{} min", session.duration.num_minutes()),
                    Style::default().fg(theme.cyan),
                ),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

fn draw_status_bar<S: SessionStore>(f: &mut Frame, area: Rect, app: &App<S>, status: &TimerStatus) {
    let theme = &app.config.theme;
    let (mode_text, mode_color) = match (status.phase, &app.view) {
        (Phase::Idle, View::Prompt) => ("PROMPT", theme.green),
        (Phase::Idle, View::Report(_)) => ("LIST", theme.magenta),
        (Phase::Opening, _) => ("START", theme.yellow),
        (Phase::Active, _) => ("RUN", kind_color(app, status.kind)),
        (Phase::Closing, _) => ("DONE", theme.yellow),
    };
    let help = match (status.phase, &app.view) {
        (Phase::Idle, View::Prompt) => "enter:run │ esc:quit",
        (Phase::Idle, View::Report(_)) => "x:close │ esc:quit",
        _ => "x:stop │ q:quit",
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.background)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(help),
        ]))
        .block(Block::default().style(Style::default().bg(theme.black).fg(theme.gray))),
        area,
    );
}

fn kind_color<S: SessionStore>(app: &App<S>, kind: SessionKind) -> ratatui::style::Color {
    match kind {
        SessionKind::Work => app.config.theme.blue,
        SessionKind::Break => app.config.theme.green,
    }
}

fn kind_icon<S: SessionStore>(app: &App<S>, kind: SessionKind) -> &str {
    match kind {
        SessionKind::Work => &app.config.icons.work,
        SessionKind::Break => &app.config.icons.rest,
    }
}

/// Countdown text in the `1h2m3s` style. Negative while closing.
pub fn format_remaining(d: Duration) -> String {
    let secs = d.num_seconds();
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if h > 0 {
        format!("{sign}{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{sign}{m}m{s}s")
    } else {
        format!("{sign}{s}s")
    }
}

pub fn format_total(d: Duration) -> String {
    let minutes = d.num_minutes();
    if minutes >= 60 {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}
