use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, AppState, HORIZONTAL_MARGIN},
    progress::Bar,
    quote::Quote,
    session::Session,
};

const VERTICAL_MARGIN: u16 = 1;
/// Substitutions listed per character on the results screen.
const HIGHSCORE_SUBSTITUTIONS: usize = 3;
const HIGHSCORE_CHARS: usize = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.quote.len().max(1) as u16;
        let lower = match self.state {
            AppState::Typing => lines,
            AppState::Results => HIGHSCORE_CHARS as u16 + 4,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),     // speeds
                Constraint::Length(1),     // padding
                Constraint::Length(lines), // quote
                Constraint::Length(1),     // padding
                Constraint::Length(lower), // input or results
                Constraint::Length(1),     // padding
                Constraint::Length(2),     // progress
                Constraint::Min(0),
                Constraint::Length(1), // legend
            ])
            .split(area);

        speed_line(self).render(chunks[0], buf);
        quote_view(&self.quote, &self.session, self.state).render(chunks[2], buf);

        match self.state {
            AppState::Typing => input_view(&self.session).render(chunks[4], buf),
            AppState::Results => results_view(self).render(chunks[4], buf),
        }

        render_progress(self, chunks[6], buf);

        let legend = match self.state {
            AppState::Typing => "(esc) finish / (ctrl-x) restart / (ctrl-c) quit",
            AppState::Results => "(enter) next / (ctrl-x) retry / (ctrl-c) quit",
        };
        Paragraph::new(Span::styled(
            legend,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[8], buf);
    }
}

fn speed_line(app: &App) -> Paragraph<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let player = &app.session.player;
    let robot = &app.session.robot;

    let mut spans = vec![
        Span::styled(player.name.clone(), bold),
        Span::raw(format!(" {:.0} {}", app.unit.from_cps(player.speed), app.unit)),
    ];
    if robot.speed > 0.0 {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            robot.name.clone(),
            bold.fg(Color::Magenta),
        ));
        spans.push(Span::raw(format!(
            " {:.0} {}",
            app.unit.from_cps(robot.speed),
            app.unit
        )));
    }
    Paragraph::new(Line::from(spans))
}

fn quote_view(quote: &Quote, session: &Session, state: AppState) -> Paragraph<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let typed = bold.fg(Color::Green);
    let wrong = bold.fg(Color::Red);
    let pending = bold.add_modifier(Modifier::DIM);

    let lines = quote
        .lines()
        .iter()
        .enumerate()
        .map(|(row, line)| {
            let spans = line
                .chars()
                .enumerate()
                .map(|(col, ch)| {
                    let pos = quote.strpos(row, col);
                    let mistyped = quote.stats.typos.get(&(row, col)) == Some(&true)
                        && pos < session.player.pos;

                    let mut style = if mistyped {
                        wrong
                    } else if pos < session.player.pos {
                        typed
                    } else {
                        pending
                    };
                    if state == AppState::Typing && pos == session.player.pos {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    if session.robot.speed > 0.0 && pos == session.robot.pos {
                        style = style.bg(Color::Magenta);
                    }

                    let symbol = match ch {
                        ' ' if mistyped => "·".to_string(),
                        ch => ch.to_string(),
                    };
                    Span::styled(symbol, style)
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect::<Vec<_>>();

    Paragraph::new(lines)
}

fn input_view(session: &Session) -> Paragraph<'static> {
    let input = &session.input;
    let (top, left) = input.offset();
    let (cursor_row, cursor_col) = input.cursor();
    let cursor = Style::default().add_modifier(Modifier::REVERSED);

    let lines = (top..input.pad().height())
        .map(|row| {
            let spans = (left..input.pad().width())
                .map(|col| {
                    let ch = input.cell(row, col).to_string();
                    if session.writable && (row, col) == (cursor_row, cursor_col) {
                        Span::styled(ch, cursor)
                    } else {
                        Span::raw(ch)
                    }
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect::<Vec<_>>();

    Paragraph::new(lines)
}

fn results_view(app: &App) -> Paragraph<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let stats = &app.quote.stats;

    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "{:.0} {}   {}% acc   {:.1}s",
                app.unit.from_cps(stats.speed()),
                app.unit,
                stats.accuracy(),
                stats.timer.elapsed().as_secs_f64(),
            ),
            bold,
        )),
        Line::from(format!(
            "{} good / {} typo / {} tab / {} space / {} enter",
            stats.keystrokes_good,
            stats.keystrokes_typo,
            stats.keystrokes_tab,
            stats.keystrokes_space,
            stats.keystrokes_enter,
        )),
        Line::default(),
    ];

    let highscore = stats.typo_highscore();
    if highscore.is_empty() {
        lines.push(Line::from(Span::styled(
            "no typos",
            Style::default().fg(Color::Green),
        )));
    }
    lines.extend(
        highscore
            .into_iter()
            .take(HIGHSCORE_CHARS)
            .map(|(expected, substitutions)| {
                let typed = substitutions
                    .iter()
                    .take(HIGHSCORE_SUBSTITUTIONS)
                    .map(|(ch, count)| format!("{} x{count}", printable(*ch)))
                    .join(", ");
                Line::from(vec![
                    Span::styled(format!("{:>5}", printable(expected)), bold.fg(Color::Red)),
                    Span::raw(format!("  {typed}")),
                ])
            }),
    );

    Paragraph::new(lines)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false })
}

fn printable(ch: char) -> String {
    match ch {
        ' ' => "space".to_string(),
        '\t' => "tab".to_string(),
        ch => ch.to_string(),
    }
}

fn render_progress(app: &App, area: Rect, buf: &mut Buffer) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    Bar::new(&app.player_bar)
        .style(Style::default().bg(Color::Green))
        .render(rows[0], buf);
    if app.session.robot.speed > 0.0 {
        Bar::new(&app.robot_bar)
            .style(Style::default().bg(Color::Magenta))
            .render(rows[1], buf);
    }
}
