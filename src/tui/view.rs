use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::shared::{DisplayState, FormField, FormView};

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // tempo readout
            Constraint::Length(4), // beat row
            Constraint::Min(5),    // set list
            Constraint::Length(2), // status + key help
        ])
        .split(area);

    draw_tempo_panel(frame, sections[0], state);
    draw_beat_row(frame, sections[1], state);
    draw_set_list(frame, sections[2], state);
    draw_footer(frame, sections[3], state);

    if let Some(form) = &state.form {
        draw_form(frame, area, form);
    }
}

fn draw_tempo_panel(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let transport = if state.playing { "playing" } else { "stopped" };
    let bpm = match state.bpm {
        Some(bpm) => format!("{bpm:.0} BPM"),
        None => "--- BPM".into(),
    };
    let line = Line::from(vec![
        Span::styled(bpm, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "   {} beats   {}   accent {}   vol {}%   ",
            state.beats_per_measure, state.subdivision_label, state.accent_label, state.volume
        )),
        Span::styled(
            transport,
            if state.playing {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        ),
    ]);

    let block = Block::default().borders(Borders::ALL).title(" clave ");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

// One box per pulse in the measure, downbeat box marked; the sounding pulse
// lights up as the clock passes each click's target time.
fn draw_beat_row(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let total = (state.beats_per_measure * state.pulses_per_beat).max(1) as usize;
    let constraints = vec![Constraint::Ratio(1, total as u32); total];

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (pulse, cell_area) in cells.iter().enumerate() {
        let lit = state.active_pulse == Some(pulse as u32);
        let downbeat = pulse == 0;
        let beat_start = pulse as u32 % state.pulses_per_beat == 0;

        let style = match (lit, downbeat) {
            (true, true) => Style::default().fg(Color::LightGreen).bg(Color::Green),
            (true, false) => Style::default().fg(Color::White).bg(Color::Gray),
            (false, true) => Style::default().fg(Color::Green),
            (false, false) if beat_start => Style::default().fg(Color::Gray),
            (false, false) => Style::default().fg(Color::DarkGray),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .style(style);
        frame.render_widget(block, *cell_area);
    }
}

fn draw_set_list(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut lines: Vec<Line> = Vec::with_capacity(state.songs.len().max(1));

    if state.songs.is_empty() {
        lines.push(Line::from(Span::styled(
            "no songs yet - press 'a' to add one",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (i, song) in state.songs.iter().enumerate() {
        let cursor = if i == state.selected { "> " } else { "  " };
        let marker = if state.loaded == Some(i) { "* " } else { "  " };
        let style = if i == state.selected {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(cursor),
            Span::styled(format!("{marker}{}", song.title), style),
            Span::styled(
                format!("  {}", song.summary),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    let block = Block::default().borders(Borders::ALL).title(" set list ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            state.status.clone(),
            Style::default().fg(Color::Yellow),
        )),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            "space play/stop  t tap  enter load  a add  -/= [/] bpm  ,/. beats  s subdiv  m accent  v/V vol  i/x import/export  esc quit",
            Style::default().fg(Color::DarkGray),
        )),
        rows[1],
    );
}

fn draw_form(frame: &mut Frame, area: Rect, form: &FormView) {
    let popup = centered_rect(44, 8, area);
    frame.render_widget(Clear, popup);

    let field_line = |field: FormField, value: &str| {
        let active = form.field == field;
        let marker = if active { "> " } else { "  " };
        let style = if active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{:<12}", field.label()), style),
            Span::styled(value.to_string(), style),
        ])
    };

    let lines = vec![
        field_line(FormField::Title, &form.title),
        field_line(FormField::Bpm, &form.bpm),
        field_line(FormField::TimeSig, &form.time_sig),
        field_line(FormField::Subdivision, form.subdivision_label),
        Line::from(Span::styled(
            "tab next field  up/down subdivision  enter add  esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default().borders(Borders::ALL).title(" add song ");
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
