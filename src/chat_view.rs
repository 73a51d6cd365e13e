use crate::app::App;
use crate::chat_message::render_message;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn draw_chat(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
        .margin(1)
        .split(size);

    let chat_vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(1),    // Messages
                Constraint::Length(1), // Error banner
                Constraint::Length(2), // Status strip
                Constraint::Length(3), // Input
            ]
            .as_ref(),
        )
        .split(horizontal_chunks[0]);

    draw_messages(f, app, chat_vertical_chunks[0]);
    draw_error_banner(f, app, chat_vertical_chunks[1]);

    app.status_indicator.update_spinner();
    app.status_indicator.render(f, chat_vertical_chunks[2]);

    draw_input(f, app, chat_vertical_chunks[3]);
    draw_logs(f, app, horizontal_chunks[1]);
}

fn draw_messages(f: &mut Frame, app: &mut App, area: Rect) {
    let mut lines = Vec::new();
    for message in &app.session.messages {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(render_message(message, area));
    }

    // The title row eats one line of the area.
    let total_lines = lines.len() as u16;
    let max_scroll = total_lines.saturating_sub(area.height.saturating_sub(1));
    app.last_max_scroll = max_scroll;

    // Stick to the newest message unless the user scrolled away.
    if app.follow_bottom {
        app.chat_scroll = max_scroll;
    } else if app.chat_scroll > max_scroll {
        app.chat_scroll = max_scroll;
    }

    let title = Span::styled(
        format!(" chat: {} ", app.user_id),
        Style::default().fg(Color::DarkGray),
    );
    let msgs_para = Paragraph::new(lines)
        .block(Block::default().title(title))
        .wrap(Wrap { trim: true });
    f.render_widget(msgs_para.scroll((app.chat_scroll, 0)), area);
}

fn draw_error_banner(f: &mut Frame, app: &App, area: Rect) {
    let Some(error) = app.session.error.as_deref() else {
        return;
    };

    let banner = Line::from(vec![
        Span::styled("✗ ", Style::default().fg(Color::Red)),
        Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(banner), area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    // A shrunken terminal can hand this chunk fewer rows than the two
    // separators plus the input line need; draw nothing rather than underflow.
    if area.width == 0 || area.height < 3 {
        return;
    }

    let separator = "─".repeat(area.width as usize);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator.clone(),
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );

    let pending = app.session.pending;
    let prefix_style = if pending {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input_style = if pending {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(Color::White)
    };

    let input = Line::from(vec![
        Span::styled("→ ", prefix_style),
        Span::styled(app.input.clone(), input_style),
    ]);

    let visible_width = area.width.saturating_sub(2);
    let text_width = app.input.width() as u16;
    let scroll_offset = text_width.saturating_sub(visible_width);

    f.render_widget(
        Paragraph::new(input).scroll((0, scroll_offset)),
        Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(2),
        },
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y + area.height - 1,
            width: area.width,
            height: 1,
        },
    );

    // Input is disabled while an exchange is in flight, so hide the cursor.
    if !pending {
        let cursor_x = area.x + 2 + text_width - scroll_offset;
        f.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn draw_logs(f: &mut Frame, app: &App, area: Rect) {
    let log_lines: Vec<Line> = app
        .logs
        .entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::DarkGray)),
                Span::raw(entry.clone()),
            ])
        })
        .collect();

    let total_log_lines = log_lines.len() as u16;
    let max_log_scroll = total_log_lines.saturating_sub(area.height.saturating_sub(2));

    let logs_para = Paragraph::new(log_lines)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::LEFT).title(" activity "))
        .wrap(Wrap { trim: true });
    f.render_widget(logs_para.scroll((max_log_scroll, 0)), area);
}

pub fn draw_quit_confirm(f: &mut Frame) {
    let size = f.area();
    let area = Rect {
        x: size.width.saturating_sub(34) / 2,
        y: size.height.saturating_sub(5) / 2,
        width: 34.min(size.width),
        height: 5.min(size.height),
    };

    f.render_widget(Clear, area);
    let dialog = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Quit coinchat? (y/n)",
            Style::default().fg(Color::Yellow),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(" confirm "));
    f.render_widget(dialog, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;
    use crate::session::SessionEvent;
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let (command_tx, _command_rx) = mpsc::channel(8);
        let (_event_tx, event_rx) = mpsc::channel(8);
        let mut app = App::new("user123".to_string(), command_tx, event_rx);
        app.session
            .apply(SessionEvent::RequestStarted(Message::user("user123", "hello")));
        app.session.apply(SessionEvent::RequestFailed("boom".to_string()));
        app
    }

    #[test]
    fn test_draw_chat_survives_tiny_terminals() {
        let mut app = test_app();
        // Shrinking the terminal squeezes the layout chunks below the sizes
        // the panes normally assume; none of them may underflow.
        for (width, height) in [(80, 24), (12, 4), (7, 3), (2, 2), (1, 1)] {
            let backend = TestBackend::new(width, height);
            let mut terminal = Terminal::new(backend).unwrap();
            terminal.draw(|f| draw_chat(f, &mut app)).unwrap();
        }
    }

    #[test]
    fn test_draw_quit_confirm_survives_tiny_terminals() {
        for (width, height) in [(80, 24), (10, 3), (1, 1)] {
            let backend = TestBackend::new(width, height);
            let mut terminal = Terminal::new(backend).unwrap();
            terminal.draw(draw_quit_confirm).unwrap();
        }
    }
}
