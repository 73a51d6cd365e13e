use crate::models::Message;
use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

/// Renders one message as a bordered block of lines: a header with timestamp
/// and author, the wrapped body, and a footer. User messages are indented to
/// the right.
pub fn render_message(message: &Message, area: Rect) -> Vec<Line<'static>> {
    let from_user = message.is_from_user();
    let style = base_style(from_user);
    let indent = if from_user { "  " } else { "" };

    let mut lines = Vec::new();

    let timestamp = message
        .timestamp
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());
    let author = if from_user { "You" } else { "Bot" };

    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("┌─ ".to_string(), style),
        Span::styled(timestamp, style.add_modifier(Modifier::DIM)),
        Span::styled(format!(" {}", author), style),
    ]));

    let wrap_width = (area.width as usize).saturating_sub(4 + indent.len());
    for content_line in message.content.lines() {
        if content_line.is_empty() {
            lines.push(gutter_line(indent, String::new(), style));
            continue;
        }
        for wrapped in wrap(content_line, wrap_width.max(1)) {
            lines.push(gutter_line(indent, wrapped.to_string(), style));
        }
    }

    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("╰─".to_string(), style),
    ]));

    lines
}

fn gutter_line(indent: &str, text: String, style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("│ ".to_string(), style),
        Span::styled(text, style),
    ])
}

fn base_style(from_user: bool) -> Style {
    Style::default().fg(if from_user {
        Color::Rgb(255, 223, 128)
    } else {
        Color::Rgb(144, 238, 144)
    })
}
