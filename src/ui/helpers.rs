use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Footer hints as alternating key/description spans.
pub(crate) fn key_hints(pairs: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (idx, (key, description)) in pairs.iter().enumerate() {
        spans.push(Span::styled(*key, key_style));
        let separator = if idx + 1 == pairs.len() { "" } else { "   " };
        spans.push(Span::raw(format!(" {description}{separator}")));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = Err::<(), _>(anyhow!("Age must be positive (got 0)."))
            .context("failed to save student")
            .unwrap_err();
        assert_eq!(surface_error(&err), "Age must be positive (got 0).");
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert!(popup.x >= 20 && popup.y >= 15);
    }

    #[test]
    fn key_hints_pair_keys_with_descriptions() {
        let spans = key_hints(&[("[q]", "Quit"), ("[+]", "Add")]);
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0].content, "[q]");
        assert_eq!(spans[1].content, " Quit   ");
        assert_eq!(spans[3].content, " Add");
    }
}
