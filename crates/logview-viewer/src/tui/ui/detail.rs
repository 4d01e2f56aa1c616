/*
[INPUT]:  Selected record and its index
[OUTPUT]: Pretty-printed JSON detail pane
[POS]:    TUI UI record detail rendering
[UPDATE]: When changing expanded record presentation
*/

use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use logview_adapter::Record;

use crate::tui::runtime::border_style;

pub(in crate::tui) fn draw_detail(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    selected: Option<(usize, &Record)>,
) {
    let (title, body) = match selected {
        Some((index, record)) => (format!("Record #{}", index + 1), record.to_pretty_json()),
        None => ("Record".to_string(), "(no selection)".to_string()),
    };

    let widget = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(title),
        );
    frame.render_widget(widget, area);
}
