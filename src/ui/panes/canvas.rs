//! Canvas pane rendering
//!
//! Draws every attached frame of the [`Canvas`] at its position, bottom to
//! top, so deeper calls overlap their callers the way a call stack grows.
//!
//! # Frame contents
//!
//! - The listing, with the highlighted region on a lifted background and
//!   hidden regions blanked out
//! - Value tags, drawn over the line below their region
//! - Variable boxes with the name above the value
//! - Arrays as a row of cells with the indices underneath
//!
//! Frames with opacity below one half are dimmed. Frames being scaled down
//! shrink toward their centre and only show their border and listing.

use crate::model::variable::BOTTOM_MARGIN;
use crate::surface::canvas::{ArrayView, Canvas, VisualFrame};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the canvas pane
pub fn render_canvas_pane(frame: &mut Frame, area: Rect, title: &str, canvas: &Canvas) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(DEFAULT_THEME.primary)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let frames: Vec<&VisualFrame> = canvas.attached_frames().collect();
    let top = frames.len().saturating_sub(1);
    for (level, visual) in frames.into_iter().enumerate() {
        render_visual_frame(frame, inner, visual, level == top);
    }
}

/// Inner area of the canvas pane, the size the canvas should have
pub fn canvas_area(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// Screen rectangle of a frame, or None when it is off the pane
fn frame_rect(inner: Rect, visual: &VisualFrame) -> Option<Rect> {
    let scale = visual.scale.clamp(0.0, 1.0);
    let (width, height) = (visual.width * scale, visual.height * scale);
    if width < 2.0 || height < 2.0 {
        return None;
    }

    // Shrink toward the centre
    let left = inner.x as f64 + (visual.x + (visual.width - width) / 2.0).round();
    let top = inner.y as f64 + (visual.y + (visual.height - height) / 2.0).round();
    if left < inner.x as f64 || top < inner.y as f64 {
        return None;
    }
    if left >= inner.right() as f64 || top >= inner.bottom() as f64 {
        return None;
    }

    let rect = Rect::new(
        left as u16,
        top as u16,
        width.round().min(u16::MAX as f64) as u16,
        height.round().min(u16::MAX as f64) as u16,
    );
    Some(rect.intersection(inner))
}

fn render_visual_frame(frame: &mut Frame, inner: Rect, visual: &VisualFrame, is_top: bool) {
    let Some(rect) = frame_rect(inner, visual) else {
        return;
    };

    let mut border = Style::default().fg(if is_top {
        DEFAULT_THEME.border_focused
    } else {
        DEFAULT_THEME.border_normal
    });
    let mut base = Style::default()
        .fg(DEFAULT_THEME.fg)
        .bg(DEFAULT_THEME.frame_bg);
    if visual.opacity < 0.5 {
        border = border.add_modifier(Modifier::DIM);
        base = base.add_modifier(Modifier::DIM);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .style(base)
        .title(Span::styled(
            format!(" {} ", visual.title),
            Style::default()
                .fg(DEFAULT_THEME.function)
                .add_modifier(Modifier::BOLD),
        ));
    let body = block.inner(rect);

    let lines: Vec<Line> = visual
        .listing
        .lines()
        .iter()
        .enumerate()
        .map(|(number, text)| listing_line(visual, number, text))
        .collect();

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);

    if visual.scale < 1.0 {
        return;
    }

    let origin = (rect.x as i32, rect.y as i32);
    let buf = frame.buffer_mut();
    render_variables(buf, body, origin, visual);
    for array in &visual.arrays {
        render_array(buf, body, origin, visual, array);
    }
    for tag in &visual.tags {
        let style = Style::default()
            .fg(DEFAULT_THEME.value_tag)
            .add_modifier(Modifier::BOLD);
        let text = format!("{:^width$}", tag.text, width = tag.width);
        put(
            buf,
            body,
            body.x as i32 + tag.column as i32,
            body.y as i32 + tag.line as i32,
            &text,
            style,
        );
    }
}

/// One listing line with its regions styled
fn listing_line<'a>(visual: &VisualFrame, number: usize, text: &'a str) -> Line<'a> {
    let mut regions: Vec<(usize, usize, usize)> = visual
        .listing
        .regions()
        .iter()
        .enumerate()
        .filter(|(_, region)| region.line == number)
        .map(|(index, region)| (region.column, region.width, index))
        .collect();
    if regions.is_empty() {
        return Line::raw(text);
    }
    regions.sort_unstable();

    let chars: Vec<char> = text.chars().collect();
    let slice = |from: usize, to: usize| -> String {
        chars[from.min(chars.len())..to.min(chars.len())].iter().collect()
    };

    let mut spans = Vec::new();
    let mut cursor = 0;
    for (column, width, index) in regions {
        if column > cursor {
            spans.push(Span::raw(slice(cursor, column)));
        }
        let state = visual.regions.get(index).copied().unwrap_or_default();
        let region_text = slice(column, column + width);
        if !state.visible {
            spans.push(Span::raw(" ".repeat(region_text.chars().count())));
        } else if state.highlighted {
            spans.push(Span::styled(
                region_text,
                Style::default()
                    .bg(DEFAULT_THEME.highlight_bg)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(region_text));
        }
        cursor = cursor.max(column + width);
    }
    if cursor < chars.len() {
        spans.push(Span::raw(slice(cursor, chars.len())));
    }
    Line::from(spans)
}

fn render_variables(buf: &mut Buffer, body: Rect, origin: (i32, i32), visual: &VisualFrame) {
    let bottom_row = visual.height - BOTTOM_MARGIN;
    let label = Style::default().fg(DEFAULT_THEME.comment);
    let value = Style::default()
        .fg(DEFAULT_THEME.variable)
        .add_modifier(Modifier::UNDERLINED);

    // Variables never laid out run left to right along the bottom row
    let mut free_x = 2.0;
    for variable in &visual.variables {
        let x = match variable.x {
            Some(x) => x,
            None => {
                let x = free_x;
                free_x += variable.width + 2.0;
                x
            }
        };
        let y = variable.y.unwrap_or(bottom_row);
        let (col, row) = (origin.0 + x.round() as i32, origin.1 + y.round() as i32);
        let width = variable.width.round().max(1.0) as usize;
        put(buf, body, col, row - 1, &variable.name, label);
        put(
            buf,
            body,
            col,
            row,
            &format!("{:^width$}", variable.text, width = width),
            value,
        );
    }
}

fn render_array(
    buf: &mut Buffer,
    body: Rect,
    origin: (i32, i32),
    visual: &VisualFrame,
    array: &ArrayView,
) {
    let (x, y) = array
        .at
        .unwrap_or((2.0, visual.listing.lines().len() as f64 + 2.0));
    let (col, row) = (origin.0 + x.round() as i32, origin.1 + y.round() as i32);

    let cell = array
        .cells
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0)
        .max(array.cells.len().saturating_sub(1).to_string().len())
        .max(1)
        + 2;

    let mut cells = String::from("│");
    let mut indices = String::from(" ");
    for (index, text) in array.cells.iter().enumerate() {
        cells.push_str(&format!("{:^cell$}│", text));
        indices.push_str(&format!("{:^cell$} ", index));
    }

    put(
        buf,
        body,
        col,
        row - 1,
        &array.name,
        Style::default().fg(DEFAULT_THEME.comment),
    );
    put(
        buf,
        body,
        col,
        row,
        &cells,
        Style::default().fg(DEFAULT_THEME.variable),
    );
    put(
        buf,
        body,
        col,
        row + 1,
        &indices,
        Style::default().fg(DEFAULT_THEME.comment),
    );
}

/// Write `text` at an absolute position, clipped to `clip`
fn put(buf: &mut Buffer, clip: Rect, x: i32, y: i32, text: &str, style: Style) {
    if y < clip.top() as i32 || y >= clip.bottom() as i32 {
        return;
    }
    if x < clip.left() as i32 || x >= clip.right() as i32 {
        return;
    }
    let room = (clip.right() as i32 - x) as usize;
    buf.set_stringn(x as u16, y as u16, text, room, style);
}
