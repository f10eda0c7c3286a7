// SPDX-License-Identifier: GPL-3.0-only

//! Terminal widgets: camera preview, status bar, notification banner, gallery list

use super::state::GalleryState;
use crate::backends::camera::CameraFrame;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap},
};

/// Widget that renders a camera frame using half-block characters
pub struct FrameWidget {
    pub frame: Option<CameraFrame>,
    /// Flip horizontally (selfie view)
    pub mirror: bool,
}

impl FrameWidget {
    pub fn new(mirror: bool) -> Self {
        Self {
            frame: None,
            mirror,
        }
    }

    pub fn update_frame(&mut self, frame: CameraFrame) {
        self.frame = Some(frame);
    }

    /// Forget the last frame, e.g. after switching cameras
    pub fn reset(&mut self) {
        self.frame = None;
    }
}

/// Size in cells of a `frame_w`x`frame_h` image fitted into `area`
///
/// Each cell holds two vertical pixels.
pub fn fit_dimensions(frame_w: u32, frame_h: u32, area: Rect) -> (u16, u16) {
    if frame_w == 0 || frame_h == 0 {
        return (0, 0);
    }
    let frame_aspect = frame_w as f64 / frame_h as f64;
    let term_width = area.width as f64;
    let term_height = (area.height as f64) * 2.0;

    if term_width / term_height > frame_aspect {
        let w = term_height * frame_aspect;
        (w as u16, (term_height / 2.0) as u16)
    } else {
        let h = term_width / frame_aspect;
        (term_width as u16, (h / 2.0) as u16)
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };

        let (display_width, display_height) = fit_dimensions(frame.width, frame.height, area);
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height as f64 * 2.0);

        // Upper half (▀) takes the fg colour, lower half the bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;
                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let mut src_x = (tx as f64 * x_scale) as u32;
                if self.mirror {
                    src_x = frame.width.saturating_sub(1).saturating_sub(src_x);
                }
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (tr, tg, tb) = frame.rgb_at(src_x, src_y_top);
                let (br, bg, bb) = frame.rgb_at(src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    pub message: &'a str,
    /// Red background while recording
    pub recording: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = if self.recording {
            Color::Red
        } else {
            Color::DarkGray
        };

        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(bg);
            }
        }

        // Truncate on a char boundary; the gallery hints contain arrows
        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, Style::default().fg(Color::White).bg(bg));
    }
}

/// Notification banner in the top-right corner
pub struct NotificationBanner<'a> {
    pub message: &'a str,
}

impl NotificationBanner<'_> {
    /// Area the banner occupies inside `area`
    pub fn placement(&self, area: Rect) -> Rect {
        let width = (self.message.chars().count() as u16 + 4).min(area.width);
        Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y: area.y + 1.min(area.height),
            width,
            height: 3.min(area.height),
        }
    }
}

impl Widget for NotificationBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let banner = self.placement(area);
        Clear.render(banner, buf);
        Paragraph::new(self.message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::White).bg(Color::Blue))
            .block(Block::default().borders(Borders::ALL))
            .render(banner, buf);
    }
}

/// Gallery page: title, then the item list or a loading/error/empty line
pub struct GalleryView<'a> {
    pub gallery: &'a GalleryState,
}

impl Widget for GalleryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let gallery = self.gallery;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::from(gallery.kind.title()).alignment(Alignment::Center));

        let message = if gallery.loading {
            Some("Loading...".to_string())
        } else if let Some(error) = &gallery.error {
            Some(format!("Could not load gallery: {}", error))
        } else if gallery.items.is_empty() {
            Some("Nothing uploaded yet".to_string())
        } else {
            None
        };

        if let Some(message) = message {
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block)
                .render(area, buf);
            return;
        }

        let items: Vec<ListItem> = gallery
            .items
            .iter()
            .map(|item| ListItem::new(format!("{}  {}", item.name(), item.url)))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(gallery.selected));
        StatefulWidget::render(list, area, buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_dimensions_keeps_aspect() {
        // 4:3 frame in an 80x24 terminal is limited by height (48 pixel rows)
        let (w, h) = fit_dimensions(640, 480, Rect::new(0, 0, 80, 24));
        assert_eq!((w, h), (64, 24));

        // Very wide terminal, tall frame
        let (w, h) = fit_dimensions(480, 640, Rect::new(0, 0, 200, 10));
        assert_eq!((w, h), (15, 10));
    }

    #[test]
    fn test_placeholder_before_first_frame() {
        let widget = FrameWidget::new(false);
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);
        let row: String = (0..30)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect();
        assert!(row.contains("Waiting for camera..."));
    }

    #[test]
    fn test_mirror_flips_columns() {
        // Left column red, right column blue
        let mut data = Vec::new();
        for _ in 0..2 {
            data.extend_from_slice(&[255, 0, 0, 255, 0, 0, 255, 255]);
        }
        let area = Rect::new(0, 0, 2, 1);

        let mut widget = FrameWidget::new(false);
        widget.update_frame(CameraFrame::from_rgba(2, 2, data.clone()));
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(255, 0, 0));

        let mut mirrored = FrameWidget::new(true);
        mirrored.update_frame(CameraFrame::from_rgba(2, 2, data));
        let mut buf = Buffer::empty(area);
        (&mirrored).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn test_status_bar_truncates_on_char_boundary() {
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        StatusBar {
            message: "↑/↓ select",
            recording: false,
        }
        .render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "↑");
        assert_eq!(buf[(0, 0)].bg, Color::DarkGray);
    }
}
