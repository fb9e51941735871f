//! The scrollable page in front of the petal layer.

use ratatui::{
    style::{Color, Style, Stylize},
    text::Line,
};

/// Section titles and their body lines.
const SECTIONS: &[(&str, &[&str])] = &[
    (
        "Hello",
        &[
            "Petals drift behind this page while you read.",
            "Scroll with j/k, the arrow keys or the mouse wheel.",
        ],
    ),
    (
        "About",
        &[
            "The petal field keeps a bounded set of particles alive,",
            "spawning small batches on a timer and retiring the ones",
            "that fall out of view.",
        ],
    ),
    (
        "Education",
        &["Press 1-7 to glide to a section."],
    ),
    (
        "Experience",
        &["PgUp/PgDn glide a page at a time, g/G go to the ends."],
    ),
    (
        "Skills",
        &["While the page scrolls, petals drop to a cheaper tier."],
    ),
    (
        "Projects",
        &["Fast scrolling on a low-power machine shows a capped subset."],
    ),
    (
        "Contact",
        &["Press l to toggle low-power mode and p to pause the petals."],
    ),
];

/// Blank rows between sections.
const SECTION_GAP: usize = 12;

/// Page content and its scroll offset, in rows.
#[derive(Debug, Clone)]
pub struct Page {
    lines: Vec<Line<'static>>,
    anchors: Vec<usize>,
    offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        let mut lines = Vec::new();
        let mut anchors = Vec::with_capacity(SECTIONS.len());

        for (title, body) in SECTIONS {
            anchors.push(lines.len());
            lines.push(Line::from(title.to_uppercase()).bold().fg(Color::Rgb(255, 183, 197)));
            lines.push(Line::from(""));
            for text in *body {
                lines.push(Line::styled(*text, Style::new().fg(Color::Gray)));
            }
            lines.extend(std::iter::repeat_n(Line::from(""), SECTION_GAP));
        }

        Self {
            lines,
            anchors,
            offset: 0,
        }
    }

    /// Lines visible from the current offset.
    pub fn visible(&self, rows: usize) -> &[Line<'static>] {
        let end = (self.offset + rows).min(self.lines.len());
        &self.lines[self.offset.min(end)..end]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Largest offset that still fills `rows` rows.
    pub fn max_offset(&self, rows: usize) -> usize {
        self.lines.len().saturating_sub(rows)
    }

    /// Set the offset, clamped to the page.
    pub fn set_offset(&mut self, offset: usize, rows: usize) {
        self.offset = offset.min(self.max_offset(rows));
    }

    /// Row offset of section `index`, if it exists.
    pub fn anchor(&self, index: usize) -> Option<usize> {
        self.anchors.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_is_clamped() {
        let mut page = Page::new();
        page.set_offset(5, 10);
        assert_eq!(page.offset(), 5);

        page.set_offset(10_000, 10);
        assert_eq!(page.offset(), page.max_offset(10));
        assert_eq!(page.visible(10).len(), 10);

        // A taller terminal pulls the offset back into range.
        page.set_offset(page.offset(), 40);
        assert_eq!(page.offset(), page.max_offset(40));
    }

    #[test]
    fn test_anchors_point_at_titles() {
        let page = Page::new();
        assert_eq!(page.anchor(0), Some(0));
        let about = page.anchor(1).expect("second section");
        assert_eq!(page.lines[about].to_string(), "ABOUT");
        assert_eq!(page.anchor(SECTIONS.len()), None);
    }
}
