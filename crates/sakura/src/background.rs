//! Petal background layer for the terminal host.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Color,
    widgets::Widget,
};
use sakura_field::DrawDescriptor;

/// Glyph pairs per petal variant; the second glyph shows a petal edge-on.
const PETAL_CHARS: &[[char; 2]] = &[
    ['✿', '❀'],
    ['❁', '✾'],
    ['✽', '*'],
    ['•', '·'],
    ['❃', '✻'],
];

/// Hue per petal variant, pink through magenta.
const PETAL_HUES: &[f32] = &[340.0, 350.0, 330.0, 345.0, 320.0];

/// Tilt in degrees past which a petal shows its edge.
const EDGE_ON_TILT: f32 = 30.0;

/// Paints draw descriptors into the cells of a terminal buffer.
///
/// One cell covers `cell_width` × `cell_height` pixels of the simulated
/// viewport. Petals only land on blank cells, so anything painted earlier
/// stays in front of them.
#[derive(Debug, Clone, Copy)]
pub struct PetalLayer<'a> {
    descriptors: &'a [DrawDescriptor],
    cell_width: f32,
    cell_height: f32,
}

impl<'a> PetalLayer<'a> {
    pub fn new(descriptors: &'a [DrawDescriptor], cell_width: f32, cell_height: f32) -> Self {
        Self {
            descriptors,
            cell_width: cell_width.max(1.0),
            cell_height: cell_height.max(1.0),
        }
    }

    /// Cell under the centre of a petal, relative to the layer origin.
    fn cell_of(&self, d: &DrawDescriptor) -> Option<(u16, u16)> {
        let half = d.size * d.scale / 2.0;
        let col = ((d.x + half) / self.cell_width).floor();
        let row = ((d.y + half) / self.cell_height).floor();
        if col < 0.0 || row < 0.0 || col > u16::MAX as f32 || row > u16::MAX as f32 {
            return None;
        }
        Some((col as u16, row as u16))
    }
}

impl Widget for PetalLayer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Descriptors arrive back to front; paint front first so it wins.
        for d in self.descriptors.iter().rev() {
            let Some((col, row)) = self.cell_of(d) else {
                continue;
            };
            let pos = Position::new(area.x.saturating_add(col), area.y.saturating_add(row));
            if !area.contains(pos) {
                continue;
            }
            if let Some(cell) = buf.cell_mut(pos)
                && cell.symbol() == " "
            {
                cell.set_char(petal_char(d)).set_fg(petal_color(d));
            }
        }
    }
}

/// Glyph for a petal: variant picks the pair. A petal tilted edge-on, or
/// without tilt turned through its far half, uses the second glyph.
pub fn petal_char(d: &DrawDescriptor) -> char {
    let pair = PETAL_CHARS[d.variant as usize % PETAL_CHARS.len()];
    let far = match d.effects {
        Some(effects) => effects.tilt_x.abs() > EDGE_ON_TILT,
        None => d.rotation >= 180.0,
    };
    if far { pair[1] } else { pair[0] }
}

/// Colour for a petal. Opacity maps to lightness against a dark terminal;
/// blurred petals lose some saturation.
pub fn petal_color(d: &DrawDescriptor) -> Color {
    let hue = PETAL_HUES[d.variant as usize % PETAL_HUES.len()];
    let blur = d.effects.map(|e| e.blur).unwrap_or(0.0);
    let saturation = (0.75 - blur).clamp(0.3, 0.75);
    let lightness = 0.25 + 0.5 * d.opacity.clamp(0.0, 1.0);
    petal_rgb(hue, saturation, lightness)
}

/// RGB for a hue in the magenta to red sector (300° to 360°), the only
/// sector petals use. Red is the full channel, green the floor, and blue
/// fades from full at 300° to the floor at 360°.
fn petal_rgb(hue: f32, saturation: f32, lightness: f32) -> Color {
    let hue = hue.clamp(300.0, 360.0);
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let floor = lightness - chroma / 2.0;
    let blue = chroma * (360.0 - hue) / 60.0;
    let channel = |v: f32| ((v + floor).clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb(channel(chroma), channel(0.0), channel(blue))
}
