/// Display list for the score card

use super::layout::{LayoutNode, GLYPH_SIZE};
use crate::Viewport;
use std::sync::Arc;

/// White text, as on the stock card
pub const TEXT_COLOR: (u8, u8, u8, u8) = (0xFF, 0xFF, 0xFF, 0xFF);
/// rgba(0, 0, 0, 0.3)
pub const OVERLAY_COLOR: (u8, u8, u8, u8) = (0, 0, 0, 77);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Copy an image (already sized to the card) to the origin
    Image { image: Arc<image::RgbaImage> },
    /// Alpha-blended rectangle
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: (u8, u8, u8, u8),
    },
    /// One line of bitmap text with its top-left corner at (x, y)
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: (u8, u8, u8, u8),
    },
}

/// Background after mount: decoded and fitted, or a flat fill
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedBackground {
    Image(Arc<image::RgbaImage>),
    Solid([u8; 4]),
}

/// Build the paint list: background, dimming overlay, then every text line
/// centered horizontally inside its node.
pub fn display_list(
    background: &ResolvedBackground,
    nodes: &[LayoutNode],
    viewport: Viewport,
) -> Vec<PaintCommand> {
    let mut cmds = Vec::with_capacity(2 + nodes.iter().map(|n| n.lines.len()).sum::<usize>());

    cmds.push(match background {
        ResolvedBackground::Image(img) => PaintCommand::Image { image: img.clone() },
        ResolvedBackground::Solid([r, g, b, a]) => PaintCommand::SolidRect {
            x: 0,
            y: 0,
            width: viewport.width,
            height: viewport.height,
            rgba: (*r, *g, *b, *a),
        },
    });

    cmds.push(PaintCommand::SolidRect {
        x: 0,
        y: 0,
        width: viewport.width,
        height: viewport.height,
        rgba: OVERLAY_COLOR,
    });

    for node in nodes {
        let line_h = node.line_height();
        for (i, line) in node.lines.iter().enumerate() {
            let line_w = line.chars().count() as u32 * GLYPH_SIZE * node.scale;
            let x = node.rect.x + (node.rect.width as i32 - line_w as i32) / 2;
            let y = node.rect.y + (i as u32 * line_h) as i32;
            cmds.push(PaintCommand::Text {
                x,
                y,
                text: line.clone(),
                scale: node.scale,
                rgba: TEXT_COLOR,
            });
        }
    }

    cmds
}
