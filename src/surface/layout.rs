/// Score card layout: two centered text blocks over a full-bleed background

use crate::{CardContent, Viewport};

/// Glyph cell edge of the bitmap font, in pixels at scale 1
pub const GLYPH_SIZE: u32 = 8;

/// Player name renders at 24px
pub const NAME_SCALE: u32 = 3;
/// Score renders at 48px
pub const SCORE_SCALE: u32 = 6;
/// Gap between the name block and the score block
pub const NAME_MARGIN_BOTTOM: u32 = 10;
/// Horizontal inset applied before wrapping
pub const CARD_PADDING: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    PlayerName,
    Score,
}

/// One laid-out text block. `lines` are already wrapped and each is centered
/// within `rect` when painted.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub rect: Rect,
    pub lines: Vec<String>,
    pub role: TextRole,
    pub scale: u32,
}

impl LayoutNode {
    pub fn line_height(&self) -> u32 {
        GLYPH_SIZE * self.scale
    }
}

/// Wrap `text` to at most `chars_per_line` characters per line, breaking on
/// whitespace first and splitting words that are longer than a whole line.
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        // hard-split words that cannot fit on any line
        while word.len() > chars_per_line {
            if cur_len > 0 {
                lines.push(std::mem::take(&mut cur));
                cur_len = 0;
            }
            let rest = word.split_off(chars_per_line);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        if cur_len > 0 && cur_len + 1 + word.len() > chars_per_line {
            lines.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        if cur_len > 0 {
            cur.push(' ');
            cur_len += 1;
        }
        cur_len += word.len();
        cur.extend(word);
    }
    if cur_len > 0 {
        lines.push(cur);
    }
    lines
}

fn text_block(text: &str, role: TextRole, scale: u32, viewport: Viewport) -> LayoutNode {
    let content_w = viewport.width.saturating_sub(CARD_PADDING * 2);
    let chars_per_line = (content_w / (GLYPH_SIZE * scale)).max(1) as usize;
    let lines = wrap_text(text, chars_per_line);
    let height = lines.len() as u32 * GLYPH_SIZE * scale;
    LayoutNode {
        rect: Rect {
            x: CARD_PADDING as i32,
            y: 0,
            width: content_w,
            height,
        },
        lines,
        role,
        scale,
    }
}

/// Lay out the card text. The name sits above the score; the pair is
/// centered vertically as one block. Empty strings produce no node.
pub fn layout_card(content: &CardContent, viewport: Viewport) -> Vec<LayoutNode> {
    let mut nodes: Vec<LayoutNode> = [
        (content.player_name.as_str(), TextRole::PlayerName, NAME_SCALE),
        (content.score.as_str(), TextRole::Score, SCORE_SCALE),
    ]
    .into_iter()
    .filter(|(text, _, _)| !text.trim().is_empty())
    .map(|(text, role, scale)| text_block(text, role, scale, viewport))
    .collect();

    let gaps = nodes.len().saturating_sub(1) as u32 * NAME_MARGIN_BOTTOM;
    let total_h: u32 = nodes.iter().map(|n| n.rect.height).sum::<u32>() + gaps;
    let mut y = (viewport.height as i32 - total_h as i32) / 2;
    for node in nodes.iter_mut() {
        node.rect.y = y;
        y += (node.rect.height + NAME_MARGIN_BOTTOM) as i32;
    }
    nodes
}
