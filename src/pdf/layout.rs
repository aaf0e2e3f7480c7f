use crate::fonts::{FaceKey, FontSet};
use crate::model::{Alignment, Run};
use crate::surface::TextStyle;

pub(super) struct WordChunk {
    pub(super) face: FaceKey,
    pub(super) text: String,
    pub(super) x_offset: f32, // x relative to line start
    pub(super) width: f32,
}

pub(super) struct TextLine {
    pub(super) chunks: Vec<WordChunk>,
    pub(super) total_width: f32,
}

impl TextLine {
    /// Left edge of the line inside a box of `width` starting at `x`.
    pub(super) fn start_x(&self, align: Alignment, x: f32, width: f32) -> f32 {
        match align {
            Alignment::Left => x,
            Alignment::Center => x + (width - self.total_width).max(0.0) / 2.0,
            Alignment::Right => x + (width - self.total_width).max(0.0),
        }
    }
}

fn finish_line(chunks: &mut Vec<WordChunk>) -> TextLine {
    let total_width = chunks.last().map(|c| c.x_offset + c.width).unwrap_or(0.0);
    TextLine {
        chunks: std::mem::take(chunks),
        total_width,
    }
}

/// Greedy word wrap of inline runs.
/// No space is inserted between runs unless the preceding text ended with whitespace or
/// the next run starts with it ("bold" + ", " → "bold,").
pub(super) fn build_lines(
    runs: &[Run],
    style: &TextStyle,
    fonts: &FontSet,
    max_width: f32,
) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<WordChunk> = Vec::new();
    let mut current_x = 0.0f32;
    let mut prev_ended_with_ws = false;
    let mut prev_space_w = 0.0f32;

    for run in runs {
        let key = FaceKey::select(style.typeface, style.bold || run.bold, style.italic || run.italic);
        let face = fonts.face(key);
        let space_w = face.text_width(" ", style.size);
        let starts_with_ws = run.text.starts_with(char::is_whitespace);

        for (i, word) in run.text.split_whitespace().enumerate() {
            let ww = face.text_width(word, style.size);
            let need_space =
                !current.is_empty() && (i > 0 || starts_with_ws || prev_ended_with_ws);
            // the space belongs to whichever run holds the whitespace
            let effective_space_w = if i > 0 || starts_with_ws {
                space_w
            } else {
                prev_space_w
            };
            let proposed_x = if need_space {
                current_x + effective_space_w
            } else {
                current_x
            };

            if !current.is_empty() && proposed_x + ww > max_width {
                lines.push(finish_line(&mut current));
                current_x = 0.0;
            } else {
                current_x = proposed_x;
            }

            current.push(WordChunk {
                face: key,
                text: word.to_string(),
                x_offset: current_x,
                width: ww,
            });
            current_x += ww;
        }

        prev_ended_with_ws = run.text.ends_with(char::is_whitespace);
        prev_space_w = space_w;
    }

    if !current.is_empty() {
        lines.push(finish_line(&mut current));
    }
    lines
}
