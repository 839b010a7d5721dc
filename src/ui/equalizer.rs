use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::{Block, Widget},
};

/// Partial block glyphs, indexed by eighths of a cell.
const BAR_CHARS: &[char] = &[' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Vertical bars, one per band, each level in `[0, 1]`.
pub struct EqualizerWidget<'a> {
    levels: &'a [f32],
    block: Option<Block<'a>>,
}

impl<'a> EqualizerWidget<'a> {
    pub fn new(levels: &'a [f32]) -> Self {
        Self {
            levels,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Width of each bar and the gap after it, so `bands` bars fit in `width` cells.
pub(crate) fn bar_layout(width: u16, bands: usize) -> (u16, u16) {
    if bands == 0 {
        return (0, 0);
    }
    let per_band = (width as usize / bands).max(1) as u16;
    if per_band >= 3 {
        (per_band - 1, 1)
    } else {
        (per_band, 0)
    }
}

/// Eighths of a cell filled for `level` in a column `rows` high.
pub(crate) fn bar_eighths(level: f32, rows: u16) -> usize {
    (level.clamp(0.0, 1.0) * (rows as usize * 8) as f32).round() as usize
}

impl Widget for EqualizerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 || self.levels.is_empty() {
            return;
        }

        let rows = inner.height;
        let (bar_w, gap) = bar_layout(inner.width, self.levels.len());
        let used = (bar_w + gap) as usize * self.levels.len();
        let left = inner.x + (inner.width as usize).saturating_sub(used) as u16 / 2;

        for (band, &level) in self.levels.iter().enumerate() {
            let x0 = left + band as u16 * (bar_w + gap);
            if x0 >= inner.right() {
                break;
            }
            let eighths = bar_eighths(level, rows);
            let full_rows = eighths / 8;
            let remainder = eighths % 8;

            // Draw from bottom up: green, then yellow, red at the top.
            for row in 0..rows as usize {
                let y = inner.y + rows - 1 - row as u16;
                let ch = if row < full_rows {
                    '█'
                } else if row == full_rows && remainder > 0 {
                    BAR_CHARS[remainder]
                } else {
                    ' '
                };
                let frac = row as f32 / rows as f32;
                let color = if frac < 0.5 {
                    Color::Green
                } else if frac < 0.8 {
                    Color::Yellow
                } else {
                    Color::Red
                };
                for x in x0..(x0 + bar_w).min(inner.right()) {
                    buf[(x, y)].set_char(ch).set_fg(color);
                }
            }
        }
    }
}
