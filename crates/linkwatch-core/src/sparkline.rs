//! Terminal chart glyphs.
//!
//! Every renderer takes already-bucketed values (one per column, `None` for
//! an empty bucket) and returns rows of [`Cell`]s, top row first. Colors are
//! semantic [`Tone`]s; the terminal front-end maps them to real colors.
//!
//! Vertical resolution comes from eighth-block glyphs (8 levels per text row)
//! or from braille dots (4 dot-rows per text row, 2 columns per glyph).

use crate::palette::Tone;

/// Blank followed by the eight eighth-block fills.
pub const BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Fully filled block.
pub const FULL: char = '█';

const LEVELS_PER_ROW: usize = 8;
const DOTS_PER_ROW: usize = 4;
const BRAILLE_BASE: u32 = 0x2800;

/// Braille bits of the left column, top dot first.
const LEFT_DOT_BITS: [u8; 4] = [0, 1, 2, 6];
/// Braille bits of the right column, top dot first.
const RIGHT_DOT_BITS: [u8; 4] = [3, 4, 5, 7];

/// One terminal cell of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub symbol: char,
    pub tone: Tone,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        symbol: ' ',
        tone: Tone::Dim,
    };

    pub fn new(symbol: char, tone: Tone) -> Self {
        Self { symbol, tone }
    }
}

/// Value range a chart maps onto its levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

impl Scale {
    pub const fn fixed(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range of the present values, `None` if there are none.
    pub fn from_data(values: &[Option<f64>]) -> Option<Self> {
        let mut present = values.iter().flatten().copied().filter(|v| v.is_finite());
        let first = present.next()?;
        let (min, max) = present.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self { min, max })
    }

    pub fn quantize(&self, value: f64, levels: usize) -> usize {
        quantize(value, self.min, self.max, levels)
    }
}

/// Map `value` onto `0..levels`.
///
/// The value is clamped to `[min, max]` and scaled linearly, truncating, so
/// `min` maps to 0 and `max` to `levels - 1`. A degenerate range maps every
/// value to the middle level `(levels - 1) / 2`.
pub fn quantize(value: f64, min: f64, max: f64, levels: usize) -> usize {
    if levels == 0 {
        return 0;
    }
    let top = levels - 1;
    if !(max > min) || !value.is_finite() {
        return top / 2;
    }
    let v = value.clamp(min, max);
    let level = ((v - min) / (max - min) * top as f64) as usize;
    level.min(top)
}

/// One text row, one glyph per value: blank plus eight fill heights.
pub fn single_row(
    values: &[Option<f64>],
    scale: Scale,
    tone: impl Fn(f64) -> Tone,
) -> Vec<Cell> {
    values
        .iter()
        .map(|value| match value {
            Some(v) => Cell::new(BLOCKS[scale.quantize(*v, BLOCKS.len())], tone(*v)),
            None => Cell::BLANK,
        })
        .collect()
}

/// Filled bar chart `rows` text rows tall with `rows * 8` levels.
///
/// A row is blank when the level is below it, full when the level reaches
/// its top, and a partial block otherwise. Missing values are blank in every
/// row.
pub fn block_chart(
    values: &[Option<f64>],
    rows: usize,
    scale: Scale,
    tone: impl Fn(f64) -> Tone,
) -> Vec<Vec<Cell>> {
    let levels = rows * LEVELS_PER_ROW;
    let mut out = vec![Vec::with_capacity(values.len()); rows];
    for value in values {
        let Some(v) = value else {
            out.iter_mut().for_each(|row| row.push(Cell::BLANK));
            continue;
        };
        let level = scale.quantize(*v, levels);
        let tone = tone(*v);
        for (row_idx, row) in out.iter_mut().enumerate() {
            row.push(match row_glyph(level as isize, rows - 1 - row_idx) {
                Some(symbol) => Cell::new(symbol, tone),
                None => Cell::BLANK,
            });
        }
    }
    out
}

/// Two series on one scale, `rows` text rows tall.
///
/// `base` is drawn filled from the bottom in [`Tone::Base`] and owns every
/// row it fills completely. In the row where it ends, its partial glyph
/// shows only when `top` does not reach higher; otherwise `top` takes the
/// row in [`Tone::Top`]. Above the base only `top` is drawn. The shorter
/// series is padded with missing values on the left.
pub fn overlay_chart(
    top: &[Option<f64>],
    base: &[Option<f64>],
    rows: usize,
    scale: Scale,
) -> Vec<Vec<Cell>> {
    let width = top.len().max(base.len());
    let top = pad_left(top, width);
    let base = pad_left(base, width);
    let levels = rows * LEVELS_PER_ROW;
    let level_of = |v: Option<f64>| v.map_or(-1, |v| scale.quantize(v, levels) as isize);

    let mut out = vec![Vec::with_capacity(width); rows];
    for (t, b) in top.iter().zip(&base) {
        let (nt, nb) = (level_of(*t), level_of(*b));
        for (row_idx, row) in out.iter_mut().enumerate() {
            let band = rows - 1 - row_idx;
            let cell = match (row_glyph(nb, band), row_glyph(nt, band)) {
                (Some(FULL), _) => Cell::new(FULL, Tone::Base),
                (Some(symbol), _) if nt <= nb => Cell::new(symbol, Tone::Base),
                (_, Some(symbol)) => Cell::new(symbol, Tone::Top),
                (Some(symbol), None) => Cell::new(symbol, Tone::Base),
                (None, None) => Cell::BLANK,
            };
            row.push(cell);
        }
    }
    out
}

/// Line chart in braille dots, two values per glyph, `rows` text rows tall.
///
/// The chart scales to the observed range of `values`. Each value lights
/// the single dot at its quantized height. When both columns of a glyph are
/// present and differ, the right column also lights every dot strictly
/// between the two heights so the line stays connected. A missing value
/// lights nothing; an odd trailing value gets a missing partner.
pub fn dot_line_chart(
    values: &[Option<f64>],
    rows: usize,
    tone: impl Fn(f64) -> Tone,
) -> Vec<Vec<Cell>> {
    let glyphs = values.len().div_ceil(2);
    let mut out = vec![Vec::with_capacity(glyphs); rows];
    let Some(scale) = Scale::from_data(values) else {
        out.iter_mut().for_each(|row| row.resize(glyphs, Cell::BLANK));
        return out;
    };
    let dot_levels = rows * DOTS_PER_ROW;

    for pair in values.chunks(2) {
        let left = pair[0];
        let right = pair.get(1).copied().flatten();
        let nl = left.map(|v| scale.quantize(v, dot_levels));
        let nr = right.map(|v| scale.quantize(v, dot_levels));
        let bridge = match (nl, nr) {
            (Some(a), Some(b)) if a != b => Some((a.min(b), a.max(b))),
            _ => None,
        };
        let tone = mean(left, right).map(&tone).unwrap_or(Tone::Dim);

        for (line_idx, row) in out.iter_mut().enumerate() {
            let base_dot = (rows - 1 - line_idx) * DOTS_PER_ROW;
            let mut bits = 0u32;
            for dot in 0..DOTS_PER_ROW {
                // Dot 0 is the top of the glyph.
                let height = base_dot + DOTS_PER_ROW - 1 - dot;
                if nl == Some(height) {
                    bits |= 1 << LEFT_DOT_BITS[dot];
                }
                let bridged = bridge.is_some_and(|(lo, hi)| lo < height && height < hi);
                if nr == Some(height) || bridged {
                    bits |= 1 << RIGHT_DOT_BITS[dot];
                }
            }
            row.push(if bits == 0 {
                Cell::BLANK
            } else {
                // Every value in BRAILLE_BASE..=BRAILLE_BASE+0xFF is a valid char.
                let symbol = char::from_u32(BRAILLE_BASE + bits).unwrap_or(' ');
                Cell::new(symbol, tone)
            });
        }
    }
    out
}

/// Glyph for `level` in the text row whose levels start at `band * 8`.
/// `None` when the level is below the row.
fn row_glyph(level: isize, band: usize) -> Option<char> {
    let row_min = (band * LEVELS_PER_ROW) as isize;
    let row_max = row_min + LEVELS_PER_ROW as isize - 1;
    if level < row_min {
        None
    } else if level >= row_max {
        Some(FULL)
    } else {
        Some(BLOCKS[(level - row_min + 1) as usize])
    }
}

fn pad_left(values: &[Option<f64>], width: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; width.saturating_sub(values.len())];
    out.extend_from_slice(values);
    out
}

fn mean(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

/// Render a row of cells to a plain string, dropping tones.
pub fn to_text(row: &[Cell]) -> String {
    row.iter().map(|c| c.symbol).collect()
}
