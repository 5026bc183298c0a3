//! Waterfall Layout - cumulative attribution bars
//!
//! Lays out one explanation as a stack of arrows walking from the model
//! prediction (top) down to the baseline (bottom). Features are ranked by
//! |attribution|; when there are more features than the display cap, the
//! weakest ones are folded into a single "N other features" bar on row 0.
//!
//! The layout is pure data in model output units; `svg` maps it to pixels.

use serde::Serialize;

use super::types::{Direction, Explanation};
use super::ExplainError;

pub const POSITIVE_COLOUR: &str = "#19c558";
pub const NEGATIVE_COLOUR: &str = "#ff0051";

/// Average glyph advance as a share of the font size
const GLYPH_WIDTH_RATIO: f64 = 0.6;
/// Trailing bars left unconnected when no aggregate row follows
const UNCONNECTED_TAIL: usize = 4;

// ============================================================================
// NUMBER FORMATTING
// ============================================================================

/// Trim trailing zeros (and a bare trailing point), typographic minus
///
/// `format_value(-0.30, 2, true)` -> `"−0.3"`, `format_value(5.0, 2, true)` -> `"+5"`
pub fn format_value(value: f64, decimals: usize, signed: bool) -> String {
    let mut text = if signed {
        format!("{:+.*}", decimals, value)
    } else {
        format!("{:.*}", decimals, value)
    };

    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }

    match text.strip_prefix('-') {
        Some(rest) => format!("\u{2212}{}", rest),
        None => text,
    }
}

/// Feature value as shown in a row label: numbers to 3 decimals, text as-is
fn format_data(data: &str) -> String {
    match data.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => format_value(number, 3, false),
        _ => data.to_string(),
    }
}

// ============================================================================
// LAYOUT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Row 0 is the bottom row
    pub row: usize,
    pub start: f64,
    /// Signed width; the arrow points from `start` to `start + value`
    pub value: f64,
    /// Signed value label, e.g. `+1.23`
    pub label: String,
    /// Synthetic "N other features" bar
    pub aggregate: bool,
}

impl Bar {
    pub fn end(&self) -> f64 {
        self.start + self.value
    }

    pub fn direction(&self) -> Direction {
        Direction::of(self.value)
    }

    pub fn colour(&self) -> &'static str {
        match self.direction() {
            Direction::Up => POSITIVE_COLOUR,
            Direction::Down => NEGATIVE_COLOUR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowLabel {
    pub row: usize,
    /// `"<value> = "`, drawn in grey; empty for the aggregate row
    pub value: String,
    pub name: String,
}

impl RowLabel {
    pub fn text(&self) -> String {
        format!("{}{}", self.value, self.name)
    }
}

/// Dashed line joining a bar's start to the row below
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub x: f64,
    pub from_row: usize,
    pub to_row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPlacement {
    /// Centered in the bar, white
    Inside,
    /// Just past the arrow head, in the bar colour
    Outside,
}

impl LabelPlacement {
    /// Inside unless the estimated text width overflows the bar
    pub fn for_label(label: &str, bar_width_px: f64, font_size_px: f64) -> Self {
        let text_width = label.chars().count() as f64 * font_size_px * GLYPH_WIDTH_RATIO;
        if text_width > bar_width_px.abs() {
            LabelPlacement::Outside
        } else {
            LabelPlacement::Inside
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallLayout {
    pub base_value: f64,
    pub prediction: f64,
    pub num_rows: usize,
    /// Individual bars in rank order, then the aggregate bar if any
    pub bars: Vec<Bar>,
    pub rows: Vec<RowLabel>,
    pub connectors: Vec<Connector>,
}

// ============================================================================
// LAYOUT
// ============================================================================

impl WaterfallLayout {
    pub fn new(explanation: &Explanation, max_display: usize) -> Result<Self, ExplainError> {
        if max_display == 0 {
            return Err(ExplainError::ZeroCap);
        }

        let values = &explanation.values;
        let base_value = explanation.base_value;
        let prediction = explanation.prediction();
        let num_rows = max_display.min(values.len());
        let has_aggregate = num_rows < values.len();
        let num_individual = if has_aggregate { num_rows - 1 } else { num_rows };
        let order = explanation.order();

        let mut bars = Vec::with_capacity(num_rows);
        let mut rows = Vec::with_capacity(num_rows);
        let mut connectors = Vec::new();
        let mut cursor = prediction;

        for (rank, &index) in order.iter().take(num_individual).enumerate() {
            let value = values[index];
            let row = num_rows - 1 - rank;
            cursor -= value;

            bars.push(Bar {
                row,
                start: cursor,
                value,
                label: format_value(value, 2, true),
                aggregate: false,
            });
            // With every feature shown the last bars go without connectors
            if has_aggregate || rank + UNCONNECTED_TAIL < num_individual {
                connectors.push(Connector {
                    x: cursor,
                    from_row: row,
                    to_row: row - 1,
                });
            }
            rows.push(RowLabel {
                row,
                value: format!("{} = ", format_data(&explanation.data[index])),
                name: explanation.feature_names[index].clone(),
            });
        }

        if has_aggregate {
            let excluded = values.len() - num_individual;
            let value = -(base_value - cursor);
            bars.push(Bar {
                row: 0,
                start: base_value,
                value,
                label: format_value(value, 2, true),
                aggregate: true,
            });
            rows.push(RowLabel {
                row: 0,
                value: String::new(),
                name: format!("{} other features", excluded),
            });
        }

        Ok(Self {
            base_value,
            prediction,
            num_rows,
            bars,
            rows,
            connectors,
        })
    }

    pub fn aggregate(&self) -> Option<&Bar> {
        self.bars.iter().find(|b| b.aggregate)
    }

    /// Where the walk from the prediction ends; equals the baseline
    pub fn final_position(&self) -> f64 {
        match self.aggregate() {
            Some(bar) => bar.start,
            None => self.bars.last().map(|b| b.start).unwrap_or(self.prediction),
        }
    }

    /// Smallest and largest x touched by bars, baseline and prediction
    pub fn extent(&self) -> (f64, f64) {
        self.bars
            .iter()
            .flat_map(|b| [b.start, b.end()])
            .chain([self.base_value, self.prediction])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)))
    }

    pub fn positive(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter().filter(|b| b.direction() == Direction::Up)
    }

    pub fn negative(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter().filter(|b| b.direction() == Direction::Down)
    }
}
