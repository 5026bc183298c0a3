//! SVG Renderer - draws a waterfall layout
//!
//! Hand-written SVG, one element per line.

use super::text::escape_markup;
use super::waterfall::{format_value, Bar, LabelPlacement, WaterfallLayout};

const GRID_COLOUR: &str = "#cccccc";
const GUIDE_COLOUR: &str = "#bbbbbb";
const MUTED_COLOUR: &str = "#999999";
const TEXT_COLOUR: &str = "#333333";

/// Share of the row taken by an arrow
const BAR_HEIGHT: f64 = 0.8;
/// Padding added on both sides of the data range
const RANGE_PADDING: f64 = 0.1;
/// Gap between an arrow head and an outside label
const LABEL_GAP: f64 = 5.0;
/// Space right of the plot area
const RIGHT_MARGIN: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct SvgOptions {
    pub width: u32,
    pub row_height: u32,
    pub font_size: u32,
    /// Left column reserved for the row labels
    pub label_width: u32,
    pub title: String,
    /// Base64 PNG drawn above the prediction marker
    pub logo_png: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 800,
            row_height: 40,
            font_size: 12,
            label_width: 220,
            title: "Price variation by variables".to_string(),
            logo_png: None,
        }
    }
}

/// Maps model output and row indices to pixels
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    row_height: f64,
    num_rows: usize,
    lo: f64,
    hi: f64,
}

impl Frame {
    fn x(&self, value: f64) -> f64 {
        self.left + (value - self.lo) / (self.hi - self.lo) * (self.right - self.left)
    }

    /// Vertical center of `row` (row 0 at the bottom)
    fn y(&self, row: usize) -> f64 {
        self.top + (self.num_rows - 1 - row) as f64 * self.row_height + self.row_height / 2.0
    }

    fn bottom(&self) -> f64 {
        self.top + self.num_rows as f64 * self.row_height
    }
}

/// Arrow polygon from `x0` to `x1` centred on `y`
fn arrow_points(x0: f64, x1: f64, y: f64, height: f64) -> String {
    let half = height / 2.0;
    let length = (x1 - x0).abs();
    let head = length.min(height / 2.0);
    let sign = if x1 >= x0 { 1.0 } else { -1.0 };
    let neck = x1 - sign * head;

    format!(
        "{:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
        x0,
        y - half,
        neck,
        y - half,
        x1,
        y,
        neck,
        y + half,
        x0,
        y + half
    )
}

fn draw_bar(out: &mut String, frame: &Frame, bar: &Bar, font_size: f64) {
    let x0 = frame.x(bar.start);
    let x1 = frame.x(bar.end());
    let y = frame.y(bar.row);
    let colour = bar.colour();

    push_line!(
        out,
        r#"<polygon class="bar" points="{}" fill="{}"/>"#,
        arrow_points(x0, x1, y, frame.row_height * BAR_HEIGHT),
        colour
    );

    let label = escape_markup(&bar.label);
    match LabelPlacement::for_label(&bar.label, x1 - x0, font_size) {
        LabelPlacement::Inside => {
            push_line!(
                out,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" fill="white">{}</text>"#,
                (x0 + x1) / 2.0,
                y,
                label
            );
        }
        LabelPlacement::Outside => {
            let (x, anchor) = if bar.value >= 0.0 {
                (x1 + LABEL_GAP, "start")
            } else {
                (x1 - LABEL_GAP, "end")
            };
            push_line!(
                out,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="{}" dominant-baseline="central" fill="{}">{}</text>"#,
                x, y, anchor, colour, label
            );
        }
    }
}

/// Render `layout` as a standalone SVG document
pub fn render_svg(layout: &WaterfallLayout, options: &SvgOptions) -> String {
    let row_height = options.row_height as f64;
    let font_size = options.font_size as f64;
    let top = 70.0;
    let height = top + layout.num_rows.max(1) as f64 * row_height + 50.0;

    let (mut lo, mut hi) = layout.extent();
    if hi - lo < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * RANGE_PADDING;

    // Narrow documents shrink the label column and margin so the plot keeps
    // a positive width
    let width = options.width as f64;
    let frame = Frame {
        left: (options.label_width as f64).min(width / 3.0),
        right: width - RIGHT_MARGIN.min(width / 10.0),
        top,
        row_height,
        num_rows: layout.num_rows.max(1),
        lo: lo - pad,
        hi: hi + pad,
    };

    let mut out = String::new();
    push_line!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h:.0}" viewBox="0 0 {w} {h:.0}" font-family="sans-serif" font-size="{f}">"#,
        w = options.width,
        h = height,
        f = options.font_size
    );
    push_line!(
        out,
        r#"<text x="{:.2}" y="20" text-anchor="middle" font-size="{}" fill="{}">{}</text>"#,
        options.width as f64 / 2.0,
        options.font_size + 2,
        TEXT_COLOUR,
        escape_markup(&options.title)
    );

    // Row grid and labels
    for label in &layout.rows {
        let y = frame.y(label.row);
        push_line!(
            out,
            r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{}" stroke-width="0.5" stroke-dasharray="1,5"/>"#,
            frame.left,
            frame.right,
            GRID_COLOUR,
            y = y
        );
        push_line!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end" dominant-baseline="central"><tspan fill="{}">{}</tspan><tspan fill="{}">{}</tspan></text>"#,
            frame.left - 8.0,
            y,
            MUTED_COLOUR,
            escape_markup(&label.value),
            TEXT_COLOUR,
            escape_markup(&label.name)
        );
    }

    for connector in &layout.connectors {
        let x = frame.x(connector.x);
        let half = frame.row_height * 0.4;
        push_line!(
            out,
            r#"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="{}" stroke-width="0.5" stroke-dasharray="4,2"/>"#,
            frame.y(connector.from_row) - half,
            frame.y(connector.to_row) + half,
            GUIDE_COLOUR,
            x = x
        );
    }

    // Baseline marker spans the bottom row, prediction marker the full height
    let base_x = frame.x(layout.base_value);
    let fx = frame.x(layout.prediction);
    push_line!(
        out,
        r#"<line class="baseline" x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="{}" stroke-width="0.5" stroke-dasharray="4,2"/>"#,
        frame.bottom() - frame.row_height,
        frame.bottom(),
        GUIDE_COLOUR,
        x = base_x
    );
    push_line!(
        out,
        r#"<line class="prediction" x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="{}" stroke-width="0.5" stroke-dasharray="4,2"/>"#,
        frame.top,
        frame.bottom(),
        GUIDE_COLOUR,
        x = fx
    );

    for bar in &layout.bars {
        draw_bar(&mut out, &frame, bar, font_size);
    }

    push_line!(
        out,
        r#"<text x="{:.2}" y="{:.2}" fill="{}">average price = {} JEWEL</text>"#,
        base_x,
        frame.bottom() + 24.0,
        TEXT_COLOUR,
        escape_markup(&format_value(layout.base_value, 3, false))
    );
    push_line!(
        out,
        r#"<text x="{:.2}" y="{:.2}" fill="{}">price = {:.3} JEWEL</text>"#,
        fx,
        frame.top - 10.0,
        TEXT_COLOUR,
        layout.prediction
    );

    if let Some(logo) = &options.logo_png {
        push_line!(
            out,
            r#"<image x="{:.2}" y="{:.2}" width="24" height="24" href="data:image/png;base64,{}"/>"#,
            fx - 12.0,
            frame.top - 60.0,
            logo
        );
    }

    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::explain::types::Explanation;
    use crate::logic::explain::waterfall::{NEGATIVE_COLOUR, POSITIVE_COLOUR};

    fn layout(cap: usize) -> WaterfallLayout {
        let exp = Explanation::new(
            10.0,
            vec![5.0, -2.0, 1.0, -0.3],
            vec!["rarity".into(), "summons".into(), "mainClass".into(), "buyHour".into()],
            vec!["2".into(), "4".into(), "Wizard".into(), "13".into()],
        )
        .unwrap();
        WaterfallLayout::new(&exp, cap).unwrap()
    }

    #[test]
    fn test_renders_every_bar() {
        let svg = render_svg(&layout(4), &SvgOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="bar""#).count(), 4);
        assert!(svg.matches(POSITIVE_COLOUR).count() >= 2);
        assert!(svg.contains(NEGATIVE_COLOUR));
        assert!(svg.contains("price = 13.700 JEWEL"));
        assert!(svg.contains("average price = 10 JEWEL"));
        assert!(svg.contains("Wizard = </tspan>"));
    }

    #[test]
    fn test_aggregate_row_label() {
        let svg = render_svg(&layout(3), &SvgOptions::default());
        assert!(svg.contains("2 other features"));
        assert!(svg.contains(">+0.7<"));
    }

    #[test]
    fn test_small_bar_label_goes_outside() {
        // -0.3 on a ~7 unit range is a few pixels wide
        let svg = render_svg(&layout(4), &SvgOptions::default());
        let line = svg.lines().find(|l| l.contains("\u{2212}0.3")).unwrap();
        assert!(line.contains(r#"text-anchor="end""#));
        assert!(line.contains(NEGATIVE_COLOUR));
    }

    #[test]
    fn test_logo_embedded() {
        let options = SvgOptions {
            logo_png: Some("aWNvbg==".to_string()),
            ..SvgOptions::default()
        };
        let svg = render_svg(&layout(4), &options);
        assert!(svg.contains("data:image/png;base64,aWNvbg=="));
    }

    fn bar_xs(svg: &str) -> Vec<f64> {
        let line = svg.lines().find(|l| l.contains(r#"class="bar""#)).unwrap();
        let points = line.split(r#"points=""#).nth(1).unwrap().split('"').next().unwrap();
        points
            .split(' ')
            .map(|p| p.split(',').next().unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_narrow_width_keeps_axis_direction() {
        let exp = Explanation::new(10.0, vec![5.0], vec!["rarity".into()], vec!["2".into()]).unwrap();
        let layout = WaterfallLayout::new(&exp, 10).unwrap();
        let options = SvgOptions {
            width: 100,
            ..SvgOptions::default()
        };
        let xs = bar_xs(&render_svg(&layout, &options));

        // Tail on the left, head on the right, all inside the view box
        assert!(xs[0] < xs[2], "{:?}", xs);
        assert!(xs.iter().all(|x| (0.0..=100.0).contains(x)), "{:?}", xs);
    }

    #[test]
    fn test_arrow_points_head_direction() {
        let right = arrow_points(0.0, 100.0, 50.0, 20.0);
        assert!(right.starts_with("0.00,40.00 90.00,40.00 100.00,50.00"));
        let left = arrow_points(100.0, 0.0, 50.0, 20.0);
        assert!(left.starts_with("100.00,40.00 10.00,40.00 0.00,50.00"));
    }
}
