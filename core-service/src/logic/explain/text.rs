//! Text explanation - HTML summary of one prediction

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::types::{Direction, Explanation};
use super::waterfall::{format_value, NEGATIVE_COLOUR, POSITIVE_COLOUR};

/// Escape text for HTML and SVG content and attribute values
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Base64 payload of a PNG, for `data:` URIs
pub fn encode_png(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

fn icon(jewel_png: Option<&str>) -> String {
    match jewel_png {
        Some(b64) => format!(
            r#" <img src="data:image/png;base64,{}" width="20" height="20" style="vertical-align:middle" alt="JEWEL"/>"#,
            b64
        ),
        None => " JEWEL".to_string(),
    }
}

fn span(class: &str, colour: &str, text: &str) -> String {
    format!(
        r#"<span class="{}" style="color:{}">{}</span>"#,
        class,
        colour,
        escape_markup(text)
    )
}

/// HTML fragment listing the `max_items` strongest price drivers
///
/// `jewel_png` is the base64 JEWEL icon; without it amounts read "… JEWEL".
pub fn shap_to_text(
    explanation: &Explanation,
    average_price: f64,
    jewel_png: Option<&str>,
    max_items: usize,
) -> String {
    let jewel = icon(jewel_png);
    let prediction = explanation.prediction();
    let mut out = String::new();

    push_line!(
        out,
        r#"<p>This hero is worth <span class="white">{:.2}</span>{} while the average hero is worth {:.2}{}.</p>"#,
        prediction, jewel, average_price, jewel
    );

    let contributions = explanation.contributions();
    out.push_str("<ul>\n");
    for c in contributions.iter().take(max_items) {
        let (class, colour, verb) = match c.direction {
            Direction::Up => ("green", POSITIVE_COLOUR, "raises"),
            Direction::Down => ("red", NEGATIVE_COLOUR, "lowers"),
        };
        push_line!(
            out,
            "<li>{} {} the price by {}{}</li>",
            span(class, colour, &format!("{} = {}", c.name, c.value)),
            verb,
            span(class, colour, &format_value(c.attribution, 2, true)),
            jewel
        );
    }

    let rest = &contributions[max_items.min(contributions.len())..];
    if !rest.is_empty() {
        let sum: f64 = rest.iter().map(|c| c.attribution).sum();
        let (class, colour) = match Direction::of(sum) {
            Direction::Up => ("green", POSITIVE_COLOUR),
            Direction::Down => ("red", NEGATIVE_COLOUR),
        };
        push_line!(
            out,
            "<li>{} other features move the price by {}{}</li>",
            rest.len(),
            span(class, colour, &format_value(sum, 2, true)),
            jewel
        );
    }
    out.push_str("</ul>\n");
    out
}
