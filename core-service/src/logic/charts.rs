//! Charts - Vega-Lite specs for the dashboard analytics
//!
//! Each function returns a complete Vega-Lite v5 document with its data
//! inlined, ready for `vegaEmbed`.

use serde_json::{json, Value};

use crate::logic::dataset::analytics::QUINTILE_COLUMN;
use crate::logic::dataset::{CrossValidationRow, PriceImpact};
use crate::logic::explain::NEGATIVE_COLOUR;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Categorical fields of the cluster explorer, drawn under the scatter
const BREAKDOWN_FIELDS: &[&str] = &["profession", "rarity", "mainClass", "generation", "summons", "buyHour"];

/// Histogram of predicted prices with a red rule at the average price
pub fn price_distribution(rows: &[CrossValidationRow], average_price: f64, width: u32) -> Value {
    let values: Vec<Value> = rows
        .iter()
        .map(|r| json!({ "predictedPrice": r.predicted_price }))
        .collect();

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "width": width,
        "layer": [
            {
                "data": { "values": values },
                "mark": "bar",
                "encoding": {
                    "x": {
                        "field": "predictedPrice",
                        "bin": { "maxbins": 50 },
                        "title": "Predicted price (JEWEL)"
                    },
                    "y": { "aggregate": "count", "title": "Heroes" }
                }
            },
            {
                "data": { "values": [{ "averagePrice": average_price }] },
                "mark": { "type": "rule", "color": NEGATIVE_COLOUR, "size": 2 },
                "encoding": {
                    "x": { "field": "averagePrice", "type": "quantitative" }
                }
            }
        ]
    })
}

/// Features ranked by mean absolute price impact
pub fn price_explanation(impacts: &[PriceImpact], width: u32) -> Value {
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "width": width,
        "data": { "values": impacts },
        "mark": "bar",
        "encoding": {
            "x": { "field": "impact", "type": "quantitative", "title": "Mean impact (JEWEL)" },
            "y": { "field": "feature", "type": "nominal", "sort": "-x", "title": null }
        }
    })
}

/// t-SNE scatter with an interval brush filtering per-field count bars
pub fn advanced_analytics(rows: &[CrossValidationRow], width: u32, height: u32) -> Value {
    let count = json!({ "aggregate": "count", "field": QUINTILE_COLUMN, "type": "quantitative" });
    let quintile = json!({ "field": QUINTILE_COLUMN, "type": "ordinal" });

    let scatter = json!({
        "params": [{ "name": "brush", "select": { "type": "interval", "resolve": "global" } }],
        "mark": "point",
        "encoding": {
            "x": { "field": "TSNE-1", "type": "quantitative" },
            "y": { "field": "TSNE-2", "type": "quantitative" },
            "color": {
                "field": QUINTILE_COLUMN,
                "type": "ordinal",
                "scale": { "scheme": "redyellowgreen" }
            }
        },
        "width": width,
        "height": height
    });

    let bar = |y: Value| {
        json!({
            "mark": "bar",
            "transform": [{ "filter": { "param": "brush" } }],
            "encoding": { "y": y, "x": count.clone(), "color": quintile.clone() },
            "width": width,
            "height": height
        })
    };

    let mut charts = vec![scatter, bar(quintile.clone())];
    charts.extend(
        BREAKDOWN_FIELDS
            .iter()
            .map(|field| bar(json!({ "field": field, "type": "nominal" }))),
    );

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "data": { "values": rows },
        "vconcat": charts
    })
}
