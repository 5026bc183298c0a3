//! Date features: sale timestamp → weekday + hour

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};

use super::{PipelineError, Transform};
use crate::logic::features::{FeatureFrame, FeatureValue};

pub const TIMESTAMP_COLUMN: &str = "timeStamp";
pub const WEEKDAY_COLUMN: &str = "buyWeekDay";
pub const HOUR_COLUMN: &str = "buyHour";

const TEXT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse the timestamp spellings found in the tavern exports
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, PipelineError> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in TEXT_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(PipelineError::InvalidTimestamp(text.to_string()))
}

fn to_timestamp(value: &FeatureValue) -> Result<DateTime<Utc>, PipelineError> {
    match value {
        FeatureValue::Timestamp(ts) => Ok(*ts),
        FeatureValue::Text(s) => parse_timestamp(s),
        // Unix seconds
        FeatureValue::Number(secs) => Utc
            .timestamp_opt(*secs as i64, 0)
            .single()
            .ok_or_else(|| PipelineError::InvalidTimestamp(secs.to_string())),
        other => Err(PipelineError::InvalidTimestamp(other.display())),
    }
}

/// Stateless; `fit` is a no-op
#[derive(Debug, Default, Clone)]
pub struct DateFeaturesExtractor;

impl DateFeaturesExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for DateFeaturesExtractor {
    fn name(&self) -> &'static str {
        "date_features"
    }

    fn fit(&mut self, _frame: &FeatureFrame) -> Result<(), PipelineError> {
        Ok(())
    }

    fn transform(&self, mut frame: FeatureFrame) -> Result<FeatureFrame, PipelineError> {
        let stamps = frame
            .column(TIMESTAMP_COLUMN)?
            .map(to_timestamp)
            .collect::<Result<Vec<_>, _>>()?;

        let weekdays = stamps
            .iter()
            .map(|ts| FeatureValue::Number(ts.weekday().num_days_from_monday() as f64))
            .collect();
        let hours = stamps
            .iter()
            .map(|ts| FeatureValue::Number(ts.hour() as f64))
            .collect();

        frame.set_column(WEEKDAY_COLUMN, weekdays)?;
        frame.set_column(HOUR_COLUMN, hours)?;
        frame.drop_column(TIMESTAMP_COLUMN)?;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(value: FeatureValue) -> FeatureFrame {
        let mut frame = FeatureFrame::new(["rarity", TIMESTAMP_COLUMN]);
        frame.push_row(vec![1.0.into(), value]).unwrap();
        frame
    }

    #[test]
    fn test_weekday_and_hour() {
        // 2022-01-23 was a Sunday
        let out = DateFeaturesExtractor::new()
            .transform(frame_with("2022-01-23 21:40:11".into()))
            .unwrap();

        assert_eq!(out.columns(), &["rarity", WEEKDAY_COLUMN, HOUR_COLUMN]);
        assert_eq!(out.get(0, WEEKDAY_COLUMN), Some(&FeatureValue::Number(6.0)));
        assert_eq!(out.get(0, HOUR_COLUMN), Some(&FeatureValue::Number(21.0)));
    }

    #[test]
    fn test_accepts_timestamp_and_rfc3339() {
        let ts = parse_timestamp("2022-01-24T08:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 6);

        let out = DateFeaturesExtractor::new()
            .transform(frame_with(FeatureValue::Timestamp(ts)))
            .unwrap();
        assert_eq!(out.get(0, WEEKDAY_COLUMN), Some(&FeatureValue::Number(0.0)));
    }

    #[test]
    fn test_unix_seconds() {
        // 2022-01-21 13:17:04 UTC, a Friday
        let out = DateFeaturesExtractor::new()
            .transform(frame_with(1_642_771_024.0.into()))
            .unwrap();
        assert_eq!(out.get(0, WEEKDAY_COLUMN), Some(&FeatureValue::Number(4.0)));
        assert_eq!(out.get(0, HOUR_COLUMN), Some(&FeatureValue::Number(13.0)));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = DateFeaturesExtractor::new()
            .transform(frame_with("yesterday".into()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_missing_column() {
        let frame = FeatureFrame::new(["rarity"]);
        let err = DateFeaturesExtractor::new().transform(frame).unwrap_err();
        assert!(matches!(err, PipelineError::Frame(_)));
    }
}
