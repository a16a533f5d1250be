//! Text forms shared by the scalar codecs.

use std::fmt::{Display, LowerExp};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

pub(crate) const LOCAL_DATE: &str = "%Y-%m-%d";
pub(crate) const LOCAL_TIME: &str = "%H:%M:%S";
pub(crate) const LOCAL_DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// Shortest round-trip form, switching to `de±XX` outside `[1e-4, 1e21)`.
pub(crate) fn float_text<T>(v: T) -> String
where
    T: Copy + Display + LowerExp + Into<f64>,
{
    let wide: f64 = v.into();
    if wide.is_nan() {
        return "NaN".to_owned();
    }
    if wide.is_infinite() {
        return if wide > 0.0 { "+Inf" } else { "-Inf" }.to_owned();
    }
    let magnitude = wide.abs();
    if magnitude != 0.0 && !(1e-4..1e21).contains(&magnitude) {
        let sci = format!("{v:e}");
        if let Some((mantissa, exp)) = sci.split_once('e') {
            let (sign, digits) = exp.strip_prefix('-').map_or(("+", exp), |d| ("-", d));
            return format!("{mantissa}e{sign}{digits:0>2}");
        }
        return sci;
    }
    v.to_string()
}

/// JSON number for a float; non-finite values fall back to their text.
pub(crate) fn float_json<T>(v: T) -> serde_json::Value
where
    T: Copy + Display + LowerExp + Into<f64>,
{
    // Parse the shortest text so an f32 keeps its own digits instead of the
    // widened binary expansion.
    let wide = v.to_string().parse::<f64>().unwrap_or_else(|_| v.into());
    serde_json::Number::from_f64(wide)
        .map_or_else(|| serde_json::Value::String(float_text(v)), serde_json::Value::Number)
}

pub(crate) fn local_date(v: &NaiveDate) -> String {
    v.format(LOCAL_DATE).to_string()
}

pub(crate) fn local_time(v: &NaiveTime) -> String {
    v.format(LOCAL_TIME).to_string()
}

pub(crate) fn local_date_time(v: &NaiveDateTime) -> String {
    v.format(LOCAL_DATE_TIME).to_string()
}

pub(crate) fn offset_date_time(v: &DateTime<FixedOffset>) -> String {
    v.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn java_date(v: &DateTime<Utc>) -> String {
    v.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Joins lines after trimming each one, turning pretty printed JSON into one line.
pub(crate) fn collapse_json(raw: &str) -> String {
    raw.lines().map(str::trim).collect()
}
