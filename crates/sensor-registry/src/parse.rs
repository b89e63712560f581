use crate::{Result, SensorError};
use regex::Regex;
use std::sync::OnceLock;

fn crc_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"crc=.* (YES|NO)$").expect("Invalid regex pattern - this is a bug"))
}

fn temp_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"t=(-?\d+)$").expect("Invalid regex pattern - this is a bug"))
}

/// Parse the contents of a DS18B20 `w1_slave` file.
///
/// Returns `(crc_ok, temperature_celsius)`. The raw value is in thousandths
/// of a degree, so `t=-500` is -0.5 °C.
///
/// Line 1 normally ends with `crc=<hex> YES|NO`; when that pattern is absent
/// the line is treated as crc-ok only if it literally ends with `YES`. Line 2
/// normally ends with `t=<integer>`; when the field is not at line end, the
/// first `t=` occurrence anywhere in the line is used and the integer prefix
/// of its suffix is taken. These fallbacks are load-bearing: some driver
/// revisions append status text after the temperature field.
pub fn parse_w1_slave(content: &str) -> Result<(bool, f64)> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(SensorError::Parse(
            "unexpected w1_slave content; less than 2 lines".to_string(),
        ));
    }

    let crc_ok = match crc_pattern().captures(lines[0]) {
        Some(caps) => &caps[1] == "YES",
        // Fallback: anything not ending in YES counts as a CRC failure,
        // not a parse error.
        None => lines[0].ends_with("YES"),
    };

    if let Some(caps) = temp_pattern().captures(lines[1]) {
        let raw = parse_millidegrees(&caps[1])?;
        return Ok((crc_ok, raw as f64 / 1000.0));
    }

    // Sometimes the field is not at line end: take the first `t=` anywhere.
    if let Some(idx) = lines[1].find("t=") {
        let suffix = &lines[1][idx + 2..];
        let raw = parse_millidegrees(leading_integer(suffix))
            .map_err(|_| SensorError::Parse(format!("invalid temperature value: {suffix}")))?;
        return Ok((crc_ok, raw as f64 / 1000.0));
    }

    Err(SensorError::Parse(
        "temperature value not found in w1_slave output".to_string(),
    ))
}

fn parse_millidegrees(text: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|_| SensorError::Parse(format!("invalid temperature value: {text}")))
}

/// Longest `-?[0-9]+` prefix of `text` (possibly empty).
fn leading_integer(text: &str) -> &str {
    let bytes = text.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    &text[..end]
}
