use std::time::Duration;

/// Parse a `--timeout` value such as `30s`, `2m`, `1h30m` or `500ms`. A bare
/// number is taken as seconds.
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(seconds) = text.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let invalid = || format!("invalid duration '{text}'");
    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut total = Duration::ZERO;
    let mut rest = text;
    while !rest.is_empty() {
        let unit_start = rest.find(|c: char| !is_number(c)).ok_or_else(|| format!("missing unit in duration '{text}'"))?;
        if unit_start == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..unit_start].parse().map_err(|_| invalid())?;
        let unit_end = rest[unit_start..].find(is_number).map_or(rest.len(), |offset| unit_start + offset);
        let scale = match &rest[unit_start..unit_end] {
            "ms" => 0.001,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            unit => return Err(format!("unknown unit '{unit}' in duration '{text}'")),
        };
        total += Duration::try_from_secs_f64(value * scale).map_err(|_| invalid())?;
        rest = &rest[unit_end..];
    }
    Ok(total)
}
