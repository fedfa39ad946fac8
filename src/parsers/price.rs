use serde_json::Value;

/// Coerce an impressions `price` value to a number.
///
/// Numbers pass through, strings are trimmed and parsed, anything else
/// (including NaN/inf and missing values) is treated as absent.
pub fn coerce_price(value: Option<&Value>) -> Option<f64> {
    let price = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    price.is_finite().then_some(price)
}

/// Format a USD price rounded to whole dollars (ties to even) with
/// thousands separators, e.g. `1999.5` -> `$2,000`, `1500.5` -> `$1,500`.
pub fn format_usd(price: f64) -> String {
    let rounded = price.round_ties_even() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0 { "-" } else { "" };
    format!("${}{}", sign, grouped)
}
