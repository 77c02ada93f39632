use ecmo_econ_core::model::{Cer, Currency, IcerValue};

/// Digits of a whole number with thousands separators
fn group_thousands(whole: i64) -> String {
    let digits = whole.to_string();
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format an amount rounded to whole units, e.g. `USD 12,345`
pub fn format_money(value: f64, currency: Currency) -> String {
    let whole = group_thousands(value.abs().round() as i64);
    if value < 0.0 {
        format!("-{} {whole}", currency.code())
    } else {
        format!("{} {whole}", currency.code())
    }
}

/// Format an amount in compact form (e.g. USD 2.1M, USD 450K)
pub fn format_compact_money(value: f64, currency: Currency) -> String {
    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    let code = currency.code();

    if abs_value >= 1_000_000.0 {
        format!("{sign}{code} {:.1}M", abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{sign}{code} {:.0}K", abs_value / 1_000.0)
    } else {
        format!("{sign}{code} {abs_value:.0}")
    }
}

/// Format a fraction as a percentage
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Format a cost per QALY in `to`, converting from `from`
pub fn format_icer(icer: IcerValue, from: Currency, to: Currency) -> String {
    match icer {
        IcerValue::Finite(v) => format!("{}/QALY", format_money(from.convert(v, to), to)),
        other => other.to_string(),
    }
}

pub fn format_cer(cer: Cer, from: Currency, to: Currency) -> String {
    match cer {
        Cer::Finite(v) => format_money(from.convert(v, to), to),
        Cer::Undefined => cer.to_string(),
    }
}
