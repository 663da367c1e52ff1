//! Money formatting for the cards, charts and JSON.

use numfmt::{Formatter, Precision};

/// The symbol placed in front of amounts in `code`.
///
/// Codes without a well known symbol are shown as the code and a space,
/// e.g. `CHF 12.00`.
pub fn currency_symbol(code: &str) -> String {
    match code {
        "USD" | "NZD" | "AUD" | "CAD" => "$".to_owned(),
        "BRL" => "R$".to_owned(),
        "EUR" => "€".to_owned(),
        "GBP" => "£".to_owned(),
        "JPY" => "¥".to_owned(),
        other => format!("{other} "),
    }
}

/// Format `amount` in major units as money in the currency `code`, with two
/// decimal places and thousands separators, e.g. `$1,234.50` or `-€3.00`.
pub fn format_currency(amount: f64, code: &str) -> String {
    let symbol = currency_symbol(code);

    if amount == 0.0 || !amount.is_finite() {
        // numfmt renders zero as "0".
        return format!("{symbol}0.00");
    }

    let prefix = if amount < 0.0 {
        format!("-{symbol}")
    } else {
        symbol
    };

    let formatted = match Formatter::currency(&prefix) {
        Ok(formatter) => formatter
            .precision(Precision::Decimals(2))
            .fmt_string(amount.abs()),
        Err(error) => {
            tracing::debug!("numfmt rejected the prefix {prefix:?}: {error:?}");
            format!("{prefix}{:.2}", amount.abs())
        }
    };

    pad_decimals(formatted)
}

/// numfmt drops trailing zeros, so "12.30" comes out as "12.3".
fn pad_decimals(mut formatted: String) -> String {
    let decimals = match formatted.rfind('.') {
        Some(index) => formatted.len() - index - 1,
        None => {
            formatted.push('.');
            0
        }
    };

    for _ in decimals..2 {
        formatted.push('0');
    }

    formatted
}
