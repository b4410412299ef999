//! Utility functions and helpers

/// Calculate percentage change, 0 when the reference is not a usable price
pub fn calculate_percentage_change(old_value: f64, new_value: f64) -> f64 {
    if is_usable_price(old_value) {
        ((new_value - old_value) / old_value) * 100.0
    } else {
        0.0
    }
}

/// A price can be divided by only when it is finite and strictly positive
pub fn is_usable_price(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Format a currency amount with 2 decimals
pub fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

/// Format a spot price with 4 decimals
pub fn format_price(value: f64) -> String {
    format!("${:.4}", value)
}

/// ▲ for non-negative moves, ▼ otherwise
pub fn direction_arrow(value: f64) -> &'static str {
    if value >= 0.0 {
        "▲"
    } else {
        "▼"
    }
}
