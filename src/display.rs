//! Human readable forms of formulas and amounts.

/// Pretty form of a formula: `×` and `÷` for the products, spaced operators
/// and parentheses, underscores shown as spaces.
///
/// # Examples
///
/// ```
/// # use roi_cruncher::format_equation;
/// assert_eq!(
///     format_equation("license_cost+(training_hours*hourly_rate)"),
///     "license cost + ( training hours × hourly rate )"
/// );
/// ```
pub fn format_equation(expression: &str) -> String {
    let mut spaced = String::with_capacity(expression.len() * 2);
    for c in expression.chars() {
        match c {
            '*' => spaced.push_str(" × "),
            '/' => spaced.push_str(" ÷ "),
            '+' | '-' => {
                spaced.push(' ');
                spaced.push(c);
                spaced.push(' ');
            }
            '(' => spaced.push_str("( "),
            ')' => spaced.push_str(" )"),
            '_' => spaced.push(' '),
            c => spaced.push(c),
        }
    }
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format an amount with two decimals and comma separated thousands.
///
/// ```
/// # use roi_cruncher::format_amount;
/// assert_eq!(format_amount(1234567.891), "1,234,567.89");
/// assert_eq!(format_amount(-3000.0), "-3,000.00");
/// ```
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_at(fixed.len() - 3);

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    // -0.001 rounds to 0.00 and loses its sign
    let negative = value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.');
    format!("{}{}{}", if negative { "-" } else { "" }, grouped, frac_part)
}
