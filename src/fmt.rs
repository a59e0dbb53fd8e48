/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Confidence score for table display: "87" plus a coarse band label.
pub fn confidence_label(score: f64) -> String {
    let band = if score >= 90.0 {
        "strong"
    } else if score >= 75.0 {
        "good"
    } else if score >= 60.0 {
        "weak"
    } else {
        "poor"
    };
    format!("{:.0} ({band})", score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
    }

    #[test]
    fn test_confidence_label() {
        assert_eq!(confidence_label(100.0), "100 (strong)");
        assert_eq!(confidence_label(75.0), "75 (good)");
        assert_eq!(confidence_label(60.0), "60 (weak)");
        assert_eq!(confidence_label(12.0), "12 (poor)");
    }
}
