//! Rupee formatting in the Indian numbering system (lakhs, crores).

const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// Group digits as `12,34,56,789`: the last three, then pairs
pub fn format_indian_number(num: u64) -> String {
    let digits = num.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
    let offset = head.len() % 2;
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (i + 2 - offset) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push(',');
    grouped.push_str(last_three);
    grouped
}

/// Full amount with rupee sign, e.g. `₹45,00,000`
pub fn format_currency(amount: u64) -> String {
    format!("₹{}", format_indian_number(amount))
}

/// Compact amount, e.g. `₹45.00 L` or `₹1.20 Cr`
pub fn format_indian_currency(amount: u64) -> String {
    if amount >= CRORE {
        format!("₹{:.2} Cr", amount as f64 / CRORE as f64)
    } else if amount >= LAKH {
        format!("₹{:.2} L", amount as f64 / LAKH as f64)
    } else {
        format_currency(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_indian_number() {
        assert_eq!(format_indian_number(0), "0");
        assert_eq!(format_indian_number(999), "999");
        assert_eq!(format_indian_number(1000), "1,000");
        assert_eq!(format_indian_number(45_000), "45,000");
        assert_eq!(format_indian_number(4_500_000), "45,00,000");
        assert_eq!(format_indian_number(12_000_000), "1,20,00,000");
        assert_eq!(format_indian_number(123_456_789), "12,34,56,789");
    }

    #[test]
    fn test_format_indian_currency() {
        assert_eq!(format_indian_currency(85_000), "₹85,000");
        assert_eq!(format_indian_currency(4_500_000), "₹45.00 L");
        assert_eq!(format_indian_currency(12_000_000), "₹1.20 Cr");
        assert_eq!(format_indian_currency(100_000), "₹1.00 L");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(3_500_000), "₹35,00,000");
    }
}
