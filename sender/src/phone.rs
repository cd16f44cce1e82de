/// Turns a raw phone cell into a dial string carrying `country_code`.
///
/// Everything except ASCII digits and `+` is removed. If the result does not
/// already start with the country code, one leading `0` (local trunk prefix) is
/// dropped and the code is prepended. Blank cells never reach this function;
/// the batch skips them first. Length is not validated: a bad number shows up
/// later as a failed send.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if cleaned.starts_with(country_code) {
        return cleaned;
    }
    let local = cleaned.strip_prefix('0').unwrap_or(&cleaned);
    format!("{}{}", country_code, local)
}

/// The last four digits of a phone number, used to name debug screenshots.
pub fn last_four_digits(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(4);
    digits[start..].iter().collect()
}
