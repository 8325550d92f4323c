//! Barcode generation for products without a printed code

use rand::Rng;
use shared::util::now_millis;

/// Check digit for the first 12 digits of an EAN-13; None on non-digits or
/// wrong length
pub fn ean13_check_digit(digits: &str) -> Option<u8> {
    if digits.len() != 12 {
        return None;
    }
    let mut sum = 0u32;
    for (i, c) in digits.chars().enumerate() {
        let d = c.to_digit(10)?;
        sum += if i % 2 == 0 { d } else { d * 3 };
    }
    Some(((10 - sum % 10) % 10) as u8)
}

/// Random 12 digits plus check digit
pub fn generate_ean13() -> String {
    let mut rng = rand::thread_rng();
    let mut code: String = (0..12)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    if let Some(check) = ean13_check_digit(&code) {
        code.push(char::from(b'0' + check));
    }
    code
}

pub fn validate_ean13(code: &str) -> bool {
    if code.len() != 13 || !code.is_ascii() {
        return false;
    }
    let (body, check) = code.split_at(12);
    match (ean13_check_digit(body), check.chars().next().and_then(|c| c.to_digit(10))) {
        (Some(expected), Some(actual)) => u32::from(expected) == actual,
        _ => false,
    }
}

/// Millisecond timestamp plus three random digits
pub fn generate_code128() -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("{}{:03}", now_millis(), suffix)
}

/// `prefix` + last 8 timestamp digits + two random digits, e.g. `PRD1234567801`
pub fn generate_custom(prefix: &str) -> String {
    let stamp = now_millis().rem_euclid(100_000_000);
    let suffix: u8 = rand::thread_rng().gen_range(0..100);
    format!("{}{:08}{:02}", prefix, stamp, suffix)
}

/// `6281234567897` → `6-281234-567897`; anything else is returned as is
pub fn format_ean13(code: &str) -> String {
    if code.len() == 13 && code.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &code[..1], &code[1..7], &code[7..])
    } else {
        code.to_string()
    }
}
