//! Amount in words, South-Asian grouping (crore / lakh / thousand / hundred).

use rust_decimal::prelude::ToPrimitive;

use billdesk_core::Money;

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const CRORE: u128 = 10_000_000;
const LAKH: u128 = 100_000;
const THOUSAND: u128 = 1_000;
const HUNDRED: u128 = 100;

fn below_hundred(n: u128, out: &mut Vec<String>) {
    let n = n as usize;
    if n < 20 {
        out.push(ONES[n].to_string());
    } else if n % 10 == 0 {
        out.push(TENS[n / 10].to_string());
    } else {
        out.push(format!("{} {}", TENS[n / 10], ONES[n % 10]));
    }
}

fn push_group(count: u128, label: &str, out: &mut Vec<String>) {
    if count == 0 {
        return;
    }
    out.push(number_to_words(count));
    out.push(label.to_string());
}

/// Spell out a whole number, e.g. `1_25_000` → "one lakh twenty five thousand".
///
/// Amounts of a hundred crore and above repeat the grouping in front of
/// "crore" ("one hundred crore").
pub fn number_to_words(n: u128) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut parts = Vec::new();
    push_group(n / CRORE, "crore", &mut parts);
    let rest = n % CRORE;
    push_group(rest / LAKH, "lakh", &mut parts);
    push_group(rest % LAKH / THOUSAND, "thousand", &mut parts);
    let rest = rest % THOUSAND;
    if rest >= HUNDRED {
        below_hundred(rest / HUNDRED, &mut parts);
        parts.push("hundred".to_string());
    }
    if rest % HUNDRED > 0 {
        below_hundred(rest % HUNDRED, &mut parts);
    }

    parts.join(" ")
}

/// Whole part of `amount` in words, suffixed with "only".
///
/// The fraction is truncated toward zero, so `-12.50` reads "minus twelve
/// only" rather than rounding down to thirteen. Invoice totals are never
/// negative; the sign only shows up for hand-built amounts.
pub fn amount_in_words(amount: Money) -> String {
    let whole = amount.trunc().abs().to_u128().unwrap_or_default();
    let words = number_to_words(whole);
    if amount.is_sign_negative() && whole > 0 {
        format!("minus {words} only")
    } else {
        format!("{words} only")
    }
}
