//! Lenient numeric parsing and cosmetic label/formula cleanup.

const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

/// Parses a decimal number, accepting `D`/`d` exponent markers.
///
/// Empty, missing, unparseable and non-finite inputs all yield `0.0`.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let normalized = trimmed.replace(['D', 'd'], "E");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

pub fn parse_optional_number(text: Option<&str>) -> f64 {
    text.map(parse_number).unwrap_or(0.0)
}

pub fn format_fixed3(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value:.3}")
    }
}

pub fn format_fixed4(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value:.4}")
    }
}

/// Strips an `FT<family>-` database prefix (e.g. `FToxid-SLAGA` -> `SLAGA`).
pub fn clean_phase_label(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("FT") else {
        return raw;
    };
    let family_len = rest
        .chars()
        .take_while(|character| character.is_ascii_alphabetic())
        .count();
    if family_len == 0 {
        return raw;
    }

    match rest[family_len..].strip_prefix('-') {
        Some(label) => label,
        None => raw,
    }
}

/// Renders digit runs that follow a letter or `)` as Unicode subscripts.
pub fn subscript_formula_digits(text: &str) -> String {
    let mut rendered = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    let mut in_subscript = false;

    for character in text.chars() {
        let follows_symbol =
            previous.is_some_and(|prev| prev.is_ascii_alphabetic() || prev == ')');
        if let Some(digit) = character.to_digit(10) {
            if in_subscript || follows_symbol {
                rendered.push(SUBSCRIPT_DIGITS[digit as usize]);
                in_subscript = true;
                previous = Some(character);
                continue;
            }
        }
        in_subscript = false;
        rendered.push(character);
        previous = Some(character);
    }

    rendered
}
