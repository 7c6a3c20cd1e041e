// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

/// Flag glyph for an ISO 3166-1 alpha-2 code, built from regional indicator symbols.
/// Returns an empty string for anything that is not two ASCII letters.
pub fn flag_emoji(iso2: &str) -> String {
    if iso2.len() != 2 || !iso2.chars().all(|c| c.is_ascii_alphabetic()) {
        return String::new();
    }
    iso2.to_ascii_uppercase()
        .chars()
        .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

/// `2138551` -> `2,138,551`
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_coordinates(lat: f64, lon: f64) -> String {
    format!("{:.4}, {:.4}", lat, lon)
}
