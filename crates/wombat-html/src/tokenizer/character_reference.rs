//! Character reference handling for the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! Character references are resolved with lookahead straight from the `&`
//! instead of stepping through the per-character states. When nothing
//! matches, no input is consumed and the `&` is flushed on its own, so the
//! following characters go through the normal states as plain text.

use super::core::HTMLTokenizer;
use super::named_character_references::{LONGEST_NAME, lookup};

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column."
const C1_REPLACEMENTS: [(u32, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Map a numeric character reference to the character it produces.
///
/// NULL, surrogates and anything past U+10FFFF become U+FFFD; the C1 range
/// goes through the Windows-1252 table.
#[must_use]
pub fn numeric_reference_char(code: u32) -> char {
    if let Some(&(_, replacement)) = C1_REPLACEMENTS.iter().find(|(from, _)| *from == code) {
        return replacement;
    }
    if code == 0 {
        return '\u{FFFD}';
    }
    char::from_u32(code).unwrap_or('\u{FFFD}')
}

impl HTMLTokenizer {
    /// "Flush code points consumed as a character reference"
    ///
    /// "If the character reference was consumed as part of an attribute, then
    /// append each character to the current attribute's value. Otherwise, emit
    /// each character as a character token."
    pub(super) fn flush_character_reference(&mut self, in_attribute: bool) {
        let replacement = self
            .consume_character_reference(in_attribute)
            .unwrap_or_else(|| String::from('&'));
        for c in replacement.chars() {
            if in_attribute {
                self.append_to_attribute_value(c);
            } else {
                self.emit_character_token(c);
            }
        }
    }

    /// Called with the `&` already consumed. Returns the replacement text, or
    /// `None` when the `&` is literal.
    fn consume_character_reference(&mut self, in_attribute: bool) -> Option<String> {
        match self.remaining_input().chars().next() {
            Some(c) if c.is_ascii_alphanumeric() => self.consume_named_reference(in_attribute),
            Some('#') => self.consume_numeric_reference().map(String::from),
            _ => None,
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the consumed
    /// characters are one of the identifiers in the first column of the named
    /// character references table."
    fn consume_named_reference(&mut self, in_attribute: bool) -> Option<String> {
        let rest = self.remaining_input();
        let alnum_len = rest
            .bytes()
            .take_while(u8::is_ascii_alphanumeric)
            .count();
        let with_semicolon = alnum_len + usize::from(rest[alnum_len..].starts_with(';'));
        let longest = with_semicolon.min(LONGEST_NAME);

        let matched = (1..=longest)
            .rev()
            .find_map(|len| lookup(&rest[..len]).map(|value| (len, value)));

        let Some((len, value)) = matched else {
            // [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
            if with_semicolon > alnum_len {
                self.parse_error("unknown-named-character-reference");
            }
            return None;
        };

        let ends_with_semicolon = rest[..len].ends_with(';');
        // "If the character reference was consumed as part of an attribute, and
        // the last character matched is not a U+003B SEMICOLON character (;),
        // and the next input character is either a U+003D EQUALS SIGN character
        // (=) or an ASCII alphanumeric, then, for historical reasons, flush code
        // points consumed as a character reference and switch to the return state."
        if in_attribute
            && !ends_with_semicolon
            && rest[len..]
                .chars()
                .next()
                .is_some_and(|next| next == '=' || next.is_ascii_alphanumeric())
        {
            return None;
        }

        self.current_pos += len;
        if !ends_with_semicolon {
            self.parse_error("missing-semicolon-after-character-reference");
        }
        Some(value.to_string())
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    /// through [§ 13.2.5.80](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state).
    fn consume_numeric_reference(&mut self) -> Option<char> {
        let rest = self.remaining_input();
        let hex = rest[1..].starts_with(['x', 'X']);
        let (prefix_len, radix) = if hex { (2, 16) } else { (1, 10) };
        let digits: &str = {
            let body = &rest[prefix_len..];
            let len = body.bytes().take_while(|b| char::from(*b).is_digit(radix)).count();
            &body[..len]
        };

        if digits.is_empty() {
            // "This is an absence-of-digits-in-numeric-character-reference parse
            // error. Flush code points consumed as a character reference."
            self.parse_error("absence-of-digits-in-numeric-character-reference");
            return None;
        }

        let code = digits.chars().fold(0_u32, |acc, digit| {
            acc.saturating_mul(radix)
                .saturating_add(digit.to_digit(radix).unwrap_or(0))
        });
        let consumed = prefix_len + digits.len();
        let has_semicolon = rest[consumed..].starts_with(';');

        self.current_pos += consumed + usize::from(has_semicolon);
        if !has_semicolon {
            self.parse_error("missing-semicolon-after-character-reference");
        }
        if code == 0 || code > 0x10_FFFF || (0xD800..=0xDFFF).contains(&code) {
            self.parse_error("invalid-character-reference");
        }
        Some(numeric_reference_char(code))
    }
}
