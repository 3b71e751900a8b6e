//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! State transitions, input lookahead, token emission, the shared
//! "anything else" branches of the raw text end tag states, and parse error
//! reporting.

use wombat_common::warning::warn_once;

use super::core::{DoctypeIdentifier, HTMLTokenizer, TokenizerState};
use super::token::Token;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Switch to the X state"
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Consume the next input character"
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// Input after the current position, not yet consumed.
    pub(super) fn remaining_input(&self) -> &str {
        &self.input[self.current_pos..]
    }

    /// "If the next few characters are..."
    pub(super) fn next_few_characters_are(&self, target: &str) -> bool {
        self.remaining_input().starts_with(target)
    }

    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    pub(super) fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.remaining_input()
            .get(..target.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(target))
    }

    /// Consume `target`, which the caller has already matched. Only used with
    /// ASCII targets, so byte and character counts agree.
    pub(super) const fn consume_string(&mut self, target: &str) {
        self.current_pos += target.len();
    }

    /// "U+0009 CHARACTER TABULATION (tab), U+000A LINE FEED (LF),
    /// U+000C FORM FEED (FF), U+0020 SPACE"
    ///
    /// CR never reaches the tokenizer; newlines are normalized on construction.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current token"
    ///
    /// A start tag for a raw text element switches the tokenizer into the
    /// matching text state, which in a streaming parser the tree builder would do.
    pub(super) fn emit_token(&mut self) {
        self.finish_attribute();
        let Some(token) = self.current_token.take() else {
            return;
        };
        match &token {
            Token::StartTag {
                name, self_closing, ..
            } => {
                if matches!(name.as_str(), "svg" | "math") {
                    if !self_closing {
                        self.foreign_depth += 1;
                    }
                } else if self.foreign_depth == 0
                    && let Some(state) = self.text_state_for(name)
                {
                    self.switch_to(state);
                    self.text_state = state;
                }
                self.last_start_tag_name = Some(name.clone());
            }
            Token::EndTag { name, attributes } => {
                if matches!(name.as_str(), "svg" | "math") {
                    self.foreign_depth = self.foreign_depth.saturating_sub(1);
                }
                if !attributes.is_empty() {
                    self.parse_error("end-tag-with-attributes");
                }
            }
            _ => {}
        }
        self.token_stream.push(token);
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.token_stream.push(Token::Character { data: c });
    }

    /// "Emit an end-of-file token." Ends the run loop.
    pub(super) fn emit_eof_token(&mut self) {
        self.token_stream.push(Token::EndOfFile);
        self.at_eof = true;
    }

    /// "This is an eof-in-tag parse error. Emit an end-of-file token."
    /// The unfinished tag is dropped.
    pub(super) fn eof_in_tag(&mut self) {
        self.parse_error("eof-in-tag");
        self.current_token = None;
        self.emit_eof_token();
    }

    /// "This is an eof-in-comment parse error. Emit the comment token. Emit an
    /// end-of-file token."
    pub(super) fn eof_in_comment(&mut self) {
        self.parse_error("eof-in-comment");
        self.emit_token();
        self.emit_eof_token();
    }

    /// "This is an eof-in-doctype parse error. Set the current DOCTYPE token's
    /// force-quirks flag to on. Emit the current DOCTYPE token. Emit an
    /// end-of-file token."
    pub(super) fn eof_in_doctype(&mut self) {
        self.parse_error("eof-in-doctype");
        if let Some(ref mut token) = self.current_token {
            token.set_force_quirks();
        }
        self.emit_token();
        self.emit_eof_token();
    }
}

// =============================================================================
// Raw Text Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        matches!(
            (&self.last_start_tag_name, &self.current_token),
            (Some(last_start_tag), Some(Token::EndTag { name, .. })) if name == last_start_tag
        )
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "Anything else": "Emit a U+003C LESS-THAN SIGN character token, a
    /// U+002F SOLIDUS character token, and a character token for each of the
    /// characters in the temporary buffer... Reconsume in the RCDATA state."
    pub(super) fn emit_text_end_tag_name_anything_else(&mut self) {
        self.emit_character_token('<');
        self.emit_character_token('/');
        let buffer = std::mem::take(&mut self.temporary_buffer);
        for c in buffer.chars() {
            self.emit_character_token(c);
        }
        self.current_token = None;
        self.reconsume_in(self.text_state);
    }
}

// =============================================================================
// Current Token Helpers
// =============================================================================

impl HTMLTokenizer {
    pub(super) fn append_to_tag_name(&mut self, c: char) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_tag_name(c);
        }
    }

    pub(super) fn append_to_attribute_name(&mut self, c: char) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_current_attribute_name(c);
        }
    }

    pub(super) fn append_to_attribute_value(&mut self, c: char) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_current_attribute_value(c);
        }
    }

    pub(super) fn append_to_comment(&mut self, text: &str) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_comment(text);
        }
    }

    /// "Start a new attribute in the current tag token."
    pub(super) fn start_new_attribute(&mut self) {
        self.finish_attribute();
        if let Some(ref mut token) = self.current_token {
            token.start_new_attribute();
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state... if there is
    /// already an attribute on the token with the exact same name, then this
    /// is a duplicate-attribute parse error and the new attribute must be
    /// removed from the token."
    ///
    /// Removal waits for [`finish_attribute`](Self::finish_attribute) so the
    /// duplicate's value is read into the duplicate, not the original.
    pub(super) fn check_duplicate_attribute(&mut self) {
        let is_duplicate = self
            .current_token
            .as_ref()
            .is_some_and(Token::current_attribute_name_is_duplicate);

        if is_duplicate {
            self.parse_error("duplicate-attribute");
            self.current_attribute_is_duplicate = true;
        }
    }

    /// Drop the current attribute if it was flagged as a duplicate.
    pub(super) fn finish_attribute(&mut self) {
        if std::mem::take(&mut self.current_attribute_is_duplicate)
            && let Some(ref mut token) = self.current_token
        {
            token.remove_current_attribute();
        }
    }

    /// "Set the DOCTYPE token's public/system identifier to the empty string
    /// (not missing), then switch to the DOCTYPE identifier (quoted) state."
    pub(super) fn begin_doctype_identifier(&mut self, kind: DoctypeIdentifier, quote: char) {
        if let Some(ref mut token) = self.current_token {
            token.start_doctype_identifier(kind == DoctypeIdentifier::System);
        }
        self.switch_to(TokenizerState::DoctypeIdentifierQuoted(kind, quote));
    }

    /// "This is an abrupt-doctype-public-identifier parse error. Set the current
    /// DOCTYPE token's force-quirks flag to on. Switch to the data state. Emit
    /// the current DOCTYPE token."
    pub(super) fn abrupt_doctype_identifier(&mut self) {
        self.parse_error("abrupt-doctype-identifier");
        if let Some(ref mut token) = self.current_token {
            token.set_force_quirks();
        }
        self.switch_to(TokenizerState::Data);
        self.emit_token();
    }

    /// "Set the current DOCTYPE token's force-quirks flag to on. Reconsume in
    /// the bogus DOCTYPE state."
    pub(super) fn bogus_doctype(&mut self) {
        if let Some(ref mut token) = self.current_token {
            token.set_force_quirks();
        }
        self.reconsume_in(TokenizerState::BogusDoctype);
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Records a parse error and, when reporting is enabled, routes it through
    /// the wombat-common warning system. Parse errors are never fatal.
    pub(super) fn parse_error(&mut self, code: &str) {
        let message = format!("{code} at position {}", self.current_pos);
        if self.report_parse_errors {
            let _ = warn_once("HTML Tokenizer", &message);
        }
        self.parse_errors.push(message);
    }
}
