use std::borrow::Cow;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TagGuardError {
    #[error("Invalid custom element name{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

/// Names the HTML standard keeps for SVG and `MathML` elements.
const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Validation of custom element tag names before they reach a host registry.
#[derive(Debug)]
pub struct TagGuard;

impl TagGuard {
    /// Checks `tag` against the valid custom element name production.
    ///
    /// A valid name starts with a lowercase ASCII letter, contains at least one hyphen,
    /// has no uppercase ASCII letters and is not one of the reserved names.
    ///
    /// # Errors
    /// Returns [`TagGuardError::Validation`] naming the first rule that fails.
    pub fn verify(tag: impl AsRef<str>) -> Result<(), TagGuardError> {
        let tag = tag.as_ref();
        let reject = |message: String| {
            Err(TagGuardError::Validation { message: message.into(), context: Some(tag.to_owned().into()) })
        };

        let Some(first) = tag.chars().next() else {
            return reject("name is empty".to_owned());
        };
        if !first.is_ascii_lowercase() {
            return reject(format!("must start with a lowercase ASCII letter, got '{first}'"));
        }
        if !tag.contains('-') {
            return reject("must contain a hyphen".to_owned());
        }
        if let Some(bad) = tag.chars().find(|ch| !is_name_char(*ch)) {
            return reject(format!("character '{bad}' is not allowed"));
        }
        if RESERVED_NAMES.contains(&tag) {
            return reject("name is reserved".to_owned());
        }

        Ok(())
    }
}

fn is_name_char(ch: char) -> bool {
    matches!(ch,
        '-' | '.' | '_' | '0'..='9' | 'a'..='z'
        | '\u{B7}'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{203F}'..='\u{2040}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}
