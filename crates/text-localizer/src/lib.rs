//! text-localizer: turns a (ticket, counter) pair into the sentence spoken and
//! shown for one announcement box.
//!
//! Pure and deterministic; no I/O. Right-to-left languages are flagged through
//! [`text_direction`] but the returned string carries no direction marks, that
//! is left to the display layer.

mod numerals;
pub use numerals::NumeralSystem;

mod languages;
pub use languages::{
    is_supported, normalize_code, profile_for, LanguageProfile, TextDirection, TicketStyle,
    PROFILES,
};

/// Render the announcement sentence for `language_code`.
///
/// Unknown codes fall back to the base language and then to English.
pub fn localize(ticket_number: &str, counter_number: &str, language_code: &str) -> String {
    let profile = profile_for(language_code);
    let ticket = profile.numerals.transliterate(&spoken_ticket(ticket_number));
    let ticket = match profile.ticket_style {
        TicketStyle::Plain => ticket,
        TicketStyle::LeadingHyphen => format!("-{ticket}"),
    };
    let counter = profile.numerals.transliterate(counter_number.trim());
    profile
        .template
        .replace("{ticket}", &ticket)
        .replace("{counter}", &counter)
}

/// Direction the localized text should be laid out in.
pub fn text_direction(language_code: &str) -> TextDirection {
    profile_for(language_code).direction
}

/// The part of a ticket id that is read aloud.
///
/// A series prefix made of letters and followed by a hyphen is dropped
/// (`"P-101"` reads as `"101"`); anything else is read as written.
pub fn spoken_ticket(ticket_number: &str) -> String {
    let ticket = ticket_number.trim();
    if let Some((prefix, rest)) = ticket.split_once('-') {
        if !prefix.is_empty()
            && !rest.is_empty()
            && prefix.chars().all(|c| c.is_alphabetic())
        {
            return rest.to_string();
        }
    }
    ticket.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_sentence() {
        assert_eq!(
            localize("P-101", "5", "en"),
            "Ticket number 101 please come to counter 5"
        );
    }

    #[test]
    fn dubai_arabic_uses_hyphen_and_native_digits() {
        let text = localize("P-101", "5", "ar-ae");
        assert!(text.contains("-١٠١"), "got {text}");
        assert!(text.ends_with("٥"), "got {text}");
        assert!(!text.contains("101"));
    }

    #[test]
    fn plain_arabic_has_no_hyphen() {
        let text = localize("P-101", "12", "ar");
        assert!(text.contains("١٠١"));
        assert!(!text.contains("-١٠١"));
        assert!(text.contains("١٢"));
    }

    #[test]
    fn urdu_uses_extended_digits() {
        let text = localize("A-42", "3", "ur");
        assert!(text.contains("۴۲"));
        assert!(text.contains("۳"));
    }

    #[test]
    fn unknown_code_falls_back_to_english() {
        assert_eq!(localize("7", "2", "xx"), localize("7", "2", "en"));
        assert!(!is_supported("xx"));
    }

    #[test]
    fn regional_variant_falls_back_to_base() {
        assert_eq!(localize("P-9", "1", "fr_CA"), localize("P-9", "1", "fr"));
        assert_eq!(localize("P-9", "1", "AR-EG"), localize("P-9", "1", "ar"));
        assert!(is_supported("en-GB"));
    }

    #[test]
    fn unassigned_counter_is_kept() {
        assert_eq!(
            localize("B-3", "N/A", "en"),
            "Ticket number 3 please come to counter N/A"
        );
        assert!(localize("B-3", "N/A", "ar").contains("N/A"));
    }

    #[test]
    fn directions() {
        assert_eq!(text_direction("ar-ae"), TextDirection::Rtl);
        assert_eq!(text_direction("ur"), TextDirection::Rtl);
        assert_eq!(text_direction("en"), TextDirection::Ltr);
        assert_eq!(text_direction("zz"), TextDirection::Ltr);
    }

    #[test]
    fn spoken_ticket_rules() {
        assert_eq!(spoken_ticket("P-101"), "101");
        assert_eq!(spoken_ticket(" AB-7 "), "7");
        assert_eq!(spoken_ticket("101"), "101");
        assert_eq!(spoken_ticket("12-34"), "12-34");
        assert_eq!(spoken_ticket("P-"), "P-");
    }

    #[test]
    fn every_profile_has_both_placeholders() {
        for p in PROFILES {
            assert!(p.template.contains("{ticket}"), "{}", p.code);
            assert!(p.template.contains("{counter}"), "{}", p.code);
        }
    }
}
