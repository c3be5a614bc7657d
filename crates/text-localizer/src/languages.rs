use crate::numerals::NumeralSystem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// How the ticket number is written into the sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStyle {
    Plain,
    /// Dubai announcements read the ticket with a leading hyphen, e.g. `-١٠١`.
    LeadingHyphen,
}

/// Sentence template plus rendering rules for one language code.
#[derive(Debug, Clone, Copy)]
pub struct LanguageProfile {
    pub code: &'static str,
    /// Uses `{ticket}` and `{counter}` placeholders.
    pub template: &'static str,
    pub numerals: NumeralSystem,
    pub direction: TextDirection,
    pub ticket_style: TicketStyle,
}

const fn ltr(code: &'static str, template: &'static str) -> LanguageProfile {
    LanguageProfile {
        code,
        template,
        numerals: NumeralSystem::Latin,
        direction: TextDirection::Ltr,
        ticket_style: TicketStyle::Plain,
    }
}

const fn rtl(
    code: &'static str,
    template: &'static str,
    numerals: NumeralSystem,
    ticket_style: TicketStyle,
) -> LanguageProfile {
    LanguageProfile {
        code,
        template,
        numerals,
        direction: TextDirection::Rtl,
        ticket_style,
    }
}

pub const ENGLISH: LanguageProfile = ltr(
    "en",
    "Ticket number {ticket} please come to counter {counter}",
);

pub static PROFILES: &[LanguageProfile] = &[
    ENGLISH,
    rtl(
        "ar",
        "رقم التذكرة {ticket} يرجى التوجه إلى الشباك رقم {counter}",
        NumeralSystem::ArabicIndic,
        TicketStyle::Plain,
    ),
    rtl(
        "ar-ae",
        "رقم التذكرة {ticket} يرجى التوجه إلى الكاونتر رقم {counter}",
        NumeralSystem::ArabicIndic,
        TicketStyle::LeadingHyphen,
    ),
    rtl(
        "ar-sa",
        "على صاحب التذكرة رقم {ticket} التوجه إلى الشباك رقم {counter}",
        NumeralSystem::ArabicIndic,
        TicketStyle::Plain,
    ),
    rtl(
        "ur",
        "ٹکٹ نمبر {ticket} براہ کرم کاؤنٹر نمبر {counter} پر تشریف لائیں",
        NumeralSystem::ExtendedArabicIndic,
        TicketStyle::Plain,
    ),
    rtl(
        "fa",
        "شماره نوبت {ticket} لطفا به باجه {counter} مراجعه کنید",
        NumeralSystem::ExtendedArabicIndic,
        TicketStyle::Plain,
    ),
    ltr(
        "fr",
        "Ticket numéro {ticket}, veuillez vous présenter au guichet {counter}",
    ),
    ltr(
        "es",
        "Turno número {ticket}, por favor acuda a la ventanilla {counter}",
    ),
    ltr(
        "de",
        "Ticketnummer {ticket}, bitte kommen Sie zu Schalter {counter}",
    ),
    ltr(
        "tr",
        "{ticket} numaralı bilet, lütfen {counter} numaralı gişeye gelin",
    ),
    ltr("hi", "टिकट नंबर {ticket} कृपया काउंटर {counter} पर आएं"),
    ltr("zh", "请 {ticket} 号到 {counter} 号窗口办理"),
    ltr("ru", "Талон номер {ticket}, пройдите к окну {counter}"),
    ltr(
        "it",
        "Biglietto numero {ticket}, si prega di recarsi allo sportello {counter}",
    ),
    ltr(
        "pt",
        "Senha número {ticket}, por favor dirija-se ao balcão {counter}",
    ),
];

/// Lowercase, trim and use `-` as the region separator (`ar_AE` -> `ar-ae`).
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase().replace('_', "-")
}

/// Exact match first, then the base language, then English.
pub fn profile_for(code: &str) -> &'static LanguageProfile {
    let code = normalize_code(code);
    if let Some(p) = PROFILES.iter().find(|p| p.code == code) {
        return p;
    }
    if let Some((base, _)) = code.split_once('-') {
        if let Some(p) = PROFILES.iter().find(|p| p.code == base) {
            return p;
        }
    }
    tracing::debug!(language = %code, "unknown language code, using english template");
    &ENGLISH
}

/// True when `code` resolves to a profile of its own (not the English fallback).
pub fn is_supported(code: &str) -> bool {
    let code = normalize_code(code);
    let base = code.split_once('-').map(|(b, _)| b).unwrap_or(&code);
    PROFILES.iter().any(|p| p.code == code || p.code == base)
}
