//! Locale resolution and locale-sensitive formatting.
//!
//! Locale data arrives pre-parsed as [`Locale`] values and is registered
//! with a [`LocaleRegistry`]. Resolution walks `exact dialect → language →
//! invariant`; the invariant locale is built in and is the mandatory final
//! fallback. A resolved [`LocaleProvider`] answers term lookups and number,
//! ordinal, and date-part queries against the whole chain.

use crate::error::{Error, Result};
use citekit_csl::{
    DateForm, DatePart, DatePartForm, DatePartName, Formatting, Gender, Locale, LocaleDateFormat,
    NumberForm, Term, TermForm,
};
use std::collections::HashMap;

/// Language code of the built-in invariant locale.
pub const INVARIANT_LOCALE: &str = "en-US";

/// Registry of locale bundles, keyed by language code.
pub struct LocaleRegistry {
    locales: HashMap<String, Locale>,
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LocaleRegistry {
    /// A registry seeded with the invariant locale.
    pub fn new() -> Self {
        let mut locales = HashMap::new();
        locales.insert(INVARIANT_LOCALE.to_string(), invariant_locale());
        Self { locales }
    }

    /// Register a locale under its language code. Registering under the
    /// invariant code replaces the built-in data.
    pub fn register(&mut self, locale: Locale) {
        let lang = locale
            .lang
            .clone()
            .unwrap_or_else(|| INVARIANT_LOCALE.to_string());
        self.locales.insert(lang, locale);
    }

    /// Resolve a language code into a provider chain.
    ///
    /// The chain contains the exact dialect when registered, then the bare
    /// language, then the invariant locale. The invariant must be present.
    pub fn resolve(&self, lang: &str) -> Result<LocaleProvider<'_>> {
        let invariant = self
            .locales
            .get(INVARIANT_LOCALE)
            .ok_or_else(|| Error::LocaleNotFound {
                locale: lang.to_string(),
            })?;

        let mut chain: Vec<&Locale> = Vec::with_capacity(3);
        if let Some(exact) = self.locales.get(lang) {
            chain.push(exact);
        } else {
            tracing::debug!(locale = lang, "no exact locale, falling back");
        }
        if let Some(base) = lang.split('-').next() {
            if base != lang {
                if let Some(base_locale) = self.locales.get(base) {
                    chain.push(base_locale);
                }
            }
        }
        if lang != INVARIANT_LOCALE {
            chain.push(invariant);
        } else if chain.is_empty() {
            chain.push(invariant);
        }

        Ok(LocaleProvider { chain })
    }
}

/// A resolved locale chain.
pub struct LocaleProvider<'a> {
    chain: Vec<&'a Locale>,
}

impl<'a> LocaleProvider<'a> {
    /// Look up a term. Falls back to the long form within each locale
    /// before moving down the chain.
    pub fn term(&self, name: &str, form: TermForm, plural: bool) -> Option<String> {
        for locale in &self.chain {
            if let Some(text) = term_in_locale(locale, name, form, plural, GenderFilter::Any) {
                return Some(text);
            }
        }
        None
    }

    /// The grammatical gender a locale assigns to a term, if any.
    pub fn term_gender(&self, name: &str) -> Option<Gender> {
        for locale in &self.chain {
            for term in &locale.terms {
                if term.name == name {
                    if let Some(gender) = term.gender {
                        return Some(gender);
                    }
                }
            }
        }
        None
    }

    /// Format a single number.
    pub fn format_number(&self, n: u32, form: NumberForm, gender: Option<Gender>) -> Result<String> {
        match form {
            NumberForm::Numeric => Ok(n.to_string()),
            NumberForm::Ordinal => Ok(self.format_ordinal(n, gender)),
            NumberForm::LongOrdinal => Ok(self.format_long_ordinal(n, gender)),
            NumberForm::Roman => roman_numeral(n),
        }
    }

    /// Format an ordinal number ("1st", "2nd", ...).
    ///
    /// The suffix comes from the `ordinal-NN` terms: the last two digits
    /// are matched first, then the last digit, then the generic `ordinal`
    /// term. Ordinal terms are inherited as a whole set, so the first
    /// locale in the chain that defines any of them answers alone.
    pub fn format_ordinal(&self, n: u32, gender: Option<Gender>) -> String {
        let suffix = self
            .ordinal_locale()
            .and_then(|locale| ordinal_suffix(locale, n, gender))
            .unwrap_or_default();
        format!("{}{}", n, suffix)
    }

    /// Format a long ordinal ("first", "second", ...). Falls back to the
    /// numeric ordinal beyond the locale's long-ordinal terms.
    pub fn format_long_ordinal(&self, n: u32, gender: Option<Gender>) -> String {
        if (1..=10).contains(&n) {
            if let Some(locale) = self.ordinal_locale() {
                let name = format!("long-ordinal-{:02}", n);
                if let Some(word) = gendered_in_locale(locale, &name, gender) {
                    return word;
                }
            }
        }
        self.format_ordinal(n, gender)
    }

    /// The locale whose ordinal term set is in effect.
    fn ordinal_locale(&self) -> Option<&'a Locale> {
        self.chain.iter().copied().find(|locale| {
            locale.terms.iter().any(|t| {
                t.name == "ordinal"
                    || t.name.starts_with("ordinal-")
                    || t.name.starts_with("long-ordinal-")
            })
        })
    }

    /// The locale's date-part list for a localized date form.
    pub fn date_parts(&self, form: DateForm) -> Result<&[DatePart]> {
        for locale in &self.chain {
            for df in &locale.date_formats {
                if df.form == form {
                    return Ok(&df.parts);
                }
            }
        }
        Err(Error::UnsupportedFormat {
            message: format!("no {:?} date format in locale chain", form),
        })
    }

    /// Whether only day 1 receives an ordinal suffix.
    pub fn limit_day_ordinals_to_day1(&self) -> bool {
        self.chain
            .first()
            .map(|l| l.options.limit_day_ordinals_to_day1)
            .unwrap_or(false)
    }

    /// Whether trailing punctuation moves inside quotes.
    pub fn punctuation_in_quote(&self) -> bool {
        self.chain
            .first()
            .map(|l| l.options.punctuation_in_quote)
            .unwrap_or(false)
    }

    /// Delimiter between the endpoints of a collapsed page range.
    pub fn page_range_delimiter(&self) -> String {
        self.term("page-range-delimiter", TermForm::Long, true)
            .unwrap_or_else(|| "\u{2013}".to_string())
    }

    /// Outer or inner quote pair, depending on nesting depth.
    pub fn quotes(&self, inner: bool) -> (String, String) {
        if inner {
            (
                self.term("open-inner-quote", TermForm::Long, false)
                    .unwrap_or_else(|| "\u{2018}".to_string()),
                self.term("close-inner-quote", TermForm::Long, false)
                    .unwrap_or_else(|| "\u{2019}".to_string()),
            )
        } else {
            (
                self.term("open-quote", TermForm::Long, false)
                    .unwrap_or_else(|| "\u{201C}".to_string()),
                self.term("close-quote", TermForm::Long, false)
                    .unwrap_or_else(|| "\u{201D}".to_string()),
            )
        }
    }
}

/// Gender requirement for a term lookup.
#[derive(Clone, Copy)]
enum GenderFilter {
    /// Any term matches, regardless of gender.
    Any,
    /// The term's gender must be exactly this.
    Exactly(Option<Gender>),
}

impl GenderFilter {
    fn accepts(self, gender: Option<Gender>) -> bool {
        match self {
            GenderFilter::Any => true,
            GenderFilter::Exactly(wanted) => gender == wanted,
        }
    }
}

/// The ordinal suffix for a number within one locale's term set.
fn ordinal_suffix(locale: &Locale, n: u32, gender: Option<Gender>) -> Option<String> {
    gendered_in_locale(locale, &format!("ordinal-{:02}", n % 100), gender)
        .or_else(|| gendered_in_locale(locale, &format!("ordinal-{:02}", n % 10), gender))
        .or_else(|| gendered_in_locale(locale, "ordinal", gender))
}

/// Look up a term in one locale, preferring a gender match, then an
/// ungendered term.
fn gendered_in_locale(locale: &Locale, name: &str, gender: Option<Gender>) -> Option<String> {
    if let Some(gender) = gender {
        if let Some(text) = term_in_locale(
            locale,
            name,
            TermForm::Long,
            false,
            GenderFilter::Exactly(Some(gender)),
        ) {
            return Some(text);
        }
    }
    term_in_locale(locale, name, TermForm::Long, false, GenderFilter::Exactly(None))
}

/// Term lookup inside a single locale: exact form first, then the long
/// form; honors a gender requirement when one is given.
fn term_in_locale(
    locale: &Locale,
    name: &str,
    form: TermForm,
    plural: bool,
    gender: GenderFilter,
) -> Option<String> {
    let find = |want_form: TermForm| -> Option<String> {
        locale
            .terms
            .iter()
            .find(|t| t.name == name && t.form == want_form && gender.accepts(t.gender))
            .and_then(|t| term_value(t, plural))
    };

    find(form).or_else(|| {
        if form != TermForm::Long {
            find(TermForm::Long)
        } else {
            None
        }
    })
}

/// Pick the appropriate text out of a term.
fn term_value(term: &Term, plural: bool) -> Option<String> {
    if plural {
        term.multiple
            .clone()
            .or_else(|| term.value.clone())
            .or_else(|| term.single.clone())
    } else {
        term.single
            .clone()
            .or_else(|| term.value.clone())
            .or_else(|| term.multiple.clone())
    }
}

/// Render a number as lowercase roman numerals.
fn roman_numeral(n: u32) -> Result<String> {
    if n == 0 {
        return Err(Error::UnsupportedFormat {
            message: "roman numerals are undefined for zero".to_string(),
        });
    }

    const DIGITS: &[(u32, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];

    let mut remaining = n;
    let mut out = String::new();
    for &(value, digits) in DIGITS {
        while remaining >= value {
            out.push_str(digits);
            remaining -= value;
        }
    }
    Ok(out)
}

/// The built-in invariant locale (en-US).
///
/// The era terms carry a leading space so that renderers can append them
/// directly after the year.
fn invariant_locale() -> Locale {
    let mut terms = vec![
        Term::simple("and", TermForm::Long, "and"),
        Term::simple("and", TermForm::Symbol, "&"),
        Term::simple("et-al", TermForm::Long, "et al."),
        Term::simple("open-quote", TermForm::Long, "\u{201C}"),
        Term::simple("close-quote", TermForm::Long, "\u{201D}"),
        Term::simple("open-inner-quote", TermForm::Long, "\u{2018}"),
        Term::simple("close-inner-quote", TermForm::Long, "\u{2019}"),
        Term::simple("page-range-delimiter", TermForm::Long, "\u{2013}"),
        Term::simple("bc", TermForm::Long, " BC"),
        Term::simple("ad", TermForm::Long, " AD"),
        Term::simple("no date", TermForm::Long, "no date"),
        Term::simple("no date", TermForm::Short, "n.d."),
        Term::pair("page", TermForm::Long, "page", "pages"),
        Term::pair("page", TermForm::Short, "p.", "pp."),
        Term::pair("volume", TermForm::Long, "volume", "volumes"),
        Term::pair("volume", TermForm::Short, "vol.", "vols."),
        Term::pair("issue", TermForm::Long, "issue", "issues"),
        Term::pair("issue", TermForm::Short, "no.", "nos."),
        Term::pair("chapter", TermForm::Long, "chapter", "chapters"),
        Term::pair("chapter", TermForm::Short, "chap.", "chaps."),
        Term::pair("section", TermForm::Long, "section", "sections"),
        Term::pair("section", TermForm::Short, "sec.", "secs."),
        Term::pair("edition", TermForm::Long, "edition", "editions"),
        Term::pair("edition", TermForm::Short, "ed.", "eds."),
        Term::pair("editor", TermForm::Long, "editor", "editors"),
        Term::pair("editor", TermForm::Short, "ed.", "eds."),
        Term::pair("translator", TermForm::Long, "translator", "translators"),
        Term::pair("translator", TermForm::Short, "trans.", "trans."),
        Term::pair(
            "editor-translator",
            TermForm::Long,
            "editor & translator",
            "editors & translators",
        ),
        Term::pair(
            "editor-translator",
            TermForm::Short,
            "ed. & trans.",
            "eds. & trans.",
        ),
        // Ordinal suffixes; the two-digit terms catch 11/12/13.
        Term::simple("ordinal", TermForm::Long, "th"),
        Term::simple("ordinal-01", TermForm::Long, "st"),
        Term::simple("ordinal-02", TermForm::Long, "nd"),
        Term::simple("ordinal-03", TermForm::Long, "rd"),
        Term::simple("ordinal-11", TermForm::Long, "th"),
        Term::simple("ordinal-12", TermForm::Long, "th"),
        Term::simple("ordinal-13", TermForm::Long, "th"),
    ];

    const LONG_ORDINALS: &[&str] = &[
        "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
        "tenth",
    ];
    for (i, word) in LONG_ORDINALS.iter().enumerate() {
        terms.push(Term::simple(
            &format!("long-ordinal-{:02}", i + 1),
            TermForm::Long,
            word,
        ));
    }

    const MONTHS_LONG: &[&str] = &[
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    const MONTHS_SHORT: &[&str] = &[
        "Jan.", "Feb.", "Mar.", "Apr.", "May", "June", "July", "Aug.", "Sept.", "Oct.", "Nov.",
        "Dec.",
    ];
    for (i, (long, short)) in MONTHS_LONG.iter().zip(MONTHS_SHORT).enumerate() {
        let name = format!("month-{:02}", i + 1);
        terms.push(Term::simple(&name, TermForm::Long, long));
        terms.push(Term::simple(&name, TermForm::Short, short));
    }

    const SEASONS: &[&str] = &["Spring", "Summer", "Autumn", "Winter"];
    for (i, season) in SEASONS.iter().enumerate() {
        terms.push(Term::simple(
            &format!("season-{:02}", i + 1),
            TermForm::Long,
            season,
        ));
    }

    let text_date = LocaleDateFormat {
        form: DateForm::Text,
        parts: vec![
            DatePart {
                name: DatePartName::Month,
                form: Some(DatePartForm::Long),
                formatting: Formatting {
                    suffix: Some(" ".to_string()),
                    ..Default::default()
                },
            },
            DatePart {
                name: DatePartName::Day,
                form: Some(DatePartForm::Numeric),
                formatting: Formatting {
                    suffix: Some(", ".to_string()),
                    ..Default::default()
                },
            },
            DatePart::plain(DatePartName::Year, DatePartForm::Numeric),
        ],
    };

    let numeric_date = LocaleDateFormat {
        form: DateForm::Numeric,
        parts: vec![
            DatePart {
                name: DatePartName::Month,
                form: Some(DatePartForm::Numeric),
                formatting: Formatting {
                    suffix: Some("/".to_string()),
                    ..Default::default()
                },
            },
            DatePart {
                name: DatePartName::Day,
                form: Some(DatePartForm::Numeric),
                formatting: Formatting {
                    suffix: Some("/".to_string()),
                    ..Default::default()
                },
            },
            DatePart::plain(DatePartName::Year, DatePartForm::Numeric),
        ],
    };

    Locale {
        lang: Some(INVARIANT_LOCALE.to_string()),
        terms,
        date_formats: vec![text_date, numeric_date],
        options: citekit_csl::LocaleOptions {
            limit_day_ordinals_to_day1: false,
            punctuation_in_quote: true,
        },
    }
}
