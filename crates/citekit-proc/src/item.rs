//! Typed variable model over item data.
//!
//! Items are opaque to the rendering core and reached only through the
//! accessor capability defined here: [`ItemData::get`] returns a tagged
//! [`Value`], and the typed accessors (`get_as_number`, `get_as_date`,
//! `get_as_names`) refine it. Every site in the evaluator that needs to
//! distinguish a number from a string or a name list is a match arm over
//! these sums.
//!
//! [`Item`] is the bundled CSL-JSON-shaped implementation: a field map
//! deserialized with serde, classifying values by shape (arrays are name
//! lists, objects with `date-parts` are dates).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain text.
    Text(String),
    /// A number or numeric range.
    Number(NumberVar),
    /// A date, possibly a range, possibly a literal string.
    Date(DateValue),
    /// A list of names.
    Names(Vec<NameOrLiteral>),
}

impl Value {
    /// A plain-text rendering of the value, for contexts that expect text.
    pub fn display_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => n.display_text(),
            Value::Date(DateValue::Literal(s)) => s.clone(),
            Value::Date(DateValue::Structured(d)) => d.display_text(),
            Value::Names(names) => names
                .iter()
                .map(NameOrLiteral::display_text)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// A numeric variable: a single number (`min == max`) or a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberVar {
    pub min: u32,
    pub max: u32,
    pub separator: NumberSeparator,
}

impl NumberVar {
    /// A single number.
    pub fn single(n: u32) -> Self {
        Self {
            min: n,
            max: n,
            separator: NumberSeparator::Hyphen,
        }
    }

    /// A range with the given separator.
    pub fn range(min: u32, max: u32, separator: NumberSeparator) -> Self {
        Self {
            min,
            max,
            separator,
        }
    }

    /// Whether this is a genuine range.
    pub fn is_range(&self) -> bool {
        self.min != self.max
    }

    fn display_text(&self) -> String {
        if self.is_range() {
            format!(
                "{}{}{}",
                self.min,
                self.separator.display_text(),
                self.max
            )
        } else {
            self.min.to_string()
        }
    }
}

/// Separator of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberSeparator {
    Hyphen,
    Ampersand,
    Comma,
}

impl NumberSeparator {
    /// The separator rendered with its spacing: `&` is padded on both
    /// sides, `,` is followed by one space, `-` is bare.
    pub fn display_text(self) -> &'static str {
        match self {
            NumberSeparator::Hyphen => "-",
            NumberSeparator::Ampersand => " & ",
            NumberSeparator::Comma => ", ",
        }
    }
}

/// A date variable: either a literal string or a structured date.
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    Literal(String),
    Structured(DateVar),
}

/// A structured date, always stored as a range; a single date has equal
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateVar {
    pub year_from: i32,
    pub year_to: i32,
    pub month_from: Option<u8>,
    pub month_to: Option<u8>,
    pub day_from: Option<u8>,
    pub day_to: Option<u8>,
    pub season_from: Option<Season>,
    pub season_to: Option<Season>,
    /// Approximate date ("circa").
    pub uncertain: bool,
}

impl DateVar {
    /// A single year.
    pub fn year(year: i32) -> Self {
        Self {
            year_from: year,
            year_to: year,
            ..Default::default()
        }
    }

    /// A single year-month date.
    pub fn year_month(year: i32, month: u8) -> Self {
        Self {
            year_from: year,
            year_to: year,
            month_from: Some(month),
            month_to: Some(month),
            ..Default::default()
        }
    }

    /// A single year-month-day date.
    pub fn ymd(year: i32, month: u8, day: u8) -> Self {
        Self {
            year_from: year,
            year_to: year,
            month_from: Some(month),
            month_to: Some(month),
            day_from: Some(day),
            day_to: Some(day),
            ..Default::default()
        }
    }

    /// A range between two structured dates.
    pub fn range(from: DateVar, to: DateVar) -> Self {
        Self {
            year_from: from.year_from,
            year_to: to.year_from,
            month_from: from.month_from,
            month_to: to.month_from,
            day_from: from.day_from,
            day_to: to.day_from,
            season_from: from.season_from,
            season_to: to.season_from,
            uncertain: from.uncertain || to.uncertain,
        }
    }

    /// The starting endpoint.
    pub fn from_endpoint(&self) -> DateEndpoint {
        DateEndpoint {
            year: self.year_from,
            month: self.month_from,
            day: self.day_from,
            season: self.season_from,
        }
    }

    /// The ending endpoint.
    pub fn to_endpoint(&self) -> DateEndpoint {
        DateEndpoint {
            year: self.year_to,
            month: self.month_to,
            day: self.day_to,
            season: self.season_to,
        }
    }

    /// Whether the endpoints differ.
    pub fn is_range(&self) -> bool {
        self.from_endpoint() != self.to_endpoint()
    }

    /// Precision of the starting endpoint. A season counts as monthly
    /// precision, since it renders in the month slot.
    pub fn precision(&self) -> citekit_csl::DatePrecision {
        if self.day_from.is_some() {
            citekit_csl::DatePrecision::YearMonthDay
        } else if self.month_from.is_some() || self.season_from.is_some() {
            citekit_csl::DatePrecision::YearMonth
        } else {
            citekit_csl::DatePrecision::Year
        }
    }

    fn display_text(&self) -> String {
        let endpoint = |e: DateEndpoint| {
            let mut s = e.year.to_string();
            if let Some(m) = e.month {
                s.push_str(&format!("-{:02}", m));
                if let Some(d) = e.day {
                    s.push_str(&format!("-{:02}", d));
                }
            }
            s
        };
        if self.is_range() {
            format!(
                "{}\u{2013}{}",
                endpoint(self.from_endpoint()),
                endpoint(self.to_endpoint())
            )
        } else {
            endpoint(self.from_endpoint())
        }
    }
}

/// One endpoint of a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateEndpoint {
    pub year: i32,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub season: Option<Season>,
}

/// A season, used when a date has seasonal rather than monthly precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// The locale term index of this season (season-01 through season-04).
    pub fn term_index(self) -> u8 {
        match self {
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Autumn => 3,
            Season::Winter => 4,
        }
    }

    fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Autumn),
            4 => Some(Season::Winter),
            _ => None,
        }
    }
}

/// An entry in a name list: a personal name or an institutional literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameOrLiteral {
    Literal {
        literal: String,
    },
    Name(PersonName),
}

impl NameOrLiteral {
    /// A literal (institutional) name.
    pub fn literal(s: &str) -> Self {
        NameOrLiteral::Literal {
            literal: s.to_string(),
        }
    }

    /// A personal name with family and given parts.
    pub fn person(family: &str, given: &str) -> Self {
        NameOrLiteral::Name(PersonName {
            family: Some(family.to_string()),
            given: Some(given.to_string()),
            ..Default::default()
        })
    }

    fn display_text(&self) -> String {
        match self {
            NameOrLiteral::Literal { literal } => literal.clone(),
            NameOrLiteral::Name(n) => n.sort_text(),
        }
    }

    /// The stringification used for sort keys and for deciding whether two
    /// name lists are equal (editor-translator merging).
    pub fn sort_text(&self) -> String {
        self.display_text()
    }
}

/// A personal name in CSL-JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,

    #[serde(
        rename = "dropping-particle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dropping_particles: Option<String>,

    #[serde(
        rename = "non-dropping-particle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub non_dropping_particles: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Whether a comma precedes the suffix.
    #[serde(
        rename = "comma-suffix",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub comma_suffix: Option<bool>,
}

impl PersonName {
    /// Whether the suffix is preceded by a comma (the default).
    pub fn precede_suffix_by_comma(&self) -> bool {
        self.comma_suffix.unwrap_or(true)
    }

    /// Sort-key stringification: family, given, particles, suffix joined
    /// by spaces, skipping empty components.
    pub fn sort_text(&self) -> String {
        [
            self.family.as_deref(),
            self.given.as_deref(),
            self.dropping_particles.as_deref(),
            self.non_dropping_particles.as_deref(),
            self.suffix.as_deref(),
        ]
        .iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Result of a typed number lookup: a parsed range or the raw text when the
/// content is not numeric.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberValue {
    Parsed(NumberVar),
    Literal(String),
}

/// The accessor capability the rendering core consumes.
///
/// Accessors return `None` for missing variables. A request for
/// `"<var>-short"` is honored by returning that variant when present,
/// otherwise the full variable.
pub trait ItemData {
    /// Look up a variable.
    fn get(&self, name: &str) -> Option<Value>;

    /// Look up a variable as a number, parsing numeric strings.
    fn get_as_number(&self, name: &str) -> Option<NumberValue> {
        match self.get(name)? {
            Value::Number(n) => Some(NumberValue::Parsed(n)),
            Value::Text(s) => Some(match parse_number_var(&s) {
                Some(n) => NumberValue::Parsed(n),
                None => NumberValue::Literal(s),
            }),
            _ => None,
        }
    }

    /// Look up a variable as a date.
    fn get_as_date(&self, name: &str) -> Option<DateValue> {
        match self.get(name)? {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Look up a variable as a name list.
    fn get_as_names(&self, name: &str) -> Option<Vec<NameOrLiteral>> {
        match self.get(name)? {
            Value::Names(names) => Some(names),
            _ => None,
        }
    }
}

/// Parse a string into a [`NumberVar`]: digits with at most one separator
/// from `-`, `&`, `,`.
pub fn parse_number_var(s: &str) -> Option<NumberVar> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(n) = trimmed.parse::<u32>() {
        return Some(NumberVar::single(n));
    }

    for (ch, separator) in [
        ('-', NumberSeparator::Hyphen),
        ('&', NumberSeparator::Ampersand),
        (',', NumberSeparator::Comma),
    ] {
        if trimmed.matches(ch).count() == 1 {
            let (lhs, rhs) = trimmed.split_once(ch).unwrap();
            let min = lhs.trim().parse::<u32>().ok()?;
            let max = rhs.trim().parse::<u32>().ok()?;
            return Some(NumberVar::range(min, max, separator));
        }
    }

    None
}

/// A CSL-JSON-shaped item: a flat field map classified by value shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type", default)]
    pub item_type: String,

    #[serde(flatten)]
    fields: BTreeMap<String, serde_json::Value>,
}

impl Item {
    /// An empty item with an id and type.
    pub fn new(id: &str, item_type: &str) -> Self {
        Self {
            id: id.to_string(),
            item_type: item_type.to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field from a JSON value.
    pub fn set(&mut self, name: &str, value: serde_json::Value) -> &mut Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Set a text field.
    pub fn set_text(&mut self, name: &str, value: &str) -> &mut Self {
        self.set(name, serde_json::Value::String(value.to_string()))
    }

    fn raw(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    fn classify(&self, raw: &serde_json::Value) -> Option<Value> {
        match raw {
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Number(n) => {
                let i = n.as_i64()?;
                if i >= 0 && i <= u32::MAX as i64 {
                    Some(Value::Number(NumberVar::single(i as u32)))
                } else {
                    Some(Value::Text(i.to_string()))
                }
            }
            serde_json::Value::Array(_) => {
                let names: Vec<NameOrLiteral> = serde_json::from_value(raw.clone()).ok()?;
                Some(Value::Names(names))
            }
            serde_json::Value::Object(obj) => {
                if let Some(serde_json::Value::String(lit)) = obj.get("literal") {
                    return Some(Value::Date(DateValue::Literal(lit.clone())));
                }
                parse_structured_date(obj).map(|d| Value::Date(DateValue::Structured(d)))
            }
            _ => None,
        }
    }
}

impl ItemData for Item {
    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "type" => {
                if self.item_type.is_empty() {
                    None
                } else {
                    Some(Value::Text(self.item_type.clone()))
                }
            }
            "id" => {
                if self.id.is_empty() {
                    None
                } else {
                    Some(Value::Text(self.id.clone()))
                }
            }
            _ => {
                let raw = self.raw(name).or_else(|| {
                    // A "-short" request falls back to the full variable.
                    name.strip_suffix("-short").and_then(|base| self.raw(base))
                })?;
                self.classify(raw)
            }
        }
    }
}

/// Parse a CSL-JSON date object: `date-parts` with one or two endpoints,
/// optional `season` and `circa`.
fn parse_structured_date(obj: &serde_json::Map<String, serde_json::Value>) -> Option<DateVar> {
    let parts = obj.get("date-parts")?.as_array()?;
    let from = parse_date_endpoint(parts.first()?)?;
    let to = parts.get(1).and_then(parse_date_endpoint);

    let season = obj
        .get("season")
        .and_then(|v| v.as_i64())
        .and_then(Season::from_number);
    let uncertain = obj
        .get("circa")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let (year_to, month_to, day_to) = match to {
        Some((y, m, d)) => (y, m, d),
        None => (from.0, from.1, from.2),
    };

    Some(DateVar {
        year_from: from.0,
        year_to,
        month_from: from.1,
        month_to,
        day_from: from.2,
        day_to,
        season_from: season,
        season_to: if to.is_some() { None } else { season },
        uncertain,
    })
}

fn parse_date_endpoint(v: &serde_json::Value) -> Option<(i32, Option<u8>, Option<u8>)> {
    let arr = v.as_array()?;
    let num = |idx: usize| -> Option<i64> {
        arr.get(idx).and_then(|p| {
            p.as_i64()
                .or_else(|| p.as_str().and_then(|s| s.parse().ok()))
        })
    };
    let year = num(0)? as i32;
    let month = num(1).filter(|&m| (1..=12).contains(&m)).map(|m| m as u8);
    let day = num(2).filter(|&d| (1..=31).contains(&d)).map(|d| d as u8);
    Some((year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(fields: serde_json::Value) -> Item {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn test_text_variable() {
        let it = item(json!({
            "id": "smith2020",
            "type": "book",
            "title": "A Great Book"
        }));
        assert_eq!(
            it.get("title"),
            Some(Value::Text("A Great Book".to_string()))
        );
        assert_eq!(it.get("publisher"), None);
    }

    #[test]
    fn test_short_variant_preferred_with_fallback() {
        let it = item(json!({
            "id": "x",
            "title": "The Complete Title",
            "title-short": "Short"
        }));
        assert_eq!(
            it.get("title-short"),
            Some(Value::Text("Short".to_string()))
        );

        let no_short = item(json!({"id": "x", "title": "The Complete Title"}));
        assert_eq!(
            no_short.get("title-short"),
            Some(Value::Text("The Complete Title".to_string()))
        );
    }

    #[test]
    fn test_parse_number_var() {
        assert_eq!(parse_number_var("42"), Some(NumberVar::single(42)));
        assert_eq!(
            parse_number_var("12-45"),
            Some(NumberVar::range(12, 45, NumberSeparator::Hyphen))
        );
        assert_eq!(
            parse_number_var("12 & 13"),
            Some(NumberVar::range(12, 13, NumberSeparator::Ampersand))
        );
        assert_eq!(
            parse_number_var("12, 19"),
            Some(NumberVar::range(12, 19, NumberSeparator::Comma))
        );
        assert_eq!(parse_number_var("12-13-14"), None);
        assert_eq!(parse_number_var("iv"), None);
    }

    #[test]
    fn test_get_as_number_parses_page_string() {
        let it = item(json!({"id": "x", "page": "321-328"}));
        assert_eq!(
            it.get_as_number("page"),
            Some(NumberValue::Parsed(NumberVar::range(
                321,
                328,
                NumberSeparator::Hyphen
            )))
        );

        let literal = item(json!({"id": "x", "page": "xii"}));
        assert_eq!(
            literal.get_as_number("page"),
            Some(NumberValue::Literal("xii".to_string()))
        );
    }

    #[test]
    fn test_structured_date() {
        let it = item(json!({
            "id": "x",
            "issued": {"date-parts": [[2020, 6, 15]]}
        }));
        let Some(DateValue::Structured(d)) = it.get_as_date("issued") else {
            panic!("expected structured date");
        };
        assert_eq!(d.year_from, 2020);
        assert_eq!(d.month_from, Some(6));
        assert_eq!(d.day_from, Some(15));
        assert!(!d.is_range());
        assert_eq!(d.precision(), citekit_csl::DatePrecision::YearMonthDay);
    }

    #[test]
    fn test_date_range_and_season() {
        let it = item(json!({
            "id": "x",
            "issued": {"date-parts": [[1999, 3], [1999, 5]]},
            "event-date": {"date-parts": [[2001]], "season": 2}
        }));
        let Some(DateValue::Structured(d)) = it.get_as_date("issued") else {
            panic!("expected structured date");
        };
        assert!(d.is_range());
        assert_eq!(d.month_to, Some(5));

        let Some(DateValue::Structured(ev)) = it.get_as_date("event-date") else {
            panic!("expected structured date");
        };
        assert_eq!(ev.season_from, Some(Season::Summer));
    }

    #[test]
    fn test_literal_date() {
        let it = item(json!({
            "id": "x",
            "issued": {"literal": "n.d."}
        }));
        assert_eq!(
            it.get_as_date("issued"),
            Some(DateValue::Literal("n.d.".to_string()))
        );
    }

    #[test]
    fn test_names_with_literal_entry() {
        let it = item(json!({
            "id": "x",
            "author": [
                {"family": "Smith", "given": "Alice"},
                {"literal": "Research Team"}
            ]
        }));
        let names = it.get_as_names("author").unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], NameOrLiteral::person("Smith", "Alice"));
        assert_eq!(names[1], NameOrLiteral::literal("Research Team"));
    }

    #[test]
    fn test_name_sort_text_skips_empty_components() {
        let name = PersonName {
            family: Some("Beethoven".to_string()),
            given: Some("Ludwig".to_string()),
            non_dropping_particles: Some("van".to_string()),
            ..Default::default()
        };
        assert_eq!(name.sort_text(), "Beethoven Ludwig van");
    }

    #[test]
    fn test_number_field_from_integer_json() {
        let it = item(json!({"id": "x", "volume": 7}));
        assert_eq!(it.get("volume"), Some(Value::Number(NumberVar::single(7))));
    }
}
