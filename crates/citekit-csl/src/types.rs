//! Compiled CSL style and locale types.
//!
//! These types describe a style after compilation: the XML surface syntax is
//! gone, macros are resolved into a name → definition map, and every element
//! carries its formatting attributes directly. The renderer walks this tree.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A compiled CSL style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    /// Style class: in-text or note.
    pub class: StyleClass,

    /// Default locale for the style (e.g., "en-US").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,

    /// Style-level options.
    #[serde(default)]
    pub options: StyleOptions,

    /// Macro definitions, keyed by name.
    #[serde(default)]
    pub macros: HashMap<String, Macro>,

    /// Citation layout.
    pub citation: Layout,

    /// Bibliography layout (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bibliography: Option<Layout>,

    /// Style-level name formatting options.
    #[serde(default)]
    pub name_options: NameOptions,
}

/// Style class: determines citation format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleClass {
    /// In-text citations (author-date, numeric).
    InText,
    /// Note-based citations (footnotes, endnotes).
    Note,
}

/// Style-level options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleOptions {
    /// How to handle non-dropping particles when names are inverted.
    #[serde(default)]
    pub demote_non_dropping_particle: DemoteNonDroppingParticle,

    /// Join compound given-name initials with a hyphen ("G.-P." vs "G.P.").
    #[serde(default = "default_true")]
    pub initialize_with_hyphen: bool,

    /// Page range collapsing policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_range_format: Option<PageRangeFormat>,
}

fn default_true() -> bool {
    true
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            demote_non_dropping_particle: DemoteNonDroppingParticle::default(),
            initialize_with_hyphen: true,
            page_range_format: None,
        }
    }
}

/// Demote non-dropping particle option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemoteNonDroppingParticle {
    /// Never demote.
    Never,
    /// Demote for sorting only.
    #[default]
    SortOnly,
    /// Demote for display and sorting.
    DisplayAndSort,
}

/// Page range collapsing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageRangeFormat {
    Chicago,
    Expanded,
    Minimal,
    MinimalTwo,
}

/// A macro definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Macro {
    /// Macro name.
    pub name: String,
    /// Elements in this macro.
    pub elements: Vec<Element>,
}

/// A layout (for citation or bibliography).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    /// Formatting for the layout (affixes wrap each rendered entry).
    #[serde(default)]
    pub formatting: Formatting,

    /// Delimiter between cites within one citation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,

    /// Sort specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,

    /// Inheritable name options from the citation/bibliography element.
    #[serde(default)]
    pub name_options: NameOptions,

    /// Elements in the layout.
    pub elements: Vec<Element>,
}

/// Inheritable name formatting options.
///
/// These can be set on the style, a layout, or a names element and inherit
/// down to name rendering. More specific levels override general levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameOptions {
    /// Connector before the final name: a word, a symbol, or neither.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<NameAnd>,

    /// Delimiter between names within one variable ("name-delimiter").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_delimiter: Option<String>,

    /// Delimiter between name variables rendered by one names element
    /// ("names-delimiter").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names_delimiter: Option<String>,

    /// Whether the name delimiter precedes the last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter_precedes_last: Option<DelimiterBehavior>,

    /// Whether the name delimiter precedes the et-al term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter_precedes_et_al: Option<DelimiterBehavior>,

    /// Minimum name count that activates et-al truncation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub et_al_min: Option<u32>,

    /// Number of names rendered before et-al when truncation is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub et_al_use_first: Option<u32>,

    /// Render the last name after an ellipsis instead of the et-al term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub et_al_use_last: Option<bool>,

    /// Whether to break given names into initials. Defaults to true when
    /// `initialize_with` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialize: Option<bool>,

    /// String appended to each initial (e.g., ". ").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialize_with: Option<String>,

    /// Name form: long, short, or count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<NameForm>,

    /// Which names render inverted (family-first).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_as_sort_order: Option<NameAsSortOrder>,

    /// Separator between the family and given blocks of an inverted name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_separator: Option<String>,
}

impl NameOptions {
    /// Merge two option sets, with `self` taking precedence.
    ///
    /// Implements the CSL inheritance model where more specific levels
    /// (name → names → layout → style) override general levels.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            and: self.and.or(other.and),
            name_delimiter: self
                .name_delimiter
                .clone()
                .or_else(|| other.name_delimiter.clone()),
            names_delimiter: self
                .names_delimiter
                .clone()
                .or_else(|| other.names_delimiter.clone()),
            delimiter_precedes_last: self.delimiter_precedes_last.or(other.delimiter_precedes_last),
            delimiter_precedes_et_al: self
                .delimiter_precedes_et_al
                .or(other.delimiter_precedes_et_al),
            et_al_min: self.et_al_min.or(other.et_al_min),
            et_al_use_first: self.et_al_use_first.or(other.et_al_use_first),
            et_al_use_last: self.et_al_use_last.or(other.et_al_use_last),
            initialize: self.initialize.or(other.initialize),
            initialize_with: self
                .initialize_with
                .clone()
                .or_else(|| other.initialize_with.clone()),
            form: self.form.or(other.form),
            name_as_sort_order: self.name_as_sort_order.or(other.name_as_sort_order),
            sort_separator: self
                .sort_separator
                .clone()
                .or_else(|| other.sort_separator.clone()),
        }
    }
}

/// Name "and" connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameAnd {
    /// The localized "and" term.
    Text,
    /// An ampersand.
    Symbol,
}

/// Whether a delimiter precedes the last name or the et-al term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelimiterBehavior {
    #[default]
    Contextual,
    Always,
    Never,
    AfterInvertedName,
}

/// Name form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameForm {
    #[default]
    Long,
    Short,
    Count,
}

/// Which names are rendered inverted (family-first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameAsSortOrder {
    /// Only the first name is inverted.
    First,
    /// Every name is inverted.
    All,
}

/// Sort specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sort {
    /// Sort keys, most significant first.
    pub keys: Vec<SortKey>,
}

/// A single sort key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortKey {
    /// What the key is computed from.
    pub target: SortTarget,
    /// Sort direction for this key.
    #[serde(default)]
    pub order: SortOrder,
}

/// Source of a sort key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortTarget {
    Variable(String),
    Macro(String),
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A rendering element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// The element kind and its payload.
    pub kind: ElementKind,
    /// Formatting attributes.
    #[serde(default)]
    pub formatting: Formatting,
}

impl Element {
    /// Create an element with default formatting.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            formatting: Formatting::default(),
        }
    }

    /// Create an element with the given formatting.
    pub fn formatted(kind: ElementKind, formatting: Formatting) -> Self {
        Self { kind, formatting }
    }
}

/// Element kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Text(TextElement),
    Number(NumberElement),
    Label(LabelElement),
    Names(NamesElement),
    Date(DateElement),
    Group(GroupElement),
    Choose(ChooseElement),
}

/// Text element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextElement {
    /// Where the text comes from.
    pub source: TextSource,
}

/// Text source variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSource {
    /// A variable lookup.
    Variable {
        name: String,
        #[serde(default)]
        form: VariableForm,
    },
    /// A macro invocation.
    Macro { name: String },
    /// A localized term.
    Term {
        name: String,
        #[serde(default)]
        form: TermForm,
        #[serde(default)]
        plural: bool,
    },
    /// A literal value.
    Value { value: String },
}

/// Variable form for text elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableForm {
    #[default]
    Long,
    /// Prefer the `-short` variant of the variable when present.
    Short,
}

/// Term form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermForm {
    #[default]
    Long,
    Short,
    Verb,
    VerbShort,
    Symbol,
}

/// Number element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberElement {
    /// Variable name.
    pub variable: String,
    /// Number form.
    #[serde(default)]
    pub form: NumberForm,
}

/// Number form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberForm {
    #[default]
    Numeric,
    Ordinal,
    LongOrdinal,
    Roman,
}

/// Label element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelElement {
    /// Variable whose term is rendered.
    pub variable: String,
    /// Term form.
    #[serde(default)]
    pub form: TermForm,
    /// Plural handling.
    #[serde(default)]
    pub plural: LabelPlural,
}

/// Label plural handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPlural {
    #[default]
    Contextual,
    Always,
    Never,
}

/// Names element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamesElement {
    /// Variables to render (e.g., "author", "editor").
    pub variables: Vec<String>,

    /// Name formatting for this element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<NameSpec>,

    /// Label rendered after the names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<NamesLabel>,

    /// Elements tried in order when no variable yields names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitute: Option<Vec<Element>>,
}

/// Per-element name formatting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameSpec {
    /// Name options set on this element.
    #[serde(default)]
    pub options: NameOptions,

    /// Text case applied to family names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_case: Option<TextCase>,

    /// Text case applied to given names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_case: Option<TextCase>,
}

/// Label attached to a names element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamesLabel {
    /// Term form.
    #[serde(default)]
    pub form: TermForm,
    /// Plural handling. Contextual means plural when more than one name.
    #[serde(default)]
    pub plural: LabelPlural,
    /// Formatting (affixes, text case).
    #[serde(default)]
    pub formatting: Formatting,
}

/// Date element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateElement {
    /// Variable name.
    pub variable: String,

    /// Localized form. When set, the locale's date-part list for this form
    /// is used, merged with [`DateElement::parts`] overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<DateForm>,

    /// Which date parts may render.
    #[serde(default)]
    pub precision: DatePrecision,

    /// Date parts: the full list for non-localized dates, or per-part
    /// overrides (matched by name) for localized dates.
    #[serde(default)]
    pub parts: Vec<DatePart>,

    /// Delimiter between parts of a non-localized date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

/// Localized date form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateForm {
    #[default]
    Text,
    Numeric,
}

/// Which parts of a date may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePrecision {
    Year,
    YearMonth,
    #[default]
    YearMonthDay,
}

impl DatePrecision {
    /// Whether a part of the given name is visible at this precision.
    pub fn includes(self, part: DatePartName) -> bool {
        match part {
            DatePartName::Year => true,
            DatePartName::Month => matches!(self, Self::YearMonth | Self::YearMonthDay),
            DatePartName::Day => matches!(self, Self::YearMonthDay),
        }
    }
}

/// A date part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatePart {
    /// Part name.
    pub name: DatePartName,
    /// Part form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<DatePartForm>,
    /// Formatting (prefix, suffix, text case, strip-periods).
    #[serde(default)]
    pub formatting: Formatting,
}

impl DatePart {
    /// A date part with a name and form, no affixes.
    pub fn plain(name: DatePartName, form: DatePartForm) -> Self {
        Self {
            name,
            form: Some(form),
            formatting: Formatting::default(),
        }
    }
}

/// Date part name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePartName {
    Year,
    Month,
    Day,
}

/// Date part form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePartForm {
    Numeric,
    NumericLeadingZeros,
    Long,
    Short,
    Ordinal,
}

/// Group element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupElement {
    /// Child elements.
    pub elements: Vec<Element>,
    /// Delimiter between non-empty children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

/// Choose element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChooseElement {
    /// Branches in order: if, else-if..., else (an else branch has no
    /// conditions).
    pub branches: Vec<ChooseBranch>,
}

/// A branch of a choose element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChooseBranch {
    /// Conditions; empty for the else branch.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// How multiple conditions (and multi-value conditions) combine.
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Elements rendered when the branch is selected.
    pub elements: Vec<Element>,
}

/// Condition combination mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    #[default]
    All,
    Any,
    None,
}

/// A condition: a set test over item attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    /// Item type matches.
    Type(Vec<String>),
    /// Variable exists and is non-empty.
    Variable(Vec<String>),
    /// Variable content is numeric.
    IsNumeric(Vec<String>),
    /// Date variable is flagged uncertain.
    IsUncertainDate(Vec<String>),
    /// Locator label matches.
    Locator(Vec<String>),
    /// Cite position matches.
    Position(Vec<String>),
    /// Disambiguation requested.
    Disambiguate(bool),
}

/// Formatting attributes attached to an element.
///
/// The five font attributes are inherited down the rendering tree; affixes,
/// quotes, and text case apply to the element they are set on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_variant: Option<FontVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_case: Option<TextCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub quotes: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strip_periods: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl Formatting {
    /// Fill unset font attributes from a parent.
    ///
    /// Affixes, quotes, and text case are scoped to their own element and
    /// never inherited.
    pub fn inherit(&self, parent: &Formatting) -> Formatting {
        Formatting {
            font_style: self.font_style.or(parent.font_style),
            font_variant: self.font_variant.or(parent.font_variant),
            font_weight: self.font_weight.or(parent.font_weight),
            text_decoration: self.text_decoration.or(parent.text_decoration),
            vertical_align: self.vertical_align.or(parent.vertical_align),
            ..self.clone()
        }
    }

    /// The font attributes alone, without affixes, quotes, or case.
    pub fn font_only(&self) -> Formatting {
        Formatting {
            font_style: self.font_style,
            font_variant: self.font_variant,
            font_weight: self.font_weight,
            text_decoration: self.text_decoration,
            vertical_align: self.vertical_align,
            ..Formatting::default()
        }
    }

    /// Whether this formatting would wrap content (affixes, quotes, case,
    /// or strip-periods).
    pub fn wraps(&self) -> bool {
        self.prefix.is_some()
            || self.suffix.is_some()
            || self.quotes
            || self.text_case.is_some()
            || self.strip_periods
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontVariant {
    Normal,
    SmallCaps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    Normal,
    Bold,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    None,
    Underline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalAlign {
    Baseline,
    Sup,
    Sub,
}

/// Text case transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextCase {
    Lowercase,
    Uppercase,
    CapitalizeFirst,
    CapitalizeAll,
    Sentence,
    Title,
}

// ============================================================================
// Locale data
// ============================================================================

/// Locale data: terms, date formats, and locale options.
///
/// Produced by an external locale-XML parser (or constructed in code) and
/// registered with the renderer's locale registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Locale {
    /// Language code (e.g., "en", "en-US"). None for the invariant locale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Terms defined in this locale.
    #[serde(default)]
    pub terms: Vec<Term>,

    /// Localized date formats.
    #[serde(default)]
    pub date_formats: Vec<LocaleDateFormat>,

    /// Locale options.
    #[serde(default)]
    pub options: LocaleOptions,
}

/// A localized term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    /// Term name (e.g., "and", "editor", "month-01").
    pub name: String,
    /// Term form.
    #[serde(default)]
    pub form: TermForm,
    /// Singular text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single: Option<String>,
    /// Plural text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<String>,
    /// Simple value when the term has no singular/plural split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Grammatical gender, where the locale assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl Term {
    /// A term with a single undifferentiated value.
    pub fn simple(name: &str, form: TermForm, value: &str) -> Self {
        Self {
            name: name.to_string(),
            form,
            single: None,
            multiple: None,
            value: Some(value.to_string()),
            gender: None,
        }
    }

    /// A term with singular and plural texts.
    pub fn pair(name: &str, form: TermForm, single: &str, multiple: &str) -> Self {
        Self {
            name: name.to_string(),
            form,
            single: Some(single.to_string()),
            multiple: Some(multiple.to_string()),
            value: None,
            gender: None,
        }
    }

    /// Attach a gender to this term.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

/// Grammatical gender of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Masculine,
    Feminine,
}

/// A locale's date format for one form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleDateFormat {
    /// Date form this format applies to.
    pub form: DateForm,
    /// Ordered date parts with their affixes.
    pub parts: Vec<DatePart>,
}

/// Locale options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleOptions {
    /// Only day 1 receives an ordinal suffix.
    #[serde(default)]
    pub limit_day_ordinals_to_day1: bool,

    /// Trailing punctuation moves inside quotes.
    #[serde(default)]
    pub punctuation_in_quote: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_options_merge_specific_wins() {
        let specific = NameOptions {
            et_al_min: Some(3),
            name_delimiter: Some("; ".to_string()),
            ..Default::default()
        };
        let general = NameOptions {
            et_al_min: Some(5),
            et_al_use_first: Some(1),
            name_delimiter: Some(", ".to_string()),
            and: Some(NameAnd::Text),
            ..Default::default()
        };

        let merged = specific.merge(&general);
        assert_eq!(merged.et_al_min, Some(3));
        assert_eq!(merged.et_al_use_first, Some(1));
        assert_eq!(merged.name_delimiter, Some("; ".to_string()));
        assert_eq!(merged.and, Some(NameAnd::Text));
    }

    #[test]
    fn test_formatting_inherit_font_attributes_only() {
        let parent = Formatting {
            font_style: Some(FontStyle::Italic),
            font_weight: Some(FontWeight::Bold),
            prefix: Some("(".to_string()),
            ..Default::default()
        };
        let child = Formatting {
            font_weight: Some(FontWeight::Normal),
            suffix: Some(")".to_string()),
            ..Default::default()
        };

        let inherited = child.inherit(&parent);
        assert_eq!(inherited.font_style, Some(FontStyle::Italic));
        assert_eq!(inherited.font_weight, Some(FontWeight::Normal));
        // Affixes are scoped, never inherited.
        assert_eq!(inherited.prefix, None);
        assert_eq!(inherited.suffix, Some(")".to_string()));
    }

    #[test]
    fn test_date_precision_includes() {
        assert!(DatePrecision::Year.includes(DatePartName::Year));
        assert!(!DatePrecision::Year.includes(DatePartName::Month));
        assert!(DatePrecision::YearMonth.includes(DatePartName::Month));
        assert!(!DatePrecision::YearMonth.includes(DatePartName::Day));
        assert!(DatePrecision::YearMonthDay.includes(DatePartName::Day));
    }

    #[test]
    fn test_style_json_round_trip() {
        let style = Style {
            class: StyleClass::InText,
            default_locale: Some("en-US".to_string()),
            options: StyleOptions::default(),
            macros: HashMap::new(),
            citation: Layout {
                formatting: Formatting {
                    prefix: Some("(".to_string()),
                    suffix: Some(")".to_string()),
                    ..Default::default()
                },
                delimiter: Some("; ".to_string()),
                sort: None,
                name_options: NameOptions::default(),
                elements: vec![Element::new(ElementKind::Text(TextElement {
                    source: TextSource::Variable {
                        name: "title".to_string(),
                        form: VariableForm::Short,
                    },
                }))],
            },
            bibliography: None,
            name_options: NameOptions::default(),
        };

        let json = serde_json::to_string(&style).unwrap();
        let back: Style = serde_json::from_str(&json).unwrap();
        assert_eq!(back.class, StyleClass::InText);
        assert_eq!(back.citation.delimiter, Some("; ".to_string()));
        match &back.citation.elements[0].kind {
            ElementKind::Text(t) => match &t.source {
                TextSource::Variable { name, form } => {
                    assert_eq!(name, "title");
                    assert_eq!(*form, VariableForm::Short);
                }
                other => panic!("unexpected source: {:?}", other),
            },
            other => panic!("unexpected element: {:?}", other),
        }
    }

    #[test]
    fn test_term_constructors() {
        let t = Term::pair("editor", TermForm::Short, "ed.", "eds.");
        assert_eq!(t.single.as_deref(), Some("ed."));
        assert_eq!(t.multiple.as_deref(), Some("eds."));

        let g = Term::simple("month-01", TermForm::Long, "January").with_gender(Gender::Masculine);
        assert_eq!(g.gender, Some(Gender::Masculine));
    }
}
