//! The rendering tree-walker.
//!
//! Walks a compiled style's element tree against one item, producing a
//! [`Fragment`] tree. Children render left to right; groups observe their
//! by-variable flags only after all children have rendered; choose
//! evaluates conditions left to right and renders only the selected
//! branch. Macros are tracked on a stack so that a cyclic macro graph
//! fails with [`Error::CycleDetected`] instead of recursing forever.

use crate::error::{Error, Result};
use crate::item::{
    parse_number_var, DateEndpoint, DateValue, DateVar, ItemData, NameOrLiteral, NumberValue,
    Value,
};
use crate::locale::LocaleProvider;
use crate::number::render_number;
use crate::output::{join_fragments, transform_case, Fragment};
use citekit_csl::{
    ChooseBranch, ChooseElement, Condition, DateElement, DatePart, DatePartForm, DatePartName,
    DatePrecision, Element, ElementKind, Formatting, GroupElement, LabelElement, LabelPlural,
    MatchMode, NameAnd, NameAsSortOrder, NameForm, NameOptions, NameSpec, NamesElement,
    NumberElement, NumberForm, Style, TermForm, TextCase, TextElement, TextSource, VariableForm,
};

/// The date range separator is always an en-dash.
const DATE_RANGE_DASH: &str = "\u{2013}";

/// Evaluation context for one item.
pub(crate) struct EvalContext<'a> {
    pub style: &'a Style,
    pub item: &'a dyn ItemData,
    pub locale: &'a LocaleProvider<'a>,
    /// Macros currently being expanded, for cycle detection.
    pub macro_stack: Vec<String>,
    /// True while computing sort keys; affects particle demotion.
    pub in_sort_key: bool,
    /// Name options of the enclosing names element, inherited by names
    /// elements inside a substitute block.
    pub substitute_options: Option<NameOptions>,
}

impl<'a> EvalContext<'a> {
    pub fn new(style: &'a Style, item: &'a dyn ItemData, locale: &'a LocaleProvider<'a>) -> Self {
        Self {
            style,
            item,
            locale,
            macro_stack: Vec::new(),
            in_sort_key: false,
            substitute_options: None,
        }
    }
}

/// Immutable formatting parameters threaded down the tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct Parameters {
    /// Inherited font attributes.
    pub formatting: Formatting,
    /// Merged inheritable name settings.
    pub name_options: NameOptions,
}

/// Evaluate a sequence of elements, joining non-empty results with a
/// delimiter.
pub(crate) fn evaluate_elements(
    ctx: &mut EvalContext,
    elements: &[Element],
    delimiter: &str,
    params: &Parameters,
) -> Result<Fragment> {
    let mut children = Vec::with_capacity(elements.len());
    for element in elements {
        children.push(evaluate_element(ctx, element, params)?);
    }
    Ok(Fragment::sequence(join_fragments(
        children,
        delimiter,
        &params.formatting,
    )))
}

/// Evaluate a single element and wrap it in the element's formatting.
pub(crate) fn evaluate_element(
    ctx: &mut EvalContext,
    element: &Element,
    params: &Parameters,
) -> Result<Fragment> {
    let mut effective = element.formatting.inherit(&params.formatting);
    // Title case only applies to English-language items.
    if effective.text_case == Some(TextCase::Title) && !title_case_applies(ctx) {
        effective.text_case = None;
    }
    let child_params = Parameters {
        formatting: effective.font_only(),
        name_options: params.name_options.clone(),
    };

    let inner = match &element.kind {
        ElementKind::Text(text_el) => evaluate_text(ctx, text_el, &child_params)?,
        ElementKind::Number(num_el) => evaluate_number(ctx, num_el, &child_params)?,
        ElementKind::Label(label_el) => evaluate_label(ctx, label_el, &child_params)?,
        ElementKind::Names(names_el) => evaluate_names(ctx, names_el, &child_params)?,
        ElementKind::Date(date_el) => evaluate_date(ctx, date_el, &child_params)?,
        ElementKind::Group(group_el) => evaluate_group(ctx, group_el, &child_params)?,
        ElementKind::Choose(choose_el) => evaluate_choose(ctx, choose_el, &child_params)?,
    };

    if inner.is_empty() {
        // Affixes never materialize around empty content; only the
        // by-variable flag survives.
        return Ok(if inner.consulted_variable() {
            Fragment::missing_variable()
        } else {
            Fragment::empty()
        });
    }

    Ok(if effective.wraps() {
        Fragment::wrapped(vec![inner], &effective)
    } else {
        inner
    })
}

/// Whether title case may be applied: items are assumed English unless
/// their `language` variable says otherwise.
fn title_case_applies(ctx: &EvalContext) -> bool {
    match ctx.item.get("language") {
        Some(Value::Text(lang)) => lang.is_empty() || lang.starts_with("en"),
        _ => true,
    }
}

// ============================================================================
// Text, macro, label, number
// ============================================================================

fn evaluate_text(
    ctx: &mut EvalContext,
    text_el: &TextElement,
    params: &Parameters,
) -> Result<Fragment> {
    match &text_el.source {
        TextSource::Value { value } => Ok(Fragment::text(value.clone(), params.formatting.clone())),

        TextSource::Term { name, form, plural } => {
            Ok(match ctx.locale.term(name, *form, *plural) {
                Some(term) => Fragment::text(term, params.formatting.clone()),
                None => Fragment::empty(),
            })
        }

        TextSource::Variable { name, form } => {
            let value = if *form == VariableForm::Short {
                ctx.item
                    .get(&format!("{}-short", name))
                    .or_else(|| ctx.item.get(name))
            } else {
                ctx.item.get(name)
            };

            let Some(value) = value else {
                return Ok(Fragment::missing_variable());
            };

            // Numeric content renders through the number renderer, which
            // also collapses page ranges.
            let numeric = match &value {
                Value::Number(n) => Some(*n),
                Value::Text(s) => parse_number_var(s),
                _ => None,
            };
            let text = match numeric {
                Some(n) => render_number(
                    &n,
                    NumberForm::Numeric,
                    ctx.locale.term_gender(name),
                    name,
                    ctx.style.options.page_range_format,
                    ctx.locale,
                )?,
                None => value.display_text(),
            };
            Ok(Fragment::variable_text(text, params.formatting.clone()))
        }

        TextSource::Macro { name } => evaluate_macro(ctx, name, params),
    }
}

/// Evaluate a macro for a sort key: the flattened plain text of its
/// descendants, with formatting stripped.
pub(crate) fn evaluate_macro_for_sort(
    ctx: &mut EvalContext,
    name: &str,
    params: &Parameters,
) -> Result<String> {
    ctx.in_sort_key = true;
    let result = evaluate_macro(ctx, name, params);
    ctx.in_sort_key = false;
    Ok(result?.plain_text())
}

/// Evaluate a macro. The macro itself is not by-variable; the flag comes
/// from its children.
fn evaluate_macro(ctx: &mut EvalContext, name: &str, params: &Parameters) -> Result<Fragment> {
    if ctx.macro_stack.iter().any(|m| m == name) {
        return Err(Error::CycleDetected {
            name: name.to_string(),
        });
    }

    let style = ctx.style;
    let Some(macro_def) = style.macros.get(name) else {
        return Ok(Fragment::empty());
    };

    ctx.macro_stack.push(name.to_string());
    let result = evaluate_elements(ctx, &macro_def.elements, "", params);
    ctx.macro_stack.pop();
    result
}

fn evaluate_label(
    ctx: &mut EvalContext,
    label_el: &LabelElement,
    params: &Parameters,
) -> Result<Fragment> {
    // The locator's term is its label type, not "locator" itself.
    let term_name = if label_el.variable == "locator" {
        if ctx.item.get("locator").is_none() {
            return Ok(Fragment::missing_variable());
        }
        match ctx.item.get("label") {
            Some(Value::Text(label)) => label,
            _ => "page".to_string(),
        }
    } else {
        if ctx.item.get(&label_el.variable).is_none() {
            return Ok(Fragment::missing_variable());
        }
        label_el.variable.clone()
    };

    let plural_source = if label_el.variable == "locator" {
        "locator"
    } else {
        label_el.variable.as_str()
    };
    let plural = match label_el.plural {
        LabelPlural::Always => true,
        LabelPlural::Never => false,
        LabelPlural::Contextual => match ctx.item.get_as_number(plural_source) {
            Some(NumberValue::Parsed(n)) => n.is_range(),
            _ => false,
        },
    };

    Ok(match ctx.locale.term(&term_name, label_el.form, plural) {
        Some(term) => Fragment::variable_text(term, params.formatting.clone()),
        None => Fragment::missing_variable(),
    })
}

fn evaluate_number(
    ctx: &mut EvalContext,
    num_el: &NumberElement,
    params: &Parameters,
) -> Result<Fragment> {
    match ctx.item.get_as_number(&num_el.variable) {
        None => Ok(Fragment::missing_variable()),
        Some(NumberValue::Literal(text)) => {
            if num_el.form == NumberForm::Numeric {
                Ok(Fragment::variable_text(text, params.formatting.clone()))
            } else {
                Err(Error::UnsupportedValueType {
                    variable: num_el.variable.clone(),
                    expected: "numeric",
                })
            }
        }
        Some(NumberValue::Parsed(n)) => {
            let text = render_number(
                &n,
                num_el.form,
                ctx.locale.term_gender(&num_el.variable),
                &num_el.variable,
                ctx.style.options.page_range_format,
                ctx.locale,
            )?;
            Ok(Fragment::variable_text(text, params.formatting.clone()))
        }
    }
}

// ============================================================================
// Group and choose
// ============================================================================

/// Evaluate a group.
///
/// If any descendant consulted a variable and every such descendant came
/// up empty, the whole group renders as empty. A group with no by-variable
/// descendants is never suppressed.
fn evaluate_group(
    ctx: &mut EvalContext,
    group_el: &GroupElement,
    params: &Parameters,
) -> Result<Fragment> {
    let mut children = Vec::with_capacity(group_el.elements.len());
    for element in &group_el.elements {
        children.push(evaluate_element(ctx, element, params)?);
    }

    let consulted = children.iter().any(Fragment::consulted_variable);
    let has_content = children.iter().any(Fragment::has_variable_content);
    if consulted && !has_content {
        tracing::trace!("group suppressed: all variable-sourced children empty");
        return Ok(Fragment::missing_variable());
    }

    let delimiter = group_el.delimiter.as_deref().unwrap_or("");
    Ok(Fragment::sequence(join_fragments(
        children,
        delimiter,
        &params.formatting,
    )))
}

fn evaluate_choose(
    ctx: &mut EvalContext,
    choose_el: &ChooseElement,
    params: &Parameters,
) -> Result<Fragment> {
    for branch in &choose_el.branches {
        if branch_matches(ctx, branch) {
            return evaluate_elements(ctx, &branch.elements, "", params);
        }
    }
    Ok(Fragment::empty())
}

fn branch_matches(ctx: &EvalContext, branch: &ChooseBranch) -> bool {
    if branch.conditions.is_empty() {
        // The else branch.
        return true;
    }

    match branch.match_mode {
        MatchMode::All => branch
            .conditions
            .iter()
            .all(|c| condition_holds(ctx, c, branch.match_mode)),
        MatchMode::Any => branch
            .conditions
            .iter()
            .any(|c| condition_holds(ctx, c, branch.match_mode)),
        MatchMode::None => !branch
            .conditions
            .iter()
            .any(|c| condition_holds(ctx, c, branch.match_mode)),
    }
}

/// Evaluate one condition. Multi-value conditions combine their values
/// with the branch's match mode: `all` requires every value to pass, the
/// others require any.
fn condition_holds(ctx: &EvalContext, condition: &Condition, mode: MatchMode) -> bool {
    let use_all = mode == MatchMode::All;
    let set_test = |values: &[String], test: &dyn Fn(&str) -> bool| {
        if use_all {
            values.iter().all(|v| test(v))
        } else {
            values.iter().any(|v| test(v))
        }
    };

    match condition {
        Condition::Type(types) => {
            let item_type = match ctx.item.get("type") {
                Some(Value::Text(t)) => t,
                _ => String::new(),
            };
            set_test(types, &|t| t == item_type)
        }
        Condition::Variable(vars) => set_test(vars, &|v| {
            ctx.item
                .get(v)
                .is_some_and(|value| !value.display_text().is_empty())
        }),
        Condition::IsNumeric(vars) => set_test(vars, &|v| {
            matches!(ctx.item.get_as_number(v), Some(NumberValue::Parsed(_)))
        }),
        Condition::IsUncertainDate(vars) => set_test(vars, &|v| {
            matches!(
                ctx.item.get_as_date(v),
                Some(DateValue::Structured(d)) if d.uncertain
            )
        }),
        Condition::Locator(types) => {
            let label = match ctx.item.get("label") {
                Some(Value::Text(l)) => Some(l),
                _ if ctx.item.get("locator").is_some() => Some("page".to_string()),
                _ => None,
            };
            match label {
                Some(label) => set_test(types, &|t| t == label),
                None => false,
            }
        }
        Condition::Position(positions) => {
            let position = match ctx.item.get("position") {
                Some(Value::Text(p)) => p,
                _ => return false,
            };
            set_test(positions, &|p| p == position)
        }
        Condition::Disambiguate(expected) => {
            let requested = matches!(
                ctx.item.get("disambiguate"),
                Some(Value::Text(t)) if t == "true" || t == "1"
            );
            requested == *expected
        }
    }
}

// ============================================================================
// Names
// ============================================================================

fn evaluate_names(
    ctx: &mut EvalContext,
    names_el: &NamesElement,
    params: &Parameters,
) -> Result<Fragment> {
    let effective = effective_name_options(ctx, names_el, params);
    let name_spec = names_el.name.clone().unwrap_or_default();

    // Collect a (variable, names) group for every variable that has names.
    let mut groups: Vec<(String, Vec<NameOrLiteral>)> = Vec::new();
    for variable in &names_el.variables {
        if let Some(names) = ctx.item.get_as_names(variable) {
            if !names.is_empty() {
                groups.push((variable.clone(), names));
            }
        }
    }

    if groups.is_empty() {
        // Try the substitute children, first non-empty wins. Child names
        // elements inherit this element's name options.
        if let Some(ref substitute) = names_el.substitute {
            let previous = ctx.substitute_options.replace(effective.clone());
            let mut chosen = Fragment::empty();
            for element in substitute {
                let candidate = evaluate_element(ctx, element, params)?;
                if !candidate.is_empty() {
                    chosen = candidate;
                    break;
                }
            }
            ctx.substitute_options = previous;
            if !chosen.is_empty() {
                return Ok(chosen);
            }
        }
        return Ok(Fragment::missing_variable());
    }

    merge_editor_translator(&mut groups);

    if effective.form == Some(NameForm::Count) {
        let total: usize = groups.iter().map(|(_, names)| counted(names, &effective)).sum();
        return Ok(if total == 0 {
            Fragment::missing_variable()
        } else {
            Fragment::variable_text(total.to_string(), params.formatting.clone())
        });
    }

    let mut rendered: Vec<Fragment> = Vec::with_capacity(groups.len());
    for (variable, names) in &groups {
        let list = format_name_list(ctx, names, &effective, &name_spec);
        let names_fragment =
            Fragment::variable_text(list, params.formatting.clone()).tagged(variable);

        let with_label = match names_el.label {
            Some(ref label) => {
                let plural = match label.plural {
                    LabelPlural::Always => true,
                    LabelPlural::Never => false,
                    LabelPlural::Contextual => names.len() != 1,
                };
                match ctx.locale.term(variable, label.form, plural) {
                    Some(term) => {
                        let label_fragment = Fragment::wrapped(
                            vec![Fragment::text(term, params.formatting.clone())],
                            &label.formatting,
                        );
                        Fragment::sequence(vec![names_fragment, label_fragment])
                    }
                    None => names_fragment,
                }
            }
            None => names_fragment,
        };
        rendered.push(with_label);
    }

    let delimiter = effective.names_delimiter.clone().unwrap_or_default();
    Ok(Fragment::sequence(join_fragments(
        rendered,
        &delimiter,
        &params.formatting,
    )))
}

/// Merge equal editor and translator groups into one group tagged
/// `editor-translator`, at the editor's position.
fn merge_editor_translator(groups: &mut Vec<(String, Vec<NameOrLiteral>)>) {
    let editor = groups.iter().position(|(v, _)| v == "editor");
    let translator = groups.iter().position(|(v, _)| v == "translator");
    let (Some(editor), Some(translator)) = (editor, translator) else {
        return;
    };

    let equal = {
        let (_, ed_names) = &groups[editor];
        let (_, tr_names) = &groups[translator];
        ed_names.len() == tr_names.len()
            && ed_names
                .iter()
                .zip(tr_names)
                .all(|(a, b)| a.sort_text() == b.sort_text())
    };

    if equal {
        groups[editor].0 = "editor-translator".to_string();
        groups.remove(translator);
    }
}

/// Name count contributed by one group in count form.
fn counted(names: &[NameOrLiteral], options: &NameOptions) -> usize {
    let n = names.len();
    if let (Some(min), Some(use_first)) = (options.et_al_min, options.et_al_use_first) {
        if n as u32 >= min {
            return n.min(use_first as usize);
        }
    }
    n
}

/// The options in effect for a names element: its own options override the
/// inherited ones; inside a substitute block the enclosing names element's
/// options fill in.
fn effective_name_options(
    ctx: &EvalContext,
    names_el: &NamesElement,
    params: &Parameters,
) -> NameOptions {
    let inherited = match ctx.substitute_options {
        Some(ref parent) if names_el.name.is_none() => parent.clone(),
        _ => params.name_options.clone(),
    };
    match names_el.name {
        Some(ref spec) => spec.options.merge(&inherited),
        None => inherited,
    }
}

/// Format a full name list: inversion, et-al truncation, the "and"
/// connector, and delimiters.
fn format_name_list(
    ctx: &EvalContext,
    names: &[NameOrLiteral],
    options: &NameOptions,
    spec: &NameSpec,
) -> String {
    let n = names.len();
    let delimiter = options.name_delimiter.clone().unwrap_or_else(|| ", ".to_string());

    let et_al_config = options.et_al_min.zip(options.et_al_use_first);
    let et_al_active = et_al_config.is_some_and(|(min, _)| n as u32 >= min);
    let use_first = et_al_config.map_or(n, |(_, first)| (first as usize).max(1));
    let shown_names = if et_al_active { use_first.min(n) } else { n };
    let et_al_use_last = options.et_al_use_last.unwrap_or(false);

    let inverted = |index: usize, name: &NameOrLiteral| -> bool {
        if matches!(name, NameOrLiteral::Literal { .. }) {
            return false;
        }
        match options.name_as_sort_order {
            None => false,
            Some(NameAsSortOrder::First) => index == 0,
            Some(NameAsSortOrder::All) => true,
        }
    };

    let mut rendered: Vec<(String, bool)> = names
        .iter()
        .take(shown_names)
        .enumerate()
        .map(|(i, name)| {
            let inv = inverted(i, name);
            (format_name(ctx, name, options, spec, inv), inv)
        })
        .collect();

    let decide = |behavior: Option<citekit_csl::DelimiterBehavior>,
                  count_exceeds: bool,
                  previous_inverted: bool| {
        use citekit_csl::DelimiterBehavior::*;
        match behavior.unwrap_or_default() {
            Always => true,
            Never => false,
            Contextual => count_exceeds,
            AfterInvertedName => previous_inverted,
        }
    };

    if et_al_active {
        let previous_inverted = rendered.last().map(|(_, inv)| *inv).unwrap_or(false);
        let mut out = rendered
            .iter()
            .map(|(text, _)| text.as_str())
            .collect::<Vec<_>>()
            .join(&delimiter);

        // The et-al marker counts as one more name for the delimiter
        // decision.
        let count = shown_names + 1;
        let with_delimiter = decide(
            options.delimiter_precedes_et_al,
            count > 2,
            previous_inverted,
        );

        if et_al_use_last && n > shown_names {
            let last = format_name(
                ctx,
                &names[n - 1],
                options,
                spec,
                options.name_as_sort_order == Some(NameAsSortOrder::All)
                    && !matches!(names[n - 1], NameOrLiteral::Literal { .. }),
            );
            if with_delimiter {
                out.push_str(delimiter.trim_end());
                out.push_str(" \u{2026} ");
            } else {
                out.push_str(" \u{2026} ");
            }
            out.push_str(&last);
        } else {
            let et_al = ctx
                .locale
                .term("et-al", TermForm::Long, false)
                .unwrap_or_else(|| "et al.".to_string());
            if with_delimiter {
                out.push_str(delimiter.trim_end());
                out.push(' ');
            } else {
                out.push(' ');
            }
            out.push_str(&et_al);
        }
        return out;
    }

    if n == 1 {
        return rendered.remove(0).0;
    }

    let and_word = options.and.map(|and| match and {
        NameAnd::Symbol => "&".to_string(),
        NameAnd::Text => ctx
            .locale
            .term("and", TermForm::Long, false)
            .unwrap_or_else(|| "and".to_string()),
    });

    match and_word {
        None => rendered
            .iter()
            .map(|(text, _)| text.as_str())
            .collect::<Vec<_>>()
            .join(&delimiter),
        Some(and) => {
            let previous_inverted = rendered[n - 2].1;
            let head = rendered[..n - 1]
                .iter()
                .map(|(text, _)| text.as_str())
                .collect::<Vec<_>>()
                .join(&delimiter);
            let with_delimiter =
                decide(options.delimiter_precedes_last, n >= 3, previous_inverted);
            if with_delimiter {
                format!(
                    "{}{} {} {}",
                    head,
                    delimiter.trim_end(),
                    and,
                    rendered[n - 1].0
                )
            } else {
                format!("{} {} {}", head, and, rendered[n - 1].0)
            }
        }
    }
}

/// Format one name.
fn format_name(
    ctx: &EvalContext,
    name: &NameOrLiteral,
    options: &NameOptions,
    spec: &NameSpec,
    inverted: bool,
) -> String {
    use citekit_csl::DemoteNonDroppingParticle;

    let person = match name {
        NameOrLiteral::Literal { literal } => return literal.clone(),
        NameOrLiteral::Name(person) => person,
    };

    let part_case = |text: Option<&str>, case: Option<TextCase>| -> Option<String> {
        text.map(|t| match case {
            Some(case) => transform_case(t, case),
            None => t.to_string(),
        })
    };

    let family = part_case(person.family.as_deref(), spec.family_case);
    let mut given = part_case(person.given.as_deref(), spec.given_case);

    // Initialization applies only to personal names with both parts.
    if let Some(ref with) = options.initialize_with {
        if person.family.is_some() {
            given = given.map(|g| {
                if g.is_empty() {
                    g
                } else {
                    initialize_given(
                        &g,
                        with,
                        options.initialize.unwrap_or(true),
                        ctx.style.options.initialize_with_hyphen,
                    )
                }
            });
        }
    }

    let dropping = person.dropping_particles.as_deref().unwrap_or("");
    let non_dropping = person.non_dropping_particles.as_deref().unwrap_or("");
    let family = family.unwrap_or_default();
    let given = given.unwrap_or_default();
    let suffix = person.suffix.as_deref().unwrap_or("");
    let sort_separator = options
        .sort_separator
        .clone()
        .unwrap_or_else(|| ", ".to_string());

    if options.form == Some(NameForm::Short) {
        return join_name_words(&[non_dropping, &family]);
    }

    if inverted {
        let demote = match ctx.style.options.demote_non_dropping_particle {
            DemoteNonDroppingParticle::Never => false,
            DemoteNonDroppingParticle::SortOnly => ctx.in_sort_key,
            DemoteNonDroppingParticle::DisplayAndSort => true,
        };

        let (family_block, given_block) = if demote {
            (
                join_name_words(&[&family]),
                join_name_words(&[&given, dropping, non_dropping]),
            )
        } else {
            (
                join_name_words(&[non_dropping, &family]),
                join_name_words(&[&given, dropping]),
            )
        };

        let mut blocks = vec![family_block, given_block];
        blocks.push(suffix.to_string());
        return blocks
            .into_iter()
            .filter(|b| !b.is_empty())
            .collect::<Vec<_>>()
            .join(&sort_separator);
    }

    let mut out = join_name_words(&[&given, dropping, non_dropping, &family]);
    if !suffix.is_empty() {
        if person.precede_suffix_by_comma() {
            out.push_str(", ");
        } else if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(suffix);
    }
    out
}

/// Join name tokens with spaces, except after a token ending in an
/// apostrophe-like character.
fn join_name_words(tokens: &[&str]) -> String {
    let mut out = String::new();
    for token in tokens.iter().filter(|t| !t.is_empty()) {
        if !out.is_empty() && !ends_with_apostrophe(&out) {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

fn ends_with_apostrophe(s: &str) -> bool {
    matches!(s.chars().last(), Some('\'' | '\u{2019}' | '\u{2018}'))
}

/// Initialize a given name.
///
/// Splits on spaces and periods; single-letter tokens always become
/// initials. Longer tokens become initials when `initialize` is true, or
/// are kept whole otherwise. Compound tokens ("Guo-Ping") join their
/// initials with a hyphen when `with_hyphen` is set; lowercase segments
/// after the hyphen are dropped.
fn initialize_given(given: &str, initialize_with: &str, initialize: bool, with_hyphen: bool) -> String {
    let trimmed = initialize_with.trim_end();
    let mut out = String::new();

    for token in given.split([' ', '.']).filter(|t| !t.is_empty()) {
        if token.chars().count() == 1 {
            out.push_str(&token.to_uppercase());
            out.push_str(initialize_with);
            continue;
        }

        if !initialize {
            out.push_str(token);
            out.push(' ');
            continue;
        }

        if token.contains(['-', '_', '\u{2013}']) {
            // Lowercase segments after the first are particles, dropped.
            let initials: Vec<String> = token
                .split(['-', '_', '\u{2013}'])
                .enumerate()
                .filter_map(|(i, segment)| {
                    let initial = segment.chars().next()?;
                    if i == 0 || initial.is_uppercase() {
                        Some(initial.to_uppercase().to_string())
                    } else {
                        None
                    }
                })
                .collect();
            if with_hyphen {
                out.push_str(&initials.join(&format!("{}-", trimmed)));
                out.push_str(initialize_with);
            } else {
                for initial in initials {
                    out.push_str(&initial);
                    out.push_str(initialize_with);
                }
            }
        } else {
            let initial = token.chars().next().unwrap();
            out.extend(initial.to_uppercase());
            out.push_str(initialize_with);
        }
    }

    out.trim().to_string()
}

// ============================================================================
// Dates
// ============================================================================

fn evaluate_date(
    ctx: &mut EvalContext,
    date_el: &DateElement,
    params: &Parameters,
) -> Result<Fragment> {
    let Some(value) = ctx.item.get_as_date(&date_el.variable) else {
        return Ok(Fragment::missing_variable());
    };

    let date = match value {
        DateValue::Literal(text) => {
            return Ok(Fragment::variable_text(text, params.formatting.clone()));
        }
        DateValue::Structured(date) => date,
    };

    // Localized dates merge the locale's part list with per-part
    // overrides: the override wins on form and text case, the locale
    // keeps its affixes.
    let parts: Vec<DatePart> = if let Some(form) = date_el.form {
        merge_date_overrides(ctx.locale.date_parts(form)?.to_vec(), &date_el.parts)
    } else {
        date_el.parts.clone()
    };

    let available = date.precision();
    let parts: Vec<DatePart> = parts
        .into_iter()
        .filter(|p| date_el.precision.includes(p.name) && available.includes(p.name))
        .collect();

    if parts.is_empty() {
        return Ok(Fragment::missing_variable());
    }

    let delimiter = date_el.delimiter.as_deref();
    let fragment = if date.is_range() {
        render_date_range(ctx, &date, &parts, delimiter, params)?
    } else {
        render_date_endpoint(
            ctx,
            &date.from_endpoint(),
            &parts,
            delimiter,
            params,
            false,
            false,
        )?
    };

    Ok(fragment.mark_by_variable())
}

fn merge_date_overrides(mut parts: Vec<DatePart>, overrides: &[DatePart]) -> Vec<DatePart> {
    for part in &mut parts {
        if let Some(ov) = overrides.iter().find(|o| o.name == part.name) {
            if ov.form.is_some() {
                part.form = ov.form;
            }
            if ov.formatting.text_case.is_some() {
                part.formatting.text_case = ov.formatting.text_case;
            }
            if ov.formatting.strip_periods {
                part.formatting.strip_periods = true;
            }
        }
    }
    parts
}

/// Render one endpoint's parts in order, with optional affix stripping at
/// the range dash: the from-side drops the suffix of its last part, the
/// to-side drops the prefix of its first part.
fn render_date_endpoint(
    ctx: &EvalContext,
    endpoint: &DateEndpoint,
    parts: &[DatePart],
    delimiter: Option<&str>,
    params: &Parameters,
    strip_last_suffix: bool,
    strip_first_prefix: bool,
) -> Result<Fragment> {
    let mut pieces: Vec<Fragment> = Vec::new();

    for (idx, part) in parts.iter().enumerate() {
        let Some(text) = format_date_part(ctx, endpoint, part, delimiter.is_some())? else {
            continue;
        };

        let first_rendered = pieces.is_empty();
        if !first_rendered {
            if let Some(d) = delimiter {
                pieces.push(Fragment::text(d, params.formatting.clone()));
            }
        }

        let mut formatting = part.formatting.clone();
        if strip_first_prefix && first_rendered {
            formatting.prefix = None;
        }
        if strip_last_suffix && idx == parts.len() - 1 {
            formatting.suffix = None;
        }

        let leaf = Fragment::text(text, params.formatting.clone());
        pieces.push(if formatting.wraps() {
            Fragment::wrapped(vec![leaf], &formatting)
        } else {
            leaf
        });
    }

    Ok(Fragment::sequence(pieces))
}

/// Render a date range, collapsing parts shared by both endpoints.
///
/// The differing set is the highest differing unit and all finer units.
/// Shared leading parts render once before the range, shared trailing
/// parts once after it, both from the starting endpoint. The endpoints are
/// joined with an en-dash; the suffix before and the prefix after the dash
/// are suppressed.
fn render_date_range(
    ctx: &EvalContext,
    date: &DateVar,
    parts: &[DatePart],
    delimiter: Option<&str>,
    params: &Parameters,
) -> Result<Fragment> {
    let from = date.from_endpoint();
    let to = date.to_endpoint();

    let year_differs = from.year != to.year;
    let month_differs = year_differs || from.month != to.month || from.season != to.season;
    let day_differs = month_differs || from.day != to.day;
    let differs = |name: DatePartName| match name {
        DatePartName::Year => year_differs,
        DatePartName::Month => month_differs,
        DatePartName::Day => day_differs,
    };

    let Some(first_diff) = parts.iter().position(|p| differs(p.name)) else {
        // Equal endpoints render as a single date.
        return render_date_endpoint(ctx, &from, parts, delimiter, params, false, false);
    };
    let last_diff = parts
        .iter()
        .rposition(|p| differs(p.name))
        .expect("a differing part exists");

    let leading = &parts[..first_diff];
    let differing = &parts[first_diff..=last_diff];
    let trailing = &parts[last_diff + 1..];

    let mut pieces: Vec<Fragment> = Vec::new();

    if !leading.is_empty() {
        let lead = render_date_endpoint(ctx, &from, leading, delimiter, params, false, false)?;
        if !lead.is_empty() {
            pieces.push(lead);
            if let Some(d) = delimiter {
                pieces.push(Fragment::text(d, params.formatting.clone()));
            }
        }
    }

    let from_side = render_date_endpoint(ctx, &from, differing, delimiter, params, true, false)?;
    let to_side = render_date_endpoint(ctx, &to, differing, delimiter, params, false, true)?;
    pieces.push(from_side);
    pieces.push(Fragment::text(DATE_RANGE_DASH, params.formatting.clone()));
    pieces.push(to_side);

    if !trailing.is_empty() {
        let trail = render_date_endpoint(ctx, &from, trailing, delimiter, params, false, false)?;
        if !trail.is_empty() {
            if let Some(d) = delimiter {
                pieces.push(Fragment::text(d, params.formatting.clone()));
            }
            pieces.push(trail);
        }
    }

    Ok(Fragment::sequence(pieces))
}

/// Format one date part of one endpoint. Returns `None` when the part has
/// nothing to render.
fn format_date_part(
    ctx: &EvalContext,
    endpoint: &DateEndpoint,
    part: &DatePart,
    has_delimiter: bool,
) -> Result<Option<String>> {
    match part.name {
        DatePartName::Year => {
            let year = endpoint.year;
            if year == 0 {
                return Ok(None);
            }
            let form = part.form.unwrap_or(DatePartForm::Numeric);
            if form == DatePartForm::Short {
                return Ok(Some(format!("{:02}", year.unsigned_abs() % 100)));
            }

            // Era terms carry a leading space; with an explicit delimiter
            // between parts the space is dropped.
            let era = if year < 0 {
                ctx.locale
                    .term("bc", TermForm::Long, false)
                    .unwrap_or_else(|| " BC".to_string())
            } else if year < 1000 {
                ctx.locale
                    .term("ad", TermForm::Long, false)
                    .unwrap_or_else(|| " AD".to_string())
            } else {
                String::new()
            };
            let era = if has_delimiter {
                era.trim_start().to_string()
            } else {
                era
            };
            Ok(Some(format!("{}{}", year.unsigned_abs(), era)))
        }

        DatePartName::Month => {
            if let Some(month) = endpoint.month {
                let form = part.form.unwrap_or(DatePartForm::Long);
                let text = match form {
                    DatePartForm::Numeric | DatePartForm::Ordinal => month.to_string(),
                    DatePartForm::NumericLeadingZeros => format!("{:02}", month),
                    DatePartForm::Long => ctx
                        .locale
                        .term(&format!("month-{:02}", month), TermForm::Long, false)
                        .ok_or_else(|| Error::UnsupportedFormat {
                            message: format!("no term for month {}", month),
                        })?,
                    DatePartForm::Short => ctx
                        .locale
                        .term(&format!("month-{:02}", month), TermForm::Short, false)
                        .ok_or_else(|| Error::UnsupportedFormat {
                            message: format!("no term for month {}", month),
                        })?,
                };
                return Ok(Some(text));
            }
            if let Some(season) = endpoint.season {
                return Ok(ctx.locale.term(
                    &format!("season-{:02}", season.term_index()),
                    TermForm::Long,
                    false,
                ));
            }
            Ok(None)
        }

        DatePartName::Day => {
            let Some(day) = endpoint.day else {
                return Ok(None);
            };
            let form = part.form.unwrap_or(DatePartForm::Numeric);
            let text = match form {
                DatePartForm::NumericLeadingZeros => format!("{:02}", day),
                DatePartForm::Ordinal => {
                    if ctx.locale.limit_day_ordinals_to_day1() && day != 1 {
                        day.to_string()
                    } else {
                        // Ordinal gender follows the month's term gender.
                        let gender = endpoint
                            .month
                            .and_then(|m| ctx.locale.term_gender(&format!("month-{:02}", m)));
                        ctx.locale.format_ordinal(day as u32, gender)
                    }
                }
                _ => day.to_string(),
            };
            Ok(Some(text))
        }
    }
}
