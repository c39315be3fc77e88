//! Sort-key generation and ordering.
//!
//! Each sort key comes from a variable or a macro. Keys are plain strings
//! compared with a caller-supplied comparator (typically locale-aware
//! collation); the sort itself is stable, so items with identical keys
//! keep their input order.

use crate::error::Result;
use crate::eval::{evaluate_macro_for_sort, EvalContext, Parameters};
use crate::item::{parse_number_var, DateValue, DateVar, ItemData, NameOrLiteral, NumberVar, Value};
use citekit_csl::{Sort, SortOrder, SortTarget};
use std::cmp::Ordering;

/// A string comparator used to order sort keys.
pub type Comparator<'c> = &'c dyn Fn(&str, &str) -> Ordering;

/// Compute the sort keys of one item.
pub(crate) fn sort_keys(
    ctx: &mut EvalContext,
    sort: &Sort,
    params: &Parameters,
) -> Result<Vec<String>> {
    let mut keys = Vec::with_capacity(sort.keys.len());
    for key in &sort.keys {
        let text = match &key.target {
            SortTarget::Variable(name) => variable_key(ctx.item, name),
            SortTarget::Macro(name) => evaluate_macro_for_sort(ctx, name, params)?,
        };
        keys.push(text);
    }
    Ok(keys)
}

/// Compare two key lists pairwise, honoring per-key sort direction.
pub(crate) fn compare_keys(
    a: &[String],
    b: &[String],
    orders: &[SortOrder],
    cmp: Comparator<'_>,
) -> Ordering {
    for (i, order) in orders.iter().enumerate() {
        let left = a.get(i).map(String::as_str).unwrap_or("");
        let right = b.get(i).map(String::as_str).unwrap_or("");
        let ordering = match order {
            SortOrder::Ascending => cmp(left, right),
            SortOrder::Descending => cmp(right, left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// The key for a variable reference. Numeric content, including numeric
/// strings like `"321-328"`, takes the zero-padded form.
fn variable_key(item: &dyn ItemData, name: &str) -> String {
    match item.get(name) {
        None => String::new(),
        Some(Value::Text(s)) => match parse_number_var(&s) {
            Some(n) => number_key(&n),
            None => s,
        },
        Some(Value::Number(n)) => number_key(&n),
        Some(Value::Date(DateValue::Literal(s))) => s,
        Some(Value::Date(DateValue::Structured(d))) => date_key(&d),
        Some(Value::Names(names)) => names
            .iter()
            .map(NameOrLiteral::sort_text)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Zero-padded decimal so lexicographic order equals numeric order.
fn number_key(n: &NumberVar) -> String {
    format!("{:08}-{:08}", n.min, n.max)
}

/// `YYYYMMDD-YYYYMMDD`, with zeroes for unknown parts.
fn date_key(date: &DateVar) -> String {
    format!(
        "{:04}{:02}{:02}-{:04}{:02}{:02}",
        date.year_from,
        date.month_from.unwrap_or(0),
        date.day_from.unwrap_or(0),
        date.year_to,
        date.month_to.unwrap_or(0),
        date.day_to.unwrap_or(0)
    )
}
