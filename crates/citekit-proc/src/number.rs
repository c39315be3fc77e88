//! Number and page-range rendering.
//!
//! A single number formats through the locale. A range either collapses as
//! a page range (hyphen separator on the page variable) or renders as a
//! composite with the separator's spacing: `&` padded on both sides, `,`
//! followed by one space, `-` bare.

use crate::error::Result;
use crate::item::{NumberSeparator, NumberVar};
use crate::locale::LocaleProvider;
use citekit_csl::{Gender, NumberForm, PageRangeFormat};

/// Render a numeric variable.
///
/// `variable` identifies the source variable: page ranges with a hyphen
/// separator collapse according to `page_range_format` and the locale's
/// page-range delimiter.
pub fn render_number(
    var: &NumberVar,
    form: NumberForm,
    gender: Option<Gender>,
    variable: &str,
    page_range_format: Option<PageRangeFormat>,
    locale: &LocaleProvider<'_>,
) -> Result<String> {
    if !var.is_range() {
        return locale.format_number(var.min, form, gender);
    }

    if var.separator == NumberSeparator::Hyphen && variable == "page" {
        return Ok(render_page_range(
            var.min,
            var.max,
            page_range_format.unwrap_or(PageRangeFormat::Expanded),
            &locale.page_range_delimiter(),
        ));
    }

    let min = locale.format_number(var.min, form, gender)?;
    let max = locale.format_number(var.max, form, gender)?;
    Ok(format!("{}{}{}", min, var.separator.display_text(), max))
}

/// Render a collapsed page range: `<min><delimiter><kept-digits-of-max>`.
pub fn render_page_range(
    min: u32,
    max: u32,
    format: PageRangeFormat,
    delimiter: &str,
) -> String {
    format!("{}{}{}", min, delimiter, collapsed_end(min, max, format))
}

/// The digits of `max` kept after collapsing against `min`.
fn collapsed_end(min: u32, max: u32, format: PageRangeFormat) -> String {
    let to = max.to_string();

    // An inverted range cannot collapse meaningfully.
    if min > max {
        return to;
    }

    let delta = differing_suffix_len(min, max);

    let keep = match format {
        PageRangeFormat::Expanded => to.len(),
        PageRangeFormat::Minimal => delta,
        PageRangeFormat::MinimalTwo => delta.max(2),
        PageRangeFormat::Chicago => {
            if min < 100 {
                to.len()
            } else if min >= 1000 && to.len() - delta <= 1 {
                to.len()
            } else if min % 100 == 0 {
                to.len()
            } else if min % 100 < 10 {
                delta
            } else {
                delta.max(2)
            }
        }
    };

    let keep = keep.min(to.len());
    to[to.len() - keep..].to_string()
}

/// Number of trailing digits of `max` that differ from `min`, comparing
/// right-aligned from the most significant end. A position where `min` has
/// no digit counts as differing.
fn differing_suffix_len(min: u32, max: u32) -> usize {
    let from: Vec<u8> = min.to_string().into_bytes();
    let to: Vec<u8> = max.to_string().into_bytes();
    let offset = to.len() - from.len().min(to.len());

    for i in 0..to.len() {
        let from_digit = if i >= offset {
            from.get(i - offset).copied()
        } else {
            None
        };
        if from_digit != Some(to[i]) {
            return to.len() - i;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleRegistry;

    const DASH: &str = "\u{2013}";

    fn chicago(min: u32, max: u32) -> String {
        render_page_range(min, max, PageRangeFormat::Chicago, DASH)
    }

    #[test]
    fn test_chicago_trailing_two_digits() {
        assert_eq!(chicago(321, 328), format!("321{}28", DASH));
    }

    #[test]
    fn test_chicago_expands_across_thousand_boundary() {
        // min >= 1000 and only one digit would remain of the end.
        assert_eq!(chicago(1496, 1504), format!("1496{}1504", DASH));
    }

    #[test]
    fn test_chicago_multiple_of_hundred_expands() {
        assert_eq!(chicago(100, 104), format!("100{}104", DASH));
    }

    #[test]
    fn test_chicago_below_hundred_expands() {
        assert_eq!(chicago(42, 45), format!("42{}45", DASH));
    }

    #[test]
    fn test_chicago_first_decade_is_minimal() {
        // min mod 100 < 10 keeps only the differing digits.
        assert_eq!(chicago(101, 108), format!("101{}8", DASH));
        assert_eq!(chicago(1103, 1104), format!("1103{}4", DASH));
    }

    #[test]
    fn test_minimal_and_minimal_two() {
        assert_eq!(
            render_page_range(321, 328, PageRangeFormat::Minimal, DASH),
            format!("321{}8", DASH)
        );
        assert_eq!(
            render_page_range(321, 328, PageRangeFormat::MinimalTwo, DASH),
            format!("321{}28", DASH)
        );
        assert_eq!(
            render_page_range(321, 428, PageRangeFormat::Minimal, DASH),
            format!("321{}428", DASH)
        );
    }

    #[test]
    fn test_expanded_keeps_everything() {
        assert_eq!(
            render_page_range(321, 328, PageRangeFormat::Expanded, DASH),
            format!("321{}328", DASH)
        );
    }

    #[test]
    fn test_inverted_range_falls_back_to_expanded() {
        assert_eq!(
            render_page_range(328, 321, PageRangeFormat::Minimal, DASH),
            format!("328{}321", DASH)
        );
    }

    #[test]
    fn test_end_longer_than_start() {
        // Every digit position of the longer end counts as differing.
        assert_eq!(
            render_page_range(98, 102, PageRangeFormat::Minimal, DASH),
            format!("98{}102", DASH)
        );
    }

    #[test]
    fn test_collapse_round_trip() {
        // Re-attaching min's omitted prefix to the kept digits restores max.
        for (min, max) in [(321u32, 328u32), (1234, 1236), (1496, 1504), (12, 13)] {
            for format in [
                PageRangeFormat::Expanded,
                PageRangeFormat::Minimal,
                PageRangeFormat::MinimalTwo,
                PageRangeFormat::Chicago,
            ] {
                let kept = collapsed_end(min, max, format);
                let full = max.to_string();
                let restored = format!("{}{}", &full[..full.len() - kept.len()], kept);
                assert_eq!(restored, full, "{}..{} with {:?}", min, max, format);
            }
        }
    }

    #[test]
    fn test_composite_separator_spacing() {
        let registry = LocaleRegistry::new();
        let locale = registry.resolve("en-US").unwrap();

        let amp = NumberVar::range(12, 13, NumberSeparator::Ampersand);
        assert_eq!(
            render_number(&amp, NumberForm::Numeric, None, "issue", None, &locale).unwrap(),
            "12 & 13"
        );

        let comma = NumberVar::range(12, 19, NumberSeparator::Comma);
        assert_eq!(
            render_number(&comma, NumberForm::Numeric, None, "issue", None, &locale).unwrap(),
            "12, 19"
        );

        // Hyphen ranges on non-page variables stay bare.
        let hyphen = NumberVar::range(2, 4, NumberSeparator::Hyphen);
        assert_eq!(
            render_number(&hyphen, NumberForm::Numeric, None, "volume", None, &locale).unwrap(),
            "2-4"
        );
    }

    #[test]
    fn test_page_variable_collapses() {
        let registry = LocaleRegistry::new();
        let locale = registry.resolve("en-US").unwrap();

        let pages = NumberVar::range(321, 328, NumberSeparator::Hyphen);
        assert_eq!(
            render_number(
                &pages,
                NumberForm::Numeric,
                None,
                "page",
                Some(PageRangeFormat::Chicago),
                &locale
            )
            .unwrap(),
            format!("321{}28", DASH)
        );
    }

    #[test]
    fn test_ordinal_range_composite() {
        let registry = LocaleRegistry::new();
        let locale = registry.resolve("en-US").unwrap();

        let range = NumberVar::range(2, 4, NumberSeparator::Ampersand);
        assert_eq!(
            render_number(&range, NumberForm::Ordinal, None, "edition", None, &locale).unwrap(),
            "2nd & 4th"
        );
    }
}
