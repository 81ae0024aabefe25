//! # Layout Classifier
//!
//! Labels an element's box behaviour. Resolved style wins; class names are a
//! lower-confidence fallback used only when no `display` value is known.

use crate::dom::Element;
use crate::resolver::{ResolvedStyle, StyleResolver};
use regex::Regex;
use std::sync::OnceLock;

/// Column count assumed for `repeat(auto-fill, ...)` / `repeat(auto-fit, ...)`
pub const AUTO_REPEAT_COLUMNS: usize = 3;

/// Largest `repeat()` count honoured. Layout detection clamps far below this.
pub const MAX_REPEAT_COUNT: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutInfo {
    pub is_flex_row: bool,
    pub is_flex_column: bool,
    pub is_grid: bool,
    pub grid_columns: usize,
    pub is_inline: bool,
    /// Visible element children
    pub child_count: usize,
    /// Whether the verdict came from resolved style rather than class names
    pub from_resolved_style: bool,
}

impl LayoutInfo {
    /// Lays its children out side by side
    pub fn is_horizontal(&self) -> bool {
        self.is_flex_row || self.is_grid
    }

    /// Columns implied by the layout: track count for grids, child count for
    /// flex rows, otherwise one.
    pub fn detected_columns(&self) -> usize {
        if self.is_grid {
            self.grid_columns.max(1)
        } else if self.is_flex_row {
            self.child_count.max(1)
        } else {
            1
        }
    }
}

pub fn classify(element: &Element, resolver: &dyn StyleResolver) -> LayoutInfo {
    let child_count = element.visible_children().len();
    match resolver.resolve(element) {
        Some(resolved) => classify_resolved(&resolved, child_count),
        None => classify_classes(&element.class_attr(), child_count),
    }
}

pub fn classify_resolved(resolved: &ResolvedStyle, child_count: usize) -> LayoutInfo {
    let mut info = LayoutInfo {
        child_count,
        from_resolved_style: true,
        ..Default::default()
    };

    match resolved.display.as_deref().unwrap_or("") {
        "flex" | "inline-flex" => {
            let column = matches!(
                resolved.flex_direction.as_deref(),
                Some("column") | Some("column-reverse")
            );
            info.is_flex_column = column;
            info.is_flex_row = !column;
        }
        "grid" | "inline-grid" => {
            info.is_grid = true;
            info.grid_columns = resolved
                .grid_template_columns
                .as_deref()
                .map(count_grid_tracks)
                .unwrap_or(1);
        }
        "inline" | "inline-block" => info.is_inline = true,
        _ => {}
    }

    info
}

fn grid_cols_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?:^|\s|:)grid-cols-(\d+)(?:\s|$)").ok())
        .as_ref()
}

pub fn classify_classes(class_attr: &str, child_count: usize) -> LayoutInfo {
    let classes = class_attr.to_lowercase();
    let tokens: Vec<&str> = classes.split_whitespace().collect();
    let mut info = LayoutInfo {
        child_count,
        ..Default::default()
    };

    let has_token = |t: &str| tokens.iter().any(|c| *c == t);

    if classes.contains("grid") {
        info.is_grid = true;
        info.grid_columns = grid_cols_pattern()
            .and_then(|pattern| pattern.captures(&classes))
            .and_then(|caps| caps[1].parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(child_count.max(1));
    } else if classes.contains("flex-col") {
        info.is_flex_column = true;
    } else if classes.contains("flex") || has_token("row") || has_token("d-flex") {
        info.is_flex_row = true;
    } else if has_token("inline") || has_token("inline-block") || has_token("d-inline") {
        info.is_inline = true;
    }

    info
}

/// Count the non-zero tracks of a `grid-template-columns` value. `repeat(N,
/// ...)` is expanded; the result is at least one.
pub fn count_grid_tracks(template: &str) -> usize {
    sum_tracks(&split_top_level(template)).max(1)
}

fn sum_tracks(tracks: &[String]) -> usize {
    tracks
        .iter()
        .map(|track| track_weight(track))
        .fold(0, usize::saturating_add)
}

fn track_weight(track: &str) -> usize {
    let lower = track.to_ascii_lowercase();
    if let Some(inner) = lower.strip_prefix("repeat(").and_then(|r| r.strip_suffix(')')) {
        let Some((times, tracks)) = inner.split_once(',') else {
            return 0;
        };
        let times = times.trim();
        if times == "auto-fill" || times == "auto-fit" {
            return AUTO_REPEAT_COLUMNS;
        }
        return repeat_count(times).saturating_mul(sum_tracks(&split_top_level(tracks)));
    }
    if is_zero_track(&lower) {
        0
    } else {
        1
    }
}

/// Digits beyond `usize` saturate to the cap rather than reading as zero
fn repeat_count(times: &str) -> usize {
    match times.parse::<usize>() {
        Ok(n) => n.min(MAX_REPEAT_COUNT),
        Err(_) if !times.is_empty() && times.bytes().all(|b| b.is_ascii_digit()) => {
            MAX_REPEAT_COUNT
        }
        Err(_) => 0,
    }
}

fn is_zero_track(track: &str) -> bool {
    let numeric: String = track
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    !numeric.is_empty() && numeric.parse::<f64>().map(|v| v == 0.0).unwrap_or(false)
}

/// Whitespace split that keeps parenthesized groups together
pub(crate) fn split_top_level(value: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in value.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    // Named lines like `[full-start]` are not tracks
    out.retain(|t| !t.starts_with('['));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(display: &str) -> ResolvedStyle {
        ResolvedStyle {
            display: Some(display.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_flex_direction() {
        let info = classify_resolved(&resolved("flex"), 3);
        assert!(info.is_flex_row);
        assert_eq!(info.detected_columns(), 3);

        let mut style = resolved("inline-flex");
        style.flex_direction = Some("column-reverse".into());
        let info = classify_resolved(&style, 3);
        assert!(info.is_flex_column);
        assert!(!info.is_horizontal());
    }

    #[test]
    fn test_grid_track_counting() {
        assert_eq!(count_grid_tracks("1fr 1fr 1fr"), 3);
        assert_eq!(count_grid_tracks("repeat(4, 1fr)"), 4);
        assert_eq!(count_grid_tracks("200px repeat(2, minmax(0, 1fr))"), 3);
        assert_eq!(count_grid_tracks("0 1fr"), 1);
        assert_eq!(count_grid_tracks("repeat(auto-fill, minmax(200px, 1fr))"), 3);
        assert_eq!(count_grid_tracks("[start] 1fr [mid] 2fr [end]"), 2);
        assert_eq!(count_grid_tracks(""), 1);
    }

    #[test]
    fn test_huge_repeat_counts_saturate() {
        assert_eq!(
            count_grid_tracks("repeat(18446744073709551615, 1fr 1fr)"),
            MAX_REPEAT_COUNT * 2
        );
        assert_eq!(
            count_grid_tracks("repeat(99999999999999999999999, 1fr)"),
            MAX_REPEAT_COUNT
        );
        let nested = "repeat(64, repeat(64, repeat(64, repeat(64, repeat(64, 1fr)))))";
        assert_eq!(count_grid_tracks(nested), 64usize.pow(5));
        let deep = format!("{}1fr{}", "repeat(64, ".repeat(12), ")".repeat(12));
        assert_eq!(count_grid_tracks(&deep), usize::MAX);
        assert_eq!(count_grid_tracks("repeat(-3, 1fr)"), 1);
    }

    #[test]
    fn test_grid_without_template_is_one_column() {
        let info = classify_resolved(&resolved("grid"), 4);
        assert!(info.is_grid);
        assert_eq!(info.detected_columns(), 1);
    }

    #[test]
    fn test_inline_display() {
        assert!(classify_resolved(&resolved("inline-block"), 0).is_inline);
        assert_eq!(classify_resolved(&resolved("block"), 2), LayoutInfo {
            child_count: 2,
            from_resolved_style: true,
            ..Default::default()
        });
    }

    #[test]
    fn test_class_fallbacks() {
        let info = classify_classes("grid grid-cols-3 gap-4", 5);
        assert!(info.is_grid);
        assert_eq!(info.grid_columns, 3);
        assert!(!info.from_resolved_style);

        assert!(classify_classes("md:grid-cols-2 grid", 2).is_grid);
        assert!(classify_classes("flex flex-col", 2).is_flex_column);
        assert!(classify_classes("row g-3", 2).is_flex_row);
        assert!(classify_classes("d-flex", 2).is_flex_row);
        assert!(!classify_classes("arrow-down", 2).is_flex_row);
        assert!(classify_classes("card", 2) == LayoutInfo { child_count: 2, ..Default::default() });
    }

    #[test]
    fn test_class_grid_without_count_uses_children() {
        let info = classify_classes("product-grid", 4);
        assert_eq!(info.detected_columns(), 4);
    }
}
