//! # Style / Formatting Codec
//!
//! Converts between inline `style="..."` strings, the camelCase style map
//! stored on components, and the [`Formatting`] record.
//!
//! Style maps are `BTreeMap`s so serialization order is stable across runs.

use crate::component::Formatting;
use std::collections::BTreeMap;

/// Declaration name (camelCase) -> value
pub type StyleMap = BTreeMap<String, String>;

/// Parse an inline style attribute into a style map.
///
/// Declarations are `;`-delimited `name: value` pairs. Names are converted
/// from kebab-case to camelCase. Declarations without a colon, name or value
/// are skipped.
pub fn parse_inline_style(input: &str) -> StyleMap {
    let mut map = StyleMap::new();

    for declaration in input.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        map.insert(to_camel_case(name), value.to_string());
    }

    map
}

/// `background-color` -> `backgroundColor`, `-webkit-box` -> `WebkitBox`.
/// Custom properties (`--name`) are kept verbatim.
pub fn to_camel_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// `backgroundColor` -> `background-color`, `WebkitBox` -> `-webkit-box`.
/// Custom properties (`--name`) are kept verbatim.
pub fn to_kebab_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Serialize kebab-case declarations as `name: value; name: value`
pub fn serialize_declarations<'a>(
    declarations: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    declarations
        .into_iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Serialize a style map back into an inline style string
pub fn serialize_style(style: &StyleMap) -> String {
    let kebab: BTreeMap<String, &str> = style
        .iter()
        .map(|(name, value)| (to_kebab_case(name), value.as_str()))
        .collect();
    serialize_declarations(kebab.iter().map(|(k, v)| (k.as_str(), *v)))
}

/// Derive a formatting record from style declarations
pub fn formatting_from_style(style: &StyleMap) -> Formatting {
    let bold = style
        .get("fontWeight")
        .map(|w| is_bold_weight(w))
        .unwrap_or(false);
    let italic = style
        .get("fontStyle")
        .map(|s| {
            let s = s.trim();
            s.eq_ignore_ascii_case("italic") || s.eq_ignore_ascii_case("oblique")
        })
        .unwrap_or(false);
    let underline = style
        .get("textDecoration")
        .or_else(|| style.get("textDecorationLine"))
        .map(|d| d.to_ascii_lowercase().contains("underline"))
        .unwrap_or(false);

    Formatting {
        bold,
        italic,
        underline,
        align: style.get("textAlign").cloned(),
        font_size: style.get("fontSize").cloned(),
    }
}

/// `bold`, `bolder` or a numeric weight of 600 and above
pub fn is_bold_weight(weight: &str) -> bool {
    let weight = weight.trim();
    if weight.eq_ignore_ascii_case("bold") || weight.eq_ignore_ascii_case("bolder") {
        return true;
    }
    weight.parse::<u32>().map(|w| w >= 600).unwrap_or(false)
}

/// Kebab-case declarations a formatting record contributes
pub fn formatting_declarations(formatting: &Formatting) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();
    if formatting.bold {
        out.push(("font-weight", "bold".to_string()));
    }
    if formatting.italic {
        out.push(("font-style", "italic".to_string()));
    }
    if formatting.underline {
        out.push(("text-decoration", "underline".to_string()));
    }
    if let Some(align) = &formatting.align {
        out.push(("text-align", align.clone()));
    }
    if let Some(size) = &formatting.font_size {
        out.push(("font-size", size.clone()));
    }
    out
}

/// Combined inline style for a node. Formatting wins over the style map when
/// both set the same property.
pub fn inline_style(style: &StyleMap, formatting: Option<&Formatting>) -> String {
    let mut merged: BTreeMap<String, String> = style
        .iter()
        .map(|(name, value)| (to_kebab_case(name), value.clone()))
        .collect();

    if let Some(formatting) = formatting {
        for (name, value) in formatting_declarations(formatting) {
            merged.insert(name.to_string(), value);
        }
    }

    serialize_declarations(merged.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Whether `value` can be written as a declaration value inside a `<style>`
/// block without breaking out of its declaration.
pub fn is_safe_css_value(value: &str) -> bool {
    !value.trim().is_empty()
        && !value.contains("/*")
        && !value
            .chars()
            .any(|c| matches!(c, '<' | '>' | '{' | '}' | ';' | '\\') || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_style() {
        let map = parse_inline_style("color: red; background-color:#fff ;font-size: 12px");
        assert_eq!(map.get("color").map(String::as_str), Some("red"));
        assert_eq!(map.get("backgroundColor").map(String::as_str), Some("#fff"));
        assert_eq!(map.get("fontSize").map(String::as_str), Some("12px"));
    }

    #[test]
    fn test_malformed_declarations_skipped() {
        let map = parse_inline_style("color red; : blue; margin:; padding: 4px;;");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("padding").map(String::as_str), Some("4px"));
    }

    #[test]
    fn test_value_with_colon_kept_whole() {
        let map = parse_inline_style("background: url(http://x/y.png)");
        assert_eq!(
            map.get("background").map(String::as_str),
            Some("url(http://x/y.png)")
        );
    }

    #[test]
    fn test_case_conversion_round_trip() {
        for name in ["background-color", "-webkit-transition", "color", "--brand-color"] {
            assert_eq!(to_kebab_case(&to_camel_case(name)), name);
        }
        assert_eq!(to_camel_case("-webkit-transition"), "WebkitTransition");
    }

    #[test]
    fn test_formatting_from_style() {
        let map = parse_inline_style("font-weight: 700; font-style: italic; text-decoration: underline dotted; text-align: right");
        let formatting = formatting_from_style(&map);
        assert!(formatting.bold);
        assert!(formatting.italic);
        assert!(formatting.underline);
        assert_eq!(formatting.align.as_deref(), Some("right"));
        assert!(formatting.font_size.is_none());
    }

    #[test]
    fn test_normal_weight_is_not_bold() {
        assert!(!is_bold_weight("400"));
        assert!(!is_bold_weight("normal"));
        assert!(is_bold_weight("Bold"));
    }

    #[test]
    fn test_inline_style_formatting_overrides_map() {
        let mut style = StyleMap::new();
        style.insert("fontWeight".into(), "300".into());
        style.insert("color".into(), "#333".into());

        let formatting = Formatting {
            bold: true,
            align: Some("center".into()),
            ..Default::default()
        };

        let css = inline_style(&style, Some(&formatting));
        assert_eq!(css, "color: #333; font-weight: bold; text-align: center");
    }

    #[test]
    fn test_serialize_style_is_sorted() {
        let map = parse_inline_style("z-index: 2; color: red");
        assert_eq!(serialize_style(&map), "color: red; z-index: 2");
    }

    #[test]
    fn test_safe_css_values() {
        assert!(is_safe_css_value("#fafafa"));
        assert!(is_safe_css_value("rgb(0, 0, 0)"));
        assert!(is_safe_css_value("calc(100vh - 64px)"));
        assert!(is_safe_css_value("url(\"hero.png\")"));

        assert!(!is_safe_css_value("red</style><script>alert(1)</script>"));
        assert!(!is_safe_css_value("red} body { display: none"));
        assert!(!is_safe_css_value("0; color: red"));
        assert!(!is_safe_css_value("red /* comment"));
        assert!(!is_safe_css_value("\\3c script"));
        assert!(!is_safe_css_value("   "));
    }
}
