//! `@font-face` stylesheet generation
//!
//! Pure and deterministic: the same descriptor and assets always produce
//! the same bytes. Blocks are emitted per style (outer), then per weight
//! (static fonts only), then per subset (inner), matching the order assets
//! are requested in.

use crate::services::asset_downloader::{static_key, variable_key, EncodedAssetMap};
use crate::types::{FontDescriptor, SubsetRange};
use fontsource_common::{AxisRange, Error, Result, VariableAxes};
use std::fmt::Write as _;

/// Weight declared for variable faces that carry no weight axis
const VARIABLE_DEFAULT_WEIGHT: u32 = 400;

struct FontFace<'a> {
    family: &'a str,
    style: String,
    weight: String,
    stretch: Option<String>,
    data: &'a str,
    format: &'static str,
    unicode_range: Option<&'a str>,
}

/// Render one `@font-face` block per style/subset(/weight) combination
///
/// Every combination must have an entry in `assets`; a missing one is a
/// caller bug and reported as [`Error::Internal`].
pub fn render(descriptor: &FontDescriptor, assets: &EncodedAssetMap) -> Result<String> {
    let subsets = descriptor.applicable_subsets();
    let mut css = String::new();

    match &descriptor.variable {
        Some(axes) => {
            for style in &descriptor.styles {
                for subset in &subsets {
                    let key = variable_key(subset.subset, style);
                    let face = variable_face(descriptor, axes, style, subset, lookup(assets, &key)?);
                    write_face(&mut css, &face);
                }
            }
        }
        None => {
            for style in &descriptor.styles {
                for weight in &descriptor.weights {
                    for subset in &subsets {
                        let key = static_key(subset.subset, *weight, style);
                        let face = FontFace {
                            family: &descriptor.family,
                            style: style.clone(),
                            weight: weight.to_string(),
                            stretch: None,
                            data: lookup(assets, &key)?,
                            format: "woff2",
                            unicode_range: subset.unicode_range,
                        };
                        write_face(&mut css, &face);
                    }
                }
            }
        }
    }

    Ok(css)
}

fn lookup<'a>(assets: &'a EncodedAssetMap, key: &str) -> Result<&'a str> {
    assets
        .get(key)
        .ok_or_else(|| Error::Internal(format!("no encoded asset for '{}'", key)))
}

fn variable_face<'a>(
    descriptor: &'a FontDescriptor,
    axes: &VariableAxes,
    style: &str,
    subset: &SubsetRange<'a>,
    data: &'a str,
) -> FontFace<'a> {
    let weight = match axes.get("wght") {
        Some(range) => format_range(range, ""),
        None => VARIABLE_DEFAULT_WEIGHT.to_string(),
    };

    // Older metadata calls the width axis "stretch"
    let stretch = axes
        .get("wdth")
        .or_else(|| axes.get("stretch"))
        .map(|range| format_range(range, "%"));

    // slnt counts counter-clockwise, CSS oblique clockwise
    let style = match axes.get("slnt") {
        Some(range) if style != "italic" => format!(
            "oblique {}deg {}deg",
            format_number(-range.max),
            format_number(-range.min)
        ),
        _ => style.to_string(),
    };

    FontFace {
        family: &descriptor.family,
        style,
        weight,
        stretch,
        data,
        format: "woff2-variations",
        unicode_range: subset.unicode_range,
    }
}

fn write_face(css: &mut String, face: &FontFace<'_>) {
    let _ = writeln!(css, "@font-face {{");
    let _ = writeln!(css, "  font-family: '{}';", escape_family(face.family));
    let _ = writeln!(css, "  font-style: {};", face.style);
    let _ = writeln!(css, "  font-display: auto;");
    let _ = writeln!(css, "  font-weight: {};", face.weight);
    if let Some(stretch) = &face.stretch {
        let _ = writeln!(css, "  font-stretch: {};", stretch);
    }
    let _ = writeln!(
        css,
        "  src: url(data:font/woff2;base64,{}) format('{}');",
        face.data, face.format
    );
    if let Some(range) = face.unicode_range {
        let _ = writeln!(css, "  unicode-range: {};", range);
    }
    let _ = writeln!(css, "}}");
}

fn format_range(range: &AxisRange, unit: &str) -> String {
    format!(
        "{}{} {}{}",
        format_number(range.min),
        unit,
        format_number(range.max),
        unit
    )
}

/// Integral values print without a fraction; -0 prints as 0
fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Quote a family name for use inside single quotes
pub fn escape_family(family: &str) -> String {
    family.replace('\\', "\\\\").replace('\'', "\\'")
}
