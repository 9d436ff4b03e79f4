//! Decoding of per-shape styling attributes.
//!
//! Explicit attributes are taken as they are, then the inline `style`
//! property list is merged on top. `fill` and `stroke` become [`Color`]s and
//! their `-opacity` companions are folded into the color alpha.

use log::{trace, warn};

use crate::color::Color;
use crate::error::Diagnostic;

const STYLE: &str = "style";
const NONE: &str = "none";
const COLOR_ATTRIBUTES: [&str; 2] = ["fill", "stroke"];

/// The value of a decoded attribute.
#[derive(Debug, PartialEq, Clone)]
pub enum AttributeValue {
    Text(String),
    Color(Color),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            AttributeValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            AttributeValue::Color(color) => Some(*color),
            AttributeValue::Text(_) => None,
        }
    }
}

/// Attributes of one shape, in insertion order.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct AttributeSet {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert a value. An existing entry keeps its position and gets the new
    /// value.
    pub fn insert<N: Into<String>>(&mut self, name: N, value: AttributeValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Result of decoding the raw attributes of a shape.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct DecodedAttributes {
    /// `None` if no attribute is left after decoding.
    pub attributes: Option<AttributeSet>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Split a `key:value;key:value` property list.
///
/// Returns the name of the offending key if a segment has no value.
fn parse_style(style: &str) -> Result<Vec<(&str, &str)>, String> {
    let mut properties = Vec::new();
    for declaration in style.split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        match declaration.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
                properties.push((key.trim(), value.trim()));
            }
            Some((key, _)) => return Err(format!("missing value for '{}'", key.trim())),
            None => return Err(format!("missing value for '{}'", declaration)),
        }
    }
    Ok(properties)
}

fn decode_color(name: &str, value: &str) -> Result<Color, Diagnostic> {
    if value == NONE {
        return Ok(Color::TRANSPARENT);
    }
    Color::from_hex(value).map_err(|e| Diagnostic::AttributeDecode {
        name: name.to_string(),
        reason: format!("{}: {}", value, e),
    })
}

struct Decoder {
    set: AttributeSet,
    diagnostics: Vec<Diagnostic>,
}

impl Decoder {
    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn merge_style(&mut self, style: &str) {
        match parse_style(style) {
            Ok(properties) => {
                for (key, value) in properties {
                    self.set.insert(key, AttributeValue::Text(value.to_string()));
                }
            }
            Err(reason) => self.report(Diagnostic::AttributeDecode {
                name: STYLE.to_string(),
                reason,
            }),
        }
    }

    fn decode_colors(&mut self) {
        for name in &COLOR_ATTRIBUTES {
            let value = match self.set.get(name).and_then(AttributeValue::as_text) {
                Some(value) => value.trim().to_string(),
                None => continue,
            };
            match decode_color(name, &value) {
                Ok(color) => self.set.insert(*name, AttributeValue::Color(color)),
                Err(diagnostic) => self.report(diagnostic),
            }
        }
    }

    fn fold_opacities(&mut self) {
        for name in &COLOR_ATTRIBUTES {
            let opacity_name = format!("{}-opacity", name);
            let color = match self.set.get(name).and_then(AttributeValue::as_color) {
                Some(color) => color,
                None => continue,
            };
            let text = match self.set.get(&opacity_name).and_then(AttributeValue::as_text) {
                Some(text) => text.trim().to_string(),
                None => continue,
            };
            let opacity = match text.parse::<f64>() {
                Ok(opacity) if opacity.is_finite() => opacity,
                _ => {
                    self.report(Diagnostic::AttributeDecode {
                        name: opacity_name,
                        reason: format!("invalid opacity {:?}", text),
                    });
                    continue;
                }
            };
            if opacity < 1.0 {
                let alpha = color.a * opacity.max(0.0);
                self.set.insert(*name, AttributeValue::Color(Color { a: alpha, ..color }));
                self.set.remove(&opacity_name);
            }
        }
    }
}

/// Decode the raw attributes of one shape.
pub fn decode<I, K, V>(raw: I) -> DecodedAttributes
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    trace!("decode");
    let mut decoder = Decoder {
        set: AttributeSet::new(),
        diagnostics: Vec::new(),
    };

    let mut style = None;
    for (name, value) in raw {
        let (name, value) = (name.as_ref(), value.as_ref());
        if name == STYLE {
            style = Some(value.to_string());
        } else {
            decoder.set.insert(name, AttributeValue::Text(value.to_string()));
        }
    }
    if let Some(style) = style {
        decoder.merge_style(&style);
    }
    decoder.decode_colors();
    decoder.fold_opacities();

    DecodedAttributes {
        attributes: if decoder.set.is_empty() {
            None
        } else {
            Some(decoder.set)
        },
        diagnostics: decoder.diagnostics,
    }
}
