//! Parameter layout
//!
//! Declares the eight public parameters with their ranges, steps and
//! defaults. Each parameter's kind is fixed when the layout is built, so
//! formatting and parsing dispatch on a tag instead of probing types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EnvFilterError, Result};

// ============================================================================
// Parameter Ids
// ============================================================================

/// Identifier of a public parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    Gain,
    Q,
    DryWetMix,
    AttackTime,
    ReleaseTime,
    BandStart,
    BandWidth,
    Bypass,
}

impl ParamId {
    /// All parameters in layout order
    pub const ALL: [ParamId; 8] = [
        ParamId::Gain,
        ParamId::Q,
        ParamId::DryWetMix,
        ParamId::AttackTime,
        ParamId::ReleaseTime,
        ParamId::BandStart,
        ParamId::BandWidth,
        ParamId::Bypass,
    ];

    /// Position in the layout
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable host-facing id string
    pub fn as_str(self) -> &'static str {
        match self {
            ParamId::Gain => "Gain",
            ParamId::Q => "Q",
            ParamId::DryWetMix => "Dry/Wet Mix",
            ParamId::AttackTime => "Attack Time",
            ParamId::ReleaseTime => "Release Time",
            ParamId::BandStart => "Band Start",
            ParamId::BandWidth => "Band Width",
            ParamId::Bypass => "Bypass",
        }
    }

    /// Layout entry for this parameter
    #[inline]
    pub fn info(self) -> &'static ParamInfo {
        &PARAMETERS[self.index()]
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamId {
    type Err = EnvFilterError;

    fn from_str(s: &str) -> Result<Self> {
        ParamId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| EnvFilterError::UnknownParameter {
                name: s.to_string(),
            })
    }
}

// ============================================================================
// Ranges and Kinds
// ============================================================================

/// Linear value range with a snapping interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
    /// Snapping interval; 0 means continuous
    pub step: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Check that a value lies inside the range
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a value into the range
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Clamp and round to the nearest legal step
    pub fn snap(&self, value: f32) -> f32 {
        let clamped = self.clamp(value);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }

    /// Map a plain value to 0..1
    pub fn normalize(&self, value: f32) -> f32 {
        ((self.clamp(value) - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Map 0..1 back to a plain value
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

/// Kind of a parameter, resolved once at layout construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Continuous float inside a range
    Continuous { range: FloatRange, default: f32 },
    /// One of a fixed set of labelled options, stored as its index
    Choice {
        options: &'static [&'static str],
        default: usize,
    },
    /// On/off switch, stored as 0.0 / 1.0
    Boolean { default: bool },
}

impl ParamKind {
    /// Default as a plain value
    pub fn default_value(&self) -> f32 {
        match *self {
            ParamKind::Continuous { default, .. } => default,
            ParamKind::Choice { default, .. } => default as f32,
            ParamKind::Boolean { default } => bool_to_value(default),
        }
    }

    /// Force a plain value into the legal set; NaN falls back to the default
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        match *self {
            ParamKind::Continuous { range, .. } => range.clamp(value),
            ParamKind::Choice { options, .. } => {
                let last = options.len().saturating_sub(1) as f32;
                value.round().clamp(0.0, last)
            }
            ParamKind::Boolean { .. } => bool_to_value(value_to_bool(value)),
        }
    }

    /// Check that a plain value is legal without modification
    pub fn accepts(&self, value: f32) -> bool {
        !value.is_nan() && self.clamp(value) == value
    }

    /// Map a plain value to 0..1
    pub fn normalize(&self, value: f32) -> f32 {
        match *self {
            ParamKind::Continuous { range, .. } => range.normalize(value),
            ParamKind::Choice { options, .. } => {
                let last = options.len().saturating_sub(1);
                if last == 0 {
                    0.0
                } else {
                    self.clamp(value) / last as f32
                }
            }
            ParamKind::Boolean { .. } => self.clamp(value),
        }
    }

    /// Map 0..1 back to a plain value
    pub fn denormalize(&self, normalized: f32) -> f32 {
        if normalized.is_nan() {
            return self.default_value();
        }
        let normalized = normalized.clamp(0.0, 1.0);
        match *self {
            ParamKind::Continuous { range, .. } => range.denormalize(normalized),
            ParamKind::Choice { options, .. } => {
                let last = options.len().saturating_sub(1) as f32;
                (normalized * last).round()
            }
            ParamKind::Boolean { .. } => bool_to_value(value_to_bool(normalized)),
        }
    }
}

/// Boolean parameters read as true above the midpoint
#[inline]
pub fn value_to_bool(value: f32) -> bool {
    value > 0.5
}

#[inline]
pub fn bool_to_value(flag: bool) -> f32 {
    if flag {
        1.0
    } else {
        0.0
    }
}

// ============================================================================
// Units and Display
// ============================================================================

/// Display unit of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    None,
    /// Position inside the range, shown 0..100
    Percent,
    /// Stored in seconds, shown in milliseconds
    Milliseconds,
    Hertz,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Percent => "%",
            Unit::Milliseconds => "ms",
            Unit::Hertz => "Hz",
        }
    }
}

/// Metadata describing a single parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    pub id: ParamId,
    /// Full display name
    pub name: &'static str,
    pub unit: Unit,
    pub kind: ParamKind,
}

impl ParamInfo {
    /// Render a plain value the way the editor labels it
    ///
    /// Values above 999 are shown in thousands with a `k` prefix on the unit.
    pub fn format_value(&self, value: f32) -> String {
        match self.kind {
            ParamKind::Boolean { .. } => {
                if value_to_bool(value) {
                    "On".to_string()
                } else {
                    "Off".to_string()
                }
            }
            ParamKind::Choice { options, .. } => {
                let index = self.kind.clamp(value) as usize;
                options.get(index).copied().unwrap_or_default().to_string()
            }
            ParamKind::Continuous { range, .. } => {
                let mut shown = value;
                let mut kilo = false;
                if shown > 999.0 {
                    shown /= 1000.0;
                    kilo = true;
                }

                let number = match self.unit {
                    Unit::Percent => ((value - range.min) / (range.max - range.min) * 100.0).round(),
                    Unit::Milliseconds => value * 1000.0,
                    Unit::None | Unit::Hertz => shown,
                };

                let mut text = trim_number(number);
                let suffix = self.unit.suffix();
                if !suffix.is_empty() {
                    text.push(' ');
                    if kilo {
                        text.push('k');
                    }
                    text.push_str(suffix);
                }
                text
            }
        }
    }

    /// Parse user-entered text into a legal plain value
    ///
    /// Milliseconds are converted to seconds and percentages are mapped
    /// across the range; the result is clamped and snapped to the step.
    pub fn parse_text(&self, text: &str) -> Result<f32> {
        let trimmed = text.trim();
        let invalid = || EnvFilterError::InvalidParameter {
            param: self.id.to_string(),
            value: text.to_string(),
            expected: self.expected_text(),
        };

        match self.kind {
            ParamKind::Boolean { .. } => match trimmed.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => Ok(1.0),
                "off" | "false" | "0" => Ok(0.0),
                _ => Err(invalid()),
            },
            ParamKind::Choice { options, .. } => options
                .iter()
                .position(|opt| opt.eq_ignore_ascii_case(trimmed))
                .map(|index| index as f32)
                .or_else(|| {
                    trimmed
                        .parse::<usize>()
                        .ok()
                        .filter(|&index| index < options.len())
                        .map(|index| index as f32)
                })
                .ok_or_else(invalid),
            ParamKind::Continuous { range, .. } => {
                let (number, kilo) = strip_unit(trimmed, self.unit);
                let parsed: f32 = number.parse().map_err(|_| invalid())?;
                if !parsed.is_finite() {
                    return Err(invalid());
                }
                let parsed = if kilo { parsed * 1000.0 } else { parsed };

                let plain = match self.unit {
                    Unit::Milliseconds => parsed / 1000.0,
                    Unit::Percent => range.min + (parsed / 100.0) * (range.max - range.min),
                    Unit::None | Unit::Hertz => parsed,
                };
                Ok(range.snap(plain))
            }
        }
    }

    fn expected_text(&self) -> String {
        match self.kind {
            ParamKind::Continuous { range, .. } => format!(
                "{} to {}",
                self.format_value(range.min),
                self.format_value(range.max)
            ),
            ParamKind::Choice { options, .. } => options.join(", "),
            ParamKind::Boolean { .. } => "on or off".to_string(),
        }
    }
}

fn strip_unit(text: &str, unit: Unit) -> (&str, bool) {
    let suffix = unit.suffix();
    let mut rest = text;
    if !suffix.is_empty() && rest.len() >= suffix.len() {
        let split = rest.len() - suffix.len();
        if rest.is_char_boundary(split) && rest[split..].eq_ignore_ascii_case(suffix) {
            rest = rest[..split].trim_end();
        }
    }
    match rest.strip_suffix('k') {
        Some(number) if unit == Unit::Hertz => (number.trim_end(), true),
        _ => (rest, false),
    }
}

/// Format with at most three decimals and no trailing zeros
fn trim_number(value: f32) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

// ============================================================================
// Layout
// ============================================================================

const fn continuous(
    id: ParamId,
    name: &'static str,
    unit: Unit,
    min: f32,
    max: f32,
    step: f32,
    default: f32,
) -> ParamInfo {
    ParamInfo {
        id,
        name,
        unit,
        kind: ParamKind::Continuous {
            range: FloatRange::new(min, max, step),
            default,
        },
    }
}

/// The public parameter layout, indexed by [`ParamId::index`]
pub static PARAMETERS: [ParamInfo; 8] = [
    continuous(ParamId::Gain, "Gain Factor", Unit::None, 1.0, 30.0, 0.1, 6.0),
    continuous(ParamId::Q, "Q Factor", Unit::None, 0.1, 10.0, 0.1, 3.0),
    continuous(ParamId::DryWetMix, "Dry/Wet Mix", Unit::Percent, 0.0, 1.0, 0.01, 1.0),
    continuous(ParamId::AttackTime, "Attack Time", Unit::Milliseconds, 0.001, 0.050, 0.001, 0.001),
    continuous(ParamId::ReleaseTime, "Release Time", Unit::Milliseconds, 0.050, 0.500, 0.001, 0.080),
    continuous(ParamId::BandStart, "Band Start", Unit::Hertz, 50.0, 2000.0, 1.0, 250.0),
    continuous(ParamId::BandWidth, "Band Width", Unit::Hertz, 50.0, 10000.0, 1.0, 1000.0),
    ParamInfo {
        id: ParamId::Bypass,
        name: "Bypass",
        unit: Unit::None,
        kind: ParamKind::Boolean { default: false },
    },
];
