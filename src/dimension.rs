//! Dimension literals and their conversion to physical pixels
//!
//! Literals look like `50`, `50vp`, `12px`, `14fp` or `20%`. A bare number is
//! read as `vp`. `auto` is accepted wherever a [`CalcLength`] is expected.

use std::fmt;

use logos::Logos;
use serde::Deserialize;
use thiserror::Error;

/// Byte range in a dimension literal
pub type Span = std::ops::Range<usize>;

/// Errors produced while reading a dimension literal
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DimensionError {
    #[error("empty dimension literal")]
    Empty,

    #[error("unexpected input '{found}' at {span:?} in dimension '{literal}'")]
    Unexpected {
        literal: String,
        found: String,
        span: Span,
    },

    #[error("'auto' is not allowed here")]
    AutoNotAllowed,
}

/// Unit attached to a dimension value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DimensionUnit {
    Px,
    #[default]
    Vp,
    Fp,
    /// Value stored as a fraction of the reference length
    Percent,
}

/// A length with a unit
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimension {
    pub value: f64,
    pub unit: DimensionUnit,
}

/// Density factors used when converting to physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScaleProperty {
    /// Physical pixels per vp
    pub vp_scale: f64,
    /// Font scale applied on top of `vp_scale` for fp values
    pub fp_scale: f64,
}

impl Default for ScaleProperty {
    fn default() -> Self {
        Self {
            vp_scale: 1.0,
            fp_scale: 1.0,
        }
    }
}

impl Dimension {
    pub fn new(value: f64, unit: DimensionUnit) -> Self {
        Self { value, unit }
    }

    pub fn px(value: f64) -> Self {
        Self::new(value, DimensionUnit::Px)
    }

    pub fn vp(value: f64) -> Self {
        Self::new(value, DimensionUnit::Vp)
    }

    /// A percentage, given in percent (`50.0` means half)
    pub fn percent(value: f64) -> Self {
        Self::new(value / 100.0, DimensionUnit::Percent)
    }

    pub fn is_percent(&self) -> bool {
        self.unit == DimensionUnit::Percent
    }

    /// Resolve to physical pixels.
    ///
    /// Percent values need a reference length; without one there is no answer.
    pub fn convert_to_px(&self, scale: &ScaleProperty, reference: Option<f64>) -> Option<f64> {
        match self.unit {
            DimensionUnit::Px => Some(self.value),
            DimensionUnit::Vp => Some(self.value * scale.vp_scale),
            DimensionUnit::Fp => Some(self.value * scale.vp_scale * scale.fp_scale),
            DimensionUnit::Percent => reference.map(|r| self.value * r),
        }
    }

    /// Parse a literal such as `50vp` or `20%`
    pub fn parse(literal: &str) -> Result<Self, DimensionError> {
        match CalcLength::parse(literal)? {
            CalcLength::Fixed(d) => Ok(d),
            CalcLength::Auto => Err(DimensionError::AutoNotAllowed),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            DimensionUnit::Px => write!(f, "{}px", self.value),
            DimensionUnit::Vp => write!(f, "{}vp", self.value),
            DimensionUnit::Fp => write!(f, "{}fp", self.value),
            DimensionUnit::Percent => write!(f, "{}%", self.value * 100.0),
        }
    }
}

/// A user-declared length that may be left to the layout (`auto`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalcLength {
    Auto,
    Fixed(Dimension),
}

impl CalcLength {
    pub fn is_auto(&self) -> bool {
        matches!(self, CalcLength::Auto)
    }

    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            CalcLength::Auto => None,
            CalcLength::Fixed(d) => Some(*d),
        }
    }

    /// Parse a literal, accepting `auto`
    pub fn parse(literal: &str) -> Result<Self, DimensionError> {
        let tokens = lex(literal)?;
        match tokens.as_slice() {
            [] => Err(DimensionError::Empty),
            [(Token::Auto, _)] => Ok(CalcLength::Auto),
            [(Token::Number(v), _)] => Ok(CalcLength::Fixed(Dimension::vp(*v))),
            [(Token::Number(v), _), (unit, span)] => {
                let dimension = match unit {
                    Token::Px => Dimension::px(*v),
                    Token::Vp => Dimension::vp(*v),
                    Token::Fp => Dimension::new(*v, DimensionUnit::Fp),
                    Token::Percent => Dimension::percent(*v),
                    _ => return Err(unexpected(literal, span.clone())),
                };
                Ok(CalcLength::Fixed(dimension))
            }
            [_, .., (_, span)] | [(_, span)] => Err(unexpected(literal, span.clone())),
        }
    }
}

impl From<Dimension> for CalcLength {
    fn from(d: Dimension) -> Self {
        CalcLength::Fixed(d)
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match DimensionLiteral::deserialize(deserializer)? {
            DimensionLiteral::Number(v) => Ok(Dimension::vp(v)),
            DimensionLiteral::Text(s) => Dimension::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

impl<'de> Deserialize<'de> for CalcLength {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match DimensionLiteral::deserialize(deserializer)? {
            DimensionLiteral::Number(v) => Ok(CalcLength::Fixed(Dimension::vp(v))),
            DimensionLiteral::Text(s) => CalcLength::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Scene files may write `width = 100` or `width = "100vp"`
#[derive(Deserialize)]
#[serde(untagged)]
enum DimensionLiteral {
    Number(f64),
    Text(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t]+")]
enum Token {
    #[token("auto")]
    Auto,
    #[token("px")]
    Px,
    #[token("vp")]
    Vp,
    #[token("fp")]
    Fp,
    #[token("%")]
    Percent,

    #[regex(r"-?([0-9]+(\.[0-9]*)?|\.[0-9]+)", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

fn lex(literal: &str) -> Result<Vec<(Token, Span)>, DimensionError> {
    Token::lexer(literal)
        .spanned()
        .map(|(tok, span)| match tok {
            Ok(t) => Ok((t, span)),
            Err(()) => Err(unexpected(literal, span)),
        })
        .collect()
}

fn unexpected(literal: &str, span: Span) -> DimensionError {
    DimensionError::Unexpected {
        literal: literal.to_string(),
        found: literal.get(span.clone()).unwrap_or_default().to_string(),
        span,
    }
}
