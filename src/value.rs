use std::{collections::BTreeMap, fmt};

use crate::error::{ScrubError, ScrubResult};

pub const OPACITY: &str = "opacity";
pub const VISIBILITY: &str = "visibility";
pub const VISIBLE: &str = "visible";
pub const HIDDEN: &str = "hidden";

/// Property name -> value, ordered so writes are deterministic.
pub type PropertyMap = BTreeMap<String, PropValue>;

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Px,
    Percent,
    Vh,
    Vw,
    Rem,
    Em,
    Deg,
}

impl Unit {
    // Longest suffixes first so "rem" is not read as "em".
    const ALL: [Unit; 7] = [
        Unit::Rem,
        Unit::Px,
        Unit::Vh,
        Unit::Vw,
        Unit::Em,
        Unit::Deg,
        Unit::Percent,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Percent => "%",
            Self::Vh => "vh",
            Self::Vw => "vw",
            Self::Rem => "rem",
            Self::Em => "em",
            Self::Deg => "deg",
        }
    }
}

/// A single animatable style value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawValue", into = "RawValue")]
pub enum PropValue {
    Number(f64),
    Length(f64, Unit),
    Keyword(String),
}

impl PropValue {
    pub fn keyword(s: impl Into<String>) -> Self {
        Self::Keyword(s.into())
    }

    pub fn visible() -> Self {
        Self::keyword(VISIBLE)
    }

    pub fn hidden() -> Self {
        Self::keyword(HIDDEN)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) | Self::Length(v, _) => Some(*v),
            Self::Keyword(_) => None,
        }
    }

    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(self, Self::Keyword(k) if k == kw)
    }

    pub fn parse(s: &str) -> ScrubResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ScrubError::invalid("property value must be non-empty"));
        }
        if let Ok(v) = s.parse::<f64>() {
            return finite(v).map(Self::Number);
        }
        for unit in Unit::ALL {
            if let Some(num) = s.strip_suffix(unit.suffix())
                && let Ok(v) = num.trim_end().parse::<f64>()
            {
                return finite(v).map(|v| Self::Length(v, unit));
            }
        }
        Ok(Self::Keyword(s.to_string()))
    }

    fn is_finite(&self) -> bool {
        self.as_number().is_none_or(f64::is_finite)
    }
}

fn finite(v: f64) -> ScrubResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ScrubError::invalid("property value must be finite"))
    }
}

impl Lerp for PropValue {
    /// Numbers and same-unit lengths interpolate linearly. Everything else
    /// steps at the midpoint, except that `visible` wins over any other
    /// keyword strictly between the endpoints.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if t <= 0.0 {
            return a.clone();
        }
        if t >= 1.0 {
            return b.clone();
        }
        match (a, b) {
            (Self::Number(x), Self::Number(y)) => Self::Number(f64::lerp(x, y, t)),
            (Self::Length(x, ux), Self::Length(y, uy)) if ux == uy => {
                Self::Length(f64::lerp(x, y, t), *ux)
            }
            _ if a.is_keyword(VISIBLE) || b.is_keyword(VISIBLE) => Self::visible(),
            _ if t < 0.5 => a.clone(),
            _ => b.clone(),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Length(v, unit) => write!(f, "{v}{}", unit.suffix()),
            Self::Keyword(k) => f.write_str(k),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

impl TryFrom<RawValue> for PropValue {
    type Error = ScrubError;

    fn try_from(raw: RawValue) -> ScrubResult<Self> {
        match raw {
            RawValue::Number(v) => finite(v).map(Self::Number),
            RawValue::Text(s) => Self::parse(&s),
        }
    }
}

impl From<PropValue> for RawValue {
    fn from(v: PropValue) -> Self {
        match v {
            PropValue::Number(n) => Self::Number(n),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Rejects maps that carry empty property names or non-finite numbers.
pub fn validate_map(map: &PropertyMap) -> ScrubResult<()> {
    for (name, value) in map {
        if name.trim().is_empty() {
            return Err(ScrubError::invalid("property name must be non-empty"));
        }
        if !value.is_finite() {
            return Err(ScrubError::invalid(format!(
                "property '{name}' has a non-finite value"
            )));
        }
    }
    Ok(())
}
