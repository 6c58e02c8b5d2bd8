//! Age buckets and free-text age descriptors.
//!
//! Backend age fields are free text (`"3-5"`, `"6+"`, `"18 months"`,
//! `"2-4 years"`). They are parsed once into an [`AgeDescriptor`]; anything
//! that cannot be read becomes [`AgeDescriptor::Unknown`], which always passes
//! the age filter.

use serde::Serialize;

/// One of the five fixed catalog age ranges, in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeBucket {
    Toddler,
    Preschool,
    EarlySchool,
    Tween,
    Teen,
}

impl AgeBucket {
    /// All buckets in display order.
    pub const ALL: [Self; 5] = [
        Self::Toddler,
        Self::Preschool,
        Self::EarlySchool,
        Self::Tween,
        Self::Teen,
    ];

    /// Bucket id as used in the `age` query parameter.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Toddler => "0-2",
            Self::Preschool => "3-5",
            Self::EarlySchool => "6-8",
            Self::Tween => "9-12",
            Self::Teen => "13+",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Toddler => "0-2 years",
            Self::Preschool => "3-5 years",
            Self::EarlySchool => "6-8 years",
            Self::Tween => "9-12 years",
            Self::Teen => "13+ years",
        }
    }

    /// Inclusive `(min, max)` range in years.
    #[must_use]
    pub const fn range(&self) -> (f64, f64) {
        match self {
            Self::Toddler => (0.0, 2.0),
            Self::Preschool => (3.0, 5.0),
            Self::EarlySchool => (6.0, 8.0),
            Self::Tween => (9.0, 12.0),
            Self::Teen => (13.0, 100.0),
        }
    }

    /// Look up a bucket by id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|b| b.id() == id)
    }
}

/// A parsed product age descriptor, in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgeDescriptor {
    /// `"3-5"`, `"18 months-3 years"`.
    Range { min: f64, max: f64 },
    /// `"6+"`.
    Minimum { min: f64 },
    /// `"4"`, `"18 months"`.
    Single { age: f64 },
    /// Missing or unparseable.
    Unknown,
}

impl AgeDescriptor {
    /// Parse a free-text descriptor. Never fails.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(text) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Unknown;
        };

        if text.contains('-') {
            let mut parts = text.splitn(2, '-');
            let min = parts.next().and_then(years);
            let max = parts.next().and_then(years);
            return match (min, max) {
                (Some(min), Some(max)) => Self::Range { min, max },
                _ => Self::Unknown,
            };
        }

        if text.contains('+') {
            return years(text).map_or(Self::Unknown, |min| Self::Minimum { min });
        }

        years(text).map_or(Self::Unknown, |age| Self::Single { age })
    }

    /// Whether a product with this descriptor belongs in `bucket`.
    #[must_use]
    pub fn matches(&self, bucket: AgeBucket) -> bool {
        let (bucket_min, bucket_max) = bucket.range();
        match *self {
            Self::Range { min, max } => min <= bucket_max && max >= bucket_min,
            Self::Minimum { min } => min <= bucket_max,
            Self::Single { age } => age >= bucket_min && age <= bucket_max,
            Self::Unknown => true,
        }
    }
}

/// Convert one descriptor fragment to years.
///
/// Reads the leading number; a fragment mentioning "month" is divided by 12.
fn years(fragment: &str) -> Option<f64> {
    let value = leading_number(fragment)?;
    if fragment.to_lowercase().contains("month") {
        Some(value / 12.0)
    } else {
        Some(value)
    }
}

/// Parse the numeric prefix of a string (`" 18 months"` -> 18.0).
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || c == '.'))
        .map_or(s.len(), |(i, _)| i);

    s.get(..end)
        .filter(|n| !n.is_empty())
        .and_then(|n| n.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
