//! Substance signatures and the ordered registry they are matched against.

use std::collections::HashSet;

use crate::error::SweeperError;

pub use sweeper_config::Unit;

/// 3-component sensed value used as a proxy for substance identity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signature(pub [f32; 3]);

impl Signature {
    pub const fn new(a: f32, b: f32, c: f32) -> Self {
        Self([a, b, c])
    }

    pub fn components(&self) -> [f32; 3] {
        self.0
    }

    /// Euclidean distance between two signatures.
    pub fn distance(&self, other: &Signature) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }
}

impl From<[f32; 3]> for Signature {
    fn from(v: [f32; 3]) -> Self {
        Signature(v)
    }
}

impl core::fmt::Display for Signature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "({a}, {b}, {c})")
    }
}

/// A known substance and its regulatory limit.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstanceProfile {
    pub name: String,
    pub signature: Signature,
    /// Amount at or above which the substance is considered unsafe.
    pub upper_limit: f32,
    pub unit: Unit,
}

impl SubstanceProfile {
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<Signature>,
        upper_limit: f32,
        unit: Unit,
    ) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            upper_limit,
            unit,
        }
    }
}

/// Ordered, immutable registry of substance profiles.
///
/// Names are unique. Signatures are not: two profiles may share one, and
/// matching then resolves by registration order.
#[derive(Debug, Clone, Default)]
pub struct SubstanceTable {
    profiles: Vec<SubstanceProfile>,
}

impl SubstanceTable {
    pub fn new(profiles: Vec<SubstanceProfile>) -> Result<Self, SweeperError> {
        {
            let mut seen = HashSet::new();
            for p in &profiles {
                if p.name.trim().is_empty() {
                    return Err(SweeperError::Config(
                        "substance name must not be empty".into(),
                    ));
                }
                if !seen.insert(p.name.as_str()) {
                    return Err(SweeperError::Config(format!(
                        "duplicate substance name '{}'",
                        p.name
                    )));
                }
                if !p.upper_limit.is_finite() || p.upper_limit < 0.0 {
                    return Err(SweeperError::Config(format!(
                        "substance '{}': upper limit must be finite and >= 0",
                        p.name
                    )));
                }
            }
        }
        let table = Self { profiles };
        for (a, b) in table.shared_signatures() {
            tracing::warn!(
                first = a,
                second = b,
                "substances share a signature; first registered wins"
            );
        }
        Ok(table)
    }

    /// Reference table: EU drinking-water limits with demo signatures.
    pub fn builtin() -> Self {
        use Unit::{MicrogramsPerLitre as Ug, MilligramsPerLitre as Mg};
        let rows: [(&str, [f32; 3], f32, Unit); 15] = [
            ("acrylamide", [5.0, 6.0, 2.0], 0.10, Ug),
            ("antimony", [40.0, 25.0, 34.0], 5.0, Ug),
            ("arsenic", [40.0, 40.0, 40.0], 10.0, Ug),
            ("benzene", [40.0, 20.0, 30.0], 1.0, Ug),
            ("cadmium", [20.0, 20.0, 40.0], 5.0, Ug),
            ("chromium", [19.0, 21.0, 39.0], 10.0, Ug),
            ("copper", [20.0, 17.0, 44.0], 2.0, Mg),
            ("cyanide", [10.0, 12.0, 21.0], 50.0, Ug),
            ("fluoride", [19.0, 18.0, 45.0], 1.5, Mg),
            ("lead", [20.0, 18.0, 44.0], 10.0, Ug),
            ("mercury", [19.0, 18.0, 45.0], 1.0, Ug),
            ("nickel", [23.0, 11.0, 35.0], 10.0, Mg),
            ("nitrate", [20.0, 18.0, 45.0], 50.0, Ug),
            ("nitrite", [20.0, 17.0, 45.0], 0.5, Mg),
            ("phosphorus", [6.0, 5.0, 11.0], 0.10, Ug),
        ];
        Self {
            profiles: rows
                .into_iter()
                .map(|(name, sig, limit, unit)| SubstanceProfile::new(name, sig, limit, unit))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SubstanceProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Profiles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SubstanceProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Pairs of profile names with identical signatures, in table order.
    pub fn shared_signatures(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for (i, a) in self.profiles.iter().enumerate() {
            for b in &self.profiles[i + 1..] {
                if a.signature == b.signature {
                    out.push((a.name.as_str(), b.name.as_str()));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_unique_names_and_known_ambiguities() {
        let t = SubstanceTable::builtin();
        assert_eq!(t.len(), 15);
        let rebuilt = SubstanceTable::new(t.iter().cloned().collect());
        assert!(rebuilt.is_ok());
        assert!(t.shared_signatures().contains(&("fluoride", "mercury")));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = SubstanceTable::new(vec![
            SubstanceProfile::new("lead", [1.0, 2.0, 3.0], 1.0, Unit::MicrogramsPerLitre),
            SubstanceProfile::new("lead", [4.0, 5.0, 6.0], 1.0, Unit::MicrogramsPerLitre),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate substance name 'lead'"));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Signature::new(0.0, 0.0, 0.0);
        let b = Signature::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.to_string(), "(3, 4, 0)");
    }
}
