//! Sample classification against the substance table.
//!
//! Classification is a pure decision: it never touches hardware and never
//! fails. "No match" means no known contaminant at an unsafe level.

use crate::substance::{Signature, SubstanceProfile, SubstanceTable};

/// One sensed sample. Produced once per cycle and consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub signature: Signature,
    pub amount: f32,
}

impl Sample {
    pub fn new(signature: impl Into<Signature>, amount: f32) -> Self {
        Self {
            signature: signature.into(),
            amount,
        }
    }
}

/// How a sensed signature is matched to a profile signature.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MatchPolicy {
    /// Component-wise equality.
    #[default]
    Exact,
    /// Any profile within `max_distance` (Euclidean); closest first.
    Nearest { max_distance: f32 },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SampleClassifier {
    policy: MatchPolicy,
}

impl SampleClassifier {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// First profile (table order, or distance then table order for
    /// `Nearest`) whose signature matches and whose limit the sample reaches.
    pub fn classify<'t>(
        &self,
        sample: &Sample,
        table: &'t SubstanceTable,
    ) -> Option<&'t SubstanceProfile> {
        match self.policy {
            MatchPolicy::Exact => table
                .iter()
                .find(|p| p.signature == sample.signature && at_or_over_limit(p, sample.amount)),
            MatchPolicy::Nearest { max_distance } => {
                let mut candidates: Vec<(f32, &SubstanceProfile)> = table
                    .iter()
                    .filter_map(|p| {
                        let d = p.signature.distance(&sample.signature);
                        (d <= max_distance).then_some((d, p))
                    })
                    .collect();
                // Stable sort keeps registration order among equal distances.
                candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
                candidates
                    .into_iter()
                    .map(|(_, p)| p)
                    .find(|p| at_or_over_limit(p, sample.amount))
            }
        }
    }
}

/// Classify with exact signature matching.
pub fn classify<'t>(sample: &Sample, table: &'t SubstanceTable) -> Option<&'t SubstanceProfile> {
    SampleClassifier::default().classify(sample, table)
}

#[inline]
fn at_or_over_limit(profile: &SubstanceProfile, amount: f32) -> bool {
    profile.upper_limit <= amount
}
