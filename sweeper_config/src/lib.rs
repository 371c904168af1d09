#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and substance-table parsing for the sweeper.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Substance CSV loader enforces headers and rejects malformed rows.
use serde::Deserialize;
use std::collections::HashSet;

/// Concentration unit of a regulatory limit.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    #[serde(rename = "ug/L", alias = "µg/L", alias = "ug/l")]
    MicrogramsPerLitre,
    #[serde(rename = "mg/L", alias = "mg/l")]
    MilligramsPerLitre,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::MicrogramsPerLitre => "µg/L",
            Unit::MilligramsPerLitre => "mg/L",
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl core::str::FromStr for Unit {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ug/L" | "µg/L" | "ug/l" => Ok(Unit::MicrogramsPerLitre),
            "mg/L" | "mg/l" => Ok(Unit::MilligramsPerLitre),
            other => eyre::bail!("unknown unit '{other}' (expected ug/L or mg/L)"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Surface {
    pub height_mm: f32,
    pub width_mm: f32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Robot {
    pub drive_speed_mm_s: f32,
    #[serde(default)]
    pub turn_rate_deg_s: f32,
    pub width_mm: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CycleCfg {
    /// Forward-motion budget per cycle before a sample is taken.
    pub drive_ms: u64,
    /// Sleep between odometry polls.
    pub poll_ms: u64,
    /// Stop the run after this many cycles (0 disables the cap)
    pub max_cycles: u32,
}

impl Default for CycleCfg {
    fn default() -> Self {
        Self {
            drive_ms: 5_000,
            poll_ms: 10,
            max_cycles: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StopCfg {
    /// Number of consecutive polls required to latch the stop signal
    pub debounce_n: u8,
}

impl Default for StopCfg {
    fn default() -> Self {
        Self { debounce_n: 1 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Exact,
    Nearest,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ClassifierCfg {
    pub policy: MatchMode,
    /// Euclidean radius around a profile signature; only used by "nearest".
    pub max_distance: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AlertCfg {
    pub frequency_hz: u32,
    pub beep_ms: u64,
    pub gap_ms: u64,
    pub beeps: u8,
    pub message: String,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            frequency_hz: 600,
            beep_ms: 200,
            gap_ms: 100,
            beeps: 4,
            message: "CONTAMINATION DETECTED".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// One `[[substances]]` entry.
#[derive(Debug, Deserialize, Clone)]
pub struct SubstanceCfg {
    pub name: String,
    pub signature: [f32; 3],
    pub upper_limit: f32,
    #[serde(default)]
    pub unit: Unit,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub surface: Surface,
    pub robot: Robot,
    #[serde(default)]
    pub cycle: CycleCfg,
    #[serde(default)]
    pub stop: StopCfg,
    #[serde(default)]
    pub classifier: ClassifierCfg,
    #[serde(default)]
    pub alert: AlertCfg,
    #[serde(default)]
    pub logging: Logging,
    /// Optional CSV substance table; preferred over inline entries when present.
    #[serde(default)]
    pub substances_csv: Option<String>,
    /// Inline substance table; the builtin table is used when empty.
    #[serde(default)]
    pub substances: Vec<SubstanceCfg>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Substance CSV schema.
///
/// Expected headers:
/// name,s1,s2,s3,upper_limit,unit
///
/// Example:
/// name,s1,s2,s3,upper_limit,unit
/// copper,20,17,44,2.0,mg/L
#[derive(Debug, Deserialize)]
struct SubstanceRow {
    name: String,
    s1: f32,
    s2: f32,
    s3: f32,
    upper_limit: f32,
    unit: String,
}

pub fn load_substances_csv(path: &std::path::Path) -> eyre::Result<Vec<SubstanceCfg>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open substance CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["name", "s1", "s2", "s3", "upper_limit", "unit"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "substance CSV must have headers 'name,s1,s2,s3,upper_limit,unit', got: {}",
            actual.join(",")
        );
    }

    let mut out = Vec::new();
    for (idx, rec) in rdr.deserialize::<SubstanceRow>().enumerate() {
        let row = match rec {
            Ok(row) => row,
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        };
        let unit = row
            .unit
            .parse::<Unit>()
            .map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        out.push(SubstanceCfg {
            name: row.name,
            signature: [row.s1, row.s2, row.s3],
            upper_limit: row.upper_limit,
            unit,
        });
    }
    validate_substances(&out)?;
    Ok(out)
}

/// Reject empty or duplicate names and unusable limits.
pub fn validate_substances(entries: &[SubstanceCfg]) -> eyre::Result<()> {
    let mut seen = HashSet::new();
    for s in entries {
        if s.name.trim().is_empty() {
            eyre::bail!("substance name must not be empty");
        }
        if !seen.insert(s.name.as_str()) {
            eyre::bail!("duplicate substance name '{}'", s.name);
        }
        if !s.upper_limit.is_finite() || s.upper_limit < 0.0 {
            eyre::bail!("substance '{}': upper_limit must be finite and >= 0", s.name);
        }
        if s.signature.iter().any(|v| !v.is_finite()) {
            eyre::bail!("substance '{}': signature must be finite", s.name);
        }
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Surface / robot geometry
        if !(self.surface.height_mm.is_finite() && self.surface.height_mm > 0.0) {
            eyre::bail!("surface.height_mm must be > 0");
        }
        if !(self.surface.width_mm.is_finite() && self.surface.width_mm > 0.0) {
            eyre::bail!("surface.width_mm must be > 0");
        }
        if !(self.robot.width_mm.is_finite() && self.robot.width_mm > 0.0) {
            eyre::bail!("robot.width_mm must be > 0");
        }
        if self.robot.width_mm >= self.surface.width_mm {
            eyre::bail!("robot.width_mm must be < surface.width_mm");
        }
        if !(self.robot.drive_speed_mm_s.is_finite() && self.robot.drive_speed_mm_s > 0.0) {
            eyre::bail!("robot.drive_speed_mm_s must be > 0");
        }
        if !self.robot.turn_rate_deg_s.is_finite() {
            eyre::bail!("robot.turn_rate_deg_s must be finite");
        }

        // Cycle
        if self.cycle.drive_ms == 0 {
            eyre::bail!("cycle.drive_ms must be >= 1");
        }
        if self.cycle.poll_ms == 0 {
            eyre::bail!("cycle.poll_ms must be >= 1");
        }
        if self.cycle.poll_ms > self.cycle.drive_ms {
            eyre::bail!("cycle.poll_ms must be <= cycle.drive_ms");
        }

        // Stop signal
        if self.stop.debounce_n == 0 {
            eyre::bail!("stop.debounce_n must be >= 1");
        }

        // Classifier
        if !(self.classifier.max_distance.is_finite() && self.classifier.max_distance >= 0.0) {
            eyre::bail!("classifier.max_distance must be >= 0");
        }

        // Alert
        if self.alert.frequency_hz == 0 {
            eyre::bail!("alert.frequency_hz must be > 0");
        }

        validate_substances(&self.substances)?;

        Ok(())
    }
}
