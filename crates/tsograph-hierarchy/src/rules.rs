//! Naming-convention rule set for functional and technical systems
//!
//! Declared system names of the source model follow German building-services
//! conventions (`VL_Heizung`, `ZUL_Lueftung`, `PWC`, ...). Each functional
//! system kind owns an ordered list of patterns and, nested, an ordered list of
//! technical-system labels with their own patterns. Patterns are matched
//! case-insensitively against a prefix of the lower-cased name. Table order is
//! significant: the first technical label that matches a name wins.

use crate::error::RuleError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Controlled vocabulary of functional system classifications, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunctionalKind {
    #[serde(rename = "Automation System")]
    Automation,
    #[serde(rename = "Data System")]
    Data,
    #[serde(rename = "Electrical System")]
    Electrical,
    #[serde(rename = "Safety System")]
    Safety,
    #[serde(rename = "Fluid System")]
    Fluid,
    #[serde(rename = "Drainage System")]
    Drainage,
    #[serde(rename = "Sanitary System")]
    Sanitary,
    #[serde(rename = "Ventilation System")]
    Ventilation,
    #[serde(rename = "Heating System")]
    Heating,
    #[serde(rename = "Cooling System")]
    Cooling,
}

impl FunctionalKind {
    pub const ALL: [FunctionalKind; 10] = [
        FunctionalKind::Automation,
        FunctionalKind::Data,
        FunctionalKind::Electrical,
        FunctionalKind::Safety,
        FunctionalKind::Fluid,
        FunctionalKind::Drainage,
        FunctionalKind::Sanitary,
        FunctionalKind::Ventilation,
        FunctionalKind::Heating,
        FunctionalKind::Cooling,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FunctionalKind::Automation => "Automation System",
            FunctionalKind::Data => "Data System",
            FunctionalKind::Electrical => "Electrical System",
            FunctionalKind::Safety => "Safety System",
            FunctionalKind::Fluid => "Fluid System",
            FunctionalKind::Drainage => "Drainage System",
            FunctionalKind::Sanitary => "Sanitary System",
            FunctionalKind::Ventilation => "Ventilation System",
            FunctionalKind::Heating => "Heating System",
            FunctionalKind::Cooling => "Cooling System",
        }
    }
}

impl fmt::Display for FunctionalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FunctionalKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FunctionalKind::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| RuleError::UnknownFunctionalLabel(s.to_string()))
    }
}

// ── Raw tables (configuration form) ─────────────────────

/// Technical-system label with its patterns, e.g. `"Supply System_1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalTable {
    pub label: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Functional kind with its patterns and nested technical tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalTable {
    pub label: FunctionalKind,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub technical: Vec<TechnicalTable>,
}

/// Uncompiled rule tables. Arrays keep their order when loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTables {
    #[serde(default)]
    pub functional: Vec<FunctionalTable>,
}

const SUPPLY_RETURN_WATER: &[(&str, &[&str])] = &[
    ("Supply System", &[r"[\w\- ]*vorlauf[\w\- ]*", r"[\w\- ]*vl[\w\- ]*"]),
    ("Return System", &[r"[\w\- ]*rücklauf[\w\- ]*", r"\w*rl\w*"]),
];

const VENTILATION_PARTS: &[(&str, &[&str])] = &[
    (
        "Supply System_1",
        &[r"[\w\- ]*zuluft[\w\- ]*", r"[\w\- ]*sup[\w\- ]*", r"[\w\- ]*zul[\w\- ]*"],
    ),
    (
        "Return System_1",
        &[
            r"[\w\- ]*abluft[\w\- ]*",
            r"[\w\- ]*eth[\w\- ]*",
            r"[\w\- ]*eta[\w\- ]*",
            r"[\w\- ]*abl[\w\- ]*",
        ],
    ),
    (
        "Return System_2",
        &[
            r"[\w\- ]*fortluft[\w\- ]*",
            r"[\w\- ]*ehh[\w\- ]*",
            r"[\w\- ]*eha[\w\- ]*",
            r"[\w\- ]*fol[\w\- ]*",
        ],
    ),
    (
        "Supply System_2",
        &[
            r"[\w\- ]*oda[\w\- ]*",
            r"[\w\- ]*aussenluft[\w\- ]*",
            r"[\w\- ]*außenluft[\w\- ]*",
            r"[\w\- ]*aul[\w\- ]*",
        ],
    ),
    ("Distribution System", &[r"[\w\- ]*sea[\w\- ]*"]),
];

const SANITARY_PARTS: &[(&str, &[&str])] = &[
    (
        "Return System",
        &[r"[\w\- ]*abwasser[\w\- ]*", r"[\w\- ]*schmutzwasser[\w\- ]*"],
    ),
    (
        "Supply System",
        &[
            r"[\w\- ]*trinkwasser[\w\- ]*",
            r"[\w\- ]*pwc[\w\- ]*",
            r"[\w\- ]*pwh[\w\- ]*",
        ],
    ),
];

const DRAINAGE_PARTS: &[(&str, &[&str])] = &[(
    "Distribution System",
    &[
        r"[\w\- ]*regenwasser[\w\- ]*",
        r"[\w\- ]*brauchwasser[\w\- ]*",
        r"[\w\- ]*abwasser[\w\- ]*",
    ],
)];

fn standard_patterns(kind: FunctionalKind) -> &'static [&'static str] {
    match kind {
        FunctionalKind::Automation
        | FunctionalKind::Data
        | FunctionalKind::Electrical
        | FunctionalKind::Safety
        | FunctionalKind::Fluid => &[],
        FunctionalKind::Drainage => &[r"[\w\- ]*regenwasser[\w\- ]*", r"[\w\- ]*brauchwasser[\w\- ]*"],
        FunctionalKind::Sanitary => &[
            r"[\w\- ]*trinkwasser[\w\- ]*",
            r"[\w\- ]*pwc[\w\- ]*",
            r"[\w\- ]*pwh[\w\- ]*",
            r"[\w\- ]*abwasser[\w\- ]*",
            r"[\w\- ]*schmutzwasser[\w\- ]*",
        ],
        FunctionalKind::Ventilation => &[
            r"v_[\w\- ]*",
            r"[\w\- ]*ods[\w\- ]*",
            r"[\w\- ]*eta[\w\- ]*",
            r"[\w\- ]*eoa[\w\- ]*",
            r"[\w\- ]*sea[\w\- ]*",
            r"[\w\- ]*eha[\w\- ]*",
            r"[\w\- ]*sup[\w\- ]*",
            r"[\w\- ]*zuluft[\w\- ]*",
            r"[\w\- ]*abluft[\w\- ]*",
            r"[\w\- ]*fortluft[\w\- ]*",
            r"[\w\- ]*aussenluft[\w\- ]*",
            r"[\w\- ]*außenluft[\w\- ]*",
            r"[\w\- ]*lueftung[\w\- ]*",
            r"[\w\- ]*lüftung[\w\- ]*",
        ],
        FunctionalKind::Heating => &[
            r"h_[\w\- ]*",
            r"hrl[\w\- ]*",
            r"hvl[\w\- ]*",
            r"[\w\- ]*HRL[\w\- ]*",
            r"[\w\- ]*HVL[\w\- ]*",
            r"[\w\- ]*heizung[\w\- ]*",
        ],
        FunctionalKind::Cooling => &[r"c_[\w\- ]*", r"k_[\w\- ]*"],
    }
}

fn standard_parts(kind: FunctionalKind) -> &'static [(&'static str, &'static [&'static str])] {
    match kind {
        FunctionalKind::Heating | FunctionalKind::Cooling => SUPPLY_RETURN_WATER,
        FunctionalKind::Ventilation => VENTILATION_PARTS,
        FunctionalKind::Sanitary => SANITARY_PARTS,
        FunctionalKind::Drainage => DRAINAGE_PARTS,
        _ => &[],
    }
}

impl RuleTables {
    /// The built-in German naming conventions.
    pub fn standard() -> Self {
        let functional = FunctionalKind::ALL
            .into_iter()
            .map(|kind| FunctionalTable {
                label: kind,
                patterns: standard_patterns(kind).iter().map(|p| p.to_string()).collect(),
                technical: standard_parts(kind)
                    .iter()
                    .map(|(label, patterns)| TechnicalTable {
                        label: label.to_string(),
                        patterns: patterns.iter().map(|p| p.to_string()).collect(),
                    })
                    .collect(),
            })
            .collect();
        RuleTables { functional }
    }
}

// ── Compiled rules ──────────────────────────────────────

/// A compiled, prefix-anchored, case-insensitive name pattern.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:{})", pattern))
            .case_insensitive(true)
            .build()?;
        Ok(NamePattern {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern matches a prefix of the lower-cased `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(&name.to_lowercase())
    }
}

fn compile_all(label: &str, patterns: &[String]) -> Result<Vec<NamePattern>, RuleError> {
    patterns
        .iter()
        .map(|pattern| {
            NamePattern::compile(pattern).map_err(|source| RuleError::InvalidPattern {
                label: label.to_string(),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// A technical-system label and its patterns.
#[derive(Debug, Clone)]
pub struct TechnicalRule {
    label: String,
    patterns: Vec<NamePattern>,
}

impl TechnicalRule {
    /// Label as written in the table, possibly with a disambiguating suffix.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label with any `_n` suffix removed: `"Supply System_1"` becomes `"Supply System"`.
    pub fn classification(&self) -> &str {
        self.label
            .split_once('_')
            .map_or(self.label.as_str(), |(base, _)| base)
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}

/// A functional kind with its patterns and technical subdivisions.
#[derive(Debug, Clone)]
pub struct FunctionalRule {
    kind: FunctionalKind,
    patterns: Vec<NamePattern>,
    technical: Vec<TechnicalRule>,
}

impl FunctionalRule {
    pub fn kind(&self) -> FunctionalKind {
        self.kind
    }

    pub fn has_patterns(&self) -> bool {
        !self.patterns.is_empty()
    }

    /// A name matches as soon as one pattern succeeds.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }

    pub fn technical(&self) -> &[TechnicalRule] {
        &self.technical
    }

    /// Position of the first technical rule matching `name`; later rules are not consulted.
    pub fn technical_match(&self, name: &str) -> Option<usize> {
        self.technical
            .iter()
            .position(|rule| !rule.patterns.is_empty() && rule.matches(name))
    }
}

/// Compiled naming conventions, in table order.
#[derive(Debug, Clone)]
pub struct NamingRules {
    functional: Vec<FunctionalRule>,
}

impl NamingRules {
    /// Compile the built-in tables.
    pub fn standard() -> Result<Self, RuleError> {
        Self::from_tables(&RuleTables::standard())
    }

    pub fn from_tables(tables: &RuleTables) -> Result<Self, RuleError> {
        let mut functional = Vec::with_capacity(tables.functional.len());
        for table in &tables.functional {
            let technical = table
                .technical
                .iter()
                .map(|t| {
                    Ok(TechnicalRule {
                        label: t.label.clone(),
                        patterns: compile_all(&t.label, &t.patterns)?,
                    })
                })
                .collect::<Result<Vec<_>, RuleError>>()?;
            functional.push(FunctionalRule {
                kind: table.label,
                patterns: compile_all(table.label.label(), &table.patterns)?,
                technical,
            });
        }
        tracing::debug!("Compiled naming rules for {} functional kinds", functional.len());
        Ok(NamingRules { functional })
    }

    pub fn functional(&self) -> &[FunctionalRule] {
        &self.functional
    }

    pub fn rule_for(&self, kind: FunctionalKind) -> Option<&FunctionalRule> {
        self.functional.iter().find(|rule| rule.kind == kind)
    }

    /// Rule for a classification label such as `"Heating System"`.
    pub fn rule_for_label(&self, label: &str) -> Option<&FunctionalRule> {
        label.parse().ok().and_then(|kind| self.rule_for(kind))
    }
}

#[cfg(test)]
impl NamingRules {
    /// Every functional kind whose patterns match `name`, in table order.
    pub(crate) fn functional_matches(&self, name: &str) -> Vec<FunctionalKind> {
        self.functional
            .iter()
            .filter(|rule| rule.has_patterns() && rule.matches(name))
            .map(|rule| rule.kind)
            .collect()
    }
}
