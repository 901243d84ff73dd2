//! Per-model variable catalogs.
//!
//! These are static lookup tables for variable pickers (name -> label/unit) and
//! for the column sets the quality validator treats as physically non-negative.
//! They carry no computation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::{ResultData, ResultsError};

/// Edge channel read directly from edge data, never derived from a node.
pub const FLOW_RATE: &str = "flow_rate";

/// Node variable excluded from propagation and visualization.
pub const VOLUME: &str = "volume";

/// Simulation model family a payload was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    Asm1,
    Asm1Slim,
    Asm3,
    /// User-defined model: open variable set, discovered from data.
    Udm,
}

impl ModelType {
    pub const ALL: [ModelType; 4] = [
        ModelType::Asm1,
        ModelType::Asm1Slim,
        ModelType::Asm3,
        ModelType::Udm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Asm1 => "asm1",
            ModelType::Asm1Slim => "asm1slim",
            ModelType::Asm3 => "asm3",
            ModelType::Udm => "udm",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelType::Asm1 => "ASM1",
            ModelType::Asm1Slim => "ASM1Slim",
            ModelType::Asm3 => "ASM3",
            ModelType::Udm => "UDM",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = ResultsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ModelType::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ResultsError::UnknownModel {
                name: s.to_string(),
            })
    }
}

/// Catalog entry for a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableInfo {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

const fn var(name: &'static str, label: &'static str, unit: &'static str) -> VariableInfo {
    VariableInfo { name, label, unit }
}

const ASM1_VARIABLES: &[VariableInfo] = &[
    var("S_S", "Readily biodegradable substrate", "mg COD/L"),
    var("S_NH", "Ammonia nitrogen", "mg N/L"),
    var("S_NO", "Nitrate nitrogen", "mg N/L"),
    var("S_O", "Dissolved oxygen", "mg O2/L"),
    var("S_ND", "Soluble organic nitrogen", "mg N/L"),
    var("S_ALK", "Alkalinity", "mol HCO3-/L"),
    var("X_BH", "Heterotrophic biomass", "mg COD/L"),
    var("X_BA", "Autotrophic biomass", "mg COD/L"),
    var("X_S", "Slowly biodegradable substrate", "mg COD/L"),
    var("X_i", "Particulate inert matter", "mg COD/L"),
    var("X_ND", "Particulate organic nitrogen", "mg N/L"),
    var(VOLUME, "Volume", "m³"),
];

const ASM1_SLIM_VARIABLES: &[VariableInfo] = &[
    var("dissolvedOxygen", "Dissolved oxygen", "mg/L"),
    var("cod", "COD", "mg/L"),
    var("nitrate", "Nitrate nitrogen", "mg/L"),
    var("ammonia", "Ammonia nitrogen", "mg/L"),
    var("totalAlkalinity", "Total alkalinity", "mg/L"),
    var(VOLUME, "Volume", "m³"),
];

const ASM3_VARIABLES: &[VariableInfo] = &[
    var("S_S", "Soluble substrate", "mg COD/L"),
    var("S_NH", "Ammonia nitrogen", "mg N/L"),
    var("S_NO", "Nitrate and nitrite nitrogen", "mg N/L"),
    var("S_O", "Dissolved oxygen", "mg O2/L"),
    var("S_ND", "Soluble organic nitrogen", "mg N/L"),
    var("S_ALK", "Alkalinity", "mmol/L"),
    var("S_I", "Soluble inert matter", "mg COD/L"),
    var("X_H", "Heterotrophic biomass", "mg COD/L"),
    var("X_A", "Autotrophic biomass", "mg COD/L"),
    var("X_S", "Particulate degradable substrate", "mg COD/L"),
    var("X_I", "Particulate inert matter", "mg COD/L"),
    var("X_ND", "Particulate organic nitrogen", "mg N/L"),
    var("X_STO", "Storage products", "mg COD/L"),
    var(VOLUME, "Volume", "m³"),
];

const ASM1_NON_NEGATIVE: &[&str] = &[
    "S_S", "S_NH", "S_NO", "S_O", "X_BH", "X_BA", "X_S", "X_i", "X_ND", "S_ND", "S_ALK",
];

const ASM1_SLIM_NON_NEGATIVE: &[&str] =
    &["dissolvedOxygen", "cod", "nitrate", "ammonia", "totalAlkalinity"];

const ASM3_NON_NEGATIVE: &[&str] = &[
    "S_S", "S_NH", "S_NO", "S_O", "S_ND", "S_ALK", "S_I", "X_H", "X_A", "X_S", "X_I", "X_ND",
    "X_STO",
];

/// Static catalog for a model family. UDM has an open catalog and returns an empty table.
pub fn variables(model: ModelType) -> &'static [VariableInfo] {
    match model {
        ModelType::Asm1 => ASM1_VARIABLES,
        ModelType::Asm1Slim => ASM1_SLIM_VARIABLES,
        ModelType::Asm3 => ASM3_VARIABLES,
        ModelType::Udm => &[],
    }
}

pub fn lookup(model: ModelType, name: &str) -> Option<&'static VariableInfo> {
    variables(model).iter().find(|v| v.name == name)
}

/// Columns the quality validator treats as physically non-negative.
pub fn non_negative_columns(model: ModelType) -> &'static [&'static str] {
    match model {
        ModelType::Asm1 => ASM1_NON_NEGATIVE,
        ModelType::Asm1Slim => ASM1_SLIM_NON_NEGATIVE,
        ModelType::Asm3 => ASM3_NON_NEGATIVE,
        ModelType::Udm => &[],
    }
}

/// A variable offered to a picker, resolved against an actual payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableVariable {
    pub name: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Variables present on at least one node.
///
/// Catalog models report catalog entries in catalog order; UDM reports every
/// series name found in the data, sorted, labelled by its own name.
pub fn available_variables(result: &ResultData, model: ModelType) -> Vec<AvailableVariable> {
    let present: BTreeSet<&str> = result
        .node_data
        .values()
        .flat_map(|node| node.variables.keys().map(String::as_str))
        .collect();

    match model {
        ModelType::Udm => present
            .into_iter()
            .map(|name| AvailableVariable {
                name: name.to_string(),
                label: name.to_string(),
                unit: None,
            })
            .collect(),
        _ => variables(model)
            .iter()
            .filter(|info| present.contains(info.name))
            .map(|info| AvailableVariable {
                name: info.name.to_string(),
                label: info.label.to_string(),
                unit: Some(info.unit.to_string()),
            })
            .collect(),
    }
}

/// Same as [`available_variables`] without `volume`.
pub fn plottable_variables(result: &ResultData, model: ModelType) -> Vec<AvailableVariable> {
    available_variables(result, model)
        .into_iter()
        .filter(|v| v.name != VOLUME)
        .collect()
}

/// Non-empty node labels, in node id order.
pub fn available_nodes(result: &ResultData) -> Vec<String> {
    result
        .node_data
        .values()
        .filter(|n| !n.label.is_empty())
        .map(|n| n.label.clone())
        .collect()
}
