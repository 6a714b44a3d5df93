// Named numeric parameters with defaults, as entered in a parameter dialog
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::tuning::PidGains;

/// Errors raised while filling in a parameter set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ParameterError {
    /// The entered text is neither empty nor a number.
    #[cfg_attr(feature = "std", error("Parameter `{name}` must be numeric or empty"))]
    NotNumeric {
        /// Name of the offending parameter.
        name: String,
    },

    /// No parameter with this name exists in the set.
    #[cfg_attr(feature = "std", error("Unknown parameter `{name}`"))]
    UnknownParameter {
        /// The name that was looked up.
        name: String,
    },
}

/// A recognized option: its key, the label shown to the user, and its default value.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpec {
    /// Key used to look the value up.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Value used until the user enters something else.
    pub default: f64,
}

impl ParameterSpec {
    /// Creates a parameter whose label is its name.
    pub fn new(name: impl Into<String>, default: f64) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            default,
        }
    }

    /// Replaces the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Accepts the text a numeric entry field may hold: empty, or anything that parses as a float.
pub fn is_numeric_or_empty(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text.parse::<f64>().is_ok()
}

/// An ordered set of named numeric parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    specs: Vec<ParameterSpec>,
    values: BTreeMap<String, f64>,
}

impl ParameterSet {
    /// Creates a set with every parameter at its default.
    pub fn new(specs: Vec<ParameterSpec>) -> Self {
        let values = specs
            .iter()
            .map(|spec| (spec.name.clone(), spec.default))
            .collect();
        Self { specs, values }
    }

    /// The `Kp`, `Ti` and `Td` entries offered after tuning, pre-filled with the tuned gains.
    pub fn from_gains(gains: &PidGains<f64>) -> Self {
        Self::new(alloc::vec![
            ParameterSpec::new("Kp", gains.kp),
            ParameterSpec::new("Ti", gains.ti),
            ParameterSpec::new("Td", gains.td),
        ])
    }

    /// Reads back `Kp`, `Ti` and `Td`.
    pub fn to_gains(&self) -> Result<PidGains<f64>, ParameterError> {
        Ok(PidGains {
            kp: self.require("Kp")?,
            ti: self.require("Ti")?,
            td: self.require("Td")?,
        })
    }

    /// Returns the parameter definitions in declaration order.
    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    /// Returns the current value of a parameter.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<f64, ParameterError> {
        self.get(name).ok_or_else(|| ParameterError::UnknownParameter {
            name: name.into(),
        })
    }

    /// Returns all current values keyed by name.
    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// Sets a parameter from user-entered text.
    ///
    /// Empty text restores the default. On error the stored value is unchanged.
    pub fn set_from_str(&mut self, name: &str, text: &str) -> Result<f64, ParameterError> {
        let spec = self
            .specs
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ParameterError::UnknownParameter { name: name.into() })?;

        let text = text.trim();
        let value = if text.is_empty() {
            spec.default
        } else {
            text.parse::<f64>()
                .map_err(|_| ParameterError::NotNumeric { name: name.into() })?
        };

        self.values.insert(spec.name.clone(), value);
        Ok(value)
    }

    /// Splits the values into those named in `selected`, in declaration order, and the rest.
    ///
    /// Used to separate the parameters an optimizer may vary from those it holds fixed.
    pub fn separate(&self, selected: &[&str]) -> (Vec<f64>, BTreeMap<String, f64>) {
        let mut chosen = Vec::new();
        let mut rest = BTreeMap::new();
        for spec in &self.specs {
            let value = self.get(&spec.name).unwrap_or(spec.default);
            if selected.contains(&spec.name.as_str()) {
                chosen.push(value);
            } else {
                rest.insert(spec.name.clone(), value);
            }
        }
        (chosen, rest)
    }
}
