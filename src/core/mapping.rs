//! The pay-element mapping table.
//!
//! The mapping document is keyed by payrun element identifier and names the
//! GTN ("vendor") element feeding it:
//!
//! ```json
//! {
//!   "mappings": { "1001": { "vendor": "Basic Salary" }, "Backpay": { "vendor": "Backpay" } },
//!   "not_used": [ { "vendor": "Employer NI" } ]
//! }
//! ```
//!
//! Entries are indexed both ways so either side of the reconciliation can ask
//! "is this element mapped, and to what?" without a scan.

use crate::utils::error::{ReconError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingElementEntry {
    pub gtn_element: String,
    pub payrun_element: String,
}

impl MappingElementEntry {
    pub fn new(gtn_element: impl Into<String>, payrun_element: impl Into<String>) -> Self {
        Self {
            gtn_element: gtn_element.into(),
            payrun_element: payrun_element.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: Vec<MappingElementEntry>,
    by_gtn: HashMap<String, usize>,
    by_payrun: HashMap<String, Vec<usize>>,
    exemptions: HashSet<String>,
}

/// `vendor` values are usually strings, but numeric element codes show up too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Label {
    Text(String),
    Number(serde_json::Number),
}

impl Label {
    fn into_string(self) -> String {
        match self {
            Label::Text(s) => s,
            Label::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VendorEntry {
    vendor: Option<Label>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExemptionList {
    List(Vec<VendorEntry>),
    Columns { vendor: Vec<Label> },
    Keyed(BTreeMap<String, VendorEntry>),
}

#[derive(Debug, Deserialize)]
struct MappingDocument {
    mappings: Option<BTreeMap<String, VendorEntry>>,
    not_used: Option<ExemptionList>,
}

fn vendor_of(entry: VendorEntry, location: &str) -> Result<String> {
    entry
        .vendor
        .map(Label::into_string)
        .ok_or_else(|| ReconError::MappingError {
            message: format!("{} has no 'vendor' value", location),
        })
}

impl MappingTable {
    /// Builds the table, rejecting a GTN element mapped to two payrun elements.
    pub fn new(
        entries: impl IntoIterator<Item = MappingElementEntry>,
        exemptions: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let mut table = MappingTable {
            exemptions: exemptions.into_iter().collect(),
            ..Default::default()
        };

        for entry in entries {
            if let Some(&existing) = table.by_gtn.get(&entry.gtn_element) {
                let previous = &table.entries[existing];
                if previous.payrun_element == entry.payrun_element {
                    continue;
                }
                return Err(ReconError::MappingError {
                    message: format!(
                        "GTN element '{}' is mapped to both '{}' and '{}'",
                        entry.gtn_element, previous.payrun_element, entry.payrun_element
                    ),
                });
            }

            let index = table.entries.len();
            table.by_gtn.insert(entry.gtn_element.clone(), index);
            table
                .by_payrun
                .entry(entry.payrun_element.clone())
                .or_default()
                .push(index);
            table.entries.push(entry);
        }

        Ok(table)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_json_slice(content.as_bytes())
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let document: MappingDocument =
            serde_json::from_slice(bytes).map_err(|e| ReconError::MappingError {
                message: format!("mapping document is not valid: {}", e),
            })?;

        let mappings = document.mappings.ok_or_else(|| ReconError::MappingError {
            message: "missing top-level 'mappings' collection".to_string(),
        })?;
        let not_used = document.not_used.ok_or_else(|| ReconError::MappingError {
            message: "missing top-level 'not_used' collection".to_string(),
        })?;

        let entries = mappings
            .into_iter()
            .map(|(payrun_element, entry)| {
                let gtn_element = vendor_of(entry, &format!("mapping '{}'", payrun_element))?;
                Ok(MappingElementEntry::new(gtn_element, payrun_element))
            })
            .collect::<Result<Vec<_>>>()?;

        let exemptions = match not_used {
            ExemptionList::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, entry)| vendor_of(entry, &format!("not_used[{}]", i)))
                .collect::<Result<Vec<_>>>()?,
            ExemptionList::Columns { vendor } => {
                vendor.into_iter().map(Label::into_string).collect()
            }
            ExemptionList::Keyed(items) => items
                .into_iter()
                .map(|(key, entry)| vendor_of(entry, &format!("not_used '{}'", key)))
                .collect::<Result<Vec<_>>>()?,
        };

        let table = Self::new(entries, exemptions)?;
        tracing::debug!(
            "Loaded mapping table: {} entries, {} exemptions",
            table.len(),
            table.exemptions.len()
        );
        Ok(table)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The payrun element a GTN element maps to.
    pub fn payrun_for(&self, gtn_element: &str) -> Option<&str> {
        self.by_gtn
            .get(gtn_element)
            .map(|&i| self.entries[i].payrun_element.as_str())
    }

    /// Every entry targeting the given payrun element.
    pub fn entries_for_payrun<'a>(
        &'a self,
        payrun_element: &str,
    ) -> impl Iterator<Item = &'a MappingElementEntry> + 'a {
        self.by_payrun
            .get(payrun_element)
            .into_iter()
            .flatten()
            .map(move |&i| &self.entries[i])
    }

    pub fn is_mapped_gtn(&self, gtn_element: &str) -> bool {
        self.by_gtn.contains_key(gtn_element)
    }

    pub fn is_mapped_payrun(&self, payrun_element: &str) -> bool {
        self.by_payrun.contains_key(payrun_element)
    }

    pub fn is_exempt(&self, gtn_element: &str) -> bool {
        self.exemptions.contains(gtn_element)
    }

    pub fn exemptions(&self) -> impl Iterator<Item = &str> {
        self.exemptions.iter().map(String::as_str)
    }
}
