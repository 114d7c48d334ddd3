//! Response types for the EBI Proteins API JSON entries.
//! Only the fields protmatch displays are decoded; everything else is ignored
//! and missing fields fall back to their defaults.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProteinEntry {
    pub accession: String,
    pub id: String,
    pub protein_existence: String,
    pub protein: ProteinNames,
    pub organism: Organism,
    pub gene: Vec<Gene>,
    pub keywords: Vec<Keyword>,
    pub sequence: SequenceInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProteinNames {
    pub recommended_name: Option<RecommendedName>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendedName {
    pub full_name: EvidencedValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EvidencedValue {
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Organism {
    pub taxonomy: u64,
    pub names: Vec<OrganismName>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrganismName {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Gene {
    pub name: Option<EvidencedValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Keyword {
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SequenceInfo {
    pub version: u32,
    pub length: usize,
    pub mass: u64,
    pub sequence: String,
}

impl ProteinEntry {
    pub fn full_name(&self) -> Option<&str> {
        self.protein
            .recommended_name
            .as_ref()
            .map(|n| n.full_name.value.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn scientific_name(&self) -> Option<&str> {
        self.organism
            .names
            .iter()
            .find(|n| n.kind == "scientific")
            .map(|n| n.value.as_str())
    }

    pub fn gene_names(&self) -> Vec<&str> {
        self.gene
            .iter()
            .filter_map(|g| g.name.as_ref())
            .map(|n| n.value.as_str())
            .collect()
    }
}
