//! Résumé data (`data.yaml`)

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Root of data.yaml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Data {
    pub name: String,
    pub title: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub linkedin: String,
    pub portfolio: String,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub skills: Skills,
    pub education: Vec<Education>,
    pub certifications: Vec<Certification>,
}

/// A single work experience entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub highlights: Vec<String>,
    pub technologies: String,
}

/// Skill categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub languages: Vec<String>,
    pub frontend: Vec<String>,
    pub backend: Vec<String>,
    pub cloud_devops: Vec<String>,
    pub databases: Vec<String>,
    pub tools: Vec<String>,
}

impl Skills {
    /// Non-empty categories as `(key, skills)` pairs, in display order
    pub fn categories(&self) -> Vec<(&'static str, &[String])> {
        [
            ("languages", self.languages.as_slice()),
            ("frontend", self.frontend.as_slice()),
            ("backend", self.backend.as_slice()),
            ("cloud_devops", self.cloud_devops.as_slice()),
            ("databases", self.databases.as_slice()),
            ("tools", self.tools.as_slice()),
        ]
        .into_iter()
        .filter(|(_, skills)| !skills.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub status: String,
    pub graduation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub name: String,
    pub issued: String,
    pub expires: String,
    pub credential_id: String,
}

impl Data {
    /// Decode data.yaml contents
    pub fn from_yaml(content: &[u8]) -> Result<Self> {
        serde_yaml::from_slice(content).map_err(Error::Data)
    }
}
