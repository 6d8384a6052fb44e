//! Quality attributes that metrics measure

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualityAttribute {
    id: &'static str,
    name: &'static str,
}

impl QualityAttribute {
    pub const fn new(id: &'static str, name: &'static str) -> Self {
        Self { id, name }
    }

    pub fn id_string(&self) -> &'static str {
        self.id
    }

    pub fn attribute_name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for QualityAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for QualityAttribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id)
    }
}

pub const PROGRESS: QualityAttribute = QualityAttribute::new("progress", "progress");
pub const SPIRIT: QualityAttribute = QualityAttribute::new("spirit", "team spirit");
pub const ENVIRONMENT_QUALITY: QualityAttribute =
    QualityAttribute::new("environment_quality", "environment quality");
pub const TEST_QUALITY: QualityAttribute = QualityAttribute::new("test_quality", "test quality");
pub const PROJECT_MANAGEMENT: QualityAttribute =
    QualityAttribute::new("project_management", "project management");
pub const SECURITY: QualityAttribute = QualityAttribute::new("security", "security");
pub const META: QualityAttribute = QualityAttribute::new("", "");
