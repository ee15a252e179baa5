//! Document feature entity.
//!
//! Rows are written by the external feature-extraction process. The style
//! vector is stored as a JSON array of floats.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Extraction progress for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FeatureStatus {
    #[sea_orm(string_value = "queued")]
    Queued,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "done")]
    Done,
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Declared length of a style vector in the current feature contract.
pub const STYLE_VECTOR_LEN: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_feature")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub document_id: i64,

    pub status: FeatureStatus,

    /// Categorical style label
    #[sea_orm(nullable, indexed)]
    pub style_label: Option<String>,

    /// Style vector as a JSON array of numbers
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub style_vector: Option<Json>,

    #[sea_orm(nullable)]
    pub cluster_id: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Decode a stored style vector. Anything that is not an array of numbers
/// yields `None`.
#[must_use]
pub fn parse_style_vector(value: &Json) -> Option<Vec<f64>> {
    value
        .as_array()?
        .iter()
        .map(serde_json::Value::as_f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_style_vector() {
        assert_eq!(parse_style_vector(&json!([1.0, 0.5, 0])), Some(vec![1.0, 0.5, 0.0]));
        assert_eq!(parse_style_vector(&json!([])), Some(vec![]));
        assert_eq!(parse_style_vector(&json!([1.0, "x"])), None);
        assert_eq!(parse_style_vector(&json!({"v": [1.0]})), None);
    }
}
