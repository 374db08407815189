use serde::{Deserialize, Serialize};

use super::FieldSource;

/// One entry of a projection: a field accessor and how many times its text
/// is repeated in the projected blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedField {
    pub accessor: Box<str>,
    pub weight: u32,
}

/// Ordered `(accessor, weight)` list turning a document into one text blob.
///
/// A weight of `w` concatenates the field text `w` times, so each of its
/// tokens counts `w` times toward term frequency.
///
/// # Examples
/// ```
/// use lab_search::{Document, Projection};
/// let projection = Projection::new().field("eval_item", 1).field("iacpj_ta_goa", 3);
/// let doc = Document::new().with("eval_item", "CMP").with("iacpj_ta_goa", "Dishing");
/// assert_eq!(projection.project(&doc), "CMP Dishing Dishing Dishing");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    fields: Vec<ProjectedField>,
}

/// Experiment fields, weight 1
const EXPERIMENT_FIELDS: &[&str] = &[
    "iacpj_nm",
    "module",
    "eval_item",
    "eval_process",
    "eval_category",
    "requester",
    "lot_code",
    "plan_id",
    "team",
    "wf_direction",
    "prev_eval",
    "cross_experiment",
    "lot_request",
    "reference",
    "volume_split",
    "assign_wf",
    "refdata",
    "request_date",
];

/// Project fields; purpose, goal and status are up-weighted
const PROJECT_FIELDS: &[(&str, u32)] = &[
    ("project_purpose", 2),
    ("iacpj_ta_goa", 3),
    ("iacpj_cur_stt", 2),
    ("iacpj_tech_n", 1),
    ("project_module", 1),
    ("iacpj_tgt_n", 1),
    ("iacpj_ch_n", 1),
    ("ia_ta_grd_n", 1),
    ("iacpj_level", 1),
    ("iacpj_nud_n", 1),
    ("iacpj_core_tec", 1),
    ("ia_ch_or_n", 1),
];

/// Split Table row fields, nested under `_splits`
const SPLIT_FIELDS: &[&str] = &[
    "_splits[].fac_id",
    "_splits[].oper_id",
    "_splits[].oper_nm",
    "_splits[].eps_lot_gbn_cd",
    "_splits[].work_cond_desc",
    "_splits[].eqp_id",
    "_splits[].recipe_id",
    "_splits[].note",
];

impl Projection {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field. A weight of 0 is ignored.
    pub fn field(mut self, accessor: &str, weight: u32) -> Self {
        if weight > 0 {
            self.fields.push(ProjectedField { accessor: accessor.into(), weight });
        }
        self
    }

    /// Projection of a flattened experiment + project row with its Split
    /// Table rows
    pub fn experiment() -> Self {
        let mut projection = Projection::new();
        for accessor in EXPERIMENT_FIELDS {
            projection = projection.field(accessor, 1);
        }
        for (accessor, weight) in PROJECT_FIELDS {
            projection = projection.field(accessor, *weight);
        }
        for accessor in SPLIT_FIELDS {
            projection = projection.field(accessor, 1);
        }
        projection
    }

    pub fn fields(&self) -> &[ProjectedField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Project a document to its weighted text blob.
    /// Absent fields are skipped; present ones are joined with single spaces.
    pub fn project<D: FieldSource + ?Sized>(&self, doc: &D) -> String {
        let mut parts: Vec<std::borrow::Cow<'_, str>> = Vec::new();
        for field in &self.fields {
            if let Some(text) = doc.field_text(&field.accessor) {
                for _ in 1..field.weight {
                    parts.push(text.clone());
                }
                parts.push(text);
            }
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::Document;

    #[test]
    fn weights_repeat_field_text() {
        let projection = Projection::new()
            .field("module", 1)
            .field("iacpj_ta_goa", 3)
            .field("ignored", 0);
        let doc = Document::new().with("module", "CMP").with("iacpj_ta_goa", "Dishing 개선");
        assert_eq!(projection.project(&doc), "CMP Dishing 개선 Dishing 개선 Dishing 개선");
        assert_eq!(projection.fields().len(), 2);
    }

    #[test]
    fn missing_fields_are_skipped() {
        let projection = Projection::new().field("a", 1).field("b", 2).field("c", 1);
        let doc = Document::new().with("c", "z");
        assert_eq!(projection.project(&doc), "z");
        assert_eq!(projection.project(&Document::new()), "");
    }

    #[test]
    fn experiment_projection_covers_nested_splits() {
        let doc = Document::from_value(json!({
            "eval_item": "Dishing",
            "iacpj_ta_goa": "goal",
            "_splits": [{ "oper_nm": "CMP" }, { "eqp_id": "EQ7" }]
        }))
        .unwrap();
        let text = Projection::experiment().project(&doc);
        assert_eq!(text, "Dishing goal goal goal CMP EQ7");
    }
}
