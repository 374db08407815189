use std::fmt::Write;

use indexmap::IndexMap;

use crate::document::FieldSource;

/// Experiments listed under each project before eliding the rest
pub const EXPERIMENTS_PER_PROJECT: usize = 3;

/// Human-readable overview of ranked experiments, grouped by project
/// (`iacpj_nm`) in order of first appearance.
///
/// ```text
/// "cmp" 검색 결과, 1개 과제에서 총 2건의 실험을 찾았습니다.
///
/// [CMP] P1 - 2건
///   - Dishing (PL-1)
///   - Erosion (PL-2)
/// ```
pub fn generate_summary<D: FieldSource + ?Sized>(documents: &[&D], query: &str) -> String {
    if documents.is_empty() {
        return format!("\"{query}\"에 대한 검색 결과가 없습니다. 다른 키워드로 시도해보세요.");
    }

    let mut groups: IndexMap<String, Vec<&D>> = IndexMap::new();
    for &doc in documents {
        let project = doc.field_text("iacpj_nm").unwrap_or_default().into_owned();
        groups.entry(project).or_default().push(doc);
    }

    let mut out = format!(
        "\"{query}\" 검색 결과, {}개 과제에서 총 {}건의 실험을 찾았습니다.",
        groups.len(),
        documents.len()
    );
    for (project, experiments) in &groups {
        let module = experiments
            .first()
            .and_then(|first| first.field_text("project_module").or_else(|| first.field_text("module")))
            .unwrap_or_default();
        // writing to a String cannot fail
        let _ = write!(out, "\n\n[{module}] {project} - {}건", experiments.len());
        for doc in experiments.iter().take(EXPERIMENTS_PER_PROJECT) {
            let eval_item = doc.field_text("eval_item").unwrap_or_default();
            let plan_id = doc.field_text("plan_id").unwrap_or_default();
            let _ = write!(out, "\n  - {eval_item} ({plan_id})");
        }
        if experiments.len() > EXPERIMENTS_PER_PROJECT {
            let _ = write!(out, "\n  ... 외 {}건", experiments.len() - EXPERIMENTS_PER_PROJECT);
        }
    }
    out
}
