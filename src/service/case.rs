//! Case analysis workflow

use std::sync::Arc;

use crate::db::DbError;
use crate::db::repository::CaseStore;
use crate::model::CaseDetail;
use crate::service::analysis::ComplaintAnalyzer;
use crate::service::remedies::derive_remedies;

/// Runs complaint analysis for a case and persists the outcome
pub struct CaseService {
    store: Arc<dyn CaseStore>,
    analyzer: Arc<ComplaintAnalyzer>,
}

impl CaseService {
    pub fn new(store: Arc<dyn CaseStore>, analyzer: Arc<ComplaintAnalyzer>) -> Self {
        Self { store, analyzer }
    }

    /// Analyze `text` for a case owned by the user, store summary, rubrics and
    /// remedies, and return the refreshed case.
    pub async fn analyze_case(
        &self,
        user_id: i64,
        case_id: i64,
        text: &str,
    ) -> Result<CaseDetail, DbError> {
        // Ownership check before spending an LLM call
        let case = self.store.get(user_id, case_id).await?;

        let analysis = self.analyzer.analyze(text).await;
        let remedies = derive_remedies(&analysis.rubrics);

        self.store
            .save_analysis(case.id, &analysis, &remedies)
            .await?;

        tracing::info!(
            case_id = case.id,
            risk = %analysis.risk,
            rubrics = analysis.rubrics.len(),
            "Case analyzed"
        );

        self.store.detail(user_id, case.id).await
    }
}
