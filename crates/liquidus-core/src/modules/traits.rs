use crate::domain::{AnalysisArtifact, AnalysisRequest, LiquidusResult};

pub trait StageExecutor {
    fn execute(&self, request: &AnalysisRequest) -> LiquidusResult<Vec<AnalysisArtifact>>;
}

#[cfg(test)]
mod tests {
    use super::StageExecutor;
    use crate::domain::{
        AnalysisArtifact, AnalysisRequest, LiquidusError, LiquidusErrorCategory, PipelineStage,
    };

    struct FailingStage;

    impl StageExecutor for FailingStage {
        fn execute(
            &self,
            _request: &AnalysisRequest,
        ) -> crate::domain::LiquidusResult<Vec<AnalysisArtifact>> {
            Err(LiquidusError::computation(
                "RUN.STAGE",
                "stage execution failed",
            ))
        }
    }

    #[test]
    fn executor_errors_keep_their_category() {
        let request = AnalysisRequest::new(PipelineStage::Analyze, "export.xml", "out");
        let stage: &dyn StageExecutor = &FailingStage;
        let error = stage
            .execute(&request)
            .expect_err("failing stage should return an error");

        assert_eq!(error.category(), LiquidusErrorCategory::ComputationError);
        assert_eq!(error.placeholder(), "RUN.STAGE");
    }
}
