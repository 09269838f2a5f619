//! Korean → dialect translation of source datasets.

use std::sync::Arc;

use dialectbench_core::{translation_layout, translation_prompt, Dataset, DatasetRow, Dialect, TranslationColumn};
use tracing::warn;

use crate::providers::{CompletionConfig, LlmProvider};

/// Translates cells of one dataset into one dialect.
pub struct Translator {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
    dialect: Dialect,
}

impl Translator {
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig, dialect: Dialect) -> Self {
        Self {
            provider,
            completion,
            dialect,
        }
    }

    /// Translate one text.
    ///
    /// Blank input is returned as an empty string without a model call. If
    /// the call fails the original text is kept.
    pub async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let prompt = translation_prompt(text, self.dialect);
        match self.provider.complete(&prompt.compose(), &self.completion).await {
            Ok(response) => response.content.trim().to_string(),
            Err(e) => {
                warn!(dialect = %self.dialect, error = %e, "Translation failed, keeping source text");
                text.to_string()
            }
        }
    }

    /// Output record for one source row, in the dataset's column layout.
    pub async fn translate_row(&self, dataset: Dataset, row: &DatasetRow) -> Vec<String> {
        let mut record = Vec::new();
        for column in translation_layout(dataset) {
            let value = match column {
                TranslationColumn::Passthrough(name) => row.get(name).unwrap_or_default().to_string(),
                TranslationColumn::Translate { source, .. } => {
                    self.translate(row.get(source).unwrap_or_default()).await
                }
                TranslationColumn::Blank(_) => String::new(),
            };
            record.push(value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CompletionResponse, ProviderError, TokenUsage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Returns the last line of the prompt wrapped in brackets.
    struct BracketProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LlmProvider for BracketProvider {
        async fn complete(
            &self,
            prompt: &str,
            config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::HttpError("connection reset".to_string()));
            }
            let last = prompt.lines().last().unwrap_or_default();
            Ok(CompletionResponse {
                content: format!("  [{}]\n", last),
                usage: TokenUsage::default(),
                model: config.model.clone(),
                finish_reason: None,
            })
        }

        fn name(&self) -> &str {
            "bracket"
        }
    }

    fn translator(fail: bool) -> (Arc<BracketProvider>, Translator) {
        let provider = Arc::new(BracketProvider {
            calls: AtomicUsize::new(0),
            fail,
        });
        let translator = Translator::new(
            provider.clone(),
            CompletionConfig::new("gemini-2.5-pro", Duration::from_secs(1)),
            Dialect::Gyeongsang,
        );
        (provider, translator)
    }

    #[tokio::test]
    async fn test_translate_trims_reply() {
        let (_, translator) = translator(false);
        assert_eq!(translator.translate("밥 먹었어?").await, "[밥 먹었어?]");
    }

    #[tokio::test]
    async fn test_blank_text_skips_model() {
        let (provider, translator) = translator(false);
        assert_eq!(translator.translate("   ").await, "");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_source() {
        let (_, translator) = translator(true);
        assert_eq!(translator.translate("원문").await, "원문");
    }

    #[tokio::test]
    async fn test_translate_mednli_row() {
        let (provider, translator) = translator(false);
        let row = DatasetRow::from_pairs([
            ("gold_label", "neutral"),
            ("sentence1_ko", "가"),
            ("sentence2_ko", "나"),
            ("extra", "ignored"),
        ]);
        let record = translator.translate_row(Dataset::MedNli, &row).await;
        assert_eq!(record, vec!["neutral", "[가]", "[나]", "", ""]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_translate_truthfulqa_row_with_missing_source() {
        let (provider, translator) = translator(false);
        let row = DatasetRow::from_pairs([
            ("question_ko", "질문"),
            ("mc1_labels", "[1, 0]"),
            ("mc2_labels", "[1, 1]"),
        ]);
        let record = translator.translate_row(Dataset::TruthfulQa, &row).await;
        assert_eq!(
            record,
            vec!["[질문]", "", "[1, 0]", "", "[1, 1]", "", "", "", ""]
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
