//! Multi-model consensus collection
//!
//! Every participating model answers the same framing prompt. Answers are
//! concatenated under fixed headings; no synthesis is computed.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::dispatch::ModelDispatcher;
use crate::llm::{Message, ThinkingMode};
use crate::prompts::consensus_prompt;

const SYNTHESIS_SECTION: &str = "## SYNTHESIS AND RECOMMENDATIONS\n\n\
Based on the multiple model analyses, here are the key consensus points:\n\n\
1. **Common Recommendations**\n\
2. **Areas of Agreement**\n\
3. **Divergent Opinions**\n\
4. **Final Recommendations**\n\n";

#[derive(Debug, Clone)]
pub struct ConsensusCollector {
    dispatcher: Arc<ModelDispatcher>,
}

impl ConsensusCollector {
    pub fn new(dispatcher: Arc<ModelDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Query every available model and concatenate the answers
    ///
    /// Models with no provider are skipped. Models whose call fails are
    /// dropped from the output. With no answers at all the result is the
    /// header and the static synthesis section.
    pub async fn run(
        &self,
        prompt: &str,
        files: &[String],
        models: &[String],
        thinking_mode: ThinkingMode,
    ) -> String {
        let framing = consensus_prompt(prompt, files, models);
        let messages = [Message::user(framing)];

        let available: Vec<&String> = models
            .iter()
            .filter(|model| {
                let ok = self.dispatcher.is_available(model);
                if !ok {
                    tracing::debug!(model = %model, "Consensus model unavailable, skipping");
                }
                ok
            })
            .collect();

        tracing::info!(
            requested = models.len(),
            available = available.len(),
            "Collecting consensus"
        );

        let answers = join_all(available.iter().map(|model| {
            let messages = &messages;
            async move {
                let result = self
                    .dispatcher
                    .generate(messages, model.as_str(), thinking_mode)
                    .await;
                (model.as_str(), result)
            }
        }))
        .await;

        let mut output = String::from("## CONSENSUS ANALYSIS\n\n");
        for (model, result) in answers {
            match result {
                Ok(text) => {
                    output.push_str(&format!(
                        "### {} Analysis:\n{}\n\n",
                        model.to_uppercase(),
                        text
                    ));
                }
                Err(e) => tracing::warn!(model, error = %e, "Consensus model failed"),
            }
        }
        output.push_str(SYNTHESIS_SECTION);
        output
    }
}
