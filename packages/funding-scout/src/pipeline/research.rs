//! Research orchestrator - keywords in, agent answer out.
//!
//! The flow is strictly sequential:
//!
//! 1. search each keyword and keep the first few links
//! 2. fetch each link's text, truncated and tagged with its URL
//! 3. generate → clean → verify, each agent stage reading the previous answer
//!
//! Failures on individual searches or pages are logged and skipped. Only an
//! empty harvest or an LLM failure stops the run.

use crate::error::{Result, ScoutError};
use crate::normalize::truncate_chars;
use crate::pipeline::prompts::{
    format_clean_prompt, format_generate_prompt, format_verify_prompt, ResearchPrompt,
    ANALYSIS_AGENT, CLEANING_AGENT, RESEARCH_AGENT,
};
use crate::traits::{
    ai::{AgentStage, AI},
    content::ContentFetcher,
    searcher::WebSearcher,
    store::KeywordStore,
};
use crate::types::config::ResearchConfig;

/// Page text gathered for the agents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedDocuments {
    /// Concatenated, URL-tagged page contents.
    pub text: String,
    /// URLs whose content made it into `text`.
    pub urls: Vec<String>,
}

/// Drives search, content extraction and the agent stages.
pub struct ResearchOrchestrator<W: WebSearcher, C: ContentFetcher, A: AI> {
    searcher: W,
    fetcher: C,
    ai: A,
    config: ResearchConfig,
}

impl<W: WebSearcher, C: ContentFetcher, A: AI> ResearchOrchestrator<W, C, A> {
    /// Create an orchestrator with the default research limits.
    pub fn new(searcher: W, fetcher: C, ai: A) -> Self {
        Self::with_config(searcher, fetcher, ai, ResearchConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(searcher: W, fetcher: C, ai: A, config: ResearchConfig) -> Self {
        Self {
            searcher,
            fetcher,
            ai,
            config,
        }
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Keywords from the store, or the configured defaults when it has none.
    pub async fn resolve_keywords<K: KeywordStore + ?Sized>(&self, store: &K) -> Result<Vec<String>> {
        let keywords = store.keywords().await?;
        if keywords.is_empty() {
            tracing::warn!(
                defaults = ?self.config.default_keywords,
                "Keyword list is empty, using defaults"
            );
            return Ok(self.config.default_keywords.clone());
        }
        Ok(keywords)
    }

    /// Search every keyword and collect page text.
    pub async fn collect_documents(&self, keywords: &[String]) -> Result<CollectedDocuments> {
        let mut collected = CollectedDocuments::default();

        for keyword in keywords {
            let results = match self
                .searcher
                .search(keyword, self.config.links_per_query)
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!(keyword = %keyword, error = %e, "Search failed, skipping keyword");
                    continue;
                }
            };

            for result in results {
                let url = result.url.as_str();
                match self.fetcher.fetch(url).await {
                    Ok(Some(content)) => {
                        collected.text.push_str(&format!(
                            "\n\n---\nContenu extrait de : {}\n{}\n",
                            url,
                            truncate_chars(&content, self.config.max_page_chars)
                        ));
                        collected.urls.push(url.to_string());
                    }
                    Ok(None) => tracing::warn!(url, "No content extracted"),
                    Err(e) => tracing::warn!(url, error = %e, "Content extraction failed"),
                }
            }
        }

        tracing::info!(
            keywords = keywords.len(),
            pages = collected.urls.len(),
            "Document collection complete"
        );

        if collected.urls.is_empty() {
            return Err(ScoutError::NoContent {
                keywords: keywords.len(),
            });
        }
        Ok(collected)
    }

    /// Run generate → clean → verify and return the final answer.
    pub async fn run_pipeline(
        &self,
        prompt: &ResearchPrompt,
        exclusions: &str,
        documents: &CollectedDocuments,
    ) -> Result<String> {
        let fields = &prompt.expected_headers;

        let generate = AgentStage::new("generate", RESEARCH_AGENT);
        let answer = self
            .run_stage(
                &generate,
                &format_generate_prompt(prompt, exclusions, &documents.text, self.config.max_prompt_chars),
            )
            .await?;

        let clean = AgentStage::new("clean", CLEANING_AGENT);
        let answer = self.run_stage(&clean, &format_clean_prompt(fields, &answer)).await?;

        let verify = AgentStage::new("verify", ANALYSIS_AGENT);
        self.run_stage(&verify, &format_verify_prompt(fields, &answer)).await
    }

    async fn run_stage(&self, stage: &AgentStage, prompt: &str) -> Result<String> {
        tracing::info!(stage = stage.name, prompt_chars = prompt.chars().count(), "Running agent stage");
        let answer = self.ai.complete(&stage.system, prompt).await?;
        tracing::debug!(stage = stage.name, answer_chars = answer.chars().count(), "Agent stage done");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::prompts::build_research_prompt;
    use crate::stores::MemoryKeywords;
    use crate::testing::MockAI;
    use crate::traits::content::MockContentFetcher;
    use crate::traits::searcher::MockWebSearcher;
    use crate::types::config::SheetLayout;
    use crate::types::record::HeaderRow;

    fn orchestrator(
        searcher: MockWebSearcher,
        fetcher: MockContentFetcher,
    ) -> ResearchOrchestrator<MockWebSearcher, MockContentFetcher, MockAI> {
        ResearchOrchestrator::new(searcher, fetcher, MockAI::new())
    }

    #[tokio::test]
    async fn test_collect_skips_failures() {
        let searcher = MockWebSearcher::new()
            .with_urls("aide doc", &["https://a.fr/", "https://b.fr/", "https://c.fr/"])
            .with_failure("broken");
        let fetcher = MockContentFetcher::new()
            .with_page("https://a.fr/", "Aide A")
            .with_failure("https://b.fr/");

        let docs = orchestrator(searcher, fetcher)
            .collect_documents(&["broken".to_string(), "aide doc".to_string()])
            .await
            .unwrap();

        assert_eq!(docs.urls, vec!["https://a.fr/"]);
        assert!(docs.text.contains("Contenu extrait de : https://a.fr/\nAide A"));
    }

    #[tokio::test]
    async fn test_collect_truncates_pages() {
        let searcher = MockWebSearcher::new().with_urls("kw", &["https://a.fr/"]);
        let fetcher = MockContentFetcher::new().with_page("https://a.fr/", &"z".repeat(6_000));

        let docs = orchestrator(searcher, fetcher)
            .collect_documents(&["kw".to_string()])
            .await
            .unwrap();

        assert_eq!(docs.text.matches('z').count(), 5_000);
    }

    #[tokio::test]
    async fn test_collect_nothing_is_an_error() {
        let searcher = MockWebSearcher::new().with_urls("kw", &["https://a.fr/"]);
        let err = orchestrator(searcher, MockContentFetcher::new())
            .collect_documents(&["kw".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, ScoutError::NoContent { keywords: 1 }));
    }

    #[tokio::test]
    async fn test_resolve_keywords_falls_back_to_defaults() {
        let orch = orchestrator(MockWebSearcher::new(), MockContentFetcher::new());

        let defaults = orch.resolve_keywords(&MemoryKeywords::new()).await.unwrap();
        assert_eq!(defaults.len(), 3);

        let stored = orch
            .resolve_keywords(&MemoryKeywords::with_keywords(&["fonds série"]))
            .await
            .unwrap();
        assert_eq!(stored, vec!["fonds série"]);
    }

    #[tokio::test]
    async fn test_pipeline_chains_stages() {
        let ai = MockAI::new()
            .with_reply("generate-out")
            .with_reply("clean-out")
            .with_reply("Nom: A\nLien: https://a.fr");
        let orch = ResearchOrchestrator::new(MockWebSearcher::new(), MockContentFetcher::new(), ai);

        let prompt = build_research_prompt(&HeaderRow::new(&["Nom", "Lien"]), &SheetLayout::french());
        let docs = CollectedDocuments {
            text: "page text".to_string(),
            urls: vec!["https://a.fr/".to_string()],
        };

        let answer = orch.run_pipeline(&prompt, "", &docs).await.unwrap();
        assert_eq!(answer, "Nom: A\nLien: https://a.fr");

        let calls = orch.ai.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].system, RESEARCH_AGENT);
        assert!(calls[0].prompt.contains("page text"));
        assert!(calls[1].prompt.ends_with("generate-out"));
        assert!(calls[2].prompt.ends_with("clean-out"));
    }
}
