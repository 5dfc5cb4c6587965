use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{KeywordPlan, RecommendationRequest, SearchType},
    services::providers::{CompletionProvider, CompletionRequest},
};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;
const DEFAULT_REASONING: &str = "Recommending music based on your description";

const SYSTEM_PROMPT: &str = r#"You are a professional music recommendation expert. Based on the user's description, generate search keywords and tags.

Your tasks:
1. Analyze user intent and requirements
2. Generate the most appropriate search keywords and tags
3. Do not recommend specific songs, but generate descriptive keywords for searching

Return format (JSON only):
{
  "reasoning": "Reasoning for recommendations",
  "keywords": ["keyword1", "keyword2", "keyword3"],
  "tags": ["tag1", "tag2"],
  "searchType": "artist|song|genre|mood"
}

Return pure JSON format only."#;

/// Shape the model is asked to produce; every field may be missing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawKeywordPlan {
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    search_type: Option<String>,
}

impl From<RawKeywordPlan> for KeywordPlan {
    fn from(raw: RawKeywordPlan) -> Self {
        let keywords = raw
            .keywords
            .unwrap_or_default()
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let reasoning = raw
            .reasoning
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REASONING.to_string());

        KeywordPlan {
            keywords,
            reasoning,
            tags: raw.tags.unwrap_or_default(),
            search_type: raw
                .search_type
                .map(|s| SearchType::from_model(&s))
                .unwrap_or_default(),
        }
    }
}

/// Turns a free-text prompt into a search plan with the help of a language model
pub struct KeywordGenerator {
    provider: Arc<dyn CompletionProvider>,
}

impl KeywordGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Asks the model for keywords, reasoning, tags and a search type
    ///
    /// Transport and parse failures are logged and collapse into
    /// `AppError::GenerationFailed`; quota rejections pass through so the
    /// caller can tell the user to top up.
    pub async fn generate(&self, request: &RecommendationRequest) -> AppResult<KeywordPlan> {
        let completion = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: build_user_prompt(request),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::info!(
            user_id = %request.user_id,
            prompt = %request.prompt,
            include_genres = ?request.include_genres,
            provider = self.provider.name(),
            "Requesting search keywords"
        );

        let plan = self
            .provider
            .complete(&completion)
            .await
            .and_then(|content| {
                tracing::debug!(content = %content, "Keyword model response");
                parse_keyword_plan(&content)
            })
            .map_err(|e| {
                tracing::error!(error = %e, "Keyword generation failed");
                match e {
                    AppError::QuotaExceeded(msg) => AppError::QuotaExceeded(msg),
                    _ => AppError::GenerationFailed,
                }
            })?;

        tracing::info!(
            keywords = ?plan.keywords,
            search_type = ?plan.search_type,
            "Search keywords generated"
        );

        Ok(plan)
    }
}

fn build_user_prompt(request: &RecommendationRequest) -> String {
    let include = join_or(&request.include_genres, "no specific preference");
    let exclude = join_or(&request.exclude_genres, "none");
    let mood = request
        .mood
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or("no specific mood");

    format!(
        "User Request: {}\nUser Preferences: {}\nExclude Genres: {}\nMood Preference: {}\nRecommendation Count: {} songs",
        request.prompt, include, exclude, mood, request.limit
    )
}

fn join_or(values: &Option<Vec<String>>, fallback: &str) -> String {
    match values {
        Some(values) if !values.is_empty() => values.join(", "),
        _ => fallback.to_string(),
    }
}

/// Parses the model's reply into a plan
///
/// The whole text is tried first; models that wrap their JSON in prose are
/// handled by retrying on the first balanced `{...}` block. Empty content is
/// an empty plan, not an error.
pub fn parse_keyword_plan(content: &str) -> AppResult<KeywordPlan> {
    if content.trim().is_empty() {
        return Ok(KeywordPlan::default());
    }

    let raw = match serde_json::from_str::<RawKeywordPlan>(content) {
        Ok(raw) => raw,
        Err(first_err) => {
            let embedded = extract_json_object(content).ok_or_else(|| {
                AppError::UpstreamParse(format!("no JSON object in model response: {}", first_err))
            })?;
            serde_json::from_str::<RawKeywordPlan>(embedded)
                .map_err(|e| AppError::UpstreamParse(e.to_string()))?
        }
    };

    Ok(raw.into())
}

/// Returns the first `{` and its matching `}`, skipping braces inside strings
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockCompletionProvider;
    use tokio_test::{assert_err, assert_ok};

    fn generator_returning(
        result: impl Fn() -> AppResult<String> + Send + Sync + 'static,
    ) -> KeywordGenerator {
        let mut provider = MockCompletionProvider::new();
        provider.expect_complete().returning(move |_| result());
        provider.expect_name().return_const("mock");
        KeywordGenerator::new(Arc::new(provider))
    }

    #[test]
    fn test_parse_pure_json() {
        let plan = parse_keyword_plan(
            r#"{"reasoning": "Calm piano", "keywords": ["lofi piano", "study beats"], "tags": ["calm"], "searchType": "genre"}"#,
        )
        .unwrap();

        assert_eq!(plan.reasoning, "Calm piano");
        assert_eq!(plan.keywords, vec!["lofi piano", "study beats"]);
        assert_eq!(plan.tags, vec!["calm"]);
        assert_eq!(plan.search_type, SearchType::Genre);
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let content = "Sure! Here is what I found:\n```json\n{\"reasoning\": \"Upbeat {fun}\", \"keywords\": [\"summer pop\"], \"tags\": [], \"searchType\": \"mood\"}\n```\nEnjoy {the music}!";
        let plan = parse_keyword_plan(content).unwrap();

        assert_eq!(plan.reasoning, "Upbeat {fun}");
        assert_eq!(plan.keywords, vec!["summer pop"]);
        assert_eq!(plan.search_type, SearchType::Mood);
    }

    #[test]
    fn test_parse_applies_defaults() {
        let plan = parse_keyword_plan("{}").unwrap();
        assert!(plan.keywords.is_empty());
        assert!(plan.tags.is_empty());
        assert_eq!(plan.reasoning, DEFAULT_REASONING);
        assert_eq!(plan.search_type, SearchType::Song);

        let plan = parse_keyword_plan(r#"{"reasoning": "", "keywords": null}"#).unwrap();
        assert_eq!(plan.reasoning, DEFAULT_REASONING);
        assert!(plan.keywords.is_empty());
    }

    #[test]
    fn test_parse_drops_blank_keywords() {
        let plan = parse_keyword_plan(r#"{"keywords": [" jazz ", "", "   ", "bossa nova"]}"#).unwrap();
        assert_eq!(plan.keywords, vec!["jazz", "bossa nova"]);
    }

    #[test]
    fn test_parse_empty_content() {
        for content in ["", "   \n"] {
            let plan = parse_keyword_plan(content).unwrap();
            assert!(plan.keywords.is_empty());
            assert!(plan.tags.is_empty());
            assert_eq!(plan.reasoning, "");
            assert_eq!(plan.search_type, SearchType::Song);
        }
    }

    #[test]
    fn test_parse_failure() {
        assert_err!(parse_keyword_plan(
            "Reasons: these songs are good for studying\n1. Light music"
        ));
        assert_err!(parse_keyword_plan("here you go: {\"keywords\": [1, 2]}"));
        assert_err!(parse_keyword_plan("unterminated {\"keywords\": [\"a\""));
    }

    #[test]
    fn test_extract_json_object_balanced() {
        assert_eq!(
            extract_json_object(r#"a {"x": {"y": "}"}} b {"z": 1}"#),
            Some(r#"{"x": {"y": "}"}}"#)
        );
        assert_eq!(extract_json_object("no braces"), None);
    }

    #[test]
    fn test_user_prompt_placeholders() {
        let request = RecommendationRequest::new("music for a rainy afternoon");
        let prompt = build_user_prompt(&request);

        assert!(prompt.contains("User Request: music for a rainy afternoon"));
        assert!(prompt.contains("User Preferences: no specific preference"));
        assert!(prompt.contains("Exclude Genres: none"));
        assert!(prompt.contains("Mood Preference: no specific mood"));
        assert!(prompt.contains("Recommendation Count: 10 songs"));
    }

    #[test]
    fn test_user_prompt_with_preferences() {
        let request = RecommendationRequest {
            include_genres: Some(vec!["jazz".to_string(), "soul".to_string()]),
            exclude_genres: Some(vec!["metal".to_string()]),
            mood: Some("mellow".to_string()),
            limit: 5,
            ..RecommendationRequest::new("late night")
        };
        let prompt = build_user_prompt(&request);

        assert!(prompt.contains("User Preferences: jazz, soul"));
        assert!(prompt.contains("Exclude Genres: metal"));
        assert!(prompt.contains("Mood Preference: mellow"));
        assert!(prompt.contains("Recommendation Count: 5 songs"));
    }

    #[tokio::test]
    async fn test_generate_sends_fixed_settings() {
        let mut provider = MockCompletionProvider::new();
        provider
            .expect_complete()
            .withf(|req| {
                req.temperature == TEMPERATURE
                    && req.max_tokens == MAX_TOKENS
                    && req.system.contains("Do not recommend specific songs")
                    && req.user.contains("User Request: road trip")
            })
            .times(1)
            .returning(|_| Ok(r#"{"keywords": ["road trip rock"]}"#.to_string()));
        provider.expect_name().return_const("mock");

        let generator = KeywordGenerator::new(Arc::new(provider));
        let plan = assert_ok!(generator.generate(&RecommendationRequest::new("road trip")).await);
        assert_eq!(plan.keywords, vec!["road trip rock"]);
    }

    #[tokio::test]
    async fn test_generate_empty_content() {
        let generator = generator_returning(|| Ok(String::new()));
        let plan = assert_ok!(generator.generate(&RecommendationRequest::new("anything")).await);

        assert!(plan.keywords.is_empty());
        assert_eq!(plan.reasoning, "");
    }

    #[tokio::test]
    async fn test_generate_transport_error_is_generic() {
        let generator =
            generator_returning(|| Err(AppError::ExternalApi("connection reset".to_string())));
        let err = assert_err!(generator.generate(&RecommendationRequest::new("x")).await);

        assert!(matches!(err, AppError::GenerationFailed));
        assert_eq!(err.to_string(), "Failed to generate music recommendations");
    }

    #[tokio::test]
    async fn test_generate_parse_error_is_generic() {
        let generator = generator_returning(|| Ok("I recommend Hello by Adele.".to_string()));
        let err = assert_err!(generator.generate(&RecommendationRequest::new("x")).await);

        assert!(matches!(err, AppError::GenerationFailed));
    }

    #[tokio::test]
    async fn test_generate_quota_error_is_distinct() {
        let generator = generator_returning(|| {
            Err(AppError::QuotaExceeded(
                crate::error::QUOTA_EXCEEDED_MESSAGE.to_string(),
            ))
        });
        let err = assert_err!(generator.generate(&RecommendationRequest::new("x")).await);

        assert!(matches!(err, AppError::QuotaExceeded(_)));
        assert_ne!(err.to_string(), AppError::GenerationFailed.to_string());
    }
}
