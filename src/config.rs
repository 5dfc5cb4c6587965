use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// API key for the OpenAI-compatible chat completion service
    pub llm_api_key: String,

    /// Chat completion base URL
    #[serde(default = "default_llm_api_url")]
    pub llm_api_url: String,

    /// Chat completion model identifier
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// YouTube Data API key
    pub youtube_api_key: String,

    /// YouTube Data API base URL
    #[serde(default = "default_youtube_api_url")]
    pub youtube_api_url: String,

    /// Look up duration and view count for every recommended track
    #[serde(default)]
    pub enrich_track_details: bool,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_llm_api_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_llm_model() -> String {
    "deepseek-chat".to_string()
}

fn default_youtube_api_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: Iterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Iterator<Item = (String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_vars(vars(&[
            ("LLM_API_KEY", "sk-test"),
            ("YOUTUBE_API_KEY", "yt-test"),
        ]))
        .unwrap();

        assert_eq!(config.llm_api_url, "https://api.deepseek.com");
        assert_eq!(config.llm_model, "deepseek-chat");
        assert_eq!(config.youtube_api_url, "https://www.googleapis.com/youtube/v3");
        assert!(!config.enrich_track_details);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("LLM_API_KEY", "sk-test"),
            ("LLM_MODEL", "gpt-4o-mini"),
            ("YOUTUBE_API_KEY", "yt-test"),
            ("ENRICH_TRACK_DETAILS", "true"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.llm_model, "gpt-4o-mini");
        assert!(config.enrich_track_details);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_missing_api_key_fails() {
        let result = Config::from_vars(vars(&[("YOUTUBE_API_KEY", "yt-test")]));
        assert!(result.is_err());
    }
}
