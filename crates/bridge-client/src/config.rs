use async_trait::async_trait;
use secrecy::SecretString;

use bridge_core::{ChatParams, ParamsBuilder, ParamsError, ProjectId, TaskId};

const DEFAULT_BASE_URL: &str = "http://localhost:8700";

/// Where the backend lives and how to authenticate against it.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
    pub token: Option<SecretString>,
}

impl BackendConfig {
    /// Read from `SKYBRIDGE_BASE_URL` / `SKYBRIDGE_TOKEN`, falling back to
    /// a local backend with no token.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("SKYBRIDGE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            token: std::env::var("SKYBRIDGE_TOKEN").ok().map(SecretString::from),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
        }
    }
}

/// Ambient request configuration carried into every session start.
#[derive(Clone, Debug)]
pub struct ParamsConfig {
    pub project_id: ProjectId,
    pub model: String,
    pub api_key: Option<String>,
    pub max_retries: u32,
    pub enable_local_system: bool,
    pub language: Option<String>,
    pub browser_port: Option<u16>,
    pub installed_tools: Vec<String>,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            project_id: ProjectId::new(),
            model: "default".to_string(),
            api_key: None,
            max_retries: 3,
            enable_local_system: true,
            language: None,
            browser_port: None,
            installed_tools: vec![
                "execute_file_write".into(),
                "execute_read_file".into(),
                "execute_search_replace".into(),
                "execute_list_files".into(),
                "execute_terminal".into(),
            ],
        }
    }
}

/// [`ParamsBuilder`] backed by a fixed [`ParamsConfig`]; mints a fresh task
/// id per call. The descriptor is immutable once built.
pub struct ConfigParamsBuilder {
    config: ParamsConfig,
}

impl ConfigParamsBuilder {
    pub fn new(config: ParamsConfig) -> Self {
        Self { config }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.config.project_id
    }
}

#[async_trait]
impl ParamsBuilder for ConfigParamsBuilder {
    async fn build(&self, question: &str, images: Vec<String>) -> Result<ChatParams, ParamsError> {
        if question.trim().is_empty() {
            return Err(ParamsError::MissingConfig("question is empty".into()));
        }
        Ok(ChatParams {
            task_id: TaskId::new(),
            project_id: self.config.project_id.clone(),
            question: question.to_string(),
            images,
            model: self.config.model.clone(),
            api_key: self.config.api_key.clone(),
            max_retries: self.config.max_retries,
            enable_local_system: self.config.enable_local_system,
            language: self.config.language.clone(),
            browser_port: self.config.browser_port,
            installed_tools: self.config.installed_tools.clone(),
        })
    }
}
