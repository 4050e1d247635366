//! 简历改写服务 - 业务能力层
//!
//! 根据职位描述改写基础简历（Markdown），写入 `outputs/resumes/`。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务可通过 `OPENAI_API_BASE` 切换
//!
//! 任何失败（未配置 key、基础简历为空、API 错误）都返回 `None`，
//! 调用方回退到默认简历。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::services::description_archive::sanitize_file_stem;

/// 简历定制能力
#[async_trait]
pub trait ResumeTailor: Send + Sync {
    /// 返回生成的简历路径；失败时返回 `None`
    async fn tailor(&self, job_title: &str, company: &str, description: &str) -> Option<PathBuf>;
}

/// 不做任何改写
pub struct NoTailor;

#[async_trait]
impl ResumeTailor for NoTailor {
    async fn tailor(&self, _: &str, _: &str, _: &str) -> Option<PathBuf> {
        None
    }
}

/// 基于 LLM 的简历改写
pub struct ResumeRewriter {
    client: Client<OpenAIConfig>,
    model_name: String,
    base_resume_path: PathBuf,
    output_dir: PathBuf,
}

impl ResumeRewriter {
    /// 未配置 API key 或基础简历时返回 `None`
    pub fn from_config(config: &LlmConfig, output_dir: impl Into<PathBuf>) -> Option<Self> {
        let Some(api_key) = config.api_key.as_deref() else {
            info!("未设置 OPENAI_API_KEY，跳过简历改写");
            return None;
        };
        let Some(base_resume_path) = config.base_resume_path.as_deref() else {
            info!("未配置基础简历，跳过简历改写");
            return None;
        };

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.api_base);

        Some(Self {
            client: Client::with_config(openai_config),
            model_name: config.model.clone(),
            base_resume_path: PathBuf::from(base_resume_path),
            output_dir: output_dir.into(),
        })
    }

    async fn rewrite(&self, job_title: &str, company: &str, description: &str) -> Result<PathBuf> {
        let base_resume = tokio::fs::read_to_string(&self.base_resume_path)
            .await
            .with_context(|| format!("读取基础简历失败: {}", self.base_resume_path.display()))?;
        if base_resume.trim().is_empty() {
            anyhow::bail!("基础简历为空: {}", self.base_resume_path.display());
        }

        let content = self
            .send_to_llm(&build_prompt(description, &base_resume))
            .await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_path(job_title, company);
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    async fn send_to_llm(&self, user_message: &str) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content("You are an expert resume writer.")
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.4)
            .max_tokens(2000u32)
            .build()?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| anyhow::anyhow!("LLM API 调用失败: {}", e))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(strip_code_fence(&content))
    }

    fn output_path(&self, job_title: &str, company: &str) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.md",
            sanitize_file_stem(company),
            sanitize_file_stem(job_title)
        ))
    }

    pub fn base_resume_path(&self) -> &Path {
        &self.base_resume_path
    }
}

#[async_trait]
impl ResumeTailor for ResumeRewriter {
    async fn tailor(&self, job_title: &str, company: &str, description: &str) -> Option<PathBuf> {
        match self.rewrite(job_title, company, description).await {
            Ok(path) => {
                info!("📝 已生成定制简历: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("简历改写失败，使用默认简历: {:#}", e);
                None
            }
        }
    }
}

fn build_prompt(description: &str, base_resume: &str) -> String {
    format!(
        r#"Rewrite the following resume to match this job description.
Keep it concise, results-focused, and formatted in Markdown.
Return ONLY the rewritten Markdown text.

JOB DESCRIPTION:
{}

BASE RESUME:
{}"#,
        description, base_resume
    )
}

/// 去掉模型有时会包裹的 ```markdown 代码块
fn strip_code_fence(content: &str) -> String {
    let trimmed = content.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or_default();
            body.trim_end().trim_end_matches("```").trim().to_string()
        }
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```markdown\n# Jane\n- Rust\n```"), "# Jane\n- Rust");
        assert_eq!(strip_code_fence("  # Jane  "), "# Jane");
    }

    #[test]
    fn test_unconfigured_rewriter_is_disabled() {
        let config = LlmConfig::default();
        assert!(ResumeRewriter::from_config(&config, "outputs/resumes").is_none());

        let config = LlmConfig {
            api_key: Some("sk-test".into()),
            ..LlmConfig::default()
        };
        // 没有基础简历同样禁用
        assert!(ResumeRewriter::from_config(&config, "outputs/resumes").is_none());
    }

    #[test]
    fn test_output_path_is_sanitized() {
        let config = LlmConfig {
            api_key: Some("sk-test".into()),
            base_resume_path: Some("resume.md".into()),
            ..LlmConfig::default()
        };
        let rewriter = ResumeRewriter::from_config(&config, "out").unwrap();
        assert_eq!(
            rewriter.output_path("Frontend Dev / UI", "Acme, Inc."),
            PathBuf::from("out").join("Acme__Inc_Frontend_Dev___UI.md")
        );
    }

    #[tokio::test]
    async fn test_missing_base_resume_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let config = LlmConfig {
            api_key: Some("sk-test".into()),
            base_resume_path: Some(dir.path().join("missing.md").display().to_string()),
            ..LlmConfig::default()
        };
        let rewriter = ResumeRewriter::from_config(&config, dir.path()).unwrap();
        assert!(rewriter.tailor("Dev", "Acme", "desc").await.is_none());
    }

    /// 真实调用 API
    #[tokio::test]
    #[ignore]
    async fn test_rewrite_live() {
        let _ = tracing_subscriber::fmt::try_init();
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.md");
        std::fs::write(&base, "# Jane Doe\n- 5 years React\n").unwrap();

        let config = LlmConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_resume_path: Some(base.display().to_string()),
            ..LlmConfig::default()
        };
        let rewriter = ResumeRewriter::from_config(&config, dir.path()).expect("需要 OPENAI_API_KEY");
        let path = rewriter
            .tailor("Frontend Developer", "Acme", "React + TypeScript, 3 years")
            .await;
        assert!(path.is_some());
    }
}
