//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::DomError;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识职位 / 表单
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于导航、CDP 命令等）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, DomError> {
        let result = self.page.evaluate(js_code.into()).await?;
        // 返回 undefined 时没有 value
        Ok(result.into_value::<JsonValue>().unwrap_or(JsonValue::Null))
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T, DomError> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 当前页面 URL
    pub async fn current_url(&self) -> Result<String, DomError> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    pub async fn goto(&self, url: &str) -> Result<(), DomError> {
        self.page.goto(url).await?;
        Ok(())
    }
}
