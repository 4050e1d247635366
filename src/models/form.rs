use serde::{Deserialize, Serialize};

/// 表单控件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// 下拉框，附带可选项文本
    Dropdown { options: Vec<String> },
    /// 单行文本
    Text,
    /// 多行文本
    TextArea,
}

/// 弹窗当前页上的一个问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// 在 `div[data-test-form-element]` 列表中的位置
    pub index: usize,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FormField {
    pub fn text(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
            kind: FieldKind::Text,
        }
    }
}

impl FieldKind {
    /// 日志里显示用
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Dropdown { .. } => "dropdown",
            FieldKind::Text => "text",
            FieldKind::TextArea => "textarea",
        }
    }
}
