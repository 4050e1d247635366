//! 人工介入 - 基础设施层
//!
//! 投递过程中需要操作员确认的地方都走这个 trait。后台运行时使用
//! `HeadlessOperator`，永远不会暂停。

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

/// 提交前确认的选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Submit,
    /// 提交，并且本次运行不再暂停
    DisableFuturePauses,
    Discard,
}

#[async_trait]
pub trait Operator: Send + Sync {
    /// 是否有人可以响应
    fn is_interactive(&self) -> bool;

    /// 提示并等待操作员处理完毕
    async fn alert(&self, message: &str);

    /// 提交前确认；非交互模式返回 `None`
    async fn review_decision(&self, message: &str) -> Option<ReviewDecision>;
}

/// 从终端读取输入
///
/// 整个运行期间共用一个读取缓冲，避免丢掉已读入但未消费的输入。
pub struct ConsoleOperator<R = BufReader<Stdin>> {
    input: Mutex<R>,
}

impl ConsoleOperator {
    pub fn new() -> Self {
        Self::with_input(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for ConsoleOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncBufRead + Unpin + Send> ConsoleOperator<R> {
    pub fn with_input(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }

    /// 输入结束（EOF）或读取失败时返回 `None`
    async fn prompt(&self, message: &str) -> Option<String> {
        let mut stdout = tokio::io::stdout();
        let _ = stdout.write_all(message.as_bytes()).await;
        let _ = stdout.flush().await;

        let mut line = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!("读取终端输入失败: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Operator for ConsoleOperator<R> {
    fn is_interactive(&self) -> bool {
        true
    }

    async fn alert(&self, message: &str) {
        self.prompt(&format!("\n⚠️ {}\n处理完成后按回车继续...", message))
            .await;
    }

    /// 无法识别的输入会重新询问；输入结束时放弃本次投递
    async fn review_decision(&self, message: &str) -> Option<ReviewDecision> {
        let mut question = format!(
            "\n📋 {}\n[1] Submit Application  [2] Disable Pause  [3] Discard\n> ",
            message
        );
        loop {
            let Some(answer) = self.prompt(&question).await else {
                warn!("终端输入已结束，放弃本次投递");
                return Some(ReviewDecision::Discard);
            };
            match parse_decision(&answer) {
                Some(decision) => return Some(decision),
                None => {
                    warn!("无法识别的输入: {:?}", answer);
                    question = "请输入 1 / 2 / 3\n> ".to_string();
                }
            }
        }
    }
}

fn parse_decision(answer: &str) -> Option<ReviewDecision> {
    match answer.trim().to_lowercase().as_str() {
        "1" | "submit" | "submit application" => Some(ReviewDecision::Submit),
        "2" | "disable" | "disable pause" => Some(ReviewDecision::DisableFuturePauses),
        "3" | "discard" => Some(ReviewDecision::Discard),
        _ => None,
    }
}

/// 无人值守
pub struct HeadlessOperator;

#[async_trait]
impl Operator for HeadlessOperator {
    fn is_interactive(&self) -> bool {
        false
    }

    async fn alert(&self, message: &str) {
        warn!("无人值守，忽略人工提示: {}", message);
    }

    async fn review_decision(&self, _message: &str) -> Option<ReviewDecision> {
        None
    }
}
