//! 搜索结果扫描 - 流程层
//!
//! 逐张读取列表页上的职位卡片，读完一页后翻到下一页。
//! 卡片引用失效时重新读取卡片数量并在同一位置重试一次，
//! 第二次仍失效则跳过该卡片。

use tracing::{debug, info, warn};

use crate::error::DomError;
use crate::infrastructure::JobBoard;
use crate::models::JobPosting;

/// 从列表页读出的一条职位
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedPosting {
    /// 卡片在当前页中的位置
    pub index: usize,
    pub page: Option<u32>,
    /// 卡片上显示了 "Applied"
    pub applied_badge: bool,
    pub posting: JobPosting,
}

/// 单个搜索词的扫描进度
///
/// 不持有 `JobBoard`，每次调用时传入。
#[derive(Debug)]
pub struct ListingScanner {
    target: usize,
    processed: usize,
    index: usize,
    page: Option<u32>,
    card_count: Option<usize>,
    stale_events: usize,
    exhausted: bool,
}

impl ListingScanner {
    /// `target` 为本搜索词需要处理的职位数量
    pub fn new(target: usize) -> Self {
        Self {
            target,
            processed: 0,
            index: 0,
            page: None,
            card_count: None,
            stale_events: 0,
            exhausted: false,
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn stale_events(&self) -> usize {
        self.stale_events
    }

    /// 已经达到目标数量
    pub fn target_reached(&self) -> bool {
        self.processed >= self.target
    }

    /// 记一条已处理的职位
    pub fn record_processed(&mut self) {
        self.processed += 1;
    }

    /// 下一条职位；列表读完、没有下一页或已达到目标时返回 `None`
    pub async fn next_posting<B: JobBoard + ?Sized>(
        &mut self,
        board: &B,
    ) -> Result<Option<ScannedPosting>, DomError> {
        loop {
            if self.exhausted || self.target_reached() {
                return Ok(None);
            }

            let count = match self.card_count {
                Some(count) => count,
                None => {
                    let count = board.job_card_count().await?;
                    if self.page.is_none() {
                        self.page = board.active_page().await?;
                    }
                    debug!("📄 第 {:?} 页共 {} 个职位", self.page, count);
                    self.card_count = Some(count);
                    count
                }
            };

            if self.index >= count {
                if !self.advance_page(board).await? {
                    self.exhausted = true;
                    return Ok(None);
                }
                continue;
            }

            let index = self.index;
            match board.read_job_card(index).await {
                Ok(card) => {
                    self.index += 1;
                    return Ok(Some(self.scanned(index, card)));
                }
                Err(e) if e.is_stale() => {
                    self.stale_events += 1;
                    warn!("🔄 第 {} 张卡片已失效，重新读取列表: {}", index + 1, e);
                    let count = board.job_card_count().await?;
                    self.card_count = Some(count);
                    if index >= count {
                        continue;
                    }
                    match board.read_job_card(index).await {
                        Ok(card) => {
                            self.index += 1;
                            return Ok(Some(self.scanned(index, card)));
                        }
                        Err(e) if e.is_stale() => {
                            self.stale_events += 1;
                            warn!("⚠️ 第 {} 张卡片再次失效，跳过", index + 1);
                            self.index += 1;
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 点击卡片打开详情；失效时重新读取同一位置，确认仍是同一职位后再点一次
    pub async fn open<B: JobBoard + ?Sized>(
        &mut self,
        board: &B,
        scanned: &ScannedPosting,
    ) -> Result<(), DomError> {
        match board.open_job_card(scanned.index).await {
            Err(e) if e.is_stale() => {
                self.stale_events += 1;
                warn!("🔄 打开职位时卡片已失效，重试一次: {}", scanned.posting.id);
                let card = board.read_job_card(scanned.index).await?;
                if card.id != scanned.posting.id {
                    return Err(DomError::Stale(format!(
                        "职位 {} 已不在列表中",
                        scanned.posting.id
                    )));
                }
                board.open_job_card(scanned.index).await
            }
            other => other,
        }
    }

    async fn advance_page<B: JobBoard + ?Sized>(&mut self, board: &B) -> Result<bool, DomError> {
        let Some(current) = board.active_page().await? else {
            info!("📄 未找到分页控件，列表结束");
            return Ok(false);
        };
        let next = current + 1;
        if !board.goto_page(next).await? {
            info!("📄 第 {} 页是最后一页", current);
            return Ok(false);
        }
        info!("📄 翻到第 {} 页", next);
        self.page = Some(next);
        self.index = 0;
        self.card_count = None;
        Ok(true)
    }

    fn scanned(&self, index: usize, card: crate::models::JobCard) -> ScannedPosting {
        ScannedPosting {
            index,
            page: self.page,
            applied_badge: card.applied_badge,
            posting: card.into_posting(),
        }
    }
}
