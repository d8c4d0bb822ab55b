//! 轮询调度器
//!
//! 持有自选基金列表和刷新间隔这两份共享可变状态，
//! 所有变更都经由本模块的操作完成并整体落盘。
//! 定时器由调度器自身持有，随 start/stop 创建销毁，
//! 不存在进程级的游离定时器。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::models::FundRecord;
use crate::services::fund_service::FundProvider;
use crate::storage::KvStore;

/// 自选列表在存储中的键（与原前端 localStorage 一致）
pub const FUNDS_KEY: &str = "funds";
/// 刷新间隔（毫秒）在存储中的键
pub const REFRESH_MS_KEY: &str = "refreshMs";

/// 轮询调度器
///
/// 空闲/刷新中两态：定时触发与手动触发都走“刷新全部”，
/// 手动触发自带去重（在途时为空操作），定时触发不受其影响，
/// 两批重叠时持久化快照以后写者为准
pub struct PollingScheduler {
    provider: Arc<dyn FundProvider>,
    store: Arc<dyn KvStore>,
    funds: Mutex<Vec<FundRecord>>,
    interval_tx: watch::Sender<u64>,
    manual_in_flight: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
    floor_ms: u64,
}

impl PollingScheduler {
    /// 创建调度器并从存储恢复自选列表与刷新间隔
    pub fn new(
        provider: Arc<dyn FundProvider>,
        store: Arc<dyn KvStore>,
        default_ms: u64,
        floor_ms: u64,
    ) -> Arc<Self> {
        let funds: Vec<FundRecord> = store
            .get(FUNDS_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(list) => Some(list),
                Err(e) => {
                    log::warn!("自选列表数据损坏，忽略: {e}");
                    None
                }
            })
            .unwrap_or_default();

        let refresh_ms = store
            .get(REFRESH_MS_KEY)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(default_ms)
            .max(floor_ms);

        let (interval_tx, _) = watch::channel(refresh_ms);

        Arc::new(Self {
            provider,
            store,
            funds: Mutex::new(funds),
            interval_tx,
            manual_in_flight: AtomicBool::new(false),
            timer: Mutex::new(None),
            floor_ms,
        })
    }

    /// 启动定时刷新，重复调用为空操作
    pub fn start(self: &Arc<Self>) {
        let mut timer = self.timer.lock().unwrap();
        if timer.is_some() {
            return;
        }

        let scheduler = Arc::clone(self);
        let mut rx = self.interval_tx.subscribe();
        *timer = Some(tokio::spawn(async move {
            loop {
                let ms = *rx.borrow();
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(ms)) => {
                        scheduler.refresh_all().await;
                    }
                    changed = rx.changed() => {
                        // 间隔变更：丢弃旧周期的挂起睡眠，按新周期重新计时
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }));
        log::info!("定时刷新已启动，周期 {} 毫秒", self.refresh_ms());
    }

    /// 停止定时刷新
    pub fn stop(&self) {
        if let Some(handle) = self.timer.lock().unwrap().take() {
            handle.abort();
            log::info!("定时刷新已停止");
        }
    }

    /// 当前快照（自选列表及各基金最近一次成功的数据）
    pub fn snapshot(&self) -> Vec<FundRecord> {
        self.funds.lock().unwrap().clone()
    }

    /// 当前刷新间隔（毫秒）
    pub fn refresh_ms(&self) -> u64 {
        *self.interval_tx.borrow()
    }

    /// 添加基金：编号为空或已存在直接拒绝（不发起任何请求），
    /// 组装成功后置于列表头部并落盘，失败则列表不变、错误上抛
    pub async fn add_fund(&self, code: &str) -> Result<FundRecord, AppError> {
        let code = code.trim().to_string();
        if code.is_empty() {
            return Err(AppError::ValidationError("缺少基金编号".to_string()));
        }
        if self.funds.lock().unwrap().iter().any(|f| f.code == code) {
            return Err(AppError::DuplicateEntry(code));
        }

        let record = self.provider.assemble(&code).await?;

        let mut funds = self.funds.lock().unwrap();
        // 抓取期间可能有并发添加，入列前复查
        if funds.iter().any(|f| f.code == code) {
            return Err(AppError::DuplicateEntry(code));
        }
        funds.insert(0, record.clone());
        self.persist_funds(&funds);
        Ok(record)
    }

    /// 删除基金并立即落盘；在途批次里该基金的迟到结果会被写回守卫丢弃
    pub fn remove_fund(&self, code: &str) -> bool {
        let mut funds = self.funds.lock().unwrap();
        let before = funds.len();
        funds.retain(|f| f.code != code);
        let removed = funds.len() != before;
        if removed {
            self.persist_funds(&funds);
        }
        removed
    }

    /// 刷新当前全部自选基金
    pub async fn refresh_all(&self) {
        let codes: Vec<String> = self
            .funds
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.code.clone())
            .collect();
        if codes.is_empty() {
            return;
        }
        self.refresh_codes(codes).await;
    }

    /// 并发刷新一批基金并在汇合点写回
    ///
    /// 单只失败只记日志、保留旧数据，不中断整批；
    /// 写回按当前列表过滤，批次进行中被删除的基金的结果直接丢弃
    pub async fn refresh_codes(&self, codes: Vec<String>) {
        let tasks = codes.into_iter().map(|code| {
            let provider = Arc::clone(&self.provider);
            async move {
                let result = provider.assemble(&code).await;
                (code, result)
            }
        });
        let results = futures::future::join_all(tasks).await;

        let mut updated: HashMap<String, FundRecord> = HashMap::new();
        for (code, result) in results {
            match result {
                Ok(record) => {
                    updated.insert(code, record);
                }
                Err(e) => log::warn!("刷新基金 {code} 失败，保留旧数据: {e}"),
            }
        }

        let mut funds = self.funds.lock().unwrap();
        for fund in funds.iter_mut() {
            if let Some(record) = updated.remove(&fund.code) {
                *fund = record;
            }
        }
        self.persist_funds(&funds);
    }

    /// 手动刷新，带去重：已有手动刷新在途时返回 false（空操作）。
    /// 定时刷新不检查该守卫。
    /// 守卫通过 Drop 释放，刷新途中发生 panic 也不会卡死后续手动刷新
    pub async fn manual_refresh(&self) -> bool {
        if self
            .manual_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        let _guard = ManualGuard(&self.manual_in_flight);
        self.refresh_all().await;
        true
    }

    /// 调整刷新间隔，低于下限时取下限；
    /// 挂起的定时任务按新间隔重新计时，旧间隔不会再触发
    pub fn set_refresh_ms(&self, ms: u64) -> u64 {
        let ms = ms.max(self.floor_ms);
        self.interval_tx.send_replace(ms);
        if let Err(e) = self.store.set(REFRESH_MS_KEY, &ms.to_string()) {
            log::warn!("刷新间隔写入失败: {e}");
        }
        ms
    }

    /// 导出持久化状态（设置导入导出透传）
    pub fn export_state(&self) -> serde_json::Value {
        json!({
            "funds": self.snapshot(),
            "refreshMs": self.refresh_ms(),
        })
    }

    /// 导入持久化状态，整体替换自选列表，重复编号保留先出现者
    pub fn import_state(&self, doc: &serde_json::Value) -> Result<(), AppError> {
        let mut imported: Vec<FundRecord> = match doc.get("funds") {
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| AppError::ValidationError(format!("导入数据格式错误: {e}")))?,
            None => Vec::new(),
        };

        let mut seen = std::collections::HashSet::new();
        imported.retain(|f| seen.insert(f.code.clone()));

        {
            let mut funds = self.funds.lock().unwrap();
            *funds = imported;
            self.persist_funds(&funds);
        }

        if let Some(ms) = doc.get("refreshMs").and_then(|v| v.as_u64()) {
            if ms > 0 {
                self.set_refresh_ms(ms);
            }
        }
        Ok(())
    }

    /// 整体落盘当前列表（整快照覆盖，不做局部合并）。
    /// 必须在持有 funds 锁期间调用：磁盘快照顺序与内存变更顺序一致，
    /// 重叠批次下不会出现旧快照覆盖新快照
    fn persist_funds(&self, funds: &[FundRecord]) {
        match serde_json::to_string(funds) {
            Ok(raw) => {
                if let Err(e) = self.store.set(FUNDS_KEY, &raw) {
                    log::warn!("自选列表写入失败: {e}");
                }
            }
            Err(e) => log::warn!("自选列表序列化失败: {e}"),
        }
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 手动刷新在途标记的释放守卫，正常返回与 panic 退出都会复位
struct ManualGuard<'a>(&'a AtomicBool);

impl Drop for ManualGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
