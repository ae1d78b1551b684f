//! 点击统计管道
//!
//! 三个相互独立的部分：
//! - `ClickService`: 写路径。校验电台、落事件行、递增快路径计数器
//! - `StatisticsRoller`: 周期汇总。把原始事件折叠进 14 天周期统计行
//! - `RetentionTask`: 清理。按宽限期分批删除已汇总的原始事件
//!
//! 计数器（stations.total_clicks）只增不减、从不由统计反算；
//! 历史口径以 period_statistics 为准。

pub mod ingest;
pub mod retention;
pub mod roller;

pub use ingest::{ClickOutcome, ClickService};
pub use retention::{CleanupReport, RetentionTask};
pub use roller::{RollerReport, StatisticsRoller};

use chrono::{DateTime, Utc};

/// 统计周期长度：14 天，锚定 Unix epoch（1970-01-01T00:00:00Z）
pub const PERIOD_LENGTH_SECS: i64 = 14 * 86_400;

/// 事件时间戳 → 周期序号（对周期长度的向下取整除法）
pub fn period_index(ts: DateTime<Utc>) -> i64 {
    ts.timestamp().div_euclid(PERIOD_LENGTH_SECS)
}

/// 周期序号 → [start, end) 窗口
pub fn period_bounds(index: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_secs = index * PERIOD_LENGTH_SECS;
    let start = DateTime::from_timestamp(start_secs, 0).unwrap();
    let end = DateTime::from_timestamp(start_secs + PERIOD_LENGTH_SECS, 0).unwrap();
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_index_epoch_anchor() {
        // epoch 落在 0 号周期
        let epoch = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(period_index(epoch), 0);

        // 第 14 天整点是下一个周期的开始
        let day_14 = DateTime::from_timestamp(PERIOD_LENGTH_SECS, 0).unwrap();
        assert_eq!(period_index(day_14), 1);

        // 前一秒仍在 0 号周期
        let just_before = DateTime::from_timestamp(PERIOD_LENGTH_SECS - 1, 0).unwrap();
        assert_eq!(period_index(just_before), 0);
    }

    #[test]
    fn test_period_index_pre_epoch() {
        // epoch 之前的时间戳落入负序号周期，不与 0 号周期混淆
        let before = DateTime::from_timestamp(-1, 0).unwrap();
        assert_eq!(period_index(before), -1);
    }

    #[test]
    fn test_period_bounds_are_half_open() {
        let (start, end) = period_bounds(3);
        assert_eq!(start.timestamp(), 3 * PERIOD_LENGTH_SECS);
        assert_eq!(end.timestamp(), 4 * PERIOD_LENGTH_SECS);

        // 窗口起点属于该周期，终点属于下一个
        assert_eq!(period_index(start), 3);
        assert_eq!(period_index(end), 4);
    }

    #[test]
    fn test_same_window_same_index() {
        // 相隔数天但同窗口的两个时间戳序号一致
        let a = DateTime::from_timestamp(100 * PERIOD_LENGTH_SECS + 10, 0).unwrap();
        let b = DateTime::from_timestamp(100 * PERIOD_LENGTH_SECS + 5 * 86_400, 0).unwrap();
        assert_eq!(period_index(a), period_index(b));
    }
}
