//! Order Number Generation
//!
//! 格式: `ORD-YYMMDD-NNNN`，NNNN 为当日序号 (零填充，从 0001 起)。
//! 应急渠道使用文档化的替代前缀 `EMG-`。序号来自
//! [`OrderSequenceRepository`] 的原子 UPSERT，不存在并发撞号。

use chrono::{DateTime, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::SourceChannel;
use crate::db::repository::{OrderSequenceRepository, RepoResult};
use crate::utils::time;

/// Prefix for a creation channel
pub fn prefix_for(channel: SourceChannel) -> &'static str {
    match channel {
        SourceChannel::Emergency => "EMG",
        _ => "ORD",
    }
}

/// 序号计数 key，形如 "ORD-260826" (前缀不同则独立计数)
fn sequence_key(prefix: &str, date: &str) -> String {
    format!("{prefix}-{date}")
}

/// 格式化订单号；序号超过 9999 时自然变宽，不回绕
fn format_number(prefix: &str, date: &str, seq: i64) -> String {
    format!("{prefix}-{date}-{seq:04}")
}

#[derive(Clone)]
pub struct OrderNumberGenerator {
    sequences: OrderSequenceRepository,
}

impl OrderNumberGenerator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            sequences: OrderSequenceRepository::new(db),
        }
    }

    /// 生成下一个订单号
    pub async fn next(&self, channel: SourceChannel, now: DateTime<Utc>) -> RepoResult<String> {
        let prefix = prefix_for(channel);
        let date = time::date_prefix(now);
        let seq = self.sequences.next(&sequence_key(prefix, &date)).await?;
        Ok(format_number(prefix, &date, seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_format() {
        assert_eq!(format_number("ORD", "260826", 1), "ORD-260826-0001");
        assert_eq!(format_number("ORD", "260826", 42), "ORD-260826-0042");
        assert_eq!(format_number("EMG", "260826", 9999), "EMG-260826-9999");
        // 超过 9999 变宽
        assert_eq!(format_number("ORD", "260826", 10000), "ORD-260826-10000");
    }

    #[test]
    fn test_prefix_per_channel() {
        assert_eq!(prefix_for(SourceChannel::Standard), "ORD");
        assert_eq!(prefix_for(SourceChannel::Simple), "ORD");
        assert_eq!(prefix_for(SourceChannel::OfflineImport), "ORD");
        assert_eq!(prefix_for(SourceChannel::Emergency), "EMG");
    }
}
