// ==========================================
// 机加工排产看板 - 调机时间窗
// ==========================================
// 格式: "HH:MM-HH:MM" (小时 1~2 位,分钟 2 位)
// 结束早于开始时视为跨午夜
// ==========================================

use chrono::{NaiveDateTime, Timelike};
use std::fmt;

pub const DEFAULT_SETUP_WINDOW: &str = "06:00-22:00";

/// 每日循环的时钟时段 (分钟数,自零点起)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupWindow {
    start_minute: u32,
    end_minute: u32,
}

impl SetupWindow {
    /// 解析时间窗; 格式不合法返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        let (start, end) = raw.trim().split_once('-')?;
        Some(Self {
            start_minute: parse_clock(start)?,
            end_minute: parse_clock(end)?,
        })
    }

    pub fn start_minute(&self) -> u32 {
        self.start_minute
    }

    pub fn end_minute(&self) -> u32 {
        self.end_minute
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end_minute <= self.start_minute
    }

    /// 时刻的时钟分钟是否落在时段内 (含开始,不含结束)
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let minute = at.hour() * 60 + at.minute();
        if self.end_minute > self.start_minute {
            minute >= self.start_minute && minute < self.end_minute
        } else {
            minute >= self.start_minute || minute < self.end_minute
        }
    }
}

impl fmt::Display for SetupWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

fn parse_clock(raw: &str) -> Option<u32> {
    let (hour, minute) = raw.split_once(':')?;
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !digits(hour) || hour.len() > 2 || !digits(minute) || minute.len() != 2 {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour > 24 || minute > 59 {
        return None;
    }
    Some(hour * 60 + minute)
}
