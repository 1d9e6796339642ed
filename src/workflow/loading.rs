//! 加载标记
//!
//! 同一时刻只允许一个网络请求在途，重复触发直接返回 `AppError::Busy`

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{AppError, Result};

#[derive(Debug, Default)]
pub struct LoadingFlag {
    busy: AtomicBool,
}

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 置位加载标记，已在加载中时返回 `Busy`
    pub fn try_begin(&self) -> Result<LoadingGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::Busy)?;
        Ok(LoadingGuard { flag: self })
    }

    pub fn is_loading(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// 离开作用域时清除加载标记（无论成功还是失败）
#[derive(Debug)]
pub struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}
