//! 随机种子来源

use rand::Rng;
use std::sync::Mutex;

pub trait RandomSource: Send + Sync {
    /// 生成一个打乱种子
    fn next_seed(&self) -> i64;
}

/// 线程本地随机数
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_seed(&self) -> i64 {
        rand::rng().random::<i64>()
    }
}

/// 按给定序列循环返回种子
#[derive(Debug)]
pub struct SequenceRandom {
    seeds: Vec<i64>,
    cursor: Mutex<usize>,
}

impl SequenceRandom {
    pub fn new(seeds: Vec<i64>) -> Self {
        Self {
            seeds,
            cursor: Mutex::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_seed(&self) -> i64 {
        if self.seeds.is_empty() {
            return 0;
        }
        let mut cursor = self
            .cursor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let seed = self.seeds[*cursor % self.seeds.len()];
        *cursor += 1;
        seed
    }
}
