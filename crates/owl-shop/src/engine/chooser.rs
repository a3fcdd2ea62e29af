//! 加权随机选择器
//!
//! 构造时计算累计权重表，之后只读；每次选择在 `[0, total)` 内均匀取值，
//! 再对累计权重二分查找，按 `weight_i / total` 的概率返回对应条目。

use rand::Rng;

use crate::error::EngineError;

/// 带权重的候选项
#[derive(Debug, Clone)]
pub struct Choice<T> {
    pub item: T,
    pub weight: u32,
}

impl<T> Choice<T> {
    pub fn new(item: T, weight: u32) -> Self {
        Self { item, weight }
    }
}

/// 加权随机选择器
///
/// 构造完成后不可变，`pick` 可被任意数量的任务并发调用。
/// 随机源使用线程本地生成器，并发安全由 `rand::thread_rng` 保证。
#[derive(Debug)]
pub struct Chooser<T> {
    items: Vec<T>,
    /// 严格递增，最后一个元素等于 `total`
    totals: Vec<u64>,
    total: u64,
}

impl<T> Chooser<T> {
    /// 从候选项构建选择器，O(n)
    ///
    /// 空表、零权重或权重总和溢出都在构造时失败，`pick` 永不失败。
    pub fn new(choices: impl IntoIterator<Item = Choice<T>>) -> Result<Self, EngineError> {
        let choices = choices.into_iter();
        let (lower, _) = choices.size_hint();
        let mut items = Vec::with_capacity(lower);
        let mut totals = Vec::with_capacity(lower);
        let mut total: u64 = 0;

        for (index, choice) in choices.enumerate() {
            if choice.weight == 0 {
                return Err(EngineError::ZeroWeight { index });
            }
            total = total
                .checked_add(u64::from(choice.weight))
                .ok_or(EngineError::WeightOverflow)?;
            items.push(choice.item);
            totals.push(total);
        }

        if items.is_empty() {
            return Err(EngineError::EmptyChoices);
        }

        Ok(Self {
            items,
            totals,
            total,
        })
    }

    /// 按权重随机选择一个条目
    pub fn pick(&self) -> &T {
        self.pick_with(&mut rand::thread_rng())
    }

    /// 使用调用方提供的随机源选择，便于测试复现
    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        let r = rng.gen_range(0..self.total);
        &self.items[self.index_for(r)]
    }

    /// 返回满足 `totals[i] > r` 的最小下标
    fn index_for(&self, r: u64) -> usize {
        self.totals.partition_point(|&cumulative| cumulative <= r)
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
