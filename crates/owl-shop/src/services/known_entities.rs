//! 已知实体缓存
//!
//! 生产者需要引用之前生成过的实体（修改、删除客户，为客户生成地址等），
//! 缓存容量固定，写满后随机替换一个旧条目。

use parking_lot::RwLock;
use rand::Rng;

pub struct KnownEntities<T> {
    entries: RwLock<Vec<T>>,
    capacity: usize,
}

impl<T: Clone> KnownEntities<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// 加入一个实体，容量已满时随机替换
    pub fn insert(&self, item: T) {
        let mut entries = self.entries.write();
        if entries.len() < self.capacity {
            entries.push(item);
        } else {
            let index = rand::thread_rng().gen_range(0..entries.len());
            entries[index] = item;
        }
    }

    /// 替换第一个匹配的实体，没有匹配时按 `insert` 加入
    pub fn upsert(&self, item: T, matches: impl Fn(&T) -> bool) {
        {
            let mut entries = self.entries.write();
            if let Some(existing) = entries.iter_mut().find(|e| matches(e)) {
                *existing = item;
                return;
            }
        }
        self.insert(item);
    }

    /// 随机取一个实体的副本
    pub fn random(&self) -> Option<T> {
        let entries = self.entries.read();
        if entries.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..entries.len());
        Some(entries[index].clone())
    }

    /// 随机修改一个实体，返回闭包的结果
    pub fn update_random<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut entries = self.entries.write();
        if entries.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..entries.len());
        Some(f(&mut entries[index]))
    }

    /// 随机移除一个实体
    pub fn take_random(&self) -> Option<T> {
        let mut entries = self.entries.write();
        if entries.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..entries.len());
        Some(entries.swap_remove(index))
    }

    /// 移除所有匹配的实体，返回移除数量
    pub fn remove_where(&self, matches: impl Fn(&T) -> bool) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| !matches(e));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
