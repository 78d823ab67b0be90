//! 路径校验器
//!
//! 根据顶点/边唯一性级别判断候选步骤是否可接受。检查本身是纯函数，
//! 全局唯一性集合只在步骤真正追加到路径存储后通过 `commit` 更新，
//! 因此同一顶点的两个候选在提交前被检查两次也不会破坏集合。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::{EdgeRef, UniquenessLevel, VertexRef};
use crate::query::path_enumeration::path_store::PathStorage;
use crate::query::path_enumeration::step::Step;

/// 校验结果
///
/// `filtered` 表示该步骤不能作为结果，`pruned` 表示不再从该步骤继续展开。
/// 目前所有检查都会同时设置两者。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationResult {
    filtered: bool,
    pruned: bool,
}

impl ValidationResult {
    pub fn accepted() -> Self {
        Self::default()
    }

    /// 过滤并剪枝
    pub fn rejected() -> Self {
        Self {
            filtered: true,
            pruned: true,
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    pub fn is_pruned(&self) -> bool {
        self.pruned
    }

    pub fn combine(&mut self, other: ValidationResult) {
        self.filtered |= other.filtered;
        self.pruned |= other.pruned;
    }
}

/// 校验器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathValidatorOptions {
    pub vertex_uniqueness: UniquenessLevel,
    pub edge_uniqueness: UniquenessLevel,
}

impl Default for PathValidatorOptions {
    fn default() -> Self {
        Self {
            vertex_uniqueness: UniquenessLevel::None,
            edge_uniqueness: UniquenessLevel::Path,
        }
    }
}

impl PathValidatorOptions {
    pub fn new(vertex_uniqueness: UniquenessLevel, edge_uniqueness: UniquenessLevel) -> Self {
        Self {
            vertex_uniqueness,
            edge_uniqueness,
        }
    }

    /// 边的 GLOBAL 唯一性退化为 PATH
    pub fn effective_edge_uniqueness(&self) -> UniquenessLevel {
        match self.edge_uniqueness {
            UniquenessLevel::Global => UniquenessLevel::Path,
            level => level,
        }
    }
}

/// 路径校验器
///
/// 不持有路径存储，每次检查时由调用方传入。
#[derive(Debug, Clone)]
pub struct PathValidator {
    options: PathValidatorOptions,
    /// GLOBAL 模式下已接受过的所有顶点
    visited: HashSet<VertexRef>,
}

impl PathValidator {
    pub fn new(options: PathValidatorOptions) -> Self {
        Self {
            options,
            visited: HashSet::new(),
        }
    }

    pub fn options(&self) -> &PathValidatorOptions {
        &self.options
    }

    fn is_noop(&self) -> bool {
        self.options.vertex_uniqueness == UniquenessLevel::None
            && self.options.effective_edge_uniqueness() == UniquenessLevel::None
    }

    /// 检查候选步骤，不产生副作用
    ///
    /// 候选步骤的父链必须已在 `store` 中；候选步骤本身无需追加。
    pub fn validate_path<S, St>(&self, store: &St, step: &S) -> ValidationResult
    where
        S: Step,
        St: PathStorage<S>,
    {
        if self.is_noop() {
            return ValidationResult::accepted();
        }

        if self.options.vertex_uniqueness != UniquenessLevel::None {
            if let Some(previous) = step.previous() {
                let vertex = step.vertex();
                if !store.visit_reverse_path(previous, |ancestor| ancestor.vertex() != vertex) {
                    return ValidationResult::rejected();
                }
            }
        }

        if self.options.vertex_uniqueness == UniquenessLevel::Global
            && self.visited.contains(step.vertex())
        {
            return ValidationResult::rejected();
        }

        if self.options.effective_edge_uniqueness() == UniquenessLevel::Path && step.edge().is_valid() {
            if let Some(previous) = step.previous() {
                let edge = step.edge();
                if !store.visit_reverse_path(previous, |ancestor| ancestor.edge() != edge) {
                    return ValidationResult::rejected();
                }
            }
        }

        ValidationResult::accepted()
    }

    /// 步骤已追加到路径存储，提交全局唯一性记录
    pub fn commit<S: Step>(&mut self, step: &S) {
        if self.options.vertex_uniqueness == UniquenessLevel::Global {
            self.visited.insert(step.vertex().clone());
        }
    }

    /// 校验双向搜索拼接出的完整路径
    ///
    /// `left` 与 `right` 位于同一交汇顶点；两侧合起来视为一条路径做唯一性检查。
    pub fn validate_joined<S, L, R>(
        &self,
        left_store: &L,
        left: &S,
        right_store: &R,
        right: &S,
    ) -> ValidationResult
    where
        S: Step,
        L: PathStorage<S>,
        R: PathStorage<S>,
    {
        if self.is_noop() {
            return ValidationResult::accepted();
        }

        if self.options.vertex_uniqueness != UniquenessLevel::None {
            let mut seen: HashSet<VertexRef> = HashSet::new();
            seen.insert(left.vertex().clone());
            let left_unique = match left.previous() {
                Some(previous) => left_store.visit_reverse_path(previous, |s| seen.insert(s.vertex().clone())),
                None => true,
            };
            let right_unique = left_unique
                && match right.previous() {
                    Some(previous) => {
                        right_store.visit_reverse_path(previous, |s| seen.insert(s.vertex().clone()))
                    }
                    None => true,
                };
            if !right_unique {
                return ValidationResult::rejected();
            }
        }

        if self.options.effective_edge_uniqueness() == UniquenessLevel::Path {
            let mut seen: HashSet<EdgeRef> = HashSet::new();
            let mut unique = true;
            for (store_is_left, step) in [(true, left), (false, right)] {
                if !unique {
                    break;
                }
                if step.edge().is_valid() && !seen.insert(step.edge().clone()) {
                    unique = false;
                    break;
                }
                if let Some(previous) = step.previous() {
                    let mut visitor = |s: &S| !s.edge().is_valid() || seen.insert(s.edge().clone());
                    unique = if store_is_left {
                        left_store.visit_reverse_path(previous, &mut visitor)
                    } else {
                        right_store.visit_reverse_path(previous, &mut visitor)
                    };
                }
            }
            if !unique {
                return ValidationResult::rejected();
            }
        }

        ValidationResult::accepted()
    }

    /// 新一轮搜索前清空全局集合
    pub fn reset(&mut self) {
        self.visited.clear();
    }

    /// GLOBAL 模式下已提交的顶点数
    pub fn global_visited_len(&self) -> usize {
        self.visited.len()
    }
}
