//! CPU-GPU 同步记账
//!
//! 渲染器只有一个 Fence，每帧提交后用下一个期望值 signal，
//! 然后阻塞等待 GPU 追上这个值，才能重置命令分配器。
//! 这里只管理期望值本身，实际的 signal 和等待由图形后端完成。

/// Fence 值
///
/// 用于CPU-GPU同步的单调递增值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FenceValue(u64);

impl FenceValue {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// 单个 Fence 的期望值记账
///
/// Fence 以 0 创建，第一次 signal 使用 1。
#[derive(Debug)]
pub struct FrameFence {
    /// 下一次 signal 使用的值
    expected: FenceValue,
}

impl FrameFence {
    pub fn new() -> Self {
        Self { expected: FenceValue::new(1) }
    }

    /// 下一次 signal 将使用的值
    pub fn expected(&self) -> FenceValue {
        self.expected
    }

    /// 取出本次 signal 的值并递增期望值
    pub fn signal(&mut self) -> FenceValue {
        let value = self.expected;
        self.expected = value.next();
        value
    }

    /// GPU 已完成 `completed` 时，是否需要阻塞等待 `value`
    pub fn must_wait(completed: u64, value: FenceValue) -> bool {
        completed < value.value()
    }
}

impl Default for FrameFence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_value() {
        let fence = FenceValue::new(0);
        assert_eq!(fence.value(), 0);
        assert_eq!(fence.next().value(), 1);
        assert!(FenceValue::new(1) < FenceValue::new(2));
    }

    #[test]
    fn test_signal_is_monotonic() {
        let mut fence = FrameFence::new();
        assert_eq!(fence.expected().value(), 1);

        let first = fence.signal();
        let second = fence.signal();
        let third = fence.signal();

        assert_eq!(first.value(), 1);
        assert_eq!(second.value(), 2);
        assert_eq!(third.value(), 3);
        assert_eq!(fence.expected().value(), 4);
    }

    #[test]
    fn test_must_wait() {
        let value = FenceValue::new(5);
        assert!(FrameFence::must_wait(0, value));
        assert!(FrameFence::must_wait(4, value));
        assert!(!FrameFence::must_wait(5, value));
        assert!(!FrameFence::must_wait(6, value));
    }
}
