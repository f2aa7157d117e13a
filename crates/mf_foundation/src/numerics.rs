// crates/mf_foundation/src/numerics.rs

//! Kahan 求和算法
//!
//! 表面能量累加器跨越整个运行的所有时间步，朴素累加的舍入误差会污染守恒诊断。

/// Kahan 补偿求和器
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    /// 创建新的求和器
    pub const fn new() -> Self {
        Self {
            sum: 0.0,
            compensation: 0.0,
        }
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 获取当前求和值
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }

    /// 重置求和器
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = f64>>(iter: I) -> f64 {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}

impl std::ops::AddAssign<f64> for KahanSum {
    fn add_assign(&mut self, rhs: f64) {
        self.add(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kahan_sum() {
        let data = vec![0.1f64; 1000];
        let sum = KahanSum::sum_iter(data.iter().cloned());
        assert!((sum - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_increments_on_large_total() {
        let mut k = KahanSum::new();
        k += 1.0e8;
        for _ in 0..10_000 {
            k += 1.0e-8;
        }
        assert!((k.value() - (1.0e8 + 1.0e-4)).abs() < 1e-7);
        k.reset();
        assert_eq!(k.value(), 0.0);
    }
}
