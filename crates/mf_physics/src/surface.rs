// crates/mf_physics/src/surface.rs

//! 冻结超曲面元
//!
//! 超立方体由两个 τ 层与 x、y、z 方向相邻单元组成，共 16 个顶点。
//! [`SurfaceFinder`] 在其中寻找 `e = e_crit` 等值面，返回协变面元 `dσ_μ`
//! 与质心。`dσ_μ` 指向低值一侧：场沿 +μ 减小时分量为正。

/// 四维超立方体
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hypercube {
    /// 顶点值，索引为 `(a_τ << 3) | (a_x << 2) | (a_y << 1) | a_z`
    pub values: [f64; 16],
    /// 各轴边长 (dτ, dx, dy, dz)
    pub extents: [f64; 4],
}

impl Hypercube {
    /// 顶点索引
    #[inline]
    pub fn corner_index(corner: [usize; 4]) -> usize {
        (corner[0] << 3) | (corner[1] << 2) | (corner[2] << 1) | corner[3]
    }

    /// 顶点值
    #[inline]
    pub fn value(&self, corner: [usize; 4]) -> f64 {
        self.values[Self::corner_index(corner)]
    }

    /// 所有顶点有限
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// 所有顶点都不低于阈值
    pub fn all_above(&self, threshold: f64) -> bool {
        self.values.iter().all(|&v| v >= threshold)
    }

    /// 所有顶点都低于阈值
    pub fn all_below(&self, threshold: f64) -> bool {
        self.values.iter().all(|&v| v < threshold)
    }

    /// 可能包含等值面
    pub fn crosses(&self, threshold: f64) -> bool {
        !self.all_above(threshold) && !self.all_below(threshold)
    }

    /// 归一化坐标 `r ∈ [0,1]⁴` 处的多线性插值
    pub fn interpolate(&self, r: [f64; 4]) -> f64 {
        multilinear_weights(r)
            .iter()
            .zip(&self.values)
            .map(|(w, v)| w * v)
            .sum()
    }
}

/// 16 个顶点的多线性插值权重，顺序同 [`Hypercube::corner_index`]
pub fn multilinear_weights(r: [f64; 4]) -> [f64; 16] {
    let mut w = [0.0; 16];
    for (idx, slot) in w.iter_mut().enumerate() {
        let mut prod = 1.0;
        for axis in 0..4 {
            let bit = (idx >> (3 - axis)) & 1;
            prod *= if bit == 1 { r[axis] } else { 1.0 - r[axis] };
        }
        *slot = prod;
    }
    w
}

/// 冻结面元
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceElement {
    /// 协变法向量 dσ_μ
    pub dsigma: [f64; 4],
    /// 相对超立方体原点的质心偏移 (τ, x, y, z)
    pub centroid: [f64; 4],
}

impl SurfaceElement {
    /// 质心的归一化坐标
    pub fn normalized_centroid(&self, extents: &[f64; 4]) -> [f64; 4] {
        let mut r = [0.0; 4];
        for mu in 0..4 {
            r[mu] = (self.centroid[mu] / extents[mu]).clamp(0.0, 1.0);
        }
        r
    }
}

/// 超曲面查找器
pub trait SurfaceFinder: Send + Sync {
    /// 名称
    fn name(&self) -> &'static str;

    /// 在超立方体中寻找 `e_crit` 等值面
    fn find(&self, cube: &Hypercube, e_crit: f64) -> Vec<SurfaceElement>;
}

/// 投影体积法
///
/// `dσ_μ` 取等值面沿 μ 轴投影的有向三维体积：在垂直于 μ 的三个方向上
/// 取 `N³` 条平行于 μ 的采样线，多线性场在每条线上是线性的，
/// 端点跨越阈值即穿过等值面。质心为全部交点的平均。
///
/// 等值面只切下顶点附近的小块、没有采样线经过时，退回到 32 条棱：
/// 少数一侧的每个顶点按棱上截距 `a_ν` 贡献一个角单纯形，
/// `dσ_μ = ±∏_{ν≠μ} a_ν / 6`，质心为棱上交点的平均。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionFinder {
    resolution: usize,
}

impl Default for ProjectionFinder {
    fn default() -> Self {
        Self { resolution: 4 }
    }
}

impl ProjectionFinder {
    /// 创建，分辨率至少为 1
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(1),
        }
    }

    /// 每轴采样数
    pub fn resolution(&self) -> usize {
        self.resolution
    }
}

impl SurfaceFinder for ProjectionFinder {
    fn name(&self) -> &'static str {
        "Projection"
    }

    fn find(&self, cube: &Hypercube, e_crit: f64) -> Vec<SurfaceElement> {
        if !cube.crosses(e_crit) {
            return Vec::new();
        }
        let n = self.resolution;
        let inv_n = 1.0 / n as f64;
        let mut dsigma = [0.0; 4];
        let mut centroid = [0.0; 4];
        let mut crossings = 0usize;

        for mu in 0..4 {
            let others: Vec<usize> = (0..4).filter(|&a| a != mu).collect();
            let area = others.iter().map(|&a| cube.extents[a]).product::<f64>()
                * inv_n.powi(3);

            for i in 0..n {
                for j in 0..n {
                    for k in 0..n {
                        let mut r = [0.0; 4];
                        r[others[0]] = (i as f64 + 0.5) * inv_n;
                        r[others[1]] = (j as f64 + 0.5) * inv_n;
                        r[others[2]] = (k as f64 + 0.5) * inv_n;

                        r[mu] = 0.0;
                        let v0 = cube.interpolate(r);
                        r[mu] = 1.0;
                        let v1 = cube.interpolate(r);

                        if (v0 >= e_crit) == (v1 >= e_crit) {
                            continue;
                        }
                        let sign = if v0 > v1 { 1.0 } else { -1.0 };
                        dsigma[mu] += sign * area;

                        r[mu] = ((v0 - e_crit) / (v0 - v1)).clamp(0.0, 1.0);
                        for a in 0..4 {
                            centroid[a] += r[a];
                        }
                        crossings += 1;
                    }
                }
            }
        }

        if crossings == 0 {
            return corner_caps(cube, e_crit).into_iter().collect();
        }
        for a in 0..4 {
            centroid[a] = centroid[a] / crossings as f64 * cube.extents[a];
        }
        vec![SurfaceElement { dsigma, centroid }]
    }
}

/// 由超立方体棱上的交点构造角单纯形面元
fn corner_caps(cube: &Hypercube, e_crit: f64) -> Option<SurfaceElement> {
    let is_above = |v: f64| v >= e_crit;
    let minority_high = cube.values.iter().filter(|&&v| is_above(v)).count() <= 8;
    let falls = if minority_high { 1.0 } else { -1.0 };
    let bit = |axis: usize| 1usize << (3 - axis);
    let origin = |c: usize, a: usize| if c & bit(a) != 0 { cube.extents[a] } else { 0.0 };

    // 质心：32 条棱上的交点
    let mut centroid = [0.0; 4];
    let mut crossings = 0usize;
    for (c, &vc) in cube.values.iter().enumerate() {
        for axis in 0..4 {
            if c & bit(axis) != 0 {
                continue;
            }
            let vn = cube.values[c | bit(axis)];
            if is_above(vc) == is_above(vn) {
                continue;
            }
            let frac = ((vc - e_crit) / (vc - vn)).clamp(0.0, 1.0);
            for a in 0..4 {
                centroid[a] += origin(c, a);
            }
            centroid[axis] += frac * cube.extents[axis];
            crossings += 1;
        }
    }
    if crossings == 0 {
        return None;
    }
    for x in centroid.iter_mut() {
        *x /= crossings as f64;
    }

    // 法向：少数一侧每个顶点的角单纯形
    let mut dsigma = [0.0; 4];
    for (c, &vc) in cube.values.iter().enumerate() {
        if is_above(vc) != minority_high {
            continue;
        }
        let mut legs = [0.0; 4];
        for (axis, leg) in legs.iter_mut().enumerate() {
            let vn = cube.values[c ^ bit(axis)];
            let frac = if is_above(vn) == minority_high {
                1.0
            } else {
                ((vc - e_crit) / (vc - vn)).clamp(0.0, 1.0)
            };
            *leg = frac * cube.extents[axis];
        }
        for mu in 0..4 {
            let projected: f64 = (0..4).filter(|&nu| nu != mu).map(|nu| legs[nu]).product();
            let away = if c & bit(mu) == 0 { 1.0 } else { -1.0 };
            dsigma[mu] += away * falls * projected / 6.0;
        }
    }
    Some(SurfaceElement { dsigma, centroid })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 只沿一个轴变化的线性场
    fn ramp(axis: usize, lo: f64, hi: f64, extents: [f64; 4]) -> Hypercube {
        let mut values = [0.0; 16];
        for (idx, v) in values.iter_mut().enumerate() {
            let bit = (idx >> (3 - axis)) & 1;
            *v = if bit == 1 { hi } else { lo };
        }
        Hypercube { values, extents }
    }

    #[test]
    fn test_weights_partition_unity() {
        let w = multilinear_weights([0.3, 0.1, 0.7, 0.5]);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-14);
        let corner = multilinear_weights([1.0, 0.0, 1.0, 0.0]);
        assert_eq!(corner[Hypercube::corner_index([1, 0, 1, 0])], 1.0);
    }

    #[test]
    fn test_time_like_decay() {
        let cube = ramp(0, 1.0, 0.2, [0.1, 0.5, 0.5, 0.5]);
        let elements = ProjectionFinder::new(3).find(&cube, 0.6);
        assert_eq!(elements.len(), 1);
        let el = elements[0];
        assert!((el.dsigma[0] - 0.125).abs() < 1e-14);
        assert_eq!(el.dsigma[1], 0.0);
        assert!((el.centroid[0] - 0.05).abs() < 1e-12);
        assert!((el.centroid[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_spatial_sign_points_to_low_values() {
        let extents = [0.1, 1.0, 1.0, 1.0];
        let decreasing = ProjectionFinder::default().find(&ramp(1, 2.0, 0.0, extents), 1.0);
        let increasing = ProjectionFinder::default().find(&ramp(1, 0.0, 2.0, extents), 1.0);
        assert!((decreasing[0].dsigma[1] - 0.1).abs() < 1e-14);
        assert!((increasing[0].dsigma[1] + 0.1).abs() < 1e-14);
    }

    #[test]
    fn test_monotone_cubes_empty() {
        let finder = ProjectionFinder::default();
        let above = Hypercube {
            values: [2.0; 16],
            extents: [1.0; 4],
        };
        assert!(finder.find(&above, 1.0).is_empty());
        let below = Hypercube {
            values: [0.5; 16],
            extents: [1.0; 4],
        };
        assert!(finder.find(&below, 1.0).is_empty());
    }

    #[test]
    fn test_threshold_counts_as_above() {
        let cube = ramp(0, 1.0, 0.5, [1.0; 4]);
        let el = ProjectionFinder::new(1).find(&cube, 1.0);
        assert_eq!(el.len(), 1);
        assert!((el[0].centroid[0]).abs() < 1e-14);
        assert!(!ramp(0, 1.0, 1.0, [1.0; 4]).crosses(1.0));
    }

    #[test]
    fn test_small_corner_cap_falls_back_to_edges() {
        let mut values = [0.0; 16];
        values[0] = 1.2;
        let cube = Hypercube {
            values,
            extents: [1.0; 4],
        };
        assert!(cube.crosses(1.0));
        let elements = ProjectionFinder::default().find(&cube, 1.0);
        assert_eq!(elements.len(), 1);

        // 截距 a = 0.2 / 1.2，投影体积 a³ / 6，指向远离热顶点
        let a: f64 = 1.0 / 6.0;
        for mu in 0..4 {
            assert!((elements[0].dsigma[mu] - a.powi(3) / 6.0).abs() < 1e-14);
            assert!((elements[0].centroid[mu] - a / 4.0).abs() < 1e-14);
        }

        // 热顶点在对角时法向反向
        let mut values = [0.0; 16];
        values[15] = 1.2;
        let cube = Hypercube {
            values,
            extents: [0.1, 1.0, 1.0, 1.0],
        };
        let el = ProjectionFinder::default().find(&cube, 1.0)[0];
        assert!((el.dsigma[0] + a.powi(3) / 6.0).abs() < 1e-14);
        assert!((el.dsigma[1] + 0.1 * a.powi(3) / 6.0).abs() < 1e-14);
        assert!((el.centroid[0] - 0.1 * (1.0 - a / 4.0)).abs() < 1e-14);
    }

    #[test]
    fn test_cold_corner_cap_points_inward() {
        let mut values = [2.0; 16];
        values[0] = 0.9;
        let cube = Hypercube {
            values,
            extents: [1.0; 4],
        };
        let el = ProjectionFinder::new(2).find(&cube, 1.0);
        assert_eq!(el.len(), 1);
        // 场沿 +μ 增大
        assert!(el[0].dsigma.iter().all(|&d| d < 0.0));
    }
}
