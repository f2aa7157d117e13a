// crates/mf_config/src/run_config.rs

//! MultiHydroConfig - 三流体运行配置
//!
//! 所有字段都有默认值，JSON 中只需给出与默认不同的部分。
//! 单位约定：能量 GeV，长度与时间 fm (fm/c)，能量密度 GeV/fm³。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 两个核子质量 [GeV]，低于此值的 √s_NN 没有物理意义
const TWO_NUCLEON_MASSES: f64 = 2.0 * 0.938;

/// 三流体运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiHydroConfig {
    /// 网格配置
    #[serde(default)]
    pub grid: GridConfig,

    /// 初始固有时 τ0 [fm/c]
    #[serde(default = "default_tau0")]
    pub tau0: f64,

    /// 固有时步长 dτ [fm/c]
    #[serde(default = "default_dtau")]
    pub dtau: f64,

    /// 冻结临界能量密度 [GeV/fm³]
    #[serde(default = "default_e_crit")]
    pub e_crit: f64,

    /// 碰撞能量 √s_NN [GeV]
    #[serde(default = "default_snn")]
    pub snn: f64,

    /// 坐标系
    #[serde(default)]
    pub coordinates: CoordinateKind,

    /// 摩擦配置
    #[serde(default)]
    pub friction: FrictionConfig,

    /// 冻结面配置
    #[serde(default)]
    pub freezeout: FreezeoutConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 运行控制
    #[serde(default)]
    pub run: RunConfig,
}

fn default_tau0() -> f64 { 1.0 }
fn default_dtau() -> f64 { 0.05 }
fn default_e_crit() -> f64 { 0.5 }
fn default_snn() -> f64 { 8.8 }

/// 网格配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// x 方向单元数
    #[serde(default = "default_n")]
    pub nx: usize,
    /// y 方向单元数
    #[serde(default = "default_n")]
    pub ny: usize,
    /// z (或 η) 方向单元数
    #[serde(default = "default_n")]
    pub nz: usize,
    /// x 方向间距 [fm]
    #[serde(default = "default_spacing")]
    pub dx: f64,
    /// y 方向间距 [fm]
    #[serde(default = "default_spacing")]
    pub dy: f64,
    /// z 方向间距 [fm]，Milne 坐标下为 Δη
    #[serde(default = "default_spacing")]
    pub dz: f64,
    /// 第一个单元中心的 x 坐标，缺省时网格关于 0 居中
    #[serde(default)]
    pub xmin: Option<f64>,
    /// 第一个单元中心的 y 坐标
    #[serde(default)]
    pub ymin: Option<f64>,
    /// 第一个单元中心的 z 坐标
    #[serde(default)]
    pub zmin: Option<f64>,
}

fn default_n() -> usize { 20 }
fn default_spacing() -> f64 { 0.5 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: default_n(),
            ny: default_n(),
            nz: default_n(),
            dx: default_spacing(),
            dy: default_spacing(),
            dz: default_spacing(),
            xmin: None,
            ymin: None,
            zmin: None,
        }
    }
}

impl GridConfig {
    /// 居中网格时第一个单元的坐标
    fn centered_min(n: usize, d: f64) -> f64 {
        -0.5 * (n.saturating_sub(1)) as f64 * d
    }

    /// 解析后的 (xmin, ymin, zmin)
    pub fn origin(&self) -> (f64, f64, f64) {
        (
            self.xmin.unwrap_or_else(|| Self::centered_min(self.nx, self.dx)),
            self.ymin.unwrap_or_else(|| Self::centered_min(self.ny, self.dy)),
            self.zmin.unwrap_or_else(|| Self::centered_min(self.nz, self.dz)),
        )
    }
}

/// 坐标系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateKind {
    /// (t, x, y, z)
    #[default]
    Cartesian,
    /// (τ, x, y, η)
    Milne,
}

/// 摩擦配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrictionConfig {
    /// 0 使用微观 (Ivanov) 摩擦，>0 使用简化摩擦并作为其强度
    #[serde(default)]
    pub lambda: f64,
    /// 形成时间 [fm/c]，火球获得的摩擦流延迟此时间
    #[serde(default)]
    pub formation_time: f64,
    /// 火球参与摩擦的最低温度 [GeV]
    #[serde(default = "default_min_fireball_temperature")]
    pub min_fireball_temperature: f64,
}

fn default_min_fireball_temperature() -> f64 { 0.01 }

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            lambda: 0.0,
            formation_time: 0.0,
            min_fireball_temperature: default_min_fireball_temperature(),
        }
    }
}

/// 冻结判据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CriterionKind {
    /// 总能动张量的 Landau 对角化
    #[default]
    Landau,
    /// 总守恒量按理想流体反演
    Effective,
    /// 三个流体局域能量密度的最大值
    Maximum,
    /// 三个流体局域能量密度之和
    Sum,
}

/// 多个类时本征向量时的选择规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EigenSelectionKind {
    /// 取最大本征值
    #[default]
    LargestEigenvalue,
    /// 取三速度最小的本征向量
    SmallestVelocity,
}

/// 冻结面配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeoutConfig {
    /// 冻结判据
    #[serde(default)]
    pub criterion: CriterionKind,
    /// 超立方体面搜索每个方向的采样数
    #[serde(default = "default_finder_resolution")]
    pub finder_resolution: usize,
    /// Landau 本征向量选择规则
    #[serde(default)]
    pub eigen_selection: EigenSelectionKind,
}

fn default_finder_resolution() -> usize { 4 }

impl Default for FreezeoutConfig {
    fn default() -> Self {
        Self {
            criterion: CriterionKind::default(),
            finder_resolution: default_finder_resolution(),
            eigen_selection: EigenSelectionKind::default(),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// 能量密度切片输出间隔（步数），0 表示不输出
    #[serde(default)]
    pub energy_density_interval: usize,
}

fn default_output_dir() -> PathBuf { PathBuf::from("output") }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            energy_density_interval: 0,
        }
    }
}

/// 运行控制
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// 总步数
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,
    /// 日志汇总间隔（步数）
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,
}

fn default_n_steps() -> usize { 100 }
fn default_log_interval() -> usize { 10 }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n_steps: default_n_steps(),
            log_interval: default_log_interval(),
        }
    }
}

impl Default for MultiHydroConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            tau0: default_tau0(),
            dtau: default_dtau(),
            e_crit: default_e_crit(),
            snn: default_snn(),
            coordinates: CoordinateKind::default(),
            friction: FrictionConfig::default(),
            freezeout: FreezeoutConfig::default(),
            output: OutputConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl MultiHydroConfig {
    /// 从 JSON 文件加载配置并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析配置并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: MultiHydroConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存为格式化 JSON
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.grid;
        for (key, n) in [("grid.nx", g.nx), ("grid.ny", g.ny), ("grid.nz", g.nz)] {
            if n == 0 {
                return Err(ConfigError::invalid(key, n, "网格尺寸必须至少为 1"));
            }
        }
        for (key, d) in [("grid.dx", g.dx), ("grid.dy", g.dy), ("grid.dz", g.dz)] {
            require_positive(key, d)?;
        }
        require_positive("tau0", self.tau0)?;
        require_positive("dtau", self.dtau)?;
        require_positive("e_crit", self.e_crit)?;

        if !self.snn.is_finite() || self.snn <= TWO_NUCLEON_MASSES {
            return Err(ConfigError::invalid(
                "snn",
                self.snn,
                "√s_NN 必须大于两个核子质量",
            ));
        }

        let f = &self.friction;
        if !f.lambda.is_finite() || f.lambda < 0.0 {
            return Err(ConfigError::invalid("friction.lambda", f.lambda, "必须为非负有限数"));
        }
        if !f.formation_time.is_finite() || f.formation_time < 0.0 {
            return Err(ConfigError::invalid(
                "friction.formation_time",
                f.formation_time,
                "必须为非负有限数",
            ));
        }
        if !f.min_fireball_temperature.is_finite() || f.min_fireball_temperature < 0.0 {
            return Err(ConfigError::invalid(
                "friction.min_fireball_temperature",
                f.min_fireball_temperature,
                "必须为非负有限数",
            ));
        }

        let r = self.freezeout.finder_resolution;
        if r == 0 || r > 64 {
            return Err(ConfigError::invalid(
                "freezeout.finder_resolution",
                r,
                "必须在 [1, 64] 范围内",
            ));
        }

        if self.run.log_interval == 0 {
            return Err(ConfigError::invalid("run.log_interval", 0, "必须至少为 1"));
        }

        Ok(())
    }

    /// 是否选择了简化摩擦
    pub fn uses_simplified_friction(&self) -> bool {
        self.friction.lambda > 0.0
    }
}

fn require_positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(key, value, "必须为正的有限数"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = MultiHydroConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.uses_simplified_friction());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "grid": { "nx": 4, "ny": 1, "nz": 8, "dz": 0.2 },
            "e_crit": 0.3,
            "coordinates": "milne",
            "friction": { "lambda": 1.5, "formation_time": 0.6 },
            "freezeout": { "criterion": "sum", "eigen_selection": "smallest_velocity" }
        }"#;
        let config = MultiHydroConfig::from_json(json).unwrap();
        assert_eq!(config.grid.nx, 4);
        assert_eq!(config.grid.dx, 0.5);
        assert_eq!(config.coordinates, CoordinateKind::Milne);
        assert_eq!(config.freezeout.criterion, CriterionKind::Sum);
        assert_eq!(
            config.freezeout.eigen_selection,
            EigenSelectionKind::SmallestVelocity
        );
        assert!(config.uses_simplified_friction());
        assert_eq!(config.dtau, 0.05);
    }

    #[test]
    fn test_non_positive_dtau_rejected() {
        let mut config = MultiHydroConfig::default();
        config.dtau = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "dtau"
        ));
    }

    #[test]
    fn test_non_positive_e_crit_rejected() {
        let mut config = MultiHydroConfig::default();
        config.e_crit = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_grid_rejected() {
        let json = r#"{ "grid": { "nx": 0 } }"#;
        assert!(MultiHydroConfig::from_json(json).is_err());
    }

    #[test]
    fn test_negative_lambda_rejected() {
        let mut config = MultiHydroConfig::default();
        config.friction.lambda = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_centered_origin() {
        let grid = GridConfig {
            nx: 5,
            dx: 1.0,
            ..GridConfig::default()
        };
        let (xmin, _, _) = grid.origin();
        assert!((xmin + 2.0).abs() < 1e-12);

        let shifted = GridConfig {
            xmin: Some(3.0),
            ..GridConfig::default()
        };
        assert_eq!(shifted.origin().0, 3.0);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut config = MultiHydroConfig::default();
        config.e_crit = 0.25;
        config.to_file(&path).unwrap();
        let loaded = MultiHydroConfig::from_file(&path).unwrap();
        assert_eq!(loaded.e_crit, 0.25);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            MultiHydroConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
