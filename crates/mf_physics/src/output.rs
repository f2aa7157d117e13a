// crates/mf_physics/src/output.rs

//! 冻结面输出
//!
//! 四路输出：弹核、靶核、火球与组合流体，每行一条 28 字段的 ASCII 记录。
//! 文件输出使用缓冲写入；测试使用共享内存汇。

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{PhysicsError, PhysicsResult};
use crate::freezeout::FreezeoutRecord;
use crate::types::FluidKind;

// ============================================================
// 输出类别
// ============================================================

/// 冻结面输出类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceCategory {
    /// 弹核流体
    Projectile,
    /// 靶核流体
    Target,
    /// 火球
    Fireball,
    /// 组合流体
    All,
}

impl SurfaceCategory {
    /// 固定顺序
    pub const ALL: [SurfaceCategory; 4] = [Self::Projectile, Self::Target, Self::Fireball, Self::All];

    /// 输出文件名
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Projectile => "freezeout_p.dat",
            Self::Target => "freezeout_t.dat",
            Self::Fireball => "freezeout_f.dat",
            Self::All => "freezeout_all.dat",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Projectile => 0,
            Self::Target => 1,
            Self::Fireball => 2,
            Self::All => 3,
        }
    }
}

impl From<FluidKind> for SurfaceCategory {
    fn from(kind: FluidKind) -> Self {
        match kind {
            FluidKind::Projectile => Self::Projectile,
            FluidKind::Target => Self::Target,
            FluidKind::Fireball => Self::Fireball,
        }
    }
}

// ============================================================
// 输出汇
// ============================================================

/// 冻结记录输出汇
pub trait FreezeoutSink: Send {
    /// 写入一条记录
    fn write_record(&mut self, record: &FreezeoutRecord) -> io::Result<()>;

    /// 刷新
    fn flush(&mut self) -> io::Result<()>;
}

/// 缓冲文件输出
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// 创建（截断已有文件）
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = BufWriter::new(File::create(&path)?);
        Ok(Self { path, writer })
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FreezeoutSink for FileSink {
    fn write_record(&mut self, record: &FreezeoutRecord) -> io::Result<()> {
        writeln!(self.writer, "{record}")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// 内存汇的共享句柄
pub type RecordHandle = Arc<Mutex<Vec<FreezeoutRecord>>>;

/// 内存输出
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: RecordHandle,
}

impl MemorySink {
    /// 创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 共享句柄
    pub fn handle(&self) -> RecordHandle {
        Arc::clone(&self.records)
    }
}

impl FreezeoutSink for MemorySink {
    fn write_record(&mut self, record: &FreezeoutRecord) -> io::Result<()> {
        self.records.lock().push(*record);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================
// 四路输出
// ============================================================

/// 弹核、靶核、火球、组合四路输出
pub struct FreezeoutSinks {
    sinks: [Box<dyn FreezeoutSink>; 4],
    written: [usize; 4],
}

impl FreezeoutSinks {
    /// 注入自定义输出汇
    pub fn with_sinks(
        projectile: Box<dyn FreezeoutSink>,
        target: Box<dyn FreezeoutSink>,
        fireball: Box<dyn FreezeoutSink>,
        all: Box<dyn FreezeoutSink>,
    ) -> Self {
        Self {
            sinks: [projectile, target, fireball, all],
            written: [0; 4],
        }
    }

    /// 在目录下创建四个文件
    pub fn init_output(dir: impl AsRef<Path>) -> PhysicsResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .map_err(|e| PhysicsError::output(format!("创建目录 {}", dir.display()), e))?;
        let open = |category: SurfaceCategory| -> PhysicsResult<Box<dyn FreezeoutSink>> {
            let path = dir.join(category.file_name());
            let sink = FileSink::create(&path)
                .map_err(|e| PhysicsError::output(format!("创建 {}", path.display()), e))?;
            debug!(path = %path.display(), "打开冻结面输出");
            Ok(Box::new(sink))
        };
        Ok(Self::with_sinks(
            open(SurfaceCategory::Projectile)?,
            open(SurfaceCategory::Target)?,
            open(SurfaceCategory::Fireball)?,
            open(SurfaceCategory::All)?,
        ))
    }

    /// 四个内存汇及其句柄（顺序同 [`SurfaceCategory::ALL`]）
    pub fn memory() -> (Self, [RecordHandle; 4]) {
        let sinks = [
            MemorySink::new(),
            MemorySink::new(),
            MemorySink::new(),
            MemorySink::new(),
        ];
        let handles = [
            sinks[0].handle(),
            sinks[1].handle(),
            sinks[2].handle(),
            sinks[3].handle(),
        ];
        let [p, t, f, a] = sinks;
        (
            Self::with_sinks(Box::new(p), Box::new(t), Box::new(f), Box::new(a)),
            handles,
        )
    }

    /// 写入一条记录
    pub fn write(&mut self, category: SurfaceCategory, record: &FreezeoutRecord) -> PhysicsResult<()> {
        let i = category.index();
        self.sinks[i]
            .write_record(record)
            .map_err(|e| PhysicsError::output(category.file_name(), e))?;
        self.written[i] += 1;
        Ok(())
    }

    /// 已写入记录数
    pub fn written(&self, category: SurfaceCategory) -> usize {
        self.written[category.index()]
    }

    /// 刷新全部输出
    pub fn flush(&mut self) -> PhysicsResult<()> {
        for category in SurfaceCategory::ALL {
            self.sinks[category.index()]
                .flush()
                .map_err(|e| PhysicsError::output(category.file_name(), e))?;
        }
        Ok(())
    }
}

impl Drop for FreezeoutSinks {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("冻结面输出刷新失败: {e}");
        }
    }
}

// ============================================================
// 能量密度切片
// ============================================================

/// 能量密度中心切片输出 (`τ x y e` 每行)
pub struct EnergyDensityWriter {
    writer: BufWriter<File>,
}

impl EnergyDensityWriter {
    /// 文件名
    pub const FILE_NAME: &'static str = "energy_density.dat";

    /// 在目录下创建
    pub fn create(dir: impl AsRef<Path>) -> PhysicsResult<Self> {
        let path = dir.as_ref().join(Self::FILE_NAME);
        let file = File::create(&path)
            .map_err(|e| PhysicsError::output(format!("创建 {}", path.display()), e))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// 写入一行
    pub fn write_point(&mut self, tau: f64, x: f64, y: f64, e: f64) -> PhysicsResult<()> {
        writeln!(self.writer, "{tau:>16.8e} {x:>16.8e} {y:>16.8e} {e:>16.8e}")
            .map_err(|err| PhysicsError::output(Self::FILE_NAME, err))
    }

    /// 切片之间的空行
    pub fn end_slice(&mut self) -> PhysicsResult<()> {
        writeln!(self.writer).map_err(|err| PhysicsError::output(Self::FILE_NAME, err))?;
        self.writer
            .flush()
            .map_err(|err| PhysicsError::output(Self::FILE_NAME, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NPI;

    fn record(t: f64) -> FreezeoutRecord {
        FreezeoutRecord {
            t,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            dsigma: [1.0, 0.0, 0.0, 0.0],
            u: [1.0, 0.0, 0.0, 0.0],
            temperature: 0.15,
            mu_b: 0.0,
            mu_q: 0.0,
            mu_s: 0.0,
            pi: [0.0; NPI],
            bulk: 0.0,
            dv_eff: 1.0,
        }
    }

    #[test]
    fn test_memory_sinks_route_by_category() {
        let (mut sinks, handles) = FreezeoutSinks::memory();
        sinks.write(SurfaceCategory::Fireball, &record(1.0)).unwrap();
        sinks.write(SurfaceCategory::All, &record(2.0)).unwrap();
        sinks.write(SurfaceCategory::All, &record(3.0)).unwrap();
        assert_eq!(handles[2].lock().len(), 1);
        assert_eq!(handles[3].lock().len(), 2);
        assert!(handles[0].lock().is_empty());
        assert_eq!(sinks.written(SurfaceCategory::All), 2);
    }

    #[test]
    fn test_init_output_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut sinks = FreezeoutSinks::init_output(dir.path()).unwrap();
            sinks.write(SurfaceCategory::All, &record(1.5)).unwrap();
        }
        for category in SurfaceCategory::ALL {
            assert!(dir.path().join(category.file_name()).exists());
        }
        let text = std::fs::read_to_string(dir.path().join("freezeout_all.dat")).unwrap();
        let fields: Vec<f64> = text
            .split_whitespace()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(fields.len(), 28);
        assert_eq!(fields[0], 1.5);
    }

    #[test]
    fn test_category_from_fluid() {
        assert_eq!(SurfaceCategory::from(FluidKind::Target), SurfaceCategory::Target);
        assert_eq!(SurfaceCategory::Target.file_name(), "freezeout_t.dat");
    }
}
