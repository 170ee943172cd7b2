// apps/gv_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 解析并验证场景配置文件，另外给出不致命但可疑的设置警告。

use anyhow::{bail, Result};
use clap::Args;
use gv_config::SceneConfig;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== GeoViz 配置验证 ===");

    let Some(config_path) = &args.config else {
        println!("用法: gv_cli validate --config <配置文件> [--strict]");
        return Ok(());
    };

    let mut result = ValidationResult::default();
    validate_config(config_path, &mut result);
    print_validation_result(&result, args.strict)
}

fn validate_config(path: &Path, result: &mut ValidationResult) {
    println!("\n检查配置文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("配置文件不存在: {}", path.display()));
        return;
    }

    // from_file 内部已调用 validate
    match SceneConfig::from_file(path) {
        Ok(config) => {
            println!("  ✓ 配置文件格式有效");
            check_warnings(&config, result);
        }
        Err(e) => result.add_error(e.to_string()),
    }
}

fn check_warnings(config: &SceneConfig, result: &mut ValidationResult) {
    let fusion = &config.fusion;

    if fusion.resistivity_offset < 0.0 {
        result.add_warning(format!(
            "电阻率抬升 {} 为负，电阻率图将被高程面遮挡",
            fusion.resistivity_offset
        ));
    }

    if fusion.max_elevation <= 0.0 {
        result.add_warning(format!("高程上限 {} m 不大于 0，披覆面将被压平", fusion.max_elevation));
    }

    if fusion.parallel_threshold == 0 {
        result.add_warning("并行阈值为 0，所有重采样都将并行执行");
    }

    let display = &config.display;
    for (name, opacity) in [
        ("剖面", display.profile_opacity),
        ("高程", display.elevation_opacity),
        ("电阻率", display.resistivity_opacity),
    ] {
        if opacity == 0.0 {
            result.add_warning(format!("{}图层初始完全透明", name));
        }
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
