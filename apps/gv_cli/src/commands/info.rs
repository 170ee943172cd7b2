// apps/gv_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示版本信息和默认配置。

use anyhow::{Context, Result};
use clap::Args;
use gv_config::SceneConfig;
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径（显示该配置而非默认值）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示系统信息
    #[arg(long)]
    pub system: bool,

    /// 以 JSON 输出配置
    #[arg(long)]
    pub json: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== GeoViz 信息 ===");

    if args.system {
        print_system_info();
        println!();
    }

    let (title, config) = match &args.config {
        Some(path) => {
            let config = SceneConfig::from_file(path)
                .with_context(|| format!("无法加载配置文件: {}", path.display()))?;
            ("配置", config)
        }
        None => ("默认配置", SceneConfig::default()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print_config(title, &config);
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("GeoViz CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
}

fn print_config(title: &str, config: &SceneConfig) {
    println!("=== {} ===", title);

    let geo = &config.georeference;
    println!("CRS: {}", geo.crs);
    println!(
        "测区范围: x [{}, {}], y [{}, {}]",
        geo.bounds[0], geo.bounds[2], geo.bounds[1], geo.bounds[3]
    );

    let fusion = &config.fusion;
    println!("\n融合参数:");
    println!("  z_shift: {} m", fusion.z_shift);
    println!("  电阻率抬升: {} m", fusion.resistivity_offset);
    println!("  高程上限: {} m", fusion.max_elevation);
    println!("  无数据值: {}", fusion.nodata);
    println!("  变形系数: {}", fusion.warp_factor);
    println!("  剖面名长度: {}", fusion.profile_name_len);
    println!("  并行阈值: {}", fusion.parallel_threshold);

    let attrs = &config.attributes;
    let cmaps = &config.colormaps;
    println!("\n属性 / 色表:");
    println!("  剖面: {} / {}", attrs.velocity, cmaps.seismic);
    println!("  高程: {} / {}", attrs.elevation, cmaps.elevation);
    println!("  电阻率: {} / {}", attrs.resistivity, cmaps.resistivity);
    println!("  覆盖度: {}", attrs.coverage);

    let display = &config.display;
    println!("\n显示:");
    println!(
        "  初始不透明度: 剖面 {}, 高程 {}, 电阻率 {}",
        display.profile_opacity, display.elevation_opacity, display.resistivity_opacity
    );
    println!("  色标分段数: {}", display.color_range_steps);
}
