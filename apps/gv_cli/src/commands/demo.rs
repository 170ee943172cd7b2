// apps/gv_cli/src/commands/demo.rs

//! 演示命令
//!
//! 在内存中融合一个合成场景，依次执行控制意图（内置脚本或 JSON 文件），
//! 并在每一步后打印图层状态表。

use crate::synthetic::SyntheticScene;
use anyhow::{Context, Result};
use clap::Args;
use gv_config::SceneConfig;
use gv_scene::{
    LayerGroup, LayerKind, LayerRegistry, LoggingListener, SceneFusion, SceneIntent,
    SceneStateManager,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// 演示参数
#[derive(Args)]
pub struct DemoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 意图脚本（JSON 数组），缺省时使用内置脚本
    #[arg(short, long)]
    pub intents: Option<PathBuf>,

    /// 合成栅格边长（像素）
    #[arg(long, default_value = "64")]
    pub size: usize,

    /// 合成剖面条数
    #[arg(long, default_value = "3")]
    pub profiles: usize,

    /// 逐条记录每个重绘信号中的变更
    #[arg(short, long)]
    pub verbose: bool,
}

/// 执行演示命令
pub fn execute(args: DemoArgs) -> Result<()> {
    info!("=== GeoViz 场景演示 ===");

    let config = match &args.config {
        Some(path) => SceneConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display()))?,
        None => SceneConfig::default(),
    };

    let start = Instant::now();
    let inputs = SyntheticScene {
        size: args.size,
        profiles: args.profiles,
    }
    .build(&config)
    .context("生成合成场景失败")?;
    let registry = SceneFusion::new(config.clone())?
        .fuse(&inputs)
        .context("场景融合失败")?;
    info!("融合完成，用时 {:.1} ms", start.elapsed().as_secs_f64() * 1e3);

    println!("\n初始状态:");
    print_layers(&registry, config.display.color_range_steps);

    let intents = match &args.intents {
        Some(path) => load_intents(path)?,
        None => default_script(&config, &registry),
    };

    let mut manager = SceneStateManager::new(registry);
    let listener = if args.verbose {
        LoggingListener::new("render").verbose()
    } else {
        LoggingListener::new("render")
    };
    manager.dispatcher().add_listener(Arc::new(listener));

    for (step, intent) in intents.into_iter().enumerate() {
        println!("\n[{}] {:?}", step + 1, intent);
        match manager.apply(intent) {
            Ok(true) => print_layers(manager.registry(), config.display.color_range_steps),
            Ok(false) => println!("  (无变化，不重绘)"),
            Err(e) => {
                warn!("意图被拒绝: {}", e);
                println!("  ✗ {}", e);
            }
        }
    }

    println!("\n共发出 {} 次重绘", manager.redraw_count());
    Ok(())
}

fn load_intents(path: &Path) -> Result<Vec<SceneIntent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取意图脚本: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("意图脚本格式错误: {}", path.display()))
}

/// 内置脚本：覆盖全部意图类型，包括一次无操作和一次被拒绝的范围
fn default_script(config: &SceneConfig, registry: &LayerRegistry) -> Vec<SceneIntent> {
    let velocity = &config.attributes.velocity;
    let mut script = vec![
        SceneIntent::ToggleGroup {
            group: LayerGroup::Kind(LayerKind::Profile),
            visible: false,
        },
        SceneIntent::ToggleGroup {
            group: LayerGroup::Kind(LayerKind::Profile),
            visible: false,
        },
        SceneIntent::SetOpacity {
            id: gv_scene::fusion::ELEVATION_LAYER_ID.to_string(),
            opacity: 0.5,
        },
        SceneIntent::SetColorRange {
            id: gv_scene::fusion::ELEVATION_LAYER_ID.to_string(),
            range: (10.0, 5.0),
        },
        SceneIntent::ToggleLayer {
            id: gv_scene::fusion::RESISTIVITY_LAYER_ID.to_string(),
            visible: false,
        },
    ];

    // 速度色标收窄到中间一半
    let shared = registry
        .layers_with_attribute(velocity)
        .first()
        .and_then(|id| registry.get(id.as_str()).ok())
        .and_then(|layer| layer.color_range());
    if let Some(range) = shared {
        let quarter = range.width() / 4.0;
        script.push(SceneIntent::SetAttributeColorRange {
            attribute: velocity.clone(),
            range: (range.min() + quarter, range.max() - quarter),
        });
    }

    script.push(SceneIntent::ToggleGroup {
        group: LayerGroup::Kind(LayerKind::Profile),
        visible: true,
    });
    script
}

fn print_layers(registry: &LayerRegistry, steps: u32) {
    println!(
        "  {:<16} {:<16} {:>5} {:>6} {:>24} {:>8} {:>8}",
        "id", "类型", "可见", "不透明", "色标范围", "步长", "顶点"
    );
    for layer in registry.all() {
        let (range, step) = match layer.color_range() {
            Some(r) => (format!("[{:.2}, {:.2}]", r.min(), r.max()), format!("{:.2}", r.step(steps))),
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "  {:<16} {:<16} {:>5} {:>6.2} {:>24} {:>8} {:>8}",
            layer.id().as_str(),
            layer.kind().name(),
            if layer.visible() { "✓" } else { "✗" },
            layer.opacity(),
            range,
            step,
            layer.geometry().mesh().n_vertices()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registry(config: &SceneConfig) -> LayerRegistry {
        let inputs = SyntheticScene { size: 8, profiles: 2 }.build(config).unwrap();
        SceneFusion::new(config.clone()).unwrap().fuse(&inputs).unwrap()
    }

    #[test]
    fn test_default_script_runs() {
        let config = SceneConfig::default();
        let registry = registry(&config);
        let script = default_script(&config, &registry);
        assert_eq!(script.len(), 7);

        let mut manager = SceneStateManager::new(registry);
        let outcomes: Vec<_> = script.into_iter().map(|i| manager.apply(i)).collect();

        // 第二次切换是无操作，倒序范围被拒绝
        assert!(matches!(outcomes[1], Ok(false)));
        assert!(outcomes[3].is_err());
        assert_eq!(manager.redraw_count(), 5);
        assert!(manager.registry().all().iter().filter(|l| l.id().as_str() != "cmd").all(|l| l.visible()));
    }

    #[test]
    fn test_load_intents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"intent": "toggle_layer", "id": "dem", "visible": false}},
                {{"intent": "set_opacity", "id": "cmd", "opacity": 0.3}}]"#
        )
        .unwrap();
        let intents = load_intents(file.path()).unwrap();
        assert_eq!(intents.len(), 2);
        assert_eq!(
            intents[0],
            SceneIntent::ToggleLayer {
                id: "dem".to_string(),
                visible: false
            }
        );
    }
}
