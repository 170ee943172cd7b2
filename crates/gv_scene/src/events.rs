// crates/gv_scene/src/events.rs

//! 重绘事件模块
//!
//! 提供渲染端可见的状态变更（actor mutation）、重绘信号和分发机制。
//! 监听器在状态修改全部完成后才收到信号，并同时拿到当前图层快照。

use crate::layer::{ColorRange, Layer, LayerId};
use parking_lot::RwLock;
use std::sync::Arc;

/// 单个渲染 actor 的属性变更
#[derive(Debug, Clone, PartialEq)]
pub enum ActorMutation {
    /// 可见性变更
    Visibility {
        /// 图层
        layer: LayerId,
        /// 新可见性
        visible: bool,
    },
    /// 不透明度变更
    Opacity {
        /// 图层
        layer: LayerId,
        /// 新不透明度
        opacity: f64,
    },
    /// 色标范围变更
    ColorRange {
        /// 图层
        layer: LayerId,
        /// 新范围
        range: ColorRange,
    },
}

impl ActorMutation {
    /// 变更涉及的图层
    pub fn layer(&self) -> &LayerId {
        match self {
            Self::Visibility { layer, .. }
            | Self::Opacity { layer, .. }
            | Self::ColorRange { layer, .. } => layer,
        }
    }

    /// 变更名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Visibility { .. } => "Visibility",
            Self::Opacity { .. } => "Opacity",
            Self::ColorRange { .. } => "ColorRange",
        }
    }
}

/// 重绘信号
///
/// 每个生效的操作恰好产生一个信号，序号单调递增。
#[derive(Debug, Clone, PartialEq)]
pub struct RedrawSignal {
    /// 序号（从 1 开始）
    pub sequence: u64,
    /// 本次信号覆盖的变更（按应用顺序）
    pub mutations: Vec<ActorMutation>,
}

/// 重绘监听器 trait
pub trait RedrawListener: Send + Sync {
    /// 处理重绘信号
    fn on_redraw(&self, signal: &RedrawSignal, layers: &[Layer]);

    /// 获取监听器名称 (用于调试)
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 函数式重绘监听器
pub struct FnListener<F>
where
    F: Fn(&RedrawSignal, &[Layer]) + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&RedrawSignal, &[Layer]) + Send + Sync,
{
    /// 创建函数式监听器
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> RedrawListener for FnListener<F>
where
    F: Fn(&RedrawSignal, &[Layer]) + Send + Sync,
{
    fn on_redraw(&self, signal: &RedrawSignal, layers: &[Layer]) {
        (self.handler)(signal, layers);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 日志重绘监听器
pub struct LoggingListener {
    /// 日志前缀
    prefix: String,
    /// 是否逐条输出变更
    verbose: bool,
}

impl LoggingListener {
    /// 创建日志监听器
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            verbose: false,
        }
    }

    /// 设置详细模式
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl RedrawListener for LoggingListener {
    fn on_redraw(&self, signal: &RedrawSignal, layers: &[Layer]) {
        let visible = layers.iter().filter(|l| l.visible()).count();
        tracing::info!(
            "{}: 重绘 #{} ({} 项变更, {}/{} 图层可见)",
            self.prefix,
            signal.sequence,
            signal.mutations.len(),
            visible,
            layers.len()
        );

        if self.verbose {
            for mutation in &signal.mutations {
                let detail = match mutation {
                    ActorMutation::Visibility { layer, visible } => {
                        format!("{layer} visible={visible}")
                    }
                    ActorMutation::Opacity { layer, opacity } => {
                        format!("{layer} opacity={opacity:.2}")
                    }
                    ActorMutation::ColorRange { layer, range } => {
                        format!("{layer} range={range}")
                    }
                };
                tracing::info!("{}:   {}", self.prefix, detail);
            }
        }
    }

    fn name(&self) -> &str {
        "LoggingListener"
    }
}

/// 重绘分发器
#[derive(Default)]
pub struct RedrawDispatcher {
    listeners: RwLock<Vec<Arc<dyn RedrawListener>>>,
}

impl RedrawDispatcher {
    /// 创建新的分发器
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// 添加监听器
    pub fn add_listener(&self, listener: Arc<dyn RedrawListener>) {
        let name = listener.name().to_string();
        self.listeners.write().push(listener);
        tracing::debug!("添加重绘监听器: {}", name);
    }

    /// 添加函数式监听器
    pub fn add_fn_listener<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&RedrawSignal, &[Layer]) + Send + Sync + 'static,
    {
        let listener = Arc::new(FnListener::new(name, handler));
        self.add_listener(listener);
    }

    /// 移除监听器
    pub fn remove_listener(&self, listener: &Arc<dyn RedrawListener>) {
        self.listeners
            .write()
            .retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// 清除所有监听器
    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    /// 分发信号
    pub fn emit(&self, signal: &RedrawSignal, layers: &[Layer]) {
        let listeners = self.listeners.read();

        tracing::trace!(
            sequence = signal.sequence,
            mutations = signal.mutations.len(),
            "分发重绘信号"
        );

        for listener in listeners.iter() {
            listener.on_redraw(signal, layers);
        }
    }

    /// 获取监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for RedrawDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedrawDispatcher")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn signal(sequence: u64) -> RedrawSignal {
        RedrawSignal {
            sequence,
            mutations: vec![ActorMutation::Visibility {
                layer: LayerId::from("dem"),
                visible: false,
            }],
        }
    }

    #[test]
    fn test_redraw_dispatcher() {
        let dispatcher = RedrawDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        dispatcher.add_fn_listener("test", move |signal, layers| {
            assert!(layers.is_empty());
            counter_clone.fetch_add(signal.mutations.len(), Ordering::SeqCst);
        });

        dispatcher.emit(&signal(1), &[]);
        dispatcher.emit(&signal(2), &[]);

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remove_listener() {
        let dispatcher = RedrawDispatcher::new();
        let listener: Arc<dyn RedrawListener> = Arc::new(LoggingListener::new("scene").verbose());
        dispatcher.add_listener(listener.clone());
        dispatcher.add_fn_listener("noop", |_, _| {});
        assert_eq!(dispatcher.listener_count(), 2);

        dispatcher.remove_listener(&listener);
        assert_eq!(dispatcher.listener_count(), 1);

        dispatcher.clear();
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn test_mutation_accessors() {
        let mutation = ActorMutation::Opacity {
            layer: LayerId::from("cmd"),
            opacity: 0.3,
        };
        assert_eq!(mutation.layer(), "cmd");
        assert_eq!(mutation.name(), "Opacity");
    }
}
