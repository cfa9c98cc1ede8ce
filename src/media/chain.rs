// SPDX-License-Identifier: MPL-2.0
//! Filter chain executor.
//!
//! A render applies the selected filter, then every set tool in
//! [`EditTool::CHAIN_ORDER`]. Unset tools are skipped. An operation whose
//! primitive yields no output is skipped and reported as degraded; the
//! stage's other operations and the rest of the chain still run.
//!
//! # Example
//!
//! ```
//! use soramoyou_edit::domain::editing::{EditSettings, EditTool};
//! use soramoyou_edit::media::{FilterChain, RenderContext};
//! use image_rs::{Rgba, RgbaImage};
//!
//! let source = RgbaImage::from_pixel(8, 8, Rgba([120, 120, 120, 255]));
//! let settings = EditSettings::new().with(EditTool::Brightness, 0.2);
//!
//! let output = FilterChain::default().render(&source, &settings, &RenderContext::new(1));
//! assert_eq!(output.dimensions(), (8, 8));
//! assert!(output.get_pixel(0, 0).0[0] > 120);
//! ```

use std::fmt;
use std::sync::Arc;

use image_rs::RgbaImage;

use super::catalog::{filter_operations, tool_operations};
use super::primitives::CpuPrimitives;
use crate::application::port::ImagePrimitives;
use crate::diagnostics::{DiagnosticEventKind, DiagnosticsHandle};
use crate::domain::editing::{EditSettings, EditTool, FilterType, Operation, ToolValue};

/// Per-render inputs that are not part of the edit settings.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    seed: u64,
    diagnostics: Option<DiagnosticsHandle>,
}

impl RenderContext {
    /// Context with a fixed grain seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            diagnostics: None,
        }
    }

    /// Context with a fresh random grain seed.
    #[must_use]
    pub fn random() -> Self {
        Self::new(uuid::Uuid::new_v4().as_u64_pair().0)
    }

    /// Reports degraded stages to `handle`.
    #[must_use]
    pub fn with_diagnostics(mut self, handle: Option<DiagnosticsHandle>) -> Self {
        self.diagnostics = handle;
        self
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// A step of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Filter(FilterType),
    Tool(EditTool),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Filter(filter) => write!(f, "filter:{filter}"),
            Stage::Tool(tool) => write!(f, "tool:{tool}"),
        }
    }
}

/// What a render did, stage by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Stages that changed the image, in order.
    pub applied: Vec<Stage>,
    /// One entry per operation that yielded no usable output. A stage with
    /// several operations keeps the output of the ones that succeeded.
    pub degraded: Vec<Stage>,
}

impl RenderReport {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Applies filters and tools through an [`ImagePrimitives`] backend.
#[derive(Clone)]
pub struct FilterChain {
    primitives: Arc<dyn ImagePrimitives>,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new(Arc::new(CpuPrimitives))
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("primitives", &self.primitives.name())
            .finish()
    }
}

impl FilterChain {
    #[must_use]
    pub fn new(primitives: Arc<dyn ImagePrimitives>) -> Self {
        Self { primitives }
    }

    /// Renders `source` with `settings`. The source is not modified.
    #[must_use]
    pub fn render(
        &self,
        source: &RgbaImage,
        settings: &EditSettings,
        context: &RenderContext,
    ) -> RgbaImage {
        self.render_with_report(source, settings, context).0
    }

    /// Renders and reports which stages ran and which degraded.
    #[must_use]
    pub fn render_with_report(
        &self,
        source: &RgbaImage,
        settings: &EditSettings,
        context: &RenderContext,
    ) -> (RgbaImage, RenderReport) {
        let mut report = RenderReport::default();
        let mut current = source.clone();

        if let Some(filter) = settings.applied_filter() {
            let operations = filter_operations(filter);
            if !operations.is_empty() {
                current = self.run_stage(
                    Stage::Filter(filter),
                    &operations,
                    current,
                    context,
                    &mut report,
                );
            }
        }

        for tool in EditTool::CHAIN_ORDER {
            let Some(value) = settings.value(tool) else {
                continue;
            };
            let operations = tool_operations(tool, ToolValue::new(value));
            current = self.run_stage(Stage::Tool(tool), &operations, current, context, &mut report);
        }

        (current, report)
    }

    /// Applies a single tool, including the geometric crop/rotate tool.
    #[must_use]
    pub fn apply_tool(
        &self,
        tool: EditTool,
        value: f32,
        image: &RgbaImage,
        context: &RenderContext,
    ) -> RgbaImage {
        let operations = tool_operations(tool, ToolValue::new(value));
        let mut report = RenderReport::default();
        self.run_stage(Stage::Tool(tool), &operations, image.clone(), context, &mut report)
    }

    /// Applies a single filter preset.
    #[must_use]
    pub fn apply_filter(
        &self,
        filter: FilterType,
        image: &RgbaImage,
        context: &RenderContext,
    ) -> RgbaImage {
        let operations = filter_operations(filter);
        let mut report = RenderReport::default();
        self.run_stage(Stage::Filter(filter), &operations, image.clone(), context, &mut report)
    }

    fn run_stage(
        &self,
        stage: Stage,
        operations: &[Operation],
        input: RgbaImage,
        context: &RenderContext,
        report: &mut RenderReport,
    ) -> RgbaImage {
        let seed = stage_seed(context.seed, stage);
        let dimensions = input.dimensions();
        let mut current = input;
        let mut any_applied = false;

        // A failed operation leaves the previous output in place and the
        // remaining operations of the stage still run.
        for operation in operations {
            match self.primitives.apply(operation, &current, seed) {
                Some(image) if image.dimensions() == dimensions => {
                    current = image;
                    any_applied = true;
                }
                _ => {
                    if let Some(handle) = &context.diagnostics {
                        handle.log(DiagnosticEventKind::StageDegraded {
                            tool: match stage {
                                Stage::Tool(tool) => Some(tool),
                                Stage::Filter(_) => None,
                            },
                            operation: operation.name().to_string(),
                        });
                    }
                    report.degraded.push(stage);
                }
            }
        }

        if any_applied || operations.is_empty() {
            report.applied.push(stage);
        }
        current
    }
}

/// Mixes the render seed with the stage so stochastic stages decorrelate.
fn stage_seed(seed: u64, stage: Stage) -> u64 {
    let salt = match stage {
        Stage::Filter(filter) => filter as u64 + 1,
        Stage::Tool(tool) => tool.index() as u64 + 0x100,
    };
    seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
