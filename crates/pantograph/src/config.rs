//! Configuration types for the Pantograph editor engine.
//!
//! This module provides configuration structures that control the canvas and
//! the interactive behavior of the placement engine. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining canvas and interaction settings.
//! - [`CanvasConfig`] - Dimensions of the drawing canvas that node positions are clamped to.
//! - [`InteractionConfig`] - Node creation defaults and gesture hit margins.
//!
//! # Example
//!
//! ```
//! # use pantograph::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.interaction().resize_margin(), 10.0);
//! ```

use serde::Deserialize;

use pantograph_core::geometry::Size;

fn default_canvas_width() -> f32 {
    1600.0
}

fn default_canvas_height() -> f32 {
    1200.0
}

fn default_node_width() -> f32 {
    200.0
}

fn default_node_height() -> f32 {
    150.0
}

fn default_resize_margin() -> f32 {
    10.0
}

/// Top-level configuration for the editor engine.
///
/// Groups [`CanvasConfig`] and [`InteractionConfig`] into a single
/// configuration root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Canvas configuration section.
    #[serde(default)]
    canvas: CanvasConfig,

    /// Interaction configuration section.
    #[serde(default)]
    interaction: InteractionConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified canvas and interaction
    /// configurations.
    pub fn new(canvas: CanvasConfig, interaction: InteractionConfig) -> Self {
        Self {
            canvas,
            interaction,
        }
    }

    /// Returns the canvas configuration.
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Returns the interaction configuration.
    pub fn interaction(&self) -> &InteractionConfig {
        &self.interaction
    }
}

/// Dimensions of the drawing canvas.
///
/// Node positions are clamped so every node stays fully inside the canvas;
/// the canvas never rejects a position, it clips it.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    /// Canvas width in canvas units.
    #[serde(default = "default_canvas_width")]
    width: f32,

    /// Canvas height in canvas units.
    #[serde(default = "default_canvas_height")]
    height: f32,
}

impl CanvasConfig {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns the canvas dimensions as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
        }
    }
}

/// Node creation defaults and gesture hit margins.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionConfig {
    /// Width given to newly created nodes.
    #[serde(default = "default_node_width")]
    default_node_width: f32,

    /// Height given to newly created nodes.
    #[serde(default = "default_node_height")]
    default_node_height: f32,

    /// Width of the border band, along each node edge, that starts a resize
    /// gesture instead of a drag.
    #[serde(default = "default_resize_margin")]
    resize_margin: f32,
}

impl InteractionConfig {
    /// Returns the size given to newly created nodes.
    pub fn default_node_size(&self) -> Size {
        Size::new(self.default_node_width, self.default_node_height)
    }

    /// Returns the resize hit-band width.
    pub fn resize_margin(&self) -> f32 {
        self.resize_margin
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            default_node_width: default_node_width(),
            default_node_height: default_node_height(),
            resize_margin: default_resize_margin(),
        }
    }
}
