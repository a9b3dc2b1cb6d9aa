// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node content: textures, animation frames, text and vector graphics.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Circle, Point, Rect, RoundedRect};

/// An opaque reference to a loaded texture.
///
/// Textures are created and owned by whatever resource loader the embedding
/// application provides; the scene graph only stores the handle.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u32);

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({})", self.0)
    }
}

/// Horizontal alignment of multi-line text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

/// Styling for text content.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font family name.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Packed `0xRRGGBB` fill color.
    pub fill: u32,
    /// Alignment of wrapped lines.
    pub align: TextAlign,
    /// Whether to wrap at [`word_wrap_width`](Self::word_wrap_width).
    pub word_wrap: bool,
    /// Wrap width in pixels.
    pub word_wrap_width: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: String::from("Arial"),
            font_size: 26.0,
            fill: 0x00_00_00,
            align: TextAlign::Left,
            word_wrap: false,
            word_wrap_width: 100.0,
        }
    }
}

/// Text plus the style it is rendered with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextContent {
    /// The string to render.
    pub text: String,
    /// How to render it.
    pub style: TextStyle,
}

/// A single retained vector drawing command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GraphicsCommand {
    /// Starts filling subsequent shapes with a color and alpha.
    BeginFill {
        /// Packed `0xRRGGBB` color.
        color: u32,
        /// Fill alpha.
        alpha: f64,
    },
    /// Stops filling.
    EndFill,
    /// Sets the stroke for subsequent shapes.
    LineStyle {
        /// Stroke width; `0.0` disables stroking.
        width: f64,
        /// Packed `0xRRGGBB` color.
        color: u32,
        /// Stroke alpha.
        alpha: f64,
    },
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A rectangle with rounded corners.
    RoundedRect(RoundedRect),
    /// A circle.
    Circle(Circle),
    /// Moves the pen without drawing.
    MoveTo(Point),
    /// Draws a line from the pen to the point.
    LineTo(Point),
}

/// Records graphics commands for a `Graphics` node.
///
/// Handed to draw callbacks by
/// [`SceneGraph::draw`](super::SceneGraph::draw).
#[derive(Debug, Default)]
pub struct GraphicsContext {
    commands: Vec<GraphicsCommand>,
}

impl GraphicsContext {
    pub(crate) fn from_commands(commands: Vec<GraphicsCommand>) -> Self {
        Self { commands }
    }

    pub(crate) fn into_commands(self) -> Vec<GraphicsCommand> {
        self.commands
    }

    /// Returns the recorded commands.
    #[must_use]
    pub fn commands(&self) -> &[GraphicsCommand] {
        &self.commands
    }

    /// Discards all recorded commands.
    pub fn clear(&mut self) -> &mut Self {
        self.commands.clear();
        self
    }

    /// Starts a fill.
    pub fn begin_fill(&mut self, color: u32, alpha: f64) -> &mut Self {
        self.commands.push(GraphicsCommand::BeginFill { color, alpha });
        self
    }

    /// Ends the current fill.
    pub fn end_fill(&mut self) -> &mut Self {
        self.commands.push(GraphicsCommand::EndFill);
        self
    }

    /// Sets the line style.
    pub fn line_style(&mut self, width: f64, color: u32, alpha: f64) -> &mut Self {
        self.commands.push(GraphicsCommand::LineStyle {
            width,
            color,
            alpha,
        });
        self
    }

    /// Draws a rectangle.
    pub fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.commands
            .push(GraphicsCommand::Rect(Rect::new(x, y, x + width, y + height)));
        self
    }

    /// Draws a rounded rectangle.
    pub fn draw_rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
    ) -> &mut Self {
        self.commands.push(GraphicsCommand::RoundedRect(RoundedRect::new(
            x,
            y,
            x + width,
            y + height,
            radius,
        )));
        self
    }

    /// Draws a circle.
    pub fn draw_circle(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.commands
            .push(GraphicsCommand::Circle(Circle::new((x, y), radius)));
        self
    }

    /// Moves the pen.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(GraphicsCommand::MoveTo(Point::new(x, y)));
        self
    }

    /// Draws a line to the given point.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(GraphicsCommand::LineTo(Point::new(x, y)));
        self
    }
}

/// What a node draws.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Content {
    /// Nothing; a pure grouping node.
    #[default]
    Empty,
    /// A single texture.
    Texture(TextureId),
    /// A sequence of animation frames.
    Frames {
        /// Frame textures in playback order.
        frames: Vec<TextureId>,
        /// Index of the frame currently shown.
        current: usize,
        /// Whether playback advances the frame.
        playing: bool,
    },
    /// Styled text.
    Text(TextContent),
    /// Retained vector drawing commands.
    Graphics(Vec<GraphicsCommand>),
}
