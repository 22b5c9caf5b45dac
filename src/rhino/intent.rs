//! Structured description of an object the agent wants created.
//!
//! An [`Intent`] is independent of how it reaches Rhino: the dispatcher
//! turns it into a `create_object` payload, and the script generator turns
//! the same value into RhinoScript when that fails.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};
use thiserror::Error;

/// Minimum number of points a leader polyline needs.
pub const MIN_LEADER_POINTS: usize = 2;

/// Text height used when the caller does not give one.
pub const DEFAULT_TEXT_HEIGHT: f64 = 1.0;

/// Returns [`DEFAULT_TEXT_HEIGHT`] as a JSON number (renders as `1.0`).
#[must_use]
pub fn default_text_height() -> Number {
    Number::from_f64(DEFAULT_TEXT_HEIGHT).unwrap_or_else(|| Number::from(1))
}

/// Annotation object types understood by the Rhino plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    /// Planar text entity.
    Text,
    /// Screen-aligned text dot.
    TextDot,
    /// Leader polyline with an optional label.
    Leader,
}

impl ObjectKind {
    /// Wire tag sent as the `type` of a `create_object` command.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::TextDot => "TEXT_DOT",
            Self::Leader => "LEADER",
        }
    }

    /// Lower-case name used in error sentences.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextDot => "text dot",
            Self::Leader => "leader",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A point in model space, `[x, y, z]`.
///
/// Components are kept as JSON numbers so they reach Rhino exactly as the
/// caller wrote them: `0` stays `0`, `-2.0` stays `-2.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coordinate(pub [Number; 3]);

impl Coordinate {
    /// Returns the x, y and z components.
    #[must_use]
    pub const fn components(&self) -> &[Number; 3] {
        &self.0
    }
}

/// An object colour as supplied by the caller.
///
/// Nothing is validated here. Out-of-range or fractional components are
/// passed to Rhino untouched on the primary path and truncated by
/// [`Color::rgb`] on the script path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(Vec<Number>);

impl Color {
    /// Wraps a list of colour components.
    #[must_use]
    pub const fn new(components: Vec<Number>) -> Self {
        Self(components)
    }

    /// Returns `true` if no components were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the colour as an integer triple, or `None` unless there are
    /// exactly three components.
    ///
    /// Fractional components are truncated toward zero.
    #[must_use]
    pub fn rgb(&self) -> Option<[i64; 3]> {
        let [r, g, b] = self.0.as_slice() else {
            return None;
        };
        Some([truncate(r), truncate(g), truncate(b)])
    }
}

#[allow(clippy::cast_possible_truncation)] // truncation is the documented behaviour
fn truncate(n: &Number) -> i64 {
    n.as_i64()
        .unwrap_or_else(|| n.as_f64().map_or(0, |f| f.trunc() as i64))
}

/// Kind-specific parameters of an intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// `TEXT` at a location.
    Text {
        /// Text content.
        text: Option<String>,
        /// Insertion point.
        location: Coordinate,
        /// Text height in model units.
        height: Number,
    },
    /// `TEXT_DOT` at a location.
    TextDot {
        /// Text content.
        text: Option<String>,
        /// Dot position.
        location: Coordinate,
    },
    /// `LEADER` through at least [`MIN_LEADER_POINTS`] points.
    Leader {
        /// Polyline vertices.
        points: Vec<Coordinate>,
        /// Optional label.
        text: Option<String>,
    },
}

/// Errors raised while building an intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// A leader was given too few points.
    #[error("a leader needs at least {MIN_LEADER_POINTS} points, got {0}")]
    TooFewLeaderPoints(usize),
}

/// A request to create one annotation object.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    shape: Shape,
    name: Option<String>,
    color: Option<Color>,
}

impl Intent {
    /// A `TEXT` object.
    #[must_use]
    pub const fn text(text: Option<String>, location: Coordinate, height: Number) -> Self {
        Self::from_shape(Shape::Text {
            text,
            location,
            height,
        })
    }

    /// A `TEXT_DOT` object.
    #[must_use]
    pub const fn text_dot(text: Option<String>, location: Coordinate) -> Self {
        Self::from_shape(Shape::TextDot { text, location })
    }

    /// A `LEADER` object.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::TooFewLeaderPoints`] if `points` has fewer
    /// than [`MIN_LEADER_POINTS`] entries.
    pub fn leader(points: Vec<Coordinate>, text: Option<String>) -> Result<Self, IntentError> {
        if points.len() < MIN_LEADER_POINTS {
            return Err(IntentError::TooFewLeaderPoints(points.len()));
        }
        Ok(Self::from_shape(Shape::Leader { points, text }))
    }

    const fn from_shape(shape: Shape) -> Self {
        Self {
            shape,
            name: None,
            color: None,
        }
    }

    /// Sets the object name. An empty name counts as no name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|n| !n.is_empty());
        self
    }

    /// Sets the object colour. An empty list counts as no colour.
    #[must_use]
    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color.filter(|c| !c.is_empty());
        self
    }

    /// The object type.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self.shape {
            Shape::Text { .. } => ObjectKind::Text,
            Shape::TextDot { .. } => ObjectKind::TextDot,
            Shape::Leader { .. } => ObjectKind::Leader,
        }
    }

    /// The kind-specific parameters.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The requested object name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The requested colour, if any.
    #[must_use]
    pub const fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    /// Builds the `create_object` payload: `{type, params, name?, color?}`.
    #[must_use]
    pub fn command_params(&self) -> Value {
        let params = match &self.shape {
            Shape::Text {
                text,
                location,
                height,
            } => json!({ "text": text, "location": location, "height": height }),
            Shape::TextDot { text, location } => json!({ "text": text, "location": location }),
            Shape::Leader { points, text } => {
                json!({ "points": points, "text": text.as_deref().unwrap_or("") })
            }
        };

        let mut command = Map::new();
        command.insert("type".to_string(), json!(self.kind()));
        command.insert("params".to_string(), params);
        if let Some(name) = &self.name {
            command.insert("name".to_string(), json!(name));
        }
        if let Some(color) = &self.color {
            command.insert("color".to_string(), json!(color));
        }
        Value::Object(command)
    }
}
