//! RhinoScript generation for the fallback path.
//!
//! When the plugin cannot handle a `create_object` command, the same
//! [`Intent`] is rendered as a short IronPython 2.7 script using
//! `rhinoscriptsyntax` and sent for execution instead.
//!
//! Every user-controlled string goes through [`quoted`], which is the only
//! place string literals are produced. Numbers are written in their
//! canonical JSON form so `1.5`, `-2.0` and `0` survive unchanged.

use serde_json::Number;

use crate::rhino::intent::{Color, Coordinate, Intent, Shape};

/// First line of every generated script.
pub const PREAMBLE: &str = "import rhinoscriptsyntax as rs";

/// Variable holding the id of the object the script creates.
const OBJECT_ID: &str = "_id";

/// Escapes a string for use inside a double-quoted Python literal.
///
/// Backslashes are doubled first, then double quotes are escaped. Doing it
/// the other way round would double the backslash added in front of each
/// quote.
#[must_use]
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders a double-quoted, escaped string literal.
#[must_use]
pub fn quoted(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

/// Renders a coordinate as `[x,y,z]`.
#[must_use]
pub fn coordinate(point: &Coordinate) -> String {
    format!("[{}]", join(point.components()))
}

/// Renders a point list as `[[x,y,z],[x,y,z]]`.
#[must_use]
pub fn point_list(points: &[Coordinate]) -> String {
    let rendered: Vec<String> = points.iter().map(coordinate).collect();
    format!("[{}]", rendered.join(","))
}

/// Renders a colour as `(r,g,b)`, or `None` unless it has three components.
#[must_use]
pub fn color_tuple(color: &Color) -> Option<String> {
    color.rgb().map(|[r, g, b]| format!("({r},{g},{b})"))
}

fn join(numbers: &[Number]) -> String {
    let rendered: Vec<String> = numbers.iter().map(Number::to_string).collect();
    rendered.join(",")
}

/// Accumulates script statements, one per line.
#[derive(Debug)]
pub struct ScriptBuilder {
    source: String,
}

impl ScriptBuilder {
    /// Starts a script with the `rhinoscriptsyntax` import.
    #[must_use]
    pub fn new() -> Self {
        let mut builder = Self {
            source: String::new(),
        };
        builder.statement(PREAMBLE);
        builder
    }

    /// Appends one statement followed by a newline.
    pub fn statement(&mut self, statement: impl AsRef<str>) -> &mut Self {
        self.source.push_str(statement.as_ref());
        self.source.push('\n');
        self
    }

    /// Appends `rs.ObjectName(_id, "<name>")`.
    pub fn object_name(&mut self, name: &str) -> &mut Self {
        self.statement(format!("rs.ObjectName({OBJECT_ID}, {})", quoted(name)))
    }

    /// Appends `rs.ObjectColor(_id, (r,g,b))`.
    pub fn object_color(&mut self, rgb: &str) -> &mut Self {
        self.statement(format!("rs.ObjectColor({OBJECT_ID}, {rgb})"))
    }

    /// Returns the finished source.
    #[must_use]
    pub fn finish(self) -> String {
        self.source
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders `intent` as a RhinoScript program.
///
/// Pure and deterministic: the same intent always yields the same bytes.
#[must_use]
pub fn render(intent: &Intent) -> String {
    let mut script = ScriptBuilder::new();

    match intent.shape() {
        Shape::Text {
            text,
            location,
            height,
        } => {
            script.statement(format!(
                "{OBJECT_ID} = rs.AddText({},{}, height={height})",
                quoted(text.as_deref().unwrap_or_default()),
                coordinate(location),
            ));
        }
        Shape::TextDot { text, location } => {
            script.statement(format!(
                "{OBJECT_ID} = rs.AddTextDot({},{})",
                quoted(text.as_deref().unwrap_or_default()),
                coordinate(location),
            ));
        }
        Shape::Leader { points, text } => {
            script.statement(format!("pts = {}", point_list(points)));
            script.statement(format!(
                "{OBJECT_ID} = rs.AddLeader(pts, None, {})",
                quoted(text.as_deref().unwrap_or_default())
            ));
        }
    }

    if let Some(name) = intent.name() {
        script.object_name(name);
    }
    if let Some(rgb) = intent.color().and_then(color_tuple) {
        script.object_color(&rgb);
    }

    script.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn coord(value: Value) -> Coordinate {
        serde_json::from_value(value).unwrap()
    }

    fn color(value: Value) -> Color {
        serde_json::from_value(value).unwrap()
    }

    /// Reverses [`escape`] the way Python reads a double-quoted literal.
    fn unescape(literal: &str) -> String {
        let mut out = String::new();
        let mut chars = literal.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                out.extend(chars.next());
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn escape_backslash_before_quote() {
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape(r"C:\temp"), r"C:\\temp");
        assert_eq!(escape(r#"\""#), r#"\\\""#);
    }

    #[test]
    fn escaped_literal_reparses_to_original() {
        for original in [r#"a "quoted" \ path"#, r#"\\"\"#, "plain", ""] {
            assert_eq!(unescape(&escape(original)), original);
        }
    }

    #[test]
    fn coordinate_keeps_number_forms() {
        assert_eq!(coordinate(&coord(json!([1.5, -2.0, 0]))), "[1.5,-2.0,0]");
    }

    #[test]
    fn point_list_has_no_trailing_separator() {
        let points = vec![coord(json!([0, 0, 0])), coord(json!([5, 0, 0]))];
        assert_eq!(point_list(&points), "[[0,0,0],[5,0,0]]");
    }

    #[test]
    fn color_tuple_requires_three_components() {
        assert_eq!(
            color_tuple(&color(json!([255, 0, 128]))).as_deref(),
            Some("(255,0,128)")
        );
        assert_eq!(color_tuple(&color(json!([255, 0]))), None);
    }

    #[test]
    fn render_text_with_name_and_color() {
        let intent = Intent::text(
            Some("Hello Rhino".to_string()),
            coord(json!([0, 0, 0])),
            Number::from_f64(1.5).unwrap(),
        )
        .with_name(Some("Text-One".to_string()))
        .with_color(Some(color(json!([255, 0, 0]))));

        assert_eq!(
            render(&intent),
            "import rhinoscriptsyntax as rs\n\
             _id = rs.AddText(\"Hello Rhino\",[0,0,0], height=1.5)\n\
             rs.ObjectName(_id, \"Text-One\")\n\
             rs.ObjectColor(_id, (255,0,0))\n"
        );
    }

    #[test]
    fn render_text_dot_without_optionals() {
        let intent = Intent::text_dot(Some("P1".to_string()), coord(json!([1, 1, 0])));

        assert_eq!(
            render(&intent),
            "import rhinoscriptsyntax as rs\n_id = rs.AddTextDot(\"P1\",[1,1,0])\n"
        );
    }

    #[test]
    fn render_leader() {
        let intent = Intent::leader(
            vec![coord(json!([0, 0, 0])), coord(json!([5, 0, 0]))],
            Some("Edge A".to_string()),
        )
        .unwrap()
        .with_name(Some("Leader A".to_string()));

        assert_eq!(
            render(&intent),
            "import rhinoscriptsyntax as rs\n\
             pts = [[0,0,0],[5,0,0]]\n\
             _id = rs.AddLeader(pts, None, \"Edge A\")\n\
             rs.ObjectName(_id, \"Leader A\")\n"
        );
    }

    #[test]
    fn missing_text_renders_empty_literal() {
        let intent = Intent::text(None, coord(json!([0, 0, 0])), Number::from(2));
        let script = render(&intent);
        assert!(script.contains("rs.AddText(\"\",[0,0,0], height=2)"));
        assert!(!script.contains("None"));
    }

    #[test]
    fn bad_color_emits_no_color_statement() {
        let intent = Intent::text_dot(Some("P".to_string()), coord(json!([0, 0, 0])))
            .with_color(Some(color(json!([1, 2, 3, 4]))));
        assert!(!render(&intent).contains("ObjectColor"));
    }

    #[test]
    fn name_is_escaped() {
        let intent = Intent::text_dot(Some(r#"a"b\c"#.to_string()), coord(json!([0, 0, 0])))
            .with_name(Some(r#"n"\"#.to_string()));
        let script = render(&intent);
        assert!(script.contains(r#"rs.AddTextDot("a\"b\\c",[0,0,0])"#));
        assert!(script.contains(r#"rs.ObjectName(_id, "n\"\\")"#));
    }

    #[test]
    fn rendering_is_deterministic() {
        let intent = Intent::leader(
            vec![coord(json!([0.25, 1, -3])), coord(json!([2, 2, 2]))],
            Some("x".to_string()),
        )
        .unwrap()
        .with_color(Some(color(json!([10, 20, 30]))));
        assert_eq!(render(&intent), render(&intent));
    }
}
