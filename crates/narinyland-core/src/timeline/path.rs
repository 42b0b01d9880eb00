//! Path primitives for the timeline connector line.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single drawing command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum PathCommand {
    MoveTo { to: Point },
    LineTo { to: Point },
    CubicTo { c1: Point, c2: Point, to: Point },
}

/// Render commands as an SVG path `d` attribute.
pub fn to_svg_path(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for (i, command) in commands.iter().enumerate() {
        if i > 0 {
            d.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = match command {
            PathCommand::MoveTo { to } => write!(d, "M {:.1} {:.1}", to.x, to.y),
            PathCommand::LineTo { to } => write!(d, "L {:.1} {:.1}", to.x, to.y),
            PathCommand::CubicTo { c1, c2, to } => write!(
                d,
                "C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
                c1.x, c1.y, c2.x, c2.y, to.x, to.y
            ),
        };
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_rendering() {
        let commands = vec![
            PathCommand::MoveTo { to: Point::new(0.0, 0.0) },
            PathCommand::LineTo { to: Point::new(10.26, 5.0) },
            PathCommand::CubicTo {
                c1: Point::new(1.0, 2.0),
                c2: Point::new(3.0, 4.0),
                to: Point::new(5.0, 6.0),
            },
        ];
        assert_eq!(
            to_svg_path(&commands),
            "M 0.0 0.0 L 10.3 5.0 C 1.0 2.0, 3.0 4.0, 5.0 6.0"
        );
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(to_svg_path(&[]), "");
    }
}
