//! Alignment guides shown while dragging an element.
//!
//! Guides are advisory: they never move the dragged element. They are
//! recomputed from scratch on every drag tick, so the work is a single pass
//! over the other elements.

use crate::element::ElementId;
use kurbo::{Line, Point, Rect};
use serde::{Deserialize, Serialize};

/// Distance below which two values count as aligned (in workspace units).
pub const GUIDE_THRESHOLD: f64 = 10.0;
/// How far canvas-center guides extend past the canvas edges.
pub const CANVAS_GUIDE_OVERSHOOT: f64 = 50.0;
/// How far element guides extend past the two aligned boxes.
pub const ELEMENT_GUIDE_OVERSHOOT: f64 = 20.0;

/// Tunables for guide detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    pub threshold: f64,
    pub canvas_overshoot: f64,
    pub element_overshoot: f64,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            threshold: GUIDE_THRESHOLD,
            canvas_overshoot: CANVAS_GUIDE_OVERSHOOT,
            element_overshoot: ELEMENT_GUIDE_OVERSHOOT,
        }
    }
}

/// What a guide is aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuideKind {
    /// Dragged center x matches the canvas center.
    CanvasCenterX,
    /// Dragged center y matches the canvas center.
    CanvasCenterY,
    Left,
    Right,
    /// Horizontal centers match (drawn as a vertical line).
    CenterX,
    Top,
    Bottom,
    /// Vertical centers match (drawn as a horizontal line).
    CenterY,
}

impl GuideKind {
    /// Orientation of the line drawn for this kind.
    pub fn orientation(self) -> GuideOrientation {
        match self {
            GuideKind::CanvasCenterX | GuideKind::Left | GuideKind::Right | GuideKind::CenterX => {
                GuideOrientation::Vertical
            }
            GuideKind::CanvasCenterY | GuideKind::Top | GuideKind::Bottom | GuideKind::CenterY => {
                GuideOrientation::Horizontal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideOrientation {
    Vertical,
    Horizontal,
}

/// A transient guide line in workspace coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub kind: GuideKind,
    pub line: Line,
}

impl Guide {
    fn vertical(kind: GuideKind, x: f64, y0: f64, y1: f64) -> Self {
        Self {
            kind,
            line: Line::new(Point::new(x, y0), Point::new(x, y1)),
        }
    }

    fn horizontal(kind: GuideKind, y: f64, x0: f64, x1: f64) -> Self {
        Self {
            kind,
            line: Line::new(Point::new(x0, y), Point::new(x1, y)),
        }
    }

    pub fn orientation(&self) -> GuideOrientation {
        self.kind.orientation()
    }

    /// The x of a vertical guide or the y of a horizontal one.
    pub fn position(&self) -> f64 {
        match self.orientation() {
            GuideOrientation::Vertical => self.line.p0.x,
            GuideOrientation::Horizontal => self.line.p0.y,
        }
    }
}

fn near(a: f64, b: f64, threshold: f64) -> bool {
    (a - b).abs() < threshold
}

/// Compute guides for an element being dragged.
///
/// `dragged` is the provisional box of the element `dragged_id`; `others`
/// yields every element box (the dragged id is skipped); `canvas` is the
/// visible canvas in workspace coordinates.
pub fn compute_guides<I>(
    dragged_id: ElementId,
    dragged: Rect,
    others: I,
    canvas: Rect,
    config: &GuideConfig,
) -> Vec<Guide>
where
    I: IntoIterator<Item = (ElementId, Rect)>,
{
    let threshold = config.threshold;
    let mut guides = Vec::new();

    let canvas_center = canvas.center();
    let dragged_center = dragged.center();

    if near(dragged_center.x, canvas_center.x, threshold) {
        guides.push(Guide::vertical(
            GuideKind::CanvasCenterX,
            canvas_center.x,
            canvas.y0 - config.canvas_overshoot,
            canvas.y1 + config.canvas_overshoot,
        ));
    }
    if near(dragged_center.y, canvas_center.y, threshold) {
        guides.push(Guide::horizontal(
            GuideKind::CanvasCenterY,
            canvas_center.y,
            canvas.x0 - config.canvas_overshoot,
            canvas.x1 + config.canvas_overshoot,
        ));
    }

    for (id, other) in others {
        if id == dragged_id {
            continue;
        }
        let other_center = other.center();

        // Perpendicular spans shared by every guide against this element.
        let y_span = (
            dragged.y0.min(other.y0) - config.element_overshoot,
            dragged.y1.max(other.y1) + config.element_overshoot,
        );
        let x_span = (
            dragged.x0.min(other.x0) - config.element_overshoot,
            dragged.x1.max(other.x1) + config.element_overshoot,
        );

        let vertical = [
            (GuideKind::Left, dragged.x0, other.x0),
            (GuideKind::Right, dragged.x1, other.x1),
            (GuideKind::CenterX, dragged_center.x, other_center.x),
        ];
        for (kind, value, target) in vertical {
            if near(value, target, threshold) {
                guides.push(Guide::vertical(kind, target, y_span.0, y_span.1));
            }
        }

        let horizontal = [
            (GuideKind::Top, dragged.y0, other.y0),
            (GuideKind::Bottom, dragged.y1, other.y1),
            (GuideKind::CenterY, dragged_center.y, other_center.y),
        ];
        for (kind, value, target) in horizontal {
            if near(value, target, threshold) {
                guides.push(Guide::horizontal(kind, target, x_span.0, x_span.1));
            }
        }
    }

    log::debug!("{} alignment guides", guides.len());
    guides
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn canvas() -> Rect {
        Rect::from_origin_size((2000.0, 2000.0), (576.0, 720.0))
    }

    fn kinds(guides: &[Guide]) -> Vec<GuideKind> {
        guides.iter().map(|g| g.kind).collect()
    }

    #[test]
    fn test_no_guides_when_far_away() {
        let dragged = Rect::from_origin_size((2010.0, 2010.0), (50.0, 50.0));
        let other = Rect::from_origin_size((2300.0, 2400.0), (80.0, 80.0));
        let guides = compute_guides(
            Uuid::new_v4(),
            dragged,
            [(Uuid::new_v4(), other)],
            canvas(),
            &GuideConfig::default(),
        );
        assert!(guides.is_empty());
    }

    #[test]
    fn test_canvas_center_guide_threshold_is_strict() {
        let config = GuideConfig::default();
        // canvas center x = 2288
        let just_inside = Rect::from_origin_size((2288.0 - 50.0 + 9.9, 2010.0), (100.0, 50.0));
        let exactly = Rect::from_origin_size((2288.0 - 50.0 + 10.0, 2010.0), (100.0, 50.0));

        let guides = compute_guides(Uuid::new_v4(), just_inside, [], canvas(), &config);
        assert_eq!(kinds(&guides), vec![GuideKind::CanvasCenterX]);

        let guides = compute_guides(Uuid::new_v4(), exactly, [], canvas(), &config);
        assert!(guides.is_empty());
    }

    #[test]
    fn test_canvas_center_guide_geometry() {
        let dragged = Rect::from_origin_size((2238.0, 2310.0), (100.0, 100.0));
        let guides = compute_guides(
            Uuid::new_v4(),
            dragged,
            [],
            canvas(),
            &GuideConfig::default(),
        );
        assert_eq!(
            kinds(&guides),
            vec![GuideKind::CanvasCenterX, GuideKind::CanvasCenterY]
        );

        let vertical = guides[0].line;
        assert!((vertical.p0.x - 2288.0).abs() < f64::EPSILON);
        assert!((vertical.p0.y - 1950.0).abs() < f64::EPSILON);
        assert!((vertical.p1.y - 2770.0).abs() < f64::EPSILON);

        let horizontal = guides[1].line;
        assert!((horizontal.p0.y - 2360.0).abs() < f64::EPSILON);
        assert!((horizontal.p0.x - 1950.0).abs() < f64::EPSILON);
        assert!((horizontal.p1.x - 2626.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_top_edge_guide_between_rectangles() {
        let first = Rect::from_origin_size((100.0, 100.0), (100.0, 80.0));
        let dragged = Rect::from_origin_size((100.0, 104.0), (100.0, 80.0));
        let guides = compute_guides(
            Uuid::new_v4(),
            dragged,
            [(Uuid::new_v4(), first)],
            canvas(),
            &GuideConfig::default(),
        );

        let top = guides
            .iter()
            .find(|g| g.kind == GuideKind::Top)
            .expect("top guide");
        assert!((top.position() - 100.0).abs() < f64::EPSILON);
        assert_eq!(top.orientation(), GuideOrientation::Horizontal);
        assert!((top.line.p0.x - 80.0).abs() < f64::EPSILON);
        assert!((top.line.p1.x - 220.0).abs() < f64::EPSILON);

        // Same x and width: every check fires.
        assert_eq!(guides.len(), 6);
    }

    #[test]
    fn test_guides_sit_at_other_elements_value() {
        let other = Rect::from_origin_size((300.0, 300.0), (100.0, 100.0));
        let dragged = Rect::from_origin_size((305.0, 600.0), (50.0, 50.0));
        let guides = compute_guides(
            Uuid::new_v4(),
            dragged,
            [(Uuid::new_v4(), other)],
            canvas(),
            &GuideConfig::default(),
        );
        assert_eq!(kinds(&guides), vec![GuideKind::Left]);
        let left = guides[0].line;
        assert!((left.p0.x - 300.0).abs() < f64::EPSILON);
        assert!((left.p0.y - 280.0).abs() < f64::EPSILON);
        assert!((left.p1.y - 670.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dragged_element_is_skipped() {
        let id = Uuid::new_v4();
        let dragged = Rect::from_origin_size((100.0, 100.0), (50.0, 50.0));
        let guides = compute_guides(
            id,
            dragged,
            [(id, dragged)],
            canvas(),
            &GuideConfig::default(),
        );
        assert!(guides.is_empty());
    }

    #[test]
    fn test_guides_are_symmetric() {
        let a = Rect::from_origin_size((100.0, 100.0), (60.0, 40.0));
        let b = Rect::from_origin_size((107.0, 400.0), (90.0, 30.0));
        let (id_a, id_b) = (Uuid::new_v4(), Uuid::new_v4());
        let config = GuideConfig::default();

        let a_to_b = compute_guides(id_a, a, [(id_b, b)], canvas(), &config);
        let b_to_a = compute_guides(id_b, b, [(id_a, a)], canvas(), &config);
        assert_eq!(kinds(&a_to_b), kinds(&b_to_a));
        assert!(kinds(&a_to_b).contains(&GuideKind::Left));
    }

    #[test]
    fn test_checks_against_several_elements() {
        let dragged = Rect::from_origin_size((100.0, 100.0), (50.0, 50.0));
        let others = [
            (Uuid::new_v4(), Rect::from_origin_size((102.0, 500.0), (10.0, 10.0))),
            (Uuid::new_v4(), Rect::from_origin_size((800.0, 95.0), (10.0, 10.0))),
        ];
        let guides = compute_guides(
            Uuid::new_v4(),
            dragged,
            others,
            canvas(),
            &GuideConfig::default(),
        );
        assert_eq!(kinds(&guides), vec![GuideKind::Left, GuideKind::Top]);
    }

    #[test]
    fn test_canvas_center_y_threshold_is_strict() {
        let config = GuideConfig::default();
        // canvas center y = 2360, dragged center x stays far from 2288
        let just_inside = Rect::from_origin_size((2010.0, 2360.0 - 25.0 + 9.5), (50.0, 50.0));
        let exactly = Rect::from_origin_size((2010.0, 2360.0 - 25.0 + 10.0), (50.0, 50.0));

        let guides = compute_guides(Uuid::new_v4(), just_inside, [], canvas(), &config);
        assert_eq!(kinds(&guides), vec![GuideKind::CanvasCenterY]);

        let guides = compute_guides(Uuid::new_v4(), exactly, [], canvas(), &config);
        assert!(guides.is_empty());
    }

    #[test]
    fn test_element_edge_threshold_is_strict() {
        let other = Rect::from_origin_size((300.0, 300.0), (100.0, 100.0));
        let config = GuideConfig::default();
        let guides_for = |dragged: Rect| kinds(&compute_guides(Uuid::new_v4(), dragged, [(Uuid::new_v4(), other)], canvas(), &config));

        // Top edges 9.5 apart, then exactly 10 apart.
        assert_eq!(guides_for(Rect::from_origin_size((700.0, 309.5), (50.0, 50.0))), vec![GuideKind::Top]);
        assert!(guides_for(Rect::from_origin_size((700.0, 310.0), (50.0, 50.0))).is_empty());

        // Right edges exactly 10 apart.
        assert!(guides_for(Rect::from_origin_size((360.0, 800.0), (50.0, 50.0))).is_empty());
    }
}
