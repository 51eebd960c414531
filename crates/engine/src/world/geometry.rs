/// Cardinal facing. Screen coordinates: y grows southward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    North,
    West,
    #[default]
    South,
    East,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::North, Facing::West, Facing::South, Facing::East];

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::West => Self::East,
            Self::South => Self::North,
            Self::East => Self::West,
        }
    }

    /// Unit step along this facing.
    pub fn step(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::West => (-1, 0),
            Self::South => (0, 1),
            Self::East => (1, 0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::West => "west",
            Self::South => "south",
            Self::East => "east",
        }
    }
}

/// Axis-aligned rectangle in world units, `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Overlap test with exclusive edges: touching rectangles do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

pub const PLAYER_BOUNDING_BOX_SIZE: i32 = 64;
pub const PLAYER_HIT_BOX_SIZE: i32 = 42;
pub const PLAYER_HIT_BOX_NARROW: i32 = 18;
pub const CREATURE_BOX_SIZE: i32 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    Player,
    Creature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyBoxes {
    pub bounding: Rect,
    pub hit: Rect,
}

/// Computes bounding and hit boxes for a body standing at `(x, y)`.
///
/// The player's boxes rotate with the movement axis: narrow and tall while facing
/// North/South, wide and short while facing East/West. The bounding box reaches
/// `PLAYER_BOUNDING_BOX_SIZE - PLAYER_HIT_BOX_SIZE` units ahead of the hit box when
/// facing North or West, and trails from the origin otherwise.
pub fn body_boxes(x: i32, y: i32, facing: Facing, shape: BodyShape) -> BodyBoxes {
    match shape {
        BodyShape::Creature => {
            let square = Rect::new(x, y, CREATURE_BOX_SIZE, CREATURE_BOX_SIZE);
            BodyBoxes {
                bounding: square,
                hit: square,
            }
        }
        BodyShape::Player => {
            let reach = PLAYER_BOUNDING_BOX_SIZE - PLAYER_HIT_BOX_SIZE;
            let (long, short) = (PLAYER_HIT_BOX_SIZE, PLAYER_HIT_BOX_NARROW);
            let hit = if facing.is_vertical() {
                Rect::new(x, y, short, long)
            } else {
                Rect::new(x, y, long, short)
            };
            let bounding = match facing {
                Facing::North => Rect::new(x, y - reach, short, PLAYER_BOUNDING_BOX_SIZE),
                Facing::South => Rect::new(x, y, short, PLAYER_BOUNDING_BOX_SIZE),
                Facing::West => Rect::new(x - reach, y, PLAYER_BOUNDING_BOX_SIZE, short),
                Facing::East => Rect::new(x, y, PLAYER_BOUNDING_BOX_SIZE, short),
            };
            BodyBoxes { bounding, hit }
        }
    }
}

/// Euclidean distance truncated toward zero.
pub fn distance(x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
    let dx = i64::from(x2) - i64::from(x1);
    let dy = i64::from(y2) - i64::from(y1);
    ((dx * dx + dy * dy) as f64).sqrt() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_truncates_toward_zero() {
        assert_eq!(distance(0, 0, 3, 4), 5);
        assert_eq!(distance(0, 0, 1, 1), 1);
        assert_eq!(distance(10, 10, 10, 10), 0);
        assert_eq!(distance(5, 0, 0, 0), 5);
    }

    #[test]
    fn opposite_facing_round_trips() {
        for facing in Facing::ALL {
            assert_ne!(facing.opposite(), facing);
            assert_eq!(facing.opposite().opposite(), facing);
        }
    }

    #[test]
    fn player_boxes_are_narrow_and_tall_on_vertical_axis() {
        for facing in [Facing::North, Facing::South] {
            let boxes = body_boxes(100, 200, facing, BodyShape::Player);
            assert_eq!(boxes.hit, Rect::new(100, 200, 18, 42));
            assert!(boxes.bounding.height > boxes.bounding.width);
        }
        let north = body_boxes(100, 200, Facing::North, BodyShape::Player);
        assert_eq!(north.bounding, Rect::new(100, 178, 18, 64));
    }

    #[test]
    fn player_boxes_are_wide_and_short_on_horizontal_axis() {
        for facing in [Facing::East, Facing::West] {
            let boxes = body_boxes(100, 200, facing, BodyShape::Player);
            assert_eq!(boxes.hit, Rect::new(100, 200, 42, 18));
            assert!(boxes.bounding.width > boxes.bounding.height);
        }
        let west = body_boxes(100, 200, Facing::West, BodyShape::Player);
        assert_eq!(west.bounding, Rect::new(78, 200, 64, 18));
    }

    #[test]
    fn creature_boxes_ignore_facing() {
        let north = body_boxes(0, 0, Facing::North, BodyShape::Creature);
        let east = body_boxes(0, 0, Facing::East, BodyShape::Creature);
        assert_eq!(north, east);
        assert_eq!(north.hit, Rect::new(0, 0, 42, 42));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
        assert!(a.intersects(&Rect::new(9, 9, 10, 10)));
    }
}
