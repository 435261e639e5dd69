use super::{DirectionStates, KeyBindings, Rgba, Vec2};

pub const DEFAULT_MOVE_SPEED: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub color: Rgba,
    pub position: Vec2,
    pub speed: f32,
    pub bindings: KeyBindings,
    /// Input accumulated this tick. Cleared by [`Entity::integrate`].
    direction: Vec2,
}

impl Entity {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        color: Rgba,
        position: Vec2,
        speed: f32,
        bindings: KeyBindings,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            position,
            speed,
            bindings,
            direction: Vec2::ZERO,
        }
    }

    /// Adds one unit axis vector per held direction.
    pub fn apply_input(&mut self, pressed: DirectionStates) {
        for direction in super::Direction::ALL {
            if pressed.is_down(direction) {
                self.direction += direction.unit();
            }
        }
    }

    /// Moves `speed * dt` along the accumulated direction and returns the delta.
    ///
    /// The direction is normalized first, so diagonals are no faster than
    /// axis moves. Opposing inputs cancel out. A non-positive or non-finite
    /// `dt` moves nothing. The accumulator is always reset.
    pub fn integrate(&mut self, dt: f32) -> Vec2 {
        let direction = std::mem::take(&mut self.direction);
        if !dt.is_finite() || dt <= 0.0 {
            return Vec2::ZERO;
        }
        let Some(unit) = direction.normalized() else {
            return Vec2::ZERO;
        };
        let delta = unit * (self.speed * dt);
        self.position += delta;
        delta
    }
}
