use rand::Rng;

use super::config::ConfigError;
use super::{Entity, EntityId, KeyBindings, KeyQuery, Rgba, ScreenRect, Surface, Vec2};

#[derive(Debug, Clone)]
pub struct SpawnDesc {
    pub name: String,
    pub color: Rgba,
    pub speed: f32,
    pub bindings: KeyBindings,
}

/// Shared world state: the world surface plus every entity, in spawn order.
///
/// Entities are never clamped to the world bounds; cameras crop whatever ends
/// up outside.
#[derive(Debug)]
pub struct Scene {
    world: Surface,
    background: Surface,
    entity_size_px: u32,
    entities: Vec<Entity>,
    next_id: u64,
}

impl Scene {
    pub fn new(
        width: u32,
        height: u32,
        background: Surface,
        entity_size_px: u32,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidWorldSize { width, height });
        }
        if background.size() != (width, height) {
            return Err(ConfigError::BackgroundSizeMismatch {
                actual_width: background.width(),
                actual_height: background.height(),
                world_width: width,
                world_height: height,
            });
        }
        if entity_size_px == 0 {
            return Err(ConfigError::InvalidEntitySize);
        }
        Ok(Self {
            world: background.clone(),
            background,
            entity_size_px,
            entities: Vec::new(),
            next_id: 0,
        })
    }

    pub fn spawn(&mut self, desc: SpawnDesc, position: Vec2) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entities.push(Entity::new(
            id,
            desc.name,
            desc.color,
            position,
            desc.speed,
            desc.bindings,
        ));
        id
    }

    pub fn spawn_random(
        &mut self,
        desc: SpawnDesc,
        margin_px: u32,
        rng: &mut impl Rng,
    ) -> EntityId {
        let position = random_spawn_position(self.size(), margin_px, rng);
        self.spawn(desc, position)
    }

    /// Advances every entity by `dt` using this frame's input, then repaints the world.
    pub fn tick(&mut self, dt: f32, input: &impl KeyQuery) {
        for entity in &mut self.entities {
            let pressed = entity.bindings.resolve(input);
            entity.apply_input(pressed);
            entity.integrate(dt);
        }
        self.repaint();
    }

    pub(crate) fn repaint(&mut self) {
        let copied = self.world.copy_from(&self.background);
        debug_assert!(copied, "world and background sizes are fixed at construction");
        for entity in &self.entities {
            let (x, y) = entity.position.to_pixel();
            self.world.fill_rect(
                ScreenRect::new(x, y, self.entity_size_px, self.entity_size_px),
                entity.color,
            );
        }
    }

    pub fn world(&self) -> &Surface {
        &self.world
    }

    pub fn size(&self) -> (u32, u32) {
        self.world.size()
    }

    pub fn entity_size_px(&self) -> u32 {
        self.entity_size_px
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }
}

/// Integer position at least `margin_px` from each edge, shrinking the margin
/// for worlds too small to honor it.
pub fn random_spawn_position(world_size: (u32, u32), margin_px: u32, rng: &mut impl Rng) -> Vec2 {
    let (width, height) = world_size;
    Vec2::new(
        random_coordinate(width, margin_px, rng) as f32,
        random_coordinate(height, margin_px, rng) as f32,
    )
}

fn random_coordinate(extent: u32, margin_px: u32, rng: &mut impl Rng) -> u32 {
    let low = margin_px.min(extent / 2);
    let high = extent.saturating_sub(margin_px).max(low);
    rng.gen_range(low..=high)
}
