use glam::Vec2;

use crate::ecs::components::{Position, Sparkle};

/// The sparkle visual hides itself after this long.
pub const VISIBLE_SECS: f64 = 0.6;
/// The controller drops the sparkle entry after this long.
pub const REMOVE_SECS: f64 = 1.0;

/// Render-side copy of a visible sparkle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparkleView {
    pub id: u64,
    pub pos: Vec2,
    /// Seconds since creation, in `[0, VISIBLE_SECS)`.
    pub age: f32,
}

/// Hands out time-based sparkle ids that never repeat.
#[derive(Debug, Default)]
pub struct SparkleIds {
    last: Option<u64>,
}

impl SparkleIds {
    /// Milliseconds of `now`, bumped past the previous id on collision.
    pub fn next(&mut self, now: f64) -> u64 {
        let ms = (now * 1000.0).max(0.0) as u64;
        let id = match self.last {
            Some(last) if ms <= last => last + 1,
            _ => ms,
        };
        self.last = Some(id);
        id
    }
}

pub fn spawn(world: &mut hecs::World, ids: &mut SparkleIds, pos: Vec2, now: f64) -> u64 {
    let id = ids.next(now);
    world.spawn((
        Position(pos),
        Sparkle {
            id,
            born: now,
            visible: true,
        },
    ));
    id
}

/// Age sparkles: hide at `VISIBLE_SECS`, despawn at `REMOVE_SECS`.
/// `dead` is a reusable scratch buffer.
pub fn update(world: &mut hecs::World, now: f64, dead: &mut Vec<hecs::Entity>) {
    dead.clear();
    for (entity, sparkle) in world.query_mut::<&mut Sparkle>() {
        let age = now - sparkle.born;
        if age >= VISIBLE_SECS {
            sparkle.visible = false;
        }
        if age >= REMOVE_SECS {
            dead.push(entity);
        }
    }
    for &entity in dead.iter() {
        let _ = world.despawn(entity);
    }
}

/// Visible sparkles, oldest first.
pub fn collect_visible(world: &hecs::World, now: f64, out: &mut Vec<SparkleView>) {
    out.clear();
    for (_, (pos, sparkle)) in world.query::<(&Position, &Sparkle)>().iter() {
        if sparkle.visible {
            out.push(SparkleView {
                id: sparkle.id,
                pos: pos.0,
                age: (now - sparkle.born).max(0.0) as f32,
            });
        }
    }
    out.sort_unstable_by_key(|s| s.id);
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut ids = SparkleIds::default();
        let a = ids.next(1.2345);
        let b = ids.next(1.2345);
        let c = ids.next(1.2349);
        let d = ids.next(5.0);
        assert_eq!(a, 1234);
        assert_eq!(b, 1235);
        assert_eq!(c, 1236);
        assert_eq!(d, 5000);
    }

    #[test]
    fn visible_for_600ms_then_hidden_then_removed() {
        let mut world = hecs::World::new();
        let mut ids = SparkleIds::default();
        let mut dead = Vec::new();
        let mut out = Vec::new();

        let born = 2.0;
        spawn(&mut world, &mut ids, Vec2::new(30.0, 40.0), born);

        let mut now = born;
        while now < born + 0.59 {
            update(&mut world, now, &mut dead);
            collect_visible(&world, now, &mut out);
            assert_eq!(out.len(), 1, "visible at +{:.3}", now - born);
            assert_eq!(out[0].pos, Vec2::new(30.0, 40.0));
            now += DT;
        }

        update(&mut world, born + 0.6, &mut dead);
        collect_visible(&world, born + 0.6, &mut out);
        assert!(out.is_empty());
        assert_eq!(world.len(), 1, "entry outlives the visual");

        update(&mut world, born + 1.0, &mut dead);
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn sparkles_expire_independently() {
        let mut world = hecs::World::new();
        let mut ids = SparkleIds::default();
        let mut dead = Vec::new();
        let mut out = Vec::new();

        spawn(&mut world, &mut ids, Vec2::ZERO, 0.0);
        spawn(&mut world, &mut ids, Vec2::ONE, 0.5);

        update(&mut world, 0.7, &mut dead);
        collect_visible(&world, 0.7, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].pos, Vec2::ONE);
        assert!((out[0].age - 0.2).abs() < 1e-4);

        update(&mut world, 1.05, &mut dead);
        assert_eq!(world.len(), 1);
        update(&mut world, 1.5, &mut dead);
        assert_eq!(world.len(), 0);
    }
}
