use crate::config::NoisePolicy;
use crate::env::{Dice, MapOracle, SightPolicy};
use crate::state::Position;

/// Where a listener believes a noise came from.
///
/// A listener with a clear line to the source, or standing on it, knows
/// exactly. Otherwise the guess drifts toward the listener in proportion to
/// how far the sound detoured around obstacles, and is then jittered by up to
/// the detour length on each axis.
pub fn perceived_position<M>(
    map: &M,
    policy: &NoisePolicy,
    dice: &mut Dice<'_>,
    source: Position,
    listener: Position,
    travel: u32,
) -> Position
where
    M: MapOracle + ?Sized,
{
    if travel == 0 || map.line_of_sight(listener, source, SightPolicy::SolidBlocks) {
        return source;
    }

    let extra = travel.saturating_sub(source.distance(listener));
    let source_weight = policy.source_weight;
    let listener_weight = if extra >= policy.fuzz_threshold {
        extra as i32 * policy.listener_weight_per_step
    } else {
        0
    };
    let total = source_weight + listener_weight;
    if total <= 0 {
        return source;
    }

    let extra = extra as i32;
    let x = (source.x * source_weight + listener.x * listener_weight) / total
        + dice.random_range(-extra, extra);
    let y = (source.y * source_weight + listener.y * listener_weight) / total
        + dice.random_range(-extra, extra);
    map.dimensions().clamp(Position::new(x, y))
}
