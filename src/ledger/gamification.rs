use serde::{Deserialize, Serialize};

/// Experience needed to advance one level.
pub const XP_PER_LEVEL: u64 = 1000;

/// Cosmetic home shown for a level; display only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Dwelling {
    Tent,
    Cabin,
    House,
    Villa,
    Castle,
}

impl Dwelling {
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=2 => Dwelling::Tent,
            3..=5 => Dwelling::Cabin,
            6..=9 => Dwelling::House,
            10..=19 => Dwelling::Villa,
            _ => Dwelling::Castle,
        }
    }
}

/// Accumulated experience. Level and dwelling are always derived from `xp`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GamificationSnapshot", into = "GamificationSnapshot")]
pub struct GamificationState {
    xp: u64,
}

impl GamificationState {
    pub fn with_xp(xp: u64) -> Self {
        Self { xp }
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn level(&self) -> u32 {
        u32::try_from(self.xp / XP_PER_LEVEL)
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1)
    }

    pub fn dwelling(&self) -> Dwelling {
        Dwelling::for_level(self.level())
    }

    /// Adds experience; saturates instead of wrapping.
    pub fn award(self, points: u64) -> Self {
        Self {
            xp: self.xp.saturating_add(points),
        }
    }
}

/// Stored shape `{xp, level}`; the stored level is ignored on load.
#[derive(Serialize, Deserialize)]
struct GamificationSnapshot {
    xp: u64,
    #[serde(default)]
    level: u32,
}

impl From<GamificationSnapshot> for GamificationState {
    fn from(snapshot: GamificationSnapshot) -> Self {
        Self { xp: snapshot.xp }
    }
}

impl From<GamificationState> for GamificationSnapshot {
    fn from(state: GamificationState) -> Self {
        Self {
            xp: state.xp,
            level: state.level(),
        }
    }
}
