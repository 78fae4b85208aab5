use crate::state::EntityId;

/// Which part of an attack a swing belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwingKind {
    Primary,
    Offhand,
    Cleave,
    MultiHit,
    Riposte,
    /// Secondary unarmed attack, named by its catalogue entry.
    Aux(&'static str),
    /// Reactive damage from the defender: spines, headbutts, acid.
    Retaliation(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwingOutcome {
    Hit,
    Missed,
    Blocked,
    Declined,
    Cancelled,
    Vetoed,
    Absorbed,
}

/// One line of the combat ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwingRecord {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub kind: SwingKind,
    pub outcome: SwingOutcome,
    /// Hit points removed by the blow itself.
    pub damage: i32,
    /// Extra damage from brands and flavours.
    pub special: i32,
}

/// Totals handed back to the caller after an attack resolves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttackReport {
    pub swings: Vec<SwingRecord>,
    pub total_damage: i32,
    pub kills: Vec<EntityId>,
    /// Spectral-brand follow-ups the caller should summon.
    pub spectral_followups: u32,
}

impl AttackReport {
    pub fn record(&mut self, record: SwingRecord) {
        self.total_damage += record.damage + record.special;
        self.swings.push(record);
    }

    pub fn record_kill(&mut self, victim: EntityId) {
        if !self.kills.contains(&victim) {
            self.kills.push(victim);
        }
    }

    /// Damage dealt to one actor across every swing.
    pub fn damage_to(&self, defender: EntityId) -> i32 {
        self.swings
            .iter()
            .filter(|s| s.defender == defender)
            .map(|s| s.damage + s.special)
            .sum()
    }

    pub fn swings_of(&self, kind: SwingKind) -> impl Iterator<Item = &SwingRecord> {
        self.swings.iter().filter(move |s| s.kind == kind)
    }

    pub fn hits(&self) -> usize {
        self.swings
            .iter()
            .filter(|s| s.outcome == SwingOutcome::Hit)
            .count()
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: AttackReport) {
        for swing in other.swings {
            self.record(swing);
        }
        for victim in other.kills {
            self.record_kill(victim);
        }
        self.spectral_followups += other.spectral_followups;
    }
}
