use super::EntityId;

/// Kind of cloud lingering on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CloudKind {
    Miasma,
}

/// A cloud on one cell; dissipates when `duration` reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cloud {
    pub kind: CloudKind,
    pub duration: u16,
    pub source: Option<EntityId>,
}
