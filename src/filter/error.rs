//! Preset editing errors.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresetError {
    #[error("preset name must not be blank")]
    BlankName,
    #[error("search term must not be blank")]
    BlankTerm,
    #[error("player name must not be blank")]
    BlankPlayerName,
    #[error("unknown duty: {0}")]
    UnknownDuty(u32),
    #[error("unknown world: {0}")]
    UnknownWorld(u32),
}
