mod engine;
mod error;
mod types;

pub use engine::{Engine, Session};
pub use error::{Error, ErrorCode, Result};
pub use types::{
    Ability, BuildInfo, EngineOptions, GemAbility, GrantedAbility, ItemEntry, ItemSet,
    PassiveTreeSpec, SkillGroup, UnknownOptionPolicy,
};
