//! Configuration: TOML settings and the column rendering registry.

mod patterns;
mod settings;

pub use patterns::{ColumnPatterns, ColumnRender, MatchKind, PatternRule, RenderKind};
pub use settings::{
    expand_env_vars, ApiSettings, QuerySettings, Settings, SettingsError, ViewSettings,
};
