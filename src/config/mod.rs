//! Descriptor parsing, import resolution, and root settings.
pub mod descriptor;
pub mod imports;
pub mod settings;

pub use descriptor::{ModuleDescriptor, Rule};
pub use imports::{ResolvedRule, ResolvedRuleSet, resolve};
pub use settings::Settings;
