use std::collections::HashSet;

use tracing::{debug, info};

use crate::assemble::assemble;
use crate::loader::render_loader;
use crate::types::{Artifact, ArtifactSet, ModelError, Position, Unit};

/// Output settings shared by every unit of a compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    mod_prefix: String,
    atlas: String,
    atlas_columns: u32,
    emit_loader: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            mod_prefix: "custom".to_owned(),
            atlas: "CustomEnhancements".to_owned(),
            atlas_columns: 10,
            emit_loader: false,
        }
    }
}

impl CompileOptions {
    /// Prefix used in runtime object keys (`m_<prefix>_<key>`).
    #[must_use]
    pub fn mod_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mod_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn atlas(mut self, atlas: impl Into<String>) -> Self {
        self.atlas = atlas.into();
        self
    }

    /// Sprites per atlas row. Zero is treated as one.
    #[must_use]
    pub fn atlas_columns(mut self, columns: u32) -> Self {
        self.atlas_columns = columns.max(1);
        self
    }

    /// Also emit a `main.lua` that registers the atlas and loads every unit.
    #[must_use]
    pub fn emit_loader(mut self, emit: bool) -> Self {
        self.emit_loader = emit;
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.mod_prefix
    }

    #[must_use]
    pub fn atlas_name(&self) -> &str {
        &self.atlas
    }

    #[must_use]
    pub fn columns(&self) -> u32 {
        self.atlas_columns
    }

    #[must_use]
    pub fn loader(&self) -> bool {
        self.emit_loader
    }
}

/// Compiles units into Lua, placing each on the next free atlas slot.
///
/// # Example
///
/// ```
/// use ruleforge::{Amount, Compiler, CompileOptions, EffectKind, UnitBuilder, UnitKind};
///
/// let unit = UnitBuilder::new(UnitKind::Enhancement, "glassy")
///     .name("Glassy")
///     .description("+#1# Chips")
///     .rule("chips", "card_scored", |r| r.effect(EffectKind::AddChips(Amount::Literal(30.0))))
///     .build()
///     .unwrap();
///
/// let mut compiler = Compiler::new(CompileOptions::default().mod_prefix("demo"));
/// let artifact = compiler.compile_unit(&unit);
/// assert_eq!(artifact.path, "enhancements/glassy.lua");
/// assert!(artifact.source.contains("bonus = 30"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
    next_position: u32,
}

impl Compiler {
    #[must_use]
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            next_position: 0,
        }
    }

    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Atlas index the next compiled unit will take.
    #[must_use]
    pub fn next_position(&self) -> u32 {
        self.next_position
    }

    /// Compile one unit. The unit is assumed valid; see [`Unit::validate`].
    pub fn compile_unit(&mut self, unit: &Unit) -> Artifact {
        let position = Position::from_index(self.next_position, self.options.atlas_columns);
        self.next_position = self.next_position.saturating_add(1);
        let artifact = assemble(unit, &self.options, position);
        debug!(
            path = %artifact.path,
            x = position.x,
            y = position.y,
            rules = unit.rules.len(),
            "compiled unit"
        );
        artifact
    }

    /// Validate and compile a batch of units into one artifact set.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] found by validation, or
    /// [`ModelError::DuplicateUnitKey`] when two units would write the same
    /// file. Nothing is compiled when validation fails.
    pub fn compile_batch(&mut self, units: &[Unit]) -> Result<ArtifactSet, ModelError> {
        let mut seen = HashSet::with_capacity(units.len());
        for unit in units {
            unit.validate()?;
            if !seen.insert(unit.output_path()) {
                return Err(ModelError::DuplicateUnitKey {
                    key: unit.key.clone(),
                });
            }
        }

        let mut set = ArtifactSet::new();
        for unit in units {
            let artifact = self.compile_unit(unit);
            set.insert(artifact.path, artifact.source);
        }
        if self.options.emit_loader {
            let paths: Vec<String> = set.paths().map(str::to_owned).collect();
            set.insert("main.lua", render_loader(&self.options, &paths));
        }

        info!(units = units.len(), files = set.len(), "compiled batch");
        Ok(set)
    }
}

/// Compile a single unit with default options at atlas position (0, 0).
#[must_use]
pub fn compile_unit(unit: &Unit) -> Artifact {
    Compiler::default().compile_unit(unit)
}
