use super::{Compiler, CompilerOptions, JunctionPolicy};

use relmap_core::{
    schema::{db::Schema, Inflector},
    Error, Result,
};

use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Builder {
    schema: Option<Arc<Schema>>,

    /// Overrides the inflection named in `options`
    inflector: Option<Arc<dyn Inflector>>,

    options: CompilerOptions,
}

impl Builder {
    pub fn schema(&mut self, schema: impl Into<Arc<Schema>>) -> &mut Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the strategy used to match field and shape names against table
    /// and column names.
    pub fn inflector(&mut self, inflector: impl Inflector) -> &mut Self {
        self.inflector = Some(Arc::new(inflector));
        self
    }

    pub fn junction_policy(&mut self, policy: JunctionPolicy) -> &mut Self {
        self.options.junction_policy = policy;
        self
    }

    pub fn key_window_alias(&mut self, alias: &str) -> &mut Self {
        self.options.key_window_alias = alias.to_string();
        self
    }

    /// Replaces every option at once, e.g. with values loaded from a
    /// configuration file.
    pub fn options(&mut self, options: CompilerOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn build(&self) -> Result<Compiler> {
        let Some(schema) = self.schema.clone() else {
            return Err(Error::invalid_schema("the compiler requires a schema"));
        };

        if self.options.key_window_alias.is_empty() {
            return Err(Error::invalid_attribute("the key window alias is empty"));
        }

        let inflector = self
            .inflector
            .clone()
            .unwrap_or_else(|| self.options.inflection.inflector());

        tracing::debug!(
            tables = schema.tables.len(),
            junction_policy = ?self.options.junction_policy,
            "compiler built"
        );

        Ok(Compiler {
            schema,
            inflector,
            options: self.options.clone(),
        })
    }
}
