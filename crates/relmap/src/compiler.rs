mod builder;
pub use builder::Builder;

mod compiled;
pub use compiled::{Bound, Compiled};

mod options;
pub use options::{CompilerOptions, Inflection, JunctionPolicy};

use crate::{lower, materialize::Materializer, relation::Resolver};

use relmap_core::{
    schema::{db::Schema, Inflector},
    spec::{Output, QuerySpec},
    Result,
};

use std::sync::Arc;

/// Compiles query specifications against one schema.
///
/// Compiling is pure: the same specification always yields the same
/// statement text and parameter names, so a [`Compiled`] statement can be
/// cached and bound any number of times.
#[derive(Debug, Clone)]
pub struct Compiler {
    schema: Arc<Schema>,
    inflector: Arc<dyn Inflector>,
    options: CompilerOptions,
}

impl Compiler {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn compile(&self, spec: &QuerySpec) -> Result<Compiled> {
        let resolver = Resolver {
            schema: &self.schema,
            inflector: &*self.inflector,
            policy: self.options.junction_policy,
        };

        let lowered = lower::lower(resolver, &self.options, spec)?;

        let materializer = match (spec.output_kind, &lowered.relations) {
            (Output::One | Output::Many | Output::Count, Some(relations)) => Some(Materializer::new(
                &self.schema,
                relations,
                spec.output.clone(),
                spec.output_kind,
            )),
            _ => None,
        };

        Ok(Compiled {
            schema: self.schema.clone(),
            batch: lowered.batch,
            tokens: lowered.tokens,
            params: lowered.params,
            materializer,
            output: spec.output_kind,
        })
    }
}
