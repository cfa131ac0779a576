mod delete;
mod insert;
mod names;
mod order_by;
mod predicate;
mod select;
mod update;
mod write;

use crate::{
    compiler::CompilerOptions,
    relation::{RelationId, RelationNode, Relations, Resolver},
    token::{Action, ParamPath, Token, Transform},
};

use relmap_core::{
    schema::db::{Schema, Table},
    spec::{FieldNode, FieldTree, Operation, OrderBy, Output, QuerySpec},
    stmt::Path,
    Error, Result,
};
use relmap_sql::stmt::{
    Batch, Expr, HoleId, Join, JoinOp, TableFactor, TableWithJoins,
};

use names::Names;

/// The result of lowering a query specification: a statement batch with
/// holes, the tokens filling them and the parameters read at bind time.
#[derive(Debug)]
pub(crate) struct Lowered {
    pub(crate) batch: Batch,
    pub(crate) tokens: Vec<Token>,
    pub(crate) params: Vec<ParamPath>,

    /// Relations backing the result set, for materialization.
    pub(crate) relations: Option<Relations>,
}

pub(crate) fn lower(
    resolver: Resolver<'_>,
    options: &CompilerOptions,
    spec: &QuerySpec,
) -> Result<Lowered> {
    let table = target_table(resolver, spec)?;
    check_output(spec)?;

    let args = Args::classify(spec)?;

    let mut lower = Lower {
        resolver,
        schema: resolver.schema,
        spec,
        options,
        table,
        args,
        tokens: vec![],
        params: vec![],
        names: Names::default(),
        next_hole: 0,
        next_alias: 0,
    };

    let (batch, relations) = match spec.operation {
        Operation::Select => {
            let (query, relations) = lower.select()?;
            (Batch::from(relmap_sql::Statement::from(query)), Some(relations))
        }
        Operation::Insert | Operation::Upsert | Operation::Sync => lower.insert()?,
        Operation::Update => (lower.update()?, None),
        Operation::Delete => (lower.delete()?, None),
    };

    tracing::debug!(
        operation = ?spec.operation,
        table = %table.name,
        statements = batch.statements.len(),
        tokens = lower.tokens.len(),
        params = lower.params.len(),
        "lowered query specification"
    );

    Ok(Lowered {
        batch,
        tokens: lower.tokens,
        params: lower.params,
        relations,
    })
}

struct Lower<'a> {
    resolver: Resolver<'a>,
    schema: &'a Schema,
    spec: &'a QuerySpec,
    options: &'a CompilerOptions,

    /// Target table
    table: &'a Table,

    args: Args<'a>,

    tokens: Vec<Token>,
    params: Vec<ParamPath>,

    names: Names,

    next_hole: usize,
    next_alias: usize,
}

/// Arguments sorted by role.
#[derive(Debug, Default)]
struct Args<'a> {
    filters: Vec<&'a FieldNode>,
    order_by: Vec<&'a FieldNode>,
    offset: Option<&'a FieldNode>,
    fetch: Option<&'a FieldNode>,
    set: Vec<&'a FieldNode>,
}

impl<'a> Args<'a> {
    fn classify(spec: &'a QuerySpec) -> Result<Args<'a>> {
        let tree = &spec.args;
        let mut args = Args::default();
        let mut dynamic = false;

        for arg in tree.children(tree.root().id) {
            let directives = &arg.directives;
            let path = tree.path(arg.id);

            if directives.exclude {
                continue;
            }

            if directives.offset {
                if args.offset.replace(arg).is_some() {
                    return Err(Error::invalid_attribute("more than one `offset` argument"));
                }
            } else if directives.fetch {
                if args.fetch.replace(arg).is_some() {
                    return Err(Error::invalid_attribute("more than one `fetch` argument"));
                }
            } else if let Some(order_by) = &directives.order_by {
                if matches!(order_by, OrderBy::Dynamic) {
                    if dynamic {
                        return Err(Error::invalid_attribute(
                            "more than one dynamic order-by argument",
                        ));
                    }
                    dynamic = true;
                }
                args.order_by.push(arg);
            } else if directives.set {
                if spec.operation != Operation::Update {
                    return Err(Error::invalid_attribute(format!(
                        "SET argument `{path}` outside an update"
                    )));
                }
                args.set.push(arg);
            } else {
                args.filters.push(arg);
            }
        }

        let paged = args.offset.is_some() || args.fetch.is_some();
        if spec.operation != Operation::Select && (paged || !args.order_by.is_empty()) {
            return Err(Error::invalid_attribute(format!(
                "ordering and paging arguments are only valid for select, not {:?}",
                spec.operation
            )));
        }

        Ok(args)
    }

    fn is_paged(&self) -> bool {
        self.offset.is_some() || self.fetch.is_some()
    }
}

/// The table a specification targets: declared, else the output shape's
/// table, else the table of the first shape-typed argument.
fn target_table<'a>(resolver: Resolver<'a>, spec: &QuerySpec) -> Result<&'a Table> {
    if let Some(name) = &spec.table {
        return resolver
            .find_table(name)
            .ok_or_else(|| Error::invalid_identifier(name.clone(), format!("table `{name}`")));
    }

    if let Some(output) = &spec.output {
        let root = output.root();
        if let Some(table) = resolver.shape_table(root, &Path::root())? {
            return Ok(table);
        }
    }

    for arg in spec.args.children(spec.args.root().id) {
        if arg.ty.shape_name().is_some() {
            if let Some(table) = resolver.shape_table(arg, &spec.args.path(arg.id))? {
                return Ok(table);
            }
        }
    }

    Err(Error::invalid_attribute(
        "cannot infer the target table: declare a table or an output shape mapped to one",
    ))
}

fn check_output(spec: &QuerySpec) -> Result<()> {
    use Operation::*;
    use Output::*;

    let valid = match spec.operation {
        Select => matches!(spec.output_kind, One | Many | Count),
        Insert | Upsert | Sync => matches!(spec.output_kind, One | Many | Affected | Nothing),
        Update | Delete => matches!(spec.output_kind, Affected | Nothing),
    };

    if valid {
        Ok(())
    } else {
        Err(Error::invalid_attribute(format!(
            "{:?} cannot return {:?}",
            spec.operation, spec.output_kind
        )))
    }
}

impl<'a> Lower<'a> {
    fn args_tree(&self) -> &'a FieldTree {
        &self.spec.args
    }

    fn hole(&mut self) -> HoleId {
        let hole = HoleId(self.next_hole);
        self.next_hole += 1;
        hole
    }

    /// Records a token and returns the hole it fills.
    fn token(&mut self, path: Path, action: Action) -> HoleId {
        let hole = self.hole();
        self.tokens.push(Token { hole, path, action });
        hole
    }

    /// Declares a parameter read from `path`. A parameter with the same
    /// path and transform is shared.
    fn param(&mut self, path: &Path, transform: Transform) -> String {
        if let Some(existing) = self
            .params
            .iter()
            .find(|param| param.path == *path && param.transform == transform)
        {
            return existing.name.clone();
        }

        let name = self.names.single(&path.to_param_name());
        self.params.push(ParamPath {
            name: name.clone(),
            path: path.clone(),
            transform,
        });
        name
    }

    /// Reserves a base for the parameters a token derives at bind time.
    fn param_base(&mut self, base: &str) -> String {
        self.names.base(base)
    }

    /// A fresh alias for a subquery table.
    fn alias(&mut self, prefix: &str) -> String {
        let alias = format!("{prefix}{}", self.next_alias);
        self.next_alias += 1;
        alias
    }

    fn table_factor(&self, node: &RelationNode) -> TableFactor {
        TableFactor::table(
            &self.schema.table(node.table).name,
            Some(node.alias.clone()),
        )
    }

    /// FROM the root, joining every node accepted by `include`, parents
    /// before children.
    fn from_clause(
        &self,
        relations: &Relations,
        op: JoinOp,
        include: impl Fn(&RelationNode) -> bool,
    ) -> TableWithJoins {
        let mut from = TableWithJoins::from(self.table_factor(relations.root()));

        for node in relations.iter() {
            if node.is_joined() && include(node) {
                from.joins.push(Join {
                    table: self.table_factor(node),
                    op,
                    on: self.join_condition(relations, node.id),
                });
            }
        }

        from
    }

    /// `parent.col = child.col [AND ...]` for the node's join pairs.
    fn join_condition(&self, relations: &Relations, id: RelationId) -> Expr {
        let node = relations.node(id);
        let parent = node
            .parent
            .map(|parent| relations.node(parent).alias.as_str())
            .unwrap_or(node.alias.as_str());

        let operands = node
            .join
            .iter()
            .map(|pair| {
                Expr::eq(
                    Expr::column(parent, &self.schema.column(pair.parent).name),
                    Expr::column(&node.alias, &self.schema.column(pair.child).name),
                )
            })
            .collect();

        Expr::and_from_vec(operands).unwrap_or_else(Expr::tautology)
    }

    /// `"alias"."pk"` for every primary key column of the target table.
    fn root_key(&self, alias: &str) -> Vec<Expr> {
        self.table
            .primary_key_columns()
            .map(|column| Expr::column(alias, &column.name))
            .collect()
    }
}
