use std::sync::Arc;

use crate::filters;
use crate::functions::SUPER;
use crate::render::Context;
use crate::types::node::{
    Block, Condition, Cycle, Expr, ForLoop, IfElse, Include, Node, Print, PrintExpr, Test, Var,
    With,
};
use crate::value::Map;
use crate::{Error, ErrorKind, Result, Value};

/// The per-render state of a `{% cycle %}` tag.
struct CycleState {
    items: Vec<Value>,
    pos: usize,
}

pub(crate) fn render_nodes(nodes: &[Node], ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    for node in nodes {
        render_node(node, ctx, out)?;
    }
    Ok(())
}

pub(crate) fn render_node(node: &Node, ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    match node {
        Node::Branch(nodes) => render_nodes(nodes, ctx, out)?,
        Node::Text(text) => out.push_str(text),
        Node::Print(print) => render_print(print, ctx, out)?,
        Node::For(for_loop) => render_for(for_loop, ctx, out)?,
        Node::If(if_else) => render_if(if_else, ctx, out)?,
        Node::Cycle(cycle) => render_cycle(cycle, ctx, out)?,
        Node::Include(include) => render_include(include, ctx, out)?,
        Node::Extends(root) => render_node(root, ctx, out)?,
        Node::Block(block) => render_block(block, ctx, out)?,
        Node::Spaceless(nodes) => {
            let mut buf = String::new();
            render_nodes(nodes, ctx, &mut buf)?;
            out.push_str(filters::spaceless(&buf).trim());
        }
        Node::Trim(nodes) => {
            let mut buf = String::new();
            render_nodes(nodes, ctx, &mut buf)?;
            out.push_str(buf.trim());
        }
        Node::With(with) => render_with(with, ctx, out)?,
        // Separators outside of their parent tag render nothing.
        Node::Empty | Node::Elif(_) | Node::Else => {}
    }
    Ok(())
}

fn render_print(print: &Print, ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    let value = match &print.expr {
        PrintExpr::Chain(exprs) => {
            let mut value = Value::Undefined;
            for expr in exprs {
                value = eval(expr, ctx)?;
                if value.is_truthy() {
                    break;
                }
            }
            value
        }
        PrintExpr::Ternary {
            test,
            if_true,
            if_false,
        } => {
            if eval_test(test, ctx) {
                eval(if_true, ctx)?
            } else {
                eval(if_false, ctx)?
            }
        }
    };
    let text = value.to_string();
    if print.escape {
        out.push_str(&filters::escape(&text));
    } else {
        out.push_str(&text);
    }
    Ok(())
}

fn render_for(for_loop: &ForLoop, ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    let iterable = eval(&for_loop.iterable, ctx)?;
    let items = match iterable.iterate() {
        Some(items) if iterable.is_truthy() && !items.is_empty() => items,
        _ => return render_nodes(&for_loop.empty, ctx, out),
    };

    let length = items.len();
    for (i, item) in items.into_iter().enumerate() {
        let parent = ctx.get("loop").cloned().unwrap_or(Value::None);
        ctx.push();
        if let Err(err) = bind_loop_vars(for_loop, item, ctx) {
            ctx.pop();
            return Err(err);
        }
        let mut record = Map::new();
        record.insert("index".into(), Value::from(i));
        record.insert("count".into(), Value::from(i + 1));
        record.insert("length".into(), Value::from(length));
        record.insert("is_first".into(), Value::Bool(i == 0));
        record.insert("is_last".into(), Value::Bool(i + 1 == length));
        record.insert("parent".into(), parent);
        ctx.set("loop", Value::Map(record));
        let result = render_nodes(&for_loop.body, ctx, out);
        ctx.pop();
        result?;
    }
    Ok(())
}

fn bind_loop_vars(for_loop: &ForLoop, item: Value, ctx: &mut Context<'_>) -> Result<()> {
    match for_loop.vars.as_slice() {
        [var] => ctx.set(var.as_str(), item),
        vars => {
            let parts = item.iterate().ok_or_else(|| {
                Error::new(
                    ErrorKind::Unpacking,
                    format!("cannot unpack [{}] in [{}]", item.repr(), for_loop.tag),
                )
            })?;
            for (var, value) in vars.iter().zip(parts) {
                ctx.set(var.as_str(), value);
            }
        }
    }
    Ok(())
}

fn render_if(if_else: &IfElse, ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    if eval_test(&if_else.test, ctx) {
        render_nodes(&if_else.then_branch, ctx, out)
    } else {
        render_nodes(&if_else.else_branch, ctx, out)
    }
}

fn render_cycle(cycle: &Cycle, ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    if ctx.stash::<CycleState>(cycle.id).is_none() {
        let items = eval(&cycle.expr, ctx)?.iterate().unwrap_or_default();
        ctx.set_stash(cycle.id, CycleState { items, pos: 0 });
    }
    if let Some(state) = ctx.stash::<CycleState>(cycle.id) {
        if !state.items.is_empty() {
            let value = &state.items[state.pos % state.items.len()];
            out.push_str(&value.to_string());
            state.pos += 1;
        }
    }
    Ok(())
}

fn render_include(include: &Include, ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    match include {
        Include::Static(root) => render_node(root, ctx, out),
        Include::Dynamic(expr) => {
            let value = eval(expr, ctx)?;
            let names: Vec<&str> = match &value {
                Value::String(s) => vec![s.as_str()],
                Value::List(list) => list.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            if names.is_empty() {
                return Err(Error::new(
                    ErrorKind::Render,
                    format!(
                        "include expected a template name, found {}",
                        value.human()
                    ),
                ));
            }
            ctx.enter_include()?;
            tracing::trace!(?names, "including template");
            let result = ctx
                .engine()
                .load_program(&names)
                .and_then(|program| render_node(&program.root, ctx, out));
            ctx.exit_include();
            result
        }
    }
}

fn render_block(block: &Arc<Block>, ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    let chain = match ctx.blocks().get(&block.title) {
        Some(chain) if chain.first().map(|b| b.id) == Some(block.id) => chain.clone(),
        // Overridden, the first block with this title renders instead.
        Some(chain) if chain.iter().any(|b| b.id == block.id) => return Ok(()),
        _ => vec![block.clone()],
    };
    ctx.push_chain(chain);
    let result = render_next_in_chain(ctx, out);
    ctx.pop_chain();
    result
}

/// Renders the most derived block left in the current chain, with `super`
/// bound to render the next one.
fn render_next_in_chain(ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    let Some(block) = ctx.next_in_chain() else {
        return Ok(());
    };
    ctx.push();
    ctx.set("super", Value::Fn(SUPER.clone()));
    let result = render_nodes(&block.body, ctx, out);
    ctx.pop();
    result
}

/// Renders the parent of the block currently rendering.
pub(crate) fn render_super(ctx: &mut Context<'_>) -> Result<String> {
    let mut out = String::new();
    render_next_in_chain(ctx, &mut out)?;
    Ok(out)
}

fn render_with(with: &With, ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
    let value = eval(&with.expr, ctx)?;
    ctx.push();
    ctx.set(with.alias.as_str(), value);
    let result = render_nodes(&with.body, ctx, out);
    ctx.pop();
    result
}

pub(crate) fn eval(expr: &Expr, ctx: &mut Context<'_>) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Var(var) => eval_var(var, ctx),
    }
}

fn eval_var(var: &Var, ctx: &mut Context<'_>) -> Result<Value> {
    let mut value = ctx.resolve(&var.path);
    if let Value::Fn(f) = &value {
        let f = f.clone();
        value = f.call(ctx, &var.args).map_err(|err| {
            Error::new(
                ErrorKind::Call,
                format!("error calling [{}]: {err}", var.path),
            )
        })?;
    }
    for filter in &var.filters {
        value = (filter.func)(value, &filter.args).map_err(|err| {
            Error::new(
                ErrorKind::Filter,
                format!(
                    "error applying filter [{}] in [{}]: {err}",
                    filter.name, var.raw
                ),
            )
        })?;
    }
    Ok(value)
}

/// Evaluates a test. A condition that fails to evaluate counts as false.
pub(crate) fn eval_test(test: &Test, ctx: &mut Context<'_>) -> bool {
    test.groups
        .iter()
        .any(|group| group.iter().all(|cond| eval_condition(cond, ctx)))
}

fn eval_condition(cond: &Condition, ctx: &mut Context<'_>) -> bool {
    let result = eval_condition_inner(cond, ctx).unwrap_or_else(|err| {
        tracing::warn!(condition = %cond.raw, error = %err, "condition failed, treating as false");
        false
    });
    result != cond.negated
}

fn eval_condition_inner(cond: &Condition, ctx: &mut Context<'_>) -> Result<bool> {
    let lhs = eval(&cond.lhs, ctx)?;
    match &cond.rhs {
        None => Ok(lhs.is_truthy()),
        Some((op, rhs)) => {
            let rhs = eval(rhs, ctx)?;
            op.apply(&lhs, &rhs)
                .map_err(|msg| Error::new(ErrorKind::Render, msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use crate::{data, Engine};

    #[test]
    #[traced_test]
    fn failed_condition_logs_warning() {
        let result = Engine::new()
            .compile("{% if x > 1 %}yes{% else %}no{% endif %}")
            .unwrap()
            .render_from(&data! { x: "a" })
            .unwrap();
        assert_eq!(result, "no");
        assert!(logs_contain("condition failed, treating as false"));
        assert!(logs_contain("cannot compare string with integer"));
    }

    #[test]
    #[traced_test]
    fn dynamic_include_logs_names() {
        let mut engine = Engine::new();
        engine.add_template("part", "P").unwrap();
        let result = engine
            .compile("{% include name %}")
            .unwrap()
            .render_from(&data! { name: "part" })
            .unwrap();
        assert_eq!(result, "P");
        assert!(logs_contain("including template"));
    }
}
