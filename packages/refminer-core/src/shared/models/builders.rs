//! Builders for declaration trees
//!
//! Front ends that do not emit canonical text, as well as tests and benches,
//! construct statements here. Every builder renders the source text from its
//! parts so that text and structure never disagree.

use super::declaration::{
    Annotation, Attribute, Modifier, Operation, Parameter, TypeDeclaration, TypeKind, Visibility,
};
use super::expression::{Expression, ExpressionKind, LiteralKind};
use super::span::Span;
use super::statement::{Body, Branch, BranchKind, Statement, StatementKind};

fn join_texts(exprs: &[Expression]) -> String {
    exprs
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Expressions
// ============================================================================

pub fn var(name: &str) -> Expression {
    Expression::new(
        ExpressionKind::Variable {
            name: name.to_string(),
        },
        name,
        vec![],
    )
}

pub fn lit(text: &str) -> Expression {
    Expression::new(ExpressionKind::Literal(LiteralKind::infer(text)), text, vec![])
}

/// Opaque expression with verbatim text
pub fn raw(text: &str) -> Expression {
    Expression::new(ExpressionKind::Other, text, vec![])
}

pub fn call(name: &str, args: Vec<Expression>) -> Expression {
    let text = format!("{}({})", name, join_texts(&args));
    Expression::new(
        ExpressionKind::Invocation {
            name: name.to_string(),
            has_receiver: false,
        },
        text,
        args,
    )
}

pub fn method_call(receiver: Expression, name: &str, args: Vec<Expression>) -> Expression {
    let text = format!("{}.{}({})", receiver.text, name, join_texts(&args));
    let mut operands = vec![receiver];
    operands.extend(args);
    Expression::new(
        ExpressionKind::Invocation {
            name: name.to_string(),
            has_receiver: true,
        },
        text,
        operands,
    )
}

pub fn new_object(type_name: &str, args: Vec<Expression>) -> Expression {
    let text = format!("new {}({})", type_name, join_texts(&args));
    Expression::new(
        ExpressionKind::ObjectCreation {
            type_name: type_name.to_string(),
        },
        text,
        args,
    )
}

pub fn field(target: Expression, name: &str) -> Expression {
    let text = format!("{}.{}", target.text, name);
    Expression::new(
        ExpressionKind::FieldAccess {
            name: name.to_string(),
        },
        text,
        vec![target],
    )
}

pub fn infix(left: Expression, operator: &str, right: Expression) -> Expression {
    let text = format!("{} {} {}", left.text, operator, right.text);
    Expression::new(
        ExpressionKind::Infix {
            operator: operator.to_string(),
        },
        text,
        vec![left, right],
    )
}

pub fn prefix(operator: &str, operand: Expression) -> Expression {
    let text = format!("{}{}", operator, operand.text);
    Expression::new(
        ExpressionKind::Prefix {
            operator: operator.to_string(),
        },
        text,
        vec![operand],
    )
}

pub fn postfix(operand: Expression, operator: &str) -> Expression {
    let text = format!("{}{}", operand.text, operator);
    Expression::new(
        ExpressionKind::Postfix {
            operator: operator.to_string(),
        },
        text,
        vec![operand],
    )
}

pub fn assign(target: Expression, value: Expression) -> Expression {
    let text = format!("{} = {}", target.text, value.text);
    Expression::new(
        ExpressionKind::Assignment {
            operator: "=".to_string(),
        },
        text,
        vec![target, value],
    )
}

pub fn ternary(cond: Expression, then: Expression, otherwise: Expression) -> Expression {
    let text = format!("{} ? {} : {}", cond.text, then.text, otherwise.text);
    Expression::new(ExpressionKind::Ternary, text, vec![cond, then, otherwise])
}

pub fn cast(type_name: &str, operand: Expression) -> Expression {
    let text = format!("({}) {}", type_name, operand.text);
    Expression::new(
        ExpressionKind::Cast {
            type_name: type_name.to_string(),
        },
        text,
        vec![operand],
    )
}

pub fn lambda(parameters: &[&str], body: Expression) -> Expression {
    let text = format!("({}) -> {}", parameters.join(", "), body.text);
    Expression::new(
        ExpressionKind::Lambda {
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        },
        text,
        vec![body],
    )
}

// ============================================================================
// Statements
// ============================================================================

pub fn expr_stmt(expr: Expression) -> Statement {
    Statement::new(StatementKind::Expression, format!("{};", expr.text)).with_expression(expr)
}

pub fn declare(type_name: &str, name: &str, init: Expression) -> Statement {
    Statement::new(
        StatementKind::VariableDeclaration,
        format!("{} {} = {};", type_name, name, init.text),
    )
    .with_expression(init)
    .with_variable(name, type_name)
}

pub fn declare_empty(type_name: &str, name: &str) -> Statement {
    Statement::new(
        StatementKind::VariableDeclaration,
        format!("{} {};", type_name, name),
    )
    .with_variable(name, type_name)
}

pub fn ret(expr: Expression) -> Statement {
    Statement::new(StatementKind::Return, format!("return {};", expr.text)).with_expression(expr)
}

pub fn ret_void() -> Statement {
    Statement::new(StatementKind::Return, "return;")
}

pub fn throw_stmt(expr: Expression) -> Statement {
    Statement::new(StatementKind::Throw, format!("throw {};", expr.text)).with_expression(expr)
}

pub fn break_stmt() -> Statement {
    Statement::new(StatementKind::Break, "break;")
}

pub fn continue_stmt() -> Statement {
    Statement::new(StatementKind::Continue, "continue;")
}

pub fn if_then(cond: Expression, then: Vec<Statement>) -> Statement {
    Statement::new(StatementKind::If, format!("if({})", cond.text))
        .with_expression(cond)
        .with_branch(Branch::new(BranchKind::Then, then))
}

pub fn if_else(cond: Expression, then: Vec<Statement>, otherwise: Vec<Statement>) -> Statement {
    if_then(cond, then).with_branch(Branch::new(BranchKind::Else, otherwise))
}

pub fn while_loop(cond: Expression, body: Vec<Statement>) -> Statement {
    Statement::new(StatementKind::While, format!("while({})", cond.text))
        .with_expression(cond)
        .with_branch(Branch::new(BranchKind::Body, body))
}

pub fn do_while(body: Vec<Statement>, cond: Expression) -> Statement {
    Statement::new(StatementKind::DoWhile, format!("do-while({})", cond.text))
        .with_expression(cond)
        .with_branch(Branch::new(BranchKind::Body, body))
}

pub fn for_loop(
    init: Expression,
    cond: Expression,
    update: Expression,
    body: Vec<Statement>,
) -> Statement {
    Statement::new(
        StatementKind::For,
        format!("for({}; {}; {})", init.text, cond.text, update.text),
    )
    .with_expression(init)
    .with_expression(cond)
    .with_expression(update)
    .with_branch(Branch::new(BranchKind::Body, body))
}

pub fn for_each(
    type_name: &str,
    name: &str,
    iterable: Expression,
    body: Vec<Statement>,
) -> Statement {
    Statement::new(
        StatementKind::ForEach,
        format!("for({} {} : {})", type_name, name, iterable.text),
    )
    .with_expression(iterable)
    .with_variable(name, type_name)
    .with_branch(Branch::new(BranchKind::Body, body))
}

pub fn case(label: &str, body: Vec<Statement>) -> Branch {
    Branch::new(BranchKind::Case, body).with_header(format!("case {}:", label))
}

pub fn default_case(body: Vec<Statement>) -> Branch {
    Branch::new(BranchKind::Default, body).with_header("default:")
}

pub fn switch_stmt(selector: Expression, cases: Vec<Branch>) -> Statement {
    let mut stmt = Statement::new(StatementKind::Switch, format!("switch({})", selector.text))
        .with_expression(selector);
    stmt.branches = cases;
    stmt
}

/// `catches` holds `(exception declaration, body)` pairs, e.g. `("IOException e", ...)`
pub fn try_catch(
    body: Vec<Statement>,
    catches: Vec<(&str, Vec<Statement>)>,
    finally: Option<Vec<Statement>>,
) -> Statement {
    let mut stmt = Statement::new(StatementKind::Try, "try")
        .with_branch(Branch::new(BranchKind::Try, body));
    for (decl, handler) in catches {
        stmt = stmt
            .with_branch(Branch::new(BranchKind::Catch, handler).with_header(format!("catch({})", decl)));
    }
    if let Some(fin) = finally {
        stmt = stmt.with_branch(Branch::new(BranchKind::Finally, fin).with_header("finally"));
    }
    stmt
}

pub fn block(body: Vec<Statement>) -> Statement {
    Statement::new(StatementKind::Block, "{").with_branch(Branch::new(BranchKind::Body, body))
}

pub fn synchronized_block(lock: Expression, body: Vec<Statement>) -> Statement {
    Statement::new(
        StatementKind::Synchronized,
        format!("synchronized({})", lock.text),
    )
    .with_expression(lock)
    .with_branch(Branch::new(BranchKind::Body, body))
}

pub fn labeled(label: &str, inner: Statement) -> Statement {
    Statement::new(StatementKind::Labeled, format!("{}:", label))
        .with_branch(Branch::new(BranchKind::Body, vec![inner]))
}

// ============================================================================
// Declarations
// ============================================================================

/// Builder for `Operation`
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    op: Operation,
}

impl OperationBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            op: Operation {
                name: name.to_string(),
                parameters: Vec::new(),
                return_type: None,
                visibility: Visibility::Public,
                modifiers: Vec::new(),
                annotations: Vec::new(),
                thrown_types: Vec::new(),
                doc_comment: None,
                is_constructor: false,
                body: Some(Body::default()),
                span: Span::zero(),
            },
        }
    }

    pub fn param(mut self, type_name: &str, name: &str) -> Self {
        self.op.parameters.push(Parameter::new(type_name, name));
        self
    }

    pub fn varargs_param(mut self, type_name: &str, name: &str) -> Self {
        let mut p = Parameter::new(type_name, name);
        p.varargs = true;
        self.op.parameters.push(p);
        self
    }

    pub fn returns(mut self, type_name: &str) -> Self {
        self.op.return_type = Some(type_name.to_string());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.op.visibility = visibility;
        self
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.op.modifiers.push(modifier);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.op.annotations.push(annotation);
        self
    }

    pub fn annotate(self, name: &str) -> Self {
        self.annotation(Annotation::new(name))
    }

    pub fn throws(mut self, type_name: &str) -> Self {
        self.op.thrown_types.push(type_name.to_string());
        self
    }

    pub fn constructor(mut self) -> Self {
        self.op.is_constructor = true;
        self.op.return_type = None;
        self
    }

    pub fn doc(mut self, comment: &str) -> Self {
        self.op.doc_comment = Some(comment.to_string());
        self
    }

    pub fn body(mut self, statements: Vec<Statement>) -> Self {
        self.op.body = Some(Body::new(statements));
        self
    }

    /// Abstract or interface operation
    pub fn without_body(mut self) -> Self {
        self.op.body = None;
        self
    }

    pub fn lines(mut self, start: u32, end: u32) -> Self {
        self.op.span = Span::lines(start, end);
        self
    }

    pub fn build(self) -> Operation {
        self.op
    }
}

/// Builder for `TypeDeclaration`
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    decl: TypeDeclaration,
}

impl TypeBuilder {
    pub fn new(qualified_name: &str) -> Self {
        Self {
            decl: TypeDeclaration {
                name: qualified_name.to_string(),
                kind: TypeKind::Class,
                file_path: format!("{}.java", qualified_name.replace('.', "/")),
                visibility: Visibility::Public,
                modifiers: Vec::new(),
                superclass: None,
                interfaces: Vec::new(),
                operations: Vec::new(),
                attributes: Vec::new(),
                annotations: Vec::new(),
                doc_comment: None,
                span: Span::zero(),
            },
        }
    }

    pub fn file(mut self, path: &str) -> Self {
        self.decl.file_path = path.to_string();
        self
    }

    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.decl.kind = kind;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.decl.visibility = visibility;
        self
    }

    pub fn superclass(mut self, name: &str) -> Self {
        self.decl.superclass = Some(name.to_string());
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.decl.interfaces.push(name.to_string());
        self
    }

    pub fn operation(mut self, op: Operation) -> Self {
        self.decl.operations.push(op);
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.decl.attributes.push(attr);
        self
    }

    pub fn annotate(mut self, name: &str) -> Self {
        self.decl.annotations.push(Annotation::new(name));
        self
    }

    pub fn lines(mut self, start: u32, end: u32) -> Self {
        self.decl.span = Span::lines(start, end);
        self
    }

    pub fn build(self) -> TypeDeclaration {
        self.decl
    }
}
