//! Turns an AST back into canonical source text.
//!
//! Parentheses come only from `Grouping` nodes, so printing a parsed program
//! and parsing the result again yields the same tree.

use std::fmt::{self, Write};

use super::ast::{Expr, Function, Literal, Program, Stmt};

const INDENT: &str = "    ";

struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn program(mut self, program: &Program) -> String {
        for declaration in &program.declarations {
            self.stmt(declaration);
            self.out.push('\n');
        }
        self.out
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    /// Writes `stmt` starting at the current column, without a trailing newline.
    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var { name, initializer } => {
                self.out.push_str("var ");
                self.out.push_str(name);
                if let Some(value) = initializer {
                    self.out.push_str(" = ");
                    self.expr(value);
                }
                self.out.push(';');
            }
            Stmt::Function(function) => {
                self.out.push_str("fun ");
                self.function(function);
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                self.out.push_str("class ");
                self.out.push_str(name);
                if let Some(superclass) = superclass {
                    self.out.push_str(" < ");
                    self.out.push_str(superclass);
                }
                self.out.push_str(" {");
                if !methods.is_empty() {
                    self.depth += 1;
                    for method in methods {
                        self.newline();
                        self.function(method);
                    }
                    self.depth -= 1;
                    self.newline();
                }
                self.out.push('}');
            }
            Stmt::Expression(expr) => {
                self.expr(expr);
                self.out.push(';');
            }
            Stmt::Print(expr) => {
                self.out.push_str("print ");
                self.expr(expr);
                self.out.push(';');
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.out.push_str("if (");
                self.expr(condition);
                self.out.push_str(") ");
                self.stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.out.push_str(" else ");
                    self.stmt(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.out.push_str("while (");
                self.expr(condition);
                self.out.push_str(") ");
                self.stmt(body);
            }
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                self.out.push_str("for (");
                match initializer {
                    Some(initializer) => self.stmt(initializer),
                    None => self.out.push(';'),
                }
                if *condition != Expr::Literal(Literal::Bool(true)) {
                    self.out.push(' ');
                    self.expr(condition);
                }
                self.out.push(';');
                if let Some(increment) = increment {
                    self.out.push(' ');
                    self.expr(increment);
                }
                self.out.push_str(") ");
                self.stmt(body);
            }
            Stmt::Block(stmts) => self.block(stmts),
            Stmt::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value);
                }
                self.out.push(';');
            }
        }
    }

    fn function(&mut self, function: &Function) {
        self.out.push_str(&function.name);
        self.out.push('(');
        self.out.push_str(&function.params.join(", "));
        self.out.push_str(") ");
        self.block(&function.body);
    }

    fn block(&mut self, stmts: &[Stmt]) {
        self.out.push('{');
        if stmts.is_empty() {
            self.out.push('}');
            return;
        }
        self.depth += 1;
        for stmt in stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.depth -= 1;
        self.newline();
        self.out.push('}');
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(literal) => self.literal(literal),
            Expr::Variable(name) => self.out.push_str(name),
            Expr::This => self.out.push_str("this"),
            Expr::Super { method } => {
                self.out.push_str("super.");
                self.out.push_str(method);
            }
            Expr::Assign { name, value } => {
                self.out.push_str(name);
                self.out.push_str(" = ");
                self.expr(value);
            }
            Expr::Set {
                object,
                name,
                value,
            } => {
                self.expr(object);
                self.out.push('.');
                self.out.push_str(name);
                self.out.push_str(" = ");
                self.expr(value);
            }
            Expr::Get { object, name } => {
                self.expr(object);
                self.out.push('.');
                self.out.push_str(name);
            }
            Expr::Call { callee, arguments } => {
                self.expr(callee);
                self.out.push('(');
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(argument);
                }
                self.out.push(')');
            }
            Expr::Unary { op, operand } => {
                self.out.push_str(op.symbol());
                self.expr(operand);
            }
            Expr::Binary { left, op, right } => {
                self.expr(left);
                self.out.push(' ');
                self.out.push_str(op.symbol());
                self.out.push(' ');
                self.expr(right);
            }
            Expr::Grouping(inner) => {
                self.out.push('(');
                self.expr(inner);
                self.out.push(')');
            }
        }
    }

    fn literal(&mut self, literal: &Literal) {
        // `{}` on f64 never uses an exponent and drops a zero fraction.
        let _ = match literal {
            Literal::Number(value) => write!(self.out, "{}", value),
            Literal::String(text) => write!(self.out, "\"{}\"", text),
            Literal::Bool(value) => write!(self.out, "{}", value),
            Literal::Nil => write!(self.out, "nil"),
        };
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Printer::new().program(self))
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer::new();
        printer.stmt(self);
        f.write_str(&printer.out)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer::new();
        printer.expr(self);
        f.write_str(&printer.out)
    }
}
