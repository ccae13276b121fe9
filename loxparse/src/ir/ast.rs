#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub declarations: Vec<Stmt>,
}

/// Shared shape of `fun` declarations and class methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// var x = 42;
    Var {
        name: String,
        initializer: Option<Expr>,
    },
    /// fun add(a, b) { ... }
    Function(Function),
    /// class B < A { method() { ... } }
    Class {
        name: String,
        superclass: Option<String>,
        methods: Vec<Function>,
    },
    /// f(x);
    Expression(Expr),
    /// print x;
    Print(Expr),
    /// if (cond) then else orelse
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// while (cond) body
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    /// for (init; cond; incr) body
    ///
    /// An omitted condition is stored as `true`, an omitted increment as `None`.
    For {
        initializer: Option<Box<Stmt>>,
        condition: Expr,
        increment: Option<Expr>,
        body: Box<Stmt>,
    },
    /// { ... }
    Block(Vec<Stmt>),
    /// return; / return x;
    Return(Option<Expr>),
}

impl Stmt {
    /// Rewrites a `for` loop into `{ init; while (cond) { body; incr; } }`.
    ///
    /// When the body already is a block the increment is appended to its
    /// statements instead of wrapping it again. Any other statement is
    /// returned unchanged.
    pub fn desugar_for(self) -> Stmt {
        let (initializer, condition, increment, body) = match self {
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => (initializer, condition, increment, body),
            other => return other,
        };

        let body = match increment {
            None => *body,
            Some(increment) => match *body {
                Stmt::Block(mut stmts) => {
                    stmts.push(Stmt::Expression(increment));
                    Stmt::Block(stmts)
                }
                other => Stmt::Block(vec![other, Stmt::Expression(increment)]),
            },
        };

        let mut stmts = Vec::with_capacity(2);
        if let Some(initializer) = initializer {
            stmts.push(*initializer);
        }
        stmts.push(Stmt::While {
            condition,
            body: Box::new(body),
        });
        Stmt::Block(stmts)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// 42, 3.14, "text", true, nil
    Literal(Literal),
    /// x
    Variable(String),
    /// this
    This,
    /// super.method
    Super { method: String },
    /// x = value
    Assign { name: String, value: Box<Expr> },
    /// object.name = value
    Set {
        object: Box<Expr>,
        name: String,
        value: Box<Expr>,
    },
    /// object.name
    Get { object: Box<Expr>, name: String },
    /// callee(arg, ...)
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    /// -x, !x
    Unary { op: UnaryOperator, operand: Box<Expr> },
    /// a + b, a and b
    Binary {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// (expr)
    Grouping(Box<Expr>),
}

impl Expr {
    pub fn number(value: f64) -> Expr {
        Expr::Literal(Literal::Number(value))
    }

    pub fn variable(name: impl Into<String>) -> Expr {
        Expr::Variable(name.into())
    }

    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate, // -
    Not,    // !
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,          // +
    Subtract,     // -
    Multiply,     // *
    Divide,       // /
    Equal,        // ==
    NotEqual,     // !=
    Greater,      // >
    Less,         // <
    GreaterEqual, // >=
    LessEqual,    // <=
    And,          // and
    Or,           // or
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
        }
    }
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print(value: f64) -> Stmt {
        Stmt::Print(Expr::number(value))
    }

    #[test]
    fn test_desugar_for_appends_increment_to_block_body() {
        let increment = Expr::Assign {
            name: "i".to_string(),
            value: Box::new(Expr::number(2.0)),
        };
        let init = Stmt::Var {
            name: "i".to_string(),
            initializer: Some(Expr::number(0.0)),
        };
        let condition = Expr::Literal(Literal::Bool(true));

        let desugared = Stmt::For {
            initializer: Some(Box::new(init.clone())),
            condition: condition.clone(),
            increment: Some(increment.clone()),
            body: Box::new(Stmt::Block(vec![print(1.0)])),
        }
        .desugar_for();

        let expected = Stmt::Block(vec![
            init,
            Stmt::While {
                condition,
                body: Box::new(Stmt::Block(vec![print(1.0), Stmt::Expression(increment)])),
            },
        ]);
        assert_eq!(desugared, expected);
    }

    #[test]
    fn test_desugar_for_without_clauses() {
        let condition = Expr::Literal(Literal::Bool(true));
        let desugared = Stmt::For {
            initializer: None,
            condition: condition.clone(),
            increment: None,
            body: Box::new(print(1.0)),
        }
        .desugar_for();

        assert_eq!(
            desugared,
            Stmt::Block(vec![Stmt::While {
                condition,
                body: Box::new(print(1.0)),
            }])
        );
    }

    #[test]
    fn test_desugar_wraps_single_statement_body() {
        let increment = Expr::variable("i");
        let desugared = Stmt::For {
            initializer: None,
            condition: Expr::variable("ok"),
            increment: Some(increment.clone()),
            body: Box::new(print(3.0)),
        }
        .desugar_for();

        match desugared {
            Stmt::Block(stmts) => match &stmts[..] {
                [Stmt::While { body, .. }] => assert_eq!(
                    **body,
                    Stmt::Block(vec![print(3.0), Stmt::Expression(increment)])
                ),
                other => panic!("Expected a single while loop, got {:?}", other),
            },
            other => panic!("Expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_desugar_leaves_other_statements_alone() {
        assert_eq!(print(1.0).desugar_for(), print(1.0));
    }
}
