// Grammar-level tests through the public entry points

use loxparse::ir::ast::{BinaryOperator, Expr, Literal, Stmt};
use loxparse::{ParseError, parse, parse_expression};

const SAMPLE: &str = r#"
// Classes, closures and every statement form.
class Animal {
    init(name) {
        this.name = name;
    }

    speak() {
        return this.name + " makes a sound";
    }
}

class Dog < Animal {
    init(name) {
        super.init(name);
        this.tricks = nil;
    }

    speak() {
        return super.speak() + " (woof)";
    }
}

fun counter() {
    var count = 0;
    fun increment() {
        count = count + 1;
        return count;
    }
    return increment;
}

var next = counter();
for (var i = 0; i < 3; i = i + 1) {
    if (i == 1) print "one"; else if (i >= 2 and !false) print next(); else print -i;
}

var dog = Dog("Rex");
dog.owner = "Ann";
while (dog.name != nil or 0.5 <= 1) {
    print dog.speak();
    dog.name = nil;
}
"#;

fn num(value: f64) -> Expr {
    Expr::number(value)
}

fn var(name: &str) -> Expr {
    Expr::variable(name)
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let expr = parse_expression("1 + 2 * 3").expect("Parsing failed");
    assert_eq!(
        expr,
        Expr::binary(
            num(1.0),
            BinaryOperator::Add,
            Expr::binary(num(2.0), BinaryOperator::Multiply, num(3.0))
        )
    );
}

#[test]
fn test_subtraction_groups_left() {
    let expr = parse_expression("8 - 4 - 2").expect("Parsing failed");
    assert_eq!(
        expr,
        Expr::binary(
            Expr::binary(num(8.0), BinaryOperator::Subtract, num(4.0)),
            BinaryOperator::Subtract,
            num(2.0)
        )
    );
}

#[test]
fn test_assignment_groups_right() {
    let expr = parse_expression("a = b = 3").expect("Parsing failed");
    assert_eq!(
        expr,
        Expr::Assign {
            name: "a".to_string(),
            value: Box::new(Expr::Assign {
                name: "b".to_string(),
                value: Box::new(num(3.0)),
            }),
        }
    );
}

#[test]
fn test_dangling_else_binds_to_nearest_if() {
    let program = parse("if (a) if (b) c; else d;").expect("Parsing failed");
    let expected = Stmt::If {
        condition: var("a"),
        then_branch: Box::new(Stmt::If {
            condition: var("b"),
            then_branch: Box::new(Stmt::Expression(var("c"))),
            else_branch: Some(Box::new(Stmt::Expression(var("d")))),
        }),
        else_branch: None,
    };
    assert_eq!(program.declarations, vec![expected]);
}

#[test]
fn test_keyword_prefix_lexes_as_identifier() {
    let program = parse("var classroom = 1;").expect("Parsing failed");
    assert_eq!(
        program.declarations,
        vec![Stmt::Var {
            name: "classroom".to_string(),
            initializer: Some(num(1.0)),
        }]
    );
}

#[test]
fn test_empty_for_uses_defaults() {
    let program = parse("for (;;) { print 1; }").expect("Parsing failed");
    let expected = Stmt::For {
        initializer: None,
        condition: Expr::Literal(Literal::Bool(true)),
        increment: None,
        body: Box::new(Stmt::Block(vec![Stmt::Print(num(1.0))])),
    };
    assert_eq!(program.declarations, vec![expected]);
}

#[test]
fn test_invalid_assignment_target_is_syntax_error() {
    let result = parse("1 + 2 = 3;");
    match result {
        Err(ParseError::SyntaxError { message, span }) => {
            assert!(message.contains("invalid assignment target"), "{}", message);
            assert_eq!((span.line, span.column), (1, 7));
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_unterminated_string_is_lex_error() {
    let result = parse("var s = \"abc");
    match result {
        Err(ParseError::LexError { message, span }) => {
            assert!(message.contains("unterminated string"), "{}", message);
            assert_eq!((span.line, span.column), (1, 9));
        }
        other => panic!("Expected lex error, got {:?}", other),
    }
}

#[test]
fn test_unterminated_block_is_syntax_error() {
    let result = parse("{ print 1;");
    match result {
        Err(ParseError::SyntaxError { message, span }) => {
            assert!(message.contains("unclosed '{'"), "{}", message);
            assert_eq!((span.line, span.column), (1, 1));
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_lex_error_preempts_earlier_syntax_error() {
    let err = parse("var = 1;\nprint $;").unwrap_err();
    assert!(err.is_lex_error(), "{}", err);
    assert_eq!(err.span().line, 2);
}

#[test]
fn test_error_display() {
    let err = parse("print 1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Syntax error at line 1, column 8: expected ';' after value, found end of input"
    );
}

#[test]
fn test_sample_program_parses() {
    let program = parse(SAMPLE).expect("Parsing failed");
    assert_eq!(program.declarations.len(), 8);
    assert!(matches!(
        &program.declarations[1],
        Stmt::Class { name, superclass: Some(parent), methods }
            if name == "Dog" && parent == "Animal" && methods.len() == 2
    ));
}

#[test]
fn test_print_then_parse_is_structurally_identical() {
    let program = parse(SAMPLE).expect("Parsing failed");
    let printed = program.to_string();
    let reparsed = parse(&printed).expect("Reparsing printed source failed");
    assert_eq!(program, reparsed, "printed source:\n{}", printed);
}

#[test]
fn test_desugared_for_keeps_evaluation_order() {
    let program = parse("for (var i = 0; i < 2; i = i + 1) print i;").expect("Parsing failed");
    let desugared = program.declarations[0].clone().desugar_for();
    let expected = parse("{ var i = 0; while (i < 2) { print i; i = i + 1; } }")
        .expect("Parsing failed");
    assert_eq!(vec![desugared], expected.declarations);
}
