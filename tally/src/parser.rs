//! Recursive-descent parser for calculator expressions
//!
//! Precedence, loosest first: ternary, `||`, `&&`, equality, comparison,
//! additive, multiplicative, unary, power. Power is right-associative and
//! binds tighter than a leading minus, so `-2 ^ 2` is `-4`.

use crate::ast::{BinOp, Expr, LogicalOp, UnaryOp};
use crate::lexer::{tokenize, Token, TokenKind};
use tally_core::TallyError;

/// Height limit for the tree: parentheses, calls, unary chains and
/// operator chains all count
const MAX_DEPTH: usize = 200;

/// Namespace that qualifies library functions and constants
const MATH_NAMESPACE: &str = "Math";

/// Parse a complete expression
pub fn parse_expr(input: &str) -> Result<Expr, TallyError> {
    parse_tokens(input).map_err(|e| e.with_expression(input))
}

fn parse_tokens(input: &str) -> Result<Expr, TallyError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let expr = parser.parse_ternary()?;
    match parser.peek() {
        TokenKind::Eof => Ok(expr),
        other => Err(parser.error(format!("unexpected {}", describe(other)))),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn position(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].pos
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), TallyError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            let found = describe(self.peek());
            Err(self.error(format!("expected {}, found {}", describe(&kind), found)))
        }
    }

    fn error(&self, details: String) -> TallyError {
        TallyError::parse_error(details).at(self.position())
    }

    fn enter(&mut self) -> Result<(), TallyError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("expression nested too deeply".to_string()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_ternary(&mut self) -> Result<Expr, TallyError> {
        let condition = self.parse_or()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        self.enter()?;
        let then = self.parse_ternary()?;
        self.expect(TokenKind::Colon)?;
        let otherwise = self.parse_ternary()?;
        self.leave();
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, TallyError> {
        let depth = self.depth;
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            self.enter()?;
            let right = self.parse_and()?;
            left = Expr::Logical(Box::new(left), LogicalOp::Or, Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, TallyError> {
        let depth = self.depth;
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) {
            self.enter()?;
            let right = self.parse_equality()?;
            left = Expr::Logical(Box::new(left), LogicalOp::And, Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, TallyError> {
        let depth = self.depth;
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                TokenKind::StrictEq => BinOp::StrictEq,
                TokenKind::StrictNotEq => BinOp::StrictNe,
                _ => {
                    self.depth = depth;
                    return Ok(left);
                }
            };
            self.advance();
            self.enter()?;
            let right = self.parse_comparison()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, TallyError> {
        let depth = self.depth;
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => {
                    self.depth = depth;
                    return Ok(left);
                }
            };
            self.advance();
            self.enter()?;
            let right = self.parse_additive()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, TallyError> {
        let depth = self.depth;
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => {
                    self.depth = depth;
                    return Ok(left);
                }
            };
            self.advance();
            self.enter()?;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, TallyError> {
        let depth = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => {
                    self.depth = depth;
                    return Ok(left);
                }
            };
            self.advance();
            self.enter()?;
            let right = self.parse_unary()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, TallyError> {
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_power(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_power(&mut self) -> Result<Expr, TallyError> {
        let base = self.parse_primary()?;
        if !self.eat(&TokenKind::Power) {
            return Ok(base);
        }
        // Right operand may carry its own sign: `2 ^ -1`
        self.enter()?;
        let exponent = self.parse_unary()?;
        self.leave();
        Ok(Expr::Binary(Box::new(base), BinOp::Pow, Box::new(exponent)))
    }

    fn parse_primary(&mut self) -> Result<Expr, TallyError> {
        let start = self.position();
        match self.advance() {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::LParen => {
                self.enter()?;
                let inner = self.parse_ternary()?;
                self.expect(TokenKind::RParen)?;
                self.leave();
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if self.eat(&TokenKind::Dot) {
                    return self.parse_qualified(name, start);
                }
                if self.peek() == &TokenKind::LParen {
                    let args = self.parse_args()?;
                    return Ok(Expr::Call { name, qualified: false, args });
                }
                Ok(Expr::Variable(name))
            }
            other => Err(TallyError::parse_error(format!("unexpected {}", describe(&other))).at(start)),
        }
    }

    /// `Math.name(args)` or `Math.NAME`; no other member access exists
    fn parse_qualified(&mut self, namespace: String, start: usize) -> Result<Expr, TallyError> {
        let member = match self.advance() {
            TokenKind::Ident(member) => member,
            other => return Err(self.error(format!("expected name after '.', found {}", describe(&other)))),
        };
        if namespace != MATH_NAMESPACE {
            return Err(TallyError::parse_error(format!("member access '{}.{}' is not allowed", namespace, member))
                .at(start)
                .with_suggestion("Only Math.* functions and constants can be qualified"));
        }
        if self.peek() == &TokenKind::LParen {
            let args = self.parse_args()?;
            return Ok(Expr::Call { name: member, qualified: true, args });
        }
        Ok(Expr::Constant(member))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, TallyError> {
        self.expect(TokenKind::LParen)?;
        self.enter()?;
        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                args.push(self.parse_ternary()?);
                if self.eat(&TokenKind::RParen) {
                    break;
                }
                self.expect(TokenKind::Comma)?;
            }
        }
        self.leave();
        Ok(args)
    }
}

fn describe(kind: &TokenKind) -> String {
    let text = match kind {
        TokenKind::Number(n) => return format!("number {}", n),
        TokenKind::Ident(name) => return format!("identifier '{}'", name),
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        TokenKind::Power => "^",
        TokenKind::Lt => "<",
        TokenKind::Le => "<=",
        TokenKind::Gt => ">",
        TokenKind::Ge => ">=",
        TokenKind::EqEq => "==",
        TokenKind::NotEq => "!=",
        TokenKind::StrictEq => "===",
        TokenKind::StrictNotEq => "!==",
        TokenKind::AndAnd => "&&",
        TokenKind::OrOr => "||",
        TokenKind::Bang => "!",
        TokenKind::Question => "?",
        TokenKind::Colon => ":",
        TokenKind::LParen => "(",
        TokenKind::RParen => ")",
        TokenKind::Comma => ",",
        TokenKind::Dot => ".",
        TokenKind::Eof => return "end of expression".to_string(),
    };
    format!("'{}'", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Number(n))
    }

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Variable(name.to_string()))
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let expr = parse_expr("a + b * 2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(var("a"), BinOp::Add, Box::new(Expr::Binary(var("b"), BinOp::Mul, num(2.0))))
        );
    }

    #[test]
    fn test_power_right_associative() {
        let expr = parse_expr("2 ^ 3 ** 2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(num(2.0), BinOp::Pow, Box::new(Expr::Binary(num(3.0), BinOp::Pow, num(2.0))))
        );
    }

    #[test]
    fn test_unary_minus_below_power() {
        let expr = parse_expr("-2 ^ 2").unwrap();
        assert_eq!(
            expr,
            Expr::Unary(UnaryOp::Neg, Box::new(Expr::Binary(num(2.0), BinOp::Pow, num(2.0))))
        );
        let expr = parse_expr("2 ^ -1").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(num(2.0), BinOp::Pow, Box::new(Expr::Unary(UnaryOp::Neg, num(1.0))))
        );
    }

    #[test]
    fn test_ternary_and_logic() {
        let expr = parse_expr("a > 0 && b ? a : -a").unwrap();
        match expr {
            Expr::Ternary { condition, .. } => {
                assert!(matches!(*condition, Expr::Logical(_, LogicalOp::And, _)));
            }
            other => panic!("expected ternary, got {:?}", other),
        }
    }

    #[test]
    fn test_calls() {
        assert_eq!(
            parse_expr("max(a, 0)").unwrap(),
            Expr::Call { name: "max".into(), qualified: false, args: vec![*var("a"), Expr::Number(0.0)] }
        );
        assert_eq!(
            parse_expr("Math.round(x)").unwrap(),
            Expr::Call { name: "round".into(), qualified: true, args: vec![*var("x")] }
        );
        assert_eq!(parse_expr("Math.PI").unwrap(), Expr::Constant("PI".into()));
        assert_eq!(
            parse_expr("now()").unwrap(),
            Expr::Call { name: "now".into(), qualified: false, args: vec![] }
        );
    }

    #[test]
    fn test_rejects_member_access() {
        let err = parse_expr("window.alert").unwrap_err();
        assert!(err.message.contains("window.alert"));
        assert!(parse_expr("a.b(1)").is_err());
        assert!(parse_expr("Math.").is_err());
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse_expr("").is_err());
        assert!(parse_expr("1 +").is_err());
        assert!(parse_expr("(1 + 2").is_err());
        assert!(parse_expr("1 2").is_err());
        assert!(parse_expr("a ? b").is_err());
        assert!(parse_expr("f(1,)").is_err());
        let err = parse_expr("1 + )").unwrap_err();
        let ctx = err.context.unwrap();
        assert_eq!(ctx.position, Some(4));
        assert_eq!(ctx.expression.as_deref(), Some("1 + )"));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert!(parse_expr(&deep).is_err());
        let ok = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse_expr(&ok).unwrap(), Expr::Number(1.0));
    }

    #[test]
    fn test_long_operator_chains_rejected() {
        for op in ["+", "*", "&&", "||", "<", "==="] {
            let flat = format!("1{}", format!(" {} 1", op).repeat(20_000));
            let err = parse_expr(&flat).unwrap_err();
            assert_eq!(err.code, tally_core::codes::PARSE_ERROR, "{}", op);
        }
        let mixed = format!("1{}", " + 2 * 3".repeat(20_000));
        assert!(parse_expr(&mixed).is_err());
    }

    #[test]
    fn test_moderate_chains_accepted() {
        let chain = format!("a{}", " + a".repeat(100));
        assert_eq!(parse_expr(&chain).unwrap().identifiers().len(), 1);
        let nested = format!("{}x{}", "(x + ".repeat(40), ")".repeat(40));
        assert!(parse_expr(&nested).is_ok());
    }

    #[test]
    fn test_identifiers_collected() {
        let expr = parse_expr("principal * pow(1 + rate, years) + Math.PI * rate").unwrap();
        let names: Vec<String> = expr.identifiers().into_iter().collect();
        assert_eq!(names, vec!["principal", "rate", "years"]);
    }
}
