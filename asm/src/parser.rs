//! Converts a pest parse tree for `grammar.pest` into the `ast` types.

use crate::ast::{Directive, Expr, Line, LineBody, Operand, SourceMnemonic};
use crate::error::{Error, ErrorKind, LexError};
use crate::literal::parse_number;
use crate::pass2::expand_ds;
use cpu::register::RegisterId;
use pest::iterators::Pair;
use pest::Parser;
use util::EnumFromStr;

#[derive(pest_derive::Parser)]
#[grammar = "grammar.pest"]
pub struct AsmParser;

fn line_of(pair: &Pair<Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

fn process_expr(pair: Pair<Rule>, line: usize) -> Result<Expr, Error> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::number => {
            let text = inner.as_str();
            let value = parse_number(text).map_err(|e| Error::new(ErrorKind::Lex(e), line))?;
            Ok(Expr::Literal(value))
        }
        Rule::identifier => Ok(Expr::Symbol(inner.as_str().to_string())),
        other => unreachable!("expr cannot contain {:?}", other),
    }
}

fn process_register(pair: Pair<Rule>, line: usize) -> Result<RegisterId, Error> {
    let text = pair.as_str().to_ascii_uppercase();
    RegisterId::from_str(&text)
        .map_err(|_| Error::new(ErrorKind::Lex(LexError::MalformedOperand(text)), line))
}

fn process_operand(pair: Pair<Rule>, line: usize) -> Result<Operand, Error> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::immediate => {
            let expr = process_expr(inner.into_inner().next().unwrap(), line)?;
            Ok(Operand::Immediate(expr))
        }
        Rule::indexed => {
            let mut parts = inner.into_inner();
            let register = process_register(parts.next().unwrap(), line)?;
            let offset = match parts.next() {
                Some(sign_pair) => {
                    let expr = process_expr(parts.next().unwrap(), line)?;
                    if sign_pair.as_str() == "-" {
                        Expr::Negate(Box::new(expr))
                    } else {
                        expr
                    }
                }
                None => Expr::Literal(0),
            };
            Ok(Operand::Indexed(register, offset))
        }
        Rule::direct => {
            let expr = process_expr(inner.into_inner().next().unwrap(), line)?;
            Ok(Operand::Direct(expr))
        }
        Rule::register => Ok(Operand::Register(process_register(inner, line)?)),
        Rule::expr => Ok(Operand::Bare(process_expr(inner, line)?)),
        other => unreachable!("operand cannot contain {:?}", other),
    }
}

fn process_instruction(pair: Pair<Rule>, line: usize) -> Result<LineBody, Error> {
    let mut parts = pair.into_inner();
    let mnemonic_pair = parts.next().unwrap();
    let name = mnemonic_pair.as_str();
    let mnemonic = SourceMnemonic::from_name(name)
        .ok_or_else(|| Error::new(ErrorKind::Lex(LexError::UnknownMnemonic(name.to_string())), line))?;
    let mut operands = Vec::new();
    for operand_pair in parts {
        operands.push(process_operand(operand_pair, line)?);
    }
    Ok(LineBody::Instruction(mnemonic, operands))
}

fn process_directive(pair: Pair<Rule>, line: usize) -> Result<LineBody, Error> {
    let inner = pair.into_inner().next().unwrap();
    let directive = match inner.as_rule() {
        Rule::directive_org => {
            let expr = process_expr(inner.into_inner().next().unwrap(), line)?;
            Directive::Org(expr)
        }
        Rule::directive_equ => {
            let mut parts = inner.into_inner();
            let name = parts.next().unwrap().as_str().to_string();
            let expr = process_expr(parts.next().unwrap(), line)?;
            Directive::Equ(name, expr)
        }
        Rule::directive_db => {
            let exprs = inner
                .into_inner()
                .map(|p| process_expr(p, line))
                .collect::<Result<Vec<_>, _>>()?;
            Directive::Db(exprs)
        }
        Rule::directive_ds => {
            let string_pair = inner.into_inner().next().unwrap();
            let inner_text = string_pair.into_inner().next().unwrap().as_str();
            Directive::Ds(expand_ds(inner_text))
        }
        other => unreachable!("directive cannot contain {:?}", other),
    };
    Ok(LineBody::Directive(directive))
}

fn process_statement(pair: Pair<Rule>) -> Result<Line, Error> {
    let line_no = line_of(&pair);
    let text = pair.as_str().to_string();
    let mut label = None;
    let mut body = LineBody::Empty;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::label => {
                let ident = part.into_inner().next().unwrap();
                label = Some(ident.as_str().to_string());
            }
            Rule::directive => body = process_directive(part, line_no)?,
            Rule::instruction => body = process_instruction(part, line_no)?,
            other => unreachable!("statement cannot contain {:?}", other),
        }
    }

    Ok(Line {
        line_no,
        label,
        body,
        text,
    })
}

/// Parses a whole source file into its sequence of lines, ready for pass 1.
pub fn parse_program(source: &str) -> Result<Vec<Line>, Error> {
    let mut pairs = AsmParser::parse(Rule::program, source)?;
    let program = pairs.next().unwrap();
    let mut lines = Vec::new();
    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::statement => lines.push(process_statement(pair)?),
            Rule::EOI => {}
            other => unreachable!("program cannot contain {:?}", other),
        }
    }
    Ok(lines)
}
