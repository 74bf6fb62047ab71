//! Recursive-descent compiler from Jack source to VM commands.
//!
//! No syntax tree is built: each grammar production is a method and VM code
//! is emitted while the descent runs. Identifier-led terms are the one spot
//! the grammar is not LL(0); there the tokenizer's single-token lookahead
//! decides between a plain variable, an array access and a subroutine call.

use std::io::Write;

use crate::error::JackError;
use crate::symbol_table::{Kind, SymbolTable};
use crate::token::{Keyword, Token};
use crate::tokenizer::Tokenizer;
use crate::vm_writer::{Command, Segment, VmWriter};

pub struct CompilationEngine<W: Write> {
    tokenizer: Tokenizer,
    writer: VmWriter<W>,
    table: SymbolTable,
    class_name: String,
    current: Option<Token>,
    label_counter: usize,
}

impl<W: Write> CompilationEngine<W> {
    /// Compiles one class (one `.jack` file) into the given sink.
    pub fn compile(source: &str, out: W) -> Result<W, JackError> {
        let mut tokenizer = Tokenizer::new(source);
        let current = tokenizer.next_token()?;
        let mut engine = Self {
            tokenizer,
            writer: VmWriter::new(out),
            table: SymbolTable::new(),
            class_name: String::new(),
            current,
            label_counter: 0,
        };
        engine.compile_class()?;
        Ok(engine.writer.into_inner())
    }

    // ---- token plumbing -------------------------------------------------

    fn current(&self) -> Result<&Token, JackError> {
        self.current.as_ref().ok_or(JackError::UnexpectedEof)
    }

    fn advance(&mut self) -> Result<(), JackError> {
        self.current = self.tokenizer.next_token()?;
        Ok(())
    }

    fn unexpected(&self, expected: &'static str) -> JackError {
        match &self.current {
            Some(token) => JackError::UnexpectedToken {
                found: token.to_string(),
                expected,
                line: self.tokenizer.line(),
            },
            None => JackError::UnexpectedEof,
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), JackError> {
        match self.current()? {
            Token::Symbol(c) if *c == symbol => self.advance(),
            _ => Err(self.unexpected(match symbol {
                '{' => "`{`",
                '}' => "`}`",
                '(' => "`(`",
                ')' => "`)`",
                '[' => "`[`",
                ']' => "`]`",
                ';' => "`;`",
                '=' => "`=`",
                '.' => "`.`",
                _ => "a symbol",
            })),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), JackError> {
        match self.current()? {
            Token::Keyword(k) if *k == keyword => self.advance(),
            _ => Err(self.unexpected("a keyword")),
        }
    }

    fn expect_identifier(&mut self) -> Result<String, JackError> {
        match self.current()? {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn current_is_symbol(&self, symbol: char) -> bool {
        matches!(&self.current, Some(Token::Symbol(c)) if *c == symbol)
    }

    /// Looks up a variable, with the unresolved-identifier error ready.
    fn resolve_variable(&self, name: &str) -> Result<(Segment, u16), JackError> {
        self.table
            .resolve(name)
            .map(|entry| (entry.kind.segment(), entry.index))
            .ok_or_else(|| JackError::UnresolvedSymbol {
                name: name.to_string(),
                line: self.tokenizer.line(),
            })
    }

    fn fresh_label(&mut self) -> usize {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    // ---- program structure ----------------------------------------------

    /// `class Name { classVarDec* subroutineDec* }`
    fn compile_class(&mut self) -> Result<(), JackError> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        while let Some(Token::Keyword(k @ (Keyword::Static | Keyword::Field))) = self.current {
            let kind = if k == Keyword::Static {
                Kind::Static
            } else {
                Kind::Field
            };
            self.compile_class_var_dec(kind)?;
        }

        while let Some(Token::Keyword(
            k @ (Keyword::Constructor | Keyword::Function | Keyword::Method),
        )) = self.current
        {
            self.compile_subroutine(k)?;
        }

        match self.current()? {
            Token::Symbol('}') => self.advance(),
            _ => Err(self.unexpected("`}`")),
        }
    }

    /// `('static' | 'field') type name (',' name)* ';'`
    fn compile_class_var_dec(&mut self, kind: Kind) -> Result<(), JackError> {
        self.advance()?; // static | field
        let ty = self.compile_type()?;

        let name = self.expect_identifier()?;
        self.table.define(&name, &ty, kind);
        while self.current_is_symbol(',') {
            self.advance()?;
            let name = self.expect_identifier()?;
            self.table.define(&name, &ty, kind);
        }
        self.expect_symbol(';')
    }

    /// `'int' | 'char' | 'boolean' | className`
    fn compile_type(&mut self) -> Result<String, JackError> {
        match self.current()? {
            Token::Keyword(k @ (Keyword::Int | Keyword::Char | Keyword::Boolean)) => {
                let ty = k.as_str().to_string();
                self.advance()?;
                Ok(ty)
            }
            Token::Identifier(name) => {
                let ty = name.clone();
                self.advance()?;
                Ok(ty)
            }
            _ => Err(self.unexpected("a type")),
        }
    }

    /// `('constructor' | 'function' | 'method') (type | 'void') name
    /// '(' parameterList ')' subroutineBody`
    fn compile_subroutine(&mut self, kind: Keyword) -> Result<(), JackError> {
        self.advance()?; // constructor | function | method

        // return type is not needed for code generation
        if let Some(Token::Keyword(Keyword::Void)) = self.current {
            self.advance()?;
        } else {
            self.compile_type()?;
        }
        let name = self.expect_identifier()?;

        self.table.start_subroutine();
        if kind == Keyword::Method {
            // the receiver is argument 0
            let class_name = self.class_name.clone();
            self.table.define("this", &class_name, Kind::Argument);
        }

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.compile_subroutine_body(kind, &name)
    }

    /// `((type name) (',' type name)*)?`
    fn compile_parameter_list(&mut self) -> Result<(), JackError> {
        if self.current_is_symbol(')') {
            return Ok(());
        }
        loop {
            let ty = self.compile_type()?;
            let name = self.expect_identifier()?;
            self.table.define(&name, &ty, Kind::Argument);

            if self.current_is_symbol(',') {
                self.advance()?;
            } else {
                return Ok(());
            }
        }
    }

    /// `'{' varDec* statements '}'`
    ///
    /// The `function` command is only emitted once all local declarations
    /// are in, because it carries the final local count.
    fn compile_subroutine_body(&mut self, kind: Keyword, name: &str) -> Result<(), JackError> {
        self.expect_symbol('{')?;

        while let Some(Token::Keyword(Keyword::Var)) = self.current {
            self.compile_var_dec()?;
        }

        let qualified = format!("{}.{name}", self.class_name);
        self.writer
            .write_function(&qualified, self.table.var_count(Kind::Var))?;

        match kind {
            Keyword::Method => {
                // align THIS with the receiver
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            Keyword::Constructor => {
                let fields = self.table.var_count(Kind::Field);
                self.writer.write_push(Segment::Constant, fields)?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')
    }

    /// `'var' type name (',' name)* ';'`
    fn compile_var_dec(&mut self) -> Result<(), JackError> {
        self.advance()?; // var
        let ty = self.compile_type()?;

        let name = self.expect_identifier()?;
        self.table.define(&name, &ty, Kind::Var);
        while self.current_is_symbol(',') {
            self.advance()?;
            let name = self.expect_identifier()?;
            self.table.define(&name, &ty, Kind::Var);
        }
        self.expect_symbol(';')
    }

    // ---- statements -----------------------------------------------------

    fn compile_statements(&mut self) -> Result<(), JackError> {
        loop {
            match self.current {
                Some(Token::Keyword(Keyword::Let)) => self.compile_let()?,
                Some(Token::Keyword(Keyword::If)) => self.compile_if()?,
                Some(Token::Keyword(Keyword::While)) => self.compile_while()?,
                Some(Token::Keyword(Keyword::Do)) => self.compile_do()?,
                Some(Token::Keyword(Keyword::Return)) => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    /// `'let' name ('[' expression ']')? '=' expression ';'`
    fn compile_let(&mut self) -> Result<(), JackError> {
        self.advance()?; // let
        let name = self.expect_identifier()?;
        let (segment, index) = self.resolve_variable(&name)?;

        if self.current_is_symbol('[') {
            // target address = base + index expression
            self.writer.write_push(segment, index)?;
            self.advance()?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.write_arithmetic(Command::Add)?;

            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;

            // THAT is bound only after the right-hand side has evaluated,
            // since that expression may itself go through pointer 1
            self.writer.write_pop(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::That, 0)
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;
            self.writer.write_pop(segment, index)
        }
    }

    /// `'if' '(' expression ')' '{' statements '}'
    /// ('else' '{' statements '}')?`
    fn compile_if(&mut self) -> Result<(), JackError> {
        let n = self.fresh_label();
        self.advance()?; // if
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&format!("IF_FALSE{n}"))?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        self.writer.write_goto(&format!("IF_TRUE{n}"))?;
        self.writer.write_label(&format!("IF_FALSE{n}"))?;

        if let Some(Token::Keyword(Keyword::Else)) = self.current {
            self.advance()?;
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
        }

        self.writer.write_label(&format!("IF_TRUE{n}"))
    }

    /// `'while' '(' expression ')' '{' statements '}'`
    fn compile_while(&mut self) -> Result<(), JackError> {
        let n = self.fresh_label();
        self.advance()?; // while

        self.writer.write_label(&format!("WHILE_EXP{n}"))?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&format!("WHILE_END{n}"))?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        self.writer.write_goto(&format!("WHILE_EXP{n}"))?;
        self.writer.write_label(&format!("WHILE_END{n}"))
    }

    /// `'do' subroutineCall ';'`; the ignored return value is drained.
    fn compile_do(&mut self) -> Result<(), JackError> {
        self.advance()?; // do
        let first = self.expect_identifier()?;
        self.compile_subroutine_call(&first)?;
        self.expect_symbol(';')?;
        self.writer.write_pop(Segment::Temp, 0)
    }

    /// `'return' expression? ';'`; void subroutines return constant 0.
    fn compile_return(&mut self) -> Result<(), JackError> {
        self.advance()?; // return
        if self.current_is_symbol(';') {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.writer.write_return()?;
        self.expect_symbol(';')
    }

    // ---- expressions ----------------------------------------------------

    /// `term (op term)*` with strict left-to-right evaluation and no
    /// operator precedence.
    fn compile_expression(&mut self) -> Result<(), JackError> {
        self.compile_term()?;

        while let Some(Token::Symbol(
            op @ ('+' | '-' | '*' | '/' | '&' | '|' | '<' | '>' | '='),
        )) = self.current
        {
            self.advance()?;
            self.compile_term()?;
            match op {
                '+' => self.writer.write_arithmetic(Command::Add)?,
                '-' => self.writer.write_arithmetic(Command::Sub)?,
                '&' => self.writer.write_arithmetic(Command::And)?,
                '|' => self.writer.write_arithmetic(Command::Or)?,
                '<' => self.writer.write_arithmetic(Command::Lt)?,
                '>' => self.writer.write_arithmetic(Command::Gt)?,
                '=' => self.writer.write_arithmetic(Command::Eq)?,
                '*' => self.writer.write_call("Math.multiply", 2)?,
                '/' => self.writer.write_call("Math.divide", 2)?,
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), JackError> {
        match self.current()? {
            Token::IntConst(value) => {
                let value = *value;
                self.writer.write_push(Segment::Constant, value)?;
                self.advance()
            }
            Token::StringConst(text) => {
                let text = text.clone();
                self.compile_string_constant(&text)?;
                self.advance()
            }
            Token::Keyword(Keyword::True) => {
                self.writer.write_push(Segment::Constant, 0)?;
                self.writer.write_arithmetic(Command::Not)?;
                self.advance()
            }
            Token::Keyword(Keyword::False | Keyword::Null) => {
                self.writer.write_push(Segment::Constant, 0)?;
                self.advance()
            }
            Token::Keyword(Keyword::This) => {
                self.writer.write_push(Segment::Pointer, 0)?;
                self.advance()
            }
            Token::Symbol('(') => {
                self.advance()?;
                self.compile_expression()?;
                self.expect_symbol(')')
            }
            Token::Symbol(op @ ('-' | '~' | '^' | '#')) => {
                let op = *op;
                self.advance()?;
                self.compile_term()?;
                self.writer.write_arithmetic(match op {
                    '-' => Command::Neg,
                    '~' => Command::Not,
                    // unary shifts map straight onto the VM shift commands
                    '^' => Command::ShiftLeft,
                    _ => Command::ShiftRight,
                })
            }
            Token::Identifier(name) => {
                let name = name.clone();
                // one token of lookahead picks the production
                let next = match self.tokenizer.peek()? {
                    Some(Token::Symbol(c)) => Some(*c),
                    _ => None,
                };
                match next {
                    Some('[') => {
                        let (segment, index) = self.resolve_variable(&name)?;
                        self.writer.write_push(segment, index)?;
                        self.advance()?; // name
                        self.advance()?; // [
                        self.compile_expression()?;
                        self.expect_symbol(']')?;
                        self.writer.write_arithmetic(Command::Add)?;
                        self.writer.write_pop(Segment::Pointer, 1)?;
                        self.writer.write_push(Segment::That, 0)
                    }
                    Some('(' | '.') => {
                        self.advance()?;
                        self.compile_subroutine_call(&name)
                    }
                    _ => {
                        let (segment, index) = self.resolve_variable(&name)?;
                        self.writer.write_push(segment, index)?;
                        self.advance()
                    }
                }
            }
            _ => Err(self.unexpected("a term")),
        }
    }

    /// Builds the string at runtime: `String.new` once, then one
    /// `appendChar` per character, each returning the string itself.
    fn compile_string_constant(&mut self, text: &str) -> Result<(), JackError> {
        let length = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        self.writer.write_push(Segment::Constant, length)?;
        self.writer.write_call("String.new", 1)?;
        for c in text.chars() {
            self.writer.write_push(Segment::Constant, c as u16)?;
            self.writer.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    /// Either `name '(' args ')'` (an implicit method call on `this`) or
    /// `recv '.' name '(' args ')'`. A receiver that resolves to a variable
    /// of any kind is pushed and its type names the callee class;
    /// otherwise the receiver is itself a class name.
    ///
    /// `first` has already been consumed; the current token is `(` or `.`.
    fn compile_subroutine_call(&mut self, first: &str) -> Result<(), JackError> {
        let (callee, receiver_args) = if self.current_is_symbol('.') {
            self.advance()?;
            let method = self.expect_identifier()?;
            let resolved = self
                .table
                .resolve(first)
                .map(|entry| (entry.kind.segment(), entry.index, entry.ty.clone()));
            match resolved {
                Some((segment, index, ty)) => {
                    self.writer.write_push(segment, index)?;
                    (format!("{ty}.{method}"), 1)
                }
                None => (format!("{first}.{method}"), 0),
            }
        } else {
            self.writer.write_push(Segment::Pointer, 0)?;
            (format!("{}.{first}", self.class_name), 1)
        };

        self.expect_symbol('(')?;
        let explicit_args = self.compile_expression_list()?;
        self.expect_symbol(')')?;

        self.writer.write_call(&callee, explicit_args + receiver_args)
    }

    /// `(expression (',' expression)*)?`; returns the expression count.
    fn compile_expression_list(&mut self) -> Result<u16, JackError> {
        let mut count = 0;
        if !self.current_is_symbol(')') {
            loop {
                self.compile_expression()?;
                count += 1;
                if self.current_is_symbol(',') {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }
        Ok(count)
    }
}
