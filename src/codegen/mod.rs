use std::io::Write;

use crate::parser::{
    BinaryOp, BlockItem, CompoundStatement, Constant, Declaration, Expr, ExternalDeclaration,
    FunctionDefinition, Statement, TranslationUnit, UnaryOp,
};
use crate::CompileError;

/// Whether lowering an expression left a value on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Pushed,
    Nothing,
}

struct Generator<'w, W: Write> {
    out: &'w mut W,
    next_label: usize,
}

/// Streams assembly for `unit`. On error the writer holds partial output.
pub fn generate<W: Write>(unit: &TranslationUnit, out: &mut W) -> Result<(), CompileError> {
    let mut generator = Generator { out, next_label: 0 };
    generator.translation_unit(unit)?;
    generator.out.flush()?;
    Ok(())
}

fn unsupported(message: impl Into<String>) -> CompileError {
    CompileError::Codegen {
        message: message.into(),
    }
}

impl<'w, W: Write> Generator<'w, W> {
    fn label(&mut self) -> usize {
        let label = self.next_label;
        self.next_label += 1;
        label
    }

    fn translation_unit(&mut self, unit: &TranslationUnit) -> Result<(), CompileError> {
        writeln!(self.out, "    .text")?;
        writeln!(self.out, "    .globl main")?;

        for item in &unit.items {
            match item {
                ExternalDeclaration::Function(function) => self.function(function)?,
                ExternalDeclaration::Declaration(_) => {
                    log::trace!("skipping file-scope declaration");
                }
            }
        }
        Ok(())
    }

    fn function(&mut self, function: &FunctionDefinition) -> Result<(), CompileError> {
        let name = function.name();
        log::debug!("lowering function {name}");

        writeln!(self.out, "{name}:")?;
        self.compound(&function.body)
    }

    fn compound(&mut self, block: &CompoundStatement) -> Result<(), CompileError> {
        for item in &block.items {
            match item {
                BlockItem::Declaration(decl) => self.local_declaration(decl)?,
                BlockItem::Statement(stmt) => self.statement(stmt)?,
            }
        }
        Ok(())
    }

    fn local_declaration(&mut self, decl: &Declaration) -> Result<(), CompileError> {
        for init in &decl.declarators {
            let name = init.declarator.name().unwrap_or("<abstract>");
            if init.initializer.is_some() {
                return Err(unsupported(format!(
                    "initialized local variable `{name}` has no storage"
                )));
            }
            log::trace!("skipping local declaration of {name}");
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &Statement) -> Result<(), CompileError> {
        match stmt {
            Statement::Expression(None) => {}
            Statement::Expression(Some(expr)) => {
                if self.expr(expr)? == Value::Pushed {
                    writeln!(self.out, "    popq %rax")?;
                }
            }
            Statement::Compound(block) => self.compound(block)?,
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let label = self.label();
                self.branch_if_zero(condition, "if", &format!(".L.else.{label}"))?;
                self.statement(then_branch)?;
                writeln!(self.out, "    jmp .L.end.{label}")?;
                writeln!(self.out, ".L.else.{label}:")?;
                if let Some(else_branch) = else_branch {
                    self.statement(else_branch)?;
                }
                writeln!(self.out, ".L.end.{label}:")?;
            }
            Statement::While { condition, body } => {
                let label = self.label();
                writeln!(self.out, ".L.begin.{label}:")?;
                self.branch_if_zero(condition, "while", &format!(".L.end.{label}"))?;
                self.statement(body)?;
                writeln!(self.out, "    jmp .L.begin.{label}")?;
                writeln!(self.out, ".L.end.{label}:")?;
            }
            Statement::Return(value) => {
                if let Some(expr) = value {
                    match self.expr(expr)? {
                        Value::Pushed => writeln!(self.out, "    popq %rax")?,
                        Value::Nothing => log::warn!("returning an expression with no value"),
                    }
                }
                writeln!(self.out, "    ret")?;
            }
        }
        Ok(())
    }

    /// Evaluates `condition` and jumps to `target` when it is zero.
    fn branch_if_zero(&mut self, condition: &Expr, context: &str, target: &str) -> Result<(), CompileError> {
        self.value(condition, context)?;
        writeln!(self.out, "    popq %rax")?;
        writeln!(self.out, "    cmpq $0, %rax")?;
        writeln!(self.out, "    je {target}")?;
        Ok(())
    }

    /// Lowers an expression that must leave a value on the stack.
    fn value(&mut self, expr: &Expr, context: &str) -> Result<(), CompileError> {
        match self.expr(expr)? {
            Value::Pushed => Ok(()),
            Value::Nothing => Err(unsupported(format!(
                "operand of {context} produces no value"
            ))),
        }
    }

    fn push_immediate(&mut self, value: i64) -> Result<(), CompileError> {
        if i32::try_from(value).is_ok() {
            writeln!(self.out, "    pushq ${value}")?;
        } else {
            writeln!(self.out, "    movabsq ${value}, %rax")?;
            writeln!(self.out, "    pushq %rax")?;
        }
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Result<Value, CompileError> {
        match expr {
            Expr::Constant(Constant::Int(value) | Constant::Char(value)) => {
                self.push_immediate(*value)?;
                Ok(Value::Pushed)
            }
            Expr::Constant(Constant::Float(_) | Constant::Str(_)) => {
                log::trace!("skipping constant without data section: {expr:?}");
                Ok(Value::Nothing)
            }
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Plus => self.expr(operand),
                UnaryOp::Negate => {
                    self.value(operand, "unary '-'")?;
                    writeln!(self.out, "    popq %rax")?;
                    writeln!(self.out, "    negq %rax")?;
                    writeln!(self.out, "    pushq %rax")?;
                    Ok(Value::Pushed)
                }
                UnaryOp::PreIncrement | UnaryOp::PreDecrement => {
                    Err(unsupported("prefix increment/decrement needs an lvalue with storage"))
                }
                UnaryOp::AddressOf | UnaryOp::Deref | UnaryOp::BitwiseNot | UnaryOp::LogicalNot => {
                    log::trace!("skipping inert unary operator {op:?}");
                    Ok(Value::Nothing)
                }
            },
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                let label = self.label();
                self.branch_if_zero(condition, "'?:'", &format!(".L.else.{label}"))?;
                self.value(then_expr, "'?:'")?;
                writeln!(self.out, "    jmp .L.end.{label}")?;
                writeln!(self.out, ".L.else.{label}:")?;
                self.value(else_expr, "'?:'")?;
                writeln!(self.out, ".L.end.{label}:")?;
                Ok(Value::Pushed)
            }
            Expr::Sizeof(_) | Expr::Index { .. } | Expr::Member { .. } => {
                log::trace!("skipping inert expression");
                Ok(Value::Nothing)
            }
            Expr::Identifier(name) => Err(unsupported(format!(
                "identifier `{name}` has no storage"
            ))),
            Expr::Call { .. } => Err(unsupported("function calls are not supported")),
            Expr::Assign { .. } => Err(unsupported("assignment is not supported")),
            Expr::Postfix { .. } => {
                Err(unsupported("postfix increment/decrement needs an lvalue with storage"))
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, CompileError> {
        let (spelling, lowering) = match op {
            BinaryOp::Add => ("'+'", "addq %rcx, %rax"),
            BinaryOp::Subtract => ("'-'", "subq %rcx, %rax"),
            BinaryOp::Multiply => ("'*'", "imulq %rcx, %rax"),
            BinaryOp::Divide => ("'/'", "cqto\n    idivq %rcx"),
            BinaryOp::Modulo => ("'%'", "cqto\n    idivq %rcx\n    movq %rdx, %rax"),
            _ => {
                log::trace!("skipping inert binary operator {op:?}");
                return Ok(Value::Nothing);
            }
        };

        self.value(lhs, spelling)?;
        self.value(rhs, spelling)?;
        writeln!(self.out, "    popq %rcx")?;
        writeln!(self.out, "    popq %rax")?;
        writeln!(self.out, "    {lowering}")?;
        writeln!(self.out, "    pushq %rax")?;
        Ok(Value::Pushed)
    }
}
