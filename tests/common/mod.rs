//! Interpreter for the instruction subset the code generator emits, so tests
//! can check what generated code computes without an assembler.

use std::collections::HashMap;

const STEP_LIMIT: usize = 100_000;

#[derive(Default)]
struct Machine {
    rax: i64,
    rcx: i64,
    rdx: i64,
    zero: bool,
    stack: Vec<i64>,
}

impl Machine {
    fn reg(&mut self, name: &str) -> &mut i64 {
        match name {
            "%rax" => &mut self.rax,
            "%rcx" => &mut self.rcx,
            "%rdx" => &mut self.rdx,
            other => panic!("unknown register {other}"),
        }
    }

    fn pop(&mut self) -> i64 {
        self.stack.pop().expect("pop from empty evaluation stack")
    }
}

fn immediate(operand: &str) -> i64 {
    operand
        .strip_prefix('$')
        .and_then(|n| n.parse().ok())
        .unwrap_or_else(|| panic!("bad immediate {operand}"))
}

/// Runs `main` and returns `%rax` at its `ret`.
pub fn run(asm: &str) -> i64 {
    run_function(asm, "main")
}

pub fn run_function(asm: &str, entry: &str) -> i64 {
    let lines: Vec<&str> = asm.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let labels: HashMap<&str, usize> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| line.strip_suffix(':').map(|name| (name, i)))
        .collect();

    let mut m = Machine::default();
    let mut pc = *labels
        .get(entry)
        .unwrap_or_else(|| panic!("no label {entry} in:\n{asm}"));

    for _ in 0..STEP_LIMIT {
        let Some(line) = lines.get(pc) else {
            panic!("fell off the end of {entry}");
        };
        pc += 1;

        if line.ends_with(':') || line.starts_with('.') {
            continue;
        }

        let (mnemonic, operands) = line.split_once(' ').unwrap_or((line, ""));
        let operands: Vec<&str> = operands.split(", ").map(str::trim).collect();

        match (mnemonic, operands.as_slice()) {
            ("pushq", [src]) if src.starts_with('$') => m.stack.push(immediate(src)),
            ("pushq", [reg]) => {
                let value = *m.reg(reg);
                m.stack.push(value);
            }
            ("popq", [reg]) => {
                let value = m.pop();
                *m.reg(reg) = value;
            }
            ("movabsq", [src, dst]) => *m.reg(dst) = immediate(src),
            ("movq", [src, dst]) => {
                let value = *m.reg(src);
                *m.reg(dst) = value;
            }
            ("addq", ["%rcx", "%rax"]) => m.rax = m.rax.wrapping_add(m.rcx),
            ("subq", ["%rcx", "%rax"]) => m.rax = m.rax.wrapping_sub(m.rcx),
            ("imulq", ["%rcx", "%rax"]) => m.rax = m.rax.wrapping_mul(m.rcx),
            ("cqto", _) => m.rdx = if m.rax < 0 { -1 } else { 0 },
            ("idivq", ["%rcx"]) => {
                let (quotient, remainder) = (m.rax.wrapping_div(m.rcx), m.rax.wrapping_rem(m.rcx));
                m.rax = quotient;
                m.rdx = remainder;
            }
            ("negq", ["%rax"]) => m.rax = m.rax.wrapping_neg(),
            ("cmpq", ["$0", "%rax"]) => m.zero = m.rax == 0,
            ("je", [label]) => {
                if m.zero {
                    pc = labels[label];
                }
            }
            ("jmp", [label]) => pc = labels[label],
            ("ret", _) => {
                assert!(m.stack.is_empty(), "unbalanced stack at ret: {:?}", m.stack);
                return m.rax;
            }
            _ => panic!("unsupported instruction: {line}"),
        }
    }

    panic!("step limit exceeded");
}
