//! Instruction decode.
//!
//! Decoding is deliberately deferred: the parser (see [`crate::parser`])
//! only produces trimmed instruction text and a label table. A slot's text
//! is decoded into an [`Instruction`] each time the node's program counter
//! lands on it in `RUN` mode, matching the lazy, re-parse-on-every-step
//! behavior of the original reference implementation this crate's grammar
//! is drawn from.

use crate::direction::Direction;
use crate::error::CoreError;
use crate::operand::Operand;

/// A fully decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// No effect. Also produced by `ADD NIL`.
    Nop,
    /// `MOV src, dst`.
    Mov { src: Operand, dst: Operand },
    /// `ADD operand`.
    Add(Operand),
    /// `SUB operand`.
    Sub(Operand),
    /// `NEG` — `acc := -acc`.
    Neg,
    /// `SAV` — `bak := acc`.
    Sav,
    /// `SWP` — exchange `acc` and `bak`.
    Swp,
    /// `JMP label` — unconditional jump.
    Jmp(String),
    /// `JEZ label` — jump if `acc == 0`.
    Jez(String),
    /// `JNZ label` — jump if `acc != 0`.
    Jnz(String),
    /// `JGZ label` — jump if `acc > 0`.
    Jgz(String),
    /// `JLZ label` — jump if `acc < 0`.
    Jlz(String),
    /// `JRO operand` — relative jump by a literal or `ACC`.
    Jro(Operand),
}

fn parse_operand(token: &str) -> Result<Operand, CoreError> {
    match token {
        "acc" => Ok(Operand::Acc),
        "nil" => Ok(Operand::Nil),
        "up" => Ok(Operand::Port(Direction::Up)),
        "right" => Ok(Operand::Port(Direction::Right)),
        "down" => Ok(Operand::Port(Direction::Down)),
        "left" => Ok(Operand::Port(Direction::Left)),
        "any" => Ok(Operand::Port(Direction::Any)),
        "last" => Ok(Operand::Port(Direction::Last)),
        _ => token
            .parse::<i32>()
            .map(Operand::Literal)
            .map_err(|_| CoreError::IllegalInstruction(token.to_string())),
    }
}

/// Decode one instruction-slot's trimmed, lowercased text.
///
/// # Errors
///
/// Returns [`CoreError::IllegalInstruction`] if `text` does not match any
/// form in the grammar (unknown opcode, wrong arity, or an operand shape
/// the opcode does not accept).
pub fn decode(text: &str) -> Result<Instruction, CoreError> {
    let illegal = || CoreError::IllegalInstruction(text.to_string());

    let normalized = text.replace(',', " ");
    let mut tokens = normalized.split_whitespace();
    let opcode = tokens.next().ok_or_else(illegal)?;
    let rest: Vec<&str> = tokens.collect();

    match opcode {
        "nop" if rest.is_empty() => Ok(Instruction::Nop),

        "mov" => {
            let [src_tok, dst_tok] = rest.as_slice() else {
                return Err(illegal());
            };
            let src = parse_operand(src_tok)?;
            let dst = parse_operand(dst_tok)?;
            match (src, dst) {
                // Assigning to a literal, or reading from NIL, is never valid.
                (_, Operand::Literal(_)) | (Operand::Nil, _) => Err(illegal()),
                (Operand::Literal(_), _) | (Operand::Acc, _) | (Operand::Port(_), _) => {
                    Ok(Instruction::Mov { src, dst })
                }
            }
        }

        "add" => {
            let [tok] = rest.as_slice() else {
                return Err(illegal());
            };
            let operand = parse_operand(tok)?;
            match operand {
                Operand::Nil => Ok(Instruction::Nop),
                Operand::Literal(_) | Operand::Acc | Operand::Port(_) => {
                    Ok(Instruction::Add(operand))
                }
            }
        }

        "sub" => {
            let [tok] = rest.as_slice() else {
                return Err(illegal());
            };
            let operand = parse_operand(tok)?;
            match operand {
                Operand::Literal(_) | Operand::Acc | Operand::Port(_) => {
                    Ok(Instruction::Sub(operand))
                }
                Operand::Nil => Err(illegal()),
            }
        }

        "neg" if rest.is_empty() => Ok(Instruction::Neg),
        "sav" if rest.is_empty() => Ok(Instruction::Sav),
        "swp" if rest.is_empty() => Ok(Instruction::Swp),

        "jmp" | "jez" | "jnz" | "jgz" | "jlz" => {
            let [label] = rest.as_slice() else {
                return Err(illegal());
            };
            let label = (*label).to_string();
            Ok(match opcode {
                "jmp" => Instruction::Jmp(label),
                "jez" => Instruction::Jez(label),
                "jnz" => Instruction::Jnz(label),
                "jgz" => Instruction::Jgz(label),
                _ => Instruction::Jlz(label),
            })
        }

        "jro" => {
            let [tok] = rest.as_slice() else {
                return Err(illegal());
            };
            let operand = parse_operand(tok)?;
            match operand {
                Operand::Literal(_) | Operand::Acc => Ok(Instruction::Jro(operand)),
                Operand::Port(_) | Operand::Nil => Err(illegal()),
            }
        }

        _ => Err(illegal()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_nop_variants() {
        assert_eq!(decode("nop").unwrap(), Instruction::Nop);
        assert_eq!(decode("add nil").unwrap(), Instruction::Nop);
    }

    #[test]
    fn decodes_mov_comma_and_space_identically() {
        assert_eq!(decode("mov acc, right").unwrap(), decode("mov acc right").unwrap());
    }

    #[test]
    fn decodes_mov_literal_to_acc() {
        assert_eq!(
            decode("mov 12, acc").unwrap(),
            Instruction::Mov { src: Operand::Literal(12), dst: Operand::Acc }
        );
    }

    #[test]
    fn decodes_mov_port_cascade() {
        assert_eq!(
            decode("mov left, right").unwrap(),
            Instruction::Mov {
                src: Operand::Port(Direction::Left),
                dst: Operand::Port(Direction::Right)
            }
        );
    }

    #[test]
    fn rejects_mov_to_literal() {
        assert!(decode("mov acc, 5").is_err());
    }

    #[test]
    fn rejects_mov_from_nil() {
        assert!(decode("mov nil, acc").is_err());
    }

    #[test]
    fn add_sub_accept_acc_operand() {
        assert_eq!(decode("add acc").unwrap(), Instruction::Add(Operand::Acc));
        assert_eq!(decode("sub acc").unwrap(), Instruction::Sub(Operand::Acc));
    }

    #[test]
    fn sub_rejects_nil() {
        assert!(decode("sub nil").is_err());
    }

    #[test]
    fn jro_accepts_literal_or_acc_not_port() {
        assert!(decode("jro 3").is_ok());
        assert!(decode("jro acc").is_ok());
        assert!(decode("jro left").is_err());
    }

    #[test]
    fn rejects_unknown_opcode() {
        assert!(decode("frobnicate acc").is_err());
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(decode("add").is_err());
        assert!(decode("add 1 2").is_err());
    }
}
