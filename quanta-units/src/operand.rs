//! Operands of quantity arithmetic
//!
//! A closed union of the two things that can meet in an expression: a plain
//! number or a `Quantity`. Every operator matches exhaustively, so there is
//! no "anything else" branch to get wrong.

use serde::{Deserialize, Serialize};
use quanta_core::{QuantaError, Result};

use crate::Quantity;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Operand {
    Number(f64),
    Quantity(Quantity),
}

impl Operand {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            Operand::Quantity(_) => None,
        }
    }

    pub fn as_quantity(&self) -> Option<Quantity> {
        match self {
            Operand::Quantity(q) => Some(*q),
            Operand::Number(_) => None,
        }
    }

    pub fn is_quantity(&self) -> bool {
        matches!(self, Operand::Quantity(_))
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::Number(_) => "Number",
            Operand::Quantity(_) => "Quantity",
        }
    }

    // ========== Arithmetic ==========

    /// Apply a binary operator with `self` on the left
    pub fn apply(self, op: BinaryOp, rhs: impl Into<Operand>) -> Result<Operand> {
        let rhs = rhs.into();
        match op {
            BinaryOp::Add => self.add(rhs),
            BinaryOp::Sub => self.sub(rhs),
            BinaryOp::Mul => self.mul(rhs),
            BinaryOp::Div => self.div(rhs),
            BinaryOp::Pow => self.pow(rhs),
        }
    }

    pub fn add(self, rhs: impl Into<Operand>) -> Result<Operand> {
        match (self, rhs.into()) {
            (Operand::Number(a), Operand::Number(b)) => Ok(Operand::Number(a + b)),
            (Operand::Number(a), Operand::Quantity(q)) => {
                if a == 0.0 {
                    Ok(Operand::Quantity(q))
                } else {
                    Err(QuantaError::InvalidOperand {
                        op: "add",
                        operand: format!("the number {}", a),
                    })
                }
            }
            (Operand::Quantity(q), rhs) => q.add(rhs).map(Operand::Quantity),
        }
    }

    /// Only 0 may have a quantity subtracted from it: `0 - q == -q`
    pub fn sub(self, rhs: impl Into<Operand>) -> Result<Operand> {
        match (self, rhs.into()) {
            (Operand::Number(a), Operand::Number(b)) => Ok(Operand::Number(a - b)),
            (Operand::Number(a), Operand::Quantity(q)) => {
                if a == 0.0 {
                    Ok(Operand::Quantity(-q))
                } else {
                    Err(QuantaError::InvalidOperand {
                        op: "subtract a Quantity from",
                        operand: format!("the number {}", a),
                    })
                }
            }
            (Operand::Quantity(q), rhs) => q.sub(rhs).map(Operand::Quantity),
        }
    }

    pub fn mul(self, rhs: impl Into<Operand>) -> Result<Operand> {
        match (self, rhs.into()) {
            (Operand::Number(a), Operand::Number(b)) => Ok(Operand::Number(a * b)),
            (Operand::Number(a), Operand::Quantity(q)) => q.mul(a),
            (Operand::Quantity(q), rhs) => q.mul(rhs),
        }
    }

    pub fn div(self, rhs: impl Into<Operand>) -> Result<Operand> {
        match (self, rhs.into()) {
            (Operand::Number(a), Operand::Number(b)) => {
                if b == 0.0 {
                    return Err(QuantaError::DivideByZero);
                }
                Ok(Operand::Number(a / b))
            }
            (Operand::Number(a), Operand::Quantity(q)) => q.rdiv(a).map(Operand::Quantity),
            (Operand::Quantity(q), rhs) => q.div(rhs),
        }
    }

    pub fn pow(self, rhs: impl Into<Operand>) -> Result<Operand> {
        match (self, rhs.into()) {
            (Operand::Number(a), Operand::Number(b)) => Ok(Operand::Number(a.powf(b))),
            (Operand::Number(_), Operand::Quantity(q)) => Err(QuantaError::InvalidOperand {
                op: "raise a number to the power of",
                operand: format!("the Quantity {}", q),
            }),
            (Operand::Quantity(q), rhs) => q.pow(rhs),
        }
    }

    /// Sum starting from the additive identity 0
    pub fn sum<I>(items: I) -> Result<Operand>
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        items
            .into_iter()
            .try_fold(Operand::Number(0.0), |acc, item| acc.add(item))
    }
}

impl std::ops::Neg for Operand {
    type Output = Operand;

    fn neg(self) -> Operand {
        match self {
            Operand::Number(n) => Operand::Number(-n),
            Operand::Quantity(q) => Operand::Quantity(-q),
        }
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl From<i32> for Operand {
    fn from(n: i32) -> Self {
        Operand::Number(f64::from(n))
    }
}

impl From<Quantity> for Operand {
    fn from(q: Quantity) -> Self {
        Operand::Quantity(q)
    }
}

impl From<&Quantity> for Operand {
    fn from(q: &Quantity) -> Self {
        Operand::Quantity(*q)
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Number(n) => write!(f, "{}", n),
            Operand::Quantity(q) => write!(f, "{}", q),
        }
    }
}

/// Binary operators a host can dispatch at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "**",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "**" | "^" => Some(BinaryOp::Pow),
            _ => None,
        }
    }
}

/// Compound assignment operators. Quantities reject all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
        }
    }

    /// The binary operator the assignment is sugar for
    pub fn binary(&self) -> BinaryOp {
        match self {
            AssignOp::Add => BinaryOp::Add,
            AssignOp::Sub => BinaryOp::Sub,
            AssignOp::Mul => BinaryOp::Mul,
            AssignOp::Div => BinaryOp::Div,
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+=" => Some(AssignOp::Add),
            "-=" => Some(AssignOp::Sub),
            "*=" => Some(AssignOp::Mul),
            "/=" => Some(AssignOp::Div),
            _ => None,
        }
    }
}
